use serde::{Deserialize, Serialize};

/// Where a message is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Registration token of a single app instance.
    Token(String),
    Topic(String),
}

/// A notification to send.
///
/// `id` is assigned by the caller (e.g. a primary key) and is the key of the
/// batch result; it must be unique within one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundItem {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(flatten)]
    pub target: Target,
}

impl OutboundItem {
    pub fn to_token(
        id: impl Into<String>,
        token: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            target: Target::Token(token.into()),
        }
    }

    pub fn to_topic(
        id: impl Into<String>,
        topic: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            target: Target::Topic(topic.into()),
        }
    }

    /// Registration token or topic name, for logs.
    pub fn recipient(&self) -> &str {
        match &self.target {
            Target::Token(token) => token,
            Target::Topic(topic) => topic,
        }
    }

    /// Body of a `messages:send` request.
    pub fn to_request(&self, validate_only: bool) -> SendRequest<'_> {
        let notification = Notification { title: &self.title, body: &self.body };
        let message = match &self.target {
            Target::Token(token) => MessageBody::for_token(token, notification),
            Target::Topic(topic) => MessageBody::for_topic(topic, notification),
        };
        SendRequest { message, validate_only }
    }
}

#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub message: MessageBody<'a>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub validate_only: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<&'a str>,
    pub notification: Notification<'a>,
}

impl<'a> MessageBody<'a> {
    fn for_token(token: &'a str, notification: Notification<'a>) -> Self {
        Self { token: Some(token), topic: None, notification }
    }

    fn for_topic(topic: &'a str, notification: Notification<'a>) -> Self {
        Self { token: None, topic: Some(topic), notification }
    }
}

#[derive(Debug, Serialize)]
pub struct Notification<'a> {
    pub title: &'a str,
    pub body: &'a str,
}
