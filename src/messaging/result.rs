use serde::Serialize;
use std::collections::HashMap;

use crate::messaging::error::ApiError;

/// Per-item outcome of a batch, keyed by `OutboundItem::id`.
///
/// The three maps are disjoint: every classified item lands in exactly one.
/// Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    sent: HashMap<String, String>,
    unregistered: HashMap<String, ApiError>,
    errors: HashMap<String, ApiError>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_to_sent(&mut self, id: &str, provider_message_id: impl Into<String>) {
        self.sent.insert(id.to_string(), provider_message_id.into());
    }

    pub fn add_to_unregistered(&mut self, id: &str, error: ApiError) {
        self.unregistered.insert(id.to_string(), error);
    }

    pub fn add_to_errors(&mut self, id: &str, error: ApiError) {
        self.errors.insert(id.to_string(), error);
    }

    /// Item id -> provider message id (`projects/*/messages/*`).
    pub fn sent(&self) -> &HashMap<String, String> {
        &self.sent
    }

    /// Items whose recipient is gone; callers should prune these tokens.
    pub fn unregistered(&self) -> &HashMap<String, ApiError> {
        &self.unregistered
    }

    pub fn errors(&self) -> &HashMap<String, ApiError> {
        &self.errors
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sent.contains_key(id) || self.unregistered.contains_key(id) || self.errors.contains_key(id)
    }

    /// Number of classified items.
    pub fn len(&self) -> usize {
        self.sent.len() + self.unregistered.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
