use std::path::Path;
use crate::config::settings::{LoggingConfig, ServiceConfig};
use anyhow::{anyhow, bail, Result};
use regex::Regex;
use tracing::{debug, error};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("cannot read config {}: {}", path.display(), e))?;

    let expanded = expand_env_vars(&content);
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if service_config.logging.is_none() {
        service_config.logging = Some(LoggingConfig::default());
    }
    debug!("validation config ...");
    validate(&service_config)?;

    Ok(service_config)
}

fn validate(service_config: &ServiceConfig) -> Result<()> {
    if service_config.credentials_path.as_os_str().is_empty() {
        bail!("credentials_path must not be empty");
    }
    if service_config.http.timeout_ms == 0 {
        bail!("http.timeout_ms must be greater than zero");
    }
    let endpoints = &service_config.endpoints;
    for (name, url) in [
        ("token_url", &endpoints.token_url),
        ("fcm_url", &endpoints.fcm_url),
        ("iid_url", &endpoints.iid_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("endpoints.{} must be an http(s) url, got '{}'", name, url);
        }
    }
    Ok(())
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
