//! HTTP(S) probe backed by reqwest.
//!
//! # Responsibilities
//! - Issue one GET per call with a fixed timeout
//! - Answer a Basic challenge from the per-request credential context
//! - Classify the result into an Outcome; nothing escapes as an error

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::WWW_AUTHENTICATE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{CredentialRule, MonitorConfig};
use crate::probe::credentials::{parse_basic_challenge, CredentialContext};
use crate::probe::outcome::Outcome;
use crate::probe::target::Target;
use crate::probe::{Probe, ProbeError};

/// Read-only settings shared by every probe handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    pub timeout: Duration,
    pub user_agent: String,
    /// Honour `HTTP(S)_PROXY` from the environment.
    pub system_proxy: bool,
    pub credentials: Vec<CredentialRule>,
    pub suppress: Vec<String>,
}

impl ProbeSettings {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.probe.timeout_secs),
            user_agent: config.probe.user_agent.clone(),
            system_proxy: config.probe.system_proxy,
            credentials: config.credentials.clone(),
            suppress: config.suppress.clone(),
        }
    }

    /// True when a transport failure reason names a known-noisy endpoint.
    pub fn is_suppressed(&self, reason: &str) -> bool {
        self.suppress.iter().any(|p| reason.contains(p.as_str()))
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

/// Production probe.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    settings: Arc<ProbeSettings>,
}

impl HttpProbe {
    pub fn new(settings: ProbeSettings) -> Result<Self, ProbeError> {
        let settings = Arc::new(settings);
        Ok(Self {
            client: build_client(&settings)?,
            settings,
        })
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    async fn fetch(&self, url: &Url, credentials: &CredentialContext) -> Result<StatusCode, reqwest::Error> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status != StatusCode::UNAUTHORIZED || credentials.is_empty() {
            return Ok(status);
        }

        let challenge = response
            .headers()
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(parse_basic_challenge);
        let Some(realm) = challenge else {
            return Ok(status);
        };
        let Some(credential) = credentials.lookup(realm.as_deref()) else {
            tracing::debug!(url = %url, realm = ?realm, "No credential registered for challenge");
            return Ok(status);
        };

        tracing::debug!(url = %url, realm = ?realm, username = %credential.username, "Answering basic auth challenge");
        let response = self
            .client
            .get(url.clone())
            .basic_auth(&credential.username, Some(&credential.password))
            .send()
            .await?;
        Ok(response.status())
    }

    fn classify_error(&self, target: &Target, err: &reqwest::Error) -> Outcome {
        let reason = error_reason(err);
        if err.is_connect() || err.is_timeout() || err.is_request() || err.is_redirect() {
            if self.settings.is_suppressed(&reason) {
                return Outcome::suppressed(target);
            }
            Outcome::transport(target, &reason)
        } else {
            Outcome::unexpected(target, reason)
        }
    }
}

impl Probe for HttpProbe {
    async fn check(&self, target: &Target) -> Outcome {
        let url = match Url::parse(target.url()) {
            Ok(url) => url,
            Err(e) => return Outcome::unexpected(target, format_args!("invalid URL: {}", e)),
        };
        let credentials = CredentialContext::for_url(&self.settings.credentials, target.url());

        match self.fetch(&url, &credentials).await {
            Ok(status) => classify_status(target, status.as_u16()),
            Err(err) => self.classify_error(target, &err),
        }
    }
}

fn build_client(settings: &ProbeSettings) -> Result<Client, ProbeError> {
    let mut builder = Client::builder()
        .timeout(settings.timeout)
        .user_agent(settings.user_agent.as_str());
    if !settings.system_proxy {
        builder = builder.no_proxy();
    }
    builder.build().map_err(ProbeError::Client)
}

/// 2xx is reachable; any other final status is a protocol failure.
pub fn classify_status(target: &Target, code: u16) -> Outcome {
    if (200..300).contains(&code) {
        Outcome::reachable(target, code)
    } else {
        Outcome::protocol(target, code)
    }
}

/// Flatten an error and its sources into one line.
fn error_reason(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts: Vec<String> = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}
