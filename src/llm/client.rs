//! HTTP client for OpenAI-compatible chat completion endpoints.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::CompletionError;

use super::retry::{DEFAULT_BASE_DELAY, LinearBackoff, retry_with_backoff};
use super::types::{ChatMessage, CompletionRequest, CompletionResponse};

/// Maximum characters of an error response body kept in [`CompletionError::HttpStatus`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Sends chat completion requests with bounded retry and linear backoff.
///
/// One client is built per workflow run. The underlying HTTP client carries
/// the per-attempt timeout and optional proxy; a new request is built for
/// every attempt.
pub struct CompletionClient {
    config: ClientConfig,
    http: reqwest::Client,
    headers: HeaderMap,
    base_delay: Duration,
}

impl CompletionClient {
    /// Build a client from `config`, validating the proxy URL and headers.
    pub fn new(config: ClientConfig) -> Result<Self, CompletionError> {
        let headers = build_headers(&config)?;

        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(proxy_url) = config.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                CompletionError::ClientBuild(format!("invalid proxy URL '{}': {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }
        let http = builder
            .build()
            .map_err(|e| CompletionError::ClientBuild(e.to_string()))?;

        Ok(Self {
            config,
            http,
            headers,
            base_delay: DEFAULT_BASE_DELAY,
        })
    }

    /// Override the backoff step between attempts.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Full URL of the chat completions endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    /// Request a completion and return the first choice's content.
    ///
    /// Makes at most `retries + 1` attempts. Transport errors and non-2xx
    /// statuses are retried; a response without choices fails immediately.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let max_attempts = self.config.retries.saturating_add(1);

        retry_with_backoff(
            max_attempts,
            LinearBackoff::new(self.base_delay),
            |attempt| self.send_once(attempt, max_attempts, messages),
            CompletionError::is_retryable,
            |attempts, last| CompletionError::RetriesExhausted {
                attempts,
                last: Box::new(last),
            },
        )
        .await
    }

    /// Single request/response exchange.
    async fn send_once(
        &self,
        attempt: u32,
        max_attempts: u32,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        let url = self.endpoint();
        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
        };

        if self.config.debug {
            debug!(
                "Sending request to provider `{}` (attempt {}/{}): POST {} model={} messages={}",
                self.config.provider,
                attempt + 1,
                max_attempts,
                url,
                self.config.model,
                messages.len()
            );
            for line in redacted_headers(&self.headers) {
                debug!("Request header {}", line);
            }
        }

        let response = self
            .http
            .post(&url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if self.config.debug {
                    debug!("Request failed: {}", e);
                }
                CompletionError::Transport(e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(CompletionError::Transport)?;

        if self.config.debug {
            debug!("Response status: {}", status.as_u16());
            debug!("Response body ({} bytes): {}", text.len(), text);
        }

        if !status.is_success() {
            return Err(CompletionError::HttpStatus {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(200).collect();
            CompletionError::InvalidResponse(format!("{}. Response: {}", e, preview))
        })?;

        parsed
            .first_content()
            .map(str::to_string)
            .ok_or(CompletionError::EmptyChoices)
    }
}

/// Bearer auth followed by configured extra headers.
fn build_headers(config: &ClientConfig) -> Result<HeaderMap, CompletionError> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|e| {
        CompletionError::InvalidHeader {
            name: AUTHORIZATION.to_string(),
            reason: e.to_string(),
        }
    })?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    for (name, value) in &config.extra_headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| CompletionError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| CompletionError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// Render headers for logging with credentials masked.
pub fn redacted_headers(headers: &HeaderMap) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| {
            if name == AUTHORIZATION {
                format!("{}: Bearer ***", name)
            } else if value.is_sensitive() {
                format!("{}: ***", name)
            } else {
                format!("{}: {}", name, value.to_str().unwrap_or("<binary>"))
            }
        })
        .collect()
}
