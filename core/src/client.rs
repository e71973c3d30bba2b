//! Collector client: health check and event submission.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that classifies an `HttpResponse`.
//! `health_check` and `send` join the two through the owned `Transport`.
//! The split keeps every status rule testable on plain data.
//!
//! The client holds no mutable state after construction, so a shared
//! `&HecClient` can send from several threads at once.

use std::fmt;

use crate::config::CollectorSettings;
use crate::endpoints::Endpoints;
use crate::error::{HecError, Operation, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Event, ServiceResponse};

/// Display name used in logs and error messages unless overridden.
pub const DEFAULT_CLIENT_NAME: &str = "splunk-http-collector-client";

const AUTH_SCHEME: &str = "Splunk";

/// Blocking client for one HTTP Event Collector.
#[derive(Clone)]
pub struct HecClient {
    name: String,
    endpoints: Endpoints,
    token: String,
    transport: Transport,
}

impl HecClient {
    /// Builds endpoints and transport without contacting the collector.
    pub fn new(settings: &CollectorSettings) -> Self {
        let endpoints = Endpoints::new(settings.protocol, &settings.host, settings.port);
        let client = Self {
            name: DEFAULT_CLIENT_NAME.to_string(),
            endpoints,
            token: settings.token.clone(),
            transport: Transport::new(settings.timeout, settings.insecure_skip_verify),
        };

        tracing::debug!(
            client = %client.name,
            proto = %settings.protocol,
            host = %settings.host,
            port = settings.port,
            timeout_secs = settings.timeout.as_secs(),
            health = %client.endpoints.health,
            event = %client.endpoints.event,
            raw = %client.endpoints.raw,
            "collector client configured"
        );
        if settings.insecure_skip_verify {
            tracing::warn!(
                client = %client.name,
                host = %settings.host,
                "TLS certificate verification is disabled"
            );
        }
        client
    }

    /// Builds the client and returns it only if the health check passes.
    pub fn connect(settings: &CollectorSettings) -> Result<Self> {
        let client = Self::new(settings);
        client.health_check()?;
        Ok(client)
    }

    /// Replaces the display name used in logs and error messages.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Checks that the collector is available and accepting input.
    pub fn health_check(&self) -> Result<ServiceResponse> {
        let request = self.build_health_check();
        tracing::debug!(client = %self.name, url = %request.url, "health check");
        let response = self.execute(Operation::HealthCheck, &request)?;
        self.parse_health_check(response)
    }

    /// Submits one event and returns the collector's answer.
    pub fn send(&self, event: &Event) -> Result<ServiceResponse> {
        let request = self.build_send(event)?;
        tracing::debug!(client = %self.name, url = %request.url, "sending event");
        let response = self.execute(Operation::Send, &request)?;
        self.parse_send(response)
    }

    pub fn build_health_check(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.endpoints.health.clone(),
            headers: vec![self.authorization()],
            body: None,
        }
    }

    pub fn build_send(&self, event: &Event) -> Result<HttpRequest> {
        let body = serde_json::to_string(event).map_err(|source| HecError::Serialize {
            client: self.name.clone(),
            source,
        })?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoints.event.clone(),
            headers: vec![
                self.authorization(),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }

    /// 200 with a JSON body is healthy; 400 and 503 have dedicated errors.
    pub fn parse_health_check(&self, response: HttpResponse) -> Result<ServiceResponse> {
        let url = &self.endpoints.health;
        match response.status {
            200 => {
                let decoded = self.decode(Operation::HealthCheck, url, &response)?;
                tracing::debug!(
                    client = %self.name,
                    code = decoded.code,
                    text = %decoded.text,
                    "collector is available and accepting input"
                );
                Ok(decoded)
            }
            400 => Err(HecError::InvalidToken {
                client: self.name.clone(),
                url: url.clone(),
            }),
            503 => Err(HecError::QueueFull {
                client: self.name.clone(),
                url: url.clone(),
            }),
            status => {
                let text = serde_json::from_str::<ServiceResponse>(&response.body)
                    .ok()
                    .map(|r| r.text)
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| reason_phrase(status).to_string());
                Err(HecError::UnexpectedStatus {
                    client: self.name.clone(),
                    url: url.clone(),
                    status,
                    text,
                })
            }
        }
    }

    /// The body must decode first; a non-200 status then fails with the
    /// service's text.
    pub fn parse_send(&self, response: HttpResponse) -> Result<ServiceResponse> {
        let url = &self.endpoints.event;
        let decoded = self.decode(Operation::Send, url, &response)?;
        if response.status != 200 {
            return Err(HecError::RemoteRejected {
                client: self.name.clone(),
                url: url.clone(),
                status: response.status,
                text: decoded.text,
            });
        }
        tracing::debug!(
            client = %self.name,
            code = decoded.code,
            text = %decoded.text,
            ack_id = ?decoded.ack_id,
            "event accepted"
        );
        Ok(decoded)
    }

    fn authorization(&self) -> (String, String) {
        (
            "Authorization".to_string(),
            format!("{AUTH_SCHEME} {}", self.token),
        )
    }

    fn execute(&self, op: Operation, request: &HttpRequest) -> Result<HttpResponse> {
        let response = self
            .transport
            .execute(request)
            .map_err(|source| HecError::Transport {
                client: self.name.clone(),
                op,
                url: request.url.clone(),
                source,
            })?;
        tracing::debug!(
            client = %self.name,
            status = response.status,
            reason = reason_phrase(response.status),
            "{op} response"
        );
        Ok(response)
    }

    fn decode(&self, op: Operation, url: &str, response: &HttpResponse) -> Result<ServiceResponse> {
        serde_json::from_str(&response.body).map_err(|_| HecError::MalformedResponse {
            client: self.name.clone(),
            op,
            url: url.to_string(),
            body: response.body.clone(),
        })
    }
}

impl fmt::Debug for HecClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HecClient")
            .field("name", &self.name)
            .field("endpoints", &self.endpoints)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
}
