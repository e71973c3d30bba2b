//! Blocking HTTP transport for collector requests.
//!
//! Wraps one `ureq::Agent`, which pools connections and is safe to share
//! between threads. Status codes come back as data so that `HecClient`
//! classifies every answer itself.

use std::time::Duration;

use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes `HttpRequest` values against the network.
#[derive(Clone)]
pub struct Transport {
    agent: Agent,
}

impl Transport {
    /// Creates an agent whose requests are bounded by `timeout` end to end.
    ///
    /// Server certificates are verified unless `insecure_skip_verify` is set.
    pub fn new(timeout: Duration, insecure_skip_verify: bool) -> Self {
        let tls = TlsConfig::builder()
            .disable_verification(insecure_skip_verify)
            .build();
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .tls_config(tls)
            .build()
            .new_agent();

        Self { agent }
    }

    /// Performs one round-trip and reads the whole body as text. Invalid
    /// UTF-8 sequences are replaced rather than rejected.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ureq::Error> {
        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes())?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        // Not `read_to_string`: non-UTF-8 bodies must reach the parser.
        let bytes = response.body_mut().read_to_vec()?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse { status, body })
    }
}
