//! Collector endpoint URLs.

use crate::config::Protocol;

const COLLECTOR_PATH: &str = "/services/collector";

/// The three collector URLs derived from protocol, host and port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub health: String,
    pub event: String,
    pub raw: String,
}

impl Endpoints {
    pub fn new(protocol: Protocol, host: &str, port: u16) -> Self {
        let base = format!("{protocol}://{host}:{port}{COLLECTOR_PATH}");
        Self {
            health: format!("{base}/health"),
            event: format!("{base}/event"),
            raw: format!("{base}/raw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_all_three_urls() {
        let endpoints = Endpoints::new(Protocol::Https, "splunk.example.com", 8088);
        assert_eq!(endpoints.health, "https://splunk.example.com:8088/services/collector/health");
        assert_eq!(endpoints.event, "https://splunk.example.com:8088/services/collector/event");
        assert_eq!(endpoints.raw, "https://splunk.example.com:8088/services/collector/raw");
    }

    #[test]
    fn keeps_protocol_host_and_port() {
        for (protocol, scheme) in [(Protocol::Http, "http"), (Protocol::Https, "https")] {
            for (host, port) in [("localhost", 1u16), ("10.0.0.7", 8088), ("hec.internal", 65535)] {
                let endpoints = Endpoints::new(protocol, host, port);
                let prefix = format!("{scheme}://{host}:{port}/services/collector/");
                for (url, suffix) in [
                    (&endpoints.health, "health"),
                    (&endpoints.event, "event"),
                    (&endpoints.raw, "raw"),
                ] {
                    assert_eq!(url, &format!("{prefix}{suffix}"));
                }
            }
        }
    }
}
