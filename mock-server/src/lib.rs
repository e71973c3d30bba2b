use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const HEALTH_PATH: &str = "/services/collector/health";
pub const EVENT_PATH: &str = "/services/collector/event";

/// How the emulated collector answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Healthy,
    /// Health answers 503 and events answer 503 "Server is busy".
    QueuesFull,
    /// Every authorized request answers 200 with a plain-text body.
    Garbage,
}

impl Mode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "healthy" => Some(Mode::Healthy),
            "queues-full" => Some(Mode::QueuesFull),
            "garbage" => Some(Mode::Garbage),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CollectorOptions {
    pub token: String,
    pub mode: Mode,
    /// Return an incrementing `ackId` for accepted events.
    pub ack: bool,
}

impl CollectorOptions {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            mode: Mode::Healthy,
            ack: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    pub text: &'static str,
    pub code: i64,
    #[serde(rename = "invalid-event-number", skip_serializing_if = "Option::is_none")]
    pub invalid_event_number: Option<u64>,
    #[serde(rename = "ackId", skip_serializing_if = "Option::is_none")]
    pub ack_id: Option<u64>,
}

impl ServiceResponse {
    fn new(text: &'static str, code: i64) -> Self {
        Self {
            text,
            code,
            invalid_event_number: None,
            ack_id: None,
        }
    }

    fn invalid_event(text: &'static str, code: i64) -> Self {
        Self {
            invalid_event_number: Some(0),
            ..Self::new(text, code)
        }
    }
}

pub type Received = Arc<RwLock<Vec<Value>>>;

/// In-memory collector state shared by the handlers.
#[derive(Clone)]
pub struct Collector {
    options: Arc<CollectorOptions>,
    received: Received,
    next_ack: Arc<AtomicU64>,
}

impl Collector {
    pub fn new(options: CollectorOptions) -> Self {
        Self {
            options: Arc::new(options),
            received: Arc::new(RwLock::new(Vec::new())),
            next_ack: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Events accepted so far, in arrival order.
    pub fn received(&self) -> Received {
        self.received.clone()
    }

    pub fn router(self) -> Router {
        Router::new()
            .route(HEALTH_PATH, get(health))
            .route(EVENT_PATH, post(event))
            .with_state(self)
    }
}

pub fn app(options: CollectorOptions) -> Router {
    Collector::new(options).router()
}

pub async fn run(listener: TcpListener, collector: Collector) -> Result<(), std::io::Error> {
    axum::serve(listener, collector.router()).await
}

type Reply = (StatusCode, Json<ServiceResponse>);

fn reply(status: StatusCode, body: ServiceResponse) -> Response {
    (status, Json(body)).into_response()
}

fn garbage() -> Response {
    (StatusCode::OK, "oops").into_response()
}

/// Outcome of checking the `Authorization: Splunk <token>` header.
enum Auth {
    Ok,
    Missing,
    Malformed,
    WrongToken,
}

fn authorize(headers: &HeaderMap, token: &str) -> Auth {
    let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return Auth::Missing;
    };
    match value.split_once(' ') {
        Some(("Splunk", given)) if given == token => Auth::Ok,
        Some(("Splunk", _)) => Auth::WrongToken,
        _ => Auth::Malformed,
    }
}

async fn health(State(collector): State<Collector>, headers: HeaderMap) -> Response {
    let opts = &collector.options;
    if !matches!(authorize(&headers, &opts.token), Auth::Ok) {
        return reply(StatusCode::BAD_REQUEST, ServiceResponse::new("Invalid token", 400));
    }
    match opts.mode {
        Mode::Healthy => reply(StatusCode::OK, ServiceResponse::new("Success", 200)),
        Mode::QueuesFull => reply(
            StatusCode::SERVICE_UNAVAILABLE,
            ServiceResponse::new("HEC is unhealthy, queues are full", 503),
        ),
        Mode::Garbage => garbage(),
    }
}

async fn event(State(collector): State<Collector>, headers: HeaderMap, body: String) -> Response {
    let opts = &collector.options;
    match authorize(&headers, &opts.token) {
        Auth::Ok => {}
        Auth::Missing => {
            return reply(StatusCode::UNAUTHORIZED, ServiceResponse::new("Token is required", 2))
        }
        Auth::Malformed => {
            return reply(StatusCode::UNAUTHORIZED, ServiceResponse::new("Invalid authorization", 3))
        }
        Auth::WrongToken => {
            return reply(StatusCode::FORBIDDEN, ServiceResponse::new("Invalid token", 4))
        }
    }
    match opts.mode {
        Mode::Healthy => {}
        Mode::QueuesFull => {
            return reply(StatusCode::SERVICE_UNAVAILABLE, ServiceResponse::new("Server is busy", 9))
        }
        Mode::Garbage => return garbage(),
    }

    let event = match validate(&body) {
        Ok(event) => event,
        Err(rejection) => return rejection.into_response(),
    };
    collector.received.write().await.push(event);

    let mut resp = ServiceResponse::new("Success", 0);
    if opts.ack {
        resp.ack_id = Some(collector.next_ack.fetch_add(1, Ordering::SeqCst));
    }
    reply(StatusCode::OK, resp)
}

fn validate(body: &str) -> Result<Value, Reply> {
    if body.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(ServiceResponse::new("No data", 5))));
    }
    let bad = |text, code| {
        (
            StatusCode::BAD_REQUEST,
            Json(ServiceResponse::invalid_event(text, code)),
        )
    };
    let value: Value = serde_json::from_str(body).map_err(|_| bad("Invalid data format", 6))?;
    let Some(object) = value.as_object() else {
        return Err(bad("Invalid data format", 6));
    };
    match object.get("event") {
        None => return Err(bad("Event field is required", 12)),
        Some(Value::String(s)) if s.is_empty() => return Err(bad("Event field cannot be blank", 13)),
        Some(Value::Null) => return Err(bad("Event field cannot be blank", 13)),
        Some(_) => {}
    }
    if let Some(channel) = object.get("channel") {
        let valid = channel.as_str().is_some_and(|c| Uuid::parse_str(c).is_ok());
        if !valid {
            return Err(bad("Invalid data channel", 11));
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn authorize_classifies_headers() {
        assert!(matches!(authorize(&HeaderMap::new(), "t"), Auth::Missing));
        assert!(matches!(authorize(&headers("Splunk t"), "t"), Auth::Ok));
        assert!(matches!(authorize(&headers("Splunk x"), "t"), Auth::WrongToken));
        assert!(matches!(authorize(&headers("Bearer t"), "t"), Auth::Malformed));
        assert!(matches!(authorize(&headers("Splunk"), "t"), Auth::Malformed));
    }

    #[test]
    fn validate_accepts_minimal_event() {
        let value = validate(r#"{"event":"hello"}"#).unwrap();
        assert_eq!(value["event"], "hello");
    }

    #[test]
    fn validate_rejects_bad_payloads() {
        let code = |body: &str| validate(body).unwrap_err().1 .0.code;
        assert_eq!(code(""), 5);
        assert_eq!(code("oops"), 6);
        assert_eq!(code("[1,2]"), 6);
        assert_eq!(code(r#"{"fields":{"a":"b"}}"#), 12);
        assert_eq!(code(r#"{"event":""}"#), 13);
        assert_eq!(code(r#"{"event":"x","channel":"not-a-guid"}"#), 11);
    }

    #[test]
    fn validate_accepts_uuid_channel() {
        let body = format!(r#"{{"event":"x","channel":"{}"}}"#, Uuid::new_v4());
        assert!(validate(&body).is_ok());
    }

    #[test]
    fn mode_parses_names() {
        assert_eq!(Mode::parse("queues-full"), Some(Mode::QueuesFull));
        assert_eq!(Mode::parse("garbage"), Some(Mode::Garbage));
        assert_eq!(Mode::parse("healthy"), Some(Mode::Healthy));
        assert_eq!(Mode::parse("other"), None);
    }
}
