//! Wire types of the collector protocol.
//!
//! # Design
//! `Event` serializes with the collector's field names (`event`, `sourcetype`,
//! `time`) and omits every optional field that is unset, so the smallest
//! valid payload is `{"event":"..."}`. `ServiceResponse` is shared by the
//! health and event endpoints; fields missing from a body decode to their
//! zero value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single event submitted to the event endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(rename = "event")]
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "sourcetype", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    /// Epoch seconds.
    #[serde(rename = "time", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl Event {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Assign a freshly generated channel identifier.
    pub fn with_new_channel(self) -> Self {
        self.with_channel(Uuid::new_v4().to_string())
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = Some(source_type.into());
        self
    }

    pub fn with_timestamp(mut self, epoch_secs: u64) -> Self {
        self.timestamp = Some(epoch_secs);
        self
    }
}

/// Body returned by the health and event endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub code: i64,
    /// Zero-based index of the first invalid event in the request.
    #[serde(rename = "invalid-event-number", default, skip_serializing_if = "Option::is_none")]
    pub invalid_event_number: Option<u64>,
    /// Present when indexer acknowledgement is enabled for the token.
    #[serde(rename = "ackId", default, skip_serializing_if = "Option::is_none")]
    pub ack_id: Option<u64>,
}

impl ServiceResponse {
    /// Interpret `code` as an event endpoint status code.
    pub fn response_code(&self) -> Option<ResponseCode> {
        ResponseCode::from_code(self.code)
    }
}

/// Status codes documented for the event endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    TokenDisabled,
    TokenRequired,
    InvalidAuthorization,
    InvalidToken,
    NoData,
    InvalidDataFormat,
    IncorrectIndex,
    InternalServerError,
    ServerBusy,
    DataChannelMissing,
    InvalidDataChannel,
    EventFieldRequired,
    EventFieldBlank,
    AckDisabled,
    IndexedFieldsError,
    QueryStringAuthDisabled,
}

impl ResponseCode {
    const ALL: [ResponseCode; 17] = [
        ResponseCode::Success,
        ResponseCode::TokenDisabled,
        ResponseCode::TokenRequired,
        ResponseCode::InvalidAuthorization,
        ResponseCode::InvalidToken,
        ResponseCode::NoData,
        ResponseCode::InvalidDataFormat,
        ResponseCode::IncorrectIndex,
        ResponseCode::InternalServerError,
        ResponseCode::ServerBusy,
        ResponseCode::DataChannelMissing,
        ResponseCode::InvalidDataChannel,
        ResponseCode::EventFieldRequired,
        ResponseCode::EventFieldBlank,
        ResponseCode::AckDisabled,
        ResponseCode::IndexedFieldsError,
        ResponseCode::QueryStringAuthDisabled,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    /// HTTP status the collector pairs with this code.
    pub fn http_status(self) -> u16 {
        match self {
            ResponseCode::Success => 200,
            ResponseCode::TokenDisabled | ResponseCode::InvalidToken => 403,
            ResponseCode::TokenRequired | ResponseCode::InvalidAuthorization => 401,
            ResponseCode::InternalServerError => 500,
            ResponseCode::ServerBusy => 503,
            _ => 400,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            ResponseCode::Success => "Success",
            ResponseCode::TokenDisabled => "Token disabled",
            ResponseCode::TokenRequired => "Token is required",
            ResponseCode::InvalidAuthorization => "Invalid authorization",
            ResponseCode::InvalidToken => "Invalid token",
            ResponseCode::NoData => "No data",
            ResponseCode::InvalidDataFormat => "Invalid data format",
            ResponseCode::IncorrectIndex => "Incorrect index",
            ResponseCode::InternalServerError => "Internal server error",
            ResponseCode::ServerBusy => "Server is busy",
            ResponseCode::DataChannelMissing => "Data channel is missing",
            ResponseCode::InvalidDataChannel => "Invalid data channel",
            ResponseCode::EventFieldRequired => "Event field is required",
            ResponseCode::EventFieldBlank => "Event field cannot be blank",
            ResponseCode::AckDisabled => "ACK is disabled",
            ResponseCode::IndexedFieldsError => "Error in handling indexed fields",
            ResponseCode::QueryStringAuthDisabled => "Query string authorization is not enabled",
        }
    }
}
