//! Event envelope decoding.
//!
//! Message bodies arrive as loosely-typed JSON. [`EventEnvelope`] reads the
//! three logical fields without enforcing a schema, and [`LoanEvent::decode`]
//! maps the envelope onto a tagged variant per known event type. Field
//! coercion failures are kept as [`PayloadError`] values inside the variant
//! for the handler to consume.

use common::LoanId;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{ConsumerError, Result};

/// A loan was created upstream.
pub const PEMINJAMAN_CREATED: &str = "PEMINJAMAN_CREATED";
/// A loan was returned upstream.
pub const PENGEMBALIAN_CREATED: &str = "PENGEMBALIAN_CREATED";
/// A loan was updated upstream.
pub const PEMINJAMAN_UPDATED: &str = "PEMINJAMAN_UPDATED";

/// Errors reading the `data` section of an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// `data` is absent or null.
    #[error("event data is missing")]
    MissingData,

    /// `data` is not an object.
    #[error("event data must be an object, got {0}")]
    InvalidData(&'static str),

    /// A required field is absent or null.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field has the wrong type or is out of range.
    #[error("field `{field}` must be {expected}, got {found}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// The generic envelope every message body carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl EventEnvelope {
    /// Creates an envelope for the given event type.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            ..Self::default()
        }
    }

    /// Sets the correlation ID.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Sets the event data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Decodes a raw message body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    /// Reads the envelope fields from a JSON value.
    ///
    /// Only the top level must be an object. A non-string `eventType` or
    /// `correlationId` is treated as absent, and a null `data` as missing.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(ConsumerError::InvalidEnvelope(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        };

        Ok(Self {
            event_type: take_string(&mut map, "eventType"),
            correlation_id: take_string(&mut map, "correlationId"),
            data: map.remove("data").filter(|data| !data.is_null()),
        })
    }

    /// Returns the envelope as a JSON value, as a publisher would send it.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(event_type) = &self.event_type {
            map.insert("eventType".to_string(), Value::from(event_type.as_str()));
        }
        if let Some(correlation_id) = &self.correlation_id {
            map.insert(
                "correlationId".to_string(),
                Value::from(correlation_id.as_str()),
            );
        }
        if let Some(data) = &self.data {
            map.insert("data".to_string(), data.clone());
        }
        Value::Object(map)
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Payload of a `PEMINJAMAN_CREATED` event.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanCreated {
    /// The new loan's ID, when the producer included a numeric one.
    pub loan_id: Option<LoanId>,
    /// The full event data, forwarded to the notifier.
    pub details: Map<String, Value>,
}

impl LoanCreated {
    /// Reads the payload from the envelope's `data`.
    pub fn from_data(data: Option<&Value>) -> std::result::Result<Self, PayloadError> {
        let map = require_object(data)?;
        let loan_id = ["id", "peminjamanId"]
            .into_iter()
            .filter_map(|field| map.get(field))
            .find_map(|value| coerce_loan_id("id", value).ok());

        Ok(Self {
            loan_id,
            details: map.clone(),
        })
    }
}

/// Payload of a `PENGEMBALIAN_CREATED` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnCreated {
    /// The loan that was returned.
    pub loan_id: LoanId,
}

impl ReturnCreated {
    /// Reads the payload from the envelope's `data`.
    ///
    /// `peminjamanId` must be numeric. Fractional values are truncated
    /// toward zero.
    pub fn from_data(data: Option<&Value>) -> std::result::Result<Self, PayloadError> {
        let map = require_object(data)?;
        let value = map
            .get("peminjamanId")
            .filter(|value| !value.is_null())
            .ok_or(PayloadError::MissingField("peminjamanId"))?;

        Ok(Self {
            loan_id: coerce_loan_id("peminjamanId", value)?,
        })
    }
}

fn require_object(data: Option<&Value>) -> std::result::Result<&Map<String, Value>, PayloadError> {
    match data {
        None | Some(Value::Null) => Err(PayloadError::MissingData),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(PayloadError::InvalidData(json_kind(other))),
    }
}

fn coerce_loan_id(field: &'static str, value: &Value) -> std::result::Result<LoanId, PayloadError> {
    let invalid = |found| PayloadError::InvalidField {
        field,
        expected: "a number within the loan ID range",
        found,
    };

    let Value::Number(number) = value else {
        return Err(invalid(json_kind(value)));
    };

    if let Some(id) = number.as_i64() {
        return Ok(LoanId::new(id));
    }

    if number.is_f64()
        && let Some(float) = number.as_f64()
        && float.is_finite()
        && float >= i64::MIN as f64
        && float < i64::MAX as f64
    {
        return Ok(LoanId::new(float.trunc() as i64));
    }

    Err(invalid("an out-of-range number"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// An envelope decoded by exact match on its event type.
#[derive(Debug, Clone, PartialEq)]
pub enum LoanEvent {
    /// `PEMINJAMAN_CREATED`
    LoanCreated(std::result::Result<LoanCreated, PayloadError>),
    /// `PENGEMBALIAN_CREATED`
    ReturnCreated(std::result::Result<ReturnCreated, PayloadError>),
    /// `PEMINJAMAN_UPDATED`
    LoanUpdated,
    /// Any other event type, or none at all.
    Unrecognized(Option<String>),
}

impl LoanEvent {
    /// Decodes an envelope. Never fails: payload problems are carried inside
    /// the variant.
    pub fn decode(envelope: &EventEnvelope) -> Self {
        let data = envelope.data.as_ref();
        match envelope.event_type.as_deref() {
            Some(PEMINJAMAN_CREATED) => LoanEvent::LoanCreated(LoanCreated::from_data(data)),
            Some(PENGEMBALIAN_CREATED) => LoanEvent::ReturnCreated(ReturnCreated::from_data(data)),
            Some(PEMINJAMAN_UPDATED) => LoanEvent::LoanUpdated,
            other => LoanEvent::Unrecognized(other.map(str::to_string)),
        }
    }

    /// Returns a bounded label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            LoanEvent::LoanCreated(_) => PEMINJAMAN_CREATED,
            LoanEvent::ReturnCreated(_) => PENGEMBALIAN_CREATED,
            LoanEvent::LoanUpdated => PEMINJAMAN_UPDATED,
            LoanEvent::Unrecognized(_) => "UNKNOWN",
        }
    }
}
