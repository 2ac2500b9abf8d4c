// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inbound messages posted by the embedded runtime.
//
// Every message has the shape `{ name, data }`. `ScriptMessage` is the raw
// decoded form; `InboundEvent` is the typed event the bridge routes.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use waypost_core::error::{Result, WaypostError};
use waypost_core::VisitOptions;

/// Names of every message the embedded runtime posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageName {
    PageLoaded,
    PageLoadFailed,
    ErrorRaised,
    VisitProposed,
    VisitStarted,
    VisitRequestStarted,
    VisitRequestCompleted,
    VisitRequestFailed,
    VisitRequestFinished,
    VisitRendered,
    VisitCompleted,
    PageInvalidated,
    Log,
    FormSubmissionStarted,
    FormSubmissionFinished,
}

/// One decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptMessage {
    pub name: MessageName,
    pub data: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

/// Per-visit events, all tagged with the runtime-assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitEvent {
    Started {
        identifier: String,
        has_cached_snapshot: bool,
    },
    RequestStarted {
        identifier: String,
    },
    RequestCompleted {
        identifier: String,
    },
    RequestFailed {
        identifier: String,
        status_code: i32,
    },
    RequestFinished {
        identifier: String,
    },
    Rendered {
        identifier: String,
    },
    Completed {
        identifier: String,
        restoration_identifier: String,
    },
}

impl VisitEvent {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Started { identifier, .. }
            | Self::RequestStarted { identifier }
            | Self::RequestCompleted { identifier }
            | Self::RequestFailed { identifier, .. }
            | Self::RequestFinished { identifier }
            | Self::Rendered { identifier }
            | Self::Completed { identifier, .. } => identifier,
        }
    }
}

/// A typed inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    PageLoaded { restoration_identifier: String },
    PageLoadFailed,
    ErrorRaised { error: String },
    VisitProposed { location: Url, options: VisitOptions },
    PageInvalidated,
    Log { message: String },
    FormSubmissionStarted { location: Url },
    FormSubmissionFinished { location: Url },
    Visit(VisitEvent),
}

impl ScriptMessage {
    /// Decode a message body as delivered by the surface.
    ///
    /// Unknown names and non-object `data` are rejected. A missing timestamp
    /// is replaced by the time of receipt.
    pub fn from_value(body: &Value) -> Result<Self> {
        let body = body
            .as_object()
            .ok_or_else(|| malformed("message body is not an object"))?;
        let name = body
            .get("name")
            .cloned()
            .ok_or_else(|| malformed("message has no name"))?;
        let name: MessageName = serde_json::from_value(name)
            .map_err(|e| malformed(format!("unknown message name: {e}")))?;
        let data = match body.get("data") {
            Some(Value::Object(data)) => data.clone(),
            _ => return Err(malformed(format!("{name:?} carries no data object"))),
        };
        let timestamp = data
            .get("timestamp")
            .and_then(Value::as_f64)
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64))
            .unwrap_or_else(Utc::now);

        Ok(Self {
            name,
            data,
            timestamp,
        })
    }

    /// Decode a message delivered as a JSON string (string-only IPC channels).
    pub fn from_json(json: &str) -> Result<Self> {
        let body: Value = serde_json::from_str(json)?;
        Self::from_value(&body)
    }

    pub fn identifier(&self) -> Option<&str> {
        self.str_field("identifier")
    }

    pub fn restoration_identifier(&self) -> Option<&str> {
        self.str_field("restorationIdentifier")
    }

    pub fn location(&self) -> Option<Url> {
        self.str_field("location").and_then(|s| Url::parse(s).ok())
    }

    /// Convert into the typed event for this message's name.
    pub fn event(&self) -> Result<InboundEvent> {
        let event = match self.name {
            MessageName::PageLoaded => InboundEvent::PageLoaded {
                restoration_identifier: self.required_restoration_identifier()?,
            },
            MessageName::PageLoadFailed => InboundEvent::PageLoadFailed,
            MessageName::ErrorRaised => InboundEvent::ErrorRaised {
                error: self.str_field("error").unwrap_or("unknown").to_string(),
            },
            MessageName::VisitProposed => {
                let options = match self.data.get("options") {
                    Some(raw) => serde_json::from_value(raw.clone())
                        .map_err(|e| malformed(format!("visitProposed options: {e}")))?,
                    None => VisitOptions::default(),
                };
                InboundEvent::VisitProposed {
                    location: self.required_location()?,
                    options,
                }
            }
            MessageName::PageInvalidated => InboundEvent::PageInvalidated,
            MessageName::Log => InboundEvent::Log {
                message: self
                    .data
                    .get("message")
                    .map(|m| match m {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default(),
            },
            MessageName::FormSubmissionStarted => InboundEvent::FormSubmissionStarted {
                location: self.required_location()?,
            },
            MessageName::FormSubmissionFinished => InboundEvent::FormSubmissionFinished {
                location: self.required_location()?,
            },
            MessageName::VisitStarted => InboundEvent::Visit(VisitEvent::Started {
                identifier: self.required_identifier()?,
                has_cached_snapshot: self
                    .data
                    .get("hasCachedSnapshot")
                    .and_then(Value::as_bool)
                    .ok_or_else(|| malformed("visitStarted without hasCachedSnapshot"))?,
            }),
            MessageName::VisitRequestStarted => InboundEvent::Visit(VisitEvent::RequestStarted {
                identifier: self.required_identifier()?,
            }),
            MessageName::VisitRequestCompleted => {
                InboundEvent::Visit(VisitEvent::RequestCompleted {
                    identifier: self.required_identifier()?,
                })
            }
            MessageName::VisitRequestFailed => InboundEvent::Visit(VisitEvent::RequestFailed {
                identifier: self.required_identifier()?,
                status_code: self.status_code()?,
            }),
            MessageName::VisitRequestFinished => {
                InboundEvent::Visit(VisitEvent::RequestFinished {
                    identifier: self.required_identifier()?,
                })
            }
            MessageName::VisitRendered => InboundEvent::Visit(VisitEvent::Rendered {
                identifier: self.required_identifier()?,
            }),
            MessageName::VisitCompleted => InboundEvent::Visit(VisitEvent::Completed {
                identifier: self.required_identifier()?,
                restoration_identifier: self.required_restoration_identifier()?,
            }),
        };
        Ok(event)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    fn required_identifier(&self) -> Result<String> {
        self.identifier()
            .map(str::to_string)
            .ok_or_else(|| malformed(format!("{:?} without identifier", self.name)))
    }

    fn required_restoration_identifier(&self) -> Result<String> {
        self.restoration_identifier()
            .map(str::to_string)
            .ok_or_else(|| malformed(format!("{:?} without restorationIdentifier", self.name)))
    }

    fn status_code(&self) -> Result<i32> {
        let code = self
            .data
            .get("statusCode")
            .and_then(Value::as_i64)
            .ok_or_else(|| malformed("visitRequestFailed without statusCode"))?;
        i32::try_from(code).map_err(|_| malformed(format!("statusCode {code} out of range")))
    }

    fn required_location(&self) -> Result<Url> {
        self.location()
            .ok_or_else(|| malformed(format!("{:?} without a valid location", self.name)))
    }
}

fn malformed(detail: impl Into<String>) -> WaypostError {
    WaypostError::MalformedMessage(detail.into())
}
