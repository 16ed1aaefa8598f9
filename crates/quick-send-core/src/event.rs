// SPDX-License-Identifier: AGPL-3.0
// Quick Send Core - Engine push events
//
// The transfer engine pushes named events with JSON payloads. They are
// decoded here into a closed set; anything else is rejected at the boundary.

use crate::item::EngineId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UPLOAD_QUEUE_APPEND: &str = "upload-queue-append";
pub const UPLOAD_QUEUE_PROGRESS: &str = "upload-queue-progress";
pub const UPLOAD_QUEUE_ALL_DONE: &str = "upload-queue-alldone";
pub const DOWNLOAD_QUEUE_APPEND: &str = "download-queue-append";
pub const DOWNLOAD_QUEUE_PROGRESS: &str = "download-queue-progress";
pub const DOWNLOAD_QUEUE_DONE: &str = "download-queue-done";

/// An event as it arrives on the push channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub name: String,
    pub payload: Value,
}

impl RawEvent {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Why a raw event could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventDecodeError {
    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("malformed payload for '{event}': {reason}")]
    MalformedPayload { event: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UploadAppendPayload {
    id: String,
    title: String,
    size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DownloadAppendPayload {
    id: String,
    name: String,
    size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProgressPayload {
    id: String,
    offset: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdPayload {
    id: String,
}

/// Lifecycle event for one transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadAppend {
        id: EngineId,
        title: String,
        size: u64,
    },
    /// `offset` is the absolute number of bytes transferred so far
    UploadProgress { id: EngineId, offset: u64 },
    UploadAllDone { id: EngineId },
    DownloadAppend {
        id: EngineId,
        name: String,
        size: u64,
    },
    DownloadProgress { id: EngineId, offset: u64 },
    DownloadDone { id: EngineId },
}

impl EngineEvent {
    pub fn decode(raw: &RawEvent) -> Result<Self, EventDecodeError> {
        let event = match raw.name.as_str() {
            UPLOAD_QUEUE_APPEND => {
                let p: UploadAppendPayload = payload(raw)?;
                Self::UploadAppend {
                    id: p.id.into(),
                    title: p.title,
                    size: p.size,
                }
            }
            UPLOAD_QUEUE_PROGRESS => {
                let p: ProgressPayload = payload(raw)?;
                Self::UploadProgress {
                    id: p.id.into(),
                    offset: p.offset,
                }
            }
            UPLOAD_QUEUE_ALL_DONE => {
                let p: IdPayload = payload(raw)?;
                Self::UploadAllDone { id: p.id.into() }
            }
            DOWNLOAD_QUEUE_APPEND => {
                let p: DownloadAppendPayload = payload(raw)?;
                Self::DownloadAppend {
                    id: p.id.into(),
                    name: p.name,
                    size: p.size,
                }
            }
            DOWNLOAD_QUEUE_PROGRESS => {
                let p: ProgressPayload = payload(raw)?;
                Self::DownloadProgress {
                    id: p.id.into(),
                    offset: p.offset,
                }
            }
            // the payload is the bare id
            DOWNLOAD_QUEUE_DONE => {
                let id: String = payload(raw)?;
                Self::DownloadDone { id: id.into() }
            }
            other => return Err(EventDecodeError::UnknownEvent(other.to_string())),
        };
        Ok(event)
    }

    /// Wire form of this event, as an engine adapter would emit it
    pub fn to_raw(&self) -> RawEvent {
        let (name, payload) = match self {
            Self::UploadAppend { id, title, size } => (
                UPLOAD_QUEUE_APPEND,
                serde_json::json!({ "id": id, "title": title, "size": size }),
            ),
            Self::UploadProgress { id, offset } => (
                UPLOAD_QUEUE_PROGRESS,
                serde_json::json!({ "id": id, "offset": offset }),
            ),
            Self::UploadAllDone { id } => {
                (UPLOAD_QUEUE_ALL_DONE, serde_json::json!({ "id": id }))
            }
            Self::DownloadAppend { id, name, size } => (
                DOWNLOAD_QUEUE_APPEND,
                serde_json::json!({ "id": id, "name": name, "size": size }),
            ),
            Self::DownloadProgress { id, offset } => (
                DOWNLOAD_QUEUE_PROGRESS,
                serde_json::json!({ "id": id, "offset": offset }),
            ),
            Self::DownloadDone { id } => (DOWNLOAD_QUEUE_DONE, serde_json::json!(id)),
        };
        RawEvent::new(name, payload)
    }

    pub fn engine_id(&self) -> &EngineId {
        match self {
            Self::UploadAppend { id, .. }
            | Self::UploadProgress { id, .. }
            | Self::UploadAllDone { id }
            | Self::DownloadAppend { id, .. }
            | Self::DownloadProgress { id, .. }
            | Self::DownloadDone { id } => id,
        }
    }
}

fn payload<T: DeserializeOwned>(raw: &RawEvent) -> Result<T, EventDecodeError> {
    serde_json::from_value(raw.payload.clone()).map_err(|e| EventDecodeError::MalformedPayload {
        event: raw.name.clone(),
        reason: e.to_string(),
    })
}
