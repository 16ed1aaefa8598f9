// SPDX-License-Identifier: AGPL-3.0
// Quick Send Client - Transfer engine boundary
//
// The engine does the actual chunking, networking and addressing. This
// client only sees its request side (below) and its push-event channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Share ticket for the current send set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareCode {
    pub share_ticket: String,
}

/// Request side of the transfer engine.
///
/// Failures are plain descriptions supplied by the engine. Progress is never
/// returned from these calls; it arrives as push events, and the events a
/// request causes are pushed before that request resolves.
#[async_trait]
pub trait TransferEngine: Send + Sync {
    /// Start a download session for a share ticket.
    /// Resolves with a human-readable status once every file is written.
    async fn fetch_by_ticket(&self, ticket: &str) -> Result<String, String>;

    /// Share ticket covering everything in the send set
    async fn request_share_code(&self) -> Result<ShareCode, String>;

    /// Import a file into the send set. Resolves after the import finished.
    async fn add_file(&self, path: &Path) -> Result<(), String>;

    async fn remove_file(&self, path: &Path) -> Result<(), String>;
}
