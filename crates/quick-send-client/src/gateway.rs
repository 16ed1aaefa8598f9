// SPDX-License-Identifier: AGPL-3.0
// Quick Send Client - Command gateway
//
// Request/reply access to the engine. The gateway never touches the
// queues: whatever a request causes shows up later as push events.

use crate::engine::ShareCode;
use async_channel::Sender;
use quick_send_core::AppError;
use std::path::PathBuf;

/// Commands that can be sent to the engine
#[derive(Debug)]
pub enum EngineCommand {
    FetchByTicket {
        ticket: String,
        reply: Sender<Result<String, String>>,
    },
    RequestShareCode {
        reply: Sender<Result<ShareCode, String>>,
    },
    AddFile {
        path: PathBuf,
        reply: Sender<Result<(), String>>,
    },
    RemoveFile {
        path: PathBuf,
        reply: Sender<Result<(), String>>,
    },
}

impl EngineCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchByTicket { .. } => "fetch_by_ticket",
            Self::RequestShareCode { .. } => "request_share_code",
            Self::AddFile { .. } => "add_file",
            Self::RemoveFile { .. } => "remove_file",
        }
    }
}

/// Cloneable handle for issuing engine requests. No retries.
#[derive(Debug, Clone)]
pub struct CommandGateway {
    command_tx: Sender<EngineCommand>,
}

impl CommandGateway {
    pub fn new(command_tx: Sender<EngineCommand>) -> Self {
        Self { command_tx }
    }

    /// Start downloading everything behind `ticket`
    pub async fn fetch_by_ticket(&self, ticket: impl Into<String>) -> Result<String, AppError> {
        let ticket = ticket.into();
        self.request(|reply| EngineCommand::FetchByTicket { ticket, reply })
            .await
    }

    pub async fn request_share_code(&self) -> Result<ShareCode, AppError> {
        self.request(|reply| EngineCommand::RequestShareCode { reply })
            .await
    }

    pub async fn add_file(&self, path: impl Into<PathBuf>) -> Result<(), AppError> {
        let path = path.into();
        self.request(|reply| EngineCommand::AddFile { path, reply })
            .await
    }

    pub async fn remove_file(&self, path: impl Into<PathBuf>) -> Result<(), AppError> {
        let path = path.into();
        self.request(|reply| EngineCommand::RemoveFile { path, reply })
            .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Sender<Result<T, String>>) -> EngineCommand,
    ) -> Result<T, AppError> {
        let (reply_tx, reply_rx) = async_channel::bounded(1);
        let command = build(reply_tx);
        let name = command.name();

        self.command_tx
            .send(command)
            .await
            .map_err(|_| AppError::Disconnected)?;

        let result = reply_rx.recv().await.map_err(|_| AppError::Disconnected)?;
        result.map_err(|e| {
            tracing::warn!("Engine rejected {}: {}", name, e);
            AppError::Engine(e)
        })
    }
}
