// SPDX-License-Identifier: AGPL-3.0
// Quick Send Client - Application controller
//
// Turns user actions into gateway requests. Queue contents are read from
// snapshots only; the sole queue changes made here are user intents
// (dismissing an upload, clearing downloads) handed to the queue task.

use crate::bridge::EngineBridge;
use crate::gateway::CommandGateway;
use crate::services::{Clipboard, FileDialog, Notification, Notifier};
use crate::sync::QueueSync;
use quick_send_core::{AppError, AppSettings, LocalHandle, QueueSnapshot};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

const FILE_DIALOG_TITLE: &str = "Select the files to be sent";

pub struct QuickSendApp {
    gateway: CommandGateway,
    queues: QueueSync,
    dialog: Arc<dyn FileDialog>,
    notifier: Arc<dyn Notifier>,
    settings: AppSettings,
    share_code: Mutex<Option<String>>,
    receiving: AtomicBool,
}

/// Clears the receiving flag however the receive ends
struct ReceivingGuard<'a>(&'a AtomicBool);

impl Drop for ReceivingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl QuickSendApp {
    /// Take the bridge's event subscription and start the queue task
    pub fn new(
        bridge: &EngineBridge,
        dialog: Arc<dyn FileDialog>,
        notifier: Arc<dyn Notifier>,
        settings: AppSettings,
    ) -> Result<Self, AppError> {
        settings.validate()?;
        let subscription = bridge.subscribe().ok_or(AppError::AlreadySubscribed)?;

        Ok(Self {
            gateway: bridge.gateway(),
            queues: QueueSync::spawn(subscription),
            dialog,
            notifier,
            settings,
            share_code: Mutex::new(None),
            receiving: AtomicBool::new(false),
        })
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.queues.snapshot()
    }

    pub fn watch(&self) -> watch::Receiver<QueueSnapshot> {
        self.queues.watch()
    }

    /// Pick files and add them to the send set.
    ///
    /// Each file is submitted on its own; a failed import is reported as a
    /// notification and does not affect the others. Returns how many paths
    /// were submitted.
    pub async fn select_files(&self) -> Result<usize, AppError> {
        let paths = self.dialog.pick_files(FILE_DIALOG_TITLE).await.into_paths();
        if paths.is_empty() {
            tracing::debug!("File selection cancelled");
            return Ok(0);
        }

        for path in &paths {
            self.spawn_add_file(path.clone());
        }

        self.request_share_code().await?;
        Ok(paths.len())
    }

    fn spawn_add_file(&self, path: PathBuf) {
        let gateway = self.gateway.clone();
        let notifier = self.notifier.clone();
        let timeout = self.settings.notification_timeout();

        tokio::spawn(async move {
            if let Err(e) = gateway.add_file(path).await {
                notifier.show(Notification::error(e.to_string(), timeout));
            }
        });
    }

    /// Ask the engine for a share ticket and remember it
    pub async fn request_share_code(&self) -> Result<String, AppError> {
        let code = self.gateway.request_share_code().await?;
        *self
            .share_code
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(code.share_ticket.clone());
        Ok(code.share_ticket)
    }

    /// The share ticket, once every queued upload has finished
    pub fn share_code(&self) -> Option<String> {
        if !self.queues.snapshot().uploads_complete() {
            return None;
        }
        self.share_code
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Copy the share ticket; returns false when there is none to show yet
    pub fn copy_share_code(&self, clipboard: &dyn Clipboard) -> Result<bool, AppError> {
        let Some(code) = self.share_code() else {
            return Ok(false);
        };
        clipboard.write_text(&code).map_err(AppError::Clipboard)?;
        self.notifier.show(Notification::success(
            "Copied to clipboard",
            self.settings.copy_notice(),
        ));
        Ok(true)
    }

    /// Dismiss a finished upload and drop its file from the send set
    pub async fn remove_upload(&self, handle: LocalHandle) -> Result<(), AppError> {
        let item = self
            .queues
            .snapshot()
            .upload(handle)
            .cloned()
            .ok_or_else(|| AppError::UnknownItem(handle.to_string()))?;
        if !item.is_complete() {
            return Err(AppError::TransferInProgress(item.label().to_string()));
        }

        self.queues.remove_upload(handle).await?;

        // the item is gone either way; a failure only leaves the file shared
        if let Err(e) = self
            .gateway
            .remove_file(PathBuf::from(item.engine_id().as_str()))
            .await
        {
            tracing::error!("Could not remove {} from the send set: {}", item.label(), e);
        }
        Ok(())
    }

    pub fn is_receiving(&self) -> bool {
        self.receiving.load(Ordering::SeqCst)
    }

    /// Download everything behind a share ticket into a fresh download queue
    pub async fn receive(&self, ticket: &str) -> Result<String, AppError> {
        if self.receiving.swap(true, Ordering::SeqCst) {
            return Err(AppError::ReceiveInProgress);
        }
        let _guard = ReceivingGuard(&self.receiving);

        self.queues.clear_downloads().await?;

        let timeout = self.settings.notification_timeout();
        let toast = self.notifier.show(Notification::loading("Downloading ..."));

        match self.gateway.fetch_by_ticket(ticket).await {
            Ok(message) => {
                self.notifier
                    .update(toast, Notification::success(message.clone(), timeout));
                Ok(message)
            }
            Err(e) => {
                self.notifier
                    .update(toast, Notification::error(e.to_string(), timeout));
                Err(e)
            }
        }
    }

    /// Stop routing engine events
    pub async fn shutdown(self) {
        self.queues.shutdown().await;
    }
}
