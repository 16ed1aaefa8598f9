// SPDX-License-Identifier: AGPL-3.0
// Quick Send Client - Queue synchronization task
//
// One task owns the EventRouter. It applies engine events and user intents
// in arrival order and publishes a fresh snapshot after every change.
// Before an intent is applied, every event already delivered is routed, so
// an intent never overtakes events that arrived ahead of it.
// Readers only ever see snapshots.

use crate::subscription::EventSubscription;
use async_channel::{Receiver, Sender};
use quick_send_core::{AppError, EventRouter, LocalHandle, QueueSnapshot, TransferItem};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// User-initiated queue changes, applied by the same owner as engine events
#[derive(Debug)]
enum QueueIntent {
    RemoveUpload {
        handle: LocalHandle,
        reply: Sender<Option<TransferItem>>,
    },
    ClearDownloads {
        reply: Sender<()>,
    },
}

impl QueueIntent {
    fn name(&self) -> &'static str {
        match self {
            Self::RemoveUpload { .. } => "remove_upload",
            Self::ClearDownloads { .. } => "clear_downloads",
        }
    }
}

/// Handle to the running queue task
pub struct QueueSync {
    intent_tx: Sender<QueueIntent>,
    snapshots: watch::Receiver<QueueSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl QueueSync {
    /// Start routing events from `subscription`. Must be called from within a Tokio runtime.
    pub fn spawn(subscription: EventSubscription) -> Self {
        Self::spawn_with(EventRouter::new(), subscription)
    }

    pub fn spawn_with(router: EventRouter, subscription: EventSubscription) -> Self {
        let (intent_tx, intent_rx) = async_channel::unbounded();
        let (snapshot_tx, snapshots) = watch::channel(router.snapshot());

        let task = tokio::spawn(Self::run(router, subscription, intent_rx, snapshot_tx));

        Self {
            intent_tx,
            snapshots,
            task: Some(task),
        }
    }

    async fn run(
        mut router: EventRouter,
        subscription: EventSubscription,
        intent_rx: Receiver<QueueIntent>,
        snapshot_tx: watch::Sender<QueueSnapshot>,
    ) {
        let mut listening = true;

        loop {
            tokio::select! {
                biased;

                intent = intent_rx.recv() => {
                    // events delivered before the intent are applied first
                    if let Ok(intent) = &intent {
                        Self::catch_up(
                            &mut router,
                            &subscription,
                            &snapshot_tx,
                            intent.name(),
                        );
                    }
                    match intent {
                        Ok(QueueIntent::RemoveUpload { handle, reply }) => {
                            let removed = router.remove_upload(handle);
                            if removed.is_some() {
                                snapshot_tx.send_replace(router.snapshot());
                            }
                            let _ = reply.send(removed).await;
                        }
                        Ok(QueueIntent::ClearDownloads { reply }) => {
                            router.clear_downloads();
                            snapshot_tx.send_replace(router.snapshot());
                            let _ = reply.send(()).await;
                        }
                        Err(_) => break,
                    }
                }
                event = subscription.recv(), if listening => {
                    match event {
                        Some(raw) => {
                            if router.route(&raw).is_mutation() {
                                snapshot_tx.send_replace(router.snapshot());
                            }
                        }
                        None => {
                            tracing::info!("Engine stopped publishing events");
                            listening = false;
                        }
                    }
                }
            }
        }

        tracing::debug!("Queue task stopped");
    }

    /// Route every event already waiting on the subscription
    fn catch_up(
        router: &mut EventRouter,
        subscription: &EventSubscription,
        snapshot_tx: &watch::Sender<QueueSnapshot>,
        before: &str,
    ) {
        let mut routed = 0usize;
        let mut changed = false;
        while let Some(raw) = subscription.try_recv() {
            changed |= router.route(&raw).is_mutation();
            routed += 1;
        }
        if routed > 0 {
            tracing::trace!("Routed {} waiting events before {}", routed, before);
        }
        if changed {
            snapshot_tx.send_replace(router.snapshot());
        }
    }

    /// Latest published state of both queues
    pub fn snapshot(&self) -> QueueSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified on every published change
    pub fn watch(&self) -> watch::Receiver<QueueSnapshot> {
        self.snapshots.clone()
    }

    /// Remove an upload by handle; returns the removed item, if there was one
    pub async fn remove_upload(&self, handle: LocalHandle) -> Result<Option<TransferItem>, AppError> {
        let (reply_tx, reply_rx) = async_channel::bounded(1);
        self.intent_tx
            .send(QueueIntent::RemoveUpload {
                handle,
                reply: reply_tx,
            })
            .await
            .map_err(|_| AppError::Disconnected)?;
        reply_rx.recv().await.map_err(|_| AppError::Disconnected)
    }

    /// Empty the download queue; resolves once the empty state is published
    pub async fn clear_downloads(&self) -> Result<(), AppError> {
        let (reply_tx, reply_rx) = async_channel::bounded(1);
        self.intent_tx
            .send(QueueIntent::ClearDownloads { reply: reply_tx })
            .await
            .map_err(|_| AppError::Disconnected)?;
        reply_rx.recv().await.map_err(|_| AppError::Disconnected)
    }

    /// Stop routing and release the event subscription
    pub async fn shutdown(mut self) {
        self.intent_tx.close();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for QueueSync {
    fn drop(&mut self) {
        // the task exits on its next turn and drops the subscription
        self.intent_tx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_send_core::EngineEvent;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn wait_until(
        sync: &QueueSync,
        check: impl FnMut(&QueueSnapshot) -> bool,
    ) -> QueueSnapshot {
        let mut rx = sync.watch();
        let snapshot = timeout(Duration::from_secs(2), rx.wait_for(check))
            .await
            .expect("timed out waiting for snapshot")
            .expect("queue task stopped")
            .clone();
        snapshot
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let (tx, rx) = async_channel::unbounded();
        let sync = QueueSync::spawn(EventSubscription::new(rx));

        let events = [
            EngineEvent::DownloadAppend {
                id: "a".into(),
                name: "a.txt".to_string(),
                size: 1000,
            },
            EngineEvent::DownloadProgress {
                id: "a".into(),
                offset: 400,
            },
            EngineEvent::DownloadProgress {
                id: "a".into(),
                offset: 1000,
            },
        ];
        for event in events {
            tx.send(event.to_raw()).await.unwrap();
        }

        let snapshot = wait_until(&sync, |s| s.downloads_complete()).await;
        assert_eq!(snapshot.downloads.len(), 1);
        assert_eq!(snapshot.downloads[0].transferred_bytes(), 1000);
    }

    #[tokio::test]
    async fn test_remove_upload_through_owner() {
        let (tx, rx) = async_channel::unbounded();
        let sync = QueueSync::spawn(EventSubscription::new(rx));

        tx.send(
            EngineEvent::UploadAppend {
                id: "/tmp/a".into(),
                title: "a".to_string(),
                size: 5,
            }
            .to_raw(),
        )
        .await
        .unwrap();

        let snapshot = wait_until(&sync, |s| !s.uploads.is_empty()).await;
        let handle = snapshot.uploads[0].handle();

        let removed = sync.remove_upload(handle).await.unwrap();
        assert!(removed.is_some());
        assert!(sync.snapshot().uploads.is_empty());
        assert!(sync.remove_upload(handle).await.unwrap().is_none());
    }

    fn download(id: &str) -> quick_send_core::RawEvent {
        EngineEvent::DownloadAppend {
            id: id.into(),
            name: id.to_string(),
            size: 10,
        }
        .to_raw()
    }

    fn download_ids(snapshot: &QueueSnapshot) -> Vec<String> {
        snapshot
            .downloads
            .iter()
            .map(|item| item.engine_id().as_str().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_clear_applies_after_waiting_events() {
        let (tx, rx) = async_channel::unbounded();
        let sync = QueueSync::spawn(EventSubscription::new(rx));

        tx.send(download("old-a")).await.unwrap();
        tx.send(download("old-b")).await.unwrap();
        sync.clear_downloads().await.unwrap();
        assert!(sync.snapshot().downloads.is_empty());

        tx.send(download("new")).await.unwrap();
        let snapshot = wait_until(&sync, |s| !s.downloads.is_empty()).await;
        assert_eq!(download_ids(&snapshot), vec!["new"]);
    }

    #[tokio::test]
    async fn test_reannounced_ids_start_over_after_clear() {
        let (tx, rx) = async_channel::unbounded();
        let sync = QueueSync::spawn(EventSubscription::new(rx));

        tx.send(download("a")).await.unwrap();
        tx.send(EngineEvent::DownloadDone { id: "a".into() }.to_raw())
            .await
            .unwrap();
        sync.clear_downloads().await.unwrap();

        tx.send(download("a")).await.unwrap();
        let snapshot = wait_until(&sync, |s| !s.downloads.is_empty()).await;
        assert_eq!(download_ids(&snapshot), vec!["a"]);
        assert_eq!(snapshot.downloads[0].transferred_bytes(), 0);
    }

    #[tokio::test]
    async fn test_remove_sees_completion_that_arrived_first() {
        let (tx, rx) = async_channel::unbounded();
        let sync = QueueSync::spawn(EventSubscription::new(rx));

        tx.send(
            EngineEvent::UploadAppend {
                id: "/tmp/a".into(),
                title: "a".to_string(),
                size: 5,
            }
            .to_raw(),
        )
        .await
        .unwrap();
        let handle = wait_until(&sync, |s| !s.uploads.is_empty()).await.uploads[0].handle();

        tx.send(EngineEvent::UploadAllDone { id: "/tmp/a".into() }.to_raw())
            .await
            .unwrap();
        let removed = sync.remove_upload(handle).await.unwrap().unwrap();
        assert!(removed.is_complete());
    }

    #[tokio::test]
    async fn test_shutdown_releases_subscription() {
        let (tx, rx) = async_channel::unbounded::<quick_send_core::RawEvent>();
        let sync = QueueSync::spawn(EventSubscription::new(rx));

        sync.shutdown().await;
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_intents_still_work_after_engine_stops() {
        let (tx, rx) = async_channel::unbounded::<quick_send_core::RawEvent>();
        let sync = QueueSync::spawn(EventSubscription::new(rx));
        drop(tx);

        sync.clear_downloads().await.unwrap();
        assert!(sync.snapshot().downloads.is_empty());
    }
}
