// SPDX-License-Identifier: AGPL-3.0
// Quick Send Client - Engine Bridge
//
// Serves gateway commands against a TransferEngine and forwards the
// engine's push events to a single subscriber. A reply is released only
// after the events queued ahead of it have been forwarded.

use crate::engine::TransferEngine;
use crate::gateway::{CommandGateway, EngineCommand};
use crate::subscription::EventSubscription;
use async_channel::{Receiver, Sender, TryRecvError};
use quick_send_core::{AppSettings, RawEvent};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Delivers a served command's result to its caller
type Reply = Box<dyn FnOnce() + Send>;

/// Bridge between the client and an async transfer engine
pub struct EngineBridge {
    command_tx: Sender<EngineCommand>,
    event_rx: Mutex<Option<Receiver<RawEvent>>>,
    task: JoinHandle<()>,
}

impl EngineBridge {
    /// Start serving `engine`. Must be called from within a Tokio runtime.
    pub fn new(
        engine: Arc<dyn TransferEngine>,
        engine_events: Receiver<RawEvent>,
        settings: &AppSettings,
    ) -> Self {
        let (command_tx, command_rx) =
            async_channel::bounded::<EngineCommand>(settings.command_capacity.max(1));
        let (event_tx, event_rx) =
            async_channel::bounded::<RawEvent>(settings.event_capacity.max(1));

        let task = tokio::spawn(Self::run_engine(
            engine,
            command_rx,
            engine_events,
            event_tx,
        ));

        Self {
            command_tx,
            event_rx: Mutex::new(Some(event_rx)),
            task,
        }
    }

    async fn run_engine(
        engine: Arc<dyn TransferEngine>,
        command_rx: Receiver<EngineCommand>,
        engine_events: Receiver<RawEvent>,
        event_tx: Sender<RawEvent>,
    ) {
        let (done_tx, done_rx) = async_channel::unbounded::<Reply>();
        let mut forwarding = true;

        loop {
            tokio::select! {
                cmd = command_rx.recv() => {
                    match cmd {
                        // long requests such as a fetch must not hold up the others
                        Ok(cmd) => {
                            let engine = engine.clone();
                            let done_tx = done_tx.clone();
                            tokio::spawn(async move {
                                let reply = Self::serve(engine.as_ref(), cmd).await;
                                let _ = done_tx.send(reply).await;
                            });
                        }
                        Err(_) => break,
                    }
                }
                reply = done_rx.recv() => {
                    if let Ok(reply) = reply {
                        Self::flush(&engine_events, &event_tx, &mut forwarding).await;
                        reply();
                    }
                }
                event = engine_events.recv(), if forwarding => {
                    match event {
                        Ok(event) => {
                            Self::forward(event, &engine_events, &event_tx, &mut forwarding).await
                        }
                        Err(_) => Self::stop_forwarding(&event_tx, &mut forwarding),
                    }
                }
            }
        }

        // requests already being served still get their replies
        drop(done_tx);
        while let Ok(reply) = done_rx.recv().await {
            Self::flush(&engine_events, &event_tx, &mut forwarding).await;
            reply();
        }

        tracing::debug!("Engine bridge stopped");
    }

    /// Forward every engine event that is already queued
    async fn flush(
        engine_events: &Receiver<RawEvent>,
        event_tx: &Sender<RawEvent>,
        forwarding: &mut bool,
    ) {
        while *forwarding {
            match engine_events.try_recv() {
                Ok(event) => {
                    Self::forward(event, engine_events, event_tx, forwarding).await
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => Self::stop_forwarding(event_tx, forwarding),
            }
        }
    }

    async fn forward(
        event: RawEvent,
        engine_events: &Receiver<RawEvent>,
        event_tx: &Sender<RawEvent>,
        forwarding: &mut bool,
    ) {
        if event_tx.send(event).await.is_err() {
            tracing::info!("Event subscriber gone, no longer forwarding engine events");
            engine_events.close();
            *forwarding = false;
        }
    }

    fn stop_forwarding(event_tx: &Sender<RawEvent>, forwarding: &mut bool) {
        tracing::info!("Engine event channel closed");
        event_tx.close();
        *forwarding = false;
    }

    /// Run one command against the engine. The reply is handed back to the
    /// bridge loop rather than sent here, so it cannot overtake the events
    /// the engine pushed while serving it.
    async fn serve(engine: &dyn TransferEngine, command: EngineCommand) -> Reply {
        match command {
            EngineCommand::FetchByTicket { ticket, reply } => {
                let result = engine.fetch_by_ticket(&ticket).await;
                if let Err(e) = &result {
                    tracing::error!("Fetch failed: {}", e);
                }
                Box::new(move || {
                    let _ = reply.try_send(result);
                })
            }
            EngineCommand::RequestShareCode { reply } => {
                let result = engine.request_share_code().await;
                if let Err(e) = &result {
                    tracing::error!("Share code request failed: {}", e);
                }
                Box::new(move || {
                    let _ = reply.try_send(result);
                })
            }
            EngineCommand::AddFile { path, reply } => {
                let result = engine.add_file(&path).await;
                if let Err(e) = &result {
                    tracing::error!("Adding {:?} failed: {}", path, e);
                }
                Box::new(move || {
                    let _ = reply.try_send(result);
                })
            }
            EngineCommand::RemoveFile { path, reply } => {
                let result = engine.remove_file(&path).await;
                if let Err(e) = &result {
                    tracing::error!("Removing {:?} failed: {}", path, e);
                }
                Box::new(move || {
                    let _ = reply.try_send(result);
                })
            }
        }
    }

    pub fn gateway(&self) -> CommandGateway {
        CommandGateway::new(self.command_tx.clone())
    }

    /// Take the engine event subscription (can only be called once)
    pub fn subscribe(&self) -> Option<EventSubscription> {
        self.event_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .map(EventSubscription::new)
    }

    /// Stop accepting commands. Requests already being served still complete.
    pub async fn shutdown(self) {
        self.command_tx.close();
        let _ = self.task.await;
    }
}
