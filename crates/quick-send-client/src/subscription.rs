// SPDX-License-Identifier: AGPL-3.0
// Quick Send Client - Engine event subscription

use async_channel::Receiver;
use quick_send_core::RawEvent;

/// Live subscription to the engine's push events.
///
/// Dropping it closes the channel, so the engine side sees the
/// subscriber gone no matter how teardown happened.
#[derive(Debug)]
pub struct EventSubscription {
    events: Receiver<RawEvent>,
}

impl EventSubscription {
    pub fn new(events: Receiver<RawEvent>) -> Self {
        tracing::info!("Subscribed to engine events");
        Self { events }
    }

    /// Next event, or None once the engine stopped publishing
    pub async fn recv(&self) -> Option<RawEvent> {
        self.events.recv().await.ok()
    }

    /// An event that is already waiting, without blocking
    pub fn try_recv(&self) -> Option<RawEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.events.close();
        tracing::info!("Unsubscribed from engine events");
    }
}
