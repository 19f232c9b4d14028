//! # Event Routing
//!
//! Bus events are dispatched through a topic lookup table. Every matching
//! handler runs in its own task, so a slow federation call in one handler
//! never delays another or the publisher.
//!
//! ```text
//! Orchestrator ──HubConnected──────────┐
//! Platform ─────RewardReportCompleted──┼──▶ EventRouter ──▶ AutoSendHandler
//! Platform ─────PortalConfigUpdated────┤        │      ──▶ CardSyncHandler
//! Auto-Send ────ReportSending/Sent/────┘        │      ──▶ ReportMetricsHandler
//!               SendFailed                      ▼
//!                                      one task per handler
//! ```

use super::handlers::EventHandler;
use shared_bus::{EventTopic, HubEvent, Subscription};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Topic lookup table.
#[derive(Default)]
pub struct EventRouter {
    routes: HashMap<EventTopic, Vec<Arc<dyn EventHandler>>>,
}

impl EventRouter {
    /// Empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route the handler's topics to it.
    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        for topic in handler.topics() {
            self.routes
                .entry(*topic)
                .or_default()
                .push(Arc::clone(&handler));
        }
        debug!(
            handler = handler.name(),
            topics = ?handler.topics(),
            "[hub-runtime] Event handler registered"
        );
    }

    /// Handlers receiving `event`: its topic first, then `All`.
    pub fn handlers_for(&self, event: &HubEvent) -> Vec<Arc<dyn EventHandler>> {
        [event.topic(), EventTopic::All]
            .iter()
            .filter_map(|topic| self.routes.get(topic))
            .flatten()
            .cloned()
            .collect()
    }

    /// Spawn one task per handler of `event`.
    pub fn dispatch(&self, event: HubEvent) -> Vec<JoinHandle<()>> {
        self.handlers_for(&event)
            .into_iter()
            .map(|handler| {
                let event = event.clone();
                tokio::spawn(async move {
                    debug!(handler = handler.name(), ?event, "[hub-runtime] Dispatching event");
                    handler.handle(event).await;
                })
            })
            .collect()
    }

    /// Dispatch events from `subscription` until shutdown or bus closure.
    ///
    /// In-flight handler tasks are not awaited on shutdown.
    pub async fn run(
        self: Arc<Self>,
        mut subscription: Subscription,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("[hub-runtime] Event router started");
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = subscription.recv() => match event {
                    Some(event) => {
                        self.dispatch(event);
                    }
                    None => break,
                },
            }
        }
        info!("[hub-runtime] Event router stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus};
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        topics: &'static [EventTopic],
        seen: Mutex<Vec<HubEvent>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn topics(&self) -> &'static [EventTopic] {
            self.topics
        }

        async fn handle(&self, event: HubEvent) {
            self.seen.lock().push(event);
        }
    }

    fn recorder(topics: &'static [EventTopic]) -> Arc<Recorder> {
        Arc::new(Recorder {
            topics,
            ..Recorder::default()
        })
    }

    #[tokio::test]
    async fn test_dispatch_by_topic() {
        let rewards = recorder(&[EventTopic::Rewards]);
        let everything = recorder(&[EventTopic::All]);
        let mut router = EventRouter::new();
        router.register(rewards.clone());
        router.register(everything.clone());

        for handle in router.dispatch(HubEvent::RewardReportCompleted { period_id: 4 }) {
            handle.await.unwrap();
        }
        for handle in router.dispatch(HubEvent::PortalConfigUpdated {
            setting: "name".into(),
        }) {
            handle.await.unwrap();
        }

        assert_eq!(
            *rewards.seen.lock(),
            vec![HubEvent::RewardReportCompleted { period_id: 4 }]
        );
        assert_eq!(everything.seen.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_unrouted_event_spawns_nothing() {
        let router = EventRouter::new();
        assert!(router
            .dispatch(HubEvent::RewardReportCompleted { period_id: 1 })
            .is_empty());
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let bus = InMemoryEventBus::new();
        let portal = recorder(&[EventTopic::Portal]);
        let mut router = EventRouter::new();
        router.register(portal.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(Arc::new(router).run(bus.subscribe(EventFilter::all()), shutdown_rx));
        bus.publish(HubEvent::PortalConfigUpdated {
            setting: "color".into(),
        })
        .await;

        for _ in 0..50 {
            if !portal.seen.lock().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(portal.seen.lock().len(), 1);

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
