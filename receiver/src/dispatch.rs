//! Background event dispatch.
//!
//! Decoded events are handed to a worker task over a queue. The worker runs
//! each handler on the blocking pool so that a slow or panicking handler is
//! isolated from the request path and from other deliveries.
//!
//! ## Flow
//!
//! ```text
//! Receiver → dispatch() → queue → worker → spawn_blocking(handler)
//! ```
//!
//! [`EventDispatcher::shutdown`] closes the queue and waits for every event
//! already accepted to reach its handler.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info};

use crate::error::WebhookError;
use crate::events::{parse_event, EventKind, EventPayload, WebhookEvent};

/// Type-erased event callback.
pub type Handler = Arc<dyn Fn(WebhookEvent) + Send + Sync>;

/// Mapping from event kind to at most one callback.
///
/// Kinds without a handler are ignored at dispatch time.
#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<EventKind, Handler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed handler for `E`, replacing any earlier one.
    pub fn on<E, F>(mut self, handler: F) -> Self
    where
        E: EventPayload,
        F: Fn(E) + Send + Sync + 'static,
    {
        let erased: Handler = Arc::new(move |event| {
            if let Some(payload) = E::from_event(event) {
                handler(payload);
            }
        });

        let kind = E::KIND;
        if self.handlers.insert(kind, erased).is_some() {
            debug!(event_type = %kind, "handler_replaced");
        }
        self
    }

    /// Register an untyped handler for `kind`, replacing any earlier one.
    #[cfg(test)]
    pub(crate) fn on_kind<F>(mut self, kind: EventKind, handler: F) -> Self
    where
        F: Fn(WebhookEvent) + Send + Sync + 'static,
    {
        self.handlers.insert(kind, Arc::new(handler));
        self
    }

    pub fn get(&self, kind: EventKind) -> Option<&Handler> {
        self.handlers.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// One accepted delivery waiting for its handler.
struct Job {
    event: WebhookEvent,
    delivery_id: Option<String>,
}

/// What a finished handler task reports back to the worker.
struct Finished {
    kind: EventKind,
    delivery_id: Option<String>,
    panicked: bool,
}

/// Decodes events and hands them to the background worker.
#[derive(Clone)]
pub struct EventDispatcher {
    queue: mpsc::UnboundedSender<Job>,
    closing: Arc<Notify>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl EventDispatcher {
    /// Start the dispatch worker on the current Tokio runtime.
    pub fn start(handlers: HandlerTable) -> Self {
        let (queue, jobs) = mpsc::unbounded_channel();
        let handlers = Arc::new(handlers);
        let closing = Arc::new(Notify::new());

        info!(registered_handlers = handlers.len(), "dispatcher_started");
        let worker = tokio::spawn(run_worker(handlers, jobs, closing.clone()));

        Self {
            queue,
            closing,
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    /// Decode `body` as `event_type` and queue it for its handler.
    ///
    /// Decoding happens here, before the caller responds. Handler execution
    /// happens later on the worker and never reports back.
    pub fn dispatch(
        &self,
        event_type: &str,
        body: &[u8],
        delivery_id: Option<String>,
    ) -> Result<EventKind, WebhookError> {
        let event = parse_event(event_type, body)?;
        let kind = event.kind();

        self.queue
            .send(Job { event, delivery_id })
            .map_err(|_| {
                error!(event_type = %kind, "dispatcher_queue_closed");
                WebhookError::DispatcherClosed
            })?;

        Ok(kind)
    }

    /// Stop accepting events and wait until every queued and running handler
    /// has finished.
    ///
    /// Later calls to [`dispatch`](EventDispatcher::dispatch) fail with
    /// [`WebhookError::DispatcherClosed`]. Calling this again is a no-op.
    pub async fn shutdown(&self) {
        let worker = self.worker.lock().await.take();
        let Some(worker) = worker else {
            return;
        };

        self.closing.notify_one();
        if let Err(e) = worker.await {
            error!(error = %e, "dispatcher_worker_failed");
        }
    }
}

async fn run_worker(
    handlers: Arc<HandlerTable>,
    mut jobs: mpsc::UnboundedReceiver<Job>,
    closing: Arc<Notify>,
) {
    let mut in_flight = JoinSet::new();
    let mut draining = false;

    loop {
        tokio::select! {
            job = jobs.recv() => match job {
                Some(job) => start_job(&handlers, &mut in_flight, job),
                None => break,
            },
            Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => {
                log_finished(finished);
            }
            _ = closing.notified(), if !draining => {
                draining = true;
                info!(in_flight = in_flight.len(), "dispatcher_draining");
                // Buffered jobs are still delivered; new sends are refused.
                jobs.close();
            }
        }
    }

    while let Some(finished) = in_flight.join_next().await {
        log_finished(finished);
    }

    info!("dispatcher_stopped");
}

fn start_job(handlers: &HandlerTable, in_flight: &mut JoinSet<Finished>, job: Job) {
    let kind = job.event.kind();
    let Some(handler) = route(handlers, kind) else {
        debug!(event_type = %kind, delivery_id = ?job.delivery_id, "event_ignored");
        return;
    };

    let Job { event, delivery_id } = job;
    in_flight.spawn_blocking(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(event)));
        Finished {
            kind,
            delivery_id,
            panicked: outcome.is_err(),
        }
    });
}

fn log_finished(finished: Result<Finished, JoinError>) {
    match finished {
        Ok(Finished { kind, delivery_id, panicked: false }) => {
            debug!(event_type = %kind, delivery_id = ?delivery_id, "handler_complete")
        }
        Ok(Finished { kind, delivery_id, panicked: true }) => {
            error!(event_type = %kind, delivery_id = ?delivery_id, "handler_panicked")
        }
        Err(e) => error!(error = %e, "handler_failed"),
    }
}

/// Pick the handler for `kind`. Every kind has an arm; absence of a handler
/// is a registration choice, not a routing gap.
fn route(handlers: &HandlerTable, kind: EventKind) -> Option<Handler> {
    handlers.get(kind).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PingEvent, PushEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_handler_table_registration() {
        let table = HandlerTable::new()
            .on(|_: PingEvent| {})
            .on(|_: PushEvent| {})
            .on(|_: PingEvent| {});

        assert_eq!(table.len(), 2);
        assert!(table.get(EventKind::Ping).is_some());
        assert!(table.get(EventKind::Push).is_some());
        assert!(table.get(EventKind::Release).is_none());
    }

    #[test]
    fn test_route_covers_every_kind() {
        let mut table = HandlerTable::new();
        for kind in EventKind::ALL {
            table = table.on_kind(*kind, |_| {});
        }
        for kind in EventKind::ALL {
            assert!(route(&table, *kind).is_some());
        }
    }

    #[tokio::test]
    async fn test_registered_handler_runs_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let table = HandlerTable::new().on(move |ping: PingEvent| {
            let _ = tx.send(ping.zen);
        });

        let dispatcher = EventDispatcher::start(table);
        let kind = dispatcher
            .dispatch("ping", br#"{"zen":"x"}"#, Some("delivery-1".into()))
            .unwrap();
        assert_eq!(kind, EventKind::Ping);

        let zen = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(zen.as_deref(), Some("x"));
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_unregistered_kind_is_ignored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let table = HandlerTable::new().on(move |_: PingEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let dispatcher = EventDispatcher::start(table);
        assert_eq!(
            dispatcher.dispatch("watch", br#"{"action":"started"}"#, None).unwrap(),
            EventKind::Watch
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_decode_failure_reported_before_queueing() {
        let dispatcher = EventDispatcher::start(HandlerTable::new());
        assert!(matches!(
            dispatcher.dispatch("unknown_event", b"{}", None),
            Err(WebhookError::Decode(_))
        ));
        assert!(matches!(
            dispatcher.dispatch("ping", b"not json", None),
            Err(WebhookError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_isolated() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let table = HandlerTable::new()
            .on(|_: PushEvent| panic!("handler bug"))
            .on(move |_: PingEvent| {
                let _ = tx.send(());
            });

        let dispatcher = EventDispatcher::start(table);
        dispatcher.dispatch("push", b"{}", None).unwrap();
        dispatcher.dispatch("ping", b"{}", None).unwrap();

        // The worker survives the panic and keeps dispatching.
        timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        dispatcher.dispatch("ping", b"{}", None).unwrap();
        timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_slow_handler_does_not_block_dispatch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let table = HandlerTable::new()
            .on(|_: PushEvent| std::thread::sleep(Duration::from_millis(500)))
            .on(move |_: PingEvent| {
                let _ = tx.send(());
            });

        let dispatcher = EventDispatcher::start(table);
        dispatcher.dispatch("push", b"{}", None).unwrap();
        dispatcher.dispatch("ping", b"{}", None).unwrap();

        timeout(Duration::from_millis(300), rx.recv()).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_drains_accepted_events() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let table = HandlerTable::new().on(move |_: PushEvent| {
            std::thread::sleep(Duration::from_millis(100));
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let dispatcher = EventDispatcher::start(table);
        for i in 0..5 {
            dispatcher.dispatch("push", b"{}", Some(format!("delivery-{i}"))).unwrap();
        }

        timeout(Duration::from_secs(5), dispatcher.shutdown()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 5);

        assert!(matches!(
            dispatcher.dispatch("push", b"{}", None),
            Err(WebhookError::DispatcherClosed)
        ));
        // Decode errors still take precedence over the closed queue.
        assert!(matches!(
            dispatcher.dispatch("nope", b"{}", None),
            Err(WebhookError::Decode(_))
        ));

        timeout(Duration::from_secs(1), dispatcher.shutdown()).await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_panicking_handler() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let table = HandlerTable::new()
            .on(|_: PushEvent| {
                std::thread::sleep(Duration::from_millis(50));
                panic!("handler bug");
            })
            .on(move |_: PingEvent| {
                let _ = tx.send(());
            });

        let dispatcher = EventDispatcher::start(table);
        dispatcher.dispatch("push", b"{}", None).unwrap();
        dispatcher.dispatch("ping", b"{}", None).unwrap();

        timeout(Duration::from_secs(5), dispatcher.shutdown()).await.unwrap();
        assert!(rx.try_recv().is_ok());
    }
}
