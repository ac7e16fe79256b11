//! Tokio event loop that owns a [`Retransmitter`] and reconnects for it.
//!
//! The engine itself is single-threaded and sans-IO; this driver is the
//! actor-mailbox adapter for async hosts. It serializes every entry point
//! inside one task: application commands arrive on an mpsc channel,
//! transport events on the stream the [`TransportFactory`] hands out, and
//! timer deadlines are slept on with `sleep_until`. After a transport loss
//! the driver waits the configured reconnect interval and asks the factory
//! for a fresh connection.

use std::time::Instant;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::core::constants::{CLOSE_CODE_ABNORMAL, CLOSE_CODE_NORMAL};
use crate::core::traits::{Payload, ReadyState, Transport, TransportEvent};
use crate::link::config::RetransmitterConfig;
use crate::link::retransmitter::{Event, Retransmitter};

/// Produces fresh transports for the driver.
///
/// Each call opens a new connection attempt and returns the endpoint
/// together with the event stream the host adapter extracts from it. The
/// returned transport may still be connecting; its open event arrives on
/// the stream.
pub trait TransportFactory: Send + 'static {
    /// Open a new connection attempt.
    fn connect(&mut self) -> (Box<dyn Transport>, mpsc::UnboundedReceiver<TransportEvent>);
}

impl<F> TransportFactory for F
where
    F: FnMut() -> (Box<dyn Transport>, mpsc::UnboundedReceiver<TransportEvent>) + Send + 'static,
{
    fn connect(&mut self) -> (Box<dyn Transport>, mpsc::UnboundedReceiver<TransportEvent>) {
        self()
    }
}

/// The driver task has shut down and the link is closed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("link driver has shut down")]
pub struct DriverClosed;

/// Commands from the application to the driver task.
#[derive(Debug)]
enum Command {
    Send(Payload),
    Close { code: u16, reason: String },
}

/// Handle for feeding the link.
///
/// Cloneable. Dropping every handle initiates an orderly shutdown.
#[derive(Debug, Clone)]
pub struct LinkHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl LinkHandle {
    /// Enqueue an application payload.
    pub fn send(&self, payload: impl Into<Payload>) -> Result<(), DriverClosed> {
        self.cmd_tx
            .send(Command::Send(payload.into()))
            .map_err(|_| DriverClosed)
    }

    /// Initiate orderly shutdown.
    pub fn close(&self, code: u16, reason: &str) -> Result<(), DriverClosed> {
        self.cmd_tx
            .send(Command::Close {
                code,
                reason: reason.to_string(),
            })
            .map_err(|_| DriverClosed)
    }
}

/// Receiver for application-visible link events.
#[derive(Debug)]
pub struct LinkEvents {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl LinkEvents {
    /// Receive the next event.
    ///
    /// Returns `None` once the final close event has been delivered and
    /// the driver task has ended.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Spawns the engine event loop.
pub struct LinkDriver;

impl LinkDriver {
    /// Spawn a driven link on the current tokio runtime.
    ///
    /// The factory is asked for the first transport immediately and again
    /// after every transport loss, `config.reconnect_interval` apart.
    pub fn spawn(
        config: RetransmitterConfig,
        factory: impl TransportFactory,
    ) -> (LinkHandle, LinkEvents) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(run(config, factory, cmd_rx, event_tx));

        (LinkHandle { cmd_tx }, LinkEvents { rx: event_rx })
    }
}

async fn run(
    config: RetransmitterConfig,
    mut factory: impl TransportFactory,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::UnboundedSender<Event>,
) {
    let mut engine = Retransmitter::new(config.clone());

    let (transport, mut transport_rx) = factory.connect();
    if let Err(err) = engine.use_transport_at(transport, Instant::now()) {
        tracing::error!(%err, "factory produced an unusable transport");
        engine.handle_close_at(CLOSE_CODE_ABNORMAL, "unusable transport", false, Instant::now());
    }

    let mut handle_gone = false;
    let mut transport_gone = false;
    let mut reconnect_at: Option<Instant> = None;

    loop {
        while let Some(event) = engine.poll_event() {
            // The application may have dropped its receiver; the link
            // still winds down through its own close handshake.
            let _ = event_tx.send(event);
        }
        if engine.ready_state() == ReadyState::Closed {
            break;
        }

        let timer = engine.next_deadline();

        tokio::select! {
            cmd = cmd_rx.recv(), if !handle_gone => match cmd {
                Some(Command::Send(payload)) => engine.send(payload),
                Some(Command::Close { code, reason }) => {
                    engine.close_at(code, &reason, Instant::now());
                }
                None => {
                    handle_gone = true;
                    engine.close_at(CLOSE_CODE_NORMAL, "", Instant::now());
                }
            },

            event = transport_rx.recv(), if !transport_gone => match event {
                Some(event) => {
                    let lost = matches!(event, TransportEvent::Closed { .. });
                    let _ = engine.handle_event_at(event, Instant::now());
                    if lost && engine.ready_state() != ReadyState::Closed {
                        reconnect_at = Some(Instant::now() + config.reconnect_interval);
                    }
                }
                None => {
                    transport_gone = true;
                    if reconnect_at.is_none() {
                        // Event stream ended without a close event.
                        engine.handle_close_at(
                            CLOSE_CODE_ABNORMAL,
                            "transport event stream ended",
                            false,
                            Instant::now(),
                        );
                        if engine.ready_state() != ReadyState::Closed {
                            reconnect_at = Some(Instant::now() + config.reconnect_interval);
                        }
                    }
                }
            },

            _ = sleep_opt(timer) => {
                if let Some(deadline) = timer {
                    engine.handle_timeout_at(deadline);
                }
            }

            _ = sleep_opt(reconnect_at) => {
                reconnect_at = None;
                let (transport, rx) = factory.connect();
                transport_rx = rx;
                transport_gone = false;
                if let Err(err) = engine.use_transport_at(transport, Instant::now()) {
                    tracing::error!(%err, "reconnect produced an unusable transport");
                }
            }
        }
    }

    while let Some(event) = engine.poll_event() {
        let _ = event_tx.send(event);
    }
    tracing::debug!("link driver finished");
}

/// Sleep until the deadline; pend forever when there is none.
async fn sleep_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending::<()>().await,
    }
}
