//! Graceful HTTP server bootstrap.
//!
//! [`GracefulServer::run`] drives two tasks in a [`JoinSet`]:
//!
//! - the *watcher* waits for one [`StopEvent`]. An OS signal triggers a
//!   graceful shutdown (stop accepting, drain in-flight requests) and waits
//!   for the drain; [`StopEvent::ListenerExited`] returns immediately.
//! - the *listener* binds and serves. When it fails it reports
//!   [`StopEvent::ListenerExited`] so the watcher does not wait forever.
//!
//! The shutdown trigger is a oneshot sender consumed on use, so a run
//! shuts down at most once.

use crate::error::{ServerError, ServerResult};
use axum::Router;
use std::fmt;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, instrument};

/// OS signals that stop the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// SIGINT, usually Ctrl+C
    Interrupt,
    /// SIGTERM, sent by orchestrators
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Event ending a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopEvent {
    /// A signal asked for graceful shutdown
    Signal(Signal),
    /// The listener stopped on its own, nothing left to shut down
    ListenerExited,
}

/// Handle delivering stop signals to a running server.
#[derive(Debug, Clone)]
pub struct StopHandle {
    events: mpsc::Sender<StopEvent>,
}

impl StopHandle {
    /// Deliver `signal` as if the OS had sent it.
    ///
    /// Returns `false` when an event is already pending or the run is over.
    pub fn stop(&self, signal: Signal) -> bool {
        self.events.try_send(StopEvent::Signal(signal)).is_ok()
    }
}

enum Listen {
    Addr(String),
    Bound(TcpListener),
}

impl Listen {
    async fn bind(self) -> ServerResult<TcpListener> {
        match self {
            Self::Addr(addr) => TcpListener::bind(&addr)
                .await
                .map_err(|e| ServerError::bind(addr, e)),
            Self::Bound(listener) => Ok(listener),
        }
    }
}

enum Task {
    Watcher,
    Listener(ServerResult<()>),
}

/// HTTP server that drains in-flight requests on SIGINT or SIGTERM.
pub struct GracefulServer {
    listen: Listen,
    router: Router,
    events_tx: mpsc::Sender<StopEvent>,
    events_rx: mpsc::Receiver<StopEvent>,
    signals: Option<JoinHandle<()>>,
}

impl GracefulServer {
    /// Server binding `addr` when run.
    #[must_use]
    pub fn new(addr: impl Into<String>, router: Router) -> Self {
        Self::with_listen(Listen::Addr(addr.into()), router)
    }

    /// Server on an already bound listener.
    #[must_use]
    pub fn from_listener(listener: TcpListener, router: Router) -> Self {
        Self::with_listen(Listen::Bound(listener), router)
    }

    fn with_listen(listen: Listen, router: Router) -> Self {
        let (events_tx, events_rx) = mpsc::channel(1);
        Self {
            listen,
            router,
            events_tx,
            events_rx,
            signals: None,
        }
    }

    /// Handle for stopping the server from code.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            events: self.events_tx.clone(),
        }
    }

    /// Forward SIGINT and SIGTERM to this server.
    ///
    /// Interest is registered immediately, so signals arriving before
    /// [`GracefulServer::run`] are not lost. Must be called from within a
    /// Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Signal`] if the handlers cannot be installed.
    pub fn with_os_signals(mut self) -> ServerResult<Self> {
        self.signals = Some(forward_os_signals(self.events_tx.clone())?);
        Ok(self)
    }

    /// Serve until stopped.
    ///
    /// # Errors
    ///
    /// Returns the listener's error when it exits abnormally (bind or
    /// accept failure), or [`ServerError::Task`] if a task panics. A
    /// graceful shutdown returns `Ok(())`.
    #[instrument(skip_all)]
    pub async fn run(self) -> ServerResult<()> {
        let Self {
            listen,
            router,
            events_tx,
            events_rx,
            signals,
        } = self;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (drained_tx, drained_rx) = watch::channel(false);

        let mut tasks = JoinSet::new();
        tasks.spawn(async move {
            watch_stop_events(events_rx, shutdown_tx, drained_rx).await;
            Task::Watcher
        });
        tasks.spawn(async move {
            Task::Listener(serve(listen, router, events_tx, shutdown_rx, drained_tx).await)
        });

        let mut outcome = Ok(());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Task::Watcher | Task::Listener(Ok(()))) => {}
                Ok(Task::Listener(Err(e))) => outcome = Err(e),
                Err(e) => outcome = Err(ServerError::task(e.to_string())),
            }
        }

        if let Some(signals) = signals {
            signals.abort();
        }
        outcome
    }
}

/// Serve `router` on `addr` until SIGINT or SIGTERM, then drain and return.
///
/// # Errors
///
/// See [`GracefulServer::run`]; also [`ServerError::Signal`] when signal
/// handlers cannot be installed.
pub async fn listen_and_serve(addr: &str, router: Router) -> ServerResult<()> {
    info!(addr, "HTTP server address");
    GracefulServer::new(addr, router)
        .with_os_signals()?
        .run()
        .await
}

async fn watch_stop_events(
    mut events: mpsc::Receiver<StopEvent>,
    shutdown: oneshot::Sender<()>,
    mut drained: watch::Receiver<bool>,
) {
    match events.recv().await {
        Some(StopEvent::Signal(signal)) => {
            info!(%signal, "signal received");
            info!("graceful shutdown initiated");
            if shutdown.send(()).is_err() {
                debug!("listener already stopped");
            }
            if drained.wait_for(|done| *done).await.is_ok() {
                info!("graceful shutdown complete");
            }
        }
        Some(StopEvent::ListenerExited) | None => {
            debug!("listener exited, skipping graceful shutdown");
        }
    }
}

async fn serve(
    listen: Listen,
    router: Router,
    events: mpsc::Sender<StopEvent>,
    shutdown: oneshot::Receiver<()>,
    drained: watch::Sender<bool>,
) -> ServerResult<()> {
    let result = match listen.bind().await {
        Ok(listener) => {
            if let Ok(addr) = listener.local_addr() {
                info!(%addr, "HTTP server listening");
            }
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown.await;
                })
                .await
                .map_err(ServerError::Serve)
        }
        Err(e) => Err(e),
    };

    drained.send_replace(true);
    if let Err(e) = &result {
        error!(error = %e, "HTTP listener exited");
        let _ = events.try_send(StopEvent::ListenerExited);
    }
    result
}

#[cfg(unix)]
fn forward_os_signals(events: mpsc::Sender<StopEvent>) -> ServerResult<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt()).map_err(ServerError::Signal)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(ServerError::Signal)?;
    Ok(tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => Signal::Interrupt,
                Some(()) = terminate.recv() => Signal::Terminate,
                else => return,
            };
            if events.send(StopEvent::Signal(received)).await.is_err() {
                return;
            }
        }
    }))
}

#[cfg(not(unix))]
fn forward_os_signals(events: mpsc::Sender<StopEvent>) -> ServerResult<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if events
                .send(StopEvent::Signal(Signal::Interrupt))
                .await
                .is_err()
            {
                return;
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use std::time::Duration;

    fn router() -> Router {
        Router::new().route("/", get(|| async { "hello" }))
    }

    async fn local_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").await.unwrap()
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(Signal::Interrupt.to_string(), "SIGINT");
        assert_eq!(Signal::Terminate.to_string(), "SIGTERM");
    }

    #[tokio::test]
    async fn test_interrupt_returns_ok() {
        let server = GracefulServer::from_listener(local_listener().await, router());
        let handle = server.stop_handle();
        let run = tokio::spawn(server.run());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.stop(Signal::Interrupt));

        let result = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_signal_before_run_is_kept() {
        let server = GracefulServer::from_listener(local_listener().await, router());
        assert!(server.stop_handle().stop(Signal::Terminate));

        let result = tokio::time::timeout(Duration::from_secs(5), server.run())
            .await
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_stop_after_run_is_rejected() {
        let server = GracefulServer::from_listener(local_listener().await, router());
        let handle = server.stop_handle();
        assert!(handle.stop(Signal::Interrupt));
        server.run().await.unwrap();

        assert!(!handle.stop(Signal::Interrupt));
    }

    #[tokio::test]
    async fn test_bind_failure_is_returned() {
        let taken = local_listener().await;
        let addr = taken.local_addr().unwrap().to_string();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            GracefulServer::new(addr.clone(), router()).run(),
        )
        .await
        .unwrap();

        match result {
            Err(ServerError::Bind { addr: failed, .. }) => assert_eq!(failed, addr),
            other => panic!("expected bind error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signal_racing_listener_failure() {
        let taken = local_listener().await;
        let addr = taken.local_addr().unwrap().to_string();

        let server = GracefulServer::new(addr, router());
        assert!(server.stop_handle().stop(Signal::Interrupt));

        let result = tokio::time::timeout(Duration::from_secs(5), server.run())
            .await
            .unwrap();
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
