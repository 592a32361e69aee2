use tokio_util::sync::CancellationToken;

/// A single shutdown flag shared with the poll loop (SPEC_FULL.md §9):
/// the signal handler sets it, the loop observes it once per iteration.
/// No handler-level resource release happens here — the harness's own
/// loop is responsible for flushing the current batch before exiting.
#[derive(Clone, Default)]
pub struct ShutdownFlag(CancellationToken);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    pub fn is_set(&self) -> bool {
        self.0.is_cancelled()
    }

    pub fn set(&self) {
        self.0.cancel();
    }

    pub async fn wait(&self) {
        self.0.cancelled().await;
    }
}

/// Installs SIGINT/SIGTERM handlers that set `flag` and returns
/// immediately; mirrors the teacher's `shutdown_signal` future used to
/// drive `axum::serve`'s graceful shutdown, generalized to a flag rather
/// than a one-shot future since the batching loop polls it every cycle.
pub fn install_signal_handlers(flag: ShutdownFlag) {
    tokio::spawn(async move {
        let ctrl_c = async {
            let _ = tokio::signal::ctrl_c().await;
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
            _ = terminate => tracing::info!("received SIGTERM, shutting down"),
        }
        flag.set();
    });
}
