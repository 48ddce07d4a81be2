//! The supervisor: runs a task with restart-on-error semantics. A task that
//! returns `Err` or panics is logged, the process sleeps `retry_delay`, and
//! the task is restarted from scratch unless `exit_on_error` is set, in
//! which case the supervisor itself returns so the caller can shut the
//! process down.
//!
//! Catching panics here (rather than letting one crash the whole binary)
//! relies on unwind-based panic propagation, which is why `contract/`'s
//! `panic = "abort"` release profile must never leak into this crate's
//! build graph (see the workspace root `Cargo.toml`).

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Runs `fut_factory()` in a loop, restarting it after `retry_delay` on
/// error or panic. Exits immediately (without restarting) once `shutdown` is
/// cancelled, or after the first failure if `exit_on_error` is set.
///
/// Each attempt runs on its own `tokio::spawn`'d task so a panic inside
/// `fut_factory()` is caught by the runtime's join handle rather than
/// unwinding into the supervisor itself.
pub async fn supervise<F, Fut>(
    name: &str,
    retry_delay: Duration,
    exit_on_error: bool,
    shutdown: CancellationToken,
    mut fut_factory: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    loop {
        if shutdown.is_cancelled() {
            tracing::info!(task = name, "shutting down");
            return;
        }

        let handle = tokio::spawn(fut_factory());

        match handle.await {
            Ok(Ok(())) => {
                tracing::info!(task = name, "task exited cleanly");
                return;
            }
            Ok(Err(err)) => {
                tracing::error!(task = name, error = %err, "task failed");
            }
            Err(join_err) if join_err.is_panic() => {
                tracing::error!(task = name, panic = %join_err, "task panicked");
            }
            Err(join_err) => {
                tracing::error!(task = name, error = %join_err, "task was cancelled");
                return;
            }
        }

        if exit_on_error {
            tracing::warn!(task = name, "exit_on_error set, not restarting");
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(retry_delay) => {}
            _ = shutdown.cancelled() => return,
        }
    }
}
