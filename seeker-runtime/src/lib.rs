//! Runtime wrapper for the `seeker` binary.
//!
//! A run interleaves every concurrent step on one thread, so the runtime is
//! a current-thread Tokio runtime. A shared [`CancellationToken`] lets the
//! binary abort an in-flight run (e.g. on Ctrl-C) and shut down cleanly.
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;

pub struct SeekerRuntime {
    runtime: Runtime,
    cancel: Arc<CancellationToken>,
}

impl SeekerRuntime {
    /// Build a single-threaded runtime with all drivers enabled.
    ///
    /// ```
    /// use seeker_runtime::SeekerRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = SeekerRuntime::build("doctest-runtime").expect("runtime builds");
    /// let value = runtime.run_until_ctrl_c(|_| async { 2 + 2 });
    /// assert_eq!(value, 4);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build(thread_name: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .thread_name(thread_name)
            .build()?;
        let cancel = Arc::new(CancellationToken::new());
        Ok(Self { runtime, cancel })
    }

    /// Run `fut`, cancelling the shared token when the process receives
    /// Ctrl-C. `fut` is expected to observe the token and wind down itself.
    ///
    /// ```
    /// use seeker_runtime::SeekerRuntime;
    ///
    /// let runtime = SeekerRuntime::build("ctrl-c-example").unwrap();
    /// let out = runtime.run_until_ctrl_c(|_cancel| async { "finished" });
    /// assert_eq!(out, "finished");
    /// ```
    pub fn run_until_ctrl_c<F, Fut>(&self, f: F) -> Fut::Output
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future,
    {
        let token = self.cancel.as_ref().clone();
        let watcher = self.cancel.clone();
        self.runtime.block_on(async move {
            let watch = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!(target: "runtime", "interrupt received; cancelling run");
                    watcher.cancel();
                }
            });
            let out = f(token).await;
            watch.abort();
            out
        })
    }

    /// Cancel outstanding work and shut the runtime down.
    ///
    /// ```
    /// use seeker_runtime::SeekerRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = SeekerRuntime::build("shutdown-example").unwrap();
    /// runtime.shutdown(Duration::from_millis(5));
    /// ```
    pub fn shutdown(self, graceful: Duration) {
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}
