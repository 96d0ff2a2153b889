// src/shutdown.rs

//! Turning OS termination requests into a host shutdown.
//!
//! Signals are received on a small Tokio runtime owned by the host. The
//! listener task does nothing except call [`ShutdownHandle::request`], which
//! flips the running flag and wakes the run loop if it is blocked.

use std::fmt::Debug;

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::errors::{HostError, Result};
use crate::sched::ShutdownHandle;

/// Capability for delivering external shutdown requests.
pub trait ShutdownSource: Debug {
    /// Start delivering requests to `handle`. Delivery stops when the source
    /// is dropped.
    fn install(&mut self, handle: ShutdownHandle) -> Result<()>;
}

/// OS signals: SIGINT and SIGTERM on Unix; Ctrl+C, Ctrl+Break and console
/// close on Windows.
#[derive(Debug)]
pub struct OsSignals {
    runtime: Runtime,
}

impl OsSignals {
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("host-signals")
            .enable_all()
            .build()
            .map_err(|e| HostError::Signal(format!("building signal runtime: {e}")))?;
        Ok(Self { runtime })
    }
}

impl ShutdownSource for OsSignals {
    fn install(&mut self, handle: ShutdownHandle) -> Result<()> {
        // Register inside the runtime so registration errors surface here
        // instead of inside the spawned task.
        let listener = self.runtime.block_on(async { platform::Listener::register() })?;

        self.runtime.spawn(async move {
            let signal = listener.recv().await;
            debug!(signal, "termination signal received");
            handle.request();
        });
        Ok(())
    }
}

impl Drop for OsSignals {
    fn drop(&mut self) {
        debug!("stopping signal listener");
    }
}

#[cfg(unix)]
mod platform {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    use crate::errors::{HostError, Result};

    pub struct Listener {
        interrupt: Signal,
        terminate: Signal,
    }

    impl Listener {
        pub fn register() -> Result<Self> {
            let interrupt = signal(SignalKind::interrupt())
                .map_err(|e| HostError::Signal(format!("installing SIGINT handler: {e}")))?;
            let terminate = signal(SignalKind::terminate())
                .map_err(|e| HostError::Signal(format!("installing SIGTERM handler: {e}")))?;
            Ok(Self {
                interrupt,
                terminate,
            })
        }

        pub async fn recv(mut self) -> &'static str {
            tokio::select! {
                _ = self.interrupt.recv() => "SIGINT",
                _ = self.terminate.recv() => "SIGTERM",
            }
        }
    }
}

#[cfg(windows)]
mod platform {
    use tokio::signal::windows::{CtrlBreak, CtrlC, CtrlClose, ctrl_break, ctrl_c, ctrl_close};

    use crate::errors::{HostError, Result};

    pub struct Listener {
        ctrl_c: CtrlC,
        ctrl_break: CtrlBreak,
        ctrl_close: CtrlClose,
    }

    impl Listener {
        pub fn register() -> Result<Self> {
            let map = |what: &str, e: std::io::Error| {
                HostError::Signal(format!("installing {what} handler: {e}"))
            };
            Ok(Self {
                ctrl_c: ctrl_c().map_err(|e| map("Ctrl+C", e))?,
                ctrl_break: ctrl_break().map_err(|e| map("Ctrl+Break", e))?,
                ctrl_close: ctrl_close().map_err(|e| map("console close", e))?,
            })
        }

        pub async fn recv(mut self) -> &'static str {
            tokio::select! {
                _ = self.ctrl_c.recv() => "CTRL_C",
                _ = self.ctrl_break.recv() => "CTRL_BREAK",
                _ = self.ctrl_close.recv() => "CTRL_CLOSE",
            }
        }
    }
}

#[cfg(not(any(unix, windows)))]
mod platform {
    use crate::errors::Result;

    pub struct Listener;

    impl Listener {
        pub fn register() -> Result<Self> {
            Ok(Self)
        }

        pub async fn recv(self) -> &'static str {
            match tokio::signal::ctrl_c().await {
                Ok(()) => "CTRL_C",
                Err(e) => {
                    tracing::warn!(error = %e, "failed to listen for Ctrl+C");
                    std::future::pending().await
                }
            }
        }
    }
}

/// Source that never fires. Used when the caller owns the
/// [`ShutdownHandle`] itself, e.g. in tests or when embedding the host.
#[derive(Debug, Default)]
pub struct ManualShutdown;

impl ShutdownSource for ManualShutdown {
    fn install(&mut self, _handle: ShutdownHandle) -> Result<()> {
        Ok(())
    }
}
