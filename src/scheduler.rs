//! Fire-and-forget task queue.
//!
//! Work that consults the remote side (tracking flags, zones, submission) is
//! handed to a [`TaskQueue`] and never awaited by the event that triggered it.
//! Completion and failure are only observable through logging.
//!
//! - [`TokioTaskQueue`] spawns onto a tokio runtime; [`TokioTaskQueue::global`]
//!   uses a lazily built runtime that lives until the process exits.
//! - [`InlineTaskQueue`] runs each task to completion before `submit` returns,
//!   which makes outcomes deterministic in tests.

use futures::future::BoxFuture;
use log::{debug, warn};
use once_cell::sync::Lazy;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::{ReporterError, Result};

const RUNTIME_WORKER_THREADS: usize = 2;

/// A queue that accepts independent units of work.
pub trait TaskQueue: Send + Sync {
    /// Schedule `task`. No handle is returned and nothing waits on it.
    fn submit(&self, task: BoxFuture<'static, ()>);
}

/// App-lifetime runtime shared by every dispatcher in the process.
static APP_RUNTIME: Lazy<std::result::Result<Runtime, String>> = Lazy::new(|| {
    Builder::new_multi_thread()
        .worker_threads(RUNTIME_WORKER_THREADS)
        .thread_name("location-reporter")
        .enable_all()
        .build()
        .map_err(|e| {
            warn!("[TaskQueue] Failed to create tokio runtime: {}", e);
            e.to_string()
        })
});

/// Task queue backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTaskQueue {
    handle: Handle,
}

impl TokioTaskQueue {
    /// Spawn onto the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawn onto the runtime the caller is currently running in.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| ReporterError::RuntimeError {
                message: e.to_string(),
            })
    }

    /// Spawn onto the process-wide runtime, creating it on first use.
    pub fn global() -> Result<Self> {
        match &*APP_RUNTIME {
            Ok(runtime) => Ok(Self::new(runtime.handle().clone())),
            Err(message) => Err(ReporterError::RuntimeError {
                message: message.clone(),
            }),
        }
    }
}

impl TaskQueue for TokioTaskQueue {
    fn submit(&self, task: BoxFuture<'static, ()>) {
        // Dropping the JoinHandle detaches the task
        drop(self.handle.spawn(task));
    }
}

/// Task queue that runs each task on the calling thread before returning.
///
/// Must not be used with collaborators that need a tokio reactor (such as the
/// HTTP client); it is meant for deterministic tests and simple hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineTaskQueue;

impl TaskQueue for InlineTaskQueue {
    fn submit(&self, task: BoxFuture<'static, ()>) {
        debug!("[TaskQueue] Running task inline");
        futures::executor::block_on(task);
    }
}
