//! # Runtime
//!
//! Tokio runtime presets shared by every Sprout binary.
//!
//! * [`RuntimeConfig::high_performance`] for the HTTP server.
//! * [`RuntimeConfig::memory_efficient`] for small tools and sidecars.
//! * [`RuntimeConfig::default`] when nothing special is needed.
//!
//! Worker threads come from `TOKIO_WORKER_THREADS` when it holds a number in `1..=1024`,
//! otherwise from the available parallelism of the host.
//!
//! ## Example
//!
//! ```rust,ignore
//! #[sprout_runtime::main(high_performance)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use sprout_derive::main;

use anyhow::Context;
use std::num::NonZero;
use std::thread::available_parallelism;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const FALLBACK_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 1024;
const MIB: usize = 1024 * 1024;
const MIN_STACK_SIZE: usize = MIB;
const MAX_STACK_SIZE: usize = 16 * MIB;
const DEFAULT_THREAD_NAME: &str = "sprout-worker";

fn detected_worker_threads() -> usize {
    std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|n| (1..=MAX_WORKER_THREADS).contains(n))
        .unwrap_or_else(|| {
            available_parallelism().map_or(FALLBACK_WORKER_THREADS, NonZero::get)
        })
}

/// Knobs for the multi-threaded Tokio scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: detected_worker_threads(),
            stack_size: 3 * MIB,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            thread_keep_alive: Duration::from_secs(60),
        }
    }
}

impl RuntimeConfig {
    /// Preset for the HTTP server.
    #[must_use]
    pub fn high_performance() -> Self {
        Self {
            stack_size: 4 * MIB,
            thread_name: "sprout-hp".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
            ..Self::default()
        }
    }

    /// Preset for processes where footprint matters more than throughput.
    #[must_use]
    pub fn memory_efficient() -> Self {
        let base = Self::default();
        Self {
            worker_threads: (base.worker_threads / 2).max(1),
            stack_size: 2 * MIB,
            thread_name: "sprout-mem".to_owned(),
            thread_keep_alive: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub const fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = clamp_threads(threads);
        self
    }

    #[must_use]
    pub const fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = clamp_stack(bytes);
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.thread_name = if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name };
        self
    }

    #[must_use]
    pub const fn with_thread_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.thread_keep_alive = keep_alive;
        self
    }

    /// Re-applies every bound, for configs assembled by hand.
    fn normalized(&self) -> Self {
        self.clone()
            .with_worker_threads(self.worker_threads)
            .with_stack_size(self.stack_size)
            .with_thread_name(self.thread_name.clone())
    }
}

const fn clamp_threads(threads: usize) -> usize {
    if threads == 0 {
        1
    } else if threads > MAX_WORKER_THREADS {
        MAX_WORKER_THREADS
    } else {
        threads
    }
}

const fn clamp_stack(bytes: usize) -> usize {
    if bytes < MIN_STACK_SIZE {
        MIN_STACK_SIZE
    } else if bytes > MAX_STACK_SIZE {
        MAX_STACK_SIZE
    } else {
        bytes
    }
}

/// Builds a multi-threaded runtime with all drivers (I/O, time) enabled.
///
/// Out-of-range values in `config` are clamped rather than rejected.
///
/// # Errors
///
/// Returns an error if the OS refuses to spawn the worker threads.
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.normalized();
    debug!(config = ?config, "Building tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all()
        .build()
        .context("Failed to initialize tokio runtime")
}
