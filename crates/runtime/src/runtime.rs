//! High-level runtime orchestrator.
//!
//! The runtime owns the tick worker, wires up command/event channels, and
//! exposes a builder-based API for hosts that want the ability engine on its
//! own async task.

use std::sync::Arc;
use std::time::Duration;

use ability_core::TICK_MILLIS;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::engine::{AbilityEngine, AbilityEngineBuilder};
use crate::events::EventBus;
use crate::workers::{Command, TickWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Wall-clock duration of one engine tick.
    pub tick_interval: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Advance the clock automatically every `tick_interval` (default: true).
    /// When false, time only moves on explicit `advance` requests.
    pub auto_tick: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(TICK_MILLIS),
            event_buffer_size: 100,
            command_buffer_size: 32,
            auto_tick: true,
        }
    }
}

/// Async runtime around one [`AbilityEngine`].
///
/// Runtime owns the worker; [`RuntimeHandle`] provides a cloneable façade for
/// clients.
pub struct Runtime {
    handle: RuntimeHandle,
    engine: Arc<AbilityEngine>,
    shutdown_tx: oneshot::Sender<()>,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn engine(&self) -> &Arc<AbilityEngine> {
        &self.engine
    }

    /// Stop the worker, wait for it, then tear the engine down.
    ///
    /// Commands already queued but not yet picked up are dropped; their
    /// callers see [`RuntimeError::ReplyChannelClosed`].
    pub async fn shutdown(self) -> Result<()> {
        // The worker may already have exited; nothing to signal then.
        let _ = self.shutdown_tx.send(());

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;
        self.engine.shutdown();

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    engine: AbilityEngineBuilder,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            engine: AbilityEngine::builder(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Engine wiring (host, abilities, configuration, exporters).
    pub fn engine(mut self, engine: AbilityEngineBuilder) -> Self {
        self.engine = engine;
        self
    }

    /// Disable the automatic ticker; time then moves only on
    /// [`RuntimeHandle::advance`].
    pub fn manual_clock(mut self) -> Self {
        self.config.auto_tick = false;
        self
    }

    /// Build the engine and start the tick worker
    pub async fn build(self) -> Result<Runtime> {
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let engine = Arc::new(self.engine.event_bus(event_bus).build()?);

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let tick_interval = self.config.auto_tick.then_some(self.config.tick_interval);
        let worker = TickWorker::new(Arc::clone(&engine), command_rx, shutdown_rx, tick_interval);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, Arc::clone(&engine)),
            engine,
            shutdown_tx,
            worker_handle,
        })
    }
}
