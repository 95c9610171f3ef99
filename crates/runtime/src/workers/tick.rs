//! Tick worker that drives the [`AbilityEngine`] clock.
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), applies
//! them in arrival order, and advances the engine one tick per interval.

use std::sync::Arc;
use std::time::Duration;

use ability_core::{ActorId, ConfigSection, ObjectHandle, TargetContext, Tick};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::deferred::ImpactOutcome;
use crate::engine::AbilityEngine;
use crate::pipeline::CastOutcome;
use crate::registry::{AbilityQuery, AbilitySummary, ReloadReport};

/// Commands that can be sent to the tick worker
pub enum Command {
    /// Run a cast through the pipeline.
    Cast {
        actor: ActorId,
        ability: String,
        target: TargetContext,
        reply: oneshot::Sender<CastOutcome>,
    },
    /// Host collision callback.
    Impact {
        handle: ObjectHandle,
        hit: Option<ActorId>,
        reply: oneshot::Sender<ImpactOutcome>,
    },
    /// Actor left; purge its cooldowns.
    Disconnect {
        actor: ActorId,
        reply: oneshot::Sender<usize>,
    },
    /// Rebuild the catalog, optionally from a new configuration.
    Reload {
        config: Option<ConfigSection>,
        reply: oneshot::Sender<ReloadReport>,
    },
    /// Read-only catalog query.
    Query {
        query: AbilityQuery,
        reply: oneshot::Sender<Vec<AbilitySummary>>,
    },
    /// Manual clock advance.
    Advance {
        ticks: u64,
        reply: oneshot::Sender<Tick>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Cast { .. } => "Cast",
            Command::Impact { .. } => "Impact",
            Command::Disconnect { .. } => "Disconnect",
            Command::Reload { .. } => "Reload",
            Command::Query { .. } => "Query",
            Command::Advance { .. } => "Advance",
        }
    }
}

/// Background task owning the engine's main execution line.
pub struct TickWorker {
    engine: Arc<AbilityEngine>,
    command_rx: mpsc::Receiver<Command>,
    shutdown_rx: oneshot::Receiver<()>,
    /// `None` disables automatic ticking; time then moves only on
    /// [`Command::Advance`].
    tick_interval: Option<Duration>,
}

impl TickWorker {
    pub fn new(
        engine: Arc<AbilityEngine>,
        command_rx: mpsc::Receiver<Command>,
        shutdown_rx: oneshot::Receiver<()>,
        tick_interval: Option<Duration>,
    ) -> Self {
        Self {
            engine,
            command_rx,
            shutdown_rx,
            tick_interval,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        let period = self
            .tick_interval
            .unwrap_or(Duration::from_secs(3600))
            .max(Duration::from_millis(1));
        let auto_tick = self.tick_interval.is_some();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            target: "runtime::worker",
            auto_tick,
            period_ms = period.as_millis() as u64,
            "Tick worker started"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut self.shutdown_rx => break,
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                _ = ticker.tick(), if auto_tick => {
                    self.engine.advance(1);
                }
                else => break,
            }
        }

        debug!(target: "runtime::worker", tick = %self.engine.now(), "Tick worker stopped");
    }

    fn handle_command(&self, cmd: Command) {
        let name = cmd.name();
        let delivered = match cmd {
            Command::Cast {
                actor,
                ability,
                target,
                reply,
            } => reply
                .send(self.engine.cast(actor, &ability, target))
                .is_ok(),
            Command::Impact { handle, hit, reply } => reply
                .send(self.engine.resolve_impact(handle, hit))
                .is_ok(),
            Command::Disconnect { actor, reply } => {
                reply.send(self.engine.on_disconnect(actor)).is_ok()
            }
            Command::Reload { config, reply } => {
                if let Some(config) = config {
                    self.engine.set_config(config);
                }
                reply.send(self.engine.reload()).is_ok()
            }
            Command::Query { query, reply } => reply.send(self.engine.query(&query)).is_ok(),
            Command::Advance { ticks, reply } => {
                self.engine.advance(ticks);
                reply.send(self.engine.now()).is_ok()
            }
        };
        if !delivered {
            debug!(
                target: "runtime::worker",
                command = name,
                "Reply channel closed (caller dropped)"
            );
        }
    }
}
