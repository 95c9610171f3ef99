//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing. Mutating requests travel to the
//! tick worker and are applied in request order between ticks; read-only
//! lookups go straight to the shared registry and metrics.
use std::collections::HashMap;
use std::sync::Arc;

use ability_core::{ActorId, ConfigSection, ObjectHandle, TargetContext, Tick};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::errors::{Result, RuntimeError};
use crate::deferred::ImpactOutcome;
use crate::engine::AbilityEngine;
use crate::events::{Event, EventBus, Topic};
use crate::pipeline::CastOutcome;
use crate::registry::{AbilityQuery, AbilityRegistry, AbilitySummary, ReloadReport};
use crate::telemetry::MetricsSnapshot;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    engine: Arc<AbilityEngine>,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, engine: Arc<AbilityEngine>) -> Self {
        Self { command_tx, engine }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Cast `ability` as `actor`.
    pub async fn cast(
        &self,
        actor: ActorId,
        ability: impl Into<String>,
        target: TargetContext,
    ) -> Result<CastOutcome> {
        let ability = ability.into();
        self.request(|reply| Command::Cast {
            actor,
            ability,
            target,
            reply,
        })
        .await
    }

    /// Forward a host collision callback.
    pub async fn resolve_impact(
        &self,
        handle: ObjectHandle,
        hit: Option<ActorId>,
    ) -> Result<ImpactOutcome> {
        self.request(|reply| Command::Impact { handle, hit, reply })
            .await
    }

    /// Purge an actor's cooldowns. Returns the number of records removed.
    pub async fn disconnect(&self, actor: ActorId) -> Result<usize> {
        self.request(|reply| Command::Disconnect { actor, reply })
            .await
    }

    /// Rebuild every ability, optionally swapping in a new configuration
    /// first.
    pub async fn reload(&self, config: Option<ConfigSection>) -> Result<ReloadReport> {
        self.request(|reply| Command::Reload { config, reply })
            .await
    }

    /// Filtered, sorted and limited catalog view, consistent with casts
    /// issued before it.
    pub async fn query(&self, query: AbilityQuery) -> Result<Vec<AbilitySummary>> {
        self.request(|reply| Command::Query { query, reply })
            .await
    }

    /// Advance the clock by `ticks` outside the worker's own ticker.
    /// Returns the new tick.
    pub async fn advance(&self, ticks: u64) -> Result<Tick> {
        self.request(|reply| Command::Advance { ticks, reply })
            .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Cast` - cast successes, rejections and faults
    /// - `Topic::Effect` - projectile launches and impacts
    /// - `Topic::Registry` - registrations, reloads and teardown
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.engine.event_bus().subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.engine.event_bus().subscribe_multiple(topics)
    }

    pub fn registry(&self) -> Arc<AbilityRegistry> {
        Arc::clone(self.engine.registry())
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.engine.metrics().snapshot()
    }

    /// Remaining cooldown in milliseconds at the current tick.
    pub fn remaining_cooldown(&self, actor: ActorId, ability: &str) -> u64 {
        self.engine.remaining_cooldown(actor, ability)
    }

    pub fn now(&self) -> Tick {
        self.engine.now()
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        self.engine.event_bus()
    }
}
