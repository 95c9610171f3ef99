//! Scripted encounter played against the sandbox world.

use std::sync::Arc;

use ability_content::SandboxHost;
use ability_core::{ActorId, TargetContext, Vec3};
use ability_runtime::{AbilityQuery, CastOutcome, RuntimeHandle, SortField};
use anyhow::Result;
use tracing::{info, warn};

pub const MAGE: ActorId = ActorId(1);
pub const CLERIC: ActorId = ActorId(2);
pub const GOBLIN: ActorId = ActorId(100);
pub const OGRE: ActorId = ActorId(101);
pub const WOLF: ActorId = ActorId(102);

/// Populate the world with two players and a few creatures.
pub fn populate(host: &SandboxHost) {
    host.add_player(MAGE, 12, Vec3::ZERO);
    host.add_player(CLERIC, 3, Vec3::new(-2.0, 0.0, 1.0));
    host.add_creature(GOBLIN, Vec3::new(6.0, 0.0, 0.0), 20.0);
    host.add_creature(OGRE, Vec3::new(3.0, 0.0, 4.0), 60.0);
    host.add_creature(WOLF, Vec3::new(-5.0, 0.0, 6.0), 15.0);
}

/// Opening volley: every standard ability at least once, including the
/// rejections a player would hit.
pub async fn opening_casts(handle: &RuntimeHandle) -> Result<()> {
    let casts = [
        (MAGE, "fireball", TargetContext::entity(GOBLIN)),
        (MAGE, "fireball", TargetContext::entity(GOBLIN)),
        (MAGE, "homing-missile", TargetContext::direction(Vec3::new(0.0, 0.0, 1.0))),
        (MAGE, "lightning-bolt", TargetContext::entity(OGRE)),
        (CLERIC, "lightning-bolt", TargetContext::entity(WOLF)),
        (CLERIC, "heal", TargetContext::none()),
        (MAGE, "blizzard", TargetContext::entity(OGRE)),
        (MAGE, "meteor", TargetContext::none()),
    ];

    for (actor, ability, target) in casts {
        let outcome = handle.cast(actor, ability, target).await?;
        report(actor, ability, &outcome);
    }
    Ok(())
}

/// Step the world, forwarding every collision to the runtime.
///
/// In manual mode each step advances the runtime clock by one tick first.
pub async fn run_world(
    handle: &RuntimeHandle,
    host: &Arc<SandboxHost>,
    steps: u64,
    manual: bool,
    tick: std::time::Duration,
) -> Result<usize> {
    let mut impacts = 0;
    for _ in 0..steps {
        if manual {
            handle.advance(1).await?;
        } else {
            tokio::time::sleep(tick).await;
        }

        for collision in host.step() {
            let outcome = handle
                .resolve_impact(collision.handle, Some(collision.entity))
                .await?;
            if outcome.is_resolved() {
                impacts += 1;
            }
            info!(
                target: "sim",
                entity = %collision.entity,
                ?outcome,
                "projectile collided"
            );
        }
    }
    Ok(impacts)
}

/// Log the catalog sorted by cooldown.
pub async fn list_catalog(handle: &RuntimeHandle) -> Result<()> {
    let listing = handle
        .query(AbilityQuery::new().sort_by(SortField::Cooldown))
        .await?;
    for summary in listing {
        info!(
            target: "sim",
            id = %summary.id,
            name = %summary.display_name,
            category = %summary.category,
            cooldown_ms = summary.cooldown_ms,
            level = summary.level_requirement,
            tags = ?summary.tags,
            "catalog entry"
        );
    }

    let ranged = handle
        .query(AbilityQuery::new().tag("ranged").max_level(5))
        .await?;
    let ids: Vec<_> = ranged.iter().map(|summary| summary.id.to_string()).collect();
    info!(target: "sim", ?ids, "ranged abilities castable at level 5");
    Ok(())
}

fn report(actor: ActorId, ability: &str, outcome: &CastOutcome) {
    match outcome.user_message() {
        None => info!(target: "sim", %actor, ability, state = %outcome.state(), "cast"),
        Some(message) => warn!(target: "sim", %actor, ability, message, "cast failed"),
    }
}
