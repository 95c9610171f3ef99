use std::collections::BTreeSet;
use std::sync::Arc;

use ability_content::{SandboxHost, standard_abilities};
use ability_core::{
    AbilityBehavior, AbilityBuilder, AbilityId, AbilityKind, ActorId, ActorSource, CastContext,
    ComputeError, Computed, ConfigSection, DeductionError, ResourceCost, ResourceKind,
    TargetContext, Vec3,
};
use ability_runtime::{
    AbilityEngine, AbilityQuery, CastOutcome, FAULT_MESSAGE, ImpactOutcome, Rejection, SortField,
};

const CASTER: ActorId = ActorId(1);
const GOBLIN: ActorId = ActorId(2);

struct Inert;

impl AbilityBehavior for Inert {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Instant
    }

    fn compute(&self, _ctx: &mut CastContext<'_>) -> Result<Computed, ComputeError> {
        Ok(Computed::Applied)
    }
}

struct Faulty;

impl AbilityBehavior for Faulty {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Instant
    }

    fn compute(&self, _ctx: &mut CastContext<'_>) -> Result<Computed, ComputeError> {
        Err(ComputeError::failed("arcane backlash"))
    }
}

struct Panicky;

impl AbilityBehavior for Panicky {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Instant
    }

    fn compute(&self, _ctx: &mut CastContext<'_>) -> Result<Computed, ComputeError> {
        panic!("behavior bug");
    }
}

/// Reports the caster's pools as full but loses every deduction race.
struct RacingActors {
    inner: Arc<SandboxHost>,
}

impl ActorSource for RacingActors {
    fn is_online(&self, actor: ActorId) -> bool {
        self.inner.is_online(actor)
    }

    fn level(&self, actor: ActorId) -> Option<u32> {
        self.inner.level(actor)
    }

    fn resource(&self, actor: ActorId, kind: ResourceKind) -> Option<u32> {
        self.inner.resource(actor, kind)
    }

    fn try_deduct(&self, _actor: ActorId, costs: &[ResourceCost]) -> Result<(), DeductionError> {
        let required = costs.first().map_or(0, |cost| cost.amount);
        Err(DeductionError::Insufficient {
            kind: ResourceKind::Mana,
            required,
            available: 0,
        })
    }
}

fn sandbox() -> Arc<SandboxHost> {
    let host = Arc::new(SandboxHost::new());
    host.add_player(CASTER, 10, Vec3::ZERO);
    host.add_creature(GOBLIN, Vec3::new(4.0, 0.0, 0.0), 30.0);
    host
}

fn standard_engine(host: Arc<SandboxHost>) -> AbilityEngine {
    AbilityEngine::builder()
        .host(host)
        .abilities(standard_abilities())
        .build()
        .expect("engine should build")
}

/// Steps the sandbox until the object collides with something.
fn fly_until_hit(host: &SandboxHost) -> (ability_core::ObjectHandle, ActorId) {
    for _ in 0..20 {
        if let Some(collision) = host.step().into_iter().next() {
            return (collision.handle, collision.entity);
        }
    }
    panic!("projectile never collided");
}

#[test]
fn fireball_cooldown_gates_recast_until_elapsed() {
    let host = sandbox();
    let engine = standard_engine(host.clone());
    let target = TargetContext::entity(GOBLIN);

    let first = engine.cast(CASTER, "fireball", target);
    assert!(matches!(first, CastOutcome::Deferred { .. }));

    let second = engine.cast(CASTER, "fireball", target);
    let reason = second.user_message().expect("second cast should be rejected");
    assert!(reason.contains("cooldown"), "unexpected reason: {reason}");

    engine.advance_millis(5000);
    let third = engine.cast(CASTER, "fireball", target);
    assert!(third.is_success());
    assert_eq!(
        host.resource(CASTER, ResourceKind::Mana),
        Some(SandboxHost::STARTING_MANA - 40)
    );
}

#[test]
fn query_sorts_by_name_then_limits() {
    let host = sandbox();
    let engine = AbilityEngine::builder()
        .host(host)
        .abilities(
            ["charlie", "alpha", "delta", "bravo", "echo"]
                .into_iter()
                .map(|id| AbilityBuilder::new(id, Inert).category("fire")),
        )
        .build()
        .expect("engine should build");

    let summaries = engine.query(
        &AbilityQuery::new()
            .category("fire")
            .sort_by(SortField::Name)
            .limit(2),
    );
    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "bravo"]);
}

#[test]
fn duplicate_impact_applies_damage_once() {
    let host = sandbox();
    let engine = standard_engine(host.clone());

    let outcome = engine.cast(CASTER, "fireball", TargetContext::entity(GOBLIN));
    assert!(matches!(outcome, CastOutcome::Deferred { .. }));

    let (handle, hit) = fly_until_hit(&host);
    assert_eq!(hit, GOBLIN);

    let first = engine.resolve_impact(handle, Some(hit));
    let second = engine.resolve_impact(handle, Some(hit));

    assert!(first.is_resolved());
    assert_eq!(second, ImpactOutcome::Stale);
    assert_eq!(host.damage_events(GOBLIN), 1);
    assert_eq!(host.object_count(), 0);
    assert_eq!(engine.active_projectiles(), 0);
    assert_eq!(engine.metrics().impacts(), 1);
}

#[test]
fn offline_owner_gets_no_attributed_damage() {
    let host = sandbox();
    let engine = standard_engine(host.clone());

    engine.cast(CASTER, "fireball", TargetContext::entity(GOBLIN));
    host.disconnect(CASTER);
    engine.on_disconnect(CASTER);

    let (handle, hit) = fly_until_hit(&host);
    let outcome = engine.resolve_impact(handle, Some(hit));

    assert_eq!(
        outcome,
        ImpactOutcome::Resolved {
            ability: AbilityId::new("fireball"),
            attributed: false,
        }
    );
    assert_eq!(host.damage_events(GOBLIN), 0);
}

#[test]
fn projectile_expires_without_impact() {
    let host = sandbox();
    let engine = standard_engine(host.clone());

    let outcome = engine.cast(CASTER, "fireball", TargetContext::direction(Vec3::new(0.0, 1.0, 0.0)));
    let CastOutcome::Deferred { handle, .. } = outcome else {
        panic!("fireball should launch, got {outcome:?}");
    };

    engine.advance(engine.framework_config().projectile_lifetime);

    assert_eq!(engine.active_projectiles(), 0);
    assert_eq!(host.object_count(), 0);
    assert_eq!(engine.resolve_impact(handle, None), ImpactOutcome::Stale);
}

#[test]
fn reload_is_idempotent() {
    let engine = standard_engine(sandbox());

    let first = engine.reload();
    let ids_after_first = engine.registry().ids();
    let second = engine.reload();

    assert_eq!(first.total, second.total);
    assert_eq!(ids_after_first, engine.registry().ids());
    assert_eq!(engine.registry().count(), 5);
}

#[test]
fn reload_picks_up_new_overrides() {
    let engine = standard_engine(sandbox());
    engine.set_config(ConfigSection::new().with("abilities.fireball.cooldown-ms", 1000));

    let report = engine.reload();

    assert!(report.defaulted.is_empty());
    let fireball = engine.registry().get("fireball").expect("fireball stays registered");
    assert_eq!(fireball.definition().cooldown_ticks(), 20);
}

#[test]
fn reload_restores_unregistered_ability() {
    let engine = standard_engine(sandbox());
    assert!(engine.unregister("fireball"));
    assert_eq!(engine.register(AbilityBuilder::new("blink", Inert)), Ok(true));
    assert!(!engine.registry().contains("fireball"));

    let report = engine.reload();

    assert_eq!(report.total, 5);
    assert!(engine.registry().contains("fireball"));
    assert!(!engine.registry().contains("blink"));
}

#[test]
fn register_then_unregister_restores_key_set() {
    let engine = standard_engine(sandbox());
    let before: BTreeSet<AbilityId> = engine.registry().ids().into_iter().collect();

    assert_eq!(engine.register(AbilityBuilder::new("blink", Inert)), Ok(true));
    assert!(engine.unregister("blink"));

    let after: BTreeSet<AbilityId> = engine.registry().ids().into_iter().collect();
    assert_eq!(before, after);
}

#[test]
fn lookup_returns_matching_id() {
    let engine = standard_engine(sandbox());
    for id in engine.registry().ids() {
        let instance = engine.registry().get(id.as_str()).expect("listed id resolves");
        assert_eq!(instance.id(), &id);
    }
}

#[test]
fn unknown_ability_is_rejected_without_telemetry() {
    let engine = standard_engine(sandbox());

    let outcome = engine.cast(CASTER, "meteor", TargetContext::none());

    assert_eq!(
        outcome.rejection(),
        Some(&Rejection::UnknownAbility("meteor".to_owned()))
    );
    assert_eq!(engine.metrics().failures(), 0);
}

#[test]
fn level_prerequisite_names_required_level() {
    let host = sandbox();
    host.set_level(CASTER, 2);
    let engine = standard_engine(host);

    let outcome = engine.cast(CASTER, "lightning-bolt", TargetContext::entity(GOBLIN));
    let reason = outcome.user_message().expect("low level cast is rejected");

    assert!(reason.contains("level 5"), "unexpected reason: {reason}");
    assert_eq!(engine.remaining_cooldown(CASTER, "lightning-bolt"), 0);
}

#[test]
fn lost_cost_race_stamps_no_cooldown() {
    let host = sandbox();
    let engine = AbilityEngine::builder()
        .actors(Arc::new(RacingActors { inner: host.clone() }))
        .world(host.clone())
        .effects(host.clone())
        .abilities(standard_abilities())
        .build()
        .expect("engine should build");

    let outcome = engine.cast(CASTER, "heal", TargetContext::none());

    assert!(matches!(
        outcome.rejection(),
        Some(Rejection::InsufficientResource { .. })
    ));
    assert_eq!(engine.remaining_cooldown(CASTER, "heal"), 0);
    assert_eq!(engine.metrics().failures(), 1);
    assert!(host.messages_for(CASTER).is_empty());
}

#[test]
fn compute_fault_keeps_cost_and_stamps_cooldown() {
    let host = sandbox();
    let engine = AbilityEngine::builder()
        .host(host.clone())
        .ability(
            AbilityBuilder::new("backfire", Faulty)
                .cost(ResourceKind::Mana, 10)
                .cooldown_ms(2000),
        )
        .ability(AbilityBuilder::new("glitch", Panicky))
        .build()
        .expect("engine should build");

    let outcome = engine.cast(CASTER, "backfire", TargetContext::none());
    assert!(matches!(outcome, CastOutcome::Faulted { .. }));
    assert_eq!(outcome.user_message().as_deref(), Some(FAULT_MESSAGE));
    assert_eq!(
        host.resource(CASTER, ResourceKind::Mana),
        Some(SandboxHost::STARTING_MANA - 10)
    );
    assert_eq!(engine.remaining_cooldown(CASTER, "backfire"), 2000);

    let panicked = engine.cast(CASTER, "glitch", TargetContext::none());
    assert!(matches!(panicked, CastOutcome::Faulted { .. }));
    assert_eq!(engine.metrics().failures(), 2);
}

#[test]
fn heal_restores_caster_and_messages() {
    let host = sandbox();
    let engine = standard_engine(host.clone());

    let outcome = engine.cast(CASTER, "heal", TargetContext::none());

    assert!(matches!(outcome, CastOutcome::Applied { .. }));
    assert_eq!(
        host.messages_for(CASTER),
        vec!["You feel rejuvenated.".to_owned()]
    );
}

#[test]
fn blizzard_channel_pulses_then_stops() {
    let host = sandbox();
    let engine = standard_engine(host.clone());

    let outcome = engine.cast(CASTER, "blizzard", TargetContext::none());
    assert!(matches!(outcome, CastOutcome::Channeling { .. }));

    engine.advance(200);

    assert_eq!(host.damage_events(GOBLIN), 5);
    assert_eq!(host.damage_events(CASTER), 0);
}

#[test]
fn shutdown_clears_everything() {
    let host = sandbox();
    let engine = standard_engine(host.clone());
    engine.cast(CASTER, "fireball", TargetContext::entity(GOBLIN));
    assert_eq!(host.object_count(), 1);

    engine.shutdown();

    assert_eq!(host.object_count(), 0);
    assert_eq!(engine.registry().count(), 0);
    assert!(engine.cooldowns().is_empty());
    assert_eq!(engine.pending_tasks(), 0);
}
