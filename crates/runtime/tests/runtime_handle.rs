use std::sync::Arc;
use std::time::Duration;

use ability_content::{SandboxHost, standard_abilities};
use ability_core::{ActorId, ConfigSection, TargetContext, Vec3};
use ability_runtime::{
    AbilityEngine, AbilityQuery, CastEvent, CastOutcome, EffectEvent, Event, RegistryEvent,
    Runtime, RuntimeConfig, RuntimeError, Topic,
};

const CASTER: ActorId = ActorId(1);
const GOBLIN: ActorId = ActorId(2);

fn sandbox() -> Arc<SandboxHost> {
    let host = Arc::new(SandboxHost::new());
    host.add_player(CASTER, 10, Vec3::ZERO);
    host.add_creature(GOBLIN, Vec3::new(4.0, 0.0, 0.0), 30.0);
    host
}

async fn manual_runtime(host: Arc<SandboxHost>) -> Runtime {
    Runtime::builder()
        .engine(
            AbilityEngine::builder()
                .host(host)
                .abilities(standard_abilities()),
        )
        .manual_clock()
        .build()
        .await
        .expect("runtime should start")
}

#[tokio::test]
async fn casts_are_applied_in_request_order() {
    let runtime = manual_runtime(sandbox()).await;
    let handle = runtime.handle();
    let mut casts = handle.subscribe(Topic::Cast);

    let first = handle
        .cast(CASTER, "heal", TargetContext::none())
        .await
        .expect("worker replies");
    let second = handle
        .cast(CASTER, "heal", TargetContext::none())
        .await
        .expect("worker replies");

    assert!(matches!(first, CastOutcome::Applied { .. }));
    assert!(second.rejection().is_some());

    let event = casts.recv().await.expect("cast event published");
    assert!(matches!(event, Event::Cast(CastEvent::Succeeded { .. })));
    let event = casts.recv().await.expect("cast event published");
    assert!(matches!(event, Event::Cast(CastEvent::Rejected { .. })));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn manual_advance_expires_cooldowns() {
    let runtime = manual_runtime(sandbox()).await;
    let handle = runtime.handle();

    handle
        .cast(CASTER, "heal", TargetContext::none())
        .await
        .expect("worker replies");
    assert_eq!(handle.remaining_cooldown(CASTER, "heal"), 8000);

    let now = handle.advance(160).await.expect("worker replies");

    assert_eq!(now.0, 160);
    assert_eq!(handle.remaining_cooldown(CASTER, "heal"), 0);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn impacts_travel_through_the_worker() {
    let host = sandbox();
    let runtime = manual_runtime(host.clone()).await;
    let handle = runtime.handle();
    let mut effects = handle.subscribe(Topic::Effect);

    handle
        .cast(CASTER, "fireball", TargetContext::entity(GOBLIN))
        .await
        .expect("worker replies");

    let collision = (0..20)
        .find_map(|_| host.step().into_iter().next())
        .expect("fireball reaches the goblin");
    let outcome = handle
        .resolve_impact(collision.handle, Some(collision.entity))
        .await
        .expect("worker replies");

    assert!(outcome.is_resolved());
    assert_eq!(host.damage_events(GOBLIN), 1);
    assert!(matches!(
        effects.recv().await,
        Ok(Event::Effect(EffectEvent::Launched { .. }))
    ));
    assert!(matches!(
        effects.recv().await,
        Ok(Event::Effect(EffectEvent::ImpactResolved { attributed: true, .. }))
    ));
    assert_eq!(handle.metrics().impacts, 1);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn reload_with_new_config_publishes_report() {
    let runtime = manual_runtime(sandbox()).await;
    let handle = runtime.handle();
    let mut registry_events = handle.subscribe(Topic::Registry);

    let config = ConfigSection::new().with("abilities.heal.cooldown-ms", "later");
    let report = handle.reload(Some(config)).await.expect("worker replies");

    assert_eq!(report.total, 5);
    assert_eq!(report.defaulted.len(), 1);
    let event = registry_events.recv().await.expect("reload event published");
    assert!(matches!(
        event,
        Event::Registry(RegistryEvent::Reloaded { total: 5, .. })
    ));

    let fire = handle
        .query(AbilityQuery::new().category("FIRE"))
        .await
        .expect("worker replies");
    assert_eq!(fire.len(), 1);
    assert_eq!(fire[0].id.as_str(), "fireball");

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn auto_tick_moves_the_clock() {
    let runtime = Runtime::builder()
        .engine(AbilityEngine::builder().host(sandbox()))
        .config(RuntimeConfig {
            tick_interval: Duration::from_millis(5),
            ..RuntimeConfig::default()
        })
        .build()
        .await
        .expect("runtime should start");
    let handle = runtime.handle();

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(handle.now().0 > 0);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn shutdown_tears_down_engine_and_closes_handles() {
    let host = sandbox();
    let runtime = manual_runtime(host.clone()).await;
    let handle = runtime.handle();
    handle
        .cast(CASTER, "fireball", TargetContext::entity(GOBLIN))
        .await
        .expect("worker replies");
    let engine = Arc::clone(runtime.engine());

    runtime.shutdown().await.expect("clean shutdown");

    assert!(engine.is_shut_down());
    assert_eq!(host.object_count(), 0);
    assert_eq!(handle.registry().count(), 0);
    let result = handle.cast(CASTER, "heal", TargetContext::none()).await;
    assert!(matches!(result, Err(RuntimeError::CommandChannelClosed)));
}

#[tokio::test]
async fn missing_host_fails_to_build() {
    let result = Runtime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingHost(_))));
}
