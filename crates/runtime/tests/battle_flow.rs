use std::time::Duration;

use async_trait::async_trait;

use battle_core::{
    BattleAction, BattleState, BattleView, CombatantId, CombatantStats, EffectRegistry, Role,
    Side, Victor,
};
use runtime::{ActionProvider, BattleEvent, BattleLoop, ChannelProvider, Result, RuntimeConfig};

fn spec(
    name: &str,
    class: &str,
    side: Side,
    attack: u32,
    defense: u32,
    speed: u32,
    hp_max: u32,
) -> battle_content::CombatantSpec {
    battle_content::CombatantSpec {
        name: name.into(),
        class: class.into(),
        side,
        attack,
        defense,
        speed,
        int_brv: if side == Side::Ally { 200 } else { 50 },
        max_brv: if side == Side::Ally { 2000 } else { 600 },
        hp_max,
        mp_max: 150,
    }
}

/// Builds a deliberately lopsided battle: two strong allies against two
/// frail enemies, so the ally side always wins.
fn lopsided_state() -> BattleState {
    battle_content::assemble_battle(
        20260806,
        &[
            spec("Aria", "Black Mage", Side::Ally, 400, 80, 140, 2000),
            spec("Theo", "Paladin", Side::Ally, 300, 120, 110, 2500),
        ],
        &[
            spec("Ghoul", "Fiend", Side::Enemy, 30, 10, 90, 300),
            spec("Wisp", "Bard", Side::Enemy, 25, 5, 80, 250),
        ],
    )
}

fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        tick_hz: 120,
        ticks_per_advance: 4,
        ..RuntimeConfig::default()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// End-to-End Battle Scenario Test
///
/// Simulates a complete battle from start to finish:
/// 1. Loop starts with two allies and two enemies, AI on both sides
/// 2. Gauges tick, turns are offered, BRV chips grow the pools
/// 3. HP attacks cash pools in until one side is wiped
/// 4. Verify the victor, the end event, and that turns actually flowed
#[tokio::test]
async fn test_complete_battle_scenario() {
    init_tracing();
    let mut battle = BattleLoop::builder()
        .config(fast_config())
        .state(lopsided_state())
        .effects({
            let mut effects = EffectRegistry::new();
            battle_content::register_default_effects(&mut effects);
            effects
        })
        .ai_allies()
        .start()
        .expect("loop should start");

    let handle = battle.handle();
    let mut events = handle.subscribe_events();

    let summary = tokio::time::timeout(Duration::from_secs(30), battle.run())
        .await
        .expect("battle should finish inside the timeout")
        .expect("battle should run to completion");

    assert_eq!(summary.victor, Some(Victor::Allies));
    assert!(summary.clock.0 > 0, "the scheduler clock should have advanced");

    // The bus must have carried turn offers, resolutions, and the ending.
    let mut saw_turn_ready = false;
    let mut saw_resolution = false;
    let mut saw_ended = false;
    loop {
        match events.try_recv() {
            Ok(BattleEvent::TurnReady { .. }) => saw_turn_ready = true,
            Ok(BattleEvent::ActionResolved { .. }) => saw_resolution = true,
            Ok(BattleEvent::BattleEnded { victor }) => {
                saw_ended = true;
                assert_eq!(victor, Some(Victor::Allies));
            }
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(_) => break,
        }
    }
    assert!(saw_turn_ready, "no TurnReady event was published");
    assert!(saw_resolution, "no ActionResolved event was published");
    assert!(saw_ended, "no BattleEnded event was published");

    battle.shutdown().await.expect("clean shutdown");
}

/// A provider that always tries to run away.
struct AlwaysFlee;

#[async_trait]
impl ActionProvider for AlwaysFlee {
    async fn provide_action(&self, actor: CombatantId, _view: &BattleView) -> Result<BattleAction> {
        Ok(BattleAction::new(actor, battle_core::BattleActionKind::Flee))
    }
}

#[tokio::test]
async fn test_flee_ends_the_battle_without_a_victor() {
    init_tracing();
    // A fast ally that keeps attempting to flee will eventually succeed;
    // success ends the battle with no winner.
    let mut state = BattleState::with_seed(99);
    state.spawn(
        "Runner",
        Side::Ally,
        Role::Dps,
        CombatantStats::new(10, 200, 200, 10, 500),
        5000,
        100,
    );
    state.spawn(
        "Slug",
        Side::Enemy,
        Role::Dps,
        CombatantStats::new(5, 200, 40, 10, 500),
        5000,
        100,
    );

    let mut battle = BattleLoop::builder()
        .config(fast_config())
        .state(state)
        .ally_provider(AlwaysFlee)
        .start()
        .expect("loop should start");

    let summary = tokio::time::timeout(Duration::from_secs(30), battle.run())
        .await
        .expect("flee should land inside the timeout")
        .expect("battle should run");

    assert_eq!(summary.victor, None, "fleeing has no victor");
    battle.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn test_cast_time_skill_resolves_over_ticks() {
    init_tracing();
    // The ally opens with Meteor (a cast-time skill from the content
    // registry), then drinks a Potion. The cast must enter the casting
    // state, survive the enemy's feeble chip attacks, and complete.
    let skills = battle_content::SkillRegistry::load().expect("skill data should parse");
    let items = battle_content::ItemRegistry::load().expect("item data should parse");
    let meteor = skills.get("Meteor").clone();
    let potion = items.get("Potion").clone();

    // The victim regenerates no BRV, so the cast's chip stays observable.
    let mut slug = spec("Slug", "Fiend", Side::Enemy, 1, 5, 60, 2000);
    slug.int_brv = 0;
    let state = battle_content::assemble_battle(
        424242,
        &[spec("Aria", "Black Mage", Side::Ally, 400, 200, 140, 3000)],
        &[slug],
    );
    let caster = state.alive_on(Side::Ally).next().unwrap().id;
    let victim = state.alive_on(Side::Enemy).next().unwrap().id;

    let mut battle = BattleLoop::builder()
        .config(fast_config())
        .state(state)
        .ally_provider(runtime::ScriptedProvider::new([
            BattleAction::use_skill(caster, meteor, &[victim]),
            BattleAction::use_item(caster, potion, caster),
        ]))
        .start()
        .expect("loop should start");

    let handle = battle.handle();
    let mut events = handle.subscribe_events();

    let driver = tokio::spawn(async move {
        let _ = battle.run().await;
        battle
    });

    let observed = tokio::time::timeout(Duration::from_secs(30), async {
        let mut started = false;
        loop {
            match events.recv().await {
                Ok(BattleEvent::CastStarted { caster: c }) if c == caster => started = true,
                Ok(BattleEvent::CastCompleted { caster: c }) if c == caster => break started,
                Ok(_) => continue,
                Err(e) => panic!("event bus closed early: {e}"),
            }
        }
    })
    .await
    .expect("the cast should start and complete inside the timeout");

    assert!(observed, "CastCompleted arrived without a CastStarted first");

    // The stored skill landed on the stored target: its pool is pinned at
    // zero (no regeneration, no gain on its feeble attacks).
    let view = handle.snapshot().await.expect("snapshot");
    let slug_view = view.combatant(victim).unwrap();
    assert_eq!(slug_view.brv.0, 0, "Meteor should have emptied the victim's pool");

    driver.abort();
}

#[tokio::test]
async fn test_gauges_keep_advancing_while_the_player_deliberates() {
    init_tracing();
    // The human provider never answers. Gauges must still advance (the
    // ticker keeps running under the symmetric throttle), and the enemy
    // crossing the ready line must interrupt the pending menu.
    let mut state = BattleState::with_seed(7);
    state.spawn(
        "Hero",
        Side::Ally,
        Role::Dps,
        // Much faster than the enemy: the hero is offered a turn first.
        CombatantStats::new(100, 50, 180, 100, 1000),
        1000,
        100,
    );
    state.spawn(
        "Ogre",
        Side::Enemy,
        Role::Dps,
        CombatantStats::new(50, 50, 90, 100, 1000),
        1000,
        100,
    );

    let (provider, _decision_tx) = ChannelProvider::new(4);
    let mut battle = BattleLoop::builder()
        .config(fast_config())
        .state(state)
        .ally_provider(provider)
        .start()
        .expect("loop should start");

    let handle = battle.handle();
    let mut events = handle.subscribe_events();

    let driver = tokio::spawn(async move {
        let _ = battle.run().await;
        battle
    });

    // Wait for the menu interrupt to come over the bus.
    let interrupted = tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            match events.recv().await {
                Ok(BattleEvent::DecisionInterrupted { actor, by }) => break (actor, by),
                Ok(_) => continue,
                Err(e) => panic!("event bus closed early: {e}"),
            }
        }
    })
    .await
    .expect("the enemy becoming ready should interrupt the menu");

    let (actor, by) = interrupted;
    let view = handle.snapshot().await.expect("snapshot");
    assert_eq!(view.combatant(actor).unwrap().side, Side::Ally);
    assert_eq!(view.combatant(by).unwrap().side, Side::Enemy);

    // Gauges advanced while the decision was pending.
    assert!(view.clock.0 > 0);

    driver.abort();
}
