//! Stock special-effect handlers.
//!
//! The combat resolver dispatches skill tags blindly; these handlers give
//! the shipped content its meaning. Games can register more (or replace
//! these) before battle start.

use battle_core::{AggroEvent, EffectRegistry};

/// Registers the stock handlers into `registry`.
///
/// Tags:
/// - `provoke`: the caster taunts; queues a Taunt aggro event against the
///   target enemy (or every enemy when untargeted)
/// - `brv_drain`: the caster siphons a quarter of the target's brave pool
/// - `atb_slow`: knocks a quarter off the target's current gauge
pub fn register_default_effects(registry: &mut EffectRegistry) {
    registry.register("provoke", |ctx, _skill| {
        let mut event = AggroEvent::taunt(ctx.caster, 0.5).with_duration(3);
        if let Some(target) = ctx.target {
            event = event.with_target(target);
        }
        ctx.queued_aggro.push(event);
    });

    registry.register("brv_drain", |ctx, _skill| {
        let Some(target) = ctx.target else {
            return;
        };
        let stolen = match ctx.state.combatant_mut(target) {
            Some(victim) => {
                let stolen = victim.brv.current / 4;
                victim.brv.deplete(stolen);
                stolen
            }
            None => return,
        };
        if let Some(caster) = ctx.state.combatant_mut(ctx.caster) {
            caster.brv.gain(stolen);
        }
    });

    registry.register("atb_slow", |ctx, _skill| {
        let Some(target) = ctx.target else {
            return;
        };
        if let Some(victim) = ctx.state.combatant_mut(target) {
            victim.atb -= victim.atb / 4;
        }
    });
}
