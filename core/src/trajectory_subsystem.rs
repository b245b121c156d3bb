//! Trajectory modifier accumulator — expiry of timed growth biases.
//!
//! Each modifier loses one week; modifiers reaching zero are dropped
//! without an effect. Modifiers installed by this tick's resolutions
//! join afterwards with their full duration. Summation into each
//! nation's combined trajectory happens in the ledger.

use crate::{
    effect::ActionEffect,
    rng::TickRng,
    state::WorldState,
    subsystem::{StageScratch, TickStage},
};

#[derive(Default)]
pub struct TrajectorySubsystem;

impl TrajectorySubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl TickStage for TrajectorySubsystem {
    fn name(&self) -> &'static str { "trajectory" }

    fn run(
        &self,
        world: &mut WorldState,
        scratch: &mut StageScratch,
        _rng: &mut TickRng,
    ) -> Vec<ActionEffect> {
        let before = world.trajectory_modifiers.len();
        world.trajectory_modifiers.retain_mut(|modifier| {
            modifier.remaining_weeks = modifier.remaining_weeks.saturating_sub(1);
            modifier.remaining_weeks > 0
        });
        let expired = before - world.trajectory_modifiers.len();
        let installed = scratch.fresh_modifiers.len();
        world.trajectory_modifiers.append(&mut scratch.fresh_modifiers);

        log::debug!(
            "trajectory: {expired} expired, {installed} installed, {} active",
            world.trajectory_modifiers.len()
        );
        Vec::new()
    }
}
