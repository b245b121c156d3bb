//! Stage trait.
//!
//! RULE: Every tick stage implements TickStage.
//! The engine calls run() on each registered stage in registration
//! order, every tick, against the same working copy and RNG stream.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    effect::ActionEffect,
    rng::TickRng,
    state::{TrajectoryModifier, WorldState},
};

/// Hand-off between stages of one tick. Dropped when the tick ends.
#[derive(Debug, Default)]
pub struct StageScratch {
    /// Modifiers installed by operation resolutions this tick.
    /// Joined to the world after the accumulator has decremented the
    /// existing ones, so a fresh modifier keeps its full duration.
    pub fresh_modifiers: Vec<TrajectoryModifier>,
}

/// The contract every stage must fulfill.
pub trait TickStage: Send {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `world`:   the tick's working copy, already mutated by earlier stages
    /// - `scratch`: values handed forward to later stages of this tick
    /// - `rng`:     the tick's single deterministic stream
    ///
    /// Returns the effects this stage produced, in emission order.
    fn run(
        &self,
        world: &mut WorldState,
        scratch: &mut StageScratch,
        rng: &mut TickRng,
    ) -> Vec<ActionEffect>;
}
