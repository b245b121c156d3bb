//! Relation drift — passive decay of every edge toward neutrality.
//!
//! The decayed score is truncated toward zero, so integer scores keep
//! moving until they reach 0 and never cross it.

use crate::{
    config::RelationConfig,
    effect::ActionEffect,
    rng::TickRng,
    state::WorldState,
    subsystem::{StageScratch, TickStage},
};

pub struct RelationSubsystem {
    config: RelationConfig,
}

impl RelationSubsystem {
    pub fn new(config: RelationConfig) -> Self {
        Self { config }
    }

    pub fn decay(&self, value: i32) -> i32 {
        (f64::from(value) * self.config.decay_factor).trunc() as i32
    }
}

impl TickStage for RelationSubsystem {
    fn name(&self) -> &'static str { "relations" }

    fn run(
        &self,
        world: &mut WorldState,
        _scratch: &mut StageScratch,
        _rng: &mut TickRng,
    ) -> Vec<ActionEffect> {
        let mut moved = 0usize;
        for edge in world.relations.iter_mut() {
            let next = self.decay(edge.value);
            if next != edge.value {
                moved += 1;
            }
            edge.set_value(next);
        }
        log::debug!("relations: {moved} of {} edges drifted", world.relations.len());
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_moves_toward_zero_without_crossing() {
        let stage = RelationSubsystem::new(RelationConfig::default());
        assert_eq!(stage.decay(100), 99);
        assert_eq!(stage.decay(-100), -99);
        assert_eq!(stage.decay(50), 49);
        assert_eq!(stage.decay(1), 0);
        assert_eq!(stage.decay(-1), 0);
        assert_eq!(stage.decay(0), 0);
    }

    #[test]
    fn factors_near_one_step_by_a_single_point() {
        for factor in [0.99, 0.995] {
            let stage = RelationSubsystem::new(RelationConfig { decay_factor: factor });
            for v in -100..=100 {
                assert_eq!(stage.decay(v), v - v.signum(), "factor {factor}, value {v}");
            }
        }
    }

    #[test]
    fn stronger_factor_decays_proportionally() {
        let stage = RelationSubsystem::new(RelationConfig { decay_factor: 0.9 });
        assert_eq!(stage.decay(100), 90);
        assert_eq!(stage.decay(-55), -49);
        assert_eq!(stage.decay(5), 4);
    }
}
