//! The tick engine — advances a world snapshot by one week.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Ledger & growth
//!   2. Operations
//!   3. Trajectory modifiers
//!   4. Debt instruments
//!   5. Relation drift
//!
//! RULES:
//!   - The caller's snapshot is never mutated; stages work on a clone.
//!   - All randomness flows through one TickRng derived from the context.
//!   - Stage order and intra-stage order are part of the replay contract.
//!   - A tick cannot fail; it always yields a complete next state.

use crate::{
    config::SimConfig,
    debt_subsystem::DebtSubsystem,
    effect::ActionEffect,
    error::{SimError, SimResult},
    ledger_subsystem::LedgerSubsystem,
    operation_subsystem::OperationSubsystem,
    relation_subsystem::RelationSubsystem,
    rng::TickRng,
    state::WorldState,
    subsystem::{StageScratch, TickStage},
    trajectory_subsystem::TrajectorySubsystem,
    types::{TurnIndex, TurnSeed},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the caller supplies alongside the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnContext {
    pub turn_index: TurnIndex,
    pub turn_seed:  TurnSeed,
    /// Wall-clock time of the request. Never read by any stage.
    pub now:        DateTime<Utc>,
}

impl TurnContext {
    /// Context matching the snapshot's own turn counter and seed.
    pub fn for_state(state: &WorldState, now: DateTime<Utc>) -> Self {
        Self {
            turn_index: state.turn_index,
            turn_seed:  state.turn_seed,
            now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub next_state: WorldState,
    pub effects:    Vec<ActionEffect>,
}

impl TickOutcome {
    pub fn effects_of_type<'a>(&'a self, effect_type: &'a str) -> impl Iterator<Item = &'a ActionEffect> {
        self.effects.iter().filter(move |e| e.effect_type == effect_type)
    }
}

pub struct TickEngine {
    stages: Vec<Box<dyn TickStage>>,
}

impl TickEngine {
    /// An engine with no stages. Ticks only advance the turn counter.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Build a fully wired engine with all stages registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: &SimConfig) -> Self {
        let mut engine = TickEngine::new();

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(Box::new(LedgerSubsystem::new(config.ledger.clone())));
        engine.register(Box::new(OperationSubsystem::new(config.operations.clone())));
        engine.register(Box::new(TrajectorySubsystem::new()));
        engine.register(Box::new(DebtSubsystem::new()));
        engine.register(Box::new(RelationSubsystem::new(config.relations.clone())));
        engine
    }

    /// Register a stage. Call in the documented execution order.
    pub fn register(&mut self, stage: Box<dyn TickStage>) {
        self.stages.push(stage);
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Advance one week. This is the core simulation step.
    pub fn tick(&self, state: &WorldState, ctx: &TurnContext) -> TickOutcome {
        let mut next_state = state.clone();
        let mut rng = TickRng::for_turn(ctx.turn_seed, ctx.turn_index);
        let mut scratch = StageScratch::default();
        let mut effects = Vec::new();

        for stage in &self.stages {
            let produced = stage.run(&mut next_state, &mut scratch, &mut rng);
            log::trace!(
                "turn={} stage={} effects={} draws={}",
                ctx.turn_index,
                stage.name(),
                produced.len(),
                rng.draws()
            );
            effects.extend(produced);
        }

        next_state.turn_index += 1;
        log::debug!(
            "turn {} -> {}: {} effects, seed {:#010x}",
            state.turn_index,
            next_state.turn_index,
            effects.len(),
            rng.seed()
        );

        TickOutcome { next_state, effects }
    }

    /// Like `tick`, but refuses a context whose turn does not match the snapshot.
    pub fn tick_checked(&self, state: &WorldState, ctx: &TurnContext) -> SimResult<TickOutcome> {
        if ctx.turn_index != state.turn_index {
            return Err(SimError::TurnMismatch {
                expected: state.turn_index,
                actual:   ctx.turn_index,
            });
        }
        Ok(self.tick(state, ctx))
    }

    /// Run `weeks` consecutive ticks from the snapshot's own turn and seed.
    /// Effects of every week are concatenated in order.
    pub fn run_weeks(&self, state: &WorldState, weeks: u64, now: DateTime<Utc>) -> TickOutcome {
        let mut current = state.clone();
        let mut effects = Vec::new();
        for _ in 0..weeks {
            let ctx = TurnContext::for_state(&current, now);
            let outcome = self.tick(&current, &ctx);
            current = outcome.next_state;
            effects.extend(outcome.effects);
        }
        TickOutcome { next_state: current, effects }
    }
}

impl Default for TickEngine {
    fn default() -> Self { Self::new() }
}

/// Advance `state` one week with the default rules.
pub fn tick_week(state: &WorldState, ctx: &TurnContext) -> TickOutcome {
    tick_week_with(state, ctx, &SimConfig::default())
}

/// Advance `state` one week with explicit balance constants.
pub fn tick_week_with(state: &WorldState, ctx: &TurnContext, config: &SimConfig) -> TickOutcome {
    TickEngine::build(config).tick(state, ctx)
}
