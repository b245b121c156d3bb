//! Debt amortizer — countdown and maturity of fixed-term instruments.
//!
//! Interest is charged by the ledger while an instrument is outstanding.
//! On maturity the principal comes off both `debt` (floored at zero) and
//! `treasury` (unclamped; a negative treasury is repayment stress).

use crate::{
    effect::{ActionEffect, EffectDelta},
    rng::TickRng,
    state::WorldState,
    subsystem::{StageScratch, TickStage},
};
use serde_json::json;

#[derive(Default)]
pub struct DebtSubsystem;

impl DebtSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl TickStage for DebtSubsystem {
    fn name(&self) -> &'static str { "debt" }

    fn run(
        &self,
        world: &mut WorldState,
        _scratch: &mut StageScratch,
        _rng: &mut TickRng,
    ) -> Vec<ActionEffect> {
        let Some(instruments) = world.debt_instruments.take() else {
            return Vec::new();
        };

        let mut outstanding = Vec::with_capacity(instruments.len());
        let mut effects = Vec::new();

        for mut instrument in instruments {
            instrument.remaining_weeks = instrument.remaining_weeks.saturating_sub(1);
            if instrument.remaining_weeks > 0 {
                outstanding.push(instrument);
                continue;
            }

            let repaid = match world.nations.get_mut(&instrument.nation_id) {
                Some(nation) => {
                    let debt_before = nation.debt;
                    nation.reduce_debt(instrument.principal);
                    nation.treasury =
                        nation.treasury.saturating_sub(instrument.principal.round() as i64);
                    Some((debt_before, nation.debt, nation.treasury))
                }
                None => {
                    log::warn!(
                        "debt instrument '{}': nation '{}' missing, repayment skipped",
                        instrument.instrument_id,
                        instrument.nation_id
                    );
                    None
                }
            };

            effects.push(ActionEffect::new(
                EffectDelta::DebtMatured {
                    nation_id:     instrument.nation_id.clone(),
                    instrument_id: instrument.instrument_id.clone(),
                    principal:     instrument.principal,
                },
                json!({
                    "interest_rate_annual": instrument.interest_rate_annual,
                    "debt_before":          repaid.map(|r| r.0),
                    "debt_after":           repaid.map(|r| r.1),
                    "treasury_after":       repaid.map(|r| r.2),
                }),
            ));
        }

        log::debug!(
            "debt: {} matured, {} outstanding",
            effects.len(),
            outstanding.len()
        );
        world.debt_instruments = Some(outstanding);
        effects
    }
}
