//! Ledger & growth subsystem — weekly national finance and macro drift.
//!
//! For every nation, in ascending id order:
//!   1. Revenue from GDP, tax rate, tax capacity and compliance
//!   2. Fixed costs (administration, military), debt service, operation spend
//!   3. Treasury update (unclamped, may go negative)
//!   4. GDP, population and literacy growth; one normal shock per nation
//!   5. Compliance and stability pressure from taxes and deficits
//!   6. Non-player nations only: decade-scale trajectory drift
//!
//! Reads the tick-start operation queue, modifiers and debt instruments;
//! every later stage runs after this one.

use crate::{
    config::LedgerConfig,
    effect::{ActionEffect, EffectDelta},
    rng::TickRng,
    state::{NationState, NationTrajectory, TrajectoryMetric, WorldState},
    subsystem::{StageScratch, TickStage},
    types::{NationId, WEEKS_PER_DECADE, WEEKS_PER_YEAR},
};
use serde_json::json;
use std::collections::BTreeMap;

/// `mil_cost` treats force_size in thousands of units.
const FORCE_UNIT_SCALE: f64 = 1000.0;

const TRAJECTORY_METRICS: [TrajectoryMetric; 4] = [
    TrajectoryMetric::GdpGrowthDecade,
    TrajectoryMetric::PopulationGrowthDecade,
    TrajectoryMetric::StabilityDriftDecade,
    TrajectoryMetric::LiteracyGrowthDecade,
];

/// The finance terms of one nation for one week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyFinance {
    pub revenue:      i64,
    pub admin_cost:   i64,
    pub mil_cost:     i64,
    pub debt_service: f64,
    pub op_weekly:    i64,
    pub spending:     i64,
    pub balance:      i64,
}

pub struct LedgerSubsystem {
    config: LedgerConfig,
}

impl LedgerSubsystem {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    /// Finance terms from a nation's current numbers.
    /// `spending` is rounded so that `revenue - spending == balance`.
    pub fn compute_finance(
        &self,
        nation: &NationState,
        debt_service: f64,
        op_weekly: i64,
    ) -> WeeklyFinance {
        let cfg = &self.config;
        let revenue = (nation.gdp / WEEKS_PER_YEAR
            * nation.tax_rate
            * nation.tax_capacity
            * nation.compliance)
            .round() as i64;
        let admin_cost =
            (cfg.admin_cost_base + cfg.admin_cost_per_capacity * nation.admin_capacity).round() as i64;
        let mil_cost = (cfg.mil_cost_base
            + cfg.mil_cost_rate * nation.force_size as f64 * FORCE_UNIT_SCALE)
            .round() as i64;

        let spending_exact = admin_cost as f64 + mil_cost as f64 + debt_service + op_weekly as f64;
        let balance = (revenue as f64 - spending_exact).round() as i64;

        WeeklyFinance {
            revenue,
            admin_cost,
            mil_cost,
            debt_service,
            op_weekly,
            spending: revenue.saturating_sub(balance),
            balance,
        }
    }

    /// Weekly compounding equivalent of a decade-scale rate.
    pub fn weekly_rate(&self, decade_rate: f64) -> f64 {
        let rate = decade_rate.clamp(self.config.trajectory_rate_floor, self.config.trajectory_rate_cap);
        (1.0 + rate).powf(1.0 / WEEKS_PER_DECADE) - 1.0
    }

    fn apply_growth(
        &self,
        nation: &mut NationState,
        balance: i64,
        rng: &mut TickRng,
    ) -> serde_json::Value {
        let cfg = &self.config;
        let development = nation.literacy.clamp(0.0, 1.0);

        let base_growth_annual = cfg.base_growth_annual + cfg.growth_per_development * development;
        let unrest_penalty = cfg.unrest_penalty_per_point * (100.0 - nation.stability);
        let shock = rng.normal_approx(0.0, cfg.shock_stdev);
        let gdp_multiplier = (base_growth_annual - unrest_penalty) / WEEKS_PER_YEAR + shock;
        let gdp_before = nation.gdp;
        nation.gdp = (nation.gdp * (1.0 + gdp_multiplier)).max(1.0);

        let stability_factor = (nation.stability / 100.0).clamp(cfg.pop_stability_floor, 1.0);
        let population_growth = (cfg.pop_growth_base
            + cfg.pop_growth_underdeveloped * (1.0 - development))
            * stability_factor
            / WEEKS_PER_YEAR;
        nation.population = (nation.population * (1.0 + population_growth)).max(1.0);

        let literacy_growth =
            (cfg.literacy_growth_base + cfg.literacy_growth_per_development * development) / WEEKS_PER_YEAR;
        nation.add_literacy(literacy_growth);

        let compliance_penalty =
            cfg.compliance_tax_penalty * (nation.tax_rate - cfg.compliance_tax_threshold).max(0.0);
        nation.add_compliance(-compliance_penalty);

        let stability_delta = cfg.deficit_stability_factor * (balance.min(0) as f64)
            - cfg.stability_tax_penalty * (nation.tax_rate - cfg.stability_tax_threshold).max(0.0);
        nation.add_stability(stability_delta);

        json!({
            "development":        development,
            "base_growth_annual": base_growth_annual,
            "unrest_penalty":     unrest_penalty,
            "shock":              shock,
            "gdp_multiplier":     gdp_multiplier,
            "gdp_before":         gdp_before,
            "gdp_after":          nation.gdp,
            "population_growth":  population_growth,
            "literacy_growth":    literacy_growth,
            "compliance_penalty": compliance_penalty,
            "stability_delta":    stability_delta,
        })
    }

    fn apply_trajectory(
        &self,
        nation_id: &str,
        nation: &mut NationState,
        combined: NationTrajectory,
        modifier_count: usize,
    ) -> ActionEffect {
        let gdp_weekly = self.weekly_rate(combined.gdp_growth_decade);
        let population_weekly = self.weekly_rate(combined.population_growth_decade);
        let stability_step = combined.stability_drift_decade / WEEKS_PER_DECADE;
        let literacy_step = combined.literacy_growth_decade / WEEKS_PER_DECADE;

        nation.gdp = (nation.gdp * (1.0 + gdp_weekly)).max(1.0);
        nation.population = (nation.population * (1.0 + population_weekly)).max(1.0);
        nation.add_stability(stability_step);
        nation.add_literacy(literacy_step);

        ActionEffect::new(
            EffectDelta::TrajectoryDrift {
                nation_id: nation_id.to_string(),
                combined,
            },
            json!({
                "modifiers":         modifier_count,
                "gdp_weekly":        gdp_weekly,
                "population_weekly": population_weekly,
                "stability_step":    stability_step,
                "literacy_step":     literacy_step,
            }),
        )
    }
}

impl TickStage for LedgerSubsystem {
    fn name(&self) -> &'static str { "ledger" }

    fn run(
        &self,
        world: &mut WorldState,
        _scratch: &mut StageScratch,
        rng: &mut TickRng,
    ) -> Vec<ActionEffect> {
        // Read-only pre-pass over the queue, instruments and modifiers.
        let mut op_spend: BTreeMap<NationId, i64> = BTreeMap::new();
        for op in &world.operations {
            *op_spend.entry(op.nation_id.clone()).or_default() += op.weekly_spend();
        }

        let mut instrument_interest: BTreeMap<NationId, f64> = BTreeMap::new();
        for instrument in world.debt_instruments.iter().flatten() {
            *instrument_interest.entry(instrument.nation_id.clone()).or_default() +=
                instrument.weekly_interest();
        }

        let mut modifier_sums: BTreeMap<NationId, (NationTrajectory, usize)> = BTreeMap::new();
        for modifier in &world.trajectory_modifiers {
            let entry = modifier_sums.entry(modifier.nation_id.clone()).or_default();
            entry.0.add(modifier.metric, modifier.delta);
            entry.1 += 1;
        }

        let mut effects = Vec::with_capacity(world.nations.len());
        let player_id = world.player_nation_id.clone();

        for (nation_id, nation) in world.nations.iter_mut() {
            let (debt_service, debt_source) = match instrument_interest.get(nation_id) {
                Some(interest) => (*interest, "instruments"),
                None => (nation.debt * self.config.fallback_debt_rate / WEEKS_PER_YEAR, "fallback"),
            };
            let op_weekly = op_spend.get(nation_id).copied().unwrap_or(0);

            let finance = self.compute_finance(nation, debt_service, op_weekly);
            nation.treasury = nation.treasury.saturating_add(finance.balance);

            let growth = self.apply_growth(nation, finance.balance, rng);

            effects.push(ActionEffect::new(
                EffectDelta::WeeklyFinance {
                    nation_id: nation_id.clone(),
                    revenue:   finance.revenue,
                    spending:  finance.spending,
                    balance:   finance.balance,
                },
                json!({
                    "admin_cost":     finance.admin_cost,
                    "mil_cost":       finance.mil_cost,
                    "debt_service":   finance.debt_service,
                    "debt_source":    debt_source,
                    "op_weekly":      finance.op_weekly,
                    "treasury_after": nation.treasury,
                    "growth":         growth,
                }),
            ));

            if *nation_id == player_id {
                continue;
            }
            let base = world.trajectories.get(nation_id).copied();
            let modifiers = modifier_sums.get(nation_id).copied();
            if base.is_none() && modifiers.is_none() {
                continue;
            }

            let mut combined = base.unwrap_or_default();
            let (modifier_total, modifier_count) = modifiers.unwrap_or_default();
            for metric in TRAJECTORY_METRICS {
                combined.add(metric, modifier_total.get(metric));
            }
            effects.push(self.apply_trajectory(nation_id, nation, combined, modifier_count));
        }

        log::debug!(
            "ledger: {} nations settled, {} effects",
            world.nations.len(),
            effects.len()
        );
        effects
    }
}
