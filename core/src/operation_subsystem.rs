//! Operation resolver — countdown and resolution of queued operations.
//!
//! Every tick, in queue order:
//!   1. The countdown drops by one and budgeted operations pay this week's share
//!   2. Operations still counting down are carried to the next tick
//!   3. Operations reaching zero leave the queue and run exactly one handler
//!
//! Handlers never fail. A reference to a nation or province that no longer
//! exists skips that mutation; the resolution effect is still emitted.

use crate::{
    config::OperationConfig,
    effect::{ActionEffect, EffectDelta, IntelReport},
    operation::{ArmyFocus, CutCategory, Operation, OperationKind, ProjectType, Secrecy},
    rng::TickRng,
    state::{TrajectoryMetric, TrajectoryModifier, WorldState},
    subsystem::{StageScratch, TickStage},
    types::NationId,
};
use serde_json::json;

/// A counterintelligence operation active at tick start: (owner, target).
type CounterintelCover = (NationId, Option<NationId>);

pub struct OperationSubsystem {
    config: OperationConfig,
}

impl OperationSubsystem {
    pub fn new(config: OperationConfig) -> Self {
        Self { config }
    }

    /// Success chance of a spy operation facing `counterintel_ops` active covers.
    pub fn spy_chance(&self, counterintel_ops: usize) -> f64 {
        let cfg = &self.config;
        let counted = counterintel_ops.min(cfg.spy_counterintel_cap as usize) as f64;
        let (lo, hi) = cfg.spy_chance_bounds;
        (cfg.spy_base_chance - cfg.spy_counterintel_penalty * counted).clamp(lo, hi)
    }

    pub fn counterintel_chance(&self, budget: f64) -> f64 {
        let cfg = &self.config;
        let bonus = (budget / cfg.ci_budget_scale).min(cfg.ci_budget_bonus_cap);
        let (lo, hi) = cfg.ci_chance_bounds;
        (cfg.ci_base_chance + bonus).clamp(lo, hi)
    }

    pub fn ultimatum_chance(&self, force_ratio: f64, relation: i32) -> f64 {
        let cfg = &self.config;
        let (lo, hi) = cfg.ultimatum_chance_bounds;
        (cfg.ultimatum_base_chance
            + cfg.ultimatum_force_weight * (force_ratio - 1.0).clamp(-0.5, 0.5)
            + cfg.ultimatum_relation_weight * (f64::from(relation) / 100.0))
            .clamp(lo, hi)
    }

    pub fn exposure_chance(&self, secrecy: Secrecy) -> f64 {
        match secrecy {
            Secrecy::Low    => self.config.faction_exposure_low,
            Secrecy::Medium => self.config.faction_exposure_medium,
            Secrecy::High   => self.config.faction_exposure_high,
        }
    }

    fn resolve(
        &self,
        world: &mut WorldState,
        scratch: &mut StageScratch,
        rng: &mut TickRng,
        op: &Operation,
        covers: &[CounterintelCover],
    ) -> ActionEffect {
        log::trace!("resolving {} '{}' for {}", op.kind_name(), op.operation_id, op.nation_id);
        match &op.kind {
            OperationKind::SpyOperation => self.resolve_spy(world, rng, op, covers),
            OperationKind::Counterintelligence => self.resolve_counterintel(world, rng, op),
            OperationKind::DiplomacyCampaign => self.resolve_campaign(world, op),
            OperationKind::FundProject { province_id, project_type } => {
                resolve_project(world, op, province_id, *project_type)
            }
            OperationKind::Fortify { province_id, level } => {
                resolve_fortify(world, op, province_id, *level)
            }
            OperationKind::ReorganizeArmy { focus } => resolve_reorganize(world, op, *focus),
            OperationKind::SectorSubsidy { .. } => self.resolve_subsidy(world, op),
            OperationKind::Committee { .. } => resolve_committee(world, op),
            OperationKind::FundFaction { secrecy, .. } => {
                self.resolve_faction(world, scratch, rng, op, *secrecy)
            }
            OperationKind::Ultimatum { backdown_cost, .. } => {
                self.resolve_ultimatum(world, rng, op, *backdown_cost)
            }
            OperationKind::SpendingCut { category, weekly_amount } => {
                resolve_spending_cut(world, op, *category, *weekly_amount)
            }
            OperationKind::Crackdown { province_id, intensity } => {
                resolve_crackdown(world, op, province_id, *intensity)
            }
        }
    }

    // ── Intrigue ─────────────────────────────────────────────────────────────

    fn resolve_spy(
        &self,
        world: &mut WorldState,
        rng: &mut TickRng,
        op: &Operation,
        covers: &[CounterintelCover],
    ) -> ActionEffect {
        let actor = op.nation_id.as_str();
        let target = op.target_nation_id.as_deref();

        // Covers owned by the target, aimed at the actor or at no one in particular.
        let counterintel_ops = target.map_or(0, |t| {
            covers
                .iter()
                .filter(|(owner, aimed)| owner == t && aimed.as_deref().map_or(true, |a| a == actor))
                .count()
        });
        let chance = self.spy_chance(counterintel_ops);
        let roll = rng.next_f64();
        let success = roll < chance;

        let mut intel = None;
        let mut relation_after = None;
        match target {
            Some(t) if both_present(world, actor, t) => {
                if success {
                    intel = world.nations.get(t).map(|n| IntelReport {
                        treasury:   n.treasury,
                        force_size: n.force_size,
                        readiness:  n.readiness,
                        stability:  n.stability,
                    });
                } else {
                    relation_after =
                        Some(world.relations.shift(t, actor, self.config.spy_failure_relation));
                }
            }
            _ => skip_warning(op, "target nation"),
        }

        ActionEffect::new(
            EffectDelta::SpyResolved {
                operation_id:     op.operation_id.clone(),
                nation_id:        op.nation_id.clone(),
                target_nation_id: op.target_nation_id.clone(),
                success,
                intel,
            },
            json!({
                "roll":             roll,
                "chance":           chance,
                "counterintel_ops": counterintel_ops,
                "relation_after":   relation_after,
            }),
        )
    }

    fn resolve_counterintel(
        &self,
        world: &mut WorldState,
        rng: &mut TickRng,
        op: &Operation,
    ) -> ActionEffect {
        let budget = op.budget_total.unwrap_or(0) as f64;
        let chance = self.counterintel_chance(budget);
        let roll = rng.next_f64();
        let success = roll < chance;

        match world.nations.get_mut(&op.nation_id) {
            Some(nation) if success => {
                nation.add_corruption(-0.02);
                nation.add_compliance(0.02);
                nation.add_stability(1.0);
            }
            Some(nation) => {
                nation.add_corruption(0.01);
                nation.add_stability(-0.5);
            }
            None => skip_warning(op, "nation"),
        }

        ActionEffect::new(
            EffectDelta::CounterintelligenceResolved {
                operation_id: op.operation_id.clone(),
                nation_id:    op.nation_id.clone(),
                success,
            },
            json!({ "roll": roll, "chance": chance, "budget": budget }),
        )
    }

    fn resolve_faction(
        &self,
        world: &mut WorldState,
        scratch: &mut StageScratch,
        rng: &mut TickRng,
        op: &Operation,
        secrecy: Secrecy,
    ) -> ActionEffect {
        let chance = self.exposure_chance(secrecy);
        let roll = rng.next_f64();
        let exposed = roll < chance;

        let actor = op.nation_id.as_str();
        let mut relation_after = None;
        match op.target_nation_id.as_deref() {
            Some(t) if world.nations.contains_key(t) => {
                if let Some(target) = world.nations.get_mut(t) {
                    target.add_stability(-2.0);
                    target.add_legitimacy(-1.0);
                }
                scratch.fresh_modifiers.push(TrajectoryModifier {
                    nation_id:       t.to_string(),
                    metric:          TrajectoryMetric::StabilityDriftDecade,
                    delta:           self.config.faction_modifier_delta,
                    remaining_weeks: self.config.faction_modifier_weeks,
                    source:          Some(op.operation_id.clone()),
                });
                if exposed && world.nations.contains_key(actor) {
                    relation_after =
                        Some(world.relations.shift(actor, t, self.config.faction_exposed_relation));
                }
            }
            _ => skip_warning(op, "target nation"),
        }

        ActionEffect::new(
            EffectDelta::FactionFunded {
                operation_id:     op.operation_id.clone(),
                nation_id:        op.nation_id.clone(),
                target_nation_id: op.target_nation_id.clone(),
                secrecy,
                exposed,
            },
            json!({ "roll": roll, "chance": chance, "relation_after": relation_after }),
        )
    }

    // ── Diplomacy ────────────────────────────────────────────────────────────

    fn resolve_campaign(&self, world: &mut WorldState, op: &Operation) -> ActionEffect {
        let actor = op.nation_id.as_str();
        let relation_after = match op.target_nation_id.as_deref() {
            Some(t) if both_present(world, actor, t) => {
                Some(world.relations.shift(actor, t, self.config.campaign_relation_gain))
            }
            _ => {
                skip_warning(op, "target nation");
                None
            }
        };

        ActionEffect::new(
            EffectDelta::CampaignResolved {
                operation_id:     op.operation_id.clone(),
                nation_id:        op.nation_id.clone(),
                target_nation_id: op.target_nation_id.clone(),
                relation_after,
            },
            json!({ "relation_gain": self.config.campaign_relation_gain }),
        )
    }

    fn resolve_ultimatum(
        &self,
        world: &mut WorldState,
        rng: &mut TickRng,
        op: &Operation,
        backdown_cost: f64,
    ) -> ActionEffect {
        let actor = op.nation_id.as_str();
        let target = op.target_nation_id.as_deref().filter(|t| both_present(world, actor, t));

        let (force_ratio, relation) = match target {
            Some(t) => {
                let own = world.nations.get(actor).map_or(0, |n| n.force_size);
                let theirs = world.nations.get(t).map_or(0, |n| n.force_size);
                (own as f64 / theirs.max(1) as f64, world.relations.value(actor, t))
            }
            None => (1.0, 0),
        };
        let chance = self.ultimatum_chance(force_ratio, relation);
        let roll = rng.next_f64();
        let success = roll < chance;

        let relation_after = match target {
            Some(t) if success => {
                if let Some(n) = world.nations.get_mut(actor) {
                    n.add_legitimacy(1.0);
                }
                if let Some(n) = world.nations.get_mut(t) {
                    n.add_stability(-1.0);
                }
                Some(world.relations.shift(actor, t, self.config.ultimatum_success_relation))
            }
            Some(t) => {
                if let Some(n) = world.nations.get_mut(actor) {
                    n.add_legitimacy(-backdown_cost);
                    n.add_stability(-1.0);
                }
                Some(world.relations.shift(actor, t, self.config.ultimatum_failure_relation))
            }
            None => {
                skip_warning(op, "target nation");
                None
            }
        };

        ActionEffect::new(
            EffectDelta::UltimatumResolved {
                operation_id:     op.operation_id.clone(),
                nation_id:        op.nation_id.clone(),
                target_nation_id: op.target_nation_id.clone(),
                success,
                relation_after,
            },
            json!({
                "roll":            roll,
                "chance":          chance,
                "force_ratio":     force_ratio,
                "relation_before": relation,
                "backdown_cost":   backdown_cost,
            }),
        )
    }

    // ── Economy ──────────────────────────────────────────────────────────────

    fn resolve_subsidy(&self, world: &mut WorldState, op: &Operation) -> ActionEffect {
        let budget = op.budget_total.unwrap_or(0) as f64;
        let gdp_boost = match world.nations.get_mut(&op.nation_id) {
            Some(nation) => {
                let boost = (nation.gdp * self.config.subsidy_gdp_share)
                    .min(budget * self.config.subsidy_budget_multiplier)
                    .max(0.0);
                nation.gdp += boost;
                nation.add_stability(1.0);
                boost
            }
            None => {
                skip_warning(op, "nation");
                0.0
            }
        };

        ActionEffect::new(
            EffectDelta::SubsidyResolved {
                operation_id: op.operation_id.clone(),
                nation_id:    op.nation_id.clone(),
                gdp_boost,
            },
            json!({ "budget_total": budget }),
        )
    }
}

impl TickStage for OperationSubsystem {
    fn name(&self) -> &'static str { "operations" }

    fn run(
        &self,
        world: &mut WorldState,
        scratch: &mut StageScratch,
        rng: &mut TickRng,
    ) -> Vec<ActionEffect> {
        let queue = std::mem::take(&mut world.operations);
        let covers: Vec<CounterintelCover> = queue
            .iter()
            .filter(|op| matches!(op.kind, OperationKind::Counterintelligence))
            .map(|op| (op.nation_id.clone(), op.target_nation_id.clone()))
            .collect();

        let mut carried = Vec::with_capacity(queue.len());
        let mut effects = Vec::new();

        for mut op in queue {
            let spend = op.weekly_spend();
            op.remaining_weeks = op.remaining_weeks.saturating_sub(1);

            if op.remaining_weeks > 0 {
                if let Some(remaining) = op.remaining_budget.as_mut() {
                    *remaining = (*remaining - spend.max(0)).max(0);
                }
                carried.push(op);
            } else {
                effects.push(self.resolve(world, scratch, rng, &op, &covers));
            }
        }

        log::debug!(
            "operations: {} resolved, {} carried",
            effects.len(),
            carried.len()
        );
        world.operations = carried;
        effects
    }
}

// ── Deterministic handlers ───────────────────────────────────────────────────

fn resolve_project(
    world: &mut WorldState,
    op: &Operation,
    province_id: &str,
    project_type: ProjectType,
) -> ActionEffect {
    let (infrastructure_delta, productivity_delta) = match project_type {
        ProjectType::Fortifications => (0.8, 0.0),
        ProjectType::Shipyards => (0.6, 0.0),
        ProjectType::Infrastructure => (1.0, 0.4),
        ProjectType::Bureaucracy | ProjectType::Schools => (1.0, 0.2),
    };

    let province_found = match world.provinces.get_mut(province_id) {
        Some(province) => {
            province.add_infrastructure(infrastructure_delta);
            province.add_productivity(productivity_delta);
            true
        }
        None => {
            skip_warning(op, "province");
            false
        }
    };

    if let Some(nation) = world.nations.get_mut(&op.nation_id) {
        match project_type {
            ProjectType::Bureaucracy => {
                nation.add_admin_capacity(2.0);
                nation.add_corruption(-0.01);
            }
            ProjectType::Schools => nation.add_literacy(0.01),
            ProjectType::Shipyards => nation.add_tech_level_mil(1.0),
            ProjectType::Infrastructure | ProjectType::Fortifications => {}
        }
    }

    ActionEffect::new(
        EffectDelta::ProjectCompleted {
            operation_id: op.operation_id.clone(),
            nation_id:    op.nation_id.clone(),
            province_id:  province_id.to_string(),
            project_type,
            infrastructure_delta,
            productivity_delta,
        },
        json!({ "province_found": province_found }),
    )
}

fn resolve_fortify(world: &mut WorldState, op: &Operation, province_id: &str, level: u32) -> ActionEffect {
    let infrastructure_delta = f64::from(level) * 0.6;
    let garrison_delta = i64::from(level) * 500;

    let after = match world.provinces.get_mut(province_id) {
        Some(province) => {
            province.add_infrastructure(infrastructure_delta);
            province.add_garrison(garrison_delta);
            Some((province.infrastructure, province.garrison))
        }
        None => {
            skip_warning(op, "province");
            None
        }
    };

    ActionEffect::new(
        EffectDelta::Fortified {
            operation_id: op.operation_id.clone(),
            nation_id:    op.nation_id.clone(),
            province_id:  province_id.to_string(),
            infrastructure_delta,
            garrison_delta,
        },
        json!({ "level": level, "after": after }),
    )
}

fn resolve_reorganize(world: &mut WorldState, op: &Operation, focus: ArmyFocus) -> ActionEffect {
    let (readiness_delta, supply_delta) = match focus {
        ArmyFocus::Training     => (0.05, 0.0),
        ArmyFocus::OfficerCorps => (0.03, 0.01),
        ArmyFocus::Logistics    => (0.0, 0.05),
        ArmyFocus::Other        => (0.02, 0.02),
    };

    match world.nations.get_mut(&op.nation_id) {
        Some(nation) => {
            nation.add_readiness(readiness_delta);
            nation.add_supply(supply_delta);
        }
        None => skip_warning(op, "nation"),
    }

    ActionEffect::new(
        EffectDelta::ArmyReorganized {
            operation_id: op.operation_id.clone(),
            nation_id:    op.nation_id.clone(),
            focus,
            readiness_delta,
            supply_delta,
        },
        json!({}),
    )
}

fn resolve_committee(world: &mut WorldState, op: &Operation) -> ActionEffect {
    match world.nations.get_mut(&op.nation_id) {
        Some(nation) => {
            nation.add_admin_capacity(1.0);
            nation.add_compliance(0.01);
            nation.add_stability(1.0);
        }
        None => skip_warning(op, "nation"),
    }

    ActionEffect::new(
        EffectDelta::CommitteeConcluded {
            operation_id: op.operation_id.clone(),
            nation_id:    op.nation_id.clone(),
        },
        json!({}),
    )
}

fn resolve_spending_cut(
    world: &mut WorldState,
    op: &Operation,
    category: CutCategory,
    weekly_amount: i64,
) -> ActionEffect {
    match world.nations.get_mut(&op.nation_id) {
        Some(nation) => match category {
            CutCategory::Military => {
                nation.add_readiness(-0.05);
                nation.add_force_size(-500);
            }
            CutCategory::Administration => nation.add_admin_capacity(-2.0),
            CutCategory::Court => nation.add_legitimacy(-2.0),
            CutCategory::Infrastructure => nation.add_stability(-1.0),
            CutCategory::Subsidies => {
                nation.add_stability(-1.0);
                nation.add_compliance(-0.02);
            }
        },
        None => skip_warning(op, "nation"),
    }

    ActionEffect::new(
        EffectDelta::SpendingCutResolved {
            operation_id: op.operation_id.clone(),
            nation_id:    op.nation_id.clone(),
            category,
        },
        json!({ "weekly_amount": weekly_amount }),
    )
}

fn resolve_crackdown(
    world: &mut WorldState,
    op: &Operation,
    province_id: &str,
    intensity: f64,
) -> ActionEffect {
    let unrest_delta = intensity * 2.0;

    let unrest_after = match world.provinces.get_mut(province_id) {
        Some(province) => {
            province.add_unrest(unrest_delta);
            Some(province.unrest)
        }
        None => {
            skip_warning(op, "province");
            None
        }
    };
    if let Some(nation) = world.nations.get_mut(&op.nation_id) {
        nation.add_stability(-1.0);
    }

    ActionEffect::new(
        EffectDelta::CrackdownResolved {
            operation_id: op.operation_id.clone(),
            nation_id:    op.nation_id.clone(),
            province_id:  province_id.to_string(),
            unrest_delta,
        },
        json!({ "intensity": intensity, "unrest_after": unrest_after }),
    )
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn both_present(world: &WorldState, a: &str, b: &str) -> bool {
    world.nations.contains_key(a) && world.nations.contains_key(b)
}

fn skip_warning(op: &Operation, missing: &str) {
    log::warn!(
        "{} '{}': {missing} missing, mutation skipped",
        op.kind_name(),
        op.operation_id
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> OperationSubsystem {
        OperationSubsystem::new(OperationConfig::default())
    }

    #[test]
    fn spy_chance_caps_counterintel_penalty() {
        let r = resolver();
        assert!((r.spy_chance(0) - 0.65).abs() < 1e-12);
        assert!((r.spy_chance(1) - 0.55).abs() < 1e-12);
        assert!((r.spy_chance(2) - 0.45).abs() < 1e-12);
        assert!((r.spy_chance(9) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn counterintel_chance_is_bounded() {
        let r = resolver();
        assert!((r.counterintel_chance(0.0) - 0.55).abs() < 1e-12);
        assert!((r.counterintel_chance(500.0) - 0.65).abs() < 1e-12);
        assert!((r.counterintel_chance(1_000_000.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn ultimatum_chance_clamps_force_ratio() {
        let r = resolver();
        assert!((r.ultimatum_chance(5.0, 0) - 0.525).abs() < 1e-12);
        assert!((r.ultimatum_chance(0.0, 0) - 0.375).abs() < 1e-12);
        assert!((r.ultimatum_chance(1.0, 100) - 0.55).abs() < 1e-12);
        assert!((r.ultimatum_chance(5.0, 100) - 0.625).abs() < 1e-12);
    }

    #[test]
    fn exposure_chance_by_secrecy() {
        let r = resolver();
        assert_eq!(r.exposure_chance(Secrecy::Low), 0.25);
        assert_eq!(r.exposure_chance(Secrecy::Medium), 0.15);
        assert_eq!(r.exposure_chance(Secrecy::High), 0.08);
    }
}
