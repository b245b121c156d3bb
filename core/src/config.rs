//! Balance constants for the tick stages.
//!
//! `SimConfig::default()` reproduces the reference rules exactly.
//! A JSON file may override any subset; absent sections and fields
//! keep their defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub ledger:     LedgerConfig,
    pub operations: OperationConfig,
    pub relations:  RelationConfig,
}

impl SimConfig {
    /// Load overrides from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let config: SimConfig = serde_json::from_str(content)?;
        Ok(config)
    }
}

// ── Ledger & growth ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub admin_cost_base:               f64,
    pub admin_cost_per_capacity:       f64,
    pub mil_cost_base:                 f64,
    /// Applied as `rate * force_size * 1000`.
    pub mil_cost_rate:                 f64,
    /// Annual rate charged on `debt` when a nation has no instruments.
    pub fallback_debt_rate:            f64,

    pub base_growth_annual:            f64,
    pub growth_per_development:        f64,
    pub unrest_penalty_per_point:      f64,
    pub shock_stdev:                   f64,

    pub pop_growth_base:               f64,
    pub pop_growth_underdeveloped:     f64,
    pub pop_stability_floor:           f64,

    pub literacy_growth_base:          f64,
    pub literacy_growth_per_development: f64,

    pub compliance_tax_threshold:      f64,
    pub compliance_tax_penalty:        f64,
    pub deficit_stability_factor:      f64,
    pub stability_tax_threshold:       f64,
    pub stability_tax_penalty:         f64,

    /// Decade rates are clamped to [floor, cap] before conversion.
    pub trajectory_rate_floor:         f64,
    pub trajectory_rate_cap:           f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            admin_cost_base:                 200.0,
            admin_cost_per_capacity:         5.0,
            mil_cost_base:                   150.0,
            mil_cost_rate:                   0.02,
            fallback_debt_rate:              0.05,

            base_growth_annual:              0.004,
            growth_per_development:          0.012,
            unrest_penalty_per_point:        0.0002,
            shock_stdev:                     0.002,

            pop_growth_base:                 0.006,
            pop_growth_underdeveloped:       0.006,
            pop_stability_floor:             0.4,

            literacy_growth_base:            0.001,
            literacy_growth_per_development: 0.003,

            compliance_tax_threshold:        0.35,
            compliance_tax_penalty:          0.02,
            deficit_stability_factor:        0.01,
            stability_tax_threshold:         0.5,
            stability_tax_penalty:           0.5,

            trajectory_rate_floor:           -0.95,
            trajectory_rate_cap:             5.0,
        }
    }
}

// ── Operations ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationConfig {
    pub spy_base_chance:           f64,
    pub spy_counterintel_penalty:  f64,
    pub spy_counterintel_cap:      u32,
    pub spy_chance_bounds:         (f64, f64),
    pub spy_failure_relation:      i32,

    pub ci_base_chance:            f64,
    pub ci_budget_scale:           f64,
    pub ci_budget_bonus_cap:       f64,
    pub ci_chance_bounds:          (f64, f64),

    pub campaign_relation_gain:    i32,

    pub faction_exposure_low:      f64,
    pub faction_exposure_medium:   f64,
    pub faction_exposure_high:     f64,
    pub faction_modifier_weeks:    u32,
    pub faction_modifier_delta:    f64,
    pub faction_exposed_relation:  i32,

    pub ultimatum_base_chance:     f64,
    pub ultimatum_force_weight:    f64,
    pub ultimatum_relation_weight: f64,
    pub ultimatum_chance_bounds:   (f64, f64),
    pub ultimatum_success_relation: i32,
    pub ultimatum_failure_relation: i32,

    pub subsidy_gdp_share:         f64,
    pub subsidy_budget_multiplier: f64,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            spy_base_chance:            0.65,
            spy_counterintel_penalty:   0.1,
            spy_counterintel_cap:       2,
            spy_chance_bounds:          (0.2, 0.8),
            spy_failure_relation:       -3,

            ci_base_chance:             0.55,
            ci_budget_scale:            5000.0,
            ci_budget_bonus_cap:        0.2,
            ci_chance_bounds:           (0.4, 0.85),

            campaign_relation_gain:     2,

            faction_exposure_low:       0.25,
            faction_exposure_medium:    0.15,
            faction_exposure_high:      0.08,
            faction_modifier_weeks:     12,
            faction_modifier_delta:     -0.6,
            faction_exposed_relation:   -4,

            ultimatum_base_chance:      0.45,
            ultimatum_force_weight:     0.15,
            ultimatum_relation_weight:  0.1,
            ultimatum_chance_bounds:    (0.2, 0.8),
            ultimatum_success_relation: -3,
            ultimatum_failure_relation: -6,

            subsidy_gdp_share:          0.008,
            subsidy_budget_multiplier:  2.0,
        }
    }
}

// ── Relations ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationConfig {
    /// Weekly multiplicative pull toward neutrality. The result is truncated,
    /// so any factor in [0.99, 1) moves a legal score by exactly one point.
    pub decay_factor: f64,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self { decay_factor: 0.995 }
    }
}
