//! World state — the single snapshot a tick reads and produces.
//!
//! RULE: every bounded field is clamped at the point of mutation.
//! Stages go through the `add_*` helpers below instead of writing
//! bounded fields directly, so no mutation can leave its interval.

use crate::{
    operation::Operation,
    types::{NationId, ProvinceId, TurnIndex, TurnSeed, WEEKS_PER_YEAR},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Documented intervals for every bounded field.
pub mod bounds {
    pub const TAX_RATE:        (f64, f64) = (0.0, 0.9);
    pub const UNIT:            (f64, f64) = (0.0, 1.0);
    pub const PERCENT:         (f64, f64) = (0.0, 100.0);
    pub const PROVINCE_SCALE:  (f64, f64) = (0.0, 10.0);
    pub const GARRISON:        (i64, i64) = (0, 1_000_000);
    pub const RELATION:        (i32, i32) = (-100, 100);
}

fn clamp_to(value: f64, (lo, hi): (f64, f64)) -> f64 {
    value.clamp(lo, hi)
}

// ── Root ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub turn_index:           TurnIndex,
    pub turn_seed:            TurnSeed,
    pub player_nation_id:     NationId,
    #[serde(default)]
    pub nations:              BTreeMap<NationId, NationState>,
    #[serde(default)]
    pub provinces:            BTreeMap<ProvinceId, ProvinceState>,
    #[serde(default)]
    pub relations:            RelationGraph,
    #[serde(default)]
    pub operations:           Vec<Operation>,
    #[serde(default)]
    pub trajectories:         BTreeMap<NationId, NationTrajectory>,
    #[serde(default)]
    pub trajectory_modifiers: Vec<TrajectoryModifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointments:         Option<Vec<AppointmentState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_instruments:     Option<Vec<DebtInstrument>>,
}

impl WorldState {
    /// An empty world at turn 0.
    pub fn new(turn_seed: TurnSeed, player_nation_id: impl Into<NationId>) -> Self {
        Self {
            turn_index:           0,
            turn_seed,
            player_nation_id:     player_nation_id.into(),
            nations:              BTreeMap::new(),
            provinces:            BTreeMap::new(),
            relations:            RelationGraph::default(),
            operations:           Vec::new(),
            trajectories:         BTreeMap::new(),
            trajectory_modifiers: Vec::new(),
            appointments:         None,
            debt_instruments:     None,
        }
    }

    pub fn is_player(&self, nation_id: &str) -> bool {
        self.player_nation_id == nation_id
    }
}

// ── Nation ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NationState {
    // Economy
    pub gdp:            f64,
    pub tax_rate:       f64,
    pub tax_capacity:   f64,
    pub compliance:     f64,
    pub treasury:       i64,
    pub debt:           f64,
    // Politics
    pub stability:      f64,
    pub legitimacy:     f64,
    // Demography
    pub population:     f64,
    pub literacy:       f64,
    // Administration
    pub admin_capacity: f64,
    pub corruption:     f64,
    // Military
    pub manpower_pool:  i64,
    pub force_size:     i64,
    pub readiness:      f64,
    pub supply:         f64,
    pub war_exhaustion: f64,
    pub tech_level_mil: f64,
    // Society
    pub laws:           BTreeMap<String, String>,
    pub institutions:   BTreeSet<String>,
    pub culture_mix:    BTreeMap<String, f64>,
    pub religion_mix:   BTreeMap<String, f64>,
}

impl Default for NationState {
    fn default() -> Self {
        Self {
            gdp:            1_000_000.0,
            tax_rate:       0.2,
            tax_capacity:   0.5,
            compliance:     0.6,
            treasury:       0,
            debt:           0.0,
            stability:      60.0,
            legitimacy:     60.0,
            population:     1_000_000.0,
            literacy:       0.2,
            admin_capacity: 30.0,
            corruption:     0.2,
            manpower_pool:  20_000,
            force_size:     1_000,
            readiness:      0.5,
            supply:         0.5,
            war_exhaustion: 0.0,
            tech_level_mil: 10.0,
            laws:           BTreeMap::new(),
            institutions:   BTreeSet::new(),
            culture_mix:    BTreeMap::new(),
            religion_mix:   BTreeMap::new(),
        }
    }
}

impl NationState {
    pub fn add_stability(&mut self, delta: f64) {
        self.stability = clamp_to(self.stability + delta, bounds::PERCENT);
    }

    pub fn add_legitimacy(&mut self, delta: f64) {
        self.legitimacy = clamp_to(self.legitimacy + delta, bounds::PERCENT);
    }

    pub fn add_compliance(&mut self, delta: f64) {
        self.compliance = clamp_to(self.compliance + delta, bounds::UNIT);
    }

    pub fn add_corruption(&mut self, delta: f64) {
        self.corruption = clamp_to(self.corruption + delta, bounds::UNIT);
    }

    pub fn add_literacy(&mut self, delta: f64) {
        self.literacy = clamp_to(self.literacy + delta, bounds::UNIT);
    }

    pub fn add_admin_capacity(&mut self, delta: f64) {
        self.admin_capacity = clamp_to(self.admin_capacity + delta, bounds::PERCENT);
    }

    pub fn add_readiness(&mut self, delta: f64) {
        self.readiness = clamp_to(self.readiness + delta, bounds::UNIT);
    }

    pub fn add_supply(&mut self, delta: f64) {
        self.supply = clamp_to(self.supply + delta, bounds::UNIT);
    }

    pub fn add_tech_level_mil(&mut self, delta: f64) {
        self.tech_level_mil = clamp_to(self.tech_level_mil + delta, bounds::PERCENT);
    }

    pub fn add_force_size(&mut self, delta: i64) {
        self.force_size = (self.force_size + delta).max(0);
    }

    /// Debt never goes below zero.
    pub fn reduce_debt(&mut self, amount: f64) {
        self.debt = (self.debt - amount).max(0.0);
    }
}

// ── Province ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvinceState {
    pub nation_id:        NationId,
    pub population:       f64,
    pub productivity:     f64,
    pub infrastructure:   f64,
    pub unrest:           f64,
    pub compliance_local: f64,
    pub garrison:         i64,
    pub resources:        BTreeMap<String, f64>,
    pub culture_mix:      BTreeMap<String, f64>,
    pub religion_mix:     BTreeMap<String, f64>,
}

impl Default for ProvinceState {
    fn default() -> Self {
        Self {
            nation_id:        NationId::new(),
            population:       100_000.0,
            productivity:     3.0,
            infrastructure:   3.0,
            unrest:           10.0,
            compliance_local: 0.6,
            garrison:         1_000,
            resources:        BTreeMap::new(),
            culture_mix:      BTreeMap::new(),
            religion_mix:     BTreeMap::new(),
        }
    }
}

impl ProvinceState {
    pub fn add_infrastructure(&mut self, delta: f64) {
        self.infrastructure = clamp_to(self.infrastructure + delta, bounds::PROVINCE_SCALE);
    }

    pub fn add_productivity(&mut self, delta: f64) {
        self.productivity = clamp_to(self.productivity + delta, bounds::PROVINCE_SCALE);
    }

    pub fn add_unrest(&mut self, delta: f64) {
        self.unrest = clamp_to(self.unrest + delta, bounds::PERCENT);
    }

    pub fn add_garrison(&mut self, delta: i64) {
        let (lo, hi) = bounds::GARRISON;
        self.garrison = (self.garrison + delta).clamp(lo, hi);
    }
}

// ── Relations ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub from_nation_id: NationId,
    pub to_nation_id:   NationId,
    pub value:          i32,
    #[serde(default)]
    pub treaties:       BTreeSet<String>,
    #[serde(default)]
    pub at_war:         bool,
}

impl RelationEdge {
    pub fn neutral(from: &str, to: &str) -> Self {
        Self {
            from_nation_id: from.to_string(),
            to_nation_id:   to.to_string(),
            value:          0,
            treaties:       BTreeSet::new(),
            at_war:         false,
        }
    }

    pub fn set_value(&mut self, value: i32) {
        let (lo, hi) = bounds::RELATION;
        self.value = value.clamp(lo, hi);
    }
}

/// Directed relation edges keyed by ordered `(from, to)` pair.
///
/// Serialized as a flat list of edges; on load the first edge for
/// an ordered pair wins and later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RelationEdge>", into = "Vec<RelationEdge>")]
pub struct RelationGraph {
    edges: BTreeMap<(NationId, NationId), RelationEdge>,
}

impl RelationGraph {
    pub fn get(&self, from: &str, to: &str) -> Option<&RelationEdge> {
        self.edges.get(&(from.to_string(), to.to_string()))
    }

    /// Current score, 0 for a pair that has never been referenced.
    pub fn value(&self, from: &str, to: &str) -> i32 {
        self.get(from, to).map_or(0, |e| e.value)
    }

    /// The edge for `(from, to)`, created neutral on first reference.
    pub fn edge_mut(&mut self, from: &str, to: &str) -> &mut RelationEdge {
        self.edges
            .entry((from.to_string(), to.to_string()))
            .or_insert_with(|| RelationEdge::neutral(from, to))
    }

    /// Shift a score by `delta`, clamped. Returns the new value.
    pub fn shift(&mut self, from: &str, to: &str, delta: i32) -> i32 {
        let edge = self.edge_mut(from, to);
        edge.set_value(edge.value.saturating_add(delta));
        edge.value
    }

    pub fn insert(&mut self, edge: RelationEdge) {
        let key = (edge.from_nation_id.clone(), edge.to_nation_id.clone());
        self.edges.insert(key, edge);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationEdge> {
        self.edges.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RelationEdge> {
        self.edges.values_mut()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl From<Vec<RelationEdge>> for RelationGraph {
    fn from(list: Vec<RelationEdge>) -> Self {
        let mut edges = BTreeMap::new();
        for edge in list {
            let key = (edge.from_nation_id.clone(), edge.to_nation_id.clone());
            edges.entry(key).or_insert(edge);
        }
        Self { edges }
    }
}

impl From<RelationGraph> for Vec<RelationEdge> {
    fn from(graph: RelationGraph) -> Self {
        graph.edges.into_values().collect()
    }
}

// ── Trajectories ─────────────────────────────────────────────────────────────

/// Decade-scale growth biases for a non-player nation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NationTrajectory {
    pub gdp_growth_decade:        f64,
    pub population_growth_decade: f64,
    pub stability_drift_decade:   f64,
    pub literacy_growth_decade:   f64,
}

impl NationTrajectory {
    pub fn get(&self, metric: TrajectoryMetric) -> f64 {
        match metric {
            TrajectoryMetric::GdpGrowthDecade        => self.gdp_growth_decade,
            TrajectoryMetric::PopulationGrowthDecade => self.population_growth_decade,
            TrajectoryMetric::StabilityDriftDecade   => self.stability_drift_decade,
            TrajectoryMetric::LiteracyGrowthDecade   => self.literacy_growth_decade,
        }
    }

    pub fn add(&mut self, metric: TrajectoryMetric, delta: f64) {
        match metric {
            TrajectoryMetric::GdpGrowthDecade        => self.gdp_growth_decade += delta,
            TrajectoryMetric::PopulationGrowthDecade => self.population_growth_decade += delta,
            TrajectoryMetric::StabilityDriftDecade   => self.stability_drift_decade += delta,
            TrajectoryMetric::LiteracyGrowthDecade   => self.literacy_growth_decade += delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryMetric {
    GdpGrowthDecade,
    PopulationGrowthDecade,
    StabilityDriftDecade,
    LiteracyGrowthDecade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryModifier {
    pub nation_id:       NationId,
    pub metric:          TrajectoryMetric,
    pub delta:           f64,
    pub remaining_weeks: u32,
    /// Operation that installed this modifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source:          Option<String>,
}

// ── Appointments & debt ──────────────────────────────────────────────────────

/// A court or cabinet appointment. Carried through ticks unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentState {
    pub nation_id:      NationId,
    pub office:         String,
    pub holder:         String,
    #[serde(default)]
    pub appointed_turn: TurnIndex,
    #[serde(default)]
    pub competence:     f64,
    #[serde(default)]
    pub loyalty:        f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtInstrument {
    pub instrument_id:        String,
    pub nation_id:            NationId,
    pub principal:            f64,
    pub interest_rate_annual: f64,
    pub remaining_weeks:      u32,
}

impl DebtInstrument {
    pub fn weekly_interest(&self) -> f64 {
        self.principal * self.interest_rate_annual / WEEKS_PER_YEAR
    }
}
