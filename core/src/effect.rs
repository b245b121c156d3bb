//! The effect log — the audit trail of every mutation a tick performs.
//!
//! RULE: effects are append-only and never read back by the engine.
//! `effect_type` is a stable key for downstream consumers; `delta` is the
//! canonical typed payload; `audit` is diagnostic-only and may change
//! shape without notice.

use crate::{
    operation::{ArmyFocus, CutCategory, ProjectType, Secrecy},
    state::NationTrajectory,
    types::{NationId, OperationId, ProvinceId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEffect {
    pub effect_type: String,
    pub delta:       EffectDelta,
    pub audit:       serde_json::Value,
}

impl ActionEffect {
    pub fn new(delta: EffectDelta, audit: serde_json::Value) -> Self {
        Self {
            effect_type: delta.effect_type().to_string(),
            delta,
            audit,
        }
    }
}

/// Canonical payload of each effect.
/// Variants are added as rules are added — never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectDelta {
    // ── Ledger ─────────────────────────────────────
    WeeklyFinance {
        nation_id: NationId,
        revenue:   i64,
        spending:  i64,
        balance:   i64,
    },
    TrajectoryDrift {
        nation_id: NationId,
        combined:  NationTrajectory,
    },

    // ── Debt ───────────────────────────────────────
    DebtMatured {
        nation_id:     NationId,
        instrument_id: String,
        principal:     f64,
    },

    // ── Intrigue ───────────────────────────────────
    SpyResolved {
        operation_id:     OperationId,
        nation_id:        NationId,
        target_nation_id: Option<NationId>,
        success:          bool,
        intel:            Option<IntelReport>,
    },
    CounterintelligenceResolved {
        operation_id: OperationId,
        nation_id:    NationId,
        success:      bool,
    },
    FactionFunded {
        operation_id:     OperationId,
        nation_id:        NationId,
        target_nation_id: Option<NationId>,
        secrecy:          Secrecy,
        exposed:          bool,
    },

    // ── Diplomacy ──────────────────────────────────
    CampaignResolved {
        operation_id:     OperationId,
        nation_id:        NationId,
        target_nation_id: Option<NationId>,
        relation_after:   Option<i32>,
    },
    UltimatumResolved {
        operation_id:     OperationId,
        nation_id:        NationId,
        target_nation_id: Option<NationId>,
        success:          bool,
        relation_after:   Option<i32>,
    },

    // ── Economy ────────────────────────────────────
    ProjectCompleted {
        operation_id:         OperationId,
        nation_id:            NationId,
        province_id:          ProvinceId,
        project_type:         ProjectType,
        infrastructure_delta: f64,
        productivity_delta:   f64,
    },
    SubsidyResolved {
        operation_id: OperationId,
        nation_id:    NationId,
        gdp_boost:    f64,
    },
    SpendingCutResolved {
        operation_id: OperationId,
        nation_id:    NationId,
        category:     CutCategory,
    },

    // ── Military ───────────────────────────────────
    Fortified {
        operation_id:         OperationId,
        nation_id:            NationId,
        province_id:          ProvinceId,
        infrastructure_delta: f64,
        garrison_delta:       i64,
    },
    ArmyReorganized {
        operation_id:    OperationId,
        nation_id:       NationId,
        focus:           ArmyFocus,
        readiness_delta: f64,
        supply_delta:    f64,
    },

    // ── Politics ───────────────────────────────────
    CommitteeConcluded {
        operation_id: OperationId,
        nation_id:    NationId,
    },
    CrackdownResolved {
        operation_id: OperationId,
        nation_id:    NationId,
        province_id:  ProvinceId,
        unrest_delta: f64,
    },
}

impl EffectDelta {
    /// Stable effect key, used as `ActionEffect::effect_type`.
    pub fn effect_type(&self) -> &'static str {
        match self {
            Self::WeeklyFinance { .. }               => "nation.weekly_finance",
            Self::TrajectoryDrift { .. }             => "nation.trajectory_drift",
            Self::DebtMatured { .. }                 => "nation.debt_matured",
            Self::SpyResolved { .. }                 => "intrigue.spy_resolved",
            Self::CounterintelligenceResolved { .. } => "intrigue.counterintelligence_resolved",
            Self::FactionFunded { .. }               => "intrigue.faction_funded",
            Self::CampaignResolved { .. }            => "diplomacy.campaign_resolved",
            Self::UltimatumResolved { .. }           => "diplomacy.ultimatum_resolved",
            Self::ProjectCompleted { .. }            => "economy.project_completed",
            Self::SubsidyResolved { .. }             => "economy.subsidy_resolved",
            Self::SpendingCutResolved { .. }         => "economy.spending_cut_resolved",
            Self::Fortified { .. }                   => "military.fortified",
            Self::ArmyReorganized { .. }             => "military.army_reorganized",
            Self::CommitteeConcluded { .. }          => "politics.committee_concluded",
            Self::CrackdownResolved { .. }           => "politics.crackdown_resolved",
        }
    }
}

/// What a successful spy operation learns about its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelReport {
    pub treasury:   i64,
    pub force_size: i64,
    pub readiness:  f64,
    pub stability:  f64,
}
