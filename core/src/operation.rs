//! Queued multi-week operations and their per-kind parameters.
//!
//! Operations arrive already validated from the action layer. Each kind
//! carries only the parameters its resolution uses; the resolver matches
//! exhaustively on `OperationKind`, so adding a kind without a handler
//! does not compile.

use crate::types::{NationId, OperationId, ProvinceId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operation_id:     OperationId,
    pub kind:             OperationKind,
    pub nation_id:        NationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_nation_id: Option<NationId>,
    pub remaining_weeks:  u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_weekly:    Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_total:     Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_budget: Option<i64>,
}

impl Operation {
    pub fn new(
        operation_id: impl Into<OperationId>,
        nation_id: impl Into<NationId>,
        kind: OperationKind,
        remaining_weeks: u32,
    ) -> Self {
        Self {
            operation_id:     operation_id.into(),
            kind,
            nation_id:        nation_id.into(),
            target_nation_id: None,
            remaining_weeks,
            budget_weekly:    None,
            budget_total:     None,
            remaining_budget: None,
        }
    }

    pub fn targeting(mut self, target: impl Into<NationId>) -> Self {
        self.target_nation_id = Some(target.into());
        self
    }

    pub fn with_budget_weekly(mut self, amount: i64) -> Self {
        self.budget_weekly = Some(amount);
        self
    }

    /// Sets both the total and the still-unspent budget.
    pub fn with_budget_total(mut self, amount: i64) -> Self {
        self.budget_total = Some(amount);
        self.remaining_budget = Some(amount);
        self
    }

    /// This week's spend, computed from the pre-decrement countdown.
    ///
    /// Spending cuts are a negative spend. Budgeted operations amortize
    /// what is left evenly over the remaining weeks.
    pub fn weekly_spend(&self) -> i64 {
        if let OperationKind::SpendingCut { weekly_amount, .. } = &self.kind {
            return -weekly_amount;
        }
        match (self.remaining_budget, self.budget_weekly) {
            (Some(remaining), _) => {
                let weeks = i64::from(self.remaining_weeks.max(1));
                let remaining = remaining.max(0);
                (remaining + weeks - 1) / weeks
            }
            (None, Some(weekly)) => weekly,
            (None, None) => 0,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationKind {
    SpyOperation,
    Counterintelligence,
    DiplomacyCampaign,
    FundProject {
        province_id:  ProvinceId,
        project_type: ProjectType,
    },
    Fortify {
        province_id: ProvinceId,
        level:       u32,
    },
    ReorganizeArmy {
        focus: ArmyFocus,
    },
    SectorSubsidy {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sector: Option<String>,
    },
    Committee {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
    FundFaction {
        #[serde(default)]
        secrecy: Secrecy,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        faction: Option<String>,
    },
    Ultimatum {
        #[serde(default = "default_backdown_cost")]
        backdown_cost: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        demand: Option<String>,
    },
    SpendingCut {
        category:      CutCategory,
        weekly_amount: i64,
    },
    Crackdown {
        province_id: ProvinceId,
        intensity:   f64,
    },
}

fn default_backdown_cost() -> f64 {
    2.0
}

impl OperationKind {
    /// Stable snake_case tag, identical to the serialized `type`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SpyOperation          => "spy_operation",
            Self::Counterintelligence   => "counterintelligence",
            Self::DiplomacyCampaign     => "diplomacy_campaign",
            Self::FundProject { .. }    => "fund_project",
            Self::Fortify { .. }        => "fortify",
            Self::ReorganizeArmy { .. } => "reorganize_army",
            Self::SectorSubsidy { .. }  => "sector_subsidy",
            Self::Committee { .. }      => "committee",
            Self::FundFaction { .. }    => "fund_faction",
            Self::Ultimatum { .. }      => "ultimatum",
            Self::SpendingCut { .. }    => "spending_cut",
            Self::Crackdown { .. }      => "crackdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Infrastructure,
    Fortifications,
    Bureaucracy,
    Schools,
    Shipyards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmyFocus {
    Training,
    OfficerCorps,
    Logistics,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Secrecy {
    Low,
    High,
    #[default]
    #[serde(other)]
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutCategory {
    Military,
    Administration,
    Court,
    Infrastructure,
    Subsidies,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgeted_spend_amortizes_with_ceiling() {
        let op = Operation::new("op", "a", OperationKind::DiplomacyCampaign, 3)
            .with_budget_total(1_000);
        assert_eq!(op.weekly_spend(), 334);
    }

    #[test]
    fn negative_remaining_budget_spends_nothing() {
        let mut op = Operation::new("op", "a", OperationKind::Counterintelligence, 2);
        op.remaining_budget = Some(-50);
        assert_eq!(op.weekly_spend(), 0);
    }

    #[test]
    fn weekly_budget_is_spent_as_is() {
        let op = Operation::new("op", "a", OperationKind::SpyOperation, 4).with_budget_weekly(120);
        assert_eq!(op.weekly_spend(), 120);
    }

    #[test]
    fn spending_cut_is_a_negative_spend() {
        let kind = OperationKind::SpendingCut {
            category:      CutCategory::Court,
            weekly_amount: 400,
        };
        let op = Operation::new("op", "a", kind, 2).with_budget_weekly(999);
        assert_eq!(op.weekly_spend(), -400);
    }

    #[test]
    fn unbudgeted_operation_spends_nothing() {
        let op = Operation::new("op", "a", OperationKind::Committee { topic: None }, 2);
        assert_eq!(op.weekly_spend(), 0);
    }

    #[test]
    fn kind_tag_matches_serialized_type() {
        let kind = OperationKind::Fortify { province_id: "p1".into(), level: 2 };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], kind.name());
    }

    #[test]
    fn unknown_secrecy_and_focus_fall_back() {
        let kind: OperationKind =
            serde_json::from_str(r#"{"type":"fund_faction","secrecy":"whispered"}"#).unwrap();
        assert_eq!(kind, OperationKind::FundFaction { secrecy: Secrecy::Medium, faction: None });

        let kind: OperationKind =
            serde_json::from_str(r#"{"type":"reorganize_army","focus":"cavalry"}"#).unwrap();
        assert_eq!(kind, OperationKind::ReorganizeArmy { focus: ArmyFocus::Other });
    }

    #[test]
    fn ultimatum_backdown_cost_defaults_to_two() {
        let kind: OperationKind = serde_json::from_str(r#"{"type":"ultimatum"}"#).unwrap();
        assert_eq!(kind, OperationKind::Ultimatum { backdown_cost: 2.0, demand: None });
    }
}
