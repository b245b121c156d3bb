//! Invariant tests — bounded fields stay bounded under a busy queue.

use chrono::{TimeZone, Utc};
use statecraft_core::{
    operation::{ArmyFocus, CutCategory, Operation, OperationKind, ProjectType, Secrecy},
    state::{NationState, NationTrajectory, ProvinceState, WorldState},
    TickEngine, TurnContext,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Nations near their bounds, with every operation kind queued at staggered lengths.
fn stressed_world() -> WorldState {
    let mut world = WorldState::new(0xABCD, "red");
    world.nations.insert(
        "red".into(),
        NationState {
            stability: 99.5,
            compliance: 0.995,
            literacy: 0.999,
            readiness: 0.98,
            supply: 0.99,
            corruption: 0.005,
            admin_capacity: 99.5,
            tax_rate: 0.9,
            ..NationState::default()
        },
    );
    world.nations.insert(
        "blue".into(),
        NationState {
            stability: 0.5,
            compliance: 0.01,
            literacy: 0.0,
            readiness: 0.02,
            legitimacy: 1.0,
            force_size: 400,
            ..NationState::default()
        },
    );
    world.provinces.insert(
        "north".into(),
        ProvinceState { nation_id: "red".into(), infrastructure: 9.9, garrison: 999_999, unrest: 99.0, ..ProvinceState::default() },
    );
    world.relations.edge_mut("red", "blue").set_value(99);
    world.relations.edge_mut("blue", "red").set_value(-99);
    world.trajectories.insert(
        "blue".into(),
        NationTrajectory {
            gdp_growth_decade:        -2.0,
            population_growth_decade: 9.0,
            stability_drift_decade:   -500.0,
            literacy_growth_decade:   300.0,
        },
    );

    let kinds = vec![
        OperationKind::SpyOperation,
        OperationKind::Counterintelligence,
        OperationKind::DiplomacyCampaign,
        OperationKind::FundProject { province_id: "north".into(), project_type: ProjectType::Infrastructure },
        OperationKind::Fortify { province_id: "north".into(), level: 9 },
        OperationKind::ReorganizeArmy { focus: ArmyFocus::Training },
        OperationKind::SectorSubsidy { sector: None },
        OperationKind::Committee { topic: None },
        OperationKind::FundFaction { secrecy: Secrecy::Low, faction: None },
        OperationKind::Ultimatum { backdown_cost: 40.0, demand: None },
        OperationKind::SpendingCut { category: CutCategory::Military, weekly_amount: 1_000 },
        OperationKind::Crackdown { province_id: "north".into(), intensity: 30.0 },
    ];
    for (i, kind) in kinds.into_iter().enumerate() {
        for (actor, target) in [("red", "blue"), ("blue", "red")] {
            world.operations.push(
                Operation::new(format!("{actor}-{i}"), actor, kind.clone(), 1 + (i as u32 % 4))
                    .targeting(target)
                    .with_budget_total(2_000),
            );
        }
    }
    world
}

fn assert_bounded(state: &WorldState, week: u64) {
    for (id, n) in &state.nations {
        let unit = 0.0..=1.0;
        let percent = 0.0..=100.0;
        assert!(percent.contains(&n.stability), "week {week} {id}: stability {}", n.stability);
        assert!(percent.contains(&n.legitimacy), "week {week} {id}: legitimacy {}", n.legitimacy);
        assert!(percent.contains(&n.admin_capacity), "week {week} {id}: admin {}", n.admin_capacity);
        assert!(unit.contains(&n.compliance), "week {week} {id}: compliance {}", n.compliance);
        assert!(unit.contains(&n.literacy), "week {week} {id}: literacy {}", n.literacy);
        assert!(unit.contains(&n.readiness), "week {week} {id}: readiness {}", n.readiness);
        assert!(unit.contains(&n.supply), "week {week} {id}: supply {}", n.supply);
        assert!(unit.contains(&n.corruption), "week {week} {id}: corruption {}", n.corruption);
        assert!(n.gdp >= 1.0, "week {week} {id}: gdp {}", n.gdp);
        assert!(n.population >= 1.0, "week {week} {id}: population {}", n.population);
        assert!(n.force_size >= 0, "week {week} {id}: force_size {}", n.force_size);
        assert!(n.debt >= 0.0, "week {week} {id}: debt {}", n.debt);
    }
    for edge in state.relations.iter() {
        assert!((-100..=100).contains(&edge.value), "week {week}: relation {}", edge.value);
    }
    for (id, p) in &state.provinces {
        assert!((0.0..=10.0).contains(&p.infrastructure), "week {week} {id}: infrastructure {}", p.infrastructure);
        assert!((0.0..=10.0).contains(&p.productivity), "week {week} {id}: productivity {}", p.productivity);
        assert!((0.0..=100.0).contains(&p.unrest), "week {week} {id}: unrest {}", p.unrest);
        assert!((0..=1_000_000).contains(&p.garrison), "week {week} {id}: garrison {}", p.garrison);
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn bounded_fields_stay_bounded() {
    init_logging();
    let engine = TickEngine::build(&Default::default());
    let now = Utc.timestamp_opt(0, 0).unwrap();
    let mut state = stressed_world();

    for week in 0..60 {
        let outcome = engine.tick(&state, &TurnContext::for_state(&state, now));
        assert_eq!(outcome.next_state.turn_index, state.turn_index + 1);
        assert_bounded(&outcome.next_state, week);
        state = outcome.next_state;
    }
    assert!(state.operations.is_empty());
}

/// Every resolving operation emits exactly one effect.
#[test]
fn every_resolution_emits_one_effect() {
    init_logging();
    let engine = TickEngine::build(&Default::default());
    let now = Utc.timestamp_opt(0, 0).unwrap();
    let world = stressed_world();
    let total_ops = world.operations.len();

    let outcome = engine.run_weeks(&world, 4, now);
    let resolutions = outcome
        .effects
        .iter()
        .filter(|e| !e.effect_type.starts_with("nation."))
        .count();
    assert_eq!(resolutions, total_ops);
}
