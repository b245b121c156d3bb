//! THE MOST IMPORTANT TEST IN THE PROJECT.
//!
//! Same snapshot, same context — bit-identical next state and effects.
//! Any divergence is a blocker — do not merge until fixed.

use chrono::{TimeZone, Utc};
use statecraft_core::{
    operation::{Operation, OperationKind, ProjectType, Secrecy},
    state::{DebtInstrument, NationState, NationTrajectory, ProvinceState, WorldState},
    tick_week, TickEngine, TurnContext,
};

fn busy_world(seed: u32) -> WorldState {
    let mut world = WorldState::new(seed, "england");
    for (id, gdp, force) in [("england", 4.0e6, 3_000), ("france", 6.0e6, 5_000), ("spain", 3.5e6, 2_500)] {
        world.nations.insert(
            id.into(),
            NationState { gdp, force_size: force, treasury: 50_000, ..NationState::default() },
        );
    }
    world.provinces.insert(
        "kent".into(),
        ProvinceState { nation_id: "england".into(), ..ProvinceState::default() },
    );
    world.relations.edge_mut("england", "france").set_value(-40);
    world.relations.edge_mut("france", "spain").set_value(35);
    world.trajectories.insert(
        "france".into(),
        NationTrajectory { gdp_growth_decade: 0.3, ..NationTrajectory::default() },
    );
    world.debt_instruments = Some(vec![DebtInstrument {
        instrument_id:        "consol".into(),
        nation_id:            "spain".into(),
        principal:            20_000.0,
        interest_rate_annual: 0.06,
        remaining_weeks:      6,
    }]);
    world.operations = vec![
        Operation::new("spy", "england", OperationKind::SpyOperation, 2).targeting("france"),
        Operation::new("ult", "france", OperationKind::Ultimatum { backdown_cost: 2.0, demand: None }, 3)
            .targeting("spain"),
        Operation::new("ff", "spain", OperationKind::FundFaction { secrecy: Secrecy::Low, faction: None }, 1)
            .targeting("england"),
        Operation::new(
            "fp",
            "england",
            OperationKind::FundProject { province_id: "kent".into(), project_type: ProjectType::Schools },
            4,
        )
        .with_budget_total(8_000),
    ];
    world
}

fn ctx(world: &WorldState) -> TurnContext {
    TurnContext::for_state(world, Utc.timestamp_opt(0, 0).unwrap())
}

#[test]
fn same_inputs_produce_identical_outcomes() {
    let world = busy_world(0xDEAD_BEEF);
    let a = tick_week(&world, &ctx(&world));
    let b = tick_week(&world, &ctx(&world));

    assert_eq!(a, b);
    let json_a = serde_json::to_string(&a).unwrap();
    let json_b = serde_json::to_string(&b).unwrap();
    assert_eq!(json_a, json_b, "serialized outcomes diverged");
}

#[test]
fn a_year_of_replays_is_identical() {
    const WEEKS: u64 = 52;
    let world = busy_world(0x1234_5678);
    let engine = TickEngine::build(&Default::default());

    let run_a = engine.run_weeks(&world, WEEKS, Utc.timestamp_opt(0, 0).unwrap());
    let run_b = engine.run_weeks(&world, WEEKS, Utc.timestamp_opt(1_000_000, 0).unwrap());

    assert_eq!(run_a.next_state.turn_index, WEEKS);
    assert_eq!(run_a.effects.len(), run_b.effects.len());
    for (i, (a, b)) in run_a.effects.iter().zip(run_b.effects.iter()).enumerate() {
        assert_eq!(a, b, "effect log diverged at entry {i}");
    }
    assert_eq!(run_a.next_state, run_b.next_state);
}

#[test]
fn different_seeds_produce_different_states() {
    let world_a = busy_world(42);
    let world_b = busy_world(99);

    let a = tick_week(&world_a, &ctx(&world_a));
    let b = tick_week(&world_b, &ctx(&world_b));

    let gdp_a = a.next_state.nations["england"].gdp;
    let gdp_b = b.next_state.nations["england"].gdp;
    assert_ne!(gdp_a.to_bits(), gdp_b.to_bits(), "seed is not being used");
}

#[test]
fn input_snapshot_is_never_mutated() {
    let world = busy_world(7);
    let before = world.clone();
    let outcome = tick_week(&world, &ctx(&world));

    assert_eq!(world, before);
    assert_ne!(outcome.next_state, world);
}

#[test]
fn wall_clock_does_not_influence_the_tick() {
    let world = busy_world(3);
    let early = TurnContext { now: Utc.timestamp_opt(0, 0).unwrap(), ..ctx(&world) };
    let late = TurnContext { now: Utc.timestamp_opt(4_000_000_000, 0).unwrap(), ..ctx(&world) };

    assert_eq!(tick_week(&world, &early), tick_week(&world, &late));
}
