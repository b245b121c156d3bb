//! Relation drift tests — decay toward neutrality.

use chrono::{TimeZone, Utc};
use statecraft_core::{
    state::{NationState, RelationEdge, WorldState},
    TickEngine, TurnContext,
};

fn world_with_relation(value: i32) -> WorldState {
    let mut world = WorldState::new(77, "A");
    world.nations.insert("A".into(), NationState::default());
    world.nations.insert("B".into(), NationState::default());
    world.relations.edge_mut("A", "B").set_value(value);
    world
}

fn assert_converges(start: i32) {
    let engine = TickEngine::build(&Default::default());
    let now = Utc.timestamp_opt(0, 0).unwrap();
    let mut state = world_with_relation(start);
    let mut previous = start;

    for week in 0..2_000 {
        state = engine.tick(&state, &TurnContext::for_state(&state, now)).next_state;
        let value = state.relations.value("A", "B");
        assert!(value.abs() <= previous.abs(), "week {week}: magnitude grew {previous} -> {value}");
        assert!(value == 0 || value.signum() == start.signum(), "week {week}: crossed zero at {value}");
        previous = value;
    }
    assert_eq!(previous, 0, "relation from {start} did not reach neutrality");
}

#[test]
fn positive_relation_decays_to_zero() {
    assert_converges(100);
}

#[test]
fn negative_relation_decays_to_zero() {
    assert_converges(-100);
}

#[test]
fn small_relation_decays_to_zero() {
    assert_converges(7);
}

/// Drift keeps treaties and war status; it only moves the score.
#[test]
fn drift_preserves_treaties_and_war_flags() {
    let mut world = world_with_relation(0);
    let mut edge = RelationEdge::neutral("B", "A");
    edge.value = -80;
    edge.at_war = true;
    edge.treaties.insert("armistice".into());
    world.relations.insert(edge);

    let engine = TickEngine::build(&Default::default());
    let outcome = engine.tick(&world, &TurnContext::for_state(&world, Utc.timestamp_opt(0, 0).unwrap()));
    let after = outcome.next_state.relations.get("B", "A").unwrap();

    assert_eq!(after.value, -79);
    assert!(after.at_war);
    assert!(after.treaties.contains("armistice"));
}
