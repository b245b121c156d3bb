//! Snapshot serialization — full world state to/from JSON.
//!
//! A snapshot captures everything needed to run the next tick. The
//! round-trip is lossless for every field of `WorldState`.

use crate::{
    error::{SimError, SimResult},
    state::WorldState,
};

pub fn world_from_json(content: &str) -> SimResult<WorldState> {
    Ok(serde_json::from_str(content)?)
}

pub fn world_to_json(state: &WorldState) -> SimResult<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

pub fn load_world(path: &str) -> SimResult<WorldState> {
    let content = std::fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_string(),
        source,
    })?;
    let state = world_from_json(&content)?;
    log::debug!(
        "loaded {path}: turn {}, {} nations, {} operations",
        state.turn_index,
        state.nations.len(),
        state.operations.len()
    );
    Ok(state)
}

pub fn save_world(path: &str, state: &WorldState) -> SimResult<()> {
    let json = world_to_json(state)?;
    std::fs::write(path, json).map_err(|source| SimError::Io {
        path: path.to_string(),
        source,
    })?;
    log::debug!("snapshot saved at turn {} to {path}", state.turn_index);
    Ok(())
}

/// The player nation must exist before a scenario is run.
pub fn ensure_player_nation(state: &WorldState) -> SimResult<()> {
    if state.nations.contains_key(&state.player_nation_id) {
        Ok(())
    } else {
        Err(SimError::UnknownPlayerNation {
            id: state.player_nation_id.clone(),
        })
    }
}
