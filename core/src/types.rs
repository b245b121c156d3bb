//! Shared primitive types used across the entire simulation.

/// A simulation turn. One turn = one in-game week.
pub type TurnIndex = u64;

/// Per-game seed. XORed with the turn index to derive each tick's stream.
pub type TurnSeed = u32;

/// Stable identifier of a nation.
pub type NationId = String;

/// Stable identifier of a province or region.
pub type ProvinceId = String;

/// Stable identifier of a queued operation.
pub type OperationId = String;

/// Weeks per in-game year. Annual rates are divided by this.
pub const WEEKS_PER_YEAR: f64 = 52.0;

/// Weeks per in-game decade. Decade-scale trajectory rates use this.
pub const WEEKS_PER_DECADE: f64 = 520.0;
