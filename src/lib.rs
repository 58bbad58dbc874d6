//! Marshfall - physics core for a rising-liquid 2D platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, spatial grid, collision response)
//! - `tuning`: Data-driven game-feel parameters
//!
//! Coordinates are screen-space: y grows downward, so positive vertical
//! velocity means falling and "the liquid surface rising" means its top edge
//! moving toward smaller y. The whole simulation advances in fixed per-tick
//! steps driven by the host loop; rendering, audio, cameras, input devices
//! and score persistence are host concerns and never appear here.

pub mod sim;
pub mod tuning;

pub use sim::{
    BlockSpawner, Body, BodyId, BodyKind, CharacterState, InputState, Layers, RectF, RisingZone,
    RunDirector, SpatialGrid, World,
};
pub use tuning::Tuning;

/// Simulation constants
pub mod consts {
    /// Baseline gravitational acceleration, scaled per body by its gravity modifier
    pub const GRAVITY_CONST: f32 = 9.8;
    /// Extra gravity while falling - descents read snappier than rises
    pub const FALL_GRAVITY_SCALE: f32 = 1.25;
    /// Reduced gravity while rising clear of any wall
    pub const RISE_GRAVITY_SCALE: f32 = 0.85;
    /// Ticks a body still counts as "was grounded" after stepping off an edge
    pub const GROUND_GRACE_TICKS: u32 = 3;
    /// Horizontal steering acceleration, in move-speeds per second
    pub const STEER_ACCEL_RATE: f32 = 100.0;
    /// Velocity multiplier applied on a wall-jump (both axes)
    pub const WALL_JUMP_BOOST: f32 = 1.25;
}
