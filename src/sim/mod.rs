//! Deterministic platformer simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed per-tick steps only, driven by the host loop
//! - Seeded RNG only (block spawner)
//! - Stable iteration order (by body id)
//! - No rendering or platform dependencies
//!
//! Leaf-to-root: `rect` (geometry) -> `grid` (broad phase) -> `body` (arena
//! and kind taxonomy) -> `collision` (narrow phase + response matrix) ->
//! `world` (integration and the tick). `character`, `zone`, `spawner` and
//! `director` layer gameplay systems on top.

pub mod body;
pub mod character;
pub mod collision;
pub mod director;
pub mod grid;
pub mod rect;
pub mod spawner;
pub mod world;
pub mod zone;

pub use body::{BlockBody, Body, BodyArena, BodyId, BodyKind, ContactState, KindTag, Layers};
pub use character::{CharacterBody, CharacterState, InputState};
pub use director::RunDirector;
pub use grid::{GridCell, SpatialGrid};
pub use rect::RectF;
pub use spawner::BlockSpawner;
pub use world::World;
pub use zone::RisingZone;
