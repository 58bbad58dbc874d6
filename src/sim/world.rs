//! World ownership and the fixed-step tick
//!
//! The world owns the body arena, the broad-phase grid and the rising zone,
//! and advances everything one step per `tick` call:
//! controller pre-step -> integration -> membership refresh -> collision
//! resolution -> controller post-step -> rising zone -> deferred removals.
//! All mutation happens inside the tick; the host only spawns, removes,
//! feeds input and queries.

use super::body::{Body, BodyArena, BodyId, BodyKind};
use super::character::{self, CharacterState, InputState};
use super::collision;
use super::grid::SpatialGrid;
use super::zone::RisingZone;
use crate::consts::{FALL_GRAVITY_SCALE, GRAVITY_CONST, RISE_GRAVITY_SCALE};
use crate::tuning::Tuning;

/// The simulation world
pub struct World {
    width: f32,
    height: f32,
    pub(crate) bodies: BodyArena,
    grid: SpatialGrid,
    zone: RisingZone,
    character_id: Option<BodyId>,
    pending_removals: Vec<BodyId>,
    tuning: Tuning,
    tick_count: u64,
}

impl World {
    pub fn new(width: f32, height: f32, rows: u32, columns: u32, tuning: Tuning) -> Self {
        Self {
            width,
            height,
            bodies: BodyArena::new(),
            grid: SpatialGrid::new(rows, columns, width, height),
            zone: RisingZone::new(),
            character_id: None,
            pending_removals: Vec::new(),
            tuning,
            tick_count: 0,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn zone(&self) -> &RisingZone {
        &self.zone
    }

    pub fn zone_mut(&mut self) -> &mut RisingZone {
        &mut self.zone
    }

    /// Resize the world. Rebuilds the grid and re-registers every body, so
    /// membership is consistent again before the call returns.
    pub fn set_size(&mut self, width: f32, height: f32) {
        debug_assert!(width > 0.0 && height > 0.0, "degenerate world size");
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        log::info!("World resized to {width}x{height}, rebuilding grid");
        self.width = width;
        self.height = height;
        self.grid.rebuild(width, height);
        for id in self.bodies.ids() {
            let bounds = self.bodies.get(id).map(|b| b.bounds());
            if let Some(bounds) = bounds {
                self.grid.register(id, bounds);
            }
        }
    }

    /// Add a body to the world and the grid. Returns its handle.
    pub fn spawn(&mut self, body: Body) -> BodyId {
        let is_character = matches!(body.kind, BodyKind::Character(_));
        debug_assert!(
            !(is_character && self.character_id.is_some()),
            "second character spawned"
        );
        let id = self.bodies.insert(body);
        let bounds = self.bodies.get(id).map(|b| b.bounds()).unwrap_or_default();
        self.grid.register(id, bounds);
        if is_character {
            self.character_id = Some(id);
        }
        id
    }

    /// Remove a body immediately. Safe for hosts between ticks; removal of an
    /// unknown id is a no-op.
    pub fn remove(&mut self, id: BodyId) {
        self.grid.unregister(id);
        self.bodies.remove(id);
        if self.character_id == Some(id) {
            self.character_id = None;
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Live bodies in ascending id order, for the host's render pass
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn character_id(&self) -> Option<BodyId> {
        self.character_id
    }

    pub fn character(&self) -> Option<&Body> {
        self.character_id.and_then(|id| self.bodies.get(id))
    }

    /// Derived character movement state, if a character exists
    pub fn character_state(&self) -> Option<CharacterState> {
        self.character().map(character::state_of)
    }

    pub fn character_is_dead(&self) -> bool {
        self.character()
            .and_then(Body::character)
            .is_some_and(|c| c.is_dead())
    }

    /// Feed this tick's logical input; call once before `tick`
    pub fn set_character_input(&mut self, input: InputState) {
        if let Some(ch) = self
            .character_id
            .and_then(|id| self.bodies.get_mut(id))
            .and_then(Body::character_mut)
        {
            ch.set_input(input);
        }
    }

    /// Advance the simulation one step
    pub fn tick(&mut self, dt: f32) {
        debug_assert!(dt > 0.0, "non-positive tick dt");
        if dt <= 0.0 {
            return;
        }
        self.tick_count += 1;

        // controller reads last tick's contact flags before they are cleared
        if let Some(cid) = self.character_id {
            character::pre_step(&mut self.bodies, cid, &self.tuning, dt);
        }

        // integrate moving bodies in id order, refreshing their cells
        for id in self.bodies.ids() {
            let Some(body) = self.bodies.get_mut(id) else {
                continue;
            };
            if !body.is_integrable() {
                continue;
            }
            integrate(body, dt);
            let bounds = body.bounds();
            self.grid.register(id, bounds);
        }

        collision::resolve(&mut self.bodies, &mut self.grid, &self.tuning);

        if let Some(cid) = self.character_id {
            character::post_step(&mut self.bodies, cid, &self.tuning);
        }

        let submerged = self.zone.update(&mut self.bodies, &self.tuning, dt);
        self.pending_removals.extend(submerged);

        // dissolving may have moved the character; keep membership exact
        if let Some(cid) = self.character_id {
            if let Some(bounds) = self.bodies.get(cid).map(|b| b.bounds()) {
                self.grid.register(cid, bounds);
            }
        }

        // deferred despawns: the body set is never mutated mid-iteration
        for id in std::mem::take(&mut self.pending_removals) {
            self.grid.unregister(id);
            self.bodies.remove(id);
        }
    }
}

/// Advance one moving body: gravity with the directional feel curve, fall
/// clamp, position integration. Contact flags are snapshotted here so the
/// resolver starts from a clean slate.
fn integrate(body: &mut Body, dt: f32) {
    body.contacts.begin_tick();

    // feel curve: heavier when falling, lighter when rising clear of walls
    let directional = if body.velocity.y > 0.0 {
        FALL_GRAVITY_SCALE
    } else if body.velocity.y < 0.0 && !body.contacts.was_on_wall() {
        RISE_GRAVITY_SCALE
    } else {
        1.0
    };

    // wall-sliding overrides gravity for a tick
    let gravity_modifier = match body.character_mut().and_then(|c| c.gravity_override.take()) {
        Some(overridden) => overridden,
        None => body.gravity_modifier,
    };

    body.velocity.y += gravity_modifier * GRAVITY_CONST * directional * dt;
    body.velocity.y = body.velocity.y.min(body.max_fall_speed);
    body.position += body.velocity * dt;
}
