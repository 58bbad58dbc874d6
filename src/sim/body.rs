//! Body taxonomy and the contiguous body arena
//!
//! Every simulated thing is a `Body`: static level geometry, falling blocks,
//! or the player character. Bodies live in a `BodyArena` and are referred to
//! everywhere else (grid cells, contact records, spawner tracking) by integer
//! `BodyId` handles, never by reference, so removal and grid rebuilds cannot
//! dangle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::character::CharacterBody;
use super::rect::RectF;
use crate::consts::GROUND_GRACE_TICKS;
use crate::tuning::Tuning;

/// Handle into the body arena
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BodyId(pub u32);

/// Collision layer bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Layers(pub u8);

impl Layers {
    pub const NONE: Layers = Layers(0);
    pub const STATIC: Layers = Layers(1 << 0);
    pub const BLOCK: Layers = Layers(1 << 1);
    pub const CHARACTER: Layers = Layers(1 << 2);

    /// True if any layer bit is shared
    #[inline]
    pub fn contains(self, other: Layers) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for Layers {
    type Output = Layers;

    fn bitor(self, rhs: Layers) -> Layers {
        Layers(self.0 | rhs.0)
    }
}

/// Per-axis contact flags with previous-tick shadows
///
/// Live flags are cleared at the start of every tick and re-set by that
/// tick's collision responses. Grace-period logic (jump buffering, sliding)
/// reads the `was_*` shadows; `was_grounded` in particular lingers for a few
/// ticks after stepping off an edge.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ContactState {
    pub grounded: bool,
    pub on_left_wall: bool,
    pub on_right_wall: bool,
    pub touching_top_edge: bool,

    pub was_grounded: bool,
    pub was_on_left_wall: bool,
    pub was_on_right_wall: bool,
    pub was_touching_top_edge: bool,

    /// Body this one is standing on, if any (for ride-along velocity)
    pub ground_body: Option<BodyId>,
    pub left_wall_body: Option<BodyId>,
    pub right_wall_body: Option<BodyId>,

    ticks_since_grounded: u32,
}

impl ContactState {
    /// Snapshot live flags into the shadows and clear them for this tick
    pub fn begin_tick(&mut self) {
        if !self.grounded && self.was_grounded {
            // keep "was grounded" alive briefly so a jump still registers
            // right after walking off an edge
            self.ticks_since_grounded += 1;
            if self.ticks_since_grounded > GROUND_GRACE_TICKS {
                self.was_grounded = false;
                self.ticks_since_grounded = 0;
            }
        } else {
            self.was_grounded = self.grounded;
            self.ticks_since_grounded = 0;
        }

        self.was_on_left_wall = self.on_left_wall;
        self.was_on_right_wall = self.on_right_wall;
        self.was_touching_top_edge = self.touching_top_edge;

        self.grounded = false;
        self.on_left_wall = false;
        self.on_right_wall = false;
        self.touching_top_edge = false;
        self.ground_body = None;
        self.left_wall_body = None;
        self.right_wall_body = None;
    }

    #[inline]
    pub fn on_wall(&self) -> bool {
        self.on_left_wall || self.on_right_wall
    }

    #[inline]
    pub fn was_on_wall(&self) -> bool {
        self.was_on_left_wall || self.was_on_right_wall
    }

    /// Grounded now or within the step-off grace window
    #[inline]
    pub fn grounded_or_grace(&self) -> bool {
        self.grounded || self.was_grounded
    }
}

/// Block payload: `settled` is the sticky grounded flag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockBody {
    /// Once true the block never moves again and is skipped by integration
    pub settled: bool,
}

/// Kind taxonomy; the payload carries kind-specific state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BodyKind {
    Static,
    Block(BlockBody),
    Character(CharacterBody),
}

/// Payload-free view of a body's kind, used to key the collision response
/// table on `(kind, kind)` pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KindTag {
    Static,
    Block,
    Character,
}

impl BodyKind {
    pub fn tag(&self) -> KindTag {
        match self {
            BodyKind::Static => KindTag::Static,
            BodyKind::Block(_) => KindTag::Block,
            BodyKind::Character(_) => KindTag::Character,
        }
    }

    /// The collision layer this kind occupies
    pub fn layer(&self) -> Layers {
        match self {
            BodyKind::Static => Layers::STATIC,
            BodyKind::Block(_) => Layers::BLOCK,
            BodyKind::Character(_) => Layers::CHARACTER,
        }
    }

    /// The layers this kind reacts to. Asymmetric: static geometry reacts to
    /// nothing, and nothing in the matrix makes a block react to the
    /// character (the character does the reacting in that pair).
    pub fn default_collides_with(&self) -> Layers {
        match self {
            BodyKind::Static => Layers::NONE,
            BodyKind::Block(_) => Layers::STATIC | Layers::BLOCK,
            BodyKind::Character(_) => Layers::STATIC | Layers::BLOCK,
        }
    }
}

/// A simulated rigid rectangle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    /// Top-left corner
    pub position: Vec2,
    /// Extent; only crush/dissolve responses may shrink the height
    pub size: Vec2,
    pub velocity: Vec2,
    pub gravity_modifier: f32,
    /// Clamp on downward velocity
    pub max_fall_speed: f32,
    pub layer: Layers,
    pub collides_with: Layers,
    pub contacts: ContactState,
    pub kind: BodyKind,
}

impl Body {
    fn new(position: Vec2, size: Vec2, kind: BodyKind) -> Self {
        debug_assert!(size.x > 0.0 && size.y > 0.0, "body with non-positive size");
        Self {
            id: BodyId(0),
            position,
            size,
            velocity: Vec2::ZERO,
            gravity_modifier: 1.0,
            max_fall_speed: f32::MAX,
            layer: kind.layer(),
            collides_with: kind.default_collides_with(),
            contacts: ContactState::default(),
            kind,
        }
    }

    /// Immovable level geometry
    pub fn new_static(position: Vec2, size: Vec2) -> Self {
        Self::new(position, size, BodyKind::Static)
    }

    /// A falling block; spawns already at its terminal fall speed
    pub fn new_block(position: Vec2, size: Vec2, fall_speed: f32) -> Self {
        let mut body = Self::new(position, size, BodyKind::Block(BlockBody::default()));
        body.max_fall_speed = fall_speed;
        body.velocity = Vec2::new(0.0, fall_speed);
        body
    }

    /// The player character
    pub fn new_character(position: Vec2, size: Vec2, tuning: &Tuning) -> Self {
        let mut body = Self::new(
            position,
            size,
            BodyKind::Character(CharacterBody::new(tuning)),
        );
        body.gravity_modifier = tuning.character_gravity_modifier;
        body.max_fall_speed = tuning.character_max_fall_speed;
        body
    }

    #[inline]
    pub fn bounds(&self) -> RectF {
        RectF::from_position_size(self.position, self.size)
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self.kind, BodyKind::Static)
    }

    pub fn block(&self) -> Option<&BlockBody> {
        match &self.kind {
            BodyKind::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn block_mut(&mut self) -> Option<&mut BlockBody> {
        match &mut self.kind {
            BodyKind::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn character(&self) -> Option<&CharacterBody> {
        match &self.kind {
            BodyKind::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn character_mut(&mut self) -> Option<&mut CharacterBody> {
        match &mut self.kind {
            BodyKind::Character(c) => Some(c),
            _ => None,
        }
    }

    /// True for a block that has landed for good
    pub fn is_settled_block(&self) -> bool {
        self.block().is_some_and(|b| b.settled)
    }

    /// Whether integration should advance this body this tick
    pub fn is_integrable(&self) -> bool {
        match &self.kind {
            BodyKind::Static => false,
            BodyKind::Block(b) => !b.settled,
            BodyKind::Character(c) => !c.is_dead(),
        }
    }
}

/// Contiguous body storage with stable integer handles
///
/// Slots of removed bodies stay empty for the rest of the run, so a `BodyId`
/// is never reused and iteration order is always ascending by id.
#[derive(Debug, Default)]
pub struct BodyArena {
    slots: Vec<Option<Body>>,
    live: usize,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a body, assigning its id. Returns the new handle.
    pub fn insert(&mut self, mut body: Body) -> BodyId {
        let id = BodyId(self.slots.len() as u32);
        body.id = id;
        self.slots.push(Some(body));
        self.live += 1;
        id
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    /// Remove a body; removing an absent id is a no-op
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let slot = self.slots.get_mut(id.0 as usize)?;
        let body = slot.take();
        if body.is_some() {
            self.live -= 1;
        }
        body
    }

    /// Disjoint mutable access to two distinct bodies
    pub fn get_pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut Body, &mut Body)> {
        let (ai, bi) = (a.0 as usize, b.0 as usize);
        if ai == bi || ai >= self.slots.len() || bi >= self.slots.len() {
            return None;
        }
        let (lo, hi) = if ai < bi { (ai, bi) } else { (bi, ai) };
        let (head, tail) = self.slots.split_at_mut(hi);
        let first = head[lo].as_mut()?;
        let second = tail[0].as_mut()?;
        Some(if ai < bi { (first, second) } else { (second, first) })
    }

    /// Live bodies in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.slots.iter_mut().filter_map(|s| s.as_mut())
    }

    /// Snapshot of live ids in ascending order
    pub fn ids(&self) -> Vec<BodyId> {
        self.iter().map(|b| b.id).collect()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
