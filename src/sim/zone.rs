//! Rising liquid volume
//!
//! A pure trigger: overlaps are detected but movement is never blocked. The
//! volume's bottom edge stays pinned where it was placed while the surface
//! (its top edge) climbs, so `position.y` falls by `rise_rate * dt` each tick
//! while the height grows by twice that. The character dissolves while
//! touching the liquid; blocks the surface has swallowed whole are despawned.

use glam::Vec2;

use super::body::{Body, BodyArena, BodyId, BodyKind};
use super::rect::RectF;
use crate::tuning::Tuning;

/// The rising trigger volume
#[derive(Debug, Default)]
pub struct RisingZone {
    bounds: RectF,
    rise_rate: f32,
    rising: bool,
}

impl RisingZone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the (initially empty) volume. `bottom_y` is the line the bottom
    /// edge stays pinned to while the surface climbs from it.
    pub fn place(&mut self, left: f32, bottom_y: f32, width: f32) {
        debug_assert!(width > 0.0, "zone with no width");
        self.bounds = RectF::new(left, bottom_y, width.max(0.0), 0.0);
    }

    pub fn begin_rising(&mut self) {
        if self.bounds.width <= 0.0 {
            debug_assert!(false, "begin_rising before place");
            return;
        }
        self.rising = true;
        log::info!("Rising zone active (rate {})", self.rise_rate);
    }

    pub fn stop_rising(&mut self) {
        self.rising = false;
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }

    pub fn set_rise_rate(&mut self, rate: f32) {
        self.rise_rate = rate.max(0.0);
    }

    /// Ratchet the rate upward, never past `cap`. Negative deltas are
    /// ignored: the ratchet is monotonic.
    pub fn increase_rise_rate(&mut self, delta: f32, cap: f32) {
        if delta <= 0.0 {
            return;
        }
        self.rise_rate = (self.rise_rate + delta).min(cap.max(self.rise_rate));
    }

    pub fn rise_rate(&self) -> f32 {
        self.rise_rate
    }

    pub fn bounds(&self) -> RectF {
        self.bounds
    }

    /// Y of the liquid surface (the volume's top edge)
    pub fn surface_y(&self) -> f32 {
        self.bounds.top()
    }

    /// Grow the volume, dissolve the character, and report fully-submerged
    /// blocks. The caller despawns them at end of tick so the body set is
    /// never mutated mid-iteration.
    pub(crate) fn update(
        &mut self,
        arena: &mut BodyArena,
        tuning: &Tuning,
        dt: f32,
    ) -> Vec<BodyId> {
        if !self.rising {
            return Vec::new();
        }

        // bottom edge stationary: the top moves up by rise while the height
        // grows by twice that
        let rise = self.rise_rate * dt;
        self.bounds.y -= rise;
        self.bounds.height += 2.0 * rise;

        let surface = self.surface_y();
        let mut submerged = Vec::new();

        for body in arena.iter_mut() {
            let id = body.id;
            let Body {
                position,
                size,
                velocity,
                kind,
                ..
            } = body;
            match kind {
                BodyKind::Character(ch) => {
                    if ch.is_dead() || size.y <= 0.0 {
                        continue;
                    }
                    let bounds = RectF::from_position_size(*position, *size);
                    if !self.bounds.intersects(&bounds) {
                        continue;
                    }
                    // dissolve by the depth the feet sit below the surface,
                    // then pin the shrunken box atop the surface
                    let depth = (bounds.bottom() - surface).max(0.0);
                    if depth <= 0.0 {
                        continue;
                    }
                    let new_height = (size.y - depth).max(0.0);
                    size.y = new_height;
                    position.y = surface - new_height;
                    ch.is_being_dissolved = true;
                    if new_height <= tuning.death_height {
                        ch.mark_dead();
                        *velocity = Vec2::ZERO;
                        log::info!("Character dissolved by the rising zone");
                    }
                }
                BodyKind::Block(_) => {
                    // swallowed whole once the surface clears the block's
                    // highest edge
                    if position.y >= surface {
                        submerged.push(id);
                    }
                }
                BodyKind::Static => {}
            }
        }

        if !submerged.is_empty() {
            log::debug!("{} block(s) submerged, despawning", submerged.len());
        }
        submerged
    }
}
