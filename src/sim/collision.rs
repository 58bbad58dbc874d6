//! Narrow-phase AABB resolution and the per-kind response matrix
//!
//! The grid hands us bodies sharing a cell; every unordered pair is tested
//! exactly once per tick (deduplicated across cells the pair shares), the
//! signed overlap computed, and the shallower axis resolved - the cheapest
//! separation, never a snap across the long axis. All responses live in one
//! dispatch below so the asymmetric matrix stays auditable: static geometry
//! never reacts, blocks react to static bodies and to settled blocks, and the
//! character reacts to everything solid, including being crushed by a block
//! landing on it.

use std::collections::HashSet;

use glam::Vec2;

use super::body::{Body, BodyArena, BodyId, KindTag};
use super::grid::SpatialGrid;
use crate::tuning::Tuning;

/// Which side of the subject a contact resolved on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Above,
    Below,
}

/// Run the narrow phase over every cell, then refresh grid membership for
/// bodies the responses displaced.
pub(crate) fn resolve(arena: &mut BodyArena, grid: &mut SpatialGrid, tuning: &Tuning) {
    let mut tested: HashSet<(BodyId, BodyId)> = HashSet::new();
    let mut moved: Vec<BodyId> = Vec::new();

    for cell_idx in 0..grid.cells().len() {
        let members = grid.cells()[cell_idx].bodies().to_vec();
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let pair = if members[i] < members[j] {
                    (members[i], members[j])
                } else {
                    (members[j], members[i])
                };
                if !tested.insert(pair) {
                    continue;
                }
                resolve_pair(arena, pair.0, pair.1, tuning, &mut moved);
            }
        }
    }

    for id in moved {
        if let Some(body) = arena.get(id) {
            grid.register(id, body.bounds());
        }
    }
}

fn resolve_pair(
    arena: &mut BodyArena,
    a_id: BodyId,
    b_id: BodyId,
    tuning: &Tuning,
    moved: &mut Vec<BodyId>,
) {
    let Some((a, b)) = arena.get_pair_mut(a_id, b_id) else {
        return;
    };
    if a.is_static() && b.is_static() {
        return;
    }

    let a_before = a.position;
    let b_before = b.position;

    if a.collides_with.contains(b.layer) {
        if let Some(overlap) = a.bounds().overlap(&b.bounds()) {
            respond(a, b, overlap, tuning);
        }
    }
    if b.collides_with.contains(a.layer) {
        // recompute: the first response may have separated the pair
        if let Some(overlap) = b.bounds().overlap(&a.bounds()) {
            respond(b, a, overlap, tuning);
        }
    }

    if a.position != a_before {
        moved.push(a_id);
    }
    if b.position != b_before {
        moved.push(b_id);
    }
}

/// One entry of the response matrix: `subject` reacts to overlapping `other`.
/// Only the subject is ever mutated.
fn respond(subject: &mut Body, other: &Body, overlap: Vec2, tuning: &Tuning) {
    // settled blocks and the dead character are inert, like static geometry
    if subject.is_settled_block() || subject.character().is_some_and(|c| c.is_dead()) {
        return;
    }

    match (subject.kind.tag(), other.kind.tag()) {
        (KindTag::Static, _) => {}
        (KindTag::Block, KindTag::Static) => {
            if contact(subject, other, overlap) == Some(Side::Below) {
                // the seed of a grounded stack
                settle(subject, other);
            }
        }
        (KindTag::Block, KindTag::Block) => block_on_block(subject, other, overlap),
        (KindTag::Block, KindTag::Character) => {} // blocks never react to the character
        (KindTag::Character, KindTag::Block) => character_on_block(subject, other, overlap, tuning),
        (KindTag::Character, KindTag::Static) => {
            contact(subject, other, overlap);
        }
        (KindTag::Character, KindTag::Character) => {}
    }
}

/// Generic solid contact: set the flag for the resolved side, kill the
/// velocity component driving into the surface, and snap flush against it.
fn contact(subject: &mut Body, other: &Body, overlap: Vec2) -> Option<Side> {
    let other_bounds = other.bounds();

    if overlap.x.abs() <= overlap.y.abs() {
        // x is the shallow axis; equal depths also resolve on x
        if overlap.x > 0.0 {
            subject.contacts.on_right_wall = true;
            subject.contacts.right_wall_body = Some(other.id);
            if subject.velocity.x > 0.0 {
                subject.velocity.x = 0.0;
                subject.position.x = other_bounds.left() - subject.size.x;
            }
            Some(Side::Right)
        } else if overlap.x < 0.0 {
            subject.contacts.on_left_wall = true;
            subject.contacts.left_wall_body = Some(other.id);
            if subject.velocity.x < 0.0 {
                subject.velocity.x = 0.0;
                subject.position.x = other_bounds.right();
            }
            Some(Side::Left)
        } else {
            None
        }
    } else if overlap.y > 0.0 {
        subject.contacts.grounded = true;
        subject.contacts.ground_body = Some(other.id);
        if subject.velocity.y > 0.0 {
            subject.velocity.y = 0.0;
            subject.position.y = other_bounds.top() - subject.size.y;
        }
        Some(Side::Below)
    } else if overlap.y < 0.0 {
        subject.contacts.touching_top_edge = true;
        if subject.velocity.y < 0.0 {
            subject.velocity.y = 0.0;
            subject.position.y = other_bounds.bottom();
        }
        Some(Side::Above)
    } else {
        None
    }
}

fn settle(subject: &mut Body, other: &Body) {
    subject.velocity = Vec2::ZERO;
    subject.contacts.grounded = true;
    subject.contacts.ground_body = Some(other.id);
    if let Some(block) = subject.block_mut() {
        block.settled = true;
    }
}

/// Grounding propagates transitively up a stack: a falling block inherits
/// `settled` from the block beneath it, and only a block grounded through
/// static geometry seeds the chain.
fn block_on_block(subject: &mut Body, other: &Body, overlap: Vec2) {
    let vertical = overlap.y.abs() < overlap.x.abs();
    if vertical && overlap.y > 0.0 && other.is_settled_block() {
        subject.position.y = other.bounds().top() - subject.size.y;
        settle(subject, other);
    }
}

/// A block landing on an already-grounded character crushes it: the collider
/// height shrinks by the penetration depth while the feet stay planted. Any
/// other arrangement is an ordinary solid contact (standing on a block,
/// sliding along its side).
fn character_on_block(subject: &mut Body, other: &Body, overlap: Vec2, tuning: &Tuning) {
    let vertical = overlap.y.abs() < overlap.x.abs();
    let crushing = vertical
        && overlap.y < 0.0
        && other.velocity.y > 0.0
        && subject.contacts.grounded_or_grace();

    if !crushing {
        contact(subject, other, overlap);
        return;
    }

    let depth = overlap.y.abs();
    let new_height = (subject.size.y - depth).max(0.0);
    subject.size.y = new_height;
    subject.position.y = other.bounds().bottom();

    let dead_now = new_height <= tuning.death_height;
    if let Some(ch) = subject.character_mut() {
        ch.is_being_crushed = true;
        if dead_now && !ch.is_dead() {
            ch.mark_dead();
            log::info!("Character crushed (collider height {new_height:.2})");
        }
    }
    if dead_now {
        subject.velocity.y = 0.0;
        subject.contacts.grounded = true;
    }
}
