//! Character movement state machine
//!
//! Jump, wall-slide and wall-jump logic layered over the shared integrator.
//! The controller consumes abstract logical inputs (left/right/jump held-down
//! booleans, set once per tick by the host) and keeps last tick's snapshot to
//! derive pressed/released edges itself; it never sees a keyboard.

use serde::{Deserialize, Serialize};

use super::body::{Body, BodyArena, BodyId, BodyKind};
use crate::consts::{STEER_ACCEL_RATE, WALL_JUMP_BOOST};
use crate::tuning::Tuning;

/// Logical input for one tick: "is this held down"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Derived movement state, recomputed every tick - never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterState {
    Idle,
    Moving,
    Jumping,
    Sliding,
}

/// Controller payload carried by the character body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterBody {
    pub jump_speed: f32,
    pub ground_move_speed: f32,
    pub air_move_speed: f32,
    pub slide_speed: f32,

    /// Set by a block landing on the character this tick
    pub is_being_crushed: bool,
    /// Set by the rising liquid overlapping the character this tick
    pub is_being_dissolved: bool,

    input: InputState,
    prev_input: InputState,
    /// Seconds before leftward input is accepted again after jumping off the left wall
    left_wall_grace: f32,
    right_wall_grace: f32,
    pub(crate) gravity_override: Option<f32>,
    dead: bool,
}

impl CharacterBody {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            jump_speed: tuning.jump_speed,
            ground_move_speed: tuning.ground_move_speed,
            air_move_speed: tuning.air_move_speed(),
            slide_speed: tuning.slide_speed(),
            is_being_crushed: false,
            is_being_dissolved: false,
            input: InputState::default(),
            prev_input: InputState::default(),
            left_wall_grace: 0.0,
            right_wall_grace: 0.0,
            gravity_override: None,
            dead: false,
        }
    }

    /// Dead characters are disabled for good: no input, no integration
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub(crate) fn mark_dead(&mut self) {
        self.dead = true;
    }

    pub(crate) fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    fn jump_pressed(&self) -> bool {
        self.input.jump && !self.prev_input.jump
    }

    fn jump_released(&self) -> bool {
        !self.input.jump && self.prev_input.jump
    }
}

/// Derive the character's state from velocity and contact flags
pub fn state_of(body: &Body) -> CharacterState {
    let c = &body.contacts;
    let airborne = !c.grounded_or_grace();
    let near_wall = c.on_wall() || c.was_on_wall();

    if airborne && body.velocity.y > 0.0 && near_wall {
        CharacterState::Sliding
    } else if !c.grounded && body.velocity.y != 0.0 {
        CharacterState::Jumping
    } else if body.velocity.x != 0.0 && !c.on_wall() {
        CharacterState::Moving
    } else {
        CharacterState::Idle
    }
}

/// Controller step run before integration: timers, steering, jumps, wall
/// interaction. Reads the contact flags the resolver produced last tick.
pub(crate) fn pre_step(arena: &mut BodyArena, id: BodyId, tuning: &Tuning, dt: f32) {
    // slide clamping only applies against non-static surfaces, so check what
    // kind of wall we are pressed into before taking the mutable borrow
    let (left_wall_static, right_wall_static) = {
        let Some(body) = arena.get(id) else { return };
        let is_static =
            |wall: Option<BodyId>| wall.and_then(|w| arena.get(w)).is_some_and(Body::is_static);
        (
            is_static(body.contacts.left_wall_body),
            is_static(body.contacts.right_wall_body),
        )
    };

    let Some(body) = arena.get_mut(id) else { return };
    let contacts = body.contacts;
    let velocity = &mut body.velocity;
    let BodyKind::Character(ch) = &mut body.kind else {
        debug_assert!(false, "pre_step on a non-character body");
        return;
    };

    // crush/dissolve mean "happened this tick"; keep last tick's dissolve
    // around to shape this tick's movement, then clear both
    let dissolving = std::mem::take(&mut ch.is_being_dissolved);
    ch.is_being_crushed = false;

    if ch.dead {
        return;
    }

    // (a) wall-jump grace timers
    ch.left_wall_grace = (ch.left_wall_grace - dt).max(0.0);
    ch.right_wall_grace = (ch.right_wall_grace - dt).max(0.0);

    // (b) horizontal steering
    let input = ch.input;
    let move_factor = if dissolving { tuning.dissolved_move_factor } else { 1.0 };
    let move_speed = move_factor
        * if contacts.grounded_or_grace() {
            ch.ground_move_speed
        } else {
            ch.air_move_speed
        };
    let accel = move_speed * dt * STEER_ACCEL_RATE;

    if input.left == input.right {
        velocity.x = converge_to_zero(velocity.x, dt, move_speed, tuning.converge_rate);
    } else if input.left && ch.left_wall_grace <= 0.0 {
        if contacts.on_left_wall {
            velocity.x = 0.0;
        } else {
            velocity.x = (velocity.x - accel).max(-move_speed);
        }
    } else if input.right && ch.right_wall_grace <= 0.0 {
        if contacts.on_right_wall {
            velocity.x = 0.0;
        } else {
            velocity.x = (velocity.x + accel).min(move_speed);
        }
    }

    // (c) jumping
    if ch.jump_pressed() && contacts.grounded_or_grace() {
        velocity.y = -ch.jump_speed;
    } else if ch.jump_pressed() && dissolving {
        // reduced hop out of the liquid
        velocity.y = -ch.jump_speed * tuning.dissolved_hop_factor;
    } else if ch.jump_released() && velocity.y < 0.0 {
        // variable jump height: letting go early cuts the rise short
        velocity.y /= 2.0;
    }

    // (d) wall interaction
    let pressing_left = input.left && contacts.on_left_wall;
    let pressing_right = input.right && contacts.on_right_wall;
    let wall_jumping = ch.jump_pressed() && (pressing_left || pressing_right) && !contacts.grounded;
    let sliding_down = (pressing_left || pressing_right) && velocity.y > 0.0;

    if wall_jumping {
        if pressing_left {
            velocity.x = ch.air_move_speed * WALL_JUMP_BOOST;
            ch.left_wall_grace = tuning.wall_jump_grace;
        } else {
            velocity.x = -ch.air_move_speed * WALL_JUMP_BOOST;
            ch.right_wall_grace = tuning.wall_jump_grace;
        }
        velocity.y = -ch.jump_speed * WALL_JUMP_BOOST;
        ch.gravity_override = None;
    } else if sliding_down
        && ((pressing_left && !left_wall_static) || (pressing_right && !right_wall_static))
    {
        // clinging to another block: drift down slowly, no gravity this tick
        velocity.y = ch.slide_speed;
        ch.gravity_override = Some(0.0);
    } else {
        ch.gravity_override = None;
    }
}

/// Controller step run after the resolver: ride-along, death, input rotation
pub(crate) fn post_step(arena: &mut BodyArena, id: BodyId, tuning: &Tuning) {
    // standing on a block that is still falling: inherit its vertical
    // velocity so the character descends with it instead of bouncing
    let ride_velocity = arena.get(id).and_then(|body| {
        body.contacts
            .ground_body
            .and_then(|g| arena.get(g))
            .filter(|g| g.block().is_some_and(|b| !b.settled))
            .map(|g| g.velocity.y)
    });

    let Some(body) = arena.get_mut(id) else { return };
    let height = body.size.y;
    let velocity = &mut body.velocity;
    let BodyKind::Character(ch) = &mut body.kind else { return };

    if !ch.dead {
        if let Some(vy) = ride_velocity {
            velocity.y = vy;
        }
        if height <= tuning.death_height {
            ch.dead = true;
            *velocity = glam::Vec2::ZERO;
            log::info!("Character died (collider height {height:.2})");
        }
    }

    ch.prev_input = ch.input;
    ch.input = InputState::default();
}

/// Ease a velocity component back toward zero when no direction is held
fn converge_to_zero(value: f32, dt: f32, move_speed: f32, rate: f32) -> f32 {
    let delta = move_speed * dt * rate;
    if value < 0.0 {
        (value + delta).min(0.0)
    } else if value > 0.0 {
        (value - delta).max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn character_in_arena() -> (BodyArena, BodyId) {
        let mut arena = BodyArena::new();
        let id = arena.insert(Body::new_character(
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 60.0),
            &Tuning::default(),
        ));
        (arena, id)
    }

    fn hold(arena: &mut BodyArena, id: BodyId, input: InputState) {
        arena
            .get_mut(id)
            .unwrap()
            .character_mut()
            .unwrap()
            .set_input(input);
    }

    #[test]
    fn test_state_idle_then_moving() {
        let mut body = Body::new_character(Vec2::ZERO, Vec2::new(30.0, 60.0), &Tuning::default());
        body.contacts.grounded = true;
        assert_eq!(state_of(&body), CharacterState::Idle);

        body.velocity.x = 100.0;
        assert_eq!(state_of(&body), CharacterState::Moving);
    }

    #[test]
    fn test_state_jumping_and_sliding() {
        let mut body = Body::new_character(Vec2::ZERO, Vec2::new(30.0, 60.0), &Tuning::default());
        body.velocity.y = -200.0;
        assert_eq!(state_of(&body), CharacterState::Jumping);

        // falling while pressed against a wall
        body.velocity.y = 200.0;
        body.contacts.on_right_wall = true;
        assert_eq!(state_of(&body), CharacterState::Sliding);
    }

    #[test]
    fn test_grounded_jump_sets_upward_velocity() {
        let (mut arena, id) = character_in_arena();
        arena.get_mut(id).unwrap().contacts.grounded = true;

        hold(&mut arena, id, InputState { jump: true, ..Default::default() });
        pre_step(&mut arena, id, &Tuning::default(), DT);

        let body = arena.get(id).unwrap();
        assert_eq!(body.velocity.y, -Tuning::default().jump_speed);
    }

    #[test]
    fn test_releasing_jump_halves_rise() {
        let (mut arena, id) = character_in_arena();
        let tuning = Tuning::default();

        arena.get_mut(id).unwrap().contacts.grounded = true;
        hold(&mut arena, id, InputState { jump: true, ..Default::default() });
        pre_step(&mut arena, id, &tuning, DT);
        post_step(&mut arena, id, &tuning);

        // airborne now; release jump mid-rise
        arena.get_mut(id).unwrap().contacts.grounded = false;
        arena.get_mut(id).unwrap().contacts.begin_tick();
        let before = arena.get(id).unwrap().velocity.y;
        hold(&mut arena, id, InputState::default());
        pre_step(&mut arena, id, &tuning, DT);

        let after = arena.get(id).unwrap().velocity.y;
        assert!(before < 0.0);
        assert_eq!(after, before / 2.0);
    }

    #[test]
    fn test_pressed_into_wall_zeroes_velocity() {
        let (mut arena, id) = character_in_arena();
        {
            let body = arena.get_mut(id).unwrap();
            body.contacts.on_left_wall = true;
            body.velocity.x = -50.0;
        }
        hold(&mut arena, id, InputState { left: true, ..Default::default() });
        pre_step(&mut arena, id, &Tuning::default(), DT);
        assert_eq!(arena.get(id).unwrap().velocity.x, 0.0);
    }

    #[test]
    fn test_wall_jump_grace_suppresses_steering_back() {
        let tuning = Tuning::default();
        let mut arena = BodyArena::new();
        let wall = arena.insert(Body::new_block(
            Vec2::new(-10.0, 0.0),
            Vec2::new(10.0, 200.0),
            0.0,
        ));
        let id = arena.insert(Body::new_character(
            Vec2::new(0.0, 50.0),
            Vec2::new(30.0, 60.0),
            &tuning,
        ));
        {
            let body = arena.get_mut(id).unwrap();
            body.contacts.on_left_wall = true;
            body.contacts.left_wall_body = Some(wall);
            body.velocity.y = 100.0; // falling against the wall
        }

        // holding left + pressing jump: wall-jump away from the left wall
        hold(&mut arena, id, InputState { left: true, jump: true, ..Default::default() });
        pre_step(&mut arena, id, &tuning, DT);

        let away = arena.get(id).unwrap().velocity.x;
        assert_eq!(away, tuning.air_move_speed() * WALL_JUMP_BOOST);
        assert_eq!(
            arena.get(id).unwrap().velocity.y,
            -tuning.jump_speed * WALL_JUMP_BOOST
        );
        post_step(&mut arena, id, &tuning);

        // still holding left within the grace period: outward velocity survives
        {
            let body = arena.get_mut(id).unwrap();
            body.contacts.begin_tick();
        }
        hold(&mut arena, id, InputState { left: true, ..Default::default() });
        pre_step(&mut arena, id, &tuning, DT);
        assert_eq!(arena.get(id).unwrap().velocity.x, away);
        post_step(&mut arena, id, &tuning);

        // past the grace period, leftward steering resumes
        let ticks = (tuning.wall_jump_grace / DT).ceil() as u32 + 1;
        for _ in 0..ticks {
            arena.get_mut(id).unwrap().contacts.begin_tick();
            hold(&mut arena, id, InputState { left: true, ..Default::default() });
            pre_step(&mut arena, id, &tuning, DT);
            post_step(&mut arena, id, &tuning);
        }
        assert!(arena.get(id).unwrap().velocity.x < away);
    }

    #[test]
    fn test_slide_clamp_applies_to_blocks_not_walls() {
        let tuning = Tuning::default();
        let mut arena = BodyArena::new();
        let block = arena.insert(Body::new_block(
            Vec2::new(-10.0, 0.0),
            Vec2::new(10.0, 200.0),
            0.0,
        ));
        let id = arena.insert(Body::new_character(
            Vec2::new(0.0, 50.0),
            Vec2::new(30.0, 60.0),
            &tuning,
        ));
        {
            let body = arena.get_mut(id).unwrap();
            body.contacts.on_left_wall = true;
            body.contacts.left_wall_body = Some(block);
            body.velocity.y = 400.0;
        }
        hold(&mut arena, id, InputState { left: true, ..Default::default() });
        pre_step(&mut arena, id, &tuning, DT);

        let body = arena.get(id).unwrap();
        assert_eq!(body.velocity.y, tuning.slide_speed());
        assert_eq!(body.character().unwrap().gravity_override, Some(0.0));
    }

    #[test]
    fn test_dead_character_ignores_input() {
        let (mut arena, id) = character_in_arena();
        arena
            .get_mut(id)
            .unwrap()
            .character_mut()
            .unwrap()
            .mark_dead();
        arena.get_mut(id).unwrap().contacts.grounded = true;

        hold(&mut arena, id, InputState { jump: true, ..Default::default() });
        pre_step(&mut arena, id, &Tuning::default(), DT);
        assert_eq!(arena.get(id).unwrap().velocity.y, 0.0);
    }
}
