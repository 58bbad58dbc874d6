//! Run direction: spawn cadence, liquid schedule, climb tracking
//!
//! The per-tick schedule a full game wraps around the core. Blocks spawn on
//! an interval that shrinks as the run goes on, the liquid starts rising
//! after a delay and speeds up on a periodic ratchet, and the best climb
//! height is tracked for the host to display. Persisting that score is the
//! host's business.

use super::spawner::BlockSpawner;
use super::world::World;
use crate::tuning::Tuning;

/// Drives the run schedule; call `update` once per tick
#[derive(Debug)]
pub struct RunDirector {
    spawn_interval: f32,
    spawn_timer: f32,
    ramp_timer: f32,
    zone_timer: f32,
    spawning: bool,
    start_height: Option<f32>,
    best_climb: f32,
    game_over: bool,
}

impl RunDirector {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            spawn_interval: tuning.block_spawn_interval,
            spawn_timer: tuning.block_spawn_interval,
            ramp_timer: tuning.spawn_ramp_interval,
            zone_timer: tuning.zone_start_delay,
            spawning: true,
            start_height: None,
            best_climb: 0.0,
            game_over: false,
        }
    }

    /// Highest climb of the run so far, in score units
    pub fn best_climb(&self) -> f32 {
        self.best_climb
    }

    /// Current delay between spawn attempts
    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn set_spawning(&mut self, enabled: bool) {
        self.spawning = enabled;
    }

    pub fn update(&mut self, world: &mut World, spawner: &mut BlockSpawner, dt: f32) {
        let tuning = world.tuning().clone();

        if !self.game_over && world.character_is_dead() {
            self.game_over = true;
            self.spawning = false;
            log::info!("Game over at climb {:.1}", self.best_climb);
        }

        // avalanche cadence
        self.spawn_timer -= dt;
        self.ramp_timer -= dt;
        if self.spawning && self.spawn_timer < 0.0 {
            self.spawn_timer = self.spawn_interval;
            spawner.try_spawn_block(world, tuning.block_fall_speed, false);
        }
        if self.spawning && self.ramp_timer < 0.0 {
            self.spawn_interval =
                (self.spawn_interval - tuning.spawn_interval_step).max(tuning.spawn_interval_floor);
            self.ramp_timer = tuning.spawn_ramp_interval;
        }

        // liquid: delayed start, then a periodic rate ratchet
        self.zone_timer -= dt;
        if self.zone_timer < 0.0 {
            if !world.zone().is_rising() {
                let (width, height) = (world.width(), world.height());
                world.zone_mut().place(-width / 2.0, height, width * 2.0);
                world.zone_mut().set_rise_rate(tuning.zone_rise_rate);
                world.zone_mut().begin_rising();
            } else {
                world
                    .zone_mut()
                    .increase_rise_rate(tuning.zone_ratchet_step, tuning.zone_rise_rate_cap);
            }
            self.zone_timer = tuning.zone_ratchet_interval;
        }

        // climb score: how far above the starting ledge the character has been
        if let Some(body) = world.character() {
            let top = body.bounds().top();
            let start = *self.start_height.get_or_insert(top);
            self.best_climb = self.best_climb.max((start - top) / 10.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::Body;
    use crate::sim::rect::RectF;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (World, BlockSpawner, RunDirector) {
        let tuning = Tuning::default();
        let world = World::new(800.0, 800.0, 4, 4, tuning.clone());
        let spawner = BlockSpawner::new(
            RectF::new(200.0, -60.0, 400.0, 40.0),
            Vec2::splat(80.0),
            Vec2::splat(180.0),
            11,
        );
        let director = RunDirector::new(&tuning);
        (world, spawner, director)
    }

    #[test]
    fn test_blocks_spawn_on_the_configured_interval() {
        let (mut world, mut spawner, mut director) = setup();

        // just shy of the first interval: nothing yet
        for _ in 0..58 {
            director.update(&mut world, &mut spawner, DT);
        }
        assert_eq!(world.bodies().count(), 0);

        for _ in 0..5 {
            director.update(&mut world, &mut spawner, DT);
        }
        assert_eq!(world.bodies().count(), 1);
    }

    #[test]
    fn test_spawn_interval_ramps_down_to_floor() {
        let tuning = Tuning::default();
        let (mut world, mut spawner, mut director) = setup();

        // run long enough for several ramp steps
        for _ in 0..(60 * 16) {
            director.update(&mut world, &mut spawner, DT);
        }
        let expected = tuning.block_spawn_interval - 3.0 * tuning.spawn_interval_step;
        assert!((director.spawn_interval() - expected).abs() < 1e-4);
        assert!(director.spawn_interval() >= tuning.spawn_interval_floor);
    }

    #[test]
    fn test_zone_starts_after_delay_then_ratchets() {
        let tuning = Tuning::default();
        let (mut world, mut spawner, mut director) = setup();

        for _ in 0..(60 * 5 - 2) {
            director.update(&mut world, &mut spawner, DT);
        }
        assert!(!world.zone().is_rising());

        for _ in 0..4 {
            director.update(&mut world, &mut spawner, DT);
        }
        assert!(world.zone().is_rising());
        assert_eq!(world.zone().rise_rate(), tuning.zone_rise_rate);

        // one ratchet period later the rate has stepped up once
        for _ in 0..(60 * 3 + 2) {
            director.update(&mut world, &mut spawner, DT);
        }
        let expected = tuning.zone_rise_rate + tuning.zone_ratchet_step;
        assert!((world.zone().rise_rate() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_best_climb_tracks_highest_point() {
        let (mut world, mut spawner, mut director) = setup();
        let id = world.spawn(Body::new_character(
            Vec2::new(100.0, 700.0),
            Vec2::new(30.0, 60.0),
            &Tuning::default(),
        ));

        director.update(&mut world, &mut spawner, DT);
        assert_eq!(director.best_climb(), 0.0);

        // climbing 200 units is worth 20 points, and dropping back down
        // never loses them
        world.bodies.get_mut(id).unwrap().position.y = 500.0;
        director.update(&mut world, &mut spawner, DT);
        assert_eq!(director.best_climb(), 20.0);

        world.bodies.get_mut(id).unwrap().position.y = 650.0;
        director.update(&mut world, &mut spawner, DT);
        assert_eq!(director.best_climb(), 20.0);
    }
}
