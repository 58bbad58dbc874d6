//! Randomized block placement with overlap rejection
//!
//! One sample per call: pick a size and a center, test the candidate against
//! every tracked live block, then either spawn it or report the attempt
//! failed. Rejection is an expected, silent outcome the caller simply retries
//! next tick - never an error. The RNG is seeded so runs replay exactly.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::{Body, BodyId};
use super::rect::RectF;
use super::world::World;

/// Drops randomly-sized blocks into a spawn region without overlapping the
/// blocks it has already placed
#[derive(Debug)]
pub struct BlockSpawner {
    spawn_bounds: RectF,
    min_size: Vec2,
    max_size: Vec2,
    rng: Pcg32,
    tracked: Vec<BodyId>,
}

impl BlockSpawner {
    pub fn new(spawn_bounds: RectF, min_size: Vec2, max_size: Vec2, seed: u64) -> Self {
        debug_assert!(
            min_size.x <= max_size.x && min_size.y <= max_size.y,
            "inverted spawn size range"
        );
        Self {
            spawn_bounds,
            min_size,
            max_size,
            rng: Pcg32::seed_from_u64(seed),
            tracked: Vec::new(),
        }
    }

    pub fn spawn_bounds(&self) -> RectF {
        self.spawn_bounds
    }

    pub fn set_spawn_bounds(&mut self, bounds: RectF) {
        self.spawn_bounds = bounds;
    }

    /// Shift the spawn region, typically following the camera upward
    pub fn move_spawn_bounds(&mut self, offset: Vec2) {
        self.spawn_bounds = self.spawn_bounds.offset_by(offset);
    }

    pub fn set_size_range(&mut self, min_size: Vec2, max_size: Vec2) {
        debug_assert!(min_size.x <= max_size.x && min_size.y <= max_size.y);
        self.min_size = min_size;
        self.max_size = max_size;
    }

    /// Blocks this spawner placed that were still alive at the last attempt
    pub fn tracked(&self) -> &[BodyId] {
        &self.tracked
    }

    /// Include an externally spawned block in future placement checks
    pub fn track(&mut self, id: BodyId) {
        if !self.tracked.contains(&id) {
            self.tracked.push(id);
        }
    }

    /// Attempt exactly one placement. Returns the spawned block's handle, or
    /// `None` when the sampled rectangle touched a live tracked block - the
    /// caller is expected to just call again next tick.
    pub fn try_spawn_block(
        &mut self,
        world: &mut World,
        fall_speed: f32,
        keep_square: bool,
    ) -> Option<BodyId> {
        // forget blocks the world has despawned since the last attempt
        self.tracked.retain(|&id| world.body(id).is_some());

        let mut size = Vec2::new(
            self.min_size.x + self.rng.random::<f32>() * (self.max_size.x - self.min_size.x),
            self.min_size.y + self.rng.random::<f32>() * (self.max_size.y - self.min_size.y),
        );
        if keep_square {
            size = Vec2::splat((size.x + size.y) / 2.0);
        }

        let center = Vec2::new(
            self.spawn_bounds.left() + self.rng.random::<f32>() * self.spawn_bounds.width,
            self.spawn_bounds.top() + self.rng.random::<f32>() * self.spawn_bounds.height,
        );
        let candidate = RectF::from_position_size(center - size / 2.0, size);

        for &id in &self.tracked {
            if world
                .body(id)
                .is_some_and(|b| b.bounds().intersects(&candidate))
            {
                log::trace!("Spawn rejected at {candidate:?}");
                return None;
            }
        }

        let id = world.spawn(Body::new_block(candidate.position(), size, fall_speed));
        self.tracked.push(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn world() -> World {
        World::new(800.0, 800.0, 4, 4, Tuning::default())
    }

    #[test]
    fn test_successful_spawn_registers_and_tracks() {
        let mut w = world();
        let mut spawner = BlockSpawner::new(
            RectF::new(0.0, 0.0, 400.0, 40.0),
            Vec2::splat(80.0),
            Vec2::splat(180.0),
            7,
        );

        let id = spawner.try_spawn_block(&mut w, 250.0, false).unwrap();
        let body = w.body(id).unwrap();
        assert!(body.block().is_some());
        assert_eq!(body.velocity.y, 250.0);
        assert!(body.size.x >= 80.0 && body.size.x <= 180.0);
        assert!(body.size.y >= 80.0 && body.size.y <= 180.0);
        assert_eq!(spawner.tracked(), &[id]);
        assert!(w.grid().cells_of(id).is_some());
    }

    #[test]
    fn test_keep_square_averages_extents() {
        let mut w = world();
        let mut spawner = BlockSpawner::new(
            RectF::new(0.0, 0.0, 400.0, 40.0),
            Vec2::new(80.0, 10.0),
            Vec2::new(180.0, 20.0),
            1,
        );
        let id = spawner.try_spawn_block(&mut w, 250.0, true).unwrap();
        let body = w.body(id).unwrap();
        assert_eq!(body.size.x, body.size.y);
    }

    #[test]
    fn test_crowded_region_rejects_without_spawning() {
        let mut w = world();
        // region fully covered by an existing tracked block
        let blocker = w.spawn(Body::new_block(
            Vec2::new(-200.0, -200.0),
            Vec2::splat(800.0),
            0.0,
        ));
        let mut spawner = BlockSpawner::new(
            RectF::new(0.0, 0.0, 200.0, 40.0),
            Vec2::splat(80.0),
            Vec2::splat(180.0),
            3,
        );
        spawner.track(blocker);

        let before = w.bodies().count();
        for _ in 0..50 {
            assert!(spawner.try_spawn_block(&mut w, 250.0, false).is_none());
        }
        assert_eq!(w.bodies().count(), before);
    }

    #[test]
    fn test_despawned_blocks_stop_blocking_placement() {
        let mut w = world();
        let blocker = w.spawn(Body::new_block(
            Vec2::new(-200.0, -200.0),
            Vec2::splat(800.0),
            0.0,
        ));
        let mut spawner = BlockSpawner::new(
            RectF::new(0.0, 0.0, 200.0, 40.0),
            Vec2::splat(80.0),
            Vec2::splat(100.0),
            3,
        );
        spawner.track(blocker);
        assert!(spawner.try_spawn_block(&mut w, 250.0, false).is_none());

        w.remove(blocker);
        assert!(spawner.try_spawn_block(&mut w, 250.0, false).is_some());
        assert!(!spawner.tracked().contains(&blocker));
    }

    #[test]
    fn test_successful_spawns_never_overlap_each_other() {
        let mut w = world();
        let mut spawner = BlockSpawner::new(
            RectF::new(0.0, 0.0, 700.0, 300.0),
            Vec2::splat(40.0),
            Vec2::splat(120.0),
            99,
        );

        let mut spawned = Vec::new();
        for _ in 0..300 {
            if let Some(id) = spawner.try_spawn_block(&mut w, 250.0, false) {
                spawned.push(id);
            }
        }
        assert!(spawned.len() > 2, "region too crowded to test anything");

        for (i, &a) in spawned.iter().enumerate() {
            for &b in &spawned[i + 1..] {
                let ra = w.body(a).unwrap().bounds();
                let rb = w.body(b).unwrap().bounds();
                assert!(!ra.intersects(&rb), "{a:?} overlaps {b:?}");
            }
        }
    }

    // A 400-wide spawn region with one existing block spanning x in
    // [100, 220]: no successful spawn may ever intersect that x-range,
    // checked over 10k samples.
    #[test]
    fn test_never_intersects_existing_block_10k_samples() {
        let mut w = world();
        let existing = w.spawn(Body::new_block(
            Vec2::new(100.0, -200.0),
            Vec2::new(120.0, 400.0),
            0.0,
        ));
        let mut spawner = BlockSpawner::new(
            RectF::new(0.0, 0.0, 400.0, 40.0),
            Vec2::splat(80.0),
            Vec2::splat(180.0),
            4242,
        );
        spawner.track(existing);

        let mut successes = 0u32;
        for _ in 0..10_000 {
            if let Some(id) = spawner.try_spawn_block(&mut w, 250.0, false) {
                let bounds = w.body(id).unwrap().bounds();
                assert!(
                    bounds.right() < 100.0 || bounds.left() > 220.0,
                    "spawn at {bounds:?} intersects the occupied x-range"
                );
                successes += 1;
            }
        }
        assert!(successes > 0, "no spawn ever succeeded");
    }

    proptest! {
        #[test]
        fn prop_spawns_respect_tracked_blocks(seed in any::<u64>()) {
            let mut w = world();
            let existing = w.spawn(Body::new_block(
                Vec2::new(100.0, -200.0),
                Vec2::new(120.0, 400.0),
                0.0,
            ));
            let mut spawner = BlockSpawner::new(
                RectF::new(0.0, 0.0, 400.0, 40.0),
                Vec2::splat(80.0),
                Vec2::splat(180.0),
                seed,
            );
            spawner.track(existing);

            for _ in 0..40 {
                if let Some(id) = spawner.try_spawn_block(&mut w, 250.0, false) {
                    let bounds = w.body(id).unwrap().bounds();
                    let occupied = w.body(existing).unwrap().bounds();
                    prop_assert!(!bounds.intersects(&occupied));
                }
            }
        }
    }
}
