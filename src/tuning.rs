//! Game-feel tuning parameters
//!
//! Everything the design treats as a knob rather than a structural contract
//! lives here, so hosts can rebalance a run without touching sim code. Loaded
//! from JSON by the host; unknown fields fall back to defaults.

use serde::{Deserialize, Serialize};

/// Tunable simulation parameters with playtested defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Character ===
    /// Initial upward speed of a jump
    pub jump_speed: f32,
    /// Top horizontal speed while grounded
    pub ground_move_speed: f32,
    /// Air speed as a fraction of ground speed
    pub air_move_factor: f32,
    /// Wall-slide fall speed as a fraction of ground speed
    pub slide_factor: f32,
    /// Gravity modifier applied to the character body
    pub character_gravity_modifier: f32,
    /// Terminal fall speed for the character
    pub character_max_fall_speed: f32,
    /// Seconds after a wall-jump during which input back toward that wall is ignored
    pub wall_jump_grace: f32,
    /// Exponential-ish rate at which horizontal velocity decays with no input held
    pub converge_rate: f32,
    /// Collider height at or below which the character is dead
    pub death_height: f32,
    /// Move-speed multiplier while being dissolved by the liquid
    pub dissolved_move_factor: f32,
    /// Jump-speed multiplier for the reduced hop out of the liquid
    pub dissolved_hop_factor: f32,

    // === Blocks ===
    /// Fall speed blocks spawn with (they fall at terminal velocity from birth)
    pub block_fall_speed: f32,
    /// Smallest block extent the spawner will produce, per axis
    pub block_min_size: f32,
    /// Largest block extent the spawner will produce, per axis
    pub block_max_size: f32,

    // === Run schedule ===
    /// Seconds between block spawn attempts at run start
    pub block_spawn_interval: f32,
    /// How much the spawn interval shrinks at each ramp step
    pub spawn_interval_step: f32,
    /// Shortest the spawn interval is allowed to get
    pub spawn_interval_floor: f32,
    /// Seconds between spawn-interval ramp steps
    pub spawn_ramp_interval: f32,
    /// Seconds before the liquid starts rising
    pub zone_start_delay: f32,
    /// Initial rise rate of the liquid surface
    pub zone_rise_rate: f32,
    /// Seconds between rise-rate ratchet steps
    pub zone_ratchet_interval: f32,
    /// Rise-rate increase per ratchet step
    pub zone_ratchet_step: f32,
    /// Ceiling the rise rate ratchets toward
    pub zone_rise_rate_cap: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            jump_speed: 700.0,
            ground_move_speed: 550.0,
            air_move_factor: 0.8,
            slide_factor: 0.25,
            character_gravity_modifier: 4.0,
            character_max_fall_speed: 1500.0,
            wall_jump_grace: 0.1,
            converge_rate: 7.5,
            death_height: 0.25,
            dissolved_move_factor: 0.5,
            dissolved_hop_factor: 0.5,

            block_fall_speed: 250.0,
            block_min_size: 80.0,
            block_max_size: 180.0,

            block_spawn_interval: 1.0,
            spawn_interval_step: 0.005,
            spawn_interval_floor: 0.15,
            spawn_ramp_interval: 5.0,
            zone_start_delay: 5.0,
            zone_rise_rate: 10.0,
            zone_ratchet_interval: 3.0,
            zone_ratchet_step: 0.025,
            zone_rise_rate_cap: 40.0,
        }
    }
}

impl Tuning {
    /// Top horizontal speed while airborne
    pub fn air_move_speed(&self) -> f32 {
        self.ground_move_speed * self.air_move_factor
    }

    /// Fall speed while pressed into a wall and sliding
    pub fn slide_speed(&self) -> f32 {
        self.ground_move_speed * self.slide_factor
    }

    /// Parse tuning from JSON, falling back to defaults on malformed input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Malformed tuning JSON ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Serialize tuning to JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
