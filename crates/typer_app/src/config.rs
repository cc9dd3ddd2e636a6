//! Session configuration.

/// Playfield layout and gameplay tuning for a [`Session`](crate::session::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Height of the playfield in world units.
    pub field_height: f32,
    /// Horizontal position enemies enter at.
    pub spawn_x: f32,
    /// Vertical position of the first lane.
    pub lane_top: f32,
    /// Vertical distance between lanes.
    pub lane_spacing: f32,
    /// Edge length of an enemy's square hitbox.
    pub enemy_size: f32,
    /// Slowest enemy speed, in world units per second.
    pub min_speed: f32,
    /// Fastest enemy speed, in world units per second.
    pub max_speed: f32,
    /// Peak vertical wobble speed.
    pub wobble_amplitude: f32,
    /// Delay between successive enemies of a wave becoming active.
    pub stagger_ms: f32,
    /// Width of the boundary strip at the left edge.
    pub boundary_width: f32,
    /// Hits the player can take.
    pub max_health: u32,
    /// Points per character of a typed word.
    pub points_per_char: u64,
    /// Lifetime of the floating "+N" label.
    pub score_label_ttl_ms: f32,
    /// Colour of already typed characters.
    pub typed_fill: String,
}

impl SessionConfig {
    /// Set the number of hits the player can take.
    #[must_use]
    pub fn with_max_health(mut self, max_health: u32) -> Self {
        self.max_health = max_health.max(1);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            field_height: 480.0,
            spawn_x: 820.0,
            lane_top: 40.0,
            lane_spacing: 70.0,
            enemy_size: 48.0,
            min_speed: 30.0,
            max_speed: 60.0,
            wobble_amplitude: 20.0,
            stagger_ms: 400.0,
            boundary_width: 16.0,
            max_health: 4,
            points_per_char: 10,
            score_label_ttl_ms: 600.0,
            typed_fill: "#f5c542".to_string(),
        }
    }
}
