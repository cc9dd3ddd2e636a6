//! Entity kinds and the per-kind behaviour table.
//!
//! Every entity is the same flat record; [`EntityKind`] carries the data that
//! only some kinds need. Behaviour is looked up by [`KindTag`] in a static
//! table of update functions. The table entries run *before* kinematic
//! integration and never see inactive entities: [`Entity::update`] performs
//! the active check once for every kind.

use serde::{Deserialize, Serialize};
use typer_math::PhaseAccumulator;

use crate::entity::{Entity, UpdateOutcome};
use crate::id::EntityId;

/// Per-enemy data: the word to type and how the enemy moves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnemyState {
    /// Id of the typing engine's word object this enemy represents.
    pub word_id: String,
    /// The word the player must type.
    pub word: String,
    /// The boundary entity whose contact means the player lost this enemy.
    pub boundary: EntityId,
    /// Vertical wobble oscillator.
    pub wobble: PhaseAccumulator,
    /// Wobble speed multiplier, in world units per second.
    pub wobble_amplitude: f32,
}

/// Data for a short-lived floating label (e.g. "+30").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FadeTextState {
    /// Lifetime in milliseconds.
    pub ttl_ms: f32,
    /// Time lived so far in milliseconds.
    pub elapsed_ms: f32,
    /// Base colour; alpha is derived from the remaining lifetime.
    pub rgb: [u8; 3],
}

impl FadeTextState {
    /// Create a label state with the given colour and lifetime.
    #[must_use]
    pub fn new(rgb: [u8; 3], ttl_ms: f32) -> Self {
        Self {
            ttl_ms,
            elapsed_ms: 0.0,
            rgb,
        }
    }

    /// Opacity in `[0, 1]`, falling linearly over the lifetime.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        if self.ttl_ms <= 0.0 {
            return 0.0;
        }
        (1.0 - self.elapsed_ms / self.ttl_ms).clamp(0.0, 1.0)
    }

    /// The current colour as an `rgba(...)` string.
    #[must_use]
    pub fn rgba(&self) -> String {
        let [r, g, b] = self.rgb;
        format!("rgba({r}, {g}, {b}, {:.3})", self.alpha())
    }
}

/// What kind of entity this is, together with kind-specific data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EntityKind {
    /// No behaviour beyond kinematics.
    Plain,
    /// The line enemies must not reach.
    Boundary,
    /// A word-carrying enemy.
    Enemy(EnemyState),
    /// A label that fades out and expires.
    FadeText(FadeTextState),
}

impl EntityKind {
    /// The data-free tag for this kind.
    #[must_use]
    pub fn tag(&self) -> KindTag {
        match self {
            EntityKind::Plain => KindTag::Plain,
            EntityKind::Boundary => KindTag::Boundary,
            EntityKind::Enemy(_) => KindTag::Enemy,
            EntityKind::FadeText(_) => KindTag::FadeText,
        }
    }
}

/// Data-free discriminant of [`EntityKind`], used as the behaviour table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Plain = 0,
    Boundary = 1,
    Enemy = 2,
    FadeText = 3,
}

impl KindTag {
    /// Human-readable name, used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            KindTag::Plain => "plain",
            KindTag::Boundary => "boundary",
            KindTag::Enemy => "enemy",
            KindTag::FadeText => "fade-text",
        }
    }
}

/// Kind-specific hooks.
pub(crate) struct KindBehavior {
    /// Runs before kinematic integration on active entities only.
    pub(crate) update: fn(&mut Entity, f32) -> UpdateOutcome,
}

static BEHAVIORS: [KindBehavior; 4] = [
    KindBehavior { update: no_op },
    KindBehavior { update: no_op },
    KindBehavior {
        update: enemy_update,
    },
    KindBehavior {
        update: fade_text_update,
    },
];

/// Look up the behaviour for a kind.
pub(crate) fn behavior(tag: KindTag) -> &'static KindBehavior {
    &BEHAVIORS[tag as usize]
}

fn no_op(_entity: &mut Entity, _dt: f32) -> UpdateOutcome {
    UpdateOutcome::Keep
}

fn enemy_update(entity: &mut Entity, _dt: f32) -> UpdateOutcome {
    let (kind, velocity) = entity.kind_and_velocity_mut();
    if let EntityKind::Enemy(enemy) = kind {
        velocity.y = enemy.wobble.next() * enemy.wobble_amplitude;
    }
    UpdateOutcome::Keep
}

fn fade_text_update(entity: &mut Entity, dt: f32) -> UpdateOutcome {
    let (kind, visual) = entity.kind_and_visual_mut();
    let EntityKind::FadeText(fade) = kind else {
        return UpdateOutcome::Keep;
    };
    fade.elapsed_ms += dt * 1000.0;
    let colour = fade.rgba();
    for run in &mut visual.text {
        run.fill = Some(colour.clone());
    }
    if fade.elapsed_ms >= fade.ttl_ms {
        UpdateOutcome::Expired
    } else {
        UpdateOutcome::Keep
    }
}
