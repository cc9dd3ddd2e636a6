//! The entity record.
//!
//! An [`Entity`] is a flat record: identity, kinematics, extent, facing, an
//! active flag and visual attachments, plus an [`EntityKind`] for the data
//! only some entities need. Entities are built from an [`EntityInit`], which
//! requires a position and a size up front so no entity is ever partially
//! initialised.

use serde::{Deserialize, Serialize};
use tracing::trace;
use typer_math::{Bounds, PhaseAccumulator, Size, Vec2};

use crate::id::EntityId;
use crate::kind::{EnemyState, EntityKind, FadeTextState, KindTag, behavior};
use crate::render::{DrawView, Renderer};
use crate::visual::{TextRun, Visual};

/// Horizontal facing, used by renderers to mirror sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// `1` for right, `-1` for left.
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Facing::Right => 1,
            Facing::Left => -1,
        }
    }
}

/// What an entity asks of its owner after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Keep simulating.
    Keep,
    /// The entity has finished its lifetime and should be removed.
    Expired,
}

/// Constructor arguments for an [`Entity`].
#[derive(Debug, Clone)]
pub struct EntityInit {
    /// Explicit id; a UUID is generated when `None`.
    pub id: Option<EntityId>,
    pub kind: EntityKind,
    pub position: Vec2,
    pub size: Size,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub facing: Facing,
    /// Whether the entity starts active.
    pub active: bool,
    pub visual: Visual,
}

impl EntityInit {
    /// Arguments for an active, motionless entity of the given kind.
    #[must_use]
    pub fn new(kind: EntityKind, position: Vec2, size: Size) -> Self {
        Self {
            id: None,
            kind,
            position,
            size,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            facing: Facing::Right,
            active: true,
            visual: Visual::default(),
        }
    }

    /// A plain entity.
    #[must_use]
    pub fn plain(position: Vec2, size: Size) -> Self {
        Self::new(EntityKind::Plain, position, size)
    }

    /// The boundary enemies must not reach.
    #[must_use]
    pub fn boundary(position: Vec2, size: Size) -> Self {
        Self::new(EntityKind::Boundary, position, size)
    }

    /// An enemy carrying `word`, with its text attached as a single run.
    #[must_use]
    pub fn enemy(
        word_id: impl Into<String>,
        word: impl Into<String>,
        boundary: EntityId,
        position: Vec2,
        size: Size,
    ) -> Self {
        let word = word.into();
        let visual = Visual::new().with_text(TextRun::new(word.clone()));
        Self::new(
            EntityKind::Enemy(EnemyState {
                word_id: word_id.into(),
                word,
                boundary,
                wobble: PhaseAccumulator::default(),
                wobble_amplitude: 0.0,
            }),
            position,
            size,
        )
        .with_visual(visual)
    }

    /// A floating label that fades out over `ttl_ms`.
    #[must_use]
    pub fn fade_text(text: impl Into<String>, rgb: [u8; 3], ttl_ms: f32, position: Vec2) -> Self {
        let state = FadeTextState::new(rgb, ttl_ms);
        let visual = Visual::new().with_text(TextRun::new(text).with_fill(state.rgba()));
        Self::new(EntityKind::FadeText(state), position, Size::default()).with_visual(visual)
    }

    /// Use a fixed id instead of a generated one.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    #[must_use]
    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    #[must_use]
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Replace the visual attachments.
    #[must_use]
    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = visual;
        self
    }

    /// Set the enemy wobble. No effect on other kinds.
    #[must_use]
    pub fn with_wobble(mut self, wobble: PhaseAccumulator, amplitude: f32) -> Self {
        if let EntityKind::Enemy(enemy) = &mut self.kind {
            enemy.wobble = wobble;
            enemy.wobble_amplitude = amplitude;
        }
        self
    }

    /// Start deactivated (staged until gameplay activates it).
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// A simulated object participating in the per-frame loop.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    active: bool,
    /// Top-left corner, in world units.
    pub position: Vec2,
    /// World units per second.
    pub velocity: Vec2,
    /// World units per second squared.
    pub acceleration: Vec2,
    pub size: Size,
    pub facing: Facing,
    pub visual: Visual,
}

impl Entity {
    /// Build an entity, generating an id if none was supplied.
    #[must_use]
    pub fn from_init(init: EntityInit) -> Self {
        Self {
            id: init.id.unwrap_or_else(EntityId::generate),
            kind: init.kind,
            active: init.active,
            position: init.position,
            velocity: init.velocity,
            acceleration: init.acceleration,
            size: init.size,
            facing: init.facing,
            visual: init.visual,
        }
    }

    /// Returns the entity's id.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Returns the kind and its data.
    #[must_use]
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Returns the data-free kind tag.
    #[must_use]
    pub fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    /// Returns the enemy data if this is an enemy.
    #[must_use]
    pub fn enemy(&self) -> Option<&EnemyState> {
        match &self.kind {
            EntityKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    /// Returns `true` if this is an enemy.
    #[must_use]
    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy(_))
    }

    /// Returns `true` if the entity takes part in update and draw.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Include the entity in update and draw again.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Exclude the entity from update and draw without unregistering it.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Teardown hook, run by the registry when the entity is removed.
    pub fn destroy(&mut self) {
        trace!(id = %self.id, kind = self.tag().name(), "entity destroyed");
        self.active = false;
    }

    /// The entity's axis-aligned bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.position, self.size)
    }

    /// Closed-interval AABB test; touching edges count as colliding.
    #[must_use]
    pub fn collides(&self, other: &Entity) -> bool {
        self.bounds().overlaps(&other.bounds())
    }

    /// Advance one frame of `dt` seconds.
    ///
    /// Inactive entities are skipped here, for every kind. Active ones run
    /// their kind behaviour, then integrate acceleration and velocity.
    pub fn update(&mut self, dt: f32) -> UpdateOutcome {
        if !self.active {
            return UpdateOutcome::Keep;
        }
        let outcome = (behavior(self.tag()).update)(self, dt);
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
        outcome
    }

    /// Hand the entity's draw data to a renderer, if active.
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        if !self.active {
            return;
        }
        renderer.draw(&DrawView {
            id: &self.id,
            tag: self.tag(),
            bounds: self.bounds(),
            facing: self.facing,
            visual: &self.visual,
        });
    }

    pub(crate) fn kind_and_velocity_mut(&mut self) -> (&mut EntityKind, &mut Vec2) {
        (&mut self.kind, &mut self.velocity)
    }

    pub(crate) fn kind_and_visual_mut(&mut self) -> (&mut EntityKind, &mut Visual) {
        (&mut self.kind, &mut self.visual)
    }
}
