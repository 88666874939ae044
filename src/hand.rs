//! Hand-state adapter.
//!
//! The gesture source pushes a [`HandReading`] whenever it has one; the
//! simulation folds it into its owned [`HandState`] with [`HandState::apply`].
//! Independently, every tick calls [`HandState::decay`] so transient impulses
//! die out whether or not new readings arrive.
//!
//! # Edge detection
//!
//! The only stateful rule is the explosion edge: a reading of
//! [`Gesture::Open`] immediately after a reading of [`Gesture::Fist`] sets the
//! explosion force to its configured peak. The stored gesture doubles as the
//! edge memory. Losing the hand resets it to [`Gesture::None`], so a fist, a
//! dropout, then an open palm does not fire.
//!
//! A reading whose palm position is not finite is treated as no hand.

use glam::{Vec2, Vec3};
use log::debug;

use crate::config::ForceConfig;

/// Number of fingertips needed for per-finger forces.
pub const FINGERTIP_COUNT: usize = 5;

/// Gesture classifications reported by the gesture source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// No gesture, or no hand.
    #[default]
    None,
    /// All fingers extended. Attracts particles.
    Open,
    /// Closed fist. Compresses the formation.
    Fist,
    /// Fast lateral movement. Scatters particles.
    Swipe,
    /// Index and middle extended. Standing wave.
    Peace,
    /// Thumb and index touching. Tight capture.
    Pinch,
    /// Three fingers. Pushes particles away.
    Repel,
    /// Index only. Attracts like [`Gesture::Open`] without arming explosions.
    Point,
}

impl Gesture {
    /// Every gesture in code order.
    pub const ALL: [Gesture; 8] = [
        Gesture::None,
        Gesture::Open,
        Gesture::Fist,
        Gesture::Swipe,
        Gesture::Peace,
        Gesture::Pinch,
        Gesture::Repel,
        Gesture::Point,
    ];

    /// Small integer code, as used by shaders and the HUD.
    pub fn code(&self) -> u32 {
        match self {
            Gesture::None => 0,
            Gesture::Open => 1,
            Gesture::Fist => 2,
            Gesture::Swipe => 3,
            Gesture::Peace => 4,
            Gesture::Pinch => 5,
            Gesture::Repel => 6,
            Gesture::Point => 7,
        }
    }

    /// Inverse of [`code`](Gesture::code). Unknown codes map to `None`.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Gesture::Open,
            2 => Gesture::Fist,
            3 => Gesture::Swipe,
            4 => Gesture::Peace,
            5 => Gesture::Pinch,
            6 => Gesture::Repel,
            7 => Gesture::Point,
            _ => Gesture::None,
        }
    }

    /// Uppercase display name.
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::None => "NONE",
            Gesture::Open => "OPEN",
            Gesture::Fist => "FIST",
            Gesture::Swipe => "SWIPE",
            Gesture::Peace => "PEACE",
            Gesture::Pinch => "PINCH",
            Gesture::Repel => "REPEL",
            Gesture::Point => "POINT",
        }
    }

    /// Whether per-finger forces apply under this gesture.
    pub fn uses_fingertips(&self) -> bool {
        matches!(self, Gesture::Open | Gesture::Point | Gesture::Pinch)
    }
}

/// One update from the gesture source, already in simulation-world coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandReading {
    /// Whether a hand was detected.
    pub present: bool,
    /// Palm position. Ignored when `present` is false.
    pub position: Vec3,
    /// Classified gesture.
    pub gesture: Gesture,
    /// How long the gesture has been held, normalized to `[0, 1]`.
    pub hold_ratio: f32,
    /// Fingertip positions, thumb first. Anything other than five means no finger forces.
    pub fingertips: Vec<Vec3>,
    /// Lateral hand velocity, set only on the reading where a swipe was detected.
    pub swipe_velocity: Option<Vec2>,
}

impl HandReading {
    /// A reading with no hand in view.
    pub fn absent() -> Self {
        Self::default()
    }

    /// A present hand at `position` showing `gesture`.
    pub fn at(position: Vec3, gesture: Gesture) -> Self {
        Self {
            present: true,
            position,
            gesture,
            ..Default::default()
        }
    }

    /// Attach fingertip positions.
    pub fn with_fingertips(mut self, fingertips: impl Into<Vec<Vec3>>) -> Self {
        self.fingertips = fingertips.into();
        self
    }

    /// Set the normalized hold duration.
    pub fn with_hold(mut self, ratio: f32) -> Self {
        self.hold_ratio = ratio;
        self
    }

    /// Attach a detected swipe velocity.
    pub fn with_swipe(mut self, velocity: Vec2) -> Self {
        self.swipe_velocity = Some(velocity);
        self
    }
}

/// Notable transitions produced by [`HandState::apply`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HandEvent {
    /// FIST → OPEN edge fired.
    Explosion {
        /// Force the explosion starts at.
        force: f32,
    },
    /// A swipe impulse was armed.
    Swipe {
        /// Lateral velocity driving the scatter.
        velocity: Vec2,
    },
    /// The hand left view.
    Lost,
}

/// Hand state owned by a simulation session.
///
/// Read-only to the force evaluator; written only by [`apply`](HandState::apply)
/// and [`decay`](HandState::decay).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandState {
    present: bool,
    position: Vec3,
    gesture: Gesture,
    hold_ratio: f32,
    explosion_force: f32,
    fingertips: Vec<Vec3>,
    swipe_velocity: Vec2,
    swipe_countdown: u32,
    swipe_ticks: u32,
}

impl HandState {
    /// Start with no hand and no pending impulses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a new reading into the state.
    pub fn apply(&mut self, reading: HandReading, forces: &ForceConfig) -> Option<HandEvent> {
        if !reading.present || !reading.position.is_finite() {
            if reading.present {
                debug!("dropping reading with non-finite palm {:?}", reading.position);
            }
            let was_present = self.present;
            self.present = false;
            self.gesture = Gesture::None;
            self.hold_ratio = 0.0;
            self.fingertips.clear();
            if was_present {
                debug!("hand lost, gesture memory cleared");
                return Some(HandEvent::Lost);
            }
            return None;
        }

        let mut event = None;

        if self.gesture == Gesture::Fist && reading.gesture == Gesture::Open {
            self.explosion_force = forces.explosion.peak;
            debug!("fist released, explosion at {:.1}", self.explosion_force);
            event = Some(HandEvent::Explosion {
                force: self.explosion_force,
            });
        }

        self.present = true;
        self.position = reading.position;
        self.gesture = reading.gesture;
        self.hold_ratio = if reading.hold_ratio.is_nan() {
            0.0
        } else {
            reading.hold_ratio.clamp(0.0, 1.0)
        };
        self.fingertips = reading.fingertips;
        if !self.fingertips.iter().all(|tip| tip.is_finite()) {
            self.fingertips.clear();
        }

        if let Some(velocity) = reading.swipe_velocity.filter(|v| v.is_finite()) {
            self.swipe_velocity = velocity;
            self.swipe_countdown = forces.swipe_ticks;
            self.swipe_ticks = forces.swipe_ticks;
            debug!("swipe armed, velocity ({:.2}, {:.2})", velocity.x, velocity.y);
            event = event.or(Some(HandEvent::Swipe { velocity }));
        }

        event
    }

    /// Per-tick decay of transient impulses.
    ///
    /// The explosion force follows [`ExplosionConfig::decay_step`](crate::ExplosionConfig::decay_step).
    /// The swipe countdown ticks down; once it runs out the stored swipe
    /// velocity fades by `swipe_velocity_decay`.
    pub fn decay(&mut self, forces: &ForceConfig) {
        self.explosion_force = forces.explosion.decay_step(self.explosion_force);

        if self.swipe_countdown > 0 {
            self.swipe_countdown -= 1;
        } else {
            self.swipe_velocity *= forces.swipe_velocity_decay;
        }
    }

    /// Whether a hand is in view.
    #[inline]
    pub fn present(&self) -> bool {
        self.present
    }

    /// Palm position. Meaningful only while [`present`](HandState::present).
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Gesture of the last present reading, `None` once the hand is lost.
    ///
    /// This is also what the next reading is compared against for the
    /// FIST → OPEN edge.
    #[inline]
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Normalized hold duration of the current gesture.
    #[inline]
    pub fn hold_ratio(&self) -> f32 {
        self.hold_ratio
    }

    /// Current explosion impulse, zero when idle.
    #[inline]
    pub fn explosion_force(&self) -> f32 {
        self.explosion_force
    }

    /// Whether an explosion impulse is still decaying.
    #[inline]
    pub fn is_exploding(&self) -> bool {
        self.explosion_force > 0.0
    }

    /// Fingertip positions if exactly five were supplied.
    #[inline]
    pub fn fingertips(&self) -> Option<&[Vec3]> {
        (self.fingertips.len() == FINGERTIP_COUNT).then_some(self.fingertips.as_slice())
    }

    /// Stored lateral swipe velocity.
    #[inline]
    pub fn swipe_velocity(&self) -> Vec2 {
        self.swipe_velocity
    }

    /// Whether the swipe countdown is still running.
    #[inline]
    pub fn swipe_active(&self) -> bool {
        self.swipe_countdown > 0
    }

    /// Remaining swipe strength in `[0, 1]`.
    pub fn swipe_strength(&self) -> f32 {
        if self.swipe_ticks == 0 {
            0.0
        } else {
            self.swipe_countdown as f32 / self.swipe_ticks as f32
        }
    }
}
