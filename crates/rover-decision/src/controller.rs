//! State Machine Controller.
//!
//! The controller is a data-driven transition table over [`StateId`]. Each
//! state maps to an ordered list of `(guard, next)` rows:
//!
//! - rows are evaluated top to bottom and the **first** satisfied guard
//!   decides the outcome;
//! - when no row matches, the controller stays and re-runs the current
//!   state's action, because actions keep issuing their intent every cycle;
//! - a row may target its own state, which is an explicit re-entry rather
//!   than a stay;
//! - a row may mark a case as unresolved: the controller logs it, stays,
//!   and runs no action, so the previous intent stands.
//!
//! [`step`] is the pure half: state token in, [`Decision`] out. The
//! [`Controller`] wraps the current token and runs the chosen action.
//!
//! # Example
//!
//! ```rust
//! use rover_decision::controller::{Controller, StepKind};
//! use rover_types::{RoverConfig, RoverState, StateId};
//!
//! let cfg = RoverConfig::default();
//! let mut controller = Controller::new();
//! let mut rover = RoverState::at((100.0, 100.0), 50.0);
//!
//! // Yaw is inside the seek band, so the rover starts following the wall.
//! let decision = controller.run(&mut rover, &cfg);
//! assert_eq!(decision.kind, StepKind::Entered);
//! assert_eq!(controller.state(), StateId::FollowWall);
//! assert_eq!(rover.intent.mode, StateId::FollowWall);
//! ```

use rover_types::config::{EventThresholds, RoverConfig};
use rover_types::{RoverState, StateId};
use tracing::{debug, info, warn};

use crate::actions::{Action, action_for};
use crate::events::Event;
use crate::events::Event as E;

use self::Guard::{All, Always, Any, Unless, When};
use self::Next::{Goto, Stay, Unresolved};

// ────────────────────────────────────────────────────────────────────────────
// Guards and rows
// ────────────────────────────────────────────────────────────────────────────

/// A boolean condition over [`Event`]s gating one transition row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Always,
    When(Event),
    Unless(Event),
    All(&'static [Event]),
    Any(&'static [Event]),
}

impl Guard {
    pub fn holds(&self, rover: &RoverState, t: &EventThresholds) -> bool {
        match self {
            Guard::Always => true,
            Guard::When(e) => e.holds(rover, t),
            Guard::Unless(e) => !e.holds(rover, t),
            Guard::All(events) => events.iter().all(|e| e.holds(rover, t)),
            Guard::Any(events) => events.iter().any(|e| e.holds(rover, t)),
        }
    }
}

/// Where a matching row leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Goto(StateId),
    Stay,
    /// No behaviour is defined for this case.
    Unresolved,
}

/// One `(guard, next)` row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub guard: Guard,
    pub next: Next,
}

const fn row(guard: Guard, next: Next) -> Transition {
    Transition { guard, next }
}

const SEEK_WALL: &[Transition] = &[row(When(E::YawInSeekBand), Goto(StateId::FollowWall))];

const FOLLOW_WALL: &[Transition] = &[
    row(
        All(&[E::DeviatedFromWall, E::LeftRoomSufficient]),
        Goto(StateId::AlignToWall),
    ),
    row(When(E::ObstacleLeft), Goto(StateId::AvoidWall)),
    row(
        Any(&[E::SampleOnLeft, E::SampleCloseRight]),
        Goto(StateId::ApproachSample),
    ),
    row(When(E::Stalled), Goto(StateId::RecoverStuck)),
    row(When(E::MissionComplete), Goto(StateId::ReturnHome)),
];

const AVOID_WALL: &[Transition] = &[row(When(E::PointedAlongWall), Goto(StateId::FollowWall))];

const ALIGN_TO_WALL: &[Transition] = &[
    row(When(E::ObstacleLeft), Goto(StateId::AvoidWall)),
    row(Unless(E::DeviatedFromWall), Goto(StateId::FollowWall)),
];

const RECOVER_STUCK: &[Transition] = &[row(
    All(&[E::FrontRoomSufficient, E::PointedAtNav]),
    Goto(StateId::FollowWall),
)];

const APPROACH_SAMPLE: &[Transition] = &[
    row(All(&[E::SampleVisible, E::NearSample]), Goto(StateId::Halt)),
    row(When(E::SampleVisible), Stay),
    row(Unless(E::SampleVisible), Unresolved),
];

const HALT: &[Transition] = &[row(When(E::PickupEligible), Goto(StateId::BeginPickup))];

const BEGIN_PICKUP: &[Transition] = &[row(Always, Goto(StateId::AwaitPickupStart))];

const AWAIT_PICKUP_START: &[Transition] =
    &[row(When(E::PickupActive), Goto(StateId::AwaitPickupEnd))];

const AWAIT_PICKUP_END: &[Transition] = &[row(When(E::PickupCleared), Goto(StateId::AvoidWall))];

const RETURN_HOME: &[Transition] = &[
    row(When(E::ObstacleAhead), Goto(StateId::ReturnHome)),
    row(When(E::HomeReached), Goto(StateId::Park)),
    row(When(E::Stalled), Goto(StateId::AvoidObstacles)),
];

const AVOID_OBSTACLES: &[Transition] =
    &[row(When(E::FrontRoomSufficient), Goto(StateId::ReturnHome))];

const PARK: &[Transition] = &[row(Always, Goto(StateId::Park))];

/// The ordered transition rows of `state`.
pub fn transitions(state: StateId) -> &'static [Transition] {
    match state {
        StateId::SeekWall => SEEK_WALL,
        StateId::FollowWall => FOLLOW_WALL,
        StateId::AvoidWall => AVOID_WALL,
        StateId::AlignToWall => ALIGN_TO_WALL,
        StateId::RecoverStuck => RECOVER_STUCK,
        StateId::ApproachSample => APPROACH_SAMPLE,
        StateId::Halt => HALT,
        StateId::BeginPickup => BEGIN_PICKUP,
        StateId::AwaitPickupStart => AWAIT_PICKUP_START,
        StateId::AwaitPickupEnd => AWAIT_PICKUP_END,
        StateId::ReturnHome => RETURN_HOME,
        StateId::AvoidObstacles => AVOID_OBSTACLES,
        StateId::Park => PARK,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// step
// ────────────────────────────────────────────────────────────────────────────

/// How a decision relates to the state it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Moved to a different state.
    Entered,
    /// A row explicitly targeted the current state.
    Reentered,
    /// No row matched, or a row said to stay.
    Stayed,
    /// A row declared the case undefined; the state is kept.
    Unresolved,
}

/// Outcome of one decision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub from: StateId,
    pub to: StateId,
    pub kind: StepKind,
}

impl Decision {
    /// The action to run this cycle: the one owned by the destination state.
    pub fn action(&self) -> Action {
        action_for(self.to)
    }
}

/// Choose the next state from `state` without touching anything.
pub fn step(state: StateId, rover: &RoverState, t: &EventThresholds) -> Decision {
    let stay = |kind| Decision {
        from: state,
        to: state,
        kind,
    };
    let Some(matched) = transitions(state).iter().find(|tr| tr.guard.holds(rover, t)) else {
        return stay(StepKind::Stayed);
    };
    match matched.next {
        Goto(to) if to == state => stay(StepKind::Reentered),
        Goto(to) => Decision {
            from: state,
            to,
            kind: StepKind::Entered,
        },
        Stay => stay(StepKind::Stayed),
        Unresolved => stay(StepKind::Unresolved),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

/// Holds the current state token and runs one decision pass per cycle.
#[derive(Debug, Clone)]
pub struct Controller {
    state: StateId,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// A controller in the initial [`StateId::SeekWall`] state.
    pub fn new() -> Self {
        Self::starting_in(StateId::SeekWall)
    }

    pub fn starting_in(state: StateId) -> Self {
        Self { state }
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    /// Decide, run the chosen state's action on `rover`, and advance.
    ///
    /// An unresolved decision runs no action and leaves `rover.intent` as
    /// the previous cycle set it.
    ///
    /// # Panics
    ///
    /// Panics if the rover's position, yaw, velocity or velocity ceiling is
    /// not finite.
    pub fn run(&mut self, rover: &mut RoverState, cfg: &RoverConfig) -> Decision {
        assert!(
            rover.pos.0.is_finite()
                && rover.pos.1.is_finite()
                && rover.yaw.is_finite()
                && rover.vel.is_finite()
                && rover.max_vel.is_finite(),
            "rover telemetry must be finite: pos {:?}, yaw {}, vel {}, max_vel {}",
            rover.pos,
            rover.yaw,
            rover.vel,
            rover.max_vel
        );
        let decision = step(self.state, rover, &cfg.events);
        if decision.kind != StepKind::Unresolved {
            decision.action()(rover, cfg);
        }

        match decision.kind {
            StepKind::Entered => info!(from = %decision.from, to = %decision.to, "state change"),
            StepKind::Reentered => debug!(state = %decision.to, "state re-entered"),
            StepKind::Stayed => {}
            StepKind::Unresolved => warn!(
                state = %decision.from,
                "no transition defined for current observations; staying"
            ),
        }

        self.state = decision.to;
        decision
    }
}
