//! `rover-decision` – the behavioural half of the control loop.
//!
//! Reads the observations perception left on the
//! [`RoverState`][rover_types::RoverState] and decides what the rover does
//! next.
//!
//! # Modules
//!
//! - [`events`] – [`Event`][events::Event]: the closed set of named sensing
//!   predicates used as guards.
//! - [`actions`] – one motion-intent action per behavioural state.
//! - [`controller`] – the transition table, the pure [`step`][controller::step]
//!   function and the [`Controller`][controller::Controller] that runs it.

pub mod actions;
pub mod controller;
pub mod events;

pub use controller::{Controller, Decision, StepKind};
pub use events::Event;
