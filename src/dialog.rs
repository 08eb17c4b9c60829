//! Per-user dialog state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the engine feeds events in, executes the returned effects, and feeds
//! their outcomes back as follow-up events.

pub mod command;
mod effect;
pub mod event;
pub mod replies;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{DialogMode, Session};
pub use transition::transition;
