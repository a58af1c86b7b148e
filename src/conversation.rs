//! Conversation turn pipeline
//!
//! Session state, turn execution against the intent service, and the
//! append-only log the UI replays.

pub mod executor;
pub mod log;
pub mod turn_loop;

#[cfg(test)]
mod proptests;

pub use executor::IntentTarget;
pub use log::Turn;
pub use turn_loop::{ChatEvent, Conversation, ConversationSnapshot, Phase, TurnLoop, TurnLoopError};
