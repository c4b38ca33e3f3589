//! Interactive review-and-merge workflow
//!
//! Split the same way as a plan/execute pair:
//! 1. Session - pure state machine, one transition per event
//! 2. Driver - effectful loop that renders, reads input and runs provider calls

mod driver;
mod session;

pub use driver::{Deadlines, Driver, Frontend, QuitHandle};
pub use session::{
    Effect, Event, Input, Outcome, OutcomeKind, ReviewAction, Session, SessionOptions, Stage,
};
