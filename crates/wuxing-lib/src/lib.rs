//! Deterministic, point-based Wu Xing five-element chart engine.
//!
//! [`engine::compute`] is the single public entry point: feed it a
//! [`types::WuxingInput`] and get back a [`result::WuxingResult`]. Every
//! stage in between is a pure function over an explicit [`state::State`].

#![forbid(unsafe_code)]

mod aggregate;
mod balance;
mod error;
mod result;
mod state;
mod steps;
mod tables;
mod types;

pub mod engine;

pub use aggregate::ElementSummary;
pub use balance::Gods;
pub use error::{Result, WuxingError};
pub use result::{DayMaster, NodeOutput, WuxingResult};
pub use state::{BonusNode, InteractionLogEntry, Node, State};
pub use tables::InteractionTag;
pub use types::{
    Branch, Element, Gender, Location, PillarInput, PillarPos, Polarity, Relation, Role, Slot,
    Stem, Strength, WuxingInput,
};

pub use engine::compute;
