//! Named configuration values ("inputs") resolved from competing providers.
//!
//! Every input keeps an append-only log of [`Event`]s. The effective value is carried by
//! the `set` event with the highest priority; ties go to the later event. Nothing is ever
//! overwritten, so the log doubles as an audit trail (see [`Input::diagnostic_string`]).

#![forbid(unsafe_code)]

mod error;
mod event;
mod input;
mod kind;
pub mod priority;
mod registry;

#[cfg(test)]
mod proptest;

pub use error::InputError;
pub use event::{Event, EventAction};
pub use input::{Input, InputOptions, resolve};
pub use kind::InputType;
pub use registry::InputRegistry;
