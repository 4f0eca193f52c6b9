//! MTQ Core - job engine for the media tag queue
//!
//! Turns user-submitted media files into a durable, restartable work
//! queue and runs each item's ordered actions on a background worker.
//! This crate has zero UI dependencies; a UI drives it through
//! `QueueStore` accessors, `QueueEvent` subscriptions and `QueueRunner`.

pub mod actions;
pub mod collaborators;
pub mod config;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod queue;
pub mod runner;

#[cfg(test)]
mod test_support;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
