//! Background execution of the queue.
//!
//! One worker thread drives one item at a time through
//! `QueueItem::process`, in queue order, while holding a sleep-prevention
//! assertion for the length of the run.

mod power;
mod queue_runner;

pub use power::{NoopInhibitor, PowerAssertion, PowerError, SleepInhibitor, SystemInhibitor};
pub use queue_runner::QueueRunner;
