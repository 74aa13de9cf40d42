//! Floodgate library root.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod store;

pub use cli::Cli;
pub use config::Config;
pub use core::{
    evaluate, normalize_content, normalize_latency, normalize_priority, render, LatencyTracker,
    Priority, SignalSnapshot, TrackerStatus, Verdict,
};
pub use error::{Error, Result};
pub use store::{Store, SynthesisEvent, Thought, ThoughtStatus};
