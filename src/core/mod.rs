//! Governance core: latency tracking, buffering decisions, synthesis.

pub mod engine;
pub mod synthesis;
pub mod tracker;
pub mod validate;

pub use engine::{evaluate, SignalSnapshot, Verdict};
pub use synthesis::render;
pub use tracker::{LatencyTracker, Sample, TrackerStatus};
pub use validate::{normalize_content, normalize_latency, normalize_priority, Priority};
