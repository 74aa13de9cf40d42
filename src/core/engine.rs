//! Buffering decision engine.
#![allow(dead_code)]

use serde::Serialize;

/// Governance signals gathered for one decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalSnapshot {
    /// Average measured latency over the query window.
    pub avg_latency_ms: i64,

    /// Worst measured latency over the query window.
    pub max_latency_ms: i64,

    /// Latency above this triggers buffering.
    pub threshold_ms: i64,

    /// Manual override: buffer regardless of measurements.
    pub forced: bool,

    /// Simulated latency; 0 means none.
    pub simulated_ms: i64,

    /// System halt: buffer everything.
    pub halted: bool,
}

/// The buffering decision for one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub buffering: bool,
    pub reason: String,
    pub latency_ms: i64,
}

/// Decide whether buffering should be active.
///
/// Pure function over the snapshot. Signal precedence is strict, first
/// match wins: halt, manual override, simulated latency, measured latency.
/// The measured check compares the window maximum against the threshold.
/// Threshold comparisons are strict greater-than; a value exactly at the
/// threshold passes through.
pub fn evaluate(state: &SignalSnapshot) -> Verdict {
    if state.halted {
        return Verdict {
            buffering: true,
            reason: "system halted".to_string(),
            latency_ms: 0,
        };
    }

    if state.forced {
        return Verdict {
            buffering: true,
            reason: "manual override".to_string(),
            latency_ms: state.avg_latency_ms,
        };
    }

    if state.simulated_ms > state.threshold_ms {
        return Verdict {
            buffering: true,
            reason: format!("simulated {}ms", state.simulated_ms),
            latency_ms: state.simulated_ms,
        };
    }

    if state.max_latency_ms > state.threshold_ms {
        return Verdict {
            buffering: true,
            reason: format!(
                "latency {}ms > {}ms",
                state.max_latency_ms, state.threshold_ms
            ),
            latency_ms: state.max_latency_ms,
        };
    }

    Verdict {
        buffering: false,
        reason: "healthy".to_string(),
        latency_ms: state.avg_latency_ms,
    }
}
