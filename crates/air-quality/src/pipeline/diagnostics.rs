//! Per-request acquisition diagnostics.

use std::borrow::Cow;

use crate::models::ProviderId;

/// Source id recorded for cache lookups and writes.
pub const CACHE_SOURCE: &str = "CACHE";

/// What happened at one step of an acquisition.
#[derive(Clone, Debug, PartialEq)]
pub enum AttemptOutcome {
    /// A live cache entry answered the request.
    CacheHit,
    /// The source answered with a usable reading.
    Success,
    /// The source's timeout window expired.
    TimedOut,
    /// The source failed for any other reason.
    Failed { message: String },
    /// Every live source failed; the reading was synthesized.
    Simulated,
}

/// Record of a single step during an acquisition.
#[derive(Clone, Debug)]
pub struct SourceAttempt {
    pub source: ProviderId,
    pub outcome: AttemptOutcome,
}

/// Ordered trail of what the pipeline tried for one request.
#[derive(Clone, Debug, Default)]
pub struct AcquisitionDiagnostics {
    pub attempts: Vec<SourceAttempt>,
}

impl AcquisitionDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    fn record(&mut self, source: ProviderId, outcome: AttemptOutcome) {
        self.attempts.push(SourceAttempt { source, outcome });
    }

    pub fn record_cache_hit(&mut self) {
        self.record(Cow::Borrowed(CACHE_SOURCE), AttemptOutcome::CacheHit);
    }

    pub fn record_success(&mut self, source: ProviderId) {
        self.record(source, AttemptOutcome::Success);
    }

    pub fn record_timeout(&mut self, source: ProviderId) {
        self.record(source, AttemptOutcome::TimedOut);
    }

    pub fn record_error(&mut self, source: ProviderId, message: String) {
        self.record(source, AttemptOutcome::Failed { message });
    }

    pub fn record_simulated(&mut self, source: ProviderId) {
        self.record(source, AttemptOutcome::Simulated);
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| match &a.outcome {
                AttemptOutcome::CacheHit => format!("{}: HIT", a.source),
                AttemptOutcome::Success => format!("{}: SUCCESS", a.source),
                AttemptOutcome::TimedOut => format!("{}: TIMEOUT", a.source),
                AttemptOutcome::Failed { message } => format!("{}: ERROR ({})", a.source, message),
                AttemptOutcome::Simulated => format!("{}: FALLBACK", a.source),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Whether the reading was served from the cache.
    pub fn is_cache_hit(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| a.outcome == AttemptOutcome::CacheHit)
    }

    /// Whether the reading was synthesized.
    pub fn is_simulated(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| a.outcome == AttemptOutcome::Simulated)
    }

    /// Sources that failed or timed out, in attempt order.
    pub fn failures(&self) -> Vec<&ProviderId> {
        self.attempts
            .iter()
            .filter(|a| {
                matches!(
                    a.outcome,
                    AttemptOutcome::TimedOut | AttemptOutcome::Failed { .. }
                )
            })
            .map(|a| &a.source)
            .collect()
    }
}
