//! Advisory notices.
//!
//! Some inputs are accepted but worth reporting: a large blur radius that
//! will be slow, or a compass angle that had to be snapped to the nearest
//! 45°. These never block execution. Each notice is logged through
//! `tracing` and, when recording is enabled, kept in a [`Diagnostics`] sink
//! the caller can inspect or drain.

use std::fmt;

use tracing::warn;

/// A single non-fatal notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// Blur radius above the configured comfort limit; cost grows with radius².
    LargeBlurRadius { radius: u32 },
    /// Angle was not a multiple of 45° and has been snapped.
    NonCanonicalAngle { requested: i32, snapped: u16 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::LargeBlurRadius { radius } => {
                write!(f, "blur radius {radius} is large and may cause slowdown")
            }
            Diagnostic::NonCanonicalAngle { requested, snapped } => {
                write!(f, "angle {requested} converted to axis {snapped}")
            }
        }
    }
}

/// Sink for [`Diagnostic`]s.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    record: bool,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Sink that logs and records.
    pub fn recording() -> Self {
        Self {
            record: true,
            entries: Vec::new(),
        }
    }

    /// Sink that only logs.
    pub fn log_only() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "advisory");
        if self.record {
            self.entries.push(diagnostic);
        }
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take all recorded notices, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }
}
