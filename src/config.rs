//! Session configuration.

use crate::diagnostics::Diagnostics;

/// Blur radii above this emit a slowdown advisory by default.
pub const DEFAULT_LARGE_BLUR_RADIUS: u32 = 5;

/// Tunables for a [`ManipulationSession`](crate::session::ManipulationSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Radius above which blur emits
    /// [`Diagnostic::LargeBlurRadius`](crate::Diagnostic::LargeBlurRadius).
    pub large_blur_radius: u32,
    /// Keep emitted diagnostics for later inspection (they are always logged).
    pub record_diagnostics: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            large_blur_radius: DEFAULT_LARGE_BLUR_RADIUS,
            record_diagnostics: true,
        }
    }
}

impl SessionConfig {
    pub fn with_large_blur_radius(mut self, radius: u32) -> Self {
        self.large_blur_radius = radius;
        self
    }

    pub fn with_record_diagnostics(mut self, record: bool) -> Self {
        self.record_diagnostics = record;
        self
    }

    pub(crate) fn diagnostics(&self) -> Diagnostics {
        if self.record_diagnostics {
            Diagnostics::recording()
        } else {
            Diagnostics::log_only()
        }
    }
}
