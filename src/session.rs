//! Manipulation session: a source baseline plus a working buffer.
//!
//! Filters read only from the source and write only into the working
//! buffer, so each call is a pure function of the last committed state.
//! Two filters in a row without a [`commit`](ManipulationSession::commit)
//! between them do not stack: the second one starts again from the source.
//!
//! Every `apply_*` validates its arguments before touching any pixel; on
//! error the working buffer is left exactly as it was.

use tracing::debug;

use crate::buffer::{RasterBuffer, Rgba};
use crate::config::SessionConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::filters::{
    blur_rgba_u8, channel_rgba_u8, desaturate_rgba_u8, grayscale_rgba_u8, BlurRadius,
    ChannelSelector, Percentage, Weighting,
};
use crate::gradient::{
    self, validate_angle, BrightnessScaleMapper, Classification, GradientMap, Threshold,
};
use crate::neighbor::CompassAngle;
use crate::operation::{Operation, Outcome};

/// Owns the source and working buffers of one image.
#[derive(Debug, Clone)]
pub struct ManipulationSession {
    source: RasterBuffer,
    working: RasterBuffer,
    config: SessionConfig,
    diagnostics: Diagnostics,
}

impl ManipulationSession {
    pub fn new(buffer: RasterBuffer) -> Self {
        Self::with_config(buffer, SessionConfig::default())
    }

    pub fn with_config(buffer: RasterBuffer, config: SessionConfig) -> Self {
        debug!(width = buffer.width(), height = buffer.height(), "session created");
        Self {
            working: buffer.clone(),
            source: buffer,
            diagnostics: config.diagnostics(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Last committed baseline.
    pub fn source(&self) -> &RasterBuffer {
        &self.source
    }

    /// Buffer holding the result of the latest manipulation.
    pub fn working(&self) -> &RasterBuffer {
        &self.working
    }

    pub fn into_working(self) -> RasterBuffer {
        self.working
    }

    pub fn width(&self) -> u32 {
        self.source.width()
    }

    pub fn height(&self) -> u32 {
        self.source.height()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.entries()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.drain()
    }

    /// Read a pixel of the working buffer.
    pub fn pixel(&self, id: usize) -> Result<Rgba> {
        self.working.get(id)
    }

    /// Write a pixel of the working buffer.
    pub fn set_pixel(&mut self, id: usize, pixel: Rgba) -> Result<()> {
        self.working.set(id, pixel)
    }

    /// Make the working buffer the new baseline.
    pub fn commit(&mut self) -> &mut Self {
        self.source.clone_from(&self.working);
        debug!("working buffer committed");
        self
    }

    /// Discard uncommitted edits.
    pub fn revert(&mut self) -> &mut Self {
        self.working.clone_from(&self.source);
        debug!("working buffer reverted");
        self
    }

    /// Box blur; `radius` must be positive and even.
    pub fn apply_blur(&mut self, radius: u32) -> Result<&mut Self> {
        let radius =
            BlurRadius::checked(radius, self.config.large_blur_radius, &mut self.diagnostics)?;
        let result = blur_rgba_u8(self.source.view(), radius);
        self.working.replace(result);
        debug!(radius = radius.get(), "blur applied");
        Ok(self)
    }

    /// Move RGB toward their weighted average; `percentage` is clamped to 0..=100.
    pub fn apply_desaturate(&mut self, percentage: i64, human: bool) -> &mut Self {
        let percentage = Percentage::clamped(percentage);
        let weighting = Weighting::from_human(human);
        let result = desaturate_rgba_u8(self.source.view(), percentage, weighting);
        self.working.replace(result);
        debug!(percentage = percentage.get(), ?weighting, "desaturate applied");
        self
    }

    /// Same as `apply_desaturate(100, human)`.
    pub fn apply_grayscale(&mut self, human: bool) -> &mut Self {
        self.apply_desaturate(100, human)
    }

    pub fn apply_channel(&mut self, selector: ChannelSelector) -> &mut Self {
        let result = channel_rgba_u8(self.source.view(), selector);
        self.working.replace(result);
        debug!(%selector, "channel applied");
        self
    }

    /// Validate gradient arguments, snap the angle and grayscale the working buffer.
    fn prepare_gradient(
        &mut self,
        threshold: i32,
        angle: i32,
    ) -> Result<(Threshold, CompassAngle)> {
        let threshold = Threshold::new(threshold)?;
        let angle = validate_angle(angle)?;
        let axis = CompassAngle::normalize(angle, &mut self.diagnostics);
        self.grayscale_for_luminance();
        Ok((threshold, axis))
    }

    fn grayscale_for_luminance(&mut self) {
        let luma = grayscale_rgba_u8(self.source.view(), Weighting::Human);
        self.working.replace(luma);
    }

    /// Classify every pixel against its neighbour in direction `angle`.
    ///
    /// The working buffer is first replaced by the human-weighted grayscale
    /// of the source.
    pub fn scan_gradient<F>(&mut self, threshold: i32, angle: i32, on_pixel: F) -> Result<()>
    where
        F: FnMut(usize, Classification),
    {
        let (threshold, axis) = self.prepare_gradient(threshold, angle)?;
        gradient::scan(&self.working, threshold, axis, on_pixel);
        Ok(())
    }

    /// Sparse map of sudden brightness changes in direction `angle`.
    ///
    /// `threshold` must be in 0..=255 and `angle` in 0..=359; angles off the
    /// 45° grid are snapped with a diagnostic.
    pub fn build_gradient_map(&mut self, threshold: i32, angle: i32) -> Result<GradientMap> {
        let (threshold, axis) = self.prepare_gradient(threshold, angle)?;
        Ok(gradient::build_map(&self.working, threshold, axis))
    }

    /// Gradient maps at 0°, 45°, 90° and 180°, merged.
    pub fn build_brightness_scale_map(&mut self, threshold: i32) -> Result<GradientMap> {
        let threshold = Threshold::new(threshold)?;
        self.grayscale_for_luminance();
        Ok(BrightnessScaleMapper::default().sweep(&self.working, threshold))
    }

    /// Dispatch a tagged [`Operation`].
    pub fn apply(&mut self, op: &Operation) -> Result<Outcome> {
        match *op {
            Operation::Blur { radius } => {
                self.apply_blur(radius)?;
            }
            Operation::Desaturate { percentage, human } => {
                self.apply_desaturate(percentage, human);
            }
            Operation::GrayScale { human } => {
                self.apply_grayscale(human);
            }
            Operation::Channel { selector } => {
                self.apply_channel(selector);
            }
            Operation::BuildGradientMap { threshold, angle } => {
                return self.build_gradient_map(threshold, angle).map(Outcome::Map);
            }
            Operation::BrightnessScaleMap { threshold } => {
                return self.build_brightness_scale_map(threshold).map(Outcome::Map);
            }
            Operation::Commit => {
                self.commit();
            }
            Operation::Revert => {
                self.revert();
            }
        }
        Ok(Outcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManipError;

    fn sample() -> RasterBuffer {
        RasterBuffer::from_pixels(
            3,
            2,
            &[
                (200, 100, 50, 255),
                (10, 20, 30, 40),
                (0, 0, 0, 255),
                (255, 128, 0, 200),
                (90, 90, 90, 90),
                (1, 250, 3, 255),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_session_copies_input() {
        let session = ManipulationSession::new(sample());
        assert_eq!(session.source(), &sample());
        assert_eq!(session.working(), &sample());
    }

    #[test]
    fn test_filters_do_not_stack_without_commit() {
        let mut session = ManipulationSession::new(sample());
        session.apply_channel(ChannelSelector::R);
        session.apply_grayscale(false);

        let mut fresh = ManipulationSession::new(sample());
        fresh.apply_grayscale(false);
        assert_eq!(session.working(), fresh.working());
    }

    #[test]
    fn test_commit_makes_filters_stack() {
        let mut session = ManipulationSession::new(sample());
        session.apply_channel(ChannelSelector::R).commit();
        session.apply_grayscale(false);
        // 200,255,255 averages to 237
        assert_eq!(session.pixel(0).unwrap(), (237, 237, 237, 255));
    }

    #[test]
    fn test_revert_without_commit_restores_input() {
        let mut session = ManipulationSession::new(sample());
        session.apply_desaturate(70, true);
        assert_ne!(session.working(), &sample());
        session.revert();
        assert_eq!(session.working(), &sample());
    }

    #[test]
    fn test_invalid_blur_leaves_working_untouched() {
        let mut session = ManipulationSession::new(sample());
        session.apply_channel(ChannelSelector::G);
        let before = session.working().clone();

        let err = session.apply_blur(3).unwrap_err();
        assert!(matches!(err, ManipError::InvalidArgument(_)));
        assert_eq!(session.working(), &before);
        assert!(session.diagnostics().is_empty());
    }

    #[test]
    fn test_large_blur_records_diagnostic() {
        let mut session = ManipulationSession::new(sample());
        session.apply_blur(6).unwrap();
        assert_eq!(session.take_diagnostics(), vec![Diagnostic::LargeBlurRadius { radius: 6 }]);
        assert!(session.diagnostics().is_empty());
    }

    #[test]
    fn test_config_controls_blur_advisory() {
        let config = SessionConfig::default().with_large_blur_radius(10);
        let mut session = ManipulationSession::with_config(sample(), config);
        session.apply_blur(6).unwrap();
        assert!(session.diagnostics().is_empty());
    }

    #[test]
    fn test_gradient_rejects_bad_arguments_before_mutating() {
        let mut session = ManipulationSession::new(sample());
        session.apply_channel(ChannelSelector::B);
        let before = session.working().clone();

        assert!(session.build_gradient_map(256, 0).is_err());
        assert!(session.build_gradient_map(10, 360).is_err());
        assert!(session.build_gradient_map(-1, 0).is_err());
        assert!(session.build_brightness_scale_map(300).is_err());
        assert_eq!(session.working(), &before);
    }

    #[test]
    fn test_gradient_grayscales_working_buffer() {
        let mut session = ManipulationSession::new(sample());
        session.build_gradient_map(10, 0).unwrap();
        let mut expected = ManipulationSession::new(sample());
        expected.apply_grayscale(true);
        assert_eq!(session.working(), expected.working());
    }

    #[test]
    fn test_gradient_snaps_angle_with_diagnostic() {
        let mut session = ManipulationSession::new(sample());
        let snapped = session.build_gradient_map(0, 100).unwrap();
        let exact = session.build_gradient_map(0, 90).unwrap();
        assert_eq!(snapped, exact);
        assert_eq!(
            session.diagnostics(),
            &[Diagnostic::NonCanonicalAngle { requested: 100, snapped: 90 }]
        );
    }

    #[test]
    fn test_set_pixel_bounds() {
        let mut session = ManipulationSession::new(sample());
        session.set_pixel(5, (9, 9, 9, 9)).unwrap();
        assert_eq!(session.pixel(5).unwrap(), (9, 9, 9, 9));
        assert_eq!(
            session.pixel(6).unwrap_err(),
            ManipError::IndexOutOfRange { id: 6, len: 6 }
        );
    }

    #[test]
    fn test_apply_dispatch() {
        let mut session = ManipulationSession::new(sample());
        let outcome = session.apply(&"GrayScale(false)".parse().unwrap()).unwrap();
        assert_eq!(outcome, Outcome::Applied);

        let op = Operation::BuildGradientMap {
            threshold: 0,
            angle: 0,
        };
        let outcome = session.apply(&op).unwrap();
        assert!(matches!(outcome, Outcome::Map(_)));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut session = ManipulationSession::new(sample());
        let copy = session.clone();
        session.apply_channel(ChannelSelector::A).commit();
        assert_eq!(copy.source(), &sample());
        assert_ne!(session.source(), copy.source());
    }
}
