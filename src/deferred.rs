//! Operations queued until pixel data arrives.
//!
//! A host that decodes images asynchronously can submit manipulations
//! before the buffer exists. They wait in a FIFO queue and are replayed in
//! order once [`DeferredSession::attach`] supplies the buffer.

use std::collections::VecDeque;

use tracing::debug;

use crate::buffer::RasterBuffer;
use crate::config::SessionConfig;
use crate::error::{ManipError, ReplayError, Result};
use crate::operation::{Operation, Outcome};
use crate::session::ManipulationSession;

/// A session whose buffer may not be available yet.
#[derive(Debug, Clone, Default)]
pub struct DeferredSession {
    config: SessionConfig,
    session: Option<ManipulationSession>,
    pending: VecDeque<Operation>,
}

impl DeferredSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    /// Operations still waiting to run.
    pub fn pending(&self) -> impl Iterator<Item = &Operation> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Run `op` now if ready, otherwise queue it.
    ///
    /// Returns `Ok(None)` when the operation was queued.
    pub fn submit(&mut self, op: Operation) -> Result<Option<Outcome>> {
        match self.session.as_mut() {
            Some(session) => session.apply(&op).map(Some),
            None => {
                debug!(%op, queued = self.pending.len() + 1, "operation deferred");
                self.pending.push_back(op);
                Ok(None)
            }
        }
    }

    /// Attach the buffer and replay queued operations in submission order.
    ///
    /// # Errors
    /// `AlreadyReady` if a buffer was attached before. If a replayed
    /// operation fails, the [`ReplayError`] carries its error together with
    /// the outcomes of everything replayed before it. The failing operation
    /// is dropped and the ones after it stay queued for
    /// [`resume`](Self::resume).
    pub fn attach(
        &mut self,
        buffer: RasterBuffer,
    ) -> std::result::Result<Vec<Outcome>, ReplayError> {
        if self.session.is_some() {
            return Err(ManipError::AlreadyReady.into());
        }
        self.session = Some(ManipulationSession::with_config(buffer, self.config));
        self.resume()
    }

    /// Replay whatever is still queued.
    pub fn resume(&mut self) -> std::result::Result<Vec<Outcome>, ReplayError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| ManipError::NotReady("resume".into()))?;

        let mut outcomes = Vec::with_capacity(self.pending.len());
        while let Some(op) = self.pending.pop_front() {
            debug!(%op, "replaying deferred operation");
            match session.apply(&op) {
                Ok(outcome) => outcomes.push(outcome),
                Err(source) => {
                    debug!(%op, completed = outcomes.len(), "deferred replay stopped");
                    return Err(ReplayError {
                        completed: outcomes,
                        source,
                    });
                }
            }
        }
        Ok(outcomes)
    }

    pub fn session(&self) -> Result<&ManipulationSession> {
        self.session
            .as_ref()
            .ok_or_else(|| ManipError::NotReady("session".into()))
    }

    pub fn session_mut(&mut self) -> Result<&mut ManipulationSession> {
        self.session
            .as_mut()
            .ok_or_else(|| ManipError::NotReady("session".into()))
    }

    pub fn into_session(self) -> Result<ManipulationSession> {
        self.session
            .ok_or_else(|| ManipError::NotReady("into_session".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ChannelSelector;
    use crate::neighbor::CompassAngle;

    fn buffer() -> RasterBuffer {
        RasterBuffer::from_pixels(2, 1, &[(10, 20, 30, 40), (50, 60, 70, 80)]).unwrap()
    }

    #[test]
    fn test_not_ready_before_attach() {
        let deferred = DeferredSession::new();
        assert!(!deferred.is_ready());
        assert!(matches!(deferred.session(), Err(ManipError::NotReady(_))));
    }

    #[test]
    fn test_queue_replays_in_order() {
        let mut deferred = DeferredSession::new();
        let channel = Operation::Channel {
            selector: ChannelSelector::R,
        };
        assert_eq!(deferred.submit(channel).unwrap(), None);
        assert_eq!(deferred.submit(Operation::Commit).unwrap(), None);
        assert_eq!(deferred.submit(Operation::GrayScale { human: false }).unwrap(), None);
        assert_eq!(deferred.pending_len(), 3);

        let outcomes = deferred.attach(buffer()).unwrap();
        assert_eq!(outcomes, vec![Outcome::Applied; 3]);
        assert_eq!(deferred.pending_len(), 0);

        // channel R then commit then grayscale: (10, 40, 40) -> 30
        let session = deferred.session().unwrap();
        assert_eq!(session.pixel(0).unwrap(), (30, 30, 30, 255));
    }

    #[test]
    fn test_submit_after_ready_runs_immediately() {
        let mut deferred = DeferredSession::new();
        deferred.attach(buffer()).unwrap();
        let outcome = deferred.submit(Operation::GrayScale { human: true }).unwrap();
        assert_eq!(outcome, Some(Outcome::Applied));
    }

    #[test]
    fn test_attach_twice_fails() {
        let mut deferred = DeferredSession::new();
        deferred.attach(buffer()).unwrap();
        let err = deferred.attach(buffer()).unwrap_err();
        assert_eq!(err.source, ManipError::AlreadyReady);
        assert!(err.completed.is_empty());
    }

    #[test]
    fn test_failed_replay_keeps_remaining_queue() {
        let mut deferred = DeferredSession::new();
        deferred.submit(Operation::Blur { radius: 3 }).unwrap();
        deferred.submit(Operation::GrayScale { human: false }).unwrap();

        let err = deferred.attach(buffer()).unwrap_err();
        assert!(matches!(err.source, ManipError::InvalidArgument(_)));
        assert!(err.completed.is_empty());
        assert!(deferred.is_ready());
        assert_eq!(deferred.pending_len(), 1);

        let outcomes = deferred.resume().unwrap();
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn test_failed_replay_returns_completed_outcomes() {
        let mut deferred = DeferredSession::new();
        let gradient = Operation::BuildGradientMap {
            threshold: 0,
            angle: 0,
        };
        deferred.submit(gradient).unwrap();
        deferred.submit(Operation::Blur { radius: 3 }).unwrap();
        deferred.submit(Operation::Commit).unwrap();

        let strip = [(10, 20, 30, 255), (50, 60, 70, 255), (90, 100, 110, 255)];
        let err = deferred
            .attach(RasterBuffer::from_pixels(3, 1, &strip).unwrap())
            .unwrap_err();
        assert!(matches!(err.source, ManipError::InvalidArgument(_)));
        assert_eq!(err.completed.len(), 1);
        // human grayscale gives 20, 60, 100; the step into pixel 2 sits on the edge
        match &err.completed[0] {
            Outcome::Map(map) => assert_eq!(map.difference(1, CompassAngle::Right), Some(40)),
            other => panic!("expected a gradient map, got {other:?}"),
        }
        assert_eq!(deferred.pending().collect::<Vec<_>>(), vec![&Operation::Commit]);
    }

    #[test]
    fn test_resume_before_attach_is_not_ready() {
        let mut deferred = DeferredSession::new();
        deferred.submit(Operation::Commit).unwrap();
        let err = deferred.resume().unwrap_err();
        assert!(matches!(err.source, ManipError::NotReady(_)));
        assert_eq!(deferred.pending_len(), 1);
    }
}
