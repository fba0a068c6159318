//! Seam towards whatever turns transitions into speech, colour or sound.

use tracing::info;

use crate::posture::FrameReport;
use crate::tracker::{TransitionEvent, TransitionKind};

pub trait FeedbackSink {
    fn on_transition(&mut self, event: &TransitionEvent);

    /// The "any posture held" flag flipped.
    fn on_session(&mut self, _kind: TransitionKind) {}
}

impl FrameReport {
    /// Forward this frame's edges to `sink`, postures first.
    pub fn dispatch<S: FeedbackSink + ?Sized>(&self, sink: &mut S) {
        for event in &self.transitions {
            sink.on_transition(event);
        }
        if let Some(kind) = self.session {
            sink.on_session(kind);
        }
    }
}

/// Logs every edge at `info`.
#[derive(Debug, Default)]
pub struct LogSink;

impl FeedbackSink for LogSink {
    fn on_transition(&mut self, event: &TransitionEvent) {
        info!(posture = %event.posture, "posture {}", event.kind);
    }

    fn on_session(&mut self, kind: TransitionKind) {
        info!("session {}", kind);
    }
}

/// Collects posture edges, handy for tests and batch runs.
impl FeedbackSink for Vec<TransitionEvent> {
    fn on_transition(&mut self, event: &TransitionEvent) {
        self.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joints::{JointAngleSample, Side};

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
    }

    impl FeedbackSink for Recorder {
        fn on_transition(&mut self, event: &TransitionEvent) {
            self.log.push(format!("{} {}", event.posture, event.kind));
        }

        fn on_session(&mut self, kind: TransitionKind) {
            self.log.push(format!("session {kind}"));
        }
    }

    fn report(transitions: Vec<TransitionEvent>, session: Option<TransitionKind>) -> FrameReport {
        FrameReport {
            angles: JointAngleSample::empty(Side::Left),
            matches: Default::default(),
            transitions,
            session,
        }
    }

    #[test]
    fn test_dispatch_order() {
        let mut recorder = Recorder::default();
        report(
            vec![TransitionEvent::exited("Plank")],
            Some(TransitionKind::Exited),
        )
        .dispatch(&mut recorder);

        assert_eq!(recorder.log, vec!["Plank exited", "session exited"]);
    }

    #[test]
    fn test_quiet_report_dispatches_nothing() {
        let mut events: Vec<TransitionEvent> = Vec::new();
        report(Vec::new(), None).dispatch(&mut events);
        assert!(events.is_empty());
    }
}
