use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ConfigError;
use crate::joints::{extract_angles, JointAngleSample, SideSelection};
use crate::keypoints::KeypointSet;
use crate::template::{JointFeedback, MatchResults, TemplateSet};
use crate::tracker::{PostureTracker, TransitionEvent, TransitionKind};

/// Runs extract → classify → track for each incoming frame.
///
/// Not internally synchronized; callers feeding frames from several threads
/// must serialize `process_frame`, `tick` and `reset` themselves.
pub struct PostureAnalyzer {
    templates: TemplateSet,
    side: SideSelection,
    tracker: PostureTracker,
    tick_interval: Duration,
    subject_lost: bool,
}

/// Everything the analyzer derived from one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub angles: JointAngleSample,
    pub matches: MatchResults,
    pub transitions: Vec<TransitionEvent>,
    /// Edge of the "any posture held" flag, if it flipped on this frame.
    pub session: Option<TransitionKind>,
}

impl FrameReport {
    pub fn is_quiet(&self) -> bool {
        self.transitions.is_empty() && self.session.is_none()
    }
}

impl PostureAnalyzer {
    pub fn new(templates: TemplateSet, side: SideSelection, tick_interval: Duration) -> Self {
        let tracker = PostureTracker::with_postures(templates.iter().map(|t| t.name()));

        Self {
            templates,
            side,
            tracker,
            tick_interval,
            subject_lost: false,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let templates = config.templates()?;
        Ok(Self::new(templates, config.side, config.tick_interval()?))
    }

    pub fn process_frame(&mut self, keypoints: &KeypointSet) -> FrameReport {
        let side = self.side.resolve(keypoints);
        let angles = extract_angles(keypoints, side);
        let lost = angles.defined_count() == 0;
        if lost && !self.subject_lost {
            warn!(?side, landmarks = keypoints.len(), "subject lost: no joint angle could be computed");
        } else if !lost && self.subject_lost {
            debug!(?side, "subject visible again");
        }
        self.subject_lost = lost;

        self.apply(angles)
    }

    /// Classify and track an already extracted sample.
    pub fn apply(&mut self, angles: JointAngleSample) -> FrameReport {
        let matches = self.templates.classify(&angles);

        let was_held = self.tracker.any_held();
        let transitions = self.tracker.update(&matches);
        let now_held = self.tracker.any_held();

        let session = match (was_held, now_held) {
            (false, true) => Some(TransitionKind::Entered),
            (true, false) => Some(TransitionKind::Exited),
            _ => None,
        };
        if let Some(kind) = session {
            debug!(transition = %kind, "session edge");
        }

        FrameReport {
            angles,
            matches,
            transitions,
            session,
        }
    }

    /// True while the latest frame yielded no joint angle at all.
    pub fn is_subject_lost(&self) -> bool {
        self.subject_lost
    }

    pub fn tick(&mut self) -> u64 {
        self.tracker.tick()
    }

    pub fn reset(&mut self) {
        debug!("analyzer reset");
        self.tracker.reset();
    }

    /// Per-joint comparison against the named template.
    pub fn feedback(&self, posture: &str, angles: &JointAngleSample) -> Option<Vec<JointFeedback>> {
        self.templates.get(posture).map(|t| t.feedback(angles))
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    pub fn tracker(&self) -> &PostureTracker {
        &self.tracker
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn session_duration(&self) -> Duration {
        self.tracker.session_duration(self.tick_interval)
    }
}
