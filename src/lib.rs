//! Posture hold detection from per-frame body keypoints.
//!
//! Each frame flows through
//!
//! ```text
//! KeypointSet -> extract_angles -> classify -> PostureTracker::update -> FeedbackSink
//! ```
//!
//! and an external timer calls `tick()` to accumulate hold durations. The
//! engine is synchronous and owns no threads or I/O; frame cadence is up to
//! the caller.

pub mod angles;
pub mod config;
pub mod error;
pub mod feedback;
pub mod joints;
pub mod keypoints;
pub mod posture;
pub mod replay;
pub mod template;
pub mod tracker;

pub use angles::angle_at;
pub use config::Config;
pub use error::{ConfigError, ReplayError, TemplateError};
pub use feedback::{FeedbackSink, LogSink};
pub use joints::{extract_angles, Joint, JointAngle, JointAngleSample, Side, SideSelection};
pub use keypoints::{KeypointSet, Landmark, LandmarkName};
pub use posture::{FrameReport, PostureAnalyzer};
pub use template::{classify, JointFeedback, MatchResults, PostureTemplate, TemplateConfig, TemplateSet};
pub use tracker::{HoldState, PostureTracker, TransitionEvent, TransitionKind};
