//! Drive an analyzer from a recorded keypoint stream.
//!
//! Input is JSON lines, one frame per line:
//!
//! ```text
//! {"timestamp_ms": 1200, "keypoints": [{"name": "left_knee", "x": 210.0, "y": 340.5, "confidence": 0.91}, ...]}
//! ```
//!
//! Stream time stands in for the wall clock: the hold counters are ticked
//! once per whole tick interval elapsed between frames.

use std::io::BufRead;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReplayError;
use crate::feedback::FeedbackSink;
use crate::keypoints::KeypointSet;
use crate::posture::PostureAnalyzer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    pub keypoints: KeypointSet,
}

/// Converts frame timestamps into whole ticks.
#[derive(Debug, Clone)]
pub struct TickClock {
    interval_ms: u64,
    last_ms: Option<u64>,
    carry_ms: u64,
}

impl TickClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1),
            last_ms: None,
            carry_ms: 0,
        }
    }

    /// Ticks due when a frame stamped `timestamp_ms` arrives.
    ///
    /// An unstamped frame counts as exactly one interval. Timestamps that go
    /// backwards count as no elapsed time.
    pub fn advance(&mut self, timestamp_ms: Option<u64>) -> u64 {
        let Some(now) = timestamp_ms else {
            return 1;
        };

        let elapsed = self.last_ms.map_or(0, |last| now.saturating_sub(last));
        self.last_ms = Some(self.last_ms.map_or(now, |last| last.max(now)));

        self.carry_ms = self.carry_ms.saturating_add(elapsed);
        let ticks = self.carry_ms / self.interval_ms;
        self.carry_ms %= self.interval_ms;
        ticks
    }

    /// Drop any partial interval, e.g. when a hold starts or ends.
    pub fn realign(&mut self) {
        self.carry_ms = 0;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub transitions: usize,
    /// Highest session counter reached, in ticks.
    pub longest_session_ticks: u64,
}

pub fn replay<R, S>(
    reader: R,
    analyzer: &mut PostureAnalyzer,
    sink: &mut S,
) -> Result<ReplaySummary, ReplayError>
where
    R: BufRead,
    S: FeedbackSink + ?Sized,
{
    let mut clock = TickClock::new(analyzer.tick_interval());
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record: FrameRecord = serde_json::from_str(&line)
            .map_err(|source| ReplayError::Frame { line: index + 1, source })?;

        for _ in 0..clock.advance(record.timestamp_ms) {
            let ticks = analyzer.tick();
            summary.longest_session_ticks = summary.longest_session_ticks.max(ticks);
        }

        let report = analyzer.process_frame(&record.keypoints);
        if report.session.is_some() {
            clock.realign();
        }

        report.dispatch(sink);
        summary.frames += 1;
        summary.transitions += report.transitions.len();
    }

    debug!(?summary, "replay finished");
    Ok(summary)
}
