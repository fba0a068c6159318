//! Debounced held/not-held state per posture.
//!
//! The tracker is edge-triggered: it emits a [`TransitionEvent`] only when a
//! posture's match result differs from its current state, never for a steady
//! state. Hold durations are counted in externally driven ticks.

use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::debug;

use crate::template::MatchResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldState {
    #[default]
    NotHeld,
    Held,
}

impl HoldState {
    fn from_matched(matched: bool) -> Self {
        if matched {
            HoldState::Held
        } else {
            HoldState::NotHeld
        }
    }

    pub fn is_held(&self) -> bool {
        matches!(self, HoldState::Held)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Entered,
    Exited,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Entered => "entered",
            TransitionKind::Exited => "exited",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A posture started or stopped being held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    pub posture: String,
    pub kind: TransitionKind,
}

impl TransitionEvent {
    pub fn entered(posture: impl Into<String>) -> Self {
        Self {
            posture: posture.into(),
            kind: TransitionKind::Entered,
        }
    }

    pub fn exited(posture: impl Into<String>) -> Self {
        Self {
            posture: posture.into(),
            kind: TransitionKind::Exited,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostureState {
    pub state: HoldState,
    /// Ticks since this posture was entered; 0 while not held.
    pub hold_ticks: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PostureTracker {
    postures: IndexMap<String, PostureState>,
    session_ticks: u64,
}

impl PostureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker with the given postures registered as `NotHeld`.
    pub fn with_postures<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            postures: names
                .into_iter()
                .map(|name| (name.into(), PostureState::default()))
                .collect(),
            session_ticks: 0,
        }
    }

    /// Apply one frame of match results.
    ///
    /// Postures missing from `matches` keep their state. Postures seen for
    /// the first time start out `NotHeld`.
    pub fn update(&mut self, matches: &MatchResults) -> Vec<TransitionEvent> {
        let mut events = Vec::new();

        for (name, &matched) in matches {
            let posture = self.postures.entry(name.clone()).or_default();
            let next = HoldState::from_matched(matched);
            if posture.state == next {
                continue;
            }

            posture.state = next;
            let event = if next.is_held() {
                TransitionEvent::entered(name.as_str())
            } else {
                posture.hold_ticks = 0;
                TransitionEvent::exited(name.as_str())
            };

            debug!(posture = %name, transition = %event.kind, "posture edge");
            events.push(event);
        }

        if !self.any_held() && self.session_ticks > 0 {
            debug!(ticks = self.session_ticks, "session counter cleared");
            self.session_ticks = 0;
        }

        events
    }

    /// Advance hold counters by one unit. Does nothing while no posture is held.
    ///
    /// Returns the session counter after the tick.
    pub fn tick(&mut self) -> u64 {
        if !self.any_held() {
            return self.session_ticks;
        }

        for posture in self.postures.values_mut().filter(|p| p.state.is_held()) {
            posture.hold_ticks += 1;
        }
        self.session_ticks += 1;
        self.session_ticks
    }

    /// Every posture back to `NotHeld`, all counters zeroed.
    pub fn reset(&mut self) {
        for posture in self.postures.values_mut() {
            *posture = PostureState::default();
        }
        self.session_ticks = 0;
    }

    /// True iff at least one posture is held.
    pub fn any_held(&self) -> bool {
        self.postures.values().any(|p| p.state.is_held())
    }

    pub fn is_held(&self, posture: &str) -> bool {
        self.state(posture).is_some_and(|p| p.state.is_held())
    }

    pub fn state(&self, posture: &str) -> Option<&PostureState> {
        self.postures.get(posture)
    }

    pub fn held_postures(&self) -> impl Iterator<Item = &str> + '_ {
        self.postures
            .iter()
            .filter(|(_, p)| p.state.is_held())
            .map(|(name, _)| name.as_str())
    }

    pub fn hold_ticks(&self, posture: &str) -> u64 {
        self.state(posture).map_or(0, |p| p.hold_ticks)
    }

    pub fn session_ticks(&self) -> u64 {
        self.session_ticks
    }

    pub fn hold_duration(&self, posture: &str, tick: Duration) -> Duration {
        ticks_to_duration(self.hold_ticks(posture), tick)
    }

    pub fn session_duration(&self, tick: Duration) -> Duration {
        ticks_to_duration(self.session_ticks, tick)
    }
}

fn ticks_to_duration(ticks: u64, tick: Duration) -> Duration {
    let ticks = u32::try_from(ticks).unwrap_or(u32::MAX);
    tick.saturating_mul(ticks)
}
