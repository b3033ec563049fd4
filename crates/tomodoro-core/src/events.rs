use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{PomodoroSettings, PomodoroState, TimerMode, TimerStatus};

/// Every state change in the timer produces an Event.
/// Front ends subscribe to them through [`crate::TimerHandle::subscribe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    /// A phase finished, either by running out or by manual override.
    SessionCompleted {
        from: TimerMode,
        to: TimerMode,
        completed_pomodoros: u32,
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        settings: PomodoroSettings,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        status: TimerStatus,
        time_remaining: u32,
        phase_duration: u32,
        progress: f64,
        completed_pomodoros: u32,
        points: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Build a full state snapshot event.
    pub fn snapshot(state: &PomodoroState) -> Self {
        Event::StateSnapshot {
            mode: state.mode,
            status: state.status,
            time_remaining: state.time_remaining,
            phase_duration: state.phase_duration(),
            progress: state.progress(),
            completed_pomodoros: state.completed_pomodoros,
            points: state.points(),
            at: Utc::now(),
        }
    }
}
