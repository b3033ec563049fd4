//! Timer state and the reducer that drives it.
//!
//! The reducer is a pure function: it never reads the clock and never
//! produces side effects. Wall-clock ticking lives in [`crate::driver`].
//!
//! ## Transitions
//!
//! ```text
//! status:  Idle -> Running <-> Paused
//!          (any) --reset/complete--> Idle
//!
//! mode:    Work --complete--> ShortBreak | LongBreak --complete--> Work
//! ```

use serde::{Deserialize, Serialize};

use super::settings::{PomodoroSettings, SettingsPatch};

/// Points awarded for each completed work session.
pub const POINTS_PER_POMODORO: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn title(self) -> &'static str {
        match self {
            TimerMode::Work => "Focus Time",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// Everything the reducer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StartTimer,
    PauseTimer,
    ResetTimer,
    Tick,
    CompleteSession,
    UpdateSettings(SettingsPatch),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroState {
    pub mode: TimerMode,
    pub status: TimerStatus,
    /// Seconds left in the current phase.
    pub time_remaining: u32,
    pub completed_pomodoros: u32,
    pub settings: PomodoroSettings,
}

impl Default for PomodoroState {
    fn default() -> Self {
        Self::new(PomodoroSettings::default())
    }
}

impl PomodoroState {
    /// Idle work phase with a full countdown.
    pub fn new(settings: PomodoroSettings) -> Self {
        Self {
            mode: TimerMode::Work,
            status: TimerStatus::Idle,
            time_remaining: settings.work_duration,
            completed_pomodoros: 0,
            settings,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase_duration(&self) -> u32 {
        duration_for(&self.settings, self.mode)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let total = self.phase_duration();
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.time_remaining);
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn points(&self) -> u32 {
        self.completed_pomodoros.saturating_mul(POINTS_PER_POMODORO)
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// The phase just ran out while the clock was live.
    pub fn at_zero_crossing(&self) -> bool {
        self.is_running() && self.time_remaining == 0
    }

    /// Mode a completion from the current state would move to.
    pub fn next_mode(&self) -> TimerMode {
        match self.mode {
            TimerMode::Work => {
                let n = self.completed_pomodoros.saturating_add(1);
                // An interval of zero never gets past the store; treat it as "no long breaks".
                let interval = self.settings.long_break_interval;
                if interval != 0 && n % interval == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Work,
        }
    }
}

/// Configured length of `mode` in seconds.
pub fn duration_for(settings: &PomodoroSettings, mode: TimerMode) -> u32 {
    match mode {
        TimerMode::Work => settings.work_duration,
        TimerMode::ShortBreak => settings.short_break_duration,
        TimerMode::LongBreak => settings.long_break_duration,
    }
}

/// Apply `action` to `state`, returning the next state.
///
/// Total and deterministic. Settings are trusted as given; validation
/// happens in [`super::PomodoroStore`].
pub fn reduce(state: &PomodoroState, action: &Action) -> PomodoroState {
    match action {
        Action::StartTimer => PomodoroState {
            status: TimerStatus::Running,
            ..*state
        },
        Action::PauseTimer => PomodoroState {
            status: TimerStatus::Paused,
            ..*state
        },
        Action::ResetTimer => PomodoroState {
            status: TimerStatus::Idle,
            time_remaining: state.phase_duration(),
            ..*state
        },
        Action::Tick => {
            if state.status != TimerStatus::Running {
                return *state;
            }
            PomodoroState {
                time_remaining: state.time_remaining.saturating_sub(1),
                ..*state
            }
        }
        Action::CompleteSession => {
            let next_mode = state.next_mode();
            let completed_pomodoros = if state.mode == TimerMode::Work {
                state.completed_pomodoros.saturating_add(1)
            } else {
                state.completed_pomodoros
            };
            PomodoroState {
                mode: next_mode,
                status: TimerStatus::Idle,
                time_remaining: duration_for(&state.settings, next_mode),
                completed_pomodoros,
                settings: state.settings,
            }
        }
        Action::UpdateSettings(patch) => {
            let settings = state.settings.merged(patch);
            // Idle timers pick up the new length now; a live countdown keeps its own.
            let time_remaining = if state.status == TimerStatus::Idle {
                duration_for(&settings, state.mode)
            } else {
                state.time_remaining
            };
            PomodoroState {
                settings,
                time_remaining,
                ..*state
            }
        }
    }
}

/// Render seconds as `MM:SS`. Minutes are not wrapped at 60.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
