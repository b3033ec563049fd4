mod settings;
mod state;
mod store;

pub use settings::{PomodoroSettings, Range, SettingsBounds, SettingsPatch};
pub use state::{
    duration_for, format_clock, reduce, Action, PomodoroState, TimerMode, TimerStatus,
    POINTS_PER_POMODORO,
};
pub use store::PomodoroStore;
