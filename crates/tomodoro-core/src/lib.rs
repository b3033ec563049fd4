//! # Tomodoro Core Library
//!
//! Core logic for the Tomodoro Pomodoro timer. Front ends (the bundled CLI,
//! or anything else) read state and send a handful of commands; everything
//! else lives here.
//!
//! ## Architecture
//!
//! - **Timer**: a pure reducer over [`PomodoroState`] plus a
//!   [`PomodoroStore`] that owns the state and validates settings
//! - **Driver**: an async actor that ticks the store once per second while
//!   running and completes the session at zero
//! - **Chime**: best-effort three-tone notification on completion
//! - **Config**: TOML-based user preferences
//!
//! ## Key Components
//!
//! - [`TimerDriver`] / [`TimerHandle`]: spawn the driver, then command it
//! - [`reduce`]: the state machine itself
//! - [`Config`]: application configuration management

pub mod chime;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod timer;

pub use chime::{Chime, Silent, TerminalBell, Tone, NOTIFICATION_TONES};
pub use config::Config;
pub use driver::{TickerGuard, TimerDriver, TimerHandle};
pub use error::{ChimeError, ConfigError, CoreError, DriverError, ValidationError};
pub use events::Event;
pub use timer::{
    format_clock, reduce, Action, PomodoroSettings, PomodoroState, PomodoroStore,
    SettingsBounds, SettingsPatch, TimerMode, TimerStatus,
};
