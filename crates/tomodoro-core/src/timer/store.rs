//! Owned timer state with a validated command interface.
//!
//! `PomodoroStore` is the single owner of a [`PomodoroState`]. Every command
//! replaces the state through [`reduce`] and reports what happened as an
//! [`Event`]. Commands that leave the state unchanged return `None`.

use chrono::Utc;

use super::settings::SettingsPatch;
use super::state::{reduce, Action, PomodoroState};
use super::PomodoroSettings;
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone)]
pub struct PomodoroStore {
    state: PomodoroState,
}

impl Default for PomodoroStore {
    fn default() -> Self {
        Self::new(PomodoroSettings::default())
    }
}

impl PomodoroStore {
    /// Create a store in the idle work phase.
    ///
    /// `settings` are trusted as given; use [`PomodoroStore::with_settings`]
    /// to validate them first.
    pub fn new(settings: PomodoroSettings) -> Self {
        Self {
            state: PomodoroState::new(settings),
        }
    }

    /// Like [`PomodoroStore::new`], but rejects zero durations or interval.
    pub fn with_settings(settings: PomodoroSettings) -> Result<Self, ValidationError> {
        settings.validate()?;
        Ok(Self::new(settings))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &PomodoroState {
        &self.state
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if !self.apply(Action::StartTimer) {
            return None;
        }
        Some(Event::TimerStarted {
            mode: self.state.mode,
            time_remaining: self.state.time_remaining,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.apply(Action::PauseTimer) {
            return None;
        }
        Some(Event::TimerPaused {
            mode: self.state.mode,
            time_remaining: self.state.time_remaining,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        if !self.apply(Action::ResetTimer) {
            return None;
        }
        Some(Event::TimerReset {
            mode: self.state.mode,
            time_remaining: self.state.time_remaining,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second if running.
    ///
    /// Ticks are too frequent to report; observers read the new state instead.
    /// Returns whether the state changed.
    pub fn tick(&mut self) -> bool {
        self.apply(Action::Tick)
    }

    /// Move to the next phase. Always produces an event.
    pub fn complete_session(&mut self) -> Option<Event> {
        let from = self.state.mode;
        self.apply(Action::CompleteSession);
        tracing::info!(
            from = ?from,
            to = ?self.state.mode,
            completed = self.state.completed_pomodoros,
            "session completed"
        );
        Some(Event::SessionCompleted {
            from,
            to: self.state.mode,
            completed_pomodoros: self.state.completed_pomodoros,
            at: Utc::now(),
        })
    }

    /// Merge `patch` into the current settings.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] if the merged settings would
    /// contain a zero duration or a zero long-break interval. The state is
    /// left untouched in that case.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<Option<Event>, ValidationError> {
        self.state.settings.merged(&patch).validate()?;
        if !self.apply(Action::UpdateSettings(patch)) {
            return Ok(None);
        }
        Ok(Some(Event::SettingsUpdated {
            settings: self.state.settings,
            at: Utc::now(),
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply(&mut self, action: Action) -> bool {
        let next = reduce(&self.state, &action);
        let changed = next != self.state;
        if changed && action != Action::Tick {
            tracing::debug!(?action, status = ?next.status, mode = ?next.mode, "timer transition");
        }
        self.state = next;
        changed
    }
}
