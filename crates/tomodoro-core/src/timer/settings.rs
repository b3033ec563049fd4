use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Phase durations and long-break cadence.
///
/// Durations are in seconds. All four fields must be non-zero; the store
/// checks this with [`PomodoroSettings::validate`] before applying an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSettings {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    /// Number of completed work sessions between long breaks.
    pub long_break_interval: u32,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_duration: 25 * 60,
            short_break_duration: 5 * 60,
            long_break_duration: 15 * 60,
            long_break_interval: 4,
        }
    }
}

impl PomodoroSettings {
    /// Apply a partial update. Fields absent from the patch keep their value.
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        Self {
            work_duration: patch.work_duration.unwrap_or(self.work_duration),
            short_break_duration: patch
                .short_break_duration
                .unwrap_or(self.short_break_duration),
            long_break_duration: patch
                .long_break_duration
                .unwrap_or(self.long_break_duration),
            long_break_interval: patch
                .long_break_interval
                .unwrap_or(self.long_break_interval),
        }
    }

    /// Reject zero durations and a zero long-break interval.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("work_duration", self.work_duration),
            ("short_break_duration", self.short_break_duration),
            ("long_break_duration", self.long_break_duration),
            ("long_break_interval", self.long_break_interval),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// A partial settings update. `None` means "leave unchanged".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_interval: Option<u32>,
}

impl SettingsPatch {
    /// Build a patch from minute-denominated inputs.
    pub fn from_minutes(
        work_min: Option<u32>,
        short_break_min: Option<u32>,
        long_break_min: Option<u32>,
        long_break_interval: Option<u32>,
    ) -> Self {
        let secs = |m: u32| m.saturating_mul(60);
        Self {
            work_duration: work_min.map(secs),
            short_break_duration: short_break_min.map(secs),
            long_break_duration: long_break_min.map(secs),
            long_break_interval,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.work_duration.is_none()
            && self.short_break_duration.is_none()
            && self.long_break_duration.is_none()
            && self.long_break_interval.is_none()
    }

    /// Clamp every present field into `bounds`.
    pub fn clamped(&self, bounds: &SettingsBounds) -> Self {
        Self {
            work_duration: self.work_duration.map(|v| bounds.work.clamp(v)),
            short_break_duration: self.short_break_duration.map(|v| bounds.short_break.clamp(v)),
            long_break_duration: self.long_break_duration.map(|v| bounds.long_break.clamp(v)),
            long_break_interval: self
                .long_break_interval
                .map(|v| bounds.long_break_interval.clamp(v)),
        }
    }
}

impl From<PomodoroSettings> for SettingsPatch {
    fn from(s: PomodoroSettings) -> Self {
        Self {
            work_duration: Some(s.work_duration),
            short_break_duration: Some(s.short_break_duration),
            long_break_duration: Some(s.long_break_duration),
            long_break_interval: Some(s.long_break_interval),
        }
    }
}

/// Inclusive range for a single setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

impl Range {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }
}

/// Limits a front end should enforce before handing settings to the store.
///
/// Defaults match the settings form: 1-60 minutes of work, 1-30 minutes of
/// short break, 1-60 minutes of long break, 2-10 sessions per long break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsBounds {
    pub work: Range,
    pub short_break: Range,
    pub long_break: Range,
    pub long_break_interval: Range,
}

impl Default for SettingsBounds {
    fn default() -> Self {
        Self {
            work: Range::new(60, 60 * 60),
            short_break: Range::new(60, 30 * 60),
            long_break: Range::new(60, 60 * 60),
            long_break_interval: Range::new(2, 10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let s = PomodoroSettings::default();
        assert_eq!(s.work_duration, 1500);
        assert_eq!(s.short_break_duration, 300);
        assert_eq!(s.long_break_duration, 900);
        assert_eq!(s.long_break_interval, 4);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn merge_only_overwrites_present_fields() {
        let s = PomodoroSettings::default();
        let patch = SettingsPatch {
            short_break_duration: Some(120),
            ..Default::default()
        };
        let merged = s.merged(&patch);
        assert_eq!(merged.short_break_duration, 120);
        assert_eq!(merged.work_duration, s.work_duration);
        assert_eq!(merged.long_break_duration, s.long_break_duration);
        assert_eq!(merged.long_break_interval, s.long_break_interval);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let s = PomodoroSettings {
            long_break_interval: 0,
            ..Default::default()
        };
        match s.validate() {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "long_break_interval")
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn zero_duration_is_rejected() {
        let s = PomodoroSettings {
            short_break_duration: 0,
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn from_minutes_converts_to_seconds() {
        let patch = SettingsPatch::from_minutes(Some(50), None, Some(20), Some(3));
        assert_eq!(patch.work_duration, Some(3000));
        assert_eq!(patch.short_break_duration, None);
        assert_eq!(patch.long_break_duration, Some(1200));
        assert_eq!(patch.long_break_interval, Some(3));
    }

    #[test]
    fn clamped_patch_respects_form_limits() {
        let bounds = SettingsBounds::default();
        let patch = SettingsPatch::from_minutes(Some(90), Some(0), None, Some(1)).clamped(&bounds);
        assert_eq!(patch.work_duration, Some(3600));
        assert_eq!(patch.short_break_duration, Some(60));
        assert_eq!(patch.long_break_duration, None);
        assert_eq!(patch.long_break_interval, Some(2));
    }

    #[test]
    fn empty_patch() {
        assert!(SettingsPatch::default().is_empty());
        assert!(!SettingsPatch::from(PomodoroSettings::default()).is_empty());
    }
}
