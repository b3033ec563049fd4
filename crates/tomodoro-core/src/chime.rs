//! Best-effort completion sound.
//!
//! The driver plays [`NOTIFICATION_TONES`] through a [`Chime`] when a phase
//! runs out. Failures are logged and dropped; a missing speaker must never
//! stop the timer from advancing.

use std::io::Write;
use std::time::Duration;

use crate::error::ChimeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration: Duration,
}

impl Tone {
    pub const fn new(frequency_hz: u32, duration_ms: u64) -> Self {
        Self {
            frequency_hz,
            duration: Duration::from_millis(duration_ms),
        }
    }
}

/// High-low-high, back to back.
pub const NOTIFICATION_TONES: [Tone; 3] = [
    Tone::new(800, 100),
    Tone::new(600, 100),
    Tone::new(800, 100),
];

/// An audio output the driver can ring.
///
/// `play` should return quickly; implementations that need to wait between
/// tones do so off the caller's thread.
pub trait Chime: Send + Sync {
    fn play(&self, tones: &[Tone]) -> Result<(), ChimeError>;
}

/// Rings the terminal bell once per tone on a background thread.
///
/// Terminals ignore frequency, so only the rhythm of the pattern survives.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&self, tones: &[Tone]) -> Result<(), ChimeError> {
        let tones = tones.to_vec();
        std::thread::Builder::new()
            .name("tomodoro-chime".into())
            .spawn(move || {
                let mut err = std::io::stderr();
                for tone in tones {
                    if let Err(e) = err.write_all(b"\x07").and_then(|_| err.flush()) {
                        tracing::warn!("terminal bell failed: {e}");
                        return;
                    }
                    std::thread::sleep(tone.duration);
                }
            })?;
        Ok(())
    }
}

/// Used when notifications are turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Chime for Silent {
    fn play(&self, _tones: &[Tone]) -> Result<(), ChimeError> {
        Ok(())
    }
}

/// Play `tones`, logging instead of returning any failure.
pub fn ring(chime: &dyn Chime, tones: &[Tone]) {
    if let Err(e) = chime.play(tones) {
        tracing::warn!("notification sound not available: {e}");
    }
}
