//! [`ModeArbiter`] – debounced manual/autonomous switch.
//!
//! The joystick switch is sampled once per control tick.  A pressed switch
//! toggles the mode only when strictly more than the debounce interval has
//! passed since the previous toggle; the very first press always toggles.
//! Holding the button therefore toggles at most once per interval.
//!
//! The arbiter only decides.  Stopping the drive and holding for the settle
//! delay on a toggle is the caller's job.

use std::time::{Duration, Instant};

use autocar_types::Mode;
use tracing::info;

/// Owns the current [`Mode`]; the only way to change it is [`ModeArbiter::update`].
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use autocar_kernel::mode_arbiter::ModeArbiter;
/// use autocar_types::Mode;
///
/// let mut arbiter = ModeArbiter::new(Duration::from_millis(500));
/// let t0 = Instant::now();
///
/// assert_eq!(arbiter.update(true, t0), Some(Mode::Autonomous));
/// // Still held 100 ms later: debounced.
/// assert_eq!(arbiter.update(true, t0 + Duration::from_millis(100)), None);
/// assert_eq!(arbiter.mode(), Mode::Autonomous);
/// ```
#[derive(Debug, Clone)]
pub struct ModeArbiter {
    mode: Mode,
    debounce: Duration,
    last_toggle: Option<Instant>,
}

impl ModeArbiter {
    /// Start in [`Mode::Manual`] with no toggle on record.
    pub fn new(debounce: Duration) -> Self {
        Self {
            mode: Mode::default(),
            debounce,
            last_toggle: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn last_toggle(&self) -> Option<Instant> {
        self.last_toggle
    }

    /// Feed one switch sample taken at `now`.
    ///
    /// Returns the new mode when this sample toggled it, `None` otherwise.
    pub fn update(&mut self, switch: bool, now: Instant) -> Option<Mode> {
        if !switch {
            return None;
        }
        let debounced = self
            .last_toggle
            .is_none_or(|last| now.saturating_duration_since(last) > self.debounce);
        if !debounced {
            return None;
        }
        self.mode = self.mode.toggled();
        self.last_toggle = Some(now);
        info!(mode = %self.mode, "mode toggled");
        Some(self.mode)
    }
}
