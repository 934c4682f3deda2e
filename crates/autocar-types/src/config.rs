//! Process-wide thresholds and timings.
//!
//! [`VehicleConfig`] is the controller's only configuration surface.  It is
//! loaded once at startup and never mutated while the control loop runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::AutocarError;

/// Largest accepted `history_capacity`.
pub const MAX_HISTORY_CAPACITY: usize = 100_000;

/// What the control loop does when the remote end closes the joystick session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionEndPolicy {
    /// Tear down and return from the loop.
    #[default]
    Exit,
    /// Drop the link and keep running on the last known joystick state,
    /// with the momentary switch released.
    Continue,
}

impl std::fmt::Display for SessionEndPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEndPolicy::Exit => write!(f, "exit"),
            SessionEndPolicy::Continue => write!(f, "continue"),
        }
    }
}

impl std::str::FromStr for SessionEndPolicy {
    type Err = AutocarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exit" => Ok(SessionEndPolicy::Exit),
            "continue" => Ok(SessionEndPolicy::Continue),
            other => Err(AutocarError::Config(format!(
                "unknown session_end policy '{other}' (expected 'exit' or 'continue')"
            ))),
        }
    }
}

/// Thresholds, speeds and timings for one run of the controller.
///
/// Every field has a default, so a partial `[vehicle]` table is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Joystick deadzone radius in raw 10-bit units.
    pub deadzone: i32,
    /// Ranging distance below which the path ahead counts as blocked (cm).
    pub front_threshold_cm: f32,
    /// How long to back away from an obstacle.
    pub reverse_ms: u64,
    /// How long to spin toward the chosen heading.
    pub turn_ms: u64,
    /// Minimum time between two accepted mode toggles.
    pub debounce_ms: u64,
    /// Hold time after a mode toggle before normal operation resumes.
    pub mode_settle_ms: u64,
    /// Angular step of the directional sweep (degrees).
    pub sweep_step_deg: u8,
    /// Wait between commanding a heading and sampling the range.
    pub sweep_settle_ms: u64,
    /// Pause after every stop inside an avoidance maneuver.
    pub maneuver_settle_ms: u64,
    /// Fixed delay at the end of every control tick.
    pub tick_ms: u64,
    /// Upper bound on how long one tick waits for joystick data.
    pub read_timeout_ms: u64,
    /// Speed used for translated joystick commands.
    pub manual_speed: f32,
    /// Forward speed while cruising autonomously.
    pub cruise_speed: f32,
    /// Speed used for the reverse and turn legs of a maneuver.
    pub maneuver_speed: f32,
    /// Best headings strictly below this angle turn the vehicle left.
    pub turn_left_below_deg: u8,
    /// Best headings strictly above this angle turn the vehicle right.
    pub turn_right_above_deg: u8,
    /// Number of ranging readings kept for summary statistics.
    pub history_capacity: usize,
    pub session_end: SessionEndPolicy,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            deadzone: 100,
            front_threshold_cm: 25.0,
            reverse_ms: 400,
            turn_ms: 550,
            debounce_ms: 500,
            mode_settle_ms: 500,
            sweep_step_deg: 5,
            sweep_settle_ms: 50,
            maneuver_settle_ms: 100,
            tick_ms: 20,
            read_timeout_ms: 100,
            manual_speed: 0.5,
            cruise_speed: 0.5,
            maneuver_speed: 1.0,
            turn_left_below_deg: 80,
            turn_right_above_deg: 100,
            history_capacity: 100,
            session_end: SessionEndPolicy::Exit,
        }
    }
}

impl VehicleConfig {
    pub fn reverse_duration(&self) -> Duration {
        Duration::from_millis(self.reverse_ms)
    }

    pub fn turn_duration(&self) -> Duration {
        Duration::from_millis(self.turn_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn mode_settle(&self) -> Duration {
        Duration::from_millis(self.mode_settle_ms)
    }

    pub fn sweep_settle(&self) -> Duration {
        Duration::from_millis(self.sweep_settle_ms)
    }

    pub fn maneuver_settle(&self) -> Duration {
        Duration::from_millis(self.maneuver_settle_ms)
    }

    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Check that every value is inside the range the controller can act on.
    ///
    /// # Errors
    ///
    /// Returns [`AutocarError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), AutocarError> {
        if self.deadzone < 0 {
            return Err(AutocarError::Config("deadzone must not be negative".into()));
        }
        if !(self.front_threshold_cm.is_finite() && self.front_threshold_cm >= 0.0) {
            return Err(AutocarError::Config(
                "front_threshold_cm must be a finite, non-negative distance".into(),
            ));
        }
        if !(1..=90).contains(&self.sweep_step_deg) {
            return Err(AutocarError::Config(
                "sweep_step_deg must be between 1 and 90".into(),
            ));
        }
        for (name, speed) in [
            ("manual_speed", self.manual_speed),
            ("cruise_speed", self.cruise_speed),
            ("maneuver_speed", self.maneuver_speed),
        ] {
            if !(0.0..=1.0).contains(&speed) {
                return Err(AutocarError::Config(format!("{name} must be within [0, 1]")));
            }
        }
        if self.turn_left_below_deg > self.turn_right_above_deg || self.turn_right_above_deg > 180
        {
            return Err(AutocarError::Config(
                "turn boundaries must satisfy left <= right <= 180".into(),
            ));
        }
        if self.read_timeout_ms == 0 {
            return Err(AutocarError::Config("read_timeout_ms must be positive".into()));
        }
        if !(1..=MAX_HISTORY_CAPACITY).contains(&self.history_capacity) {
            return Err(AutocarError::Config(format!(
                "history_capacity must be between 1 and {MAX_HISTORY_CAPACITY}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_vehicle_constants() {
        let cfg = VehicleConfig::default();
        assert_eq!(cfg.deadzone, 100);
        assert_eq!(cfg.front_threshold_cm, 25.0);
        assert_eq!(cfg.reverse_duration(), Duration::from_millis(400));
        assert_eq!(cfg.turn_duration(), Duration::from_millis(550));
        assert_eq!(cfg.debounce(), Duration::from_millis(500));
        assert_eq!(cfg.sweep_step_deg, 5);
        assert_eq!(cfg.sweep_settle(), Duration::from_millis(50));
        assert_eq!(cfg.tick_delay(), Duration::from_millis(20));
        assert_eq!(cfg.session_end, SessionEndPolicy::Exit);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_table_fills_defaults() {
        let cfg: VehicleConfig =
            serde_json::from_str(r#"{"deadzone": 80, "session_end": "continue"}"#).unwrap();
        assert_eq!(cfg.deadzone, 80);
        assert_eq!(cfg.session_end, SessionEndPolicy::Continue);
        assert_eq!(cfg.turn_ms, 550);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let edits: [fn(&mut VehicleConfig); 9] = [
            |c| c.sweep_step_deg = 0,
            |c| c.sweep_step_deg = 91,
            |c| c.cruise_speed = 1.5,
            |c| c.front_threshold_cm = f32::NAN,
            |c| c.turn_left_below_deg = 120,
            |c| c.read_timeout_ms = 0,
            |c| c.deadzone = -1,
            |c| c.history_capacity = 0,
            |c| c.history_capacity = usize::MAX,
        ];
        for edit in edits {
            let mut cfg = VehicleConfig::default();
            edit(&mut cfg);
            assert!(
                matches!(cfg.validate(), Err(AutocarError::Config(_))),
                "expected rejection for {cfg:?}"
            );
        }
    }

    #[test]
    fn history_capacity_upper_bound_is_inclusive() {
        let mut cfg = VehicleConfig::default();
        cfg.history_capacity = MAX_HISTORY_CAPACITY;
        assert!(cfg.validate().is_ok());
        cfg.history_capacity += 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn session_end_policy_parses_case_insensitively() {
        assert_eq!("EXIT".parse::<SessionEndPolicy>().unwrap(), SessionEndPolicy::Exit);
        assert_eq!(
            " continue ".parse::<SessionEndPolicy>().unwrap(),
            SessionEndPolicy::Continue
        );
        assert!("restart".parse::<SessionEndPolicy>().is_err());
    }
}
