//! `autocar-types` – shared data model for the Autocar controller.
//!
//! Every other crate in the workspace speaks in these types: the joystick
//! state produced by the link, the discrete drive commands consumed by the
//! drive base, the scan samples produced by a sweep, and the single
//! [`AutocarError`] that spans hardware faults, link failures and bad
//! configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;

pub use config::{SessionEndPolicy, VehicleConfig};

/// Rest (centre) value of a 10-bit analog joystick axis.
pub const AXIS_CENTER: i32 = 512;

// ────────────────────────────────────────────────────────────────────────────
// Joystick
// ────────────────────────────────────────────────────────────────────────────

/// Latest known position of the remote joystick.
///
/// Fields are private: the only mutation path is [`JoystickState::apply`],
/// which overwrites exactly the fields present in a parsed record.  Absent
/// fields keep their previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoystickState {
    x: i32,
    y: i32,
    switch: bool,
}

impl Default for JoystickState {
    /// Both axes at rest, switch released.
    fn default() -> Self {
        Self {
            x: AXIS_CENTER,
            y: AXIS_CENTER,
            switch: false,
        }
    }
}

impl JoystickState {
    /// Raw X axis sample (nominally 0–1023).
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Raw Y axis sample (nominally 0–1023).
    pub fn y(&self) -> i32 {
        self.y
    }

    /// `true` while the joystick's push switch is pressed.
    pub fn switch(&self) -> bool {
        self.switch
    }

    /// Overwrite the fields carried by `update`; leave the others untouched.
    pub fn apply(&mut self, update: &JoystickUpdate) {
        if let Some(x) = update.x {
            self.x = x;
        }
        if let Some(y) = update.y {
            self.y = y;
        }
        if let Some(switch) = update.switch {
            self.switch = switch;
        }
    }
}

/// A fully validated joystick record.  `None` means the field was not part
/// of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoystickUpdate {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub switch: Option<bool>,
}

// ────────────────────────────────────────────────────────────────────────────
// Mode
// ────────────────────────────────────────────────────────────────────────────

/// Who is driving the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Axes from the remote joystick are translated into drive commands.
    #[default]
    Manual,
    /// The vehicle cruises forward and avoids obstacles on its own.
    Autonomous,
}

impl Mode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Mode::Manual => Mode::Autonomous,
            Mode::Autonomous => Mode::Manual,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Manual => write!(f, "manual"),
            Mode::Autonomous => write!(f, "autonomous"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Drive commands
// ────────────────────────────────────────────────────────────────────────────

/// Discrete command for the drive base.  Motion variants carry a speed in
/// `[0, 1]`; `Stop` has an implicit speed of zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "speed")]
pub enum DriveCommand {
    Forward(f32),
    Backward(f32),
    Left(f32),
    Right(f32),
    Stop,
}

impl DriveCommand {
    /// Commanded speed; `0.0` for [`DriveCommand::Stop`].
    pub fn speed(&self) -> f32 {
        match *self {
            DriveCommand::Forward(s)
            | DriveCommand::Backward(s)
            | DriveCommand::Left(s)
            | DriveCommand::Right(s) => s,
            DriveCommand::Stop => 0.0,
        }
    }

    /// Same command with its speed clamped to `[0, 1]`.  A NaN speed becomes
    /// zero.
    pub fn clamped(self) -> Self {
        let clamp = |s: f32| if s.is_nan() { 0.0 } else { s.clamp(0.0, 1.0) };
        match self {
            DriveCommand::Forward(s) => DriveCommand::Forward(clamp(s)),
            DriveCommand::Backward(s) => DriveCommand::Backward(clamp(s)),
            DriveCommand::Left(s) => DriveCommand::Left(clamp(s)),
            DriveCommand::Right(s) => DriveCommand::Right(clamp(s)),
            DriveCommand::Stop => DriveCommand::Stop,
        }
    }

    /// Short lowercase name, used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            DriveCommand::Forward(_) => "forward",
            DriveCommand::Backward(_) => "backward",
            DriveCommand::Left(_) => "left",
            DriveCommand::Right(_) => "right",
            DriveCommand::Stop => "stop",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scanning
// ────────────────────────────────────────────────────────────────────────────

/// One ranging sample taken at a heading during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanSample {
    /// Heading actuator angle in degrees, `0..=180` (90 = straight ahead).
    pub angle_deg: u8,
    /// Measured distance in centimetres.
    pub distance_cm: f32,
}

/// The clearest heading found by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub best_angle_deg: u8,
    pub best_distance_cm: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Sensors
// ────────────────────────────────────────────────────────────────────────────

/// Reading of an active-low binary proximity sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proximity {
    /// Line level `0`: an object is within range.
    Detected,
    /// Line level `1`: nothing within range.
    Clear,
}

impl Proximity {
    /// Decode a raw line level (`0` = object present).
    pub fn from_level(level: u8) -> Self {
        if level == 0 {
            Proximity::Detected
        } else {
            Proximity::Clear
        }
    }

    /// Raw line level, the inverse of [`Proximity::from_level`].
    pub fn level(&self) -> u8 {
        match self {
            Proximity::Detected => 0,
            Proximity::Clear => 1,
        }
    }
}

/// All obstacle-relevant readings taken in one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub left: Proximity,
    pub right: Proximity,
    pub distance_cm: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Global error type spanning hardware faults, joystick-link failures and
/// configuration mistakes.
#[derive(Error, Debug)]
pub enum AutocarError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Joystick Link Error: {0}")]
    Link(String),

    #[error("Configuration Error: {0}")]
    Config(String),
}

impl AutocarError {
    /// Shorthand for [`AutocarError::HardwareFault`].
    pub fn hardware(component: impl Into<String>, details: impl Into<String>) -> Self {
        AutocarError::HardwareFault {
            component: component.into(),
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joystick_starts_at_rest() {
        let state = JoystickState::default();
        assert_eq!(state.x(), 512);
        assert_eq!(state.y(), 512);
        assert!(!state.switch());
    }

    #[test]
    fn partial_update_keeps_absent_fields() {
        let mut state = JoystickState::default();
        state.apply(&JoystickUpdate {
            x: Some(700),
            y: Some(300),
            switch: Some(true),
        });
        state.apply(&JoystickUpdate {
            y: Some(480),
            ..Default::default()
        });
        assert_eq!(state.x(), 700);
        assert_eq!(state.y(), 480);
        assert!(state.switch());
    }

    #[test]
    fn mode_toggles_back_and_forth() {
        assert_eq!(Mode::default(), Mode::Manual);
        assert_eq!(Mode::Manual.toggled(), Mode::Autonomous);
        assert_eq!(Mode::Autonomous.toggled(), Mode::Manual);
        assert_eq!(Mode::Autonomous.to_string(), "autonomous");
    }

    #[test]
    fn drive_command_clamps_speed() {
        assert_eq!(DriveCommand::Forward(1.7).clamped(), DriveCommand::Forward(1.0));
        assert_eq!(DriveCommand::Left(-0.2).clamped(), DriveCommand::Left(0.0));
        assert_eq!(DriveCommand::Right(f32::NAN).clamped(), DriveCommand::Right(0.0));
        assert_eq!(DriveCommand::Stop.clamped(), DriveCommand::Stop);
        assert!((DriveCommand::Backward(0.5).speed() - 0.5).abs() < f32::EPSILON);
        assert_eq!(DriveCommand::Stop.speed(), 0.0);
    }

    #[test]
    fn drive_command_serializes_tagged() {
        let json = serde_json::to_string(&DriveCommand::Forward(0.5)).unwrap();
        assert_eq!(json, r#"{"action":"Forward","speed":0.5}"#);
    }

    #[test]
    fn proximity_is_active_low() {
        assert_eq!(Proximity::from_level(0), Proximity::Detected);
        assert_eq!(Proximity::from_level(1), Proximity::Clear);
        assert_eq!(Proximity::Detected.level(), 0);
    }

    #[test]
    fn autocar_error_display() {
        let err = AutocarError::hardware("ultrasonic", "echo timeout");
        assert!(err.to_string().contains("ultrasonic"));
        assert!(err.to_string().contains("echo timeout"));

        let err = AutocarError::Config("sweep_step_deg must be 1..=90".into());
        assert!(err.to_string().starts_with("Configuration Error"));
    }
}
