//! [`DriveTranslator`] – joystick axes to a discrete drive command.
//!
//! Both axes are centred on the rest value.  Inside the deadzone the vehicle
//! stops.  Outside it the first matching direction wins, in this order:
//! forward, backward, right, left.  A diagonal deflection therefore always
//! resolves to Forward or Backward, never a blend.  Comparisons are strict,
//! so a deflection exactly equal to the deadzone is still Stop.

use autocar_types::{AXIS_CENTER, DriveCommand};

#[derive(Debug, Clone, Copy)]
pub struct DriveTranslator {
    deadzone: i64,
    speed: f32,
}

impl DriveTranslator {
    /// `speed` is carried by every motion command this translator emits.
    pub fn new(deadzone: i32, speed: f32) -> Self {
        Self {
            deadzone: i64::from(deadzone),
            speed,
        }
    }

    pub fn translate(&self, x: i32, y: i32) -> DriveCommand {
        let dx = i64::from(x) - i64::from(AXIS_CENTER);
        let dy = i64::from(y) - i64::from(AXIS_CENTER);
        let dz = self.deadzone;

        if dx.abs() <= dz && dy.abs() <= dz {
            DriveCommand::Stop
        } else if dy > dz {
            DriveCommand::Forward(self.speed)
        } else if dy < -dz {
            DriveCommand::Backward(self.speed)
        } else if dx > dz {
            DriveCommand::Right(self.speed)
        } else if dx < -dz {
            DriveCommand::Left(self.speed)
        } else {
            DriveCommand::Stop
        }
    }
}
