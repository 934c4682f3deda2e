//! [`ManeuverExecutor`] – back away from an obstacle and turn toward the
//! clearest heading.
//!
//! # Sequence
//!
//! 1. Stop, settle.
//! 2. Reverse for the reverse duration, stop, settle.
//! 3. Branch on the best heading from the last sweep:
//!    - below the left boundary: turn left for the turn duration;
//!    - above the right boundary: turn right for the turn duration;
//!    - otherwise the way ahead is already clear and no turn is made.
//! 4. After a turn: stop, settle.
//!
//! Turns are dead-reckoned on time alone.  How far the vehicle actually
//! rotates depends on battery and surface and is not observed.

use std::time::Duration;

use autocar_hal::DriveBase;
use autocar_types::{AutocarError, DriveCommand, ScanResult, VehicleConfig};
use tracing::{info, instrument};

/// Which way the executor turned after reversing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDecision {
    Left,
    Right,
    /// Best heading was within the straight-ahead band.
    Straight,
}

#[derive(Debug, Clone)]
pub struct ManeuverExecutor {
    speed: f32,
    reverse: Duration,
    turn: Duration,
    settle: Duration,
    turn_left_below_deg: u8,
    turn_right_above_deg: u8,
}

impl ManeuverExecutor {
    pub fn new(config: &VehicleConfig) -> Self {
        Self {
            speed: config.maneuver_speed,
            reverse: config.reverse_duration(),
            turn: config.turn_duration(),
            settle: config.maneuver_settle(),
            turn_left_below_deg: config.turn_left_below_deg,
            turn_right_above_deg: config.turn_right_above_deg,
        }
    }

    /// Classify a best heading without moving anything.
    pub fn decide(&self, best_angle_deg: u8) -> TurnDecision {
        if best_angle_deg < self.turn_left_below_deg {
            TurnDecision::Left
        } else if best_angle_deg > self.turn_right_above_deg {
            TurnDecision::Right
        } else {
            TurnDecision::Straight
        }
    }

    /// Run the full stop/reverse/turn sequence toward `target`.
    ///
    /// # Errors
    ///
    /// The first failing drive call aborts the maneuver; the caller owns
    /// teardown.
    #[instrument(skip(self, drive, target), fields(best_angle_deg = target.best_angle_deg))]
    pub async fn execute(
        &self,
        drive: &mut dyn DriveBase,
        target: &ScanResult,
    ) -> Result<TurnDecision, AutocarError> {
        self.halt(drive).await?;

        info!(speed = self.speed, "reversing");
        drive.apply(DriveCommand::Backward(self.speed))?;
        tokio::time::sleep(self.reverse).await;
        self.halt(drive).await?;

        let decision = self.decide(target.best_angle_deg);
        let turn = match decision {
            TurnDecision::Left => DriveCommand::Left(self.speed),
            TurnDecision::Right => DriveCommand::Right(self.speed),
            TurnDecision::Straight => {
                info!("forward direction is clear");
                return Ok(decision);
            }
        };

        info!(direction = turn.label(), "turning");
        drive.apply(turn)?;
        tokio::time::sleep(self.turn).await;
        self.halt(drive).await?;
        Ok(decision)
    }

    async fn halt(&self, drive: &mut dyn DriveBase) -> Result<(), AutocarError> {
        drive.stop()?;
        tokio::time::sleep(self.settle).await;
        Ok(())
    }
}
