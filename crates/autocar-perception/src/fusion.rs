//! Obstacle signal from proximity and ranging readings.
//!
//! The path ahead is blocked when either proximity sensor reports an object,
//! or when the rangefinder reads strictly less than the front threshold.
//! The combination is stateless: there is no hysteresis, so one noisy
//! reading flips the signal for that tick.
//!
//! # Example
//!
//! ```rust
//! use autocar_perception::fusion::ObstacleDetector;
//! use autocar_types::{Proximity, SensorSnapshot};
//!
//! let detector = ObstacleDetector::new(25.0);
//! let clear = SensorSnapshot {
//!     left: Proximity::Clear,
//!     right: Proximity::Clear,
//!     distance_cm: 80.0,
//! };
//! assert!(!detector.obstacle_ahead(&clear));
//! ```

use autocar_types::{Proximity, SensorSnapshot};

/// Which reading raised the obstacle signal.  When several did, the first in
/// declaration order is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleCause {
    LeftProximity,
    RightProximity,
    /// The rangefinder read below the front threshold.
    Range,
}

/// Stateless sensor fusion for the front obstacle signal.
#[derive(Debug, Clone, Copy)]
pub struct ObstacleDetector {
    front_threshold_cm: f32,
}

impl ObstacleDetector {
    pub fn new(front_threshold_cm: f32) -> Self {
        Self { front_threshold_cm }
    }

    pub fn front_threshold_cm(&self) -> f32 {
        self.front_threshold_cm
    }

    /// Return why the path is blocked, or `None` when it is clear.
    pub fn assess(&self, snapshot: &SensorSnapshot) -> Option<ObstacleCause> {
        if snapshot.left == Proximity::Detected {
            Some(ObstacleCause::LeftProximity)
        } else if snapshot.right == Proximity::Detected {
            Some(ObstacleCause::RightProximity)
        } else if snapshot.distance_cm < self.front_threshold_cm {
            Some(ObstacleCause::Range)
        } else {
            None
        }
    }

    pub fn obstacle_ahead(&self, snapshot: &SensorSnapshot) -> bool {
        self.assess(snapshot).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(left: Proximity, right: Proximity, distance_cm: f32) -> SensorSnapshot {
        SensorSnapshot {
            left,
            right,
            distance_cm,
        }
    }

    #[test]
    fn either_proximity_sensor_blocks_regardless_of_range() {
        let detector = ObstacleDetector::new(25.0);
        for distance in [0.0, 24.9, 25.0, 400.0] {
            let left = snap(Proximity::Detected, Proximity::Clear, distance);
            let right = snap(Proximity::Clear, Proximity::Detected, distance);
            assert!(detector.obstacle_ahead(&left));
            assert!(detector.obstacle_ahead(&right));
        }
    }

    #[test]
    fn short_range_blocks_regardless_of_proximity() {
        let detector = ObstacleDetector::new(25.0);
        assert_eq!(
            detector.assess(&snap(Proximity::Clear, Proximity::Clear, 24.99)),
            Some(ObstacleCause::Range)
        );
        assert!(detector.obstacle_ahead(&snap(Proximity::Detected, Proximity::Detected, 3.0)));
    }

    #[test]
    fn threshold_itself_is_clear() {
        let detector = ObstacleDetector::new(25.0);
        assert_eq!(detector.front_threshold_cm(), 25.0);
        assert!(!detector.obstacle_ahead(&snap(Proximity::Clear, Proximity::Clear, 25.0)));
    }

    #[test]
    fn cause_prefers_left_then_right() {
        let detector = ObstacleDetector::new(25.0);
        assert_eq!(
            detector.assess(&snap(Proximity::Detected, Proximity::Detected, 1.0)),
            Some(ObstacleCause::LeftProximity)
        );
        assert_eq!(
            detector.assess(&snap(Proximity::Clear, Proximity::Detected, 1.0)),
            Some(ObstacleCause::RightProximity)
        );
    }
}
