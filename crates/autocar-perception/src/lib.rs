//! `autocar-perception` – turning raw readings into decisions about space.
//!
//! # Modules
//!
//! - [`fusion`] – [`ObstacleDetector`][fusion::ObstacleDetector]: combines
//!   the two proximity sensors and the rangefinder into one obstacle signal.
//! - [`scanner`] – [`DirectionalScanner`][scanner::DirectionalScanner]:
//!   sweeps the rangefinder mount across its travel and picks the clearest
//!   heading.
//! - [`history`] – [`DistanceHistory`][history::DistanceHistory]: rolling
//!   window of front distances with summary statistics.

pub mod fusion;
pub mod history;
pub mod scanner;

pub use fusion::{ObstacleCause, ObstacleDetector};
pub use history::{DistanceHistory, DistanceStats};
pub use scanner::{DirectionalScanner, Sweep, select_best, sweep_pattern};
