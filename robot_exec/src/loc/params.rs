//! Localisation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::geom::Pose2;
use crate::units::Angle;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for localisation
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Period of the localisation worker.
    ///
    /// Units: milliseconds
    pub worker_period_ms: u64,

    /// Pose the estimate starts at.
    ///
    /// Units: meters
    pub initial_x_m: f64,

    /// Units: meters
    pub initial_y_m: f64,

    /// Units: degrees
    pub initial_heading_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn initial_pose(&self) -> Pose2 {
        Pose2::from_m_rad(
            self.initial_x_m,
            self.initial_y_m,
            Angle::from_deg(self.initial_heading_deg).rad(),
        )
    }
}
