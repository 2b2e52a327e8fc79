use serde::{Deserialize, Serialize};

use crate::Error;

/// Solar position in degrees, as handed to the shadow producer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    /// Clockwise from north
    pub azimuth_deg: f64,
    /// Above the horizon
    pub altitude_deg: f64,
}

impl SunPosition {
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for non-finite values or an altitude
    /// outside `[-90, 90]`.
    pub fn new(azimuth_deg: f64, altitude_deg: f64) -> Result<Self, Error> {
        if !azimuth_deg.is_finite() {
            return Err(Error::InvalidInput(format!(
                "sun azimuth must be finite, got {azimuth_deg}"
            )));
        }
        if !altitude_deg.is_finite() || !(-90.0..=90.0).contains(&altitude_deg) {
            return Err(Error::InvalidInput(format!(
                "sun altitude must be within [-90, 90], got {altitude_deg}"
            )));
        }
        Ok(Self {
            azimuth_deg,
            altitude_deg,
        })
    }
}
