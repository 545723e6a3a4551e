//! Roll angle setpoint stage

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use super::*;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GuidCtrl {
    /// Convert the current lateral acceleration demand into a roll angle
    /// setpoint, limited in magnitude and (if enabled) in slew rate.
    ///
    /// A non-finite candidate is rejected and the previous setpoint kept.
    pub(crate) fn update_roll_setpoint(&mut self) {
        let mut roll_new_rad = roll_from_lat_accel(self.report.lateral_accel_mss);
        roll_new_rad = clamp(
            &roll_new_rad,
            &-self.params.roll_lim_rad,
            &self.params.roll_lim_rad
        );

        if self.params.dt_s > 0.0 && self.params.roll_slew_rate_rads > 0.0 {
            let max_step_rad = self.params.roll_slew_rate_rads * self.params.dt_s;
            roll_new_rad = clamp(
                &roll_new_rad,
                &(self.roll_sp_rad - max_step_rad),
                &(self.roll_sp_rad + max_step_rad)
            );
        }

        if roll_new_rad.is_finite() {
            self.roll_sp_rad = roll_new_rad;
        }
        else {
            warn!(
                "Non-finite roll setpoint rejected (lateral accel {} m/s^2), keeping {:.4} rad",
                self.report.lateral_accel_mss,
                self.roll_sp_rad
            );
        }

        self.report.roll_sp_rad = self.roll_sp_rad;
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Roll angle for a coordinated turn with the given lateral acceleration.
pub fn roll_from_lat_accel(lateral_accel_mss: f64) -> f64 {
    (lateral_accel_mss / GRAVITY_MSS).atan()
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_roll_from_lat_accel() {
        assert_eq!(roll_from_lat_accel(0.0), 0.0);
        assert_approx_eq!(roll_from_lat_accel(GRAVITY_MSS), std::f64::consts::FRAC_PI_4, 1e-12);
        assert!(roll_from_lat_accel(-1.0) < 0.0);
    }

    #[test]
    fn test_roll_limit() {
        let mut gc = GuidCtrl::new(Params::default()).unwrap();

        gc.report.lateral_accel_mss = 1000.0;
        gc.update_roll_setpoint();
        assert_approx_eq!(gc.roll_setpoint(), 40f64.to_radians(), 1e-12);

        gc.report.lateral_accel_mss = -1000.0;
        gc.update_roll_setpoint();
        assert_approx_eq!(gc.roll_setpoint(), -40f64.to_radians(), 1e-12);
    }

    #[test]
    fn test_roll_slew_limit() {
        let mut gc = GuidCtrl::new(Params {
            roll_slew_rate_rads: 0.5,
            dt_s: 0.1,
            ..Default::default()
        }).unwrap();

        gc.report.lateral_accel_mss = 1000.0;
        gc.update_roll_setpoint();
        assert_approx_eq!(gc.roll_setpoint(), 0.05, 1e-12);
        gc.update_roll_setpoint();
        assert_approx_eq!(gc.roll_setpoint(), 0.10, 1e-12);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut gc = GuidCtrl::new(Params::default()).unwrap();

        gc.report.lateral_accel_mss = 2.0;
        gc.update_roll_setpoint();
        let prev = gc.roll_setpoint();

        gc.report.lateral_accel_mss = std::f64::NAN;
        gc.update_roll_setpoint();
        assert_eq!(gc.roll_setpoint(), prev);
    }
}
