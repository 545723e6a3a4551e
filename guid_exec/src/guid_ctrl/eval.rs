//! Core guidance law evaluation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::Vector2;

// Internal
use super::*;
use util::maths::cross_2d;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GuidCtrl {
    /// Evaluate the guidance law for the given velocities and path.
    ///
    /// This is a pure function of the parameters and its inputs, the roll
    /// setpoint stage and path type are applied by the caller. Every
    /// intermediate quantity is returned in the report.
    ///
    /// # Inputs
    /// - `ground_vel`: ground velocity of the aircraft.
    /// - `wind_vel`: estimated wind velocity.
    /// - `path`: local description of the path to follow.
    pub fn evaluate(
        &self,
        ground_vel: &Vector2<f64>,
        wind_vel: &Vector2<f64>,
        path: &PathDesc
    ) -> StatusReport {
        let ground_speed_ms = ground_vel.norm();

        let air_vel = ground_vel - wind_vel;
        let airspeed_ms = air_vel.norm();

        if airspeed_ms < MIN_AIRSPEED_MS {
            debug!(
                "Airspeed {:.3} m/s below the minimum, holding the nominal airspeed",
                airspeed_ms
            );
            return self.degenerate_report(ground_speed_ms, path)
        }

        let wind_speed_ms = wind_vel.norm();
        let wind_ratio = wind_speed_ms / airspeed_ms;

        let track_error_m = path.signed_track_error_m.abs();
        let upt = &path.unit_path_tangent;

        let wind_cross_upt = cross_2d(wind_vel, upt);
        let wind_dot_upt = wind_vel.dot(upt);

        // Feasibility at the closest point on the track
        let feas_on_track = bearing_feasibility(
            wind_cross_upt,
            wind_dot_upt,
            wind_speed_ms,
            wind_ratio,
            self.params.wind_ratio_buffer
        );

        let adapted_period_s = self.adapt_period(
            ground_speed_ms,
            airspeed_ms,
            wind_ratio,
            track_error_m,
            path.path_curvature_m,
            feas_on_track
        );
        let p_gain = p_gain(adapted_period_s, self.params.damping);
        let time_const_s = time_const(adapted_period_s, self.params.damping);

        let track_error_bound_m = track_error_bound(ground_speed_ms, time_const_s);
        let normalized_track_error = normalized_track_error(track_error_m, track_error_bound_m);

        let look_ahead_ang_rad = look_ahead_angle(normalized_track_error);

        let bearing_vec = bearing_vec(path, look_ahead_ang_rad);

        let wind_cross_bearing = cross_2d(wind_vel, &bearing_vec);
        let wind_dot_bearing = wind_vel.dot(&bearing_vec);

        let feas = bearing_feasibility(
            wind_cross_bearing,
            wind_dot_bearing,
            wind_speed_ms,
            wind_ratio,
            self.params.wind_ratio_buffer
        );
        let feas_combined = feas * feas_on_track;

        let min_gsp = self.min_ground_speed(normalized_track_error, feas_combined);

        let (air_vel_ref, air_vel_ref_case) = self.ref_air_velocity(
            wind_vel,
            &bearing_vec,
            wind_cross_bearing,
            wind_dot_bearing,
            wind_speed_ms,
            min_gsp.total_ms
        );
        let airspeed_ref_ms = air_vel_ref.norm();

        let track_proximity = track_proximity(look_ahead_ang_rad);

        let lateral_accel_ff_mss = lateral_accel_ff(
            upt,
            ground_vel,
            wind_dot_upt,
            wind_cross_upt,
            airspeed_ms,
            path.signed_track_error_m,
            path.path_curvature_m,
            track_proximity,
            feas_combined
        );

        let lateral_accel_mss = lateral_accel(
            &air_vel,
            &air_vel_ref,
            airspeed_ms,
            airspeed_ref_ms,
            p_gain
        ) + lateral_accel_ff_mss;

        trace!(
            "GuidCtrl eval: period {:.3} s, e_norm {:.3}, feas {:.3}/{:.3}, {} -> \
             airspeed_ref {:.3} m/s, a_lat {:.4} m/s^2",
            adapted_period_s,
            normalized_track_error,
            feas,
            feas_on_track,
            air_vel_ref_case.name(),
            airspeed_ref_ms,
            lateral_accel_mss
        );

        StatusReport {
            adapted_period_s,
            p_gain,
            time_const_s,
            track_error_bound_m,
            bearing_vec,
            feas,
            feas_on_track,
            feas_combined,
            min_ground_speed_ref_ms: min_gsp.total_ms,
            min_gsp_track_keeping_ms: min_gsp.track_keeping_ms,
            air_vel_ref,
            airspeed_ref_ms,
            air_vel_ref_case,
            track_proximity,
            lateral_accel_ff_mss,
            lateral_accel_mss,
            path: *path,
            path_type_loiter: self.report.path_type_loiter,
            airspeed_degenerate: false,
            roll_sp_rad: self.roll_sp_rad
        }
    }

    /// Report for an airspeed too low to solve the wind triangle.
    ///
    /// The airspeed reference is nominal with no lateral acceleration or
    /// feasibility, and the bearing is along the path.
    fn degenerate_report(&self, ground_speed_ms: f64, path: &PathDesc) -> StatusReport {
        let mut report = StatusReport::neutral(&self.params);

        report.track_error_bound_m = track_error_bound(ground_speed_ms, report.time_const_s);
        report.bearing_vec = path.unit_path_tangent;
        report.feas = 0.0;
        report.feas_on_track = 0.0;
        report.feas_combined = 0.0;
        report.air_vel_ref = path.unit_path_tangent * self.params.airspeed_nom_ms;
        report.path = *path;
        report.path_type_loiter = self.report.path_type_loiter;
        report.airspeed_degenerate = true;
        report.roll_sp_rad = self.roll_sp_rad;

        report
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Bearing blending from the direction to the track (look ahead angle 0) into
/// the path tangent (look ahead angle `pi/2`).
pub fn bearing_vec(path: &PathDesc, look_ahead_ang_rad: f64) -> Vector2<f64> {
    let error_sign = if path.signed_track_error_m < 0.0 { -1.0 } else { 1.0 };
    let unit_track_error = path.unit_path_normal() * -error_sign;

    unit_track_error * look_ahead_ang_rad.cos()
        + path.unit_path_tangent * look_ahead_ang_rad.sin()
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn north_line(signed_track_error_m: f64) -> PathDesc {
        PathDesc {
            unit_path_tangent: Vector2::new(1.0, 0.0),
            signed_track_error_m,
            path_curvature_m: 0.0
        }
    }

    #[test]
    fn test_bearing_vec() {
        // On the track steer along it
        let b = bearing_vec(&north_line(0.0), look_ahead_angle(0.0));
        assert_approx_eq!(b[0], 1.0, 1e-12);
        assert_approx_eq!(b[1], 0.0, 1e-12);

        // Far to the right (east) of the track steer west, straight at it
        let b = bearing_vec(&north_line(500.0), look_ahead_angle(1.0));
        assert_approx_eq!(b[0], 0.0, 1e-12);
        assert_approx_eq!(b[1], -1.0, 1e-12);

        // and far to the left steer east
        let b = bearing_vec(&north_line(-500.0), look_ahead_angle(1.0));
        assert_approx_eq!(b[1], 1.0, 1e-12);

        let b = bearing_vec(&north_line(-20.0), look_ahead_angle(0.5));
        assert_approx_eq!(b.norm(), 1.0, 1e-12);
    }

    #[test]
    fn test_degenerate_airspeed() {
        let gc = GuidCtrl::new(Params::default()).unwrap();

        // Ground speed equal to the wind
        let v = Vector2::new(8.0, 3.0);
        let report = gc.evaluate(&v, &v, &north_line(30.0));

        assert!(report.airspeed_degenerate);
        assert_eq!(report.lateral_accel_mss, 0.0);
        assert_eq!(report.feas, 0.0);
        assert_eq!(report.feas_on_track, 0.0);
        assert_eq!(report.airspeed_ref_ms, 15.0);
        assert_eq!(report.air_vel_ref_case, AirVelRefCase::None);
        assert!(report.track_error_bound_m > 0.0);
    }

    #[test]
    fn test_on_track_no_wind() {
        let gc = GuidCtrl::new(Params::default()).unwrap();

        let report = gc.evaluate(
            &Vector2::new(15.0, 0.0), &Vector2::zeros(), &north_line(0.0)
        );

        assert_eq!(report.air_vel_ref_case, AirVelRefCase::Nominal);
        assert_approx_eq!(report.lateral_accel_mss, 0.0, 1e-12);
        assert_approx_eq!(report.airspeed_ref_ms, 15.0, 1e-12);
        assert_approx_eq!(report.track_proximity, 1.0, 1e-12);
        assert_eq!(report.feas_combined, 1.0);
        assert_approx_eq!(report.adapted_period_s, 10.0, 1e-12);
        assert_approx_eq!(report.track_error_bound_m, 15.0 * 7.071, 1e-9);
    }

    #[test]
    fn test_steers_back_to_track() {
        let gc = GuidCtrl::new(Params::default()).unwrap();
        let ground_vel = Vector2::new(15.0, 0.0);

        // Right of the track, turn left (negative)
        let report = gc.evaluate(&ground_vel, &Vector2::zeros(), &north_line(30.0));
        assert!(report.lateral_accel_mss < 0.0);

        // Left of the track, turn right
        let report = gc.evaluate(&ground_vel, &Vector2::zeros(), &north_line(-30.0));
        assert!(report.lateral_accel_mss > 0.0);
    }

    #[test]
    fn test_head_wind_beyond_max_airspeed() {
        let gc = GuidCtrl::new(Params::default()).unwrap();

        // Pointed north into a 25 m/s northerly, going backwards at 10 m/s
        let wind = Vector2::new(-25.0, 0.0);
        let ground_vel = Vector2::new(-10.0, 0.0);
        let report = gc.evaluate(&ground_vel, &wind, &north_line(0.0));

        assert!(report.min_ground_speed_ref_ms >= 0.0);
        assert_approx_eq!(report.air_vel_ref[0], 20.0, 1e-9);
        assert_approx_eq!(report.air_vel_ref[1], 0.0, 1e-9);
        assert_approx_eq!(report.airspeed_ref_ms, 20.0, 1e-9);
        assert_eq!(report.feas, 0.0);
    }

    #[test]
    fn test_head_wind_between_nominal_and_max() {
        let gc = GuidCtrl::new(Params::default()).unwrap();

        let wind = Vector2::new(-18.0, 0.0);
        let ground_vel = Vector2::new(-3.0, 0.0);
        let report = gc.evaluate(&ground_vel, &wind, &north_line(0.0));

        assert_eq!(report.air_vel_ref_case, AirVelRefCase::ExcessWindHold);
        assert_approx_eq!((report.air_vel_ref + wind).norm(), 0.0, 1e-12);
        assert_approx_eq!(report.airspeed_ref_ms, 18.0, 1e-12);
    }

    #[test]
    fn test_outputs_finite() {
        let gc = GuidCtrl::new(Params {
            en_track_keeping: true,
            en_min_ground_speed: true,
            min_gsp_cmd_ms: 3.0,
            roll_time_const_s: 0.5,
            ..Default::default()
        }).unwrap();

        let speeds = [0.0, 0.5, 1.0, 1.0 + 1e-9, 5.0, 15.0, 19.999, 20.0, 30.0];
        let angles = [0.0, 0.01, 0.5, 1.5707963, 2.0, 3.14159, -1.0, -3.0];
        let errors = [-1e4, -50.0, -1e-9, 0.0, 1e-9, 10.0, 1e6];
        let curvatures = [-2.0, -0.02, 0.0, 0.02, 2.0];

        for gs in speeds.iter() {
            for ws in speeds.iter() {
                for ga in angles.iter() {
                    for wa in angles.iter() {
                        for e in errors.iter() {
                            for k in curvatures.iter() {
                                let ground_vel = unit_vec_from_angle(*ga) * *gs;
                                let wind = unit_vec_from_angle(*wa) * *ws;
                                let path = PathDesc {
                                    unit_path_tangent: Vector2::new(1.0, 0.0),
                                    signed_track_error_m: *e,
                                    path_curvature_m: *k
                                };

                                let r = gc.evaluate(&ground_vel, &wind, &path);
                                assert!(
                                    r.lateral_accel_mss.is_finite()
                                    && r.airspeed_ref_ms.is_finite()
                                    && r.air_vel_ref.iter().all(|v| v.is_finite())
                                    && r.bearing_vec.iter().all(|v| v.is_finite()),
                                    "gs {} ws {} ga {} wa {} e {} k {}: {:?}",
                                    gs, ws, ga, wa, e, k, r
                                );
                                assert!(r.feas >= 0.0 && r.feas <= 1.0);
                                assert!(r.track_proximity >= 0.0 && r.track_proximity <= 1.0);
                                assert!(r.min_ground_speed_ref_ms >= 0.0);
                                assert!(r.airspeed_ref_ms <= 20.0 + 1e-9);
                            }
                        }
                    }
                }
            }
        }
    }
}
