//! Wind triangle solving and excess wind mitigation
//!
//! The reference air velocity is found in two steps. First the regime is
//! selected from the bearing, wind and minimum ground speed demand as an
//! [`AirVelRefCase`], then the air velocity for that regime is solved. Keeping
//! the selection separate means the regime can be reported and archived
//! alongside the command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The regime used to find the reference air velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AirVelRefCase {
    /// Minimum ground speed demanded and achievable at the nominal airspeed.
    MinGspNominal,

    /// Minimum ground speed demanded and achievable between the nominal and
    /// maximum airspeeds.
    MinGspIncremented { airspeed_ms: f64 },

    /// Minimum ground speed unachievable, but the bearing can be held at the
    /// maximum airspeed.
    MinGspMaxFeasible,

    /// Minimum ground speed unachievable and the bearing is infeasible even at
    /// the maximum airspeed.
    MinGspMaxInfeasible,

    /// Bearing achievable at the nominal airspeed.
    Nominal,

    /// The bearing is into the wind and only achievable above the nominal
    /// airspeed, so the aircraft holds position against the wind.
    ExcessWindHold,

    /// The bearing is downwind and only achievable above the nominal
    /// airspeed. Flown at right angles to the bearing using the least
    /// airspeed that makes it good.
    ExcessWindMinAirspeed,

    /// The bearing is infeasible, mitigate at the given airspeed.
    Infeasible { airspeed_ms: f64 },

    /// No reference was solved this cycle, either because the airspeed was
    /// too low or because no guidance was evaluated.
    None
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for AirVelRefCase {
    fn default() -> Self {
        AirVelRefCase::None
    }
}

impl AirVelRefCase {
    /// Short name of the case, used in archives and logs.
    pub fn name(&self) -> &'static str {
        match self {
            AirVelRefCase::MinGspNominal => "min_gsp_nominal",
            AirVelRefCase::MinGspIncremented { .. } => "min_gsp_incremented",
            AirVelRefCase::MinGspMaxFeasible => "min_gsp_max_feasible",
            AirVelRefCase::MinGspMaxInfeasible => "min_gsp_max_infeasible",
            AirVelRefCase::Nominal => "nominal",
            AirVelRefCase::ExcessWindHold => "excess_wind_hold",
            AirVelRefCase::ExcessWindMinAirspeed => "excess_wind_min_airspeed",
            AirVelRefCase::Infeasible { .. } => "infeasible",
            AirVelRefCase::None => "none"
        }
    }
}

impl GuidCtrl {
    /// Select the regime for the reference air velocity.
    pub(crate) fn select_air_vel_ref_case(
        &self,
        wind_cross_bearing: f64,
        wind_dot_bearing: f64,
        wind_speed_ms: f64,
        min_ground_speed_ms: f64
    ) -> AirVelRefCase {
        let p = &self.params;

        if min_ground_speed_ms > wind_dot_bearing
            && (p.en_min_ground_speed || p.en_track_keeping)
            && p.en_wind_excess_regulation
        {
            let airspeed_min_ms = (
                (min_ground_speed_ms - wind_dot_bearing).powi(2)
                + wind_cross_bearing * wind_cross_bearing
            ).sqrt();

            if airspeed_min_ms > p.airspeed_max_ms {
                if bearing_is_feasible(
                    wind_cross_bearing, wind_dot_bearing, p.airspeed_max_ms, wind_speed_ms
                ) {
                    AirVelRefCase::MinGspMaxFeasible
                }
                else {
                    AirVelRefCase::MinGspMaxInfeasible
                }
            }
            else if airspeed_min_ms > p.airspeed_nom_ms {
                AirVelRefCase::MinGspIncremented { airspeed_ms: airspeed_min_ms }
            }
            else {
                AirVelRefCase::MinGspNominal
            }
        }
        else if bearing_is_feasible(
            wind_cross_bearing, wind_dot_bearing, p.airspeed_nom_ms, wind_speed_ms
        ) {
            AirVelRefCase::Nominal
        }
        else if p.en_wind_excess_regulation && bearing_is_feasible(
            wind_cross_bearing, wind_dot_bearing, p.airspeed_max_ms, wind_speed_ms
        ) {
            if wind_dot_bearing <= 0.0 {
                AirVelRefCase::ExcessWindHold
            }
            else {
                AirVelRefCase::ExcessWindMinAirspeed
            }
        }
        else {
            AirVelRefCase::Infeasible {
                airspeed_ms: if p.en_wind_excess_regulation {
                    p.airspeed_max_ms
                }
                else {
                    p.airspeed_nom_ms
                }
            }
        }
    }

    /// Reference air velocity that makes good the bearing, incrementing the
    /// airspeed or mitigating as the wind demands.
    ///
    /// Returns the reference along with the regime it was solved in.
    pub(crate) fn ref_air_velocity(
        &self,
        wind_vel: &Vector2<f64>,
        bearing_vec: &Vector2<f64>,
        wind_cross_bearing: f64,
        wind_dot_bearing: f64,
        wind_speed_ms: f64,
        min_ground_speed_ms: f64
    ) -> (Vector2<f64>, AirVelRefCase) {
        let case = self.select_air_vel_ref_case(
            wind_cross_bearing, wind_dot_bearing, wind_speed_ms, min_ground_speed_ms
        );

        let solve_at = |airspeed_ms: f64| solve_wind_triangle(
            wind_cross_bearing,
            project_airsp_on_bearing(airspeed_ms, wind_cross_bearing),
            bearing_vec
        );

        let air_vel_ref = match case {
            AirVelRefCase::MinGspNominal | AirVelRefCase::Nominal => {
                solve_at(self.params.airspeed_nom_ms)
            },
            AirVelRefCase::MinGspIncremented { airspeed_ms } => solve_at(airspeed_ms),
            AirVelRefCase::MinGspMaxFeasible => solve_at(self.params.airspeed_max_ms),
            AirVelRefCase::MinGspMaxInfeasible => infeasible_air_vel_ref(
                wind_vel, bearing_vec, wind_speed_ms, self.params.airspeed_max_ms
            ),
            // Zero ground velocity, pointed straight into the wind
            AirVelRefCase::ExcessWindHold => -wind_vel,
            AirVelRefCase::ExcessWindMinAirspeed => {
                solve_wind_triangle(wind_cross_bearing, 0.0, bearing_vec)
            },
            AirVelRefCase::Infeasible { airspeed_ms } => infeasible_air_vel_ref(
                wind_vel, bearing_vec, wind_speed_ms, airspeed_ms
            ),
            AirVelRefCase::None => bearing_vec * self.params.airspeed_nom_ms
        };

        (air_vel_ref, case)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Check whether a bearing can be made good at the given airspeed.
///
/// The cross wind component must be less than the airspeed, and the wind
/// must either have a component along the bearing or be slower than the
/// airspeed.
pub fn bearing_is_feasible(
    wind_cross_bearing: f64,
    wind_dot_bearing: f64,
    airspeed_ms: f64,
    wind_speed_ms: f64
) -> bool {
    wind_cross_bearing.abs() < airspeed_ms
        && (wind_dot_bearing > 0.0 || wind_speed_ms < airspeed_ms)
}

/// Component of the airspeed along the bearing once the cross wind has been
/// cancelled. Zero if the cross wind exceeds the airspeed.
pub fn project_airsp_on_bearing(airspeed_ms: f64, wind_cross_bearing: f64) -> f64 {
    (airspeed_ms * airspeed_ms - wind_cross_bearing * wind_cross_bearing)
        .max(0.0)
        .sqrt()
}

/// Air velocity with the given along bearing component which exactly cancels
/// the cross wind.
pub fn solve_wind_triangle(
    wind_cross_bearing: f64,
    airsp_dot_bearing: f64,
    bearing_vec: &Vector2<f64>
) -> Vector2<f64> {
    Vector2::new(
        airsp_dot_bearing * bearing_vec[0] - wind_cross_bearing * bearing_vec[1],
        wind_cross_bearing * bearing_vec[0] + airsp_dot_bearing * bearing_vec[1]
    )
}

/// Air velocity of the given airspeed which minimises the drift away from an
/// infeasible bearing.
///
/// If the direction is degenerate the bearing is flown at the given airspeed.
pub fn infeasible_air_vel_ref(
    wind_vel: &Vector2<f64>,
    bearing_vec: &Vector2<f64>,
    wind_speed_ms: f64,
    airspeed_ms: f64
) -> Vector2<f64> {
    let excess_ms = (wind_speed_ms * wind_speed_ms - airspeed_ms * airspeed_ms)
        .max(0.0)
        .sqrt();

    let air_vel_ref = bearing_vec * excess_ms - wind_vel;

    match air_vel_ref.try_normalize(EPSILON) {
        Some(unit) => unit * airspeed_ms,
        None => bearing_vec * airspeed_ms
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use util::maths::cross_2d;

    fn case_for(gc: &GuidCtrl, wind: Vector2<f64>, bearing: Vector2<f64>, min_gsp: f64)
        -> (Vector2<f64>, AirVelRefCase)
    {
        gc.ref_air_velocity(
            &wind,
            &bearing,
            cross_2d(&wind, &bearing),
            wind.dot(&bearing),
            wind.norm(),
            min_gsp
        )
    }

    #[test]
    fn test_feasible() {
        assert!(bearing_is_feasible(5.0, -3.0, 15.0, 6.0));
        assert!(!bearing_is_feasible(16.0, 0.0, 15.0, 16.0));

        // Tail winds stronger than the airspeed are fine
        assert!(bearing_is_feasible(0.0, 20.0, 15.0, 20.0));

        // but head winds are not
        assert!(!bearing_is_feasible(0.0, -20.0, 15.0, 20.0));
    }

    #[test]
    fn test_projection() {
        assert_approx_eq!(project_airsp_on_bearing(5.0, 3.0), 4.0, 1e-12);
        assert_eq!(project_airsp_on_bearing(5.0, 6.0), 0.0);
    }

    #[test]
    fn test_wind_triangle_cancels_cross_wind() {
        // Bearing north, wind from the west blowing east
        let bearing = Vector2::new(1.0, 0.0);
        let wind = Vector2::new(0.0, 5.0);
        let cross = cross_2d(&wind, &bearing);

        let air_vel = solve_wind_triangle(cross, project_airsp_on_bearing(13.0, cross), &bearing);
        let ground_vel = air_vel + wind;

        assert_approx_eq!(air_vel.norm(), 13.0, 1e-9);
        assert_approx_eq!(ground_vel[1], 0.0, 1e-9);
        assert_approx_eq!(ground_vel[0], 12.0, 1e-9);
    }

    #[test]
    fn test_infeasible_air_vel_ref() {
        let bearing = Vector2::new(1.0, 0.0);
        let wind = Vector2::new(-25.0, 0.0);

        let air_vel_ref = infeasible_air_vel_ref(&wind, &bearing, 25.0, 20.0);
        assert_approx_eq!(air_vel_ref[0], 20.0, 1e-9);
        assert_approx_eq!(air_vel_ref[1], 0.0, 1e-9);

        // Degenerate direction falls back to the bearing
        let air_vel_ref = infeasible_air_vel_ref(
            &Vector2::new(5.0, 0.0), &bearing, 5.0, 0.0
        );
        assert!(air_vel_ref.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_nominal_case() {
        let gc = GuidCtrl::new(Params::default()).unwrap();
        let (air_vel_ref, case) = case_for(
            &gc, Vector2::new(0.0, 5.0), Vector2::new(1.0, 0.0), 0.0
        );

        assert_eq!(case, AirVelRefCase::Nominal);
        assert_approx_eq!(air_vel_ref.norm(), 15.0, 1e-9);
    }

    #[test]
    fn test_excess_wind_cases() {
        let gc = GuidCtrl::new(Params::default()).unwrap();
        let bearing = Vector2::new(1.0, 0.0);

        // Head wind between nominal and maximum airspeed holds position
        let wind = Vector2::new(-18.0, 0.0);
        let (air_vel_ref, case) = case_for(&gc, wind, bearing, 0.0);
        assert_eq!(case, AirVelRefCase::ExcessWindHold);
        assert_approx_eq!((air_vel_ref + wind).norm(), 0.0, 1e-12);

        // Head wind beyond maximum flies at maximum into the wind
        let wind = Vector2::new(-25.0, 0.0);
        let (air_vel_ref, case) = case_for(&gc, wind, bearing, 0.0);
        assert_eq!(case, AirVelRefCase::Infeasible { airspeed_ms: 20.0 });
        assert_approx_eq!(air_vel_ref[0], 20.0, 1e-9);

        // Strong cross wind with a downwind component
        let wind = Vector2::new(5.0, 17.0);
        let (air_vel_ref, case) = case_for(&gc, wind, bearing, 0.0);
        assert_eq!(case, AirVelRefCase::ExcessWindMinAirspeed);
        assert_approx_eq!(air_vel_ref.dot(&bearing), 0.0, 1e-12);
        assert_approx_eq!((air_vel_ref + wind)[1], 0.0, 1e-12);
    }

    #[test]
    fn test_no_regulation_mitigates_at_nominal() {
        let gc = GuidCtrl::new(Params {
            en_wind_excess_regulation: false,
            ..Default::default()
        }).unwrap();

        let (air_vel_ref, case) = case_for(
            &gc, Vector2::new(-18.0, 0.0), Vector2::new(1.0, 0.0), 0.0
        );
        assert_eq!(case, AirVelRefCase::Infeasible { airspeed_ms: 15.0 });
        assert_approx_eq!(air_vel_ref.norm(), 15.0, 1e-9);
    }

    #[test]
    fn test_min_ground_speed_cases() {
        let gc = GuidCtrl::new(Params {
            en_min_ground_speed: true,
            min_gsp_cmd_ms: 5.0,
            ..Default::default()
        }).unwrap();
        let bearing = Vector2::new(1.0, 0.0);

        // Light head wind, nominal airspeed is enough
        let (_, case) = case_for(&gc, Vector2::new(-5.0, 0.0), bearing, 5.0);
        assert_eq!(case, AirVelRefCase::MinGspNominal);

        // Stronger head wind needs more airspeed
        let (air_vel_ref, case) = case_for(&gc, Vector2::new(-12.0, 0.0), bearing, 5.0);
        assert_eq!(case, AirVelRefCase::MinGspIncremented { airspeed_ms: 17.0 });
        assert_approx_eq!(air_vel_ref[0], 17.0, 1e-9);

        // Too strong to keep the minimum ground speed, but the bearing holds
        let (air_vel_ref, case) = case_for(&gc, Vector2::new(-18.0, 0.0), bearing, 5.0);
        assert_eq!(case, AirVelRefCase::MinGspMaxFeasible);
        assert_approx_eq!(air_vel_ref[0], 20.0, 1e-9);

        // Beyond the maximum airspeed
        let (air_vel_ref, case) = case_for(&gc, Vector2::new(-25.0, 0.0), bearing, 5.0);
        assert_eq!(case, AirVelRefCase::MinGspMaxInfeasible);
        assert_approx_eq!(air_vel_ref.norm(), 20.0, 1e-9);
    }

    #[test]
    fn test_case_names() {
        assert_eq!(AirVelRefCase::default().name(), "none");
        assert_eq!(AirVelRefCase::Infeasible { airspeed_ms: 1.0 }.name(), "infeasible");
    }
}
