//! Path commands and their local description
//!
//! Guidance only ever sees the path through a [`PathDesc`]: the unit tangent
//! at the closest point, the signed track error and the curvature. The
//! constructors here build that description for each kind of path from
//! vectors in the local north-east plane.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use super::*;
use util::maths::cross_2d;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Mean radius of the Earth.
///
/// Units: meters
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance from the loiter center below which the direction to the vehicle
/// is not used.
///
/// Units: meters
const LOITER_CENTER_DEADBAND_M: f64 = 0.1;

/// Ground speed below which the direction of travel is not used.
///
/// Units: meters/second
const LOITER_MIN_GROUND_SPEED_MS: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A geodetic position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Units: degrees
    pub lat_deg: f64,

    /// Units: degrees
    pub lon_deg: f64
}

/// Local description of the path at the point closest to the aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathDesc {
    /// Unit tangent to the path at the closest point, in the direction of
    /// travel.
    pub unit_path_tangent: Vector2<f64>,

    /// Distance from the closest point on the path to the aircraft, positive
    /// when the aircraft is on the right of the path (along the path normal).
    ///
    /// Units: meters
    pub signed_track_error_m: f64,

    /// Curvature of the path, positive for clockwise turns.
    ///
    /// Units: 1/meters
    pub path_curvature_m: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction to fly around a loiter circle, as viewed from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoiterDirection {
    Clockwise,
    CounterClockwise
}

/// A path for guidance to follow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathCmd {
    /// Follow the line from `wp_a` to `wp_b`, flying to `wp_a` first if the
    /// aircraft is in front of it.
    Waypoints {
        wp_a: GeoPoint,
        wp_b: GeoPoint
    },

    /// Circle around `center`.
    Loiter {
        center: GeoPoint,
        radius_m: f64,
        direction: LoiterDirection
    },

    /// Hold an air relative heading, ignoring wind and position.
    Heading {
        heading_rad: f64
    },

    /// Hold a ground relative bearing, ignoring position.
    Bearing {
        bearing_rad: f64
    },

    /// Fly wings level on the given heading without evaluating guidance.
    LevelFlight {
        heading_rad: f64
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GeoPoint {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// The point reached by moving from this one by the given local
    /// north-east vector.
    ///
    /// Inverse of [`local_planar_vector`] for small offsets.
    pub fn offset_by(&self, local_m: &Vector2<f64>) -> Self {
        let cos_lat = self.lat_deg.to_radians().cos();

        Self {
            lat_deg: self.lat_deg + (local_m[0] / MEAN_EARTH_RADIUS_M).to_degrees(),
            lon_deg: self.lon_deg
                + (local_m[1] / (cos_lat.max(EPSILON) * MEAN_EARTH_RADIUS_M)).to_degrees()
        }
    }
}

impl LoiterDirection {
    /// `+1` for clockwise, `-1` for counter clockwise.
    pub fn sign(&self) -> f64 {
        match self {
            LoiterDirection::Clockwise => 1.0,
            LoiterDirection::CounterClockwise => -1.0
        }
    }
}

impl PathCmd {
    /// Short name of the kind of path.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PathCmd::Waypoints { .. } => "waypoints",
            PathCmd::Loiter { .. } => "loiter",
            PathCmd::Heading { .. } => "heading",
            PathCmd::Bearing { .. } => "bearing",
            PathCmd::LevelFlight { .. } => "level_flight"
        }
    }
}

impl PathDesc {
    /// Describe the straight line from waypoint A to waypoint B.
    ///
    /// If the waypoints coincide or the aircraft has not yet reached A the
    /// path leads straight to A with no track error.
    pub fn waypoints(vector_a_to_b: &Vector2<f64>, vector_a_to_vehicle: &Vector2<f64>) -> Self {
        if vector_a_to_b.norm() < EPSILON || vector_a_to_b.dot(vector_a_to_vehicle) < 0.0 {
            let unit_path_tangent = match vector_a_to_vehicle.try_normalize(EPSILON) {
                Some(u) => -u,
                // Sat on top of A
                None => Vector2::new(1.0, 0.0)
            };

            Self {
                unit_path_tangent,
                signed_track_error_m: 0.0,
                path_curvature_m: 0.0
            }
        }
        else {
            let unit_path_tangent = vector_a_to_b.normalize();

            Self {
                unit_path_tangent,
                signed_track_error_m: cross_2d(&unit_path_tangent, vector_a_to_vehicle),
                path_curvature_m: 0.0
            }
        }
    }

    /// Describe a loiter circle around the center.
    ///
    /// # Inputs
    /// - `vector_center_to_vehicle`: local vector from the center to the
    ///   aircraft.
    /// - `radius_m`: loiter radius, floored at `MIN_RADIUS_M`.
    /// - `direction`: direction to fly around the circle.
    /// - `ground_vel`: the aircraft's ground velocity, used to pick the
    ///   closest point when the aircraft is at the center.
    pub fn loiter(
        vector_center_to_vehicle: &Vector2<f64>,
        radius_m: f64,
        direction: LoiterDirection,
        ground_vel: &Vector2<f64>
    ) -> Self {
        let radius_m = radius_m.max(MIN_RADIUS_M);
        let dir = direction.sign();

        let dist_to_center_m = vector_center_to_vehicle.norm();

        let unit_vec_center_to_closest_pt = if dist_to_center_m >= LOITER_CENTER_DEADBAND_M {
            vector_center_to_vehicle / dist_to_center_m
        }
        else if ground_vel.norm() >= LOITER_MIN_GROUND_SPEED_MS {
            ground_vel.normalize()
        }
        else {
            // Northern most point
            Vector2::new(1.0, 0.0)
        };

        Self {
            unit_path_tangent: Vector2::new(
                -unit_vec_center_to_closest_pt[1],
                unit_vec_center_to_closest_pt[0]
            ) * dir,
            signed_track_error_m: -dir * (dist_to_center_m - radius_m),
            path_curvature_m: dir / radius_m
        }
    }

    /// Describe a straight path along the given angle from north, with no
    /// track error.
    pub fn from_angle(angle_rad: f64) -> Self {
        Self {
            unit_path_tangent: unit_vec_from_angle(angle_rad),
            signed_track_error_m: 0.0,
            path_curvature_m: 0.0
        }
    }

    /// Unit normal of the path, the tangent rotated 90 degrees clockwise.
    pub fn unit_path_normal(&self) -> Vector2<f64> {
        Vector2::new(-self.unit_path_tangent[1], self.unit_path_tangent[0])
    }
}

impl Default for PathDesc {
    fn default() -> Self {
        Self::from_angle(0.0)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Local north-east vector from `origin` to `target`.
///
/// Uses the small angle approximation about the origin, so is only accurate
/// over short distances.
pub fn local_planar_vector(origin: &GeoPoint, target: &GeoPoint) -> Vector2<f64> {
    let x_angle_rad = (target.lat_deg - origin.lat_deg).to_radians();
    let y_angle_rad = (target.lon_deg - origin.lon_deg).to_radians();
    let x_origin_cos = origin.lat_deg.to_radians().cos();

    Vector2::new(
        x_angle_rad * MEAN_EARTH_RADIUS_M,
        y_angle_rad * x_origin_cos * MEAN_EARTH_RADIUS_M
    )
}

/// Unit vector at the given angle from north, positive towards east.
pub fn unit_vec_from_angle(angle_rad: f64) -> Vector2<f64> {
    Vector2::new(angle_rad.cos(), angle_rad.sin())
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_waypoints() {
        let path = PathDesc::waypoints(&Vector2::new(0.0, 100.0), &Vector2::new(10.0, 50.0));

        assert_approx_eq!(path.unit_path_tangent[0], 0.0, 1e-12);
        assert_approx_eq!(path.unit_path_tangent[1], 1.0, 1e-12);
        assert_approx_eq!(path.signed_track_error_m, -10.0, 1e-12);
        assert_eq!(path.path_curvature_m, 0.0);
    }

    #[test]
    fn test_waypoints_before_a() {
        // Behind A, fly straight to it
        let path = PathDesc::waypoints(&Vector2::new(0.0, 100.0), &Vector2::new(0.0, -30.0));
        assert_approx_eq!(path.unit_path_tangent[1], 1.0, 1e-12);
        assert_eq!(path.signed_track_error_m, 0.0);

        // Coincident waypoints
        let path = PathDesc::waypoints(&Vector2::zeros(), &Vector2::new(30.0, 40.0));
        assert_approx_eq!(path.unit_path_tangent[0], -0.6, 1e-12);
        assert_approx_eq!(path.unit_path_tangent[1], -0.8, 1e-12);

        // Coincident waypoints and on top of them
        let path = PathDesc::waypoints(&Vector2::zeros(), &Vector2::zeros());
        assert_approx_eq!(path.unit_path_tangent.norm(), 1.0, 1e-12);
    }

    #[test]
    fn test_loiter() {
        let path = PathDesc::loiter(
            &Vector2::new(60.0, 0.0), 50.0, LoiterDirection::Clockwise, &Vector2::zeros()
        );

        assert_approx_eq!(path.signed_track_error_m, -10.0, 1e-12);
        assert_approx_eq!(path.path_curvature_m, 0.02, 1e-12);
        assert_approx_eq!(path.unit_path_tangent[0], 0.0, 1e-12);
        assert_approx_eq!(path.unit_path_tangent[1], 1.0, 1e-12);

        let path = PathDesc::loiter(
            &Vector2::new(60.0, 0.0), 50.0, LoiterDirection::CounterClockwise, &Vector2::zeros()
        );
        assert_approx_eq!(path.signed_track_error_m, 10.0, 1e-12);
        assert_approx_eq!(path.path_curvature_m, -0.02, 1e-12);
        assert_approx_eq!(path.unit_path_tangent[1], -1.0, 1e-12);
    }

    #[test]
    fn test_loiter_center() {
        // At the center moving east, the closest point is to the east
        let path = PathDesc::loiter(
            &Vector2::zeros(), 50.0, LoiterDirection::Clockwise, &Vector2::new(0.0, 10.0)
        );
        assert_approx_eq!(path.unit_path_tangent[0], -1.0, 1e-12);
        assert_approx_eq!(path.signed_track_error_m, 50.0, 1e-12);

        // Stationary at the center, the closest point is to the north
        let path = PathDesc::loiter(
            &Vector2::zeros(), 50.0, LoiterDirection::Clockwise, &Vector2::zeros()
        );
        assert_approx_eq!(path.unit_path_tangent[1], 1.0, 1e-12);

        // Tiny radii are floored
        let path = PathDesc::loiter(
            &Vector2::new(10.0, 0.0), 0.0, LoiterDirection::Clockwise, &Vector2::zeros()
        );
        assert_approx_eq!(path.path_curvature_m, 1.0 / MIN_RADIUS_M, 1e-12);
    }

    #[test]
    fn test_track_error_along_normal() {
        // Positive error is along the normal for both kinds of path
        let line = PathDesc::waypoints(&Vector2::new(100.0, 0.0), &Vector2::new(50.0, 10.0));
        assert!(line.signed_track_error_m > 0.0);
        assert!(line.unit_path_normal()[1] > 0.0);

        let circle = PathDesc::loiter(
            &Vector2::new(40.0, 0.0), 50.0, LoiterDirection::Clockwise, &Vector2::zeros()
        );
        assert!(circle.signed_track_error_m > 0.0);
        assert!(circle.unit_path_normal()[0] < 0.0);
    }

    #[test]
    fn test_local_planar_vector() {
        let origin = GeoPoint::new(47.0, 8.0);

        // One arc minute of latitude is about a nautical mile
        let north = local_planar_vector(&origin, &GeoPoint::new(47.0 + 1.0 / 60.0, 8.0));
        assert_approx_eq!(north[0], 1853.25, 1.0);
        assert_approx_eq!(north[1], 0.0, 1e-9);

        let east = local_planar_vector(&origin, &GeoPoint::new(47.0, 8.01));
        assert_approx_eq!(east[0], 0.0, 1e-9);
        assert_approx_eq!(east[1], 0.01f64.to_radians() * 47f64.to_radians().cos() * 6_371_000.0, 1e-6);
    }

    #[test]
    fn test_offset_round_trip() {
        let origin = GeoPoint::new(-33.5, 151.2);
        let local = Vector2::new(-120.0, 340.0);

        let target = origin.offset_by(&local);
        let back = local_planar_vector(&origin, &target);

        assert_approx_eq!(back[0], local[0], 1e-6);
        assert_approx_eq!(back[1], local[1], 1e-6);
    }

    #[test]
    fn test_path_cmd_from_toml() {
        let cmd: PathCmd = util::params::parse(
            "type = \"loiter\"\n\
             radius_m = 80.0\n\
             direction = \"counter_clockwise\"\n\
             [center]\n\
             lat_deg = 47.0\n\
             lon_deg = 8.0\n"
        ).unwrap();

        assert_eq!(cmd, PathCmd::Loiter {
            center: GeoPoint::new(47.0, 8.0),
            radius_m: 80.0,
            direction: LoiterDirection::CounterClockwise
        });
        assert_eq!(cmd.kind_name(), "loiter");
    }
}
