// Degree-to-meters conversion on a spherical earth

use bevy::log::warn;

use crate::kernel_in::EARTH_RADIUS_METERS;

/// Local scale of one degree of latitude/longitude, meters, at some
/// latitude. Both factors zero means the conversion failed; callers
/// must abort geometry construction instead of dividing by zero later.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    pub meters_per_lat_degree: f64,
    pub meters_per_lon_degree: f64,
}

impl ScaleFactors {
    pub const FAILED: Self = Self {
        meters_per_lat_degree: 0.0,
        meters_per_lon_degree: 0.0,
    };

    pub fn is_usable(&self) -> bool {
        self.meters_per_lat_degree.is_finite()
            && self.meters_per_lon_degree.is_finite()
            && self.meters_per_lat_degree != 0.0
            && self.meters_per_lon_degree != 0.0
    }
}

/// One degree of latitude is a constant arc on the sphere; one degree
/// of longitude shrinks with cos(latitude) toward the poles.
pub fn scale_factors(latitude_degrees: f64) -> ScaleFactors {
    let circumference_at_equator = 2.0 * std::f64::consts::PI * EARTH_RADIUS_METERS;
    let meters_per_lat_degree = circumference_at_equator / 360.0;
    let meters_per_lon_degree =
        meters_per_lat_degree * (latitude_degrees * std::f64::consts::PI / 180.0).cos();

    if !meters_per_lat_degree.is_finite() || !meters_per_lon_degree.is_finite() {
        warn!("scale factors not finite at latitude {latitude_degrees}, conversion failed");
        return ScaleFactors::FAILED;
    }

    ScaleFactors {
        meters_per_lat_degree,
        meters_per_lon_degree,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lat_degree_is_constant() {
        // 2 * pi * 6_371_000 / 360
        for latitude in [-89.0, -45.0, 0.0, 12.34, 60.0, 89.0] {
            let factors = scale_factors(latitude);
            assert_relative_eq!(
                factors.meters_per_lat_degree,
                111_194.926,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn lon_degree_follows_cosine() {
        let equator = scale_factors(0.0);
        assert_relative_eq!(
            equator.meters_per_lon_degree,
            equator.meters_per_lat_degree,
            max_relative = 1e-12
        );

        for latitude in [10.0, 41.0, 66.5, 89.9] {
            let factors = scale_factors(latitude);
            let expected = factors.meters_per_lat_degree * latitude.to_radians().cos();
            assert_relative_eq!(factors.meters_per_lon_degree, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn lon_degree_shrinks_toward_the_poles() {
        let mut previous = f64::MAX;
        for latitude in [0.0, 15.0, 30.0, 45.0, 60.0, 75.0, 89.0] {
            let factors = scale_factors(latitude);
            assert!(factors.meters_per_lon_degree < previous);
            previous = factors.meters_per_lon_degree;
        }
        // approaching zero at the pole
        assert!(scale_factors(89.999).meters_per_lon_degree < 2.0);
    }

    #[test]
    fn pathological_latitude_reports_failure() {
        let factors = scale_factors(f64::NAN);
        assert_eq!(factors, ScaleFactors::FAILED);
        assert!(!factors.is_usable());

        assert!(scale_factors(41.0).is_usable());
    }
}
