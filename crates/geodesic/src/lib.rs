//! Ellipsoidal great-circle distance on WGS84.
//!
//! Implements Vincenty's inverse formula from scratch, consistent near the
//! poles and at large separations where a spherical haversine drifts by up
//! to 0.5%. Distances are geodesic arc lengths in meters.
//!
//! Coordinates are degrees; behavior is undefined for NaN inputs, callers
//! must pre-filter.

/// WGS84 semi-major axis (meters).
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters), a * (1 - f).
const WGS84_B: f64 = 6_356_752.314_245;

/// Convergence threshold for the longitude difference iteration (radians).
const CONVERGENCE: f64 = 1e-12;
/// Iteration cap; nearly antipodal pairs converge slowly.
const MAX_ITERATIONS: usize = 200;

/// Geodesic distance in meters between two points given in degrees.
pub fn inverse(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> f64 {
    let l = (lon1 - lon0).to_radians();
    let u1 = ((1.0 - WGS84_F) * lat0.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * lat1.to_radians().tan()).atan();

    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut sin_sigma = 0.0;
    let mut cos_sigma = 0.0;
    let mut sigma = 0.0;
    let mut cos_sq_alpha = 0.0;
    let mut cos_2sigma_m = 0.0;

    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points
            return 0.0;
        }
        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            // Both points on the equator
            0.0
        };

        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - lambda_prev).abs() < CONVERGENCE {
            break;
        }
    }

    let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = b
        * sin_sigma
        * (cos_2sigma_m
            + b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

    WGS84_B * a * (sigma - delta_sigma)
}

/// Distances in meters from one point to arrays of points.
///
/// `lons` and `lats` must have equal length; output preserves order.
pub fn distances(lon0: f64, lat0: f64, lons: &[f64], lats: &[f64]) -> Vec<f64> {
    debug_assert_eq!(lons.len(), lats.len());
    lons.iter()
        .zip(lats.iter())
        .map(|(&lon, &lat)| inverse(lon0, lat0, lon, lat))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coincident_points() {
        assert_eq!(inverse(-126.0, 34.0, -126.0, 34.0), 0.0);
    }

    #[test]
    fn test_one_degree_latitude_at_equator() {
        // Meridian arc of 1 degree from the equator: 110574.4 m on WGS84
        let d = inverse(0.0, 0.0, 0.0, 1.0);
        assert!((d - 110_574.4).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        // Equatorial arc of 1 degree: 111319.5 m on WGS84
        let d = inverse(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_319.5).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_meridian_convergence() {
        // A degree of longitude shrinks with cos(lat)
        let d = inverse(0.0, 60.0, 1.0, 60.0);
        assert!(d < 60_000.0, "got {d}");
        assert!(d > 50_000.0, "got {d}");
    }

    #[test]
    fn test_symmetry() {
        let d0 = inverse(-126.0, 34.0, -126.1, 34.2);
        let d1 = inverse(-126.1, 34.2, -126.0, 34.0);
        assert!((d0 - d1).abs() < 1e-6);
    }

    #[test]
    fn test_antimeridian_crossing() {
        // 179.5E to 179.5W is one degree apart, not 359
        let d = inverse(179.5, 0.0, -179.5, 0.0);
        assert!((d - 111_319.5).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_near_pole() {
        let d = inverse(0.0, 89.9, 180.0, 89.9);
        // Two points straddling the pole, roughly 0.2 degrees of arc apart
        assert!(d < 25_000.0, "got {d}");
        assert!(d > 20_000.0, "got {d}");
    }

    #[test]
    fn test_vectorized_matches_scalar() {
        let lons = [-126.0, -126.5, 38.0];
        let lats = [34.0, 34.5, -18.0];
        let out = distances(-126.81, 35.6, &lons, &lats);
        assert_eq!(out.len(), 3);
        for (i, d) in out.iter().enumerate() {
            assert_eq!(*d, inverse(-126.81, 35.6, lons[i], lats[i]));
        }
    }
}
