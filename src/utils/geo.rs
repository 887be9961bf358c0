/// Earth radius in meters, as used by the mobile clients.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates (haversine), in meters.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Whether a point lies inside a circular geofence. The boundary itself
/// counts as inside.
pub fn is_within_radius(lat: f64, lon: f64, center_lat: f64, center_lon: f64, radius_m: f64) -> bool {
    distance_meters(lat, lon, center_lat, center_lon) <= radius_m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        assert_eq!(distance_meters(23.8103, 90.4125, 23.8103, 90.4125), 0.0);
    }

    #[test]
    fn known_distance_one_degree_latitude() {
        // One degree of latitude is ~111.19 km on the 6371 km sphere.
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.9).abs() < 10.0, "got {d}");
    }

    #[test]
    fn boundary_point_is_inside() {
        // Pick a point, measure its actual distance, then use exactly that
        // distance as the radius.
        let d = distance_meters(23.8103, 90.4125, 23.8110, 90.4125);
        assert!(is_within_radius(23.8110, 90.4125, 23.8103, 90.4125, d));
        assert!(!is_within_radius(
            23.8110, 90.4125, 23.8103, 90.4125,
            d - 0.001
        ));
    }

    #[test]
    fn outside_radius_plus_epsilon() {
        // ~77.8m between these two points
        let d = distance_meters(23.8103, 90.4125, 23.8110, 90.4125);
        assert!(d > 50.0 && d < 100.0, "sanity: {d}");
        assert!(!is_within_radius(23.8103, 90.4125, 23.8110, 90.4125, 50.0));
        assert!(is_within_radius(23.8103, 90.4125, 23.8110, 90.4125, 100.0));
    }
}
