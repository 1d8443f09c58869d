use proptest::prelude::*;
use qibla::alignment::accuracy_degrees;
use qibla::geo::{GeoCoordinate, cardinal_direction, compute_bearing, compute_distance_km, solve};

/// Generate valid latitude values
fn latitude_strategy() -> impl Strategy<Value = f64> {
    -90.0..=90.0
}

/// Generate valid longitude values
fn longitude_strategy() -> impl Strategy<Value = f64> {
    -180.0..=180.0
}

fn coordinate_strategy() -> impl Strategy<Value = GeoCoordinate> {
    (latitude_strategy(), longitude_strategy())
        .prop_map(|(lat, lon)| GeoCoordinate::new(lat, lon).unwrap())
}

fn angle_strategy() -> impl Strategy<Value = f64> {
    0.0..360.0
}

/// Half the Earth's circumference at the 6371 km mean radius
const MAX_DISTANCE_KM: u64 = 20_016;

#[cfg(test)]
mod bearing_tests {
    use super::*;

    proptest! {
        /// Bearings always land in [0, 360)
        #[test]
        fn test_bearing_range(origin in coordinate_strategy(), target in coordinate_strategy()) {
            let bearing = compute_bearing(origin, target);
            prop_assert!((0.0..360.0).contains(&bearing), "bearing {bearing} out of range");
        }

        /// Same inputs, same bits
        #[test]
        fn test_bearing_is_deterministic(origin in coordinate_strategy(), target in coordinate_strategy()) {
            let first = solve(origin, target);
            let second = solve(origin, target);
            prop_assert_eq!(first.bearing_degrees.to_bits(), second.bearing_degrees.to_bits());
            prop_assert_eq!(first.distance_km, second.distance_km);
        }

        /// Every bearing maps to one of the eight compass points
        #[test]
        fn test_cardinal_direction_total(bearing in angle_strategy()) {
            let direction = cardinal_direction(bearing);
            prop_assert!(["N", "NE", "E", "SE", "S", "SW", "W", "NW"].contains(&direction));
        }
    }
}

#[cfg(test)]
mod distance_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_distance_is_symmetric(a in coordinate_strategy(), b in coordinate_strategy()) {
            prop_assert_eq!(compute_distance_km(a, b), compute_distance_km(b, a));
        }

        #[test]
        fn test_distance_to_self_is_zero(point in coordinate_strategy()) {
            prop_assert_eq!(compute_distance_km(point, point), 0);
        }

        /// No two points are further apart than the antipode
        #[test]
        fn test_distance_is_bounded(a in coordinate_strategy(), b in coordinate_strategy()) {
            prop_assert!(compute_distance_km(a, b) <= MAX_DISTANCE_KM);
        }
    }
}

#[cfg(test)]
mod accuracy_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_accuracy_range(bearing in angle_strategy(), heading in angle_strategy()) {
            let accuracy = accuracy_degrees(bearing, heading);
            prop_assert!((0.0..=180.0).contains(&accuracy), "accuracy {accuracy} out of range");
        }

        #[test]
        fn test_accuracy_is_symmetric(bearing in angle_strategy(), heading in angle_strategy()) {
            prop_assert_eq!(accuracy_degrees(bearing, heading), accuracy_degrees(heading, bearing));
        }

        /// Facing the bearing exactly is perfect alignment
        #[test]
        fn test_accuracy_of_exact_heading(bearing in angle_strategy()) {
            prop_assert_eq!(accuracy_degrees(bearing, bearing), 0.0);
        }
    }
}
