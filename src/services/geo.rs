pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = |deg: f64| deg.to_radians();
    let dlat = to_rad(lat2 - lat1);
    let dlon = to_rad(lon2 - lon1);
    let a = (dlat / 2.0).sin().powi(2)
        + to_rad(lat1).cos() * to_rad(lat2).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    6371.0 * c
}

/// (min_lat, max_lat, min_lon, max_lon) around a center; a cheap SQL prefilter.
pub fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> (f64, f64, f64, f64) {
    let lat_change = radius_km / 111.0;
    let lat_rad = lat.to_radians();
    let lon_change = (radius_km / 111.0) / lat_rad.cos().abs().max(0.01);

    (
        lat - lat_change,
        lat + lat_change,
        lon - lon_change,
        lon + lon_change,
    )
}

pub fn sort_by_distance<T>(items: &mut [T], distance: impl Fn(&T) -> Option<f64>) {
    items.sort_by(|a, b| {
        distance(a)
            .unwrap_or(f64::MAX)
            .partial_cmp(&distance(b).unwrap_or(f64::MAX))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paris_to_lyon_is_about_392_km() {
        let d = haversine_km(48.8566, 2.3522, 45.7640, 4.8357);
        assert!((d - 392.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn bounding_box_contains_center() {
        let (min_lat, max_lat, min_lon, max_lon) = bounding_box(48.8566, 2.3522, 10.0);
        assert!(min_lat < 48.8566 && 48.8566 < max_lat);
        assert!(min_lon < 2.3522 && 2.3522 < max_lon);
    }
}
