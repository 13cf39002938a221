use crate::models::location::{GeoLocation, GeoPoint};

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Stable sort by distance from `origin`; ties keep their input order.
pub fn sort_by_distance<T, F>(items: &mut [T], origin: &GeoPoint, location_of: F)
where
    F: Fn(&T) -> &GeoLocation,
{
    items.sort_by(|a, b| {
        let da = haversine_km(origin, &location_of(a).point());
        let db = haversine_km(origin, &location_of(b).point());
        da.total_cmp(&db)
    });
}
