use rz_api_types::Coordinates;

pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle distance in miles (Haversine).
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Short label for list rows, e.g. `0.4 mi`.
pub fn format_miles(miles: f64) -> String {
    if miles < 0.1 {
        "<0.1 mi".to_owned()
    } else if miles < 10.0 {
        format!("{miles:.1} mi")
    } else {
        format!("{miles:.0} mi")
    }
}
