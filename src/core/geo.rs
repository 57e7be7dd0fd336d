// Great-circle distance and the two alert radius checks.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default radius of the nearby tier, in kilometers.
pub const NEARBY_RADIUS_KM: f64 = 5.0;

/// Default radius of the proximity tier, in meters.
pub const PROXIMITY_RADIUS_M: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearbyCheck {
    pub is_nearby: bool,
    pub distance_km: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityCheck {
    pub is_in_proximity: bool,
    pub distance_meters: f64,
}

/// Haversine distance between two points given in degrees.
/// NaN inputs yield NaN.
pub fn haversine_distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + lat1.to_radians().cos()
            * lat2.to_radians().cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

pub fn classify_nearby(distance_meters: f64) -> NearbyCheck {
    classify_nearby_within(distance_meters, NEARBY_RADIUS_KM)
}

pub fn classify_nearby_within(distance_meters: f64, radius_km: f64) -> NearbyCheck {
    let distance_km = distance_meters / 1000.0;
    NearbyCheck {
        is_nearby: distance_km <= radius_km,
        distance_km,
    }
}

pub fn classify_proximity(distance_meters: f64) -> ProximityCheck {
    classify_proximity_within(distance_meters, PROXIMITY_RADIUS_M)
}

pub fn classify_proximity_within(distance_meters: f64, radius_m: f64) -> ProximityCheck {
    ProximityCheck {
        is_in_proximity: distance_meters <= radius_m,
        distance_meters,
    }
}
