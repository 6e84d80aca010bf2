//! Spherical geodesy for lon/lat grids
//!
//! Everything here works on a sphere of radius [`EARTH_RADIUS_KM`]: cell
//! areas for contour areas, great-circle distances for proximity rasters and
//! for the missing-data search radius of the sampler.
//!
//! Cell dimensions follow dx = R·cos(φ)·Δλ, dy = R·Δφ; cell area is the exact
//! spherical zone slice R²·Δλ·(sin φ_n − sin φ_s).

use molchan_core::GeoPoint;

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Total surface area of the sphere (km²), `4π·R²`
pub fn earth_area_km2() -> f64 {
    4.0 * std::f64::consts::PI * EARTH_RADIUS_KM * EARTH_RADIUS_KM
}

/// Area (km²) of a lon/lat cell bounded by two latitudes (degrees) and `d_lon` degrees wide
pub fn cell_area_km2(lat_north: f64, lat_south: f64, d_lon: f64) -> f64 {
    let north = lat_north.clamp(-90.0, 90.0).to_radians();
    let south = lat_south.clamp(-90.0, 90.0).to_radians();
    EARTH_RADIUS_KM * EARTH_RADIUS_KM * d_lon.abs().to_radians() * (north.sin() - south.sin()).abs()
}

/// Unit vector for a lon/lat position in degrees
#[inline]
pub fn to_unit_vector(p: GeoPoint) -> [f64; 3] {
    let lat = p.lat.to_radians();
    let lon = p.lon.to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Central angle (radians) between two unit vectors
#[inline]
pub fn central_angle(a: [f64; 3], b: [f64; 3]) -> f64 {
    // atan2 form stays accurate for nearly coincident and nearly antipodal points
    norm(cross(a, b)).atan2(dot(a, b))
}

/// Great-circle distance (km) between two lon/lat points
pub fn great_circle_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    EARTH_RADIUS_KM * central_angle(to_unit_vector(a), to_unit_vector(b))
}

/// Central angle (radians) from `p` to the shorter great-circle arc `a`–`b`
pub fn angle_to_arc(p: [f64; 3], a: [f64; 3], b: [f64; 3]) -> f64 {
    let endpoint = central_angle(p, a).min(central_angle(p, b));

    let n = cross(a, b);
    let n_len = norm(n);
    if n_len < 1e-12 {
        // Degenerate segment
        return endpoint;
    }
    let n = [n[0] / n_len, n[1] / n_len, n[2] / n_len];

    // Foot of the perpendicular from p onto the great circle through a and b
    let off = dot(p, n);
    let c = [p[0] - off * n[0], p[1] - off * n[1], p[2] - off * n[2]];
    if norm(c) < 1e-12 {
        // p is a pole of the circle: every point of the arc is 90° away
        return endpoint;
    }

    let within = dot(cross(a, c), n) >= 0.0 && dot(cross(c, b), n) >= 0.0;
    if within {
        central_angle(p, c).min(endpoint)
    } else {
        endpoint
    }
}
