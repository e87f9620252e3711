use std::f64::consts::PI;

use super::Vec3;

/// Equirectangular texture coordinate, both components normalised to `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TexCoord {
    pub lat: f64,
    pub lon: f64,
}

impl TexCoord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Project a direction onto normalised latitude/longitude.
///
/// Only the direction matters: points inside a mesh triangle (slightly below
/// the sphere) project the same way as their radial unit vector.
pub fn normalized_lat_lon(dir: Vec3) -> TexCoord {
    let lat = 0.5 + dir.z.atan2(dir.xy().magnitude()) / PI;
    let lon = 0.5 + dir.y.atan2(dir.x) / (2.0 * PI);
    debug_assert!((0.0..=1.0).contains(&lat), "latitude out of range: {lat}");
    debug_assert!((0.0..=1.0).contains(&lon), "longitude out of range: {lon}");
    TexCoord::new(lat, lon)
}
