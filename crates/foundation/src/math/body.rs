//! Reference radii for celestial bodies.

/// Lunar reference radius (meters) used by the LOLA elevation products.
pub const MOON_RADIUS_M: f64 = 1_737_400.0;
/// Depth of the lowest point in the LOLA global topography below the reference radius.
pub const MOON_LOLA_MIN_OFFSET_M: f64 = 18_250.0;
/// Height of the highest point in the LOLA global topography above the reference radius.
pub const MOON_LOLA_MAX_OFFSET_M: f64 = 21_546.0;
