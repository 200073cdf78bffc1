pub mod geodesy;

pub use geodesy::{destination, haversine_distance, EARTH_RADIUS_M};
