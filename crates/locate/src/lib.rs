//! Surface location: combine a ray cast with rule-based hit filtering.
//!
//! # Invariants
//! - Without a target validity rule only the nearest hit is considered.
//! - `surface_located` fires only when the resolved position moved by more
//!   than [`POSITION_EPSILON`], unless position changes are not required.

mod config;
mod locator;

pub use config::{LocatorConfigError, SurfaceLocatorConfig};
pub use locator::{POSITION_EPSILON, SurfaceData, SurfaceLocator};

pub fn crate_info() -> &'static str {
    "vrkit-locate v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("locate"));
    }
}
