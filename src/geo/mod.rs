//! Solar window calculations.
//!
//! - [`window`]: dawn/dusk computation for the configured coordinates
//! - [`display`]: operator-facing formatting of a computed window
//!
//! All cameras in a run share one window, which assumes they observe the same
//! location.

pub mod display;
pub mod window;

pub use display::log_window_details;
pub use window::{SolarWindowCalculator, Twilight, Window, compute_window};
