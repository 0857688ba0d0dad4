//! Presentation Aggregation
//!
//! Groups parsed records by beacon and turns them into drawable layers:
//! palette colour per beacon, simplified path, and markers shaded by signal
//! intensity.

mod color;
mod intensity;
mod path;
mod session;

pub use color::{default_palette, palette_color, Rgb, DEFAULT_PALETTE};
pub use intensity::{Thresholds, DEFAULT_HIGH, DEFAULT_LOW};
pub use path::{downsample, stride_for};
pub use session::{BeaconLayer, BeaconSeries, CapPolicy, MapSession};

/// Default maximum number of points drawn (or stored) per beacon
pub const DEFAULT_MAX_POINTS_PER_BEACON: usize = 3000;
