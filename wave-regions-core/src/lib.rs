//! Time-ranged regions on a one-dimensional timeline.
//!
//! Everything here is host-agnostic: pointer samples come in as plain
//! coordinates, timers go out through [`scheduler::TaskScheduler`], and the
//! host player is reached through [`regions::HostPlayer`]. The browser
//! binding lives in the `wave-regions` crate.

pub mod autoscroll;
pub mod collection;
pub mod config;
pub mod error;
pub mod events;
pub mod gesture;
pub mod overlap;
pub mod overlay;
pub mod playback;
pub mod position;
pub mod region;
pub mod regions;
pub mod scheduler;

pub use config::RegionsConfig;
pub use error::RegionError;
pub use events::RegionEvent;
pub use position::DragSide;
pub use region::{Channel, Region, RegionId, RegionParams, RegionUpdate};
pub use regions::{HostPlayer, Regions};
