//! Points of interest inside the area reachable from one or two origins.
//!
//! Reachable areas and routes come from the TravelTime API, POIs from
//! OpenStreetMap through Overpass. `resolver` filters the POIs down to the
//! ones truly inside the (possibly concave or disconnected) area.

pub mod cache;
pub mod config;
pub mod error;
pub mod explorer;
pub mod geometry;
pub mod overpass;
pub mod resolver;
pub mod session;
pub mod traveltime;
pub mod types;

#[cfg(feature = "python")]
mod python;

pub use error::{Error, Result};
pub use explorer::Explorer;
pub use overpass::PoiSource;
pub use types::{BoundingBox, Coordinate, Poi, ReachableArea, RouteResult, TransportMode};
