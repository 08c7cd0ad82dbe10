use crate::error::{Error, Result};

use geo::{LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A WGS84 position. Range is only checked by `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn validate(&self) -> Result<Self> {
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::PreconditionViolation(format!(
                "coordinate out of range: lat {}, lng {}",
                self.lat, self.lng
            )));
        }
        Ok(*self)
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::coord! { x: c.lng, y: c.lat }
    }
}

/// Axis-aligned box in degrees, (west, south, east, north)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: Coordinate) -> bool {
        point.lng >= self.west
            && point.lng <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }
}

/// Region reachable within a travel-time budget, as the shells of zero or
/// more polygons. Shells need not repeat their first vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReachableArea {
    pub shells: Vec<Vec<Coordinate>>,
}

impl ReachableArea {
    pub fn new(shells: Vec<Vec<Coordinate>>) -> Self {
        Self { shells }
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    /// geo closes each ring on construction
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(
            self.shells
                .iter()
                .map(|shell| {
                    let ring: LineString<f64> =
                        shell.iter().map(|&c| geo::Coord::from(c)).collect();
                    Polygon::new(ring, vec![])
                })
                .collect(),
        )
    }
}

/// A named point of interest. Two POIs are the same only when name,
/// latitude and longitude match exactly (bitwise on the floats).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Poi {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

impl PartialEq for Poi {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.lat.to_bits() == other.lat.to_bits()
            && self.lng.to_bits() == other.lng.to_bits()
    }
}

impl Eq for Poi {}

impl Hash for Poi {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.lat.to_bits().hash(state);
        self.lng.to_bits().hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub polyline: Vec<Coordinate>,
    pub directions: Vec<String>,
    pub duration_seconds: i64,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportMode {
    PublicTransport,
    Driving,
    Ferry,
    Walking,
    Cycling,
    DrivingTrain,
    CyclingPublicTransport,
}

impl TransportMode {
    pub const ALL: [TransportMode; 7] = [
        TransportMode::PublicTransport,
        TransportMode::Driving,
        TransportMode::Ferry,
        TransportMode::Walking,
        TransportMode::Cycling,
        TransportMode::DrivingTrain,
        TransportMode::CyclingPublicTransport,
    ];

    /// Value of `transportation.type` in TravelTime requests
    pub fn wire_type(self) -> &'static str {
        match self {
            TransportMode::PublicTransport => "public_transport",
            TransportMode::Driving => "driving",
            TransportMode::Ferry => "ferry",
            TransportMode::Walking => "walking",
            TransportMode::Cycling => "cycling",
            TransportMode::DrivingTrain => "driving+train",
            TransportMode::CyclingPublicTransport => "cycling+public_transport",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TransportMode::PublicTransport => "PublicTransport",
            TransportMode::Driving => "Driving",
            TransportMode::Ferry => "Ferry",
            TransportMode::Walking => "Walking",
            TransportMode::Cycling => "Cycling",
            TransportMode::DrivingTrain => "DrivingTrain",
            TransportMode::CyclingPublicTransport => "CyclingPublicTransport",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    /// Accepts both the display names and the wire names
    fn from_str(s: &str) -> Result<Self> {
        TransportMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s || mode.wire_type() == s)
            .ok_or_else(|| {
                Error::PreconditionViolation(format!("Unknown transport mode: {}", s))
            })
    }
}
