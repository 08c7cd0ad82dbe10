use crate::error::{Error, Result};
use crate::types::{Coordinate, Poi, ReachableArea, RouteResult, TransportMode};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What a front end remembers between user actions. The core never reads
/// or writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub origin_a: Coordinate,
    pub origin_b: Coordinate,
    pub mode: TransportMode,
    pub area: Option<ReachableArea>,
    pub pois: Vec<Poi>,
    pub route: Option<RouteResult>,
    pub trip_summary: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        // Berlin
        Self {
            origin_a: Coordinate::new(52.52, 13.405),
            origin_b: Coordinate::new(52.50, 13.40),
            mode: TransportMode::PublicTransport,
            area: None,
            pois: vec![],
            route: None,
            trip_summary: None,
        }
    }
}

impl AppState {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read state {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse state {}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize state: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write state {}: {}", path.display(), e)))
    }

    /// Drops everything computed from the previous origins
    pub fn clear_results(&mut self) {
        self.area = None;
        self.pois.clear();
        self.clear_route();
    }

    pub fn clear_route(&mut self) {
        self.route = None;
        self.trip_summary = None;
    }

    pub fn set_origin_a(&mut self, origin: Coordinate) {
        if origin != self.origin_a {
            self.origin_a = origin;
            self.clear_results();
        }
    }

    pub fn set_origin_b(&mut self, origin: Coordinate) {
        if origin != self.origin_b {
            self.origin_b = origin;
            self.clear_results();
        }
    }

    pub fn record_area(&mut self, mode: TransportMode, area: ReachableArea, pois: Vec<Poi>) {
        self.mode = mode;
        self.area = Some(area);
        self.pois = pois;
        self.clear_route();
    }

    pub fn record_route(&mut self, poi: &Poi, route: RouteResult) {
        self.trip_summary = Some(trip_summary(&poi.name, &route));
        self.route = Some(route);
    }

    /// 1-based, as listed to the user
    pub fn poi(&self, number: usize) -> Result<&Poi> {
        number
            .checked_sub(1)
            .and_then(|i| self.pois.get(i))
            .ok_or_else(|| {
                Error::PreconditionViolation(format!(
                    "no POI number {} ({} known)",
                    number,
                    self.pois.len()
                ))
            })
    }
}

pub fn trip_summary(name: &str, route: &RouteResult) -> String {
    let minutes = route.duration_seconds / 60;
    match route.distance_km {
        Some(km) => format!("{} → {} min, {:.2} km", name, minutes, km),
        None => format!("{} → {} min, ? km", name, minutes),
    }
}
