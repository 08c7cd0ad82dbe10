use crate::config::TravelTimeConfig;
use crate::error::{Error, Result};
use crate::overpass::PoiSource;
use crate::resolver;
use crate::types::{Coordinate, Poi, ReachableArea, RouteResult, TransportMode};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.traveltimeapp.com/v4";

const AREA_ID: &str = "area";
const SEARCH_A_ID: &str = "A";
const SEARCH_B_ID: &str = "B";
const INTERSECTION_ID: &str = "AB";
const ROUTE_ID: &str = "route";
const START_LOCATION_ID: &str = "start";
const POI_LOCATION_ID: &str = "poi";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WireCoords {
    lat: f64,
    lng: f64,
}

impl From<Coordinate> for WireCoords {
    fn from(c: Coordinate) -> Self {
        Self { lat: c.lat, lng: c.lng }
    }
}

impl From<WireCoords> for Coordinate {
    fn from(c: WireCoords) -> Self {
        Coordinate::new(c.lat, c.lng)
    }
}

#[derive(Debug, Serialize)]
struct Transportation {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl From<TransportMode> for Transportation {
    fn from(mode: TransportMode) -> Self {
        Self {
            kind: mode.wire_type(),
        }
    }
}

// time-map request

#[derive(Debug, Serialize)]
struct DepartureSearch {
    id: &'static str,
    coords: WireCoords,
    transportation: Transportation,
    departure_time: String,
    travel_time: u32,
}

#[derive(Debug, Serialize)]
struct Intersection {
    id: &'static str,
    search_ids: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct TimeMapRequest {
    departure_searches: Vec<DepartureSearch>,
    arrival_searches: Vec<()>,
    unions: Vec<()>,
    intersections: Vec<Intersection>,
}

// time-map response

#[derive(Debug, Deserialize)]
struct TimeMapResponse {
    results: Vec<TimeMapResult>,
}

#[derive(Debug, Deserialize)]
struct TimeMapResult {
    search_id: String,
    #[serde(default)]
    shapes: Vec<Shape>,
}

#[derive(Debug, Deserialize)]
struct Shape {
    shell: Vec<WireCoords>,
}

// routes request

#[derive(Debug, Serialize)]
struct Location {
    id: &'static str,
    coords: WireCoords,
}

#[derive(Debug, Serialize)]
struct RouteSearch {
    id: &'static str,
    departure_location_id: &'static str,
    arrival_location_ids: Vec<&'static str>,
    transportation: Transportation,
    departure_time: String,
    properties: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct RoutesRequest {
    locations: Vec<Location>,
    departure_searches: Vec<RouteSearch>,
    arrival_searches: Vec<()>,
}

// routes response

#[derive(Debug, Deserialize)]
struct RoutesResponse {
    results: Vec<RoutesResult>,
}

#[derive(Debug, Deserialize)]
struct RoutesResult {
    #[serde(default)]
    locations: Vec<RouteLocation>,
}

#[derive(Debug, Deserialize)]
struct RouteLocation {
    #[serde(default)]
    properties: Vec<RouteProperties>,
}

#[derive(Debug, Deserialize)]
struct RouteProperties {
    travel_time: Option<i64>,
    distance: Option<f64>,
    route: Option<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    parts: Vec<RoutePart>,
}

#[derive(Debug, Deserialize)]
struct RoutePart {
    #[serde(default)]
    directions: Option<String>,
    #[serde(default)]
    coords: Vec<WireCoords>,
}

fn departure_search(
    id: &'static str,
    origin: Coordinate,
    mode: TransportMode,
    minutes: u32,
    depart_at: &DateTime<FixedOffset>,
) -> Result<DepartureSearch> {
    let travel_time = minutes.checked_mul(60).ok_or_else(|| {
        Error::PreconditionViolation(format!("travel time of {} minutes is too large", minutes))
    })?;
    Ok(DepartureSearch {
        id,
        coords: origin.into(),
        transportation: mode.into(),
        departure_time: depart_at.to_rfc3339(),
        travel_time,
    })
}

/// Shapes of the result tagged `search_id`. A missing tag is an error, not
/// an empty area.
pub fn parse_time_map(body: &str, search_id: &str) -> Result<ReachableArea> {
    let response: TimeMapResponse = serde_json::from_str(body)?;
    let result = response
        .results
        .into_iter()
        .find(|r| r.search_id == search_id)
        .ok_or_else(|| Error::NotFound(format!("no time-map result with id {}", search_id)))?;

    Ok(ReachableArea::new(
        result
            .shapes
            .into_iter()
            .map(|shape| shape.shell.into_iter().map(Coordinate::from).collect())
            .collect(),
    ))
}

/// Polyline, non-empty directions, duration and distance of the first route
pub fn parse_route(body: &str) -> Result<RouteResult> {
    let response: RoutesResponse = serde_json::from_str(body)?;
    let properties = response
        .results
        .into_iter()
        .next()
        .and_then(|r| r.locations.into_iter().next())
        .and_then(|l| l.properties.into_iter().next())
        .ok_or_else(|| Error::NotFound("destination is not reachable".to_string()))?;

    let route = properties
        .route
        .ok_or_else(|| Error::NotFound("response has no route".to_string()))?;
    let duration_seconds = properties
        .travel_time
        .ok_or_else(|| Error::NotFound("response has no travel time".to_string()))?;

    let polyline = route
        .parts
        .iter()
        .flat_map(|part| part.coords.iter().copied().map(Coordinate::from))
        .collect();
    let directions = route
        .parts
        .into_iter()
        .filter_map(|part| part.directions)
        .filter(|d| !d.is_empty())
        .collect();

    Ok(RouteResult {
        polyline,
        directions,
        duration_seconds,
        distance_km: properties.distance.map(|m| m / 1000.0),
    })
}

/// Adapter for the TravelTime reachability and routing endpoints
#[derive(Debug, Clone)]
pub struct TravelTimeClient {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    api_key: String,
}

impl TravelTimeClient {
    pub fn new(config: &TravelTimeConfig, timeout: Duration) -> Result<Self> {
        let app_id = config
            .app_id
            .clone()
            .ok_or_else(|| Error::Config("missing TravelTime app id (APP_ID)".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("missing TravelTime api key (API_KEY)".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_id,
            api_key,
        })
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .header("X-Application-Id", &self.app_id)
            .header("X-Api-Key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("TravelTime {} failed with status {}: {}", path, status, detail);
            return Err(Error::ServiceUnavailable(format!(
                "TravelTime {} returned status {}",
                path, status
            )));
        }

        Ok(response.text().await?)
    }

    /// Area reachable from `origin` within `minutes`
    pub async fn reachable_area(
        &self,
        origin: Coordinate,
        mode: TransportMode,
        minutes: u32,
        depart_at: &DateTime<FixedOffset>,
    ) -> Result<ReachableArea> {
        let request = TimeMapRequest {
            departure_searches: vec![departure_search(AREA_ID, origin, mode, minutes, depart_at)?],
            arrival_searches: vec![],
            unions: vec![],
            intersections: vec![],
        };
        let body = self.post("time-map", &request).await?;
        let area = parse_time_map(&body, AREA_ID)?;
        debug!("Reachable area has {} polygons", area.shells.len());
        Ok(area)
    }

    /// Area reachable from both `a` and `b` within `minutes`
    pub async fn intersection_area(
        &self,
        a: Coordinate,
        b: Coordinate,
        mode: TransportMode,
        minutes: u32,
        depart_at: &DateTime<FixedOffset>,
    ) -> Result<ReachableArea> {
        let request = TimeMapRequest {
            departure_searches: vec![
                departure_search(SEARCH_A_ID, a, mode, minutes, depart_at)?,
                departure_search(SEARCH_B_ID, b, mode, minutes, depart_at)?,
            ],
            arrival_searches: vec![],
            unions: vec![],
            intersections: vec![Intersection {
                id: INTERSECTION_ID,
                search_ids: vec![SEARCH_A_ID, SEARCH_B_ID],
            }],
        };
        let body = self.post("time-map", &request).await?;
        let area = parse_time_map(&body, INTERSECTION_ID)?;
        debug!("Common area has {} polygons", area.shells.len());
        Ok(area)
    }

    /// Route from `origin` to `destination`, departing now
    pub async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Result<RouteResult> {
        let request = RoutesRequest {
            locations: vec![
                Location {
                    id: START_LOCATION_ID,
                    coords: origin.into(),
                },
                Location {
                    id: POI_LOCATION_ID,
                    coords: destination.into(),
                },
            ],
            departure_searches: vec![RouteSearch {
                id: ROUTE_ID,
                departure_location_id: START_LOCATION_ID,
                arrival_location_ids: vec![POI_LOCATION_ID],
                transportation: mode.into(),
                departure_time: Utc::now().to_rfc3339(),
                properties: vec!["travel_time", "distance", "route"],
            }],
            arrival_searches: vec![],
        };
        let body = self.post("routes", &request).await?;
        parse_route(&body)
    }
}

/// Common area of two origins and at most `max_count` POIs inside it
#[allow(clippy::too_many_arguments)]
pub async fn common_pois<S: PoiSource>(
    client: &TravelTimeClient,
    source: &S,
    a: Coordinate,
    b: Coordinate,
    mode: TransportMode,
    minutes: u32,
    depart_at: &DateTime<FixedOffset>,
    max_count: usize,
) -> Result<(ReachableArea, Vec<Poi>)> {
    let area = client
        .intersection_area(a, b, mode, minutes, depart_at)
        .await?;
    let pois = resolver::resolve(&area, source, max_count).await?;
    Ok((area, pois))
}
