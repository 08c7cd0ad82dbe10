use crate::error::{Error, Result};
use crate::types::{BoundingBox, Poi};

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Name given to features without a `name` tag
pub const UNNAMED: &str = "Unnamed";

const TOURISM_FILTER: &str = "[\"tourism\"~\"attraction|museum|viewpoint|monument|artwork\"]";
const HISTORIC_FILTER: &str = "[\"historic\"]";

/// Anything that can list POIs inside a bounding box
#[allow(async_fn_in_trait)]
pub trait PoiSource {
    async fn query(&self, bbox: BoundingBox) -> Result<Vec<Poi>>;
}

// Overpass wants (south,west,north,east)
fn bbox_clause(bbox: &BoundingBox) -> String {
    format!("({},{},{},{})", bbox.south, bbox.west, bbox.north, bbox.east)
}

/// Tourist attractions and historic features of every element type inside
/// `bbox`. Ways and relations are reported with their center.
pub fn create_overpass_query(bbox: &BoundingBox) -> String {
    let b = &bbox_clause(bbox);
    let statements = [TOURISM_FILTER, HISTORIC_FILTER]
        .iter()
        .flat_map(|filter| {
            ["node", "way", "rel"]
                .iter()
                .map(move |kind| format!("{}{}{};", kind, filter, b))
        })
        .collect::<Vec<_>>()
        .join("");
    format!("[out:json][timeout:25];({});out center;", statements)
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    fn coordinates(&self) -> Option<(f64, f64)> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Some((lat, lon));
        }
        self.center.as_ref().map(|c| (c.lat, c.lon))
    }

    fn into_poi(self) -> Option<Poi> {
        let (lat, lon) = self.coordinates()?;
        let name = self
            .tags
            .get("name")
            .cloned()
            .unwrap_or_else(|| UNNAMED.to_string());
        Some(Poi::new(name, lat, lon))
    }
}

/// Turn an Overpass JSON body into POIs, silently skipping elements that
/// carry no position
pub fn parse_pois(body: &str) -> Result<Vec<Poi>> {
    let response: OverpassResponse = serde_json::from_str(body)?;
    let total = response.elements.len();
    let pois = response
        .elements
        .into_iter()
        .filter_map(OverpassElement::into_poi)
        .collect::<Vec<_>>();
    if pois.len() < total {
        debug!("Dropped {} elements without coordinates", total - pois.len());
    }
    Ok(pois)
}

/// POI source backed by an Overpass API endpoint. Every call goes to the
/// network.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OverpassClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reachable_poi/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn make_request(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Overpass request failed with status {}", status);
            return Err(Error::ServiceUnavailable(format!(
                "Overpass returned status {}",
                status
            )));
        }

        Ok(response.text().await?)
    }
}

impl PoiSource for OverpassClient {
    async fn query(&self, bbox: BoundingBox) -> Result<Vec<Poi>> {
        let query = create_overpass_query(&bbox);
        debug!("Querying Overpass for {:?}", bbox);
        let body = self.make_request(&query).await?;
        let pois = parse_pois(&body)?;
        debug!("Overpass returned {} POIs", pois.len());
        Ok(pois)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn query_covers_every_element_type_and_filter() {
        let bbox = BoundingBox {
            west: 13.3,
            south: 52.4,
            east: 13.5,
            north: 52.6,
        };
        let query = create_overpass_query(&bbox);

        assert!(query.starts_with("[out:json][timeout:25];("));
        assert!(query.ends_with(");out center;"));
        for kind in ["node", "way", "rel"] {
            assert!(query.contains(&format!(
                "{}[\"tourism\"~\"attraction|museum|viewpoint|monument|artwork\"](52.4,13.3,52.6,13.5);",
                kind
            )));
            assert!(query.contains(&format!("{}[\"historic\"](52.4,13.3,52.6,13.5);", kind)));
        }
    }

    #[test]
    fn parse_nodes_centers_and_missing_positions() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 52.5, "lon": 13.4, "tags": {"name": "Museum", "tourism": "museum"}},
                {"type": "way", "id": 2, "center": {"lat": 52.51, "lon": 13.41}, "tags": {"historic": "castle"}},
                {"type": "relation", "id": 3, "tags": {"name": "Nowhere"}},
                {"type": "node", "id": 4, "lat": 52.52, "lon": 13.42}
            ]
        }"#;
        let pois = parse_pois(body).unwrap();
        assert_eq!(
            pois,
            vec![
                Poi::new("Museum", 52.5, 13.4),
                Poi::new(UNNAMED, 52.51, 13.41),
                Poi::new(UNNAMED, 52.52, 13.42),
            ]
        );
    }

    #[test]
    fn parse_zero_coordinates_are_kept() {
        let body = r#"{"elements": [{"type": "node", "id": 1, "lat": 0.0, "lon": 0.0, "tags": {"name": "Null Island"}}]}"#;
        assert_eq!(parse_pois(body).unwrap(), vec![Poi::new("Null Island", 0.0, 0.0)]);
    }

    #[test]
    fn parse_without_elements_is_empty() {
        assert!(parse_pois("{}").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_malformed_payloads() {
        for body in ["<osm></osm>", "42", r#"{"elements": 5}"#, r#"{"elements": [{"lat": "north"}]}"#] {
            assert!(
                matches!(parse_pois(body), Err(Error::MalformedResponse(_))),
                "{}",
                body
            );
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_service_unavailable() {
        let client = OverpassClient::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
        let bbox = BoundingBox {
            west: 0.0,
            south: 0.0,
            east: 1.0,
            north: 1.0,
        };
        assert!(matches!(
            client.query(bbox).await,
            Err(Error::ServiceUnavailable(_))
        ));
    }
}
