use crate::cache::CachedPoiSource;
use crate::config::Config;
use crate::error::Result;
use crate::overpass::OverpassClient;
use crate::resolver;
use crate::traveltime::{self, TravelTimeClient};
use crate::types::{Coordinate, Poi, ReachableArea, RouteResult, TransportMode};

use chrono::{DateTime, FixedOffset};
use tracing::info;

/// Clients wired from a `Config`, exposing the three user actions
pub struct Explorer {
    traveltime: TravelTimeClient,
    pois: CachedPoiSource<OverpassClient>,
    max_pois: usize,
}

impl Explorer {
    pub fn new(config: &Config) -> Result<Self> {
        let traveltime = TravelTimeClient::new(&config.traveltime, config.timeout())?;
        let overpass = OverpassClient::new(config.overpass.endpoint.clone(), config.timeout())?;
        Ok(Self {
            traveltime,
            pois: CachedPoiSource::new(overpass, config.cache_capacity),
            max_pois: config.max_pois,
        })
    }

    /// Area reachable from `origin` and a sample of POIs inside it
    pub async fn reachable_pois(
        &self,
        origin: Coordinate,
        mode: TransportMode,
        minutes: u32,
        depart_at: &DateTime<FixedOffset>,
    ) -> Result<(ReachableArea, Vec<Poi>)> {
        let origin = origin.validate()?;
        info!("Reachable area from {:?} by {} in {} min", origin, mode, minutes);
        let area = self
            .traveltime
            .reachable_area(origin, mode, minutes, depart_at)
            .await?;
        let pois = resolver::resolve(&area, &self.pois, self.max_pois).await?;
        Ok((area, pois))
    }

    /// Area reachable from both origins and a sample of POIs inside it
    pub async fn common_pois(
        &self,
        a: Coordinate,
        b: Coordinate,
        mode: TransportMode,
        minutes: u32,
        depart_at: &DateTime<FixedOffset>,
    ) -> Result<(ReachableArea, Vec<Poi>)> {
        let (a, b) = (a.validate()?, b.validate()?);
        info!("Common area of {:?} and {:?} by {} in {} min", a, b, mode, minutes);
        traveltime::common_pois(
            &self.traveltime,
            &self.pois,
            a,
            b,
            mode,
            minutes,
            depart_at,
            self.max_pois,
        )
        .await
    }

    pub async fn route_to(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Result<RouteResult> {
        self.traveltime
            .route(origin.validate()?, destination.validate()?, mode)
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    // Nothing listens on the discard port, any request that gets out fails
    fn offline_explorer() -> Explorer {
        let mut config = Config::default();
        config.traveltime.base_url = "http://127.0.0.1:9/v4".to_string();
        config.traveltime.app_id = Some("id".to_string());
        config.traveltime.api_key = Some("key".to_string());
        config.overpass.endpoint = "http://127.0.0.1:9/api/interpreter".to_string();
        config.timeout_secs = 2;
        Explorer::new(&config).unwrap()
    }

    fn depart() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-05-01T09:30:00+02:00").unwrap()
    }

    #[test]
    fn missing_credentials_fail_setup() {
        assert!(matches!(
            Explorer::new(&Config::default()),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn out_of_range_origins_are_rejected_before_any_request() {
        let explorer = offline_explorer();
        let bad = Coordinate::new(95.0, 13.4);
        let good = Coordinate::new(52.52, 13.405);

        let result = explorer
            .reachable_pois(bad, TransportMode::Walking, 15, &depart())
            .await;
        assert!(matches!(result, Err(Error::PreconditionViolation(_))));

        let result = explorer
            .common_pois(good, bad, TransportMode::Walking, 15, &depart())
            .await;
        assert!(matches!(result, Err(Error::PreconditionViolation(_))));

        let result = explorer
            .route_to(good, Coordinate::new(52.5, 200.0), TransportMode::Walking)
            .await;
        assert!(matches!(result, Err(Error::PreconditionViolation(_))));
    }

    #[tokio::test]
    async fn oversized_budget_is_rejected_before_any_request() {
        let explorer = offline_explorer();
        let result = explorer
            .reachable_pois(
                Coordinate::new(52.52, 13.405),
                TransportMode::Driving,
                u32::MAX,
                &depart(),
            )
            .await;
        assert!(matches!(result, Err(Error::PreconditionViolation(_))));
    }

    #[tokio::test]
    async fn valid_input_reaches_the_network() {
        let explorer = offline_explorer();
        let result = explorer
            .reachable_pois(
                Coordinate::new(52.52, 13.405),
                TransportMode::Walking,
                15,
                &depart(),
            )
            .await;
        assert!(matches!(result, Err(Error::ServiceUnavailable(_))));
    }
}
