use crate::error::{Error, Result};
use crate::types::{BoundingBox, Coordinate, ReachableArea};

use geo::{Contains, MultiPolygon, Point};
use geojson::{GeoJson, Geometry, Value};

/// Smallest box enclosing every vertex of `shell`.
///
/// An empty shell has no defined box and is rejected rather than producing
/// infinite or NaN bounds.
pub fn bounding_box(shell: &[Coordinate]) -> Result<BoundingBox> {
    let first = shell.first().ok_or_else(|| {
        Error::PreconditionViolation("bounding box of an empty polygon".to_string())
    })?;

    let init = BoundingBox {
        west: first.lng,
        south: first.lat,
        east: first.lng,
        north: first.lat,
    };

    Ok(shell.iter().skip(1).fold(init, |bbox, c| BoundingBox {
        west: bbox.west.min(c.lng),
        south: bbox.south.min(c.lat),
        east: bbox.east.max(c.lng),
        north: bbox.north.max(c.lat),
    }))
}

/// Whether `point` lies strictly inside any polygon of `region`.
///
/// Points exactly on an edge or a vertex are NOT contained.
pub fn contains(region: &ReachableArea, point: Coordinate) -> bool {
    multi_polygon_contains(&region.to_multi_polygon(), point)
}

/// `contains` against an already built multipolygon, for callers testing
/// many points against one region
pub fn multi_polygon_contains(region: &MultiPolygon<f64>, point: Coordinate) -> bool {
    let point = Point::new(point.lng, point.lat);
    region.0.iter().any(|polygon| polygon.contains(&point))
}

fn ring_positions(shell: &[Coordinate]) -> Vec<Vec<f64>> {
    let mut ring = shell.iter().map(|c| vec![c.lng, c.lat]).collect::<Vec<_>>();
    if let (Some(first), Some(last)) = (ring.first().cloned(), ring.last()) {
        if &first != last {
            ring.push(first);
        }
    }
    ring
}

/// Reachable area as a GeoJSON MultiPolygon, positions in (lng, lat) order
pub fn area_to_geojson(region: &ReachableArea) -> GeoJson {
    let polygons = region
        .shells
        .iter()
        .map(|shell| vec![ring_positions(shell)])
        .collect::<Vec<_>>();

    GeoJson::Geometry(Geometry::new(Value::MultiPolygon(polygons)))
}

pub fn area_to_geojson_string(region: &ReachableArea) -> String {
    area_to_geojson(region).to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    fn square() -> Vec<Coordinate> {
        // (lng, lat) pairs (0,0) (0,1) (1,1) (1,0)
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 1.0),
        ]
    }

    fn concave() -> Vec<Coordinate> {
        // U shape opening to the north
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 3.0),
            Coordinate::new(3.0, 3.0),
            Coordinate::new(3.0, 2.0),
            Coordinate::new(1.0, 2.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(3.0, 1.0),
            Coordinate::new(3.0, 0.0),
        ]
    }

    #[test]
    fn bounding_box_encloses_every_vertex() {
        for shell in [square(), concave()] {
            let bbox = bounding_box(&shell).unwrap();
            for c in &shell {
                assert!(bbox.contains(*c), "{:?} outside {:?}", c, bbox);
            }
        }

        let bbox = bounding_box(&concave()).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                west: 0.0,
                south: 0.0,
                east: 3.0,
                north: 3.0
            }
        );
    }

    #[test]
    fn bounding_box_of_single_vertex_is_degenerate() {
        let bbox = bounding_box(&[Coordinate::new(10.0, 20.0)]).unwrap();
        assert_eq!(bbox.west, bbox.east);
        assert_eq!(bbox.south, bbox.north);
    }

    #[test]
    fn empty_shell_is_rejected() {
        assert!(matches!(
            bounding_box(&[]),
            Err(Error::PreconditionViolation(_))
        ));
    }

    #[test]
    fn contains_respects_concavity() {
        let region = ReachableArea::new(vec![concave()]);
        assert!(contains(&region, Coordinate::new(0.5, 0.5)));
        assert!(contains(&region, Coordinate::new(2.5, 0.5)));
        // the notch is inside the box but outside the polygon
        assert!(!contains(&region, Coordinate::new(2.0, 1.5)));
        assert!(!contains(&region, Coordinate::new(5.0, 5.0)));
    }

    #[test]
    fn contains_excludes_boundary() {
        let region = ReachableArea::new(vec![square()]);
        assert!(contains(&region, Coordinate::new(0.5, 0.5)));
        assert!(!contains(&region, Coordinate::new(0.0, 0.5)));
        assert!(!contains(&region, Coordinate::new(1.0, 1.0)));
    }

    #[test]
    fn contains_checks_every_part_of_a_disconnected_region() {
        let far = square()
            .into_iter()
            .map(|c| Coordinate::new(c.lat + 10.0, c.lng + 10.0))
            .collect();
        let region = ReachableArea::new(vec![square(), far]);
        assert!(contains(&region, Coordinate::new(10.5, 10.5)));
        assert!(contains(&region, Coordinate::new(0.5, 0.5)));
        assert!(!contains(&region, Coordinate::new(5.0, 5.0)));
        assert!(!contains(&ReachableArea::default(), Coordinate::new(0.5, 0.5)));
    }

    #[test]
    fn contained_points_lie_in_some_bounding_box() {
        let region = ReachableArea::new(vec![concave(), square()]);
        let boxes = region
            .shells
            .iter()
            .map(|s| bounding_box(s).unwrap())
            .collect::<Vec<_>>();
        for i in -10..40 {
            for j in -10..40 {
                let p = Coordinate::new(i as f64 * 0.1, j as f64 * 0.1);
                if contains(&region, p) {
                    assert!(boxes.iter().any(|b| b.contains(p)));
                }
            }
        }
    }

    #[test]
    fn geojson_uses_lng_lat_and_closes_rings() {
        let region = ReachableArea::new(vec![vec![
            Coordinate::new(52.0, 13.0),
            Coordinate::new(52.0, 14.0),
            Coordinate::new(53.0, 14.0),
        ]]);
        match area_to_geojson(&region) {
            GeoJson::Geometry(Geometry {
                value: Value::MultiPolygon(polygons),
                ..
            }) => {
                let ring = &polygons[0][0];
                assert_eq!(ring.len(), 4);
                assert_eq!(ring[0], vec![13.0, 52.0]);
                assert_eq!(ring[0], ring[3]);
            }
            other => panic!("unexpected geojson {:?}", other),
        }
        assert!(area_to_geojson_string(&region).contains("\"MultiPolygon\""));
    }
}
