use crate::config::Config;
use crate::error::Error;
use crate::explorer::Explorer;
use crate::geometry;
use crate::types::{Coordinate, Poi, TransportMode};

use chrono::{DateTime, FixedOffset, Local};
use pyo3::exceptions::{PyLookupError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::path::Path;

type PyPoi = (String, f64, f64);

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        match err {
            Error::PreconditionViolation(_) | Error::Config(_) => {
                PyValueError::new_err(err.to_string())
            }
            Error::NotFound(_) => PyLookupError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

fn explorer(config_path: Option<String>) -> PyResult<Explorer> {
    let config = Config::load(config_path.as_deref().map(Path::new))?;
    Ok(Explorer::new(&config)?)
}

fn runtime() -> PyResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

fn departure(depart: Option<String>) -> PyResult<DateTime<FixedOffset>> {
    match depart {
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map_err(|e| PyValueError::new_err(format!("Invalid departure time: {}", e))),
        None => Ok(Local::now().into()),
    }
}

fn to_py(pois: Vec<Poi>) -> Vec<PyPoi> {
    pois.into_iter().map(|p| (p.name, p.lat, p.lng)).collect()
}

/// Reachable area (GeoJSON string) and POIs inside it
#[pyfunction]
#[pyo3(signature = (lat, lng, mode, minutes, depart=None, config_path=None))]
fn reachable_pois(
    lat: f64,
    lng: f64,
    mode: String,
    minutes: u32,
    depart: Option<String>,
    config_path: Option<String>,
) -> PyResult<(String, Vec<PyPoi>)> {
    let mode: TransportMode = mode.parse()?;
    let depart_at = departure(depart)?;
    let explorer = explorer(config_path)?;

    let (area, pois) = runtime()?.block_on(explorer.reachable_pois(
        Coordinate::new(lat, lng),
        mode,
        minutes,
        &depart_at,
    ))?;

    Ok((geometry::area_to_geojson_string(&area), to_py(pois)))
}

/// Area reachable from both origins (GeoJSON string) and POIs inside it
#[pyfunction]
#[pyo3(signature = (a, b, mode, minutes, depart=None, config_path=None))]
fn common_pois(
    a: (f64, f64),
    b: (f64, f64),
    mode: String,
    minutes: u32,
    depart: Option<String>,
    config_path: Option<String>,
) -> PyResult<(String, Vec<PyPoi>)> {
    let mode: TransportMode = mode.parse()?;
    let depart_at = departure(depart)?;
    let explorer = explorer(config_path)?;

    let (area, pois) = runtime()?.block_on(explorer.common_pois(
        Coordinate::new(a.0, a.1),
        Coordinate::new(b.0, b.1),
        mode,
        minutes,
        &depart_at,
    ))?;

    Ok((geometry::area_to_geojson_string(&area), to_py(pois)))
}

/// Polyline, directions, seconds and kilometres from `start` to `dest`
#[pyfunction]
#[pyo3(signature = (start, dest, mode, config_path=None))]
fn route_to(
    start: (f64, f64),
    dest: (f64, f64),
    mode: String,
    config_path: Option<String>,
) -> PyResult<(Vec<(f64, f64)>, Vec<String>, i64, Option<f64>)> {
    let mode: TransportMode = mode.parse()?;
    let explorer = explorer(config_path)?;

    let route = runtime()?.block_on(explorer.route_to(
        Coordinate::new(start.0, start.1),
        Coordinate::new(dest.0, dest.1),
        mode,
    ))?;

    let line = route.polyline.iter().map(|c| (c.lat, c.lng)).collect();
    Ok((line, route.directions, route.duration_seconds, route.distance_km))
}

/// Names accepted as `mode`
#[pyfunction]
fn transport_modes() -> Vec<&'static str> {
    TransportMode::ALL.iter().map(|m| m.name()).collect()
}

/// Python module for finding POIs in reachable areas
#[pymodule]
fn reachable_poi(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(reachable_pois, m)?)?;
    m.add_function(wrap_pyfunction!(common_pois, m)?)?;
    m.add_function(wrap_pyfunction!(route_to, m)?)?;
    m.add_function(wrap_pyfunction!(transport_modes, m)?)?;
    Ok(())
}
