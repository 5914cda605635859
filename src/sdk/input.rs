use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

use super::config::RequestMode;
use super::routing::error::RoutingError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteQuery {
    Directions { start: LatLon, end: LatLon },
    Isochrone { center: LatLon, ranges: Vec<f64> },
}

/// One line of the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    pub id: String,
    pub query: RouteQuery,
}

impl InputRow {
    pub fn directions(id: &str, start: LatLon, end: LatLon) -> Self {
        Self {
            id: id.to_string(),
            query: RouteQuery::Directions { start, end },
        }
    }

    pub fn isochrone(id: &str, center: LatLon, ranges: Vec<f64>) -> Self {
        Self {
            id: id.to_string(),
            query: RouteQuery::Isochrone { center, ranges },
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsRecord {
    id: String,
    start_lat: f64,
    start_lon: f64,
    end_lat: f64,
    end_lon: f64,
}

#[derive(Debug, Deserialize)]
struct IsochroneRecord {
    id: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    range: Option<String>,
}

/// Reads the input table for a request mode.
///
/// Directions need `id,start_lat,start_lon,end_lat,end_lon`; isochrones need
/// `id,lat,lon` and take an optional `range` column (values separated by `;`)
/// that replaces `default_ranges` for that row. Ids stay text, so leading
/// zeros survive.
pub fn read_rows<P: AsRef<Path>>(
    path: P,
    mode: RequestMode,
    default_ranges: &[f64],
) -> Result<Vec<InputRow>, RoutingError> {
    let file = File::open(path.as_ref())?;
    let rows = match mode {
        RequestMode::Directions => read_directions(file)?,
        RequestMode::Isochrone => read_isochrones(file, default_ranges)?,
    };
    log::info!("read {}: {} lines", path.as_ref().display(), rows.len());
    Ok(rows)
}

pub fn read_directions<R: Read>(reader: R) -> Result<Vec<InputRow>, RoutingError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: DirectionsRecord = result?;
        rows.push(InputRow::directions(
            &record.id,
            LatLon { lat: record.start_lat, lon: record.start_lon },
            LatLon { lat: record.end_lat, lon: record.end_lon },
        ));
    }
    Ok(rows)
}

pub fn read_isochrones<R: Read>(
    reader: R,
    default_ranges: &[f64],
) -> Result<Vec<InputRow>, RoutingError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: IsochroneRecord = result?;
        let ranges = match record.range.as_deref().filter(|r| !r.is_empty()) {
            Some(text) => parse_ranges(text).map_err(|e| {
                RoutingError::InvalidInput(format!("row {}: {}", record.id, e))
            })?,
            None => default_ranges.to_vec(),
        };
        rows.push(InputRow::isochrone(
            &record.id,
            LatLon { lat: record.lat, lon: record.lon },
            ranges,
        ));
    }
    Ok(rows)
}

/// Parses `800,1000` or `800;1000` into range values.
pub fn parse_ranges(text: &str) -> Result<Vec<f64>, String> {
    text.split([',', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| format!("invalid range value '{}'", part))
        })
        .collect()
}
