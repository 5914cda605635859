use csv::WriterBuilder;
use geo_types::LineString;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value as GeoJsonValue};
use serde::Serialize;
use serde_json::{json, Map};
use std::{
    fs,
    path::{Path, PathBuf},
};

use super::routing::error::RoutingError;
use super::routing::route::{BatchResult, PointSequence, RouteSummary};

const POINTS_HEADER: [&str; 5] = ["id", "latitude", "longitude", "altitude", "seq"];
const SUMMARY_HEADER: [&str; 5] = ["id", "lengthInMeters", "travelTimeInSeconds", "ascent", "descent"];

#[derive(Debug, Serialize)]
struct PointRow<'a> {
    id: &'a str,
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
    seq: usize,
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    id: &'a str,
    length_in_meters: Option<f64>,
    travel_time_in_seconds: Option<f64>,
    ascent: Option<f64>,
    descent: Option<f64>,
    // Some("") keeps the column for rows without geometry.
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<String>,
}

impl<'a> SummaryRow<'a> {
    fn new(summary: &'a RouteSummary, include_geometry: bool) -> Self {
        let metrics = summary.metrics;
        Self {
            id: &summary.id,
            length_in_meters: metrics.map(|m| m.length_in_meters),
            travel_time_in_seconds: metrics.map(|m| m.travel_time_in_seconds),
            ascent: metrics.and_then(|m| m.ascent),
            descent: metrics.and_then(|m| m.descent),
            geometry: include_geometry
                .then(|| summary.geometry.as_ref().map(to_wkt).unwrap_or_default()),
        }
    }
}

/// Writes a batch to `path` as CSV, plus a `.geojson` sibling for summaries
/// with geometry. Returns the sibling path when one was written.
///
/// The header line is written even for an empty batch.
pub fn write_results(
    result: &BatchResult,
    path: &Path,
    include_geometry: bool,
) -> Result<Option<PathBuf>, RoutingError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    match result {
        BatchResult::Points(sequences) => {
            write_points(sequences, path)?;
            Ok(None)
        }
        BatchResult::Summaries(summaries) => {
            write_summaries(summaries, path, include_geometry)?;
            if !include_geometry || summaries.iter().all(|s| s.geometry.is_none()) {
                return Ok(None);
            }
            let sibling = path.with_extension("geojson");
            write_geojson(summaries, &sibling)?;
            Ok(Some(sibling))
        }
    }
}

fn write_points(sequences: &[PointSequence], path: &Path) -> Result<(), RoutingError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(POINTS_HEADER)?;
    let mut count = 0;
    for sequence in sequences {
        for point in sequence.points() {
            writer.serialize(PointRow {
                id: sequence.id(),
                latitude: point.latitude,
                longitude: point.longitude,
                altitude: point.altitude,
                seq: point.sequence,
            })?;
            count += 1;
        }
    }
    writer.flush()?;
    log::info!("Wrote {} points of {} routes to {}", count, sequences.len(), path.display());
    Ok(())
}

fn write_summaries(
    summaries: &[RouteSummary],
    path: &Path,
    include_geometry: bool,
) -> Result<(), RoutingError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    if include_geometry {
        writer.write_record(SUMMARY_HEADER.iter().chain(["geometry"].iter()))?;
    } else {
        writer.write_record(SUMMARY_HEADER)?;
    }
    for summary in summaries {
        writer.serialize(SummaryRow::new(summary, include_geometry))?;
    }
    writer.flush()?;
    log::info!("Wrote {} summaries to {}", summaries.len(), path.display());
    Ok(())
}

fn write_geojson(summaries: &[RouteSummary], path: &Path) -> Result<(), RoutingError> {
    let features: Vec<Feature> = summaries
        .iter()
        .filter_map(|summary| {
            let line = summary.geometry.as_ref()?;
            Some(summary_to_feature(summary, line))
        })
        .collect();
    log::info!("Writing {} route geometries to {}", features.len(), path.display());

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let data = serde_json::to_string_pretty(&GeoJson::from(collection))?;
    fs::write(path, data)?;
    Ok(())
}

fn summary_to_feature(summary: &RouteSummary, line: &LineString<f64>) -> Feature {
    let coordinates: Vec<Vec<f64>> = line.0.iter().map(|c| vec![c.x, c.y]).collect();
    let metrics = summary.metrics;

    let mut properties = Map::new();
    properties.insert("id".to_string(), json!(summary.id));
    properties.insert("lengthInMeters".to_string(), json!(metrics.map(|m| m.length_in_meters)));
    properties.insert(
        "travelTimeInSeconds".to_string(),
        json!(metrics.map(|m| m.travel_time_in_seconds)),
    );
    properties.insert("ascent".to_string(), json!(metrics.and_then(|m| m.ascent)));
    properties.insert("descent".to_string(), json!(metrics.and_then(|m| m.descent)));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeoJsonValue::LineString(coordinates))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// `LINESTRING (lon lat, ...)`
fn to_wkt(line: &LineString<f64>) -> String {
    let coords: Vec<String> = line.0.iter().map(|c| format!("{} {}", c.x, c.y)).collect();
    format!("LINESTRING ({})", coords.join(", "))
}
