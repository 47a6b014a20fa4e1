//! Serialization of time-series responses.
//!
//! The engines return typed points; this module decides how they leave the
//! service: JSON or CSV body, content type, and whether the client is told
//! to save the payload as a file.

use std::fmt;

use crate::api::{MeasurementPoint, SensorId};

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Response body format of a data request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    /// Case-insensitive; anything but `csv` (including nothing) is JSON.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some(f) if f.trim().eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => JSON_CONTENT_TYPE,
            ExportFormat::Csv => CSV_CONTENT_TYPE,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// `true` only for the literal `download=true`.
pub fn download_requested(raw: Option<&str>) -> bool {
    raw == Some("true")
}

/// A rendered response payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub body: String,
    pub content_type: &'static str,
    /// `Content-Disposition` value, when the payload is offered as a file.
    pub disposition: Option<String>,
}

pub fn attachment_disposition(sensor_id: SensorId, format: ExportFormat) -> String {
    format!("attachment; filename={}.{}", sensor_id, format.extension())
}

/// Render points for transport.
///
/// CSV is always offered as an attachment; JSON only when `download` is set.
pub fn render(
    points: &[MeasurementPoint],
    format: ExportFormat,
    sensor_id: SensorId,
    download: bool,
) -> serde_json::Result<Export> {
    let body = match format {
        ExportFormat::Json => serde_json::to_string(points)?,
        ExportFormat::Csv => to_csv(points),
    };
    let disposition = (download || format == ExportFormat::Csv)
        .then(|| attachment_disposition(sensor_id, format));

    Ok(Export {
        body,
        content_type: format.content_type(),
        disposition,
    })
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// CSV with a quoted `createdAt,value` header, one row per point.
///
/// Timestamps use millisecond precision with a `Z` suffix.
pub fn to_csv(points: &[MeasurementPoint]) -> String {
    let mut lines = Vec::with_capacity(points.len() + 1);
    lines.push(format!("{},{}", quote("createdAt"), quote("value")));
    for p in points {
        let created_at = p.created_at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
        lines.push(format!("{},{}", quote(&created_at), quote(&p.value)));
    }
    lines.join("\n")
}
