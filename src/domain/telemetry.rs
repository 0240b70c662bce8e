// Chart and tile domain models
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: f64,
    pub precision: i32,
}

impl TileData {
    pub fn new(id: &str, title: &str, unit: &str, value: f64, precision: i32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.to_string(),
            value,
            precision,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesStyle {
    Solid,
    Dotted,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub style: SeriesStyle,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesData {
    pub fn new(id: String, name: String, color: Option<&str>, style: SeriesStyle, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            id,
            name,
            color: color.map(str::to_string),
            style,
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub kind: ChartKind,
    /// Vertical marker, e.g. the reference time.
    pub marker_ms: Option<i64>,
    pub fraction_digits: Option<i32>,
    pub series: Vec<SeriesData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Line,
    MultiLine,
    Combo,
}

impl ChartData {
    pub fn new(id: &str, title: &str, unit: Option<&str>, kind: ChartKind, series: Vec<SeriesData>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.map(str::to_string),
            kind,
            marker_ms: None,
            fraction_digits: Some(1),
            series,
        }
    }

    pub fn with_marker(mut self, time_ms: i64) -> Self {
        self.marker_ms = Some(time_ms);
        self
    }
}

/// Downsample time series points using bucket averaging
pub fn downsample_points(points: Vec<TimeSeriesPoint>, max_points: usize) -> Vec<TimeSeriesPoint> {
    if points.is_empty() || max_points == 0 || points.len() <= max_points {
        return points;
    }

    let bucket_size = (points.len() as f64 / max_points as f64).ceil() as usize;
    let mut downsampled = Vec::with_capacity(max_points);

    for chunk in points.chunks(bucket_size) {
        // Middle point's timestamp, average value
        let mid_idx = chunk.len() / 2;
        let avg_value = chunk.iter().map(|p| p.value).sum::<f64>() / chunk.len() as f64;
        downsampled.push(TimeSeriesPoint::new(chunk[mid_idx].time_ms, avg_value));
    }

    downsampled
}
