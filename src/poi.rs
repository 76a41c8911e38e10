//! Points of interest: CSV ingestion and conversion into an orienteering instance.
//!
//! The CSV only needs a name and coordinates. Optional columns (rating, price level
//! and visit duration) get defaults when absent or unreadable. Column names are
//! matched case-insensitively against a list of accepted aliases.

use crate::error::SolverError;
use crate::instance::OrienteeringInstance;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub const DEFAULT_RATING: f64 = 4.0;
pub const DEFAULT_PRICE_LEVEL: f64 = 1.0;
pub const DEFAULT_VISIT_MINUTES: f64 = 60.0;
pub const MIN_VISIT_MINUTES: f64 = 5.0;

const NAME_ALIASES: &[&str] = &["name", "title", "poi_name", "nama"];
const LATITUDE_ALIASES: &[&str] = &["latitude", "lat", "y"];
const LONGITUDE_ALIASES: &[&str] = &["longitude", "lon", "lng", "x"];
const RATING_ALIASES: &[&str] = &["rating", "score", "stars"];
const PRICE_ALIASES: &[&str] = &["price_level", "price", "cost_level"];
const DURATION_ALIASES: &[&str] = &["est_time_min", "duration_min", "visit_time_min"];

/// A cleaned point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Rating in [0, 5]
    pub rating: f64,
    /// Price level, >= 0
    pub price_level: f64,
    /// Expected visit duration in minutes, >= 5
    pub visit_minutes: f64,
}

/// What the cleaning step did to the raw rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub invalid_coordinates: usize,
    pub duplicates: usize,
    /// Optional columns absent from the header, filled with defaults
    pub missing_columns: Vec<String>,
    pub ratings_defaulted: usize,
    pub prices_defaulted: usize,
    pub durations_defaulted: usize,
}

impl CleaningReport {
    pub fn rows_removed(&self) -> usize {
        self.invalid_coordinates + self.duplicates
    }
}

impl std::fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cleaning report")?;
        writeln!(f, "  Rows read: {}", self.rows_read)?;
        writeln!(
            f,
            "  Rows removed: {} ({} invalid coordinates, {} duplicates)",
            self.rows_removed(),
            self.invalid_coordinates,
            self.duplicates
        )?;
        if !self.missing_columns.is_empty() {
            writeln!(f, "  Columns filled with defaults: {}", self.missing_columns.join(", "))?;
        }
        writeln!(f, "  Ratings defaulted: {}", self.ratings_defaulted)?;
        writeln!(f, "  Prices defaulted: {}", self.prices_defaulted)?;
        writeln!(f, "  Durations defaulted: {}", self.durations_defaulted)
    }
}

/// How POIs become an orienteering instance
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    /// Depot (hotel) latitude
    pub depot_lat: f64,
    /// Depot (hotel) longitude
    pub depot_lon: f64,
    /// Average travel speed in km/h
    pub speed_kmh: f64,
    /// Total time available, in minutes
    pub time_budget: f64,
    /// Weight of the rating in the stop value
    pub w_rating: f64,
    /// Weight of the price level in the stop value (subtracted)
    pub w_cost: f64,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        InstanceConfig {
            depot_lat: -8.4095,
            depot_lon: 115.1889,
            speed_kmh: 30.0,
            time_budget: 480.0,
            w_rating: 1.0,
            w_cost: 0.0,
        }
    }
}

/// Great-circle distance in metres
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (lat1.to_radians(), lon1.to_radians(), lat2.to_radians(), lon2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        headers
            .iter()
            .position(|h| h.trim().to_lowercase() == *alias)
    })
}

fn parse_field(record: &csv::StringRecord, column: Option<usize>) -> Option<f64> {
    column
        .and_then(|c| record.get(c))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// A cleaned set of POIs, ready to be turned into an instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoiDataset {
    pub pois: Vec<Poi>,
    pub report: CleaningReport,
}

impl PoiDataset {
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SolverError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let name_col = find_column(&headers, NAME_ALIASES).ok_or(SolverError::MissingColumn("name"))?;
        let lat_col = find_column(&headers, LATITUDE_ALIASES).ok_or(SolverError::MissingColumn("latitude"))?;
        let lon_col = find_column(&headers, LONGITUDE_ALIASES).ok_or(SolverError::MissingColumn("longitude"))?;
        let rating_col = find_column(&headers, RATING_ALIASES);
        let price_col = find_column(&headers, PRICE_ALIASES);
        let duration_col = find_column(&headers, DURATION_ALIASES);

        let mut report = CleaningReport::default();
        for (column, label) in [
            (rating_col, "rating"),
            (price_col, "price_level"),
            (duration_col, "est_time_min"),
        ] {
            if column.is_none() {
                report.missing_columns.push(label.to_string());
            }
        }

        let mut pois = Vec::new();
        let mut seen = HashSet::new();

        for record in csv_reader.records() {
            let record = record?;
            report.rows_read += 1;

            let (latitude, longitude) = match (parse_field(&record, Some(lat_col)), parse_field(&record, Some(lon_col))) {
                (Some(lat), Some(lon)) => (lat, lon),
                _ => {
                    report.invalid_coordinates += 1;
                    continue;
                }
            };
            let name = record.get(name_col).unwrap_or_default().to_string();

            if !seen.insert((name.clone(), latitude.to_bits(), longitude.to_bits())) {
                report.duplicates += 1;
                continue;
            }

            let rating = parse_field(&record, rating_col).unwrap_or_else(|| {
                report.ratings_defaulted += 1;
                DEFAULT_RATING
            });
            let price_level = parse_field(&record, price_col).unwrap_or_else(|| {
                report.prices_defaulted += 1;
                DEFAULT_PRICE_LEVEL
            });
            let visit_minutes = parse_field(&record, duration_col).unwrap_or_else(|| {
                report.durations_defaulted += 1;
                DEFAULT_VISIT_MINUTES
            });

            pois.push(Poi {
                name,
                latitude,
                longitude,
                rating: rating.clamp(0.0, 5.0),
                price_level: price_level.max(0.0),
                visit_minutes: visit_minutes.max(MIN_VISIT_MINUTES),
            });
        }

        if report.rows_removed() > 0 {
            log::warn!(
                "dropped {} rows ({} invalid coordinates, {} duplicates)",
                report.rows_removed(),
                report.invalid_coordinates,
                report.duplicates
            );
        }
        log::info!("loaded {} POIs from {} rows", pois.len(), report.rows_read);

        Ok(PoiDataset { pois, report })
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    /// Keep a uniform random subset of `n` POIs (original order preserved).
    /// Deterministic for a given seed; a dataset with at most `n` POIs is returned whole.
    pub fn sample(&self, n: usize, seed: u64) -> PoiDataset {
        if self.pois.len() <= n {
            return self.clone();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut picked = rand::seq::index::sample(&mut rng, self.pois.len(), n).into_vec();
        picked.sort_unstable();

        PoiDataset {
            pois: picked.into_iter().map(|i| self.pois[i].clone()).collect(),
            report: self.report.clone(),
        }
    }

    /// Stop value: `w_rating * rating - w_cost * price_level`
    pub fn values(&self, w_rating: f64, w_cost: f64) -> Vec<f64> {
        self.pois
            .iter()
            .map(|p| w_rating * p.rating - w_cost * p.price_level)
            .collect()
    }

    /// Travel minutes between all points, depot first, at a constant speed
    pub fn travel_times(&self, depot_lat: f64, depot_lon: f64, speed_kmh: f64) -> Vec<Vec<f64>> {
        let metres_per_minute = speed_kmh * 1000.0 / 60.0;
        let points: Vec<(f64, f64)> = std::iter::once((depot_lat, depot_lon))
            .chain(self.pois.iter().map(|p| (p.latitude, p.longitude)))
            .collect();

        points
            .iter()
            .map(|&(lat1, lon1)| {
                points
                    .iter()
                    .map(|&(lat2, lon2)| haversine_m(lat1, lon1, lat2, lon2) / metres_per_minute)
                    .collect()
            })
            .collect()
    }

    /// Build the instance: index 0 is the depot, index i is `pois[i - 1]`
    pub fn to_instance(&self, config: &InstanceConfig) -> Result<OrienteeringInstance, SolverError> {
        if !config.speed_kmh.is_finite() || config.speed_kmh <= 0.0 {
            return Err(SolverError::InvalidSpeed(config.speed_kmh));
        }

        let values: Vec<f64> = std::iter::once(0.0)
            .chain(self.values(config.w_rating, config.w_cost))
            .collect();
        let visit_durations: Vec<f64> = std::iter::once(0.0)
            .chain(self.pois.iter().map(|p| p.visit_minutes))
            .collect();
        let travel_times = self.travel_times(config.depot_lat, config.depot_lon, config.speed_kmh);

        let labels = std::iter::once("Hotel/Depot".to_string())
            .chain(self.pois.iter().map(|p| p.name.clone()))
            .collect();

        Ok(OrienteeringInstance::new(values, visit_durations, travel_times, config.time_budget)?
            .with_labels(labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Nama,Lat,Lng,Stars,Price,duration_min
Temple,-8.40,115.19,4.5,2,90
Beach,-8.41,115.20,,,
Temple,-8.40,115.19,4.5,2,90
Broken,abc,115.0,3,1,30
Market,-8.42,115.18,7,-3,2
";

    #[test]
    fn test_aliases_defaults_and_clamps() {
        let data = PoiDataset::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.report.rows_read, 5);
        assert_eq!(data.report.duplicates, 1);
        assert_eq!(data.report.invalid_coordinates, 1);
        assert_eq!(data.report.rows_removed(), 2);
        assert!(data.report.missing_columns.is_empty());

        let beach = &data.pois[1];
        assert_eq!(beach.name, "Beach");
        assert_eq!(beach.rating, DEFAULT_RATING);
        assert_eq!(beach.price_level, DEFAULT_PRICE_LEVEL);
        assert_eq!(beach.visit_minutes, DEFAULT_VISIT_MINUTES);

        let market = &data.pois[2];
        assert_eq!(market.rating, 5.0);
        assert_eq!(market.price_level, 0.0);
        assert_eq!(market.visit_minutes, MIN_VISIT_MINUTES);
    }

    #[test]
    fn test_missing_required_column() {
        let err = PoiDataset::from_reader("name,lat\nA,1.0\n".as_bytes()).unwrap_err();
        assert_eq!(err, SolverError::MissingColumn("longitude"));
    }

    #[test]
    fn test_missing_optional_columns_are_reported() {
        let data = PoiDataset::from_reader("name,latitude,longitude\nA,0.0,0.0\nB,0.01,0.01\n".as_bytes()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.report.missing_columns, vec!["rating", "price_level", "est_time_min"]);
        assert_eq!(data.report.ratings_defaulted, 2);
    }

    #[test]
    fn test_haversine() {
        assert_eq!(haversine_m(10.0, 20.0, 10.0, 20.0), 0.0);
        // one degree of latitude is about 111.2 km
        let d = haversine_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.9).abs() < 1.0);
    }

    #[test]
    fn test_instance_shape() {
        let data = PoiDataset::from_reader("name,latitude,longitude\nA,0.0,0.0\nB,0.01,0.01\n".as_bytes()).unwrap();
        let config = InstanceConfig { depot_lat: 0.0, depot_lon: 0.0, ..Default::default() };
        let instance = data.to_instance(&config).unwrap();

        assert_eq!(instance.dimension(), 3);
        assert_eq!(instance.value(0), 0.0);
        assert_eq!(instance.value(1), DEFAULT_RATING);
        assert_eq!(instance.visit_duration(2), DEFAULT_VISIT_MINUTES);
        assert_eq!(instance.travel_time(0, 1), 0.0);
        assert!(instance.travel_time(0, 2) > 0.0);
        assert!((instance.travel_time(0, 2) - instance.travel_time(2, 0)).abs() < 1e-12);
        assert_eq!(instance.label(0), Some("Hotel/Depot"));
        assert_eq!(instance.label(2), Some("B"));
    }

    #[test]
    fn test_travel_minutes_at_speed() {
        let data = PoiDataset {
            pois: vec![Poi {
                name: "North".to_string(),
                latitude: 1.0,
                longitude: 0.0,
                rating: 4.0,
                price_level: 1.0,
                visit_minutes: 60.0,
            }],
            report: CleaningReport::default(),
        };
        let matrix = data.travel_times(0.0, 0.0, 60.0);
        // 60 km/h is one kilometre per minute
        assert!((matrix[0][1] - haversine_m(0.0, 0.0, 1.0, 0.0) / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_speed() {
        let data = PoiDataset::default();
        let config = InstanceConfig { speed_kmh: 0.0, ..Default::default() };
        assert_eq!(data.to_instance(&config).unwrap_err(), SolverError::InvalidSpeed(0.0));
    }

    #[test]
    fn test_sample_is_deterministic() {
        let csv: String = std::iter::once("name,latitude,longitude".to_string())
            .chain((0..30).map(|i| format!("P{},{},0.0", i, i as f64 * 0.01)))
            .collect::<Vec<_>>()
            .join("\n");
        let data = PoiDataset::from_reader(csv.as_bytes()).unwrap();

        let a = data.sample(10, 42);
        let b = data.sample(10, 42);
        assert_eq!(a.len(), 10);
        assert_eq!(a.pois, b.pois);
        assert_eq!(data.sample(100, 42).len(), 30);
    }

    #[test]
    fn test_values() {
        let data = PoiDataset::from_reader(CSV.as_bytes()).unwrap();
        let values = data.values(1.0, 0.5);
        assert_eq!(values, vec![4.5 - 1.0, 4.0 - 0.5, 5.0]);
    }
}
