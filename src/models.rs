use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::constants::FEED_TIME_FORMAT;
use crate::error::FeedError;

// ============================================================================
// WAQI Feed API Models
// ============================================================================

/// Envelope of every `/feed/{city}/` response.
///
/// On failure `status` is `"error"` and `data` is a plain message string,
/// so `data` is kept untyped until the status has been checked.
#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub status: String,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct FeedData {
    /// Number, or the string `"-"` when the station has no current index.
    pub aqi: Value,
    pub city: FeedCity,
    /// Object of `{ "<key>": { "v": <number> } }`, validated in `CityReport::from_feed`.
    pub iaqi: Value,
    pub time: FeedTime,
    #[serde(default)]
    pub forecast: Option<FeedForecast>,
}

#[derive(Debug, Deserialize)]
pub struct FeedCity {
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedTime {
    /// Station-local wall clock, `YYYY-MM-DD HH:MM:SS`.
    pub s: String,
    /// Station UTC offset, e.g. `+05:30`.
    #[serde(default)]
    pub tz: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedForecast {
    /// Key order of the payload is preserved (`serde_json/preserve_order`).
    #[serde(default)]
    pub daily: serde_json::Map<String, Value>,
}

// ============================================================================
// Pollutants
// ============================================================================

/// Closed set of measurements the feed can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollutantKey {
    Co,
    No2,
    O3,
    Pm10,
    Pm25,
    So2,
    Temperature,
    DewPoint,
    Humidity,
    Pressure,
    Wind,
    Uvi,
}

/// Display metadata for a pollutant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollutantSpec {
    pub label: &'static str,
    pub unit: &'static str,
}

impl PollutantKey {
    pub const ALL: [PollutantKey; 12] = [
        PollutantKey::Co,
        PollutantKey::No2,
        PollutantKey::O3,
        PollutantKey::Pm10,
        PollutantKey::Pm25,
        PollutantKey::So2,
        PollutantKey::Temperature,
        PollutantKey::DewPoint,
        PollutantKey::Humidity,
        PollutantKey::Pressure,
        PollutantKey::Wind,
        PollutantKey::Uvi,
    ];

    /// Key used by the feed for this measurement.
    pub fn feed_key(self) -> &'static str {
        match self {
            PollutantKey::Co => "co",
            PollutantKey::No2 => "no2",
            PollutantKey::O3 => "o3",
            PollutantKey::Pm10 => "pm10",
            PollutantKey::Pm25 => "pm25",
            PollutantKey::So2 => "so2",
            PollutantKey::Temperature => "t",
            PollutantKey::DewPoint => "dew",
            PollutantKey::Humidity => "h",
            PollutantKey::Pressure => "p",
            PollutantKey::Wind => "w",
            PollutantKey::Uvi => "uvi",
        }
    }

    /// Returns `None` for keys outside the closed set (e.g. `wg`, `r`).
    pub fn from_feed_key(key: &str) -> Option<Self> {
        PollutantKey::ALL.into_iter().find(|k| k.feed_key() == key)
    }

    pub fn spec(self) -> PollutantSpec {
        let (label, unit) = match self {
            PollutantKey::Co => ("CO", "ppm"),
            PollutantKey::No2 => ("NO\u{2082}", "ppb"),
            PollutantKey::O3 => ("O\u{2083}", "ppb"),
            PollutantKey::Pm10 => ("PM\u{2081}\u{2080}", "\u{03bc}g/m\u{00b3}"),
            PollutantKey::Pm25 => ("PM\u{2082}.\u{2085}", "\u{03bc}g/m\u{00b3}"),
            PollutantKey::So2 => ("SO\u{2082}", "ppb"),
            PollutantKey::Temperature => ("TEMP", "\u{00b0}C"),
            PollutantKey::DewPoint => ("DEW PT", "\u{00b0}C"),
            PollutantKey::Humidity => ("HUMIDITY", "%"),
            PollutantKey::Pressure => ("PRESSURE", "mm.Hg"),
            PollutantKey::Wind => ("WIND", "km/h"),
            PollutantKey::Uvi => ("UV Index", "[25 mW/m\u{00b2}]"),
        };
        PollutantSpec { label, unit }
    }
}

impl std::fmt::Display for PollutantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.feed_key())
    }
}

// ============================================================================
// Report Models
// ============================================================================

/// A single current measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub key: PollutantKey,
    pub value: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Daily maximum forecast for one pollutant.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub key: PollutantKey,
    /// `YYYY-MM-DD`, compared verbatim against the run dates.
    pub date: String,
    pub max: f64,
}

/// Everything rendered for one configured location.
#[derive(Debug, Clone, PartialEq)]
pub struct CityReport {
    pub label: String,
    pub url: String,
    pub aqi: f64,
    pub updated: DateTime<Utc>,
    pub readings: Vec<Reading>,
    pub forecast: Vec<ForecastEntry>,
}

impl CityReport {
    /// Checks the envelope status, then decodes `data`.
    pub fn from_response(label: &str, response: FeedResponse) -> Result<Self, FeedError> {
        if response.status != "ok" {
            let message = match &response.data {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(FeedError::Status {
                status: response.status,
                message,
            });
        }
        let data: FeedData = serde_json::from_value(response.data)?;
        Self::from_feed(label, data)
    }

    /// Builds a report, validating the AQI and current readings eagerly.
    ///
    /// Forecast entries are decoded leniently: a malformed day is dropped
    /// without affecting the rest of the report.
    pub fn from_feed(label: &str, data: FeedData) -> Result<Self, FeedError> {
        let aqi = data
            .aqi
            .as_f64()
            .filter(|v| *v >= 0.0)
            .ok_or(FeedError::MissingAqi)?;
        let updated = parse_feed_time(&data.time)?;

        let iaqi = data.iaqi.as_object().ok_or_else(|| {
            FeedError::MalformedReadings(format!("expected an object, got {}", data.iaqi))
        })?;
        let mut readings = Vec::new();
        for (name, entry) in iaqi {
            let Some(key) = PollutantKey::from_feed_key(name) else {
                tracing::debug!("Ignoring unknown reading key '{}'", name);
                continue;
            };
            let value = entry.get("v").and_then(Value::as_f64).ok_or_else(|| {
                FeedError::MalformedReadings(format!("'{}' has no numeric 'v': {}", name, entry))
            })?;
            readings.push(Reading {
                key,
                value,
                timestamp: Some(updated),
            });
        }

        let forecast = data
            .forecast
            .map(|f| decode_forecast(&f.daily))
            .unwrap_or_default();

        Ok(Self {
            label: label.to_string(),
            url: data.city.url,
            aqi,
            updated,
            readings,
            forecast,
        })
    }

    pub fn reading(&self, key: PollutantKey) -> Option<&Reading> {
        self.readings.iter().find(|r| r.key == key)
    }

    pub fn forecast_for<'a>(
        &'a self,
        key: PollutantKey,
        date: &'a str,
    ) -> impl Iterator<Item = &'a ForecastEntry> + 'a {
        self.forecast
            .iter()
            .filter(move |e| e.key == key && e.date == date)
    }
}

fn decode_forecast(daily: &serde_json::Map<String, Value>) -> Vec<ForecastEntry> {
    let mut entries = Vec::new();
    for (name, days) in daily {
        let Some(key) = PollutantKey::from_feed_key(name) else {
            tracing::debug!("Ignoring unknown forecast key '{}'", name);
            continue;
        };
        let Some(days) = days.as_array() else {
            tracing::warn!("Forecast for '{}' is not a list, skipping", name);
            continue;
        };
        for day in days {
            let date = day.get("day").and_then(Value::as_str);
            let max = day.get("max").and_then(Value::as_f64);
            match (date, max) {
                (Some(date), Some(max)) => entries.push(ForecastEntry {
                    key,
                    date: date.to_string(),
                    max,
                }),
                _ => tracing::warn!("Skipping malformed '{}' forecast day: {}", name, day),
            }
        }
    }
    entries
}

/// Interprets `time.s` at `time.tz` when the feed provides it, otherwise as
/// local wall-clock time.
fn parse_feed_time(time: &FeedTime) -> Result<DateTime<Utc>, FeedError> {
    let bad = || FeedError::BadTimestamp(time.s.clone());
    match &time.tz {
        Some(tz) => {
            let stamped = format!("{} {}", time.s, tz);
            DateTime::parse_from_str(&stamped, &format!("{} %:z", FEED_TIME_FORMAT))
                .map(|t| t.with_timezone(&Utc))
                .map_err(|_| bad())
        }
        None => {
            let naive = NaiveDateTime::parse_from_str(&time.s, FEED_TIME_FORMAT).map_err(|_| bad())?;
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc))
                .ok_or_else(bad)
        }
    }
}
