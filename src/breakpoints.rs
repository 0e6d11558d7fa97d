//! Breakpoint thresholds per index, after the US EPA 2016 AQI guidelines.

use crate::models::PollutantKey;

/// Anything that can be looked up in a `BreakpointTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// The composite air quality index reported by the feed.
    Aqi,
    Pollutant(PollutantKey),
}

impl From<PollutantKey> for IndexKey {
    fn from(key: PollutantKey) -> Self {
        IndexKey::Pollutant(key)
    }
}

impl std::fmt::Display for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKey::Aqi => f.write_str("aqi"),
            IndexKey::Pollutant(key) => key.fmt(f),
        }
    }
}

/// Ascending thresholds; `n` thresholds define `n + 1` bands.
#[derive(Debug, Clone)]
pub struct BreakpointTable {
    entries: Vec<(IndexKey, &'static [f64])>,
}

const AQI: &[f64] = &[50.0, 100.0, 150.0, 200.0, 300.0, 500.0];
// ppm
const CO: &[f64] = &[4.4, 9.4, 12.4, 15.4, 30.4];
// ppb
const NO2: &[f64] = &[53.0, 100.0, 360.0, 649.0, 1249.0];
const O3: &[f64] = &[54.0, 70.0, 85.0, 105.0, 200.0];
const SO2: &[f64] = &[35.0, 75.0, 185.0, 304.0, 604.0];
// μg/m³
const PM10: &[f64] = &[54.0, 154.0, 254.0, 354.0, 424.0];
const PM25: &[f64] = &[12.0, 35.4, 55.4, 150.4, 250.4];
// multiples of 25 mW/m²
const UVI: &[f64] = &[2.0, 5.0, 7.0, 10.0];

impl BreakpointTable {
    pub fn us_epa() -> Self {
        let p = IndexKey::Pollutant;
        Self {
            entries: vec![
                (IndexKey::Aqi, AQI),
                (p(PollutantKey::Co), CO),
                (p(PollutantKey::No2), NO2),
                (p(PollutantKey::O3), O3),
                (p(PollutantKey::So2), SO2),
                (p(PollutantKey::Pm10), PM10),
                (p(PollutantKey::Pm25), PM25),
                (p(PollutantKey::Uvi), UVI),
            ],
        }
    }

    /// Returns `None` for indices without a severity scale (temperature,
    /// pressure, wind, ...).
    pub fn thresholds(&self, key: impl Into<IndexKey>) -> Option<&'static [f64]> {
        let key = key.into();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, thresholds)| *thresholds)
    }

    /// Largest number of bands any entry defines.
    pub fn max_bands(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, t)| t.len() + 1)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_is_strictly_ascending() {
        let table = BreakpointTable::us_epa();
        for (key, thresholds) in &table.entries {
            assert!(
                (4..=6).contains(&thresholds.len()),
                "{} has {} thresholds",
                key,
                thresholds.len()
            );
            assert!(
                thresholds.windows(2).all(|w| w[0] < w[1]),
                "{} thresholds are not strictly ascending: {:?}",
                key,
                thresholds
            );
        }
    }

    #[test]
    fn test_keys_without_scale_are_absent() {
        let table = BreakpointTable::us_epa();
        for key in [
            PollutantKey::Temperature,
            PollutantKey::DewPoint,
            PollutantKey::Humidity,
            PollutantKey::Pressure,
            PollutantKey::Wind,
        ] {
            assert!(table.thresholds(key).is_none(), "{} should be unclassified", key);
        }
    }

    #[test]
    fn test_composite_index_has_seven_bands() {
        let table = BreakpointTable::us_epa();
        assert_eq!(table.thresholds(IndexKey::Aqi).map(<[f64]>::len), Some(6));
        assert_eq!(table.max_bands(), 7);
    }
}
