//! Severity bands and the classifier that maps readings onto them.

use crate::breakpoints::{BreakpointTable, IndexKey};
use crate::error::{ClassifyError, PaletteError, ReportError};

/// One band of the severity scale, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityLevel {
    /// Hex colour used by the menu protocol.
    pub color: &'static str,
    /// xterm 256-colour index of the same colour.
    pub ansi: u8,
    pub emoji: &'static str,
    /// AQI range covered by the band, as printed in the legend.
    pub range: &'static str,
    pub label: &'static str,
}

/// Ordered table of severity bands, indexed by `Classification::Band`.
#[derive(Debug, Clone)]
pub struct SeverityPalette {
    levels: Vec<SeverityLevel>,
}

impl SeverityPalette {
    pub fn new(levels: Vec<SeverityLevel>) -> Self {
        Self { levels }
    }

    pub fn standard() -> Self {
        let level = |color, ansi, emoji, range, label| SeverityLevel {
            color,
            ansi,
            emoji,
            range,
            label,
        };
        Self::new(vec![
            level("#00ff00", 46, "😀", "000 - 050", "Good"),
            level("#ffff00", 226, "🙁", "051 - 100", "Moderate"),
            level("#ff8700", 208, "😨", "101 - 150", "Quite Unhealthy"),
            level("#ff0000", 196, "😷", "151 - 200", "Unhealthy"),
            level("#af00ff", 129, "🤢", "201 - 300", "Very Unhealthy"),
            level("#870000", 88, "⚠️", "301 - 400", "Hazardous"),
            level("#800000", 1, "☠️", "401+", "Are You Alive?"),
        ])
    }

    pub fn level(&self, index: usize) -> Result<&SeverityLevel, PaletteError> {
        self.levels.get(index).ok_or(PaletteError::OutOfRange {
            index,
            len: self.levels.len(),
        })
    }

    pub fn levels(&self) -> &[SeverityLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Fails unless every band `table` can produce has a palette entry.
    pub fn ensure_covers(&self, table: &BreakpointTable) -> Result<(), PaletteError> {
        let bands = table.max_bands();
        if self.is_empty() || self.len() < bands {
            return Err(PaletteError::OutOfRange {
                index: bands.saturating_sub(1),
                len: self.len(),
            });
        }
        Ok(())
    }
}

/// Outcome of classifying a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Index into the severity palette; 0 is best.
    Band(usize),
    /// The index has no severity scale; render without colour.
    Unclassified,
}

pub struct Classifier<'a> {
    table: &'a BreakpointTable,
}

impl<'a> Classifier<'a> {
    pub fn new(table: &'a BreakpointTable) -> Self {
        Self { table }
    }

    /// Returns the first band whose threshold is `>= value`, so a value on a
    /// boundary falls in the better band. Values above every threshold land in
    /// the open-ended band `thresholds.len()`.
    pub fn classify(
        &self,
        key: impl Into<IndexKey>,
        value: f64,
    ) -> Result<Classification, ClassifyError> {
        let key = key.into();
        let Some(thresholds) = self.table.thresholds(key) else {
            return Ok(Classification::Unclassified);
        };
        if !value.is_finite() || value < 0.0 {
            return Err(ClassifyError::InvalidValue { key, value });
        }
        let band = thresholds
            .iter()
            .position(|&t| value <= t)
            .unwrap_or(thresholds.len());
        Ok(Classification::Band(band))
    }

    /// Classifies and resolves the band in one step; `None` means unclassified.
    pub fn severity<'p>(
        &self,
        palette: &'p SeverityPalette,
        key: impl Into<IndexKey>,
        value: f64,
    ) -> Result<Option<&'p SeverityLevel>, ReportError> {
        match self.classify(key, value)? {
            Classification::Band(index) => Ok(Some(palette.level(index)?)),
            Classification::Unclassified => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PollutantKey;

    fn band(key: impl Into<IndexKey>, value: f64) -> Classification {
        let table = BreakpointTable::us_epa();
        Classifier::new(&table)
            .classify(key, value)
            .expect("value should be classifiable")
    }

    // --- Boundaries ---------------------------------------------------------

    #[test]
    fn test_carbon_monoxide_bands() {
        assert_eq!(band(PollutantKey::Co, 4.4), Classification::Band(0));
        assert_eq!(band(PollutantKey::Co, 4.5), Classification::Band(1));
        assert_eq!(band(PollutantKey::Co, 31.0), Classification::Band(5));
    }

    #[test]
    fn test_composite_index_bands() {
        assert_eq!(band(IndexKey::Aqi, 0.0), Classification::Band(0));
        assert_eq!(band(IndexKey::Aqi, 50.0), Classification::Band(0));
        assert_eq!(band(IndexKey::Aqi, 51.0), Classification::Band(1));
        assert_eq!(band(IndexKey::Aqi, 501.0), Classification::Band(6));
    }

    #[test]
    fn test_every_threshold_is_inclusive_to_the_lower_band() {
        let table = BreakpointTable::us_epa();
        let classifier = Classifier::new(&table);
        let keys = std::iter::once(IndexKey::Aqi)
            .chain(PollutantKey::ALL.into_iter().map(IndexKey::from));
        for key in keys {
            let Some(thresholds) = table.thresholds(key) else {
                continue;
            };
            for (i, &t) in thresholds.iter().enumerate() {
                assert_eq!(
                    classifier.classify(key, t).unwrap(),
                    Classification::Band(i),
                    "{} at threshold {}",
                    key,
                    t
                );
                assert_eq!(
                    classifier.classify(key, t + 1e-6).unwrap(),
                    Classification::Band(i + 1),
                    "{} just above threshold {}",
                    key,
                    t
                );
            }
        }
    }

    #[test]
    fn test_uvi_has_five_bands() {
        assert_eq!(band(PollutantKey::Uvi, 10.0), Classification::Band(3));
        assert_eq!(band(PollutantKey::Uvi, 11.0), Classification::Band(4));
    }

    // --- Unclassified and invalid -------------------------------------------

    #[test]
    fn test_dew_point_is_unclassified_for_any_value() {
        for value in [-12.0, 0.0, 18.5, f64::NAN] {
            assert_eq!(band(PollutantKey::DewPoint, value), Classification::Unclassified);
        }
    }

    #[test]
    fn test_negative_and_nan_values_are_errors() {
        let table = BreakpointTable::us_epa();
        let classifier = Classifier::new(&table);
        for value in [-0.1, f64::NAN, f64::INFINITY] {
            let result = classifier.classify(PollutantKey::Pm25, value);
            assert!(
                matches!(result, Err(ClassifyError::InvalidValue { .. })),
                "{} should be rejected, got {:?}",
                value,
                result
            );
        }
    }

    // --- Palette ------------------------------------------------------------

    #[test]
    fn test_palette_covers_the_widest_table() {
        let palette = SeverityPalette::standard();
        assert_eq!(palette.len(), BreakpointTable::us_epa().max_bands());
        assert_eq!(palette.level(0).unwrap().label, "Good");
        assert_eq!(palette.level(6).unwrap().range, "401+");
    }

    #[test]
    fn test_standard_palette_covers_us_epa_table() {
        let table = BreakpointTable::us_epa();
        assert_eq!(SeverityPalette::standard().ensure_covers(&table), Ok(()));
    }

    #[test]
    fn test_short_or_empty_palette_does_not_cover_table() {
        let table = BreakpointTable::us_epa();
        let standard = SeverityPalette::standard();
        let short = SeverityPalette::new(standard.levels()[..5].to_vec());
        assert_eq!(
            short.ensure_covers(&table),
            Err(PaletteError::OutOfRange { index: 6, len: 5 })
        );
        assert_eq!(
            SeverityPalette::new(Vec::new()).ensure_covers(&table),
            Err(PaletteError::OutOfRange { index: 6, len: 0 })
        );
    }

    #[test]
    fn test_palette_lookup_past_the_end_fails() {
        let palette = SeverityPalette::standard();
        assert_eq!(
            palette.level(7),
            Err(PaletteError::OutOfRange { index: 7, len: 7 })
        );
    }

    #[test]
    fn test_severity_resolves_band_to_level() {
        let table = BreakpointTable::us_epa();
        let palette = SeverityPalette::standard();
        let classifier = Classifier::new(&table);
        let level = classifier
            .severity(&palette, IndexKey::Aqi, 153.0)
            .unwrap()
            .expect("aqi is classifiable");
        assert_eq!(level.emoji, "😷");
        assert!(classifier
            .severity(&palette, PollutantKey::Pressure, 1012.0)
            .unwrap()
            .is_none());
    }
}
