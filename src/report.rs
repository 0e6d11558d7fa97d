//! Assembles the complete menu from the per-city reports.
//!
//! # Clock injection
//! The aggregator never reads the clock. "Today", "tomorrow" and "now" are
//! fixed once at startup and handed in, so output is deterministic in tests.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::breakpoints::IndexKey;
use crate::constants::FEED_DATE_FORMAT;
use crate::error::{PaletteError, ReportError};
use crate::formatters::{column_width, fit_label, LineFormatter, MenuLine, Style, Tone};
use crate::models::{CityReport, PollutantKey};
use crate::severity::{Classifier, SeverityPalette};

/// Current readings in display order; a separator precedes the particulate group.
pub const CURRENT_ORDER: [PollutantKey; 11] = [
    PollutantKey::Temperature,
    PollutantKey::Pressure,
    PollutantKey::Humidity,
    PollutantKey::DewPoint,
    PollutantKey::Wind,
    PollutantKey::Pm25,
    PollutantKey::Pm10,
    PollutantKey::Co,
    PollutantKey::So2,
    PollutantKey::No2,
    PollutantKey::O3,
];

const PARTICULATE_GROUP_START: PollutantKey = PollutantKey::Pm25;

/// Suffix marking a forecast value as the daily maximum.
const MAX_SUFFIX: &str = "\u{208d}\u{2098}\u{2090}\u{2093}\u{208e}";

// ---------------------------------------------------------------------------
// Run dates
// ---------------------------------------------------------------------------

/// Calendar dates forecast entries are matched against, as feed date strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDates {
    pub today: String,
    pub tomorrow: String,
}

impl RunDates {
    pub fn from_date(today: NaiveDate) -> Self {
        let tomorrow = today.succ_opt().unwrap_or(today);
        Self {
            today: today.format(FEED_DATE_FORMAT).to_string(),
            tomorrow: tomorrow.format(FEED_DATE_FORMAT).to_string(),
        }
    }

    /// Dates of the local calendar day the process runs on.
    pub fn local() -> Self {
        Self::from_date(Local::now().date_naive())
    }
}

/// `"N hours ago"` once at least an hour has passed, otherwise `"N minutes ago"`.
///
/// A timestamp ahead of `now` reads as `"0 minutes ago"`.
pub fn relative_age(updated: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - updated).num_seconds().max(0);
    if seconds >= 3600 {
        format!("{} hours ago", seconds / 3600)
    } else {
        format!("{} minutes ago", seconds / 60)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Result of fetching and decoding one configured location.
#[derive(Debug, Clone, PartialEq)]
pub enum CityOutcome {
    Ready(CityReport),
    Failed { label: String, reason: String },
}

impl CityOutcome {
    pub fn label(&self) -> &str {
        match self {
            CityOutcome::Ready(report) => &report.label,
            CityOutcome::Failed { label, .. } => label,
        }
    }
}

/// The single line shown when there is no network at all.
pub fn offline_line() -> MenuLine {
    MenuLine::item(0, "AQI: \u{1f6f0}", Style::top().with_tone(Tone::Alert))
}

pub struct ReportAggregator<'a> {
    classifier: Classifier<'a>,
    palette: &'a SeverityPalette,
    dates: &'a RunDates,
    now: DateTime<Utc>,
}

impl<'a> ReportAggregator<'a> {
    pub fn new(
        classifier: Classifier<'a>,
        palette: &'a SeverityPalette,
        dates: &'a RunDates,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            classifier,
            palette,
            dates,
            now,
        }
    }

    /// Builds the whole menu: summary lines, then one block per city in
    /// input order, then the legend.
    ///
    /// Bad data only costs the affected city its block; a palette mismatch
    /// aborts the report.
    pub fn render(&self, outcomes: &[CityOutcome]) -> Result<Vec<MenuLine>, PaletteError> {
        let mut lines = Vec::new();

        let summary_labels: Vec<String> = outcomes
            .iter()
            .map(|o| format!("AQI {}:", o.label()))
            .collect();
        let summary = LineFormatter::for_labels(0, summary_labels.iter().map(String::as_str));
        for (outcome, label) in outcomes.iter().zip(&summary_labels) {
            let line = match outcome {
                CityOutcome::Ready(report) => recover(self.summary_line(&summary, label, report))?,
                CityOutcome::Failed { .. } => None,
            };
            lines.push(line.unwrap_or_else(|| {
                let text = format!("{} n/a", fit_label(label, summary.width()));
                MenuLine::item(0, text, Style::top())
            }));
        }

        lines.push(MenuLine::separator(0));

        for outcome in outcomes {
            let block = match outcome {
                CityOutcome::Ready(report) => match self.city_block(report) {
                    Ok(block) => block,
                    Err(ReportError::Palette(e)) => return Err(e),
                    Err(e) => {
                        tracing::warn!("{}: dropping block: {}", report.label, e);
                        failed_block(&report.label, &e.to_string())
                    }
                },
                CityOutcome::Failed { label, reason } => failed_block(label, reason),
            };
            lines.extend(block);
        }

        lines.extend(self.legend());
        Ok(lines)
    }

    fn summary_line(
        &self,
        formatter: &LineFormatter,
        label: &str,
        report: &CityReport,
    ) -> Result<MenuLine, ReportError> {
        let severity = self.classifier.severity(self.palette, IndexKey::Aqi, report.aqi)?;
        Ok(formatter.index(label, report.aqi, severity, Style::top()))
    }

    /// Header, link, AQI, age and the readings submenu of one city.
    pub fn city_block(&self, report: &CityReport) -> Result<Vec<MenuLine>, ReportError> {
        let mut lines = vec![
            MenuLine::item(0, report.label.as_str(), Style::top()),
            MenuLine::item(1, report.label.as_str(), Style::sub().with_href(report.url.as_str())),
        ];

        let severity = self.classifier.severity(self.palette, IndexKey::Aqi, report.aqi)?;
        lines.push(LineFormatter::new(1, 5).index("AQI :", report.aqi, severity, Style::top()));
        lines.push(MenuLine::item(
            1,
            format!("Last Update: {}", relative_age(report.updated, self.now)),
            Style::sub(),
        ));

        lines.push(MenuLine::separator(1));
        lines.extend(self.current_block(report)?);

        lines.push(MenuLine::separator(1));
        lines.push(MenuLine::item(
            1,
            format!("Forecast:  {}", self.dates.tomorrow),
            Style::sub(),
        ));
        lines.push(MenuLine::separator(1));
        lines.extend(self.forecast_block(report)?);

        Ok(lines)
    }

    /// Current readings in `CURRENT_ORDER`, followed by today's UV maximum.
    fn current_block(&self, report: &CityReport) -> Result<Vec<MenuLine>, ReportError> {
        let present: Vec<_> = CURRENT_ORDER
            .iter()
            .filter_map(|&key| report.reading(key))
            .collect();
        let uvi_today = report
            .forecast_for(PollutantKey::Uvi, &self.dates.today)
            .next();

        let labels = present
            .iter()
            .map(|r| r.key.spec().label)
            .chain(uvi_today.map(|e| e.key.spec().label));
        let formatter = LineFormatter::for_labels(1, labels);

        let mut lines = Vec::new();
        for key in CURRENT_ORDER {
            if key == PARTICULATE_GROUP_START {
                lines.push(MenuLine::separator(1));
            }
            let Some(reading) = report.reading(key) else {
                tracing::debug!("{}: no current '{}' reading", report.label, key);
                continue;
            };
            let spec = key.spec();
            let severity = self.classifier.severity(self.palette, key, reading.value)?;
            lines.push(formatter.reading(spec.label, reading.value, spec.unit, severity));
        }

        if let Some(entry) = uvi_today {
            let spec = entry.key.spec();
            match recover(self.classifier.severity(self.palette, entry.key, entry.max))? {
                Some(severity) => {
                    lines.push(formatter.reading(spec.label, entry.max, spec.unit, severity))
                }
                None => tracing::warn!("{}: skipping today's UV index {}", report.label, entry.max),
            }
        }

        Ok(lines)
    }

    /// Tomorrow's maximum for every forecast key, in feed order.
    fn forecast_block(&self, report: &CityReport) -> Result<Vec<MenuLine>, ReportError> {
        let mut keys: Vec<PollutantKey> = Vec::new();
        for entry in &report.forecast {
            if !keys.contains(&entry.key) {
                keys.push(entry.key);
            }
        }

        let selected: Vec<_> = keys
            .into_iter()
            .filter_map(|key| report.forecast_for(key, &self.dates.tomorrow).next())
            .map(|entry| (format!("{}{}", entry.key.spec().label, MAX_SUFFIX), entry))
            .collect();
        let formatter =
            LineFormatter::new(1, column_width(selected.iter().map(|(l, _)| l.as_str())));

        let mut lines = Vec::new();
        for (label, entry) in &selected {
            match recover(self.classifier.severity(self.palette, entry.key, entry.max))? {
                Some(severity) => {
                    lines.push(formatter.reading(label, entry.max, entry.key.spec().unit, severity))
                }
                None => tracing::warn!(
                    "{}: skipping {} forecast for {}",
                    report.label,
                    entry.key,
                    entry.date
                ),
            }
        }
        Ok(lines)
    }

    /// Static scale of all severity bands.
    pub fn legend(&self) -> Vec<MenuLine> {
        let levels = self.palette.levels();
        let formatter = LineFormatter::for_labels(1, levels.iter().map(|l| l.range));

        let mut lines = vec![
            MenuLine::item(0, "AQI Scale", Style::top()),
            MenuLine::item(1, "AQI Scale [US-EPA 2016]", Style::sub()),
            MenuLine::separator(1),
        ];
        lines.extend(levels.iter().map(|level| formatter.legend(level)));
        lines
    }
}

fn failed_block(label: &str, reason: &str) -> Vec<MenuLine> {
    vec![
        MenuLine::item(0, label, Style::top()),
        MenuLine::item(
            1,
            format!("Data unavailable: {}", reason),
            Style::sub().with_tone(Tone::Alert),
        ),
    ]
}

/// Splits city-local failures from fatal ones: `Ok(None)` means the value
/// was bad and has been logged, `Err` means the palette is out of step.
fn recover<T>(result: Result<T, ReportError>) -> Result<Option<T>, PaletteError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ReportError::Palette(e)) => Err(e),
        Err(e) => {
            tracing::warn!("{}", e);
            Ok(None)
        }
    }
}
