use anyhow::Result;
use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aqi_bar::breakpoints::BreakpointTable;
use aqi_bar::config::Config;
use aqi_bar::constants::DEFAULT_LOG_FILTER;
use aqi_bar::report::{offline_line, ReportAggregator, RunDates};
use aqi_bar::service::{is_connected, AirQuality};
use aqi_bar::severity::{Classifier, SeverityPalette};

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the menu, so logs go to stderr only.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let renderer = config.output.renderer();

    if !is_connected().await {
        tracing::warn!("No network connectivity");
        print!("{}", renderer.render(&[offline_line()]));
        return Ok(());
    }

    let table = BreakpointTable::us_epa();
    let palette = SeverityPalette::standard();
    palette.ensure_covers(&table)?;
    let dates = RunDates::local();

    let service = AirQuality::new(config.token.as_str())?;
    let mut outcomes = Vec::with_capacity(config.cities.len());
    for city in &config.cities {
        outcomes.push(service.fetch_city(city).await);
    }

    let aggregator = ReportAggregator::new(Classifier::new(&table), &palette, &dates, Utc::now());
    let lines = aggregator.render(&outcomes)?;
    print!("{}", renderer.render(&lines));

    tracing::info!("Rendered {} cities", outcomes.len());
    Ok(())
}
