//! Process configuration, read once from the environment (and `.env`).

use crate::constants::DEFAULT_CITIES;
use crate::error::ConfigError;
use crate::formatters::{MenuProtocol, Renderer, Terminal};

pub const TOKEN_VAR: &str = "WAQI_API_TOKEN";
pub const CITIES_VAR: &str = "AQI_CITIES";
pub const OUTPUT_VAR: &str = "AQI_OUTPUT";

/// A configured location: the feed path after `/feed/` and its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub feed: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Status-bar menu protocol.
    #[default]
    Menu,
    /// ANSI-coloured text for a terminal.
    Terminal,
}

impl OutputStyle {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            OutputStyle::Menu => Box::new(MenuProtocol),
            OutputStyle::Terminal => Box::new(Terminal),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub cities: Vec<City>,
    pub output: OutputStyle,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; variables may come from the host.
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing(TOKEN_VAR))?;

        let cities = match lookup(CITIES_VAR) {
            Some(raw) => parse_cities(&raw)?,
            None => DEFAULT_CITIES
                .iter()
                .map(|(feed, label)| City {
                    feed: feed.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        };

        let output = match lookup(OUTPUT_VAR).as_deref().map(str::trim) {
            None | Some("") | Some("menu") => OutputStyle::Menu,
            Some("terminal") => OutputStyle::Terminal,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: OUTPUT_VAR,
                    reason: format!("unknown output '{}', expected 'menu' or 'terminal'", other),
                })
            }
        };

        Ok(Self {
            token,
            cities,
            output,
        })
    }
}

/// Parses `feed/path=Name,other/path=Other`, keeping the given order.
fn parse_cities(raw: &str) -> Result<Vec<City>, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: CITIES_VAR,
        reason,
    };

    let mut cities = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (feed, label) = entry
            .split_once('=')
            .ok_or_else(|| invalid(format!("'{}' is not of the form path=Name", entry)))?;
        let (feed, label) = (feed.trim(), label.trim());
        if feed.is_empty() || label.is_empty() {
            return Err(invalid(format!("'{}' has an empty path or name", entry)));
        }
        cities.push(City {
            feed: feed.to_string(),
            label: label.to_string(),
        });
    }

    if cities.is_empty() {
        return Err(invalid("no cities listed".to_string()));
    }
    Ok(cities)
}
