/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "aqi_bar=info";

/// User agent string for HTTP requests
pub const USER_AGENT: &str = "aqi-bar/0.1.0";

/// World Air Quality Index feed API base URL
pub const WAQI_API_BASE: &str = "https://api.waqi.info";

/// Address probed to decide whether the network is reachable at all
pub const PROBE_ADDR: (&str, u16) = ("1.1.1.1", 53);

/// Upper bound on the connectivity probe, in seconds
pub const PROBE_TIMEOUT_SECS: u64 = 3;

/// Font directive for top-level menu lines
pub const FONT_SIZE_TOP: u8 = 13;

/// Font directive for submenu lines
pub const FONT_SIZE_SUB: u8 = 14;

pub const FONT_FACE: &str = "Menlo";

/// Stations shown when `AQI_CITIES` is not set: (feed path, display name).
pub const DEFAULT_CITIES: [(&str, &str); 3] = [
    ("india/kolkata/jadavpur", "Kolkata"),
    ("delhi/bramprakash-ayurvedic-hospital--najafgarh", "Delhi"),
    ("india/bengaluru/hebbal", "Bengaluru"),
];

/// Timestamp layout of `data.time.s` in a feed payload
pub const FEED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date layout of forecast entries and of the rendered forecast header
pub const FEED_DATE_FORMAT: &str = "%Y-%m-%d";

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_default_log_filter_enables_info_for_this_crate() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).expect("filter should parse");
        assert_eq!(filter.to_string(), "aqi_bar=info");
    }
}
