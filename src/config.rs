use std::{env, time::Duration};
use tracing::{info, warn};

pub const DEFAULT_CASES_URL: &str = "https://data.virginia.gov/resource/bre9-aqqr.json";
pub const DEFAULT_POPULATION_URL: &str = "https://data.virginia.gov/resource/5s4f-hthh.json";
pub const DEFAULT_GEOJSON_URL: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/geojson-counties-fips.json";
pub const DEFAULT_LOCALITY: &str = "Charlottesville";

const DEFAULT_FETCH_LIMIT: u32 = 100_000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 8080;

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub app_token: Option<String>,
    pub cases_url: String,
    pub population_url: String,
    pub fetch_limit: u32,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    pub default_locality: String,
    pub geojson_url: String,
    pub port: u16,
}

impl Config {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenv::dotenv() {
            info!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let text = |key: &str, default: &str| non_blank(key).unwrap_or_else(|| default.to_string());
        let app_token = non_blank("COVID_APP_TOKEN").or_else(|| non_blank("covidApp"));

        Self {
            app_token,
            cases_url: text("CASES_URL", DEFAULT_CASES_URL),
            population_url: text("POPULATION_URL", DEFAULT_POPULATION_URL),
            fetch_limit: parse_or(&lookup, "FETCH_LIMIT", DEFAULT_FETCH_LIMIT),
            fetch_timeout: Duration::from_secs(parse_or(
                &lookup,
                "FETCH_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            user_agent: text(
                "CLIENT_USER_AGENT",
                concat!("va-covid-dashboard/", env!("CARGO_PKG_VERSION")),
            ),
            default_locality: text("DEFAULT_LOCALITY", DEFAULT_LOCALITY),
            geojson_url: text("COUNTY_GEOJSON_URL", DEFAULT_GEOJSON_URL),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_token", &self.app_token.as_ref().map(|_| "<redacted>"))
            .field("cases_url", &self.cases_url)
            .field("population_url", &self.population_url)
            .field("fetch_limit", &self.fetch_limit)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("user_agent", &self.user_agent)
            .field("default_locality", &self.default_locality)
            .field("geojson_url", &self.geojson_url)
            .field("port", &self.port)
            .finish()
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring invalid {key}={raw:?}, using {default}");
                default
            }
        },
        None => default,
    }
}
