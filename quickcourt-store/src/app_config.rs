use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub booking: BookingRules,
    #[serde(default)]
    pub session: SessionConfig,
    /// Venue to open when none is given on the command line
    #[serde(default)]
    pub venue_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 { 10 }

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    /// Hourly rate used when a sport has no pricing rows
    #[serde(default = "default_price_per_hour")]
    pub default_price_per_hour: u32,
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
    #[serde(default)]
    pub clear_pin_on_failure: bool,
    /// Give up on a booking request after this long. Unset means wait forever.
    #[serde(default)]
    pub submit_timeout_secs: Option<u64>,
}

fn default_price_per_hour() -> u32 { 600 }
fn default_redirect_delay_ms() -> u64 { 2000 }

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            default_price_per_hour: default_price_per_hour(),
            redirect_delay_ms: default_redirect_delay_ms(),
            clear_pin_on_failure: false,
            submit_timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    /// Where the signed-in user is kept between runs. Unset keeps it in memory.
    pub file: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Layered load from `dir`: default, then RUN_MODE, then local, then env
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("api.base_url", "http://localhost:8000")?
            .add_source(config::File::from(dir.join("default")).required(false))
            .add_source(config::File::from(dir.join(&run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::from(dir.join("local")).required(false))
            // e.g. QUICKCOURT__API__BASE_URL=http://api:8000
            .add_source(config::Environment::with_prefix("QUICKCOURT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
