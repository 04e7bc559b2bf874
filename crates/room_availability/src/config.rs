use crate::{
    error::{FetchError, Result},
    payload::{SearchTemplate, parse_stays},
};
use log::{debug, warn};
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

const ENV_BOOKINGS_URL: &str = "KUONI_BOOKINGS_URL";
const ENV_EVENT_ID: &str = "KUONI_BOOKINGS_EVENT_ID";
const ENV_MCODE: &str = "KUONI_BOOKINGS_MCODE";
const ENV_BOOKINGS_TOKEN: &str = "KUONI_BOOKINGS_TOKEN";
const ENV_BEARER_TOKEN: &str = "KUONI_BEARER_TOKEN";
const ENV_AUTH_URL: &str = "KUONI_AUTH_URL";
const ENV_AUTH_CLIENT_ID: &str = "KUONI_AUTH_CLIENT_ID";
const ENV_AUTH_CLIENT_SECRET: &str = "KUONI_AUTH_CLIENT_SECRET";
const ENV_AUTH_AUDIENCE: &str = "KUONI_AUTH_AUDIENCE";
const ENV_AUTH_GRANT_TYPE: &str = "KUONI_AUTH_GRANT_TYPE";

pub const DEFAULT_URL: &str = "https://api.kuonitumlare.com/v1/hotelmap/bookings/search";
pub const DEFAULT_EVENT_ID: &str = "20000";
pub const DEFAULT_MCODE: &str = "MXXXX";
pub const DEFAULT_LANGUAGE: &str = "en_GB";
pub const DEFAULT_AUTH_URL: &str = "https://kuonitumlare.eu.auth0.com/oauth/token";
pub const DEFAULT_AUTH_AUDIENCE: &str = "http://52.208.167.3/staging";
pub const DEFAULT_AUTH_GRANT_TYPE: &str = "client_credentials";
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// Booking API options. Anything left unset falls back to the environment,
/// then to the built-in defaults.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ApiArgs {
    /// Override bookings search URL (env KUONI_BOOKINGS_URL)
    #[arg(long)]
    pub url: Option<String>,

    /// Bearer token for the Authorization header (env KUONI_BOOKINGS_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// MCode for the booking request (env KUONI_BOOKINGS_MCODE)
    #[arg(long)]
    pub mcode: Option<String>,

    /// Event ID for the booking request (env KUONI_BOOKINGS_EVENT_ID)
    #[arg(long = "event-id")]
    pub event_id: Option<String>,

    /// Language code for results
    #[arg(long)]
    pub language: Option<String>,

    /// Set best_only to false (default is true)
    #[arg(long = "all-rates")]
    pub all_rates: bool,

    /// Add a stay config entry (e.g. 2026-08-30:10); repeat for multiple dates
    #[arg(long = "stay", value_name = "DATE:ROOMS")]
    pub stays: Vec<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: f64,

    /// Auth token URL for the client credentials flow (env KUONI_AUTH_URL)
    #[arg(long = "auth-url")]
    pub auth_url: Option<String>,

    /// Client ID for auth token fetch (env KUONI_AUTH_CLIENT_ID)
    #[arg(long = "auth-client-id")]
    pub auth_client_id: Option<String>,

    /// Client secret for auth token fetch (env KUONI_AUTH_CLIENT_SECRET)
    #[arg(long = "auth-client-secret")]
    pub auth_client_secret: Option<String>,

    /// Audience for auth token fetch (env KUONI_AUTH_AUDIENCE)
    #[arg(long = "auth-audience")]
    pub auth_audience: Option<String>,

    /// Grant type for auth token fetch (env KUONI_AUTH_GRANT_TYPE)
    #[arg(long = "auth-grant-type")]
    pub auth_grant_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub audience: String,
    pub grant_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Client(ClientCredentials),
}

impl Credentials {
    /// A bearer token wins; otherwise client id and secret are both required.
    pub fn from_env(args: &ApiArgs) -> Result<Self> {
        if let Some(token) = pick(&args.token, &[ENV_BOOKINGS_TOKEN, ENV_BEARER_TOKEN]) {
            return Ok(Self::Bearer(token));
        }

        let client_id = pick(&args.auth_client_id, &[ENV_AUTH_CLIENT_ID]);
        let client_secret = pick(&args.auth_client_secret, &[ENV_AUTH_CLIENT_SECRET]);
        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Self::Client(ClientCredentials {
                auth_url: pick(&args.auth_url, &[ENV_AUTH_URL])
                    .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
                client_id,
                client_secret,
                audience: pick(&args.auth_audience, &[ENV_AUTH_AUDIENCE])
                    .unwrap_or_else(|| DEFAULT_AUTH_AUDIENCE.to_string()),
                grant_type: pick(&args.auth_grant_type, &[ENV_AUTH_GRANT_TYPE])
                    .unwrap_or_else(|| DEFAULT_AUTH_GRANT_TYPE.to_string()),
            })),
            _ => Err(FetchError::MissingCredentials),
        }
    }
}

/// Settings for the live fetch, resolved once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub url: String,
    pub template: SearchTemplate,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env(args: &ApiArgs) -> Result<Self> {
        if !(args.timeout.is_finite() && args.timeout > 0.0) {
            return Err(FetchError::InvalidConfiguration(format!(
                "Timeout must be a positive number of seconds, got {}",
                args.timeout
            )));
        }

        let template = SearchTemplate {
            mcode: pick(&args.mcode, &[ENV_MCODE]).unwrap_or_else(|| DEFAULT_MCODE.to_string()),
            event_id: pick(&args.event_id, &[ENV_EVENT_ID])
                .unwrap_or_else(|| DEFAULT_EVENT_ID.to_string()),
            best_only: !args.all_rates,
            language: pick(&args.language, &[])
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            stays: parse_stays(&args.stays)?,
        };

        Ok(Self {
            url: pick(&args.url, &[ENV_BOOKINGS_URL]).unwrap_or_else(|| DEFAULT_URL.to_string()),
            template,
            timeout: Duration::from_secs_f64(args.timeout),
        })
    }
}

/// Load `.env` values into the process environment, from `path` or from the
/// nearest `.env` above the working directory. Variables already set win.
pub fn load_dotenv(path: Option<&Path>) -> Option<PathBuf> {
    let loaded = match path {
        Some(p) => dotenvy::from_path(p).map(|()| p.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(p) => {
            debug!("Loaded environment from {}", p.display());
            Some(p)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!("Ignoring unreadable .env file: {e}");
            None
        }
    }
}

/// First non-blank value among the CLI flag and the given env keys.
fn pick(cli: &Option<String>, env_keys: &[&str]) -> Option<String> {
    non_blank(cli.clone()).or_else(|| {
        env_keys
            .iter()
            .find_map(|key| non_blank(env::var(key).ok()))
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
