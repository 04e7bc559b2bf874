use availability::AvailabilityError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No bearer token provided; set --token or provide auth client credentials")]
    MissingCredentials,

    #[error("Invalid stay '{stay}': {reason}")]
    InvalidStay { stay: String, reason: String },

    #[error("{status} error for {hotel_id}: {body}")]
    Status {
        status: u16,
        hotel_id: String,
        body: String,
    },

    #[error("Non-JSON response received")]
    NonJson(#[source] serde_json::Error),

    #[error("Auth request failed with {status}: {body}")]
    AuthFailed { status: u16, body: String },

    #[error("Auth endpoint returned non-JSON")]
    AuthNonJson(#[source] serde_json::Error),

    #[error("Auth response missing access_token")]
    MissingAccessToken,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Availability(#[from] AvailabilityError),
}

pub type Result<T> = std::result::Result<T, FetchError>;
