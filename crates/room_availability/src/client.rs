use crate::{
    config::ClientCredentials,
    error::{FetchError, Result},
    payload::SearchPayload,
};
use log::debug;
use reqwest::{StatusCode, blocking::Client};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// One booking-search call per hotel.
pub trait BookingSearch {
    fn search(&self, payload: &SearchPayload) -> Result<Value>;
}

pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

pub struct HttpBookingClient {
    client: Client,
    url: String,
    token: String,
}

impl HttpBookingClient {
    pub fn new(client: Client, url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            token: token.into(),
        }
    }
}

impl BookingSearch for HttpBookingClient {
    fn search(&self, payload: &SearchPayload) -> Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        debug!("{} -> {} ({} bytes)", payload.hotel_id, status, body.len());
        parse_search_body(status, &payload.hotel_id, &body)
    }
}

fn parse_search_body(status: StatusCode, hotel_id: &str, body: &str) -> Result<Value> {
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            hotel_id: hotel_id.to_string(),
            body: body.to_string(),
        });
    }
    serde_json::from_str(body).map_err(FetchError::NonJson)
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'a str,
}

/// Exchange client credentials for a bearer token.
pub fn fetch_auth_token(client: &Client, credentials: &ClientCredentials) -> Result<String> {
    let request = TokenRequest {
        client_id: &credentials.client_id,
        client_secret: &credentials.client_secret,
        audience: &credentials.audience,
        grant_type: &credentials.grant_type,
    };

    let response = client.post(&credentials.auth_url).json(&request).send()?;
    let status = response.status();
    let body = response.text()?;
    parse_token_body(status, &body)
}

fn parse_token_body(status: StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        return Err(FetchError::AuthFailed {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let data: Value = serde_json::from_str(body).map_err(FetchError::AuthNonJson)?;
    match data.get("access_token") {
        Some(Value::String(token)) if !token.is_empty() => Ok(token.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(FetchError::MissingAccessToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_body_success() {
        let value = parse_search_body(StatusCode::OK, "H1", r#"{"success": true}"#).unwrap();
        assert_eq!(value["success"], true);
    }

    #[test]
    fn test_parse_search_body_http_error() {
        let err = parse_search_body(StatusCode::UNAUTHORIZED, "H1", "expired").unwrap_err();
        assert_eq!(err.to_string(), "401 error for H1: expired");
    }

    #[test]
    fn test_parse_search_body_non_json() {
        let err = parse_search_body(StatusCode::OK, "H1", "<html>").unwrap_err();
        assert!(matches!(err, FetchError::NonJson(_)));
        assert_eq!(err.to_string(), "Non-JSON response received");
    }

    #[test]
    fn test_parse_token_body() {
        let token = parse_token_body(StatusCode::OK, r#"{"access_token": "abc", "expires_in": 86400}"#);
        assert_eq!(token.unwrap(), "abc");
    }

    #[test]
    fn test_parse_token_body_errors() {
        assert!(matches!(
            parse_token_body(StatusCode::FORBIDDEN, "denied"),
            Err(FetchError::AuthFailed { status: 403, .. })
        ));
        assert!(matches!(
            parse_token_body(StatusCode::OK, "nope"),
            Err(FetchError::AuthNonJson(_))
        ));
        assert!(matches!(
            parse_token_body(StatusCode::OK, r#"{"access_token": ""}"#),
            Err(FetchError::MissingAccessToken)
        ));
        assert!(matches!(
            parse_token_body(StatusCode::OK, r#"{"token_type": "Bearer"}"#),
            Err(FetchError::MissingAccessToken)
        ));
    }
}
