//! Login and VIN decode.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::CatalogClient;
use crate::error::{Error, Result};
use crate::types::{Vin, VinDecoded};

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

impl CatalogClient {
    /// Log in and return the bearer token
    ///
    /// # Errors
    /// A rejected login (including HTTP 401) is reported as [`Error::Api`] with
    /// context "login"; a response without a token as [`Error::InvalidResponse`].
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let url = self.url("auth/login");
        let body = json!({
            "username": username,
            "password": password,
            "invalidateOldestToken": false,
            "epnSellerID": "",
        });

        let response: LoginResponse = self
            .send_json("login", || {
                self.http
                    .post(&url)
                    .header("Accept", "application/json")
                    .header("x-application-key", &self.api.application_key)
                    .json(&body)
            })
            .await
            .map_err(|e| match e {
                Error::SessionExpired => Error::Api {
                    context: "login".to_string(),
                    status: 401,
                    message: "invalid credentials".to_string(),
                },
                other => other,
            })?;

        let token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidResponse("login response has no access token".into()))?;

        info!(username, "logged in to catalog API");
        Ok(token)
    }

    /// Decode a VIN into the vehicle configuration used by every catalog query
    ///
    /// # Errors
    /// [`Error::SessionExpired`] on HTTP 401; [`Error::InvalidResponse`] when the
    /// response carries no vehicle data or no configuration.
    pub async fn decode_vin(&self, token: &str, vin: &Vin) -> Result<VinDecoded> {
        let url = self.url("vin/decode-vin");
        let body = json!({ "vins": [vin.as_str()] });

        let response: Value = self
            .send_json("VIN decode", || {
                self.http
                    .post(&url)
                    .bearer_auth(token)
                    .header("Accept", "application/json")
                    .json(&body)
            })
            .await?;

        let first = response
            .get("data")
            .and_then(Value::as_array)
            .and_then(|data| data.first())
            .ok_or_else(|| {
                Error::InvalidResponse("no vehicle data returned from VIN decode".into())
            })?;

        let vehicle_configuration = match first.get("vehicleConfiguration") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Null) | None => {
                return Err(Error::InvalidResponse(
                    "vehicle configuration not found in VIN decode response".into(),
                ));
            }
            Some(Value::String(_)) => {
                return Err(Error::InvalidResponse(
                    "vehicle configuration in VIN decode response is empty".into(),
                ));
            }
            Some(other) => other.to_string(),
        };

        debug!(vin = %vin, "VIN decoded");
        Ok(VinDecoded {
            vehicle_configuration,
            response,
        })
    }
}
