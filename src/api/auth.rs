//! Phone + OTP authentication and profile endpoints

use serde_json::{json, Value};
use std::sync::Arc;

use super::models::{ProfileUpdate, Registration, UserProfile};
use super::{decode, encode, keys};
use crate::gateway::{
    ApiError, ApiErrorKind, Envelope, Gateway, RequestOptions, STATUS_INVALID_RESPONSE,
};
use crate::session::Session;

/// Response to a login request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginChallenge {
    /// Server message, if any
    pub message: Option<String>,
    /// OTP echoed back by development backends
    pub otp: Option<String>,
}

/// Outcome of a verified login
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSession {
    pub token: String,
    pub role: Option<String>,
    pub user_id: Option<String>,
}

impl LoginSession {
    /// Converts to the persisted session for `phone_number`
    pub fn into_session(self, phone_number: &str) -> Session {
        Session {
            token: self.token,
            role: Some(self.role.unwrap_or_else(|| "user".to_string())),
            phone_number: Some(phone_number.to_string()),
            user_id: self.user_id,
        }
    }
}

/// Looks up `field` at the top level, then under `data`
fn field_or_nested<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get(field)
        .filter(|value| !value.is_null())
        .or_else(|| body.get("data").and_then(|data| data.get(field)))
        .filter(|value| !value.is_null())
}

fn string_field(body: &Value, field: &str) -> Option<String> {
    field_or_nested(body, field).and_then(|value| match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone)]
pub struct AuthApi {
    gateway: Arc<Gateway>,
}

impl AuthApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn register(&self, registration: &Registration) -> Result<Value, ApiError> {
        self.gateway
            .request("/auth/register", RequestOptions::post(encode(registration)))
            .await
    }

    /// Starts a login; the backend sends an OTP to the phone
    pub async fn login(&self, phone_number: &str) -> Result<LoginChallenge, ApiError> {
        let body = self
            .gateway
            .request(
                "/auth/login",
                RequestOptions::post(json!({ "phoneNumber": phone_number })),
            )
            .await?;

        Ok(LoginChallenge {
            message: string_field(&body, "message"),
            otp: string_field(&body, "otp"),
        })
    }

    /// Completes a login with the OTP and returns the issued token
    pub async fn verify_login(
        &self,
        phone_number: &str,
        otp: &str,
    ) -> Result<LoginSession, ApiError> {
        let body = self
            .gateway
            .request(
                "/auth/verify-login",
                RequestOptions::post(json!({ "phoneNumber": phone_number, "otp": otp })),
            )
            .await?;

        let token = string_field(&body, "token").ok_or_else(|| {
            ApiError::new(
                ApiErrorKind::InvalidResponse,
                STATUS_INVALID_RESPONSE,
                "Login response did not include a token",
            )
        })?;
        let user = field_or_nested(&body, "user");

        Ok(LoginSession {
            token,
            role: user.and_then(|user| string_field(user, "role")),
            user_id: user.and_then(|user| {
                string_field(user, "id").or_else(|| string_field(user, "_id"))
            }),
        })
    }

    pub async fn send_otp(&self, phone_number: &str) -> Result<Value, ApiError> {
        self.gateway
            .request(
                "/auth/send-otp",
                RequestOptions::post(json!({ "phoneNumber": phone_number })),
            )
            .await
    }

    pub async fn verify_otp(&self, phone_number: &str, otp: &str) -> Result<Value, ApiError> {
        self.gateway
            .request(
                "/auth/verify-otp",
                RequestOptions::post(json!({ "phoneNumber": phone_number, "otp": otp })),
            )
            .await
    }

    /// Signed-in profile, cached under `user-profile`
    ///
    /// The backend may return the profile bare or wrapped in `user`/`data`.
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let body = self
            .gateway
            .cached_read(keys::USER_PROFILE, "/auth/profile", Envelope::Whole)
            .await?;
        let profile = field_or_nested(&body, "user")
            .or_else(|| body.get("data").filter(|data| data.is_object()))
            .cloned()
            .unwrap_or(body);
        decode(profile)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Value, ApiError> {
        let response = self
            .gateway
            .request("/auth/profile", RequestOptions::put(encode(update)))
            .await?;
        self.gateway.invalidate(Some(keys::USER_PROFILE));
        Ok(response)
    }

    pub async fn save_address(&self, address: &str) -> Result<Value, ApiError> {
        self.gateway
            .request("/auth/address", RequestOptions::post(json!({ "address": address })))
            .await
    }

    pub async fn addresses(&self) -> Result<Value, ApiError> {
        self.gateway
            .request("/auth/address", RequestOptions::get())
            .await
    }
}
