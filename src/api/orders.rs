//! Orders, users and health endpoints
//!
//! These are the endpoints the backend may not implement. Booking details
//! fold a 404 into an empty list; the users listing reports it as
//! `Availability::Unavailable` so callers can tell "no data" from "no endpoint".

use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use super::models::{Booking, User};
use super::{decode, Availability};
use crate::gateway::{ApiError, Gateway, RequestOptions};

/// Finds the list inside a response: a bare array, or under one of `fields`
/// at the top level or inside `data`
fn extract_list(body: Value, fields: &[&str]) -> Value {
    if body.is_array() {
        return body;
    }
    for field in fields {
        let found = body
            .get(*field)
            .filter(|value| value.is_array())
            .or_else(|| {
                body.get("data")
                    .and_then(|data| data.get(*field))
                    .filter(|value| value.is_array())
            });
        if let Some(list) = found {
            return list.clone();
        }
    }
    match body.get("data") {
        Some(data) if data.is_array() => data.clone(),
        _ => Value::Array(Vec::new()),
    }
}

#[derive(Debug, Clone)]
pub struct CartApi {
    gateway: Arc<Gateway>,
}

impl CartApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// All bookings; an absent endpoint yields an empty list
    pub async fn booking_details(&self) -> Result<Vec<Booking>, ApiError> {
        let body = match self
            .gateway
            .request("/cart/booking-details", RequestOptions::get())
            .await
        {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                warn!("Booking details endpoint not available, returning empty data");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        decode(extract_list(body, &["bookings", "bookingDetails"]))
    }
}

#[derive(Debug, Clone)]
pub struct UsersApi {
    gateway: Arc<Gateway>,
}

impl UsersApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Registered users, or `Unavailable` when the backend has no listing
    pub async fn list(&self) -> Result<Availability<Vec<User>>, ApiError> {
        match self.gateway.request("/users", RequestOptions::get()).await {
            Ok(body) => Ok(Availability::Available(decode(extract_list(body, &["users"]))?)),
            Err(e) if e.is_not_found() => {
                warn!("Users listing is not available on this backend");
                Ok(Availability::Unavailable { reason: e.message })
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthApi {
    gateway: Arc<Gateway>,
}

impl HealthApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn check(&self) -> Result<Value, ApiError> {
        self.gateway.request("/health", RequestOptions::get()).await
    }
}
