//! Typed clients for the marketplace backend
//!
//! Every client shares one `Gateway`. List reads go through the gateway
//! cache under a fixed resource key; writes invalidate that key before
//! returning so the next read sees fresh data.

pub mod auth;
pub mod catalog;
pub mod flags;
pub mod models;
pub mod orders;

pub use auth::{AuthApi, LoginChallenge, LoginSession};
pub use catalog::{MainCategoriesApi, ServicesApi, SubCategoriesApi};
pub use flags::ServiceFlag;
pub use orders::{CartApi, HealthApi, UsersApi};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::gateway::{ApiError, Gateway};

/// Cache keys shared by every call site of a resource family
pub mod keys {
    pub const MAIN_CATEGORIES: &str = "main-categories";
    pub const SUB_CATEGORIES: &str = "sub-categories";
    pub const SERVICES: &str = "services";
    pub const USER_PROFILE: &str = "user-profile";
}

/// Result of calling an endpoint the backend may not implement
#[derive(Debug, Clone, PartialEq)]
pub enum Availability<T> {
    Available(T),
    /// The backend has no such endpoint; no data was synthesized
    Unavailable { reason: String },
}

impl<T> Availability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Availability::Available(value) => Some(value),
            Availability::Unavailable { .. } => None,
        }
    }
}

/// Decodes a gateway payload into a typed value
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(ApiError::invalid_response)
}

/// Encodes a request body
pub(crate) fn encode<T: serde::Serialize>(body: &T) -> Value {
    // Derived Serialize on plain structs never fails
    serde_json::to_value(body).unwrap_or(Value::Null)
}

/// All resource clients over one shared gateway
#[derive(Debug, Clone)]
pub struct Api {
    pub gateway: Arc<Gateway>,
    pub auth: AuthApi,
    pub main_categories: MainCategoriesApi,
    pub sub_categories: SubCategoriesApi,
    pub services: ServicesApi,
    pub cart: CartApi,
    pub users: UsersApi,
    pub health: HealthApi,
}

impl Api {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            auth: AuthApi::new(Arc::clone(&gateway)),
            main_categories: MainCategoriesApi::new(Arc::clone(&gateway)),
            sub_categories: SubCategoriesApi::new(Arc::clone(&gateway)),
            services: ServicesApi::new(Arc::clone(&gateway)),
            cart: CartApi::new(Arc::clone(&gateway)),
            users: UsersApi::new(Arc::clone(&gateway)),
            health: HealthApi::new(Arc::clone(&gateway)),
            gateway,
        }
    }

    /// Drops every cached resource
    pub fn refresh(&self) {
        self.gateway.clear_cache(None);
    }
}
