//! Category, sub-category and service clients
//!
//! Lists are served through the gateway cache. Any successful create, update,
//! delete or flag toggle drops the cache entry for its resource before
//! returning.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::flags::ServiceFlag;
use super::models::{
    MainCategory, MainCategoryInput, Service, ServiceInput, SubCategory, SubCategoryInput,
};
use super::{decode, encode, keys};
use crate::gateway::{ApiError, Envelope, Gateway, RequestOptions};

/// Sends a write and invalidates `resource_key` once it succeeds
async fn write_through(
    gateway: &Gateway,
    resource_key: &str,
    endpoint: &str,
    options: RequestOptions,
) -> Result<Value, ApiError> {
    let response = gateway.request(endpoint, options).await?;
    gateway.invalidate(Some(resource_key));
    Ok(response)
}

#[derive(Debug, Clone)]
pub struct MainCategoriesApi {
    gateway: Arc<Gateway>,
}

impl MainCategoriesApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<MainCategory>, ApiError> {
        let data = self
            .gateway
            .cached_read(
                keys::MAIN_CATEGORIES,
                "/main-categories",
                Envelope::Collection("mainCategories"),
            )
            .await?;
        decode(data)
    }

    /// Uncached lookup of one category
    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.gateway
            .request(&format!("/main-categories/{id}"), RequestOptions::get())
            .await
    }

    pub async fn create(&self, input: &MainCategoryInput) -> Result<Value, ApiError> {
        let response = write_through(
            &self.gateway,
            keys::MAIN_CATEGORIES,
            "/main-categories",
            RequestOptions::post(encode(input)),
        )
        .await?;
        info!("Created main category {}", input.name.as_deref().unwrap_or_default());
        Ok(response)
    }

    pub async fn update(&self, id: &str, input: &MainCategoryInput) -> Result<Value, ApiError> {
        write_through(
            &self.gateway,
            keys::MAIN_CATEGORIES,
            &format!("/main-categories/{id}"),
            RequestOptions::put(encode(input)),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        write_through(
            &self.gateway,
            keys::MAIN_CATEGORIES,
            &format!("/main-categories/{id}"),
            RequestOptions::delete(),
        )
        .await
    }
}

#[derive(Debug, Clone)]
pub struct SubCategoriesApi {
    gateway: Arc<Gateway>,
}

impl SubCategoriesApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<SubCategory>, ApiError> {
        let data = self
            .gateway
            .cached_read(
                keys::SUB_CATEGORIES,
                "/sub-categories",
                Envelope::Collection("subCategories"),
            )
            .await?;
        decode(data)
    }

    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.gateway
            .request(&format!("/sub-categories/{id}"), RequestOptions::get())
            .await
    }

    /// Sub-categories of one main category, uncached
    pub async fn by_main_category(&self, main_category_id: &str) -> Result<Value, ApiError> {
        self.gateway
            .request(
                &format!("/sub-categories/main/{main_category_id}"),
                RequestOptions::get(),
            )
            .await
    }

    pub async fn create(&self, input: &SubCategoryInput) -> Result<Value, ApiError> {
        write_through(
            &self.gateway,
            keys::SUB_CATEGORIES,
            "/sub-categories",
            RequestOptions::post(encode(input)),
        )
        .await
    }

    pub async fn update(&self, id: &str, input: &SubCategoryInput) -> Result<Value, ApiError> {
        write_through(
            &self.gateway,
            keys::SUB_CATEGORIES,
            &format!("/sub-categories/{id}"),
            RequestOptions::put(encode(input)),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        write_through(
            &self.gateway,
            keys::SUB_CATEGORIES,
            &format!("/sub-categories/{id}"),
            RequestOptions::delete(),
        )
        .await
    }
}

#[derive(Debug, Clone)]
pub struct ServicesApi {
    gateway: Arc<Gateway>,
}

impl ServicesApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Service>, ApiError> {
        let data = self
            .gateway
            .cached_read(keys::SERVICES, "/services", Envelope::Collection("services"))
            .await?;
        decode(data)
    }

    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.gateway
            .request(&format!("/services/{id}"), RequestOptions::get())
            .await
    }

    /// Services belonging to any of the given sub-categories
    pub async fn by_sub_categories(&self, sub_category_ids: &[String]) -> Result<Value, ApiError> {
        self.gateway
            .request(
                "/services/by-subcategories",
                RequestOptions::post(json!({ "subCategoryIds": sub_category_ids })),
            )
            .await
    }

    pub async fn by_sub_category(&self, sub_category_id: &str) -> Result<Value, ApiError> {
        self.gateway
            .request(
                &format!("/services/subcategory/{sub_category_id}"),
                RequestOptions::get(),
            )
            .await
    }

    pub async fn create(&self, input: &ServiceInput) -> Result<Value, ApiError> {
        write_through(
            &self.gateway,
            keys::SERVICES,
            "/services",
            RequestOptions::post(encode(input)),
        )
        .await
    }

    pub async fn update(&self, id: &str, input: &ServiceInput) -> Result<Value, ApiError> {
        write_through(
            &self.gateway,
            keys::SERVICES,
            &format!("/services/{id}"),
            RequestOptions::put(encode(input)),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        write_through(
            &self.gateway,
            keys::SERVICES,
            &format!("/services/{id}"),
            RequestOptions::delete(),
        )
        .await
    }

    /// Marks (`enabled = true`) or unmarks a service flag
    pub async fn set_flag(
        &self,
        service_id: &str,
        flag: ServiceFlag,
        enabled: bool,
    ) -> Result<Value, ApiError> {
        let response = write_through(
            &self.gateway,
            keys::SERVICES,
            flag.endpoint(enabled),
            RequestOptions::post(json!({ "serviceId": service_id })),
        )
        .await?;
        info!(
            "{} {} for service {service_id}",
            if enabled { "Set" } else { "Cleared" },
            flag.label()
        );
        Ok(response)
    }
}
