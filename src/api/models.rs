//! Payload types exchanged with the marketplace backend
//!
//! Field names follow the backend's camelCase JSON; ids arrive as `_id`.
//! Most fields are optional because list endpoints omit them freely.

use serde::{Deserialize, Serialize};

/// A reference to another document, either populated or a bare id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        name: String,
    },
    Id(String),
}

impl Reference {
    pub fn id(&self) -> &str {
        match self {
            Reference::Populated { id, .. } => id,
            Reference::Id(id) => id,
        }
    }

    /// Display name when populated, id otherwise
    pub fn display_name(&self) -> &str {
        match self {
            Reference::Populated { name, .. } if !name.is_empty() => name,
            other => other.id(),
        }
    }
}

/// Top-level category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainCategory {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MainCategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Category nested under a main category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub main_category_id: Option<Reference>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_category_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyIngredient {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureStep {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// A bookable service with its promotional flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub sub_category_id: Option<Reference>,
    pub created_at: Option<String>,
    pub is_trending_near_you: Option<bool>,
    pub is_best_seller: Option<bool>,
    pub is_last_minute_addon: Option<bool>,
    pub is_people_also_availed: Option<bool>,
    pub is_spa_retreat_for_women: Option<bool>,
    pub is_whats_new: Option<bool>,
    pub key_ingredients: Vec<KeyIngredient>,
    pub benefits: Vec<String>,
    pub procedure: Vec<ProcedureStep>,
    pub precautions_and_aftercare: Vec<String>,
    pub things_to_know: Vec<String>,
    pub faqs: Vec<Faq>,
    pub is_discounted: Option<bool>,
    pub discount_price: Option<f64>,
    pub original_price: Option<f64>,
    pub offer_tags: Vec<String>,
    pub duration: Option<String>,
    pub included_items: Vec<String>,
    pub popularity: Option<String>,
    pub is_new_launch: Option<bool>,
    pub category_tags: Vec<String>,
    pub brand: Option<String>,
    pub professional_types: Vec<String>,
    pub service_charge: Option<f64>,
    pub product_cost: Option<f64>,
    pub disposable_cost: Option<f64>,
}

/// Create/update body for a service; unset fields are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_discounted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub offer_tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub professional_types: Vec<String>,
}

/// A line in a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedItem {
    #[serde(default)]
    pub service_id: Option<Reference>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub total_price: f64,
}

/// A checked-out order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: Option<String>,
    pub checkout_id: Option<String>,
    pub professional_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub services: Vec<BookedItem>,
    pub total_amount: Option<f64>,
}

impl Booking {
    /// Stated total, or the sum of line totals when absent or zero
    pub fn total(&self) -> f64 {
        match self.total_amount {
            Some(total) if total != 0.0 => total,
            _ => self.services.iter().map(|item| item.total_price).sum(),
        }
    }
}

/// The signed-in admin's profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UserProfile {
    /// Name, then phone number, then "Unknown"
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.phone_number.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A registered marketplace user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub addresses: Vec<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub phone_number: String,
    pub email: String,
}
