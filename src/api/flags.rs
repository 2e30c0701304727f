//! Service flags
//!
//! Each flag is toggled through its own pair of endpoints:
//! `POST /services/<slug>` marks a service and `POST /services/remove-<slug>`
//! unmarks it, both with a `{serviceId}` body.

use std::fmt;

use super::models::Service;

/// Promotional flags a service can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceFlag {
    TrendingNearYou,
    BestSeller,
    LastMinuteAddon,
    PeopleAlsoAvailed,
    SpaRetreatForWomen,
    WhatsNew,
}

/// Slug, mark endpoint, unmark endpoint and label, per flag
const FLAG_TABLE: [(ServiceFlag, &str, &str, &str, &str); 6] = [
    (
        ServiceFlag::TrendingNearYou,
        "trending-near-you",
        "/services/trending-near-you",
        "/services/remove-trending-near-you",
        "Trending Near You",
    ),
    (
        ServiceFlag::BestSeller,
        "best-seller",
        "/services/best-seller",
        "/services/remove-best-seller",
        "Best Seller",
    ),
    (
        ServiceFlag::LastMinuteAddon,
        "last-minute-addon",
        "/services/last-minute-addon",
        "/services/remove-last-minute-addon",
        "Last Minute Add-on",
    ),
    (
        ServiceFlag::PeopleAlsoAvailed,
        "people-also-availed",
        "/services/people-also-availed",
        "/services/remove-people-also-availed",
        "People Also Availed",
    ),
    (
        ServiceFlag::SpaRetreatForWomen,
        "spa-retreat-for-women",
        "/services/spa-retreat-for-women",
        "/services/remove-spa-retreat-for-women",
        "Spa Retreat for Women",
    ),
    (
        ServiceFlag::WhatsNew,
        "whats-new",
        "/services/whats-new",
        "/services/remove-whats-new",
        "What's New",
    ),
];

impl ServiceFlag {
    /// Every flag, in display order
    pub const ALL: [ServiceFlag; 6] = [
        ServiceFlag::TrendingNearYou,
        ServiceFlag::BestSeller,
        ServiceFlag::LastMinuteAddon,
        ServiceFlag::PeopleAlsoAvailed,
        ServiceFlag::SpaRetreatForWomen,
        ServiceFlag::WhatsNew,
    ];

    fn row(self) -> &'static (ServiceFlag, &'static str, &'static str, &'static str, &'static str) {
        // Rows are stored in declaration order
        &FLAG_TABLE[self as usize]
    }

    /// URL slug, e.g. `best-seller`
    pub fn slug(self) -> &'static str {
        self.row().1
    }

    /// Endpoint that sets the flag
    pub fn mark_endpoint(self) -> &'static str {
        self.row().2
    }

    /// Endpoint that clears the flag
    pub fn unmark_endpoint(self) -> &'static str {
        self.row().3
    }

    /// Endpoint for setting (`true`) or clearing (`false`) the flag
    pub fn endpoint(self, enabled: bool) -> &'static str {
        if enabled {
            self.mark_endpoint()
        } else {
            self.unmark_endpoint()
        }
    }

    pub fn label(self) -> &'static str {
        self.row().4
    }

    /// Parses a slug; underscores and case are tolerated
    pub fn from_slug(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        FLAG_TABLE
            .iter()
            .find(|row| row.1 == normalized)
            .map(|row| row.0)
    }

    /// Current value of this flag on a service
    pub fn is_set(self, service: &Service) -> bool {
        let value = match self {
            ServiceFlag::TrendingNearYou => service.is_trending_near_you,
            ServiceFlag::BestSeller => service.is_best_seller,
            ServiceFlag::LastMinuteAddon => service.is_last_minute_addon,
            ServiceFlag::PeopleAlsoAvailed => service.is_people_also_availed,
            ServiceFlag::SpaRetreatForWomen => service.is_spa_retreat_for_women,
            ServiceFlag::WhatsNew => service.is_whats_new,
        };
        value.unwrap_or(false)
    }
}

impl fmt::Display for ServiceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
