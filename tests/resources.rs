//! Integration tests for the typed resource clients and the dashboard
//!
//! Exercises cache invalidation on writes, flag endpoints, the booking and
//! users fallbacks, the login flow and the sequential dashboard load.

mod common;

use reqwest::Method;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{api, body_of, endpoint_of, MockBackend, Reply};
use salonadmin::gateway::OutboundRequest;
use salonadmin::api::models::{MainCategoryInput, ProfileUpdate, Registration, ServiceInput};
use salonadmin::api::{keys, Availability, ServiceFlag};
use salonadmin::dashboard::{load_dashboard, RATE_LIMIT_HINT};
use salonadmin::gateway::ApiErrorKind;

/// Method, endpoint and decoded body of a sent request
fn sent(request: &OutboundRequest) -> (Method, String, Value) {
    (
        request.method.clone(),
        endpoint_of(request).to_string(),
        body_of(request),
    )
}

/// Backend holding a mutable list of main categories
fn categories_backend() -> Arc<MockBackend> {
    let created = AtomicBool::new(false);
    MockBackend::new(move |request| {
        if endpoint_of(request) != "/main-categories" {
            return Reply::Json(404, json!({}));
        }
        if request.method == Method::POST {
            created.store(true, Ordering::SeqCst);
            return Reply::Json(201, json!({"_id": "m2", "name": "Spa"}));
        }
        let mut list = vec![json!({"_id": "m1", "name": "Salon"})];
        if created.load(Ordering::SeqCst) {
            list.push(json!({"_id": "m2", "name": "Spa"}));
        }
        Reply::Json(200, json!({"mainCategories": list}))
    })
}

#[tokio::test]
async fn test_read_create_read_scenario() {
    let backend = categories_backend();
    let api = api(backend.clone());

    let first = api.main_categories.list().await.unwrap();
    let second = api.main_categories.list().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.calls_to(Method::GET, "/main-categories"), 1);

    let input = MainCategoryInput {
        name: Some("Spa".to_string()),
        image_url: Some("https://img/spa.png".to_string()),
    };
    api.main_categories.create(&input).await.unwrap();
    assert!(
        !api.gateway.cached_keys().contains(&keys::MAIN_CATEGORIES.to_string()),
        "Create should drop the cached list"
    );
    assert_eq!(
        body_of(&backend.last_request()),
        json!({"name": "Spa", "imageUrl": "https://img/spa.png"})
    );

    let third = api.main_categories.list().await.unwrap();
    assert_eq!(backend.calls_to(Method::GET, "/main-categories"), 2);
    assert_eq!(third.len(), 2, "Read after create should see the new category");
}

#[tokio::test(start_paused = true)]
async fn test_read_after_create_does_not_reuse_older_read() {
    let created = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&created);
    let backend = MockBackend::new(move |request| {
        if request.method == Method::POST {
            flag.store(true, Ordering::SeqCst);
            let reply = Reply::Json(201, json!({"_id": "m2", "name": "Spa"}));
            return Reply::After(Duration::from_millis(10), Box::new(reply));
        }
        let mut list = vec![json!({"_id": "m1", "name": "Salon"})];
        if flag.load(Ordering::SeqCst) {
            list.push(json!({"_id": "m2", "name": "Spa"}));
        }
        let reply = Reply::Json(200, json!({"mainCategories": list}));
        Reply::After(Duration::from_millis(100), Box::new(reply))
    });
    let api = api(backend.clone());

    let early_api = api.clone();
    let early = tokio::spawn(async move { early_api.main_categories.list().await });
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(backend.calls_to(Method::GET, "/main-categories"), 1);

    let input = MainCategoryInput {
        name: Some("Spa".to_string()),
        image_url: None,
    };
    api.main_categories.create(&input).await.unwrap();
    assert!(created.load(Ordering::SeqCst));

    let after = api.main_categories.list().await.unwrap();
    assert_eq!(after.len(), 2, "Read after create must not see the pre-write list");
    assert_eq!(backend.calls_to(Method::GET, "/main-categories"), 2);

    let early = early.await.unwrap().unwrap();
    assert_eq!(early.len(), 1, "The earlier read still gets its own response");

    tokio::time::advance(Duration::from_secs(60)).await;
    let later = api.main_categories.list().await.unwrap();
    assert_eq!(later.len(), 2, "Pre-write response must not have been cached");
    assert_eq!(backend.calls_to(Method::GET, "/main-categories"), 2);
}

#[tokio::test]
async fn test_auth_endpoints_send_expected_bodies() {
    let backend = MockBackend::new(|_| Reply::Json(200, json!({"success": true})));
    let api = api(backend.clone());

    let registration = Registration {
        name: "Asha".to_string(),
        phone_number: "9999999999".to_string(),
        email: "asha@example.com".to_string(),
    };
    api.auth.register(&registration).await.unwrap();
    api.auth.send_otp("9999999999").await.unwrap();
    api.auth.verify_otp("9999999999", "123456").await.unwrap();
    api.auth.save_address("12 MG Road").await.unwrap();
    api.auth.addresses().await.unwrap();

    let requests: Vec<_> = backend.requests().iter().map(sent).collect();
    assert_eq!(
        requests,
        vec![
            (
                Method::POST,
                "/auth/register".to_string(),
                json!({"name": "Asha", "phoneNumber": "9999999999", "email": "asha@example.com"}),
            ),
            (
                Method::POST,
                "/auth/send-otp".to_string(),
                json!({"phoneNumber": "9999999999"}),
            ),
            (
                Method::POST,
                "/auth/verify-otp".to_string(),
                json!({"phoneNumber": "9999999999", "otp": "123456"}),
            ),
            (
                Method::POST,
                "/auth/address".to_string(),
                json!({"address": "12 MG Road"}),
            ),
            (Method::GET, "/auth/address".to_string(), Value::Null),
        ]
    );
    assert!(api.gateway.cached_keys().is_empty(), "Auth calls are never cached");
}

#[tokio::test]
async fn test_catalog_lookups_hit_their_endpoints() {
    let backend =
        MockBackend::new(|request| Reply::Json(200, json!({"echo": endpoint_of(request)})));
    let api = api(backend.clone());

    let category = api.main_categories.get("m1").await.unwrap();
    assert_eq!(category, json!({"echo": "/main-categories/m1"}));
    api.sub_categories.get("s1").await.unwrap();
    api.sub_categories.by_main_category("m1").await.unwrap();
    api.services.get("svc1").await.unwrap();
    api.services
        .by_sub_categories(&["s1".to_string(), "s2".to_string()])
        .await
        .unwrap();
    api.services.by_sub_category("s1").await.unwrap();

    let requests: Vec<_> = backend.requests().iter().map(sent).collect();
    assert_eq!(
        requests,
        vec![
            (Method::GET, "/main-categories/m1".to_string(), Value::Null),
            (Method::GET, "/sub-categories/s1".to_string(), Value::Null),
            (Method::GET, "/sub-categories/main/m1".to_string(), Value::Null),
            (Method::GET, "/services/svc1".to_string(), Value::Null),
            (
                Method::POST,
                "/services/by-subcategories".to_string(),
                json!({"subCategoryIds": ["s1", "s2"]}),
            ),
            (Method::GET, "/services/subcategory/s1".to_string(), Value::Null),
        ]
    );
    assert!(api.gateway.cached_keys().is_empty(), "Lookups bypass the cache");
}

#[tokio::test]
async fn test_health_check() {
    let backend = MockBackend::new(|_| Reply::Json(200, json!({"status": "ok"})));
    let api = api(backend.clone());

    assert_eq!(api.health.check().await.unwrap(), json!({"status": "ok"}));
    assert_eq!(backend.calls_to(Method::GET, "/health"), 1);
}

#[tokio::test]
async fn test_failed_write_keeps_cache() {
    let backend = MockBackend::new(|request| {
        if request.method == Method::GET {
            Reply::Json(200, json!({"data": {"services": [{"_id": "s1", "name": "Facial"}]}}))
        } else {
            Reply::Json(400, json!({"message": "Price is required"}))
        }
    });
    let api = api(backend.clone());

    api.services.list().await.unwrap();
    let err = api
        .services
        .create(&ServiceInput {
            name: Some("Pedicure".to_string()),
            ..ServiceInput::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.message, "Price is required");
    assert!(api.gateway.cached_keys().contains(&keys::SERVICES.to_string()));
    api.services.list().await.unwrap();
    assert_eq!(backend.calls_to(Method::GET, "/services"), 1);
}

#[tokio::test]
async fn test_update_and_delete_invalidate() {
    let backend = MockBackend::new(|request| {
        if request.method == Method::GET {
            Reply::Json(200, json!({"subCategories": []}))
        } else {
            Reply::Json(200, json!({"success": true}))
        }
    });
    let api = api(backend.clone());

    api.sub_categories.list().await.unwrap();
    api.sub_categories
        .update("s1", &Default::default())
        .await
        .unwrap();
    assert!(api.gateway.cached_keys().is_empty());

    api.sub_categories.list().await.unwrap();
    api.sub_categories.delete("s1").await.unwrap();
    assert!(api.gateway.cached_keys().is_empty());

    assert_eq!(backend.calls_to(Method::PUT, "/sub-categories/s1"), 1);
    assert_eq!(backend.calls_to(Method::DELETE, "/sub-categories/s1"), 1);
    assert_eq!(backend.calls_to(Method::GET, "/sub-categories"), 2);
}

#[tokio::test]
async fn test_flag_toggle_hits_table_endpoints() {
    let backend = MockBackend::new(|request| {
        if request.method == Method::GET {
            Reply::Json(200, json!({"services": [{"_id": "s1", "name": "Facial"}]}))
        } else {
            Reply::Json(200, json!({"success": true}))
        }
    });
    let api = api(backend.clone());

    api.services.list().await.unwrap();
    api.services
        .set_flag("s1", ServiceFlag::SpaRetreatForWomen, true)
        .await
        .unwrap();

    let request = backend.last_request();
    assert_eq!(endpoint_of(&request), "/services/spa-retreat-for-women");
    assert_eq!(body_of(&request), json!({"serviceId": "s1"}));
    assert!(api.gateway.cached_keys().is_empty(), "Flag toggles mutate services");

    api.services
        .set_flag("s1", ServiceFlag::SpaRetreatForWomen, false)
        .await
        .unwrap();
    assert_eq!(
        endpoint_of(&backend.last_request()),
        "/services/remove-spa-retreat-for-women"
    );
}

#[tokio::test]
async fn test_booking_details_missing_endpoint_is_empty() {
    let backend = MockBackend::new(|_| Reply::Json(404, json!({"message": "Cannot GET"})));
    let api = api(backend);

    assert!(api.cart.booking_details().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_details_other_errors_propagate() {
    let backend = MockBackend::new(|_| Reply::Json(401, json!({"message": "Unauthorized"})));
    let api = api(backend);

    let err = api.cart.booking_details().await.unwrap_err();
    assert_eq!(err.status, 401);
    assert_eq!(err.message, "Unauthorized");
}

#[tokio::test]
async fn test_booking_details_decodes_wrapped_list() {
    let backend = MockBackend::new(|_| {
        Reply::Json(
            200,
            json!({"bookings": [
                {"_id": "b1", "checkoutId": "c1", "status": "pending", "totalAmount": 900}
            ]}),
        )
    });
    let api = api(backend);

    let bookings = api.cart.booking_details().await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].checkout_id.as_deref(), Some("c1"));
    assert!((bookings[0].total() - 900.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_users_listing_unavailable() {
    let backend = MockBackend::new(|_| Reply::Json(404, json!({})));
    let api = api(backend);

    match api.users.list().await.unwrap() {
        Availability::Unavailable { reason } => assert!(reason.contains("/users")),
        Availability::Available(users) => panic!("expected unavailable, got {users:?}"),
    }
}

#[tokio::test]
async fn test_users_listing_available() {
    let backend = MockBackend::new(|_| {
        Reply::Json(
            200,
            json!({"users": [{
                "_id": "u1",
                "name": "Asha",
                "phoneNumber": "9999999999",
                "role": "admin",
                "isVerified": true
            }]}),
        )
    });
    let api = api(backend);

    let users = api.users.list().await.unwrap().into_option().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].is_verified);
}

#[tokio::test]
async fn test_login_flow_extracts_nested_token() {
    let backend = MockBackend::new(|request| match endpoint_of(request) {
        "/auth/login" => {
            Reply::Json(200, json!({"message": "OTP sent", "data": {"otp": "123456"}}))
        }
        "/auth/verify-login" => Reply::Json(
            200,
            json!({"data": {"token": "jwt", "user": {"id": "u1", "role": "admin"}}}),
        ),
        _ => Reply::Json(404, json!({})),
    });
    let api = api(backend.clone());

    let challenge = api.auth.login("9999999999").await.unwrap();
    assert_eq!(challenge.message.as_deref(), Some("OTP sent"));
    assert_eq!(challenge.otp.as_deref(), Some("123456"));

    let login = api.auth.verify_login("9999999999", "123456").await.unwrap();
    assert_eq!(login.token, "jwt");
    assert_eq!(login.role.as_deref(), Some("admin"));
    assert_eq!(login.user_id.as_deref(), Some("u1"));
    assert_eq!(
        body_of(&backend.last_request()),
        json!({"phoneNumber": "9999999999", "otp": "123456"})
    );
}

#[tokio::test]
async fn test_verify_login_without_token_is_invalid_response() {
    let backend = MockBackend::new(|_| Reply::Json(200, json!({"success": false})));
    let api = api(backend);

    let err = api.auth.verify_login("1", "2").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::InvalidResponse);
}

#[tokio::test]
async fn test_profile_cached_and_invalidated_by_update() {
    let backend = MockBackend::new(|request| {
        if request.method == Method::GET {
            Reply::Json(200, json!({"user": {"_id": "u1", "name": "Asha", "phoneNumber": "1"}}))
        } else {
            Reply::Json(200, json!({"success": true}))
        }
    });
    let api = api(backend.clone());

    let profile = api.auth.profile().await.unwrap();
    assert_eq!(profile.display_name(), "Asha");
    api.auth.profile().await.unwrap();
    assert_eq!(backend.calls_to(Method::GET, "/auth/profile"), 1);

    api.auth
        .update_profile(&ProfileUpdate {
            name: Some("Asha K".to_string()),
            email: None,
        })
        .await
        .unwrap();
    assert_eq!(body_of(&backend.last_request()), json!({"name": "Asha K"}));

    api.auth.profile().await.unwrap();
    assert_eq!(backend.calls_to(Method::GET, "/auth/profile"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dashboard_counts_and_profile() {
    let backend = MockBackend::new(|request| match endpoint_of(request) {
        "/main-categories" => {
            Reply::Json(200, json!({"mainCategories": [{"_id": "m1", "name": "Salon"}]}))
        }
        "/sub-categories" => Reply::Json(200, json!({"subCategories": []})),
        "/services" => Reply::Json(
            200,
            json!({"services": [{"_id": "s1", "name": "A"}, {"_id": "s2", "name": "B"}]}),
        ),
        "/auth/profile" => Reply::Json(200, json!({"name": "Asha"})),
        _ => Reply::Json(404, json!({})),
    });
    let api = api(backend.clone());

    let started = tokio::time::Instant::now();
    let summary = load_dashboard(&api, Duration::from_secs(1)).await;

    assert_eq!(summary.main_categories, 1);
    assert_eq!(summary.sub_categories, 0);
    assert_eq!(summary.services, 2);
    assert_eq!(summary.profile.unwrap().display_name(), "Asha");
    assert!(summary.failures.is_empty());
    assert!(summary.warning.is_none());
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert_eq!(backend.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_dashboard_rate_limited_degrades_to_empty() {
    let backend = MockBackend::new(|_| Reply::Json(429, json!({})));
    let api = api(backend);

    let summary = load_dashboard(&api, Duration::from_secs(1)).await;

    assert_eq!(summary.main_categories, 0);
    assert_eq!(summary.services, 0);
    assert!(summary.profile.is_none());
    assert_eq!(summary.failures.len(), 4);
    assert!(summary.failures.iter().all(|f| f.error.is_rate_limited()));
    assert_eq!(summary.warning.as_deref(), Some(RATE_LIMIT_HINT));
}
