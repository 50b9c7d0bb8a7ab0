//! Container flows against a mock REST backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::mock_backend::{MockBackend, MockResponse};
use common::{boot, dec, free_port, memory_storage, product};
use storefront::api::{ApiError, Credentials, ProductForm};
use storefront::guard::{Access, Route};
use storefront::persist::{FileStorage, Storage, LEGACY_TOKEN_KEY, LEGACY_USER_KEY, ROOT_KEY};
use storefront::store::auth::{BearerToken, Session};
use storefront::AppError;
use tempfile::TempDir;

fn credentials() -> Credentials {
    Credentials::new("ann@example.com", "hunter2")
}

const PRODUCT_A: &str = r#"{"_id": "A", "name": "Mug", "price": 12.5, "image": "mug.png", "category": {"name": "kitchen"}}"#;

#[tokio::test]
async fn login_persists_session_across_restart() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::login("tok-1", "u1", "user"))
        .await;
    let dir = TempDir::new().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()));

    let storefront = boot(&backend.base_url(), storage.clone());
    let user = storefront.login(&credentials()).await.unwrap();
    assert_eq!(user.id, "u1");
    assert!(storefront.auth().is_authenticated());
    assert!(!storefront.auth().is_loading());

    let requests = backend.captured_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/auth/login");
    assert_eq!(requests[0].json()["email"], "ann@example.com");
    assert!(requests[0].header("authorization").is_none());
    drop(storefront);

    let restarted = boot(&backend.base_url(), Arc::new(FileStorage::new(dir.path())));
    let session = restarted.session();
    assert_eq!(session.token().map(BearerToken::expose), Some("tok-1"));
    assert_eq!(session.user().map(|u| u.id.as_str()), Some("u1"));
    assert_eq!(storage.read(LEGACY_TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn rejected_credentials_surface_server_message() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::error(401, "Invalid credentials"))
        .await;
    let storefront = boot(&backend.base_url(), memory_storage());

    let err = storefront.login(&credentials()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Api(ApiError::Unauthorized { status: 401, .. })
    ));

    let auth = storefront.auth();
    assert_eq!(auth.session, Session::Anonymous);
    assert_eq!(auth.error.as_deref(), Some("Invalid credentials"));
    assert!(!auth.is_loading());
}

#[tokio::test]
async fn login_without_token_is_a_failure() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::json(r#"{"user": {"id": "u1", "name": "Ann"}}"#))
        .await;
    let storefront = boot(&backend.base_url(), memory_storage());

    let err = storefront.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, AppError::Api(ApiError::MissingToken)));
    assert!(!storefront.auth().is_authenticated());
    assert!(storefront.auth().error.is_some());
}

#[tokio::test]
async fn stale_login_response_is_discarded() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::login("tok-old", "u-old", "user").with_delay(300))
        .await;
    backend
        .enqueue_response(MockResponse::login("tok-new", "u-new", "user"))
        .await;
    let storefront = boot(&backend.base_url(), memory_storage());

    let first = credentials();
    let second = Credentials::new("bob", "pw");
    let (old, new) = tokio::join!(storefront.login(&first), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        storefront.login(&second).await
    });

    assert!(matches!(old, Err(AppError::Superseded)));
    assert_eq!(new.unwrap().id, "u-new");
    assert_eq!(
        storefront.session().token().map(BearerToken::expose),
        Some("tok-new")
    );
}

#[tokio::test]
async fn forbidden_response_clears_session_and_legacy_keys() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::login("tok-1", "admin-1", "admin"))
        .await;
    backend
        .enqueue_response(MockResponse::error(403, "Token expired"))
        .await;
    let storage = memory_storage();
    let storefront = boot(&backend.base_url(), storage.clone());
    storefront.login(&credentials()).await.unwrap();
    storefront.add_to_cart(product("A", "3")).unwrap();

    let err = storefront.dashboard_stats().await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Api(ApiError::Unauthorized { status: 403, .. })
    ));

    let requests = backend.captured_requests().await;
    assert_eq!(requests[1].path, "/api/admin/dashboard-stats");
    assert_eq!(requests[1].header("authorization"), Some("Bearer tok-1"));

    assert_eq!(storefront.session(), Session::Anonymous);
    assert!(storage.read(LEGACY_TOKEN_KEY).unwrap().is_none());
    assert!(storage.read(LEGACY_USER_KEY).unwrap().is_none());

    // The cart is not part of the session.
    let restarted = boot(&backend.base_url(), storage);
    assert_eq!(restarted.session(), Session::Anonymous);
    assert_eq!(restarted.cart().len(), 1);
}

#[tokio::test]
async fn anonymous_catalog_calls_carry_no_bearer() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::json(&format!("[{PRODUCT_A}]")))
        .await;
    let storefront = boot(&backend.base_url(), memory_storage());

    let products = storefront.products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "A");
    assert_eq!(products[0].price, dec("12.5"));
    assert_eq!(products[0].category.as_deref(), Some("kitchen"));

    let requests = backend.captured_requests().await;
    assert!(requests[0].header("authorization").is_none());
}

#[tokio::test]
async fn search_encodes_query() {
    let backend = MockBackend::start().await;
    backend.enqueue_response(MockResponse::json("[]")).await;
    let storefront = boot(&backend.base_url(), memory_storage());

    let found = storefront.search_products("  red mug  ").await.unwrap();
    assert!(found.is_empty());

    let requests = backend.captured_requests().await;
    assert_eq!(requests[0].path, "/api/products/search");
    assert_eq!(requests[0].query.as_deref(), Some("q=red+mug"));
}

#[tokio::test]
async fn add_by_id_snapshots_fetched_product() {
    let backend = MockBackend::start().await;
    backend.enqueue_response(MockResponse::json(PRODUCT_A)).await;
    backend.enqueue_response(MockResponse::json(PRODUCT_A)).await;
    let storefront = boot(&backend.base_url(), memory_storage());

    storefront.add_product_by_id("A").await.unwrap();
    let cart = storefront.add_product_by_id("A").await.unwrap();

    let line = cart.line("A").unwrap();
    assert_eq!(line.quantity, 2);
    assert_eq!(line.image_url.as_deref(), Some("mug.png"));
    assert_eq!(cart.total(), dec("25"));
}

#[tokio::test]
async fn server_error_message_is_normalized() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::with_status(500, r#"{"message": "db down"}"#))
        .await;
    backend.enqueue_response(MockResponse::empty(502)).await;
    let storefront = boot(&backend.base_url(), memory_storage());

    match storefront.categories().await.unwrap_err() {
        AppError::Api(ApiError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "db down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    match storefront.categories().await.unwrap_err() {
        AppError::Api(ApiError::Server { message, .. }) => {
            assert_eq!(message, "Server error: 502")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_success_body_is_a_decode_error() {
    let backend = MockBackend::start().await;
    backend.enqueue_response(MockResponse::empty(200)).await;
    let storefront = boot(&backend.base_url(), memory_storage());

    let err = storefront.products().await.unwrap_err();
    assert!(matches!(err, AppError::Api(ApiError::Decode(_))));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let base_url = format!("http://127.0.0.1:{}/api", free_port());
    let storefront = boot(&base_url, memory_storage());

    let err = storefront.products().await.unwrap_err();
    assert!(matches!(err, AppError::Api(ApiError::Transport { .. })));
}

#[tokio::test]
async fn admin_calls_require_admin_role() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::login("tok-1", "u1", "user"))
        .await;
    let storefront = boot(&backend.base_url(), memory_storage());

    let denied = storefront.recent_activities().await.unwrap_err();
    assert!(matches!(
        denied,
        AppError::AccessDenied {
            route: Route::AdminOnly,
            access: Access::RedirectToLogin
        }
    ));

    storefront.login(&credentials()).await.unwrap();
    let denied = storefront.delete_product("A").await.unwrap_err();
    assert!(matches!(
        denied,
        AppError::AccessDenied {
            access: Access::RedirectHome,
            ..
        }
    ));
    // Only the login reached the server.
    assert_eq!(backend.captured_requests().await.len(), 1);
}

#[tokio::test]
async fn admin_creates_product_as_multipart() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::login("tok-admin", "root", "admin"))
        .await;
    backend
        .enqueue_response(MockResponse::json(
            r#"{"id": 7, "name": "Lamp", "price": "19.99"}"#,
        ))
        .await;
    let storefront = boot(&backend.base_url(), memory_storage());
    storefront.login(&credentials()).await.unwrap();

    let created = storefront
        .create_product(ProductForm {
            name: "Lamp".to_string(),
            price: dec("19.99"),
            description: Some("Warm light".to_string()),
            category: None,
            stock: Some(3),
            image: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "7");

    let requests = backend.captured_requests().await;
    let create = &requests[1];
    assert_eq!(create.method, "POST");
    assert_eq!(create.path, "/api/products");
    assert_eq!(create.header("authorization"), Some("Bearer tok-admin"));
    assert!(create
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("multipart/form-data")));
    let body = String::from_utf8_lossy(&create.body);
    assert!(body.contains("Warm light"));
    assert!(body.contains("19.99"));
}

#[tokio::test]
async fn logout_clears_persisted_session_but_keeps_cart() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::login("tok-1", "u1", "user"))
        .await;
    let storage = memory_storage();
    let storefront = boot(&backend.base_url(), storage.clone());
    storefront.login(&credentials()).await.unwrap();
    storefront.add_to_cart(product("A", "1")).unwrap();

    storefront.logout().unwrap();

    assert_eq!(storefront.session(), Session::Anonymous);
    assert!(storage.read(LEGACY_TOKEN_KEY).unwrap().is_none());
    let blob: serde_json::Value =
        serde_json::from_str(&storage.read(ROOT_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(blob["auth"]["status"], "anonymous");
    assert_eq!(blob["cart"]["lines"][0]["productId"], "A");
}

#[tokio::test]
async fn reset_forgets_session_cart_and_persisted_keys() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::login("tok-1", "u1", "user"))
        .await;
    let storage = memory_storage();
    let storefront = boot(&backend.base_url(), storage.clone());
    storefront.login(&credentials()).await.unwrap();
    storefront.add_to_cart(product("A", "1")).unwrap();

    storefront.reset().unwrap();

    assert_eq!(storefront.session(), Session::Anonymous);
    assert!(storefront.cart().is_empty());
    for key in [ROOT_KEY, LEGACY_TOKEN_KEY, LEGACY_USER_KEY] {
        assert!(storage.read(key).unwrap().is_none(), "{} survived", key);
    }
}

#[tokio::test]
async fn login_accepts_user_with_duplicate_id_and_name_keys() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::json(
            r#"{"token": "tok-m", "user": {"_id": "64ab", "id": "64ab",
                "name": "Ann", "username": "ann", "role": "admin"}}"#,
        ))
        .await;
    backend
        .enqueue_response(MockResponse::json(
            r#"[{"_id": "p1", "id": "p1", "name": "Desk", "price": 10}]"#,
        ))
        .await;
    let storefront = boot(&backend.base_url(), memory_storage());

    let user = storefront.login(&Credentials::new("ann", "pw")).await.unwrap();
    assert_eq!(user.id, "64ab");
    assert_eq!(user.name, "Ann");
    assert!(storefront.session().is_admin());

    let products = storefront.products().await.unwrap();
    assert_eq!(products[0].id, "p1");
}
