//! Router-level tests for the catalog API.
//!
//! Every test drives the real router over an in-memory store, so no database
//! or network is needed.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use shop_catalog_core::{CategoryId, ShopCategory, ShopId};
use shop_catalog_integration_tests::{TestApp, shop_ids};

fn link(shop: i32, category: i32) -> ShopCategory {
    ShopCategory {
        shop_id: ShopId::new(shop),
        category_id: CategoryId::new(category),
    }
}

const SHOP_A: &str = r#"{"name":"A","image":"a.jpeg","price":100,"description":"first"}"#;

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let resp = app.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text(), "ok");

    let resp = app.get("/health/ready").await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_generated_or_echoed() {
    let app = TestApp::new();

    let resp = app.get("/health").await;
    let generated = resp.headers.get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(generated.len(), 36, "expected a UUID, got {generated}");

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "upstream-7")
        .body(Body::empty())
        .unwrap();
    let resp = app.call(request).await;
    assert_eq!(resp.headers.get("x-request-id").unwrap(), "upstream-7");
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_wrapped_shape_links_categories() {
    let app = TestApp::new();
    app.seed_categories(&["Food", "Books"]).await;

    let body = json!({
        "shop": {"name": "A", "image": "a.jpeg", "price": 100, "description": "first"},
        "categories": [1, 2]
    })
    .to_string();
    let resp = app.send(Method::POST, "/api/v1/shops", Some(&body)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text(), "shop created with id 1");

    let shops = app.store.shops();
    assert_eq!(shops.len(), 1);
    assert_eq!(shops[0].name, "A");
    assert_eq!(app.store.links(), vec![link(1, 1), link(1, 2)]);
}

#[tokio::test]
async fn test_create_bare_shape_has_no_categories() {
    let app = TestApp::new();
    app.seed_categories(&["Food"]).await;

    let body = r#"{"name":"B","image":"b.jpeg","price":250,"description":"second"}"#;
    let resp = app.send(Method::POST, "/api/v1/shops", Some(body)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(app.store.shops()[0].name, "B");
    assert!(app.store.links().is_empty());
}

#[tokio::test]
async fn test_create_wrapped_shape_with_empty_name_is_still_wrapped() {
    let app = TestApp::new();
    app.seed_categories(&["Food"]).await;

    let body = json!({
        "shop": {"name": "", "image": "x.jpeg", "price": 1, "description": ""},
        "categories": [1]
    })
    .to_string();
    let resp = app.send(Method::POST, "/api/v1/shops", Some(&body)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(app.store.shops()[0].image, "x.jpeg");
    assert_eq!(app.store.links(), vec![link(1, 1)]);
}

#[tokio::test]
async fn test_create_malformed_json_is_rejected() {
    let app = TestApp::new();

    let resp = app
        .send(Method::POST, "/api/v1/shops", Some(r#"{"name": "A", "#))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .send(Method::POST, "/api/v1/shops", Some(r#"{"name": 5}"#))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    assert!(app.store.shops().is_empty());
}

#[tokio::test]
async fn test_create_partial_bare_shop_fills_zero_values() {
    let app = TestApp::new();

    let resp = app
        .send(Method::POST, "/api/v1/shops", Some(r#"{"name":"B","price":2}"#))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text(), "shop created with id 1");
    let shop = &app.store.shops()[0];
    assert_eq!(shop.name, "B");
    assert_eq!(shop.price, 2);
    assert_eq!(shop.image, "");
    assert_eq!(shop.description, "");
}

#[tokio::test]
async fn test_create_partial_wrapped_shop_links_categories() {
    let app = TestApp::new();
    app.seed_categories(&["Food"]).await;

    let body = r#"{"shop":{"name":"A","price":1},"categories":[1]}"#;
    let resp = app.send(Method::POST, "/api/v1/shops", Some(body)).await;

    assert_eq!(resp.status, StatusCode::OK);
    let shop = &app.store.shops()[0];
    assert_eq!(shop.name, "A");
    assert_eq!(shop.image, "");
    assert_eq!(app.store.links(), vec![link(1, 1)]);
}

#[tokio::test]
async fn test_create_mistyped_field_is_rejected() {
    let app = TestApp::new();

    let resp = app
        .send(Method::POST, "/api/v1/shops", Some(r#"{"name":"B","price":"2"}"#))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(app.store.shops().is_empty());
}

#[tokio::test]
async fn test_create_with_unknown_category_keeps_shop_without_links() {
    let app = TestApp::new();
    app.seed_categories(&["Food", "Books"]).await;

    let body = json!({
        "shop": {"name": "A", "image": "a.jpeg", "price": 100, "description": "first"},
        "categories": [1, 99, 2]
    })
    .to_string();
    let resp = app.send(Method::POST, "/api/v1/shops", Some(&body)).await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.text().contains("foreign key"), "body: {}", resp.text());

    // The shop insert committed on its own; the link batch rolled back.
    assert_eq!(app.store.shops().len(), 1);
    assert!(app.store.links().is_empty());
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_groups_categories_per_shop() {
    let app = TestApp::new();
    app.seed_categories(&["Food", "Books"]).await;
    app.seed_shops(2).await;
    let body = json!({"categories": [1, 2]}).to_string();
    app.send(Method::PATCH, "/api/v1/shops?id=1", Some(&body))
        .await;

    let resp = app.get("/api/v1/shops").await;
    assert_eq!(resp.status, StatusCode::OK);

    let body = resp.json();
    assert_eq!(
        body,
        json!([
            {
                "shop": {"id": 1, "name": "Shop 1", "image": "image1.jpeg", "price": 100, "description": "Description 1"},
                "categories": ["Food", "Books"]
            },
            {
                "shop": {"id": 2, "name": "Shop 2", "image": "image2.jpeg", "price": 200, "description": "Description 2"},
                "categories": []
            }
        ])
    );
}

#[tokio::test]
async fn test_list_pagination() {
    let app = TestApp::new();
    app.seed_shops(12).await;

    let resp = app.get("/api/v1/shops?page=2&limit=5").await;
    assert_eq!(shop_ids(&resp.json()), vec![6, 7, 8, 9, 10]);

    let resp = app.get("/api/v1/shops").await;
    assert_eq!(shop_ids(&resp.json()), (1..=10).collect::<Vec<_>>());

    for query in ["page=0", "page=-5", "page=abc", "limit=0", "limit=nope"] {
        let resp = app.get(&format!("/api/v1/shops?{query}")).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(
            shop_ids(&resp.json()),
            (1..=10).collect::<Vec<_>>(),
            "query {query}"
        );
    }

    let resp = app.get("/api/v1/shops?page=3&limit=5").await;
    assert_eq!(shop_ids(&resp.json()), vec![11, 12]);

    let resp = app.get("/api/v1/shops?page=9").await;
    assert_eq!(resp.json(), json!([]));
}

#[tokio::test]
async fn test_list_by_category_returns_plain_shops() {
    let app = TestApp::new();
    app.seed_categories(&["Food", "Books"]).await;
    app.seed_shops(3).await;
    for (shop, categories) in [(1, "[2]"), (2, "[1]"), (3, "[1, 2]")] {
        let body = format!(r#"{{"categories": {categories}}}"#);
        let uri = format!("/api/v1/shops?id={shop}");
        let resp = app.send(Method::PATCH, &uri, Some(&body)).await;
        assert_eq!(resp.status, StatusCode::OK);
    }

    let resp = app.get("/api/v1/shops?category_id=2").await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(shop_ids(&body), vec![1, 3]);
    assert!(body[0].get("categories").is_none());
    assert_eq!(body[0]["name"], "Shop 1");

    let resp = app.get("/api/v1/shops?category_id=2&limit=1&page=2").await;
    assert_eq!(shop_ids(&resp.json()), vec![3]);

    // An empty filter means no filter.
    let resp = app.get("/api/v1/shops?category_id=").await;
    assert_eq!(shop_ids(&resp.json()), vec![1, 2, 3]);
    assert!(resp.json()[0].get("categories").is_some());
}

#[tokio::test]
async fn test_list_by_non_numeric_category_is_rejected() {
    let app = TestApp::new();

    let resp = app.get("/api/v1/shops?category_id=food").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_categories_and_links() {
    let app = TestApp::new();
    app.seed_categories(&["Food", "Books"]).await;
    app.seed_shops(2).await;
    app.send(
        Method::PATCH,
        "/api/v1/shops?id=2",
        Some(r#"{"categories": [2, 1]}"#),
    )
    .await;

    let resp = app.get("/api/v1/categories").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.json(),
        json!([{"id": 1, "name": "Food"}, {"id": 2, "name": "Books"}])
    );

    let resp = app.get("/api/v1/shop_categories").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.json(),
        json!([
            {"shop_id": 2, "category_id": 1},
            {"shop_id": 2, "category_id": 2}
        ])
    );
}

// =============================================================================
// Replace (PUT)
// =============================================================================

#[tokio::test]
async fn test_replace_overwrites_fields_and_categories() {
    let app = TestApp::new();
    app.seed_categories(&["C1", "C2", "C3"]).await;
    app.seed_shops(5).await;
    app.send(
        Method::PATCH,
        "/api/v1/shops?id=5",
        Some(r#"{"categories": [1]}"#),
    )
    .await;

    let body = json!({
        "shop": {"name": "Five", "image": "5.png", "price": 55, "description": "new"},
        "categories": [2, 3]
    })
    .to_string();
    let resp = app
        .send(Method::PUT, "/api/v1/shops?id=5", Some(&body))
        .await;

    assert_eq!(resp.status, StatusCode::OK, "body: {}", resp.text());
    assert_eq!(app.store.links(), vec![link(5, 2), link(5, 3)]);

    let shop = app
        .store
        .shops()
        .into_iter()
        .find(|s| s.id == ShopId::new(5))
        .unwrap();
    assert_eq!(shop.name, "Five");
    assert_eq!(shop.price, 55);
}

#[tokio::test]
async fn test_replace_with_unknown_category_changes_nothing() {
    let app = TestApp::new();
    app.seed_categories(&["C1"]).await;
    app.seed_shops(1).await;
    app.send(
        Method::PATCH,
        "/api/v1/shops?id=1",
        Some(r#"{"categories": [1]}"#),
    )
    .await;

    let body = json!({
        "shop": {"name": "Renamed", "image": "r.png", "price": 1, "description": "r"},
        "categories": [42]
    })
    .to_string();
    let resp = app
        .send(Method::PUT, "/api/v1/shops?id=1", Some(&body))
        .await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.store.shops()[0].name, "Shop 1");
    assert_eq!(app.store.links(), vec![link(1, 1)]);
}

#[tokio::test]
async fn test_replace_requires_valid_id() {
    let app = TestApp::new();
    app.seed_shops(1).await;
    let body = json!({"shop": {"name": "X", "image": "x", "price": 1, "description": "x"}})
        .to_string();

    let resp = app.send(Method::PUT, "/api/v1/shops", Some(&body)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .send(Method::PUT, "/api/v1/shops?id=one", Some(&body))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .send(Method::PUT, "/api/v1/shops?id=404", Some(&body))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Patch
// =============================================================================

#[tokio::test]
async fn test_patch_changes_only_supplied_fields() {
    let app = TestApp::new();
    app.seed_shops(1).await;

    let resp = app
        .send(
            Method::PATCH,
            "/api/v1/shops?id=1",
            Some(r#"{"shop": {"price": 999}}"#),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let shop = &app.store.shops()[0];
    assert_eq!(shop.price, 999);
    assert_eq!(shop.name, "Shop 1");
    assert_eq!(shop.image, "image1.jpeg");
    assert_eq!(shop.description, "Description 1");
}

#[tokio::test]
async fn test_patch_coerces_category_ids() {
    let app = TestApp::new();
    app.seed_categories(&["C1", "C2", "C3"]).await;
    app.seed_shops(1).await;

    let resp = app
        .send(
            Method::PATCH,
            "/api/v1/shops?id=1",
            Some(r#"{"categories": [1, "2", 3.7, null]}"#),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(app.store.links(), vec![link(1, 1), link(1, 3)]);
}

#[tokio::test]
async fn test_patch_rejects_unknown_fields() {
    let app = TestApp::new();
    app.seed_shops(1).await;

    let resp = app
        .send(
            Method::PATCH,
            "/api/v1/shops?id=1",
            Some(r#"{"shop": {"id": 7, "name": "X"}}"#),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.shops()[0].name, "Shop 1");
}

#[tokio::test]
async fn test_patch_error_cases() {
    let app = TestApp::new();
    app.seed_shops(1).await;

    let resp = app
        .send(Method::PATCH, "/api/v1/shops", Some(r#"{"shop": {}}"#))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .send(Method::PATCH, "/api/v1/shops?id=1", Some("[1, 2]"))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .send(Method::PATCH, "/api/v1/shops?id=1", Some("{"))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .send(
            Method::PATCH,
            "/api/v1/shops?id=77",
            Some(r#"{"shop": {"name": "ghost"}}"#),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.text().contains("77"));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_cascades_only_its_own_links() {
    let app = TestApp::new();
    app.seed_categories(&["C1", "C2"]).await;
    app.seed_shops(8).await;
    for shop in [6, 7, 8] {
        let uri = format!("/api/v1/shops?id={shop}");
        app.send(Method::PATCH, &uri, Some(r#"{"categories": [1, 2]}"#))
            .await;
    }

    let resp = app.send(Method::DELETE, "/api/v1/shops?id=7", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text(), "shop 7 deleted");

    let ids: Vec<i32> = app.store.shops().iter().map(|s| s.id.as_i32()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 8]);
    assert_eq!(
        app.store.links(),
        vec![link(6, 1), link(6, 2), link(8, 1), link(8, 2)]
    );
}

#[tokio::test]
async fn test_delete_error_cases() {
    let app = TestApp::new();

    let resp = app.send(Method::DELETE, "/api/v1/shops", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .send(Method::DELETE, "/api/v1/shops?id=", None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .send(Method::DELETE, "/api/v1/shops?id=3", None)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Unsupported methods
// =============================================================================

#[tokio::test]
async fn test_unsupported_method_never_reaches_store() {
    let app = TestApp::new();
    let before = app.store.call_count();

    for method in [Method::OPTIONS, Method::TRACE] {
        let resp = app
            .send(method.clone(), "/api/v1/shops", Some(SHOP_A))
            .await;
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(
            resp.headers.get(header::ALLOW).unwrap(),
            "GET, POST, PUT, PATCH, DELETE"
        );
    }

    assert_eq!(app.store.call_count(), before);
    assert!(app.store.shops().is_empty());
}
