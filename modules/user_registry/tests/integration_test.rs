//! Integration-style tests for the user_registry module.
//!
//! Key points:
//! - Each test runs on a fresh in-memory SQLite DB opened through `db::DbHandle`.
//! - The module is initialized for real: migrations, seed, SeaORM repositories.
//! - REST layer is exercised via the module's Axum router with `oneshot`.

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use db::{ConnectOpts, DbHandle};
use user_registry::{
    contract::model::{NewUser, UserFilter, UserPatch},
    domain::error::DomainError,
    UserRegistry, UserRegistryConfig,
};

async fn create_test_module() -> UserRegistry {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database");
    UserRegistry::init(&db, &UserRegistryConfig::default())
        .await
        .expect("Failed to init module")
}

fn new_user(manager_id: &str) -> NewUser {
    NewUser {
        full_name: Some("Asha Verma".into()),
        mob_num: Some("+919876543210".into()),
        pan_num: Some("abcde1234f".into()),
        manager_id: Some(manager_id.into()),
    }
}

async fn post(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_init_seeds_three_active_managers() -> Result<()> {
    let module = create_test_module().await;
    let seeded = module.seeded_managers();
    assert_eq!(seeded.len(), 3);

    let svc = module.service();
    for id in seeded {
        assert!(svc.managers().is_active(id).await?);
    }
    assert!(!svc.managers().is_active("no-such-manager").await?);

    // seeding is idempotent
    assert!(svc.seed_managers(3).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_domain_service_create_and_query() -> Result<()> {
    let module = create_test_module().await;
    let svc = module.service();
    let manager = module.seeded_managers()[0].clone();

    let created = svc.create_user(new_user(&manager)).await?;
    assert_eq!(created.mob_num, "9876543210");
    assert_eq!(created.pan_num, "ABCDE1234F");
    assert!(created.is_active);
    assert_eq!(created.created_at, created.updated_at);

    let by_id = svc.list_users(UserFilter::ById(created.user_id.clone())).await?;
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].user_id, created.user_id);

    let by_mobile = svc.list_users(UserFilter::ByMobile("09876543210".into())).await?;
    assert_eq!(by_mobile.len(), 1);

    let by_manager = svc.list_users(UserFilter::ByManager(manager)).await?;
    assert_eq!(by_manager.len(), 1);

    let other_manager = module.seeded_managers()[1].clone();
    assert!(svc.list_users(UserFilter::ByManager(other_manager)).await?.is_empty());

    assert_eq!(svc.list_users(UserFilter::All).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_create_validation_order() -> Result<()> {
    let module = create_test_module().await;
    let svc = module.service();
    let manager = module.seeded_managers()[0].clone();

    let missing = NewUser {
        full_name: Some(String::new()),
        ..new_user("unknown")
    };
    assert!(matches!(
        svc.create_user(missing).await,
        Err(DomainError::MissingFields)
    ));

    // manager is checked before the mobile number
    let bad_everything = NewUser {
        mob_num: Some("123".into()),
        ..new_user("unknown")
    };
    assert!(matches!(
        svc.create_user(bad_everything).await,
        Err(DomainError::InactiveManager { .. })
    ));

    let bad_mobile = NewUser {
        mob_num: Some("123".into()),
        pan_num: Some("bad".into()),
        ..new_user(&manager)
    };
    assert!(matches!(
        svc.create_user(bad_mobile).await,
        Err(DomainError::InvalidMobile { .. })
    ));

    let bad_pan = NewUser {
        pan_num: Some("bad".into()),
        ..new_user(&manager)
    };
    assert!(matches!(
        svc.create_user(bad_pan).await,
        Err(DomainError::InvalidPan { .. })
    ));

    assert!(svc.list_users(UserFilter::All).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_update_in_place_keeps_identity() -> Result<()> {
    let module = create_test_module().await;
    let svc = module.service();
    let manager = module.seeded_managers()[0].clone();
    let created = svc.create_user(new_user(&manager)).await?;

    let patch = UserPatch {
        full_name: Some("Asha V.".into()),
        pan_num: Some("zzzzz9999z".into()),
        ..Default::default()
    };
    let summary = svc
        .update_users(&[created.user_id.clone(), "missing".into()], Some(patch))
        .await?;
    assert_eq!((summary.updated, summary.forked, summary.skipped), (1, 0, 1));

    let users = svc.list_users(UserFilter::ById(created.user_id.clone())).await?;
    assert_eq!(users.len(), 1);
    let user = &users[0];
    assert_eq!(user.full_name, "Asha V.");
    assert_eq!(user.pan_num, "ZZZZZ9999Z");
    assert_eq!(user.mob_num, "9876543210");
    assert_eq!(user.manager_id, manager);
    assert_eq!(user.created_at, created.created_at);
    assert!(user.updated_at >= created.updated_at);
    Ok(())
}

#[tokio::test]
async fn test_manager_reassignment_forks_row() -> Result<()> {
    let module = create_test_module().await;
    let svc = module.service();
    let old_manager = module.seeded_managers()[0].clone();
    let new_manager = module.seeded_managers()[1].clone();
    let created = svc.create_user(new_user(&old_manager)).await?;

    let patch = UserPatch {
        manager_id: Some(new_manager.clone()),
        ..Default::default()
    };
    let summary = svc
        .update_users(std::slice::from_ref(&created.user_id), Some(patch))
        .await?;
    assert_eq!(summary.forked, 1);

    // old id is no longer visible
    assert!(svc
        .list_users(UserFilter::ById(created.user_id.clone()))
        .await?
        .is_empty());

    let moved = svc.list_users(UserFilter::ByManager(new_manager.clone())).await?;
    assert_eq!(moved.len(), 1);
    let fork = &moved[0];
    assert_ne!(fork.user_id, created.user_id);
    assert_eq!(fork.created_at, created.created_at);
    assert_eq!(fork.full_name, created.full_name);
    assert_eq!(fork.mob_num, created.mob_num);
    assert!(fork.is_active);

    assert!(svc.list_users(UserFilter::ByManager(old_manager)).await?.is_empty());
    assert_eq!(svc.list_users(UserFilter::All).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_update_to_inactive_manager_is_rejected() -> Result<()> {
    let module = create_test_module().await;
    let svc = module.service();
    let manager = module.seeded_managers()[0].clone();
    let created = svc.create_user(new_user(&manager)).await?;

    let patch = UserPatch {
        manager_id: Some("retired".into()),
        ..Default::default()
    };
    let result = svc
        .update_users(std::slice::from_ref(&created.user_id), Some(patch))
        .await;
    assert!(matches!(result, Err(DomainError::InactiveManager { .. })));

    let users = svc.list_users(UserFilter::ById(created.user_id)).await?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].manager_id, manager);
    Ok(())
}

#[tokio::test]
async fn test_batch_failure_keeps_earlier_rows() -> Result<()> {
    let module = create_test_module().await;
    let svc = module.service();
    let manager = module.seeded_managers()[0].clone();
    let first = svc.create_user(new_user(&manager)).await?;
    let second = svc.create_user(new_user(&manager)).await?;

    let patch = UserPatch {
        full_name: Some("Renamed".into()),
        ..Default::default()
    };
    svc.update_users(std::slice::from_ref(&first.user_id), Some(patch))
        .await?;

    // the mobile is re-validated per row, so the whole batch fails on the first row it loads
    let patch = UserPatch {
        full_name: Some("Again".into()),
        mob_num: Some("123".into()),
        ..Default::default()
    };
    let result = svc
        .update_users(&[second.user_id.clone(), first.user_id.clone()], Some(patch))
        .await;
    assert!(matches!(result, Err(DomainError::InvalidMobile { .. })));

    let first_now = svc.list_users(UserFilter::ById(first.user_id)).await?;
    assert_eq!(first_now[0].full_name, "Renamed");
    let second_now = svc.list_users(UserFilter::ById(second.user_id)).await?;
    assert_eq!(second_now[0].full_name, "Asha Verma");
    Ok(())
}

#[tokio::test]
async fn test_delete_finds_inactive_rows_and_mobiles() -> Result<()> {
    let module = create_test_module().await;
    let svc = module.service();
    let manager = module.seeded_managers()[0].clone();
    let other = module.seeded_managers()[1].clone();
    let created = svc.create_user(new_user(&manager)).await?;

    // supersede the row, then delete the inactive original by id
    svc.update_users(
        std::slice::from_ref(&created.user_id),
        Some(UserPatch {
            manager_id: Some(other),
            ..Default::default()
        }),
    )
    .await?;
    let removed = svc.delete_user(Some(created.user_id.clone()), None).await?;
    assert_eq!(removed.user_id, created.user_id);
    assert!(!removed.is_active);

    // the fork is still reachable by its mobile
    let removed = svc.delete_user(None, Some("+919876543210".into())).await?;
    assert!(removed.is_active);
    assert!(svc.list_users(UserFilter::All).await?.is_empty());

    assert!(matches!(
        svc.delete_user(None, Some("9876543210".into())).await,
        Err(DomainError::UserNotFound)
    ));
    assert!(matches!(
        svc.delete_user(None, Some("123".into())).await,
        Err(DomainError::UserNotFound)
    ));
    assert!(matches!(
        svc.delete_user(Some(String::new()), None).await,
        Err(DomainError::MissingLookupKey)
    ));
    Ok(())
}

// ---------------- REST ----------------

#[tokio::test]
async fn test_rest_create_normalizes_fields() {
    let module = create_test_module().await;
    let router = module.router();
    let manager = module.seeded_managers()[0].clone();

    let (status, body) = post(
        &router,
        "/create_user",
        json!({
            "full_name": "Asha Verma",
            "mob_num": "+919876543210",
            "pan_num": "abcde1234f",
            "manager_id": manager
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User created successfully");
    let user_id = body["user_id"].as_str().unwrap().to_string();

    let (status, body) = post(&router, "/get_users", json!({ "user_id": user_id })).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["mob_num"], "9876543210");
    assert_eq!(users[0]["pan_num"], "ABCDE1234F");
    assert_eq!(users[0]["manager_id"], manager.as_str());
    assert_eq!(users[0]["is_active"], true);
}

#[tokio::test]
async fn test_rest_create_errors() {
    let module = create_test_module().await;
    let router = module.router();
    let manager = module.seeded_managers()[0].clone();

    let cases = [
        (json!({ "full_name": "A" }), "Please fill all fields"),
        (
            json!({ "full_name": "A", "mob_num": "9876543210", "pan_num": "ABCDE1234F", "manager_id": "nope" }),
            "Manager is not active",
        ),
        (
            json!({ "full_name": "A", "mob_num": "98765", "pan_num": "ABCDE1234F", "manager_id": manager }),
            "Invalid mobile number",
        ),
        (
            json!({ "full_name": "A", "mob_num": "9876543210", "pan_num": "ABC", "manager_id": manager }),
            "Invalid PAN number",
        ),
    ];
    for (payload, expected) in cases {
        let (status, body) = post(&router, "/create_user", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{expected}");
        assert_eq!(body["error"], expected);
    }

    let (_, body) = post(&router, "/get_users", json!({})).await;
    assert!(body["users"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rest_update_invalid_mobile_mutates_nothing() {
    let module = create_test_module().await;
    let router = module.router();
    let manager = module.seeded_managers()[0].clone();
    let created = module.service().create_user(new_user(&manager)).await.unwrap();

    let (status, body) = post(
        &router,
        "/update_user",
        json!({ "user_ids": [created.user_id], "update_data": { "mob_num": "123" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid mobile");

    let (_, body) = post(&router, "/get_users", json!({ "user_id": created.user_id })).await;
    let user = &body["users"][0];
    assert_eq!(user["mob_num"], "9876543210");
    assert_eq!(user["full_name"], "Asha Verma");
}

#[tokio::test]
async fn test_rest_update_errors() {
    let module = create_test_module().await;
    let router = module.router();
    let manager = module.seeded_managers()[0].clone();
    let created = module.service().create_user(new_user(&manager)).await.unwrap();

    let cases = [
        (json!({ "update_data": { "full_name": "x" } }), "Invalid user_ids"),
        (json!({ "user_ids": [], "update_data": {} }), "Invalid user_ids"),
        (json!({ "user_ids": "abc", "update_data": {} }), "Invalid user_ids"),
        (json!({ "user_ids": [created.user_id] }), "No update data provided"),
        (
            json!({ "user_ids": [created.user_id], "update_data": { "pan_num": "12" } }),
            "Invalid PAN",
        ),
        (
            json!({ "user_ids": [created.user_id], "update_data": { "manager_id": "gone" } }),
            "Manager inactive",
        ),
    ];
    for (payload, expected) in cases {
        let (status, body) = post(&router, "/update_user", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{expected}");
        assert_eq!(body["error"], expected);
    }

    let (status, body) = post(
        &router,
        "/update_user",
        json!({ "user_ids": ["unknown"], "update_data": { "mob_num": "123" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unknown ids are skipped before validation");
    assert_eq!(body["message"], "Update completed");
}

#[tokio::test]
async fn test_rest_update_reassigns_manager() {
    let module = create_test_module().await;
    let router = module.router();
    let old_manager = module.seeded_managers()[0].clone();
    let new_manager = module.seeded_managers()[2].clone();
    let created = module.service().create_user(new_user(&old_manager)).await.unwrap();

    let (status, body) = post(
        &router,
        "/update_user",
        json!({ "user_ids": [created.user_id], "update_data": { "manager_id": new_manager } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Update completed");

    let (_, body) = post(&router, "/get_users", json!({ "user_id": created.user_id })).await;
    assert!(body["users"].as_array().unwrap().is_empty());

    let (_, body) = post(&router, "/get_users", json!({ "manager_id": new_manager })).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_ne!(users[0]["user_id"], created.user_id.as_str());
    assert_eq!(
        users[0]["created_at"],
        serde_json::to_value(created.created_at).unwrap()
    );
}

#[tokio::test]
async fn test_rest_delete_then_query_and_delete_again() {
    let module = create_test_module().await;
    let router = module.router();
    let manager = module.seeded_managers()[0].clone();
    let created = module.service().create_user(new_user(&manager)).await.unwrap();

    let (status, body) = post(&router, "/delete_user", json!({ "user_id": created.user_id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (_, body) = post(&router, "/get_users", json!({ "user_id": created.user_id })).await;
    assert!(body["users"].as_array().unwrap().is_empty());

    let (status, body) = post(&router, "/delete_user", json!({ "user_id": created.user_id })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_rest_delete_errors() {
    let module = create_test_module().await;
    let router = module.router();

    let (status, body) = post(&router, "/delete_user", json!({ "user_id": "ghost" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = post(&router, "/delete_user", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Provide user_id or mob_num");
}

#[tokio::test]
async fn test_rest_query_rejects_invalid_mobile() {
    let module = create_test_module().await;
    let router = module.router();

    let (status, body) = post(&router, "/get_users", json!({ "mob_num": "12ab" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid mobile number");
}

#[tokio::test]
async fn test_rest_malformed_json_is_bad_request() {
    let module = create_test_module().await;
    let router = module.router();

    let request = Request::builder()
        .method("POST")
        .uri("/create_user")
        .header("content-type", "application/json")
        .body(Body::from("{\"full_name\": "))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_rest_health_and_openapi() {
    let module = create_test_module().await;
    let router = module.router();

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Server is running fine");
    assert!(body["time"].is_string());

    let request = Request::builder()
        .uri("/openapi.json")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/create_user"].is_object());
}
