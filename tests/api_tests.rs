mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{ADMIN_USERNAME, json as read_json, spawn_app};
use til::models::acronym::AcronymInput;
use til::models::user::{Actor, Role};
use til::services::{AcronymError, UserError};

#[tokio::test]
async fn test_scenario_alice_learning_category() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    app.create_user(&admin, "alice", "secret123").await;
    let alice = app.login("alice", "secret123").await;

    let acronym_id = app.create_acronym(&alice, "TIL", "Today I Learned").await;

    let response = app
        .send_json("POST", "/api/categories", Some(&alice), &json!({ "name": "Learning" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let category: Value = read_json(response).await;
    let category_id = category["id"].as_i64().unwrap();

    let response = app
        .send_authed(
            "POST",
            &format!("/api/acronyms/{acronym_id}/categories/{category_id}"),
            &alice,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .get(&format!("/api/acronyms/{acronym_id}/categories"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let categories: Vec<Value> = read_json(response).await;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["name"], "Learning");

    let owner: Value = read_json(app.get(&format!("/api/acronyms/{acronym_id}/user")).await).await;
    assert_eq!(owner["username"], "alice");
    assert!(owner.get("password_hash").is_none());
}

#[tokio::test]
async fn test_bad_credentials_issue_no_token() {
    let app = spawn_app().await;
    let admin = app
        .state
        .store()
        .get_user_by_username(ADMIN_USERNAME)
        .await
        .unwrap()
        .unwrap();
    let before = app.state.store().count_tokens_for_user(admin.id).await.unwrap();

    for (username, password) in [("admin", "wrong"), ("nobody", "password"), ("", "")] {
        let response = app
            .send(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/api/users/login")
                    .header("authorization", common::basic(username, password))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .send(
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/users/login")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let after = app.state.store().count_tokens_for_user(admin.id).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_bearer_guard() {
    let app = spawn_app().await;

    let body = json!({ "short": "OMG", "long": "Oh My God" });
    let response = app.send_json("POST", "/api/acronyms", None, &body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send_json("POST", "/api/acronyms", Some("not-a-token"), &body)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error: Value = read_json(response).await;
    assert_eq!(error["error"], "Invalid bearer token");

    // Public routes stay open without a credential.
    assert_eq!(app.get("/api/acronyms").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_standard_user_cannot_manage_users() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let bob_id = app.create_user(&admin, "bob", "secret123").await;
    let carol_id = app.create_user(&admin, "carol", "secret123").await;
    let bob = app.login("bob", "secret123").await;

    for (method, uri) in [
        ("DELETE", format!("/api/users/{carol_id}")),
        ("POST", format!("/api/users/{carol_id}/restore")),
        ("DELETE", format!("/api/users/{carol_id}/force")),
        ("DELETE", format!("/api/users/{bob_id}")),
    ] {
        let response = app.send_authed(method, &uri, &bob).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{method} {uri}");
    }

    assert_eq!(
        app.get(&format!("/api/users/{carol_id}")).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_soft_delete_and_restore() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let dave_id = app.create_user(&admin, "dave", "secret123").await;
    let dave_uuid: uuid::Uuid = dave_id.parse().unwrap();

    let response = app
        .send_authed("DELETE", &format!("/api/users/{dave_id}"), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        app.get(&format!("/api/users/{dave_id}")).await.status(),
        StatusCode::NOT_FOUND
    );
    let users = app.state.user_service();
    assert!(matches!(
        users.find(dave_uuid).await,
        Err(UserError::NotFound)
    ));
    let hidden = users
        .find_with_deleted(dave_uuid)
        .await
        .expect("soft-deleted user is still stored");
    assert!(hidden.deleted_at.is_some());

    let response = app
        .send_authed("POST", &format!("/api/users/{dave_id}/restore"), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        app.get(&format!("/api/users/{dave_id}")).await.status(),
        StatusCode::OK
    );
    let restored = app.state.store().get_user(dave_uuid).await.unwrap().unwrap();
    assert!(restored.deleted_at.is_none());
}

#[tokio::test]
async fn test_force_delete_cascades_and_soft_delete_does_not() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let store = app.state.store();

    let erin_id = app.create_user(&admin, "erin", "secret123").await;
    let erin_uuid: uuid::Uuid = erin_id.parse().unwrap();
    let erin = app.login("erin", "secret123").await;
    let acronym_id = app.create_acronym(&erin, "IRL", "In Real Life").await;
    let acronym_id = i32::try_from(acronym_id).unwrap();
    let category = store
        .attach_category_by_name(acronym_id, "Chat")
        .await
        .unwrap();

    // Soft delete hides the user but leaves everything else alone.
    let response = app
        .send_authed("DELETE", &format!("/api/users/{erin_id}"), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.get_acronym(acronym_id).await.unwrap().is_some());
    assert_eq!(store.count_tokens_for_user(erin_uuid).await.unwrap(), 1);
    assert_eq!(
        store.category_acronyms(category.id).await.unwrap().unwrap().len(),
        1
    );

    let response = app
        .send_authed("DELETE", &format!("/api/users/{erin_id}/force"), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        app.get(&format!("/api/acronyms/{acronym_id}")).await.status(),
        StatusCode::NOT_FOUND
    );
    assert!(matches!(
        app.state.user_service().find_with_deleted(erin_uuid).await,
        Err(UserError::NotFound)
    ));
    assert_eq!(store.count_tokens_for_user(erin_uuid).await.unwrap(), 0);
    assert!(
        store
            .category_acronyms(category.id)
            .await
            .unwrap()
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_attach_is_idempotent() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let acronym_id = app.create_acronym(&admin, "AFK", "Away From Keyboard").await;
    let acronym_id = i32::try_from(acronym_id).unwrap();
    let store = app.state.store();

    let first = store.attach_category_by_name(acronym_id, "Gaming").await.unwrap();
    let second = store.attach_category_by_name(acronym_id, "Gaming").await.unwrap();
    assert_eq!(first.id, second.id);

    let uri = format!("/api/acronyms/{acronym_id}/categories/{}", first.id);
    for _ in 0..2 {
        let response = app.send_authed("POST", &uri, &admin).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let categories = store.acronym_categories(acronym_id).await.unwrap().unwrap();
    assert_eq!(categories.len(), 1);

    let response = app.send_authed("DELETE", &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(
        store
            .acronym_categories(acronym_id)
            .await
            .unwrap()
            .unwrap()
            .is_empty()
    );

    let response = app
        .send_authed("POST", &format!("/api/acronyms/{acronym_id}/categories/9999"), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_reconciliation_swaps_only_the_difference() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let acronym_id = app.create_acronym(&admin, "API", "Application Programming Interface").await;
    let acronym_id = i32::try_from(acronym_id).unwrap();
    let store = app.state.store();

    let a = store.attach_category_by_name(acronym_id, "A").await.unwrap();
    let b = store.attach_category_by_name(acronym_id, "B").await.unwrap();

    let owner = store
        .get_user_by_username(ADMIN_USERNAME)
        .await
        .unwrap()
        .unwrap();
    let (_, diff) = store
        .update_acronym_with_categories(
            acronym_id,
            "API",
            "Application Programming Interface",
            owner.id,
            &["B".to_string(), "C".to_string()],
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(diff.attach, vec!["C".to_string()]);
    assert_eq!(diff.detach, vec!["A".to_string()]);

    let mut names: Vec<String> = store
        .acronym_categories(acronym_id)
        .await
        .unwrap()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["B".to_string(), "C".to_string()]);

    // B kept its original row; A still exists as a category, just unattached.
    let categories = store.acronym_categories(acronym_id).await.unwrap().unwrap();
    assert!(categories.iter().any(|c| c.id == b.id));
    assert!(store.get_category(a.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_unknown_owner_is_rejected() {
    let app = spawn_app().await;
    let ghost = Actor {
        id: uuid::Uuid::new_v4(),
        name: "Ghost".to_string(),
        username: "ghost".to_string(),
        role: Role::Standard,
    };

    let result = app
        .state
        .acronym_service()
        .create(
            &ghost,
            AcronymInput {
                short: "BOO".to_string(),
                long: "Boo".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(AcronymError::UnknownOwner)));
    assert!(app.state.store().list_acronyms().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_reassigns_owner() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    app.create_user(&admin, "frank", "secret123").await;
    let frank = app.login("frank", "secret123").await;

    let acronym_id = app.create_acronym(&admin, "BRB", "Be Right Back").await;

    let response = app
        .send_json(
            "PUT",
            &format!("/api/acronyms/{acronym_id}"),
            Some(&frank),
            &json!({ "short": "BRB", "long": "Be Right Back!" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = read_json(response).await;
    assert_eq!(updated["long"], "Be Right Back!");

    let owner: Value = read_json(app.get(&format!("/api/acronyms/{acronym_id}/user")).await).await;
    assert_eq!(owner["username"], "frank");
}

#[tokio::test]
async fn test_acronym_queries() {
    let app = spawn_app().await;

    assert_eq!(
        app.get("/api/acronyms/first").await.status(),
        StatusCode::NOT_FOUND
    );

    let admin = app.admin_token().await;
    app.create_acronym(&admin, "WTF", "What The Fudge").await;
    app.create_acronym(&admin, "AFAIK", "As Far As I Know").await;
    let last = app.create_acronym(&admin, "LOL", "Laugh Out Loud").await;

    let sorted: Vec<Value> = read_json(app.get("/api/acronyms/sorted").await).await;
    let shorts: Vec<&str> = sorted.iter().map(|a| a["short"].as_str().unwrap()).collect();
    assert_eq!(shorts, vec!["AFAIK", "LOL", "WTF"]);

    let recent: Vec<Value> = read_json(app.get("/api/acronyms/mostRecent").await).await;
    assert_eq!(recent[0]["id"].as_i64(), Some(last));

    let found: Vec<Value> = read_json(app.get("/api/acronyms/search?term=Laugh%20Out%20Loud").await).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["short"], "LOL");

    let partial: Vec<Value> = read_json(app.get("/api/acronyms/search?term=Laugh").await).await;
    assert!(partial.is_empty());

    assert_eq!(
        app.get("/api/acronyms/search").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.get("/api/acronyms/search?term=").await.status(),
        StatusCode::BAD_REQUEST
    );

    let joined: Vec<Value> = read_json(app.get("/api/acronyms/users").await).await;
    assert_eq!(joined.len(), 3);
    assert_eq!(joined[0]["user"]["username"], "admin");

    let raw: Vec<Value> = read_json(app.get("/api/acronyms/raw").await).await;
    assert_eq!(raw.len(), 3);

    let response = app
        .send_authed("DELETE", &format!("/api/acronyms/{last}"), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        app.get(&format!("/api/acronyms/{last}")).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_user_views() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app
        .send_json(
            "POST",
            "/api/users",
            Some(&admin),
            &json!({
                "name": "Grace",
                "username": "grace",
                "password": "secret123",
                "email": "grace@example.com",
                "twitter_url": "@grace",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let grace: Value = read_json(response).await;
    let grace_id = grace["id"].as_str().unwrap().to_string();
    assert!(grace.get("password").is_none());

    let v2: Value = read_json(app.get(&format!("/api/v2/users/{grace_id}")).await).await;
    assert_eq!(v2["twitter_url"], "@grace");

    let duplicate = app
        .send_json(
            "POST",
            "/api/users",
            Some(&admin),
            &json!({
                "name": "Grace Again",
                "username": "grace",
                "password": "secret123",
                "email": "grace2@example.com",
            }),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    let grace_token = app.login("grace", "secret123").await;
    app.create_acronym(&grace_token, "ASAP", "As Soon As Possible").await;

    let owned: Vec<Value> =
        read_json(app.get(&format!("/api/users/{grace_id}/acronyms")).await).await;
    assert_eq!(owned.len(), 1);

    let nested: Vec<Value> = read_json(app.get("/api/users/acronyms").await).await;
    let grace_entry = nested
        .iter()
        .find(|u| u["username"] == "grace")
        .expect("grace listed");
    assert_eq!(grace_entry["acronyms"].as_array().unwrap().len(), 1);

    let users: Vec<Value> = read_json(app.get("/api/users").await).await;
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;
    let response = app.get("/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_security_headers_differ_per_surface() {
    let app = spawn_app().await;

    let api = app.get("/api/acronyms").await;
    assert_eq!(api.headers()["cache-control"], "no-store");
    assert_eq!(api.headers()["x-content-type-options"], "nosniff");
    assert!(api.headers().get("content-security-policy").is_none());

    let page = app.get("/").await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(
        page.headers()["content-security-policy"]
            .to_str()
            .unwrap()
            .contains("script-src 'none'")
    );
    assert_eq!(page.headers()["x-frame-options"], "DENY");
}
