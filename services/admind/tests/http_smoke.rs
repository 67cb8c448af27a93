mod common;
mod http_helpers;

use admind::app::{AppState, build_router};
use admind::store::{AdminStore, StoreConfig, memory::MemoryStore};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::read_json;
use http_helpers::json_request;
use std::sync::Arc;
use tower::ServiceExt;

type TestApp = axum::routing::RouterIntoService<axum::body::Body, ()>;

fn test_app() -> TestApp {
    let store = MemoryStore::new(StoreConfig { max_page_size: 100 });
    let state = AppState {
        api_version: "v1".to_string(),
        store: Arc::new(store),
        session_ttl: chrono::Duration::hours(1),
        max_page_size: 100,
    };
    build_router(state).into_service()
}

async fn create_user(app: &TestApp, email: &str, password: &str) -> serde_json::Value {
    let request = json_request(
        "POST",
        "/v1/users",
        serde_json::json!({
            "email": email,
            "display_name": email,
            "password": password
        }),
    );
    let response = app.clone().oneshot(request).await.expect("create user");
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}

#[tokio::test]
async fn system_endpoints_report_backend() {
    let app = test_app();

    let request = Request::builder()
        .uri("/v1/system/info")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("info");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["api_version"], "v1");
    assert_eq!(payload["backend"], "memory");
    assert_eq!(payload["features"]["durable_storage"], false);

    let request = Request::builder()
        .uri("/v1/system/health")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("health");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["status"], "ok");
}

#[tokio::test]
async fn users_crud_smoke() {
    let app = test_app();

    let created = create_user(&app, "ada@example.com", "pw-one").await;
    let user_id = created["id"].as_str().expect("id").to_string();
    assert_eq!(created["email"], "ada@example.com");
    assert!(created.get("password").is_none());
    assert!(created.get("password_hash").is_none());

    let duplicate = json_request(
        "POST",
        "/v1/users",
        serde_json::json!({
            "email": "ada@example.com",
            "display_name": "Ada",
            "password": "pw-two"
        }),
    );
    let response = app.clone().oneshot(duplicate).await.expect("duplicate");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "already_exists");

    let list = Request::builder()
        .uri("/v1/users")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(list).await.expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["items"].as_array().expect("items").len(), 1);

    let update = json_request(
        "PUT",
        &format!("/v1/users/{user_id}"),
        serde_json::json!({
            "email": "ada@lovelace.dev",
            "display_name": "Ada Lovelace",
            "password": null
        }),
    );
    let response = app.clone().oneshot(update).await.expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["email"], "ada@lovelace.dev");

    let get = Request::builder()
        .uri(format!("/v1/users/{user_id}"))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(get).await.expect("get");
    assert_eq!(response.status(), StatusCode::OK);

    let missing = Request::builder()
        .uri(format!("/v1/users/{}", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(missing).await.expect("missing");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/users/{user_id}"))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(delete).await.expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let delete_again = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/users/{user_id}"))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(delete_again).await.expect("delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_permissions_view_groups_actions_per_resource() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/roles",
            serde_json::json!({ "name": "editor" }),
        ))
        .await
        .expect("role");
    assert_eq!(response.status(), StatusCode::CREATED);
    let role = read_json(response).await;
    let role_id = role["id"].as_str().expect("id").to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/permission-resources",
            serde_json::json!({ "name": "articles" }),
        ))
        .await
        .expect("resource");
    assert_eq!(response.status(), StatusCode::CREATED);
    let articles = read_json(response).await;
    let articles_id = articles["id"].as_str().expect("id").to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/permission-resources",
            serde_json::json!({ "name": "users" }),
        ))
        .await
        .expect("resource");
    let users = read_json(response).await;
    let users_id = users["id"].as_str().expect("id").to_string();

    let mut action_ids = Vec::new();
    for (resource_id, name) in [
        (&articles_id, "create"),
        (&articles_id, "delete"),
        (&users_id, "read"),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/v1/permission-resources/{resource_id}/actions"),
                serde_json::json!({ "name": name }),
            ))
            .await
            .expect("action");
        assert_eq!(response.status(), StatusCode::CREATED);
        let action = read_json(response).await;
        action_ids.push(action["id"].as_str().expect("id").to_string());
    }

    for action_id in &action_ids {
        let grant = Request::builder()
            .method("PUT")
            .uri(format!("/v1/roles/{role_id}/permissions/{action_id}"))
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(grant).await.expect("grant");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
    // Granting twice must not create a duplicate entry in the view.
    let regrant = Request::builder()
        .method("PUT")
        .uri(format!("/v1/roles/{role_id}/permissions/{}", action_ids[0]))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(regrant).await.expect("regrant");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let view = Request::builder()
        .uri(format!("/v1/roles/{role_id}/permissions"))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(view).await.expect("view");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let entries = payload["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["resource"]["name"], "articles");
    let article_actions: Vec<&str> = entries[0]["actions"]
        .as_array()
        .expect("actions")
        .iter()
        .map(|action| action["name"].as_str().expect("name"))
        .collect();
    assert_eq!(article_actions, vec!["create", "delete"]);
    assert_eq!(entries[1]["resource"]["name"], "users");

    let revoke = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/roles/{role_id}/permissions/{}", action_ids[1]))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(revoke).await.expect("revoke");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let view = Request::builder()
        .uri(format!("/v1/roles/{role_id}/permissions"))
        .body(Body::empty())
        .expect("request");
    let payload = read_json(app.clone().oneshot(view).await.expect("view")).await;
    let entries = payload["entries"].as_array().expect("entries");
    assert_eq!(entries[0]["actions"].as_array().expect("actions").len(), 1);

    // Revoking a grant that no longer exists is a 404, not a silent no-op.
    let revoke_again = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/roles/{role_id}/permissions/{}", action_ids[1]))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(revoke_again).await.expect("revoke");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_role_assignment_round_trip() {
    let app = test_app();
    let user = create_user(&app, "curator@example.com", "pw").await;
    let user_id = user["id"].as_str().expect("id").to_string();

    let mut role_ids = Vec::new();
    for name in ["admin", "editor"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/v1/roles",
                serde_json::json!({ "name": name }),
            ))
            .await
            .expect("role");
        let role = read_json(response).await;
        role_ids.push(role["id"].as_str().expect("id").to_string());
    }

    let assign = json_request(
        "PUT",
        &format!("/v1/users/{user_id}/roles"),
        serde_json::json!({ "roles": role_ids }),
    );
    let response = app.clone().oneshot(assign).await.expect("assign");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let list = Request::builder()
        .uri(format!("/v1/users/{user_id}/roles"))
        .body(Body::empty())
        .expect("request");
    let payload = read_json(app.clone().oneshot(list).await.expect("list")).await;
    let names: Vec<&str> = payload["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|role| role["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["admin", "editor"]);

    let unknown = json_request(
        "PUT",
        &format!("/v1/users/{user_id}/roles"),
        serde_json::json!({ "roles": [uuid::Uuid::new_v4()] }),
    );
    let response = app.clone().oneshot(unknown).await.expect("assign");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn article_pages_report_totals_and_validate_inputs() {
    let app = test_app();
    let author = create_user(&app, "author@example.com", "pw").await;
    let author_id = author["id"].as_str().expect("id").to_string();
    let other = create_user(&app, "other@example.com", "pw").await;
    let other_id = other["id"].as_str().expect("id").to_string();

    for i in 0..12 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/v1/articles",
                serde_json::json!({
                    "title": format!("Weekly digest {i}"),
                    "body": "content",
                    "author_id": author_id
                }),
            ))
            .await
            .expect("article");
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/articles",
            serde_json::json!({
                "title": "Offtopic note",
                "body": "content",
                "author_id": other_id
            }),
        ))
        .await
        .expect("article");
    assert_eq!(response.status(), StatusCode::CREATED);

    let page = Request::builder()
        .uri("/v1/articles?page=1&page_size=10")
        .body(Body::empty())
        .expect("request");
    let payload = read_json(app.clone().oneshot(page).await.expect("page")).await;
    assert_eq!(payload["total"], 13);
    assert_eq!(payload["items"].as_array().expect("items").len(), 10);
    assert_eq!(payload["page"], 1);
    assert_eq!(payload["page_size"], 10);

    let page = Request::builder()
        .uri("/v1/articles?page=2&page_size=10")
        .body(Body::empty())
        .expect("request");
    let payload = read_json(app.clone().oneshot(page).await.expect("page")).await;
    assert_eq!(payload["items"].as_array().expect("items").len(), 3);

    let filtered = Request::builder()
        .uri(format!(
            "/v1/articles?author_id={author_id}&title=digest&page_size=100&sort=updated_at&order=asc"
        ))
        .body(Body::empty())
        .expect("request");
    let payload = read_json(app.clone().oneshot(filtered).await.expect("page")).await;
    assert_eq!(payload["total"], 12);
    assert_eq!(payload["items"].as_array().expect("items").len(), 12);

    let invalid = Request::builder()
        .uri("/v1/articles?page=0")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(invalid).await.expect("invalid");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let oversized = Request::builder()
        .uri("/v1/articles?page_size=1000")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(oversized).await.expect("oversized");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let orphan = json_request(
        "POST",
        "/v1/articles",
        serde_json::json!({
            "title": "No author",
            "body": "content",
            "author_id": uuid::Uuid::new_v4()
        }),
    );
    let response = app.clone().oneshot(orphan).await.expect("orphan");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_lifecycle_round_trip() {
    let app = test_app();
    let user = create_user(&app, "sess@example.com", "hunter2").await;
    let user_id = user["id"].as_str().expect("id").to_string();

    let bad = json_request(
        "POST",
        "/v1/sessions",
        serde_json::json!({ "email": "sess@example.com", "password": "wrong" }),
    );
    let response = app.clone().oneshot(bad).await.expect("bad login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let login = json_request(
        "POST",
        "/v1/sessions",
        serde_json::json!({ "email": "sess@example.com", "password": "hunter2" }),
    );
    let response = app.clone().oneshot(login).await.expect("login");
    assert_eq!(response.status(), StatusCode::CREATED);
    let session = read_json(response).await;
    let session_id = session["id"].as_str().expect("id").to_string();
    let refresh_token = session["refresh_token"].as_str().expect("token").to_string();
    assert_eq!(session["user_id"].as_str().expect("user"), user_id);

    let lookup = json_request(
        "POST",
        "/v1/sessions/lookup",
        serde_json::json!({ "refresh_token": refresh_token }),
    );
    let response = app.clone().oneshot(lookup).await.expect("lookup");
    assert_eq!(response.status(), StatusCode::OK);
    let found = read_json(response).await;
    assert_eq!(found["id"], session_id.as_str());

    let miss = json_request(
        "POST",
        "/v1/sessions/lookup",
        serde_json::json!({ "refresh_token": "nope" }),
    );
    let response = app.clone().oneshot(miss).await.expect("miss");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let list = Request::builder()
        .uri(format!("/v1/users/{user_id}/sessions"))
        .body(Body::empty())
        .expect("request");
    let payload = read_json(app.clone().oneshot(list).await.expect("list")).await;
    assert_eq!(payload["items"].as_array().expect("items").len(), 1);

    let purge = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/users/{user_id}/sessions"))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(purge).await.expect("purge");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["deleted"], 1);

    let lookup = json_request(
        "POST",
        "/v1/sessions/lookup",
        serde_json::json!({ "refresh_token": refresh_token }),
    );
    let response = app.clone().oneshot(lookup).await.expect("lookup");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
