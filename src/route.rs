use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{handler::*, AppState};

// Local frontend dev servers
const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:5174"];

pub fn cors_layer() -> CorsLayer {
    // Credentials rule out `Any`, so methods and headers are mirrored instead.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            ALLOWED_ORIGINS.map(HeaderValue::from_static),
        ))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_checker_handler))
        .route("/users/", get(get_users).post(create_user))
        .route("/users/:user_id", get(get_user))
        .route("/delete-users/:user_id", delete(delete_user))
        .route("/login/", post(login))
        .route("/sessions/:session_id", delete(delete_session))
        .route("/users/:user_id/todos/", post(create_todo))
        .route(
            "/users/:user_id/todos/:todo_id",
            put(update_todo).delete(delete_todo),
        )
        .route("/todos/", get(get_todos))
        .route("/todos/:todo_id", get(get_todo))
        .route("/user/:user_id/todos/", get(get_user_todos))
        .route("/user/:user_id/todos/:todo_id", get(get_user_todo))
        .with_state(app_state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::db::test_pool;

    async fn test_app() -> Router {
        let pool = test_pool().await;
        create_router(Arc::new(AppState { db: pool }))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(app: &Router, email: &str) -> i64 {
        let response = send(
            app,
            Method::POST,
            "/users/",
            Some(json!({"email": email, "username": "tester", "password": "pw"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["id"].as_i64().unwrap()
    }

    async fn add_todo(app: &Router, user_id: i64, title: &str) -> Value {
        let response = send(
            app,
            Method::POST,
            &format!("/users/{}/todos/", user_id),
            Some(json!({"title": title})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_app().await;
        let response = send(&app, Method::GET, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "success");
    }

    #[tokio::test]
    async fn created_user_can_be_fetched_by_id() {
        let app = test_app().await;
        let id = register(&app, "ada@example.com").await;

        let response = send(&app, Method::GET, &format!("/users/{}", id), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"id": id, "email": "ada@example.com", "username": "tester"})
        );
    }

    #[tokio::test]
    async fn unknown_user_is_null() {
        let app = test_app().await;
        let response = send(&app, Method::GET, "/users/99", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, Value::Null);
    }

    #[tokio::test]
    async fn users_list_honours_skip_and_limit() {
        let app = test_app().await;
        for n in 0..3 {
            register(&app, &format!("u{}@example.com", n)).await;
        }

        let response = send(&app, Method::GET, "/users/?skip=1&limit=1", None).await;
        let users = json_body(response).await;
        assert_eq!(users.as_array().unwrap().len(), 1);
        assert_eq!(users[0]["email"], "u1@example.com");
    }

    #[tokio::test]
    async fn login_issues_session_that_can_be_deleted_once() {
        let app = test_app().await;
        let id = register(&app, "login@example.com").await;

        let response = send(
            &app,
            Method::POST,
            "/login/",
            Some(json!({"email": "login@example.com", "password": "pw"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["user_id"], id);
        let session_id = body["session_id"].as_str().unwrap().to_string();
        assert!(!session_id.is_empty());
        assert!(cookie.starts_with(&format!("session_id={};", session_id)));
        assert!(cookie.contains("HttpOnly"));

        let uri = format!("/sessions/{}", session_id);
        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"message": "Session deleted successfully."})
        );

        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({"detail": "Session not found"})
        );
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_without_cookie() {
        let app = test_app().await;
        register(&app, "wrong@example.com").await;

        for body in [
            json!({"email": "wrong@example.com", "password": "PW"}),
            json!({"email": "nobody@example.com", "password": "pw"}),
        ] {
            let response = send(&app, Method::POST, "/login/", Some(body)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(response.headers().get(header::SET_COOKIE).is_none());
            assert_eq!(json_body(response).await, json!({"success": false}));
        }
    }

    #[tokio::test]
    async fn scoped_and_unscoped_todo_reads_agree() {
        let app = test_app().await;
        let owner = register(&app, "a@example.com").await;
        let other = register(&app, "b@example.com").await;
        let created = add_todo(&app, owner, "groceries").await;
        let todo_id = created["id"].as_i64().unwrap();
        assert_eq!(created["completed"], false);
        assert_eq!(created["user_id"], owner);

        let unscoped = json_body(send(&app, Method::GET, &format!("/todos/{}", todo_id), None).await).await;
        let scoped = json_body(
            send(&app, Method::GET, &format!("/user/{}/todos/{}", owner, todo_id), None).await,
        )
        .await;
        let foreign = json_body(
            send(&app, Method::GET, &format!("/user/{}/todos/{}", other, todo_id), None).await,
        )
        .await;

        assert_eq!(unscoped, created);
        assert_eq!(scoped, created);
        assert_eq!(foreign, Value::Null);
    }

    #[tokio::test]
    async fn update_overwrites_all_fields() {
        let app = test_app().await;
        let owner = register(&app, "up@example.com").await;
        let todo_id = add_todo(&app, owner, "x").await["id"].as_i64().unwrap();
        let uri = format!("/users/{}/todos/{}", owner, todo_id);

        let response = send(&app, Method::PUT, &uri, Some(json!({"title": "y", "completed": true}))).await;
        assert_eq!(
            json_body(response).await,
            json!({"id": todo_id, "title": "y", "completed": true, "user_id": owner})
        );

        // omitted `completed` falls back to false rather than keeping `true`
        let response = send(&app, Method::PUT, &uri, Some(json!({"title": "z"}))).await;
        assert_eq!(json_body(response).await["completed"], false);

        let foreign = format!("/users/{}/todos/{}", owner + 1, todo_id);
        let response = send(&app, Method::PUT, &foreign, Some(json!({"title": "q"}))).await;
        assert_eq!(json_body(response).await, Value::Null);
    }

    #[tokio::test]
    async fn deleting_missing_rows_returns_false() {
        let app = test_app().await;
        let owner = register(&app, "del@example.com").await;
        let todo_id = add_todo(&app, owner, "gone").await["id"].as_i64().unwrap();

        let uri = format!("/users/{}/todos/{}", owner, todo_id);
        assert_eq!(json_body(send(&app, Method::DELETE, &uri, None).await).await, json!(true));
        assert_eq!(json_body(send(&app, Method::DELETE, &uri, None).await).await, json!(false));

        let response = send(&app, Method::DELETE, "/delete-users/999", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!(false));

        let uri = format!("/delete-users/{}", owner);
        assert_eq!(json_body(send(&app, Method::DELETE, &uri, None).await).await, json!(true));
    }

    #[tokio::test]
    async fn todo_lists_scoped_and_unscoped() {
        let app = test_app().await;
        let a = register(&app, "la@example.com").await;
        let b = register(&app, "lb@example.com").await;
        add_todo(&app, a, "a1").await;
        add_todo(&app, b, "b1").await;
        add_todo(&app, a, "a2").await;

        let all = json_body(send(&app, Method::GET, "/todos/", None).await).await;
        assert_eq!(all.as_array().unwrap().len(), 3);

        let mine = json_body(send(&app, Method::GET, &format!("/user/{}/todos/?skip=0", a), None).await).await;
        let titles: Vec<_> = mine
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, ["a1", "a2"]);
    }

    #[tokio::test]
    async fn duplicate_email_surfaces_as_server_error() {
        let app = test_app().await;
        register(&app, "same@example.com").await;

        let response = send(
            &app,
            Method::POST,
            "/users/",
            Some(json!({"email": "same@example.com", "username": "again", "password": "pw"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn cors_allows_local_dev_origin() {
        let app = test_app().await;
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/todos/")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }
}
