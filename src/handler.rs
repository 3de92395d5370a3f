use axum::{
    extract::{Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    db::DbConn,
    error::AppError,
    model::{Todo, User},
    schema::{CreateUserSchema, LoginSchema, Pagination, TodoSchema},
    session::generate_session_id,
    store,
};

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Multi-user todo API with Rust, SQLX, SQLite, and Axum";

    let json_response = serde_json::json!({
        "status": "success",
        "message": MESSAGE
    });

    Json(json_response)
}

// ---- users ----

pub async fn create_user(
    DbConn(mut conn): DbConn,
    Json(body): Json<CreateUserSchema>,
) -> Result<Json<User>, AppError> {
    let user = store::create_user(&mut conn, &body).await?;
    tracing::debug!(user_id = user.id, "registered user");
    Ok(Json(user))
}

pub async fn get_user(
    Path(user_id): Path<i64>,
    DbConn(mut conn): DbConn,
) -> Result<Json<Option<User>>, AppError> {
    Ok(Json(store::get_user(&mut conn, user_id).await?))
}

pub async fn get_users(
    Query(page): Query<Pagination>,
    DbConn(mut conn): DbConn,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(store::list_users(&mut conn, page).await?))
}

pub async fn delete_user(
    Path(user_id): Path<i64>,
    DbConn(mut conn): DbConn,
) -> Result<Json<bool>, AppError> {
    Ok(Json(store::delete_user(&mut conn, user_id).await?))
}

// ---- sessions ----

// Plain string comparison against the stored password. On success the new
// token is persisted on the user and handed back both in the body and as a cookie.
pub async fn login(
    DbConn(mut conn): DbConn,
    Json(body): Json<LoginSchema>,
) -> Result<Response, AppError> {
    let user = match store::get_user_by_email(&mut conn, &body.email).await? {
        Some(user) if user.hashed_password == body.password => user,
        _ => {
            tracing::info!("rejected login");
            return Ok((StatusCode::UNAUTHORIZED, Json(json!({"success": false}))).into_response());
        }
    };

    let session_id = generate_session_id()?;
    store::set_session(&mut conn, user.id, &session_id).await?;
    tracing::info!(user_id = user.id, "user logged in");

    let cookie = format!("session_id={}; HttpOnly; Path=/; SameSite=Lax", session_id);
    let success_response = json!({
        "success": true,
        "user_id": user.id,
        "session_id": session_id
    });

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(success_response),
    )
        .into_response())
}

pub async fn delete_session(
    Path(session_id): Path<String>,
    DbConn(mut conn): DbConn,
) -> Result<impl IntoResponse, AppError> {
    if !store::clear_session(&mut conn, &session_id).await? {
        return Err(AppError::SessionNotFound);
    }

    Ok(Json(json!({"message": "Session deleted successfully."})))
}

// ---- todos ----

pub async fn create_todo(
    Path(user_id): Path<i64>,
    DbConn(mut conn): DbConn,
    Json(body): Json<TodoSchema>,
) -> Result<Json<Todo>, AppError> {
    Ok(Json(store::create_todo(&mut conn, user_id, &body).await?))
}

pub async fn get_todo(
    Path(todo_id): Path<i64>,
    DbConn(mut conn): DbConn,
) -> Result<Json<Option<Todo>>, AppError> {
    Ok(Json(store::get_todo(&mut conn, todo_id).await?))
}

pub async fn get_todos(
    Query(page): Query<Pagination>,
    DbConn(mut conn): DbConn,
) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(store::list_todos(&mut conn, page).await?))
}

pub async fn update_todo(
    Path((user_id, todo_id)): Path<(i64, i64)>,
    DbConn(mut conn): DbConn,
    Json(body): Json<TodoSchema>,
) -> Result<Json<Option<Todo>>, AppError> {
    Ok(Json(
        store::update_user_todo(&mut conn, user_id, todo_id, &body).await?,
    ))
}

pub async fn delete_todo(
    Path((user_id, todo_id)): Path<(i64, i64)>,
    DbConn(mut conn): DbConn,
) -> Result<Json<bool>, AppError> {
    Ok(Json(store::delete_user_todo(&mut conn, user_id, todo_id).await?))
}

pub async fn get_user_todos(
    Path(user_id): Path<i64>,
    Query(page): Query<Pagination>,
    DbConn(mut conn): DbConn,
) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(store::list_user_todos(&mut conn, user_id, page).await?))
}

pub async fn get_user_todo(
    Path((user_id, todo_id)): Path<(i64, i64)>,
    DbConn(mut conn): DbConn,
) -> Result<Json<Option<Todo>>, AppError> {
    Ok(Json(store::get_user_todo(&mut conn, user_id, todo_id).await?))
}
