//! One function per use case, each issuing a single statement on a borrowed
//! connection. Missing rows come back as `None` or `false`; driver errors
//! (constraint violations included) are passed straight up.

use sqlx::{query, query_as, SqliteConnection};

use crate::{
    model::{Todo, User},
    schema::{CreateUserSchema, Pagination, TodoSchema},
};

const USER_COLUMNS: &str = "id, email, username, hashed_password, session_id";
const TODO_COLUMNS: &str = "id, title, completed, user_id";

// ---- users ----

pub async fn create_user(
    conn: &mut SqliteConnection,
    new_user: &CreateUserSchema,
) -> Result<User, sqlx::Error> {
    query_as::<_, User>(&format!(
        "INSERT INTO users (email, username, hashed_password) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}"
    ))
    .bind(&new_user.email)
    .bind(&new_user.username)
    .bind(&new_user.password)
    .fetch_one(&mut *conn)
    .await
}

pub async fn get_user(conn: &mut SqliteConnection, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn get_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn list_users(
    conn: &mut SqliteConnection,
    page: Pagination,
) -> Result<Vec<User>, sqlx::Error> {
    query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ? OFFSET ?"
    ))
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await
}

/// Overwrite email, username and password of an existing user.
pub async fn update_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    updated: &CreateUserSchema,
) -> Result<Option<User>, sqlx::Error> {
    query_as::<_, User>(&format!(
        "UPDATE users SET email = ?, username = ?, hashed_password = ? WHERE id = ? RETURNING {USER_COLUMNS}"
    ))
    .bind(&updated.email)
    .bind(&updated.username)
    .bind(&updated.password)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Todos owned by the user are left in place.
pub async fn delete_user(conn: &mut SqliteConnection, user_id: i64) -> Result<bool, sqlx::Error> {
    let rows_affected = query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

// ---- sessions ----

pub async fn set_session(
    conn: &mut SqliteConnection,
    user_id: i64,
    session_id: &str,
) -> Result<bool, sqlx::Error> {
    let rows_affected = query("UPDATE users SET session_id = ? WHERE id = ?")
        .bind(session_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

pub async fn clear_session(conn: &mut SqliteConnection, session_id: &str) -> Result<bool, sqlx::Error> {
    let rows_affected = query("UPDATE users SET session_id = NULL WHERE session_id = ?")
        .bind(session_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

// ---- todos ----

/// `user_id` is stored as given; nothing checks that the user exists.
pub async fn create_todo(
    conn: &mut SqliteConnection,
    user_id: i64,
    new_todo: &TodoSchema,
) -> Result<Todo, sqlx::Error> {
    query_as::<_, Todo>(&format!(
        "INSERT INTO todos (title, completed, user_id) VALUES (?, ?, ?) RETURNING {TODO_COLUMNS}"
    ))
    .bind(&new_todo.title)
    .bind(new_todo.completed)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
}

pub async fn get_todo(conn: &mut SqliteConnection, todo_id: i64) -> Result<Option<Todo>, sqlx::Error> {
    query_as::<_, Todo>(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?"))
        .bind(todo_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn list_todos(
    conn: &mut SqliteConnection,
    page: Pagination,
) -> Result<Vec<Todo>, sqlx::Error> {
    query_as::<_, Todo>(&format!(
        "SELECT {TODO_COLUMNS} FROM todos ORDER BY id LIMIT ? OFFSET ?"
    ))
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await
}

pub async fn update_user_todo(
    conn: &mut SqliteConnection,
    user_id: i64,
    todo_id: i64,
    updated: &TodoSchema,
) -> Result<Option<Todo>, sqlx::Error> {
    query_as::<_, Todo>(&format!(
        "UPDATE todos SET title = ?, completed = ? WHERE id = ? AND user_id = ? RETURNING {TODO_COLUMNS}"
    ))
    .bind(&updated.title)
    .bind(updated.completed)
    .bind(todo_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn delete_user_todo(
    conn: &mut SqliteConnection,
    user_id: i64,
    todo_id: i64,
) -> Result<bool, sqlx::Error> {
    let rows_affected = query("DELETE FROM todos WHERE id = ? AND user_id = ?")
        .bind(todo_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

pub async fn list_user_todos(
    conn: &mut SqliteConnection,
    user_id: i64,
    page: Pagination,
) -> Result<Vec<Todo>, sqlx::Error> {
    query_as::<_, Todo>(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ? ORDER BY id LIMIT ? OFFSET ?"
    ))
    .bind(user_id)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await
}

pub async fn get_user_todo(
    conn: &mut SqliteConnection,
    user_id: i64,
    todo_id: i64,
) -> Result<Option<Todo>, sqlx::Error> {
    query_as::<_, Todo>(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE id = ? AND user_id = ?"
    ))
    .bind(todo_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
}
