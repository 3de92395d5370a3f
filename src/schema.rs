// Struct representing the request body for registering a user
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateUserSchema {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct LoginSchema {
    pub email: String,
    pub password: String,
}

// Request body for creating or replacing a Todo. Both create and update use it,
// so an update always overwrites every field.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TodoSchema {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

// `?skip=&limit=` query string shared by the list routes
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}
