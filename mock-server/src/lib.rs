use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Users returned per `/users/scroll` page.
pub const SCROLL_PAGE_SIZE: usize = 2;
const DEFAULT_PER_PAGE: usize = 50;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_up_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribed_from_emails: Option<bool>,
    #[serde(default)]
    pub custom_attributes: HashMap<String, Value>,
}

/// Body of `POST /users`. Unknown fields are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct SaveUser {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub signed_up_at: Option<i64>,
    pub last_seen_user_agent: Option<String>,
    pub unsubscribed_from_emails: Option<bool>,
    #[serde(default)]
    pub custom_attributes: HashMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScrollQuery {
    pub scroll_param: Option<String>,
}

/// Users in insertion order, so list and scroll pages are stable.
pub type Db = Arc<RwLock<Vec<User>>>;

/// A service-style error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: "User Not Found".to_string(),
        }
    }

    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "type": "error.list",
            "errors": [{"code": self.code, "message": self.message}],
        });
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/users", get(list_users).post(save_user))
        .route("/users/scroll", get(scroll_users))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock users API listening");
    }
    axum::serve(listener, app()).await
}

fn user_list(users: &[User], page: usize, per_page: usize, total: usize) -> Value {
    json!({
        "type": "user.list",
        "pages": {
            "page": page,
            "per_page": per_page,
            "total_pages": total.div_ceil(per_page.max(1)),
        },
        "total_count": total,
        "users": users,
    })
}

async fn list_users(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Value> {
    let users = db.read().await;

    if query.user_id.is_some() || query.email.is_some() {
        let matches: Vec<&User> = users
            .iter()
            .filter(|u| query.user_id.is_none() || u.user_id == query.user_id)
            .filter(|u| query.email.is_none() || u.email == query.email)
            .collect();
        return Json(json!({"type": "user.list", "users": matches}));
    }

    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let start = (page - 1).saturating_mul(per_page).min(users.len());
    let end = (start + per_page).min(users.len());
    Json(user_list(&users[start..end], page, per_page, users.len()))
}

/// Cursor is the offset of the next page; an exhausted scroll keeps handing
/// back the same cursor with no users.
async fn scroll_users(
    State(db): State<Db>,
    Query(query): Query<ScrollQuery>,
) -> Result<Json<Value>, ApiError> {
    let offset = match query.scroll_param.as_deref() {
        None | Some("") => 0,
        Some(cursor) => cursor
            .parse::<usize>()
            .map_err(|_| ApiError::bad_request("scroll_exists", "invalid scroll_param"))?,
    };

    let users = db.read().await;
    let start = offset.min(users.len());
    let end = (start + SCROLL_PAGE_SIZE).min(users.len());
    Ok(Json(json!({
        "type": "user.list",
        "users": &users[start..end],
        "scroll_param": end.to_string(),
    })))
}

async fn get_user(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<User>, ApiError> {
    let users = db.read().await;
    users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

/// Upsert keyed on `id`, then `user_id`, then `email`.
async fn save_user(
    State(db): State<Db>,
    Json(input): Json<SaveUser>,
) -> Result<Json<User>, ApiError> {
    if input.id.is_none() && input.user_id.is_none() && input.email.is_none() {
        return Err(ApiError::bad_request(
            "parameter_not_found",
            "Missing user identifier",
        ));
    }

    let mut users = db.write().await;
    let existing = users.iter().position(|u| {
        (input.id.is_some() && input.id.as_deref() == Some(u.id.as_str()))
            || (input.user_id.is_some() && u.user_id == input.user_id)
            || (input.email.is_some() && u.email == input.email)
    });

    let index = match existing {
        Some(index) => index,
        None => {
            if input.id.is_some() {
                return Err(ApiError::not_found());
            }
            users.push(User {
                id: Uuid::new_v4().simple().to_string(),
                ..User::default()
            });
            users.len() - 1
        }
    };

    let user = &mut users[index];
    if input.user_id.is_some() {
        user.user_id = input.user_id;
    }
    if input.email.is_some() {
        user.email = input.email;
    }
    if input.phone.is_some() {
        user.phone = input.phone;
    }
    if input.name.is_some() {
        user.name = input.name;
    }
    if input.signed_up_at.is_some() {
        user.signed_up_at = input.signed_up_at;
    }
    if input.last_seen_user_agent.is_some() {
        user.last_seen_user_agent = input.last_seen_user_agent;
    }
    if input.unsubscribed_from_emails.is_some() {
        user.unsubscribed_from_emails = input.unsubscribed_from_emails;
    }
    user.custom_attributes.extend(input.custom_attributes);

    Ok(Json(user.clone()))
}

async fn delete_user(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let mut users = db.write().await;
    let index = users
        .iter()
        .position(|u| u.id == id)
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(users.remove(index)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_omits_unset_fields() {
        let user = User {
            id: "abc".to_string(),
            email: Some("zoe@serenity.io".to_string()),
            ..User::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            json!({"id": "abc", "email": "zoe@serenity.io", "custom_attributes": {}})
        );
    }

    #[test]
    fn save_user_ignores_unknown_fields() {
        let input: SaveUser =
            serde_json::from_str(r#"{"email":"zoe@serenity.io","new_session":true}"#).unwrap();
        assert_eq!(input.email.as_deref(), Some("zoe@serenity.io"));
        assert!(input.custom_attributes.is_empty());
    }

    #[test]
    fn user_list_counts_pages() {
        let list = user_list(&[], 1, 2, 5);
        assert_eq!(list["pages"]["total_pages"], 3);
        assert_eq!(list["total_count"], 5);
    }

    #[test]
    fn not_found_uses_error_list_envelope() {
        let err = ApiError::not_found();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "not_found");
    }
}
