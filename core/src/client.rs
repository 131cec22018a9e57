//! Request builder and response parser for the users resource.
//!
//! # Design
//! `UserApi` holds only its transport and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` function that decodes the response body.
//! The `UserRepository` impl glues the two together with exactly one
//! transport call, so the wire contract can be tested without I/O.

use tracing::debug;

use crate::error::{ApiError, HttpError};
use crate::http::{to_query, HttpClient, HttpRequest, Query};
use crate::types::{
    Lookup, SaveUserRequest, User, UserIdentifiers, UserList, UserListParams, UserSearchResponse,
};

const USERS_PATH: &str = "/users";
const SCROLL_PATH: &str = "/users/scroll";

/// Operations available on the users resource.
pub trait UserRepository {
    /// Look up one user by internal id, or by `user_id`/email.
    fn find(&self, identifiers: &UserIdentifiers) -> Result<User, ApiError>;

    fn list(&self, params: &UserListParams) -> Result<UserList, ApiError>;

    /// Fetch the page after `cursor`; an empty cursor starts from the top.
    fn scroll(&self, cursor: &str) -> Result<UserList, ApiError>;

    /// Create or update a user. The service decides which by matching
    /// `id`, `user_id` or `email`.
    fn save(&self, user: &User) -> Result<User, ApiError>;

    fn delete(&self, id: &str) -> Result<User, ApiError>;
}

/// `UserRepository` backed by an `HttpClient`.
#[derive(Debug, Clone)]
pub struct UserApi<C> {
    http: C,
}

impl<C> UserApi<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    pub fn build_find(&self, lookup: Lookup<'_>) -> HttpRequest {
        match lookup {
            Lookup::Id(id) => HttpRequest::get(user_path(id), Vec::new()),
            Lookup::Search { user_id, email } => {
                let mut query: Query = Vec::new();
                if let Some(user_id) = user_id {
                    query.push(("user_id".to_string(), user_id.to_string()));
                }
                if let Some(email) = email {
                    query.push(("email".to_string(), email.to_string()));
                }
                HttpRequest::get(USERS_PATH, query)
            }
        }
    }

    pub fn build_list(&self, params: &UserListParams) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::get(USERS_PATH, to_query(params)?))
    }

    pub fn build_scroll(&self, cursor: &str) -> HttpRequest {
        let query = if cursor.is_empty() {
            Vec::new()
        } else {
            vec![("scroll_param".to_string(), cursor.to_string())]
        };
        HttpRequest::get(SCROLL_PATH, query)
    }

    pub fn build_save(&self, user: &User) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&SaveUserRequest::from(user))
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest::post(USERS_PATH, body))
    }

    pub fn build_delete(&self, id: &str) -> HttpRequest {
        HttpRequest::delete(user_path(id))
    }
}

impl<C: HttpClient> UserRepository for UserApi<C> {
    fn find(&self, identifiers: &UserIdentifiers) -> Result<User, ApiError> {
        let lookup = identifiers.lookup().ok_or(ApiError::MissingIdentifier)?;
        let request = self.build_find(lookup);
        debug!(path = %request.path, query = ?request.query, "finding user");

        let body = self.http.execute(&request)?;
        match lookup {
            Lookup::Id(_) => parse_user(&body),
            Lookup::Search { .. } => parse_search(&body),
        }
    }

    fn list(&self, params: &UserListParams) -> Result<UserList, ApiError> {
        let request = self.build_list(params)?;
        debug!(query = ?request.query, "listing users");

        let list = parse_user_list(&self.http.execute(&request)?)?;
        debug!(users = list.users.len(), page = ?list.pages.page, "listed users");
        Ok(list)
    }

    fn scroll(&self, cursor: &str) -> Result<UserList, ApiError> {
        let request = self.build_scroll(cursor);
        debug!(first_page = cursor.is_empty(), "scrolling users");

        let list = parse_user_list(&self.http.execute(&request)?)?;
        debug!(users = list.users.len(), "scrolled users");
        Ok(list)
    }

    fn save(&self, user: &User) -> Result<User, ApiError> {
        let request = self.build_save(user)?;
        debug!("saving user");

        let saved = parse_user(&self.http.execute(&request)?)?;
        debug!(id = ?saved.id, "saved user");
        Ok(saved)
    }

    fn delete(&self, id: &str) -> Result<User, ApiError> {
        if id.is_empty() {
            return Err(ApiError::MissingIdentifier);
        }
        let request = self.build_delete(id);
        debug!(path = %request.path, "deleting user");

        parse_user(&self.http.execute(&request)?)
    }
}

/// `/users/{id}` with the id escaped as a single path segment.
fn user_path(id: &str) -> String {
    format!("{USERS_PATH}/{}", urlencoding::encode(id))
}

/// Decode a bare user object.
pub fn parse_user(body: &[u8]) -> Result<User, ApiError> {
    decode(body)
}

/// Decode a `{"users": [...]}` search envelope and take its first user.
///
/// The search endpoint answers 200 with an empty list when nobody matches,
/// so an empty result is turned into the same 404 the id lookup would give.
pub fn parse_search(body: &[u8]) -> Result<User, ApiError> {
    let response: UserSearchResponse = decode(body)?;
    response
        .users
        .into_iter()
        .next()
        .ok_or_else(|| HttpError::user_not_found().into())
}

/// Decode a paged user-list envelope.
pub fn parse_user_list(body: &[u8]) -> Result<UserList, ApiError> {
    decode(body)
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
