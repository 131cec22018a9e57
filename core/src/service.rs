//! Convenience entry points over a `UserRepository`.

use crate::client::UserRepository;
use crate::error::ApiError;
use crate::types::{User, UserIdentifiers, UserList, UserListParams};

/// Thin facade that spells out the common lookups and filters.
#[derive(Debug, Clone)]
pub struct UserService<R> {
    repository: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Find by the service-assigned id.
    pub fn find_by_id(&self, id: impl Into<String>) -> Result<User, ApiError> {
        self.repository.find(&UserIdentifiers::by_id(id))
    }

    /// Find by the caller-assigned `user_id`.
    pub fn find_by_user_id(&self, user_id: impl Into<String>) -> Result<User, ApiError> {
        self.repository.find(&UserIdentifiers::by_user_id(user_id))
    }

    pub fn find_by_email(&self, email: impl Into<String>) -> Result<User, ApiError> {
        self.repository.find(&UserIdentifiers::by_email(email))
    }

    pub fn list(&self, params: &UserListParams) -> Result<UserList, ApiError> {
        self.repository.list(params)
    }

    /// List members of a segment. Any `segment_id` already in `params` is
    /// replaced.
    pub fn list_by_segment(
        &self,
        segment_id: impl Into<String>,
        params: &UserListParams,
    ) -> Result<UserList, ApiError> {
        let params = UserListParams {
            segment_id: Some(segment_id.into()),
            ..params.clone()
        };
        self.repository.list(&params)
    }

    /// List users carrying a tag. Any `tag_id` already in `params` is
    /// replaced.
    pub fn list_by_tag(
        &self,
        tag_id: impl Into<String>,
        params: &UserListParams,
    ) -> Result<UserList, ApiError> {
        let params = UserListParams {
            tag_id: Some(tag_id.into()),
            ..params.clone()
        };
        self.repository.list(&params)
    }

    pub fn scroll(&self, cursor: &str) -> Result<UserList, ApiError> {
        self.repository.scroll(cursor)
    }

    pub fn save(&self, user: &User) -> Result<User, ApiError> {
        self.repository.save(user)
    }

    pub fn delete(&self, id: &str) -> Result<User, ApiError> {
        self.repository.delete(id)
    }
}
