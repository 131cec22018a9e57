//! Domain DTOs for the users resource.
//!
//! # Design
//! Every field is optional: the service omits what it does not know and the
//! client must not send what the caller did not set. Booleans are
//! `Option<bool>` so an explicit `false` survives alongside "unset".
//! Field names follow the service's snake_case wire vocabulary exactly.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Decode an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Caller-defined attributes stored on a user, keyed by attribute name.
pub type CustomAttributes = HashMap<String, serde_json::Value>;

/// Identifies a single user for a lookup.
///
/// Callers normally set one field. `id` takes precedence; `user_id` and
/// `email` are forwarded together when both are present. Empty strings are
/// treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserIdentifiers {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl UserIdentifiers {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn by_user_id(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Resolve which endpoint this lookup should hit.
    pub fn lookup(&self) -> Option<Lookup<'_>> {
        if let Some(id) = non_empty(&self.id) {
            return Some(Lookup::Id(id));
        }
        let user_id = non_empty(&self.user_id);
        let email = non_empty(&self.email);
        if user_id.is_none() && email.is_none() {
            return None;
        }
        Some(Lookup::Search { user_id, email })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// The endpoint a `UserIdentifiers` resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// `GET /users/{id}`
    Id(&'a str),
    /// `GET /users?user_id=..&email=..`
    Search {
        user_id: Option<&'a str>,
        email: Option<&'a str>,
    },
}

/// A user as returned by the service, or as populated by a caller before
/// `save`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pseudonym: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_data: Option<LocationData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_up_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_request_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_profiles: Option<SocialProfileList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribed_from_emails: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<SegmentList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub companies: Option<CompanyList>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub custom_attributes: CustomAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_last_request_at: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_session: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_user_agent: Option<String>,
}

/// A company reference attached to a user.
///
/// Set `remove` to `Some(true)` in a `save` to detach the company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCompany {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove: Option<bool>,
}

/// `{"type": "company.list", "companies": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub companies: Vec<UserCompany>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Geolocation the service derived from the user's last seen IP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialProfileList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub social_profiles: Vec<SocialProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub segments: Vec<Segment>,
}

/// Paging block of a list response, also used to request a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

/// A page of users from `list` or `scroll`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages: PageParams,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
    /// Cursor for the next `scroll` call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_param: Option<String>,
}

/// Filters for `GET /users`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
    /// Only users created in the last N days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_since: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

/// Envelope of `GET /users?email=..` / `?user_id=..`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UserSearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
}

/// Body of `POST /users`: the writable subset of `User`, borrowed.
#[derive(Debug, Serialize)]
pub(crate) struct SaveUserRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_up_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_request_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_ip: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribed_from_emails: Option<bool>,
    #[serde(skip_serializing_if = "no_companies")]
    pub companies: &'a [UserCompany],
    #[serde(skip_serializing_if = "no_attributes")]
    pub custom_attributes: &'a CustomAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_last_request_at: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_session: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_user_agent: Option<&'a str>,
}

fn no_companies(companies: &&[UserCompany]) -> bool {
    companies.is_empty()
}

fn no_attributes(attributes: &&CustomAttributes) -> bool {
    attributes.is_empty()
}

impl<'a> From<&'a User> for SaveUserRequest<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: user.id.as_deref(),
            email: user.email.as_deref(),
            phone: user.phone.as_deref(),
            user_id: user.user_id.as_deref(),
            name: user.name.as_deref(),
            signed_up_at: user.signed_up_at,
            remote_created_at: user.remote_created_at,
            last_request_at: user.last_request_at,
            last_seen_ip: user.last_seen_ip.as_deref(),
            unsubscribed_from_emails: user.unsubscribed_from_emails,
            companies: user
                .companies
                .as_ref()
                .map(|list| list.companies.as_slice())
                .unwrap_or_default(),
            custom_attributes: &user.custom_attributes,
            update_last_request_at: user.update_last_request_at,
            new_session: user.new_session,
            last_seen_user_agent: user.last_seen_user_agent.as_deref(),
        }
    }
}
