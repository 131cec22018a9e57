//! Client for the users resource of the Intercom REST API.
//!
//! # Overview
//! Translates `find`, `list`, `scroll`, `save` and `delete` into requests
//! against the fixed `/users` endpoints and decodes the JSON responses into
//! typed records. The HTTP round-trip is delegated to an injected
//! `HttpClient`; `UreqClient` is the stock implementation.
//!
//! # Design
//! - `UserApi` is stateless and holds only its transport, so one instance
//!   can serve concurrent callers when the transport allows it.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (decodes a body), so the wire contract is testable without I/O.
//! - Every `User` field is optional and unset fields are never sent.
//! - Errors are never retried or rewritten. The only errors raised locally
//!   are a missing identifier and the 404 for an empty search result.
//!
//! ```ignore
//! use intercom_users::{ClientConfig, UreqClient, UserApi, UserService};
//!
//! let users = UserService::new(UserApi::new(UreqClient::new(ClientConfig::from_env())));
//! let user = users.find_by_email("wash@serenity.io")?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod service;
pub mod transport;
pub mod types;

pub use client::{UserApi, UserRepository};
pub use config::ClientConfig;
pub use error::{ApiError, HttpError};
pub use http::{HttpClient, HttpMethod, HttpRequest};
pub use service::UserService;
pub use transport::UreqClient;
pub use types::{
    CompanyList, CustomAttributes, PageParams, User, UserCompany, UserIdentifiers, UserList,
    UserListParams,
};
