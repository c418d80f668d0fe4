//! # gridtree-remote - Remote Table Loading
//!
//! Fetches table data and child-table configuration from a REST backend.
//! Depends on `gridtree-core` for the record and configuration model.
//!
//! ## Public API
//!
//! ### Loading (`loader`)
//! - [`TableLoader`] - `load_root`, `load_child`, `delete_row`
//! - [`child_url()`] - Route + relation value for one parent record
//!
//! ### Responses (`response`)
//! - [`TableResponse`] - Rows plus the table's own configuration
//! - [`decompose()`] - Split a response body, resolving the child-tree fallback
//!
//! ### Endpoints (`profile`)
//! - [`ApiProfile`] - Base URL, default endpoint, tokens, timeout
//! - [`web_route()`], [`view_url()`], [`edit_url()`] - Page links for a row
//!
//! ### Transport (`transport`, `http`)
//! - [`Transport`] - Fetch-by-URL abstraction
//! - [`HttpTransport`] - `reqwest` implementation

pub mod http;
pub mod loader;
pub mod profile;
pub mod response;
pub mod transport;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use http::{HttpTransport, CSRF_HEADER};
pub use loader::{child_url, TableLoader};
pub use profile::{edit_url, strip_query, view_url, web_route, ApiProfile};
pub use response::{decompose, ResponseShape, TableResponse, TreeSource};
pub use transport::{CsrfSource, LocalTransport, StaticCsrfToken, Transport};
