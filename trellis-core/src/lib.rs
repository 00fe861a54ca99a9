//! Request and response primitives for Trellis.
//!
//! Trellis endpoints receive an [`HttpRequest`] from the host REST runtime
//! and answer with an [`HttpResponse`]. [`HttpRequest::all`] is the single
//! point where submitted data is extracted for validation.
//!
//! ```
//! use trellis_core::HttpRequest;
//!
//! let req = HttpRequest::new("GET", "/posts").with_query("page", "2");
//! assert_eq!(req.all().get("page"), Some(&serde_json::json!("2")));
//! ```

mod error;
mod http;
mod status;

pub use error::*;
pub use http::*;
pub use status::*;
