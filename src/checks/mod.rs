//! Checks: named assessment units grouped into categories.
//!
//! - [`Check`] wraps a body that returns a [`CheckVerdict`]
//! - [`Category`] orders checks and marks them parallel-safe
//! - [`CheckContext`] carries the probe executor and session state
//! - [`builtin_catalogue`] builds the default categories from configuration
//!
//! # Example
//!
//! ```
//! use readycheck::checks::{Category, CheckVerdict};
//! use readycheck::probe::ProbeRequest;
//!
//! let category = Category::new("Smoke")
//!     .check("Health", |ctx| {
//!         let outcome = ctx.probe(ProbeRequest::get("/api/health"));
//!         Ok(CheckVerdict::from(&outcome))
//!     })
//!     .check("Version header", |ctx| {
//!         let outcome = ctx.probe(ProbeRequest::get("/"));
//!         let response = outcome.verify()?;
//!         Ok(CheckVerdict::from_bool(
//!             response.header("X-Version").is_some(),
//!             outcome.detail(),
//!         ))
//!     });
//!
//! assert_eq!(category.len(), 2);
//! ```

pub mod catalogue;
pub mod context;
pub mod model;

pub use catalogue::builtin_catalogue;
pub use context::{CheckContext, Session, UNIQUE_PLACEHOLDER};
pub use model::{filter_categories, Category, Check, CheckFn, CheckVerdict};
