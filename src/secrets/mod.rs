//! Secret detection and masking.
//!
//! - [`is_secret_key`] - Matches environment variable names against secret patterns
//! - [`Redactor`] - Masks secret values and bearer tokens in check details
//!
//! # Example
//!
//! ```
//! use readycheck::secrets::{is_secret_key, Redactor};
//!
//! assert!(is_secret_key("TEST_PASSWORD"));
//!
//! let redactor = Redactor::new();
//! let detail = redactor.redact("GET /api/users with Bearer abc.def");
//! assert!(!detail.contains("abc.def"));
//! ```

pub mod mask;
pub mod pattern;

pub use mask::{Redactor, REDACTED};
pub use pattern::{is_secret_key, SECRET_KEY_PATTERNS};
