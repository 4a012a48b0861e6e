//! readycheck - Black-box readiness assessment for multi-tenant web services.
//!
//! readycheck probes a running HTTP service (or starts one and waits for it),
//! records a PASS / PARTIAL / FAIL result per check, and turns the results
//! into a readiness score and tier.
//!
//! # Modules
//!
//! - [`checks`] - Check and category model plus the built-in catalogue
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Layered configuration loading and validation
//! - [`error`] - Error types and result aliases
//! - [`probe`] - HTTP probe execution with tenant headers and timeouts
//! - [`report`] - JSON assessment report
//! - [`results`] - Outcomes and the ordered result recorder
//! - [`runner`] - Run coordination and interruption
//! - [`scoring`] - Weighted scoring and readiness tiers
//! - [`secrets`] - Secret detection and detail redaction
//! - [`shell`] - Shell command execution for external suites
//! - [`supervisor`] - Dependent process lifecycle
//! - [`ui`] - Spinners, themes, and terminal output
//!
//! # Example
//!
//! ```
//! use readycheck::results::{Outcome, ResultRecorder};
//! use readycheck::scoring::{score, Tier};
//!
//! let mut recorder = ResultRecorder::new();
//! recorder.record("Infrastructure", "API health", Outcome::Pass, "200 OK");
//! recorder.record("Security Headers", "X-Frame-Options present", Outcome::Partial, "");
//!
//! let verdict = score(recorder.all());
//! assert_eq!(verdict.overall_score, 75.0);
//! assert_eq!(verdict.tier, Tier::NearReady);
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod probe;
pub mod report;
pub mod results;
pub mod runner;
pub mod scoring;
pub mod secrets;
pub mod shell;
pub mod supervisor;
pub mod ui;

pub use error::{ReadyCheckError, Result};
