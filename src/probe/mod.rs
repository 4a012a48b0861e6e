//! HTTP probes against the service under assessment.
//!
//! A probe is one timed request classified against an expectation. Probes
//! never retry and never record results themselves; the caller turns a
//! [`ProbeOutcome`] into a check verdict.

mod executor;
mod request;

pub use executor::{ProbeExecutor, ProbeFailure, ProbeOutcome, TransportFailure, TENANT_HEADER};
pub use request::{Expectation, Headers, Method, ProbeRequest, ProbeResponse, ResponseBody};

pub(crate) use executor::format_secs;
