//! REST API client for the job-board backend.
//!
//! Covers the request/response surface the platform exposes: auth, job
//! postings, résumés, applications, the general chat endpoint, and the
//! SmartBot screening protocol (`start-analysis` followed by repeated
//! `chat` calls). All methods are thin typed wrappers over `reqwest`;
//! the bearer token is read from the shared
//! [`TokenStore`](crate::auth::TokenStore) on every request.

pub mod client;

pub use client::Client;
