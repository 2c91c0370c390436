//! Data Transfer Objects for the judge REST API
//!
//! Request payloads sent by the client and the envelope every response is
//! wrapped in.

pub mod auth;
pub mod page;
pub mod problem;
pub mod response;
pub mod submission;
