//! OJWatch Core
//!
//! Core types shared by the online-judge client crates.
//!
//! This crate contains:
//! - Domain types: Verdicts, submissions, problems, languages and users
//! - DTOs: The response envelope, paging and request payloads

pub mod domain;
pub mod dto;
