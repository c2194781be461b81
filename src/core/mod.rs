//! Core library modules for gitlab-archive-dl
//!
//! This module contains the internal implementation details of the library:
//! API access, hierarchy discovery, archive transfer, dispatch and reporting.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod hierarchy;
pub mod mirror;
pub mod naming;
pub mod pagination;
pub mod report;
pub mod retry;
pub mod stream;
pub mod transfer;
pub mod types;

// Re-export main types for internal use
pub use mirror::Mirror;
