//! CLI-specific utilities for gitlab-archive-dl
//!
//! This module contains code specific to the command-line interface,
//! separate from the core library functionality.

pub mod progress;
pub mod prompt;

pub use progress::ProgressManager;
pub use prompt::resolve_token;
