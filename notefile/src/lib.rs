//! notefile library
//!
//! Backend for a user's note files and the editor core that autosaves to
//! it. Exposed as a library for the binary and for integration tests.

pub mod api;
pub mod app;
pub mod client;
pub mod config;
pub mod database;
pub mod editor;
pub mod error;
pub mod services;
