//! TabTrail: recently visited browser tabs, shared between the browser and a launcher.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod http_handler;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
