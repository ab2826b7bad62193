// TabTrail shared type definitions
// Each submodule defines types used across the crate.

pub mod errors;
pub mod focus;
pub mod history;
pub mod message;
pub mod settings;
pub mod tab;
