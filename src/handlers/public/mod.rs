// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service info, health and the token acquisition flow.

pub mod auth;
pub mod root;

pub use root::{health, root};
