// handlers/protected/auth/mod.rs - Authenticated account handlers

pub mod whoami; // GET /api/auth/whoami

pub use whoami::whoami_get;
