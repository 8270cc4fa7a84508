// handlers/protected/mod.rs - Handlers behind the JWT middleware
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware resolves `Authorization: Bearer <access>`
// into an `AuthUser` request extension. Handlers that need a caller take
// `AuthUser` (401 when absent); public reads take `Option<AuthUser>` or none.
// Every decision beyond that is made by the access-control layer in services.

pub mod auth;
pub mod connections;
pub mod endorsements;
pub mod messages;
pub mod profiles;
pub mod projects;
pub mod skills;
