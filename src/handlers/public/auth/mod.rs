// handlers/public/auth/mod.rs - Public authentication handlers
//
// Account registration and JWT acquisition. These run without a token.

pub mod refresh; // POST /api/token/refresh - access token from refresh token
pub mod register; // POST /api/auth/register - create account and profile
pub mod token; // POST /api/token - exchange credentials for a token pair

pub use refresh::refresh_post;
pub use register::register_post;
pub use token::token_post;
