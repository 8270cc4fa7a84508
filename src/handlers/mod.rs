// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (behind the JWT middleware)
//
// Protected routes resolve the bearer token when one is sent. Reads of public
// resources (profiles, skills, projects, endorsements) also accept anonymous
// callers; everything else requires an `AuthUser`.
pub mod protected; // Tier 2: /api/* behind jwt_auth_middleware
pub mod public; // Tier 1: service info, health, token acquisition
