// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token + permission)
pub mod public;
pub mod protected;
