// handlers/public/mod.rs - Public handlers (no authentication required)
//
// The public drink menu plus the service banner and health probe.

pub mod drinks;
pub mod service;
