// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::UserRegistry;

pub mod config;
pub use config::UserRegistryConfig;

// === INTERNAL MODULES ===
// Exposed for the server binary and for tests; the contract module is the stable surface.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
