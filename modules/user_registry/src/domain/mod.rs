pub mod error;
pub mod managers;
pub mod repo;
pub mod service;
pub mod validation;
