pub mod config;
pub mod constants;
pub mod profile;
pub mod session;
pub mod store;
pub mod substrate;
