pub mod chain;
pub mod config;
pub mod constants;
pub mod driver;
pub mod factory;
pub mod report;
