//! Transperth journey sensors.
//!
//! Polls the Transperth journey planner for each configured route and
//! publishes the next few journey options as sensors over HTTP.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod quick_config;
pub mod sensor;
pub mod transperth;
pub mod web;
