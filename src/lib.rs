//! Client-side session, validation and backend gateway for the Accident
//! Notification service.

pub mod config;
pub mod flows;
pub mod metrics;
pub mod models;
pub mod services;
pub mod tracing;
pub mod utils;
