pub mod api;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod geo;
pub mod models;
pub mod observability;
pub mod session;
pub mod state;
