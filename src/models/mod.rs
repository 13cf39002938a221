pub mod booking;
pub mod chat;
pub mod location;
pub mod service;
pub mod user;
pub mod worker;
