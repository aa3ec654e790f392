pub mod app;
pub mod campaign;
pub mod config;
pub mod roster;
pub mod smtp;
