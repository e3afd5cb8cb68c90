pub mod api;
pub mod commands;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod model;
pub mod runner;
pub mod status;
pub mod surface;
