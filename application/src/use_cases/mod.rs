//! Use cases (application services)

pub mod collaborate;
pub mod commands;
pub mod controller;
