//! Progress reporting for collaboration runs

pub mod reporter;
