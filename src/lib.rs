#![allow(clippy::too_many_arguments)]

pub mod error;
pub mod validation;
pub mod model;
pub mod db;
pub mod permissions;
pub mod ops;
pub mod import;
pub mod queries;
pub mod config;
pub mod telemetry;
pub mod cli;
