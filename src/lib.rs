#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

pub mod actions;
pub mod app_composite;
pub mod assistant;
pub mod config;
pub mod controller;
pub mod error;
pub mod logger;
pub mod responders;
pub mod session;
pub mod speech;
pub mod ui;
