pub mod app;
pub mod cli;
pub mod commands;
pub mod configuration;
pub mod context;
pub mod error;
pub mod events;
pub mod model;
pub mod projection;
pub mod rest;
pub mod service;
pub mod storage;
pub mod tracing;
