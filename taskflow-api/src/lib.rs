//! # TaskFlow API Server Library
//!
//! HTTP surface for the TaskFlow task manager. Authorization decisions live
//! in `taskflow-shared`; this crate wires them to Axum.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and the bearer auth layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
