//! Async image processing service.
//!
//! This library provides the core functionality for the image-tasks system:
//! an HTTP API that accepts image uploads, a Redis-backed job queue and job
//! registry, and a worker that applies grayscale/resize transforms and
//! records each job's outcome.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod worker;
