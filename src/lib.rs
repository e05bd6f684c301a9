//! People Enrichment API Library
//!
//! Stores person records and fills in age, gender and nationality by
//! querying three name-based lookup services concurrently under a shared
//! deadline.
//!
//! # Modules
//!
//! - `api`: API-layer view (handlers, routes, OpenAPI).
//! - `core`: Domain-layer view (enrichment, models, errors).
//! - `integrations`: Outbound lookup clients.
//! - `clients`: agify, genderize and nationalize clients.
//! - `config`: Configuration management.
//! - `db`: Database connection and schema bootstrap.
//! - `db_storage`: Human record storage.
//! - `enrichment`: Concurrent enrichment orchestrator.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Data models.
//! - `openapi`: OpenAPI document and Swagger UI.
//! - `routes`: Router and middleware.

pub mod api;
pub mod core;
pub mod integrations;

pub mod clients;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod routes;
