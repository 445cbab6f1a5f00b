//! Clinic Booking - backend for a medical clinic.
//!
//! Patients book fixed-length slots cut from doctors' weekly availability,
//! doctors approve and run the consultations, and a payment gates each
//! consultation's start.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities, request types and the appointment state machine
//! - **services**: Use cases, each running inside one unit of work
//! - **infra**: Database, migrations, repositories and the unit of work
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Bootstrap an admin
//! cargo run -- create-admin --name Admin --email admin@example.com --password 'change-me-now'
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Actor, Password, Role, User};
pub use errors::{AppError, AppResult};
