//! # REST API Module
//!
//! This module defines all HTTP endpoints for the Facility Booking API.
//!
//! ## Endpoint Overview
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/facilities` | Facility catalog |
//! | GET | `/facilities/:id/slots?date=` | Slot grid for a date |
//! | POST | `/bookings` | Direct booking |
//! | POST | `/bookings/lottery` | Sealed lottery bid |
//! | POST | `/bookings/:id/cancel` | Cancel / withdraw |
//! | POST | `/bookings/:id/check-in` | Check in |
//! | GET | `/bookings/resident/:id` | Resident's bookings |
//! | GET | `/points/balance/:resident` | Point balance |
//! | GET | `/points/history/:resident` | Ledger history |
//! | POST | `/points/adjust` | Admin adjustment |
//! | GET | `/health` | Health check |
//!
//! ## Request/Response Format
//!
//! All requests and responses use JSON:
//!
//! ```json
//! // Success response
//! {
//!     "success": true,
//!     "data": { ... }
//! }
//!
//! // Error response
//! {
//!     "success": false,
//!     "error": {
//!         "code": "ERROR_CODE",
//!         "message": "Human readable message"
//!     }
//! }
//! ```

pub mod handlers;
pub mod routes;

pub use routes::configure_routes;
