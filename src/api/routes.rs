//! # API Route Configuration
//!
//! This module sets up all the HTTP routes for the API.

use actix_web::web;

use super::handlers;

/// Configure all API routes.
///
/// This function is called from main.rs to set up
/// all the endpoint routes.
///
/// ## Route Structure
///
/// ```text
/// /
/// ├── /health                     GET - Health check
/// ├── /facilities                 GET - Facility catalog
/// │   └── /:id/slots              GET - Slot grid for a date
/// ├── /bookings                   POST - Direct booking
/// │   ├── /lottery                POST - Sealed lottery bid
/// │   ├── /:id/cancel             POST - Cancel / withdraw bid
/// │   ├── /:id/check-in           POST - Check in
/// │   └── /resident/:id           GET - Resident's bookings
/// └── /points
///     ├── /balance/:resident      GET - Point balance
///     ├── /history/:resident      GET - Ledger history
///     └── /adjust                 POST - Admin adjustment
/// ```
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Root endpoint - API information
        .route("/", web::get().to(handlers::api_info))
        // Health check endpoint
        .route("/health", web::get().to(handlers::health_check))
        // Facility endpoints
        .service(
            web::scope("/facilities")
                // Facility catalog
                .route("", web::get().to(handlers::list_facilities))
                // Slot grid for one facility and date
                .route("/{id}/slots", web::get().to(handlers::get_slots)),
        )
        // Booking endpoints
        .service(
            web::scope("/bookings")
                // Direct booking
                .route("", web::post().to(handlers::create_booking))
                // Sealed lottery bid
                .route("/lottery", web::post().to(handlers::join_lottery))
                // Cancel a booking (or withdraw a pending bid)
                .route("/{id}/cancel", web::post().to(handlers::cancel_booking))
                // Check in to a confirmed booking
                .route("/{id}/check-in", web::post().to(handlers::check_in))
                // List a resident's bookings
                .route(
                    "/resident/{resident}",
                    web::get().to(handlers::resident_bookings),
                ),
        )
        // Points endpoints
        .service(
            web::scope("/points")
                // Current balance
                .route("/balance/{resident}", web::get().to(handlers::get_balance))
                // Ledger history
                .route("/history/{resident}", web::get().to(handlers::get_history))
                // Manual admin adjustment
                .route("/adjust", web::post().to(handlers::adjust_points)),
        );
}
