//! # Facility Booking Backend Service
//!
//! This is the main entry point for the backend service that manages
//! shared-facility bookings and the resident points economy. It provides:
//!
//! - REST API for residents (slots, bookings, lottery bids, points)
//! - Background sweeps for lottery resolution and no-show settlement
//! - Monthly point allocations
//! - Database storage for bookings and the append-only points ledger
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        BACKEND SERVICE                           │
//! │                                                                  │
//! │  ┌─────────────────────────┐  ┌─────────────────────────────┐   │
//! │  │        REST API         │  │     Background Services     │   │
//! │  │        (Actix)          │  │  • Lottery sweep            │   │
//! │  │                         │  │  • No-show sweep            │   │
//! │  │  /facilities  /bookings │  │  • Monthly allocation       │   │
//! │  │  /points      /health   │  │                             │   │
//! │  └─────────────────────────┘  └─────────────────────────────┘   │
//! │               │                             │                    │
//! │               └──────────────┬──────────────┘                    │
//! │                              │                                   │
//! │  ┌───────────────────────────┴───────────────────────────────┐  │
//! │  │                      SERVICE LAYER                         │  │
//! │  │  ┌─────────────────┐ ┌──────────────┐ ┌────────────────┐  │  │
//! │  │  │BookingScheduler │ │ PointsLedger │ │LotteryAllocator│  │  │
//! │  │  └─────────────────┘ └──────────────┘ └────────────────┘  │  │
//! │  └───────────────────────────┬───────────────────────────────┘  │
//! │                              │                                   │
//! │                       ┌──────┴──────┐                            │
//! │                       │  PostgreSQL │                            │
//! │                       │  Database   │                            │
//! │                       └─────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! 1. Set up PostgreSQL and create the database
//! 2. Copy `.env.example` to `.env` and configure
//! 3. Start the server: `cargo run` (migrations run on startup)
//!
//! ## Environment Variables
//!
//! See `.env.example` for all required configuration.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod api;
mod config;
mod db;
mod models;
mod services;
mod utils;

use config::AppConfig;
use db::Database;
use services::{
    AttendanceTracker, BookingScheduler, CancellationEngine, LotteryAllocator, PointsLedger,
    PricingPolicy, SlotGenerator, Sweeper,
};

/// Application state shared across all handlers.
///
/// This struct contains all the shared resources that API handlers
/// and background services need access to.
///
/// ## Why Arc?
/// `Arc` (Atomic Reference Counting) allows us to share ownership
/// of these resources across multiple threads safely.
pub struct AppState {
    /// Database connection pool for PostgreSQL
    pub db: Database,

    /// Slot derivation and pricing
    pub slots: SlotGenerator,

    /// Points balance and ledger service
    pub ledger: PointsLedger,

    /// Direct booking and lottery bid service
    pub scheduler: BookingScheduler,

    /// Cancellation and refund service
    pub cancellation: CancellationEngine,

    /// Check-in and no-show service
    pub attendance: AttendanceTracker,

    /// Application configuration
    pub config: AppConfig,
}

/// Main entry point for the backend service.
///
/// This function:
/// 1. Loads configuration from environment
/// 2. Initializes database connection and runs migrations
/// 3. Wires up the service layer
/// 4. Starts the background sweeper
/// 5. Launches the HTTP server
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // =========================================
    // STEP 1: Initialize Logging
    // =========================================
    // Set up structured logging with tracing
    // This gives us nice formatted logs with timestamps
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("🚀 Starting Facility Booking Backend Service");

    // =========================================
    // STEP 2: Load Configuration
    // =========================================
    // Load from environment variables (from .env file)
    dotenvy::dotenv().ok(); // It's okay if .env doesn't exist

    let config = AppConfig::from_env().expect("Failed to load configuration");

    info!("📋 Configuration loaded");
    info!("   Booking horizon: {} days", config.booking_horizon_days);
    info!("   Lottery lock: {}h before slot", config.lottery_lock_hours);

    // =========================================
    // STEP 3: Initialize Database
    // =========================================
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    info!("🗄️  Database connected");

    // Run migrations to ensure schema is up to date
    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    info!("📦 Database migrations complete");

    // =========================================
    // STEP 4: Initialize Services
    // =========================================
    let slots = SlotGenerator::new(
        PricingPolicy::standard(),
        config.booking_horizon_days,
        config.high_demand_threshold,
    );

    let ledger = PointsLedger::new(db.clone());
    let scheduler = BookingScheduler::new(db.clone(), slots.clone(), config.clone());
    let cancellation = CancellationEngine::new(db.clone(), config.clone());
    let attendance = AttendanceTracker::new(db.clone(), config.clone());
    let allocator = LotteryAllocator::new(db.clone(), slots.clone(), config.clone());

    info!("🔧 Services initialized");

    // =========================================
    // STEP 5: Create Application State
    // =========================================
    let app_state = Arc::new(AppState {
        db: db.clone(),
        slots,
        ledger: ledger.clone(),
        scheduler,
        cancellation,
        attendance: attendance.clone(),
        config: config.clone(),
    });

    // =========================================
    // STEP 6: Start Background Sweeper
    // =========================================
    let sweeper = Sweeper::new(allocator, attendance, ledger, config.clone());
    tokio::spawn(async move {
        sweeper.start().await;
    });

    info!("🧹 Sweeper started");

    // =========================================
    // STEP 7: Start HTTP Server
    // =========================================
    let server_host = config.server_host.clone();
    let server_port = config.server_port;

    info!("🌐 Starting HTTP server on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        App::new()
            // Attach shared application state
            .app_data(web::Data::new(app_state.clone()))
            // Allow the resident-facing frontend in from any origin
            .wrap(Cors::permissive())
            // Add logging middleware
            .wrap(middleware::Logger::default())
            // Configure API routes
            .configure(api::configure_routes)
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
