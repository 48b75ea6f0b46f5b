//! # API Models
//!
//! Request and response bodies for the REST surface, kept separate from
//! the database rows in `db::models` so wire formatting never leaks into
//! queries.
//!
//! ## DTO Families
//!
//! | Family | Examples |
//! |--------|----------|
//! | Booking flow | `BookingRequest`, `LotteryBidRequest`, `BookingResponse`, `CancellationResponse` |
//! | Points economy | `AdjustPointsRequest`, `BalanceResponse`, `HistoryResponse` |
//! | Catalog reads | `FacilityResponse`, `SlotListResponse` |
//! | Envelope | `ApiResponse<T>`, `ApiError`, `HealthResponse` |
//!
//! Incoming bodies live in `requests.rs`, outgoing ones in `responses.rs`.
//! Response types convert from their `db::models` records via `From`
//! impls, which is also where display touches like point formatting
//! happen.
//!
//! ## Serialization
//!
//! Everything is Serde with `rename_all = "camelCase"` so the JSON reads
//! naturally from JavaScript clients.

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
