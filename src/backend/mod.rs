//! Conversion service client helpers.

/// `POST /convert` and its error mapping.
pub mod convert;
/// `GET /api/health` probe.
pub mod health;
/// Download URL construction.
pub mod links;
