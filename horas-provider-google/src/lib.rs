//! Google Calendar provider for horas.
//!
//! Implements the core provider contracts over the Calendar v3 REST API:
//! calendar metadata (time zone) and paged event listing with full
//! resumption-token support, including the 410 "token expired" signal the
//! ingestion engine recovers from.

pub mod client;
pub mod config;
pub mod types;

pub use client::{GoogleCalendarClient, GoogleClientProvider};
