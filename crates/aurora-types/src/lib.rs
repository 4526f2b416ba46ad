pub mod api;
pub mod checkin;
pub mod filter;
pub mod models;
