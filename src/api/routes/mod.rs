//! API Routes
//!
//! Route handlers organized by functionality.

pub mod availability;
pub mod health;
