//! API Routes
//!
//! Route handlers organized by functionality.

pub mod health;
pub mod objectives;
pub mod progress;
pub mod session;
