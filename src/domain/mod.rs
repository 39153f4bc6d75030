//! Domain types for booking a grooming visit: money, pricing rules, visit
//! and payment records, and the ports the booking flow talks through.

pub mod money;
pub mod payment;
pub mod ports;
pub mod pricing;
pub mod visit;
