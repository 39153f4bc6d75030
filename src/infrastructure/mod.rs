//! Adapters for the booking ports: the HTTP backend, Razorpay, and in-memory
//! stand-ins for offline use and tests.

pub mod http;
pub mod in_memory;
pub mod razorpay;
