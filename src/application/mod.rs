//! Application layer: the booking flow that sequences pricing, payment and
//! saving, and the landing page carousel.
//!
//! `BookingSession` is the entry point for booking a grooming visit. It owns
//! the injected backend and gateway ports and awaits each remote call in turn.

pub mod booking;
pub mod carousel;
