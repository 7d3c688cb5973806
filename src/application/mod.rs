pub mod booking;
pub mod calendar;
pub mod classifier;
pub mod location;
pub mod login;
pub mod race;
pub mod retry;
pub mod service;
pub mod site;

#[cfg(test)]
pub(crate) mod testing;

pub use booking::{system_clock, BookingFlow, BookingOrder, BookingStage, Clock};
pub use service::{BookingService, BrowserBookingService};
