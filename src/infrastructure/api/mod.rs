mod client;
pub mod model;

pub use client::WorkplaceClient;
pub use model::{BookingRequest, BookingResponse, Workspace};
