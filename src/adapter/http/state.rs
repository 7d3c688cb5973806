use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::BookingService;

pub struct AppState {
    pub booking: Arc<dyn BookingService>,
    /// Held for the whole booking; the site session is not safe to share.
    pub booking_lock: Mutex<()>,
}

impl AppState {
    pub fn new(booking: Arc<dyn BookingService>) -> Self {
        Self {
            booking,
            booking_lock: Mutex::new(()),
        }
    }
}
