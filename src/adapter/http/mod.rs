mod error;
mod handlers;
mod router;
mod state;

pub use error::ApiError;
pub use router::{build_router, serve};
pub use state::AppState;
