mod credentials;
mod date;
mod location;
mod page;

pub use credentials::Credentials;
pub use date::{TargetDate, MAX_DAYS_AHEAD};
pub use location::LocationId;
pub use page::PageState;
