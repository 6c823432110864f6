pub mod configuration;
pub mod event;
pub mod user;

pub use configuration::{Configuration, ConfigurationUpdate, SearchFilterConfig};
pub use event::{Event, EventInput, EventRow, OrganizerRef};
pub use user::User;
