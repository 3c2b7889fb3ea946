pub mod connection;
pub mod events;
pub mod jobs;
pub mod leads;
pub mod users;

pub use connection::{init_db, Database};
