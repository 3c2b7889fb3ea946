pub mod prep;
pub mod schedule;
