pub mod event;
pub mod lead;
