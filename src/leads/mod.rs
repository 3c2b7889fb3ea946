pub mod ingest;
pub mod messages;
