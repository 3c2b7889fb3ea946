use crate::config::AppConfig;
use crate::db::{init_db, Database};
use crate::router::{handle, App};
use crate::sms::SmsClient;
use astra::Server;
use std::net::SocketAddr;

mod classify;
mod config;
mod db;
mod domain;
mod errors;
mod events;
mod ids;
mod leads;
mod notifier;
mod responses;
mod router;
mod sms;

#[cfg(test)]
mod tests;

fn main() {
    // 1️⃣ Create the database handle
    let db = Database::new("crm.sqlite3");

    // 2️⃣ Initialize database from schema.sql
    if let Err(e) = init_db(&db, "sql/schema.sql") {
        eprintln!("❌ Database initialization failed: {e}");
        std::process::exit(1);
    }

    // 3️⃣ Read env config; missing SMS/classifier keys are fine, the
    // affected calls fall back instead of failing requests.
    let config = AppConfig::from_env();
    if config.sms.is_none() {
        eprintln!("⚠️  SMS transport not configured; follow-up texts will be marked failed");
    }
    if config.classify.is_none() {
        eprintln!("⚠️  Classifier not configured; messages get the neutral fallback");
    }

    // 4️⃣ Start the follow-up notifier on its own thread
    {
        let worker_db = db.clone();
        let worker_sms = config.sms.as_ref().map(SmsClient::new);
        std::thread::spawn(move || notifier::run(worker_db, worker_sms));
    }

    // 5️⃣ Start the server
    let addr: SocketAddr = "127.0.0.1:3000".parse().unwrap();
    println!("Starting server at http://{addr}");

    let server = Server::bind(&addr).max_workers(8);

    let app = App::new(db, &config);
    let result = server.serve(move |req, _info| match handle(req, &app) {
        Ok(resp) => resp,
        Err(err) => responses::error_to_response(err),
    });

    if let Err(e) = result {
        eprintln!("Server ended with error: {e}");
    }

    println!("Server shut down cleanly.");
}
