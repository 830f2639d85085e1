#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod captcha;
pub mod config;
pub mod error;
pub mod face;
pub mod ledger;
pub mod logging;
pub mod model;

pub use config::Config;

use config::{ConfigFairing, DatabaseFairing, FaceFairing};
use logging::LoggerFairing;

/// Assemble the server. Configuration, the database connection and the face
/// backend are all set up by fairings at ignite time.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(FaceFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// Connect to the database server named by `db_uri`.
#[cfg(test)]
async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .expect("Could not connect to database")
}

/// A fresh database name, so that tests running in parallel never share data.
#[cfg(test)]
fn database() -> String {
    format!("test{}", rand::random::<u64>())
}

/// A server over the given test database, with the stub face encoder.
#[cfg(test)]
async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db).await.unwrap();

    rocket::build()
        .attach(ConfigFairing)
        .manage(client)
        .manage(db)
        .manage(face::FaceVerifier::new(face::stub::StubEncoder))
        .mount("/", api::routes())
        .register("/", api::catchers())
}
