use log::{error, info};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::face::FaceVerifier;
use crate::model::mongodb::ensure_indexes_exist;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // secrets
    jwt_secret: String,
}

impl Config {
    /// Secret key used to sign the CAPTCHA cookie.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}


/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
}

/// A fairing that loads the MongoDB config, connects to the database,
/// creates the unique indexes, and places both a `Client` and a `Database`
/// into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(DATABASE);

        // Uniqueness of voters and ballots is enforced by the storage layer.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to create database indexes: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

/// Name of the production database.
pub const DATABASE: &str = "smartvoting";

/// Configuration for the face recognition backend.
#[derive(Deserialize)]
struct FaceConfig {
    #[cfg(not(feature = "dlib"))]
    face_service_url: String,
    #[cfg(feature = "dlib")]
    face_landmark_model: String,
    #[cfg(feature = "dlib")]
    face_encoder_model: String,
}

/// A fairing that sets up the face encoder and places a [`FaceVerifier`]
/// into managed state.
pub struct FaceFairing;

#[rocket::async_trait]
impl Fairing for FaceFairing {
    fn info(&self) -> Info {
        Info {
            name: "Face recognition",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<FaceConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load face recognition config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        #[cfg(not(feature = "dlib"))]
        let verifier = {
            info!("Using remote face service at {}", config.face_service_url);
            FaceVerifier::new(crate::face::RemoteEncoder::new(config.face_service_url))
        };

        #[cfg(feature = "dlib")]
        let verifier = match crate::face::DlibEncoder::open(
            &config.face_landmark_model,
            &config.face_encoder_model,
        ) {
            Ok(encoder) => {
                info!("Loaded dlib face models");
                FaceVerifier::new(encoder)
            }
            Err(e) => {
                error!("Failed to load dlib face models: {e}");
                return Err(rocket);
            }
        };

        rocket = rocket.manage(verifier);
        Ok(rocket)
    }
}
