#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the sinkhole map application.
//!
//! Forwards map requests to the prediction backend, records on-demand
//! predictions in a file-backed self-survey cache, and builds the risk
//! circle layer (GeoJSON polygons colored by risk tier) that the map
//! frontend draws. The built frontend is served from `app/dist`.

pub mod config;
mod handlers;
pub mod interactive;

use std::sync::{Mutex, MutexGuard};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use sinkhole_map_backend::BackendClient;
use sinkhole_map_risk::Breakpoints;
use sinkhole_map_survey::{EphemeralPointCache, FileStorage, Storage};

pub use config::ServerConfig;

/// Survey cache over a boxed storage backend.
pub type SurveyCache = EphemeralPointCache<Box<dyn Storage + Send>>;

/// Shared application state.
pub struct AppState {
    /// Client for the prediction backend.
    pub backend: BackendClient,
    /// Tier thresholds used for classification and layer filtering.
    pub breakpoints: Breakpoints,
    /// Self-survey cache. Each handler holds the lock for one complete
    /// read-modify-write.
    survey: Mutex<SurveyCache>,
}

impl AppState {
    /// Creates the state and initializes the survey collection if needed.
    ///
    /// # Errors
    ///
    /// Returns [`sinkhole_map_survey::StorageError`] if the survey store
    /// cannot be initialized.
    pub fn new(
        backend: BackendClient,
        breakpoints: Breakpoints,
        storage: Box<dyn Storage + Send>,
    ) -> Result<Self, sinkhole_map_survey::StorageError> {
        let mut survey = EphemeralPointCache::new(storage);
        survey.initialize_if_absent()?;
        Ok(Self {
            backend,
            breakpoints,
            survey: Mutex::new(survey),
        })
    }

    /// Locks the survey cache.
    ///
    /// # Panics
    ///
    /// Panics if the `Mutex` is poisoned.
    pub fn survey(&self) -> MutexGuard<'_, SurveyCache> {
        self.survey.lock().expect("Survey cache mutex poisoned")
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/predicted-point", web::post().to(handlers::predicted_point))
            .route("/predict", web::get().to(handlers::predict))
            .route("/point-features", web::post().to(handlers::point_features))
            .route("/get-feature", web::get().to(handlers::get_feature))
            .route(
                "/latest-features-geojson",
                web::get().to(handlers::latest_features_geojson),
            )
            .route(
                "/predict-random-point",
                web::post().to(handlers::predict_random_point),
            )
            .route("/survey-points", web::get().to(handlers::survey_points))
            .route(
                "/survey-points",
                web::delete().to(handlers::delete_survey_points),
            )
            .route("/risk-circles", web::get().to(handlers::risk_circles)),
    );
}

/// Starts the sinkhole map API server.
///
/// Opens the survey store named by `config` and starts the Actix-Web HTTP
/// server. The caller initializes logging and provides the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the survey store cannot be
/// initialized, or the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Prediction backend: {}", config.backend_url);
    log::info!("Opening survey store at {}...", config.survey_store_dir);
    let state = AppState::new(
        BackendClient::new(config.backend_url.clone()),
        Breakpoints::default(),
        Box::new(FileStorage::new(&config.survey_store_dir)),
    )
    .map_err(std::io::Error::other)?;
    let state = web::Data::new(state);

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
