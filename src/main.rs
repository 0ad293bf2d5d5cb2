//! # Servidor de reservas de locales
//!
//! ## Configuración
//!
//! El servidor se configura mediante variables de entorno (archivo `.env`):
//!
//! ```env
//! # API remota
//! API_BASE_URL=http://localhost:3000
//! HTTP_TIMEOUT_SECS=10
//!
//! # Servidor
//! BIND_ADDRESS=0.0.0.0:8080
//! SESSION_TTL_DAYS=30
//!
//! # Sesiones e intenciones: mongodb | memoria
//! STORAGE=mongodb
//! MONGODB_URI=mongodb://localhost:27017
//! MONGODB_DATABASE=reservas_locales
//!
//! # Logging
//! RUST_LOG=reservas_locales=debug,mongodb=info,actix_web=info
//! ```
//!
//! ## Ejecución
//!
//! ```bash
//! cp .env.example .env
//! cargo run
//! ```

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use reservas_locales::api::{self, AppState};
use reservas_locales::config::{Almacenamiento, Config};
use reservas_locales::db::{IntentLog, MemoryStore, MongoRepo, SessionStore};
use reservas_locales::servicios::ApiClient;
use reservas_locales::sesion::Sesiones;

const FILTRO_POR_DEFECTO: &str = "reservas_locales=debug,mongodb=info,actix_web=info";

fn io_error(contexto: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", contexto, error))
}

/// Inicia el servidor
///
/// 1. Carga variables de entorno desde `.env`
/// 2. Configura el logging con tracing
/// 3. Abre el almacén de sesiones e intenciones (MongoDB con índices, o memoria)
/// 4. Crea el cliente de la API remota
/// 5. Sirve las rutas de [`api::init_routes`] en `BIND_ADDRESS`
///
/// # Errores
///
/// Retorna `std::io::Error` si la configuración es inválida, no se puede
/// conectar a MongoDB o no se puede bindear la dirección.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(FILTRO_POR_DEFECTO)),
        )
        .init();

    let config = Config::from_env().map_err(|e| io_error("Configuración inválida", e))?;

    tracing::info!(
        api = %config.api_base_url,
        almacenamiento = ?config.almacenamiento,
        "Iniciando servidor de reservas"
    );

    let (sesiones_store, intenciones): (Arc<dyn SessionStore>, Arc<dyn IntentLog>) =
        match config.almacenamiento {
            Almacenamiento::MongoDb => {
                let repo = MongoRepo::init(&config.mongodb_uri, &config.mongodb_database)
                    .await
                    .map_err(|e| {
                        tracing::error!("Error conectando a MongoDB: {}", e);
                        io_error("Error de MongoDB", e)
                    })?;

                // No es un error fatal, continuamos sin índices
                if let Err(e) = repo.create_indexes().await {
                    tracing::warn!("Advertencia creando índices: {}", e);
                }

                let repo = Arc::new(repo);
                let sesiones: Arc<dyn SessionStore> = repo.clone();
                let intenciones: Arc<dyn IntentLog> = repo;
                (sesiones, intenciones)
            }
            Almacenamiento::Memoria => {
                tracing::warn!("Sesiones e intenciones en memoria: se pierden al reiniciar");
                let store = Arc::new(MemoryStore::new());
                let sesiones: Arc<dyn SessionStore> = store.clone();
                let intenciones: Arc<dyn IntentLog> = store;
                (sesiones, intenciones)
            }
        };

    let api_client = ApiClient::new(&config.api_base_url, config.http_timeout)
        .map_err(|e| io_error("Error creando el cliente HTTP", e))?;
    let sesiones = Sesiones::new(sesiones_store, config.session_ttl_dias);
    let state = web::Data::new(AppState::new(api_client, sesiones, intenciones));

    let bind_address = config.bind_address.clone();
    tracing::info!("Servidor iniciando en {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(api::init_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
