//! Configuración desde variables de entorno (cargadas de `.env` con dotenvy)

use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Valor inválido para {clave}: '{valor}' ({motivo})")]
    Invalida {
        clave: &'static str,
        valor: String,
        motivo: String,
    },
}

/// Dónde se guardan las sesiones y el registro de intenciones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Almacenamiento {
    MongoDb,
    Memoria,
}

impl FromStr for Almacenamiento {
    type Err = String;

    fn from_str(valor: &str) -> Result<Self, Self::Err> {
        match valor.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Almacenamiento::MongoDb),
            "memoria" | "memory" => Ok(Almacenamiento::Memoria),
            otro => Err(format!("se esperaba 'mongodb' o 'memoria', no '{}'", otro)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub bind_address: String,
    pub http_timeout: Duration,
    pub session_ttl_dias: i64,
    pub almacenamiento: Almacenamiento,
    pub mongodb_uri: String,
    pub mongodb_database: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::desde(|clave| env::var(clave).ok())
    }

    /// Construye la configuración leyendo cada clave con `leer`
    pub fn desde(leer: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let texto = |clave: &str, defecto: &str| leer(clave).unwrap_or_else(|| defecto.to_string());

        Ok(Self {
            api_base_url: texto("API_BASE_URL", "http://localhost:3000"),
            bind_address: texto("BIND_ADDRESS", "0.0.0.0:8080"),
            http_timeout: Duration::from_secs(parsear(&leer, "HTTP_TIMEOUT_SECS", "10")?),
            session_ttl_dias: parsear(&leer, "SESSION_TTL_DAYS", "30")?,
            almacenamiento: parsear(&leer, "STORAGE", "mongodb")?,
            mongodb_uri: texto("MONGODB_URI", "mongodb://localhost:27017"),
            mongodb_database: texto("MONGODB_DATABASE", "reservas_locales"),
        })
    }
}

fn parsear<T: FromStr>(
    leer: &impl Fn(&str) -> Option<String>,
    clave: &'static str,
    defecto: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let valor = leer(clave).unwrap_or_else(|| {
        tracing::debug!("{clave} no definida, usando {defecto}");
        defecto.to_string()
    });

    let resultado = valor.trim().parse::<T>();
    resultado.map_err(|e| ConfigError::Invalida {
        clave,
        motivo: e.to_string(),
        valor,
    })
}
