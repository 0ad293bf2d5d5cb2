//! # Manejo de errores de la capa HTTP
//!
//! [`AppError`] reúne los fallos propios del servidor (sesión, validación de
//! formularios, almacenamiento) y los de la API remota ([`ServiceError`]),
//! y los traduce a una respuesta JSON con el código HTTP adecuado.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::error::Error;
use thiserror::Error;

use crate::flujo::FlujoError;
use crate::servicios::{ErrorKind, ServiceError};

#[derive(Error, Debug)]
pub enum AppError {
    /// Error de base de datos con contexto de operación
    #[error("Error de base de datos en operación '{operation}': {source}")]
    Database {
        operation: String,
        #[source]
        source: mongodb::error::Error,
    },

    /// Fallo de la API remota, con su clase
    #[error(transparent)]
    Remote(#[from] ServiceError),

    /// Operación de varios pasos interrumpida
    #[error(transparent)]
    Flujo(#[from] FlujoError),

    /// Error de validación con campo específico
    #[error("Error de validación en campo '{field}': {message}")]
    ValidationWithField { field: String, message: String },

    #[error("Error de validación: {0}")]
    Validation(String),

    #[error("No autorizado: {0}")]
    Unauthorized(String),

    /// Sesión válida pero con un rol sin acceso
    #[error("Prohibido: {0}")]
    Forbidden(String),

    #[error("No encontrado: {resource_type} con ID '{id}'")]
    NotFoundWithId { resource_type: String, id: String },

    #[error("No encontrado: {0}")]
    NotFound(String),

    #[error("Conflicto: {0}")]
    Conflict(String),

    #[error("Error interno: {0}")]
    Internal(String),
}

impl AppError {
    pub fn database(operation: &str, source: mongodb::error::Error) -> Self {
        Self::Database {
            operation: operation.to_string(),
            source,
        }
    }

    pub fn validation_field(field: &str, message: &str) -> Self {
        Self::ValidationWithField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn not_found_id(resource_type: &str, id: impl ToString) -> Self {
        Self::NotFoundWithId {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }
}

/// Código HTTP que se devuelve al navegador por un fallo remoto
fn remote_status(error: &ServiceError) -> StatusCode {
    match error.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => match error.status() {
            Some(403) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        },
        ErrorKind::Server | ErrorKind::Network | ErrorKind::Malformed => StatusCode::BAD_GATEWAY,
    }
}

fn remote_body(error_label: &str, error: &ServiceError) -> ErrorResponse {
    ErrorResponse {
        error: error_label.to_string(),
        message: error.to_string(),
        kind: Some(error.kind()),
        campos: Some(error.campos().to_vec()).filter(|c| !c.is_empty()),
        trace_id: None,
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Remote(error) => remote_status(error),
            Self::Flujo(error) => remote_status(&error.source),
            Self::ValidationWithField { .. } | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFoundWithId { .. } | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Log detallado del error antes de responder
        let body = match self {
            Self::Database { operation, source } => {
                let trace_id = uuid::Uuid::new_v4().to_string();
                tracing::error!(
                    trace_id = %trace_id,
                    operation = %operation,
                    error = %source,
                    error_chain = ?source.source(),
                    "Database error occurred"
                );
                ErrorResponse::interno("Error de base de datos", trace_id)
            }
            Self::Remote(error) => {
                tracing::warn!(kind = ?error.kind(), status = ?error.status(), error = %error, "Remote API error");
                remote_body("Error de la API remota", error)
            }
            Self::Flujo(error) => {
                tracing::error!(
                    intencion = %error.intencion,
                    paso = ?error.paso,
                    compensada = error.compensada,
                    error = %error.source,
                    "Multi-step operation interrupted"
                );
                remote_body("Operación incompleta", &error.source).with_message(error.to_string())
            }
            Self::ValidationWithField { field, message } => {
                tracing::warn!(field = %field, message = %message, "Validation error");
                ErrorResponse {
                    campos: Some(vec![field.clone()]),
                    ..ErrorResponse::new("Error de validación", &format!("Campo '{}': {}", field, message))
                }
            }
            Self::Validation(message) => {
                tracing::warn!(message = %message, "Validation error");
                ErrorResponse::new("Error de validación", message)
            }
            Self::Unauthorized(reason) => {
                tracing::warn!(reason = %reason, "Unauthorized access attempt");
                ErrorResponse::new("No autorizado", reason)
            }
            Self::Forbidden(reason) => {
                tracing::warn!(reason = %reason, "Forbidden access attempt");
                ErrorResponse::new("Prohibido", reason)
            }
            Self::NotFoundWithId { resource_type, id } => {
                tracing::info!(resource_type = %resource_type, id = %id, "Resource not found");
                ErrorResponse::new(
                    "No encontrado",
                    &format!("{} con ID '{}' no encontrado", resource_type, id),
                )
            }
            Self::NotFound(message) => {
                tracing::info!(message = %message, "Resource not found");
                ErrorResponse::new("No encontrado", message)
            }
            Self::Conflict(message) => {
                tracing::warn!(message = %message, "Conflict");
                ErrorResponse::new("Conflicto", message)
            }
            Self::Internal(message) => {
                let trace_id = uuid::Uuid::new_v4().to_string();
                tracing::error!(trace_id = %trace_id, message = %message, "Internal error with trace");
                ErrorResponse::interno("Error interno", trace_id)
            }
        };

        HttpResponse::build(status).json(body)
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campos: Option<Vec<String>>,
    /// Código con el que buscar el fallo interno en los logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            kind: None,
            campos: None,
            trace_id: None,
        }
    }

    /// Respuesta de un fallo interno: sólo el código de rastreo, sin detalles
    fn interno(error: &str, trace_id: String) -> Self {
        Self {
            message: format!("Error interno del servidor (trace: {})", trace_id),
            trace_id: Some(trace_id),
            ..Self::new(error, "")
        }
    }

    fn with_message(self, message: String) -> Self {
        Self { message, ..self }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallo_remoto_de_red_es_bad_gateway() {
        let error = AppError::from(ServiceError::from_response("locales", 503, b""));
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn no_encontrado_remoto_es_404() {
        let error = AppError::from(ServiceError::from_response("recursos", 404, b""));
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn prohibido_remoto_conserva_403() {
        let error = AppError::from(ServiceError::from_response("usuarios", 403, b""));
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn fallo_interno_devuelve_trace_id() {
        let response = AppError::Internal("índice roto".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let trace_id = body["trace_id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(trace_id).is_ok());
        assert!(body["message"].as_str().unwrap().contains(trace_id));
        assert!(!body["message"].as_str().unwrap().contains("índice"));
    }

    #[test]
    fn validacion_con_campo_lo_expone() {
        let response = AppError::validation_field("nombre", "requerido").error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
