//! # Errores de la API remota
//!
//! Toda llamada a la API remota devuelve un [`ServiceError`] etiquetado, de
//! modo que el llamador distingue "no encontrado" de "validación" o de "red
//! caída" y reacciona según el caso.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Clase de fallo, en la forma en que se expone al navegador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Unauthorized,
    Server,
    Network,
    Malformed,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{recurso} no encontrado: {message}")]
    NotFound { recurso: &'static str, message: String },

    #[error("Validación rechazada por el servidor ({status}): {message}")]
    Validation {
        status: u16,
        campos: Vec<String>,
        message: String,
    },

    #[error("Acceso denegado por el servidor ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Error del servidor ({status}) en {recurso}: {message}")]
    Server {
        recurso: &'static str,
        status: u16,
        message: String,
    },

    #[error("Error de red en {recurso}: {source}")]
    Network {
        recurso: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Respuesta malformada en {recurso}: {source}")]
    Malformed {
        recurso: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Server { .. } => ErrorKind::Server,
            Self::Network { .. } => ErrorKind::Network,
            Self::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    /// Código HTTP devuelto por el servidor remoto, si hubo respuesta
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Validation { status, .. }
            | Self::Unauthorized { status, .. }
            | Self::Server { status, .. } => Some(*status),
            Self::Network { .. } | Self::Malformed { .. } => None,
        }
    }

    /// Campos señalados por el servidor en un error de validación
    pub fn campos(&self) -> &[String] {
        match self {
            Self::Validation { campos, .. } => campos,
            _ => &[],
        }
    }

    /// Clasifica una respuesta no-2xx a partir de su código y su cuerpo
    pub fn from_response(recurso: &'static str, status: u16, body: &[u8]) -> Self {
        let json: Option<Value> = serde_json::from_slice(body).ok();
        let message = json
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| truncate(&String::from_utf8_lossy(body)));

        match status {
            404 => Self::NotFound { recurso, message },
            400 | 422 => Self::Validation {
                status,
                campos: json.as_ref().map(extract_campos).unwrap_or_default(),
                message,
            },
            401 | 403 => Self::Unauthorized { status, message },
            _ => Self::Server {
                recurso,
                status,
                message,
            },
        }
    }
}

fn extract_message(json: &Value) -> Option<String> {
    ["message", "mensaje", "error"]
        .iter()
        .find_map(|clave| json.get(*clave).and_then(Value::as_str))
        .map(str::to_string)
}

/// Acepta `{"campos": ["a"]}`, `{"errors": {"a": ..}}` y
/// `{"errors": [{"field": "a"}]}`
fn extract_campos(json: &Value) -> Vec<String> {
    if let Some(campos) = json.get("campos").and_then(Value::as_array) {
        return campos
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    match json.get("errors") {
        Some(Value::Object(mapa)) => mapa.keys().cloned().collect(),
        Some(Value::Array(lista)) => lista
            .iter()
            .filter_map(|e| e.get("field").or_else(|| e.get("campo")))
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn truncate(texto: &str) -> String {
    const MAX: usize = 200;
    let texto = texto.trim();
    if texto.chars().count() <= MAX {
        texto.to_string()
    } else {
        texto.chars().take(MAX).collect::<String>() + "…"
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clasifica_por_codigo() {
        assert_eq!(ServiceError::from_response("locales", 404, b"").kind(), ErrorKind::NotFound);
        assert_eq!(ServiceError::from_response("locales", 422, b"{}").kind(), ErrorKind::Validation);
        assert_eq!(ServiceError::from_response("locales", 403, b"").kind(), ErrorKind::Unauthorized);

        let err = ServiceError::from_response("locales", 503, b"caido");
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn extrae_campos_de_validacion() {
        let err = ServiceError::from_response(
            "usuarios",
            400,
            br#"{"message": "datos invalidos", "errors": {"correo": "duplicado"}}"#,
        );

        assert_eq!(err.campos(), ["correo".to_string()]);
        assert!(err.to_string().contains("datos invalidos"));
    }

    #[test]
    fn extrae_campos_de_lista() {
        let err = ServiceError::from_response(
            "usuarios",
            400,
            br#"{"errors": [{"field": "nombre"}, {"campo": "correo"}]}"#,
        );
        assert_eq!(err.campos(), ["nombre".to_string(), "correo".to_string()]);
    }

    #[test]
    fn cuerpo_no_json_se_usa_como_mensaje() {
        let err = ServiceError::from_response("reservas", 500, b"  boom  ");
        match err {
            ServiceError::Server { message, .. } => assert_eq!(message, "boom"),
            otro => panic!("inesperado: {otro:?}"),
        }
    }
}
