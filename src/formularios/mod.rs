//! # Formularios
//!
//! Cada formulario recoge la entrada de una pantalla, comprueba su forma
//! (campos requeridos, formatos de fecha y hora, rangos) y la convierte en el
//! cuerpo que se reenvía a la API remota. Las reglas de negocio son del
//! servidor remoto.
//!
//! - [`usuario`] - alta/edición de usuarios y registro público
//! - [`local`] - alta/edición de locales, con tipo libre
//! - [`recurso`] - alta/edición de recursos, con alta múltiple
//! - [`disponibilidad`] - franjas para uno o varios recursos
//! - [`reserva`] - alta/edición de reservas
//! - [`confirmacion`] - confirmación de borrados
//! - [`estado`] - cambio de estado de una reserva
//! - [`selector`] - selector con búsqueda, genérico sobre cualquier registro

pub mod confirmacion;
pub mod disponibilidad;
pub mod estado;
pub mod local;
pub mod recurso;
pub mod reserva;
pub mod selector;
pub mod usuario;

pub use confirmacion::Confirmacion;
pub use disponibilidad::FormularioDisponibilidad;
pub use estado::CambioEstado;
pub use local::FormularioLocal;
pub use recurso::FormularioRecurso;
pub use reserva::FormularioReserva;
pub use selector::{Opcion, SelectorBuscable};
pub use usuario::{FormularioRegistro, FormularioUsuario};

use chrono::{NaiveDate, NaiveTime};

use crate::api::{AppError, AppResult};
use crate::modelos::solo_fecha;

/// Devuelve el valor recortado o un error de validación si queda vacío
pub(crate) fn requerido(campo: &str, valor: &str) -> AppResult<String> {
    let valor = valor.trim();
    if valor.is_empty() {
        return Err(AppError::validation_field(campo, "es requerido"));
    }
    Ok(valor.to_string())
}

/// Validación básica de email: contiene '@' y un '.' tras él
pub(crate) fn validate_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((usuario, dominio)) => !usuario.is_empty() && dominio.contains('.'),
        None => false,
    }
}

/// Valida una fecha `YYYY-MM-DD`; acepta una marca ISO y se queda con la fecha
pub(crate) fn validate_date(campo: &str, valor: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(solo_fecha(valor.trim()), "%Y-%m-%d")
        .map_err(|_| AppError::validation_field(campo, "formato de fecha inválido, use YYYY-MM-DD"))
}

/// Valida una hora `HH:MM` o `HH:MM:SS`
pub(crate) fn validate_time(campo: &str, valor: &str) -> AppResult<NaiveTime> {
    let valor = valor.trim();
    NaiveTime::parse_from_str(valor, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(valor, "%H:%M:%S"))
        .map_err(|_| AppError::validation_field(campo, "formato de hora inválido, use HH:MM"))
}

pub(crate) fn positivo(campo: &str, valor: i64) -> AppResult<i64> {
    if valor <= 0 {
        return Err(AppError::validation_field(campo, "debe seleccionarse"));
    }
    Ok(valor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requerido_recorta() {
        assert_eq!(requerido("nombre", "  Ana ").unwrap(), "Ana");
        assert!(requerido("nombre", "   ").is_err());
    }

    #[test]
    fn email_basico() {
        assert!(validate_email("ana@correo.com"));
        assert!(!validate_email("ana.correo.com"));
        assert!(!validate_email("@correo.com"));
        assert!(!validate_email("ana@correo"));
    }

    #[test]
    fn fecha_acepta_marca_iso() {
        let fecha = validate_date("fecha", "2024-12-25T00:00:00.000Z").unwrap();
        assert_eq!(fecha.to_string(), "2024-12-25");
        assert!(validate_date("fecha", "25/12/2024").is_err());
    }

    #[test]
    fn hora_con_y_sin_segundos() {
        assert!(validate_time("hora", "20:00").is_ok());
        assert!(validate_time("hora", "20:00:30").is_ok());
        assert!(validate_time("hora", "8pm").is_err());
    }
}
