use serde::Deserialize;

use super::{positivo, validate_date, validate_time};
use crate::api::{AppError, AppResult};
use crate::modelos::{EstadoReserva, NuevaReserva, Reserva};

/// Alta y edición de reservas desde la gestión de reservas
///
/// `num_personas` se recorta a la capacidad del recurso elegido en
/// [`crate::vista::LogicaReserva::ajustar_personas`].
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
pub struct FormularioReserva {
    #[serde(default)]
    pub usuario_id: i64,
    #[serde(default)]
    pub local_id: i64,
    #[serde(default)]
    pub recurso_id: i64,
    #[serde(default)]
    pub fecha: String,
    #[serde(default)]
    pub hora: String,
    #[serde(default = "personas_por_defecto")]
    pub num_personas: i32,
    #[serde(default = "estado_por_defecto")]
    pub estado: EstadoReserva,
}

fn personas_por_defecto() -> i32 {
    1
}

fn estado_por_defecto() -> EstadoReserva {
    EstadoReserva::Confirmada
}

impl Default for FormularioReserva {
    fn default() -> Self {
        Self {
            usuario_id: 0,
            local_id: 0,
            recurso_id: 0,
            fecha: String::new(),
            hora: String::new(),
            num_personas: personas_por_defecto(),
            estado: estado_por_defecto(),
        }
    }
}

impl From<&Reserva> for FormularioReserva {
    fn from(reserva: &Reserva) -> Self {
        Self {
            usuario_id: reserva.usuario_id,
            local_id: reserva.local_id,
            recurso_id: reserva.recurso_id,
            fecha: reserva.fecha.clone(),
            hora: reserva.hora.clone(),
            num_personas: reserva.num_personas,
            estado: reserva.estado,
        }
    }
}

impl FormularioReserva {
    pub fn a_reserva(&self) -> AppResult<NuevaReserva> {
        let fecha = validate_date("fecha", &self.fecha)?;
        validate_time("hora", &self.hora)?;

        if self.num_personas <= 0 {
            return Err(AppError::validation_field("num_personas", "debe ser mayor a 0"));
        }

        Ok(NuevaReserva {
            usuario_id: positivo("usuario_id", self.usuario_id)?,
            local_id: positivo("local_id", self.local_id)?,
            recurso_id: positivo("recurso_id", self.recurso_id)?,
            fecha: fecha.format("%Y-%m-%d").to_string(),
            hora: self.hora.trim().to_string(),
            num_personas: self.num_personas,
            estado: self.estado,
        })
    }
}
