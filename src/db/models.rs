use serde::{Deserialize, Serialize};

use crate::modelos::{Disponibilidad, Recurso, Reserva, Usuario};

/// Sesión emitida por este servidor tras un login correcto
///
/// El token es la clave primaria del documento. El usuario se guarda sin
/// contraseña.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sesion {
    #[serde(rename = "_id")]
    pub token: String,
    pub usuario: Usuario,
    pub creada_en: i64,  // timestamp unix
    pub expira_en: i64,  // timestamp unix
}

impl Sesion {
    pub fn expirada(&self, ahora: i64) -> bool {
        ahora >= self.expira_en
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operacion {
    Reservar,
    /// Cambio de estado a "cancelada"
    Cancelar,
    /// Borrado de la reserva
    Eliminar,
}

/// Último paso completado de una intención
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Paso {
    Iniciada,
    ReservaCreada,
    RecursoReservado,
    ReservaCancelada,
    DisponibilidadLiberada,
    Completada,
    Compensada,
    CompensacionPendiente,
    Fallida,
}

impl Paso {
    pub const TERMINALES: [Paso; 3] = [Paso::Completada, Paso::Compensada, Paso::Fallida];

    pub fn es_terminal(&self) -> bool {
        Self::TERMINALES.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Paso::Iniciada => "iniciada",
            Paso::ReservaCreada => "reserva_creada",
            Paso::RecursoReservado => "recurso_reservado",
            Paso::ReservaCancelada => "reserva_cancelada",
            Paso::DisponibilidadLiberada => "disponibilidad_liberada",
            Paso::Completada => "completada",
            Paso::Compensada => "compensada",
            Paso::CompensacionPendiente => "compensacion_pendiente",
            Paso::Fallida => "fallida",
        }
    }
}

/// Entrada del registro de intenciones de una operación de varios pasos
/// (reservar, cancelar o eliminar)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntencionReserva {
    #[serde(rename = "_id")]
    pub id: String,
    pub operacion: Operacion,
    pub paso: Paso,
    pub usuario_id: i64,
    pub local_id: i64,
    pub recurso_id: i64,
    /// Reserva creada (reservar) o afectada (cancelar/eliminar)
    pub reserva: Option<Reserva>,
    /// Recurso tal como estaba antes de modificarlo
    pub recurso: Option<Recurso>,
    /// Franja consumida o liberada
    pub disponibilidad: Option<Disponibilidad>,
    /// La franja pudo quedar ocupada y deshacer la reserva debe liberarla
    #[serde(default)]
    pub franja_ocupada: bool,
    pub error: Option<String>,
    /// Se incrementa en cada escritura; quien escribe con la versión leída
    /// es quien lleva la intención
    #[serde(default)]
    pub version: i64,
    pub creada_en: i64,       // timestamp unix
    pub actualizada_en: i64,  // timestamp unix
}

impl IntencionReserva {
    pub fn nueva(operacion: Operacion, usuario_id: i64, local_id: i64, recurso_id: i64) -> Self {
        let ahora = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            operacion,
            paso: Paso::Iniciada,
            usuario_id,
            local_id,
            recurso_id,
            reserva: None,
            recurso: None,
            disponibilidad: None,
            franja_ocupada: false,
            error: None,
            version: 0,
            creada_en: ahora,
            actualizada_en: ahora,
        }
    }

    /// Avanza al paso indicado y limpia el error anterior
    pub fn avanzar(&mut self, paso: Paso) {
        self.paso = paso;
        self.error = None;
        self.actualizada_en = chrono::Utc::now().timestamp();
    }

    pub fn fallar(&mut self, paso: Paso, error: impl ToString) {
        self.paso = paso;
        self.error = Some(error.to_string());
        self.actualizada_en = chrono::Utc::now().timestamp();
    }
}
