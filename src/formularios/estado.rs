use serde::Deserialize;

use crate::modelos::EstadoReserva;

/// Cambio de estado de una reserva desde "mis reservas"
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CambioEstado {
    pub estado: EstadoReserva,
}

impl CambioEstado {
    pub fn es_cancelacion(&self) -> bool {
        self.estado == EstadoReserva::Cancelada
    }
}
