//! Cliente de `/servicio/reservas`

use reqwest::Method;

use super::{ApiClient, ServiceResult};
use crate::modelos::{NuevaReserva, Reserva, ReservaCambios};

const RECURSO: &str = "reservas";
const PATH: &str = "/servicio/reservas";

#[derive(Debug, Clone, Copy)]
pub struct ReservasService<'a> {
    api: &'a ApiClient,
}

impl<'a> ReservasService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn listar(self) -> ServiceResult<Vec<Reserva>> {
        self.api.peticion(RECURSO, Method::GET, PATH).recibir().await
    }

    pub async fn listar_por_usuario(self, usuario_id: i64) -> ServiceResult<Vec<Reserva>> {
        self.api
            .peticion(RECURSO, Method::GET, format!("{PATH}/usuario/{usuario_id}"))
            .recibir()
            .await
    }

    pub async fn crear(self, nueva: &NuevaReserva) -> ServiceResult<Reserva> {
        self.api
            .peticion(RECURSO, Method::POST, PATH)
            .json(nueva)?
            .recibir()
            .await
    }

    pub async fn actualizar(self, id: i64, cambios: &ReservaCambios) -> ServiceResult<Reserva> {
        self.api
            .peticion(RECURSO, Method::PATCH, format!("{PATH}/{id}"))
            .json(cambios)?
            .recibir()
            .await
    }

    pub async fn eliminar(self, id: i64) -> ServiceResult<()> {
        self.api
            .peticion(RECURSO, Method::DELETE, format!("{PATH}/{id}"))
            .sin_respuesta()
            .await
    }
}
