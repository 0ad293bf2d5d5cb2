//! Cliente de `/servicio/disponibilidad`

use reqwest::Method;

use super::{ApiClient, ServiceResult};
use crate::modelos::{Disponibilidad, DisponibilidadCambios, NuevaDisponibilidad};

const RECURSO: &str = "disponibilidad";
const PATH: &str = "/servicio/disponibilidad";

#[derive(Debug, Clone, Copy)]
pub struct DisponibilidadService<'a> {
    api: &'a ApiClient,
}

impl<'a> DisponibilidadService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn listar(self) -> ServiceResult<Vec<Disponibilidad>> {
        self.api.peticion(RECURSO, Method::GET, PATH).recibir().await
    }

    pub async fn crear(self, nueva: &NuevaDisponibilidad) -> ServiceResult<Disponibilidad> {
        self.api
            .peticion(RECURSO, Method::POST, PATH)
            .json(nueva)?
            .recibir()
            .await
    }

    /// PATCH parcial; el servidor no devuelve el registro
    pub async fn actualizar(self, id: i64, cambios: &DisponibilidadCambios) -> ServiceResult<()> {
        self.api
            .peticion(RECURSO, Method::PATCH, format!("{PATH}/{id}"))
            .json(cambios)?
            .sin_respuesta()
            .await
    }

    pub async fn eliminar(self, id: i64) -> ServiceResult<()> {
        self.api
            .peticion(RECURSO, Method::DELETE, format!("{PATH}/{id}"))
            .sin_respuesta()
            .await
    }
}
