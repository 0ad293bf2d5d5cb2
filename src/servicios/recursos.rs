//! Cliente de `/servicio/recursos`

use reqwest::Method;

use super::{ApiClient, ServiceResult};
use crate::modelos::{NuevoRecurso, Recurso};

const RECURSO: &str = "recursos";
const PATH: &str = "/servicio/recursos";

#[derive(Debug, Clone, Copy)]
pub struct RecursosService<'a> {
    api: &'a ApiClient,
}

impl<'a> RecursosService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Todos los recursos, o sólo los de un local con `Some(local_id)`
    pub async fn listar(self, local_id: Option<i64>) -> ServiceResult<Vec<Recurso>> {
        let peticion = self.api.peticion(RECURSO, Method::GET, PATH);
        let peticion = match local_id {
            Some(local_id) => peticion.query("local_id", local_id),
            None => peticion,
        };
        peticion.recibir().await
    }

    pub async fn obtener(self, id: i64) -> ServiceResult<Recurso> {
        self.api
            .peticion(RECURSO, Method::GET, PATH)
            .query("id", id)
            .recibir()
            .await
    }

    pub async fn crear(self, nuevo: &NuevoRecurso) -> ServiceResult<Recurso> {
        self.api
            .peticion(RECURSO, Method::POST, PATH)
            .json(nuevo)?
            .recibir()
            .await
    }

    pub async fn actualizar(self, id: i64, recurso: &NuevoRecurso) -> ServiceResult<Recurso> {
        self.api
            .peticion(RECURSO, Method::PUT, PATH)
            .query("id", id)
            .json(recurso)?
            .recibir()
            .await
    }

    pub async fn eliminar(self, id: i64) -> ServiceResult<()> {
        self.api
            .peticion(RECURSO, Method::DELETE, PATH)
            .query("id", id)
            .sin_respuesta()
            .await
    }
}
