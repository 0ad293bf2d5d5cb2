//! Cliente de `/servicio/locales`
//!
//! Las actualizaciones son reemplazos completos (PUT) y el identificador viaja
//! como parámetro de consulta.

use reqwest::Method;

use super::{ApiClient, ServiceResult};
use crate::modelos::{Local, NuevoLocal};

const RECURSO: &str = "locales";
const PATH: &str = "/servicio/locales";

#[derive(Debug, Clone, Copy)]
pub struct LocalesService<'a> {
    api: &'a ApiClient,
}

impl<'a> LocalesService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn listar(self) -> ServiceResult<Vec<Local>> {
        self.api.peticion(RECURSO, Method::GET, PATH).recibir().await
    }

    pub async fn crear(self, nuevo: &NuevoLocal) -> ServiceResult<Local> {
        self.api
            .peticion(RECURSO, Method::POST, PATH)
            .json(nuevo)?
            .recibir()
            .await
    }

    pub async fn actualizar(self, id: i64, local: &NuevoLocal) -> ServiceResult<Local> {
        self.api
            .peticion(RECURSO, Method::PUT, PATH)
            .query("id", id)
            .json(local)?
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
