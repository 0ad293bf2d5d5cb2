//! Cliente de `/servicio-usuarios/usuarios`

use reqwest::Method;

use super::{ApiClient, ServiceResult};
use crate::modelos::{NuevoUsuario, Usuario, UsuarioCambios};

const RECURSO: &str = "usuarios";
const PATH: &str = "/servicio-usuarios/usuarios";

#[derive(Debug, Clone, Copy)]
pub struct UsuariosService<'a> {
    api: &'a ApiClient,
}

impl<'a> UsuariosService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn listar(self) -> ServiceResult<Vec<Usuario>> {
        self.api.peticion(RECURSO, Method::GET, PATH).recibir().await
    }

    pub async fn crear(self, nuevo: &NuevoUsuario) -> ServiceResult<Usuario> {
        self.api
            .peticion(RECURSO, Method::POST, PATH)
            .json(nuevo)?
            .recibir()
            .await
    }

    pub async fn actualizar(self, id: i64, cambios: &UsuarioCambios) -> ServiceResult<Usuario> {
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
