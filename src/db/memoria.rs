use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::almacen::{IntentLog, SessionStore};
use super::models::{IntencionReserva, Sesion};
use super::Result;

/// Almacén en memoria del proceso; se pierde al reiniciar
#[derive(Debug, Default)]
pub struct MemoryStore {
    sesiones: RwLock<HashMap<String, Sesion>>,
    intenciones: RwLock<HashMap<String, IntencionReserva>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn total_sesiones(&self) -> usize {
        self.sesiones.read().await.len()
    }

    /// Todas las intenciones registradas, incluidas las terminadas
    pub async fn intenciones(&self) -> Vec<IntencionReserva> {
        let mut todas: Vec<_> = self.intenciones.read().await.values().cloned().collect();
        todas.sort_by_key(|i| i.creada_en);
        todas
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn guardar_sesion(&self, sesion: &Sesion) -> Result<()> {
        self.sesiones
            .write()
            .await
            .insert(sesion.token.clone(), sesion.clone());
        Ok(())
    }

    async fn buscar_sesion(&self, token: &str) -> Result<Option<Sesion>> {
        Ok(self.sesiones.read().await.get(token).cloned())
    }

    async fn eliminar_sesion(&self, token: &str) -> Result<()> {
        self.sesiones.write().await.remove(token);
        Ok(())
    }

    async fn purgar_sesiones(&self, ahora: i64) -> Result<u64> {
        let mut sesiones = self.sesiones.write().await;
        let antes = sesiones.len();
        sesiones.retain(|_, sesion| !sesion.expirada(ahora));
        Ok((antes - sesiones.len()) as u64)
    }
}

#[async_trait]
impl IntentLog for MemoryStore {
    async fn registrar(&self, intencion: &IntencionReserva) -> Result<()> {
        self.intenciones
            .write()
            .await
            .insert(intencion.id.clone(), intencion.clone());
        Ok(())
    }

    async fn actualizar(&self, intencion: &IntencionReserva, version_leida: i64) -> Result<bool> {
        let mut intenciones = self.intenciones.write().await;
        match intenciones.get_mut(&intencion.id) {
            Some(guardada) if guardada.version == version_leida => {
                *guardada = intencion.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn pendientes(&self) -> Result<Vec<IntencionReserva>> {
        Ok(self
            .intenciones()
            .await
            .into_iter()
            .filter(|i| !i.paso.es_terminal())
            .collect())
    }
}
