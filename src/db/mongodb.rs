use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Client, Collection, Database};

use super::almacen::{IntentLog, SessionStore};
use super::models::{IntencionReserva, Paso, Sesion};
use super::Result;
use crate::api::AppError;

#[derive(Debug, Clone)]
pub struct MongoRepo {
    pub client: Client,
    pub database: Database,
}

impl MongoRepo {
    pub async fn init(mongo_uri: &str, database_name: &str) -> Result<MongoRepo> {
        let client = Client::with_uri_str(mongo_uri)
            .await
            .map_err(|e| AppError::Internal(format!("Error conectando a MongoDB: {}", e)))?;

        let database = client.database(database_name);

        // Test connection
        database
            .run_command(doc! {"ping": 1})
            .await
            .map_err(|e| AppError::Internal(format!("Error validando conexión MongoDB: {}", e)))?;

        tracing::info!(database = database_name, "Conexión a MongoDB establecida");

        Ok(MongoRepo { client, database })
    }

    pub fn sesiones(&self) -> Collection<Sesion> {
        self.database.collection("sesiones")
    }

    pub fn intenciones(&self) -> Collection<IntencionReserva> {
        self.database.collection("intenciones")
    }

    pub async fn create_indexes(&self) -> Result<()> {
        use mongodb::IndexModel;

        // El token ya es el _id; se indexa la expiración para la purga
        let sesion_indexes = vec![
            IndexModel::builder().keys(doc! { "expira_en": 1 }).build(),
            IndexModel::builder().keys(doc! { "usuario.id": 1 }).build(),
        ];

        self.sesiones()
            .create_indexes(sesion_indexes)
            .await
            .map_err(|e| AppError::database("create_indexes_sesiones", e))?;

        let intencion_indexes = vec![
            IndexModel::builder().keys(doc! { "paso": 1 }).build(),
            IndexModel::builder().keys(doc! { "creada_en": 1 }).build(),
        ];

        self.intenciones()
            .create_indexes(intencion_indexes)
            .await
            .map_err(|e| AppError::database("create_indexes_intenciones", e))?;

        tracing::info!("Índices MongoDB creados exitosamente");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MongoRepo {
    async fn guardar_sesion(&self, sesion: &Sesion) -> Result<()> {
        self.sesiones()
            .insert_one(sesion)
            .await
            .map_err(|e| AppError::database("guardar_sesion", e))?;
        Ok(())
    }

    async fn buscar_sesion(&self, token: &str) -> Result<Option<Sesion>> {
        self.sesiones()
            .find_one(doc! { "_id": token })
            .await
            .map_err(|e| AppError::database("buscar_sesion", e))
    }

    async fn eliminar_sesion(&self, token: &str) -> Result<()> {
        self.sesiones()
            .delete_one(doc! { "_id": token })
            .await
            .map_err(|e| AppError::database("eliminar_sesion", e))?;
        Ok(())
    }

    async fn purgar_sesiones(&self, ahora: i64) -> Result<u64> {
        let result = self
            .sesiones()
            .delete_many(doc! { "expira_en": { "$lte": ahora } })
            .await
            .map_err(|e| AppError::database("purgar_sesiones", e))?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl IntentLog for MongoRepo {
    async fn registrar(&self, intencion: &IntencionReserva) -> Result<()> {
        self.intenciones()
            .replace_one(doc! { "_id": intencion.id.as_str() }, intencion)
            .upsert(true)
            .await
            .map_err(|e| AppError::database("registrar_intencion", e))?;
        Ok(())
    }

    async fn actualizar(&self, intencion: &IntencionReserva, version_leida: i64) -> Result<bool> {
        let result = self
            .intenciones()
            .replace_one(
                doc! { "_id": intencion.id.as_str(), "version": version_leida },
                intencion,
            )
            .await
            .map_err(|e| AppError::database("actualizar_intencion", e))?;
        Ok(result.matched_count == 1)
    }

    async fn pendientes(&self) -> Result<Vec<IntencionReserva>> {
        let terminales: Vec<&str> = Paso::TERMINALES.iter().map(Paso::as_str).collect();

        let mut cursor = self
            .intenciones()
            .find(doc! { "paso": { "$nin": terminales } })
            .sort(doc! { "creada_en": 1 })
            .await
            .map_err(|e| AppError::database("listar_intenciones", e))?;

        let mut results = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| AppError::database("iterar_intenciones", e))?
        {
            let intencion = cursor
                .deserialize_current()
                .map_err(|e| AppError::database("deserializar_intencion", e))?;
            results.push(intencion);
        }

        Ok(results)
    }
}
