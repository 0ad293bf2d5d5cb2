#![allow(dead_code)]

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::MockServer;

use reservas_locales::servicios::ApiClient;

pub fn cliente(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

pub fn de<T: DeserializeOwned>(valor: Value) -> T {
    serde_json::from_value(valor).unwrap()
}

pub fn usuario(id: i64, rol: &str) -> Value {
    json!({
        "id": id,
        "nombre": format!("Usuario {}", id),
        "correo": format!("usuario{}@correo.com", id),
        "rol": rol,
        "activo": true
    })
}

pub fn local(id: i64, nombre: &str) -> Value {
    json!({
        "id": id,
        "nombre": nombre,
        "direccion": "Calle Mayor 1",
        "telefono": "555-0101",
        "tipo": "bar",
        "fecha_creacion": "2024-01-01T00:00:00.000Z"
    })
}

pub fn recurso(id: i64, local_id: i64, estado: &str) -> Value {
    json!({
        "id": id,
        "local_id": local_id,
        "tipo_recurso": format!("Mesa {}", id),
        "capacidad": 4,
        "estado": estado
    })
}

pub fn franja(id: i64, recurso_id: i64, disponible: bool) -> Value {
    json!({
        "id": id,
        "recurso_id": recurso_id,
        "fecha": "2024-12-25T00:00:00.000Z",
        "hora_inicio": "20:00",
        "hora_fin": "22:00",
        "disponible": disponible
    })
}

pub fn reserva(id: i64, local_id: i64, recurso_id: i64, estado: &str) -> Value {
    json!({
        "id": id,
        "usuario_id": 1,
        "local_id": local_id,
        "recurso_id": recurso_id,
        "fecha": "2024-12-25",
        "hora": "20:00",
        "num_personas": 4,
        "estado": estado
    })
}

/// Método y ruta (con query) de cada petición recibida, en orden
pub async fn llamadas(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            let query = r.url.query().map(|q| format!("?{}", q)).unwrap_or_default();
            format!("{} {}{}", r.method.as_str(), r.url.path(), query)
        })
        .collect()
}

/// Cliente con un tiempo máximo por petición menor que el habitual
pub fn cliente_con_timeout(server: &MockServer, timeout: Duration) -> ApiClient {
    ApiClient::new(&server.uri(), timeout).unwrap()
}
