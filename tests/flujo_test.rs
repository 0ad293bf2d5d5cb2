mod common;

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{cliente, cliente_con_timeout, de, franja, llamadas, recurso, reserva};
use reservas_locales::api::AppError;
use reservas_locales::db::{IntencionReserva, IntentLog, MemoryStore, Operacion, Paso};
use reservas_locales::flujo::FlujoReserva;
use reservas_locales::modelos::{Disponibilidad, Recurso, Reserva};

fn recurso_libre() -> Recurso {
    de(recurso(10, 1, "disponible"))
}

fn slot() -> Disponibilidad {
    de(franja(3, 10, true))
}

async fn cuerpos(server: &MockServer, metodo: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == metodo)
        .map(|r| r.body_json::<Value>().unwrap())
        .collect()
}

async fn montar_reserva_creada(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/servicio/reservas"))
        .respond_with(ResponseTemplate::new(201).set_body_json(reserva(55, 1, 10, "confirmada")))
        .mount(server)
        .await;
}

async fn montar_put_recurso(server: &MockServer, status: u16) {
    Mock::given(method("PUT"))
        .and(path("/servicio/recursos"))
        .and(query_param("id", "10"))
        .respond_with(ResponseTemplate::new(status).set_body_json(recurso(10, 1, "reservado")))
        .mount(server)
        .await;
}

#[tokio::test]
async fn reservar_crea_ocupa_recurso_y_franja_en_orden() {
    let server = MockServer::start().await;
    montar_reserva_creada(&server).await;
    montar_put_recurso(&server, 200).await;
    Mock::given(method("PATCH"))
        .and(path("/servicio/disponibilidad/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let reserva = FlujoReserva::new(&api, &store)
        .reservar(1, 1, &recurso_libre(), &slot())
        .await
        .unwrap();
    assert_eq!(reserva.id, 55);

    assert_eq!(
        llamadas(&server).await,
        vec![
            "POST /servicio/reservas",
            "PUT /servicio/recursos?id=10",
            "PATCH /servicio/disponibilidad/3",
        ]
    );

    let creada = &cuerpos(&server, "POST").await[0];
    assert_eq!(creada["estado"], "confirmada");
    assert_eq!(creada["fecha"], "2024-12-25");
    assert_eq!(creada["hora"], "20:00");
    assert_eq!(creada["num_personas"], 4);
    assert_eq!(cuerpos(&server, "PUT").await[0]["estado"], "reservado");
    assert_eq!(cuerpos(&server, "PATCH").await[0], json!({ "disponible": false }));

    let intenciones = store.intenciones().await;
    assert_eq!(intenciones.len(), 1);
    assert_eq!(intenciones[0].paso, Paso::Completada);
}

#[tokio::test]
async fn si_falla_la_creacion_no_hay_mas_llamadas() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/servicio/reservas"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let error = FlujoReserva::new(&api, &store)
        .reservar(1, 1, &recurso_libre(), &slot())
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Flujo(ref e) if e.paso == Paso::Fallida && !e.compensada));
    assert_eq!(llamadas(&server).await, vec!["POST /servicio/reservas"]);
    assert_eq!(store.intenciones().await[0].paso, Paso::Fallida);
}

#[tokio::test]
async fn si_falla_el_recurso_se_borra_la_reserva() {
    let server = MockServer::start().await;
    montar_reserva_creada(&server).await;
    montar_put_recurso(&server, 500).await;
    Mock::given(method("DELETE"))
        .and(path("/servicio/reservas/55"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let error = FlujoReserva::new(&api, &store)
        .reservar(1, 1, &recurso_libre(), &slot())
        .await
        .unwrap_err();

    match error {
        AppError::Flujo(e) => {
            assert!(e.compensada);
            assert_eq!(e.paso, Paso::Compensada);
        }
        otro => panic!("error inesperado: {:?}", otro),
    }
    assert_eq!(
        llamadas(&server).await,
        vec![
            "POST /servicio/reservas",
            "PUT /servicio/recursos?id=10",
            "DELETE /servicio/reservas/55",
        ]
    );
}

#[tokio::test]
async fn si_falla_la_franja_se_restaura_el_recurso() {
    let server = MockServer::start().await;
    montar_reserva_creada(&server).await;
    montar_put_recurso(&server, 200).await;
    Mock::given(method("PATCH"))
        .and(path("/servicio/disponibilidad/3"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/servicio/reservas/55"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let error = FlujoReserva::new(&api, &store)
        .reservar(1, 1, &recurso_libre(), &slot())
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::Flujo(ref e) if e.compensada));

    let estados: Vec<Value> = cuerpos(&server, "PUT")
        .await
        .into_iter()
        .map(|c| c["estado"].clone())
        .collect();
    assert_eq!(estados, vec![json!("reservado"), json!("disponible")]);
    assert!(llamadas(&server).await.last().unwrap().starts_with("DELETE"));
    assert_eq!(store.intenciones().await[0].paso, Paso::Compensada);
}

#[tokio::test]
async fn compensacion_fallida_queda_pendiente_y_se_reanuda() {
    let server = MockServer::start().await;
    montar_reserva_creada(&server).await;
    montar_put_recurso(&server, 500).await;
    Mock::given(method("DELETE"))
        .and(path("/servicio/reservas/55"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let flujo = FlujoReserva::new(&api, &store);

    let error = flujo.reservar(1, 1, &recurso_libre(), &slot()).await.unwrap_err();
    assert!(matches!(error, AppError::Flujo(ref e) if !e.compensada));
    let pendientes = store.intenciones().await;
    assert_eq!(pendientes[0].paso, Paso::CompensacionPendiente);
    assert!(pendientes[0].error.is_some());

    server.reset().await;
    montar_put_recurso(&server, 200).await;
    Mock::given(method("DELETE"))
        .and(path("/servicio/reservas/55"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let procesadas = flujo.reanudar_pendientes(0).await.unwrap();
    assert_eq!(procesadas.len(), 1);
    assert_eq!(procesadas[0].paso, Paso::Compensada);
    assert_eq!(cuerpos(&server, "PUT").await[0]["estado"], "disponible");
}

async fn montar_cancelacion(server: &MockServer, status_disponibilidad: u16) {
    Mock::given(method("PATCH"))
        .and(path("/servicio/reservas/55"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reserva(55, 1, 10, "cancelada")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/servicio/disponibilidad"))
        .respond_with(ResponseTemplate::new(status_disponibilidad).set_body_json(json!([
            {
                "id": 2, "recurso_id": 10, "fecha": "2024-12-24",
                "hora_inicio": "20:00", "hora_fin": "22:00", "disponible": false
            },
            franja(3, 10, false),
        ])))
        .mount(server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/servicio/disponibilidad/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/servicio/recursos"))
        .and(query_param("id", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recurso(10, 1, "reservado")))
        .mount(server)
        .await;
    montar_put_recurso(server, 200).await;
}

#[tokio::test]
async fn cancelar_libera_la_franja_de_la_reserva_y_el_recurso() {
    let server = MockServer::start().await;
    montar_cancelacion(&server, 200).await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let confirmada: Reserva = de(reserva(55, 1, 10, "confirmada"));

    FlujoReserva::new(&api, &store)
        .cancelar(&confirmada, Operacion::Cancelar)
        .await
        .unwrap();

    assert_eq!(
        llamadas(&server).await,
        vec![
            "PATCH /servicio/reservas/55",
            "GET /servicio/disponibilidad",
            "PATCH /servicio/disponibilidad/3",
            "GET /servicio/recursos?id=10",
            "PUT /servicio/recursos?id=10",
        ]
    );
    let patches = cuerpos(&server, "PATCH").await;
    assert_eq!(patches[0], json!({ "estado": "cancelada" }));
    assert_eq!(patches[1], json!({ "disponible": true }));
    assert_eq!(cuerpos(&server, "PUT").await[0]["estado"], "disponible");
    assert_eq!(store.intenciones().await[0].paso, Paso::Completada);
}

#[tokio::test]
async fn cancelacion_interrumpida_se_completa_al_reanudar() {
    let server = MockServer::start().await;
    montar_cancelacion(&server, 503).await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let flujo = FlujoReserva::new(&api, &store);
    let confirmada: Reserva = de(reserva(55, 1, 10, "confirmada"));

    let error = flujo.cancelar(&confirmada, Operacion::Cancelar).await;
    assert!(error.is_err());
    assert_eq!(store.intenciones().await[0].paso, Paso::ReservaCancelada);

    server.reset().await;
    montar_cancelacion(&server, 200).await;

    let procesadas = flujo.reanudar_pendientes(0).await.unwrap();
    assert_eq!(procesadas[0].paso, Paso::Completada);
    assert!(!llamadas(&server).await.contains(&"PATCH /servicio/reservas/55".to_string()));
}

/// Intención de reserva que se quedó en `paso`, con la reserva 55 ya creada
fn reserva_a_medias(paso: Paso) -> IntencionReserva {
    let mut intencion = IntencionReserva::nueva(Operacion::Reservar, 1, 1, 10);
    intencion.recurso = Some(recurso_libre());
    intencion.disponibilidad = Some(slot());
    intencion.reserva = Some(de(reserva(55, 1, 10, "confirmada")));
    intencion.avanzar(paso);
    intencion
}

async fn montar_borrado(server: &MockServer) {
    Mock::given(method("DELETE"))
        .and(path("/servicio/reservas/55"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn franja_sin_respuesta_se_libera_al_deshacer() {
    let server = MockServer::start().await;
    montar_reserva_creada(&server).await;
    montar_put_recurso(&server, 200).await;
    Mock::given(method("PATCH"))
        .and(path("/servicio/disponibilidad/3"))
        .and(body_json(json!({ "disponible": false })))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/servicio/disponibilidad/3"))
        .and(body_json(json!({ "disponible": true })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    montar_borrado(&server).await;

    let api = cliente_con_timeout(&server, Duration::from_millis(300));
    let store = MemoryStore::new();
    let error = FlujoReserva::new(&api, &store)
        .reservar(1, 1, &recurso_libre(), &slot())
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::Flujo(ref e) if e.compensada));

    assert_eq!(
        cuerpos(&server, "PATCH").await,
        vec![json!({ "disponible": false }), json!({ "disponible": true })]
    );
    let estados: Vec<Value> = cuerpos(&server, "PUT")
        .await
        .into_iter()
        .map(|c| c["estado"].clone())
        .collect();
    assert_eq!(estados, vec![json!("reservado"), json!("disponible")]);
    assert_eq!(store.intenciones().await[0].paso, Paso::Compensada);
}

#[tokio::test]
async fn reanudar_tras_ocupar_el_recurso_libera_la_franja() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/servicio/disponibilidad/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    montar_put_recurso(&server, 200).await;
    montar_borrado(&server).await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    store.registrar(&reserva_a_medias(Paso::RecursoReservado)).await.unwrap();

    let procesadas = FlujoReserva::new(&api, &store).reanudar_pendientes(0).await.unwrap();
    assert_eq!(procesadas.len(), 1);
    assert_eq!(procesadas[0].paso, Paso::Compensada);

    assert_eq!(
        llamadas(&server).await,
        vec![
            "PATCH /servicio/disponibilidad/3",
            "PUT /servicio/recursos?id=10",
            "DELETE /servicio/reservas/55",
        ]
    );
    assert_eq!(cuerpos(&server, "PATCH").await[0], json!({ "disponible": true }));
    assert_eq!(cuerpos(&server, "PUT").await[0]["estado"], "disponible");
}

#[tokio::test]
async fn reanudar_mientras_reserva_detiene_la_reserva() {
    let server = MockServer::start().await;
    montar_reserva_creada(&server).await;
    Mock::given(method("PUT"))
        .and(path("/servicio/recursos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(recurso(10, 1, "reservado"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    montar_borrado(&server).await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let flujo = FlujoReserva::new(&api, &store);

    let (libre, disponible) = (recurso_libre(), slot());
    let reservar = flujo.reservar(1, 1, &libre, &disponible);
    let reanudar = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        flujo.reanudar_pendientes(0).await
    };
    let (reservada, reanudadas) = tokio::join!(reservar, reanudar);

    assert!(matches!(reservada, Err(AppError::Conflict(_))));
    let reanudadas = reanudadas.unwrap();
    assert_eq!(reanudadas.len(), 1);
    assert_eq!(reanudadas[0].paso, Paso::Compensada);
    assert_eq!(store.intenciones().await[0].paso, Paso::Compensada);
}

#[tokio::test]
async fn eliminar_borra_la_reserva_y_libera_franja_y_recurso() {
    let server = MockServer::start().await;
    montar_cancelacion(&server, 200).await;
    montar_borrado(&server).await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let confirmada: Reserva = de(reserva(55, 1, 10, "confirmada"));

    FlujoReserva::new(&api, &store)
        .cancelar(&confirmada, Operacion::Eliminar)
        .await
        .unwrap();

    assert_eq!(
        llamadas(&server).await,
        vec![
            "DELETE /servicio/reservas/55",
            "GET /servicio/disponibilidad",
            "PATCH /servicio/disponibilidad/3",
            "GET /servicio/recursos?id=10",
            "PUT /servicio/recursos?id=10",
        ]
    );
    let intencion = &store.intenciones().await[0];
    assert_eq!(intencion.operacion, Operacion::Eliminar);
    assert_eq!(intencion.paso, Paso::Completada);
}

#[tokio::test]
async fn reserva_creada_sin_anotar_se_borra_al_reanudar() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servicio/reservas/usuario/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            reserva(50, 1, 11, "confirmada"),
            reserva(51, 1, 10, "cancelada"),
            reserva(56, 1, 10, "confirmada"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/servicio/reservas/56"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let mut iniciada = IntencionReserva::nueva(Operacion::Reservar, 1, 1, 10);
    iniciada.recurso = Some(recurso_libre());
    iniciada.disponibilidad = Some(slot());
    store.registrar(&iniciada).await.unwrap();

    let procesadas = FlujoReserva::new(&api, &store).reanudar_pendientes(0).await.unwrap();
    assert_eq!(procesadas[0].paso, Paso::Compensada);
    assert_eq!(procesadas[0].reserva.as_ref().map(|r| r.id), Some(56));
    assert_eq!(
        llamadas(&server).await,
        vec!["GET /servicio/reservas/usuario/1", "DELETE /servicio/reservas/56"]
    );
}

#[tokio::test]
async fn iniciada_sin_reserva_remota_queda_fallida() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servicio/reservas/usuario/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([reserva(50, 1, 11, "confirmada")])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let api = cliente(&server);
    let store = MemoryStore::new();
    let mut iniciada = IntencionReserva::nueva(Operacion::Reservar, 1, 1, 10);
    iniciada.disponibilidad = Some(slot());
    store.registrar(&iniciada).await.unwrap();

    let procesadas = FlujoReserva::new(&api, &store).reanudar_pendientes(0).await.unwrap();
    assert_eq!(procesadas[0].paso, Paso::Fallida);
}

#[tokio::test]
async fn intencion_reciente_no_se_reanuda() {
    let server = MockServer::start().await;
    let api = cliente(&server);
    let store = MemoryStore::new();
    let flujo = FlujoReserva::new(&api, &store);
    store.registrar(&reserva_a_medias(Paso::ReservaCreada)).await.unwrap();

    // Seis llamadas de cinco segundos más uno
    assert_eq!(flujo.antiguedad_minima(), 31);
    let procesadas = flujo.reanudar_pendientes(flujo.antiguedad_minima()).await.unwrap();

    assert!(procesadas.is_empty());
    assert!(llamadas(&server).await.is_empty());
    assert_eq!(store.intenciones().await[0].paso, Paso::ReservaCreada);
}
