//! # Reservas de locales
//!
//! Servidor backend-for-frontend para la gestión de reservas de locales (bares,
//! restaurantes, hoteles). Todo el estado de negocio vive en una API REST
//! remota; este servidor compone sus recursos en pantallas JSON, valida los
//! formularios, emite sesiones propias y coordina las operaciones de varios
//! pasos (reservar, cancelar) con compensaciones.
//!
//! ## Arquitectura
//!
//! ```text
//! Navegador
//!     ↓ HTTP/JSON (cookie `sesion` o Bearer)
//! Pantallas (actix-web, `api`)
//!     ↓ formularios, vistas y flujo de reserva
//! Clientes REST (`servicios`, reqwest)  ──→  API remota
//!     ↓
//! Sesiones + registro de intenciones (MongoDB o memoria, `db`)
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod flujo;
pub mod formularios;
pub mod modelos;
pub mod servicios;
pub mod sesion;
pub mod vista;
