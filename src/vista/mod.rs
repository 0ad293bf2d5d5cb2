//! # Vistas
//!
//! Lo que cada pantalla calcula a partir de las colecciones remotas:
//!
//! - [`filtros`] - filtros por local, recursos reservables y búsqueda de nombres
//! - [`reserva_logica`] - estado compartido del formulario de reservas

pub mod filtros;
pub mod reserva_logica;

pub use filtros::{RecursoReservable, ReservaDetallada};
pub use reserva_logica::{liberar_recurso, sincronizar_recurso, LogicaReserva};
