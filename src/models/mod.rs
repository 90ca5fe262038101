pub mod caja;
pub mod cierre_caja;
pub mod comanda;
pub mod reserva;
pub mod role;
pub mod usuario;
pub mod venta;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::caja::{self, Entity as Caja};
    pub use super::cierre_caja::{self, Entity as CierreCaja};
    pub use super::comanda::{self, Entity as Comanda};
    pub use super::reserva::{self, Entity as Reserva};
    pub use super::role::{self, Entity as Role};
    pub use super::usuario::{self, Entity as Usuario};
    pub use super::venta::{self, Entity as Venta};
}
