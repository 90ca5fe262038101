pub use sea_orm_migration::prelude::*;

mod m20250110_000001_add_usuarios_ultimo_acceso;
mod m20250215_000001_add_ventas_metodo_pago;
mod m20250301_000001_create_cierre_indexes;
mod m20250315_000001_unique_cierre_per_caja;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Applied in lexicographic order of their names
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250110_000001_add_usuarios_ultimo_acceso::Migration),
            Box::new(m20250215_000001_add_ventas_metodo_pago::Migration),
            Box::new(m20250301_000001_create_cierre_indexes::Migration),
            Box::new(m20250315_000001_unique_cierre_per_caja::Migration),
        ]
    }
}
