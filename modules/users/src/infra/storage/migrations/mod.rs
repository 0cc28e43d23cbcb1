use sea_orm_migration::prelude::*;

mod m0001_create_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m0001_create_users::Migration)]
    }

    // Each module keeps its own migration bookkeeping table so the
    // migrators can share one database.
    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_users").into_iden()
    }
}
