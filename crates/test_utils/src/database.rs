//! Database Test Utilities
//!
//! Testcontainer management for repository integration tests. The container
//! gets a minimal copy of the billing schema plus the maintenance index
//! scripts, and [`TestDatabase`] offers seeding helpers for the billing
//! tables.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "billing_test";

const BILLING_SCHEMA: &str = include_str!("../sql/billing_schema.sql");
const FACTURAS_INDEXES: &str = include_str!("../../../sql/001_facturas_indexes.sql");
const OPERACIONES_INDEXES: &str = include_str!("../../../sql/002_operaciones_indexes.sql");

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A wrapper around a PostgreSQL test container
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a new PostgreSQL container with the billing schema and indexes
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or the schema fails to initialize
    pub async fn new() -> Result<Self, BoxError> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr("database system is ready to accept connections"))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let port = container.get_host_port_ipv4(5432).await?;
        let host = container.get_host().await?.to_string();

        let config = TestDatabaseConfig {
            host,
            port,
            ..TestDatabaseConfig::default()
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.connection_url())
            .await?;

        let test_db = Self {
            _container: container,
            config,
            pool,
        };
        test_db.init_schema().await?;

        Ok(test_db)
    }

    /// Creates the billing tables and runs the index scripts
    async fn init_schema(&self) -> Result<(), BoxError> {
        for script in [BILLING_SCHEMA, FACTURAS_INDEXES, OPERACIONES_INDEXES] {
            sqlx::raw_sql(script).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts a client and its service settings
    pub async fn insert_client(&self, client: &SeedClient) -> Result<(), BoxError> {
        sqlx::query(
            "INSERT INTO usuarios (id, nombre, estado, cedula, telefono, movil, correo) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.status)
        .bind(&client.national_id)
        .bind(&client.phone)
        .bind(&client.mobile)
        .bind(&client.email)
        .execute(&self.pool)
        .await?;

        sqlx::query("INSERT INTO tblavisouser (cliente, corteautomatico, zona) VALUES ($1, $2, $3)")
            .bind(client.id)
            .bind(client.cutoff_days)
            .bind(client.zone)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts an invoice row
    pub async fn insert_invoice(
        &self,
        id: i32,
        client_id: i32,
        issued: NaiveDate,
        total: Decimal,
        status: &str,
    ) -> Result<(), BoxError> {
        sqlx::query("INSERT INTO facturas (id, idcliente, emitido, total, estado) VALUES ($1, $2, $3, $4, $5)")
            .bind(id)
            .bind(client_id)
            .bind(issued)
            .bind(total)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Records a payment against an invoice at noon of `paid_on`
    pub async fn insert_payment(
        &self,
        invoice_id: i32,
        paid_on: NaiveDate,
        amount: Decimal,
        operator: Option<i32>,
    ) -> Result<(), BoxError> {
        let paid_at = paid_on
            .and_hms_opt(12, 0, 0)
            .ok_or("invalid payment time")?;
        sqlx::query("INSERT INTO operaciones (nfactura, fecha_pago, cobrado, operador) VALUES ($1, $2, $3, $4)")
            .bind(invoice_id)
            .bind(paid_at)
            .bind(amount)
            .bind(operator)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Client row to seed into `usuarios` and `tblavisouser`
#[derive(Debug, Clone)]
pub struct SeedClient {
    pub id: i32,
    pub name: String,
    pub status: String,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub cutoff_days: i32,
    pub zone: i32,
}

impl SeedClient {
    /// Active client with a 20 day cutoff in zone 1
    pub fn active(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: "ACTIVO".to_string(),
            national_id: Some(format!("13{id:08}")),
            phone: Some("052600000".to_string()),
            mobile: None,
            email: None,
            cutoff_days: 20,
            zone: 1,
        }
    }

    pub fn in_zone(mut self, zone: i32) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

/// Creates an isolated test database for a single test
pub async fn create_isolated_test_database() -> Result<TestDatabase, BoxError> {
    TestDatabase::new().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_connection_url() {
        let url = TestDatabaseConfig::default().connection_url();

        assert!(url.starts_with("postgres://"));
        assert!(url.contains(POSTGRES_USER));
        assert!(url.contains(POSTGRES_DB));
    }

    #[test]
    fn test_index_scripts_are_idempotent() {
        for script in [FACTURAS_INDEXES, OPERACIONES_INDEXES] {
            for line in script.lines().filter(|l| l.starts_with("CREATE INDEX")) {
                assert!(line.contains("IF NOT EXISTS"), "{line}");
            }
        }
    }
}
