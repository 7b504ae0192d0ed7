//! Invoice analytics repository
//!
//! Read-only queries over the billing tables:
//!
//! - `facturas`: invoices (`emitido`, `total`, `estado`)
//! - `operaciones`: payments against an invoice (`nfactura`, `fecha_pago`, `cobrado`)
//! - `usuarios`: clients
//! - `tblavisouser`: per-client service settings (`corteautomatico`, `zona`)
//!
//! Every query starts from the same classified-invoice projection. The first
//! payment of each invoice is computed in a grouped subquery over
//! `operaciones` and joined once, instead of aggregating per row in the outer
//! query. The `CASE` expression must match `PaymentPeriod::classify`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::error::DatabaseError;

/// Reportable invoices with their first payment and payment period
///
/// Void invoices, non-positive totals and inactive clients are excluded.
/// Filters are appended by each query starting with `AND`.
const CLASSIFIED_INVOICES: &str = r#"
    SELECT
        f.id::bigint                                    AS invoice_id,
        f.idcliente::bigint                             AS client_id,
        u.nombre                                        AS client_name,
        f.emitido                                       AS issue_date,
        GREATEST(COALESCE(a.corteautomatico, 0), 0)::int AS cutoff_days,
        p.first_payment_date                            AS first_payment_date,
        f.estado                                        AS status,
        f.total                                         AS total,
        COALESCE(p.amount_paid, 0)                      AS amount_paid,
        COALESCE(a.zona, 0)::bigint                     AS zone_id,
        p.operator_id                                   AS operator_id,
        (p.first_payment_date - f.emitido)::int         AS days_to_pay,
        CASE
            WHEN p.first_payment_date IS NULL THEN 'PENDING'
            WHEN p.first_payment_date - f.emitido <= 10 THEN 'OPTIMAL'
            WHEN p.first_payment_date
                 <= f.emitido + GREATEST(COALESCE(a.corteautomatico, 0), 0) THEN 'ACCEPTABLE'
            ELSE 'CRITICAL'
        END                                             AS period
    FROM facturas f
    JOIN usuarios u ON u.id = f.idcliente
    LEFT JOIN tblavisouser a ON a.cliente = f.idcliente
    LEFT JOIN (
        SELECT
            nfactura,
            MIN(fecha_pago)::date    AS first_payment_date,
            SUM(cobrado)             AS amount_paid,
            MIN(operador)::bigint    AS operator_id
        FROM operaciones
        WHERE cobrado > 0
        GROUP BY nfactura
    ) p ON p.nfactura = f.id
    WHERE f.estado <> 'Anulado'
      AND f.total > 0
      AND u.estado = 'ACTIVO'
"#;

/// Issue-date range and optional zone, bound as `$1`, `$2`, `$3`
const RANGE_FILTER: &str = r#"
      AND f.emitido >= $1
      AND f.emitido < $2
      AND ($3::bigint IS NULL OR a.zona = $3)
"#;

fn period_aggregates_sql() -> String {
    format!(
        r#"
        SELECT
            c.period                                   AS period,
            COUNT(*)                                   AS invoice_count,
            COALESCE(SUM(c.amount_paid), 0)            AS amount_paid,
            AVG(c.days_to_pay)::float8                 AS avg_days_to_pay
        FROM ({CLASSIFIED_INVOICES} {RANGE_FILTER}) c
        GROUP BY c.period
        ORDER BY c.period
        "#
    )
}

fn invoices_in_range_sql() -> String {
    format!("{CLASSIFIED_INVOICES} {RANGE_FILTER} ORDER BY f.emitido, f.id")
}

fn client_invoices_sql() -> String {
    format!("{CLASSIFIED_INVOICES} AND f.idcliente = $1 ORDER BY f.emitido DESC, f.id DESC")
}

fn client_counters_sql() -> String {
    format!(
        r#"
        SELECT
            u.id::bigint                                        AS client_id,
            u.nombre                                            AS name,
            u.cedula                                            AS national_id,
            COALESCE(NULLIF(u.movil, ''), u.telefono)           AS phone,
            u.correo                                            AS email,
            u.estado                                            AS status,
            COUNT(*) FILTER (WHERE c.period = 'OPTIMAL')        AS optimal,
            COUNT(*) FILTER (WHERE c.period = 'ACCEPTABLE')     AS acceptable,
            COUNT(*) FILTER (WHERE c.period = 'CRITICAL')       AS critical,
            COUNT(*) FILTER (WHERE c.period = 'PENDING')        AS pending,
            COALESCE(AVG(GREATEST(COALESCE(c.days_to_pay - c.cutoff_days, 0), 0)), 0)::float8
                                                                AS avg_days_past_cutoff
        FROM ({CLASSIFIED_INVOICES}) c
        JOIN usuarios u ON u.id = c.client_id
        WHERE ($1::text IS NULL
               OR u.nombre ILIKE $1 ESCAPE '\'
               OR u.cedula ILIKE $1 ESCAPE '\')
        GROUP BY u.id, u.nombre, u.cedula, u.movil, u.telefono, u.correo, u.estado
        HAVING COUNT(*) >= $2
        ORDER BY u.id
        "#
    )
}

/// `ILIKE` pattern matching `term` literally anywhere in the column
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// One row of the per-period aggregation
#[derive(Debug, Clone, FromRow)]
pub struct PeriodAggregateRow {
    pub period: String,
    pub invoice_count: i64,
    pub amount_paid: Decimal,
    pub avg_days_to_pay: Option<f64>,
}

/// One classified invoice
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceAnalysisRow {
    pub invoice_id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub issue_date: NaiveDate,
    pub cutoff_days: i32,
    pub first_payment_date: Option<NaiveDate>,
    pub status: String,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub zone_id: i64,
    pub operator_id: Option<i64>,
    pub days_to_pay: Option<i32>,
    pub period: String,
}

/// Historical counters of one client
#[derive(Debug, Clone, FromRow)]
pub struct ClientCountersRow {
    pub client_id: i64,
    pub name: String,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub optimal: i64,
    pub acceptable: i64,
    pub critical: i64,
    pub pending: i64,
    pub avg_days_past_cutoff: f64,
}

/// Repository over the billing tables
///
/// Holds only the pool; every method runs a single read-only statement.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Per-period counts, paid amounts and mean days to pay for `[start, end)`
    ///
    /// Returns no rows when no invoice matches.
    pub async fn period_aggregates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        zone_id: Option<i64>,
    ) -> Result<Vec<PeriodAggregateRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PeriodAggregateRow>(&period_aggregates_sql())
            .bind(start)
            .bind(end)
            .bind(zone_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(rows = rows.len(), "Period aggregates fetched");
        Ok(rows)
    }

    /// Classified invoices issued in `[start, end)`, oldest first
    pub async fn invoices_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        zone_id: Option<i64>,
    ) -> Result<Vec<InvoiceAnalysisRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceAnalysisRow>(&invoices_in_range_sql())
            .bind(start)
            .bind(end)
            .bind(zone_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Every reportable invoice of one client, newest first
    pub async fn client_invoices(&self, client_id: i64) -> Result<Vec<InvoiceAnalysisRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceAnalysisRow>(&client_invoices_sql())
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Historical counters for clients with at least `min_invoices` invoices
    ///
    /// # Arguments
    ///
    /// * `search` - Case-insensitive substring of name or national id
    /// * `min_invoices` - Clients with fewer reportable invoices are omitted
    pub async fn client_counters(
        &self,
        search: Option<&str>,
        min_invoices: i64,
    ) -> Result<Vec<ClientCountersRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClientCountersRow>(&client_counters_sql())
            .bind(search.map(contains_pattern))
            .bind(min_invoices)
            .fetch_all(&self.pool)
            .await?;

        debug!(rows = rows.len(), "Client counters fetched");
        Ok(rows)
    }

    /// Runs `SELECT 1`
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
