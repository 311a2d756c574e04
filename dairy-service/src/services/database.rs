//! Database service for dairy-service.
//!
//! All writes that can race are single atomic upserts keyed on the relevant
//! uniqueness constraint: (customer_id, delivery_date) for the ledger and
//! (customer_id, month, year) for bills. Correctness comes from the store's
//! conflict resolution, never from read-then-write logic.

use crate::models::{
    ActivityRow, AgentDayStats, BillRow, BillingPeriod, CreateCustomer, Customer,
    CustomerDayStatus, CustomerMonthAggregate, CustomerProfile, Delivery, DeliveryRow,
    MonthlyBill, Person, PersonType, RecordDelivery, TodayStats, UpdateCustomer,
};
use crate::services::metrics::DB_QUERY_DURATION;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "dairy-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Registry Operations
    // -------------------------------------------------------------------------

    /// Create a person row (owner or delivery agent onboarding).
    #[instrument(skip(self), fields(person_type = %person_type))]
    pub async fn create_person(
        &self,
        name: &str,
        phone: &str,
        person_type: PersonType,
    ) -> Result<Person, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_person"])
            .start_timer();

        let person_id = Uuid::new_v4();
        let person = sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO people (person_id, name, phone, person_type)
            VALUES ($1, $2, $3, $4)
            RETURNING person_id, name, phone, person_type, is_active, created_utc
            "#,
        )
        .bind(person_id)
        .bind(name)
        .bind(phone)
        .bind(person_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!("Phone '{}' is already registered", phone))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create person: {}", e)),
        })?;

        timer.observe_duration();

        Ok(person)
    }

    /// Onboard a customer: person identity and registry row in one transaction.
    #[instrument(skip(self, input), fields(delivery_man_id = %input.delivery_man_id))]
    pub async fn create_customer(
        &self,
        input: &CreateCustomer,
    ) -> Result<CustomerProfile, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_customer"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let person_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO people (person_id, name, phone, person_type)
            VALUES ($1, $2, $3, 'customer')
            "#,
        )
        .bind(person_id)
        .bind(&input.name)
        .bind(&input.phone)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Phone '{}' is already registered",
                    input.phone
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create person: {}", e)),
        })?;

        let customer_id = Uuid::new_v4();
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (customer_id, person_id, address, area, usual_quantity, rate_per_liter, delivery_man_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING customer_id, person_id, address, area, usual_quantity, rate_per_liter, delivery_man_id, created_utc
            "#,
        )
        .bind(customer_id)
        .bind(person_id)
        .bind(&input.address)
        .bind(&input.area)
        .bind(input.usual_quantity)
        .bind(input.rate_per_liter)
        .bind(input.delivery_man_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create customer: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(customer_id = %customer.customer_id, "Customer created");

        Ok(CustomerProfile {
            customer_id: customer.customer_id,
            name: input.name.clone(),
            phone: input.phone.clone(),
            address: customer.address,
            area: customer.area,
            usual_quantity: customer.usual_quantity,
            rate_per_liter: customer.rate_per_liter,
            delivery_man_id: customer.delivery_man_id,
            is_active: true,
        })
    }

    /// Get a customer with its person identity.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<CustomerProfile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, CustomerProfile>(
            r#"
            SELECT c.customer_id, p.name, p.phone, c.address, c.area,
                   c.usual_quantity, c.rate_per_liter, c.delivery_man_id, p.is_active
            FROM customers c
            JOIN people p ON c.person_id = p.person_id
            WHERE c.customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get customer: {}", e)))?;

        timer.observe_duration();

        Ok(customer)
    }

    /// Partial update; unspecified fields keep their stored values. Rate
    /// changes only affect future deliveries, never stored records.
    #[instrument(skip(self, input), fields(customer_id = %customer_id))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        input: &UpdateCustomer,
    ) -> Result<Option<CustomerProfile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_customer"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        if input.name.is_some() || input.phone.is_some() {
            sqlx::query(
                r#"
                UPDATE people
                SET name = COALESCE($2, people.name),
                    phone = COALESCE($3, people.phone)
                FROM customers c
                WHERE people.person_id = c.person_id AND c.customer_id = $1
                "#,
            )
            .bind(customer_id)
            .bind(&input.name)
            .bind(&input.phone)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to update person: {}", e))
            })?;
        }

        let updated = sqlx::query(
            r#"
            UPDATE customers
            SET address = COALESCE($2, address),
                area = COALESCE($3, area),
                usual_quantity = COALESCE($4, usual_quantity),
                rate_per_liter = COALESCE($5, rate_per_liter)
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .bind(&input.address)
        .bind(&input.area)
        .bind(input.usual_quantity)
        .bind(input.rate_per_liter)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update customer: {}", e)))?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.ok();
            timer.observe_duration();
            return Ok(None);
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        self.get_customer(customer_id).await
    }

    /// Soft-delete: flips the person's active flag. The registry row and the
    /// ledger history remain untouched.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn deactivate_customer(&self, customer_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["deactivate_customer"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE people
            SET is_active = FALSE
            FROM customers c
            WHERE people.person_id = c.person_id AND c.customer_id = $1
            "#,
        )
        .bind(customer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to deactivate customer: {}", e))
        })?;

        timer.observe_duration();

        if result.rows_affected() > 0 {
            info!(customer_id = %customer_id, "Customer deactivated");
        }

        Ok(result.rows_affected() > 0)
    }

    /// Active customers assigned to an agent, each with its day-slot state
    /// for the given date. Ordered by area then name, the agent's walk order.
    #[instrument(skip(self), fields(delivery_man_id = %delivery_man_id))]
    pub async fn list_customers_for_agent(
        &self,
        delivery_man_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<CustomerDayStatus>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_customers_for_agent"])
            .start_timer();

        let customers = sqlx::query_as::<_, CustomerDayStatus>(
            r#"
            SELECT c.customer_id, p.name, p.phone, c.address, c.area,
                   c.usual_quantity, c.rate_per_liter,
                   d.quantity AS day_quantity, d.created_utc AS recorded_utc
            FROM customers c
            JOIN people p ON c.person_id = p.person_id
            LEFT JOIN deliveries d ON d.customer_id = c.customer_id AND d.delivery_date = $2
            WHERE c.delivery_man_id = $1
              AND p.is_active = TRUE
            ORDER BY c.area, p.name
            "#,
        )
        .bind(delivery_man_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list customers: {}", e)))?;

        timer.observe_duration();

        Ok(customers)
    }

    // -------------------------------------------------------------------------
    // Ledger Operations
    // -------------------------------------------------------------------------

    /// Record a delivery for (customer, day).
    ///
    /// The rate is resolved from the registry at call time and snapshotted
    /// into the record; the amount is always recomputed here. A second call
    /// for the same day replaces the record entirely (last write wins) via a
    /// single atomic upsert on the (customer_id, delivery_date) constraint.
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id, delivery_date = %input.delivery_date))]
    pub async fn record_delivery(&self, input: &RecordDelivery) -> Result<Delivery, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_delivery"])
            .start_timer();

        if input.quantity <= Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Quantity must be positive"
            )));
        }

        let rate: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT c.rate_per_liter
            FROM customers c
            JOIN people p ON c.person_id = p.person_id
            WHERE c.customer_id = $1 AND p.is_active = TRUE
            "#,
        )
        .bind(input.customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to resolve rate: {}", e)))?;

        let rate = rate.ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;
        let total_amount = Delivery::charge(input.quantity, rate);

        let delivery_id = Uuid::new_v4();
        let delivery = sqlx::query_as::<_, Delivery>(
            r#"
            INSERT INTO deliveries (delivery_id, customer_id, delivery_man_id, quantity, rate_per_liter, total_amount, delivery_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (customer_id, delivery_date)
            DO UPDATE SET quantity = EXCLUDED.quantity,
                          rate_per_liter = EXCLUDED.rate_per_liter,
                          total_amount = EXCLUDED.total_amount,
                          delivery_man_id = EXCLUDED.delivery_man_id
            RETURNING delivery_id, customer_id, delivery_man_id, quantity, rate_per_liter, total_amount, delivery_date, created_utc
            "#,
        )
        .bind(delivery_id)
        .bind(input.customer_id)
        .bind(input.delivery_man_id)
        .bind(input.quantity)
        .bind(rate)
        .bind(total_amount)
        .bind(input.delivery_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to record delivery: {}", e)))?;

        timer.observe_duration();

        info!(
            delivery_id = %delivery.delivery_id,
            customer_id = %delivery.customer_id,
            quantity = %delivery.quantity,
            total_amount = %delivery.total_amount,
            "Delivery recorded"
        );

        Ok(delivery)
    }

    /// An agent's deliveries for one day, most recent write first.
    #[instrument(skip(self), fields(delivery_man_id = %delivery_man_id))]
    pub async fn list_deliveries_for_agent(
        &self,
        delivery_man_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DeliveryRow>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_deliveries_for_agent"])
            .start_timer();

        let deliveries = sqlx::query_as::<_, DeliveryRow>(
            r#"
            SELECT d.delivery_id, d.customer_id, d.delivery_man_id, d.quantity,
                   d.rate_per_liter, d.total_amount, d.delivery_date, d.created_utc,
                   p.name AS customer_name, c.area
            FROM deliveries d
            JOIN customers c ON d.customer_id = c.customer_id
            JOIN people p ON c.person_id = p.person_id
            WHERE d.delivery_man_id = $1
              AND d.delivery_date = $2
            ORDER BY d.created_utc DESC
            "#,
        )
        .bind(delivery_man_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list deliveries: {}", e)))?;

        timer.observe_duration();

        Ok(deliveries)
    }

    /// A customer's deliveries inside a window, by delivery date ascending.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn list_customer_deliveries(
        &self,
        customer_id: Uuid,
        period: BillingPeriod,
    ) -> Result<Vec<Delivery>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_customer_deliveries"])
            .start_timer();

        let (start, end) = period.bounds();
        let deliveries = sqlx::query_as::<_, Delivery>(
            r#"
            SELECT delivery_id, customer_id, delivery_man_id, quantity, rate_per_liter,
                   total_amount, delivery_date, created_utc
            FROM deliveries
            WHERE customer_id = $1
              AND delivery_date >= $2
              AND delivery_date < $3
            ORDER BY delivery_date
            "#,
        )
        .bind(customer_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list deliveries: {}", e)))?;

        timer.observe_duration();

        Ok(deliveries)
    }

    // -------------------------------------------------------------------------
    // Billing Operations
    // -------------------------------------------------------------------------

    /// Reconcile one window: aggregate every active customer's ledger rows
    /// and upsert one bill per customer with a non-zero aggregate.
    ///
    /// Re-running converges to the same totals for the same ledger state;
    /// the upsert overwrites, it never adds on top of a prior bill.
    #[instrument(skip(self), fields(month = period.month, year = period.year))]
    pub async fn generate_monthly_bills(
        &self,
        period: BillingPeriod,
    ) -> Result<Vec<(CustomerMonthAggregate, MonthlyBill)>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["generate_monthly_bills"])
            .start_timer();

        let (start, end) = period.bounds();

        // Zero-quantity customers are dropped by the HAVING clause: no bill
        // row is created or touched for them.
        let aggregates = sqlx::query_as::<_, CustomerMonthAggregate>(
            r#"
            SELECT c.customer_id,
                   p.name AS customer_name,
                   p.phone AS customer_phone,
                   c.address AS customer_address,
                   COALESCE(SUM(d.quantity), 0) AS total_quantity,
                   COALESCE(SUM(d.total_amount), 0) AS total_amount,
                   COUNT(d.delivery_id) AS delivery_days
            FROM customers c
            JOIN people p ON c.person_id = p.person_id
            LEFT JOIN deliveries d ON d.customer_id = c.customer_id
              AND d.delivery_date >= $1
              AND d.delivery_date < $2
            WHERE p.is_active = TRUE
            GROUP BY c.customer_id, p.name, p.phone, c.address
            HAVING COALESCE(SUM(d.quantity), 0) > 0
            ORDER BY p.name
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to aggregate deliveries: {}", e))
        })?;

        let mut bills = Vec::with_capacity(aggregates.len());
        for aggregate in aggregates {
            let bill_id = Uuid::new_v4();
            let bill = sqlx::query_as::<_, MonthlyBill>(
                r#"
                INSERT INTO monthly_bills (bill_id, customer_id, month, year, total_quantity, total_amount, is_generated, generated_utc)
                VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW())
                ON CONFLICT (customer_id, month, year)
                DO UPDATE SET total_quantity = EXCLUDED.total_quantity,
                              total_amount = EXCLUDED.total_amount,
                              is_generated = TRUE,
                              generated_utc = NOW()
                RETURNING bill_id, customer_id, month, year, total_quantity, total_amount, is_generated, generated_utc
                "#,
            )
            .bind(bill_id)
            .bind(aggregate.customer_id)
            .bind(period.month as i32)
            .bind(period.year)
            .bind(aggregate.total_quantity)
            .bind(aggregate.total_amount)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to upsert bill: {}", e))
            })?;

            bills.push((aggregate, bill));
        }

        timer.observe_duration();

        info!(
            month = period.month,
            year = period.year,
            bill_count = bills.len(),
            "Monthly bills generated"
        );

        Ok(bills)
    }

    /// Previously generated bills for a window, ordered by customer name.
    #[instrument(skip(self), fields(month = period.month, year = period.year))]
    pub async fn list_bills(
        &self,
        period: BillingPeriod,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<BillRow>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_bills"])
            .start_timer();

        let bills = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT mb.bill_id, mb.customer_id, mb.month, mb.year, mb.total_quantity,
                   mb.total_amount, mb.is_generated, mb.generated_utc,
                   p.name AS customer_name, p.phone AS customer_phone,
                   c.address AS customer_address
            FROM monthly_bills mb
            JOIN customers c ON mb.customer_id = c.customer_id
            JOIN people p ON c.person_id = p.person_id
            WHERE mb.month = $1
              AND mb.year = $2
              AND ($3::uuid IS NULL OR mb.customer_id = $3)
            ORDER BY p.name
            "#,
        )
        .bind(period.month as i32)
        .bind(period.year)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list bills: {}", e)))?;

        timer.observe_duration();

        Ok(bills)
    }

    // -------------------------------------------------------------------------
    // Aggregation Views
    // -------------------------------------------------------------------------

    /// Day-wide totals across active customers. Not transactionally isolated
    /// from concurrent writes; this is an operational snapshot, not a ledger
    /// read.
    #[instrument(skip(self))]
    pub async fn today_stats(&self, date: NaiveDate) -> Result<TodayStats, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["today_stats"])
            .start_timer();

        let stats = sqlx::query_as::<_, TodayStats>(
            r#"
            SELECT COALESCE(SUM(d.quantity), 0) AS total_milk_delivered,
                   COALESCE(SUM(d.total_amount), 0) AS total_revenue,
                   COUNT(DISTINCT d.customer_id) AS completed_deliveries,
                   COUNT(DISTINCT c.customer_id) AS total_customers
            FROM customers c
            JOIN people p ON c.person_id = p.person_id
            LEFT JOIN deliveries d ON d.customer_id = c.customer_id AND d.delivery_date = $1
            WHERE p.is_active = TRUE
            "#,
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get today stats: {}", e)))?;

        timer.observe_duration();

        Ok(stats)
    }

    /// Per-agent rollups for one day, ordered by agent name.
    #[instrument(skip(self))]
    pub async fn agent_day_stats(&self, date: NaiveDate) -> Result<Vec<AgentDayStats>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["agent_day_stats"])
            .start_timer();

        let stats = sqlx::query_as::<_, AgentDayStats>(
            r#"
            SELECT p.person_id AS delivery_man_id,
                   p.name,
                   STRING_AGG(DISTINCT c.area, ', ') AS areas,
                   COUNT(DISTINCT c.customer_id) AS total_customers,
                   COUNT(DISTINCT d.customer_id) AS completed_today,
                   COALESCE(SUM(d.quantity), 0) AS milk_delivered_today
            FROM people p
            LEFT JOIN customers c ON c.delivery_man_id = p.person_id
            LEFT JOIN deliveries d ON d.customer_id = c.customer_id AND d.delivery_date = $1
            WHERE p.person_type = 'delivery_man'
              AND p.is_active = TRUE
            GROUP BY p.person_id, p.name
            ORDER BY p.name
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get agent stats: {}", e))
        })?;

        timer.observe_duration();

        Ok(stats)
    }

    /// The day's most recent deliveries with names resolved.
    #[instrument(skip(self))]
    pub async fn recent_activity(
        &self,
        date: NaiveDate,
        limit: i64,
    ) -> Result<Vec<ActivityRow>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["recent_activity"])
            .start_timer();

        let activity = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT d.delivery_id,
                   p.name AS customer_name,
                   dm.name AS delivery_man_name,
                   c.area,
                   d.quantity,
                   d.total_amount,
                   d.delivery_date,
                   d.created_utc
            FROM deliveries d
            JOIN customers c ON d.customer_id = c.customer_id
            JOIN people p ON c.person_id = p.person_id
            JOIN people dm ON d.delivery_man_id = dm.person_id
            WHERE d.delivery_date = $1
            ORDER BY d.created_utc DESC
            LIMIT $2
            "#,
        )
        .bind(date)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get recent activity: {}", e))
        })?;

        timer.observe_duration();

        Ok(activity)
    }
}
