//! Database service for ordering-service.

use crate::models::{
    CreateCustomer, CreateLineItem, CreateOrder, Customer, LineItem, LineItemAmounts,
    ListOrdersFilter, Order, OrderTotals, Organization, UpdateCustomer, UpdateLineItem,
    UpdateOrder,
};
use crate::numbering::{next_in_sequence, SequenceKind};
use crate::services::metrics::{DB_QUERY_DURATION, SEQUENCE_CONFLICTS_TOTAL};
use chrono::Datelike;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const ORDER_COLUMNS: &str = r#"order_id, organization_id, customer_id, order_number, order_date,
    description, status, subtotal_excl_tax, tax_total, total_incl_tax, notes,
    created_by, assigned_to, created_utc"#;

const LINE_ITEM_COLUMNS: &str = r#"line_item_id, order_id, organization_id, description, quantity,
    unit, unit_price_excl_tax, unit_price_incl_tax, tax_percentage, total_excl_tax,
    total_incl_tax, delivery_notes, sort_order, created_utc"#;

const CUSTOMER_COLUMNS: &str = r#"customer_id, organization_id, customer_number, company_name,
    contact_person, email, phone, street, postal_code, city, country, vat_number,
    payment_terms_days, notes, is_active, created_utc"#;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "ordering-service"))]
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
    // Organization Operations
    // -------------------------------------------------------------------------

    /// Get an organization by ID.
    #[instrument(skip(self), fields(organization_id = %organization_id))]
    pub async fn get_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Organization>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_organization"])
            .start_timer();

        let organization = sqlx::query_as::<_, Organization>(
            r#"
            SELECT organization_id, name, street, postal_code, city, country, phone, email,
                website, coc_number, vat_number, iban, created_utc
            FROM organizations
            WHERE organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get organization: {}", e))
        })?;

        timer.observe_duration();

        Ok(organization)
    }

    // -------------------------------------------------------------------------
    // Customer Operations
    // -------------------------------------------------------------------------

    /// Create a new customer.
    #[instrument(skip(self, input), fields(organization_id = %input.organization_id))]
    pub async fn create_customer(&self, input: &CreateCustomer) -> Result<Customer, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_customer"])
            .start_timer();

        let customer_id = Uuid::new_v4();
        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (customer_id, organization_id, customer_number, company_name,
                contact_person, email, phone, street, postal_code, city, country, vat_number,
                payment_terms_days, notes, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, TRUE)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(input.organization_id)
        .bind(&input.customer_number)
        .bind(&input.company_name)
        .bind(&input.contact_person)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.street)
        .bind(&input.postal_code)
        .bind(&input.city)
        .bind(&input.country)
        .bind(&input.vat_number)
        .bind(input.payment_terms_days)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Customer number already exists for this organization"
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create customer: {}", e)),
        })?;

        timer.observe_duration();

        info!(customer_id = %customer.customer_id, "Customer created");

        Ok(customer)
    }

    /// Get a customer by ID.
    #[instrument(skip(self), fields(organization_id = %organization_id, customer_id = %customer_id))]
    pub async fn get_customer(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE organization_id = $1 AND customer_id = $2
            "#
        ))
        .bind(organization_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get customer: {}", e)))?;

        timer.observe_duration();

        Ok(customer)
    }

    /// Update a customer. Field-by-field allow list.
    #[instrument(skip(self, input), fields(organization_id = %organization_id, customer_id = %customer_id))]
    pub async fn update_customer(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers
            SET company_name = COALESCE($3, company_name),
                contact_person = COALESCE($4, contact_person),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                street = COALESCE($7, street),
                postal_code = COALESCE($8, postal_code),
                city = COALESCE($9, city),
                country = COALESCE($10, country),
                vat_number = COALESCE($11, vat_number),
                payment_terms_days = COALESCE($12, payment_terms_days),
                notes = COALESCE($13, notes),
                is_active = COALESCE($14, is_active)
            WHERE organization_id = $1 AND customer_id = $2
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(customer_id)
        .bind(&input.company_name)
        .bind(&input.contact_person)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.street)
        .bind(&input.postal_code)
        .bind(&input.city)
        .bind(&input.country)
        .bind(&input.vat_number)
        .bind(input.payment_terms_days)
        .bind(&input.notes)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update customer: {}", e))
        })?;

        timer.observe_duration();

        Ok(customer)
    }

    // -------------------------------------------------------------------------
    // Sequence Number Allocation
    // -------------------------------------------------------------------------

    /// Allocate the next order number for an organization and year.
    ///
    /// Reads the maximal existing number for the scope and returns max + 1.
    /// No lock is taken: under concurrent callers two allocations can
    /// collide, and the unique index on (organization_id, order_number)
    /// rejects the second insert with a retryable conflict.
    #[instrument(skip(self), fields(organization_id = %organization_id, year = year))]
    pub async fn allocate_order_number(
        &self,
        organization_id: Uuid,
        year: i32,
    ) -> Result<String, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["allocate_order_number"])
            .start_timer();

        let current_max: Option<String> = sqlx::query_scalar(
            r#"
            SELECT MAX(order_number)
            FROM orders
            WHERE organization_id = $1 AND order_number LIKE $2
            "#,
        )
        .bind(organization_id)
        .bind(SequenceKind::Order.pattern(year))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to scan order numbers: {}", e))
        })?;

        timer.observe_duration();

        Ok(next_in_sequence(
            SequenceKind::Order,
            year,
            current_max.as_deref(),
        ))
    }

    // -------------------------------------------------------------------------
    // Order Operations
    // -------------------------------------------------------------------------

    /// Create a new order. Allocates the next order number when the input
    /// does not carry one. A duplicate number surfaces as a retryable
    /// conflict; the caller should re-allocate and retry.
    #[instrument(skip(self, input), fields(organization_id = %input.organization_id))]
    pub async fn create_order(&self, input: &CreateOrder) -> Result<Order, AppError> {
        let order_number = match &input.order_number {
            Some(number) => number.clone(),
            None => {
                self.allocate_order_number(input.organization_id, input.order_date.year())
                    .await?
            }
        };

        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_order"])
            .start_timer();

        let order_id = Uuid::new_v4();
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (order_id, organization_id, customer_id, order_number, order_date,
                description, status, subtotal_excl_tax, tax_total, total_incl_tax, notes,
                created_by, assigned_to)
            VALUES ($1, $2, $3, $4, $5, $6, 'draft', 0, 0, 0, $7, $8, $9)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(input.organization_id)
        .bind(input.customer_id)
        .bind(&order_number)
        .bind(input.order_date)
        .bind(&input.description)
        .bind(&input.notes)
        .bind(input.created_by)
        .bind(input.assigned_to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                SEQUENCE_CONFLICTS_TOTAL
                    .with_label_values(&["order"])
                    .inc();
                AppError::Conflict(anyhow::anyhow!(
                    "Order number '{}' already exists",
                    order_number
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create order: {}", e)),
        })?;

        timer.observe_duration();

        info!(order_id = %order.order_id, order_number = %order.order_number, "Order created");

        Ok(order)
    }

    /// Get an order by ID.
    #[instrument(skip(self), fields(organization_id = %organization_id, order_id = %order_id))]
    pub async fn get_order(
        &self,
        organization_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_order"])
            .start_timer();

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE organization_id = $1 AND order_id = $2
            "#
        ))
        .bind(organization_id)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get order: {}", e)))?;

        timer.observe_duration();

        Ok(order)
    }

    /// List orders for an organization.
    #[instrument(skip(self, filter), fields(organization_id = %organization_id))]
    pub async fn list_orders(
        &self,
        organization_id: Uuid,
        filter: &ListOrdersFilter,
    ) -> Result<Vec<Order>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_orders"])
            .start_timer();

        let limit = filter.page_size.clamp(1, 100) as i64;
        let status = filter.status.map(|s| s.as_str().to_string());

        let orders = if let Some(cursor) = filter.page_token {
            sqlx::query_as::<_, Order>(&format!(
                r#"
                SELECT {ORDER_COLUMNS}
                FROM orders
                WHERE organization_id = $1
                  AND ($2::text IS NULL OR status = $2)
                  AND ($3::uuid IS NULL OR customer_id = $3)
                  AND ($4::date IS NULL OR order_date >= $4)
                  AND ($5::date IS NULL OR order_date <= $5)
                  AND order_id > $6
                ORDER BY order_id
                LIMIT $7
                "#
            ))
            .bind(organization_id)
            .bind(&status)
            .bind(filter.customer_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(cursor)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, Order>(&format!(
                r#"
                SELECT {ORDER_COLUMNS}
                FROM orders
                WHERE organization_id = $1
                  AND ($2::text IS NULL OR status = $2)
                  AND ($3::uuid IS NULL OR customer_id = $3)
                  AND ($4::date IS NULL OR order_date >= $4)
                  AND ($5::date IS NULL OR order_date <= $5)
                ORDER BY order_id
                LIMIT $6
                "#
            ))
            .bind(organization_id)
            .bind(&status)
            .bind(filter.customer_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list orders: {}", e)))?;

        timer.observe_duration();

        Ok(orders)
    }

    /// Update an order. The order number is immutable and not updatable;
    /// totals are derived and only change through item mutations.
    #[instrument(skip(self, input), fields(organization_id = %organization_id, order_id = %order_id))]
    pub async fn update_order(
        &self,
        organization_id: Uuid,
        order_id: Uuid,
        input: &UpdateOrder,
    ) -> Result<Option<Order>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_order"])
            .start_timer();

        let status = input.status.map(|s| s.as_str().to_string());
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET order_date = COALESCE($3, order_date),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                notes = COALESCE($6, notes),
                assigned_to = COALESCE($7, assigned_to)
            WHERE organization_id = $1 AND order_id = $2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(order_id)
        .bind(input.order_date)
        .bind(&input.description)
        .bind(&status)
        .bind(&input.notes)
        .bind(input.assigned_to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update order: {}", e)))?;

        timer.observe_duration();

        Ok(order)
    }

    /// Delete an order and its line items.
    #[instrument(skip(self), fields(organization_id = %organization_id, order_id = %order_id))]
    pub async fn delete_order(
        &self,
        organization_id: Uuid,
        order_id: Uuid,
    ) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_order"])
            .start_timer();

        let result = sqlx::query(
            r#"
            DELETE FROM orders
            WHERE organization_id = $1 AND order_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete order: {}", e)))?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Line Item Operations
    // -------------------------------------------------------------------------

    /// Add a line item to an order. Derived price fields are computed here
    /// and the order totals are recomputed from the full item set.
    #[instrument(skip(self, input), fields(organization_id = %input.organization_id, order_id = %input.order_id))]
    pub async fn add_line_item(&self, input: &CreateLineItem) -> Result<LineItem, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["add_line_item"])
            .start_timer();

        let amounts =
            LineItemAmounts::compute(input.quantity, input.unit_price_excl_tax, input.tax_percentage);

        let line_item_id = Uuid::new_v4();
        let line_item = sqlx::query_as::<_, LineItem>(&format!(
            r#"
            INSERT INTO order_items (line_item_id, order_id, organization_id, description,
                quantity, unit, unit_price_excl_tax, unit_price_incl_tax, tax_percentage,
                total_excl_tax, total_incl_tax, delivery_notes, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {LINE_ITEM_COLUMNS}
            "#
        ))
        .bind(line_item_id)
        .bind(input.order_id)
        .bind(input.organization_id)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(&input.unit)
        .bind(input.unit_price_excl_tax)
        .bind(amounts.unit_price_incl_tax)
        .bind(input.tax_percentage)
        .bind(amounts.total_excl_tax)
        .bind(amounts.total_incl_tax)
        .bind(&input.delivery_notes)
        .bind(input.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to add line item: {}", e)))?;

        timer.observe_duration();

        self.refresh_order_totals(input.organization_id, input.order_id)
            .await?;

        info!(line_item_id = %line_item.line_item_id, "Line item added");

        Ok(line_item)
    }

    /// Get line items for an order.
    #[instrument(skip(self), fields(organization_id = %organization_id, order_id = %order_id))]
    pub async fn get_line_items(
        &self,
        organization_id: Uuid,
        order_id: Uuid,
    ) -> Result<Vec<LineItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_line_items"])
            .start_timer();

        let line_items = sqlx::query_as::<_, LineItem>(&format!(
            r#"
            SELECT {LINE_ITEM_COLUMNS}
            FROM order_items
            WHERE organization_id = $1 AND order_id = $2
            ORDER BY sort_order, created_utc
            "#
        ))
        .bind(organization_id)
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get line items: {}", e)))?;

        timer.observe_duration();

        Ok(line_items)
    }

    /// Update a line item. Derived fields are recomputed from the merged
    /// source fields, then the order totals are refreshed.
    #[instrument(skip(self, input), fields(organization_id = %organization_id, line_item_id = %line_item_id))]
    pub async fn update_line_item(
        &self,
        organization_id: Uuid,
        order_id: Uuid,
        line_item_id: Uuid,
        input: &UpdateLineItem,
    ) -> Result<Option<LineItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_line_item"])
            .start_timer();

        let existing = sqlx::query_as::<_, LineItem>(&format!(
            r#"
            SELECT {LINE_ITEM_COLUMNS}
            FROM order_items
            WHERE organization_id = $1 AND order_id = $2 AND line_item_id = $3
            "#
        ))
        .bind(organization_id)
        .bind(order_id)
        .bind(line_item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get line item: {}", e)))?;

        let Some(existing) = existing else {
            timer.observe_duration();
            return Ok(None);
        };

        let quantity = input.quantity.unwrap_or(existing.quantity);
        let unit_price_excl_tax = input
            .unit_price_excl_tax
            .unwrap_or(existing.unit_price_excl_tax);
        let tax_percentage = input.tax_percentage.unwrap_or(existing.tax_percentage);
        let amounts = LineItemAmounts::compute(quantity, unit_price_excl_tax, tax_percentage);

        let line_item = sqlx::query_as::<_, LineItem>(&format!(
            r#"
            UPDATE order_items
            SET description = COALESCE($4, description),
                quantity = $5,
                unit = COALESCE($6, unit),
                unit_price_excl_tax = $7,
                unit_price_incl_tax = $8,
                tax_percentage = $9,
                total_excl_tax = $10,
                total_incl_tax = $11,
                delivery_notes = COALESCE($12, delivery_notes),
                sort_order = COALESCE($13, sort_order)
            WHERE organization_id = $1 AND order_id = $2 AND line_item_id = $3
            RETURNING {LINE_ITEM_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(order_id)
        .bind(line_item_id)
        .bind(&input.description)
        .bind(quantity)
        .bind(&input.unit)
        .bind(unit_price_excl_tax)
        .bind(amounts.unit_price_incl_tax)
        .bind(tax_percentage)
        .bind(amounts.total_excl_tax)
        .bind(amounts.total_incl_tax)
        .bind(&input.delivery_notes)
        .bind(input.sort_order)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update line item: {}", e))
        })?;

        timer.observe_duration();

        self.refresh_order_totals(organization_id, order_id).await?;

        Ok(line_item)
    }

    /// Delete a line item and refresh the order totals.
    #[instrument(skip(self), fields(organization_id = %organization_id, line_item_id = %line_item_id))]
    pub async fn delete_line_item(
        &self,
        organization_id: Uuid,
        order_id: Uuid,
        line_item_id: Uuid,
    ) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_line_item"])
            .start_timer();

        let result = sqlx::query(
            r#"
            DELETE FROM order_items
            WHERE organization_id = $1 AND order_id = $2 AND line_item_id = $3
            "#,
        )
        .bind(organization_id)
        .bind(order_id)
        .bind(line_item_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to delete line item: {}", e))
        })?;

        timer.observe_duration();

        if result.rows_affected() > 0 {
            self.refresh_order_totals(organization_id, order_id).await?;
            return Ok(true);
        }

        Ok(false)
    }

    /// Recompute and persist the order totals from the full current item
    /// set. Runs after every item insert, update, or delete.
    #[instrument(skip(self), fields(organization_id = %organization_id, order_id = %order_id))]
    pub async fn refresh_order_totals(
        &self,
        organization_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderTotals, AppError> {
        let items = self.get_line_items(organization_id, order_id).await?;
        let totals = OrderTotals::from_items(&items);

        let timer = DB_QUERY_DURATION
            .with_label_values(&["refresh_order_totals"])
            .start_timer();

        sqlx::query(
            r#"
            UPDATE orders
            SET subtotal_excl_tax = $3,
                tax_total = $4,
                total_incl_tax = $5
            WHERE organization_id = $1 AND order_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(order_id)
        .bind(totals.subtotal_excl_tax)
        .bind(totals.tax_total)
        .bind(totals.total_incl_tax)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to refresh order totals: {}", e))
        })?;

        timer.observe_duration();

        Ok(totals)
    }
}
