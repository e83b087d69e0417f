//! Ticket repository implementation
//!
//! PostgreSQL-backed storage for parking tickets. Every read joins the
//! `parking` table so the ticket carries the category of its spot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parkit_core::{
    models::{ParkingSpot, ParkingType, Ticket},
    traits::TicketRepository,
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of TicketRepository
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    /// Create a new ticket repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    #[instrument(skip(self, ticket), fields(vehicle = %ticket.vehicle_reg_number))]
    async fn save(&self, ticket: &Ticket) -> AppResult<Ticket> {
        debug!("Saving ticket for spot {}", ticket.parking_spot.id);

        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO ticket (parking_number, vehicle_reg_number, price, in_time, out_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(ticket.parking_spot.id)
        .bind(&ticket.vehicle_reg_number)
        .bind(ticket.price)
        .bind(ticket.in_time)
        .bind(ticket.out_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Error saving ticket in database: {}", e);
            AppError::Database(format!("Failed to save ticket: {}", e))
        })?;

        Ok(Ticket {
            id,
            ..ticket.clone()
        })
    }

    #[instrument(skip(self))]
    async fn find_open_by_registration(&self, vehicle_reg_number: &str) -> AppResult<Option<Ticket>> {
        debug!("Finding open ticket for vehicle: {}", vehicle_reg_number);

        let row = sqlx::query_as::<sqlx::Postgres, TicketRow>(
            r#"
            SELECT
                t.id, t.parking_number, p.type AS parking_type,
                t.vehicle_reg_number, t.price, t.in_time, t.out_time
            FROM ticket t
            JOIN parking p ON p.parking_number = t.parking_number
            WHERE t.vehicle_reg_number = $1 AND t.out_time IS NULL
            ORDER BY t.in_time DESC
            LIMIT 1
            "#,
        )
        .bind(vehicle_reg_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Error getting ticket from database: {}", e);
            AppError::Database(format!("Failed to find open ticket: {}", e))
        })?;

        row.map(Ticket::try_from).transpose()
    }

    #[instrument(skip(self, ticket), fields(ticket_id = ticket.id))]
    async fn update(&self, ticket: &Ticket) -> AppResult<bool> {
        let out_time = ticket.out_time.ok_or_else(|| {
            AppError::InvalidInput(format!("Ticket {} has no exit time", ticket.id))
        })?;

        let result = sqlx::query(
            r#"
            UPDATE ticket
            SET price = $1, out_time = $2
            WHERE id = $3 AND out_time IS NULL
            "#,
        )
        .bind(ticket.price)
        .bind(out_time)
        .bind(ticket.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Error updating ticket {}: {}", ticket.id, e);
            AppError::Database(format!("Failed to update ticket: {}", e))
        })?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn exists_open_for_spot(&self, spot_id: i32) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM ticket WHERE parking_number = $1 AND out_time IS NULL)",
        )
        .bind(spot_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Error checking open tickets for spot {}: {}", spot_id, e);
            AppError::Database(format!("Failed to check open tickets: {}", e))
        })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn count_by_registration(&self, vehicle_reg_number: &str) -> AppResult<i64> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ticket WHERE vehicle_reg_number = $1")
                .bind(vehicle_reg_number)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Error counting tickets for {}: {}", vehicle_reg_number, e);
                    AppError::Database(format!("Failed to count tickets: {}", e))
                })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn find_by_registration(&self, vehicle_reg_number: &str) -> AppResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<sqlx::Postgres, TicketRow>(
            r#"
            SELECT
                t.id, t.parking_number, p.type AS parking_type,
                t.vehicle_reg_number, t.price, t.in_time, t.out_time
            FROM ticket t
            JOIN parking p ON p.parking_number = t.parking_number
            WHERE t.vehicle_reg_number = $1
            ORDER BY t.in_time DESC, t.id DESC
            "#,
        )
        .bind(vehicle_reg_number)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Error listing tickets for {}: {}", vehicle_reg_number, e);
            AppError::Database(format!("Failed to list tickets: {}", e))
        })?;

        rows.into_iter().map(Ticket::try_from).collect()
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: i32,
    parking_number: i32,
    parking_type: String,
    vehicle_reg_number: String,
    price: Decimal,
    in_time: DateTime<Utc>,
    out_time: Option<DateTime<Utc>>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = AppError;

    fn try_from(row: TicketRow) -> AppResult<Self> {
        let parking_type = ParkingType::from_str(&row.parking_type).ok_or_else(|| {
            AppError::Database(format!("Unknown parking type in database: {}", row.parking_type))
        })?;

        Ok(Ticket {
            id: row.id,
            parking_spot: ParkingSpot::new(row.parking_number, parking_type, false),
            vehicle_reg_number: row.vehicle_reg_number,
            price: row.price,
            in_time: row.in_time,
            out_time: row.out_time,
        })
    }
}
