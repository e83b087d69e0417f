//! Parking spot repository implementation
//!
//! PostgreSQL-backed storage for the facility's spots. Availability lookups
//! always pick the lowest spot number first.

use async_trait::async_trait;
use parkit_core::{
    models::{ParkingSpot, ParkingType},
    traits::SpotRepository,
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument, warn};

/// PostgreSQL implementation of SpotRepository
pub struct PgSpotRepository {
    pool: PgPool,
}

impl PgSpotRepository {
    /// Create a new spot repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse parking type stored as upper-case text
    fn parse_type(s: &str) -> AppResult<ParkingType> {
        ParkingType::from_str(s)
            .ok_or_else(|| AppError::Database(format!("Unknown parking type in database: {}", s)))
    }
}

#[async_trait]
impl SpotRepository for PgSpotRepository {
    #[instrument(skip(self))]
    async fn find_next_available(&self, parking_type: ParkingType) -> AppResult<Option<i32>> {
        debug!("Finding next available {} spot", parking_type);

        let result: (Option<i32>,) = sqlx::query_as(
            r#"
            SELECT MIN(parking_number)
            FROM parking
            WHERE available = TRUE AND type = $1
            "#,
        )
        .bind(parking_type.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Error fetching next available slot: {}", e);
            AppError::Database(format!("Failed to fetch next available spot: {}", e))
        })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<ParkingSpot>> {
        debug!("Finding spot by number: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, SpotRow>(
            r#"
            SELECT parking_number, available, type AS parking_type
            FROM parking
            WHERE parking_number = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Error fetching parking spot {}: {}", id, e);
            AppError::Database(format!("Failed to find spot: {}", e))
        })?;

        row.map(ParkingSpot::try_from).transpose()
    }

    #[instrument(skip(self, spot), fields(spot_id = spot.id))]
    async fn update(&self, spot: &ParkingSpot) -> AppResult<bool> {
        debug!("Setting spot {} available={}", spot.id, spot.available);

        let result = sqlx::query(
            r#"
            UPDATE parking
            SET available = $1
            WHERE parking_number = $2
            "#,
        )
        .bind(spot.available)
        .bind(spot.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Error updating parking info for spot {}: {}", spot.id, e);
            AppError::Database(format!("Failed to update spot: {}", e))
        })?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn claim(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE parking
            SET available = FALSE
            WHERE parking_number = $1 AND available = TRUE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Error claiming spot {}: {}", id, e);
            AppError::Database(format!("Failed to claim spot: {}", e))
        })?;

        let claimed = result.rows_affected() == 1;
        if !claimed {
            warn!("Spot {} was already taken", id);
        }

        Ok(claimed)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> AppResult<Vec<ParkingSpot>> {
        let rows = sqlx::query_as::<sqlx::Postgres, SpotRow>(
            r#"
            SELECT parking_number, available, type AS parking_type
            FROM parking
            ORDER BY parking_number
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Error listing parking spots: {}", e);
            AppError::Database(format!("Failed to list spots: {}", e))
        })?;

        rows.into_iter().map(ParkingSpot::try_from).collect()
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct SpotRow {
    parking_number: i32,
    available: bool,
    parking_type: String,
}

impl TryFrom<SpotRow> for ParkingSpot {
    type Error = AppError;

    fn try_from(row: SpotRow) -> AppResult<Self> {
        Ok(ParkingSpot::new(
            row.parking_number,
            PgSpotRepository::parse_type(&row.parking_type)?,
            row.available,
        ))
    }
}
