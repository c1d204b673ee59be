//! Train and station reference data. Read-mostly; the insert helpers
//! exist for seeding and tests.

use chrono::NaiveTime;
use ferrova_core::models::{RouteStop, Station, Train};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::{parse_uuid, StoreError};

pub(crate) const TRAIN_COLUMNS: &str = "id, train_number, train_name, source_station, \
     destination_station, departure_time, arrival_time, total_seats, fare_cents";

// Internal struct for type-safe querying; ids are stored as TEXT.
#[derive(sqlx::FromRow)]
pub(crate) struct TrainRow {
    id: String,
    train_number: String,
    train_name: String,
    source_station: String,
    destination_station: String,
    departure_time: NaiveTime,
    arrival_time: NaiveTime,
    total_seats: i64,
    fare_cents: i64,
}

impl TrainRow {
    pub(crate) fn into_train(self) -> Result<Train, StoreError> {
        Ok(Train {
            id: parse_uuid(&self.id)?,
            train_number: self.train_number,
            name: self.train_name,
            source_station: self.source_station,
            destination_station: self.destination_station,
            departure: self.departure_time,
            arrival: self.arrival_time,
            total_seats: self.total_seats as u32,
            fare_cents: self.fare_cents,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StationRow {
    id: String,
    station_code: String,
    station_name: String,
    city: String,
}

impl StationRow {
    fn into_station(self) -> Result<Station, StoreError> {
        Ok(Station {
            id: parse_uuid(&self.id)?,
            code: self.station_code,
            name: self.station_name,
            city: self.city,
        })
    }
}

/// One stop of a train's route, joined with station display fields.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RouteStopDetail {
    pub station_code: String,
    pub station_name: String,
    pub city: String,
    pub sequence_number: i64,
}

/// A train whose route visits `source` before `destination`. Produced by
/// the naive connection query; no transfer planning.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrainConnection {
    pub train_number: String,
    pub train_name: String,
    pub source_code: String,
    pub source_name: String,
    pub destination_code: String,
    pub destination_name: String,
}

#[derive(Debug, Default, Clone)]
pub struct TrainSearch {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub limit: Option<u32>,
}

pub struct TrainCatalog {
    pool: SqlitePool,
}

impl TrainCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_train(&self, train: &Train) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO trains (id, train_number, train_name, source_station, destination_station, \
             departure_time, arrival_time, total_seats, fare_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(train.id.to_string())
        .bind(&train.train_number)
        .bind(&train.name)
        .bind(&train.source_station)
        .bind(&train.destination_station)
        .bind(train.departure)
        .bind(train.arrival)
        .bind(train.total_seats as i64)
        .bind(train.fare_cents)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_station(&self, station: &Station) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO stations (id, station_code, station_name, city) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(station.id.to_string())
        .bind(&station.code)
        .bind(&station.name)
        .bind(&station.city)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_route_stop(&self, stop: &RouteStop) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO routes (train_id, station_id, sequence_number) VALUES (?1, ?2, ?3)",
        )
        .bind(stop.train_id.to_string())
        .bind(stop.station_id.to_string())
        .bind(stop.sequence as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Substring filters over the display endpoints, ordered by departure.
    pub async fn search_trains(&self, filter: &TrainSearch) -> Result<Vec<Train>, StoreError> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {TRAIN_COLUMNS} FROM trains WHERE 1=1"));

        if let Some(source) = &filter.source {
            query.push(" AND source_station LIKE ");
            query.push_bind(format!("%{source}%"));
        }
        if let Some(destination) = &filter.destination {
            query.push(" AND destination_station LIKE ");
            query.push_bind(format!("%{destination}%"));
        }
        query.push(" ORDER BY departure_time ASC");
        if let Some(limit) = filter.limit {
            query.push(" LIMIT ");
            query.push_bind(limit as i64);
        }

        let rows: Vec<TrainRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(TrainRow::into_train).collect()
    }

    pub async fn train_by_id(&self, train_id: Uuid) -> Result<Option<Train>, StoreError> {
        train_on(&self.pool, train_id).await
    }

    pub async fn route_for_train(&self, train_id: Uuid) -> Result<Vec<RouteStopDetail>, StoreError> {
        let stops = sqlx::query_as::<_, RouteStopDetail>(
            "SELECT s.station_code, s.station_name, s.city, r.sequence_number \
             FROM routes r JOIN stations s ON r.station_id = s.id \
             WHERE r.train_id = ?1 ORDER BY r.sequence_number",
        )
        .bind(train_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(stops)
    }

    pub async fn list_stations(&self) -> Result<Vec<Station>, StoreError> {
        let rows = sqlx::query_as::<_, StationRow>(
            "SELECT id, station_code, station_name, city FROM stations ORDER BY station_name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(StationRow::into_station).collect()
    }

    /// Trains that stop at `source_code` before `destination_code`.
    pub async fn connections(
        &self,
        source_code: &str,
        destination_code: &str,
    ) -> Result<Vec<TrainConnection>, StoreError> {
        let rows = sqlx::query_as::<_, TrainConnection>(
            "SELECT DISTINCT t.train_number, t.train_name, \
                    s1.station_code AS source_code, s1.station_name AS source_name, \
                    s2.station_code AS destination_code, s2.station_name AS destination_name \
             FROM trains t \
             JOIN routes r1 ON t.id = r1.train_id \
             JOIN stations s1 ON r1.station_id = s1.id \
             JOIN routes r2 ON t.id = r2.train_id \
             JOIN stations s2 ON r2.station_id = s2.id \
             WHERE s1.station_code = ?1 AND s2.station_code = ?2 \
               AND r1.sequence_number < r2.sequence_number \
             LIMIT 10",
        )
        .bind(source_code)
        .bind(destination_code)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Train lookup usable both from the pool and from inside an open
/// transaction (the coordinator reads the train under its journey lock).
pub(crate) async fn train_on<'c, E>(executor: E, train_id: Uuid) -> Result<Option<Train>, StoreError>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let sql = format!("SELECT {TRAIN_COLUMNS} FROM trains WHERE id = ?1");
    let row: Option<TrainRow> = sqlx::query_as(&sql)
        .bind(train_id.to_string())
        .fetch_optional(executor)
        .await?;
    row.map(TrainRow::into_train).transpose()
}
