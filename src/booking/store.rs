use {
    crate::{
        booking::{Appointment, AppointmentStatus, DATE_FORMAT, NewAppointment, TIME_FORMAT},
        config::{DF, PERSISTENCE},
    },
    anyhow::{Context, Result},
    async_trait::async_trait,
    chrono::{NaiveDate, NaiveTime},
    sqlx::{
        ConnectOptions, Pool, Row, Sqlite,
        sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
            SqliteSynchronous,
        },
    },
    std::{str::FromStr, time::Duration},
};

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn initialize(&self) -> Result<()>;
    async fn create(&self, new: NewAppointment) -> Result<Appointment>;
    async fn list(&self) -> Result<Vec<Appointment>>;
    /// Moves a pending appointment to `status`. False when the id is unknown
    /// or the appointment is no longer pending.
    async fn update_status(&self, id: i64, status: AppointmentStatus) -> Result<bool>;
    /// False when the id is unknown.
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqliteAppointmentStore {
    pool: Pool<Sqlite>,
}

impl SqliteAppointmentStore {
    pub async fn new(db_path: &str) -> Result<Self> {
        let cfg = &PERSISTENCE.bookings;
        let connection_options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(cfg.busy_timeout_secs))
            .synchronous(SqliteSynchronous::Normal)
            .log_slow_statements(log::LevelFilter::Warn, Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections)
            .connect_with(connection_options)
            .await
            .with_context(|| format!("Failed to open booking database {}", db_path))?;

        Ok(Self { pool })
    }

    /// Opens `db_path` and makes sure the schema exists.
    pub async fn open(db_path: &str) -> Result<Self> {
        let store = Self::new(db_path).await?;
        store.initialize().await?;
        Ok(store)
    }

    async fn status_of(&self, id: i64) -> Result<Option<AppointmentStatus>> {
        let row = sqlx::query("SELECT status FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| parse_status(&r.try_get::<String, _>("status")?))
            .transpose()
    }
}

fn parse_status(label: &str) -> Result<AppointmentStatus> {
    AppointmentStatus::from_str(label)
        .with_context(|| format!("Unknown appointment status '{}'", label))
}

fn appointment_from_row(row: &SqliteRow) -> Result<Appointment> {
    let date: String = row.try_get("date")?;
    let time: String = row.try_get("time")?;
    let status: String = row.try_get("status")?;

    Ok(Appointment {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .with_context(|| format!("Bad stored date '{}'", date))?,
        time: NaiveTime::parse_from_str(&time, TIME_FORMAT)
            .with_context(|| format!("Bad stored time '{}'", time))?,
        service: row.try_get("service")?,
        status: parse_status(&status)?,
    })
}

#[async_trait]
impl AppointmentStore for SqliteAppointmentStore {
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                service TEXT NOT NULL,
                status TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create(&self, new: NewAppointment) -> Result<Appointment> {
        new.validate()?;
        let status = AppointmentStatus::Pending;

        let result = sqlx::query(
            "INSERT INTO appointments (name, phone, date, time, service, status) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(&new.phone)
        .bind(new.date.format(DATE_FORMAT).to_string())
        .bind(new.time.format(TIME_FORMAT).to_string())
        .bind(&new.service)
        .bind(status.to_string())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        if DF.log_bookings {
            log::info!("Booked #{} for {} on {} {}", id, new.name, new.date, new.time);
        }

        Ok(Appointment {
            id,
            name: new.name,
            phone: new.phone,
            date: new.date,
            time: new.time,
            service: new.service,
            status,
        })
    }

    async fn list(&self) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(
            "SELECT id, name, phone, date, time, service, status FROM appointments ORDER BY date, time, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(appointment_from_row).collect()
    }

    async fn update_status(&self, id: i64, status: AppointmentStatus) -> Result<bool> {
        if status == AppointmentStatus::Pending {
            log::warn!("Appointment #{}: cannot move back to {}", id, status);
            return Ok(false);
        }

        let result = sqlx::query("UPDATE appointments SET status = ? WHERE id = ? AND status = ?")
            .bind(status.to_string())
            .bind(id)
            .bind(AppointmentStatus::Pending.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            if DF.log_bookings {
                log::info!("Appointment #{} -> {}", id, status);
            }
            return Ok(true);
        }

        if let Some(current) = self.status_of(id).await? {
            log::warn!(
                "Appointment #{} is {}, only pending appointments can change status",
                id,
                current
            );
        }
        Ok(false)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted && DF.log_bookings {
            log::info!("Deleted appointment #{}", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (tempfile::TempDir, SqliteAppointmentStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.sqlite");
        let store = SqliteAppointmentStore::open(path.to_str().unwrap()).await.unwrap();
        (dir, store)
    }

    fn request(name: &str, date: &str, time: &str) -> NewAppointment {
        NewAppointment::parse(name, "0555", date, time, "Aromaterapi").unwrap()
    }

    #[tokio::test]
    async fn ids_increase_and_list_is_chronological() {
        let (_dir, store) = temp_store().await;
        let late = store.create(request("B", "2024-06-02", "09:00")).await.unwrap();
        let early = store.create(request("A", "2024-06-01", "18:00")).await.unwrap();
        assert!(early.id > late.id);
        assert_eq!(early.status, AppointmentStatus::Pending);

        let all = store.list().await.unwrap();
        let names: Vec<&str> = all.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(all[0], early);
    }

    #[tokio::test]
    async fn status_changes_only_from_pending() {
        let (_dir, store) = temp_store().await;
        let a = store.create(request("A", "2024-06-01", "10:00")).await.unwrap();

        assert!(store.update_status(a.id, AppointmentStatus::Confirmed).await.unwrap());
        assert!(!store.update_status(a.id, AppointmentStatus::Cancelled).await.unwrap());
        assert!(!store.update_status(9999, AppointmentStatus::Confirmed).await.unwrap());

        let all = store.list().await.unwrap();
        assert_eq!(all[0].status, AppointmentStatus::Confirmed);
    }

    #[tokio::test]
    async fn pending_is_not_a_target_status() {
        let (_dir, store) = temp_store().await;
        let a = store.create(request("A", "2024-06-01", "10:00")).await.unwrap();

        assert!(!store.update_status(a.id, AppointmentStatus::Pending).await.unwrap());
        // Still pending, so it can be confirmed afterwards
        assert!(store.update_status(a.id, AppointmentStatus::Confirmed).await.unwrap());
    }

    #[tokio::test]
    async fn delete_reports_unknown_ids() {
        let (_dir, store) = temp_store().await;
        let a = store.create(request("A", "2024-06-01", "10:00")).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        assert!(!store.delete(a.id).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }
}
