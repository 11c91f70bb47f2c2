use crate::db::models::{
    DbModel3DSummary, DbScreenshot, DbSkyboxSummary, NewModel3D, NewScreenshot, NewSkybox,
    RecordRef, Resolved,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::TxirimiriError;
use backon::{ExponentialBuilder, Retryable};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Error as SqlxError, Pool, Sqlite, SqliteConnection};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub type SqlitePool = Pool<Sqlite>;

/// Open (creating if needed) the SQLite database with foreign keys enforced.
pub async fn connect(database_url: &str) -> Result<SqlitePool, TxirimiriError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    Ok(pool)
}

fn contention_retry_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(20))
        .with_max_delay(Duration::from_millis(500))
        .with_max_times(5)
        .with_jitter()
}

/// Busy/locked database or a lost get-or-create race; safe to replay the whole transaction.
fn is_contention(err: &SqlxError) -> bool {
    let SqlxError::Database(db_err) = err else {
        return false;
    };
    if db_err.is_unique_violation() {
        return true;
    }
    // extended result codes keep the primary code in the low byte: 5 = BUSY, 6 = LOCKED
    db_err
        .code()
        .and_then(|c| c.parse::<i32>().ok())
        .is_some_and(|c| matches!(c & 0xff, 5 | 6))
}

/// Result of a screenshot save, with how each catalog reference was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedScreenshot {
    pub id: i64,
    pub model3d: Resolved,
    pub skybox: Option<Resolved>,
}

#[derive(Clone)]
pub struct ViewerStorage {
    pool: SqlitePool,
}

impl ViewerStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), TxirimiriError> {
        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Persist a screenshot, resolving its model and optional skybox by record name.
    /// The transaction is replayed on contention.
    pub async fn save_screenshot(
        &self,
        new: &NewScreenshot,
    ) -> Result<SavedScreenshot, TxirimiriError> {
        let saved = (|| async move { self.save_screenshot_once(new).await })
            .retry(contention_retry_policy())
            .when(is_contention)
            .notify(|err: &SqlxError, dur: Duration| {
                warn!(
                    error = %err,
                    retry_in_ms = dur.as_millis() as u64,
                    "screenshot save hit contention; retrying"
                );
            })
            .await?;
        Ok(saved)
    }

    async fn save_screenshot_once(&self, new: &NewScreenshot) -> Result<SavedScreenshot, SqlxError> {
        let mut tx = self.pool.begin().await?;

        let model3d = resolve_record(&mut tx, "model3d", &new.model3d).await?;
        let skybox = match &new.skybox {
            Some(r) => Some(resolve_record(&mut tx, "skybox", r).await?),
            None => None,
        };

        let t = &new.transform;
        let id = sqlx::query(
            r#"
            INSERT INTO screenshot (
                model3d_id, skybox_id, model_scale, yaw_angle,
                camera_position_x, camera_position_y, camera_position_z,
                camera_target_x, camera_target_y, camera_target_z, image
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(model3d.id)
        .bind(skybox.map(|s| s.id))
        .bind(t.model_scale)
        .bind(t.yaw_angle)
        .bind(t.camera_position_x)
        .bind(t.camera_position_y)
        .bind(t.camera_position_z)
        .bind(t.camera_target_x)
        .bind(t.camera_target_y)
        .bind(t.camera_target_z)
        .bind(new.image.as_slice())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        Ok(SavedScreenshot {
            id,
            model3d,
            skybox,
        })
    }

    /// Screenshots of the model with this record name, oldest first.
    /// An unknown record name yields an empty list.
    pub async fn list_screenshots(
        &self,
        model3d_record_name: &str,
    ) -> Result<Vec<DbScreenshot>, TxirimiriError> {
        let rows = sqlx::query_as::<_, DbScreenshot>(
            r#"SELECT s.id, k.record_name AS skybox_record_name,
               s.model_scale, s.yaw_angle,
               s.camera_position_x, s.camera_position_y, s.camera_position_z,
               s.camera_target_x, s.camera_target_y, s.camera_target_z,
               s.image
               FROM screenshot s
               JOIN model3d m ON m.id = s.model3d_id
               LEFT JOIN skybox k ON k.id = s.skybox_id
               WHERE m.record_name = ?
               ORDER BY s.id"#,
        )
        .bind(model3d_record_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Returns false when no screenshot has this id.
    pub async fn delete_screenshot(&self, id: i64) -> Result<bool, TxirimiriError> {
        let res = sqlx::query("DELETE FROM screenshot WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Upsert by unique record_name. Blobs left as `None` keep their stored value.
    pub async fn upsert_model3d(&self, m: NewModel3D) -> Result<i64, TxirimiriError> {
        sqlx::query(
            r#"
            INSERT INTO model3d (
                record_name, name, description, extension, alt_extension,
                thumbnail, model, alt_model
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(record_name) DO UPDATE SET
                name=excluded.name,
                description=excluded.description,
                extension=excluded.extension,
                alt_extension=excluded.alt_extension,
                thumbnail=COALESCE(excluded.thumbnail, model3d.thumbnail),
                model=COALESCE(excluded.model, model3d.model),
                alt_model=COALESCE(excluded.alt_model, model3d.alt_model)
            "#,
        )
        .bind(&m.record_name)
        .bind(m.name)
        .bind(m.description)
        .bind(m.extension)
        .bind(m.alt_extension)
        .bind(m.thumbnail)
        .bind(m.model)
        .bind(m.alt_model)
        .execute(&self.pool)
        .await?;

        let rec: (i64,) = sqlx::query_as("SELECT id FROM model3d WHERE record_name = ?")
            .bind(m.record_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Upsert by unique record_name. A `None` image keeps the stored one.
    pub async fn upsert_skybox(&self, s: NewSkybox) -> Result<i64, TxirimiriError> {
        sqlx::query(
            r#"
            INSERT INTO skybox (
                record_name, name, extension, height, exposure,
                shadow_intensity, shadow_softness, image
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(record_name) DO UPDATE SET
                name=excluded.name,
                extension=excluded.extension,
                height=excluded.height,
                exposure=excluded.exposure,
                shadow_intensity=excluded.shadow_intensity,
                shadow_softness=excluded.shadow_softness,
                image=COALESCE(excluded.image, skybox.image)
            "#,
        )
        .bind(&s.record_name)
        .bind(s.name)
        .bind(s.extension)
        .bind(s.height)
        .bind(s.exposure)
        .bind(s.shadow_intensity)
        .bind(s.shadow_softness)
        .bind(s.image)
        .execute(&self.pool)
        .await?;

        let rec: (i64,) = sqlx::query_as("SELECT id FROM skybox WHERE record_name = ?")
            .bind(s.record_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    pub async fn list_models(&self) -> Result<Vec<DbModel3DSummary>, TxirimiriError> {
        let rows = sqlx::query_as::<_, DbModel3DSummary>(
            r#"SELECT m.id, m.record_name, m.name, m.description, m.extension, m.alt_extension,
               m.thumbnail IS NOT NULL AS has_thumbnail,
               m.model IS NOT NULL AS has_model,
               m.alt_model IS NOT NULL AS has_alt_model,
               (SELECT COUNT(*) FROM screenshot s WHERE s.model3d_id = m.id) AS screenshot_count
               FROM model3d m
               ORDER BY m.name, m.id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_skyboxes(&self) -> Result<Vec<DbSkyboxSummary>, TxirimiriError> {
        let rows = sqlx::query_as::<_, DbSkyboxSummary>(
            r#"SELECT k.id, k.record_name, k.name, k.extension,
               k.height, k.exposure, k.shadow_intensity, k.shadow_softness,
               k.image IS NOT NULL AS has_image,
               (SELECT COUNT(*) FROM screenshot s WHERE s.skybox_id = k.id) AS screenshot_count
               FROM skybox k
               ORDER BY k.name, k.id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Deletes the model and, through the foreign key, all of its screenshots.
    pub async fn delete_model3d(&self, record_name: &str) -> Result<bool, TxirimiriError> {
        let res = sqlx::query("DELETE FROM model3d WHERE record_name = ?")
            .bind(record_name)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Deletes the skybox; screenshots referencing it keep living with a null skybox.
    pub async fn delete_skybox(&self, record_name: &str) -> Result<bool, TxirimiriError> {
        let res = sqlx::query("DELETE FROM skybox WHERE record_name = ?")
            .bind(record_name)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

/// Idempotent get-or-create on `table` by record name; never touches an existing row.
async fn resolve_record(
    conn: &mut SqliteConnection,
    table: &'static str,
    record: &RecordRef,
) -> Result<Resolved, SqlxError> {
    let insert = format!(
        "INSERT INTO {table} (record_name, name) VALUES (?, ?) ON CONFLICT(record_name) DO NOTHING"
    );
    let created = sqlx::query(&insert)
        .bind(&record.record_name)
        .bind(record.display_name())
        .execute(&mut *conn)
        .await?
        .rows_affected()
        > 0;

    let select = format!("SELECT id FROM {table} WHERE record_name = ?");
    let rec: (i64,) = sqlx::query_as(&select)
        .bind(&record.record_name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(Resolved {
        id: rec.0,
        created,
    })
}
