//! Part repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `parts` storage.
//! - Serve as the SKU counter store queried at allocator bootstrap.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Part::validate()` before SQL mutations.
//! - Updates never touch `sku`.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::part::{Part, PartId, PartValidationError};
use crate::sku::{Sku, SkuCounterStore};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PART_SELECT_SQL: &str = "SELECT
    uuid,
    sku,
    name,
    description,
    quantity_on_hand,
    created_at,
    updated_at,
    is_deleted
FROM parts";

const PART_REQUIRED_COLUMNS: [&str; 8] = [
    "uuid",
    "sku",
    "name",
    "description",
    "quantity_on_hand",
    "created_at",
    "updated_at",
    "is_deleted",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for part persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PartValidationError),
    Db(DbError),
    NotFound(PartId),
    /// Another row already holds this SKU.
    DuplicateSku(Sku),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "part not found: {id}"),
            Self::DuplicateSku(sku) => write!(f, "sku already assigned: {sku}"),
            Self::InvalidData(message) => write!(f, "invalid persisted part data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PartValidationError> for RepoError {
    fn from(value: PartValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing parts.
#[derive(Debug, Clone, Default)]
pub struct PartListQuery {
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for part CRUD operations.
pub trait PartRepository {
    fn create_part(&self, part: &Part) -> RepoResult<PartId>;
    fn update_part(&self, part: &Part) -> RepoResult<()>;
    fn get_part(&self, id: PartId, include_deleted: bool) -> RepoResult<Option<Part>>;
    fn get_part_by_sku(&self, sku: &Sku) -> RepoResult<Option<Part>>;
    fn list_parts(&self, query: &PartListQuery) -> RepoResult<Vec<Part>>;
    fn soft_delete_part(&self, id: PartId) -> RepoResult<()>;
}

/// SQLite-backed part repository.
pub struct SqlitePartRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePartRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_part_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PartRepository for SqlitePartRepository<'_> {
    fn create_part(&self, part: &Part) -> RepoResult<PartId> {
        part.validate()?;

        let result = self.conn.execute(
            "INSERT INTO parts (
                uuid,
                sku,
                name,
                description,
                quantity_on_hand,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                part.id.to_string(),
                part.sku.as_str(),
                part.name.as_str(),
                part.description.as_deref(),
                part.quantity_on_hand,
                bool_to_int(part.is_deleted),
            ],
        );

        match result {
            Ok(_) => Ok(part.id),
            Err(err) if is_unique_violation(&err) => {
                Err(RepoError::DuplicateSku(part.sku.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update_part(&self, part: &Part) -> RepoResult<()> {
        part.validate()?;

        let changed = self.conn.execute(
            "UPDATE parts
             SET
                name = ?1,
                description = ?2,
                quantity_on_hand = ?3,
                is_deleted = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5;",
            params![
                part.name.as_str(),
                part.description.as_deref(),
                part.quantity_on_hand,
                bool_to_int(part.is_deleted),
                part.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(part.id));
        }

        Ok(())
    }

    fn get_part(&self, id: PartId, include_deleted: bool) -> RepoResult<Option<Part>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PART_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_part_row(row)?));
        }

        Ok(None)
    }

    fn get_part_by_sku(&self, sku: &Sku) -> RepoResult<Option<Part>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PART_SELECT_SQL}
             WHERE sku = ?1
               AND is_deleted = 0;"
        ))?;

        let mut rows = stmt.query([sku.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_part_row(row)?));
        }

        Ok(None)
    }

    fn list_parts(&self, query: &PartListQuery) -> RepoResult<Vec<Part>> {
        let mut sql = format!("{PART_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }

        // Length first keeps widened SKUs after the fixed-width ones.
        sql.push_str(" ORDER BY length(sku) ASC, sku ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut parts = Vec::new();

        while let Some(row) = rows.next()? {
            parts.push(parse_part_row(row)?);
        }

        Ok(parts)
    }

    fn soft_delete_part(&self, id: PartId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parts
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

impl SkuCounterStore for SqlitePartRepository<'_> {
    fn max_issued_sku(&self) -> RepoResult<Option<String>> {
        // Equivalent to MAX(sku) for fixed-width SKUs; the length key keeps
        // widened suffixes ordered numerically. Tombstoned rows are included.
        let mut stmt = self.conn.prepare(
            "SELECT sku
             FROM parts
             ORDER BY length(sku) DESC, sku DESC
             LIMIT 1;",
        )?;

        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get("sku")?));
        }

        Ok(None)
    }
}

fn parse_part_row(row: &Row<'_>) -> RepoResult<Part> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in parts.uuid"))
    })?;

    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in parts.is_deleted"
            )));
        }
    };

    let part = Part {
        id,
        sku: Sku::from_raw(row.get::<_, String>("sku")?),
        name: row.get("name")?,
        description: row.get("description")?,
        quantity_on_hand: row.get("quantity_on_hand")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        is_deleted,
    };
    part.validate()?;
    Ok(part)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == ErrorCode::ConstraintViolation
                && inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn ensure_part_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "parts")? {
        return Err(RepoError::MissingRequiredTable("parts"));
    }

    for column in PART_REQUIRED_COLUMNS {
        if !table_has_column(conn, "parts", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "parts",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
