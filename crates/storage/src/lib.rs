use std::{str::FromStr, time::Duration};

use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use thiserror::Error;

use personnel_core::{Employee, EmployeeId};

const EMPLOYEE_COLUMNS: &str = "id, name, position, salary, email";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    ///
    /// Every pooled connection is opened with foreign keys on, WAL journaling,
    /// `synchronous = NORMAL` and a five second busy timeout.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Connect)?
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle to the employee record store.
    pub fn employees(&self) -> EmployeeRepository {
        EmployeeRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
    #[error("employee {0} does not exist")]
    MissingRecord(EmployeeId),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Record store for employees. Identity assignment happens here.
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Lists every employee ordered by id.
    pub async fn find_all(&self) -> Result<Vec<Employee>, StorageError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EmployeeRow::into_domain).collect())
    }

    pub async fn find_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, StorageError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(EmployeeRow::into_domain))
    }

    /// Persists the record and returns it as stored.
    ///
    /// Records without an id are inserted and receive a fresh one. Records
    /// with an id overwrite that row; if it no longer exists nothing is
    /// written and [`StorageError::MissingRecord`] is returned.
    pub async fn save(&self, employee: &Employee) -> Result<Employee, StorageError> {
        let row = match employee.id {
            None => {
                sqlx::query_as::<_, EmployeeRow>(&format!(
                    "INSERT INTO employees (name, position, salary, email) \
                     VALUES (?, ?, ?, ?) \
                     RETURNING {EMPLOYEE_COLUMNS}"
                ))
                .bind(&employee.name)
                .bind(&employee.position)
                .bind(employee.salary)
                .bind(&employee.email)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => sqlx::query_as::<_, EmployeeRow>(&format!(
                "UPDATE employees \
                 SET name = ?, position = ?, salary = ?, email = ? \
                 WHERE id = ? \
                 RETURNING {EMPLOYEE_COLUMNS}"
            ))
            .bind(&employee.name)
            .bind(&employee.position)
            .bind(employee.salary)
            .bind(&employee.email)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::MissingRecord(id))?,
        };

        Ok(row.into_domain())
    }

    /// Removes the employee, returning `false` when no row matched.
    pub async fn delete_by_id(&self, id: EmployeeId) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Raw `employees` row.
#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: i64,
    name: String,
    position: Option<String>,
    salary: f64,
    email: Option<String>,
}

impl EmployeeRow {
    fn into_domain(self) -> Employee {
        Employee {
            id: Some(self.id),
            name: self.name,
            position: self.position,
            salary: self.salary,
            email: self.email,
        }
    }
}
