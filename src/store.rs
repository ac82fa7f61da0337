use crate::models::{NewUser, User};
use crate::schema::users;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

pub type Pool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username is already taken")]
    UsernameTaken,
    #[error("connection pool: {0}")]
    Pool(#[from] r2d2::PoolError),
    #[error("query failed: {0}")]
    Query(#[from] DieselError),
    #[error("migration failed: {0}")]
    Migration(String),
}

pub trait CredentialStore: Send + Sync {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;

    /// Insert a user. The unique index on `username` is the final word on
    /// duplicates, so callers racing on the same name get `UsernameTaken`.
    fn create(&self, username: &str, password_digest: &str) -> Result<User, StoreError>;
}

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

pub struct DieselStore {
    pool: Pool,
}

impl DieselStore {
    /// Open the SQLite database at `database_url` and bring its schema up to date.
    pub fn connect(database_url: &str) -> Result<DieselStore, StoreError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .connection_customizer(Box::new(ConnectionOptions))
            .build(manager)?;

        let mut conn = pool.get()?;
        let conn: &mut SqliteConnection = &mut conn;
        conn.batch_execute("PRAGMA journal_mode = WAL;")?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        Ok(DieselStore { pool })
    }
}

impl CredentialStore for DieselStore {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get()?;
        let user = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get()?;
        let user = users::table
            .find(id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user)
    }

    fn create(&self, username: &str, password_digest: &str) -> Result<User, StoreError> {
        let mut conn = self.pool.get()?;
        let new_user = NewUser {
            username,
            password: password_digest,
        };

        diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    StoreError::UsernameTaken
                }
                e => StoreError::Query(e),
            })
    }
}
