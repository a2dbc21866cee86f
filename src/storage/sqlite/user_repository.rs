use crate::domain::User;
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::{is_unique_violation, parse_id, parse_time, time_to_sql, SqliteStorage};
use crate::storage::traits::UserRepository;

pub struct SqliteUserRepository {
    storage: SqliteStorage,
}

impl SqliteUserRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: parse_id(row, 0)?,
            created_at: parse_time(row, 1)?,
            updated_at: parse_time(row, 2)?,
            name: row.get(3)?,
        })
    }
}

impl UserRepository for SqliteUserRepository {
    fn create(&self, name: &str) -> GatorResult<User> {
        let user = User::new(name.to_string());
        let conn = self.storage.connection()?;

        let inserted = conn.execute(
            "INSERT INTO users (id, created_at, updated_at, name) VALUES (?1, ?2, ?3, ?4)",
            (
                user.id.to_string(),
                time_to_sql(&user.created_at),
                time_to_sql(&user.updated_at),
                &user.name,
            ),
        );

        match inserted {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e, "users.name") => {
                Err(GatorError::UserAlreadyExists(name.to_string()))
            }
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_by_name(&self, name: &str) -> GatorResult<Option<User>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, created_at, updated_at, name FROM users WHERE name = ?1",
        )?;

        match stmt.query_row([name], Self::map_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_all(&self) -> GatorResult<Vec<User>> {
        let conn = self.storage.connection()?;
        let mut stmt =
            conn.prepare("SELECT id, created_at, updated_at, name FROM users ORDER BY name")?;

        let users = stmt.query_map([], Self::map_row)?;
        users.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn delete_all(&self) -> GatorResult<usize> {
        let conn = self.storage.connection()?;
        Ok(conn.execute("DELETE FROM users", [])?)
    }
}
