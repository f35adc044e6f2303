//! SQLite-backed episode catalog implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use super::{parse_stored_date, CatalogError, Episode, EpisodeCatalog};

const EPISODE_COLUMNS: &str = "season, episode, title, url, description, imageUrl, date";

/// SQLite-backed episode catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open (or create) the catalog file and its schema.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS southpark (
                season INTEGER NOT NULL,
                episode INTEGER NOT NULL,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                description TEXT NOT NULL,
                imageUrl TEXT NOT NULL,
                date TEXT NOT NULL,
                PRIMARY KEY (season, episode)
            );

            CREATE INDEX IF NOT EXISTS idx_southpark_url ON southpark (url);
            "#,
        )?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Internal("catalog connection lock poisoned".to_string()))
    }

    fn row_to_episode(row: &rusqlite::Row) -> rusqlite::Result<Episode> {
        let date_str: String = row.get(6)?;
        let date = parse_stored_date(&date_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

        Ok(Episode {
            season: row.get(0)?,
            episode: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            description: row.get(4)?,
            image_url: row.get(5)?,
            date,
        })
    }

    fn query_episodes(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Episode>, CatalogError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_episode)?;

        let mut episodes = Vec::new();
        for row in rows {
            episodes.push(row.map_err(map_row_error)?);
        }
        Ok(episodes)
    }
}

/// Stored rows that fail to decode are corrupt data, not engine failures.
fn map_row_error(e: rusqlite::Error) -> CatalogError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(_, _, inner) => {
            CatalogError::Internal(format!("corrupt catalog row: {}", inner))
        }
        other => CatalogError::Database(other.to_string()),
    }
}

impl EpisodeCatalog for SqliteCatalog {
    fn insert(&self, episode: &Episode) -> Result<(), CatalogError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO southpark (season, episode, title, url, description, imageUrl, date)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                episode.season,
                episode.episode,
                &episode.title,
                &episode.url,
                &episode.description,
                &episode.image_url,
                episode.stored_date(),
            ],
        )?;
        Ok(())
    }

    fn visited(&self, url: &str) -> Result<bool, CatalogError> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM southpark WHERE url = ? LIMIT 1",
                params![url],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn last(&self) -> Result<String, CatalogError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT url FROM southpark ORDER BY season DESC, episode DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                CatalogError::NotFound("catalog is empty".to_string())
            }
            _ => CatalogError::Database(e.to_string()),
        })
    }

    fn by_season(&self, season: u32) -> Result<Vec<Episode>, CatalogError> {
        let conn = self.conn()?;
        let episodes = Self::query_episodes(
            &conn,
            &format!(
                "SELECT {} FROM southpark WHERE season = ? ORDER BY episode",
                EPISODE_COLUMNS
            ),
            params![season],
        )?;

        if episodes.is_empty() {
            return Err(CatalogError::NotFound(format!("season {}", season)));
        }
        Ok(episodes)
    }

    fn by_episode(&self, season: u32, episode: u32) -> Result<Episode, CatalogError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM southpark WHERE season = ? AND episode = ?",
                EPISODE_COLUMNS
            ),
            params![season, episode],
            Self::row_to_episode,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                CatalogError::NotFound(format!("season {} episode {}", season, episode))
            }
            other => map_row_error(other),
        })
    }

    fn all(&self) -> Result<Vec<Episode>, CatalogError> {
        let conn = self.conn()?;
        let episodes = Self::query_episodes(
            &conn,
            &format!(
                "SELECT {} FROM southpark ORDER BY season, episode",
                EPISODE_COLUMNS
            ),
            [],
        )?;

        if episodes.is_empty() {
            return Err(CatalogError::NotFound("catalog is empty".to_string()));
        }
        Ok(episodes)
    }

    fn count(&self) -> Result<u64, CatalogError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM southpark", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
