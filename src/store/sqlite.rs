//! SQLite-backed store
//!
//! Manages `~/.habitual/habits.db` with automatic schema migration.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{AchievementStore, CompletionStore, HabitStore, StoreError, StoreResult, UserStore};
use crate::domain::{
    Achievement, Category, Habit, HabitCompletion, HabitId, Importance, KpiType, NewAchievement,
    User, UserId, UserUpdate,
};
use crate::gamification::BadgeType;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Local database implementing every store trait
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!(
                    "Failed to create database dir {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path)?;

        // WAL so the CLI can read while another process writes
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Self::with_connection(conn)
    }

    /// Fresh private database, gone when dropped
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("database lock poisoned".to_string()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()
    }

    /// Run any pending migrations
    fn run_migrations(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: weekly target columns on habits
        if version < 2 {
            let has_kpi_type: bool = conn
                .prepare("SELECT COUNT(*) FROM pragma_table_info('habits') WHERE name = 'kpi_type'")
                .and_then(|mut s| s.query_row([], |r| r.get::<_, i32>(0)))
                .map(|c| c > 0)
                .unwrap_or(false);

            if !has_kpi_type {
                conn.execute_batch(
                    r#"
                    ALTER TABLE habits ADD COLUMN times_per_week INTEGER;
                    ALTER TABLE habits ADD COLUMN importance TEXT;
                    ALTER TABLE habits ADD COLUMN kpi_type TEXT;
                    "#,
                )?;
            }
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        // Migration 3: one badge per user
        if version < 3 {
            conn.execute_batch(
                r#"
                DELETE FROM achievements WHERE rowid NOT IN (
                    SELECT MIN(rowid) FROM achievements GROUP BY user_id, badge_type
                );
                CREATE UNIQUE INDEX IF NOT EXISTS idx_achievement_user_badge
                    ON achievements(user_id, badge_type);
                "#,
            )?;
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (3)", [])?;
        }

        Ok(())
    }

    /// Return the user, creating a fresh row if it does not exist yet
    pub fn ensure_user(&self, user_id: &UserId, display_name: Option<&str>) -> StoreResult<User> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO users (id, display_name, created_at) VALUES (?1, ?2, ?3)",
            params![user_id.as_str(), display_name, Utc::now().to_rfc3339()],
        )?;
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            [user_id.as_str()],
            user_from_row,
        )
        .map_err(StoreError::from)
    }

    /// Delete all gamification progress for a user (XP, streaks, badges)
    pub fn reset_progress(&self, user_id: &UserId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE users SET total_xp = 0, current_level = 1, current_streak = 0, longest_streak = 0 WHERE id = ?1",
            [user_id.as_str()],
        )?;
        conn.execute("DELETE FROM achievements WHERE user_id = ?1", [user_id.as_str()])?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn get_user(&self, user_id: &UserId) -> StoreResult<Option<User>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            [user_id.as_str()],
            user_from_row,
        )
        .optional()
        .map_err(StoreError::from)
    }

    async fn update_user(&self, user_id: &UserId, update: &UserUpdate) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            UPDATE users SET
                display_name = COALESCE(?2, display_name),
                total_xp = COALESCE(?3, total_xp),
                current_level = COALESCE(?4, current_level),
                current_streak = COALESCE(?5, current_streak),
                longest_streak = COALESCE(?6, longest_streak)
            WHERE id = ?1
            "#,
            params![
                user_id.as_str(),
                update.display_name,
                update.total_xp.map(to_sql_int),
                update.current_level,
                update.current_streak,
                update.longest_streak,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl CompletionStore for SqliteStore {
    async fn get_completions_for_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> StoreResult<Vec<HabitCompletion>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habit_completions WHERE user_id = ?1 AND completion_date = ?2",
            COMPLETION_COLUMNS
        ))?;
        let rows = stmt
            .query_map(
                params![user_id.as_str(), date.format(DATE_FORMAT).to_string()],
                completion_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn upsert_completion(&self, completion: &HabitCompletion) -> StoreResult<HabitCompletion> {
        let date = completion.completion_date.format(DATE_FORMAT).to_string();
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO habit_completions
                (id, habit_id, user_id, completion_date, completed, actual_minutes, note, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(habit_id, completion_date) DO UPDATE SET
                completed = excluded.completed,
                actual_minutes = excluded.actual_minutes,
                note = excluded.note,
                completed_at = excluded.completed_at
            "#,
            params![
                completion.id,
                completion.habit_id.as_str(),
                completion.user_id.as_str(),
                date,
                completion.completed as i32,
                completion.actual_minutes,
                completion.note,
                completion.completed_at.map(|t| t.to_rfc3339()),
            ],
        )?;

        conn.query_row(
            &format!(
                "SELECT {} FROM habit_completions WHERE habit_id = ?1 AND completion_date = ?2",
                COMPLETION_COLUMNS
            ),
            params![completion.habit_id.as_str(), date],
            completion_from_row,
        )
        .map_err(StoreError::from)
    }

    async fn get_completion_history(&self, user_id: &UserId) -> StoreResult<Vec<HabitCompletion>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habit_completions WHERE user_id = ?1 ORDER BY completion_date",
            COMPLETION_COLUMNS
        ))?;
        let rows = stmt
            .query_map([user_id.as_str()], completion_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[async_trait]
impl AchievementStore for SqliteStore {
    async fn get_achievements(&self, user_id: &UserId) -> StoreResult<Vec<Achievement>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, badge_type, earned_at FROM achievements
             WHERE user_id = ?1 ORDER BY earned_at DESC",
        )?;
        let rows = stmt
            .query_map([user_id.as_str()], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    parse_timestamp(3, &r.get::<_, String>(3)?)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let achievements = rows
            .into_iter()
            .filter_map(|(id, user, badge, earned_at)| match BadgeType::parse(&badge) {
                Some(badge_type) => Some(Achievement {
                    id,
                    user_id: UserId(user),
                    badge_type,
                    earned_at,
                }),
                None => {
                    tracing::debug!("Skipping unknown badge type '{}'", badge);
                    None
                }
            })
            .collect();
        Ok(achievements)
    }

    async fn create_achievement(
        &self,
        achievement: &NewAchievement,
    ) -> StoreResult<(Achievement, bool)> {
        let created = achievement.clone().into_achievement();
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO achievements (id, user_id, badge_type, earned_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                created.id,
                created.user_id.as_str(),
                created.badge_type.as_str(),
                created.earned_at.to_rfc3339(),
            ],
        )? == 1;

        // Either our row or the one that was already there
        let stored = conn.query_row(
            "SELECT id, earned_at FROM achievements WHERE user_id = ?1 AND badge_type = ?2",
            params![created.user_id.as_str(), created.badge_type.as_str()],
            |r| {
                Ok(Achievement {
                    id: r.get(0)?,
                    earned_at: parse_timestamp(1, &r.get::<_, String>(1)?)?,
                    ..created.clone()
                })
            },
        )?;
        Ok((stored, inserted))
    }
}

#[async_trait]
impl HabitStore for SqliteStore {
    async fn get_habits(&self, user_id: &UserId) -> StoreResult<Vec<Habit>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habits WHERE user_id = ?1 ORDER BY order_index, created_at",
            HABIT_COLUMNS
        ))?;
        let rows = stmt
            .query_map([user_id.as_str()], habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn create_habit(&self, habit: &Habit) -> StoreResult<Habit> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO habits ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                HABIT_COLUMNS
            ),
            params![
                habit.id.as_str(),
                habit.user_id.as_str(),
                habit.name,
                habit.emoji,
                habit.category.to_legacy(),
                habit.estimated_minutes,
                habit.order_index,
                habit.is_archived as i32,
                habit.times_per_week,
                habit.importance.map(|i| i.as_str()),
                habit.kpi_type.map(|k| k.as_str()),
                habit.created_at.to_rfc3339(),
            ],
        )?;
        Ok(habit.clone())
    }
}

const USER_COLUMNS: &str =
    "id, display_name, created_at, total_xp, current_level, current_streak, longest_streak";

const COMPLETION_COLUMNS: &str =
    "id, habit_id, user_id, completion_date, completed, actual_minutes, note, completed_at";

const HABIT_COLUMNS: &str = "id, user_id, name, emoji, category, estimated_minutes, order_index, \
     is_archived, times_per_week, importance, kpi_type, created_at";

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn parse_date(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| conversion_error(idx, format!("bad date '{}': {}", value, e)))
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, format!("bad timestamp '{}': {}", value, e)))
}

fn user_from_row(r: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(r.get(0)?),
        display_name: r.get(1)?,
        created_at: parse_timestamp(2, &r.get::<_, String>(2)?)?,
        total_xp: r.get::<_, i64>(3)?.max(0) as u64,
        current_level: r.get(4)?,
        current_streak: r.get(5)?,
        longest_streak: r.get(6)?,
    })
}

fn completion_from_row(r: &Row<'_>) -> rusqlite::Result<HabitCompletion> {
    let completed_at = r
        .get::<_, Option<String>>(7)?
        .map(|t| parse_timestamp(7, &t))
        .transpose()?;
    Ok(HabitCompletion {
        id: r.get(0)?,
        habit_id: HabitId(r.get(1)?),
        user_id: UserId(r.get(2)?),
        completion_date: parse_date(3, &r.get::<_, String>(3)?)?,
        completed: r.get::<_, i32>(4)? != 0,
        actual_minutes: r.get(5)?,
        note: r.get(6)?,
        completed_at,
    })
}

fn habit_from_row(r: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: HabitId(r.get(0)?),
        user_id: UserId(r.get(1)?),
        name: r.get(2)?,
        emoji: r.get(3)?,
        category: Category::parse_legacy(&r.get::<_, String>(4)?),
        estimated_minutes: r.get(5)?,
        order_index: r.get(6)?,
        is_archived: r.get::<_, i32>(7)? != 0,
        times_per_week: r.get(8)?,
        importance: r.get::<_, Option<String>>(9)?.as_deref().and_then(Importance::parse),
        kpi_type: r.get::<_, Option<String>>(10)?.as_deref().and_then(KpiType::parse),
        created_at: parse_timestamp(11, &r.get::<_, String>(11)?)?,
    })
}

/// Base schema (version 1)
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
INSERT OR IGNORE INTO schema_version VALUES (1);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    display_name TEXT,
    created_at TEXT NOT NULL,
    total_xp INTEGER NOT NULL DEFAULT 0,
    current_level INTEGER NOT NULL DEFAULT 1,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS habits (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    emoji TEXT NOT NULL,
    category TEXT NOT NULL,           -- packed "emoji name|color:N" form
    estimated_minutes INTEGER NOT NULL DEFAULT 5,
    order_index INTEGER NOT NULL DEFAULT 0,
    is_archived INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_habit_user ON habits(user_id);

CREATE TABLE IF NOT EXISTS habit_completions (
    id TEXT PRIMARY KEY,
    habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    completion_date TEXT NOT NULL,    -- YYYY-MM-DD
    completed INTEGER NOT NULL DEFAULT 0,
    actual_minutes INTEGER,
    note TEXT,
    completed_at TEXT,
    UNIQUE(habit_id, completion_date)
);
CREATE INDEX IF NOT EXISTS idx_completion_user_date ON habit_completions(user_id, completion_date);

CREATE TABLE IF NOT EXISTS achievements (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    badge_type TEXT NOT NULL,
    earned_at TEXT NOT NULL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    async fn seeded() -> (SqliteStore, UserId, Habit) {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = UserId::new("local");
        store.ensure_user(&user, Some("Local")).unwrap();
        let habit = Habit::new(user.clone(), "Stretching", Category::parse_legacy("💪 Workout|color:5"));
        store.create_habit(&habit).await.unwrap();
        (store, user, habit)
    }

    #[tokio::test]
    async fn test_ensure_user_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = UserId::new("u1");
        let first = store.ensure_user(&id, Some("First")).unwrap();
        let second = store.ensure_user(&id, Some("Second")).unwrap();

        assert_eq!(first.display_name.as_deref(), Some("First"));
        assert_eq!(second.display_name.as_deref(), Some("First"));
        assert_eq!(second.current_level, 1);
    }

    #[tokio::test]
    async fn test_update_user_writes_only_given_fields() {
        let (store, user, _) = seeded().await;
        store.update_user(&user, &UserUpdate::xp(250, 2)).await.unwrap();
        store.update_user(&user, &UserUpdate::streak(3, 5)).await.unwrap();

        let loaded = store.get_user(&user).await.unwrap().unwrap();
        assert_eq!(loaded.total_xp, 250);
        assert_eq!(loaded.current_level, 2);
        assert_eq!(loaded.current_streak, 3);
        assert_eq!(loaded.longest_streak, 5);
        assert_eq!(loaded.display_name.as_deref(), Some("Local"));
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .update_user(&UserId::new("ghost"), &UserUpdate::xp(1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_completion_upsert_keeps_one_row_per_slot() {
        let (store, user, habit) = seeded().await;

        let mut done = HabitCompletion::new(user.clone(), habit.id.clone(), day(3));
        done.completed = true;
        done.completed_at = Some(Utc::now());
        let first = store.upsert_completion(&done).await.unwrap();

        let undone = HabitCompletion::new(user.clone(), habit.id.clone(), day(3));
        let second = store.upsert_completion(&undone).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(!second.completed);
        assert!(second.completed_at.is_none());

        let rows = store.get_completions_for_date(&user, day(3)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(store.get_completions_for_date(&user, day(4)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_ordered_by_date() {
        let (store, user, habit) = seeded().await;
        for d in [5, 2, 9] {
            let c = HabitCompletion::new(user.clone(), habit.id.clone(), day(d));
            store.upsert_completion(&c).await.unwrap();
        }

        let dates: Vec<_> = store
            .get_completion_history(&user)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.completion_date)
            .collect();
        assert_eq!(dates, vec![day(2), day(5), day(9)]);
    }

    #[tokio::test]
    async fn test_achievement_unique_per_user_and_badge() {
        let (store, user, _) = seeded().await;
        let new = NewAchievement::new(user.clone(), BadgeType::FirstDay, Utc::now());

        let (a, inserted_a) = store.create_achievement(&new).await.unwrap();
        let (b, inserted_b) = store.create_achievement(&new).await.unwrap();

        assert_eq!(a.id, b.id);
        assert!(inserted_a);
        assert!(!inserted_b);
        let earned = store.get_achievements(&user).await.unwrap();
        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].badge_type, BadgeType::FirstDay);
    }

    #[tokio::test]
    async fn test_habit_category_roundtrips_through_packed_column() {
        let (store, user, habit) = seeded().await;
        let habits = store.get_habits(&user).await.unwrap();

        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].category, habit.category);
        assert_eq!(habits[0].kpi_type, Some(KpiType::Days));
        assert_eq!(habits[0].importance, Some(Importance::Medium));
    }

    #[tokio::test]
    async fn test_reopen_preserves_data_and_schema_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("habits.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.ensure_user(&UserId::new("u1"), None).unwrap();
            store
                .update_user(&UserId::new("u1"), &UserUpdate::xp(400, 3))
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let user = store.get_user(&UserId::new("u1")).await.unwrap().unwrap();
        assert_eq!(user.total_xp, 400);

        let version: i32 = store
            .conn()
            .unwrap()
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 3);
    }

    #[tokio::test]
    async fn test_reset_progress_clears_xp_and_badges() {
        let (store, user, _) = seeded().await;
        store.update_user(&user, &UserUpdate::xp(900, 4)).await.unwrap();
        store
            .create_achievement(&NewAchievement::new(user.clone(), BadgeType::Level10, Utc::now()))
            .await
            .unwrap();

        store.reset_progress(&user).unwrap();

        let loaded = store.get_user(&user).await.unwrap().unwrap();
        assert_eq!(loaded.total_xp, 0);
        assert_eq!(loaded.current_level, 1);
        assert!(store.get_achievements(&user).await.unwrap().is_empty());
    }
}
