//! Hub storage trait and SQLite implementation

use chrono::{DateTime, NaiveTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

use super::error::StoreError;
use super::migrations::Migrator;
use super::query::{
    HubStats, LeaderboardEntry, LeaderboardPage, LeaderboardQuery, EventTotals, PlatformCount,
    RuntimeTotals, ScoreAverages, MIN_EVALS_FOR_LEADERBOARD,
};
use super::types::{EventStamp, NewRuntime, RuntimeRecord, SubmitOptions, SubmitOutcome};
use crate::engine::score::round1;
use crate::engine::Engine;
use crate::state::RuntimeState;
use crate::types::{DomainMap, EventType, MaturityTier, ScoreEvent};

/// Column list shared by every runtime SELECT so row indices stay in one place.
const RUNTIME_COLUMNS: &str = "id, platform, model, thinking, display_name, owner_alias, \
     registered_at, is_active, quarantine, \
     tech_agent, ops_agent, judgment_agent, comms_agent, orch_agent, \
     tech_user, ops_user, judgment_user, comms_user, orch_user, \
     tech_streak, ops_streak, judgment_streak, comms_streak, orch_streak, \
     agent_score, user_score, team_score, eval_count, maturity_tier, \
     warmup_active, warmup_evals, last_event_at, events_today, events_today_date, \
     caps_usage, caps_date";

/// Hub storage operations.
pub trait HubStore: Send + Sync {
    /// Create a runtime with fresh default state.
    fn register_runtime(&self, new: &NewRuntime) -> Result<RuntimeRecord, StoreError>;

    /// Look a runtime up by id.
    fn runtime(&self, id: &str) -> Result<Option<RuntimeRecord>, StoreError>;

    /// Look a runtime up by API key digest.
    fn runtime_by_key_hash(&self, hash: &str) -> Result<Option<RuntimeRecord>, StoreError>;

    /// Score one event and persist both the audit row and the state change.
    ///
    /// Runs as a single critical section: dedup, rate limits, the
    /// reincidence lookup, the engine, and the write-back all happen under
    /// one lock so concurrent reports for the same runtime serialize.
    fn submit_event(
        &self,
        runtime_id: &str,
        event: &ScoreEvent,
        opts: &SubmitOptions,
    ) -> Result<SubmitOutcome, StoreError>;

    /// Ranked page of active, sufficiently evaluated runtimes.
    fn leaderboard(&self, query: &LeaderboardQuery) -> Result<LeaderboardPage, StoreError>;

    /// Aggregate hub metrics.
    fn stats(&self) -> Result<HubStats, StoreError>;

    /// The most recent stored event for a runtime.
    fn last_event(&self, runtime_id: &str) -> Result<Option<EventStamp>, StoreError>;

    /// Flag or unflag a runtime as quarantined.
    fn set_quarantine(&self, runtime_id: &str, quarantine: bool) -> Result<(), StoreError>;

    /// Mark a runtime active or inactive for leaderboard and stats purposes.
    fn set_active(&self, runtime_id: &str, active: bool) -> Result<(), StoreError>;
}

/// SQLite-backed hub store
pub struct SqliteHubStore {
    conn: Mutex<Connection>,
    engine: Engine,
}

impl SqliteHubStore {
    /// Open or create database at path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self {
            conn: Mutex::new(conn),
            engine: Engine::new(),
        };
        store.init()?;
        Ok(store)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self {
            conn: Mutex::new(conn),
            engine: Engine::new(),
        };
        store.init()?;
        Ok(store)
    }

    /// Replace the default engine, e.g. to use configured domain weights.
    #[must_use]
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    /// Run migrations
    fn init(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        let migrator = Migrator::new(&conn);
        migrator.migrate()
    }

    fn load_runtime(
        conn: &Connection,
        sql: &str,
        key: &str,
    ) -> Result<Option<RuntimeRecord>, StoreError> {
        let record = conn
            .query_row(sql, [key], Self::row_to_runtime)
            .optional()?;
        Ok(record)
    }

    /// Map a full runtime row back to a record.
    ///
    /// Stored enum and date strings fall back to defaults instead of
    /// failing the whole read; scores stay usable even if one column was
    /// edited by hand.
    fn row_to_runtime(row: &rusqlite::Row) -> Result<RuntimeRecord, rusqlite::Error> {
        let tier_str: String = row.get(28)?;
        let caps_json: String = row.get(34)?;

        let mut state = RuntimeState::new();
        state.agent_scores = DomainMap {
            tech: row.get(9)?,
            ops: row.get(10)?,
            judgment: row.get(11)?,
            comms: row.get(12)?,
            orch: row.get(13)?,
        };
        state.user_scores = DomainMap {
            tech: row.get(14)?,
            ops: row.get(15)?,
            judgment: row.get(16)?,
            comms: row.get(17)?,
            orch: row.get(18)?,
        };
        state.streaks = DomainMap {
            tech: row.get(19)?,
            ops: row.get(20)?,
            judgment: row.get(21)?,
            comms: row.get(22)?,
            orch: row.get(23)?,
        };
        state.agent_score = row.get(24)?;
        state.user_score = row.get(25)?;
        state.team_score = row.get(26)?;
        state.eval_count = row.get::<_, i64>(27)? as u64;
        state.maturity_tier = MaturityTier::parse(&tier_str).unwrap_or_default();
        state.warmup_active = row.get(29)?;
        state.warmup_evals = row.get(30)?;
        state.last_event_at = row
            .get::<_, Option<i64>>(31)?
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        state.events_today = row.get(32)?;
        state.events_today_date = row
            .get::<_, Option<String>>(33)?
            .and_then(|s| s.parse().ok());
        state.caps_usage = serde_json::from_str(&caps_json).unwrap_or_default();
        state.caps_date = row
            .get::<_, Option<String>>(35)?
            .and_then(|s| s.parse().ok());

        Ok(RuntimeRecord {
            id: row.get(0)?,
            platform: row.get(1)?,
            model: row.get(2)?,
            thinking: row.get(3)?,
            display_name: row.get(4)?,
            owner_alias: row.get(5)?,
            registered_at: DateTime::from_timestamp(row.get(6)?, 0).unwrap_or_default(),
            is_active: row.get(7)?,
            quarantine: row.get(8)?,
            state,
        })
    }

    fn write_state(
        conn: &Connection,
        id: &str,
        state: &RuntimeState,
    ) -> Result<(), StoreError> {
        let caps_json = serde_json::to_string(&state.caps_usage)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        conn.execute(
            "UPDATE runtimes SET
                tech_agent = ?1, ops_agent = ?2, judgment_agent = ?3, comms_agent = ?4, orch_agent = ?5,
                tech_user = ?6, ops_user = ?7, judgment_user = ?8, comms_user = ?9, orch_user = ?10,
                tech_streak = ?11, ops_streak = ?12, judgment_streak = ?13, comms_streak = ?14, orch_streak = ?15,
                agent_score = ?16, user_score = ?17, team_score = ?18,
                eval_count = ?19, maturity_tier = ?20, warmup_active = ?21, warmup_evals = ?22,
                last_event_at = ?23, events_today = ?24, events_today_date = ?25,
                caps_usage = ?26, caps_date = ?27
             WHERE id = ?28",
            rusqlite::params![
                state.agent_scores.tech,
                state.agent_scores.ops,
                state.agent_scores.judgment,
                state.agent_scores.comms,
                state.agent_scores.orch,
                state.user_scores.tech,
                state.user_scores.ops,
                state.user_scores.judgment,
                state.user_scores.comms,
                state.user_scores.orch,
                state.streaks.tech,
                state.streaks.ops,
                state.streaks.judgment,
                state.streaks.comms,
                state.streaks.orch,
                state.agent_score,
                state.user_score,
                state.team_score,
                state.eval_count as i64,
                state.maturity_tier.as_str(),
                state.warmup_active,
                state.warmup_evals,
                state.last_event_at.map(|t| t.timestamp()),
                state.events_today,
                state.events_today_date.map(|d| d.to_string()),
                caps_json,
                state.caps_date.map(|d| d.to_string()),
                id,
            ],
        )?;
        Ok(())
    }
}

impl HubStore for SqliteHubStore {
    fn register_runtime(&self, new: &NewRuntime) -> Result<RuntimeRecord, StoreError> {
        let conn = self.conn.lock().unwrap();

        // Identity pre-check under the write lock; the unique index is the
        // backstop for anything that slips past it.
        let exists = conn
            .query_row(
                "SELECT 1 FROM runtimes
                 WHERE platform = ?1 AND model = ?2 AND thinking = ?3
                   AND ifnull(owner_alias, '') = ifnull(?4, '')
                 LIMIT 1",
                rusqlite::params![new.platform, new.model, new.thinking, new.owner_alias],
                |_| Ok(()),
            )
            .optional()?;
        if exists.is_some() {
            return Err(StoreError::DuplicateRuntime);
        }

        let id = Uuid::new_v4().to_string();
        let registered_at =
            DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_default();
        conn.execute(
            "INSERT INTO runtimes (id, api_key_hash, platform, model, thinking, display_name, owner_alias, registered_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                id,
                new.api_key_hash,
                new.platform,
                new.model,
                new.thinking,
                new.display_name,
                new.owner_alias,
                registered_at.timestamp(),
            ],
        )?;

        Ok(RuntimeRecord {
            id,
            platform: new.platform.clone(),
            model: new.model.clone(),
            thinking: new.thinking.clone(),
            display_name: new.display_name.clone(),
            owner_alias: new.owner_alias.clone(),
            registered_at,
            is_active: true,
            quarantine: false,
            state: RuntimeState::new(),
        })
    }

    fn runtime(&self, id: &str) -> Result<Option<RuntimeRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT {RUNTIME_COLUMNS} FROM runtimes WHERE id = ?1");
        Self::load_runtime(&conn, &sql, id)
    }

    fn runtime_by_key_hash(&self, hash: &str) -> Result<Option<RuntimeRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT {RUNTIME_COLUMNS} FROM runtimes WHERE api_key_hash = ?1");
        Self::load_runtime(&conn, &sql, hash)
    }

    fn submit_event(
        &self,
        runtime_id: &str,
        event: &ScoreEvent,
        opts: &SubmitOptions,
    ) -> Result<SubmitOutcome, StoreError> {
        let conn = self.conn.lock().unwrap();

        let sql = format!("SELECT {RUNTIME_COLUMNS} FROM runtimes WHERE id = ?1");
        let mut record = Self::load_runtime(&conn, &sql, runtime_id)?
            .ok_or_else(|| StoreError::RuntimeNotFound(runtime_id.to_string()))?;

        if let Some(ref external_id) = opts.external_id {
            let seen = conn
                .query_row(
                    "SELECT 1 FROM events WHERE external_id = ?1 LIMIT 1",
                    [external_id],
                    |_| Ok(()),
                )
                .optional()?;
            if seen.is_some() {
                return Err(StoreError::DuplicateEvent(external_id.clone()));
            }
        }

        if let Some(ref limits) = opts.limits {
            if let Some(last) = record.state.last_event_at {
                let elapsed_ms = (opts.now - last).num_milliseconds();
                let min_ms = limits.min_interval_secs as i64 * 1000;
                if elapsed_ms < min_ms {
                    return Err(StoreError::RateLimited {
                        min_interval_secs: limits.min_interval_secs,
                        retry_after_ms: min_ms - elapsed_ms,
                    });
                }
            }
            if record.state.events_on(opts.now.date_naive()) >= limits.max_events_per_day {
                return Err(StoreError::DailyLimitExceeded {
                    max_events_per_day: limits.max_events_per_day,
                });
            }
        }

        // A repeat of the same mistake pattern inside the same working
        // session counts as reincidence.
        let is_reincidence = if event.event_type == EventType::Error {
            match (&event.pattern_code, &event.session_id) {
                (Some(pattern), Some(session)) => conn
                    .query_row(
                        "SELECT 1 FROM events
                         WHERE runtime_id = ?1 AND session_id = ?2 AND pattern_code = ?3
                         LIMIT 1",
                        rusqlite::params![runtime_id, session, pattern],
                        |_| Ok(()),
                    )
                    .optional()?
                    .is_some(),
                _ => false,
            }
        } else {
            false
        };

        let outcome = self
            .engine
            .process(&record.state, event, is_reincidence, opts.now);

        let event_id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO events (id, runtime_id, side, event_type, domain, severity,
                pattern_code, session_id, cluster_ref, bonus_amount, ts_client,
                delta, domain_score_after, global_score_after, streak_after,
                was_reincidence, was_cluster, cap_applied, external_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            rusqlite::params![
                event_id,
                runtime_id,
                event.side.as_str(),
                event.event_type.as_str(),
                event.domain.as_str(),
                event.severity.map(|s| s.as_str()),
                event.pattern_code,
                event.session_id,
                event.cluster_ref.map(|c| c.to_string()),
                event.bonus_amount,
                event.timestamp.timestamp(),
                outcome.result.delta,
                outcome.result.domain_score_after,
                outcome.result.global_score_after,
                outcome.result.streak_after,
                outcome.result.was_reincidence,
                outcome.result.was_cluster,
                outcome.result.cap_applied,
                opts.external_id,
                opts.now.timestamp(),
            ],
        )?;

        record.state.apply(&outcome.update);
        Self::write_state(&conn, runtime_id, &record.state)?;

        Ok(SubmitOutcome {
            event_id,
            scoring: outcome.result,
            state: record.state.full_state(),
        })
    }

    fn leaderboard(&self, query: &LeaderboardQuery) -> Result<LeaderboardPage, StoreError> {
        let conn = self.conn.lock().unwrap();

        // Build WHERE clauses
        let mut conditions = vec!["is_active = 1".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        conditions.push(format!("eval_count >= ?{}", params.len() + 1));
        params.push(Box::new(MIN_EVALS_FOR_LEADERBOARD as i64));

        if let Some(ref platform) = query.platform {
            conditions.push(format!("platform = ?{}", params.len() + 1));
            params.push(Box::new(platform.clone()));
        }

        if let Some(ref model) = query.model {
            conditions.push(format!("model = ?{}", params.len() + 1));
            params.push(Box::new(model.clone()));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let count_sql = format!("SELECT COUNT(*) FROM runtimes {where_clause}");
        let total: i64 = {
            let mut stmt = conn.prepare(&count_sql)?;
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params.iter().map(|p| p.as_ref()).collect();
            stmt.query_row(params_refs.as_slice(), |row| row.get(0))?
        };

        let select_sql = format!(
            "SELECT id, platform, model, thinking, display_name, owner_alias,
                    agent_score, user_score, team_score, eval_count, maturity_tier
             FROM runtimes {} ORDER BY {} DESC LIMIT ?{} OFFSET ?{}",
            where_clause,
            query.sort.as_column(),
            params.len() + 1,
            params.len() + 2
        );

        params.push(Box::new(query.effective_limit() as i64));
        params.push(Box::new(query.offset as i64));

        let mut entries = {
            let mut stmt = conn.prepare(&select_sql)?;
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params.iter().map(|p| p.as_ref()).collect();
            let rows = stmt.query_map(params_refs.as_slice(), |row| {
                let tier_str: String = row.get(10)?;
                Ok(LeaderboardEntry {
                    rank: 0,
                    id: row.get(0)?,
                    platform: row.get(1)?,
                    model: row.get(2)?,
                    thinking: row.get(3)?,
                    display_name: row.get(4)?,
                    owner_alias: row.get(5)?,
                    agent_score: row.get(6)?,
                    user_score: row.get(7)?,
                    team_score: row.get(8)?,
                    eval_count: row.get::<_, i64>(9)? as u64,
                    maturity_tier: MaturityTier::parse(&tier_str).unwrap_or_default(),
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = query.offset + i as u32 + 1;
        }

        Ok(LeaderboardPage {
            entries,
            total: total as u64,
            limit: query.effective_limit(),
            offset: query.offset,
        })
    }

    fn stats(&self) -> Result<HubStats, StoreError> {
        let conn = self.conn.lock().unwrap();

        let (total, active): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_active), 0) FROM runtimes",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (avg_team, avg_agent, avg_user): (f64, f64, f64) = conn.query_row(
            "SELECT COALESCE(AVG(team_score), 0), COALESCE(AVG(agent_score), 0),
                    COALESCE(AVG(user_score), 0)
             FROM runtimes",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let events_total: i64 =
            conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;

        let day_start = Utc::now()
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        let events_today: i64 = conn.query_row(
            "SELECT COUNT(*) FROM events WHERE created_at >= ?1",
            [day_start],
            |row| row.get(0),
        )?;

        let total_evals: i64 = conn.query_row(
            "SELECT COALESCE(SUM(eval_count), 0) FROM runtimes",
            [],
            |row| row.get(0),
        )?;

        let platforms = {
            let mut stmt = conn.prepare(
                "SELECT platform, COUNT(*) as n FROM runtimes
                 WHERE is_active = 1
                 GROUP BY platform
                 ORDER BY n DESC, platform ASC
                 LIMIT 10",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(PlatformCount {
                    platform: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        Ok(HubStats {
            runtimes: RuntimeTotals {
                total: total as u64,
                active: active as u64,
            },
            scores: ScoreAverages {
                avg_team: round1(avg_team),
                avg_agent: round1(avg_agent),
                avg_user: round1(avg_user),
            },
            events: EventTotals {
                total: events_total as u64,
                today: events_today as u64,
                total_evals: total_evals as u64,
            },
            platforms,
        })
    }

    fn last_event(&self, runtime_id: &str) -> Result<Option<EventStamp>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let stamp = conn
            .query_row(
                "SELECT id, created_at FROM events
                 WHERE runtime_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT 1",
                [runtime_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        Ok(stamp.map(|(id, secs)| EventStamp {
            id,
            created_at: DateTime::from_timestamp(secs, 0).unwrap_or_default(),
        }))
    }

    fn set_quarantine(&self, runtime_id: &str, quarantine: bool) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE runtimes SET quarantine = ?1 WHERE id = ?2",
            rusqlite::params![quarantine, runtime_id],
        )?;
        if changed == 0 {
            return Err(StoreError::RuntimeNotFound(runtime_id.to_string()));
        }
        Ok(())
    }

    fn set_active(&self, runtime_id: &str, active: bool) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE runtimes SET is_active = ?1 WHERE id = ?2",
            rusqlite::params![active, runtime_id],
        )?;
        if changed == 0 {
            return Err(StoreError::RuntimeNotFound(runtime_id.to_string()));
        }
        Ok(())
    }
}
