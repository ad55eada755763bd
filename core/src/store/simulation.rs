//! Store methods for completed simulations: insert, filtered listing, counts.

use crate::{
    config::DEFAULT_PAGE_SIZE,
    distribution::Volatility,
    error::SimResult,
    record::{SimulationDetail, SimulationRecord},
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{
    params, params_from_iter,
    types::{Type, Value},
    OptionalExtension, Row,
};

use super::SimStore;

const SELECT_COLUMNS: &str = "SELECT id, simulation_id, user_id, home_team, away_team,
        home_score, away_score, bet_slip_won, total_stake, total_payout, total_profit,
        configured_rtp, seed, volatility, total_events, number_of_bets,
        bet_results, events, match_stats, created_at
     FROM simulation";

/// Filters for listing stored simulations. Unset fields match everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationFilter {
    /// Exact requester id.
    pub user_id: Option<String>,
    /// Substring of either team name.
    pub team: Option<String>,
    pub bet_slip_won: Option<bool>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SimulationFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            team: None,
            bet_slip_won: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl SimulationFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// The WHERE clause and its bound values.
    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut values = Vec::new();
        if let Some(user) = &self.user_id {
            sql.push_str(" AND user_id = ?");
            values.push(Value::Text(user.clone()));
        }
        if let Some(team) = &self.team {
            sql.push_str(" AND (home_team LIKE ? OR away_team LIKE ?)");
            let pattern = format!("%{team}%");
            values.push(Value::Text(pattern.clone()));
            values.push(Value::Text(pattern));
        }
        if let Some(won) = self.bet_slip_won {
            sql.push_str(" AND bet_slip_won = ?");
            values.push(Value::Integer(i64::from(won)));
        }
        (sql, values)
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, ty: Type, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
}

/// Read an INTEGER column into a narrower type, failing instead of truncating.
fn int_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: TryFrom<i64, Error = std::num::TryFromIntError>,
{
    let raw: i64 = row.get(idx)?;
    T::try_from(raw).map_err(|e| conversion_error(idx, Type::Integer, e))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<SimulationRecord> {
    let volatility: String = row.get(13)?;
    let created_at: String = row.get(19)?;
    Ok(SimulationRecord {
        id: Some(row.get(0)?),
        simulation_id: row.get(1)?,
        user_id: row.get(2)?,
        home_team: row.get(3)?,
        away_team: row.get(4)?,
        home_score: int_column(row, 5)?,
        away_score: int_column(row, 6)?,
        bet_slip_won: row.get(7)?,
        total_stake: row.get(8)?,
        total_payout: row.get(9)?,
        total_profit: row.get(10)?,
        configured_rtp: row.get(11)?,
        seed: int_column(row, 12)?,
        volatility: volatility
            .parse::<Volatility>()
            .map_err(|e| conversion_error(13, Type::Text, e))?,
        total_events: int_column(row, 14)?,
        number_of_bets: int_column(row, 15)?,
        bet_results: row.get(16)?,
        events: row.get(17)?,
        match_stats: row.get(18)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| conversion_error(19, Type::Text, e))?
            .with_timezone(&Utc),
    })
}

impl SimStore {
    /// Persist one completed simulation. Returns the new row id.
    pub fn insert_simulation(&self, r: &SimulationRecord) -> SimResult<i64> {
        self.conn.execute(
            "INSERT INTO simulation (
                simulation_id, user_id, home_team, away_team, home_score, away_score,
                bet_slip_won, total_stake, total_payout, total_profit, configured_rtp,
                seed, volatility, total_events, number_of_bets,
                bet_results, events, match_stats, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                &r.simulation_id,
                &r.user_id,
                &r.home_team,
                &r.away_team,
                i64::from(r.home_score),
                i64::from(r.away_score),
                r.bet_slip_won,
                r.total_stake,
                r.total_payout,
                r.total_profit,
                r.configured_rtp,
                i64::from(r.seed),
                r.volatility.as_str(),
                r.total_events as i64,
                r.number_of_bets as i64,
                &r.bet_results,
                &r.events,
                &r.match_stats,
                timestamp(&r.created_at),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        log::debug!("stored simulation {} as row {id}", r.simulation_id);
        Ok(id)
    }

    /// Newest first, filtered and paginated.
    pub fn simulations(&self, filter: &SimulationFilter) -> SimResult<Vec<SimulationRecord>> {
        let (where_sql, mut values) = filter.where_clause();
        let sql = format!("{SELECT_COLUMNS}{where_sql} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        values.push(Value::Integer(filter.limit as i64));
        values.push(Value::Integer(filter.offset as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values.iter()), record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Number of simulations matching the filter, ignoring limit and offset.
    pub fn simulation_count(&self, filter: &SimulationFilter) -> SimResult<i64> {
        let (where_sql, values) = filter.where_clause();
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM simulation{where_sql}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Like `simulations`, with each record's JSON columns decoded.
    pub fn simulation_details(&self, filter: &SimulationFilter) -> SimResult<Vec<SimulationDetail>> {
        self.simulations(filter)?
            .iter()
            .map(SimulationDetail::try_from)
            .collect()
    }

    pub fn simulation_by_id(&self, simulation_id: &str) -> SimResult<Option<SimulationRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE simulation_id = ?1"),
                params![simulation_id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }
}
