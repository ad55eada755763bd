//! Store methods for RTP reporting: aggregate summaries, rolling trends
//! and per-player roll-ups. Only simulations with a stake participate.

use crate::error::SimResult;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use super::SimStore;

/// Realised return-to-player for every staked simulation, or one player's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RtpSummary {
    pub user_id: Option<String>,
    pub total_simulations: i64,
    pub won_slips: i64,
    pub lost_slips: i64,
    pub total_bets: i64,
    pub total_staked: f64,
    pub total_paid_out: f64,
    pub house_profit: f64,
    pub total_player_profit: f64,
    pub actual_rtp: f64,
    pub avg_configured_rtp: f64,
    pub rtp_difference: f64,
}

/// One point of the cumulative / trailing-window RTP series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RtpTrendPoint {
    pub simulation_number: usize,
    pub created_at: String,
    pub configured_rtp: f64,
    pub cumulative_actual_rtp: f64,
    pub rolling_window_rtp: f64,
    pub cumulative_stake: f64,
    pub cumulative_payout: f64,
    pub bet_slip_won: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSummary {
    pub user_id: String,
    pub total_simulations: i64,
    pub won_slips: i64,
    pub total_staked: f64,
    pub total_paid_out: f64,
    pub actual_rtp: f64,
    pub last_simulation: String,
}

fn ratio(paid: f64, staked: f64) -> f64 {
    if staked > 0.0 {
        paid / staked
    } else {
        0.0
    }
}

const SUMMARY_COLUMNS: &str = "SELECT
        COUNT(*),
        SUM(CASE WHEN bet_slip_won = 1 THEN 1 ELSE 0 END),
        SUM(CASE WHEN bet_slip_won = 0 THEN 1 ELSE 0 END),
        SUM(number_of_bets),
        SUM(total_stake),
        SUM(total_payout),
        SUM(total_profit),
        AVG(configured_rtp)
     FROM simulation
     WHERE total_stake IS NOT NULL";

fn summary_from_row(user_id: Option<&str>, row: &Row<'_>) -> rusqlite::Result<RtpSummary> {
    let total_staked = row.get::<_, Option<f64>>(4)?.unwrap_or(0.0);
    let total_paid_out = row.get::<_, Option<f64>>(5)?.unwrap_or(0.0);
    let avg_configured_rtp = row.get::<_, Option<f64>>(7)?.unwrap_or(0.0);
    let actual_rtp = ratio(total_paid_out, total_staked);
    Ok(RtpSummary {
        user_id: user_id.map(String::from),
        total_simulations: row.get(0)?,
        won_slips: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
        lost_slips: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
        total_bets: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
        total_staked,
        total_paid_out,
        house_profit: total_staked - total_paid_out,
        total_player_profit: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
        actual_rtp,
        avg_configured_rtp,
        rtp_difference: actual_rtp - avg_configured_rtp,
    })
}

impl SimStore {
    /// Aggregate RTP over all staked simulations, or one player's.
    pub fn rtp_summary(&self, user_id: Option<&str>) -> SimResult<RtpSummary> {
        let summary = match user_id {
            Some(user) => self.conn.query_row(
                &format!("{SUMMARY_COLUMNS} AND user_id = ?1"),
                params![user],
                |row| summary_from_row(Some(user), row),
            )?,
            None => self.conn.query_row(SUMMARY_COLUMNS, [], |row| summary_from_row(None, row))?,
        };
        Ok(summary)
    }

    /// The first `limit` staked simulations, oldest first, with cumulative
    /// RTP and RTP over the trailing `window` simulations.
    pub fn rtp_trends(&self, limit: usize, window: usize) -> SimResult<Vec<RtpTrendPoint>> {
        let window = window.max(1);
        let mut stmt = self.conn.prepare(
            "SELECT created_at, configured_rtp, total_stake, total_payout, bet_slip_won
             FROM simulation
             WHERE total_stake IS NOT NULL
             ORDER BY created_at ASC, id ASC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                    row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
                    row.get::<_, bool>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut cumulative_stake = 0.0_f64;
        let mut cumulative_payout = 0.0_f64;
        let trends = rows
            .iter()
            .enumerate()
            .map(|(idx, (created_at, configured_rtp, stake, payout, won))| {
                cumulative_stake += stake;
                cumulative_payout += payout;

                let start = (idx + 1).saturating_sub(window);
                let (window_stake, window_payout) = rows[start..=idx]
                    .iter()
                    .fold((0.0_f64, 0.0_f64), |(s, p), (_, _, stake, payout, _)| (s + stake, p + payout));

                RtpTrendPoint {
                    simulation_number: idx + 1,
                    created_at: created_at.clone(),
                    configured_rtp: *configured_rtp,
                    cumulative_actual_rtp: ratio(cumulative_payout, cumulative_stake),
                    rolling_window_rtp: ratio(window_payout, window_stake),
                    cumulative_stake,
                    cumulative_payout,
                    bet_slip_won: *won,
                }
            })
            .collect();
        Ok(trends)
    }

    /// Every player with staked simulations, most recently active first.
    pub fn players(&self) -> SimResult<Vec<PlayerSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                user_id,
                COUNT(*),
                SUM(CASE WHEN bet_slip_won = 1 THEN 1 ELSE 0 END),
                SUM(total_stake),
                SUM(total_payout),
                MAX(created_at) AS last_simulation
             FROM simulation
             WHERE total_stake IS NOT NULL
             GROUP BY user_id
             ORDER BY last_simulation DESC, user_id ASC",
        )?;
        let players = stmt
            .query_map([], |row| {
                let total_staked = row.get::<_, Option<f64>>(3)?.unwrap_or(0.0);
                let total_paid_out = row.get::<_, Option<f64>>(4)?.unwrap_or(0.0);
                Ok(PlayerSummary {
                    user_id: row.get(0)?,
                    total_simulations: row.get(1)?,
                    won_slips: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                    total_staked,
                    total_paid_out,
                    actual_rtp: ratio(total_paid_out, total_staked),
                    last_simulation: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(players)
    }
}
