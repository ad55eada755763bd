//! match-runner: headless runner for the matchday simulation core.
//!
//! Usage:
//!   match-runner --seed 42 --runs 500 --rtp 0.96 --db runs.db
//!   match-runner --config matchday.json --ipc-mode

mod rtp;

use anyhow::Result;
use matchday_core::{
    config::SimConfig,
    distribution::ScoreDistribution,
    engine::{MatchEngine, SimulationRequest},
    market::{list_markets, BetSelection, MarketKind},
    record::SimulationSink,
    store::{SimStore, SimulationFilter},
    types::Seed,
};
use rtp::RtpCell;
use serde_json::{json, Value};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Simulate {
        #[serde(default)]
        user_id: Option<String>,
        request: SimulationRequest,
    },
    GetRtp,
    SetRtp {
        rtp: f64,
    },
    Markets,
    History {
        #[serde(default)]
        user_id: Option<String>,
        #[serde(default)]
        team: Option<String>,
        #[serde(default)]
        bet_slip_won: Option<bool>,
        #[serde(default)]
        limit: Option<usize>,
        #[serde(default)]
        offset: usize,
    },
    Stats {
        #[serde(default)]
        user_id: Option<String>,
    },
    RtpTrends {
        #[serde(default)]
        limit: Option<usize>,
        #[serde(default)]
        window: Option<usize>,
    },
    Players,
    Quit,
}

struct Runner {
    config: SimConfig,
    engine: MatchEngine,
    store: SimStore,
    rtp: RtpCell,
    default_user: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match string_arg(&args, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(db) = string_arg(&args, "--db") {
        config.db_path = db.to_string();
    }
    let seed = parse_arg(&args, "--seed", 42 as Seed);
    let runs = parse_arg(&args, "--runs", 100u32);
    let rtp = parse_arg(&args, "--rtp", config.rtp);
    let user = string_arg(&args, "--user").unwrap_or("runner").to_string();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    if !ipc_mode {
        println!("matchday match-runner");
        println!("  seed:       {seed}");
        println!("  runs:       {runs}");
        println!("  rtp:        {rtp:.4}");
        println!("  volatility: {}", config.volatility);
        println!("  db:         {}", config.db_path);
        println!();
    }

    let store = SimStore::open(&config.db_path)?;
    store.migrate()?;

    let runner = Runner {
        engine: MatchEngine::from_config(&config),
        rtp: RtpCell::new(rtp)?,
        store,
        default_user: user,
        config,
    };

    if ipc_mode {
        run_ipc_loop(&runner)?;
    } else {
        run_batch(&runner, seed, runs)?;
        print_summary(&runner, runs)?;
    }
    Ok(())
}

/// The reference fixture: an even coin between 1-0 and 0-1, one staked home bet.
fn fixture_request(seed: Seed, config: &SimConfig) -> SimulationRequest {
    SimulationRequest {
        home_team: "Arsenal".to_string(),
        away_team: "Chelsea".to_string(),
        distribution: [(1, 0, 0.5), (0, 1, 0.5)].into_iter().collect::<ScoreDistribution>(),
        bet_slip: vec![BetSelection::staked(MarketKind::MatchResult, "1", 10.0, 2.0)],
        volatility: config.volatility,
        seed: Some(seed),
    }
}

fn run_batch(runner: &Runner, seed: Seed, runs: u32) -> Result<()> {
    let rtp = runner.rtp.get();
    for n in 0..runs {
        let request = fixture_request(seed.wrapping_add(n), &runner.config);
        let completed = runner.engine.run(&runner.default_user, &request, rtp)?;
        runner.store.append(&completed.record)?;
    }
    Ok(())
}

fn print_summary(runner: &Runner, runs: u32) -> Result<()> {
    let summary = runner.store.rtp_summary(Some(&runner.default_user))?;

    println!("=== RUN SUMMARY ===");
    println!("  simulations:    {runs}");
    println!("  slips won:      {}", summary.won_slips);
    println!("  slips lost:     {}", summary.lost_slips);
    println!("  total staked:   ${:.2}", summary.total_staked);
    println!("  total paid out: ${:.2}", summary.total_paid_out);
    println!("  house profit:   ${:.2}", summary.house_profit);
    println!();
    println!("=== RTP ===");
    println!("  configured:     {:.4}", summary.avg_configured_rtp);
    println!("  achieved:       {:.4}", summary.actual_rtp);
    println!("  difference:     {:+.4}", summary.rtp_difference);
    Ok(())
}

fn run_ipc_loop(runner: &Runner) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let response = handle_command(runner, cmd).unwrap_or_else(|e| {
            log::warn!("command failed: {e:#}");
            json!({ "error": e.to_string() })
        });
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(runner: &Runner, cmd: IpcCommand) -> Result<Value> {
    let response = match cmd {
        IpcCommand::Simulate { user_id, request } => {
            let user = user_id.unwrap_or_else(|| runner.default_user.clone());
            let completed = runner.engine.run(&user, &request, runner.rtp.get())?;
            runner.store.append(&completed.record)?;
            let outcome = &completed.outcome;
            json!({
                "simulation_id": completed.record.simulation_id,
                "home_team": outcome.home_team,
                "away_team": outcome.away_team,
                "final_score": outcome.final_score,
                "seed": outcome.seed,
                "rtp": outcome.rtp,
                "volatility": outcome.volatility,
                "events": outcome.events(),
                "match_stats": outcome.stats(),
                "rig_decisions": outcome.rig_decisions,
                "bet_results": completed.settlement.results,
                "bet_slip_won": completed.settlement.slip_won,
                "total_stake": completed.settlement.total_stake,
                "total_payout": completed.settlement.total_payout,
                "total_profit": completed.settlement.total_profit,
            })
        }
        IpcCommand::GetRtp => json!({ "rtp": runner.rtp.get() }),
        IpcCommand::SetRtp { rtp } => json!({ "rtp": runner.rtp.set(rtp)? }),
        IpcCommand::Markets => json!({ "markets": list_markets() }),
        IpcCommand::History {
            user_id,
            team,
            bet_slip_won,
            limit,
            offset,
        } => {
            let filter = SimulationFilter {
                user_id,
                team,
                bet_slip_won,
                limit: limit.unwrap_or(runner.config.page_size),
                offset,
            };
            json!({
                "total": runner.store.simulation_count(&filter)?,
                "limit": filter.limit,
                "offset": filter.offset,
                "simulations": runner.store.simulation_details(&filter)?,
            })
        }
        IpcCommand::Stats { user_id } => serde_json::to_value(runner.store.rtp_summary(user_id.as_deref())?)?,
        IpcCommand::RtpTrends { limit, window } => {
            let window = window.unwrap_or(runner.config.trend_window);
            let trends = runner
                .store
                .rtp_trends(limit.unwrap_or(runner.config.page_size), window)?;
            json!({ "window": window, "trends": trends })
        }
        IpcCommand::Players => json!({ "players": runner.store.players()? }),
        IpcCommand::Quit => Value::Null,
    };
    Ok(response)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
