use crate::{
    distribution::Volatility,
    error::{SimError, SimResult},
    settlement::SettlementPolicy,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RTP: f64 = 0.96;
pub const DEFAULT_TREND_WINDOW: usize = 10;
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Runtime configuration for the surrounding service.
///
/// The core itself never reads this; callers pass `rtp` and the settlement
/// policy into each call explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub rtp: f64,
    pub volatility: Volatility,
    pub settlement_policy: SettlementPolicy,
    pub db_path: String,
    pub trend_window: usize,
    pub page_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rtp: DEFAULT_RTP,
            volatility: Volatility::Medium,
            settlement_policy: SettlementPolicy::TreatAsLoss,
            db_path: ":memory:".to_string(),
            trend_window: DEFAULT_TREND_WINDOW,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    /// In tests, use SimConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Deterministic settings for tests: strict settlement, small pages.
    pub fn default_test() -> Self {
        Self {
            settlement_policy: SettlementPolicy::Reject,
            page_size: 10,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        validate_rtp(self.rtp)?;
        if self.trend_window == 0 {
            return Err(anyhow::anyhow!("trend_window must be >= 1").into());
        }
        if self.page_size == 0 {
            return Err(anyhow::anyhow!("page_size must be >= 1").into());
        }
        Ok(())
    }
}

/// The single range check for return-to-player values.
pub fn validate_rtp(rtp: f64) -> SimResult<f64> {
    if rtp.is_finite() && (0.0..=1.0).contains(&rtp) {
        Ok(rtp)
    } else {
        Err(SimError::InvalidRtp { rtp })
    }
}
