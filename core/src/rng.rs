//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness in one simulation flows through a single MatchRng,
//! created from the run's seed and owned by that run alone.
//!
//! Every primitive below is built on `next_u64`, so a run is one linear
//! sequence of draws. Replaying a seed reproduces every decision no matter
//! which primitive issued each draw.

use crate::types::Seed;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// The single random stream of one simulation run.
pub struct MatchRng {
    seed: Seed,
    draws: u64,
    inner: Pcg64Mcg,
}

impl MatchRng {
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            draws: 0,
            inner: Pcg64Mcg::seed_from_u64(u64::from(seed)),
        }
    }

    /// Seed from the high-resolution clock, reduced modulo 2^32.
    pub fn from_clock() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros())
            .unwrap_or(0);
        Self::new((micros % (1u128 << 32)) as Seed)
    }

    /// Use the explicit seed when given, otherwise derive one from the clock.
    pub fn resolve(seed: Option<Seed>) -> Self {
        match seed {
            Some(s) => Self::new(s),
            None => Self::from_clock(),
        }
    }

    /// The seed this stream was built from, for audit and replay.
    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Number of raw draws consumed so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.inner.next_u64()
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.next_u64() % n
    }

    /// Roll an integer in [lo, hi], both bounds inclusive.
    pub fn next_int(&mut self, lo: u32, hi: u32) -> u32 {
        assert!(lo <= hi, "next_int: lo ({lo}) > hi ({hi})");
        let span = u64::from(hi - lo) + 1;
        lo + self.next_u64_below(span) as u32
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element uniformly. Returns None (and draws nothing) when empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_u64_below(items.len() as u64) as usize;
        items.get(idx)
    }

    /// Fisher-Yates shuffle, back to front.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_u64_below(i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// Cumulative-threshold weighted draw.
    ///
    /// Draws `r = next_f64() * total`, folds over `(item, cumulative)` pairs
    /// and returns the first positively weighted item whose cumulative weight
    /// reaches `r`. If rounding lets the walk fall through, the last
    /// positively weighted item is returned (the last item if none is).
    /// Returns None, without drawing, for an empty slice.
    pub fn weighted_choice<'a, T>(&mut self, items: &'a [(T, f64)]) -> Option<&'a T> {
        let (fallback, _) = items
            .iter()
            .rev()
            .find(|(_, w)| *w > 0.0)
            .or_else(|| items.last())?;

        let total: f64 = items.iter().map(|(_, w)| *w).sum();
        let r = self.next_f64() * total;

        let picked = items
            .iter()
            .scan(0.0_f64, |cumulative, (item, w)| {
                *cumulative += *w;
                Some((item, *w, *cumulative))
            })
            .find(|(_, w, cumulative)| *w > 0.0 && *cumulative >= r)
            .map(|(item, _, _)| item);

        Some(picked.unwrap_or(fallback))
    }
}
