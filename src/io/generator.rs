use rand::{Rng, seq::SliceRandom};
use rand_distr::{Distribution, Normal};

use crate::common::{error::AppError, event::ClientRecord};

/// Client roster the daily transactions are drawn from.
pub const CLIENTS: [&str; 26] = [
    "Adams", "Baker", "Clark", "Davis", "Evans", "Frank", "Ghosh", "Hills", "Irwin", "Jones",
    "Klein", "Lopez", "Mason", "Nalty", "Ochoa", "Patel", "Quinn", "Reily", "Smith", "Trott",
    "Usman", "Valdo", "White", "Xiang", "Yakub", "Zafar",
];

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Upper bound (inclusive) of the number of draws for one day.
    pub max_draws: usize,
    /// Standard deviation of the zero-mean normal the amounts come from.
    pub sigma: f64,
    /// Multiplier applied to each normal sample before truncation.
    pub scale: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_draws: 101,
            sigma: 1.0,
            scale: 1000.0,
        }
    }
}

/// Simulates one day of client transactions.
///
/// Draws a uniform number of transactions in `0..=max_draws`. Each picks a
/// client from [`CLIENTS`] and an amount `trunc(N(0, sigma) * scale)` in
/// minor units. Draws that truncate to zero are dropped, so fewer records
/// than draws may come back.
///
/// # Examples
///
/// ```
/// use rand::{SeedableRng, rngs::StdRng};
/// use transaction_ledger::io::generator::{generate, GeneratorConfig};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let records = generate(&mut rng, &GeneratorConfig::default()).unwrap();
/// assert!(records.len() <= 101);
/// assert!(records.iter().all(|r| r.amount != 0));
/// ```
pub fn generate<G: Rng + ?Sized>(
    rng: &mut G,
    config: &GeneratorConfig,
) -> Result<Vec<ClientRecord>, AppError> {
    if !config.scale.is_finite() {
        return Err(AppError::Generator(format!(
            "scale must be finite, got {}",
            config.scale
        )));
    }
    let normal = Normal::new(0.0, config.sigma)
        .map_err(|e| AppError::Generator(format!("sigma {}: {e}", config.sigma)))?;

    let draws = rng.gen_range(0..=config.max_draws);
    let mut records = Vec::with_capacity(draws);
    for _ in 0..draws {
        let Some(client) = CLIENTS.choose(rng) else {
            break;
        };
        let amount = (normal.sample(rng) * config.scale) as i64;
        if amount == 0 {
            continue;
        }
        records.push(ClientRecord::new(*client, amount));
    }
    Ok(records)
}
