//! Reward math for the FR/OR distribution engine.
//!
//! All ratios and shares are 1e18 fixed-point. Every division rounds toward
//! zero; the resulting dust per distribution cycle is bounded by the number
//! of recipients and stays inside the proxy.

use odra::prelude::*;
use odra::casper_types::U256;

/// Fixed-point scale (1e18 = 1.0)
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Golden-ratio decay constant (1.618 in 1e18 fixed-point)
pub const GOLDEN_DECAY: u128 = 1_618_000_000_000_000_000;

/// Lower bound for reward_ratio, o_ratio and manager_cut (0.05)
pub const RATIO_MIN: u128 = 50_000_000_000_000_000;

/// Upper bound for reward_ratio, o_ratio and manager_cut (0.50)
pub const RATIO_MAX: u128 = 500_000_000_000_000_000;

/// Minimum generation window capacity
pub const MIN_GENERATIONS: u32 = 5;

/// Maximum generation window capacity
pub const MAX_GENERATIONS: u32 = 20;

/// Fraction of reward_ratio charged on profit as FR (0.6)
const PROFIT_SHARE_FACTOR: u128 = 600_000_000_000_000_000;

/// The fixed-point unit as U256
pub fn scale() -> U256 {
    U256::from(SCALE)
}

/// Fixed-point multiply: a * b / SCALE, truncating
pub fn mul_scale(a: U256, b: U256) -> U256 {
    a * b / scale()
}

/// Check a generation window capacity against policy bounds
pub fn validate_generations(num_generations: u32) -> bool {
    (MIN_GENERATIONS..=MAX_GENERATIONS).contains(&num_generations)
}

/// Check a 1e18 fixed-point ratio against the [0.05, 0.50] policy band
pub fn validate_ratio(ratio: U256) -> bool {
    ratio >= U256::from(RATIO_MIN) && ratio <= U256::from(RATIO_MAX)
}

/// FR share of profit: reward_ratio * 0.6
pub fn percent_of_profit(reward_ratio: U256) -> U256 {
    mul_scale(reward_ratio, U256::from(PROFIT_SHARE_FACTOR))
}

/// OR share of the distributed base: reward_ratio * o_ratio
pub fn proportional_o_ratio(reward_ratio: U256, o_ratio: U256) -> U256 {
    mul_scale(reward_ratio, o_ratio)
}

/// Geometric decay base for a window of `num_generations` members:
/// n / (n - 1.618) in 1e18 fixed-point, truncated to a multiple of 100
/// base units.
pub fn successive_ratio(num_generations: u32) -> U256 {
    let n = U256::from(num_generations) * scale();
    let raw = n * scale() / (n - U256::from(GOLDEN_DECAY));
    raw / U256::from(100u32) * U256::from(100u32)
}

/// Fixed-point power with a small integer exponent
pub fn pow_scale(base: U256, exp: u32) -> U256 {
    let mut result = scale();
    for _ in 0..exp {
        result = mul_scale(result, base);
    }
    result
}

/// Decay weights for a window of `len` members, oldest first.
///
/// Member `i` weighs `successive_ratio^i`, so the most recent window
/// member carries the largest single-cycle weight.
pub fn window_weights(ratio: U256, len: usize) -> Vec<U256> {
    (0..len as u32).map(|i| pow_scale(ratio, i)).collect()
}

/// Resale profit of selling `amount` units at a total price of `due`.
///
/// The cost basis is the last sold price prorated to the sold fraction of
/// the mint-time supply. The first sale of a lineage has zero profit.
pub fn sale_profit(
    due: U256,
    last_sold_price: U256,
    amount: U256,
    total_supply_at_mint: U256,
) -> U256 {
    if last_sold_price.is_zero() || total_supply_at_mint.is_zero() {
        return U256::zero();
    }
    let basis = last_sold_price * amount / total_supply_at_mint;
    due.saturating_sub(basis)
}

/// Pro-rata slice of `share` held by `balance` out of `total`
pub fn pro_rata(share: U256, balance: U256, total: U256) -> U256 {
    if total.is_zero() {
        return U256::zero();
    }
    share * balance / total
}
