//! Common types used across the wrap protocol.

use odra::prelude::*;
use odra::casper_types::U256;

/// Action applied by a single diamond cut entry
#[odra::odra_type]
#[derive(Copy)]
pub enum FacetCutAction {
    /// Register new selectors to a facet
    Add,
    /// Repoint existing selectors to a different facet
    Replace,
    /// Delete existing selectors
    Remove,
}

/// One entry of a diamond cut batch
#[odra::odra_type]
pub struct FacetCut {
    /// What to do with the selectors
    pub action: FacetCutAction,
    /// Target facet; must be `None` for `Remove`
    pub target: Option<Address>,
    /// Entry point names affected by this entry
    pub selectors: Vec<String>,
}

/// Per-token underlying asset record
#[odra::odra_type]
#[derive(Default)]
pub struct AssetInfo {
    /// Underlying asset units currently backing this token
    pub underlying_amount: U256,
    /// Underlying asset units at mint time (cost-basis denominator)
    pub total_supply_at_mint: U256,
}

/// Fractional Royalty state, kept per token lineage root.
///
/// `generation_window` is a FIFO sliding window of past owners with capacity
/// `num_generations`; the most recent entry is the current seller.
#[odra::odra_type]
#[derive(Default)]
pub struct FrState {
    /// Window capacity, in [5, 20]
    pub num_generations: u32,
    /// Share of resale profit distributed as FR (1e18 fixed-point)
    pub percent_of_profit: U256,
    /// Geometric decay base for window weights (1e18 fixed-point)
    pub successive_ratio: U256,
    /// Price paid at the most recent sale of this lineage
    pub last_sold_price: U256,
    /// Number of distinct post-mint owners, including the minter
    pub owner_count: u64,
    /// Sliding window of past owners, oldest first
    pub generation_window: Vec<Address>,
}

/// Ownership Royalty state, kept per token lineage root.
///
/// `holders` is append-on-first-acquisition and never reordered or pruned.
#[odra::odra_type]
#[derive(Default)]
pub struct OrState {
    /// Share of the distributed base paid as OR (1e18 fixed-point)
    pub proportional_o_ratio: U256,
    /// Reward ratio fixed at mint (1e18 fixed-point)
    pub reward_ratio: U256,
    /// Payment currency; `None` means the native token
    pub payment_token: Option<Address>,
    /// oToken holders in first-acquisition order
    pub holders: Vec<Address>,
}

/// Active sale listing for a token id
#[odra::odra_type]
#[derive(Default)]
pub struct ListInfo {
    /// Total price asked for `amount`
    pub price: U256,
    /// Underlying units offered for sale
    pub amount: U256,
    /// Seller who created the listing
    pub lister: Option<Address>,
    /// Whether the listing is live
    pub active: bool,
}

/// Manager principal and policy for a proxy
#[odra::odra_type]
pub struct ManagerInfo {
    /// Manager principal of this proxy
    pub manager: Option<Address>,
    /// oToken share minted to the manager on each wrap (1e18 fixed-point)
    pub manager_cut: U256,
}
