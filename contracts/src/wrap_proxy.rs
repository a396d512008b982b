//! Per-asset wrap proxy.
//!
//! One proxy instance exists per underlying CEP-18 asset. It owns the asset,
//! oToken, FR/OR and claimable ledgers, while every public entry point is
//! gated on the facet registry: uninstalled selectors fail with
//! `ImplementationNotContract` and the ledgers survive selector removal.
//!
//! ## Lifecycle
//!
//! A proxy is deployed blank with its registry and binder, staged with the
//! manager, and activated by a single `bind` call that fixes the underlying
//! asset, manager principal and collection metadata.
//!
//! ## Ledger discipline
//!
//! All claimable balances, listing and ownership state are written before
//! any outbound native or CEP-18 transfer is issued.

use odra::prelude::*;
use odra::casper_types::bytesrepr::{Bytes, ToBytes};
use odra::casper_types::{runtime_args, PublicKey, RuntimeArgs, U256, U512};
use odra::CallDef;
use crate::errors::WrapError;
use crate::rewards;
use crate::types::{AssetInfo, FrState, ListInfo, ManagerInfo, OrState};

/// Domain separator components for the unwrap authorization message
const DOMAIN_NAME: &str = "crypto-wrap";
const DOMAIN_VERSION: &str = "1";
const DOMAIN_SALT: u64 = 0x9f2c_11d7;

/// Entry points gated by the facet registry
const CORE_SELECTORS: [&str; 23] = [
    "wrap",
    "unwrap",
    "transfer_token",
    "transfer_token_fractional",
    "transfer_o_tokens",
    "list",
    "cancel_list",
    "buy",
    "release_fr",
    "release_or",
    "release_allotted_tokens",
    "set_manager_cut",
    "get_fr_info",
    "get_or_info",
    "get_asset_info",
    "get_list_info",
    "get_manager_info",
    "get_allotted_fr",
    "get_allotted_or",
    "get_allotted_tokens",
    "balance_of_o_tokens",
    "owner_of",
    "get_underlying_token",
];

/// Wrap proxy contract
#[odra::module]
pub struct WrapProxy {
    /// Facet registry gating the public surface
    registry: Var<Address>,
    /// Manager contract allowed to bind this proxy
    binder: Var<Address>,
    /// Whether `bind` already happened
    bound: Var<bool>,
    /// Underlying CEP-18 asset held in custody
    underlying: Var<Option<Address>>,
    /// Manager principal of this proxy
    manager: Var<Option<Address>>,
    /// oToken share minted to the manager on wrap (1e18 fixed-point)
    manager_cut: Var<U256>,
    /// Collection name
    name: Var<String>,
    /// Collection symbol
    symbol: Var<String>,
    /// Collection URI prefix
    uri_prefix: Var<String>,
    /// Next token id; ids start at 1
    next_token_id: Var<u64>,
    /// Wrapped-token ownership; `None` means unminted or burned
    owners: Mapping<u64, Option<Address>>,
    /// Original mint beneficiary per token id
    minters: Mapping<u64, Option<Address>>,
    /// Underlying bookkeeping per token id
    assets: Mapping<u64, AssetInfo>,
    /// Lineage root per token id; roots map to themselves, 0 means unset
    lineage: Mapping<u64, u64>,
    /// FR state per lineage root
    fr_states: Mapping<u64, FrState>,
    /// OR state per lineage root
    or_states: Mapping<u64, OrState>,
    /// oToken balances keyed by (lineage root, holder)
    o_balances: Mapping<(u64, Address), U256>,
    /// Active listings per token id
    listings: Mapping<u64, ListInfo>,
    /// Claimable FR in native currency
    allotted_fr: Mapping<Address, U256>,
    /// Claimable OR in native currency
    allotted_or: Mapping<Address, U256>,
    /// Claimable amounts keyed by (holder, CEP-18 payment token)
    allotted_tokens: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl WrapProxy {
    /// Initialize a blank proxy bound to a registry and a binder
    pub fn init(&mut self, registry: Address, binder: Address) {
        self.registry.set(registry);
        self.binder.set(binder);
        self.bound.set(false);
        self.next_token_id.set(1u64);
    }

    // ========== Lifecycle ==========

    /// Activate the proxy for one underlying asset (binder only, once)
    pub fn bind(
        &mut self,
        underlying: Address,
        manager: Address,
        manager_cut: U256,
        name: String,
        symbol: String,
        uri_prefix: String,
    ) {
        if self.bound.get().unwrap_or(false) {
            self.env().revert(WrapError::AlreadyBound);
        }
        if self.binder.get() != Some(self.env().caller()) {
            self.env().revert(WrapError::NotPermitted);
        }
        if !rewards::validate_ratio(manager_cut) {
            self.env().revert(WrapError::ManagerCutOutOfRange);
        }

        self.underlying.set(Some(underlying));
        self.manager.set(Some(manager));
        self.manager_cut.set(manager_cut);
        self.name.set(name);
        self.symbol.set(symbol);
        self.uri_prefix.set(uri_prefix);
        self.bound.set(true);
    }

    /// Canonical selector list of the proxy surface
    pub fn core_selectors(&self) -> Vec<String> {
        CORE_SELECTORS.iter().map(|s| String::from(*s)).collect()
    }

    // ========== Wrap / unwrap ==========

    /// Wrap `amount` of the underlying asset into a fresh token id.
    ///
    /// Pulls the underlying from the caller, mints the token to
    /// `beneficiary` and seeds the lineage: the oToken unit is split
    /// between the manager (`manager_cut`) and the beneficiary.
    pub fn wrap(
        &mut self,
        beneficiary: Address,
        amount: U256,
        payment_token: Option<Address>,
        num_generations: u32,
        reward_ratio: U256,
        o_ratio: U256,
    ) -> u64 {
        self.require_facet("wrap");

        if !rewards::validate_generations(num_generations) {
            self.env().revert(WrapError::NumGenerationsOutOfRange);
        }
        if !rewards::validate_ratio(reward_ratio) {
            self.env().revert(WrapError::RewardRatioOutOfRange);
        }
        if !rewards::validate_ratio(o_ratio) {
            self.env().revert(WrapError::ORatioOutOfRange);
        }

        let underlying = self.require_underlying();
        let manager = self.require_manager();
        let caller = self.env().caller();
        let proxy = self.env().self_address();

        self.token_transfer_from(underlying, caller, proxy, amount);

        let token_id = self.next_id();
        self.owners.set(&token_id, Some(beneficiary));
        self.minters.set(&token_id, Some(beneficiary));
        self.assets.set(
            &token_id,
            AssetInfo {
                underlying_amount: amount,
                total_supply_at_mint: amount,
            },
        );
        self.lineage.set(&token_id, token_id);

        self.fr_states.set(
            &token_id,
            FrState {
                num_generations,
                percent_of_profit: rewards::percent_of_profit(reward_ratio),
                successive_ratio: rewards::successive_ratio(num_generations),
                last_sold_price: U256::zero(),
                owner_count: 1,
                generation_window: vec![beneficiary],
            },
        );

        let manager_cut = self.manager_cut.get().unwrap_or_default();
        self.or_states.set(
            &token_id,
            OrState {
                proportional_o_ratio: rewards::proportional_o_ratio(reward_ratio, o_ratio),
                reward_ratio,
                payment_token,
                holders: vec![manager, beneficiary],
            },
        );
        self.o_balances.set(&(token_id, manager), manager_cut);
        self.o_balances
            .set(&(token_id, beneficiary), rewards::scale() - manager_cut);

        token_id
    }

    /// Unwrap a token and return its underlying to `to`.
    ///
    /// The original minter who is still the first non-manager holder of the
    /// lineage may unwrap with a blank signature. Anyone else needs a
    /// signature over the domain-separated message from the manager or the
    /// current largest oToken holder.
    pub fn unwrap(
        &mut self,
        to: Address,
        token_id: u64,
        signature: Option<Bytes>,
        signer: Option<PublicKey>,
    ) {
        self.require_facet("unwrap");

        let caller = self.env().caller();
        if self.owners.get(&token_id).flatten() != Some(caller) {
            self.env().revert(WrapError::NotTokenOwner);
        }

        let root = self.lineage_root(token_id);
        let manager = self.require_manager();

        if !self.is_minting_holder(token_id, root, caller, manager) {
            let (signature, signer) = match (signature, signer) {
                (Some(sig), Some(pk)) => (sig, pk),
                _ => self.env().revert(WrapError::InvalidSignature),
            };
            let message = self.unwrap_digest(to, token_id);
            if !self.env().verify_signature(&message, &signature, &signer) {
                self.env().revert(WrapError::InvalidSignature);
            }
            let signer_addr = Address::Account(signer.to_account_hash());
            let largest = self.largest_holder(root);
            if signer_addr != manager && Some(signer_addr) != largest {
                self.env().revert(WrapError::InvalidSignature);
            }
        }

        let asset = self.assets.get(&token_id).unwrap_or_default();
        let amount = asset.underlying_amount;
        let underlying = self.require_underlying();

        // Ledger state is deleted before the external transfer
        self.listings.set(&token_id, ListInfo::default());
        self.assets.set(&token_id, AssetInfo::default());
        self.owners.set(&token_id, None);
        self.minters.set(&token_id, None);
        if root == token_id {
            let or = self.or_states.get(&root).unwrap_or_default();
            for holder in &or.holders {
                self.o_balances.set(&(root, *holder), U256::zero());
            }
            self.fr_states.set(&root, FrState::default());
            self.or_states.set(&root, OrState::default());
        }
        self.lineage.set(&token_id, 0u64);

        self.token_transfer(underlying, to, amount);
    }

    /// Message bytes a signer must sign to authorize `unwrap(to, token_id)`
    pub fn unwrap_digest(&self, to: Address, token_id: u64) -> Bytes {
        let mut data = Vec::new();
        data.extend_from_slice(DOMAIN_NAME.as_bytes());
        data.extend_from_slice(DOMAIN_VERSION.as_bytes());
        data.extend_from_slice(&DOMAIN_SALT.to_le_bytes());
        data.extend_from_slice(
            &self
                .env()
                .self_address()
                .to_bytes()
                .unwrap_or_default(),
        );
        data.extend_from_slice(&to.to_bytes().unwrap_or_default());
        data.extend_from_slice(&token_id.to_le_bytes());
        Bytes::from(data)
    }

    // ========== Ownership transfers ==========

    /// Transfer a whole token to a new owner
    pub fn transfer_token(&mut self, to: Address, token_id: u64) {
        self.require_facet("transfer_token");
        self.require_token_owner(token_id);
        self.owners.set(&token_id, Some(to));
    }

    /// Transfer part of a token's underlying to a new owner.
    ///
    /// A strict fraction mints a lineage child token to `to`; the full
    /// holding degrades to a whole transfer.
    pub fn transfer_token_fractional(&mut self, to: Address, token_id: u64, amount: U256) {
        self.require_facet("transfer_token_fractional");
        self.require_token_owner(token_id);

        if amount.is_zero() {
            self.env().revert(WrapError::ZeroAmount);
        }
        let mut asset = self.assets.get(&token_id).unwrap_or_default();
        if amount > asset.underlying_amount {
            self.env().revert(WrapError::InsufficientTokenBalance);
        }

        if amount == asset.underlying_amount {
            self.owners.set(&token_id, Some(to));
            return;
        }

        let root = self.lineage_root(token_id);
        self.mint_child(root, to, amount);
        asset.underlying_amount -= amount;
        self.assets.set(&token_id, asset);
    }

    // ========== oToken ledger ==========

    /// Move oToken balance on the token's lineage root
    pub fn transfer_o_tokens(&mut self, to: Address, token_id: u64, amount: U256) {
        self.require_facet("transfer_o_tokens");

        let caller = self.env().caller();
        if to == caller {
            self.env().revert(WrapError::TransferToSelf);
        }
        if amount.is_zero() {
            self.env().revert(WrapError::ZeroAmount);
        }

        let root = self.lineage_root(token_id);
        let from_balance = self.o_balances.get(&(root, caller)).unwrap_or_default();
        if from_balance < amount {
            self.env().revert(WrapError::InsufficientOBalance);
        }

        self.o_balances.set(&(root, caller), from_balance - amount);
        let to_balance = self.o_balances.get(&(root, to)).unwrap_or_default();
        self.o_balances.set(&(root, to), to_balance + amount);

        // Holder membership is append-only; zeroed holders stay listed
        let mut or = self.or_states.get(&root).unwrap_or_default();
        if !or.holders.contains(&to) {
            or.holders.push(to);
            self.or_states.set(&root, or);
        }
    }

    // ========== Market ==========

    /// List `amount` of the token's underlying for a total price
    pub fn list(&mut self, token_id: u64, amount: U256, price: U256) {
        self.require_facet("list");
        let caller = self.require_token_owner(token_id);

        if amount.is_zero() {
            self.env().revert(WrapError::ZeroAmount);
        }
        let asset = self.assets.get(&token_id).unwrap_or_default();
        if amount > asset.underlying_amount {
            self.env().revert(WrapError::InsufficientTokenBalance);
        }

        self.listings.set(
            &token_id,
            ListInfo {
                price,
                amount,
                lister: Some(caller),
                active: true,
            },
        );
    }

    /// Cancel the caller's active listing, no funds move
    pub fn cancel_list(&mut self, token_id: u64) {
        self.require_facet("cancel_list");
        self.require_token_owner(token_id);

        let listing = self.listings.get(&token_id).unwrap_or_default();
        if !listing.active {
            self.env().revert(WrapError::NotListed);
        }
        self.listings.set(&token_id, ListInfo::default());
    }

    /// Buy `amount` of a listed token.
    ///
    /// Native lineages take the payment from the attached value; CEP-18
    /// lineages pull it from the buyer's allowance. Royalties are credited
    /// to the claimable ledgers, the seller receives the remainder
    /// immediately, and the buyer joins the generation window.
    #[odra(payable)]
    pub fn buy(&mut self, token_id: u64, amount: U256) {
        self.require_facet("buy");

        let buyer = self.env().caller();
        let listing = self.listings.get(&token_id).unwrap_or_default();
        if !listing.active {
            self.env().revert(WrapError::NotListed);
        }
        if amount.is_zero() {
            self.env().revert(WrapError::ZeroAmount);
        }
        if amount > listing.amount {
            self.env().revert(WrapError::BuyExceedsListing);
        }

        let seller = match listing.lister {
            Some(addr) => addr,
            None => self.env().revert(WrapError::NotListed),
        };

        let root = self.lineage_root(token_id);
        let asset = self.assets.get(&token_id).unwrap_or_default();
        let mut fr = self.fr_states.get(&root).unwrap_or_default();
        let or = self.or_states.get(&root).unwrap_or_default();

        let due = listing.price * amount / listing.amount;

        // Payment intake
        match or.payment_token {
            None => {
                let attached = u512_to_u256(self.env().attached_value());
                if attached < due {
                    self.env().revert(WrapError::InsufficientPayment);
                }
            }
            Some(token) => {
                let proxy = self.env().self_address();
                self.token_transfer_from(token, buyer, proxy, due);
            }
        }

        // Royalty shares: FR only on profit, OR on the sale price when the
        // lineage has no profit yet
        let profit = rewards::sale_profit(
            due,
            fr.last_sold_price,
            amount,
            asset.total_supply_at_mint,
        );
        let (or_share, fr_share) = if profit.is_zero() {
            (rewards::mul_scale(due, or.proportional_o_ratio), U256::zero())
        } else {
            (
                rewards::mul_scale(profit, or.proportional_o_ratio),
                rewards::mul_scale(profit, fr.percent_of_profit),
            )
        };

        // OR pro-rata over current oToken balances
        for holder in &or.holders {
            let balance = self.o_balances.get(&(root, *holder)).unwrap_or_default();
            let cut = rewards::pro_rata(or_share, balance, rewards::scale());
            self.credit_or(or.payment_token, *holder, cut);
        }

        // FR over the window excluding its newest entry, the seller
        let window_len = fr.generation_window.len().saturating_sub(1);
        let mut fr_paid = U256::zero();
        if !fr_share.is_zero() && window_len > 0 {
            let weights = rewards::window_weights(fr.successive_ratio, window_len);
            let total: U256 = weights.iter().fold(U256::zero(), |acc, w| acc + *w);
            for (i, member) in fr.generation_window[..window_len].iter().enumerate() {
                let cut = rewards::pro_rata(fr_share, weights[i], total);
                self.credit_fr(or.payment_token, *member, cut);
            }
            fr_paid = fr_share;
        }

        let seller_proceeds = due - or_share - fr_paid;

        // Window and price bookkeeping
        fr.last_sold_price = due;
        fr.owner_count += 1;
        fr.generation_window.push(buyer);
        while fr.generation_window.len() > fr.num_generations as usize {
            fr.generation_window.remove(0);
        }
        self.fr_states.set(&root, fr);

        // Listing shrinks with the sold quantity, price reduced pro-rata
        let mut listing = listing;
        listing.amount -= amount;
        listing.price -= due;
        if listing.amount.is_zero() {
            listing = ListInfo::default();
        }
        self.listings.set(&token_id, listing);

        // Ownership movement
        let mut asset = asset;
        if amount == asset.underlying_amount {
            self.owners.set(&token_id, Some(buyer));
        } else {
            self.mint_child(root, buyer, amount);
            asset.underlying_amount -= amount;
            self.assets.set(&token_id, asset);
        }

        // Seller payout goes last
        match or.payment_token {
            None => self
                .env()
                .transfer_tokens(&seller, &u256_to_u512(seller_proceeds)),
            Some(token) => self.token_transfer(token, seller, seller_proceeds),
        }
    }

    // ========== Claims ==========

    /// Pay out an address's accrued native FR balance
    pub fn release_fr(&mut self, addr: Address) {
        self.require_facet("release_fr");
        let amount = self.allotted_fr.get(&addr).unwrap_or_default();
        if amount.is_zero() {
            self.env().revert(WrapError::NoFrPaymentDue);
        }
        self.allotted_fr.set(&addr, U256::zero());
        self.env().transfer_tokens(&addr, &u256_to_u512(amount));
    }

    /// Pay out an address's accrued native OR balance
    pub fn release_or(&mut self, addr: Address) {
        self.require_facet("release_or");
        let amount = self.allotted_or.get(&addr).unwrap_or_default();
        if amount.is_zero() {
            self.env().revert(WrapError::NoOrPaymentDue);
        }
        self.allotted_or.set(&addr, U256::zero());
        self.env().transfer_tokens(&addr, &u256_to_u512(amount));
    }

    /// Pay out an address's accrued balance in a CEP-18 payment token
    pub fn release_allotted_tokens(&mut self, addr: Address, token: Address) {
        self.require_facet("release_allotted_tokens");
        let amount = self.allotted_tokens.get(&(addr, token)).unwrap_or_default();
        if amount.is_zero() {
            self.env().revert(WrapError::NoPaymentDue);
        }
        self.allotted_tokens.set(&(addr, token), U256::zero());
        self.token_transfer(token, addr, amount);
    }

    // ========== Manager policy ==========

    /// Change the oToken share minted to the manager (manager only)
    pub fn set_manager_cut(&mut self, value: U256) {
        self.require_facet("set_manager_cut");
        if self.manager.get().flatten() != Some(self.env().caller()) {
            self.env().revert(WrapError::NotPermitted);
        }
        if !rewards::validate_ratio(value) {
            self.env().revert(WrapError::ManagerCutOutOfRange);
        }
        self.manager_cut.set(value);
    }

    // ========== Accessors ==========

    /// FR state of the token's lineage
    pub fn get_fr_info(&self, token_id: u64) -> FrState {
        self.require_facet("get_fr_info");
        let root = self.lineage_root(token_id);
        self.fr_states.get(&root).unwrap_or_default()
    }

    /// OR state of the token's lineage
    pub fn get_or_info(&self, token_id: u64) -> OrState {
        self.require_facet("get_or_info");
        let root = self.lineage_root(token_id);
        self.or_states.get(&root).unwrap_or_default()
    }

    /// Underlying bookkeeping of a token id
    pub fn get_asset_info(&self, token_id: u64) -> AssetInfo {
        self.require_facet("get_asset_info");
        self.assets.get(&token_id).unwrap_or_default()
    }

    /// Active listing of a token id
    pub fn get_list_info(&self, token_id: u64) -> ListInfo {
        self.require_facet("get_list_info");
        self.listings.get(&token_id).unwrap_or_default()
    }

    /// Manager principal and current cut
    pub fn get_manager_info(&self) -> ManagerInfo {
        self.require_facet("get_manager_info");
        ManagerInfo {
            manager: self.manager.get().flatten(),
            manager_cut: self.manager_cut.get().unwrap_or_default(),
        }
    }

    /// Accrued native FR balance of an address
    pub fn get_allotted_fr(&self, addr: Address) -> U256 {
        self.require_facet("get_allotted_fr");
        self.allotted_fr.get(&addr).unwrap_or_default()
    }

    /// Accrued native OR balance of an address
    pub fn get_allotted_or(&self, addr: Address) -> U256 {
        self.require_facet("get_allotted_or");
        self.allotted_or.get(&addr).unwrap_or_default()
    }

    /// Accrued balance of an address in a CEP-18 payment token
    pub fn get_allotted_tokens(&self, addr: Address, token: Address) -> U256 {
        self.require_facet("get_allotted_tokens");
        self.allotted_tokens.get(&(addr, token)).unwrap_or_default()
    }

    /// oToken balance of a holder on the token's lineage
    pub fn balance_of_o_tokens(&self, token_id: u64, holder: Address) -> U256 {
        self.require_facet("balance_of_o_tokens");
        let root = self.lineage_root(token_id);
        self.o_balances.get(&(root, holder)).unwrap_or_default()
    }

    /// Current owner of a token id
    pub fn owner_of(&self, token_id: u64) -> Option<Address> {
        self.require_facet("owner_of");
        self.owners.get(&token_id).flatten()
    }

    /// Underlying CEP-18 asset of this proxy
    pub fn get_underlying_token(&self) -> Option<Address> {
        self.require_facet("get_underlying_token");
        self.underlying.get().flatten()
    }

    /// Facet registry gating this proxy
    pub fn get_registry(&self) -> Option<Address> {
        self.registry.get()
    }

    // ========== Internal ==========

    fn require_facet(&self, selector: &str) {
        let registry = match self.registry.get() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::NotBound),
        };
        let args = runtime_args! {
            "selector" => String::from(selector)
        };
        let call_def = CallDef::new("resolve", false, args);
        let facet: Option<Address> = self.env().call_contract(registry, call_def);
        if facet.is_none() {
            self.env().revert(WrapError::ImplementationNotContract);
        }
    }

    fn require_underlying(&self) -> Address {
        match self.underlying.get().flatten() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::NotBound),
        }
    }

    fn require_manager(&self) -> Address {
        match self.manager.get().flatten() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::NotBound),
        }
    }

    fn require_token_owner(&self, token_id: u64) -> Address {
        let caller = self.env().caller();
        if self.owners.get(&token_id).flatten() != Some(caller) {
            self.env().revert(WrapError::NotTokenOwner);
        }
        caller
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_token_id.get().unwrap_or(1u64);
        self.next_token_id.set(id + 1);
        id
    }

    fn lineage_root(&self, token_id: u64) -> u64 {
        let root = self.lineage.get(&token_id).unwrap_or(0u64);
        if root == 0 {
            token_id
        } else {
            root
        }
    }

    /// Mint a lineage child sharing the root's FR/OR state and oToken ledger
    fn mint_child(&mut self, root: u64, to: Address, amount: U256) -> u64 {
        let token_id = self.next_id();
        self.owners.set(&token_id, Some(to));
        self.minters.set(&token_id, Some(to));
        self.assets.set(
            &token_id,
            AssetInfo {
                underlying_amount: amount,
                total_supply_at_mint: amount,
            },
        );
        self.lineage.set(&token_id, root);
        token_id
    }

    /// Whether `caller` may unwrap without a signature: the original minter
    /// who is still the first non-manager holder of the lineage
    fn is_minting_holder(
        &self,
        token_id: u64,
        root: u64,
        caller: Address,
        manager: Address,
    ) -> bool {
        if self.minters.get(&token_id).flatten() != Some(caller) {
            return false;
        }
        let or = self.or_states.get(&root).unwrap_or_default();
        or.holders.iter().find(|h| **h != manager) == Some(&caller)
    }

    /// Largest current oToken holder; the first holder reaching the maximum
    /// in list order wins ties
    fn largest_holder(&self, root: u64) -> Option<Address> {
        let or = self.or_states.get(&root).unwrap_or_default();
        let mut best: Option<(Address, U256)> = None;
        for holder in &or.holders {
            let balance = self.o_balances.get(&(root, *holder)).unwrap_or_default();
            match best {
                Some((_, max)) if balance <= max => {}
                _ => best = Some((*holder, balance)),
            }
        }
        best.map(|(addr, _)| addr)
    }

    fn credit_fr(&mut self, payment_token: Option<Address>, addr: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        match payment_token {
            None => {
                let current = self.allotted_fr.get(&addr).unwrap_or_default();
                self.allotted_fr.set(&addr, current + amount);
            }
            Some(token) => {
                let current = self.allotted_tokens.get(&(addr, token)).unwrap_or_default();
                self.allotted_tokens.set(&(addr, token), current + amount);
            }
        }
    }

    fn credit_or(&mut self, payment_token: Option<Address>, addr: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        match payment_token {
            None => {
                let current = self.allotted_or.get(&addr).unwrap_or_default();
                self.allotted_or.set(&addr, current + amount);
            }
            Some(token) => {
                let current = self.allotted_tokens.get(&(addr, token)).unwrap_or_default();
                self.allotted_tokens.set(&(addr, token), current + amount);
            }
        }
    }

    fn token_transfer_from(&self, token: Address, owner: Address, recipient: Address, amount: U256) {
        let args = runtime_args! {
            "owner" => owner,
            "recipient" => recipient,
            "amount" => amount
        };
        let call_def = CallDef::new("transfer_from", true, args);
        let _: bool = self.env().call_contract(token, call_def);
    }

    fn token_transfer(&self, token: Address, recipient: Address, amount: U256) {
        let args = runtime_args! {
            "recipient" => recipient,
            "amount" => amount
        };
        let call_def = CallDef::new("transfer", true, args);
        let _: bool = self.env().call_contract(token, call_def);
    }
}

// ===== Helper Functions =====

/// Convert U512 to U256 by taking the lower 256 bits
fn u512_to_u256(value: U512) -> U256 {
    let mut bytes = [0u8; 64];
    value.to_little_endian(&mut bytes);
    U256::from_little_endian(&bytes[..32])
}

/// Convert U256 to U512
fn u256_to_u512(value: U256) -> U512 {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}
