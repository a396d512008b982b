//! Manager contract: proxy instantiation and the global proxy list.
//!
//! Contracts cannot install other contracts on Casper, so proxy creation is
//! a stage-then-bind flow: the deployer installs blank proxies and hands
//! them to the manager, and `deploy_crypto_proxy` later pops one, binds it
//! to an underlying asset and records it. `preview_proxy_address` exposes
//! the address the next deployment will return.

use odra::prelude::*;
use odra::casper_types::{runtime_args, RuntimeArgs, U256};
use odra::CallDef;
use crate::errors::WrapError;

/// Wrap manager contract
#[odra::module]
pub struct WrapManager {
    /// Manager owner, the only principal allowed to stage and deploy
    owner: Var<Address>,
    /// Facet registry the managed proxies are gated by
    registry: Var<Address>,
    /// Blank proxies waiting to be bound, used from the back
    staged: Var<Vec<Address>>,
    /// Underlying asset to proxy
    proxies: Mapping<Address, Option<Address>>,
    /// All deployed proxies in deployment order
    proxy_list: Var<Vec<Address>>,
}

#[odra::module]
impl WrapManager {
    /// Initialize the manager; the deployer becomes the owner
    pub fn init(&mut self, registry: Address) {
        self.owner.set(self.env().caller());
        self.registry.set(registry);
        self.staged.set(Vec::new());
        self.proxy_list.set(Vec::new());
    }

    /// Hand a blank proxy over to the staging pool (owner only)
    pub fn stage_proxy(&mut self, proxy: Address) {
        self.require_owner();
        let mut staged = self.staged.get().unwrap_or_default();
        staged.push(proxy);
        self.staged.set(staged);
    }

    /// Address the next `deploy_crypto_proxy` call will return
    pub fn preview_proxy_address(&self) -> Option<Address> {
        self.staged.get().unwrap_or_default().last().copied()
    }

    /// Bind the next staged proxy to an underlying asset (owner only).
    ///
    /// Returns the proxy address, identical to the preview taken before
    /// the call.
    pub fn deploy_crypto_proxy(
        &mut self,
        underlying: Address,
        manager: Address,
        manager_cut: U256,
        name: String,
        symbol: String,
        uri_prefix: String,
    ) -> Address {
        self.require_owner();

        if self.proxies.get(&underlying).flatten().is_some() {
            self.env().revert(WrapError::ProxyAlreadyDeployed);
        }

        let mut staged = self.staged.get().unwrap_or_default();
        let proxy = match staged.pop() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::NoStagedProxy),
        };
        self.staged.set(staged);

        let args = runtime_args! {
            "underlying" => underlying,
            "manager" => manager,
            "manager_cut" => manager_cut,
            "name" => name,
            "symbol" => symbol,
            "uri_prefix" => uri_prefix
        };
        let call_def = CallDef::new("bind", true, args);
        let () = self.env().call_contract(proxy, call_def);

        self.proxies.set(&underlying, Some(proxy));
        let mut list = self.proxy_list.get().unwrap_or_default();
        list.push(proxy);
        self.proxy_list.set(list);

        proxy
    }

    /// Get the proxy deployed for an underlying asset
    pub fn get_proxy(&self, underlying: Address) -> Option<Address> {
        self.proxies.get(&underlying).flatten()
    }

    /// Get all deployed proxies in deployment order
    pub fn get_proxy_list(&self) -> Vec<Address> {
        self.proxy_list.get().unwrap_or_default()
    }

    /// Get the facet registry address
    pub fn get_registry(&self) -> Option<Address> {
        self.registry.get()
    }

    /// Get the manager owner
    pub fn get_owner(&self) -> Option<Address> {
        self.owner.get()
    }

    fn require_owner(&self) {
        let caller = self.env().caller();
        if self.owner.get() != Some(caller) {
            self.env().revert(WrapError::NotOwner);
        }
    }
}
