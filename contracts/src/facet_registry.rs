//! Facet registry: selector to facet table with batched diamond cuts.
//!
//! Selectors are entry point names. Proxies gate every public entry point
//! on `resolve`, so removing a selector disables the matching operation on
//! every proxy bound to this registry while their ledger state stays put.

use odra::prelude::*;
use odra::casper_types::RuntimeArgs;
use odra::CallDef;
use crate::errors::WrapError;
use crate::types::{FacetCut, FacetCutAction};

/// Facet registry contract
#[odra::module]
pub struct FacetRegistry {
    /// Registry owner, the only principal allowed to cut
    owner: Var<Address>,
    /// Selector to facet table; `None` means uninstalled
    selector_to_facet: Mapping<String, Option<Address>>,
    /// Reverse index: selectors registered per facet
    facet_selectors: Mapping<Address, Vec<String>>,
    /// Facets with at least one registered selector
    facet_list: Var<Vec<Address>>,
}

#[odra::module]
impl FacetRegistry {
    /// Initialize the registry; the deployer becomes the owner
    pub fn init(&mut self) {
        self.owner.set(self.env().caller());
        self.facet_list.set(Vec::new());
    }

    /// Apply a batch of cuts, then optionally invoke a migration initializer.
    ///
    /// Entries are validated and applied in order. Any failure, including a
    /// revert inside the initializer, aborts the whole batch.
    pub fn diamond_cut(
        &mut self,
        cuts: Vec<FacetCut>,
        init_target: Option<Address>,
        init_entry_point: Option<String>,
    ) {
        self.require_owner();

        for cut in cuts {
            match cut.action {
                FacetCutAction::Add => {
                    let facet = self.require_target(cut.target);
                    for selector in cut.selectors {
                        if self.resolve(selector.clone()).is_some() {
                            self.env().revert(WrapError::SelectorAlreadyExists);
                        }
                        self.register(selector, facet);
                    }
                }
                FacetCutAction::Replace => {
                    let facet = self.require_target(cut.target);
                    for selector in cut.selectors {
                        let current = match self.resolve(selector.clone()) {
                            Some(addr) => addr,
                            None => self.env().revert(WrapError::SelectorNotFound),
                        };
                        if current == facet {
                            self.env().revert(WrapError::ReplaceSameModule);
                        }
                        self.unregister(&selector, current);
                        self.register(selector, facet);
                    }
                }
                FacetCutAction::Remove => {
                    if cut.target.is_some() {
                        self.env().revert(WrapError::RemoveTargetNotZero);
                    }
                    for selector in cut.selectors {
                        let current = match self.resolve(selector.clone()) {
                            Some(addr) => addr,
                            None => self.env().revert(WrapError::SelectorNotFound),
                        };
                        self.unregister(&selector, current);
                    }
                }
            }
        }

        if let Some(target) = init_target {
            let entry_point = match init_entry_point {
                Some(ep) => ep,
                None => self.env().revert(WrapError::SelectorNotFound),
            };
            let call_def = CallDef::new(entry_point, true, RuntimeArgs::new());
            let () = self.env().call_contract(target, call_def);
        }
    }

    /// Resolve a selector to its installed facet
    pub fn resolve(&self, selector: String) -> Option<Address> {
        self.selector_to_facet.get(&selector).flatten()
    }

    /// All facets with at least one registered selector
    pub fn facet_addresses(&self) -> Vec<Address> {
        self.facet_list.get().unwrap_or_default()
    }

    /// Selectors registered to a facet
    pub fn facet_function_selectors(&self, facet: Address) -> Vec<String> {
        self.facet_selectors.get(&facet).unwrap_or_default()
    }

    /// Transfer registry ownership (owner only)
    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        self.owner.set(new_owner);
    }

    /// Get the registry owner
    pub fn get_owner(&self) -> Option<Address> {
        self.owner.get()
    }

    fn require_owner(&self) {
        let caller = self.env().caller();
        if self.owner.get() != Some(caller) {
            self.env().revert(WrapError::NotOwner);
        }
    }

    fn require_target(&self, target: Option<Address>) -> Address {
        match target {
            Some(addr) => addr,
            None => self.env().revert(WrapError::ImplementationNotContract),
        }
    }

    fn register(&mut self, selector: String, facet: Address) {
        self.selector_to_facet.set(&selector, Some(facet));

        let mut selectors = self.facet_selectors.get(&facet).unwrap_or_default();
        if selectors.is_empty() {
            let mut facets = self.facet_list.get().unwrap_or_default();
            facets.push(facet);
            self.facet_list.set(facets);
        }
        selectors.push(selector);
        self.facet_selectors.set(&facet, selectors);
    }

    fn unregister(&mut self, selector: &str, facet: Address) {
        self.selector_to_facet.set(&String::from(selector), None);

        let mut selectors = self.facet_selectors.get(&facet).unwrap_or_default();
        selectors.retain(|s| s != selector);
        if selectors.is_empty() {
            let mut facets = self.facet_list.get().unwrap_or_default();
            facets.retain(|f| *f != facet);
            self.facet_list.set(facets);
        }
        self.facet_selectors.set(&facet, selectors);
    }
}
