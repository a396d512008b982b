//! Deploy contracts to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000

use odra::casper_types::U256;
use odra::host::{Deployer, NoArgs};
use odra::prelude::*;

use crypto_wrap_contracts::cep18_token::{Cep18Token, Cep18TokenInitArgs};
use crypto_wrap_contracts::facet_registry::FacetRegistry;
use crypto_wrap_contracts::manager::{WrapManager, WrapManagerInitArgs};
use crypto_wrap_contracts::types::{FacetCut, FacetCutAction};
use crypto_wrap_contracts::wrap_proxy::{WrapProxy, WrapProxyInitArgs};

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== Crypto Wrap Livenet Deployment ===");
    println!();

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount: u64 = std::env::var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(200_000_000_000);
    env.set_gas(payment_amount);

    // Get deployer address
    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    // Policy parameters
    let manager_cut = U256::from(300_000_000_000_000_000u128); // 0.30

    // ==================== Phase 1: Independent Contracts ====================
    println!("=== Phase 1: Deploying Independent Contracts ===");
    println!();

    // 1. FacetRegistry
    println!("Deploying FacetRegistry...");
    let mut registry = FacetRegistry::deploy(&env, NoArgs);
    let registry_addr = registry.address().clone();
    println!("FacetRegistry deployed at: {:?}", registry_addr);

    // 2. Underlying Cep18Token
    println!("Deploying Cep18Token (underlying)...");
    let underlying = Cep18Token::deploy(
        &env,
        Cep18TokenInitArgs {
            name: String::from("Wrapped Underlying"),
            symbol: String::from("WUND"),
            decimals: 18,
        },
    );
    let underlying_addr = underlying.address().clone();
    println!("Cep18Token deployed at: {:?}", underlying_addr);

    println!();

    // ==================== Phase 2: Manager and Blank Proxy ====================
    println!("=== Phase 2: Deploying Manager and Blank Proxy ===");
    println!();

    // 3. WrapManager
    println!("Deploying WrapManager...");
    let mut manager = WrapManager::deploy(
        &env,
        WrapManagerInitArgs {
            registry: registry_addr,
        },
    );
    let manager_addr = manager.address().clone();
    println!("WrapManager deployed at: {:?}", manager_addr);

    // 4. Blank WrapProxy
    println!("Deploying WrapProxy (blank)...");
    let proxy = WrapProxy::deploy(
        &env,
        WrapProxyInitArgs {
            registry: registry_addr,
            binder: manager_addr,
        },
    );
    let proxy_addr = proxy.address().clone();
    println!("WrapProxy deployed at: {:?}", proxy_addr);

    println!();

    // ==================== Phase 3: Wire-up ====================
    println!("=== Phase 3: Cross-contract Configuration ===");
    println!();

    // Install the proxy surface in the registry
    println!("Installing core selectors...");
    registry.diamond_cut(
        vec![FacetCut {
            action: FacetCutAction::Add,
            target: Some(proxy_addr),
            selectors: proxy.core_selectors(),
        }],
        None,
        None,
    );
    println!("Done.");

    // Stage and bind the proxy for the underlying asset
    println!("Staging proxy...");
    manager.stage_proxy(proxy_addr);
    println!("Done.");

    println!("Binding proxy to underlying...");
    let bound_addr = manager.deploy_crypto_proxy(
        underlying_addr,
        deployer,
        manager_cut,
        String::from("Wrapped Underlying Collection"),
        String::from("wWUND"),
        String::from("https://example.com/wrapped/"),
    );
    println!("Proxy bound at: {:?}", bound_addr);

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Contract Addresses:");
    println!("  FacetRegistry: {:?}", registry_addr);
    println!("  Cep18Token:    {:?}", underlying_addr);
    println!("  WrapManager:   {:?}", manager_addr);
    println!("  WrapProxy:     {:?}", bound_addr);
}
