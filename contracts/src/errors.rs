//! Protocol error definitions.

use odra::prelude::*;

/// Wrap protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WrapError {
    // Wrap parameter errors (1xx)
    NumGenerationsOutOfRange = 100,
    RewardRatioOutOfRange = 101,
    ORatioOutOfRange = 102,
    ManagerCutOutOfRange = 103,

    // Dispatch and cut errors (2xx)
    SelectorAlreadyExists = 200,
    SelectorNotFound = 201,
    RemoveTargetNotZero = 202,
    ReplaceSameModule = 203,
    ImplementationNotContract = 204,

    // Access errors (3xx)
    NotOwner = 300,
    NotPermitted = 301,
    NotTokenOwner = 302,

    // oToken ledger errors (4xx)
    TransferToSelf = 400,
    ZeroAmount = 401,
    InsufficientOBalance = 402,

    // Market errors (5xx)
    NotListed = 500,
    BuyExceedsListing = 501,
    InsufficientPayment = 502,
    InsufficientTokenBalance = 503,
    InsufficientTokenAllowance = 504,

    // Signature errors (6xx)
    InvalidSignature = 600,

    // Claim errors (7xx)
    NoPaymentDue = 700,
    NoFrPaymentDue = 701,
    NoOrPaymentDue = 702,

    // Manager and lifecycle errors (8xx)
    NoStagedProxy = 800,
    ProxyAlreadyDeployed = 801,
    AlreadyBound = 802,
    NotBound = 803,
}

impl WrapError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Wrap parameters
            WrapError::NumGenerationsOutOfRange => "Number of generations out of range",
            WrapError::RewardRatioOutOfRange => "Reward ratio out of range",
            WrapError::ORatioOutOfRange => "Ownership ratio out of range",
            WrapError::ManagerCutOutOfRange => "Manager cut out of range",

            // Dispatch and cuts
            WrapError::SelectorAlreadyExists => "Selector already registered to a facet",
            WrapError::SelectorNotFound => "Selector not registered",
            WrapError::RemoveTargetNotZero => "Remove cut must not name a facet",
            WrapError::ReplaceSameModule => "Replace cut targets the same facet",
            WrapError::ImplementationNotContract => "No facet installed for this entry point",

            // Access
            WrapError::NotOwner => "Caller is not the owner",
            WrapError::NotPermitted => "Caller is not permitted",
            WrapError::NotTokenOwner => "Caller does not own this token",

            // oToken ledger
            WrapError::TransferToSelf => "Cannot transfer oTokens to self",
            WrapError::ZeroAmount => "Amount must be positive",
            WrapError::InsufficientOBalance => "Insufficient oToken balance",

            // Market
            WrapError::NotListed => "Token is not listed for sale",
            WrapError::BuyExceedsListing => "Buy amount exceeds listed amount",
            WrapError::InsufficientPayment => "Payment does not cover the sale price",
            WrapError::InsufficientTokenBalance => "Insufficient token balance",
            WrapError::InsufficientTokenAllowance => "Insufficient token allowance",

            // Signatures
            WrapError::InvalidSignature => "Signature invalid or signer not authorized",

            // Claims
            WrapError::NoPaymentDue => "No payment due",
            WrapError::NoFrPaymentDue => "No fractional royalty payment due",
            WrapError::NoOrPaymentDue => "No ownership royalty payment due",

            // Manager and lifecycle
            WrapError::NoStagedProxy => "No staged proxy available",
            WrapError::ProxyAlreadyDeployed => "Proxy already deployed for this underlying",
            WrapError::AlreadyBound => "Proxy already bound",
            WrapError::NotBound => "Proxy not bound yet",
        }
    }
}

impl core::fmt::Display for WrapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<WrapError> for OdraError {
    fn from(error: WrapError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
