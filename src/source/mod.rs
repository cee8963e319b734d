//! Supply sources: the typed, closed set of ways a per-chain figure is produced
//!
//! Every source resolves to a [`Balance`] for one role on one chain, or fails.
//! A failure is never disguised as an empty or zero balance.

pub mod chain_api;

pub use chain_api::{ChainApi, ChainApiProvider, EvmChainApi, RpcChainApiProvider};

use crate::errors::{SourceError, SourceResult};
use crate::types::{Balance, PegType};
use crate::utils::units::{scale_raw_amount, scale_raw_i128};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Per-invocation inputs handed to a supply source
#[derive(Clone)]
pub struct SourceContext {
    pub chain: String,
    pub timestamp: i64,
    pub reference_block: Option<u64>,
    pub chain_blocks: BTreeMap<String, u64>,
    provider: Arc<dyn ChainApiProvider>,
}

impl SourceContext {
    pub fn new(
        chain: &str,
        timestamp: i64,
        reference_block: Option<u64>,
        chain_blocks: BTreeMap<String, u64>,
        provider: Arc<dyn ChainApiProvider>,
    ) -> Self {
        Self {
            chain: chain.to_string(),
            timestamp,
            reference_block,
            chain_blocks,
            provider,
        }
    }

    /// Same run inputs, bound to another chain
    pub fn for_chain(&self, chain: &str) -> Self {
        Self {
            chain: chain.to_string(),
            ..self.clone()
        }
    }

    /// API handle for the chain being collected
    pub fn api(&self) -> SourceResult<Arc<dyn ChainApi>> {
        self.provider.api_for(&self.chain)
    }

    /// API handle for another chain (bridge custody lives elsewhere)
    pub fn api_for(&self, chain: &str) -> SourceResult<Arc<dyn ChainApi>> {
        self.provider.api_for(chain)
    }

    pub fn block_for(&self, chain: &str) -> Option<u64> {
        self.chain_blocks.get(chain).copied()
    }
}

/// Escape hatch for figures no built-in variant covers (non-EVM chains, HTTP indexers)
#[async_trait]
pub trait CustomSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, ctx: &SourceContext) -> SourceResult<Balance>;
}

/// How a provenance label is attached to a bridged figure
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeLabel {
    /// Merge contributions under this name instead of per address
    pub bridge: Option<String>,
    pub bridged_from: Option<String>,
}

/// One way of producing a figure for a (chain, role)
#[derive(Clone)]
pub enum SupplySource {
    /// Total issued on the home chain; decimals read on-chain when not given
    NativeIssued {
        peg_type: PegType,
        tokens: Vec<String>,
        decimals: Option<u32>,
    },
    /// Issued tokens held by reserve or custody addresses
    EscrowedReserve {
        peg_type: PegType,
        tokens: Vec<String>,
        holders: Vec<String>,
        decimals: Option<u32>,
        query_chain: Option<String>,
    },
    /// Total issued of wrapped copies on a foreign chain
    BridgedIn {
        peg_type: PegType,
        query_chain: Option<String>,
        tokens: Vec<String>,
        decimals: u32,
        label: BridgeLabel,
    },
    /// Bridge contract issuance minus balances parked at reserve addresses
    BridgeMinusReserve {
        peg_type: PegType,
        query_chain: Option<String>,
        bridge_address: String,
        reserves: Vec<String>,
        decimals: u32,
        label: BridgeLabel,
    },
    /// Static figure from configuration
    Fixed {
        peg_type: PegType,
        amount: f64,
        label: Option<String>,
    },
    Custom(Arc<dyn CustomSource>),
}

impl fmt::Debug for SupplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())?;
        match self {
            SupplySource::NativeIssued { tokens, .. } => write!(f, "({})", tokens.join(",")),
            SupplySource::EscrowedReserve {
                tokens, holders, ..
            } => write!(f, "({} held by {})", tokens.join(","), holders.join(",")),
            SupplySource::BridgedIn { tokens, .. } => write!(f, "({})", tokens.join(",")),
            SupplySource::BridgeMinusReserve { bridge_address, .. } => {
                write!(f, "({})", bridge_address)
            }
            SupplySource::Fixed { amount, .. } => write!(f, "({})", amount),
            SupplySource::Custom(source) => write!(f, "({})", source.name()),
        }
    }
}

impl SupplySource {
    pub fn kind(&self) -> &'static str {
        match self {
            SupplySource::NativeIssued { .. } => "native-issued",
            SupplySource::EscrowedReserve { .. } => "escrowed-reserve",
            SupplySource::BridgedIn { .. } => "bridged-in",
            SupplySource::BridgeMinusReserve { .. } => "bridge-minus-reserve",
            SupplySource::Fixed { .. } => "fixed",
            SupplySource::Custom(_) => "custom",
        }
    }

    /// Whether the source needs a chain API (as opposed to static or custom data)
    pub fn is_on_chain(&self) -> bool {
        !matches!(self, SupplySource::Fixed { .. } | SupplySource::Custom(_))
    }

    /// Chain whose API this source queries
    pub fn query_chain<'a>(&'a self, chain: &'a str) -> &'a str {
        match self {
            SupplySource::EscrowedReserve { query_chain, .. }
            | SupplySource::BridgedIn { query_chain, .. }
            | SupplySource::BridgeMinusReserve { query_chain, .. } => {
                query_chain.as_deref().unwrap_or(chain)
            }
            _ => chain,
        }
    }

    /// Produce this source's balance
    pub async fn fetch(&self, ctx: &SourceContext) -> SourceResult<Balance> {
        match self {
            SupplySource::NativeIssued {
                peg_type,
                tokens,
                decimals,
            } => native_issued(ctx, *peg_type, tokens, *decimals).await,
            SupplySource::EscrowedReserve {
                peg_type,
                tokens,
                holders,
                decimals,
                query_chain,
            } => {
                let api = ctx.api_for(query_chain.as_deref().unwrap_or(&ctx.chain))?;
                escrowed_reserve(api.as_ref(), *peg_type, tokens, holders, *decimals).await
            }
            SupplySource::BridgedIn {
                peg_type,
                query_chain,
                tokens,
                decimals,
                label,
            } => {
                let api = ctx.api_for(query_chain.as_deref().unwrap_or(&ctx.chain))?;
                bridged_in(api.as_ref(), *peg_type, tokens, *decimals, label).await
            }
            SupplySource::BridgeMinusReserve {
                peg_type,
                query_chain,
                bridge_address,
                reserves,
                decimals,
                label,
            } => {
                let api = ctx.api_for(query_chain.as_deref().unwrap_or(&ctx.chain))?;
                bridge_minus_reserve(
                    api.as_ref(),
                    *peg_type,
                    bridge_address,
                    reserves,
                    *decimals,
                    label,
                )
                .await
            }
            SupplySource::Fixed {
                peg_type,
                amount,
                label,
            } => {
                let mut balance = Balance::new();
                balance.add_contribution(
                    *peg_type,
                    *amount,
                    Some(label.as_deref().unwrap_or("fixed")),
                    false,
                    None,
                )?;
                Ok(balance)
            }
            SupplySource::Custom(source) => source.fetch(ctx).await,
        }
    }
}

async fn resolve_decimals(api: &dyn ChainApi, token: &str, configured: Option<u32>) -> SourceResult<u32> {
    match configured {
        Some(decimals) => Ok(decimals),
        None => api.decimals(token).await,
    }
}

async fn native_issued(
    ctx: &SourceContext,
    peg_type: PegType,
    tokens: &[String],
    decimals: Option<u32>,
) -> SourceResult<Balance> {
    let api = ctx.api()?;
    let api = api.as_ref();
    let amounts = try_join_all(tokens.iter().map(|token| async move {
        let supply = api.total_supply(token).await?;
        let decimals = resolve_decimals(api, token, decimals).await?;
        Ok::<f64, SourceError>(scale_raw_amount(&supply.to_string(), decimals)?)
    }))
    .await?;

    let mut balance = Balance::new();
    for amount in amounts {
        balance.add_contribution(peg_type, amount, Some("issued"), false, None)?;
    }
    Ok(balance)
}

async fn escrowed_reserve(
    api: &dyn ChainApi,
    peg_type: PegType,
    tokens: &[String],
    holders: &[String],
    decimals: Option<u32>,
) -> SourceResult<Balance> {
    let mut balance = Balance::new();
    for token in tokens {
        let decimals = resolve_decimals(api, token, decimals).await?;
        let held = try_join_all(holders.iter().map(|holder| async move {
            let raw = api.balance_of(token, holder).await?;
            Ok::<(&String, f64), SourceError>((holder, scale_raw_amount(&raw.to_string(), decimals)?))
        }))
        .await?;
        for (holder, amount) in held {
            balance.add_contribution(peg_type, amount, Some(holder), true, None)?;
        }
    }
    Ok(balance)
}

async fn bridged_in(
    api: &dyn ChainApi,
    peg_type: PegType,
    tokens: &[String],
    decimals: u32,
    label: &BridgeLabel,
) -> SourceResult<Balance> {
    let supplies = try_join_all(tokens.iter().map(|token| api.total_supply(token))).await?;

    let mut balance = Balance::new();
    for (token, supply) in tokens.iter().zip(supplies) {
        let amount = scale_raw_amount(&supply.to_string(), decimals)?;
        add_labelled(&mut balance, peg_type, amount, token, label)?;
    }
    Ok(balance)
}

async fn bridge_minus_reserve(
    api: &dyn ChainApi,
    peg_type: PegType,
    bridge_address: &str,
    reserves: &[String],
    decimals: u32,
    label: &BridgeLabel,
) -> SourceResult<Balance> {
    let total = api.total_supply(bridge_address).await?;
    let parked = try_join_all(
        reserves
            .iter()
            .map(|reserve| api.balance_of(bridge_address, reserve)),
    )
    .await?;

    let mut net = to_i128(total)?;
    for held in parked {
        net -= to_i128(held)?;
    }

    let amount = scale_raw_i128(net, decimals)?;
    let mut balance = Balance::new();
    add_labelled(&mut balance, peg_type, amount, bridge_address, label)?;
    Ok(balance)
}

fn add_labelled(
    balance: &mut Balance,
    peg_type: PegType,
    amount: f64,
    address: &str,
    label: &BridgeLabel,
) -> SourceResult<()> {
    match &label.bridge {
        Some(bridge) => balance.add_contribution(
            peg_type,
            amount,
            Some(bridge),
            false,
            label.bridged_from.as_deref(),
        ),
        None => balance.add_contribution(
            peg_type,
            amount,
            Some(address),
            true,
            label.bridged_from.as_deref(),
        ),
    }
}

fn to_i128(raw: u128) -> SourceResult<i128> {
    i128::try_from(raw).map_err(|_| {
        SourceError::Units(crate::errors::UnitsError::Overflow(raw.to_string()))
    })
}
