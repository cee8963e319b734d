use crate::common::{address, context, MockChainApi, MockProvider};
use anyhow::Result;
use pegged_supply::errors::SourceError;
use pegged_supply::source::{BridgeLabel, SupplySource};
use pegged_supply::types::PegType;
use std::sync::Arc;

const ONE_TOKEN_18: u128 = 1_000_000_000_000_000_000;

fn provider() -> MockProvider {
    let usd = address(1);
    let bridged = address(2);
    let custody = address(3);
    MockProvider::new()
        .with_chain(
            MockChainApi::new("ethereum")
                .with_token(&usd, 5_000_000_000_000, 6)
                .with_balance(&usd, &address(10), 1_000_000_000_000)
                .with_balance(&usd, &address(11), 250_000_000_000)
                .with_token(&custody, 900 * ONE_TOKEN_18, 18)
                .with_balance(&custody, &address(12), 150 * ONE_TOKEN_18),
        )
        .with_chain(
            MockChainApi::new("polygon")
                .with_token(&bridged, 42 * ONE_TOKEN_18, 18)
                .with_failing_token(&address(99)),
        )
}

#[tokio::test]
async fn test_native_issued_reads_decimals_from_chain() -> Result<()> {
    let provider = Arc::new(provider());
    let ctx = context(provider.clone()).for_chain("ethereum");

    let source = SupplySource::NativeIssued {
        peg_type: PegType::Usd,
        tokens: vec![address(1)],
        decimals: None,
    };
    let balance = source.fetch(&ctx).await?;
    assert_eq!(balance.get(PegType::Usd), Some(5_000_000.0));
    // totalSupply + decimals
    assert_eq!(provider.api("ethereum").call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_escrowed_reserve_sums_holders() -> Result<()> {
    let ctx = context(Arc::new(provider())).for_chain("ethereum");
    let source = SupplySource::EscrowedReserve {
        peg_type: PegType::Usd,
        tokens: vec![address(1)],
        holders: vec![address(10), address(11)],
        decimals: Some(6),
        query_chain: None,
    };
    let balance = source.fetch(&ctx).await?;
    assert_eq!(balance.get(PegType::Usd), Some(1_250_000.0));
    assert_eq!(balance.bridges().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_bridged_in_tracks_token_addresses() -> Result<()> {
    let ctx = context(Arc::new(provider())).for_chain("polygon");
    let source = SupplySource::BridgedIn {
        peg_type: PegType::Usd,
        query_chain: None,
        tokens: vec![address(2)],
        decimals: 18,
        label: BridgeLabel {
            bridge: None,
            bridged_from: Some("ethereum".to_string()),
        },
    };
    let balance = source.fetch(&ctx).await?;
    assert_eq!(balance.get(PegType::Usd), Some(42.0));
    let record = &balance.bridges()[0];
    assert!(record.individual);
    assert_eq!(record.bridge_name, address(2));
    assert_eq!(record.bridged_from_chain.as_deref(), Some("ethereum"));
    Ok(())
}

#[tokio::test]
async fn test_bridge_minus_reserve_queries_custody_chain() -> Result<()> {
    // Reported on loopring, custody contract lives on ethereum
    let ctx = context(Arc::new(provider())).for_chain("loopring");
    let source = SupplySource::BridgeMinusReserve {
        peg_type: PegType::Usd,
        query_chain: Some("ethereum".to_string()),
        bridge_address: address(3),
        reserves: vec![address(12)],
        decimals: 18,
        label: BridgeLabel {
            bridge: Some("loopring-bridge".to_string()),
            bridged_from: Some("ethereum".to_string()),
        },
    };
    let balance = source.fetch(&ctx).await?;
    assert_eq!(balance.get(PegType::Usd), Some(750.0));
    assert!(!balance.bridges()[0].individual);
    Ok(())
}

#[tokio::test]
async fn test_network_failure_propagates() {
    let ctx = context(Arc::new(provider())).for_chain("polygon");
    let source = SupplySource::BridgedIn {
        peg_type: PegType::Usd,
        query_chain: None,
        tokens: vec![address(2), address(99)],
        decimals: 18,
        label: BridgeLabel {
            bridge: Some("pos".to_string()),
            bridged_from: Some("ethereum".to_string()),
        },
    };
    let result = source.fetch(&ctx).await;
    assert!(matches!(result, Err(SourceError::CallFailed { .. })));
}

#[tokio::test]
async fn test_unknown_chain_is_an_error_not_zero() {
    let ctx = context(Arc::new(provider())).for_chain("fantom");
    let source = SupplySource::NativeIssued {
        peg_type: PegType::Usd,
        tokens: vec![address(1)],
        decimals: Some(6),
    };
    assert!(matches!(
        source.fetch(&ctx).await,
        Err(SourceError::UnknownChain(chain)) if chain == "fantom"
    ));
}

#[test]
fn test_source_kinds() {
    let fixed = SupplySource::Fixed {
        peg_type: PegType::Chf,
        amount: 1.0,
        label: None,
    };
    assert_eq!(fixed.kind(), "fixed");
    assert!(!fixed.is_on_chain());

    let reserve = SupplySource::BridgeMinusReserve {
        peg_type: PegType::Usd,
        query_chain: Some("ethereum".to_string()),
        bridge_address: address(3),
        reserves: vec![],
        decimals: 18,
        label: BridgeLabel {
            bridge: None,
            bridged_from: None,
        },
    };
    assert!(reserve.is_on_chain());
    assert_eq!(reserve.query_chain("loopring"), "ethereum");
}
