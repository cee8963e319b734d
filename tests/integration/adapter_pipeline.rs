//! Adapter file → registry → collection → reconciliation against mock chains

use crate::common::{address, context, MockChainApi, MockProvider};
use anyhow::Result;
use pegged_supply::adapter::{ensure_valid, AdapterDefinition};
use pegged_supply::config::CollectionConfig;
use pegged_supply::processor::SupplyPipeline;
use pegged_supply::reports::{OutputFormat, ReportFormatter};
use pegged_supply::types::{PegType, Role};
use std::sync::Arc;

const E18: u128 = 1_000_000_000_000_000_000;

fn adapter_text() -> String {
    format!(
        r#"
name = "sample-usd"
peg_type = "peggedUSD"
decimals = 18

[chains.ethereum]
issued = ["{issued}"]
unreleased = ["{treasury}"]

[chains.polygon]
bridged_from_eth = ["{polygon_token}"]

[chains.bsc]
decimals = 6
issued = ["{bsc_token}"]

[chains.fuse]
[[chains.fuse.bridged]]
from = "bsc"
tokens = ["{fuse_token}"]
bridge = "multichain"
"#,
        issued = address(1),
        treasury = address(2),
        polygon_token = address(3),
        bsc_token = address(4),
        fuse_token = address(5),
    )
}

fn chains() -> MockProvider {
    MockProvider::new()
        .with_chain(
            MockChainApi::new("ethereum")
                .with_token(&address(1), 10_000 * E18, 18)
                .with_balance(&address(1), &address(2), 1_000 * E18),
        )
        .with_chain(MockChainApi::new("polygon").with_token(&address(3), 2_500 * E18, 18))
        .with_chain(MockChainApi::new("bsc").with_token(&address(4), 4_000_000_000, 6))
        .with_chain(MockChainApi::new("fuse").with_token(&address(5), 600 * E18, 18))
}

#[tokio::test]
async fn test_full_run_from_adapter_file() -> Result<()> {
    let definition = AdapterDefinition::from_toml(&adapter_text())?;
    ensure_valid(&definition)?;
    let registry = definition.into_registry(PegType::Usd)?;

    let ctx = context(Arc::new(chains()));
    let outcome = SupplyPipeline::new(&CollectionConfig::default())
        .run(&registry, &ctx)
        .await?;
    let report = &outcome.report;

    assert!(outcome.failures.is_empty());
    // 10,000 minted - 1,000 unreleased - 2,500 bridged to polygon
    assert_eq!(report.circulating_on("ethereum"), Some(6_500.0));
    assert_eq!(report.circulating_on("polygon"), Some(2_500.0));
    // 4,000 minted - 600 bridged to fuse
    assert_eq!(report.circulating_on("bsc"), Some(3_400.0));
    assert_eq!(report.circulating_on("fuse"), Some(600.0));
    assert_eq!(report.total(), 13_000.0);
    assert_eq!(report.total_unreleased(), 1_000.0);

    let fuse = report.chains["fuse"].get(&Role::bridged_from("bsc")).unwrap();
    assert_eq!(fuse.bridges()[0].bridge_name, "multichain");
    assert_eq!(fuse.bridges()[0].bridged_from_chain.as_deref(), Some("bsc"));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_bridge_chain_is_skipped() -> Result<()> {
    let registry = AdapterDefinition::from_toml(&adapter_text())?.into_registry(PegType::Usd)?;
    let provider = MockProvider::new()
        .with_chain(
            MockChainApi::new("ethereum")
                .with_token(&address(1), 10_000 * E18, 18)
                .with_balance(&address(1), &address(2), 1_000 * E18),
        )
        .with_chain(MockChainApi::new("bsc").with_token(&address(4), 4_000_000_000, 6));

    let outcome = SupplyPipeline::new(&CollectionConfig::default())
        .run(&registry, &context(Arc::new(provider)))
        .await?;

    // polygon and fuse have no endpoint, so nothing leaves ethereum or bsc
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.report.circulating_on("ethereum"), Some(9_000.0));
    assert_eq!(outcome.report.circulating_on("polygon"), Some(0.0));
    assert_eq!(outcome.report.total(), 13_000.0);
    Ok(())
}

#[tokio::test]
async fn test_report_renders_in_every_format() -> Result<()> {
    let registry = AdapterDefinition::from_toml(&adapter_text())?.into_registry(PegType::Usd)?;
    let outcome = SupplyPipeline::new(&CollectionConfig::default())
        .run(&registry, &context(Arc::new(chains())))
        .await?;

    let console = ReportFormatter::format(&outcome.report, OutputFormat::Console)?;
    assert!(console.contains("--- ethereum ---"));
    assert!(console.contains("13.00 k"));

    let json: serde_json::Value =
        serde_json::from_str(&ReportFormatter::format(&outcome.report, OutputFormat::Json)?)?;
    assert_eq!(json["chains"]["ethereum"]["circulating"]["peggedUSD"], 6_500.0);

    let csv = ReportFormatter::format(&outcome.report, OutputFormat::Csv)?;
    assert!(csv.contains("fuse,bsc,peggedUSD,600.0"));
    Ok(())
}
