//! Collection + reconciliation over fixed and scripted sources

use crate::common::{canned, fixed, offline_context, usd_registry};
use anyhow::Result;
use pegged_supply::adapter::AdapterRegistry;
use pegged_supply::config::{CollectionConfig, TimeoutPolicy};
use pegged_supply::errors::{AppError, SourceError};
use pegged_supply::processor::{CollectionEngine, SupplyPipeline};
use pegged_supply::types::{Balance, PegType, Role};
use std::time::Duration;

fn pipeline() -> SupplyPipeline {
    SupplyPipeline::new(&CollectionConfig::default())
}

#[tokio::test]
async fn test_scenario_a_minted_only() -> Result<()> {
    let registry = usd_registry(&[("ethereum", "minted", 1000.0)]);
    let outcome = pipeline().run(&registry, &offline_context()).await?;

    assert_eq!(outcome.report.circulating_on("ethereum"), Some(1000.0));
    assert_eq!(outcome.report.total(), 1000.0);
    assert!(outcome.failures.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_scenario_b_unreleased_is_subtracted() -> Result<()> {
    let registry = usd_registry(&[
        ("ethereum", "minted", 1000.0),
        ("ethereum", "unreleased", 200.0),
    ]);
    let outcome = pipeline().run(&registry, &offline_context()).await?;

    assert_eq!(outcome.report.circulating_on("ethereum"), Some(800.0));
    assert_eq!(outcome.report.total_unreleased(), 200.0);
    Ok(())
}

#[tokio::test]
async fn test_scenario_c_bridged_supply_leaves_origin() -> Result<()> {
    let registry = usd_registry(&[
        ("ethereum", "minted", 1000.0),
        ("polygon", "ethereum", 300.0),
    ]);
    let outcome = pipeline().run(&registry, &offline_context()).await?;

    assert_eq!(outcome.report.circulating_on("ethereum"), Some(700.0));
    assert_eq!(outcome.report.circulating_on("polygon"), Some(300.0));
    assert_eq!(outcome.report.total(), 1000.0);
    Ok(())
}

#[tokio::test]
async fn test_scenario_d_zero_total_is_fatal() {
    let registry = usd_registry(&[("ethereum", "minted", 0.0)]);
    let result = pipeline().run(&registry, &offline_context()).await;
    assert!(matches!(result, Err(AppError::ZeroOrMissingTotal(_))));
}

#[tokio::test]
async fn test_scenario_e_sanity_ceiling() {
    let registry = usd_registry(&[("ethereum", "minted", 2000e9)]);
    let result = pipeline().run(&registry, &offline_context()).await;
    match result {
        Err(AppError::SanityCeiling { total, ceiling }) => {
            assert_eq!(total, 2000e9);
            assert_eq!(ceiling, 1000e9);
        }
        other => panic!("expected sanity ceiling error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chains_without_bridges_or_reserves_circulate_minted() -> Result<()> {
    let registry = usd_registry(&[
        ("ethereum", "minted", 1234.5),
        ("bsc", "minted", 99.25),
        ("tron", "minted", 0.75),
    ]);
    let outcome = pipeline().run(&registry, &offline_context()).await?;
    for (chain, minted) in [("ethereum", 1234.5), ("bsc", 99.25), ("tron", 0.75)] {
        assert_eq!(outcome.report.circulating_on(chain), Some(minted));
    }
    Ok(())
}

#[tokio::test]
async fn test_total_is_sum_of_chain_circulating() -> Result<()> {
    let registry = usd_registry(&[
        ("ethereum", "minted", 10_000.1),
        ("ethereum", "unreleased", 1_000.2),
        ("polygon", "ethereum", 2_500.3),
        ("arbitrum", "ethereum", 1_200.4),
        ("bsc", "minted", 3_000.5),
        ("fuse", "bsc", 400.6),
        ("solana", "minted", 777.7),
    ]);
    let outcome = pipeline().run(&registry, &offline_context()).await?;

    let summed: f64 = outcome
        .report
        .chains
        .keys()
        .filter_map(|chain| outcome.report.circulating_on(chain))
        .sum();
    assert!((outcome.report.total() - summed).abs() < 1e-9);
    assert!((outcome.report.circulating_on("ethereum").unwrap() - 5_299.2).abs() < 1e-9);
    assert!((outcome.report.circulating_on("bsc").unwrap() - 2_599.9).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_over_subtraction_is_fatal() {
    let registry = usd_registry(&[
        ("ethereum", "minted", 100.0),
        ("polygon", "ethereum", 80.0),
        ("arbitrum", "ethereum", 80.0),
    ]);
    let result = pipeline().run(&registry, &offline_context()).await;
    assert!(matches!(
        result,
        Err(AppError::NegativeCirculating { ref chain, amount }) if chain == "ethereum" && amount < 0.0
    ));
}

#[tokio::test]
async fn test_self_bridge_never_reaches_collection() {
    let mut registry = usd_registry(&[("ethereum", "minted", 1.0)]);
    let err = registry
        .insert("polygon", Role::bridged_from("polygon"), fixed(PegType::Usd, 1.0))
        .unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_one_failing_source_does_not_stop_the_run() -> Result<()> {
    let mut registry = usd_registry(&[("ethereum", "minted", 1000.0), ("bsc", "minted", 50.0)]);
    registry.insert(
        "polygon",
        Role::bridged_from("ethereum"),
        canned(5, || {
            Err(SourceError::CallFailed {
                method: "totalSupply".to_string(),
                message: "connection reset".to_string(),
            })
        }),
    )?;

    let outcome = pipeline().run(&registry, &offline_context()).await?;
    assert_eq!(outcome.failures.len(), 1);
    assert!(!outcome.failures[0].is_fatal());
    // Nothing was subtracted from ethereum for the failed bridge role
    assert_eq!(outcome.report.circulating_on("ethereum"), Some(1000.0));
    assert_eq!(outcome.report.total(), 1050.0);
    Ok(())
}

#[tokio::test]
async fn test_every_source_failing_is_fatal() {
    let mut registry = AdapterRegistry::new("test-usd", PegType::Usd);
    registry
        .insert(
            "ethereum",
            Role::Minted,
            canned(0, || Err(SourceError::Custom("indexer down".to_string()))),
        )
        .unwrap();
    let result = pipeline().run(&registry, &offline_context()).await;
    assert!(matches!(result, Err(AppError::ZeroOrMissingTotal(_))));
}

#[tokio::test]
async fn test_slow_source_is_awaited_under_advisory_timeout() -> Result<()> {
    let mut registry = AdapterRegistry::new("test-usd", PegType::Usd);
    registry.insert(
        "ethereum",
        Role::Minted,
        canned(300, || Ok(Balance::with_amount(PegType::Usd, 42.0))),
    )?;

    let engine = CollectionEngine::new(Duration::from_millis(50), TimeoutPolicy::Advisory);
    let outcome = SupplyPipeline::with_engine(engine, 1000e9)
        .run(&registry, &offline_context())
        .await?;
    assert_eq!(outcome.report.total(), 42.0);
    assert!(outcome.elapsed_seconds >= 0.3);
    Ok(())
}

#[tokio::test]
async fn test_eur_run_ignores_usd_figures() -> Result<()> {
    let mut registry = AdapterRegistry::new("test-eur", PegType::Eur);
    registry.insert("ethereum", Role::Minted, fixed(PegType::Eur, 500.0))?;
    registry.insert(
        "polygon",
        Role::Minted,
        canned(0, || Ok(Balance::with_amount(PegType::Usd, 9.0))),
    )?;

    let outcome = pipeline().run(&registry, &offline_context()).await?;
    assert_eq!(outcome.report.total(), 500.0);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.report.peg_type, PegType::Eur);
    Ok(())
}

#[tokio::test]
async fn test_reporter_names_do_not_change_the_result() {
    for reporter in ["arbitrum", "zksync"] {
        let registry = usd_registry(&[
            ("ethereum", "minted", 100.0),
            (reporter, "ethereum", 100.0),
            ("polygon", "ethereum", 50.0),
        ]);
        let result = pipeline().run(&registry, &offline_context()).await;
        assert!(
            matches!(
                result,
                Err(AppError::NegativeCirculating { ref chain, amount })
                    if chain == "ethereum" && amount == -50.0
            ),
            "reporter {}: {:?}",
            reporter,
            result.map(|outcome| outcome.report.total())
        );
    }
}

#[tokio::test]
async fn test_contribution_order_gives_identical_figures() -> Result<()> {
    let mut totals = Vec::new();
    for reporters in [["arbitrum", "base", "optimism"], ["zksync", "scroll", "linea"]] {
        let registry = usd_registry(&[
            ("ethereum", "minted", 1_000.0),
            ("ethereum", "unreleased", 100.0),
            (reporters[0], "ethereum", 400.0),
            (reporters[1], "ethereum", 500.0),
            (reporters[2], "ethereum", 0.0),
        ]);
        let outcome = pipeline().run(&registry, &offline_context()).await?;
        // The second contribution brings ethereum to exactly zero
        assert_eq!(outcome.report.circulating_on("ethereum"), Some(0.0));
        totals.push(outcome.report.total());
    }
    assert_eq!(totals, vec![900.0, 900.0]);
    Ok(())
}
