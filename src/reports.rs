//! Report formatting and output generation

use crate::errors::{AppError, AppResult};
use crate::types::GlobalReport;
use crate::utils::format::humanize_amount;
use crate::utils::time::timestamp_to_iso;
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

/// Width of the label column in console output
const LABEL_WIDTH: usize = 25;

/// Output format options for supply reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable console output
    #[default]
    Console,
    /// JSON format for programmatic use
    Json,
    /// One row per (chain, role) for spreadsheets
    Csv,
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(AppError::Config(format!(
                "Unknown output format '{}', expected console, json or csv",
                other
            ))),
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    chain: &'a str,
    role: &'a str,
    peg_type: &'a str,
    amount: f64,
}

/// Facade for all report formatting operations
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(report: &GlobalReport, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Console => Ok(Self::format_console(report)),
            OutputFormat::Json => Self::format_json(report),
            OutputFormat::Csv => Self::format_csv(report),
        }
    }

    /// Per-chain role listing sorted by amount, then the totals section
    pub fn format_console(report: &GlobalReport) -> String {
        let peg = report.peg_type;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} supply at {}",
            peg,
            timestamp_to_iso(report.timestamp)
        );

        for (chain, chain_report) in &report.chains {
            let _ = writeln!(out, "--- {} ---", chain);

            let mut rows: Vec<(String, Option<f64>)> = chain_report
                .issuances
                .iter()
                .map(|(role, balance)| (role.to_string(), balance.get(peg)))
                .collect();
            if let Some(circulating) = &chain_report.circulating {
                rows.push(("circulating".to_string(), circulating.get(peg)));
            }
            rows.sort_by(|a, b| {
                b.1.unwrap_or(0.0)
                    .partial_cmp(&a.1.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            for (label, amount) in rows {
                let _ = writeln!(
                    out,
                    "{:<width$} {}",
                    label,
                    amount.map(humanize_amount).unwrap_or_else(|| "-".to_string()),
                    width = LABEL_WIDTH
                );
            }
        }

        let _ = writeln!(out, "------ Total Circulating ------");
        let _ = writeln!(
            out,
            "{:<width$} {}",
            "Total circulating",
            humanize_amount(report.total()),
            width = LABEL_WIDTH
        );
        let _ = writeln!(
            out,
            "{:<width$} {}",
            "Total unreleased",
            humanize_amount(report.total_unreleased()),
            width = LABEL_WIDTH
        );
        out
    }

    pub fn format_json(report: &GlobalReport) -> AppResult<String> {
        export_json(report)
    }

    pub fn format_csv(report: &GlobalReport) -> AppResult<String> {
        let peg = report.peg_type;
        let mut writer = csv::Writer::from_writer(Vec::new());

        for (chain, chain_report) in &report.chains {
            for (role, balance) in &chain_report.issuances {
                if let Some(amount) = balance.get(peg) {
                    writer.serialize(CsvRow {
                        chain,
                        role: role.as_str(),
                        peg_type: peg.as_str(),
                        amount,
                    })?;
                }
            }
            if let Some(amount) = chain_report.circulating_amount(peg) {
                writer.serialize(CsvRow {
                    chain,
                    role: "circulating",
                    peg_type: peg.as_str(),
                    amount,
                })?;
            }
        }
        for (role, amount) in [
            ("circulating", report.total()),
            ("unreleased", report.total_unreleased()),
        ] {
            writer.serialize(CsvRow {
                chain: "totalCirculating",
                role,
                peg_type: peg.as_str(),
                amount,
            })?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Config(format!("CSV export failed: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Config(format!("CSV export failed: {}", e)))
    }
}

/// Export data as JSON for programmatic use
pub fn export_json<T: Serialize>(data: &T) -> AppResult<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| AppError::Config(format!("JSON export failed: {}", e)))
}
