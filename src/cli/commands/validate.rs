use crate::adapter::{validate_definition, AdapterDefinition};
use crate::errors::{AppError, AppResult};
use crate::types::PegType;
use clap::Args;
use glob::glob;
use tracing::{debug, error};

/// Check adapter files without touching the network
#[derive(Args)]
pub struct ValidateCommand {
    /// Glob of adapter files, e.g. "adapters/*.toml"
    pub pattern: String,
}

impl ValidateCommand {
    pub fn run(&self) -> AppResult<()> {
        let mut checked = 0usize;
        let mut invalid = 0usize;

        for entry in glob(&self.pattern)? {
            let path = entry?;
            checked += 1;
            debug!("Validating {}", path.display());

            let definition = match AdapterDefinition::load(&path) {
                Ok(definition) => definition,
                Err(e) => {
                    error!("Failed to load {}: {}", path.display(), e);
                    println!("FAIL {}: {}", path.display(), e);
                    invalid += 1;
                    continue;
                }
            };

            let mut issues: Vec<String> = validate_definition(&definition)
                .iter()
                .map(ToString::to_string)
                .collect();
            let peg_type: PegType = definition.peg_type;
            if let Err(e) = definition.into_registry(peg_type) {
                issues.push(e.to_string());
            }

            if issues.is_empty() {
                println!(
                    "ok   {} ({}, {} chains)",
                    path.display(),
                    definition.name,
                    definition.chains.len()
                );
            } else {
                invalid += 1;
                println!("FAIL {}", path.display());
                for issue in issues {
                    println!("       {}", issue);
                }
            }
        }

        if checked == 0 {
            return Err(AppError::Config(format!(
                "No adapter files match '{}'",
                self.pattern
            )));
        }
        println!("\n{} checked, {} invalid", checked, invalid);
        if invalid > 0 {
            return Err(AppError::Configuration(format!(
                "{} of {} adapter files are invalid",
                invalid, checked
            )));
        }
        Ok(())
    }
}
