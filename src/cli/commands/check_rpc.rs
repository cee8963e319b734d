use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::rpc::EvmRpcClient;
use clap::Args;
use tracing::{error, info};

/// Test EVM RPC connectivity for one chain
#[derive(Args)]
pub struct CheckRpcCommand {
    /// Chain name, e.g. ethereum
    pub chain: String,

    /// RPC URL (overrides config and <CHAIN>_RPC)
    #[arg(long)]
    pub rpc_url: Option<String>,
}

impl CheckRpcCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Testing RPC Connection for {} ===", self.chain);

        let app_config = AppConfig::get_defaults()?;
        let url = self
            .rpc_url
            .clone()
            .or_else(|| app_config.rpc.endpoint_for(&self.chain))
            .ok_or_else(|| {
                AppError::Config(format!(
                    "No RPC endpoint for {}; set rpc.endpoints.{} or {}_RPC",
                    self.chain,
                    self.chain,
                    self.chain.to_uppercase()
                ))
            })?;

        let client = EvmRpcClient::new(&self.chain, &url, app_config.rpc)
            .map_err(|e| AppError::Config(format!("RPC client creation failed: {}", e)))?;

        match client.block_number().await {
            Ok(height) => {
                println!("{} RPC connection test PASSED (block {})", self.chain, height);
                Ok(())
            }
            Err(e) => {
                error!("RPC connection test failed: {}", e);
                println!("{} RPC connection test FAILED", self.chain);
                println!("Error: {}", e);
                Err(AppError::SourceFailure {
                    chain: self.chain.clone(),
                    role: "rpc".to_string(),
                    source: e,
                })
            }
        }
    }
}
