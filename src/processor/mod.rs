pub mod collection;
pub mod pipeline;
pub mod reconciliation;

pub use collection::{CollectedSupply, CollectionEngine};
pub use pipeline::{RunOutcome, SupplyPipeline};
pub use reconciliation::{chain_circulating, ReconciliationEngine};
