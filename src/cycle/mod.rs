//! Monitoring cycle: work-list construction, bounded fan-out and batch
//! assembly.

mod batch;
mod orchestrator;
mod work;

pub use batch::CycleBatch;
#[cfg(test)]
pub use batch::OpenBatch;
pub use orchestrator::Orchestrator;
