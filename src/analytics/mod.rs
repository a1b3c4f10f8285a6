mod dataset;
pub mod domain;
pub mod funnel;
pub mod importer;
pub mod metrics;
pub mod report;

pub use dataset::FunnelDataset;
