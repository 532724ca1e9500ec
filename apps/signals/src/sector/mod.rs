pub mod config;
pub mod document;
pub mod registry;
pub mod source;

pub use config::SectorConfig;
pub use document::SectorDocument;
pub use registry::SectorRegistry;
pub use source::{DirectorySource, SectorSource, StaticSource};
