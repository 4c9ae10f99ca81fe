//! Board export and import.
//!
//! Export writes the full board snapshot as pretty JSON. Import only checks
//! that a file looks like such a snapshot.

pub mod exporter;
pub mod importer;
pub mod models;

pub use exporter::BoardExporter;
pub use importer::BoardImporter;
pub use models::ImportSummary;
