mod parser;

use super::dataset::FunnelDataset;
use super::domain::ListingDirectory;
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DatasetImportError {
    #[error("failed to read dataset export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid dataset CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Loads the three CSV exports (contacts, listings, users), applies the
/// cleaning rules, and returns the enriched in-memory snapshot. Cell-level
/// parse failures degrade to absent values; structural problems (missing
/// columns, undeserializable rows) are fatal here at the boundary.
pub struct DatasetImporter;

impl DatasetImporter {
    pub fn from_paths<P: AsRef<Path>>(
        contacts: P,
        listings: P,
        users: P,
    ) -> Result<FunnelDataset, DatasetImportError> {
        let contacts = std::fs::File::open(contacts)?;
        let listings = std::fs::File::open(listings)?;
        let users = std::fs::File::open(users)?;
        Self::from_readers(contacts, listings, users)
    }

    pub fn from_readers<C, L, U>(
        contacts: C,
        listings: L,
        users: U,
    ) -> Result<FunnelDataset, DatasetImportError>
    where
        C: Read,
        L: Read,
        U: Read,
    {
        let inquiries = parser::parse_contacts(contacts)?;
        let listings = ListingDirectory::from_listings(parser::parse_listings(listings)?);
        let users = parser::parse_users(users)?;

        Ok(FunnelDataset::new(inquiries, listings, users))
    }
}
