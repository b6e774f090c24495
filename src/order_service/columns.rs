use std::collections::{HashMap, HashSet};

use crate::models::Dataset;
use crate::{AppError, Result};

/// Fields the pipeline looks up by meaning rather than by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalColumn {
    IssueDate,
    DeliveryDate,
    Supplier,
    PurchaseDocument,
    PendingQuantity,
}

impl LogicalColumn {
    /// Column name as it comes out of the purchasing system.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::IssueDate => "Data do documento",
            Self::DeliveryDate => "Data de remessa",
            Self::Supplier => "Fornecedor/centro fornecedor",
            Self::PurchaseDocument => "Documento de compras",
            Self::PendingQuantity => "Qtd.pendente",
        }
    }
}

/// Rename rules plus the logical-name lookup derived from them.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    renames: HashMap<String, String>,
}

impl ColumnMapping {
    /// Entries with an empty replacement keep the original name.
    pub fn new(renames: &HashMap<String, String>) -> Self {
        let renames = renames
            .iter()
            .filter(|(_, new)| !new.is_empty())
            .map(|(old, new)| (old.clone(), new.clone()))
            .collect();
        Self { renames }
    }

    pub fn current_name(&self, column: LogicalColumn) -> &str {
        let name = column.default_name();
        self.renames.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Position of a logical column in `dataset`, if it survived renaming and removal.
    pub fn resolve(&self, dataset: &Dataset, column: LogicalColumn) -> Option<usize> {
        dataset.column_index(self.current_name(column))
    }

    /// Renames the dataset's columns in place.
    ///
    /// A rename that would leave two columns with the same name is rejected and
    /// the dataset is left untouched.
    pub fn apply(&self, dataset: &mut Dataset) -> Result<()> {
        let renamed = dataset
            .columns()
            .iter()
            .map(|c| self.renames.get(c).unwrap_or(c).clone())
            .collect::<Vec<_>>();
        let mut seen = HashSet::new();
        if let Some(duplicate) = renamed.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(AppError::RenameCollision(duplicate.clone()));
        }
        dataset.set_columns(renamed);
        Ok(())
    }
}
