use std::collections::{HashMap, HashSet};

use super::columns::{ColumnMapping, LogicalColumn};
use crate::models::{Dataset, Summary};
use crate::{AppError, Result};

/// Rows of one supplier, in the order they appear in the upload.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplierGroup {
    pub supplier: String,
    pub rows: Dataset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub groups: Vec<SupplierGroup>,
    pub summary: Summary,
}

/// Splits the dataset by supplier.
///
/// Rows without a supplier belong to no group. Suppliers are listed in order
/// of first occurrence.
pub fn partition(dataset: &Dataset, mapping: &ColumnMapping) -> Result<Partition> {
    let supplier_column = mapping
        .resolve(dataset, LogicalColumn::Supplier)
        .ok_or_else(|| {
            AppError::MissingColumn(mapping.current_name(LogicalColumn::Supplier).to_string())
        })?;
    let mut order: Vec<String> = Vec::new();
    let mut indices: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, cell) in dataset.column(supplier_column).enumerate() {
        if cell.is_empty() {
            continue;
        }
        let key = cell.to_string();
        indices
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(i);
    }
    let groups = order
        .into_iter()
        .map(|supplier| {
            let rows = dataset.select_rows(indices.get(&supplier).map_or(&[][..], Vec::as_slice));
            SupplierGroup { supplier, rows }
        })
        .collect::<Vec<_>>();
    let summary = Summary {
        suppliers: groups.len(),
        ..summarize(dataset, mapping)
    };
    Ok(Partition { groups, summary })
}

/// Counters over a dataset; a missing column counts as zero.
pub fn summarize(dataset: &Dataset, mapping: &ColumnMapping) -> Summary {
    let distinct = |column: LogicalColumn| {
        mapping
            .resolve(dataset, column)
            .map(|index| {
                dataset
                    .column(index)
                    .filter(|c| !c.is_empty())
                    .map(|c| c.to_string())
                    .collect::<HashSet<_>>()
                    .len()
            })
            .unwrap_or_default()
    };
    let pending = mapping
        .resolve(dataset, LogicalColumn::PendingQuantity)
        .map(|index| dataset.column(index).filter_map(|c| c.as_number()).sum::<f64>())
        .unwrap_or_default();
    Summary {
        suppliers: distinct(LogicalColumn::Supplier),
        orders: distinct(LogicalColumn::PurchaseDocument),
        pending,
    }
}
