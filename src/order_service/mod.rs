pub mod archive;
pub mod columns;
pub mod parser;
pub mod partition;
pub mod rows;
pub mod workbook;

use bytes::Bytes;
use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::models::{Dataset, ProcessRequest, StyleConfig, Summary};
use crate::storage::GeneratedFiles;
use crate::Result;
use columns::ColumnMapping;

/// Columns kept by default; everything else is offered for removal.
pub const DEFAULT_COLUMNS: [&str; 12] = [
    "Documento de compras",
    "Item",
    "Material",
    "Valor da matriz",
    "Texto breve",
    "Qtd.divisão",
    "Qtd.fornecida",
    "Qtd.pendente",
    "Data do documento",
    "Data de remessa",
    "Fornecedor/centro fornecedor",
    "Centro",
];

/// Result of one processing pass.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    pub files: GeneratedFiles,
    pub summary: Summary,
}

/// Columns of an upload that the default preset would remove, in upload order.
pub fn default_removed_columns(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| !DEFAULT_COLUMNS.contains(&c.as_str()))
        .cloned()
        .collect()
}

/// Counters over the raw upload, before any renaming.
pub fn summarize_upload(dataset: &Dataset) -> Summary {
    partition::summarize(dataset, &ColumnMapping::default())
}

/// Runs the whole pipeline on a copy of the uploaded dataset.
///
/// Either every supplier workbook is produced or the pass fails as a whole.
#[instrument(name = "processing orders", skip_all, fields(rows = dataset.len()))]
pub fn process(
    mut dataset: Dataset,
    request: &ProcessRequest,
    style: &StyleConfig,
    today: NaiveDate,
) -> Result<ProcessOutcome> {
    rows::add_derived_columns(&mut dataset);
    let mapping = ColumnMapping::new(&request.renames);
    mapping.apply(&mut dataset)?;
    rows::format_date_columns(&mut dataset, &mapping);
    rows::derive_status(&mut dataset, &mapping, today);
    rows::remove_columns(&mut dataset, &request.removed_columns);

    let partition = partition::partition(&dataset, &mapping)?;
    let mut files = GeneratedFiles::new();
    for group in &partition.groups {
        let buffer = workbook::render(&group.supplier, &group.rows, style)?;
        files.insert(file_name(&group.supplier), Bytes::from(buffer));
    }
    info!(
        "Gerados {} arquivos: {} pedidos, {} peças pendentes",
        files.len(),
        partition.summary.orders,
        partition.summary.pending_display()
    );
    Ok(ProcessOutcome {
        files,
        summary: partition.summary,
    })
}

pub fn file_name(supplier: &str) -> String {
    format!("{supplier}.xlsx")
}
