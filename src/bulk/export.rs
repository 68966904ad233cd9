// CSV rendering of allocation views

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;

use crate::domain::models::AllocationView;
use crate::error::{LedgerError, LedgerResult};

const BASE_COLUMNS: &[&str] = &[
    "id",
    "subscription_id",
    "investor_name",
    "investor_email",
    "token_type",
    "token_amount",
    "status",
];

const FULL_COLUMNS: &[&str] = &[
    "project_id",
    "wallet_address",
    "allocation_date",
    "minted",
    "minting_date",
    "minting_tx_hash",
    "distributed",
    "distribution_date",
    "distribution_tx_hash",
    "notes",
];

/// Requested download format. Both carry the same CSV bytes; only the file
/// name differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

pub fn export_filename(format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "token_allocations_export_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn record(view: &AllocationView, include_optional: bool) -> Vec<String> {
    let allocation = &view.allocation;
    let mut fields = vec![
        allocation.id.to_string(),
        allocation.subscription_id.to_string(),
        view.investor_name.clone(),
        view.investor_email.clone(),
        allocation.token_type.to_string(),
        allocation.token_amount.normalize().to_string(),
        allocation.state.stage().to_string(),
    ];

    if include_optional {
        let flags = allocation.state.to_flags();
        fields.extend([
            allocation.project_id.to_string(),
            view.wallet_address.clone().unwrap_or_default(),
            timestamp(flags.allocation_date),
            flags.minted.to_string(),
            timestamp(flags.minting_date),
            flags.minting_tx_hash.unwrap_or_default(),
            flags.distributed.to_string(),
            timestamp(flags.distribution_date),
            flags.distribution_tx_hash.unwrap_or_default(),
            allocation.notes.clone().unwrap_or_default(),
        ]);
    }
    fields
}

/// Writes a header row and one row per view. Numeric fields are left
/// unquoted, everything else is quoted.
pub fn write_allocations_csv(views: &[AllocationView], include_optional: bool) -> LedgerResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(Vec::new());

    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    if include_optional {
        header.extend_from_slice(FULL_COLUMNS);
    }

    let write_failed = |e: csv::Error| LedgerError::Store(format!("CSV export failed: {}", e));
    writer.write_record(&header).map_err(write_failed)?;
    for view in views {
        writer
            .write_record(record(view, include_optional))
            .map_err(write_failed)?;
    }

    writer
        .into_inner()
        .map_err(|e| LedgerError::Store(format!("CSV export failed: {}", e.error())))
}
