use std::fs::File;
use std::io::BufWriter;

use clap::{Args, Subcommand};
use serde_json::{json, Value};

use loan_ledger_core::{CalculationConfig, LoanCalculator, LoanRecord};

use crate::commands::calculate::LoanFormArgs;
use crate::store::LedgerStore;

const DEFAULT_STORE: &str = "loan_records.json";
const DEFAULT_EXPORT: &str = "loan_records.csv";

/// Arguments for ledger maintenance
#[derive(Args)]
pub struct LedgerArgs {
    /// Ledger file (JSON)
    #[arg(long, default_value = DEFAULT_STORE)]
    pub store: String,

    #[command(subcommand)]
    pub action: LedgerAction,
}

#[derive(Subcommand)]
pub enum LedgerAction {
    /// Calculate a record and append it to the ledger
    Add(LoanFormArgs),
    /// Summarise every stored record
    List,
    /// Show one stored record in full
    Show {
        /// Zero-based record index
        index: usize,
    },
    /// Change raw fields of a stored record and recalculate it
    Update {
        /// Zero-based record index
        index: usize,
        #[command(flatten)]
        form: LoanFormArgs,
    },
    /// Remove a stored record
    Delete {
        /// Zero-based record index
        index: usize,
    },
    /// Write every record to a CSV file
    Export {
        /// Destination CSV file
        #[arg(long, default_value = DEFAULT_EXPORT)]
        out: String,
    },
}

pub fn run_ledger(
    args: LedgerArgs,
    config: CalculationConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let store = LedgerStore::open(&args.store);
    let calculator = LoanCalculator::new(config);

    match args.action {
        LedgerAction::Add(form) => {
            let (index, record) = store.add(&calculator, form.into_raw()?)?;
            record_output(index, &record)
        }
        LedgerAction::List => {
            let rows: Vec<Value> = store
                .load()?
                .iter()
                .enumerate()
                .map(|(index, record)| summary(index, record))
                .collect();
            Ok(Value::Array(rows))
        }
        LedgerAction::Show { index } => record_output(index, &store.get(index)?),
        LedgerAction::Update { index, form } => {
            let changes = form.into_fields()?;
            if changes.is_empty() {
                return Err("ledger update needs at least one field to change".into());
            }
            let record = store.update(&calculator, index, &changes)?;
            record_output(index, &record)
        }
        LedgerAction::Delete { index } => {
            let record = store.delete(index)?;
            let mut out = record_output(index, &record)?;
            out["deleted"] = Value::Bool(true);
            Ok(out)
        }
        LedgerAction::Export { out } => {
            let file = File::create(&out)
                .map_err(|e| format!("Failed to create '{}': {}", out, e))?;
            let rows = store.export_csv(BufWriter::new(file))?;
            Ok(json!({ "exported": rows, "path": out }))
        }
    }
}

fn record_output(index: usize, record: &LoanRecord) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(json!({
        "index": index,
        "result": serde_json::to_value(record)?,
    }))
}

fn summary(index: usize, record: &LoanRecord) -> Value {
    json!({
        "index": index,
        "customer_reference": record.raw.customer_reference,
        "customer_name": record.display.customer_name,
        "loan_amount": record.amounts.loan_amount.to_string(),
        "created_at": record.created_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_args(store: &str) -> LedgerArgs {
        LedgerArgs {
            store: store.to_string(),
            action: LedgerAction::Add(LoanFormArgs {
                input: None,
                customer_ref: Some("AB 123".into()),
                customer_name: Some("jane q public".into()),
                city_state: Some("Austin, TX".into()),
                purchase_value: Some("one hundred thousand dollars".into()),
                purchase_reduction: Some("10".into()),
                down_payment: Some("20".into()),
                loan_period: Some("15".into()),
                annual_interest: Some("5".into()),
                monthly_principal_reduction: Some("100".into()),
                total_interest_reduction: Some("100".into()),
                guarantor_name: Some("john doe".into()),
                guarantor_ref: Some("G77".into()),
            }),
        }
    }

    #[test]
    fn test_add_list_delete_cycle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let store = path.to_str().unwrap();

        let added = run_ledger(add_args(store), CalculationConfig::default()).unwrap();
        assert_eq!(added["index"], 0);
        assert_eq!(added["result"]["amounts"]["loan_amount"], "72000.00");

        let listed = run_ledger(
            LedgerArgs {
                store: store.to_string(),
                action: LedgerAction::List,
            },
            CalculationConfig::default(),
        )
        .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["customer_name"], "JANE.Q  PUBLIC");

        let deleted = run_ledger(
            LedgerArgs {
                store: store.to_string(),
                action: LedgerAction::Delete { index: 0 },
            },
            CalculationConfig::default(),
        )
        .unwrap();
        assert_eq!(deleted["deleted"], true);
        assert!(LedgerStore::open(&path).load().unwrap().is_empty());
    }

    #[test]
    fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("ledger.json");
        let out = dir.path().join("ledger.csv");
        run_ledger(add_args(store.to_str().unwrap()), CalculationConfig::default()).unwrap();

        let result = run_ledger(
            LedgerArgs {
                store: store.to_str().unwrap().to_string(),
                action: LedgerAction::Export {
                    out: out.to_str().unwrap().to_string(),
                },
            },
            CalculationConfig::default(),
        )
        .unwrap();
        assert_eq!(result["exported"], 1);
        assert!(std::fs::read_to_string(&out)
            .unwrap()
            .starts_with("Customer Reference Number,"));
    }
}
