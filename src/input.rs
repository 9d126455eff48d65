//! Ledger snapshots as read from disk.

use crate::core::{
    AccountBalance, BracketTable, EngineError, ExpenseRecord, Money, ObligationRecord, Percentage,
    RevenueRecord, Settings, TaxBracket,
};
use anyhow::Context;
use chrono::NaiveDate;
use microtax_derive::CsvSchema;
use schemars::JsonSchema;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// Column description generated by `#[derive(CsvSchema)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// JSON input root
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LedgerInput {
    pub settings: Settings,
    /// Bracket rows for any number of (year, scope) sets
    #[serde(default)]
    pub brackets: Vec<TaxBracket>,
    #[serde(default)]
    pub invoices: Vec<RevenueRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub obligations: Vec<ObligationRecord>,
    #[serde(default)]
    pub account: Option<AccountBalance>,
}

/// Validated snapshot ready for the engine.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub settings: Settings,
    pub brackets: BracketTable,
    pub invoices: Vec<RevenueRecord>,
    pub expenses: Vec<ExpenseRecord>,
    pub obligations: Vec<ObligationRecord>,
    pub account: Option<AccountBalance>,
}

impl TryFrom<LedgerInput> for Ledger {
    type Error = EngineError;

    fn try_from(input: LedgerInput) -> Result<Self, Self::Error> {
        input.settings.validate()?;
        let brackets = BracketTable::from_brackets(input.brackets)?;
        Ok(Ledger {
            settings: input.settings,
            brackets,
            invoices: input.invoices,
            expenses: input.expenses,
            obligations: input.obligations,
            account: input.account,
        })
    }
}

/// One invoice per CSV row.
#[derive(Debug, Clone, Serialize, Deserialize, CsvSchema)]
pub struct InvoiceRow {
    /// Invoice number
    pub number: String,
    /// Issue date (YYYY-MM-DD)
    pub invoice_date: NaiveDate,
    /// Date the invoice was paid, empty while unpaid
    pub payment_date: Option<NaiveDate>,
    /// Amount before VAT
    #[serde(rename = "ht", deserialize_with = "decimal_text")]
    pub amount_ht: Money,
    /// Amount including VAT, as invoiced
    #[serde(rename = "ttc", deserialize_with = "decimal_text")]
    pub amount_ttc: Money,
    /// VAT rate in percent
    #[serde(deserialize_with = "decimal_text")]
    pub tax_rate: Percentage,
    /// "true" for canceled invoices
    pub canceled: Option<bool>,
}

/// Read a CSV field as text so amounts never pass through a float.
fn decimal_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = EngineError>,
{
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(de::Error::custom)
}

impl From<InvoiceRow> for RevenueRecord {
    fn from(row: InvoiceRow) -> Self {
        RevenueRecord {
            reference: Some(row.number),
            amount_ht: row.amount_ht,
            amount_ttc: row.amount_ttc,
            tax_rate: row.tax_rate,
            invoice_date: row.invoice_date,
            payment_date: row.payment_date,
            canceled: row.canceled.unwrap_or(false),
        }
    }
}

pub fn read_ledger_json<R: Read>(reader: R) -> anyhow::Result<LedgerInput> {
    let input: LedgerInput = serde_json::from_reader(reader)?;
    Ok(input)
}

pub fn read_invoices_csv<R: Read>(reader: R) -> anyhow::Result<Vec<RevenueRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let rows: Result<Vec<InvoiceRow>, _> = rdr.deserialize::<InvoiceRow>().collect();
    let mut invoices: Vec<RevenueRecord> = rows?.into_iter().map(Into::into).collect();
    invoices.sort_by_key(|i| i.invoice_date);
    Ok(invoices)
}

/// Load a ledger from a JSON file (or stdin with "-"), optionally adding
/// invoices from a CSV file.
pub fn load_ledger(path: &Path, invoices_csv: Option<&Path>) -> anyhow::Result<Ledger> {
    let mut input = if path.as_os_str() == "-" {
        read_from_stdin()?
    } else {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        read_ledger_json(BufReader::new(file))
            .with_context(|| format!("reading {}", path.display()))?
    };

    if let Some(csv_path) = invoices_csv {
        let file = File::open(csv_path).with_context(|| format!("opening {}", csv_path.display()))?;
        let invoices = read_invoices_csv(file)
            .with_context(|| format!("reading {}", csv_path.display()))?;
        log::info!("Read {} invoices from {}", invoices.len(), csv_path.display());
        input.invoices.extend(invoices);
    }

    log::info!(
        "Ledger: {} invoices, {} expenses, {} obligations, {} brackets",
        input.invoices.len(),
        input.expenses.len(),
        input.obligations.len(),
        input.brackets.len()
    );

    Ok(Ledger::try_from(input)?)
}

fn read_from_stdin() -> anyhow::Result<LedgerInput> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    read_ledger_json(io::Cursor::new(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: &str = r#"{
        "settings": {
            "urssaf_rate": "21.1",
            "estimated_tax_rate": "2.2",
            "revenue_deduction_rate": "34",
            "monthly_salary": "3000"
        },
        "brackets": [
            { "year": 2025, "min_income": "0", "max_income": "10000", "rate": "0" },
            { "year": 2025, "min_income": "10000", "rate": "11" }
        ],
        "invoices": [
            {
                "amount_ht": "1000",
                "amount_ttc": "1200",
                "tax_rate": "20",
                "invoice_date": "2025-03-10"
            }
        ]
    }"#;

    #[test]
    fn json_snapshot_becomes_ledger() {
        let input = read_ledger_json(LEDGER.as_bytes()).unwrap();
        let ledger = Ledger::try_from(input).unwrap();
        assert_eq!(ledger.brackets.resolve(2025).unwrap().len(), 2);
        assert_eq!(ledger.invoices.len(), 1);
        assert!(!ledger.invoices[0].canceled);
        assert!(ledger.invoices[0].payment_date.is_none());
        assert!(ledger.account.is_none());
    }

    #[test]
    fn invalid_brackets_fail_at_load() {
        let broken = LEDGER.replace(
            r#""min_income": "10000", "rate""#,
            r#""min_income": "12000", "rate""#,
        );
        let input = read_ledger_json(broken.as_bytes()).unwrap();
        assert!(matches!(
            Ledger::try_from(input),
            Err(EngineError::BracketGap { .. })
        ));
    }

    #[test]
    fn csv_invoices_parsed() {
        let data = "\
number,invoice_date,payment_date,ht,ttc,tax_rate,canceled
F-002,2025-03-10,,1000.00,1200.00,20,
F-001,2025-02-01,2025-02-20,250.5,300.60,20,false
F-003,2025-03-01,,5000,6000,20,true
";
        let invoices = read_invoices_csv(data.as_bytes()).unwrap();
        assert_eq!(invoices.len(), 3);
        assert_eq!(invoices[0].reference.as_deref(), Some("F-001"));
        assert_eq!(invoices[0].amount_ht, "250.50".parse::<Money>().unwrap());
        assert!(invoices[1].canceled);
        assert_eq!(invoices[2].reference.as_deref(), Some("F-002"));
        assert!(invoices[2].payment_date.is_none());
        assert!(!invoices[2].canceled);
    }

    #[test]
    fn csv_amounts_read_exactly() {
        let data = "\
number,invoice_date,payment_date,ht,ttc,tax_rate,canceled
F-100,2025-05-02,,1234567890123456.78,1481481468148148.14,20,
";
        let invoices = read_invoices_csv(data.as_bytes()).unwrap();
        assert_eq!(invoices[0].amount_ht.to_string(), "1234567890123456.78");
        assert_eq!(invoices[0].amount_ttc.to_string(), "1481481468148148.14");
    }

    #[test]
    fn csv_sub_cent_amount_rejected() {
        let data = "\
number,invoice_date,payment_date,ht,ttc,tax_rate,canceled
F-101,2025-05-02,,100.001,120,20,
";
        assert!(read_invoices_csv(data.as_bytes()).is_err());
    }

    #[test]
    fn json_ledger_with_float_overflowing_amount_rejected() {
        let broken = LEDGER.replace(
            r#""amount_ht": "1000""#,
            r#""amount_ht": 1234567890123456.78"#,
        );
        assert!(read_ledger_json(broken.as_bytes()).is_err());
    }

    #[test]
    fn csv_schema_lists_columns() {
        let schema = InvoiceRow::csv_schema();
        let names: Vec<&str> = schema.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["number", "invoice_date", "payment_date", "ht", "ttc", "tax_rate", "canceled"]
        );
        assert!(schema[0].required);
        assert!(!schema[2].required);
        assert_eq!(InvoiceRow::csv_header(), names.join(","));
    }
}
