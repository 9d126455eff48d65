//! Schema command - print expected input formats

use clap::Args;
use microtax::input::{InvoiceRow, LedgerInput};
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the ledger snapshot
    JsonSchema,
    /// CSV header row for invoice files
    CsvHeader,
    /// Invoice CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(LedgerInput);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        println!("{}", InvoiceRow::csv_header());
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("Invoice CSV Format");
        println!("==================");
        println!();
        for field in InvoiceRow::csv_schema() {
            let req = if field.required { "required" } else { "optional" };
            println!("{:20} ({:8})  {}", field.name, req, field.description);
        }
        println!();
        println!("Amounts are decimals with at most two places; rates are percentages (20 = 20%).");
        Ok(())
    }
}
