//! CSV exporters.

use ::csv::{Writer, WriterBuilder};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::export::{ExportError, ReportExporter};
use crate::report::FinancialReport;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Column order of [`SummaryRow`].
const SUMMARY_HEADER: [&str; 14] = [
    "id",
    "period",
    "type",
    "year",
    "status",
    "total_revenue",
    "total_expenses",
    "gross_profit",
    "tax_amount",
    "net_profit",
    "total_assets",
    "total_liabilities",
    "total_equity",
    "is_balanced",
];

const DETAIL_HEADER: [&str; 5] = ["report_id", "period", "section", "item", "amount"];

// Every export starts with its header row, even with no reports.
fn writer() -> Writer<Vec<u8>> {
    WriterBuilder::new().has_headers(false).from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.error().to_string()))
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    id: String,
    period: &'a str,
    #[serde(rename = "type")]
    report_type: &'static str,
    year: i32,
    status: &'static str,
    total_revenue: Decimal,
    total_expenses: Decimal,
    gross_profit: Decimal,
    tax_amount: Decimal,
    net_profit: Decimal,
    total_assets: Decimal,
    total_liabilities: Decimal,
    total_equity: Decimal,
    is_balanced: bool,
}

/// One row per report with its headline figures.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryCsvExporter;

impl ReportExporter for SummaryCsvExporter {
    fn content_type(&self) -> &'static str {
        CSV_CONTENT_TYPE
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn export(&self, reports: &[FinancialReport]) -> Result<Vec<u8>, ExportError> {
        let mut out = writer();
        out.write_record(SUMMARY_HEADER)?;
        for report in reports {
            let figures = report.figures();
            out.serialize(SummaryRow {
                id: report.id.to_string(),
                period: &report.period,
                report_type: report.report_type.as_str(),
                year: report.year,
                status: report.status.as_str(),
                total_revenue: figures.total_revenue,
                total_expenses: figures.total_expenses,
                gross_profit: figures.gross_profit,
                tax_amount: figures.tax_amount,
                net_profit: figures.net_profit,
                total_assets: figures.total_assets,
                total_liabilities: figures.total_liabilities,
                total_equity: figures.total_equity,
                is_balanced: figures.is_balanced,
            })?;
        }
        finish(out)
    }
}

/// One row per line item, keyed by section and the verbatim item name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailCsvExporter;

impl ReportExporter for DetailCsvExporter {
    fn content_type(&self) -> &'static str {
        CSV_CONTENT_TYPE
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn export(&self, reports: &[FinancialReport]) -> Result<Vec<u8>, ExportError> {
        let mut out = writer();
        out.write_record(DETAIL_HEADER)?;
        for report in reports {
            let id = report.id.to_string();
            for (section, entries) in report.line_items().sections() {
                for (item, amount) in entries {
                    out.write_record([
                        id.as_str(),
                        report.period.as_str(),
                        section,
                        item,
                        amount.to_string().as_str(),
                    ])?;
                }
            }
            let tax = report.tax;
            for (item, amount) in [
                ("rate", tax.rate),
                ("deductions", tax.deductions),
                ("amount", tax.amount),
            ] {
                out.write_record([
                    id.as_str(),
                    report.period.as_str(),
                    "tax",
                    item,
                    amount.to_string().as_str(),
                ])?;
            }
        }
        finish(out)
    }
}
