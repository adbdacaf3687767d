//! The persisted financial report and the payloads that create or edit it.

use chrono::{DateTime, Utc};
use hospifin_shared::types::{ReportId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lifecycle::ReportStatus;
use crate::report::derivation::{Derivation, DerivationEngine};
use crate::report::period::{PeriodKey, ReportPeriod, ReportType};
use crate::report::types::{
    Assets, BalanceSheet, Equity, ExpenseItems, LineItems, Liabilities, RevenueItems, Tax,
    TaxInput, parse_assets, parse_category, parse_liabilities, parse_tax,
};
use crate::validation::{ValidationError, require_max_len, require_non_empty};

/// Maximum length of report notes.
pub const MAX_NOTES_LEN: usize = 1000;
/// Maximum length of a period label.
pub const MAX_LABEL_LEN: usize = 100;

/// One periodic financial report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    /// Report ID.
    pub id: ReportId,
    /// Owning hospital.
    pub hospital_id: String,
    /// Calendar unit.
    pub report_type: ReportType,
    /// Display label of the period.
    pub period: String,
    /// Calendar year.
    pub year: i32,
    /// Month for monthly reports.
    pub month: Option<u32>,
    /// Quarter for quarterly reports.
    pub quarter: Option<u32>,
    /// Revenue line items.
    pub revenue: RevenueItems,
    /// Expense line items.
    pub expenses: ExpenseItems,
    /// Asset line items.
    pub assets: Assets,
    /// Liability line items.
    pub liabilities: Liabilities,
    /// Equity line items.
    pub equity: Equity,
    /// Derived tax block.
    pub tax: Tax,
    /// Derived balance sheet block.
    pub balance_sheet: BalanceSheet,
    /// Lifecycle status.
    pub status: ReportStatus,
    /// User who created the report.
    pub created_by: UserId,
    /// Admin who approved the report.
    pub approved_by: Option<UserId>,
    /// When the report was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// Reason given on the last rejection.
    pub rejection_reason: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl FinancialReport {
    /// Builds a fresh draft from validated inputs, deriving tax and balance sheet.
    #[must_use]
    pub fn new_draft(
        hospital_id: String,
        draft: ReportDraft,
        tax_rate: Decimal,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        let period = draft.label.unwrap_or_else(|| draft.period.label());
        let mut report = Self {
            id: ReportId::new(),
            hospital_id,
            report_type: draft.period.report_type,
            period,
            year: draft.period.year,
            month: draft.period.month,
            quarter: draft.period.quarter,
            revenue: draft.line_items.revenue,
            expenses: draft.line_items.expenses,
            assets: draft.line_items.assets,
            liabilities: draft.line_items.liabilities,
            equity: draft.line_items.equity,
            tax: Tax {
                rate: tax_rate,
                deductions: draft.line_items.tax.deductions,
                ..Tax::default()
            },
            balance_sheet: BalanceSheet::default(),
            status: ReportStatus::Draft,
            created_by,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };
        report.recompute();
        report
    }

    /// The covered period.
    #[must_use]
    pub const fn report_period(&self) -> ReportPeriod {
        ReportPeriod {
            report_type: self.report_type,
            year: self.year,
            month: self.month,
            quarter: self.quarter,
        }
    }

    /// The uniqueness key of this report.
    #[must_use]
    pub fn period_key(&self) -> PeriodKey {
        PeriodKey::new(self.hospital_id.clone(), self.report_period())
    }

    /// Raw line items, with the persisted rate as the tax input rate.
    #[must_use]
    pub const fn line_items(&self) -> LineItems {
        LineItems {
            revenue: self.revenue,
            expenses: self.expenses,
            assets: self.assets,
            liabilities: self.liabilities,
            equity: self.equity,
            tax: TaxInput {
                rate: Some(self.tax.rate),
                deductions: self.tax.deductions,
            },
        }
    }

    /// Every derived figure, recomputed from the persisted line items.
    #[must_use]
    pub fn figures(&self) -> Derivation {
        DerivationEngine::derive(&self.line_items(), self.tax.rate)
    }

    /// Refreshes the derived tax and balance-sheet blocks.
    pub fn recompute(&mut self) {
        let figures = self.figures();
        self.tax = figures.tax();
        self.balance_sheet = figures.balance_sheet();
    }

    /// Applies an edit and recomputes every derived field.
    pub fn apply_patch(&mut self, patch: ReportPatch, now: DateTime<Utc>) {
        if let Some(label) = patch.label {
            self.period = label;
        }
        if let Some(revenue) = patch.revenue {
            self.revenue = revenue;
        }
        if let Some(expenses) = patch.expenses {
            self.expenses = expenses;
        }
        if let Some(assets) = patch.assets {
            self.assets = assets;
        }
        if let Some(liabilities) = patch.liabilities {
            self.liabilities = liabilities;
        }
        if let Some(equity) = patch.equity {
            self.equity = equity;
        }
        if let Some(tax) = patch.tax {
            if let Some(rate) = tax.rate {
                self.tax.rate = rate;
            }
            self.tax.deductions = tax.deductions;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        self.recompute();
        self.updated_at = now;
    }
}

const DRAFT_KEYS: &[&str] = &[
    "hospitalId",
    "reportType",
    "year",
    "month",
    "quarter",
    "period",
    "revenue",
    "expenses",
    "assets",
    "liabilities",
    "equity",
    "tax",
    "notes",
];

const PATCH_KEYS: &[&str] = &[
    "period",
    "revenue",
    "expenses",
    "assets",
    "liabilities",
    "equity",
    "tax",
    "notes",
];

const FIXED_KEYS: &[&str] = &[
    "id",
    "hospitalId",
    "reportType",
    "year",
    "month",
    "quarter",
    "status",
    "createdBy",
    "approvedBy",
    "approvedAt",
    "rejectionReason",
    "balanceSheet",
    "createdAt",
    "updatedAt",
];

/// Validated inputs for creating a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    /// Hospital named in the payload, if any.
    pub hospital_id: Option<String>,
    /// Covered period.
    pub period: ReportPeriod,
    /// Explicit period label.
    pub label: Option<String>,
    /// Raw line items.
    pub line_items: LineItems,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl ReportDraft {
    /// Creates a draft for `period` with the given line items.
    #[must_use]
    pub const fn new(period: ReportPeriod, line_items: LineItems) -> Self {
        Self {
            hospital_id: None,
            period,
            label: None,
            line_items,
            notes: None,
        }
    }

    /// Parses and validates a create-report payload.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let object = as_object(value)?;
        if let Some(key) = object.keys().find(|k| !DRAFT_KEYS.contains(&k.as_str())) {
            return Err(ValidationError::UnknownField(key.clone()));
        }

        let report_type = match object.get("reportType") {
            Some(Value::String(s)) => ReportType::parse(s)
                .ok_or_else(|| invalid("reportType", "expected monthly, quarterly or annual"))?,
            Some(_) => return Err(invalid("reportType", "expected a string")),
            None => return Err(ValidationError::EmptyField("reportType")),
        };
        let year = match object.get("year") {
            Some(value) => parse_int(value, "year")?,
            None => return Err(ValidationError::EmptyField("year")),
        };

        let draft = Self {
            hospital_id: optional_string(object, "hospitalId")?,
            period: ReportPeriod {
                report_type,
                year: i32::try_from(year).map_err(|_| invalid("year", "out of range"))?,
                month: optional_u32(object, "month")?,
                quarter: optional_u32(object, "quarter")?,
            },
            label: normalize_label(optional_string(object, "period")?),
            line_items: LineItems::from_json(object)?,
            notes: optional_string(object, "notes")?,
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Checks period shape, line items, label, and notes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.period.validate()?;
        self.line_items.validate()?;
        if let Some(hospital_id) = &self.hospital_id {
            require_non_empty("hospitalId", hospital_id)?;
        }
        if let Some(label) = &self.label {
            require_max_len("period", label, MAX_LABEL_LEN)?;
        }
        if let Some(notes) = &self.notes {
            require_max_len("notes", notes, MAX_NOTES_LEN)?;
        }
        Ok(())
    }
}

/// Validated edits to an existing report. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportPatch {
    /// New period label.
    pub label: Option<String>,
    /// Replacement revenue category.
    pub revenue: Option<RevenueItems>,
    /// Replacement expense category.
    pub expenses: Option<ExpenseItems>,
    /// Replacement assets block.
    pub assets: Option<Assets>,
    /// Replacement liabilities block.
    pub liabilities: Option<Liabilities>,
    /// Replacement equity category.
    pub equity: Option<Equity>,
    /// Replacement tax inputs.
    pub tax: Option<TaxInput>,
    /// New notes; `Some(None)` clears them.
    pub notes: Option<Option<String>>,
}

impl ReportPatch {
    /// Parses and validates an edit payload.
    ///
    /// Identity, lifecycle, and derived fields are refused as immutable.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let object = as_object(value)?;
        for key in object.keys() {
            if FIXED_KEYS.contains(&key.as_str()) {
                return Err(ValidationError::ImmutableField(key.clone()));
            }
            if !PATCH_KEYS.contains(&key.as_str()) {
                return Err(ValidationError::UnknownField(key.clone()));
            }
        }

        let patch = Self {
            label: match optional_string(object, "period")? {
                Some(label) => Some(
                    normalize_label(Some(label)).ok_or(ValidationError::EmptyField("period"))?,
                ),
                None => None,
            },
            revenue: present(object, "revenue")
                .then(|| parse_category(object, "revenue", "revenue"))
                .transpose()?,
            expenses: present(object, "expenses")
                .then(|| parse_category(object, "expenses", "expenses"))
                .transpose()?,
            assets: present(object, "assets")
                .then(|| parse_assets(object))
                .transpose()?,
            liabilities: present(object, "liabilities")
                .then(|| parse_liabilities(object))
                .transpose()?,
            equity: present(object, "equity")
                .then(|| parse_category(object, "equity", "equity"))
                .transpose()?,
            tax: object.get("tax").map(parse_tax).transpose()?,
            notes: object
                .contains_key("notes")
                .then(|| optional_string(object, "notes"))
                .transpose()?,
        };
        patch.validate()?;
        Ok(patch)
    }

    /// Checks every replacement category as a full line-item set would be.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut probe = LineItems::default();
        if let Some(revenue) = self.revenue {
            probe.revenue = revenue;
        }
        if let Some(expenses) = self.expenses {
            probe.expenses = expenses;
        }
        if let Some(assets) = self.assets {
            probe.assets = assets;
        }
        if let Some(liabilities) = self.liabilities {
            probe.liabilities = liabilities;
        }
        if let Some(equity) = self.equity {
            probe.equity = equity;
        }
        if let Some(tax) = self.tax {
            probe.tax = tax;
        }
        probe.validate()?;

        if let Some(label) = &self.label {
            require_max_len("period", label, MAX_LABEL_LEN)?;
        }
        if let Some(Some(notes)) = &self.notes {
            require_max_len("notes", notes, MAX_NOTES_LEN)?;
        }
        Ok(())
    }

    /// True when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, ValidationError> {
    value
        .as_object()
        .ok_or_else(|| invalid("body", "expected a JSON object"))
}

fn present(object: &Map<String, Value>, key: &str) -> bool {
    object.contains_key(key)
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_int(value: &Value, field: &str) -> Result<i64, ValidationError> {
    value
        .as_i64()
        .ok_or_else(|| invalid(field, "expected an integer"))
}

fn optional_u32(object: &Map<String, Value>, key: &str) -> Result<Option<u32>, ValidationError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let raw = parse_int(value, key)?;
            u32::try_from(raw)
                .map(Some)
                .map_err(|_| invalid(key, "must not be negative"))
        }
    }
}

fn optional_string(
    object: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, ValidationError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(key, "expected a string")),
    }
}

fn normalize_label(label: Option<String>) -> Option<String> {
    label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}
