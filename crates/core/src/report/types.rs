//! Line-item schema for a financial report.
//!
//! Every category serializes with its camelCase keys verbatim. Keys absent
//! from a present category default to zero; present-but-invalid values are
//! rejected rather than zeroed.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validation::{ValidationError, require_rate};

/// Largest absolute amount accepted for a single line item (10^18).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA764_0000, 0x0DE0_B6B3, 0, false, 0);

/// A flat mapping of line-item keys to amounts.
pub trait CategoryMap {
    /// Wire keys in declaration order.
    const KEYS: &'static [&'static str];

    /// Amounts in the same order as `KEYS`.
    fn amounts(&self) -> Vec<Decimal>;

    /// Builds the category from amounts ordered like `KEYS`; missing trailing
    /// amounts are zero.
    fn from_amounts(amounts: &[Decimal]) -> Self;

    /// `(key, amount)` pairs in declaration order.
    fn entries(&self) -> Vec<(&'static str, Decimal)> {
        Self::KEYS.iter().copied().zip(self.amounts()).collect()
    }
}

macro_rules! line_item_category {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $field:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(rename = $key, default)]
                pub $field: Decimal,
            )+
        }

        impl CategoryMap for $name {
            const KEYS: &'static [&'static str] = &[$($key),+];

            fn amounts(&self) -> Vec<Decimal> {
                vec![$(self.$field),+]
            }

            fn from_amounts(amounts: &[Decimal]) -> Self {
                let mut iter = amounts.iter().copied();
                Self {
                    $($field: iter.next().unwrap_or_default(),)+
                }
            }
        }
    };
}

line_item_category!(
    /// Operating revenue by service line.
    RevenueItems {
        /// Inpatient and outpatient care.
        patient_care => "patientCare",
        /// Emergency department.
        emergency_services => "emergencyServices",
        /// Surgical services.
        surgery => "surgery",
        /// Laboratory services.
        laboratory => "laboratory",
        /// Pharmacy sales.
        pharmacy => "pharmacy",
        /// Other revenue.
        other => "other",
    }
);

line_item_category!(
    /// Operating expenses.
    ExpenseItems {
        /// Staff salaries.
        salaries => "salaries",
        /// Medical supplies.
        medical_supplies => "medicalSupplies",
        /// Equipment purchases and leases.
        equipment => "equipment",
        /// Utilities.
        utilities => "utilities",
        /// Maintenance.
        maintenance => "maintenance",
        /// Insurance premiums.
        insurance => "insurance",
        /// Other expenses.
        other => "other",
    }
);

line_item_category!(
    /// Current assets.
    CurrentAssets {
        /// Cash and equivalents.
        cash => "cash",
        /// Accounts receivable.
        accounts_receivable => "accountsReceivable",
        /// Inventory.
        inventory => "inventory",
        /// Other current assets.
        other => "other",
    }
);

line_item_category!(
    /// Fixed assets.
    FixedAssets {
        /// Buildings.
        buildings => "buildings",
        /// Equipment.
        equipment => "equipment",
        /// Vehicles.
        vehicles => "vehicles",
        /// Other fixed assets.
        other => "other",
    }
);

line_item_category!(
    /// Current liabilities.
    CurrentLiabilities {
        /// Accounts payable.
        accounts_payable => "accountsPayable",
        /// Short-term debt.
        short_term_debt => "shortTermDebt",
        /// Accrued expenses.
        accrued_expenses => "accruedExpenses",
        /// Other current liabilities.
        other => "other",
    }
);

line_item_category!(
    /// Long-term liabilities.
    LongTermLiabilities {
        /// Long-term debt.
        long_term_debt => "longTermDebt",
        /// Other long-term liabilities.
        other => "other",
    }
);

line_item_category!(
    /// Owners' equity. Retained and current earnings may be negative.
    Equity {
        /// Paid-in capital.
        capital => "capital",
        /// Retained earnings.
        retained_earnings => "retainedEarnings",
        /// Current period earnings.
        current_earnings => "currentEarnings",
    }
);

/// Assets, split into current and fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assets {
    /// Current assets.
    pub current: CurrentAssets,
    /// Fixed assets.
    pub fixed: FixedAssets,
}

/// Liabilities, split into current and long-term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Liabilities {
    /// Current liabilities.
    pub current: CurrentLiabilities,
    /// Long-term liabilities.
    pub long_term: LongTermLiabilities,
}

/// Raw tax inputs supplied with a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxInput {
    /// Explicit rate; when absent the hospital default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    /// Allowed deductions from gross profit.
    #[serde(default)]
    pub deductions: Decimal,
}

/// Derived tax block persisted with a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tax {
    /// Gross profit before deductions.
    pub income: Decimal,
    /// Rate applied.
    pub rate: Decimal,
    /// Tax due.
    pub amount: Decimal,
    /// Deductions applied.
    pub deductions: Decimal,
    /// Taxable income after deductions, floored at zero.
    pub net_taxable: Decimal,
}

/// Derived balance-sheet block persisted with a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    /// Current plus fixed assets.
    pub total_assets: Decimal,
    /// Current plus long-term liabilities.
    pub total_liabilities: Decimal,
    /// Capital plus retained and current earnings.
    pub total_equity: Decimal,
    /// Whether assets equal liabilities plus equity within one unit.
    pub is_balanced: bool,
}

/// All raw line items of one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItems {
    /// Revenue by service line.
    pub revenue: RevenueItems,
    /// Operating expenses.
    pub expenses: ExpenseItems,
    /// Current and fixed assets.
    pub assets: Assets,
    /// Current and long-term liabilities.
    pub liabilities: Liabilities,
    /// Equity components.
    pub equity: Equity,
    /// Tax inputs.
    #[serde(default)]
    pub tax: TaxInput,
}

impl LineItems {
    /// Reads the line-item categories out of a report JSON object.
    ///
    /// `tax` is optional; every other category is required.
    pub fn from_json(object: &Map<String, Value>) -> Result<Self, ValidationError> {
        let items = Self {
            revenue: parse_category(object, "revenue", "revenue")?,
            expenses: parse_category(object, "expenses", "expenses")?,
            assets: parse_assets(object)?,
            liabilities: parse_liabilities(object)?,
            equity: parse_category(object, "equity", "equity")?,
            tax: match object.get("tax") {
                Some(value) => parse_tax(value)?,
                None => TaxInput::default(),
            },
        };
        items.validate()?;
        Ok(items)
    }

    /// Every flat category with its dotted path, in schema order.
    pub fn sections(&self) -> Vec<(&'static str, Vec<(&'static str, Decimal)>)> {
        vec![
            ("revenue", self.revenue.entries()),
            ("expenses", self.expenses.entries()),
            ("assets.current", self.assets.current.entries()),
            ("assets.fixed", self.assets.fixed.entries()),
            ("liabilities.current", self.liabilities.current.entries()),
            ("liabilities.longTerm", self.liabilities.long_term.entries()),
            ("equity", self.equity.entries()),
        ]
    }

    /// Checks sign and magnitude of every amount and the tax rate range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (section, entries) in self.sections() {
            for (key, amount) in entries {
                let may_be_negative =
                    section == "equity" && matches!(key, "retainedEarnings" | "currentEarnings");
                check_amount(&format!("{section}.{key}"), amount, may_be_negative)?;
            }
        }

        check_amount("tax.deductions", self.tax.deductions, false)?;
        if let Some(rate) = self.tax.rate {
            require_rate("tax.rate", rate)?;
        }
        Ok(())
    }
}

fn check_amount(field: &str, amount: Decimal, may_be_negative: bool) -> Result<(), ValidationError> {
    if amount.abs() > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge {
            field: field.to_string(),
        });
    }
    if !may_be_negative && amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
            value: amount,
        });
    }
    Ok(())
}

/// Parses one JSON value as an exact decimal amount.
pub(crate) fn parse_amount(value: &Value, field: &str) -> Result<Decimal, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidAmount {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    match value {
        Value::Number(number) => {
            let text = number.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|_| invalid("number is not representable as a decimal"))
        }
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(invalid("empty string is not a number"));
            }
            Decimal::from_str(trimmed).map_err(|_| invalid("string is not a decimal number"))
        }
        Value::Null => Err(invalid("null is not a number")),
        Value::Bool(_) => Err(invalid("boolean is not a number")),
        Value::Array(_) | Value::Object(_) => Err(invalid("expected a number")),
    }
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::InvalidField {
        field: path.to_string(),
        reason: "expected an object".to_string(),
    })
}

fn reject_unknown(
    object: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
) -> Result<(), ValidationError> {
    match object.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(ValidationError::UnknownField(format!("{path}.{key}"))),
        None => Ok(()),
    }
}

fn required<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, ValidationError> {
    parent
        .get(key)
        .ok_or_else(|| ValidationError::MissingCategory(path.to_string()))
}

/// Parses a required flat category under `key` of `parent`.
pub(crate) fn parse_category<C: CategoryMap>(
    parent: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<C, ValidationError> {
    let object = expect_object(required(parent, key, path)?, path)?;
    reject_unknown(object, C::KEYS, path)?;

    let amounts = C::KEYS
        .iter()
        .map(|key| match object.get(*key) {
            Some(value) => parse_amount(value, &format!("{path}.{key}")),
            None => Ok(Decimal::ZERO),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(C::from_amounts(&amounts))
}

/// Parses the required `assets` block.
pub(crate) fn parse_assets(parent: &Map<String, Value>) -> Result<Assets, ValidationError> {
    let object = expect_object(required(parent, "assets", "assets")?, "assets")?;
    reject_unknown(object, &["current", "fixed"], "assets")?;
    Ok(Assets {
        current: parse_category(object, "current", "assets.current")?,
        fixed: parse_category(object, "fixed", "assets.fixed")?,
    })
}

/// Parses the required `liabilities` block.
pub(crate) fn parse_liabilities(parent: &Map<String, Value>) -> Result<Liabilities, ValidationError> {
    let object = expect_object(required(parent, "liabilities", "liabilities")?, "liabilities")?;
    reject_unknown(object, &["current", "longTerm"], "liabilities")?;
    Ok(Liabilities {
        current: parse_category(object, "current", "liabilities.current")?,
        long_term: parse_category(object, "longTerm", "liabilities.longTerm")?,
    })
}

/// Parses a `tax` block. A null or absent rate means "use the default".
pub(crate) fn parse_tax(value: &Value) -> Result<TaxInput, ValidationError> {
    let object = expect_object(value, "tax")?;
    reject_unknown(object, &["rate", "deductions"], "tax")?;

    let rate = match object.get("rate") {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_amount(value, "tax.rate")?),
    };
    let deductions = match object.get("deductions") {
        None => Decimal::ZERO,
        Some(value) => parse_amount(value, "tax.deductions")?,
    };

    Ok(TaxInput { rate, deductions })
}
