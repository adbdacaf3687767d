//! Report periods: monthly, quarterly, or annual.

use std::fmt;

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, require_range};

/// Earliest reporting year accepted.
pub const MIN_YEAR: i32 = 2020;
/// Latest reporting year accepted.
pub const MAX_YEAR: i32 = 2030;

/// The calendar unit a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// One calendar month.
    Monthly,
    /// One calendar quarter.
    Quarterly,
    /// One calendar year.
    Annual,
}

impl ReportType {
    /// Returns the string representation of the report type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    /// Parses a report type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report type plus year and the optional month or quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    /// Calendar unit.
    pub report_type: ReportType,
    /// Calendar year.
    pub year: i32,
    /// Month (1-12), monthly reports only.
    pub month: Option<u32>,
    /// Quarter (1-4), quarterly reports only.
    pub quarter: Option<u32>,
}

impl ReportPeriod {
    /// A monthly period.
    #[must_use]
    pub const fn monthly(year: i32, month: u32) -> Self {
        Self {
            report_type: ReportType::Monthly,
            year,
            month: Some(month),
            quarter: None,
        }
    }

    /// A quarterly period.
    #[must_use]
    pub const fn quarterly(year: i32, quarter: u32) -> Self {
        Self {
            report_type: ReportType::Quarterly,
            year,
            month: None,
            quarter: Some(quarter),
        }
    }

    /// An annual period.
    #[must_use]
    pub const fn annual(year: i32) -> Self {
        Self {
            report_type: ReportType::Annual,
            year,
            month: None,
            quarter: None,
        }
    }

    /// Checks year range and that month/quarter match the report type.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_range(
            "year",
            i64::from(self.year),
            i64::from(MIN_YEAR),
            i64::from(MAX_YEAR),
        )?;
        if let Some(month) = self.month {
            require_range("month", i64::from(month), 1, 12)?;
        }
        if let Some(quarter) = self.quarter {
            require_range("quarter", i64::from(quarter), 1, 4)?;
        }

        match (self.report_type, self.month, self.quarter) {
            (ReportType::Monthly, Some(_), None)
            | (ReportType::Quarterly, None, Some(_))
            | (ReportType::Annual, None, None) => Ok(()),
            (ReportType::Monthly, _, _) => Err(ValidationError::PeriodMismatch(
                "monthly reports need a month and no quarter".to_string(),
            )),
            (ReportType::Quarterly, _, _) => Err(ValidationError::PeriodMismatch(
                "quarterly reports need a quarter and no month".to_string(),
            )),
            (ReportType::Annual, _, _) => Err(ValidationError::PeriodMismatch(
                "annual reports take neither month nor quarter".to_string(),
            )),
        }
    }

    /// Human-readable label: `January 2024`, `Q1 2024`, or `2024`.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.report_type, self.month, self.quarter) {
            (ReportType::Monthly, Some(month), _) => {
                match u8::try_from(month).ok().and_then(|m| Month::try_from(m).ok()) {
                    Some(name) => format!("{} {}", name.name(), self.year),
                    None => format!("Month {month} {}", self.year),
                }
            }
            (ReportType::Quarterly, _, Some(quarter)) => format!("Q{quarter} {}", self.year),
            _ => self.year.to_string(),
        }
    }

    /// Last calendar day the period covers, `None` for an invalid period.
    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        let last_month = match self.report_type {
            ReportType::Monthly => self.month?,
            ReportType::Quarterly => self.quarter?.checked_mul(3)?,
            ReportType::Annual => 12,
        };
        last_day_of_month(self.year, last_month)
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.report_type, self.month, self.quarter) {
            (ReportType::Monthly, Some(month), _) => write!(f, "{}-M{month:02}", self.year),
            (ReportType::Quarterly, _, Some(quarter)) => write!(f, "{}-Q{quarter}", self.year),
            _ => write!(f, "{}", self.year),
        }
    }
}

/// Uniqueness key: at most one non-archived report per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodKey {
    /// Owning hospital.
    pub hospital_id: String,
    /// Covered period.
    pub period: ReportPeriod,
}

impl PeriodKey {
    /// Creates a period key.
    pub fn new(hospital_id: impl Into<String>, period: ReportPeriod) -> Self {
        Self {
            hospital_id: hospital_id.into(),
            period,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.hospital_id, self.period.report_type, self.period
        )
    }
}

/// Last day of `month` in `year`.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)?
    };
    first_of_next.pred_opt()
}

/// Adds whole calendar months to a date, clamping to the month's last day.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(chrono::Months::new(months))
        .or_else(|| last_day_of_month(date.year(), date.month()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ReportPeriod::monthly(2024, 1), "January 2024")]
    #[case(ReportPeriod::monthly(2024, 12), "December 2024")]
    #[case(ReportPeriod::quarterly(2023, 3), "Q3 2023")]
    #[case(ReportPeriod::annual(2025), "2025")]
    fn test_label(#[case] period: ReportPeriod, #[case] expected: &str) {
        assert_eq!(period.label(), expected);
    }

    #[rstest]
    #[case(ReportPeriod::monthly(2024, 2), NaiveDate::from_ymd_opt(2024, 2, 29))]
    #[case(ReportPeriod::monthly(2023, 12), NaiveDate::from_ymd_opt(2023, 12, 31))]
    #[case(ReportPeriod::quarterly(2024, 2), NaiveDate::from_ymd_opt(2024, 6, 30))]
    #[case(ReportPeriod::annual(2024), NaiveDate::from_ymd_opt(2024, 12, 31))]
    fn test_end_date(#[case] period: ReportPeriod, #[case] expected: Option<NaiveDate>) {
        assert_eq!(period.end_date(), expected);
    }

    #[test]
    fn test_validate_accepts_well_formed_periods() {
        assert!(ReportPeriod::monthly(2020, 1).validate().is_ok());
        assert!(ReportPeriod::quarterly(2030, 4).validate().is_ok());
        assert!(ReportPeriod::annual(2024).validate().is_ok());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(matches!(
            ReportPeriod::monthly(2019, 1).validate(),
            Err(ValidationError::OutOfRange { field: "year", .. })
        ));
        assert!(matches!(
            ReportPeriod::monthly(2024, 13).validate(),
            Err(ValidationError::OutOfRange { field: "month", .. })
        ));
        assert!(matches!(
            ReportPeriod::quarterly(2024, 0).validate(),
            Err(ValidationError::OutOfRange { field: "quarter", .. })
        ));
    }

    #[test]
    fn test_validate_shape() {
        let mut period = ReportPeriod::monthly(2024, 1);
        period.quarter = Some(1);
        assert!(matches!(
            period.validate(),
            Err(ValidationError::PeriodMismatch(_))
        ));

        let mut period = ReportPeriod::annual(2024);
        period.month = Some(3);
        assert!(period.validate().is_err());

        let period = ReportPeriod {
            report_type: ReportType::Quarterly,
            year: 2024,
            month: None,
            quarter: None,
        };
        assert!(period.validate().is_err());
    }

    #[test]
    fn test_period_key_display() {
        let key = PeriodKey::new("hospital-1", ReportPeriod::quarterly(2024, 2));
        assert_eq!(key.to_string(), "hospital-1/quarterly/2024-Q2");
    }

    #[test]
    fn test_add_months_clamps() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(add_months(date, 1), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(add_months(date, 24), NaiveDate::from_ymd_opt(2026, 1, 31));
    }

    #[test]
    fn test_report_type_parse() {
        assert_eq!(ReportType::parse("Monthly"), Some(ReportType::Monthly));
        assert_eq!(ReportType::parse("weekly"), None);
    }
}
