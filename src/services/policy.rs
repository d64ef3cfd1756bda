//! Loan classification and fine computation.
//!
//! Everything here is a pure function of its arguments. Both list views and
//! the stats aggregator go through these functions, so a loan is classified
//! the same way wherever it is shown.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use validator::Validate;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::loan::LoanStatus,
    services::clock::days_between,
};

/// Open loans due within this many days are flagged as due soon
pub const DUE_SOON_DAYS: i64 = 5;

pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 14;

pub const DEFAULT_DAILY_FINE: i64 = 5000;

/// Classify a loan relative to `today`
pub fn classify(today: NaiveDate, due: NaiveDate, returned: Option<NaiveDate>) -> LoanStatus {
    if returned.is_some() {
        LoanStatus::Returned
    } else if due < today {
        LoanStatus::Overdue
    } else if days_between(today, due) <= DUE_SOON_DAYS {
        LoanStatus::DueSoon
    } else {
        LoanStatus::Active
    }
}

/// Fine for a loan due on `due`, evaluated on `effective`: full days late times `daily_rate`
pub fn fine(due: NaiveDate, effective: NaiveDate, daily_rate: Decimal) -> Decimal {
    if effective <= due {
        return Decimal::ZERO;
    }
    Decimal::from(days_between(due, effective)) * daily_rate
}

/// Circulation rules applied by the desk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanPolicy {
    pub loan_period_days: i64,
    pub daily_fine: Decimal,
    pub max_active_loans: Option<usize>,
}

impl LoanPolicy {
    /// Due date of a loan taken on `borrowed_on`; fails when the period leaves the calendar range
    pub fn due_date(&self, borrowed_on: NaiveDate) -> AppResult<NaiveDate> {
        Duration::try_days(self.loan_period_days)
            .and_then(|period| borrowed_on.checked_add_signed(period))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Loan period of {} days from {} is out of range",
                    self.loan_period_days, borrowed_on
                ))
            })
    }

    /// Fine at `effective` under this policy's rate
    pub fn fine(&self, due: NaiveDate, effective: NaiveDate) -> Decimal {
        fine(due, effective, self.daily_fine)
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
            daily_fine: Decimal::from(DEFAULT_DAILY_FINE),
            max_active_loans: None,
        }
    }
}

impl TryFrom<&CirculationConfig> for LoanPolicy {
    type Error = AppError;

    fn try_from(config: &CirculationConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            loan_period_days: config.loan_period_days,
            daily_fine: Decimal::from(config.daily_fine),
            max_active_loans: config.max_active_loans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_classify_is_pure() {
        let now = day(10);
        assert_eq!(classify(now, day(13), None), classify(now, day(13), None));
    }

    #[test]
    fn test_classify_due_soon() {
        assert_eq!(classify(day(10), day(13), None), LoanStatus::DueSoon);
    }

    #[test]
    fn test_classify_overdue() {
        assert_eq!(classify(day(10), day(9), None), LoanStatus::Overdue);
    }

    #[test]
    fn test_classify_returned_wins() {
        assert_eq!(classify(day(10), day(2), Some(day(9))), LoanStatus::Returned);
        assert_eq!(classify(day(10), day(30), Some(day(9))), LoanStatus::Returned);
    }

    #[test]
    fn test_classify_day_boundaries() {
        // due today is not late yet
        assert_eq!(classify(day(10), day(10), None), LoanStatus::DueSoon);
        assert_eq!(classify(day(10), day(15), None), LoanStatus::DueSoon);
        assert_eq!(classify(day(10), day(16), None), LoanStatus::Active);
        assert_eq!(classify(day(10), day(24), None), LoanStatus::Active);
    }

    #[test]
    fn test_fine() {
        let rate = Decimal::from(5000);
        assert_eq!(fine(day(0), day(3), rate), Decimal::from(15000));
        assert_eq!(fine(day(0), day(0), rate), Decimal::ZERO);
        assert_eq!(fine(day(5), day(2), rate), Decimal::ZERO);
    }

    #[test]
    fn test_policy_due_date() {
        let policy = LoanPolicy::default();
        assert_eq!(policy.due_date(day(0)), Ok(day(14)));
        assert_eq!(policy.fine(day(14), day(16)), Decimal::from(10000));
    }

    #[test]
    fn test_due_date_out_of_range() {
        let policy = LoanPolicy {
            loan_period_days: 200_000_000,
            ..LoanPolicy::default()
        };
        assert!(matches!(policy.due_date(day(0)), Err(AppError::Internal(_))));

        let policy = LoanPolicy {
            loan_period_days: i64::MAX,
            ..LoanPolicy::default()
        };
        assert!(policy.due_date(day(0)).is_err());
    }

    #[test]
    fn test_policy_from_config() {
        let policy = LoanPolicy::try_from(&CirculationConfig::default()).unwrap();
        assert_eq!(policy, LoanPolicy::default());

        let config = CirculationConfig {
            max_active_loans: Some(3),
            ..CirculationConfig::default()
        };
        assert_eq!(LoanPolicy::try_from(&config).unwrap().max_active_loans, Some(3));
    }

    #[test]
    fn test_policy_rejects_bad_config() {
        let bad = [
            CirculationConfig { daily_fine: -5000, ..CirculationConfig::default() },
            CirculationConfig { loan_period_days: 0, ..CirculationConfig::default() },
            CirculationConfig { loan_period_days: -1, ..CirculationConfig::default() },
            CirculationConfig { loan_period_days: 200_000_000, ..CirculationConfig::default() },
            CirculationConfig { max_active_loans: Some(0), ..CirculationConfig::default() },
        ];
        for config in bad {
            assert!(
                matches!(LoanPolicy::try_from(&config), Err(AppError::Validation(_))),
                "{:?} accepted",
                config
            );
        }
    }
}
