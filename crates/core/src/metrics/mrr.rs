//! Monthly MRR bridge: running MRR and subscriber totals per month.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::{Money, MoneyError};

use super::ratios;
use crate::period::ReportingPeriod;

/// Kind of MRR movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// A first subscription.
    New,
    /// An upgrade of an existing subscription.
    Expansion,
    /// A downgrade (negative amount).
    Contraction,
    /// A cancellation (negative amount).
    Lost,
    /// A returning customer.
    Reactivation,
}

impl MovementKind {
    /// Every kind, in bridge order.
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Expansion,
        Self::Reactivation,
        Self::Contraction,
        Self::Lost,
    ];

    /// Accumulator / storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Expansion => "expansion",
            Self::Contraction => "contraction",
            Self::Lost => "lost",
            Self::Reactivation => "reactivation",
        }
    }

    /// Counter bumped once per customer for this kind, if any.
    #[must_use]
    pub const fn customer_counter(self) -> Option<&'static str> {
        match self {
            Self::New => Some(NEW_CUSTOMERS),
            Self::Lost => Some(LOST_CUSTOMERS),
            Self::Reactivation => Some(REACTIVATED_CUSTOMERS),
            Self::Expansion | Self::Contraction => None,
        }
    }
}

impl std::str::FromStr for MovementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "expansion" => Ok(Self::Expansion),
            "contraction" => Ok(Self::Contraction),
            "lost" => Ok(Self::Lost),
            "reactivation" => Ok(Self::Reactivation),
            _ => Err(format!("Unknown MRR movement: {s}")),
        }
    }
}

/// Counter of newly acquired customers.
pub const NEW_CUSTOMERS: &str = "new_customers";
/// Counter of lost customers.
pub const LOST_CUSTOMERS: &str = "lost_customers";
/// Counter of reactivated customers.
pub const REACTIVATED_CUSTOMERS: &str = "reactivated_customers";

/// MRR and customer count just before the first month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrrSnapshot {
    /// Monthly recurring revenue.
    pub mrr: Money,
    /// Active customers.
    pub customers: i64,
}

/// One month of the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrrMonth {
    /// Month label.
    pub label: String,
    /// MRR at the end of the previous month.
    pub previous_mrr: Money,
    /// New business MRR.
    pub new: Money,
    /// Expansion MRR.
    pub expansion: Money,
    /// Reactivation MRR.
    pub reactivation: Money,
    /// Contraction MRR (negative).
    pub contraction: Money,
    /// Lost MRR (negative).
    pub lost: Money,
    /// MRR at the end of this month.
    pub mrr: Money,
    /// Customers at the end of the previous month.
    pub previous_customers: i64,
    /// Customers acquired.
    pub new_customers: i64,
    /// Customers reactivated.
    pub reactivated_customers: i64,
    /// Customers lost.
    pub lost_customers: i64,
    /// Customers at the end of this month.
    pub customers: i64,
}

impl MrrMonth {
    /// Lost minus reactivated customers.
    #[must_use]
    pub const fn net_lost_customers(&self) -> i64 {
        self.lost_customers - self.reactivated_customers
    }

    /// Net customer change.
    #[must_use]
    pub const fn net_change(&self) -> i64 {
        self.customers - self.previous_customers
    }

    /// User churn ratio.
    #[must_use]
    pub fn user_churn(&self) -> Decimal {
        ratios::user_churn(self.net_lost_customers(), self.previous_customers)
    }

    /// Revenue churn ratio.
    #[must_use]
    pub fn revenue_churn(&self) -> Decimal {
        ratios::revenue_churn(self.lost.to_decimal(), self.previous_mrr.to_decimal())
    }

    /// Average revenue per user, in major units.
    #[must_use]
    pub fn arpu(&self) -> Decimal {
        ratios::arpu(self.mrr.to_decimal(), self.customers)
    }

    /// Customer lifetime value, in major units.
    #[must_use]
    pub fn lifetime_value(&self) -> Decimal {
        ratios::lifetime_value(self.arpu(), self.user_churn())
    }

    /// Net revenue retention percentage.
    #[must_use]
    pub fn net_revenue_retention(&self) -> Decimal {
        ratios::net_revenue_retention(
            self.previous_mrr.to_decimal(),
            self.expansion.to_decimal(),
            self.reactivation.to_decimal(),
            self.contraction.to_decimal(),
            self.lost.to_decimal(),
        )
    }
}

/// Month-by-month MRR bridge, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrrBridge {
    months: Vec<MrrMonth>,
}

impl MrrBridge {
    /// Carries the opening snapshot forward through classified monthly periods.
    ///
    /// Periods must be in chronological order; running totals depend on it.
    pub fn build(opening: MrrSnapshot, periods: &[ReportingPeriod]) -> Result<Self, MoneyError> {
        let mut months = Vec::with_capacity(periods.len());
        let mut previous_mrr = opening.mrr;
        let mut previous_customers = opening.customers;

        for period in periods {
            let amounts: Vec<Money> = MovementKind::ALL
                .iter()
                .map(|kind| period.amount(kind.as_str()))
                .collect();
            let mrr = amounts
                .iter()
                .try_fold(previous_mrr, |total, amount| total.add(amount))?;

            let new_customers = period.count(NEW_CUSTOMERS);
            let reactivated_customers = period.count(REACTIVATED_CUSTOMERS);
            let lost_customers = period.count(LOST_CUSTOMERS);
            let customers =
                previous_customers + new_customers + reactivated_customers - lost_customers;

            months.push(MrrMonth {
                label: period.label.clone(),
                previous_mrr,
                new: period.amount(MovementKind::New.as_str()),
                expansion: period.amount(MovementKind::Expansion.as_str()),
                reactivation: period.amount(MovementKind::Reactivation.as_str()),
                contraction: period.amount(MovementKind::Contraction.as_str()),
                lost: period.amount(MovementKind::Lost.as_str()),
                mrr,
                previous_customers,
                new_customers,
                reactivated_customers,
                lost_customers,
                customers,
            });

            previous_mrr = mrr;
            previous_customers = customers;
        }

        Ok(Self { months })
    }

    /// Months, oldest first.
    #[must_use]
    pub fn months(&self) -> &[MrrMonth] {
        &self.months
    }

    /// Months, newest first (display order).
    pub fn newest_first(&self) -> impl Iterator<Item = &MrrMonth> {
        self.months.iter().rev()
    }
}
