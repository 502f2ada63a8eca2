//! Summary figures over a displayed transaction list.
//!
//! This only reads the list it is given. It never queries the repository, so it always agrees
//! with whatever the `QueryController` is showing.

use crate::model::{Amount, Category, Transaction, TransactionType};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// The total for one category within one transaction type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: Amount,
    /// Share of the type's turnover, 0 to 100.
    pub percent: f64,
}

/// Figures for the transactions of one type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeSummary {
    pub count: usize,
    /// Share of all transactions by count, 0 to 100.
    pub count_percent: f64,
    pub turnover: Amount,
    /// Share of the total turnover, 0 to 100.
    pub turnover_percent: f64,
    /// Categories with a non-zero total, in the order of `Category::ALL`.
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_count: usize,
    pub total_turnover: Amount,
    pub income: TypeSummary,
    pub expense: TypeSummary,
}

impl Summary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let total_count = transactions.len();
        let total_turnover: Decimal = transactions.iter().map(|t| t.amount().value()).sum();
        Self {
            total_count,
            total_turnover: Amount::new(total_turnover),
            income: TypeSummary::of(
                TransactionType::Income,
                transactions,
                total_count,
                total_turnover,
            ),
            expense: TypeSummary::of(
                TransactionType::Expense,
                transactions,
                total_count,
                total_turnover,
            ),
        }
    }

    /// Income turnover minus expense turnover. Negative when more went out than came in.
    pub fn net(&self) -> Amount {
        Amount::new(self.income.turnover.value() - self.expense.turnover.value())
    }
}

impl TypeSummary {
    fn of(
        kind: TransactionType,
        transactions: &[Transaction],
        total_count: usize,
        total_turnover: Decimal,
    ) -> Self {
        let of_kind: Vec<&Transaction> = transactions.iter().filter(|t| t.kind() == kind).collect();
        let turnover: Decimal = of_kind.iter().map(|t| t.amount().value()).sum();
        let categories = Category::ALL
            .iter()
            .filter_map(|&category| {
                let amount: Decimal = of_kind
                    .iter()
                    .filter(|t| t.category() == category)
                    .map(|t| t.amount().value())
                    .sum();
                (!amount.is_zero()).then(|| CategoryTotal {
                    category,
                    amount: Amount::new(amount),
                    percent: percent(amount, turnover),
                })
            })
            .collect();
        Self {
            count: of_kind.len(),
            count_percent: percent(Decimal::from(of_kind.len()), Decimal::from(total_count)),
            turnover: Amount::new(turnover),
            turnover_percent: percent(turnover, total_turnover),
            categories,
        }
    }
}

/// `part` as a percentage of `whole`, rounded to two places. Zero when `whole` is zero.
fn percent(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    (part * Decimal::ONE_HUNDRED / whole)
        .round_dp(2)
        .to_f64()
        .unwrap_or_default()
}
