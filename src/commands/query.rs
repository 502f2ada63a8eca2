//! Read-only commands:
//! - `list`: show the transactions matching a filter
//! - `analytics`: summarize the transactions matching a filter

use crate::analytics::Summary;
use crate::api::Mode;
use crate::commands::{load, open_page, table, Out};
use crate::filter::FilterCriteria;
use crate::model::Transaction;
use crate::{Config, Result};

pub async fn list(
    config: Config,
    mode: Mode,
    criteria: FilterCriteria,
) -> Result<Out<Vec<Transaction>>> {
    let page = open_page(&config, mode).await?;
    let transactions = load(&page, criteria).await?;
    let count = transactions.len();
    let message = if count == 0 {
        "No transactions match the filter".to_string()
    } else {
        format!(
            "Found {} transaction{}\n\n{}",
            count,
            if count == 1 { "" } else { "s" },
            table(&transactions)
        )
    };
    Ok(Out::new(message, transactions))
}

pub async fn analytics(config: Config, mode: Mode, criteria: FilterCriteria) -> Result<Out<Summary>> {
    let page = open_page(&config, mode).await?;
    let transactions = load(&page, criteria).await?;
    let summary = Summary::from_transactions(&transactions);
    Ok(Out::new(describe(&summary), summary))
}

fn describe(s: &Summary) -> String {
    let mut lines = vec![
        format!("Total transactions: {}", s.total_count),
        format!(
            "Income: {} ({}%), turnover {} ({}%)",
            s.income.count,
            s.income.count_percent,
            s.income.turnover.to_currency(),
            s.income.turnover_percent
        ),
        format!(
            "Expense: {} ({}%), turnover {} ({}%)",
            s.expense.count,
            s.expense.count_percent,
            s.expense.turnover.to_currency(),
            s.expense.turnover_percent
        ),
        format!("Net: {}", s.net().to_currency()),
    ];
    for (label, part) in [("Income", &s.income), ("Expense", &s.expense)] {
        for c in &part.categories {
            lines.push(format!(
                "  {label} {}: {} ({}%)",
                c.category,
                c.amount.to_currency(),
                c.percent
            ));
        }
    }
    lines.join("\n")
}
