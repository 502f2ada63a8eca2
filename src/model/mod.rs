//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
pub(crate) mod date;
mod transaction;

pub use amount::{Amount, AmountError};
pub use date::{format_date, parse_date, DATE_FORMAT};
pub use transaction::{Category, Transaction, TransactionFields, TransactionType};
