//! The user's filter selection and the canonical list query it produces.
//!
//! `FilterCriteria` is an immutable snapshot: every setter returns a new value, and a new value is
//! the only thing that triggers a fresh list query. `ListQuery` is what actually goes to the
//! server; it is derived from the criteria so that a stale custom range can never leak into a
//! preset query.

use crate::model::{format_date, parse_date, Transaction, TransactionType};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A named relative date window, or `Custom` for an explicit range.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    #[serde(rename = "7")]
    LastWeek,
    #[serde(rename = "30")]
    LastMonth,
    #[serde(rename = "365")]
    LastYear,
    #[serde(rename = "custom")]
    Custom,
}

serde_plain::derive_display_from_serialize!(Frequency);
serde_plain::derive_fromstr_from_deserialize!(Frequency);

impl Frequency {
    /// The number of days covered by a preset, `None` for `Custom`.
    pub fn days(&self) -> Option<u64> {
        match self {
            Frequency::LastWeek => Some(7),
            Frequency::LastMonth => Some(30),
            Frequency::LastYear => Some(365),
            Frequency::Custom => None,
        }
    }
}

/// Which transaction types to show.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TypeFilter);
serde_plain::derive_fromstr_from_deserialize!(TypeFilter);

impl TypeFilter {
    pub fn matches(&self, kind: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => kind == TransactionType::Income,
            TypeFilter::Expense => kind == TransactionType::Expense,
        }
    }
}

/// An inclusive, two-sided range of calendar dates. The ends are stored in order regardless of
/// the order they were picked in.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", format_date(self.start), format_date(self.end))
    }
}

/// The dates a query covers. Either bound may be open.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.from, self.to) {
            (None, None) => true,
            (Some(s), None) => date >= s,
            (None, Some(e)) => date <= e,
            (Some(s), Some(e)) => date >= s && date <= e,
        }
    }
}

/// An immutable snapshot of the user's filter selection.
///
/// The default is the last seven days with all transaction types, matching what the page shows
/// when it first loads.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct FilterCriteria {
    frequency: Frequency,
    custom_range: Option<DateRange>,
    type_filter: TypeFilter,
}

impl FilterCriteria {
    pub fn new(frequency: Frequency, type_filter: TypeFilter) -> Self {
        Self {
            frequency,
            custom_range: None,
            type_filter,
        }
    }

    /// Returns a snapshot with `frequency` selected. A previously chosen custom range is kept so
    /// that switching back to `Custom` restores it, but it is ignored by presets.
    #[must_use]
    pub fn set_frequency(&self, frequency: Frequency) -> Self {
        Self {
            frequency,
            ..self.clone()
        }
    }

    /// Returns a snapshot with the custom range set to `start..=end`.
    #[must_use]
    pub fn set_custom_range(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            custom_range: Some(DateRange::new(start, end)),
            ..self.clone()
        }
    }

    /// Returns a snapshot with `type_filter` selected.
    #[must_use]
    pub fn set_type(&self, type_filter: TypeFilter) -> Self {
        Self {
            type_filter,
            ..self.clone()
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// The custom range as last picked, which may be stale if a preset is selected.
    pub fn custom_range(&self) -> Option<DateRange> {
        self.custom_range
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    /// The custom range if, and only if, it applies to the query.
    pub fn effective_range(&self) -> Option<DateRange> {
        match self.frequency {
            Frequency::Custom => self.custom_range,
            _ => None,
        }
    }

    /// Builds the canonical list query for `user_id`.
    pub fn to_query(&self, user_id: impl Into<String>) -> ListQuery {
        ListQuery {
            user_id: user_id.into(),
            frequency: self.frequency,
            range: self.effective_range(),
            type_filter: self.type_filter,
        }
    }
}

/// The request body of a list call. On the wire it looks like this:
///
/// ```json
/// { "userid": "65a1...", "frequency": "custom", "selectedDate": ["2024-01-01", "2024-01-31"], "type": "all" }
/// ```
///
/// `selectedDate` is empty unless `frequency` is `custom` and a range has been chosen.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(into = "WireQuery", try_from = "WireQuery")]
pub struct ListQuery {
    user_id: String,
    frequency: Frequency,
    range: Option<DateRange>,
    type_filter: TypeFilter,
}

impl ListQuery {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn range(&self) -> Option<DateRange> {
        self.range
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    /// Resolves the query's dates relative to `today`.
    ///
    /// A preset of N days covers the N calendar days ending today and has no upper bound, so
    /// transactions entered with a future date stay visible. `Custom` covers the chosen range
    /// inclusively; with no range chosen it is not restricted by date at all.
    pub fn window(&self, today: NaiveDate) -> DateWindow {
        match (self.frequency.days(), self.range) {
            (Some(days), _) => DateWindow {
                from: today.checked_sub_days(Days::new(days.saturating_sub(1))),
                to: None,
            },
            (None, Some(range)) => DateWindow {
                from: Some(range.start()),
                to: Some(range.end()),
            },
            (None, None) => DateWindow::default(),
        }
    }

    /// Whether `transaction` belongs in the result of this query.
    pub fn matches(&self, transaction: &Transaction, today: NaiveDate) -> bool {
        transaction.user_id() == self.user_id
            && self.type_filter.matches(transaction.kind())
            && self.window(today).contains(transaction.date())
    }
}

#[derive(Serialize, Deserialize)]
struct WireQuery {
    userid: String,
    frequency: Frequency,
    #[serde(rename = "selectedDate", default)]
    selected_date: Vec<String>,
    #[serde(rename = "type")]
    type_filter: TypeFilter,
}

impl From<ListQuery> for WireQuery {
    fn from(q: ListQuery) -> Self {
        let selected_date = q
            .range
            .map(|r| vec![format_date(r.start()), format_date(r.end())])
            .unwrap_or_default();
        Self {
            userid: q.user_id,
            frequency: q.frequency,
            selected_date,
            type_filter: q.type_filter,
        }
    }
}

impl TryFrom<WireQuery> for ListQuery {
    type Error = String;

    fn try_from(w: WireQuery) -> Result<Self, Self::Error> {
        let range = match w.selected_date.as_slice() {
            [] => None,
            [start, end] => Some(DateRange::new(
                parse_date(start).map_err(|e| e.to_string())?,
                parse_date(end).map_err(|e| e.to_string())?,
            )),
            other => {
                return Err(format!(
                    "selectedDate must hold zero or two dates, found {}",
                    other.len()
                ))
            }
        };
        Ok(Self {
            user_id: w.userid,
            frequency: w.frequency,
            range: if w.frequency == Frequency::Custom {
                range
            } else {
                None
            },
            type_filter: w.type_filter,
        })
    }
}
