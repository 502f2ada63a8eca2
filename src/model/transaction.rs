use crate::error::Res;
use crate::model::date;
use crate::model::Amount;
use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a transaction brought money in or sent it out. The amount itself carries no sign.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// The closed set of categories agreed with the server.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Salary,
    Tip,
    Project,
    #[default]
    Food,
    Movie,
    Bills,
    Medical,
    Fee,
    Tax,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Salary,
        Category::Tip,
        Category::Project,
        Category::Food,
        Category::Movie,
        Category::Bills,
        Category::Medical,
        Category::Fee,
        Category::Tax,
    ];
}

/// A single transaction as stored on the server.
///
/// `id` is assigned by the server when the transaction is created and never changes. Every
/// transaction belongs to exactly one user.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    #[serde(rename = "userid", alias = "userId")]
    pub(crate) user_id: String,
    #[serde(with = "date::wire")]
    pub(crate) date: NaiveDate,
    pub(crate) amount: Amount,
    #[serde(rename = "type")]
    pub(crate) kind: TransactionType,
    pub(crate) category: Category,
    #[serde(default)]
    pub(crate) reference: String,
    #[serde(default)]
    pub(crate) description: String,
}

impl Transaction {
    /// Combines a server-assigned `id` and owner with the mutable `fields`.
    pub fn from_fields(id: impl Into<String>, user_id: impl Into<String>, fields: TransactionFields) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            date: fields.date,
            amount: fields.amount,
            kind: fields.kind,
            category: fields.category,
            reference: fields.reference,
            description: fields.description,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The editable part of the transaction.
    pub fn fields(&self) -> TransactionFields {
        TransactionFields {
            date: self.date,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            reference: self.reference.clone(),
            description: self.description.clone(),
        }
    }

    /// Replaces every editable field, leaving `id` and `user_id` untouched.
    pub(crate) fn apply(&mut self, fields: TransactionFields) {
        self.date = fields.date;
        self.amount = fields.amount;
        self.kind = fields.kind;
        self.category = fields.category;
        self.reference = fields.reference;
        self.description = fields.description;
    }
}

/// The fields of a transaction that a user supplies when creating or editing it, i.e. everything
/// except the server-assigned `id` and the owner.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionFields {
    #[serde(with = "date::wire")]
    pub date: NaiveDate,
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub description: String,
}

impl TransactionFields {
    /// Checks the invariants that the type system does not: amounts are unsigned.
    pub fn validate(&self) -> Res<()> {
        ensure!(
            !self.amount.is_negative(),
            "Amount must not be negative, use the transaction type to record an expense"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_server_record() {
        let json = r#"{
            "_id": "65a1f0c2",
            "userid": "user-1",
            "amount": 500,
            "type": "income",
            "category": "salary",
            "reference": "",
            "description": "January pay",
            "date": "2024-01-01T00:00:00.000Z",
            "createdAt": "2024-01-02T10:00:00.000Z",
            "__v": 0
        }"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.id(), "65a1f0c2");
        assert_eq!(t.user_id(), "user-1");
        assert_eq!(t.kind(), TransactionType::Income);
        assert_eq!(t.category(), Category::Salary);
        assert_eq!(t.amount(), Amount::from(500));
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_deserialize_missing_optional_text() {
        let json = r#"{"_id":"1","userId":"u","amount":"12.50","type":"expense",
            "category":"food","date":"2024-02-03"}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.reference(), "");
        assert_eq!(t.description(), "");
        assert_eq!(t.user_id(), "u");
    }

    #[test]
    fn test_deserialize_rejects_unknown_category() {
        let json = r#"{"_id":"1","userid":"u","amount":1,"type":"expense",
            "category":"yachts","date":"2024-02-03"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(Category::from_str("medical").unwrap(), Category::Medical);
        assert!(Category::from_str("Medical ").is_err());
        assert_eq!(Category::Fee.to_string(), "fee");
        assert_eq!(Category::ALL.len(), 9);
    }

    #[test]
    fn test_fields_serialize_for_wire() {
        let fields = TransactionFields {
            date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            amount: Amount::from(42),
            kind: TransactionType::Expense,
            category: Category::Bills,
            reference: "INV-9".to_string(),
            description: String::new(),
        };
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value["date"], "2024-05-06");
        assert_eq!(value["type"], "expense");
        assert_eq!(value["category"], "bills");
        assert_eq!(value["amount"], 42.0);
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut t = Transaction::from_fields(
            "id-1",
            "user-1",
            TransactionFields {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                amount: Amount::from(10),
                kind: TransactionType::Expense,
                category: Category::Food,
                reference: String::new(),
                description: String::new(),
            },
        );
        let mut fields = t.fields();
        fields.amount = Amount::from(99);
        fields.description = "dinner".to_string();
        t.apply(fields);
        assert_eq!(t.id(), "id-1");
        assert_eq!(t.user_id(), "user-1");
        assert_eq!(t.amount(), Amount::from(99));
        assert_eq!(t.description(), "dinner");
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        let mut fields = Transaction::from_fields(
            "id",
            "u",
            TransactionFields {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                amount: Amount::from(1),
                kind: TransactionType::Expense,
                category: Category::Food,
                reference: String::new(),
                description: String::new(),
            },
        )
        .fields();
        assert!(fields.validate().is_ok());
        fields.amount = Amount::from_str("-1").unwrap();
        assert!(fields.validate().is_err());
    }
}
