//! The add/edit form.
//!
//! The form is either creating a new transaction or editing an existing one, and the edited
//! record travels with the mode so a stale id can never be submitted from create mode. Field
//! values are kept as the user typed them and are only turned into typed `TransactionFields` when
//! the form is submitted.

use crate::controller::MutationCoordinator;
use crate::error::{Error, ErrorType, Result};
use crate::model::{
    format_date, parse_date, Amount, Category, Transaction, TransactionFields, TransactionType,
};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub enum FormMode {
    #[default]
    Create,
    Edit(Transaction),
}

impl FormMode {
    pub fn title(&self) -> &'static str {
        match self {
            FormMode::Create => "Add Transaction",
            FormMode::Edit(_) => "Edit Transaction",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Amount,
    Type,
    Category,
    Date,
    Reference,
    Description,
}

serde_plain::derive_display_from_serialize!(Field);

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// The raw values of the form's inputs.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct FormFields {
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub date: String,
    pub reference: String,
    pub description: String,
}

impl FormFields {
    /// Prefills the inputs from `transaction`. The date is shown as `YYYY-MM-DD`.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            amount: transaction.amount().to_string(),
            kind: transaction.kind().to_string(),
            category: transaction.category().to_string(),
            date: format_date(transaction.date()),
            reference: transaction.reference().to_string(),
            description: transaction.description().to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Amount => &self.amount,
            Field::Type => &self.kind,
            Field::Category => &self.category,
            Field::Date => &self.date,
            Field::Reference => &self.reference,
            Field::Description => &self.description,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Amount => self.amount = value,
            Field::Type => self.kind = value,
            Field::Category => self.category = value,
            Field::Date => self.date = value,
            Field::Reference => self.reference = value,
            Field::Description => self.description = value,
        }
    }

    /// Checks every input and either returns the typed fields or one error per bad input.
    pub fn validate(&self) -> std::result::Result<TransactionFields, Vec<FieldError>> {
        let mut errors = Vec::new();

        let amount = match self.amount.trim() {
            "" => Err(FieldError::new(Field::Amount, "Please add an amount")),
            s => match Amount::from_str(s) {
                Ok(a) if a.is_negative() => Err(FieldError::new(
                    Field::Amount,
                    "Amount must not be negative",
                )),
                Ok(a) => Ok(a),
                Err(_) => Err(FieldError::new(Field::Amount, "Amount must be a number")),
            },
        };
        let kind = match self.kind.trim() {
            "" => Err(FieldError::new(Field::Type, "Please select a type")),
            s => TransactionType::from_str(s)
                .map_err(|_| FieldError::new(Field::Type, "Type must be income or expense")),
        };
        let category = match self.category.trim() {
            "" => Err(FieldError::new(Field::Category, "Please select a category")),
            s => Category::from_str(s).map_err(|_| {
                let names: Vec<String> = Category::ALL.iter().map(|c| c.to_string()).collect();
                FieldError::new(
                    Field::Category,
                    format!("Category must be one of {}", names.join(", ")),
                )
            }),
        };
        let date = match self.date.trim() {
            "" => Err(FieldError::new(Field::Date, "Please select a date")),
            s => parse_date(s)
                .map_err(|_| FieldError::new(Field::Date, "Date must look like YYYY-MM-DD")),
        };

        let amount = amount.map_err(|e| errors.push(e));
        let kind = kind.map_err(|e| errors.push(e));
        let category = category.map_err(|e| errors.push(e));
        let date = date.map_err(|e| errors.push(e));

        match (amount, kind, category, date) {
            (Ok(amount), Ok(kind), Ok(category), Ok(date)) => Ok(TransactionFields {
                date,
                amount,
                kind,
                category,
                reference: self.reference.trim().to_string(),
                description: self.description.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// What a successful submit did.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Submitted {
    /// The new transaction, when the server sent it back.
    Created(Option<Transaction>),
    Updated(String),
}

/// A snapshot of the form for display.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FormView {
    pub open: bool,
    pub mode: FormMode,
    pub title: &'static str,
    pub fields: FormFields,
    pub validation_errors: Vec<FieldError>,
}

#[derive(Debug, Default)]
struct FormState {
    open: bool,
    mode: FormMode,
    fields: FormFields,
    errors: Vec<FieldError>,
    /// Bumped every time the form is opened, cancelled or reset.
    generation: u64,
}

impl FormState {
    fn replace(&mut self, open: bool, mode: FormMode, fields: FormFields) {
        *self = FormState {
            open,
            mode,
            fields,
            errors: Vec::new(),
            generation: self.generation.wrapping_add(1),
        };
    }
}

pub struct FormController {
    mutations: Arc<MutationCoordinator>,
    state: Mutex<FormState>,
}

impl FormController {
    pub fn new(mutations: Arc<MutationCoordinator>) -> Self {
        Self {
            mutations,
            state: Mutex::new(FormState::default()),
        }
    }

    /// Opens an empty form for a new transaction.
    pub async fn open_create(&self) {
        self.state
            .lock()
            .await
            .replace(true, FormMode::Create, FormFields::default());
    }

    /// Opens the form prefilled with `record`.
    pub async fn open_edit(&self, record: Transaction) {
        debug!("Editing transaction {}", record.id());
        let fields = FormFields::from_transaction(&record);
        self.state
            .lock()
            .await
            .replace(true, FormMode::Edit(record), fields);
    }

    /// Closes the form and forgets the edited record and any input.
    pub async fn cancel(&self) {
        self.state
            .lock()
            .await
            .replace(false, FormMode::Create, FormFields::default());
    }

    pub async fn set_field(&self, field: Field, value: impl Into<String>) {
        self.state.lock().await.fields.set(field, value);
    }

    pub async fn set_fields(&self, fields: FormFields) {
        self.state.lock().await.fields = fields;
    }

    pub async fn mode(&self) -> FormMode {
        self.state.lock().await.mode.clone()
    }

    pub async fn view(&self) -> FormView {
        let state = self.state.lock().await;
        FormView {
            open: state.open,
            mode: state.mode.clone(),
            title: state.mode.title(),
            fields: state.fields.clone(),
            validation_errors: state.errors.clone(),
        }
    }

    /// Validates the inputs and sends a create or an update depending on the mode. Invalid input
    /// never reaches the repository; the errors are kept on the form instead.
    ///
    /// On success the form closes and returns to an empty create form. On failure it stays open
    /// with the user's input so they can retry.
    pub async fn submit(&self) -> Result<Submitted> {
        let (generation, mode, typed) = {
            let mut state = self.state.lock().await;
            match state.fields.validate() {
                Ok(typed) => {
                    state.errors.clear();
                    (state.generation, state.mode.clone(), typed)
                }
                Err(errors) => {
                    let message = errors
                        .iter()
                        .map(|e| format!("{}: {}", e.field, e.message))
                        .collect::<Vec<_>>()
                        .join("; ");
                    state.errors = errors;
                    return Err(Error::msg(ErrorType::Validation, message));
                }
            }
        };

        let submitted = match &mode {
            FormMode::Create => Submitted::Created(self.mutations.create(typed).await?),
            FormMode::Edit(record) => {
                self.mutations.update(record.id(), typed).await?;
                Submitted::Updated(record.id().to_string())
            }
        };

        let mut state = self.state.lock().await;
        // The form may have been cancelled or reopened while this was in flight.
        if state.generation == generation {
            state.replace(false, FormMode::Create, FormFields::default());
        } else {
            debug!("The form changed while it was being submitted, keeping the new input");
        }
        Ok(submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Op, TransactionRepository};
    use crate::controller::{Notifier, QueryController};
    use crate::session::Session;
    use crate::test::{fixture_repository, fixture_today, GatedRepository};

    async fn form(repo: Arc<dyn TransactionRepository>) -> (FormController, Arc<QueryController>) {
        let notifier = Notifier::new();
        let session = Session::new("u1");
        let query = Arc::new(QueryController::new(
            repo.clone(),
            session.clone(),
            notifier.clone(),
        ));
        let mutations = Arc::new(MutationCoordinator::new(repo, session, query.clone(), notifier));
        (FormController::new(mutations), query)
    }

    fn filled() -> FormFields {
        FormFields {
            amount: "$1,250.50".to_string(),
            kind: "income".to_string(),
            category: "project".to_string(),
            date: format_date(fixture_today()),
            reference: " INV-7 ".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_validate_collects_every_error() {
        let fields = FormFields {
            amount: "-3".to_string(),
            kind: "gift".to_string(),
            category: String::new(),
            date: "tomorrow".to_string(),
            ..FormFields::default()
        };
        let errors = fields.validate().unwrap_err();
        let bad: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(bad, vec![Field::Amount, Field::Type, Field::Category, Field::Date]);
        assert_eq!(errors[0].message, "Amount must not be negative");
    }

    #[test]
    fn test_validate_produces_typed_fields() {
        let typed = filled().validate().unwrap();
        assert_eq!(typed.amount, Amount::from_str("1250.50").unwrap());
        assert_eq!(typed.kind, TransactionType::Income);
        assert_eq!(typed.category, Category::Project);
        assert_eq!(typed.reference, "INV-7");
    }

    #[test]
    fn test_validate_accepts_exponent_amount() {
        let fields = FormFields {
            amount: "1.5e3".to_string(),
            ..filled()
        };
        assert_eq!(fields.validate().unwrap().amount, Amount::from(1500));
    }

    #[tokio::test]
    async fn test_open_edit_prefills_and_titles() {
        let repo = fixture_repository().await;
        let record = repo
            .all()
            .await
            .into_iter()
            .find(|t| t.id() == "salary")
            .unwrap();
        let (form, _) = form(repo).await;
        form.open_edit(record.clone()).await;
        let view = form.view().await;
        assert!(view.open);
        assert_eq!(view.title, "Edit Transaction");
        assert_eq!(view.fields.date, format_date(record.date()));
        assert_eq!(view.fields.kind, "income");
        assert_eq!(view.mode, FormMode::Edit(record));
    }

    #[tokio::test]
    async fn test_cancel_then_create_is_empty() {
        let repo = fixture_repository().await;
        let record = repo.all().await.remove(0);
        let (form, _) = form(repo.clone()).await;
        form.open_edit(record).await;
        form.set_field(Field::Description, "changed").await;
        form.cancel().await;
        assert!(!form.view().await.open);

        form.open_create().await;
        let view = form.view().await;
        assert_eq!(view.mode, FormMode::Create);
        assert_eq!(view.title, "Add Transaction");
        assert_eq!(view.fields, FormFields::default());

        form.set_fields(filled()).await;
        let Submitted::Created(Some(created)) = form.submit().await.unwrap() else {
            panic!("expected a create");
        };
        assert_eq!(repo.calls(Op::Update).await, 0);
        assert_eq!(repo.calls(Op::Create).await, 1);
        assert_ne!(created.id(), "salary");
    }

    #[tokio::test]
    async fn test_invalid_submit_never_reaches_repository() {
        let repo = fixture_repository().await;
        let (form, _) = form(repo.clone()).await;
        form.open_create().await;
        form.set_field(Field::Amount, "abc").await;
        let err = form.submit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::Validation);
        assert_eq!(repo.calls(Op::Create).await, 0);
        let view = form.view().await;
        assert!(view.open);
        assert!(!view.validation_errors.is_empty());
    }

    #[tokio::test]
    async fn test_edit_submit_updates_and_closes() {
        let repo = fixture_repository().await;
        let record = repo
            .all()
            .await
            .into_iter()
            .find(|t| t.id() == "groceries")
            .unwrap();
        let (form, query) = form(repo.clone()).await;
        form.open_edit(record).await;
        form.set_field(Field::Amount, "60").await;
        let submitted = form.submit().await.unwrap();
        assert_eq!(submitted, Submitted::Updated("groceries".to_string()));

        let view = form.view().await;
        assert!(!view.open);
        assert_eq!(view.mode, FormMode::Create);
        let shown = query.transactions().await;
        let updated = shown.iter().find(|t| t.id() == "groceries").unwrap();
        assert_eq!(updated.amount(), Amount::from(60));
    }

    #[tokio::test]
    async fn test_late_create_keeps_a_reopened_form() {
        let memory = fixture_repository().await;
        let gated = Arc::new(GatedRepository::new(memory.clone()));
        let (form, _) = form(gated.clone()).await;
        let form = Arc::new(form);
        form.open_create().await;
        form.set_fields(filled()).await;

        let gate = gated.close().await;
        let first = {
            let form = form.clone();
            tokio::spawn(async move { form.submit().await })
        };
        gated.wait_for_waiters(1).await;
        form.cancel().await;
        form.open_create().await;
        form.set_field(Field::Description, "Second entry").await;

        gate.open();
        let submitted = first.await.unwrap().unwrap();
        assert!(matches!(submitted, Submitted::Created(Some(_))));
        assert_eq!(memory.calls(Op::Create).await, 1);
        let view = form.view().await;
        assert!(view.open);
        assert_eq!(view.mode, FormMode::Create);
        assert_eq!(view.fields.description, "Second entry");
    }

    #[tokio::test]
    async fn test_late_update_keeps_the_same_record_reopened() {
        let memory = fixture_repository().await;
        let record = memory
            .all()
            .await
            .into_iter()
            .find(|t| t.id() == "groceries")
            .unwrap();
        let gated = Arc::new(GatedRepository::new(memory.clone()));
        let (form, _) = form(gated.clone()).await;
        let form = Arc::new(form);
        form.open_edit(record.clone()).await;
        form.set_field(Field::Amount, "60").await;

        let gate = gated.close().await;
        let first = {
            let form = form.clone();
            tokio::spawn(async move { form.submit().await })
        };
        gated.wait_for_waiters(1).await;
        form.cancel().await;
        form.open_edit(record.clone()).await;
        form.set_field(Field::Description, "Weekly shop").await;

        gate.open();
        first.await.unwrap().unwrap();
        let view = form.view().await;
        assert!(view.open);
        assert_eq!(view.mode, FormMode::Edit(record));
        assert_eq!(view.fields.description, "Weekly shop");
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_input() {
        let repo = fixture_repository().await;
        repo.fail_next(Op::Create, ErrorType::Network).await;
        let (form, _) = form(repo).await;
        form.open_create().await;
        form.set_fields(filled()).await;
        let err = form.submit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::Network);
        let view = form.view().await;
        assert!(view.open);
        assert_eq!(view.fields, filled());
    }
}
