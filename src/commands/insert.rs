use crate::api::Mode;
use crate::commands::{open_page, Out};
use crate::controller::{FormFields, Submitted};
use crate::model::Transaction;
use crate::{Config, Error, ErrorType, Result};

/// Adds a transaction through the create form.
///
/// The inputs are validated by the form before anything is sent. On success the transaction is
/// returned as the server stored it, including its new id, if the server sent it back.
pub async fn add(config: Config, mode: Mode, fields: FormFields) -> Result<Out<Transaction>> {
    let page = open_page(&config, mode).await?;
    page.form().open_create().await;
    page.form().set_fields(fields).await;
    match page.form_submitted().await? {
        Submitted::Created(Some(transaction)) => Ok(Out::new(
            format!("Transaction Added Successfully with id {}", transaction.id()),
            transaction,
        )),
        Submitted::Created(None) => Ok(Out::new_message("Transaction Added Successfully")),
        Submitted::Updated(id) => Err(Error::msg(
            ErrorType::Validation,
            format!("Expected a new transaction but transaction {id} was updated"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::AddArgs;
    use crate::model::{Amount, Category};
    use crate::test::TestEnv;
    use chrono::Local;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_add() {
        let env = TestEnv::new().await;
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        let args = AddArgs::new("$1,200.00", "income", "project", today);
        let out = add(env.config(), Mode::Test, args.form_fields())
            .await
            .unwrap();
        let created = out.structure().unwrap();
        assert_eq!(created.amount(), Amount::from_str("1200").unwrap());
        assert_eq!(created.category(), Category::Project);
        assert_eq!(created.user_id(), "u1");
    }

    #[tokio::test]
    async fn test_add_invalid() {
        let env = TestEnv::new().await;
        let args = AddArgs::new("-5", "gift", "food", "2024-01-01");
        let err = add(env.config(), Mode::Test, args.form_fields())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorType::Validation);
        assert!(err.to_string().contains("amount"));
    }
}
