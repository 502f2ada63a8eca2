//! The edit command. It goes through the same steps a user does on the page: find the row, open
//! it in the form, change some inputs and submit.

use crate::api::Mode;
use crate::args::EditArgs;
use crate::commands::{load, open_page, Out};
use crate::filter::{FilterCriteria, Frequency, TypeFilter};
use crate::model::Transaction;
use crate::{Config, Error, ErrorType, Result};

/// Changes the fields of transaction `args.id()` that were given and returns the transaction as
/// listed after the change.
pub async fn edit(config: Config, mode: Mode, args: &EditArgs) -> Result<Out<Transaction>> {
    let page = open_page(&config, mode).await?;
    // Custom with no range is not restricted by date, so any of the user's records can be found.
    let everything = FilterCriteria::new(Frequency::Custom, TypeFilter::All);
    let record = load(&page, everything)
        .await?
        .into_iter()
        .find(|t| t.id() == args.id())
        .ok_or_else(|| {
            Error::msg(
                ErrorType::NotFound,
                format!("Transaction not found: {}", args.id()),
            )
        })?;

    page.edit_requested(record).await;
    let mut fields = page.form().view().await.fields;
    args.apply(&mut fields);
    page.form().set_fields(fields).await;
    page.form_submitted().await?;

    let updated = page
        .query()
        .transactions()
        .await
        .into_iter()
        .find(|t| t.id() == args.id())
        .ok_or_else(|| {
            Error::msg(
                ErrorType::NotFound,
                format!("Transaction {} was not listed after the update", args.id()),
            )
        })?;
    Ok(Out::new("Transaction Updated Successfully", updated))
}
