use crate::api::Mode;
use crate::commands::{open_page, Out};
use crate::{Config, Result};

/// Deletes transaction `id`. Fails with `NotFound` if it does not exist or belongs to someone
/// else.
pub async fn delete(config: Config, mode: Mode, id: &str) -> Result<Out<String>> {
    let page = open_page(&config, mode).await?;
    page.delete_requested(id).await?;
    Ok(Out::new(format!("Transaction Deleted: {id}"), id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_delete() {
        let env = TestEnv::new().await;
        let out = delete(env.config(), Mode::Test, "seed003").await.unwrap();
        assert_eq!(out.structure().unwrap(), "seed003");
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let env = TestEnv::new().await;
        let err = delete(env.config(), Mode::Test, "missing")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorType::NotFound);
    }
}
