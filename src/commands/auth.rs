//! Login and logout. There is no password exchange here: the server trusts the user id it is sent,
//! so logging in just records which user the other commands act for.

use crate::args::LoginArgs;
use crate::commands::Out;
use crate::session::Session;
use crate::{Config, Error, ErrorType, Result};

pub async fn login(config: &Config, args: &LoginArgs) -> Result<Out<Session>> {
    let session = Session::new(args.user_id().trim()).with_profile(
        args.name().unwrap_or_default(),
        args.email().unwrap_or_default(),
    );
    if session.user_id().is_empty() {
        return Err(Error::msg(
            ErrorType::Validation,
            "The user id must not be empty",
        ));
    }
    session.save(&config.session_path()).await?;
    let who = if session.name().is_empty() {
        session.user_id().to_string()
    } else {
        format!("{} ({})", session.name(), session.user_id())
    };
    Ok(Out::new(format!("Logged in as {who}"), session))
}

pub async fn logout(config: &Config) -> Result<Out<()>> {
    if Session::clear(&config.session_path()).await? {
        Ok("Logged out".into())
    } else {
        Ok("Nobody was logged in".into())
    }
}
