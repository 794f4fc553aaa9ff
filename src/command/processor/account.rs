use anyhow::Context;
use lazy_static::lazy_static;
use tracing::info;

use crate::auth::authorization_url;
use crate::command::Command;
use crate::reply::{Card, CardHeader, CardWithId, ImageStyle, Reply, Section, Widget};

use super::card::HEADER_IMAGE;
use super::{CommandContext, CommandProcessor};

/// `login`/`profile` and `logout` against the credential store.
pub struct AccountCommandProcessor {}

lazy_static! {
    static ref INSTANCE: AccountCommandProcessor = AccountCommandProcessor {};
}

impl AccountCommandProcessor {
    pub fn static_new() -> &'static Self {
        &INSTANCE
    }

    fn profile(&self, context: &CommandContext) -> anyhow::Result<Reply> {
        let user = context.user().context("event carries no user")?;
        let Some(credentials) = context.credentials.get_credentials(&user.name) else {
            info!(user = %user.name, "[Account]Requesting credentials");
            let url = authorization_url(context.auth, &user.name)?;
            return Ok(Reply::request_config(url));
        };
        info!(user = %user.name, "[Account]Found stored credentials");
        let mut widgets = Vec::new();
        if let Some(email) = &user.email {
            widgets.push(Widget::KeyValue {
                top_label: None,
                content: email.clone(),
                bottom_label: None,
                icon: Some("EMAIL".to_string()),
            });
        }
        for scope in &credentials.scopes {
            widgets.push(Widget::KeyValue {
                top_label: Some("Granted scope".to_string()),
                content: scope.clone(),
                bottom_label: None,
                icon: None,
            });
        }
        let header = CardHeader::titled(user.display_name.clone())
            .with_subtitle("Signed in")
            .with_image(HEADER_IMAGE, ImageStyle::Avatar);
        let card = Card::new(header).with_section(Section::new(widgets).with_header("Account"));
        Ok(Reply::cards_v2(vec![CardWithId::new("profile", card)]))
    }

    fn logout(&self, context: &CommandContext) -> anyhow::Result<Reply> {
        let user = context.user().context("event carries no user")?;
        if context.credentials.delete_credentials(&user.name) {
            info!(user = %user.name, "[Account]Logged out");
        }
        Ok(Reply::text("Logged out."))
    }
}

impl CommandProcessor for AccountCommandProcessor {
    fn process(
        &'static self,
        context: &CommandContext,
        command: &Command,
    ) -> anyhow::Result<Reply> {
        if command.name == "logout" {
            self.logout(context)
        } else {
            self.profile(context)
        }
    }

    fn matches(&'static self, command: &Command) -> bool {
        command.is_text_command(&["login", "profile", "logout"])
    }

    fn usage(&'static self) -> Option<&'static str> {
        Some("`profile` / `logout`: sign in to see your profile, or forget your credentials")
    }
}
