use anyhow::Context;
use lazy_static::lazy_static;
use uuid::Uuid;

use crate::command::Command;
use crate::reply::{ActionResponseType, Button, Card, CardHeader, OnClick, Reply, Section, Widget};

use super::{CommandContext, CommandProcessor};

pub const UPVOTE_ACTION: &str = "upvote";
pub const NEW_VOTE_ACTION: &str = "newvote";
const DEFAULT_STATEMENT: &str = "I like voting";
const NOBODY: &str = "nobody";
const IMAGES: [&str; 4] = [
    "https://media2.giphy.com/media/3oEjHK3aw2LcB1V3QQ/giphy.gif",
    "https://media3.giphy.com/media/l0HlUIHlH4AKadXzy/giphy.gif",
    "https://media0.giphy.com/media/3otPorfb8Lu7wjKllm/giphy.gif",
    "https://media3.giphy.com/media/xT9IgFLBcm3Wi6l6qA/giphy.gif",
];

/// A vote card whose state lives entirely in its button parameters.
///
/// `vote <statement>` and the `newvote` button post a fresh card, `upvote`
/// rewrites the clicked card with the count bumped.
pub struct VoteCommandProcessor {}

lazy_static! {
    static ref INSTANCE: VoteCommandProcessor = VoteCommandProcessor {};
}

struct Vote<'a> {
    id: String,
    statement: &'a str,
    voter: &'a str,
    count: u64,
}

impl VoteCommandProcessor {
    pub fn static_new() -> &'static Self {
        &INSTANCE
    }

    fn upvote(&self, context: &CommandContext, command: &Command) -> anyhow::Result<Reply> {
        let id = command.parameter("voteId").context("upvote without voteId")?;
        let statement = command
            .parameter("statement")
            .context("upvote without statement")?;
        let count: u64 = command
            .parameter("count")
            .context("upvote without count")?
            .parse()
            .context("vote count is not a number")?;
        let voter = context
            .user()
            .map(|u| u.display_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(NOBODY);
        let vote = Vote {
            id: id.to_string(),
            statement,
            voter,
            count: count.saturating_add(1),
        };
        Ok(vote_reply(&vote, ActionResponseType::UpdateMessage))
    }

    fn new_vote(&self, statement: &str) -> Reply {
        let vote = Vote {
            id: Uuid::new_v4().to_string(),
            statement,
            voter: NOBODY,
            count: 0,
        };
        vote_reply(&vote, ActionResponseType::NewMessage)
    }
}

fn vote_reply(vote: &Vote, response_type: ActionResponseType) -> Reply {
    let count = vote.count.to_string();
    let upvote = OnClick::action_with_parameters(
        UPVOTE_ACTION,
        vec![
            ("voteId", vote.id.as_str()),
            ("statement", vote.statement),
            ("count", count.as_str()),
        ],
    );
    let new_vote = OnClick::action_with_parameters(NEW_VOTE_ACTION, Vec::<(&str, &str)>::new());
    let image = IMAGES[(vote.count % IMAGES.len() as u64) as usize];
    let card = Card::new(CardHeader::titled(format!("Vote: {}", vote.statement)))
        .named(vote.id.as_str())
        .with_section(Section::new(vec![
            Widget::TextParagraph {
                text: format!("{} votes, last vote was by {}!", vote.count, vote.voter),
            },
            Widget::Image {
                image_url: image.to_string(),
                on_click: None,
            },
            Widget::Buttons(vec![
                Button::TextButton {
                    text: "UPVOTE".to_string(),
                    on_click: upvote,
                },
                Button::TextButton {
                    text: "NEW VOTE".to_string(),
                    on_click: new_vote,
                },
            ]),
        ]));
    Reply::cards(vec![card]).with_action_response(response_type)
}

impl CommandProcessor for VoteCommandProcessor {
    fn process(
        &'static self,
        context: &CommandContext,
        command: &Command,
    ) -> anyhow::Result<Reply> {
        if !command.is_card_action() {
            let statement = command.args_line();
            if statement.is_empty() {
                return Ok(self.new_vote(DEFAULT_STATEMENT));
            }
            return Ok(self.new_vote(&statement));
        }
        if command.name == UPVOTE_ACTION {
            self.upvote(context, command)
        } else {
            Ok(self.new_vote(DEFAULT_STATEMENT))
        }
    }

    fn matches(&'static self, command: &Command) -> bool {
        command.is_text_command(&["vote"])
            || (command.is_card_action()
                && (command.name == UPVOTE_ACTION || command.name == NEW_VOTE_ACTION))
    }

    fn usage(&'static self) -> Option<&'static str> {
        Some("`vote <statement>`: start a vote others can upvote")
    }
}
