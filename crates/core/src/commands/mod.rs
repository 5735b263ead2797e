//! Discord slash-command surface. Commands never sign: every reply carries the
//! `(contract, calldata)` pair for the multisig to submit.

mod bot_command;
mod discord;

pub use bot_command::{BotCommand, BotOption, BotReply, DEFAULT_ETA_OFFSET, definitions};
pub use discord::{TimelockBot, start_bot};
