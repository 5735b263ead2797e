use super::bot_command::{BotCommand, BotOption, definitions};
use crate::error::Result as TimelockResult;
use crate::ledger::Ledger;
use crate::manager::{backend::TimelockBackend, timelock_manager::TimelockManager};
use alloy::primitives::Address;
use dotenv::dotenv;
use eyre::{Result, eyre};
use serenity::all::{
    Client, Command, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
    EventHandler, GatewayIntents, Interaction, Ready,
};
use std::env;
use tokio::sync::Mutex;

const TOKEN_VAR: &str = "DISCORD_TOKEN";

/// Gateway handler answering the timelock slash commands.
///
/// Replies are ephemeral and never signed. The ledger is shared by every
/// invocation, so commands are applied one at a time.
pub struct TimelockBot<B> {
    manager: TimelockManager<B>,
    ledger: Mutex<Ledger>,
    master_chef: Address,
}

impl<B: TimelockBackend> TimelockBot<B> {
    pub fn new(manager: TimelockManager<B>, ledger: Ledger, master_chef: Address) -> Self {
        Self {
            manager,
            ledger: Mutex::new(ledger),
            master_chef,
        }
    }

    async fn run(&self, name: &str, options: &[BotOption<'_>]) -> TimelockResult<String> {
        let command = BotCommand::parse(name, options)?;
        let mut ledger = self.ledger.lock().await;
        let reply = command
            .execute(&self.manager, &mut ledger, self.master_chef)
            .await?;
        Ok(reply.content)
    }

    /// Text shown to the invoking user; failures are reported, not dropped.
    pub async fn respond(&self, name: &str, options: &[BotOption<'_>]) -> String {
        match self.run(name, options).await {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Discord: /{} failed: {}", name, e);
                format!("Error: {}", e)
            }
        }
    }
}

#[serenity::async_trait]
impl<B: TimelockBackend + 'static> EventHandler for TimelockBot<B> {
    async fn ready(&self, ctx: Context, ready: Ready) {
        log::info!("Discord: Bot connected as {}", ready.user.name);
        match Command::set_global_commands(&ctx.http, definitions()).await {
            Ok(commands) => log::info!("Discord: Registered {} command(s)", commands.len()),
            Err(e) => log::error!("Discord: Failed to register commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        log::info!("Discord: /{} from {}", command.data.name, command.user.name);

        let options: Vec<BotOption<'_>> = command
            .data
            .options()
            .into_iter()
            .map(|option| (option.name, option.value))
            .collect();
        let content = self.respond(&command.data.name, &options).await;

        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true),
        );
        if let Err(e) = command.create_response(&ctx.http, response).await {
            log::error!("Discord: Failed to send reply: {}", e);
        }
    }
}

/// Connects to the gateway with `DISCORD_TOKEN` and serves until ctrl-c.
pub async fn start_bot<B: TimelockBackend + 'static>(bot: TimelockBot<B>) -> Result<()> {
    dotenv().ok();
    let token =
        env::var(TOKEN_VAR).map_err(|_| eyre!("Environment variable {} not set", TOKEN_VAR))?;

    let mut client = Client::builder(&token, GatewayIntents::GUILDS)
        .event_handler(bot)
        .await
        .map_err(|e| eyre!("Failed to create Discord client: {}", e))?;
    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("Discord: Shutting down");
            shard_manager.shutdown_all().await;
        }
        result = client.start() => {
            result.map_err(|e| eyre!("Discord client error: {}", e))?;
        }
    }
    Ok(())
}
