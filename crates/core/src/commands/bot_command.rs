use crate::error::{Result, TimelockError};
use crate::ledger::Ledger;
use crate::manager::{
    backend::TimelockBackend,
    timelock_manager::{QueueRequest, Submission, SubmissionOutcome, TimelockManager},
};
use crate::types::{contract_interaction::ContractInteraction, transaction_id::TransactionId};
use alloy::primitives::Address;
use log::debug;
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, MessageBuilder, ResolvedValue,
};

/// Eta used when a farm command leaves it out, relative to chain time.
pub const DEFAULT_ETA_OFFSET: u64 = 8 * 3600;

/// An option name with the value the gateway resolved for it.
pub type BotOption<'a> = (&'a str, ResolvedValue<'a>);

/// Slash-command registrations for every command, in a stable order.
pub fn definitions() -> Vec<CreateCommand> {
    let eta = CreateCommandOption::new(
        CommandOptionType::Integer,
        "eta",
        "Time of execution (defaults to 8h)",
    );
    let rewarder = CreateCommandOption::new(
        CommandOptionType::String,
        "rewarder_address",
        "Rewarder contract address",
    );

    vec![
        CreateCommand::new("farms_add")
            .description("Generate hex data to queue adding a farm on timelock")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "token_address",
                    "Token address (e.g BPT)",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "allocation_points",
                    "Allocation points (weight) of the farm",
                )
                .required(true),
            )
            .add_option(rewarder.clone())
            .add_option(eta.clone()),
        CreateCommand::new("farms_set")
            .description("Generate hex data to queue updating a farm on timelock")
            .add_option(
                CreateCommandOption::new(CommandOptionType::Integer, "pid", "Pool id of the farm")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "allocation_points",
                    "New allocation points (weight) of the farm",
                )
                .required(true),
            )
            .add_option(rewarder)
            .add_option(CreateCommandOption::new(
                CommandOptionType::Boolean,
                "overwrite",
                "Replace the current rewarder",
            ))
            .add_option(eta),
        CreateCommand::new("timelock_execute")
            .description("Generate hex data to execute a queued timelock transaction")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "id",
                    "Transaction id from the ledger",
                )
                .required(true),
            ),
        CreateCommand::new("timelock_accept_admin")
            .description("Generate hex data to accept the pending timelock admin role"),
    ]
}

/// Typed view over the resolved options of one invocation.
struct Options<'a> {
    command: &'a str,
    options: &'a [BotOption<'a>],
}

impl<'a> Options<'a> {
    fn get(&self, name: &str) -> Option<&'a ResolvedValue<'a>> {
        self.options
            .iter()
            .find(|(option, _)| *option == name)
            .map(|(_, value)| value)
    }

    fn missing(&self, name: &str) -> TimelockError {
        TimelockError::Validation(format!("{} requires option {}", self.command, name))
    }

    fn mistyped(&self, name: &str, expected: &str) -> TimelockError {
        TimelockError::Validation(format!(
            "option {} of {} must be {}",
            name, self.command, expected
        ))
    }

    fn string(&self, name: &str) -> Result<Option<&'a str>> {
        match self.get(name) {
            None => Ok(None),
            Some(ResolvedValue::String(s)) => Ok(Some(*s)),
            Some(_) => Err(self.mistyped(name, "a string")),
        }
    }

    fn address(&self, name: &str) -> Result<Option<Address>> {
        self.string(name)?
            .map(|s| {
                s.trim()
                    .parse::<Address>()
                    .map_err(|e| TimelockError::Validation(format!("invalid {name} {s}: {e}")))
            })
            .transpose()
    }

    fn unsigned(&self, name: &str) -> Result<Option<u64>> {
        match self.get(name) {
            None => Ok(None),
            Some(ResolvedValue::Integer(i)) => u64::try_from(*i)
                .map(Some)
                .map_err(|_| self.mistyped(name, "a non-negative integer")),
            Some(_) => Err(self.mistyped(name, "an integer")),
        }
    }

    fn boolean(&self, name: &str) -> Result<Option<bool>> {
        match self.get(name) {
            None => Ok(None),
            Some(ResolvedValue::Boolean(b)) => Ok(Some(*b)),
            Some(_) => Err(self.mistyped(name, "a boolean")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    FarmsAdd {
        token_address: Address,
        allocation_points: u64,
        rewarder_address: Address,
        eta: Option<u64>,
    },
    FarmsSet {
        pid: u64,
        allocation_points: u64,
        rewarder_address: Address,
        overwrite: bool,
        eta: Option<u64>,
    },
    TimelockExecute {
        id: TransactionId,
    },
    TimelockAcceptAdmin,
}

impl BotCommand {
    pub fn parse<'a>(name: &'a str, options: &'a [BotOption<'a>]) -> Result<Self> {
        debug!("Parsing bot command {} with {} option(s)", name, options.len());
        let opts = Options {
            command: name,
            options,
        };

        match name {
            "farms_add" => Ok(BotCommand::FarmsAdd {
                token_address: opts
                    .address("token_address")?
                    .ok_or_else(|| opts.missing("token_address"))?,
                allocation_points: opts
                    .unsigned("allocation_points")?
                    .ok_or_else(|| opts.missing("allocation_points"))?,
                rewarder_address: opts.address("rewarder_address")?.unwrap_or(Address::ZERO),
                eta: opts.unsigned("eta")?,
            }),
            "farms_set" => Ok(BotCommand::FarmsSet {
                pid: opts.unsigned("pid")?.ok_or_else(|| opts.missing("pid"))?,
                allocation_points: opts
                    .unsigned("allocation_points")?
                    .ok_or_else(|| opts.missing("allocation_points"))?,
                rewarder_address: opts.address("rewarder_address")?.unwrap_or(Address::ZERO),
                overwrite: opts.boolean("overwrite")?.unwrap_or(false),
                eta: opts.unsigned("eta")?,
            }),
            "timelock_execute" => {
                let id = opts.string("id")?.ok_or_else(|| opts.missing("id"))?;
                Ok(BotCommand::TimelockExecute {
                    id: id.trim().parse()?,
                })
            }
            "timelock_accept_admin" => Ok(BotCommand::TimelockAcceptAdmin),
            other => Err(TimelockError::Validation(format!(
                "unknown bot command {other}"
            ))),
        }
    }

    /// Runs the command in multisig mode and formats the pair to send.
    ///
    /// Farm commands persist the queued entry so it can be executed later with
    /// `timelock_execute`.
    pub async fn execute<B: TimelockBackend>(
        &self,
        manager: &TimelockManager<B>,
        ledger: &mut Ledger,
        master_chef: Address,
    ) -> Result<BotReply> {
        let interaction = match self {
            BotCommand::FarmsAdd {
                token_address,
                allocation_points,
                rewarder_address,
                eta,
            } => {
                let eta = Self::eta_or_default(manager, *eta).await?;
                let request = QueueRequest::farms_add(
                    master_chef,
                    *allocation_points,
                    *token_address,
                    *rewarder_address,
                    eta,
                );
                manager
                    .queue(ledger, request, Submission::Multisig)
                    .await?
                    .interaction
            }
            BotCommand::FarmsSet {
                pid,
                allocation_points,
                rewarder_address,
                overwrite,
                eta,
            } => {
                let eta = Self::eta_or_default(manager, *eta).await?;
                let request = QueueRequest::farms_set(
                    master_chef,
                    *pid,
                    *allocation_points,
                    *rewarder_address,
                    *overwrite,
                    eta,
                );
                manager
                    .queue(ledger, request, Submission::Multisig)
                    .await?
                    .interaction
            }
            BotCommand::TimelockExecute { id } => manager.prepare_execute(ledger, id).await?,
            BotCommand::TimelockAcceptAdmin => match manager.accept_admin(Submission::Multisig).await? {
                SubmissionOutcome::Prepared(interaction) => interaction,
                SubmissionOutcome::Submitted(hash) => {
                    return Err(TimelockError::Validation(format!(
                        "accept admin was submitted as {hash} instead of prepared"
                    )));
                }
            },
        };
        Ok(BotReply::from(interaction))
    }

    async fn eta_or_default<B: TimelockBackend>(
        manager: &TimelockManager<B>,
        eta: Option<u64>,
    ) -> Result<u64> {
        match eta {
            Some(eta) => Ok(eta),
            None => Ok(manager.now().await? + DEFAULT_ETA_OFFSET),
        }
    }
}

/// The code block shown to the invoking user, with the pair it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub content: String,
    pub interaction: ContractInteraction,
}

impl From<ContractInteraction> for BotReply {
    fn from(interaction: ContractInteraction) -> Self {
        Self {
            content: MessageBuilder::new()
                .push_codeblock(interaction.to_string(), None)
                .build(),
            interaction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::timelock::Timelock;
    use crate::manager::mock::{self, MockTimelock};
    use alloy::primitives::{U256, address};
    use alloy::sol_types::SolCall;

    const NOW: u64 = 1_700_000_000;
    const LP: Address = address!("0x1111111111111111111111111111111111111111");

    fn farms_add_options() -> Vec<BotOption<'static>> {
        vec![
            (
                "token_address",
                ResolvedValue::String("0x1111111111111111111111111111111111111111"),
            ),
            ("allocation_points", ResolvedValue::Integer(100)),
        ]
    }

    #[test]
    fn test_definitions_cover_every_command() {
        let registered: Vec<serde_json::Value> = definitions()
            .iter()
            .map(|d| serde_json::to_value(d).unwrap())
            .collect();
        let names: Vec<_> = registered.iter().map(|d| d["name"].clone()).collect();
        assert_eq!(
            names,
            vec!["farms_add", "farms_set", "timelock_execute", "timelock_accept_admin"]
        );

        let required: Vec<_> = registered[0]["options"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|o| o["required"] == true)
            .map(|o| o["name"].clone())
            .collect();
        assert_eq!(required, vec!["token_address", "allocation_points"]);
        assert_eq!(registered[1]["options"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_parse_farms_add_with_defaults() {
        let command = BotCommand::parse("farms_add", &farms_add_options()).unwrap();
        assert_eq!(
            command,
            BotCommand::FarmsAdd {
                token_address: LP,
                allocation_points: 100,
                rewarder_address: Address::ZERO,
                eta: None,
            }
        );
    }

    #[test]
    fn test_parse_rejects_missing_and_mistyped_options() {
        let err = BotCommand::parse("farms_add", &farms_add_options()[..1]).unwrap_err();
        assert!(matches!(err, TimelockError::Validation(m) if m.contains("allocation_points")));

        let mut options = farms_add_options();
        options[1] = ("allocation_points", ResolvedValue::String("100"));
        assert!(BotCommand::parse("farms_add", &options).is_err());

        options[1] = ("allocation_points", ResolvedValue::Integer(-1));
        assert!(BotCommand::parse("farms_add", &options).is_err());

        let options = vec![("token_address", ResolvedValue::String("0x1234"))];
        assert!(BotCommand::parse("farms_add", &options).is_err());
    }

    #[test]
    fn test_parse_execute_and_unknown() {
        let id = TransactionId::from(alloy::primitives::B256::repeat_byte(7));
        let text = id.to_string();
        let command =
            BotCommand::parse("timelock_execute", &[("id", ResolvedValue::String(&text))]).unwrap();
        assert_eq!(command, BotCommand::TimelockExecute { id });

        assert!(BotCommand::parse("timelock_execute", &[]).is_err());
        assert!(BotCommand::parse("farms_remove", &[]).is_err());
        assert_eq!(
            BotCommand::parse("timelock_accept_admin", &[]).unwrap(),
            BotCommand::TimelockAcceptAdmin
        );
    }

    #[tokio::test]
    async fn test_farms_add_replies_with_decodable_queue_pair() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::open(dir.path(), "fantom").unwrap();
        let manager = TimelockManager::new(MockTimelock::new(NOW));

        let command = BotCommand::parse("farms_add", &farms_add_options()).unwrap();
        let reply = command
            .execute(&manager, &mut ledger, mock::MASTER_CHEF)
            .await
            .unwrap();

        assert!(reply.content.starts_with("```\nContract: "));
        assert!(reply.content.contains("\nData: 0x"));
        assert_eq!(reply.interaction.contract, mock::TIMELOCK);

        let call = Timelock::queueTransactionCall::abi_decode(&reply.interaction.data, true).unwrap();
        assert_eq!(call.target, mock::MASTER_CHEF);
        assert_eq!(call.value, U256::ZERO);
        assert_eq!(call.signature, "add(uint256,address,address)");
        assert_eq!(call.eta, U256::from(NOW + DEFAULT_ETA_OFFSET));

        // The bot never signs.
        assert_eq!(manager.backend().submissions(), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_and_accept_admin_replies() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::open(dir.path(), "fantom").unwrap();
        let manager = TimelockManager::new(MockTimelock::new(NOW));

        BotCommand::parse("farms_add", &farms_add_options())
            .unwrap()
            .execute(&manager, &mut ledger, mock::MASTER_CHEF)
            .await
            .unwrap();
        let id = ledger.iter().next().map(|tx| tx.id).unwrap();

        // The multisig queues the pair, then time passes.
        manager.backend().queue_directly(id);
        manager.backend().advance_to(NOW + DEFAULT_ETA_OFFSET);

        let reply = BotCommand::TimelockExecute { id }
            .execute(&manager, &mut ledger, mock::MASTER_CHEF)
            .await
            .unwrap();
        let call = Timelock::executeTransactionCall::abi_decode(&reply.interaction.data, true).unwrap();
        assert_eq!(call.target, mock::MASTER_CHEF);
        assert!(ledger.contains(&id));

        let reply = BotCommand::TimelockAcceptAdmin
            .execute(&manager, &mut ledger, mock::MASTER_CHEF)
            .await
            .unwrap();
        assert_eq!(
            reply.interaction.data.to_vec(),
            Timelock::acceptAdminCall::new(()).abi_encode()
        );
        assert_eq!(manager.backend().submissions(), 0);
    }
}
