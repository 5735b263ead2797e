use alloy::primitives::{Address, B256, U256};
use alloy::providers::ProviderBuilder;
use clap::{Parser, Subcommand};
use eyre::{Result, eyre};
use log::info;
use timelock_core::{
    ConfigWrapper, ContractInteraction, HardwareWalletType, Ledger, QueueRequest, QueuedTransaction,
    RpcTimelock, Submission, SubmissionOutcome, TimelockBackend, TimelockManager, TransactionId,
    load_wallet,
    commands::{TimelockBot, start_bot},
    types::timelock_transaction::{FunctionArg, TargetContract, TargetFunction},
    utils::contract_interface::{MASTER_CHEF, TIMELOCK},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Chain id of the network to operate on
    #[arg(long = "network", short = 'n', global = true, default_value_t = 250)]
    network_id: u64,

    /// Path to the config file
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Use Trezor hardware wallet
    #[arg(long = "trezor", short = 't', global = true, conflicts_with = "ledger")]
    trezor: bool,

    /// Use Ledger hardware wallet
    #[arg(long = "ledger", short = 'l', global = true, conflicts_with = "trezor")]
    ledger: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the timelock delay settings
    Settings,
    /// Print the current and pending timelock admin
    Admin,
    /// List outstanding transactions of the network
    List,
    /// Queue an arbitrary call to a known contract through the timelock
    Queue {
        /// Logical contract name, as in the config
        #[arg(long = "contract", short = 'c')]
        contract: String,

        /// Function name or full signature
        #[arg(long = "function", short = 'f')]
        function: String,

        /// Ordered function arguments
        #[arg(long = "args", num_args = 0..)]
        args: Vec<String>,

        /// Native value forwarded with the call, in wei
        #[arg(long = "value", default_value = "0")]
        value: U256,

        /// Execution timestamp
        #[arg(long = "eta")]
        eta: u64,

        /// Print the calldata for a multisig instead of sending
        #[arg(long = "multisig")]
        multisig: bool,
    },
    /// Queue adding a farm on the MasterChef
    FarmsAdd {
        /// Token address (e.g BPT)
        #[arg(long = "lp")]
        lp_token: Address,

        /// Allocation points (weight) of the farm
        #[arg(long = "alloc")]
        allocation_points: u64,

        /// Rewarder contract address
        #[arg(long = "rewarder", default_value_t = Address::ZERO)]
        rewarder: Address,

        /// Execution timestamp, defaults to 8h from now
        #[arg(long = "eta")]
        eta: Option<u64>,

        /// Print the calldata for a multisig instead of sending
        #[arg(long = "multisig")]
        multisig: bool,
    },
    /// Queue updating a farm on the MasterChef
    FarmsSet {
        /// Pool id of the farm
        #[arg(long = "pid")]
        pid: u64,

        /// New allocation points (weight) of the farm
        #[arg(long = "alloc")]
        allocation_points: u64,

        /// Rewarder contract address
        #[arg(long = "rewarder", default_value_t = Address::ZERO)]
        rewarder: Address,

        /// Replace the current rewarder
        #[arg(long = "overwrite")]
        overwrite: bool,

        /// Execution timestamp, defaults to 8h from now
        #[arg(long = "eta")]
        eta: Option<u64>,

        /// Print the calldata for a multisig instead of sending
        #[arg(long = "multisig")]
        multisig: bool,
    },
    /// Execute a queued transaction
    Execute {
        /// Transaction id from the ledger
        id: TransactionId,

        /// Print the calldata for a multisig instead of sending
        #[arg(long = "multisig")]
        multisig: bool,
    },
    /// Drop a transaction from the ledger
    Purge {
        /// Transaction id from the ledger
        id: TransactionId,

        /// Skip the confirmation prompt
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
    /// Drop every transaction that can no longer execute
    PurgeExpired,
    /// Nominate a new pending admin
    SetPendingAdmin {
        /// Address of the new admin
        address: Address,

        /// Queue through the timelock with this execution timestamp instead
        /// of calling it directly
        #[arg(long = "eta")]
        eta: Option<u64>,

        /// Print the calldata for a multisig instead of sending
        #[arg(long = "multisig")]
        multisig: bool,
    },
    /// Accept the pending admin role
    AcceptAdmin {
        /// Send the call with the local signer instead of printing it
        #[arg(long = "direct")]
        direct: bool,
    },
    /// Serve the slash commands on Discord, token read from DISCORD_TOKEN
    Bot,
}

const DEFAULT_ETA_OFFSET: u64 = timelock_core::commands::DEFAULT_ETA_OFFSET;

impl Commands {
    fn submission(&self) -> Option<Submission> {
        let multisig = match self {
            Commands::Queue { multisig, .. }
            | Commands::FarmsAdd { multisig, .. }
            | Commands::FarmsSet { multisig, .. }
            | Commands::Execute { multisig, .. }
            | Commands::SetPendingAdmin { multisig, .. } => *multisig,
            Commands::AcceptAdmin { direct } => !*direct,
            _ => return None,
        };
        Some(if multisig {
            Submission::Multisig
        } else {
            Submission::Direct
        })
    }

    fn needs_signer(&self) -> bool {
        self.submission() == Some(Submission::Direct)
    }
}

struct Context {
    network_id: u64,
    config: ConfigWrapper,
}

impl Context {
    fn tx_link(&self, tx_hash: B256) -> String {
        match self.config.get_block_explorer_url(self.network_id) {
            Ok(explorer) => format!("{}/tx/{}", explorer, tx_hash),
            Err(_) => tx_hash.to_string(),
        }
    }

    fn contract(&self, name: &str) -> Result<Address> {
        self.config.get_contract_address(self.network_id, name)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = ConfigWrapper::from_file(cli.config.as_deref())?;
    let network_id = cli.network_id;

    let network = config.get_network_name(network_id);
    let rpc_url = config.get_rpc_url(network_id)?;
    let timelock = config.get_contract_address(network_id, TIMELOCK)?;
    let ledger_dir = config.get_ledger_dir();
    let ctx = Context { network_id, config };

    let mut ledger = Ledger::open(ledger_dir, &network)?;
    info!(
        "Using timelock {} on {} ({} outstanding)",
        timelock,
        network,
        ledger.len()
    );

    if let Commands::Bot = cli.command {
        let provider = ProviderBuilder::new().on_builtin(&rpc_url).await?;
        let manager = TimelockManager::new(RpcTimelock::new(timelock, provider));
        let bot = TimelockBot::new(manager, ledger, ctx.contract(MASTER_CHEF)?);
        return start_bot(bot).await;
    }

    let hardware = match (cli.trezor, cli.ledger) {
        (true, _) => Some(HardwareWalletType::TREZOR),
        (_, true) => Some(HardwareWalletType::LEDGER),
        _ => None,
    };
    let wallet = if cli.command.needs_signer() || hardware.is_some() {
        load_wallet(hardware, network_id).await?
    } else {
        None
    };
    if wallet.is_none() && cli.command.needs_signer() {
        return Err(eyre!(
            "No signer available: set PRIVATE_KEY, pass --trezor/--ledger or use --multisig"
        ));
    }

    match wallet {
        Some(wallet) => {
            let provider = ProviderBuilder::new()
                .wallet(wallet)
                .on_builtin(&rpc_url)
                .await?;
            let manager = TimelockManager::new(RpcTimelock::new(timelock, provider));
            run(&cli.command, &manager, &mut ledger, &ctx).await?;
        }
        None => {
            let provider = ProviderBuilder::new().on_builtin(&rpc_url).await?;
            let manager = TimelockManager::new(RpcTimelock::new(timelock, provider));
            run(&cli.command, &manager, &mut ledger, &ctx).await?;
        }
    }

    ledger.close()?;
    Ok(())
}

async fn run<B: TimelockBackend>(
    command: &Commands,
    manager: &TimelockManager<B>,
    ledger: &mut Ledger,
    ctx: &Context,
) -> Result<()> {
    match command {
        Commands::Settings => {
            let settings = manager.settings().await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::Admin => {
            println!("Admin: {}", manager.admin().await?);
            println!("Pending admin: {}", manager.pending_admin().await?);
        }
        Commands::List => {
            let transactions = manager.list(ledger).await?;
            if transactions.is_empty() {
                println!("No outstanding transactions on {}", ledger.network());
            }
            for (tx, status) in transactions {
                println!(
                    "{} [{}] {}.{}({}) eta {}",
                    tx.id,
                    status,
                    tx.target_contract.name,
                    tx.target_function.identifier,
                    tx.target_function
                        .args
                        .iter()
                        .map(FunctionArg::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                    tx.eta
                );
            }
        }
        Commands::Queue {
            contract,
            function,
            args,
            value,
            eta,
            ..
        } => {
            let request = QueueRequest {
                target_contract: TargetContract {
                    name: contract.clone(),
                    address: ctx.contract(contract)?,
                },
                target_function: TargetFunction::new(
                    function.as_str(),
                    args.iter().map(|a| FunctionArg::from(a.as_str())).collect(),
                ),
                value: *value,
                eta: *eta,
            };
            queue(command, manager, ledger, request, ctx).await?;
        }
        Commands::FarmsAdd {
            lp_token,
            allocation_points,
            rewarder,
            eta,
            ..
        } => {
            let eta = eta_or_default(manager, *eta).await?;
            let request = QueueRequest::farms_add(
                ctx.contract(MASTER_CHEF)?,
                *allocation_points,
                *lp_token,
                *rewarder,
                eta,
            );
            queue(command, manager, ledger, request, ctx).await?;
        }
        Commands::FarmsSet {
            pid,
            allocation_points,
            rewarder,
            overwrite,
            eta,
            ..
        } => {
            let eta = eta_or_default(manager, *eta).await?;
            let request = QueueRequest::farms_set(
                ctx.contract(MASTER_CHEF)?,
                *pid,
                *allocation_points,
                *rewarder,
                *overwrite,
                eta,
            );
            queue(command, manager, ledger, request, ctx).await?;
        }
        Commands::Execute { id, multisig } => {
            if *multisig {
                print_interaction(&manager.prepare_execute(ledger, id).await?);
            } else {
                let tx_hash = manager.execute(ledger, id).await?;
                println!("Executed {}", id);
                println!("Transaction URL: {}", ctx.tx_link(tx_hash));
            }
        }
        Commands::Purge { id, yes } => {
            if !*yes && !prompt_user_confirmation(&format!("Drop {} from the ledger?", id))? {
                return Ok(());
            }
            let tx = manager.purge(ledger, id)?;
            println!(
                "Purged {} ({}.{})",
                tx.id, tx.target_contract.name, tx.target_function.identifier
            );
        }
        Commands::PurgeExpired => {
            let purged = manager.purge_expired(ledger).await?;
            for tx in &purged {
                println!("Purged {} (eta {})", tx.id, tx.eta);
            }
            println!("{} stale transaction(s) purged", purged.len());
        }
        Commands::SetPendingAdmin { address, eta, .. } => match eta {
            Some(eta) => {
                let submission = command.submission().unwrap_or(Submission::Direct);
                let queued = manager
                    .queue_set_pending_admin(ledger, *address, *eta, submission)
                    .await?;
                print_queued(&queued, ctx);
            }
            None => {
                if command.submission() == Some(Submission::Multisig) {
                    print_interaction(&manager.prepare_set_pending_admin(*address));
                } else {
                    let tx_hash = manager.set_pending_admin(*address).await?;
                    println!("Pending admin set to {}", address);
                    println!("Transaction URL: {}", ctx.tx_link(tx_hash));
                }
            }
        },
        Commands::AcceptAdmin { .. } => {
            let submission = command.submission().unwrap_or(Submission::Multisig);
            match manager.accept_admin(submission).await? {
                SubmissionOutcome::Prepared(interaction) => print_interaction(&interaction),
                SubmissionOutcome::Submitted(tx_hash) => {
                    println!("Admin accepted");
                    println!("Transaction URL: {}", ctx.tx_link(tx_hash));
                }
            }
        }
        Commands::Bot => return Err(eyre!("The bot is started before any signer is loaded")),
    }
    Ok(())
}

async fn queue<B: TimelockBackend>(
    command: &Commands,
    manager: &TimelockManager<B>,
    ledger: &mut Ledger,
    request: QueueRequest,
    ctx: &Context,
) -> Result<()> {
    let submission = command.submission().unwrap_or(Submission::Direct);
    let queued = manager.queue(ledger, request, submission).await?;
    print_queued(&queued, ctx);
    Ok(())
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

fn print_queued(queued: &QueuedTransaction, ctx: &Context) {
    println!("Transaction id: {}", queued.transaction.id);
    println!("Eta: {}", queued.transaction.eta);
    match queued.tx_hash {
        Some(tx_hash) => println!("Transaction URL: {}", ctx.tx_link(tx_hash)),
        None => print_interaction(&queued.interaction),
    }
}

fn print_interaction(interaction: &ContractInteraction) {
    println!("```");
    println!("{}", interaction);
    println!("```");
}

fn prompt_user_confirmation(message: &str) -> Result<bool> {
    println!("\n{} (y/n)", message);
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_lowercase() == "y")
}
