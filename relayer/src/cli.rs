//! The relayer's CLI surface: every subcommand, plus the `--output
//! json`/human toggle threaded through every leaf command.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "coreumbridge-xrpl-relayer", about = "XRPL <-> Coreum bridge relayer")]
pub struct Cli {
    /// Path to the relayer's YAML config file.
    #[arg(long, global = true, default_value = "relayer.yaml")]
    pub config: std::path::PathBuf,

    /// Passphrase used to unlock keys stored in the encrypted-file keyring
    /// fallback. Ignored when a key is found in the OS keyring.
    #[arg(long, global = true, env = "RELAYER_KEYRING_PASSPHRASE")]
    pub keyring_passphrase: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Writes a default config file to the given path.
    InitConfig {
        #[arg(long, default_value = "relayer.yaml")]
        path: std::path::PathBuf,
    },
    /// Runs the relayer daemon: scanner, both bridging loops and the metrics server.
    Relayer,
    /// Manages keys in the local keyring (one XRPL family-seed key, one Coreum secp256k1 key).
    Keys {
        #[command(subcommand)]
        command: KeysCommand,
    },
    /// One-shot setup: registers the relayer set on a freshly instantiated contract.
    BootstrapBridge(BootstrapBridgeArgs),
    /// Deploys, instantiates or migrates the bridge contract's wasm code.
    Contract {
        #[command(subcommand)]
        command: ContractCommand,
    },
    /// Token registration and lifecycle commands.
    Tokens {
        #[command(subcommand)]
        command: TokensCommand,
    },
    /// Contract ownership transfer (`cw_ownable`).
    Ownership {
        #[command(subcommand)]
        command: OwnershipCommand,
    },
    /// Ticket pool recovery.
    Tickets {
        #[command(subcommand)]
        command: TicketsCommand,
    },
    /// Halts or resumes user-facing bridging.
    Bridge {
        #[command(subcommand)]
        command: BridgeCommand,
    },
    /// Submits a user-initiated transfer.
    Send {
        #[command(subcommand)]
        command: SendCommand,
    },
    /// Read-only queries against the contract.
    Query {
        #[command(subcommand)]
        command: QueryCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum KeysCommand {
    /// Generates or imports a key and stores it in the keyring.
    Add {
        name: String,
        #[arg(long, value_enum)]
        kind: KeyKindArg,
        /// Existing secret to import (XRPL family seed, or hex-encoded Coreum secp256k1 key).
        /// A fresh key is generated when omitted.
        #[arg(long)]
        import: Option<String>,
    },
    /// Shows the public identity (address) for a stored key.
    Show { name: String },
    /// Lists all stored key names.
    List,
    /// Removes a stored key.
    Delete { name: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KeyKindArg {
    Xrpl,
    Coreum,
}

#[derive(Debug, Args)]
pub struct BootstrapBridgeArgs {
    /// Coreum addresses and XRPL addresses/pubkeys of every relayer, `coreum:xrpl:pubkey`.
    #[arg(long = "relayer", required = true)]
    pub relayers: Vec<String>,
    #[arg(long)]
    pub evidence_threshold: u32,
}

#[derive(Debug, Subcommand)]
pub enum ContractCommand {
    /// Uploads a wasm binary, returning its code id.
    Deploy {
        #[arg(long)]
        wasm_path: std::path::PathBuf,
    },
    /// Instantiates a previously uploaded code id.
    Instantiate {
        #[arg(long)]
        code_id: u64,
        #[arg(long)]
        init_msg: String,
        #[arg(long)]
        label: String,
        #[arg(long)]
        salt: String,
    },
    /// Migrates the bridge contract to a new code id.
    Migrate {
        #[arg(long)]
        code_id: u64,
        #[arg(long)]
        migrate_msg: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TokensCommand {
    RegisterXrpl {
        #[arg(long)]
        issuer: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        sending_precision: i32,
        #[arg(long)]
        max_holding_amount: String,
        #[arg(long, default_value = "0")]
        bridging_fee: String,
        #[arg(long)]
        transfer_rate: Option<String>,
        #[arg(long, default_value = "")]
        issue_fee_denom: String,
        #[arg(long, default_value = "0")]
        issue_fee_amount: String,
    },
    RegisterCoreum {
        #[arg(long)]
        denom: String,
        #[arg(long)]
        decimals: u32,
        #[arg(long)]
        sending_precision: i32,
        #[arg(long)]
        max_holding_amount: String,
        #[arg(long, default_value = "0")]
        bridging_fee: String,
    },
    UpdateXrpl {
        #[arg(long)]
        issuer: String,
        #[arg(long)]
        currency: String,
        #[arg(long, value_enum)]
        state: Option<TokenStateArg>,
        #[arg(long)]
        sending_precision: Option<i32>,
        #[arg(long)]
        bridging_fee: Option<String>,
        #[arg(long)]
        max_holding_amount: Option<String>,
        #[arg(long)]
        transfer_rate: Option<String>,
    },
    UpdateCoreum {
        #[arg(long)]
        denom: String,
        #[arg(long, value_enum)]
        state: Option<TokenStateArg>,
        #[arg(long)]
        sending_precision: Option<i32>,
        #[arg(long)]
        bridging_fee: Option<String>,
        #[arg(long)]
        max_holding_amount: Option<String>,
    },
    RecoverXrplRegistration {
        #[arg(long)]
        issuer: String,
        #[arg(long)]
        currency: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TokenStateArg {
    Processing,
    Inactive,
    Enabled,
    Disabled,
}

#[derive(Debug, Subcommand)]
pub enum OwnershipCommand {
    Transfer {
        #[arg(long)]
        new_owner: String,
        #[arg(long)]
        expiry: Option<u64>,
    },
    Accept,
}

#[derive(Debug, Subcommand)]
pub enum TicketsCommand {
    Recover {
        #[arg(long)]
        account_sequence: u64,
        #[arg(long)]
        number_of_tickets: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
pub enum BridgeCommand {
    Halt,
    Resume,
}

#[derive(Debug, Subcommand)]
pub enum SendCommand {
    /// Coreum -> XRPL transfer (`ExecuteMsg::SendToXRPL`).
    ToXrpl {
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        denom: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        deliver_amount: Option<String>,
    },
    /// XRPL -> Coreum transfer: a plain XRPL payment with a recipient memo;
    /// this submits it directly against the configured XRPL RPC node rather
    /// than through the contract.
    ToCoreum {
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        currency: String,
        #[arg(long)]
        issuer: Option<String>,
        #[arg(long)]
        amount: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    Config,
    Ownership,
    AvailableTickets,
    PendingOperations,
    XrplTokens,
    CoreumTokens,
    XrplToken {
        #[arg(long)]
        issuer: String,
        #[arg(long)]
        currency: String,
    },
    CoreumToken {
        #[arg(long)]
        denom: String,
    },
    FeesCollected,
    ProcessedTx {
        hash: String,
    },
    ProhibitedRecipients,
    PendingRefunds {
        address: String,
    },
}
