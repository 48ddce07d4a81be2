//! Binary entry point: parses the CLI, loads the config file, and for
//! the `relayer` subcommand spawns the scanner, both bridging loops and the
//! metrics server under a shared supervisor.

use std::sync::Arc;

use clap::Parser;
use cosmrs::AccountId;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use relayer::cli::{
    BridgeCommand, Cli, Command, ContractCommand, KeyKindArg, KeysCommand, OutputFormat, OwnershipCommand, QueryCommand, SendCommand,
    TicketsCommand, TokenStateArg, TokensCommand,
};
use relayer::config::RelayerConfig;
use relayer::coreum_to_xrpl::CoreumToXrplLoop;
use relayer::error::{RelayerError, Result};
use relayer::keys::{CoreumKeyringSigner, KeyKind, KeyMaterial, KeyStore, XrplKeyringSigner};
use relayer::metrics::RelayerMetrics;
use relayer::task::supervise;
use relayer::xrpl_to_coreum::XrplToCoreumLoop;

use contract_client::msg::TokenState;
use contract_client::{CoreumClientConfig, ContractClient, CoreumSigner};
use xrpl_client::{HttpClientConfig, XrplClient};
use xrpl_scanner::{AccountScanner, ScannerConfig, ScannerMetrics};

fn init_tracing(config: &relayer::config::LoggingConfig) {
    use relayer::config::{LogFormat, LogLevel};
    let filter = match config.level {
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    };
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match config.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::YamlConsole | LogFormat::Console => subscriber.init(),
    }
}

fn contract_config(config: &RelayerConfig) -> CoreumClientConfig {
    let c = &config.coreum.contract;
    CoreumClientConfig {
        grpc_url: config.coreum.grpc.url.clone(),
        chain_id: config.coreum.network.chain_id.clone(),
        contract_address: c.contract_address.clone(),
        gas_adjustment: c.gas_adjustment,
        gas_price_adjustment: c.gas_price_adjustment,
        gas_price_denom: "ucore".to_string(),
        page_limit: c.page_limit,
        out_of_gas_retry_delay: c.out_of_gas_retry_delay,
        out_of_gas_retry_attempts: c.out_of_gas_retry_attempts,
        request_timeout: c.request_timeout,
        tx_timeout: c.tx_timeout,
        tx_status_poll_interval: c.tx_status_poll_interval,
    }
}

fn xrpl_http_config(config: &RelayerConfig) -> HttpClientConfig {
    HttpClientConfig {
        url: config.xrpl.rpc.url.clone(),
        request_timeout: config.xrpl.http_client.request_timeout,
        do_timeout: config.xrpl.http_client.do_timeout,
        retry_delay: config.xrpl.http_client.retry_delay,
    }
}

fn scanner_config(config: &RelayerConfig) -> ScannerConfig {
    let s = &config.xrpl.scanner;
    ScannerConfig {
        page_limit: config.xrpl.rpc.page_limit,
        recent_scan_enabled: s.recent_scan_enabled,
        recent_scan_window: s.recent_scan_window,
        repeat_recent_scan: s.repeat_recent_scan,
        full_scan_enabled: s.full_scan_enabled,
        repeat_full_scan: s.repeat_full_scan,
        retry_delay: s.retry_delay,
        dedup_capacity: 100_000,
    }
}

async fn coreum_signer(config: &RelayerConfig, passphrase: Option<&str>) -> Result<CoreumKeyringSigner> {
    let store = KeyStore::new()?;
    let material = store.get(&config.coreum.relayer_key_name, passphrase)?;
    if material.kind != KeyKind::Coreum {
        return Err(RelayerError::Keyring(format!("key {} is not a Coreum key", config.coreum.relayer_key_name)));
    }
    Ok(CoreumKeyringSigner::from_hex_secret(&material.secret, "core")?)
}

async fn xrpl_signer(config: &RelayerConfig, passphrase: Option<&str>) -> Result<XrplKeyringSigner> {
    let store = KeyStore::new()?;
    let material = store.get(&config.xrpl.multi_signer_key_name, passphrase)?;
    if material.kind != KeyKind::Xrpl {
        return Err(RelayerError::Keyring(format!("key {} is not an XRPL key", config.xrpl.multi_signer_key_name)));
    }
    Ok(XrplKeyringSigner::from_family_seed(&material.secret)?)
}

fn print_output<T: serde::Serialize + std::fmt::Debug>(output: OutputFormat, value: &T) {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())),
        OutputFormat::Human => println!("{value:?}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig { path } = &cli.command {
        let yaml = RelayerConfig::default().to_yaml_string()?;
        std::fs::write(path, yaml)?;
        println!("wrote default config to {}", path.display());
        return Ok(());
    }

    let config = RelayerConfig::load(&cli.config)?;
    init_tracing(&config.logging);

    match &cli.command {
        Command::InitConfig { .. } => unreachable!("handled above"),
        Command::Relayer => run_daemon(config).await?,
        Command::Keys { command } => run_keys(command, cli.keyring_passphrase.as_deref())?,
        Command::BootstrapBridge(args) => run_bootstrap_bridge(&config, args, cli.keyring_passphrase.as_deref()).await?,
        Command::Contract { command } => run_contract(&config, command, cli.keyring_passphrase.as_deref(), cli.output).await?,
        Command::Tokens { command } => run_tokens(&config, command, cli.keyring_passphrase.as_deref(), cli.output).await?,
        Command::Ownership { command } => run_ownership(&config, command, cli.keyring_passphrase.as_deref(), cli.output).await?,
        Command::Tickets { command } => run_tickets(&config, command, cli.keyring_passphrase.as_deref(), cli.output).await?,
        Command::Bridge { command } => run_bridge(&config, command, cli.keyring_passphrase.as_deref(), cli.output).await?,
        Command::Send { command } => run_send(&config, command, cli.keyring_passphrase.as_deref(), cli.output).await?,
        Command::Query { command } => run_query(&config, command, cli.output).await?,
    }

    Ok(())
}

async fn connected_client(config: &RelayerConfig, passphrase: Option<&str>) -> Result<ContractClient<CoreumKeyringSigner>> {
    let signer = coreum_signer(config, passphrase).await?;
    Ok(ContractClient::connect(contract_config(config), signer).await?)
}

async fn run_daemon(config: RelayerConfig) -> Result<()> {
    let metrics = Arc::new(RelayerMetrics::new().map_err(|e| RelayerError::Config(e.to_string()))?);
    let shutdown = CancellationToken::new();

    let coreum_signer = coreum_signer(&config, None).await?;
    let our_coreum_address = coreum_signer.account_id().to_string();
    let contract = Arc::new(ContractClient::connect(contract_config(&config), coreum_signer).await?);
    let xrpl_signer = Arc::new(xrpl_signer(&config, None).await?);

    let bridge_config = contract.config().await?;
    let xrpl_client = Arc::new(XrplClient::new(xrpl_http_config(&config)).map_err(RelayerError::from)?);

    let scanner_metrics = ScannerMetrics::new(&metrics.registry).map_err(|e| RelayerError::Config(e.to_string()))?;
    let scanner = Arc::new(AccountScanner::new(
        xrpl_client.clone(),
        bridge_config.bridge_xrpl_address.clone(),
        scanner_config(&config),
        scanner_metrics,
    ));

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    let loop_a = Arc::new(XrplToCoreumLoop::new(
        contract.clone(),
        bridge_config.bridge_xrpl_address.clone(),
        metrics.clone(),
        config.processes.retry_delay,
    ));
    let loop_b = Arc::new(CoreumToXrplLoop::new(
        contract.clone(),
        xrpl_client.clone(),
        xrpl_signer,
        our_coreum_address,
        metrics.clone(),
        config.processes.coreum_to_xrpl.repeat_delay,
    ));

    let mut handles = vec![];

    {
        let scanner = scanner.clone();
        let shutdown = shutdown.clone();
        let tx = tx.clone();
        handles.push(tokio::spawn(supervise("scanner-recent", config.processes.retry_delay, false, shutdown.clone(), move || {
            let scanner = scanner.clone();
            let shutdown = shutdown.clone();
            let tx = tx.clone();
            async move { scanner.run_recent(tx, shutdown).await.map_err(RelayerError::from) }
        })));
    }
    {
        let scanner = scanner.clone();
        let shutdown = shutdown.clone();
        let tx = tx.clone();
        handles.push(tokio::spawn(supervise("scanner-full", config.processes.retry_delay, false, shutdown.clone(), move || {
            let scanner = scanner.clone();
            let shutdown = shutdown.clone();
            let tx = tx.clone();
            async move { scanner.run_full(tx, shutdown).await.map_err(RelayerError::from) }
        })));
    }
    drop(tx);

    {
        // Held across restarts: a panic inside `loop_a.run` drops the guard
        // and the next attempt resumes reading from the same channel rather
        // than losing it, since the scanner's sender side is never recreated.
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let loop_a = loop_a.clone();
        let shutdown = shutdown.clone();
        handles.push(tokio::spawn(supervise("loop-a", config.processes.retry_delay, false, shutdown, move || {
            let loop_a = loop_a.clone();
            let rx = rx.clone();
            async move {
                let mut guard = rx.lock().await;
                loop_a.run(&mut guard).await
            }
        })));
    }

    {
        let loop_b = loop_b.clone();
        let shutdown = shutdown.clone();
        handles.push(tokio::spawn(supervise("loop-b", config.processes.retry_delay, false, shutdown, move || {
            let loop_b = loop_b.clone();
            async move { loop_b.run().await }
        })));
    }

    if config.metrics.enabled {
        let metrics = metrics.clone();
        let listen_address = config.metrics.server.listen_address.clone();
        let shutdown = shutdown.clone();
        handles.push(tokio::spawn(supervise("metrics", config.processes.retry_delay, false, shutdown, move || {
            let metrics = metrics.clone();
            let listen_address = listen_address.clone();
            async move { relayer::metrics::serve(&listen_address, metrics).await }
        })));
    }

    tokio::signal::ctrl_c().await.map_err(|e| RelayerError::Config(e.to_string()))?;
    tracing::info!("received ctrl-c, shutting down");
    shutdown.cancel();
    for handle in handles {
        let _ = handle.await;
    }
    Ok(())
}

fn run_keys(command: &KeysCommand, passphrase: Option<&str>) -> Result<()> {
    let store = KeyStore::new()?;
    match command {
        KeysCommand::Add { name, kind, import } => {
            let material = match (kind, import) {
                (KeyKindArg::Xrpl, Some(seed)) => KeyMaterial { kind: KeyKind::Xrpl, secret: seed.clone() },
                (KeyKindArg::Coreum, Some(hex_secret)) => KeyMaterial { kind: KeyKind::Coreum, secret: hex_secret.clone() },
                (KeyKindArg::Xrpl, None) => {
                    return Err(RelayerError::Keyring("generating a fresh XRPL family seed isn't supported, pass --import <seed>".into()))
                }
                (KeyKindArg::Coreum, None) => {
                    use rand::RngCore;
                    let mut bytes = [0u8; 32];
                    rand::thread_rng().fill_bytes(&mut bytes);
                    KeyMaterial { kind: KeyKind::Coreum, secret: hex::encode(bytes) }
                }
            };
            let passphrase = passphrase.ok_or_else(|| RelayerError::Keyring("--keyring-passphrase required for keys add".into()))?;
            let backend = store.add(name, &material, passphrase)?;
            println!("stored key {name} ({backend:?})");
        }
        KeysCommand::Show { name } => {
            let material = store.get(name, passphrase)?;
            match material.kind {
                KeyKind::Coreum => {
                    let signer = CoreumKeyringSigner::from_hex_secret(&material.secret, "core")?;
                    println!("{}", signer.account_id());
                }
                KeyKind::Xrpl => {
                    let signer = XrplKeyringSigner::from_family_seed(&material.secret)?;
                    println!("{}", signer.address);
                }
            }
        }
        KeysCommand::List => {
            for name in store.list()? {
                println!("{name}");
            }
        }
        KeysCommand::Delete { name } => {
            store.delete(name)?;
            println!("deleted key {name}");
        }
    }
    Ok(())
}

async fn run_bootstrap_bridge(config: &RelayerConfig, args: &relayer::cli::BootstrapBridgeArgs, passphrase: Option<&str>) -> Result<()> {
    let relayers = args
        .relayers
        .iter()
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let coreum_address = parts.next().unwrap_or_default().to_string();
            let xrpl_address = parts.next().unwrap_or_default().to_string();
            let xrpl_pub_key = parts.next().unwrap_or_default().to_string();
            contract_client::msg::Relayer { coreum_address, xrpl_address, xrpl_pub_key }
        })
        .collect();

    let client = connected_client(config, passphrase).await?;
    let outcome = client.rotate_keys(relayers, args.evidence_threshold).await?;
    println!("bootstrapped bridge relayer set in tx {}", outcome.tx_hash);
    Ok(())
}

async fn run_contract(config: &RelayerConfig, command: &ContractCommand, passphrase: Option<&str>, output: OutputFormat) -> Result<()> {
    let coreum_signer = coreum_signer(config, passphrase).await?;
    let sender = coreum_signer.account_id();
    let client = ContractClient::connect(contract_config(config), coreum_signer).await?;

    match command {
        ContractCommand::Deploy { wasm_path } => {
            let bytes = std::fs::read(wasm_path).map_err(|e| RelayerError::Config(format!("reading {}: {e}", wasm_path.display())))?;
            let outcome = relayer::deploy::store_code(&client, sender, bytes).await?;
            print_output(output, &format!("{outcome:?}"));
        }
        ContractCommand::Instantiate { code_id, init_msg, label, salt } => {
            let outcome = relayer::deploy::instantiate2(
                &client,
                sender.clone(),
                sender,
                *code_id,
                label.clone(),
                init_msg.clone().into_bytes(),
                salt.clone().into_bytes(),
            )
            .await?;
            print_output(output, &format!("{outcome:?}"));
        }
        ContractCommand::Migrate { code_id, migrate_msg } => {
            let contract_address: AccountId = config
                .coreum
                .contract
                .contract_address
                .parse()
                .map_err(|e: cosmrs::ErrorReport| RelayerError::Config(e.to_string()))?;
            let outcome = relayer::deploy::migrate(&client, sender, contract_address, *code_id, migrate_msg.clone().into_bytes()).await?;
            print_output(output, &format!("{outcome:?}"));
        }
    }
    Ok(())
}

async fn run_tokens(config: &RelayerConfig, command: &TokensCommand, passphrase: Option<&str>, output: OutputFormat) -> Result<()> {
    let client = connected_client(config, passphrase).await?;
    let to_state = |s: &TokenStateArg| match s {
        TokenStateArg::Processing => TokenState::Processing,
        TokenStateArg::Inactive => TokenState::Inactive,
        TokenStateArg::Enabled => TokenState::Enabled,
        TokenStateArg::Disabled => TokenState::Disabled,
    };

    match command {
        TokensCommand::RegisterXrpl {
            issuer,
            currency,
            sending_precision,
            max_holding_amount,
            bridging_fee,
            transfer_rate,
            issue_fee_denom,
            issue_fee_amount,
        } => {
            let fee = if issue_fee_amount == "0" {
                vec![]
            } else {
                vec![contract_client::msg::Coin { denom: issue_fee_denom.clone(), amount: issue_fee_amount.clone() }]
            };
            let outcome = client
                .register_xrpl_token(
                    issuer.clone(),
                    currency.clone(),
                    *sending_precision,
                    max_holding_amount.clone(),
                    bridging_fee.clone(),
                    transfer_rate.clone(),
                    fee,
                )
                .await?;
            print_output(output, &format!("{outcome:?}"));
        }
        TokensCommand::RegisterCoreum { denom, decimals, sending_precision, max_holding_amount, bridging_fee } => {
            let outcome = client
                .register_coreum_token(denom.clone(), *decimals, *sending_precision, max_holding_amount.clone(), bridging_fee.clone())
                .await?;
            print_output(output, &format!("{outcome:?}"));
        }
        TokensCommand::UpdateXrpl { issuer, currency, state, sending_precision, bridging_fee, max_holding_amount, transfer_rate } => {
            let outcome = client
                .update_xrpl_token(
                    issuer.clone(),
                    currency.clone(),
                    state.as_ref().map(to_state),
                    *sending_precision,
                    bridging_fee.clone(),
                    max_holding_amount.clone(),
                    transfer_rate.clone(),
                )
                .await?;
            print_output(output, &format!("{outcome:?}"));
        }
        TokensCommand::UpdateCoreum { denom, state, sending_precision, bridging_fee, max_holding_amount } => {
            let outcome = client
                .update_coreum_token(denom.clone(), state.as_ref().map(to_state), *sending_precision, bridging_fee.clone(), max_holding_amount.clone())
                .await?;
            print_output(output, &format!("{outcome:?}"));
        }
        TokensCommand::RecoverXrplRegistration { issuer, currency } => {
            let outcome = client.recover_xrpl_token_registration(issuer.clone(), currency.clone()).await?;
            print_output(output, &format!("{outcome:?}"));
        }
    }
    Ok(())
}

async fn run_ownership(config: &RelayerConfig, command: &OwnershipCommand, passphrase: Option<&str>, output: OutputFormat) -> Result<()> {
    let client = connected_client(config, passphrase).await?;
    let outcome = match command {
        OwnershipCommand::Transfer { new_owner, expiry } => client.transfer_ownership(new_owner.clone(), *expiry).await?,
        OwnershipCommand::Accept => client.accept_ownership().await?,
    };
    print_output(output, &format!("{outcome:?}"));
    Ok(())
}

async fn run_tickets(config: &RelayerConfig, command: &TicketsCommand, passphrase: Option<&str>, output: OutputFormat) -> Result<()> {
    let client = connected_client(config, passphrase).await?;
    let TicketsCommand::Recover { account_sequence, number_of_tickets } = command;
    let outcome = client.recover_tickets(*account_sequence, *number_of_tickets).await?;
    print_output(output, &format!("{outcome:?}"));
    Ok(())
}

async fn run_bridge(config: &RelayerConfig, command: &BridgeCommand, passphrase: Option<&str>, output: OutputFormat) -> Result<()> {
    let client = connected_client(config, passphrase).await?;
    let outcome = match command {
        BridgeCommand::Halt => client.halt_bridge().await?,
        BridgeCommand::Resume => client.resume_bridge().await?,
    };
    print_output(output, &format!("{outcome:?}"));
    Ok(())
}

async fn run_send(config: &RelayerConfig, command: &SendCommand, passphrase: Option<&str>, output: OutputFormat) -> Result<()> {
    match command {
        SendCommand::ToXrpl { recipient, denom, amount, deliver_amount } => {
            let client = connected_client(config, passphrase).await?;
            let funds = vec![contract_client::msg::Coin { denom: denom.clone(), amount: amount.clone() }];
            let outcome = client.send_to_xrpl(recipient.clone(), deliver_amount.clone(), funds).await?;
            print_output(output, &format!("{outcome:?}"));
        }
        SendCommand::ToCoreum { recipient, currency, issuer, amount } => {
            let recipient_account: AccountId = recipient.parse().map_err(|e: cosmrs::ErrorReport| RelayerError::Config(format!("{e}")))?;
            let xrpl_signer = xrpl_signer(config, passphrase).await?;
            let xrpl_client = XrplClient::new(xrpl_http_config(config)).map_err(RelayerError::from)?;
            let info = xrpl_client.account_info(&xrpl_signer.address, None).await.map_err(RelayerError::from)?;

            let amount_decimal: Decimal = amount.parse().map_err(|_| RelayerError::Config(format!("invalid amount {amount}")))?;
            let xrpl_amount = if issuer.is_none() && currency == "XRP" {
                let drops = (amount_decimal * Decimal::from(1_000_000u32))
                    .to_u64()
                    .ok_or_else(|| RelayerError::Config("amount overflows drops".into()))?;
                xrpl_client::binary::Amount::Native(drops)
            } else {
                xrpl_client::binary::Amount::Issued {
                    value: amount_decimal,
                    currency: currency.clone(),
                    issuer: issuer.clone().unwrap_or_default(),
                }
            };

            let tx = xrpl_client::binary::UnsignedTransaction {
                account: xrpl_signer.address.clone(),
                fee_drops: 10,
                sequence: info.account_data.Sequence,
                ticket_sequence: None,
                flags: xrpl_client::binary::TF_FULLY_CANONICAL_SIG,
                data: xrpl_client::binary::TxData::Payment {
                    amount: xrpl_amount,
                    destination: recipient.clone(),
                    destination_tag: None,
                    memos: vec![relayer::memo::encode_recipient_memo(&recipient_account)],
                },
            };
            let public_key = xrpl_signer.public_key_bytes()?;
            let blob = tx.single_signing_blob(&public_key).map_err(RelayerError::from)?;
            let signature = xrpl_signer.sign(&blob)?;
            let signed = tx.assemble_signed(&public_key, &signature).map_err(RelayerError::from)?;
            let result = xrpl_client.submit(&hex::encode_upper(signed)).await.map_err(RelayerError::from)?;
            print_output(output, &format!("{result:?}"));
        }
    }
    Ok(())
}

async fn run_query(config: &RelayerConfig, command: &QueryCommand, output: OutputFormat) -> Result<()> {
    let client = connected_client(config, None).await?;

    match command {
        QueryCommand::Config => print_output(output, &format!("{:?}", client.config().await?)),
        QueryCommand::Ownership => print_output(output, &format!("{:?}", client.ownership().await?)),
        QueryCommand::AvailableTickets => print_output(output, &format!("{:?}", client.available_tickets().await?)),
        QueryCommand::PendingOperations => print_output(output, &format!("{:?}", client.pending_operations().await?)),
        QueryCommand::XrplTokens => print_output(output, &format!("{:?}", client.xrpl_tokens(None, None).await?)),
        QueryCommand::CoreumTokens => print_output(output, &format!("{:?}", client.coreum_tokens(None, None).await?)),
        QueryCommand::XrplToken { issuer, currency } => print_output(output, &format!("{:?}", client.xrpl_token(issuer, currency).await?)),
        QueryCommand::CoreumToken { denom } => print_output(output, &format!("{:?}", client.coreum_token(denom).await?)),
        QueryCommand::FeesCollected => print_output(output, &format!("{:?}", client.fees_collected().await?)),
        QueryCommand::ProcessedTx { hash } => print_output(output, &format!("{:?}", client.processed_tx(hash).await?)),
        QueryCommand::ProhibitedRecipients => print_output(output, &format!("{:?}", client.prohibited_xrpl_recipients().await?)),
        QueryCommand::PendingRefunds { address } => print_output(output, &format!("{:?}", client.pending_refunds(address).await?)),
    }
    Ok(())
}
