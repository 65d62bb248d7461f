use std::str::FromStr;

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use clap::Parser;
use serde_json::json;
use swap_common::{
    models::{path::Path, swap::SwapRequest, Asset},
    SlippageTolerance,
};
use swap_ethereum::{
    config::{ChainConfig, SwapConfig},
    engine::{BalanceReader, QuoteResolver, SwapExecutor},
    reader::EthereumChainReader,
    submitter::EthereumTransactionSubmitter,
    EthereumRpcClient,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{AllowanceArgs, BalanceArgs, Cli, Command, SwapArgs, TradeArgs};

mod cli;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli: Cli = Cli::parse();
    let global_args = cli.args();
    create_tracing_subscriber(global_args.verbose);

    let config = SwapConfig::from_yaml(&global_args.config)?;
    let chain = config
        .chain(global_args.chain_id)?
        .clone();
    let rpc_url = global_args
        .rpc_url
        .or_else(|| chain.rpc_url.clone())
        .ok_or_else(|| anyhow!("No RPC url given for chain {}", chain.name))?;
    let rpc = EthereumRpcClient::new(&rpc_url)?;
    let block = rpc.get_block_number().await?;
    info!(chain = %chain.name, chain_id = chain.chain_id, block, "Connected to node at {rpc_url}");

    let output = match cli.command() {
        Command::Balance(args) => run_balance(&chain, rpc, args).await?,
        Command::Allowance(args) => run_allowance(&chain, rpc, args).await?,
        Command::Quote(args) => run_quote(&chain, rpc, args).await?,
        Command::Swap(args) => run_swap(chain, rpc, args).await?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn create_tracing_subscriber(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_target(false)
        .compact();
    tracing_subscriber::fmt()
        .event_format(format)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

/// Builds the router path of a trade. A native input is routed through the wrapped native token.
fn trade_path(chain: &ChainConfig, args: &TradeArgs) -> Result<(Path, bool), anyhow::Error> {
    let (first, native_input) = match chain.resolve_asset(&args.from_token)? {
        Asset::Native => (chain.wrapped_native, true),
        Asset::Erc20(address) => (address, false),
    };
    let last = match chain.resolve_asset(&args.to_token)? {
        Asset::Native => {
            bail!("Swapping into the native asset is not supported, use the wrapped token")
        }
        Asset::Erc20(address) => address,
    };

    let mut tokens = vec![first];
    for token in &args.via {
        tokens.push(chain.resolve_token(token)?);
    }
    tokens.push(last);
    Ok((Path::new(tokens)?, native_input))
}

async fn run_balance(
    chain: &ChainConfig,
    rpc: EthereumRpcClient,
    args: BalanceArgs,
) -> Result<serde_json::Value, anyhow::Error> {
    let reader = EthereumChainReader::new(rpc, &chain.native_symbol);
    let balance = BalanceReader::new(&reader)
        .balance(chain.resolve_asset(&args.token)?, args.owner)
        .await?;
    Ok(json!({
        "owner": args.owner,
        "formatted": balance.to_string(),
        "amount": balance.amount.to_string(),
        "token": balance.token,
    }))
}

async fn run_allowance(
    chain: &ChainConfig,
    rpc: EthereumRpcClient,
    args: AllowanceArgs,
) -> Result<serde_json::Value, anyhow::Error> {
    let reader = EthereumChainReader::new(rpc, &chain.native_symbol);
    let spender = args.spender.unwrap_or(chain.router);
    let allowance = BalanceReader::new(&reader)
        .allowance(chain.resolve_token(&args.token)?, args.owner, spender)
        .await?;
    Ok(json!({
        "owner": args.owner,
        "spender": spender,
        "formatted": allowance.to_string(),
        "amount": allowance.amount.to_string(),
        "token": allowance.token,
    }))
}

async fn run_quote(
    chain: &ChainConfig,
    rpc: EthereumRpcClient,
    args: TradeArgs,
) -> Result<serde_json::Value, anyhow::Error> {
    let (path, native_input) = trade_path(chain, &args)?;
    let reader = EthereumChainReader::new(rpc, &chain.native_symbol);
    let balances = BalanceReader::new(&reader);

    let input = if native_input { Asset::Native } else { Asset::Erc20(path.input()) };
    let token_in = balances.token(input).await?;
    let token_out = balances
        .token(Asset::Erc20(path.output()))
        .await?;
    let amount_in = token_in.parse_amount(&args.amount)?;

    let quote = QuoteResolver::new(&reader, chain.router)
        .resolve(&path, amount_in)
        .await?;
    Ok(json!({
        "path": path,
        "amounts": quote.amounts().iter().map(ToString::to_string).collect::<Vec<_>>(),
        "amount_in": token_in.format_amount(quote.amount_in()),
        "amount_out": token_out.format_amount(quote.amount_out()),
        "token_in": token_in.symbol,
        "token_out": token_out.symbol,
    }))
}

async fn run_swap(
    chain: ChainConfig,
    rpc: EthereumRpcClient,
    args: SwapArgs,
) -> Result<serde_json::Value, anyhow::Error> {
    let (path, native_input) = trade_path(&chain, &args.trade)?;
    let slippage = SlippageTolerance::from_str(&args.slippage)?;
    let deadline = args.deadline_after(Utc::now())?;
    let signer =
        PrivateKeySigner::from_str(&args.private_key).context("Failed to parse private key")?;
    let account: Address = args
        .wallet_address
        .unwrap_or_else(|| signer.address());

    let submitter = EthereumTransactionSubmitter::new(rpc.clone(), signer, &chain);
    submitter.verify_chain_id().await?;
    let reader = EthereumChainReader::new(rpc, &chain.native_symbol);
    let executor = SwapExecutor::new(chain, reader, submitter);

    let request = SwapRequest {
        path,
        amount_in: args.trade.amount,
        slippage,
        account,
        deadline,
        native_input,
    };
    match executor.execute(request).await {
        Ok(result) => Ok(json!({ "state": "CONFIRMED", "result": result })),
        Err(failure) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "state": failure.state,
                    "error": failure.source.to_string(),
                    "tx_hash": failure.tx_hash,
                    "approval": failure.approval,
                    "quote": failure.quote,
                }))?
            );
            Err(failure.into())
        }
    }
}
