use alloy::primitives::Address;
use anyhow::anyhow;
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Args, Parser, Subcommand};

/// Swap CLI
///
/// Reads balances, allowances and quotes from Uniswap V2 style routers and executes
/// slippage-bounded swaps. Results are printed as JSON on stdout, logs go to stderr.
#[derive(Parser, PartialEq, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    global_args: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn args(&self) -> GlobalArgs {
        self.global_args.clone()
    }

    pub fn command(&self) -> Command {
        self.command.clone()
    }
}

#[derive(Subcommand, Clone, PartialEq, Debug)]
pub enum Command {
    /// Prints the balance of an account.
    Balance(BalanceArgs),
    /// Prints how much of an account's tokens a spender may move.
    Allowance(AllowanceArgs),
    /// Quotes a trade without executing it.
    Quote(TradeArgs),
    /// Executes a swap.
    Swap(SwapArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Chains configuration file
    #[clap(long, env = "SWAP_CONFIG", default_value = "./swap.yaml")]
    pub config: String,

    /// Chain to operate on
    #[clap(long, default_value = "1")]
    pub chain_id: u64,

    /// The RPC URL to connect to the node. Takes precedence over the chain's rpc_url.
    #[clap(env = "RPC_URL", long, hide_env_values = true)]
    pub rpc_url: Option<String>,

    /// Log at debug level. Ignored if RUST_LOG is set.
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct BalanceArgs {
    /// Token symbol, address or the native symbol
    #[clap(long)]
    pub token: String,

    /// Account to read the balance of
    #[clap(long)]
    pub owner: Address,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AllowanceArgs {
    /// Token symbol or address
    #[clap(long)]
    pub token: String,

    /// Owner of the tokens
    #[clap(long)]
    pub owner: Address,

    /// Defaults to the chain's router
    #[clap(long)]
    pub spender: Option<Address>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TradeArgs {
    /// Token to sell. Selling the native symbol routes through the wrapped native token.
    #[clap(long = "from", alias = "from-token")]
    pub from_token: String,

    /// Token to buy
    #[clap(long = "to", alias = "to-token")]
    pub to_token: String,

    /// Intermediate tokens, in order
    #[clap(long, value_delimiter = ',')]
    pub via: Vec<String>,

    /// Amount to sell, in human units of the sold token (e.g. 10.5)
    #[clap(long)]
    pub amount: String,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SwapArgs {
    #[clap(flatten)]
    pub trade: TradeArgs,

    /// Maximum accepted output shortfall relative to the quote, in percent
    #[clap(long, default_value = "0.5")]
    pub slippage: String,

    /// Seconds from now after which the swap must not execute
    #[clap(long, default_value = "1200")]
    pub deadline: u64,

    /// Account expected to sign the swap. Defaults to the key's address.
    #[clap(long)]
    pub wallet_address: Option<Address>,

    /// Hex encoded private key of the signing account
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
}

impl SwapArgs {
    /// The absolute deadline, `deadline` seconds after `now`.
    pub fn deadline_after(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, anyhow::Error> {
        i64::try_from(self.deadline)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| anyhow!("Deadline of {} seconds from now is out of range", self.deadline))
    }
}
