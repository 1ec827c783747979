use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr};
use serde::Serialize;
use split_router::logging::init_logging;
use split_router::networks::BOTANIX_MAINNET_CHAIN_ID;
use split_router::{CallOptions, NetworkRegistry, RouterConfig, SplitRouter, SwapRequest, Token};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find split swap routes across DEX liquidity sources", long_about = None)]
struct Cli {
    /// Routing API base URL
    #[arg(long, env = "SPLIT_ROUTER_API_URL")]
    api_url: Option<String>,

    /// Routing API key sent as the authen-key header
    #[arg(long, env = "SPLIT_ROUTER_AUTHEN_KEY", hide_env_values = true)]
    authen_key: Option<String>,

    /// JSON file with network deployments, replaces the built-in networks
    #[arg(long)]
    networks: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the full split route for a pair
    Route(PairArgs),
    /// Fetch only the output amount and route count
    Quote(PairArgs),
    /// Route every request of a JSON array file concurrently
    Batch {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct PairArgs {
    /// Source token address
    #[arg(long)]
    src: String,

    #[arg(long, default_value_t = 18)]
    src_decimals: u8,

    #[arg(long, default_value = "")]
    src_symbol: String,

    /// Destination token address
    #[arg(long)]
    dst: String,

    #[arg(long, default_value_t = 18)]
    dst_decimals: u8,

    #[arg(long, default_value = "")]
    dst_symbol: String,

    /// Human readable input amount, e.g. 1.5
    #[arg(short, long)]
    amount: String,

    #[arg(long, default_value_t = BOTANIX_MAINNET_CHAIN_ID)]
    chain_id: u64,

    /// Force the number of parts instead of selecting it
    #[arg(long)]
    parts: Option<u32>,
}

impl PairArgs {
    fn into_request(self) -> SwapRequest {
        let src = Token::new(self.src, self.src_symbol, "", self.src_decimals, self.chain_id);
        let dst = Token::new(self.dst, self.dst_symbol, "", self.dst_decimals, self.chain_id);
        let request = SwapRequest::new(self.amount, src, dst, self.chain_id);
        match self.parts {
            Some(parts) => request.with_part_count(parts),
            None => request,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let mut config = RouterConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if let Some(key) = cli.authen_key.filter(|k| !k.is_empty()) {
        config.api.authen_key = Some(key);
    }

    let mut builder = SplitRouter::builder(config);
    if let Some(path) = &cli.networks {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read networks file {}", path.display()))?;
        let networks = NetworkRegistry::from_json(&raw)
            .wrap_err_with(|| format!("invalid networks file {}", path.display()))?;
        info!(chains = ?networks.chain_ids(), "Loaded network deployments");
        builder = builder.networks(networks);
    }
    let router = builder.build()?;

    let options = CallOptions::default();
    match cli.command {
        Command::Route(pair) => {
            let result = router.get_swap_route(&pair.into_request(), &options).await?;
            print_json(&result)?;
        }
        Command::Quote(pair) => {
            let quote = router.get_quote(&pair.into_request(), &options).await?;
            print_json(&quote)?;
        }
        Command::Batch { file } => {
            let raw = std::fs::read_to_string(&file)
                .wrap_err_with(|| format!("failed to read batch file {}", file.display()))?;
            let requests: Vec<SwapRequest> =
                serde_json::from_str(&raw).wrap_err("batch file must be a JSON array of swap requests")?;
            info!(requests = requests.len(), "Running batch");
            print_json(&router.get_swap_routes(&requests, &options).await)?;
        }
    }

    Ok(())
}
