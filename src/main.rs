use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use eoddata::config::{ENV_BASE_URL, ENV_PASSWORD, ENV_USERNAME};
use eoddata::{ClientConfig, EodDataClient, Period};
use log::warn;
use serde::Serialize;
use std::time::Duration;

/// eoddata - EodData web service client
///
/// Fetch exchanges, quotes and symbol history from EodData and print them as JSON.
///
/// Credentials are read from EOD_DATA_LOGIN and EOD_DATA_PASSWORD unless given
/// on the command line.
///
/// Examples:
///   eoddata exchanges
///   eoddata quotes NASDAQ --date 2024-03-04
///   eoddata history NASDAQ MSFT --start 2024-01-02 --end 2024-01-31 --period w
#[derive(Parser, Debug)]
#[command(author, version = env!("EODDATA_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// EodData username
    #[arg(long, short = 'u', env = ENV_USERNAME, global = true, hide_env_values = true)]
    username: Option<String>,

    /// EodData password
    #[arg(long, short = 'p', env = ENV_PASSWORD, global = true, hide_env_values = true)]
    password: Option<String>,

    /// Web service URL (defaults to http://ws.eoddata.com/data.asmx/)
    #[arg(long, env = ENV_BASE_URL, value_name = "URL", global = true)]
    url: Option<String>,

    /// Relogin attempts per operation before giving up
    #[arg(long, value_name = "N", global = true)]
    max_relogin_depth: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    timeout: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check the credentials and print the masked session token
    Login,

    /// List countries
    Countries,

    /// Print the latest EodData Data Client version
    Version,

    /// List exchanges
    Exchanges,

    /// Show one exchange
    Exchange {
        /// Exchange code, e.g. NASDAQ
        code: String,
    },

    /// Show the end of day quote for a symbol
    Quote { exchange: String, symbol: String },

    /// List quotes for an exchange
    Quotes(QuotesArgs),

    /// Show the price history of a symbol
    History(HistoryArgs),
}

#[derive(clap::Args, Debug)]
struct QuotesArgs {
    exchange: String,

    /// Only these symbols (comma separated)
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["date", "period", "compact"])]
    symbols: Vec<String>,

    /// Quote date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Bar period: 1, 5, 10, 15, 30, h, d, w or m
    #[arg(long, requires = "date")]
    period: Option<Period>,

    /// Use the compact quote format
    #[arg(long, requires = "date")]
    compact: bool,
}

#[derive(clap::Args, Debug)]
struct HistoryArgs {
    exchange: String,
    symbol: String,

    /// First date (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Last date (YYYY-MM-DD) for a ranged history
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Bar period: 1, 5, 10, 15, 30, h, d, w or m
    #[arg(long)]
    period: Option<Period>,
}

impl Cli {
    fn config(&self) -> Result<ClientConfig> {
        let Some(username) = self.username.clone() else {
            bail!("No username given (use --username or {})", ENV_USERNAME);
        };
        let Some(password) = self.password.clone() else {
            bail!("No password given (use --password or {})", ENV_PASSWORD);
        };

        let mut config = ClientConfig::new(username, password);
        if let Some(url) = &self.url {
            config = config.with_base_url(url.clone());
        }
        if let Some(depth) = self.max_relogin_depth {
            config = config.with_max_relogin_depth(depth);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut client =
        EodDataClient::from_config(cli.config()?).context("Failed to create EodData client")?;

    if !client.login().context("Login failed")? {
        if matches!(cli.command, Commands::Login) {
            bail!("Login failed");
        }
        warn!("Login failed, the first request will try again");
    }

    match cli.command {
        Commands::Login => {
            let token = client.token().map(eoddata::client::mask_token);
            println!("Logged in (token {})", token.unwrap_or_default());
        }
        Commands::Countries => print_json(&client.country_list()?)?,
        Commands::Version => println!("{}", client.data_client_latest_version()?),
        Commands::Exchanges => print_json(&client.exchange_list()?)?,
        Commands::Exchange { code } => print_json(
            &client
                .exchange_detail(&code)
                .with_context(|| format!("Failed to get exchange {}", code))?,
        )?,
        Commands::Quote { exchange, symbol } => print_json(
            &client
                .quote_detail(&exchange, &symbol)
                .with_context(|| format!("Failed to get quote for {}:{}", exchange, symbol))?,
        )?,
        Commands::Quotes(args) => quotes(&mut client, args)?,
        Commands::History(args) => history(&mut client, args)?,
    }
    Ok(())
}

fn quotes(client: &mut EodDataClient, args: QuotesArgs) -> Result<()> {
    let context = || format!("Failed to list quotes for {}", args.exchange);

    if !args.symbols.is_empty() {
        let quotes = client
            .quote_list_specific(&args.exchange, args.symbols.as_slice())
            .with_context(context)?;
        return print_json(&quotes);
    }

    match (args.date, args.period, args.compact) {
        (None, _, _) => print_json(&client.quote_list(&args.exchange).with_context(context)?),
        (Some(date), None, false) => print_json(
            &client
                .quote_list_by_date(&args.exchange, date)
                .with_context(context)?,
        ),
        (Some(date), None, true) => print_json(
            &client
                .quote_list_by_date_compact(&args.exchange, date)
                .with_context(context)?,
        ),
        (Some(date), Some(period), false) => print_json(
            &client
                .quote_list_by_date_period(&args.exchange, date, period)
                .with_context(context)?,
        ),
        (Some(date), Some(period), true) => print_json(
            &client
                .quote_list_by_date_period_compact(&args.exchange, date, period)
                .with_context(context)?,
        ),
    }
}

fn history(client: &mut EodDataClient, args: HistoryArgs) -> Result<()> {
    let context = || format!("Failed to get history for {}:{}", args.exchange, args.symbol);

    let quotes = match (args.end, args.period) {
        (Some(end), period) => client.symbol_history_period_by_range(
            &args.exchange,
            &args.symbol,
            args.start,
            end,
            period.unwrap_or_default(),
        ),
        (None, Some(period)) => {
            client.symbol_history_period(&args.exchange, &args.symbol, args.start, period)
        }
        (None, None) => client.symbol_history(&args.exchange, &args.symbol, args.start),
    }
    .with_context(context)?;

    print_json(&quotes)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    run(Cli::parse())
}
