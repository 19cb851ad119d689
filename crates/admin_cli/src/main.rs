use std::error::Error;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{Currency, CurrencyReport, Engine, EngineError, MoneyMinor, TransactionPatch, User, Wallet};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "quaderno_admin")]
#[command(about = "Admin utilities for Quaderno (users, wallets, transactions, shares, reports)")]
struct Cli {
    /// Database connection string. Overrides `settings.toml` when set.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(UserCmd),
    Wallet(WalletCmd),
    Tx(TxCmd),
    Share(ShareCmd),
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct UserCmd {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Register(UserRegisterArgs),
}

#[derive(Args, Debug)]
struct UserRegisterArgs {
    /// Opaque external identity, e.g. a Telegram user id.
    #[arg(long)]
    telegram_id: String,
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct WalletCmd {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    Create(WalletCreateArgs),
}

#[derive(Args, Debug)]
struct WalletCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "EUR", value_parser = parse_currency)]
    currency: Currency,
}

#[derive(Args, Debug)]
struct TxCmd {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    Add(TxAddArgs),
    List(TxListArgs),
    Edit(TxEditArgs),
    Delete(TxDeleteArgs),
}

#[derive(Args, Debug)]
struct TxAddArgs {
    /// Telegram id of the owner.
    #[arg(long)]
    user: String,
    #[arg(long)]
    wallet: String,
    /// Signed decimal amount; negative for expenses, e.g. "-12,50".
    #[arg(long)]
    amount: String,
    #[arg(long)]
    description: String,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value = "")]
    category: String,
    /// Day the transaction occurred, as DD/MM/YYYY. Defaults to now.
    #[arg(long, value_parser = parse_occurred_at)]
    date: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct TxListArgs {
    /// Telegram id of the viewer.
    #[arg(long)]
    user: String,
    #[arg(long, default_value_t = 0)]
    offset: u64,
    #[arg(long, default_value_t = 10)]
    limit: u64,
}

#[derive(Args, Debug)]
struct TxEditArgs {
    /// Telegram id of the owner.
    #[arg(long)]
    user: String,
    #[arg(long)]
    id: Uuid,
    /// New signed decimal amount.
    #[arg(long)]
    amount: Option<String>,
    /// Scale used to parse `--amount` when the wallet is left unchanged.
    #[arg(long, default_value = "EUR", value_parser = parse_currency)]
    currency: Currency,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Move the transaction to this wallet.
    #[arg(long)]
    wallet: Option<String>,
    #[arg(long, value_parser = parse_occurred_at)]
    date: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct TxDeleteArgs {
    /// Telegram id of the owner.
    #[arg(long)]
    user: String,
    #[arg(long)]
    id: Uuid,
}

#[derive(Args, Debug)]
struct ShareCmd {
    #[command(subcommand)]
    command: ShareCommand,
}

#[derive(Subcommand, Debug)]
enum ShareCommand {
    Grant(ShareEdgeArgs),
    Revoke(ShareEdgeArgs),
    List(ShareListArgs),
}

#[derive(Args, Debug)]
struct ShareEdgeArgs {
    /// Telegram id of the user whose history is shared.
    #[arg(long)]
    owner: String,
    /// Telegram id of the user receiving (or losing) read access.
    #[arg(long)]
    viewer: String,
}

#[derive(Args, Debug)]
struct ShareListArgs {
    #[arg(long)]
    user: String,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Telegram id of the viewer.
    #[arg(long)]
    user: String,
    /// Period expression, e.g. "2025", "03/2025", "*/2025" or "01/03/2025".
    #[arg(long)]
    period: String,
    /// Restrict the report to this owner's transactions only.
    #[arg(long)]
    owner: Option<String>,
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::try_from(raw).map_err(|err| err.to_string())
}

fn parse_occurred_at(raw: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .map_err(|err| format!("invalid date {raw}: {err}"))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn resolve_user(
    engine: &Engine,
    telegram_id: &str,
) -> Result<User, Box<dyn Error + Send + Sync>> {
    match engine.user_by_telegram_id(telegram_id).await {
        Ok(user) => Ok(user),
        Err(EngineError::NotFound(_)) => {
            eprintln!("user not found: {telegram_id}");
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

async fn resolve_wallet(
    engine: &Engine,
    name: &str,
) -> Result<Wallet, Box<dyn Error + Send + Sync>> {
    match engine.wallet_by_name(name).await {
        Ok(wallet) => Ok(wallet),
        Err(EngineError::NotFound(_)) => {
            eprintln!("wallet not found: {name}");
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

fn parse_amount(raw: &str, currency: Currency) -> MoneyMinor {
    match MoneyMinor::parse(raw, currency) {
        Ok(amount) => amount,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    }
}

fn format_average(average_minor: f64, currency: Currency) -> String {
    let scale = 10_f64.powi(i32::from(currency.minor_units()));
    format!(
        "{:.prec$}",
        average_minor / scale,
        prec = currency.minor_units() as usize
    )
}

fn print_report(report: &CurrencyReport) {
    let currency = report.currency;
    println!("== {currency} ==");
    println!(
        "  transactions: {}  total: {}  income: {}  expense: {}  average: {}",
        report.transaction_count,
        MoneyMinor::new(report.total_minor).format(currency),
        MoneyMinor::new(report.income_minor).format(currency),
        MoneyMinor::new(report.expense_minor).format(currency),
        format_average(report.average_minor, currency),
    );

    for (key, bucket) in &report.overall {
        println!(
            "  {key}: {} ({} records)",
            MoneyMinor::new(bucket.total_minor).format(currency),
            bucket.count
        );
    }

    if !report.ranking.is_empty() {
        println!("  categories:");
        for (position, rank) in report.ranking.iter().enumerate() {
            let label = if rank.category.is_empty() {
                "(none)"
            } else {
                rank.category.as_str()
            };
            println!(
                "    {}. {label}: {} ({} records, {:.1}%)",
                position + 1,
                MoneyMinor::new(rank.total_minor).format(currency),
                rank.count,
                rank.percentage
            );
        }
    }

    if !report.by_wallet.is_empty() {
        println!("  wallets:");
        for ((key, wallet), bucket) in &report.by_wallet {
            println!(
                "    {wallet} @ {key}: {} ({} records)",
                MoneyMinor::new(bucket.total_minor).format(currency),
                bucket.count
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(settings.log.clone())
        .init();

    let database_url = cli
        .database_url
        .unwrap_or_else(|| settings.database.url.clone());
    let db = connect_db(&database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(UserCmd {
            command: UserCommand::Register(args),
        }) => {
            let user = engine
                .get_or_create_user(&args.telegram_id, &args.username)
                .await?;
            println!("registered user: {} ({})", user.label(), user.id);
        }
        Command::Wallet(WalletCmd {
            command: WalletCommand::Create(args),
        }) => {
            let wallet = engine.get_or_create_wallet(&args.name, args.currency).await?;
            println!("created wallet: {} [{}] ({})", wallet.name, wallet.currency, wallet.id);
        }
        Command::Tx(TxCmd {
            command: TxCommand::Add(args),
        }) => {
            let user = resolve_user(&engine, &args.user).await?;
            let wallet = resolve_wallet(&engine, &args.wallet).await?;
            let amount = parse_amount(&args.amount, wallet.currency);
            let occurred_at = args.date.unwrap_or_else(Utc::now);

            let tx = engine
                .add_transaction(
                    user.id,
                    wallet.id,
                    amount.minor(),
                    &args.description,
                    &args.location,
                    &args.category,
                    occurred_at,
                )
                .await?;
            println!(
                "recorded {} on {}: {}",
                tx.id,
                tx.occurred_at.format("%d/%m/%Y"),
                amount.format(wallet.currency)
            );
        }
        Command::Tx(TxCmd {
            command: TxCommand::List(args),
        }) => {
            let user = resolve_user(&engine, &args.user).await?;
            let page = engine
                .list_transactions(user.id, args.offset, args.limit)
                .await?;

            println!(
                "offset {} (prev: {}, next: {}), amounts in minor units",
                page.offset, page.has_prev, page.has_next
            );
            for item in &page.items {
                let marker = if item.is_own { "own" } else { "shared" };
                println!(
                    "{}  {}  {:>12}  {}  {}  [{} / {marker}]",
                    item.transaction.id,
                    item.transaction.occurred_at.format("%d/%m/%Y"),
                    item.transaction.amount_minor,
                    item.transaction.category,
                    item.transaction.description,
                    item.owner.label(),
                );
            }
        }
        Command::Tx(TxCmd {
            command: TxCommand::Edit(args),
        }) => {
            let user = resolve_user(&engine, &args.user).await?;

            let mut patch = TransactionPatch {
                description: args.description,
                location: args.location,
                category: args.category,
                occurred_at: args.date,
                ..TransactionPatch::default()
            };
            let mut amount_currency = args.currency;
            if let Some(name) = &args.wallet {
                let wallet = resolve_wallet(&engine, name).await?;
                amount_currency = wallet.currency;
                patch.wallet_id = Some(wallet.id);
            }
            if let Some(raw) = &args.amount {
                patch.amount_minor = Some(parse_amount(raw, amount_currency).minor());
            }

            let tx = engine.update_transaction(user.id, args.id, patch).await?;
            println!("updated {}", tx.id);
        }
        Command::Tx(TxCmd {
            command: TxCommand::Delete(args),
        }) => {
            let user = resolve_user(&engine, &args.user).await?;
            engine.delete_transaction(user.id, args.id).await?;
            println!("deleted {}", args.id);
        }
        Command::Share(ShareCmd {
            command: ShareCommand::Grant(args),
        }) => {
            let owner = resolve_user(&engine, &args.owner).await?;
            let viewer = resolve_user(&engine, &args.viewer).await?;
            engine.grant_access(owner.id, viewer.id).await?;
            println!("{} now shares with {}", owner.label(), viewer.label());
        }
        Command::Share(ShareCmd {
            command: ShareCommand::Revoke(args),
        }) => {
            let owner = resolve_user(&engine, &args.owner).await?;
            let viewer = resolve_user(&engine, &args.viewer).await?;
            engine.revoke_access(owner.id, viewer.id).await?;
            println!("{} no longer shares with {}", owner.label(), viewer.label());
        }
        Command::Share(ShareCmd {
            command: ShareCommand::List(args),
        }) => {
            let user = resolve_user(&engine, &args.user).await?;
            let viewers = engine.viewers_of(user.id).await?;
            let owners = engine.owners_visible_to(user.id).await?;

            println!("shares with:");
            for viewer in &viewers {
                println!("  {}", viewer.label());
            }
            println!("can see:");
            for owner in &owners {
                println!("  {}", owner.label());
            }
        }
        Command::Report(args) => {
            let user = resolve_user(&engine, &args.user).await?;
            let reports = match args.owner {
                Some(owner) => {
                    let owner = resolve_user(&engine, &owner).await?;
                    engine
                        .report_for_owner(user.id, owner.id, &args.period)
                        .await?
                }
                None => engine.report(user.id, &args.period).await?,
            };

            if reports.is_empty() {
                println!("no transactions in {}", args.period);
            }
            for report in &reports {
                print_report(report);
            }
        }
    }

    Ok(())
}
