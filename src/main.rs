//! taskloot CLI entry point.
//!
//! Wires the config, database handle, rng, and payout rule together and
//! dispatches subcommands. All output is pretty-printed JSON on stdout;
//! logs go to stderr.

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use taskloot::cli::{
    Cli, CleanupArgs, Command, LotteryAction, PrizeAction, TaskAction, WalletAction,
};
use taskloot::config::Config;
use taskloot::db::Database;
use taskloot::payout::TextScanPayout;
use tracing_subscriber::EnvFilter;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "taskloot=debug"
    } else {
        "taskloot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    if let Some(database) = &cli.database {
        config.store.db_path = database.into();
    }
    config.ensure_db_dir()?;

    let db = Database::open(&config.store.db_path)?;
    let mut rng = rand::thread_rng();

    match cli.command {
        Command::Task { action } => match action {
            TaskAction::Add {
                title,
                description,
                weight,
            } => {
                print_json(&db.create_task(&title, description.as_deref(), weight)?)?;
            }
            TaskAction::List { status } => {
                print_json(&db.list_tasks(status.map(Into::into))?)?;
            }
            TaskAction::Update {
                id,
                title,
                description,
                weight,
            } => {
                print_json(&db.update_task(id, title.as_deref(), description.as_deref(), weight)?)?;
            }
            TaskAction::Remove { id } => {
                db.delete_task(id)?;
                print_json(&json!({ "deleted": id }))?;
            }
            TaskAction::Draw => print_json(&db.draw_task(&mut rng)?)?,
            TaskAction::Start { id, time_limit } => {
                print_json(&db.start_task(id, time_limit)?)?;
            }
            TaskAction::Complete { id } => print_json(&db.complete_task(id)?)?,
            TaskAction::Archive { id } => print_json(&db.archive_task(id)?)?,
            TaskAction::Reactivate { id } => print_json(&db.reactivate_task(id)?)?,
        },

        Command::Prize { action } => match action {
            PrizeAction::Add {
                name,
                description,
                weight,
                money,
            } => {
                print_json(&db.create_prize(
                    &name,
                    description.as_deref(),
                    weight,
                    money.is_some(),
                    money,
                )?)?;
            }
            PrizeAction::List { all } => print_json(&db.list_prizes(!all)?)?,
            PrizeAction::Update {
                id,
                name,
                description,
                weight,
                money,
            } => {
                let (is_money, money_amount) = match money {
                    Some(amount) => (Some(true), Some(Some(amount))),
                    None => (None, None),
                };
                print_json(&db.update_prize(
                    id,
                    name.as_deref(),
                    description.as_deref(),
                    weight,
                    is_money,
                    money_amount,
                )?)?;
            }
            PrizeAction::Remove { id } => print_json(&db.deactivate_prize(id)?)?,
        },

        Command::Lottery { action } => match action {
            LotteryAction::Draw {
                task_id,
                hours_exceeded,
            } => {
                print_json(&db.draw_lottery(task_id, hours_exceeded, &mut rng, &TextScanPayout)?)?;
            }
            LotteryAction::History { limit } => {
                let limit = limit.unwrap_or(config.store.history_limit);
                print_json(&db.lottery_history(limit)?)?;
            }
        },

        Command::Wallet { action } => match action {
            WalletAction::Balance => {
                print_json(&json!({ "balance": db.wallet_balance()? }))?;
            }
            WalletAction::Credit {
                amount,
                description,
            } => {
                print_json(&json!({ "balance": db.wallet_credit(amount, &description, None)? }))?;
            }
            WalletAction::Debit {
                amount,
                description,
            } => {
                print_json(&json!({ "balance": db.wallet_debit(amount, &description)? }))?;
            }
            WalletAction::Transactions { limit } => {
                let limit = limit.unwrap_or(config.store.history_limit);
                print_json(&db.wallet_transactions(limit)?)?;
            }
        },

        Command::Cleanup(CleanupArgs {
            retention_days,
            expiring,
        }) => {
            let retention = retention_days.unwrap_or(config.retention.archive_days);
            if expiring {
                print_json(&db.expiring_archived_tasks(retention, config.retention.warn_days)?)?;
            } else {
                let purged = db.purge_archived_tasks(retention)?;
                print_json(&json!({ "purged": purged }))?;
            }
        }
    }

    Ok(())
}
