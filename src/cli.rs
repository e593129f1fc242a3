//! CLI command definitions for taskloot.
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::types::TaskStatus;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Task status filter for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    Pending,
    InProgress,
    Completed,
    Archived,
}

impl From<StatusFilter> for TaskStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Pending => TaskStatus::Pending,
            StatusFilter::InProgress => TaskStatus::InProgress,
            StatusFilter::Completed => TaskStatus::Completed,
            StatusFilter::Archived => TaskStatus::Archived,
        }
    }
}

/// Gamified task tracker: weighted draws, timed completion, prize lottery,
/// and a wallet ledger.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage and work tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Manage the prize pool
    Prize {
        #[command(subcommand)]
        action: PrizeAction,
    },

    /// Draw prizes and browse draw history
    Lottery {
        #[command(subcommand)]
        action: LotteryAction,
    },

    /// Inspect and move wallet funds
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },

    /// Purge archived tasks past the retention window
    Cleanup(CleanupArgs),
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// Add a task to the pending pool
    Add {
        title: String,
        /// Optional longer description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Relative draw weight (>= 1)
        #[arg(short, long, default_value_t = 1)]
        weight: i64,
    },

    /// List tasks
    List {
        /// Only show tasks with this status
        #[arg(short, long, value_enum)]
        status: Option<StatusFilter>,
    },

    /// Update a task's title, description, or weight
    Update {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short = 'D', long)]
        description: Option<String>,
        #[arg(short, long)]
        weight: Option<i64>,
    },

    /// Delete a task permanently
    Remove { id: i64 },

    /// Draw one pending task by weight
    Draw,

    /// Start a pending task with a time limit in minutes
    Start { id: i64, time_limit: i64 },

    /// Complete an in-progress task; reports hours exceeded
    Complete { id: i64 },

    /// Archive a task
    Archive { id: i64 },

    /// Put a completed or archived task back in the pending pool
    Reactivate { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum PrizeAction {
    /// Add a prize to the pool
    Add {
        name: String,
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Relative draw weight (>= 1)
        #[arg(short, long, default_value_t = 1)]
        weight: i64,
        /// Fixed currency payout; flags the prize as a money prize
        #[arg(short, long)]
        money: Option<f64>,
    },

    /// List prizes (active only by default)
    List {
        /// Include soft-deleted prizes
        #[arg(short, long)]
        all: bool,
    },

    /// Update a prize
    Update {
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short = 'D', long)]
        description: Option<String>,
        #[arg(short, long)]
        weight: Option<i64>,
        /// Set a fixed currency payout
        #[arg(short, long)]
        money: Option<f64>,
    },

    /// Soft-delete a prize
    Remove { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum LotteryAction {
    /// Draw a prize for a completed task
    Draw {
        task_id: i64,
        /// Whole hours of overtime from the completion report
        #[arg(default_value_t = 0)]
        hours_exceeded: i64,
    },

    /// Show draw history
    History {
        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum WalletAction {
    /// Show the current balance
    Balance,

    /// Credit the wallet
    Credit {
        amount: f64,
        #[arg(short = 'D', long, default_value = "")]
        description: String,
    },

    /// Debit the wallet
    Debit {
        amount: f64,
        #[arg(short = 'D', long, default_value = "")]
        description: String,
    },

    /// Show the transaction ledger
    Transactions {
        /// Maximum number of rows
        #[arg(short, long)]
        limit: Option<i64>,
    },
}

#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Override the configured retention window in days
    #[arg(short, long)]
    pub retention_days: Option<i64>,

    /// List archived tasks nearing expiry instead of purging
    #[arg(short, long)]
    pub expiring: bool,
}
