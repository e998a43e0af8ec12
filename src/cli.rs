// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storefleet::model::StoreStatus;
use storefleet::types::{StoreEngine, StoreId, StorePlan};

#[derive(Parser)]
#[command(name = "storefleet")]
#[command(about = "Provision and tear down cluster-hosted e-commerce stores")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (default: discovered in the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output (only final result)
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Output as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new storefleet.yml configuration file
    Init {
        /// Base domain that store hostnames are created under
        #[arg(long)]
        base_domain: Option<String>,

        /// Overwrite existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Create a store and provision it
    Create {
        /// Store name: 3-50 lowercase letters, digits, and hyphens
        name: String,

        /// Store engine (woocommerce, medusa)
        #[arg(short, long, default_value = "woocommerce")]
        engine: StoreEngine,

        /// Sizing plan (basic, standard, premium)
        #[arg(short, long, default_value = "basic")]
        plan: StorePlan,

        /// Human-friendly store title
        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Who requested the store (default: user@host)
        #[arg(long)]
        actor: Option<String>,
    },

    /// Delete a store and tear down its release
    Delete {
        /// Store identifier
        id: StoreId,
    },

    /// Show a store and its latest job
    Get {
        /// Store identifier
        id: StoreId,

        /// Also query the release status from the cluster
        #[arg(long)]
        release: bool,
    },

    /// List stores, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        limit: u32,

        /// Only stores in this status
        #[arg(long)]
        status: Option<StoreStatus>,

        /// Only stores of this engine
        #[arg(long)]
        engine: Option<StoreEngine>,
    },

    /// Show the audit events of a store
    Events {
        /// Store identifier
        id: StoreId,
    },

    /// Check that the cluster tooling and the state file are usable
    Ready,

    /// Fail stale jobs and resume pending provisioning left by earlier runs
    Reconcile,
}
