//! `meraki-dispatch`: browse the operation catalog and inspect the
//! effective dispatch configuration.
//!
//! Runs entirely offline: the dispatcher is built over the embedded catalog
//! with a client that refuses every invocation.
//!
//! Build: `cargo build --bin meraki-dispatch --features cli`

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_json::Value;

use meraki_dispatch::classify::{self, Pattern};
use meraki_dispatch::registry::{SectionDeclaration, catalog};
use meraki_dispatch::{
    ClientError, Dispatcher, MethodDescriptor, MethodListing, Parameters, VendorClient, config,
};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "meraki-dispatch")]
#[command(version = meraki_dispatch::PKG_VERSION)]
#[command(about = "Meraki dispatch catalog browser")]
struct Args {
    /// config file (default: ~/.meraki-dispatch/config.toml)
    #[arg(long, env = "MERAKI_DISPATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// list catalog sections
    Sections,
    /// list operations grouped by section
    List {
        /// restrict to one section (e.g. "wireless")
        #[arg(short, long)]
        section: Option<String>,
    },
    /// search operation names and summaries
    Search {
        /// case-insensitive keyword (e.g. "firewall")
        keyword: String,
    },
    /// show one operation's parameters and documentation
    Info {
        /// section name (e.g. "networks")
        section: String,
        /// operation name (e.g. "getNetworkClients")
        method: String,
    },
    /// show how an operation name is classified
    Classify {
        /// operation name
        name: String,
    },
    /// print the effective configuration (secrets redacted)
    Config,
}

// ── offline client ──────────────────────────────────────────────────

struct CatalogClient {
    sections: Vec<SectionDeclaration>,
}

#[async_trait]
impl VendorClient for CatalogClient {
    fn sections(&self) -> Vec<SectionDeclaration> {
        self.sections.clone()
    }

    async fn invoke(
        &self,
        section: &str,
        method: &str,
        _parameters: &Parameters,
    ) -> Result<Value, ClientError> {
        Err(ClientError::Unavailable(format!(
            "{section}.{method}: the catalog browser performs no vendor calls"
        )))
    }
}

fn build_dispatcher(config_path: Option<&Path>) -> Result<Dispatcher, Box<dyn std::error::Error>> {
    let config = config::file::load(config_path)?;
    let client = CatalogClient {
        sections: catalog::embedded_sections()?,
    };
    Ok(Dispatcher::builder()
        .client(Arc::new(client))
        .config(config)
        .build()?)
}

// ── output ──────────────────────────────────────────────────────────

fn print_listing(methods: &[MethodDescriptor]) {
    let listing = MethodListing::group(methods);
    for (section, names) in &listing.sections {
        println!("{section} ({})", names.len());
        for name in names {
            println!("  {name}");
        }
    }
    println!("total: {}", listing.total_methods);
}

fn print_search(keyword: &str, methods: &[MethodDescriptor]) {
    if methods.is_empty() {
        println!("no operations match '{keyword}'");
        return;
    }
    for m in methods {
        println!("{}.{} [{}] {}", m.section, m.name, m.classification, m.summary);
    }
    println!("{} match(es)", methods.len());
}

fn print_classification(name: &str) {
    match classify::matching_rule(name) {
        Some(rule) => {
            let why = match rule.pattern {
                Pattern::Prefix(p) => format!("starts with '{p}'"),
                Pattern::Contains(p) => format!("contains '{p}'"),
            };
            println!("{name}: {} ({why})", rule.classification);
        }
        None => println!("{name}: {} (no rule matched)", classify::classify(name)),
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Classify { name } = &args.command {
        print_classification(name);
        return Ok(());
    }

    let dispatcher = build_dispatcher(args.config.as_deref())?;
    match args.command {
        Command::Sections => {
            for section in dispatcher.sections() {
                println!("{section}");
            }
        }
        Command::List { section } => {
            let methods = dispatcher.list_methods(section.as_deref());
            if methods.is_empty() {
                if let Some(section) = section {
                    return Err(format!(
                        "unknown section '{section}' (available: {})",
                        dispatcher.sections().join(", ")
                    )
                    .into());
                }
            }
            print_listing(&methods);
        }
        Command::Search { keyword } => {
            print_search(&keyword, &dispatcher.search_methods(&keyword));
        }
        Command::Info { section, method } => {
            let descriptor = dispatcher.get_method_info(&section, &method)?;
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&dispatcher.get_config())?);
        }
        Command::Classify { .. } => {}
    }
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

fn main() {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
