//! ipset command - manage kernel IP sets over netlink.

mod commands;

use clap::{Parser, Subcommand};
use nlink_ipset::ipset::TracingDiagnostics;
use nlink_ipset::output::{OutputFormat, OutputOptions};
use nlink_ipset::{Config, Family, IpSet};

#[derive(Parser)]
#[command(name = "ipset", version, about = "IP set administration tool")]
struct Cli {
    /// Use IPv6 for requests that carry no address.
    #[arg(short = '6', long)]
    ipv6: bool,

    /// Output JSON.
    #[arg(short = 'j', long)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long)]
    pretty: bool,

    /// Log requests and replies.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the kernel's ipset protocol version.
    Protocol,

    /// Create a set.
    #[command(visible_alias = "n")]
    Create(commands::set::CreateCmd),

    /// Destroy a set.
    #[command(visible_alias = "x")]
    Destroy {
        /// Set name.
        name: String,
    },

    /// Remove every entry of a set.
    #[command(visible_alias = "f")]
    Flush {
        /// Set name.
        name: String,
    },

    /// Rename a set.
    #[command(visible_alias = "e")]
    Rename {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },

    /// Swap the contents of two sets.
    #[command(visible_alias = "w")]
    Swap {
        /// First set.
        a: String,
        /// Second set.
        b: String,
    },

    /// List one set, or every set when no name is given.
    #[command(visible_alias = "l")]
    List(commands::list::ListCmd),

    /// Show the header of a set.
    Header {
        /// Set name.
        name: String,
    },

    /// Add an entry to a set.
    #[command(visible_alias = "a")]
    Add(commands::element::AddCmd),

    /// Delete an entry from a set.
    #[command(visible_alias = "d")]
    Del(commands::element::ElementCmd),

    /// Test whether an entry is in a set.
    #[command(visible_alias = "t")]
    Test(commands::element::ElementCmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let config = Config::new().family(if cli.ipv6 {
        Family::Inet6
    } else {
        Family::Inet
    });

    let mut ipset = IpSet::connect()?.with_config(config);
    if cli.debug {
        ipset = ipset.with_diagnostics(TracingDiagnostics);
    }

    let opts = OutputOptions {
        pretty: cli.pretty,
        ..Default::default()
    };

    let result = match cli.command {
        Command::Protocol => commands::set::protocol(&ipset, format, &opts).await,
        Command::Create(cmd) => cmd.run(&ipset).await,
        Command::Destroy { name } => ipset.destroy(&name).await.map_err(Into::into),
        Command::Flush { name } => ipset.flush(&name).await.map_err(Into::into),
        Command::Rename { from, to } => ipset.rename(&from, &to).await.map_err(Into::into),
        Command::Swap { a, b } => ipset.swap(&a, &b).await.map_err(Into::into),
        Command::List(cmd) => cmd.run(&ipset, format, &opts).await,
        Command::Header { name } => commands::list::header(&ipset, &name, format, &opts).await,
        Command::Add(cmd) => cmd.run(&ipset).await,
        Command::Del(cmd) => cmd.del(&ipset).await,
        Command::Test(cmd) => cmd.test(&ipset).await,
    };

    if let Err(e) = result {
        eprintln!("ipset: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
