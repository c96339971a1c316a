//! Set-level commands: protocol and create.

use clap::Args;
use nlink_ipset::netlink::Transport;
use nlink_ipset::output::{OutputFormat, OutputOptions};
use nlink_ipset::{CreateOptions, IpSet};

pub async fn protocol<T: Transport>(
    ipset: &IpSet<T>,
    format: OutputFormat,
    opts: &OutputOptions,
) -> anyhow::Result<()> {
    let version = ipset.protocol().await?;
    match format {
        OutputFormat::Text => println!("Kernel protocol version: {}", version),
        OutputFormat::Json => {
            let json = serde_json::json!({ "protocol": version });
            if opts.pretty {
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                println!("{}", json);
            }
        }
    }
    Ok(())
}

#[derive(Args)]
pub struct CreateCmd {
    /// Set name.
    name: String,

    /// Set type, e.g. hash:ip or hash:net,port.
    #[arg(value_name = "TYPE")]
    type_name: String,

    /// Default timeout of entries, in seconds.
    #[arg(long)]
    timeout: Option<u32>,

    /// Keep per-entry packet and byte counters.
    #[arg(long)]
    with_counters: bool,

    /// Allow comments on entries.
    #[arg(long)]
    with_comments: bool,

    /// Allow skbinfo mappings on entries.
    #[arg(long)]
    with_skbinfo: bool,

    /// Evict a random entry when the set is full.
    #[arg(long)]
    forceadd: bool,

    /// Initial hash size.
    #[arg(long)]
    hashsize: Option<u32>,

    /// Maximum number of entries.
    #[arg(long)]
    maxelem: Option<u32>,

    /// Do not fail if the set already exists.
    #[arg(long)]
    replace: bool,
}

impl CreateCmd {
    fn options(&self) -> CreateOptions {
        let mut options = CreateOptions::new();
        if let Some(timeout) = self.timeout {
            options = options.timeout(timeout);
        }
        if self.with_counters {
            options = options.with_counters();
        }
        if self.with_comments {
            options = options.with_comments();
        }
        if self.with_skbinfo {
            options = options.with_skbinfo();
        }
        if self.forceadd {
            options = options.forceadd();
        }
        if let Some(size) = self.hashsize {
            options = options.hash_size(size);
        }
        if let Some(max) = self.maxelem {
            options = options.max_elements(max);
        }
        if self.replace {
            options = options.replace();
        }
        options
    }

    pub async fn run<T: Transport>(&self, ipset: &IpSet<T>) -> anyhow::Result<()> {
        ipset
            .create(&self.name, &self.type_name, self.options())
            .await?;
        Ok(())
    }
}
