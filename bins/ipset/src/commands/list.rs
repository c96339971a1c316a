//! ipset list / header.

use clap::Args;
use nlink_ipset::netlink::Transport;
use nlink_ipset::output::{OutputFormat, OutputOptions, Printable, PrintableList};
use nlink_ipset::IpSet;

#[derive(Args)]
pub struct ListCmd {
    /// Set name; every set when omitted.
    name: Option<String>,

    /// Print set headers only.
    #[arg(short, long)]
    terse: bool,
}

impl ListCmd {
    pub async fn run<T: Transport>(
        &self,
        ipset: &IpSet<T>,
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> anyhow::Result<()> {
        let opts = OutputOptions {
            terse: self.terse || opts.terse,
            ..*opts
        };
        let mut stdout = std::io::stdout().lock();

        match &self.name {
            Some(name) => ipset.list(name).await?.print(&mut stdout, format, &opts)?,
            None => ipset.list_all().await?.print(&mut stdout, format, &opts)?,
        }
        Ok(())
    }
}

pub async fn header<T: Transport>(
    ipset: &IpSet<T>,
    name: &str,
    format: OutputFormat,
    opts: &OutputOptions,
) -> anyhow::Result<()> {
    let opts = OutputOptions {
        terse: true,
        ..*opts
    };
    let result = ipset.header(name).await?;
    result.print(&mut std::io::stdout().lock(), format, &opts)?;
    Ok(())
}
