//! ipset add / del / test.

use clap::Args;
use nlink_ipset::ipset::consts::IPSET_FLAG_NOMATCH;
use nlink_ipset::netlink::Transport;
use nlink_ipset::{Entry, IpSet, Set};

#[derive(Args)]
pub struct ElementCmd {
    /// Set name.
    name: String,

    /// Entry, e.g. 10.0.0.1, 10.0.0.0/8,udp:53 or 00:11:22:33:44:55.
    entry: String,
}

impl ElementCmd {
    /// Parse the entry as the set's own type, so a plain address can be
    /// used with hash:net sets.
    async fn set<T: Transport>(&self, ipset: &IpSet<T>) -> anyhow::Result<Set> {
        let kind = ipset.header(&self.name).await?.set_kind();
        let set = match kind {
            Some(kind) => Set::parse_as(kind, &self.entry)?,
            None => self.entry.parse()?,
        };
        Ok(set)
    }

    pub async fn del<T: Transport>(&self, ipset: &IpSet<T>) -> anyhow::Result<()> {
        let entry = Entry::new(self.set(ipset).await?);
        ipset.del(&self.name, &entry).await?;
        Ok(())
    }

    pub async fn test<T: Transport>(&self, ipset: &IpSet<T>) -> anyhow::Result<()> {
        let entry = Entry::new(self.set(ipset).await?);
        if ipset.test(&self.name, &entry).await? {
            println!("{} is in set {}.", entry.set, self.name);
            Ok(())
        } else {
            anyhow::bail!("{} is NOT in set {}.", entry.set, self.name)
        }
    }
}

#[derive(Args)]
pub struct AddCmd {
    #[command(flatten)]
    element: ElementCmd,

    /// Seconds until the entry expires.
    #[arg(long)]
    timeout: Option<u32>,

    /// Comment stored with the entry.
    #[arg(long)]
    comment: Option<String>,

    /// Exclude this entry from matches of a wider one.
    #[arg(long)]
    nomatch: bool,

    /// Initial packet counter.
    #[arg(long, requires = "bytes")]
    packets: Option<u64>,

    /// Initial byte counter.
    #[arg(long, requires = "packets")]
    bytes: Option<u64>,

    /// Do not fail if the entry already exists.
    #[arg(long)]
    replace: bool,
}

impl AddCmd {
    pub async fn run<T: Transport>(&self, ipset: &IpSet<T>) -> anyhow::Result<()> {
        let mut entry = Entry::new(self.element.set(ipset).await?);
        if let Some(timeout) = self.timeout {
            entry = entry.timeout(timeout);
        }
        if let Some(comment) = &self.comment {
            entry = entry.comment(comment.as_str());
        }
        if self.nomatch {
            entry = entry.cadt_flags(IPSET_FLAG_NOMATCH);
        }
        if let (Some(packets), Some(bytes)) = (self.packets, self.bytes) {
            entry = entry.counters(packets, bytes);
        }
        if self.replace {
            entry = entry.replace();
        }
        ipset.add(&self.element.name, &entry).await?;
        Ok(())
    }
}
