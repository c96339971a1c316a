//! High-level ipset operations.

use tracing::debug;

use super::command::{Command, Family};
use super::consts::*;
use super::diagnostics::Diagnostics;
use super::entry::Entry;
use super::errno::IpsetErrorKind;
use super::request::IpsetRequest;
use super::result::{SetResult, decode_dump};
use crate::netlink::message::split_message;
use crate::netlink::{Attr, Connection, Error, Result, Transport};

/// Settings shared by every request of an [`IpSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Protocol version announced in every request.
    pub protocol: u8,
    /// Family used when a request carries no address of its own.
    pub family: Family,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protocol: IPSET_PROTOCOL,
            family: Family::Inet,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn family(mut self, family: Family) -> Self {
        self.family = family;
        self
    }
}

/// Parameters of a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Keep an existing set of the same name instead of failing.
    pub replace: bool,
    /// Default element timeout in seconds.
    pub timeout: Option<u32>,
    /// `IPSET_FLAG_WITH_*` bits.
    pub cadt_flags: u32,
    pub hash_size: Option<u32>,
    pub max_elements: Option<u32>,
    /// Overrides the configured family.
    pub family: Option<Family>,
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn with_counters(mut self) -> Self {
        self.cadt_flags |= IPSET_FLAG_WITH_COUNTERS;
        self
    }

    pub fn with_comments(mut self) -> Self {
        self.cadt_flags |= IPSET_FLAG_WITH_COMMENT;
        self
    }

    pub fn with_skbinfo(mut self) -> Self {
        self.cadt_flags |= IPSET_FLAG_WITH_SKBINFO;
        self
    }

    /// Evict a random element instead of failing when the set is full.
    pub fn forceadd(mut self) -> Self {
        self.cadt_flags |= IPSET_FLAG_WITH_FORCEADD;
        self
    }

    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = Some(size);
        self
    }

    pub fn max_elements(mut self, max: u32) -> Self {
        self.max_elements = Some(max);
        self
    }

    pub fn family(mut self, family: Family) -> Self {
        self.family = Some(family);
        self
    }

    fn data(&self) -> Vec<Attr> {
        let mut attrs = Vec::new();
        if let Some(timeout) = self.timeout {
            attrs.push(Attr::u32_be(IPSET_ATTR_TIMEOUT, timeout));
        }
        if self.cadt_flags != 0 {
            attrs.push(Attr::u32_be(IPSET_ATTR_CADT_FLAGS, self.cadt_flags));
        }
        if let Some(size) = self.hash_size {
            attrs.push(Attr::u32_be(IPSET_ATTR_HASHSIZE, size));
        }
        if let Some(max) = self.max_elements {
            attrs.push(Attr::u32_be(IPSET_ATTR_MAXELEM, max));
        }
        attrs
    }
}

/// ipset client over a [`Transport`].
///
/// Each call performs exactly one request/reply exchange (two for
/// [`create`](Self::create)). Kernel errors in the ipset private range come
/// back as [`Error::Ipset`]; other errno values pass through unchanged.
///
/// ```ignore
/// use nlink_ipset::{CreateOptions, Entry, IpSet, Set};
///
/// let ipset = IpSet::connect()?;
/// ipset.create("blocklist", "hash:ip", CreateOptions::new().timeout(600)).await?;
/// ipset.add("blocklist", &Entry::new(Set::ip("192.0.2.7".parse()?))).await?;
/// for entry in ipset.list("blocklist").await?.entries {
///     println!("{}", entry);
/// }
/// ```
pub struct IpSet<T = Connection> {
    transport: T,
    config: Config,
    diagnostics: Option<Box<dyn Diagnostics>>,
}

impl IpSet<Connection> {
    /// Open a netfilter socket with the default configuration.
    pub fn connect() -> Result<Self> {
        Ok(Self::new(Connection::new()?))
    }
}

impl<T: Transport> IpSet<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: Config::default(),
            diagnostics: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Some(Box::new(diagnostics));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn request(&self, command: Command) -> Result<IpsetRequest> {
        self.request_for(command, self.config.family)
    }

    fn request_for(&self, command: Command, family: Family) -> Result<IpsetRequest> {
        IpsetRequest::new(command, self.config.protocol, family)
    }

    async fn execute(&self, request: IpsetRequest, set: &str) -> Result<Vec<Vec<u8>>> {
        let command = request.command();
        let message = request.finish();
        debug!(
            command = %command,
            set,
            len = message.len(),
            "ipset request"
        );
        if let Some(diagnostics) = &self.diagnostics {
            diagnostics.on_request(command, &message);
        }
        self.transport
            .request(message)
            .await
            .map_err(|e| map_kernel_error(e, command))
    }

    fn observe(&self, command: Command, result: &SetResult) {
        if let Some(diagnostics) = &self.diagnostics {
            diagnostics.on_result(command, result);
        }
    }

    async fn query(&self, request: IpsetRequest, set: &str) -> Result<SetResult> {
        let command = request.command();
        let messages = self.execute(request, set).await?;
        let result = SetResult::from_payloads(payloads(&messages)?)?;
        self.observe(command, &result);
        Ok(result)
    }

    /// Protocol version spoken by the kernel.
    pub async fn protocol(&self) -> Result<u8> {
        let result = self.query(self.request(Command::Protocol)?, "").await?;
        Ok(result.protocol)
    }

    /// Revision range the kernel supports for a set type.
    pub async fn type_info(&self, type_name: &str, family: Family) -> Result<SetResult> {
        let request = self
            .request_for(Command::Type, family)?
            .type_name(type_name)?;
        self.query(request, "").await
    }

    /// Create a set, at the newest revision the kernel has for its type.
    pub async fn create(&self, name: &str, type_name: &str, options: CreateOptions) -> Result<()> {
        let family = options.family.unwrap_or(self.config.family);
        let info = self.type_info(type_name, family).await?;

        let request = self
            .request_for(Command::Create, family)?
            .set_name(name)?
            .type_name(type_name)?
            .revision(info.revision)?
            .data(options.data())?
            .exclusive_unless(options.replace);
        self.execute(request, name).await?;
        Ok(())
    }

    pub async fn destroy(&self, name: &str) -> Result<()> {
        let request = self.request(Command::Destroy)?.set_name(name)?;
        self.execute(request, name).await?;
        Ok(())
    }

    pub async fn flush(&self, name: &str) -> Result<()> {
        let request = self.request(Command::Flush)?.set_name(name)?;
        self.execute(request, name).await?;
        Ok(())
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let request = self
            .request(Command::Rename)?
            .set_name(from)?
            .set_name2(to)?;
        self.execute(request, from).await?;
        Ok(())
    }

    /// Exchange the contents of two sets of the same type.
    pub async fn swap(&self, a: &str, b: &str) -> Result<()> {
        let request = self.request(Command::Swap)?.set_name(a)?.set_name2(b)?;
        self.execute(request, a).await?;
        Ok(())
    }

    /// Metadata of one set, without its elements.
    pub async fn header(&self, name: &str) -> Result<SetResult> {
        let request = self.request(Command::Header)?.set_name(name)?;
        self.query(request, name).await
    }

    /// One set with all of its elements.
    pub async fn list(&self, name: &str) -> Result<SetResult> {
        let request = self.request(Command::List)?.set_name(name)?;
        self.query(request, name).await
    }

    /// Every set with all of its elements.
    pub async fn list_all(&self) -> Result<Vec<SetResult>> {
        let messages = self.execute(self.request(Command::List)?, "").await?;
        let results = decode_dump(payloads(&messages)?)?;
        for result in &results {
            self.observe(Command::List, result);
        }
        Ok(results)
    }

    pub async fn add(&self, name: &str, entry: &Entry) -> Result<()> {
        self.element(Command::Add, name, entry).await
    }

    pub async fn del(&self, name: &str, entry: &Entry) -> Result<()> {
        self.element(Command::Del, name, entry).await
    }

    /// Whether the set contains `entry`.
    pub async fn test(&self, name: &str, entry: &Entry) -> Result<bool> {
        match self.element(Command::Test, name, entry).await {
            Ok(()) => Ok(true),
            Err(Error::Ipset {
                kind: IpsetErrorKind::ElementNotFound,
                ..
            }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn element(&self, command: Command, name: &str, entry: &Entry) -> Result<()> {
        entry.validate()?;
        let family = entry.set.family().unwrap_or(self.config.family);
        let request = self
            .request_for(command, family)?
            .set_name(name)?
            .attr(entry.encode_data())?;
        let request = match command {
            Command::Add | Command::Del => request.exclusive_unless(entry.replace),
            _ => request,
        };
        self.execute(request, name).await?;
        Ok(())
    }
}

fn payloads(messages: &[Vec<u8>]) -> Result<Vec<&[u8]>> {
    messages
        .iter()
        .map(|m| split_message(m).map(|(_, payload)| payload))
        .collect()
}

/// Turn private-range kernel errors into [`Error::Ipset`].
fn map_kernel_error(err: Error, command: Command) -> Error {
    match err {
        Error::Kernel { errno, message } => match IpsetErrorKind::from_errno(errno, command) {
            Some(kind) => Error::Ipset { kind, errno },
            None => Error::Kernel { errno, message },
        },
        other => other,
    }
}
