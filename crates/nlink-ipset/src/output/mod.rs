//! Text and JSON rendering of ipset results.
//!
//! Text output follows the layout of `ipset list`.

use std::io::Write;

use crate::ipset::consts::*;
use crate::ipset::{Entry, Family, SetResult};

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Print set headers only, no members.
    pub terse: bool,
    /// Pretty print (for JSON).
    pub pretty: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

fn write_json<W: Write>(
    w: &mut W,
    json: &serde_json::Value,
    opts: &OutputOptions,
) -> std::io::Result<()> {
    if opts.pretty {
        serde_json::to_writer_pretty(&mut *w, json)?;
    } else {
        serde_json::to_writer(&mut *w, json)?;
    }
    writeln!(w)
}

/// Trait for types that can be printed.
pub trait Printable {
    /// Print as plain text.
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> std::io::Result<()>;

    /// Convert to JSON value.
    fn to_json(&self, opts: &OutputOptions) -> serde_json::Value;

    /// Print in the specified format.
    fn print<W: Write>(
        &self,
        w: &mut W,
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> std::io::Result<()> {
        match format {
            OutputFormat::Text => self.print_text(w, opts),
            OutputFormat::Json => write_json(w, &self.to_json(opts), opts),
        }
    }
}

/// Trait for collections of printable items.
pub trait PrintableList {
    /// The item type.
    type Item: Printable;

    /// Get the items.
    fn items(&self) -> &[Self::Item];

    /// Print all items as text, separated by blank lines.
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> std::io::Result<()> {
        for (i, item) in self.items().iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            item.print_text(w, opts)?;
        }
        Ok(())
    }

    /// Convert to JSON array.
    fn to_json(&self, opts: &OutputOptions) -> serde_json::Value {
        serde_json::Value::Array(self.items().iter().map(|item| item.to_json(opts)).collect())
    }

    /// Print in the specified format.
    fn print<W: Write>(
        &self,
        w: &mut W,
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> std::io::Result<()> {
        match format {
            OutputFormat::Text => self.print_text(w, opts),
            OutputFormat::Json => write_json(w, &self.to_json(opts), opts),
        }
    }
}

impl PrintableList for Vec<SetResult> {
    type Item = SetResult;

    fn items(&self) -> &[SetResult] {
        self
    }
}

/// Creation flags, in `ipset list` spelling.
fn cadt_flag_names(flags: u32) -> Vec<&'static str> {
    [
        (IPSET_FLAG_WITH_COUNTERS, "counters"),
        (IPSET_FLAG_WITH_COMMENT, "comment"),
        (IPSET_FLAG_WITH_SKBINFO, "skbinfo"),
        (IPSET_FLAG_WITH_FORCEADD, "forceadd"),
    ]
    .into_iter()
    .filter(|(bit, _)| flags & bit != 0)
    .map(|(_, name)| name)
    .collect()
}

fn family_name(family: u8) -> String {
    Family::from_u8(family)
        .map(|f| f.name().to_string())
        .unwrap_or_else(|| family.to_string())
}

impl SetResult {
    /// The `Header:` line of `ipset list`.
    pub fn header_line(&self) -> String {
        let mut parts = vec![format!("family {}", family_name(self.family))];
        if let (Some(from), Some(to)) = (self.ip_from, self.ip_to) {
            parts.push(format!("range {}-{}", from, to));
        }
        if let (Some(from), Some(to)) = (self.port_from, self.port_to) {
            parts.push(format!("range {}-{}", from, to));
        }
        if self.hash_size != 0 {
            parts.push(format!("hashsize {}", self.hash_size));
        }
        if self.max_elements != 0 {
            parts.push(format!("maxelem {}", self.max_elements));
        }
        if let Some(netmask) = self.netmask {
            parts.push(format!("netmask {}", netmask));
        }
        if let Some(bitmask) = self.bitmask {
            parts.push(format!("bitmask {}", bitmask));
        }
        if let Some(markmask) = self.markmask {
            parts.push(format!("markmask {:#010x}", markmask));
        }
        if let Some(size) = self.size {
            parts.push(format!("size {}", size));
        }
        if let Some(timeout) = self.timeout {
            parts.push(format!("timeout {}", timeout));
        }
        parts.extend(cadt_flag_names(self.cadt_flags).into_iter().map(String::from));
        if let Some(bucket_size) = self.bucket_size {
            parts.push(format!("bucketsize {}", bucket_size));
        }
        if let Some(initval) = self.initval {
            parts.push(format!("initval {:#010x}", initval));
        }
        parts.join(" ")
    }
}

impl Printable for SetResult {
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> std::io::Result<()> {
        writeln!(w, "Name: {}", self.set_name)?;
        writeln!(w, "Type: {}", self.type_name)?;
        writeln!(w, "Revision: {}", self.revision)?;
        writeln!(w, "Header: {}", self.header_line())?;
        writeln!(w, "Size in memory: {}", self.size_in_memory)?;
        writeln!(w, "References: {}", self.references)?;
        writeln!(w, "Number of entries: {}", self.num_entries)?;
        if opts.terse {
            return Ok(());
        }
        writeln!(w, "Members:")?;
        for entry in &self.entries {
            entry.print_text(w, opts)?;
        }
        Ok(())
    }

    fn to_json(&self, opts: &OutputOptions) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "name": self.set_name,
            "type": self.type_name,
            "revision": self.revision,
            "family": family_name(self.family),
            "references": self.references,
            "memsize": self.size_in_memory,
            "entries": self.num_entries,
        });

        if self.hash_size != 0 {
            obj["hashsize"] = serde_json::json!(self.hash_size);
        }
        if self.max_elements != 0 {
            obj["maxelem"] = serde_json::json!(self.max_elements);
        }
        if let Some(timeout) = self.timeout {
            obj["timeout"] = serde_json::json!(timeout);
        }
        if let Some(bucket_size) = self.bucket_size {
            obj["bucketsize"] = serde_json::json!(bucket_size);
        }
        if let Some(initval) = self.initval {
            obj["initval"] = serde_json::json!(initval);
        }
        if let Some(netmask) = self.netmask {
            obj["netmask"] = serde_json::json!(netmask);
        }
        if let Some(markmask) = self.markmask {
            obj["markmask"] = serde_json::json!(markmask);
        }
        if let Some(size) = self.size {
            obj["size"] = serde_json::json!(size);
        }
        let flags = cadt_flag_names(self.cadt_flags);
        if !flags.is_empty() {
            obj["flags"] = serde_json::json!(flags);
        }
        if !opts.terse {
            obj["members"] = serde_json::Value::Array(
                self.entries.iter().map(|e| e.to_json(opts)).collect(),
            );
        }

        obj
    }
}

impl Printable for Entry {
    fn print_text<W: Write>(&self, w: &mut W, _opts: &OutputOptions) -> std::io::Result<()> {
        writeln!(w, "{}", self)
    }

    fn to_json(&self, _opts: &OutputOptions) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "elem": self.set.to_string(),
        });

        if let Some(timeout) = self.timeout {
            obj["timeout"] = serde_json::json!(timeout);
        }
        if let Some(packets) = self.packets {
            obj["packets"] = serde_json::json!(packets);
        }
        if let Some(bytes) = self.bytes {
            obj["bytes"] = serde_json::json!(bytes);
        }
        if let Some(ref comment) = self.comment {
            obj["comment"] = serde_json::json!(comment);
        }
        if let Some(mark) = self.skbmark {
            obj["skbmark"] = serde_json::json!(format!(
                "{:#x}/{:#x}",
                mark >> 32,
                mark & 0xffff_ffff
            ));
        }
        if let Some(prio) = self.skbprio {
            obj["skbprio"] = serde_json::json!(format!("{}:{}", prio >> 16, prio & 0xffff));
        }
        if let Some(queue) = self.skbqueue {
            obj["skbqueue"] = serde_json::json!(queue);
        }
        if self
            .cadt_flags
            .is_some_and(|flags| flags & IPSET_FLAG_NOMATCH != 0)
        {
            obj["nomatch"] = serde_json::json!(true);
        }

        obj
    }
}
