use std::io::{self, Write};
use crate::patterns::{number_groups, Cluster};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format '{}': expected text or json", other)),
        }
    }
}

/// One `group;line` record per member, a single-space line after each group.
pub fn write_text<W: Write>(out: &mut W, ranked: &[Cluster]) -> io::Result<()> {
    for (i, cluster) in ranked.iter().enumerate() {
        let group = i + 1;
        for line in cluster.lines() {
            writeln!(out, "{};{}", group, line)?;
        }
        writeln!(out, " ")?;
    }
    Ok(())
}

pub fn write_json<W: Write>(out: &mut W, ranked: &[Cluster]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &number_groups(ranked))?;
    writeln!(out)
}

pub fn write_clusters<W: Write>(out: &mut W, ranked: &[Cluster], format: Format) -> io::Result<()> {
    match format {
        Format::Text => write_text(out, ranked),
        Format::Json => write_json(out, ranked),
    }
}
