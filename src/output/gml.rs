//! # GML writer
//!
//! Writes a [`ContactGraph`] in the Graph Modelling Language layout produced by networkx
//! (`write_gml`), so downstream tooling can read it back with `read_gml`:
//!
//! ```text
//! graph [
//!   node [
//!     id 0
//!     label "000"
//!   ]
//!   edge [
//!     source 0
//!     target 1
//!     weight 1
//!     distance 0
//!     timedelta 0
//!   ]
//! ]
//! ```
//!
//! Node ids are positions in insertion order; labels are the entity ids. Non-finite numbers are
//! written as `NAN`, `INF` or `-INF`.
use std::{fs::File, io::{BufWriter, Write}};

use camino::Utf8Path;

use crate::{colocate_errors::ColocateError, graph::ContactGraph};

fn gml_real(v: f64) -> String {
    if v.is_nan() {
        "NAN".into()
    } else if v.is_infinite() {
        if v > 0.0 { "INF".into() } else { "-INF".into() }
    } else {
        v.to_string()
    }
}

fn gml_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Write `graph` to `writer`.
pub fn write_gml<W: Write>(mut writer: W, graph: &ContactGraph) -> Result<(), ColocateError> {
    writeln!(writer, "graph [")?;
    for (id, label) in graph.nodes().enumerate() {
        writeln!(writer, "  node [")?;
        writeln!(writer, "    id {id}")?;
        writeln!(writer, "    label {}", gml_string(label))?;
        writeln!(writer, "  ]")?;
    }
    for (source, target, attrs) in graph.edge_endpoints() {
        writeln!(writer, "  edge [")?;
        writeln!(writer, "    source {source}")?;
        writeln!(writer, "    target {target}")?;
        writeln!(writer, "    weight {}", gml_real(attrs.weight))?;
        writeln!(writer, "    distance {}", gml_real(attrs.distance))?;
        writeln!(writer, "    timedelta {}", gml_real(attrs.time_delta))?;
        writeln!(writer, "  ]")?;
    }
    writeln!(writer, "]")?;
    writer.flush()?;
    Ok(())
}

/// [`write_gml`] into a new file at `path`, creating parent directories.
pub fn write_gml_file(path: &Utf8Path, graph: &ContactGraph) -> Result<(), ColocateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_gml(BufWriter::new(File::create(path)?), graph)
}
