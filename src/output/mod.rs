//! # Run outputs
//!
//! Files produced by a graph pass:
//!
//! * [`gml`](crate::output::gml) – the weighted contact graph, networkx-compatible GML.
//! * [`contact_log`](crate::output::contact_log) – one CSV row per contact used.
//! * [`layout`](crate::output::layout) – output directory and file naming.
pub mod contact_log;
pub mod gml;
pub mod layout;

pub use contact_log::{write_contact_log, ContactLogSink, ContactRecord};
pub use gml::{write_gml, write_gml_file};
pub use layout::OutputLayout;
