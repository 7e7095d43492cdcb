use camino::{Utf8Path, Utf8PathBuf};

use crate::{
    constants::{Meter, Second},
    graph::WeightingPolicy,
};

/// Default output directory, relative to the working directory.
pub const DEFAULT_GRAPH_DIR: &str = "app/data/graphs";

/// File name of the "no contacts" sentinel, inside the output directory.
pub const NO_TILES_FILE: &str = "no_tiles_from_data.png";

/// Where a run writes its files, and how they are named.
///
/// | output            | file name                               |
/// |-------------------|-----------------------------------------|
/// | graph             | `<ds>ds_<dt>dt_<policy>.gml`            |
/// | hot-zone graph    | `<ds>ds_<dt>dt_hot_zones.gml`           |
/// | contact log       | `<ds>ds_<dt>dt_<policy>_contacts.csv`   |
/// | hot-zone log      | `<ds>ds_<dt>dt_hot_zones_contacts.csv`  |
/// | sentinel          | `no_tiles_from_data.png` (never written) |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: Utf8PathBuf,
}

impl OutputLayout {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        OutputLayout { dir: dir.into() }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    fn stem(ds: Meter, dt: Second) -> String {
        format!("{ds}ds_{dt}dt")
    }

    pub fn graph_path(&self, ds: Meter, dt: Second, policy: WeightingPolicy) -> Utf8PathBuf {
        self.dir.join(format!("{}_{policy}.gml", Self::stem(ds, dt)))
    }

    pub fn hot_zones_path(&self, ds: Meter, dt: Second) -> Utf8PathBuf {
        self.dir.join(format!("{}_hot_zones.gml", Self::stem(ds, dt)))
    }

    /// Contact log sitting next to `graph_path`.
    pub fn contact_log_path(graph_path: &Utf8Path) -> Utf8PathBuf {
        let stem = graph_path.file_stem().unwrap_or("graph");
        graph_path.with_file_name(format!("{stem}_contacts.csv"))
    }

    pub fn sentinel_path(&self) -> Utf8PathBuf {
        self.dir.join(NO_TILES_FILE)
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        OutputLayout::new(DEFAULT_GRAPH_DIR)
    }
}
