//! # Geolife PLT reader
//!
//! Minimal reader for the Microsoft Research **Geolife** trajectory dataset layout:
//!
//! ```text
//! <root>/
//! ├── 000/Trajectory/20081023025304.plt
//! ├── 000/Trajectory/20081024020959.plt
//! └── 001/Trajectory/...
//! ```
//!
//! Each PLT file starts with 6 header lines, followed by comma-separated rows
//! `lat, lon, 0, altitude_ft, serial_days, date, time`. Only the first five columns are read;
//! the serial day count is converted to Unix seconds by
//! [`TrajectorySample::from_raw`].
//!
//! ## Ordering
//! -----------------
//! Entity directories (matched with `^\d{3}$`) are visited in sorted order and PLT files are
//! read in sorted file-name order, one [`Segment`] per file, rows kept in file order. Geolife
//! file names are start timestamps, so segments come out chronological; rows inside a file are
//! *not* re-sorted.
//!
//! ## Error Handling
//! -----------------
//! Unparsable rows fail the whole read with [`ColocateError::MalformedSample`] (path, line,
//! reason). Non-UTF-8 paths are reported as [`ColocateError::Utf8PathError`].
use std::{fs::File, io::Read};

use camino::{Utf8Path, Utf8PathBuf};
use csv::ReaderBuilder;
use regex::Regex;
use tracing::{debug, info};

use crate::{
    colocate_errors::ColocateError,
    samples::{Segment, TrajectorySample},
    trajectories::TrajectoryStore,
};

/// Number of header lines preceding the data rows of a PLT file.
pub const PLT_HEADER_LINES: usize = 6;

/// Parse one PLT stream into a [`Segment`].
///
/// Arguments
/// -----------------
/// * `reader`: the PLT content, header included.
/// * `label`: name given to the segment (and used in error messages).
///
/// Return
/// ----------
/// * The segment, or [`ColocateError::MalformedSample`] on the first unparsable row.
pub fn read_plt<R: Read>(reader: R, label: &str) -> Result<Segment, ColocateError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for record in rdr.records().skip(PLT_HEADER_LINES) {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        if record.len() < 5 {
            return Err(ColocateError::MalformedSample {
                path: label.to_string(),
                line,
                reason: format!("expected at least 5 columns, found {}", record.len()),
            });
        }

        let mut raw = [0.0_f64; 5];
        for (i, value) in raw.iter_mut().enumerate() {
            *value = record[i]
                .parse::<f64>()
                .map_err(|e| ColocateError::MalformedSample {
                    path: label.to_string(),
                    line,
                    reason: format!("column {i} ({:?}): {e}", &record[i]),
                })?;
        }
        samples.push(TrajectorySample::from_raw(raw));
    }

    Ok(Segment::new(label, samples))
}

/// Read a single PLT file from disk.
pub fn read_plt_file(path: &Utf8Path) -> Result<Segment, ColocateError> {
    let label = path.file_name().unwrap_or(path.as_str());
    let segment = read_plt(File::open(path)?, label).map_err(|e| match e {
        ColocateError::MalformedSample { line, reason, .. } => ColocateError::MalformedSample {
            path: path.to_string(),
            line,
            reason,
        },
        other => other,
    })?;
    Ok(segment)
}

fn sorted_entries(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ColocateError> {
    let mut paths = Vec::new();
    for entry in dir.read_dir_utf8().map_err(|e| map_utf8_io(dir, e))? {
        let entry = entry.map_err(|e| map_utf8_io(dir, e))?;
        paths.push(entry.into_path());
    }
    paths.sort();
    Ok(paths)
}

fn map_utf8_io(dir: &Utf8Path, err: std::io::Error) -> ColocateError {
    if err.kind() == std::io::ErrorKind::InvalidData {
        ColocateError::Utf8PathError(format!("{dir}: {err}"))
    } else {
        ColocateError::IoError(err)
    }
}

impl TrajectoryStore {
    /// Load every entity of a Geolife `Data` directory.
    ///
    /// Arguments
    /// -----------------
    /// * `root`: directory holding one `<ddd>/Trajectory/` folder per entity.
    ///
    /// Return
    /// ----------
    /// * A store with one trajectory per entity directory (possibly empty when the entity has no
    ///   PLT file), or the first I/O / parse error encountered.
    pub fn from_geolife_dir(root: &Utf8Path) -> Result<Self, ColocateError> {
        let mut store = TrajectoryStore::new();
        store.add_from_geolife_dir(root)?;
        Ok(store)
    }

    /// Same as [`TrajectoryStore::from_geolife_dir`], appending into an existing store.
    pub fn add_from_geolife_dir(&mut self, root: &Utf8Path) -> Result<(), ColocateError> {
        let entity_pattern = Regex::new(r"^\d{3}$").map_err(|e| {
            ColocateError::InvalidConfiguration(format!("entity directory pattern: {e}"))
        })?;

        for entity_dir in sorted_entries(root)? {
            let Some(entity) = entity_dir.file_name() else {
                continue;
            };
            if !entity_pattern.is_match(entity) || !entity_dir.is_dir() {
                continue;
            }

            let entity = entity.to_string();
            self.trajectories
                .entry(entity.clone())
                .or_insert_with(|| crate::samples::Trajectory::new(entity.clone()));

            let traj_dir = entity_dir.join("Trajectory");
            if !traj_dir.is_dir() {
                debug!(entity = %entity, "no Trajectory folder");
                continue;
            }

            for plt in sorted_entries(&traj_dir)? {
                if plt.extension() != Some("plt") {
                    continue;
                }
                let segment = read_plt_file(&plt)?;
                let span = segment.epoch_span();
                debug!(
                    entity = %entity,
                    file = %plt,
                    samples = segment.len(),
                    first = ?span.map(|(first, _)| first),
                    last = ?span.map(|(_, last)| last),
                    "segment loaded"
                );
                self.insert_segment(&entity, segment);
            }
        }

        info!(
            root = %root,
            entities = self.number_of_entities(),
            samples = self.total_samples(),
            "geolife dataset loaded"
        );
        Ok(())
    }
}
