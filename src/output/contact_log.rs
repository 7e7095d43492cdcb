//! # Contact-point log
//!
//! Tabular record of every contact used to build a graph, one CSV row per contact, header
//! included. Columns, in order:
//!
//! ```text
//! entityId1, entityId2, ds, dt, tileKey, distanceApart, timeDiff, lat1, lat2, lon1, lon2, t1, t2
//! ```
//!
//! `tileKey` is the text form of the tile (`lat…_lon…_t…`); it is empty for contacts found by the
//! exhaustive scan, which are not tied to a tile.
use std::{fs::File, io::Write};

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::{
    colocate_errors::ColocateError,
    constants::{Degree, EntityId, Meter, Second},
    contacts::{ContactEvent, TileContact},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub entity_id1: EntityId,
    pub entity_id2: EntityId,
    pub ds: Meter,
    pub dt: Second,
    pub tile_key: String,
    pub distance_apart: Meter,
    pub time_diff: Second,
    pub lat1: Degree,
    pub lat2: Degree,
    pub lon1: Degree,
    pub lon2: Degree,
    pub t1: Second,
    pub t2: Second,
}

impl ContactRecord {
    pub fn from_tile_contact(c: &TileContact<'_>) -> Self {
        ContactRecord {
            entity_id1: c.a.entity.clone(),
            entity_id2: c.b.entity.clone(),
            ds: c.a.ds,
            dt: c.a.dt,
            tile_key: c.key.to_string(),
            distance_apart: c.distance(),
            time_diff: c.time_delta(),
            lat1: c.a.lat,
            lat2: c.b.lat,
            lon1: c.a.lon,
            lon2: c.b.lon,
            t1: c.a.t,
            t2: c.b.t,
        }
    }

    pub fn from_event(ev: &ContactEvent, ds: Meter, dt: Second) -> Self {
        let (a, b) = (ev.sample_a(), ev.sample_b());
        ContactRecord {
            entity_id1: ev.entity_a().to_string(),
            entity_id2: ev.entity_b().to_string(),
            ds,
            dt,
            tile_key: String::new(),
            distance_apart: ev.distance(),
            time_diff: ev.time_delta(),
            lat1: a.lat,
            lat2: b.lat,
            lon1: a.lon,
            lon2: b.lon,
            t1: a.t,
            t2: b.t,
        }
    }
}

fn log_writer<W: Write>(writer: W) -> Result<csv::Writer<W>, ColocateError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(CONTACT_LOG_HEADER)?;
    Ok(wtr)
}

/// Write `records` as CSV to `writer`.
///
/// The header row is written even when `records` is empty.
pub fn write_contact_log<W: Write>(writer: W, records: &[ContactRecord]) -> Result<(), ColocateError> {
    let mut wtr = log_writer(writer)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Contact log written row by row while a graph is folded.
///
/// The file (and its parent directories) is created on the first record, so a run without
/// contacts leaves nothing on disk. Without a path, records are only counted.
#[derive(Debug)]
pub struct ContactLogSink {
    path: Option<Utf8PathBuf>,
    writer: Option<csv::Writer<File>>,
    count: usize,
}

impl ContactLogSink {
    /// Sink writing to `path`.
    pub fn to_file(path: Utf8PathBuf) -> Self {
        ContactLogSink {
            path: Some(path),
            writer: None,
            count: 0,
        }
    }

    /// Sink counting records without writing them.
    pub fn counting() -> Self {
        ContactLogSink {
            path: None,
            writer: None,
            count: 0,
        }
    }

    pub fn push(&mut self, record: &ContactRecord) -> Result<(), ColocateError> {
        self.count += 1;
        let Some(path) = &self.path else {
            return Ok(());
        };
        if self.writer.is_none() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.writer = Some(log_writer(File::create(path)?)?);
        }
        if let Some(wtr) = &mut self.writer {
            wtr.serialize(record)?;
        }
        Ok(())
    }

    /// Records pushed so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Flush the file, returning its path if anything was written.
    pub fn finish(self) -> Result<Option<Utf8PathBuf>, ColocateError> {
        match self.writer {
            Some(mut wtr) => {
                wtr.flush()?;
                Ok(self.path)
            }
            None => Ok(None),
        }
    }

    /// Drop the log, removing the file if one was started.
    pub fn discard(self) -> Result<(), ColocateError> {
        if let (Some(wtr), Some(path)) = (self.writer, self.path) {
            drop(wtr);
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

pub const CONTACT_LOG_HEADER: [&str; 13] = [
    "entityId1",
    "entityId2",
    "ds",
    "dt",
    "tileKey",
    "distanceApart",
    "timeDiff",
    "lat1",
    "lat2",
    "lon1",
    "lon2",
    "t1",
    "t2",
];

#[cfg(test)]
mod contact_log_test {
    use super::*;
    use crate::{
        projection::LocalOrigin,
        samples::TrajectorySample,
        contacts::tile_contacts,
        tiles::TileIndex,
    };

    #[test]
    fn test_header_only() {
        let mut buf = Vec::new();
        write_contact_log(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "entityId1,entityId2,ds,dt,tileKey,distanceApart,timeDiff,lat1,lat2,lon1,lon2,t1,t2\n"
        );
    }

    #[test]
    fn test_tile_contact_row() {
        let mut index = TileIndex::new(100.0, 300.0, LocalOrigin::default());
        index.assign("000", &TrajectorySample::new(39.9, 116.4, 0.0, 1000.0));
        index.assign("001", &TrajectorySample::new(39.9, 116.4, 0.0, 1010.0));
        let records: Vec<_> = tile_contacts(&index)
            .map(|c| ContactRecord::from_tile_contact(&c))
            .collect();

        let mut buf = Vec::new();
        write_contact_log(&mut buf, &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let row = text.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(fields.len(), 13);
        assert_eq!(&fields[..4], &["000", "001", "100.0", "300.0"]);
        assert_eq!(fields[4], records[0].tile_key);
        assert_eq!(fields[6], "10.0");
    }

    #[test]
    fn test_sink_creates_file_on_first_record() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("nested").join("log.csv")).unwrap();
        let s = TrajectorySample::new(39.9, 116.4, 0.0, 5.0);
        let rec = ContactRecord::from_event(&ContactEvent::new("000", s, "001", s), 100.0, 300.0);

        let empty = ContactLogSink::to_file(path.clone());
        assert_eq!(empty.finish().unwrap(), None);
        assert!(!path.exists());

        let mut sink = ContactLogSink::to_file(path.clone());
        sink.push(&rec).unwrap();
        sink.push(&rec).unwrap();
        assert_eq!(sink.count(), 2);
        assert_eq!(sink.finish().unwrap(), Some(path.clone()));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("entityId1,entityId2,"));

        let mut dropped = ContactLogSink::to_file(path.clone());
        dropped.push(&rec).unwrap();
        dropped.discard().unwrap();
        assert!(!path.exists());

        let mut counting = ContactLogSink::counting();
        counting.push(&rec).unwrap();
        assert_eq!(counting.count(), 1);
        assert_eq!(counting.finish().unwrap(), None);
    }

    #[test]
    fn test_event_row_has_empty_tile_key() {
        let s = TrajectorySample::new(39.9, 116.4, 0.0, 5.0);
        let ev = ContactEvent::new("000", s, "001", s);
        let rec = ContactRecord::from_event(&ev, 100.0, 300.0);
        assert!(rec.tile_key.is_empty());
        assert_eq!(rec.distance_apart, 0.0);
        assert_eq!((rec.t1, rec.t2), (5.0, 5.0));
    }
}
