//! Snapshot Persistence
//!
//! Reads and writes the on-disk snapshot file consumed at startup and
//! produced at shutdown. The layout is length-prefixed and flat; all
//! multi-byte integers are stored little-endian with explicit widths so a
//! snapshot written on one machine loads on another.
//!
//! File layout:
//! ```text
//! [count: u64]
//! [entry × count]
//!
//! entry   = [key_len: u64][key][tag: u8][expires_at: i64][payload]
//! payload = string: [len: u64][bytes]
//!           list:   [n: u64][(len: u64, bytes) × n]
//!           set:    [n: u64][(len: u64, bytes) × n]
//! ```
//!
//! Tags: 0 = string, 1 = list, 2 = set. `expires_at` is an absolute unix
//! timestamp in seconds, or -1 for no expiry.
//!
//! Writes go to a `.tmp` file first and are atomically renamed on
//! completion, so a crash mid-save never corrupts the previous snapshot.

use crate::storage::value::{now_secs, Payload, Value};
use bytes::Bytes;
use std::collections::{HashSet, VecDeque};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

const TAG_STRING: u8 = 0;
const TAG_LIST: u8 = 1;
const TAG_SET: u8 = 2;

/// Sentinel stored in the `expires_at` field for values without expiry.
const NO_EXPIRY: i64 = -1;

/// Errors that can occur reading or writing a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown value tag: {0}")]
    UnknownTag(u8),
}

/// Writes `entries` to the snapshot file at `path`.
///
/// Expired entries are filtered out; the header count reflects what was
/// actually written. Returns the number of entries saved.
pub fn save(path: &Path, entries: &[(Bytes, Value)]) -> Result<usize, SnapshotError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let now = now_secs();
    let live: Vec<_> = entries
        .iter()
        .filter(|(_, value)| !value.is_expired(now))
        .collect();

    let tmp_path = path.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);

    write_u64(&mut writer, live.len() as u64)?;
    for (key, value) in &live {
        write_entry(&mut writer, key, value)?;
    }
    writer.flush()?;
    drop(writer);

    fs::rename(&tmp_path, path)?;
    Ok(live.len())
}

/// Loads all entries from the snapshot file at `path`.
///
/// Entries whose expiry has already passed are still returned; the engine
/// expires them lazily once restored.
pub fn load(path: &Path) -> Result<Vec<(Bytes, Value)>, SnapshotError> {
    let mut reader = BufReader::new(File::open(path)?);

    let count = read_u64(&mut reader)?;
    let mut entries = Vec::with_capacity(count.min(1 << 20) as usize);
    for _ in 0..count {
        entries.push(read_entry(&mut reader)?);
    }
    Ok(entries)
}

fn write_entry<W: Write>(writer: &mut W, key: &Bytes, value: &Value) -> Result<(), SnapshotError> {
    write_blob(writer, key)?;

    let expires_at = value.expires_at.unwrap_or(NO_EXPIRY);
    match &value.payload {
        Payload::String(data) => {
            writer.write_all(&[TAG_STRING])?;
            write_i64(writer, expires_at)?;
            write_blob(writer, data)?;
        }
        Payload::List(items) => {
            writer.write_all(&[TAG_LIST])?;
            write_i64(writer, expires_at)?;
            write_u64(writer, items.len() as u64)?;
            for item in items {
                write_blob(writer, item)?;
            }
        }
        Payload::Set(members) => {
            writer.write_all(&[TAG_SET])?;
            write_i64(writer, expires_at)?;
            write_u64(writer, members.len() as u64)?;
            for member in members {
                write_blob(writer, member)?;
            }
        }
    }
    Ok(())
}

fn read_entry<R: Read>(reader: &mut R) -> Result<(Bytes, Value), SnapshotError> {
    let key = read_blob(reader)?;

    let mut tag = [0u8; 1];
    reader.read_exact(&mut tag)?;
    let expires_at = match read_i64(reader)? {
        NO_EXPIRY => None,
        at => Some(at),
    };

    let payload = match tag[0] {
        TAG_STRING => Payload::String(read_blob(reader)?),
        TAG_LIST => {
            let n = read_u64(reader)?;
            let mut items = VecDeque::with_capacity(n.min(1 << 20) as usize);
            for _ in 0..n {
                items.push_back(read_blob(reader)?);
            }
            Payload::List(items)
        }
        TAG_SET => {
            let n = read_u64(reader)?;
            let mut members = HashSet::with_capacity(n.min(1 << 20) as usize);
            for _ in 0..n {
                members.insert(read_blob(reader)?);
            }
            Payload::Set(members)
        }
        other => return Err(SnapshotError::UnknownTag(other)),
    };

    Ok((key, Value { payload, expires_at }))
}

fn write_u64<W: Write>(writer: &mut W, n: u64) -> std::io::Result<()> {
    writer.write_all(&n.to_le_bytes())
}

fn write_i64<W: Write>(writer: &mut W, n: i64) -> std::io::Result<()> {
    writer.write_all(&n.to_le_bytes())
}

fn write_blob<W: Write>(writer: &mut W, data: &[u8]) -> std::io::Result<()> {
    write_u64(writer, data.len() as u64)?;
    writer.write_all(data)
}

fn read_u64<R: Read>(reader: &mut R) -> std::io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_i64<R: Read>(reader: &mut R) -> std::io::Result<i64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

fn read_blob<R: Read>(reader: &mut R) -> std::io::Result<Bytes> {
    let len = read_u64(reader)?;
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(Bytes::from(buf))
}
