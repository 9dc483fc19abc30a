//! Binary layout: little-endian `u32` counts and lengths.
//!
//! Keyed containers: `count`, then `count` records of
//! `key_len key_bytes value_len value_bytes`. Sets write empty values.
//! Sequences: `count`, then one `i32` per element, front to back. Trees
//! use the sequence layout in ascending order.
//!
//! Decoding clears the target and re-inserts through its normal insert
//! path, so table slot positions are recomputed rather than replayed.

use crate::array::DynArray;
use crate::avl_tree::AvlTree;
use crate::cuckoo_table::CuckooTable;
use crate::double_hash_table::DoubleHashTable;
use crate::double_list::DoubleList;
use crate::error::CodecError;
use crate::queue::Queue;
use crate::set::Set;
use crate::single_list::SingleList;
use crate::stack::Stack;
use core::hash::BuildHasher;
use std::io::{ErrorKind, Read, Write};

/// Containers with a binary projection.
pub trait BinaryCodec {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), CodecError>;

    /// Replaces the contents of `self` with the decoded data.
    fn decode_into<R: Read>(&mut self, r: &mut R) -> Result<(), CodecError>;
}

fn write_u32<W: Write>(w: &mut W, n: usize) -> Result<(), CodecError> {
    let n = u32::try_from(n).map_err(|_| CodecError::OutOfRange(n as i64))?;
    w.write_all(&n.to_le_bytes())?;
    Ok(())
}

fn write_str<W: Write>(w: &mut W, s: &str) -> Result<(), CodecError> {
    write_u32(w, s.len())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_exact<R: Read>(r: &mut R, buf: &mut [u8], what: &'static str) -> Result<(), CodecError> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => CodecError::Truncated { what },
        _ => CodecError::Io(e),
    })
}

fn read_u32<R: Read>(r: &mut R, what: &'static str) -> Result<u32, CodecError> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf, what)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_string<R: Read>(r: &mut R, what: &'static str) -> Result<String, CodecError> {
    let len = read_u32(r, what)? as usize;
    let mut bytes = Vec::new();
    r.by_ref()
        .take(len as u64)
        .read_to_end(&mut bytes)
        .map_err(CodecError::Io)?;
    if bytes.len() != len {
        return Err(CodecError::Truncated { what });
    }
    Ok(String::from_utf8(bytes)?)
}

/// Writes `len` followed by each key/value record.
pub fn write_pairs<'a, W, I>(w: &mut W, len: usize, pairs: I) -> Result<(), CodecError>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    write_u32(w, len)?;
    for (key, value) in pairs {
        write_str(w, key)?;
        write_str(w, value)?;
    }
    Ok(())
}

pub fn read_pairs<R: Read>(r: &mut R) -> Result<Vec<(String, String)>, CodecError> {
    let count = read_u32(r, "entry count")?;
    // Capacity is bounded so a corrupt count cannot force a huge allocation.
    let mut pairs = Vec::with_capacity((count as usize).min(1024));
    for _ in 0..count {
        let key = read_string(r, "key")?;
        let value = read_string(r, "value")?;
        pairs.push((key, value));
    }
    Ok(pairs)
}

pub fn write_ints<'a, W, I>(w: &mut W, len: usize, items: I) -> Result<(), CodecError>
where
    W: Write,
    I: IntoIterator<Item = &'a i64>,
{
    write_u32(w, len)?;
    for &item in items {
        let n = i32::try_from(item).map_err(|_| CodecError::OutOfRange(item))?;
        w.write_all(&n.to_le_bytes())?;
    }
    Ok(())
}

pub fn read_ints<R: Read>(r: &mut R) -> Result<Vec<i64>, CodecError> {
    let count = read_u32(r, "element count")?;
    let mut items = Vec::with_capacity((count as usize).min(1024));
    for _ in 0..count {
        let mut buf = [0u8; 4];
        read_exact(r, &mut buf, "element")?;
        items.push(i64::from(i32::from_le_bytes(buf)));
    }
    Ok(items)
}

impl<S: BuildHasher> BinaryCodec for DoubleHashTable<String, String, S> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), CodecError> {
        write_pairs(w, self.len(), self.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn decode_into<R: Read>(&mut self, r: &mut R) -> Result<(), CodecError> {
        let pairs = read_pairs(r)?;
        self.clear();
        self.load(pairs)?;
        Ok(())
    }
}

impl<S: BuildHasher> BinaryCodec for CuckooTable<String, String, S> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), CodecError> {
        write_pairs(w, self.len(), self.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn decode_into<R: Read>(&mut self, r: &mut R) -> Result<(), CodecError> {
        let pairs = read_pairs(r)?;
        self.clear();
        self.load(pairs)?;
        Ok(())
    }
}

impl<S: BuildHasher> BinaryCodec for Set<String, S> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), CodecError> {
        write_pairs(w, self.len(), self.iter().map(|k| (k.as_str(), "")))
    }

    fn decode_into<R: Read>(&mut self, r: &mut R) -> Result<(), CodecError> {
        let pairs = read_pairs(r)?;
        self.clear();
        self.load(pairs.into_iter().map(|(k, _)| k))?;
        Ok(())
    }
}

impl BinaryCodec for DynArray<i64> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), CodecError> {
        write_ints(w, self.len(), self.iter())
    }

    fn decode_into<R: Read>(&mut self, r: &mut R) -> Result<(), CodecError> {
        *self = read_ints(r)?.into_iter().collect();
        Ok(())
    }
}

impl BinaryCodec for Stack<i64> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), CodecError> {
        write_ints(w, self.len(), self.iter())
    }

    fn decode_into<R: Read>(&mut self, r: &mut R) -> Result<(), CodecError> {
        *self = read_ints(r)?.into_iter().collect();
        Ok(())
    }
}

impl BinaryCodec for Queue<i64> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), CodecError> {
        write_ints(w, self.len(), self.iter())
    }

    fn decode_into<R: Read>(&mut self, r: &mut R) -> Result<(), CodecError> {
        *self = read_ints(r)?.into_iter().collect();
        Ok(())
    }
}

impl BinaryCodec for SingleList<i64> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), CodecError> {
        write_ints(w, self.len(), self.iter())
    }

    fn decode_into<R: Read>(&mut self, r: &mut R) -> Result<(), CodecError> {
        *self = read_ints(r)?.into_iter().collect();
        Ok(())
    }
}

impl BinaryCodec for DoubleList<i64> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), CodecError> {
        write_ints(w, self.len(), self.iter())
    }

    fn decode_into<R: Read>(&mut self, r: &mut R) -> Result<(), CodecError> {
        *self = read_ints(r)?.into_iter().collect();
        Ok(())
    }
}

impl BinaryCodec for AvlTree<i64> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<(), CodecError> {
        write_ints(w, self.len(), self.iter())
    }

    fn decode_into<R: Read>(&mut self, r: &mut R) -> Result<(), CodecError> {
        *self = read_ints(r)?.into_iter().collect();
        Ok(())
    }
}
