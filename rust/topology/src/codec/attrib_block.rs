// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Versioned attribute blocks.
//!
//! Layout of one block:
//!
//! ```text
//! version u32 | string_count u32 | double_count u32 | int_count u32
//! strings (u32 byte length + UTF-8) | doubles f64 | ints i32
//! ```
//!
//! The record name travels as the first string, so `string_count` is at
//! least one.

use std::io::{Read, Write};

use super::primitives::{PrimitiveReader, PrimitiveWriter};
use super::ATTRIBUTE_BLOCK_VERSION;
use crate::attributes::AttributeRecord;
use crate::error::{Error, Result};

/// Writes `{count, block × count}` for one node.
pub(crate) fn write_attribute_set<W: Write>(
    w: &mut PrimitiveWriter<W>,
    records: &[AttributeRecord],
) -> Result<()> {
    w.write_len(records.len())?;
    for record in records {
        write_block(w, record)?;
    }
    Ok(())
}

fn write_block<W: Write>(w: &mut PrimitiveWriter<W>, record: &AttributeRecord) -> Result<()> {
    w.write_u32(ATTRIBUTE_BLOCK_VERSION)?;
    w.write_len(record.strings.len() + 1)?;
    w.write_len(record.doubles.len())?;
    w.write_len(record.ints.len())?;

    w.write_str(&record.name)?;
    for s in &record.strings {
        w.write_str(s)?;
    }
    for &d in &record.doubles {
        w.write_f64(d)?;
    }
    for &i in &record.ints {
        w.write_i32(i)?;
    }
    Ok(())
}

/// Reads the attribute set that ends every record.
pub(crate) fn read_attribute_set<R: Read>(
    r: &mut PrimitiveReader<R>,
) -> Result<Vec<AttributeRecord>> {
    let count = r.read_count()?;
    let mut records = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        records.push(read_block(r)?);
    }
    Ok(records)
}

fn read_block<R: Read>(r: &mut PrimitiveReader<R>) -> Result<AttributeRecord> {
    let start = r.offset();
    let version = r.read_u32()?;
    if version != ATTRIBUTE_BLOCK_VERSION {
        return Err(Error::VersionMismatch {
            block: "attribute block",
            found: version,
            expected: ATTRIBUTE_BLOCK_VERSION,
            offset: start,
        });
    }

    let string_count = r.read_count()?;
    let double_count = r.read_count()?;
    let int_count = r.read_count()?;
    if string_count == 0 {
        return Err(r.corrupt_at(start, "attribute block has no name"));
    }

    let name = r.read_string()?;
    let strings = (1..string_count)
        .map(|_| r.read_string())
        .collect::<Result<Vec<_>>>()?;
    let doubles = (0..double_count)
        .map(|_| r.read_f64())
        .collect::<Result<Vec<_>>>()?;
    let ints = (0..int_count)
        .map(|_| r.read_i32())
        .collect::<Result<Vec<_>>>()?;

    Ok(AttributeRecord {
        name,
        strings,
        ints,
        doubles,
    })
}
