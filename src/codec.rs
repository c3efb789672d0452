//! The on-disk/on-wire format: a small versioned header followed by either
//! packed dense register bytes or a length-prefixed sparse entry list.
//!
//! ```text
//! magic(4) version(1) flags(1) p(1) reserved(1) seed(4) body_len(4) body(body_len)
//! ```
//!
//! Decode validates every field before constructing a sketch; on any
//! mismatch the sketch under construction is discarded and a `DecodeError` is
//! returned instead.

use crate::bits::{divide_by_8_round_up, REG_WIDTH};
use crate::dense::DenseRegisters;
use crate::settings::Settings;
use crate::sparse::SparseList;
use crate::{HllError, Mode, Sketch};

const MAGIC: &[u8; 4] = b"HLL1";
const VERSION: u8 = 1;
const HEADER_LEN: usize = 16;
const SPARSE_FLAG: u8 = 0x01;

pub(crate) fn encode(sketch: &Sketch) -> Vec<u8> {
    let (flags, body) = match &sketch.mode {
        Mode::Dense(dense) => (0u8, dense.to_bytes()),
        Mode::Sparse(sparse) => (SPARSE_FLAG, sparse.to_bytes()),
    };

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.push(flags);
    out.push(sketch.settings.p as u8);
    out.push(0); // reserved
    out.extend_from_slice(&sketch.settings.seed.to_le_bytes());
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

pub(crate) fn decode(buf: &[u8]) -> Result<Sketch, HllError> {
    if buf.len() < HEADER_LEN {
        return decode_err("buffer shorter than the fixed header");
    }
    if &buf[0..4] != MAGIC {
        return decode_err("bad magic, expected \"HLL1\"");
    }
    if buf[4] != VERSION {
        return decode_err(&format!("unsupported version {}", buf[4]));
    }
    let flags = buf[5];
    if flags & !SPARSE_FLAG != 0 {
        return decode_err("reserved flag bits must be zero");
    }
    let p = buf[6] as u32;
    if !(2..=18).contains(&p) {
        return decode_err(&format!("precision {p} out of range [2, 18]"));
    }
    // buf[7] is the reserved byte; no contract to check beyond being present.
    let seed = u32::from_le_bytes(buf[8..12].try_into().unwrap());
    let body_len = u32::from_le_bytes(buf[12..16].try_into().unwrap()) as usize;
    if buf.len() != HEADER_LEN + body_len {
        return decode_err("body_len does not match the remaining buffer length");
    }
    let body = &buf[HEADER_LEN..];

    let m = 1u32 << p;
    let settings = Settings::new(p, seed, None)?;
    let sparse = flags & SPARSE_FLAG != 0;

    let mode = if sparse {
        decode_sparse_body(body, m, settings.max_sparse_len)?
    } else {
        decode_dense_body(body, m)?
    };

    Ok(Sketch { settings, mode })
}

fn decode_dense_body(body: &[u8], m: u32) -> Result<Mode, HllError> {
    let expected = divide_by_8_round_up(m * REG_WIDTH as u32) as usize;
    if body.len() != expected {
        return decode_err(&format!(
            "dense body length {} does not match expected {expected} for p",
            body.len()
        ));
    }
    Ok(Mode::Dense(DenseRegisters::from_bytes(m, body)))
}

fn decode_sparse_body(body: &[u8], m: u32, max_sparse_len: usize) -> Result<Mode, HllError> {
    if body.len() < 4 {
        return decode_err("sparse body missing entry count");
    }
    let count = u32::from_le_bytes(body[0..4].try_into().unwrap()) as usize;
    let expected = 4 + count * 4;
    if body.len() != expected {
        return decode_err(&format!(
            "sparse body length {} does not match expected {expected} for {count} entries",
            body.len()
        ));
    }

    let mut sorted = Vec::with_capacity(count);
    let mut prev: Option<u32> = None;
    for i in 0..count {
        let off = 4 + i * 4;
        let entry = u32::from_le_bytes(body[off..off + 4].try_into().unwrap());
        let index = entry >> REG_WIDTH;
        let rank = entry & ((1 << REG_WIDTH) - 1);
        if index >= m {
            return decode_err(&format!("sparse entry index {index} out of bounds for m={m}"));
        }
        if rank > 63 {
            return decode_err("sparse entry rank exceeds the 6-bit cell width");
        }
        if let Some(prev) = prev {
            if entry <= prev {
                return decode_err("sparse entries must be strictly ascending");
            }
        }
        prev = Some(entry);
        sorted.push(entry);
    }

    Ok(Mode::Sparse(SparseList::from_sorted_entries(
        max_sparse_len,
        sorted,
    )))
}

fn decode_err<T>(reason: &str) -> Result<T, HllError> {
    tracing::warn!(reason, "rejecting malformed sketch encoding");
    Err(HllError::DecodeError(reason.to_string()))
}
