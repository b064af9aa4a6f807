//! Chunked file-transfer datagram format
//!
//! Layout of one datagram, all integers big-endian:
//!
//! | bytes      | field                     |
//! |------------|---------------------------|
//! | 4          | sender id (ASCII)         |
//! | 4          | chunk index (0-based)     |
//! | 4          | total chunk count         |
//! | 2          | filename length `n`       |
//! | `n`        | filename (UTF-8)          |
//! | remainder  | payload                   |
//!
//! Only framing and reassembly live here; sockets are left to the caller.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use thiserror::Error;

pub const SENDER_ID_LEN: usize = 4;
pub const HEADER_FIXED_LEN: usize = SENDER_ID_LEN + 4 + 4 + 2;

/// Chunk size used by the companion sender
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

pub type SenderId = [u8; SENDER_ID_LEN];

/// Fit a textual sender name into the 4-byte id field: longer names are
/// truncated, shorter ones padded with `_`.
pub fn sender_id_from_str(name: &str) -> SenderId {
    let mut id = [b'_'; SENDER_ID_LEN];
    for (slot, byte) in id.iter_mut().zip(name.bytes()) {
        *slot = byte;
    }
    id
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("datagram truncated: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("filename is {0} bytes, limit is 65535")]
    FilenameTooLong(usize),

    #[error("chunk size must be positive")]
    ZeroChunkSize,

    #[error("{0} chunks do not fit the 32-bit chunk counter")]
    TooManyChunks(usize),

    #[error("chunk index {index} outside total {total}")]
    ChunkOutOfRange { index: u32, total: u32 },

    #[error("total chunk count changed from {expected} to {got} mid-transfer")]
    InconsistentTotal { expected: u32, got: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub sender_id: SenderId,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub filename: String,
}

impl ChunkHeader {
    /// Sender id as text; invalid UTF-8 becomes U+FFFD instead of being dropped
    pub fn sender(&self) -> String {
        String::from_utf8_lossy(&self.sender_id).into_owned()
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_FIXED_LEN + self.filename.len()
    }

    /// Serialise the header followed by `payload`
    pub fn encode(&self, payload: &[u8]) -> Result<Vec<u8>, WireError> {
        let name = self.filename.as_bytes();
        let name_len =
            u16::try_from(name.len()).map_err(|_| WireError::FilenameTooLong(name.len()))?;

        let mut out = Vec::with_capacity(self.encoded_len() + payload.len());
        out.extend_from_slice(&self.sender_id);
        out.extend_from_slice(&self.chunk_index.to_be_bytes());
        out.extend_from_slice(&self.total_chunks.to_be_bytes());
        out.extend_from_slice(&name_len.to_be_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(payload);
        Ok(out)
    }
}

/// A decoded datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDatagram {
    pub header: ChunkHeader,
    pub payload: Vec<u8>,
}

/// Parse one datagram.
///
/// Filenames that are not valid UTF-8 are decoded lossily: each invalid
/// sequence is replaced by U+FFFD rather than dropped.
pub fn decode(data: &[u8]) -> Result<ChunkDatagram, WireError> {
    if data.len() < HEADER_FIXED_LEN {
        return Err(WireError::Truncated {
            needed: HEADER_FIXED_LEN,
            got: data.len(),
        });
    }

    let mut sender_id = [0u8; SENDER_ID_LEN];
    sender_id.copy_from_slice(&data[0..4]);
    let chunk_index = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    let total_chunks = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);
    let name_len = u16::from_be_bytes([data[12], data[13]]) as usize;

    let name_end = HEADER_FIXED_LEN + name_len;
    if data.len() < name_end {
        return Err(WireError::Truncated {
            needed: name_end,
            got: data.len(),
        });
    }

    let filename = String::from_utf8_lossy(&data[HEADER_FIXED_LEN..name_end]).into_owned();

    Ok(ChunkDatagram {
        header: ChunkHeader {
            sender_id,
            chunk_index,
            total_chunks,
            filename,
        },
        payload: data[name_end..].to_vec(),
    })
}

/// Split `data` into encoded datagrams of at most `chunk_size` payload bytes
pub fn split_into_chunks(
    sender_id: SenderId,
    filename: &str,
    data: &[u8],
    chunk_size: usize,
) -> Result<Vec<Vec<u8>>, WireError> {
    if chunk_size == 0 {
        return Err(WireError::ZeroChunkSize);
    }

    let count = data.len().div_ceil(chunk_size);
    let total_chunks = u32::try_from(count).map_err(|_| WireError::TooManyChunks(count))?;

    data.chunks(chunk_size)
        .enumerate()
        .map(|(index, payload)| {
            let header = ChunkHeader {
                sender_id,
                chunk_index: index as u32,
                total_chunks,
                filename: filename.to_string(),
            };
            header.encode(payload)
        })
        .collect()
}

/// A fully received file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedFile {
    pub sender_id: SenderId,
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReassemblyStats {
    pub received: usize,
    /// Datagrams that failed to decode or did not fit their transfer
    pub rejected: usize,
    pub completed: usize,
}

#[derive(Debug)]
struct Transfer {
    total: u32,
    chunks: BTreeMap<u32, Vec<u8>>,
}

/// Collects chunks per (sender, filename) until every index has arrived
#[derive(Debug, Default)]
pub struct Reassembler {
    transfers: HashMap<(SenderId, String), Transfer>,
    stats: ReassemblyStats,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ReassemblyStats {
        self.stats
    }

    pub fn active_transfers(&self) -> usize {
        self.transfers.len()
    }

    /// Decode raw bytes and feed them to [`Reassembler::accept`]
    pub fn accept_bytes(&mut self, data: &[u8]) -> Result<Option<CompletedFile>, WireError> {
        match decode(data) {
            Ok(datagram) => self.accept(datagram),
            Err(e) => {
                warn!("Dropping undecodable datagram: {}", e);
                self.stats.rejected += 1;
                Err(e)
            }
        }
    }

    /// Store one chunk; returns the file once its last missing chunk arrives.
    ///
    /// Duplicate chunks overwrite the earlier copy.
    pub fn accept(&mut self, datagram: ChunkDatagram) -> Result<Option<CompletedFile>, WireError> {
        let ChunkDatagram { header, payload } = datagram;

        if header.chunk_index >= header.total_chunks {
            self.stats.rejected += 1;
            return Err(WireError::ChunkOutOfRange {
                index: header.chunk_index,
                total: header.total_chunks,
            });
        }

        let key = (header.sender_id, header.filename.clone());
        let transfer = self.transfers.entry(key.clone()).or_insert_with(|| Transfer {
            total: header.total_chunks,
            chunks: BTreeMap::new(),
        });

        if transfer.total != header.total_chunks {
            self.stats.rejected += 1;
            return Err(WireError::InconsistentTotal {
                expected: transfer.total,
                got: header.total_chunks,
            });
        }

        transfer.chunks.insert(header.chunk_index, payload);
        self.stats.received += 1;
        debug!(
            "RX from {}: {} chunk {}/{}",
            header.sender(),
            header.filename,
            header.chunk_index + 1,
            header.total_chunks
        );

        if transfer.chunks.len() < transfer.total as usize {
            return Ok(None);
        }

        let transfer = match self.transfers.remove(&key) {
            Some(t) => t,
            None => return Ok(None),
        };
        self.stats.completed += 1;

        let (sender_id, filename) = key;
        Ok(Some(CompletedFile {
            sender_id,
            filename,
            data: transfer.chunks.into_values().flatten().collect(),
        }))
    }
}
