//! Payload extraction.
//!
//! Extraction needs none of the graph machinery: it replays the seeded
//! permutation, accumulates each vertex's masked byte sum as one chunk, and
//! strips the signature/length frame from the unpacked stream.

use crate::error::EngineError;
use crate::message::{self, SIGNATURE};
use crate::params::Parameters;
use crate::permute::IndexPermutation;
use crate::sample::BYTES_PER_SAMPLE;

/// Reads chunks vertex-by-vertex in permutation order.
struct ChunkReader<'a> {
    buffer: &'a [u8],
    perm: IndexPermutation,
    samples_per_vertex: usize,
    mask: u16,
    remaining_vertices: usize,
}

impl ChunkReader<'_> {
    /// `count` chunks, or `None` once the carrier's vertices are exhausted.
    fn read(&mut self, count: usize) -> Option<Vec<u8>> {
        if count > self.remaining_vertices {
            return None;
        }
        let mut chunks = Vec::with_capacity(count);
        for _ in 0..count {
            let mut sum = 0u32;
            for _ in 0..self.samples_per_vertex {
                let base = self.perm.next()? * BYTES_PER_SAMPLE;
                for c in 0..BYTES_PER_SAMPLE {
                    sum += u32::from(self.buffer[base + c]);
                }
            }
            chunks.push((sum as u16 & self.mask) as u8);
        }
        self.remaining_vertices -= count;
        Some(chunks)
    }

    /// Bytes still readable after the frame header.
    fn capacity_bytes(&self, bits: u8) -> usize {
        self.remaining_vertices * usize::from(bits) / 8
    }
}

pub(crate) fn run_extract(buffer: &[u8], params: &Parameters) -> Result<Vec<u8>, EngineError> {
    let bits = params.message_bits_per_vertex();
    let sample_count = buffer.len() / BYTES_PER_SAMPLE;
    let mut reader = ChunkReader {
        buffer,
        perm: IndexPermutation::new(params.seed(), sample_count),
        samples_per_vertex: params.samples_per_vertex(),
        mask: u16::from(params.mask()),
        remaining_vertices: sample_count / params.samples_per_vertex(),
    };

    // Signature and length prefix; a carrier too small for either holds no
    // message at all.
    let header_chunks = message::chunks_for_bytes(message::FRAME_OVERHEAD, bits);
    let header = reader
        .read(header_chunks)
        .ok_or(EngineError::SignatureMismatch)?;
    let header = message::unpack_chunks(&header, bits);
    if header[..SIGNATURE.len()] != SIGNATURE {
        return Err(EngineError::SignatureMismatch);
    }
    let length = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;

    let capacity = reader.capacity_bytes(bits);
    if length > capacity {
        return Err(EngineError::LengthOutOfRange { length, capacity });
    }
    let payload_chunks = reader
        .read(message::chunks_for_bytes(length, bits))
        .ok_or(EngineError::LengthOutOfRange { length, capacity })?;
    Ok(message::unpack_chunks(&payload_chunks, bits))
}
