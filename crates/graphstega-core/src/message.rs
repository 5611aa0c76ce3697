//! Message framing and chunk packing.
//!
//! The embedded bit-stream is `signature || length || ciphertext`, packed
//! LSB-first into groups of `bits` bits, one group per message-bearing
//! vertex. Extraction reverses the packing and strips the frame.

/// The four literal bytes prepended to every embedded message.
pub const SIGNATURE: [u8; 4] = [0x47, 0x54, 0x41, 0x6C];

/// Bytes of frame overhead: the signature plus the little-endian length.
pub const FRAME_OVERHEAD: usize = SIGNATURE.len() + 4;

/// Prepend the signature and a 4-byte little-endian length to `payload`.
#[must_use]
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(FRAME_OVERHEAD + payload.len());
    framed.extend_from_slice(&SIGNATURE);
    framed.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    framed.extend_from_slice(payload);
    framed
}

/// Split `bytes` into `bits`-bit chunks, least significant bit of the first
/// byte first. Each chunk is in `[0, 2^bits)`. A trailing group of fewer than
/// `bits` bits is discarded.
#[must_use]
pub fn pack_chunks(bytes: &[u8], bits: u8) -> Vec<u8> {
    let bits = usize::from(bits);
    let mask = (1u16 << bits) - 1;
    let total = bytes.len() * 8 / bits;
    let mut chunks = Vec::with_capacity(total);
    for i in 0..total {
        let pos = i * bits;
        // A chunk never spans more than two bytes (bits <= 8).
        let mut window = u16::from(bytes[pos / 8]) >> (pos % 8);
        let taken = 8 - pos % 8;
        if taken < bits && pos / 8 + 1 < bytes.len() {
            window |= u16::from(bytes[pos / 8 + 1]) << taken;
        }
        chunks.push((window & mask) as u8);
    }
    chunks
}

/// Concatenate `bits`-bit chunks LSB-first back into bytes. Bits beyond the
/// last whole byte are discarded.
#[must_use]
pub fn unpack_chunks(chunks: &[u8], bits: u8) -> Vec<u8> {
    let bits = u32::from(bits);
    let mask = (1u16 << bits) - 1;
    let mut bytes = Vec::with_capacity(chunks.len() * bits as usize / 8);
    let mut acc = 0u16;
    let mut filled = 0u32;
    for &chunk in chunks {
        acc |= (u16::from(chunk) & mask) << filled;
        filled += bits;
        if filled >= 8 {
            bytes.push((acc & 0xFF) as u8);
            acc >>= 8;
            filled -= 8;
        }
    }
    bytes
}

/// Chunks required to carry `n` bytes at `bits` bits per chunk.
#[must_use]
pub fn chunks_for_bytes(n: usize, bits: u8) -> usize {
    n * 8 / usize::from(bits)
}
