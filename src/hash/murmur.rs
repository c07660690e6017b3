use std::io::Cursor;

const M2_MUL: u32 = 0x5bd1_e995;
const M2_SHIFT: u32 = 24;

/// MurmurHash2, 32 bit.
pub fn murmur2_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed ^ data.len() as u32;

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        k = k.wrapping_mul(M2_MUL);
        k ^= k >> M2_SHIFT;
        k = k.wrapping_mul(M2_MUL);
        h = h.wrapping_mul(M2_MUL);
        h ^= k;
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        if tail.len() >= 3 {
            h ^= (tail[2] as u32) << 16;
        }
        if tail.len() >= 2 {
            h ^= (tail[1] as u32) << 8;
        }
        h ^= tail[0] as u32;
        h = h.wrapping_mul(M2_MUL);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M2_MUL);
    h ^= h >> 15;
    h
}

/// MurmurHash3 x86, 32 bit.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    // reading from an in-memory cursor cannot fail
    murmur3::murmur3_32(&mut Cursor::new(data), seed)
        .expect("Failed to compute Murmur3 hash")
}

/// MurmurHash3 x64, 128 bit, returned as `(low, high)` halves.
pub fn murmur3_x64_128(data: &[u8], seed: u32) -> (u64, u64) {
    // reading from an in-memory cursor cannot fail
    let hash = murmur3::murmur3_x64_128(&mut Cursor::new(data), seed)
        .expect("Failed to compute Murmur3 hash");
    (hash as u64, (hash >> 64) as u64)
}
