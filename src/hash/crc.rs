//! CRC32 (IEEE) and CRC64 (ECMA-182, reflected) checksums.
//!
//! CRC32 runs through `crc32fast`, which folds with PCLMULQDQ where the CPU
//! has it and falls back to tables otherwise. The byte table below is kept as
//! the reference path. CRC64 consumes eight bytes per step (slice-by-8) and
//! finishes the tail with the byte table.

const CRC32_POLY: u32 = 0xedb8_8320;
const CRC64_POLY: u64 = 0xc96c_5795_d787_0f42;

static CRC32_TABLE: [u32; 256] = crc32_table();
static CRC64_TABLES: [[u64; 256]; 8] = crc64_tables();

const fn crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { CRC32_POLY ^ (crc >> 1) } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const fn crc64_tables() -> [[u64; 256]; 8] {
    let mut tables = [[0u64; 256]; 8];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u64;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { CRC64_POLY ^ (crc >> 1) } else { crc >> 1 };
            bit += 1;
        }
        tables[0][i] = crc;
        i += 1;
    }
    let mut n = 1;
    while n < 8 {
        let mut i = 0;
        while i < 256 {
            let prev = tables[n - 1][i];
            tables[n][i] = (prev >> 8) ^ tables[0][(prev & 0xff) as usize];
            i += 1;
        }
        n += 1;
    }
    tables
}

/// Standard CRC32: the complemented accumulator.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// The raw CRC32 accumulator, before the final complement.
pub fn crc32_raw(data: &[u8]) -> u32 {
    !crc32fast::hash(data)
}

/// Byte-at-a-time CRC32.
pub fn crc32_table_driven(data: &[u8]) -> u32 {
    !crc32_update(u32::MAX, data)
}

fn crc32_update(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        crc = CRC32_TABLE[((crc ^ byte as u32) & 0xff) as usize] ^ (crc >> 8);
    }
    crc
}

/// CRC-64/XZ.
pub fn crc64(data: &[u8]) -> u64 {
    !crc64_update(u64::MAX, data)
}

/// Continues a CRC64 accumulator from an arbitrary state. Used to derive a
/// second, seeded hash from the first.
pub fn crc64_update(mut crc: u64, data: &[u8]) -> u64 {
    let t = &CRC64_TABLES;
    let mut chunks = data.chunks_exact(8);
    for chunk in &mut chunks {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        let x = crc ^ u64::from_le_bytes(word);
        crc = t[7][(x & 0xff) as usize]
            ^ t[6][((x >> 8) & 0xff) as usize]
            ^ t[5][((x >> 16) & 0xff) as usize]
            ^ t[4][((x >> 24) & 0xff) as usize]
            ^ t[3][((x >> 32) & 0xff) as usize]
            ^ t[2][((x >> 40) & 0xff) as usize]
            ^ t[1][((x >> 48) & 0xff) as usize]
            ^ t[0][(x >> 56) as usize];
    }
    for &byte in chunks.remainder() {
        crc = t[0][((crc ^ byte as u64) & 0xff) as usize] ^ (crc >> 8);
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK: &[u8] = b"123456789";

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(crc32(CHECK), 0xcbf4_3926);
        assert_eq!(crc32_table_driven(CHECK), 0xcbf4_3926);
        assert_eq!(crc32_raw(CHECK), !0xcbf4_3926);
    }

    #[test]
    fn test_crc32_paths_agree() {
        let data: Vec<u8> = (0..4_099u32).map(|i| (i * 31 + 7) as u8).collect();
        for len in [0, 1, 15, 16, 64, 127, 4_099] {
            assert_eq!(crc32(&data[..len]), crc32_table_driven(&data[..len]));
        }
    }

    #[test]
    fn test_crc64_check_value() {
        assert_eq!(crc64(CHECK), 0x995d_c9bb_df19_39fa);
        assert_eq!(crc64(b""), 0);
    }

    #[test]
    fn test_crc64_slicing_matches_bytewise() {
        let data: Vec<u8> = (0..1_000u32).map(|i| (i ^ (i >> 3)) as u8).collect();
        let mut bytewise = u64::MAX;
        for &byte in &data {
            bytewise = CRC64_TABLES[0][((bytewise ^ byte as u64) & 0xff) as usize]
                ^ (bytewise >> 8);
        }
        assert_eq!(crc64_update(u64::MAX, &data), bytewise);
    }
}
