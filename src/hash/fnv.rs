//! 32 bit FNV seeds for the LCG and PRNG expansion strategies.

const FNV32_OFFSET: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnvSeed {
    Fnv1,
    Fnv1a,
    ModifiedFnv1,
}

impl FnvSeed {
    pub fn hash(self, data: &[u8]) -> u32 {
        match self {
            FnvSeed::Fnv1 => fnv1_32(data),
            FnvSeed::Fnv1a => fnv1a_32(data),
            FnvSeed::ModifiedFnv1 => modified_fnv1_32(data),
        }
    }
}

/// FNV-1, 32 bit: multiply then xor.
pub fn fnv1_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV32_OFFSET, |hash, &byte| {
        hash.wrapping_mul(FNV32_PRIME) ^ byte as u32
    })
}

/// FNV-1a, 32 bit: xor then multiply.
pub fn fnv1a_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV32_OFFSET, |hash, &byte| {
        (hash ^ byte as u32).wrapping_mul(FNV32_PRIME)
    })
}

/// Bret Mulvey's modified FNV-1: FNV-1a with a final avalanche.
pub fn modified_fnv1_32(data: &[u8]) -> u32 {
    let mut hash = fnv1a_32(data);
    hash = hash.wrapping_add(hash << 13);
    hash ^= hash >> 7;
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 17;
    hash = hash.wrapping_add(hash << 5);
    hash
}
