//! CRC-32 (ISO 3309), the checksum stored in the GZIP trailer.
//!
//! Data of 16 bytes or more goes through a slicing-by-8 loop that folds
//! eight input bytes per step using eight precomputed tables. Shorter
//! inputs and the tail use the classic single-table loop.

/// Reflected CRC-32 polynomial.
const POLY: u32 = 0xEDB88320;

/// CRC-32 slicing-by-8 lookup tables. Table 0 is the byte-at-a-time table.
const CRC32_TABLES: [[u32; 256]; 8] = {
    let mut tables = [[0u32; 256]; 8];

    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        tables[0][i] = crc;
        i += 1;
    }

    let mut t = 1;
    while t < 8 {
        let mut i = 0usize;
        while i < 256 {
            let prev = tables[t - 1][i];
            tables[t][i] = tables[0][(prev & 0xFF) as usize] ^ (prev >> 8);
            i += 1;
        }
        t += 1;
    }

    tables
};

/// Running CRC-32 calculator.
///
/// ```
/// use webgz_core::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, ");
/// crc.update(b"World!");
/// assert_eq!(crc.finalize(), Crc32::compute(b"Hello, World!"));
/// ```
#[derive(Debug, Clone)]
pub struct Crc32 {
    value: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self { value: 0xFFFFFFFF }
    }

    /// Reset the calculator to its initial state.
    pub fn reset(&mut self) {
        self.value = 0xFFFFFFFF;
    }

    /// Feed more data into the checksum.
    pub fn update(&mut self, data: &[u8]) {
        if data.len() >= 16 {
            crc32_slice8(&mut self.value, data);
        } else {
            crc32_bytewise(&mut self.value, data);
        }
    }

    /// Current checksum value without consuming the calculator.
    pub fn value(&self) -> u32 {
        self.value ^ 0xFFFFFFFF
    }

    /// Final checksum value.
    pub fn finalize(self) -> u32 {
        self.value()
    }

    /// One-shot checksum of `data`.
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn crc32_bytewise(crc: &mut u32, data: &[u8]) {
    let table = &CRC32_TABLES[0];
    for &byte in data {
        *crc = table[((*crc ^ byte as u32) & 0xFF) as usize] ^ (*crc >> 8);
    }
}

fn crc32_slice8(crc: &mut u32, data: &[u8]) {
    let t = &CRC32_TABLES;
    let mut chunks = data.chunks_exact(8);

    for chunk in &mut chunks {
        let lo = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) ^ *crc;
        let hi = u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);

        *crc = t[7][(lo & 0xFF) as usize]
            ^ t[6][((lo >> 8) & 0xFF) as usize]
            ^ t[5][((lo >> 16) & 0xFF) as usize]
            ^ t[4][(lo >> 24) as usize]
            ^ t[3][(hi & 0xFF) as usize]
            ^ t[2][((hi >> 8) & 0xFF) as usize]
            ^ t[1][((hi >> 16) & 0xFF) as usize]
            ^ t[0][(hi >> 24) as usize];
    }

    crc32_bytewise(crc, chunks.remainder());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_empty() {
        assert_eq!(Crc32::compute(b""), 0);
    }

    #[test]
    fn test_crc32_known_values() {
        assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
        assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
        assert_eq!(
            Crc32::compute(b"The quick brown fox jumps over the lazy dog"),
            0x414FA339
        );
    }

    #[test]
    fn test_crc32_slicing_matches_bytewise() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 31 + 7) as u8).collect();
        for len in [16, 17, 23, 64, 999, 1000] {
            let mut reference = 0xFFFFFFFF;
            crc32_bytewise(&mut reference, &data[..len]);
            assert_eq!(Crc32::compute(&data[..len]), reference ^ 0xFFFFFFFF);
        }
    }

    #[test]
    fn test_crc32_incremental() {
        let data = b"<html><body>gzip trailer checksum</body></html>";
        let mut crc = Crc32::new();
        for chunk in data.chunks(5) {
            crc.update(chunk);
        }
        assert_eq!(crc.value(), Crc32::compute(data));

        crc.reset();
        assert_eq!(crc.finalize(), 0);
    }
}
