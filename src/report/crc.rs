//! # CRC-8 Implementation
//!
//! CRC-8 checksum calculation for the co-processor (MCU) sub-protocol.
//!
//! **Polynomial**: 0x07 (x^8 + x^2 + x + 1)
//! **Initial Value**: 0x00, no final xor, MSB first
//!
//! These parameters are fixed by the controller firmware; the checksum guards
//! the 35-byte co-processor sub-payload of output reports `0x01`/`0x11`.

/// CRC-8 polynomial used by the co-processor firmware
const CRC8_POLY: u8 = 0x07;

/// Precomputed CRC8 lookup table for fast calculation
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the co-processor CRC8 checksum using the lookup table (fast)
///
/// # Arguments
///
/// * `data` - Byte slice to calculate CRC for (the zero-padded sub-payload)
///
/// # Returns
///
/// * `u8` - Calculated CRC8 checksum
///
/// # Examples
///
/// ```
/// use joycon_probe::report::crc::crc8;
///
/// assert_eq!(crc8(b"123456789"), 0xF4);
/// ```
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;

    for &byte in data {
        crc = CRC8_TABLE[(crc ^ byte) as usize];
    }

    crc
}

/// Calculate the CRC8 checksum using the direct algorithm (slow, for verification)
///
/// This implementation is slower but easier to verify against the polynomial.
/// Used primarily for testing the lookup table implementation.
#[allow(dead_code)]
fn crc8_slow(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;

    for &byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}
