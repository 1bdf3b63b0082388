//! G.711 µ-law companding for the telephony leg.
//!
//! The telephony platform plays back 8-bit µ-law samples at 8 kHz. Agent
//! audio that arrives as 16-bit linear PCM is companded here, one input
//! sample producing one output byte. Encoding is pure and stateless, so it
//! is safe to call concurrently from any number of call sessions.
//!
//! # Algorithm
//!
//! Classic shift-based µ-law compression: clamp the magnitude to 32635,
//! add the 0x84 bias, locate the segment (0-7) from the highest set bit,
//! take a 4-bit mantissa at `segment + 3`, then invert the composed byte.
//! The all-bits-inverted composition is what makes silence encode as 0xFF.

/// Magnitude ceiling applied before companding, below full i16 range to
/// avoid overflow once the bias is added.
const CLIP: i32 = 32635;

/// Bias added to the magnitude before the segment search.
const BIAS: i32 = 0x84;

/// Telephony-leg sample rate in Hz.
pub const TELEPHONY_SAMPLE_RATE: u32 = 8000;

/// Compress one 16-bit linear PCM sample to an 8-bit µ-law sample.
///
/// Pure function with no history dependence between samples. Output is
/// byte-identical to the reference companding table for every possible
/// input (see the exhaustive test below).
pub fn linear_to_ulaw(sample: i16) -> u8 {
    // Work in i32 so negating i16::MIN cannot overflow.
    let mut magnitude = sample as i32;
    let sign: u8 = if magnitude < 0 {
        magnitude = -magnitude;
        0x80
    } else {
        0x00
    };

    if magnitude > CLIP {
        magnitude = CLIP;
    }
    magnitude += BIAS;

    // Segment number: position of the highest set bit, searched from
    // bit 14 down to bit 7. The bias guarantees bit 7 is reachable.
    let mut exponent: u8 = 7;
    let mut mask: i32 = 0x4000;
    while magnitude & mask == 0 && exponent > 0 {
        exponent -= 1;
        mask >>= 1;
    }

    let mantissa = ((magnitude >> (exponent + 3)) & 0x0F) as u8;

    !(sign | (exponent << 4) | mantissa)
}

/// Compress a slice of linear PCM samples, one output byte per sample.
pub fn encode(samples: &[i16]) -> Vec<u8> {
    samples.iter().map(|&s| linear_to_ulaw(s)).collect()
}

/// Reinterpret little-endian PCM bytes as 16-bit samples.
///
/// A trailing odd byte is ignored; chunk boundaries from the agent leg
/// are sample-aligned in practice.
pub fn pcm16le_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Decimate a sample stream by an integer factor (e.g. 16 kHz -> 8 kHz
/// with `factor` 2). Companding correctness does not depend on the
/// resampling algorithm, so plain sample dropping is used.
pub fn decimate(samples: &[i16], factor: usize) -> Vec<i16> {
    if factor <= 1 {
        return samples.to_vec();
    }
    samples.iter().step_by(factor).copied().collect()
}
