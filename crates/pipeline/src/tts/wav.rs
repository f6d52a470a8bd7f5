//! WAV concatenation for chunked synthesis
//!
//! Every synthesized chunk is a complete WAV file with a canonical 44-byte
//! header. Joining them keeps the first header, appends the sample data of
//! every chunk, then rewrites the RIFF size (offset 4) and the data chunk size
//! (offset 40).
//!
//! All chunks are assumed to share one format since they come from the same
//! synthesis settings. A mismatch is logged but not re-encoded.

use thiserror::Error;

/// Canonical PCM WAV header length
pub const WAV_HEADER_LEN: usize = 44;

const RIFF_SIZE_OFFSET: usize = 4;
const DATA_SIZE_OFFSET: usize = 40;
/// `fmt ` chunk body: channels, sample rate, byte rate, block align, bit depth
const FMT_RANGE: std::ops::Range<usize> = 20..36;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WavError {
    #[error("No usable WAV chunks ({0} given)")]
    NoUsableChunks(usize),

    #[error("Combined audio of {0} bytes exceeds the WAV size limit")]
    TooLarge(usize),
}

/// Starts with a RIFF/WAVE header of at least the canonical length
pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= WAV_HEADER_LEN && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Concatenate WAV chunks in the order given
///
/// Chunks that are too short or lack a RIFF/WAVE header are skipped.
pub fn concat_wav<B: AsRef<[u8]>>(chunks: &[B]) -> Result<Vec<u8>, WavError> {
    let usable: Vec<&[u8]> = chunks
        .iter()
        .map(|c| c.as_ref())
        .enumerate()
        .filter_map(|(index, bytes)| {
            if is_wav(bytes) {
                Some(bytes)
            } else {
                tracing::warn!(chunk = index, bytes = bytes.len(), "Skipping chunk without a WAV header");
                None
            }
        })
        .collect();

    let Some(first) = usable.first() else {
        return Err(WavError::NoUsableChunks(chunks.len()));
    };

    let total = WAV_HEADER_LEN
        + usable
            .iter()
            .map(|c| c.len() - WAV_HEADER_LEN)
            .sum::<usize>();
    if total > u32::MAX as usize {
        return Err(WavError::TooLarge(total));
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&first[..WAV_HEADER_LEN]);
    for (index, chunk) in usable.iter().enumerate() {
        if chunk[FMT_RANGE] != first[FMT_RANGE] {
            tracing::warn!(chunk = index, "WAV chunk format differs from the first chunk");
        }
        out.extend_from_slice(&chunk[WAV_HEADER_LEN..]);
    }

    let riff_size = (total - 8) as u32;
    let data_size = (total - WAV_HEADER_LEN) as u32;
    out[RIFF_SIZE_OFFSET..RIFF_SIZE_OFFSET + 4].copy_from_slice(&riff_size.to_le_bytes());
    out[DATA_SIZE_OFFSET..DATA_SIZE_OFFSET + 4].copy_from_slice(&data_size.to_le_bytes());

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::wav_with_data;
    use std::io::Cursor;

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
    }

    #[test]
    fn test_two_chunks_size_fields() {
        let a = wav_with_data(1000, 1);
        let b = wav_with_data(2000, 2);

        let joined = concat_wav(&[a, b]).unwrap();

        assert_eq!(joined.len(), 44 + 3000);
        assert_eq!(read_u32(&joined, 4), (44 + 1000 + 2000) - 8);
        assert_eq!(read_u32(&joined, 40), 1000 + 2000);
        assert!(joined[44..1044].iter().all(|&b| b == 1));
        assert!(joined[1044..].iter().all(|&b| b == 2));

        let reader = hound::WavReader::new(Cursor::new(joined)).unwrap();
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 1500);
    }

    #[test]
    fn test_single_chunk_unchanged() {
        let a = wav_with_data(640, 7);
        assert_eq!(concat_wav(&[a.clone()]).unwrap(), a);
    }

    #[test]
    fn test_short_or_foreign_chunks_skipped() {
        let a = wav_with_data(100, 1);
        let junk = vec![0u8; 20];
        let not_wav = vec![9u8; 200];
        let b = wav_with_data(300, 2);

        let joined = concat_wav(&[junk.clone(), a, not_wav, b]).unwrap();
        assert_eq!(read_u32(&joined, 40), 400);
        assert_eq!(joined.len(), 444);

        assert_eq!(concat_wav(&[junk]), Err(WavError::NoUsableChunks(1)));
        assert_eq!(concat_wav::<Vec<u8>>(&[]), Err(WavError::NoUsableChunks(0)));
    }
}
