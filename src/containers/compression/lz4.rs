use crate::containers::{CompressionContainer, ContainerHandler};
use crate::error::{ReplayError, Result};
use lz4_flex::block::DecompressError;
use std::io::{self, Read};
use tracing::{debug, warn};

// Stored .vtr files are LZ4 compressed. Newer files use the LZ4 frame format, older ones
// are a bare LZ4 block with no recorded decompressed size, so the output size has to be guessed.

const LZ4_FRAME_MAGIC: &[u8] = &[0x04, 0x22, 0x4D, 0x18];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressOptions {
    /// First block output guess is `input length * size_multiplier`
    pub size_multiplier: usize,
    /// Lower bound for the first guess
    pub min_output_size: usize,
    /// The guess is doubled until it reaches this limit
    pub max_output_size: usize,
}

impl Default for DecompressOptions {
    fn default() -> Self {
        DecompressOptions {
            size_multiplier: 255,
            min_output_size: 4096,
            max_output_size: 1 << 30,
        }
    }
}

#[derive(Debug)]
pub struct Lz4Container {
    pub compressed_data: Vec<u8>,
    pub options: DecompressOptions,
}

impl Lz4Container {
    pub fn with_options(data: &[u8], options: DecompressOptions) -> Self {
        Lz4Container {
            compressed_data: data.to_vec(),
            options,
        }
    }

    fn decompress_frame(&self) -> io::Result<Vec<u8>> {
        let mut decoder = lz4_flex::frame::FrameDecoder::new(self.compressed_data.as_slice());
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        Ok(decompressed)
    }

    fn decompress_block(&self) -> Result<Vec<u8>> {
        let max_size = self.options.max_output_size;
        let mut target = self
            .compressed_data
            .len()
            .saturating_mul(self.options.size_multiplier)
            .max(self.options.min_output_size)
            .min(max_size);

        loop {
            match lz4_flex::block::decompress(&self.compressed_data, target) {
                Ok(decompressed) => return Ok(decompressed),
                Err(DecompressError::OutputTooSmall { .. }) => {
                    if target >= max_size {
                        return Err(ReplayError::CorruptInput(format!(
                            "LZ4 block output exceeds {} bytes",
                            max_size
                        )));
                    }
                    target = target.saturating_mul(2).min(max_size);
                    debug!(
                        "LZ4 output buffer too small, retrying with {} bytes",
                        target
                    );
                }
                Err(e) => {
                    return Err(ReplayError::CorruptInput(format!(
                        "LZ4 block decode failed: {}",
                        e
                    )))
                }
            }
        }
    }
}

impl ContainerHandler for Lz4Container {
    fn magic_word() -> &'static [u8] {
        LZ4_FRAME_MAGIC
    }

    fn deserialise(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(ReplayError::CorruptInput("Empty LZ4 payload".to_string()));
        }
        Ok(Self::with_options(data, DecompressOptions::default()))
    }
}

impl CompressionContainer for Lz4Container {
    fn decompress(&self) -> Result<Vec<u8>> {
        if Self::matches(&self.compressed_data) {
            match self.decompress_frame() {
                Ok(decompressed) => return Ok(decompressed),
                Err(e) => warn!(
                    "LZ4 frame decode failed ({}), falling back to block decode",
                    e
                ),
            }
        }

        self.decompress_block()
    }
}

/// Inflate a stored .vtr file into the raw replay buffer
pub fn decompress_vtr(data: &[u8], options: &DecompressOptions) -> Result<Vec<u8>> {
    let mut container = Lz4Container::deserialise(data)?;
    container.options = *options;

    let decompressed = container.decompress()?;
    debug!(
        "Decompressed {} bytes into {} bytes",
        data.len(),
        decompressed.len()
    );
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_payload() -> Vec<u8> {
        (0..20_000u32)
            .flat_map(|i| (i % 97).to_le_bytes())
            .collect()
    }

    fn small_limits() -> DecompressOptions {
        DecompressOptions {
            size_multiplier: 1,
            min_output_size: 16,
            max_output_size: 1 << 16,
        }
    }

    #[test]
    fn test_frame_format() {
        let payload = sample_payload();
        let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
        encoder.write_all(&payload).unwrap();
        let compressed = encoder.finish().unwrap();

        assert!(Lz4Container::matches(&compressed));
        let container = Lz4Container::deserialise(&compressed).unwrap();
        assert_eq!(container.decompress().unwrap(), payload);
    }

    #[test]
    fn test_block_format_with_default_guess() {
        let payload = sample_payload();
        let compressed = lz4_flex::block::compress(&payload);

        assert!(!Lz4Container::matches(&compressed));
        let decompressed = decompress_vtr(&compressed, &DecompressOptions::default()).unwrap();
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn test_block_format_doubles_guess() {
        let payload = vec![7u8; 50_000];
        let compressed = lz4_flex::block::compress(&payload);
        // Start far below the real size
        let options = DecompressOptions {
            max_output_size: 1 << 20,
            ..small_limits()
        };

        assert_eq!(decompress_vtr(&compressed, &options).unwrap(), payload);
    }

    #[test]
    fn test_block_larger_than_limit() {
        let payload = vec![0u8; 200_000];
        let compressed = lz4_flex::block::compress(&payload);

        assert!(matches!(
            decompress_vtr(&compressed, &small_limits()),
            Err(ReplayError::CorruptInput(_))
        ));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let garbage = [0xFFu8; 32];
        assert!(matches!(
            decompress_vtr(&garbage, &small_limits()),
            Err(ReplayError::CorruptInput(_))
        ));
    }

    #[test]
    fn test_broken_frame_is_corrupt() {
        let mut data = LZ4_FRAME_MAGIC.to_vec();
        data.extend_from_slice(&[0xFF; 12]);
        assert!(matches!(
            decompress_vtr(&data, &small_limits()),
            Err(ReplayError::CorruptInput(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            decompress_vtr(&[], &DecompressOptions::default()),
            Err(ReplayError::CorruptInput(_))
        ));
    }

    #[test]
    fn test_options_reach_container() {
        // A 1 KiB payload cannot be inflated under a 64 byte ceiling
        let compressed = lz4_flex::block::compress(&[3u8; 1024]);
        let options = DecompressOptions {
            size_multiplier: 1,
            min_output_size: 16,
            max_output_size: 64,
        };
        assert!(matches!(
            decompress_vtr(&compressed, &options),
            Err(ReplayError::CorruptInput(_))
        ));
        assert_eq!(
            decompress_vtr(&compressed, &DecompressOptions::default()).unwrap(),
            vec![3u8; 1024]
        );
    }
}
