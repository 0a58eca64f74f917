use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Gzips `data` in one buffered pass.
pub(crate) fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
