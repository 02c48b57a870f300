use rand::RngCore;

use crate::config::{FillMode, PayloadSource, PayloadSpec};
use crate::error::{Error, Result};

const MB: f64 = 1024.0 * 1024.0;

/// Bytes to encrypt plus the size label they are reported under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    pub label: String,
    pub bytes: Vec<u8>,
}

impl Payload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Exact byte length of a synthetic payload of `size_mb` megabytes.
pub fn synthetic_len(size_mb: f64) -> usize {
    (size_mb * MB).round() as usize
}

/// Fill a buffer of `len` bytes according to `fill`.
pub fn synthetic_bytes<R: RngCore + ?Sized>(len: usize, fill: FillMode, rng: &mut R) -> Vec<u8> {
    match fill {
        FillMode::Random => {
            let mut buf = vec![0u8; len];
            rng.fill_bytes(&mut buf);
            buf
        }
        FillMode::Pattern => (0..len).map(|i| (i % 256) as u8).collect(),
    }
}

/// Produce the payload for `spec`.
///
/// Asset-backed payloads are returned verbatim whatever their real size; the
/// nominal size stays the label. A mismatch is logged, not corrected.
pub fn produce<R: RngCore + ?Sized>(
    spec: &PayloadSpec,
    fill: FillMode,
    rng: &mut R,
) -> Result<Payload> {
    spec.check()?;
    let label = spec.label();
    let bytes = match &spec.source {
        PayloadSource::Synthetic => synthetic_bytes(synthetic_len(spec.size_mb), fill, rng),
        PayloadSource::Asset(path) => {
            let bytes = std::fs::read(path).map_err(|source| Error::PayloadUnavailable {
                size: label.clone(),
                path: path.clone(),
                source,
            })?;
            let nominal = synthetic_len(spec.size_mb);
            if bytes.len() != nominal {
                tracing::warn!(
                    path = %path.display(),
                    label = %label,
                    actual_bytes = bytes.len(),
                    nominal_bytes = nominal,
                    "asset size differs from its nominal label"
                );
            }
            bytes
        }
    };
    Ok(Payload { label, bytes })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn synthetic_len_rounds_fractional_sizes() {
        assert_eq!(synthetic_len(1.0), 1_048_576);
        assert_eq!(synthetic_len(0.1), 104_858);
        assert_eq!(synthetic_len(0.4), 419_430);
        assert_eq!(synthetic_len(0.0), 0);
    }

    #[test]
    fn produce_synthetic_has_exact_length() {
        let mut rng = StdRng::seed_from_u64(7);
        for size in [0.1, 0.25, 0.4, 1.0, 1.5] {
            let p = produce(&PayloadSpec::synthetic(size), FillMode::Random, &mut rng).unwrap();
            assert_eq!(p.len(), synthetic_len(size), "size {size}");
            assert_eq!(p.label, format!("{size}MB"));
        }
    }

    #[test]
    fn pattern_fill_repeats_every_256_bytes() {
        let mut rng = StdRng::seed_from_u64(0);
        let bytes = synthetic_bytes(600, FillMode::Pattern, &mut rng);
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[255], 255);
        assert_eq!(bytes[256], 0);
        assert_eq!(bytes[599], (599 % 256) as u8);
    }

    #[test]
    fn random_fill_is_reproducible_with_seed() {
        let a = synthetic_bytes(4096, FillMode::Random, &mut StdRng::seed_from_u64(42));
        let b = synthetic_bytes(4096, FillMode::Random, &mut StdRng::seed_from_u64(42));
        let c = synthetic_bytes(4096, FillMode::Random, &mut StdRng::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn asset_is_read_whole_regardless_of_label() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("image.jpg");
        let contents: Vec<u8> = (0..200_000).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &contents).unwrap();

        let spec = PayloadSpec::asset(2.7, &path);
        let p = produce(&spec, FillMode::Random, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(p.label, "2.7MB");
        assert_eq!(p.bytes, contents);
    }

    #[test]
    fn oversized_synthetic_spec_is_an_error_not_a_panic() {
        let spec = PayloadSpec::synthetic(1e20);
        let err = produce(&spec, FillMode::Pattern, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {err}");
    }

    #[test]
    fn missing_asset_is_payload_unavailable() {
        let spec = PayloadSpec::asset(2.7, "/nonexistent/ciphermark/image.jpg");
        let err = produce(&spec, FillMode::Random, &mut StdRng::seed_from_u64(0)).unwrap_err();
        match err {
            Error::PayloadUnavailable { size, path, .. } => {
                assert_eq!(size, "2.7MB");
                assert!(path.ends_with("image.jpg"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
