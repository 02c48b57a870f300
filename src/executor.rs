use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::RngCore;

use crate::cipher::CipherBackend;
use crate::config::AlgorithmConfig;
use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::results::TimingObservation;

/// Run `f` and return its result together with the time it took. The clock
/// stops on every return from `f`, successful or not.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

/// Every (key, nonce) pair handed out during one campaign.
#[derive(Debug, Default)]
pub struct NonceLedger {
    issued: HashSet<(Vec<u8>, Vec<u8>)>,
}

impl NonceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a nonce of `len` bytes that has never been used with `key`.
    pub fn issue<R: RngCore + ?Sized>(&mut self, key: &[u8], len: usize, rng: &mut R) -> Vec<u8> {
        loop {
            let mut nonce = vec![0u8; len];
            rng.fill_bytes(&mut nonce);
            if self.issued.insert((key.to_vec(), nonce.clone())) {
                return nonce;
            }
            tracing::debug!(len, "nonce collision, drawing again");
        }
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

/// Times encrypt-then-decrypt round trips and checks they reproduce the input.
pub struct Executor<B> {
    backend: B,
    nonces: NonceLedger,
}

impl<B: CipherBackend> Executor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            nonces: NonceLedger::new(),
        }
    }

    pub fn nonces(&self) -> &NonceLedger {
        &self.nonces
    }

    /// Encrypt then decrypt `payload` under `key`, returning the time spent
    /// in the two cipher calls only. Nonce and associated data are drawn
    /// before the clock starts.
    pub fn execute<R: RngCore + ?Sized>(
        &mut self,
        config: &AlgorithmConfig,
        key: &[u8],
        payload: &Payload,
        rng: &mut R,
    ) -> Result<TimingObservation> {
        let nonce = self.nonces.issue(key, config.nonce_len, rng);
        let mut associated_data = vec![0u8; config.associated_data_len];
        rng.fill_bytes(&mut associated_data);

        let backend = &self.backend;
        let algorithm = config.algorithm;
        let (decrypted, elapsed) = timed(|| -> Result<Vec<u8>> {
            let ciphertext =
                backend.encrypt(algorithm, key, &nonce, &associated_data, &payload.bytes)?;
            backend.decrypt(algorithm, key, &nonce, &associated_data, &ciphertext)
        });
        let decrypted = decrypted.map_err(|e| match e {
            Error::Cipher { message, .. } => Error::Cipher {
                algorithm: config.label.clone(),
                message: format!("{message} (payload {})", payload.label),
            },
            other => other,
        })?;

        if decrypted != payload.bytes {
            tracing::error!(
                algorithm = %config.label,
                size = %payload.label,
                "decrypted output differs from input"
            );
            return Err(Error::RoundTripMismatch {
                algorithm: config.label.clone(),
                size: payload.label.clone(),
            });
        }

        Ok(TimingObservation {
            size: payload.label.clone(),
            execution_time_in_seconds: elapsed.as_secs_f64(),
            payload_bytes: payload.len(),
        })
    }
}
