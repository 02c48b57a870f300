use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::cipher::{CipherBackend, RustCryptoBackend};
use crate::config::{AlgorithmConfig, CampaignConfig, KeyPolicy};
use crate::error::Result;
use crate::executor::Executor;
use crate::payload;
use crate::results::{AlgorithmRun, Campaign};

/// Drives the algorithm x size matrix for one campaign.
///
/// Runs come out in `config.algorithms` order and observations in
/// `config.payloads` order. Any failure aborts the whole campaign and the
/// partial runs are dropped.
pub struct CampaignRunner<B> {
    config: CampaignConfig,
    executor: Executor<B>,
    rng: StdRng,
    /// Keys per (size index, key length) under `KeyPolicy::SharedAcrossAlgorithms`.
    shared_keys: HashMap<(usize, usize), Vec<u8>>,
}

impl CampaignRunner<RustCryptoBackend> {
    pub fn new(config: CampaignConfig) -> Result<Self> {
        Self::with_backend(config, RustCryptoBackend)
    }
}

impl<B: CipherBackend> CampaignRunner<B> {
    pub fn with_backend(config: CampaignConfig, backend: B) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            executor: Executor::new(backend),
            rng,
            shared_keys: HashMap::new(),
        })
    }

    pub fn executor(&self) -> &Executor<B> {
        &self.executor
    }

    fn key_for(&mut self, size_index: usize, alg: &AlgorithmConfig) -> Vec<u8> {
        let fresh = |rng: &mut StdRng| {
            let mut key = vec![0u8; alg.key_len];
            rng.fill_bytes(&mut key);
            key
        };
        match self.config.key_policy {
            KeyPolicy::PerCell => fresh(&mut self.rng),
            KeyPolicy::SharedAcrossAlgorithms => self
                .shared_keys
                .entry((size_index, alg.key_len))
                .or_insert_with(|| fresh(&mut self.rng))
                .clone(),
        }
    }

    /// Execute every cell once and collect the results.
    pub fn run(&mut self) -> Result<Campaign> {
        let algorithms = self.config.algorithms.clone();
        let mut runs = Vec::with_capacity(algorithms.len());

        for alg in &algorithms {
            runs.push(self.run_algorithm(alg)?);
        }

        tracing::info!(
            runs = runs.len(),
            sizes = self.config.payloads.len(),
            nonces = self.executor.nonces().len(),
            "campaign complete"
        );
        Ok(Campaign::new(runs))
    }

    fn run_algorithm(&mut self, alg: &AlgorithmConfig) -> Result<AlgorithmRun> {
        let mut run = AlgorithmRun::new(alg.label.clone());
        let fill = self.config.fill;

        for index in 0..self.config.payloads.len() {
            let spec = &self.config.payloads[index];
            let label = spec.label();
            tracing::info!(algorithm = %alg.label, size = %label, "measuring round trip");

            let payload = payload::produce(spec, fill, &mut self.rng)?;
            let key = self.key_for(index, alg);
            let observation = self
                .executor
                .execute(alg, &key, &payload, &mut self.rng)
                .inspect_err(|e| {
                    tracing::error!(
                        algorithm = %alg.label,
                        size = %label,
                        error = %e,
                        "campaign aborted"
                    );
                })?;

            tracing::info!(
                algorithm = %alg.label,
                size = %label,
                bytes = observation.payload_bytes,
                seconds = observation.execution_time_in_seconds,
                "round trip measured"
            );
            run.push(observation);
        }
        Ok(run)
    }
}

/// Run one campaign for `config` with `backend`.
pub fn run<B: CipherBackend>(config: CampaignConfig, backend: B) -> Result<Campaign> {
    CampaignRunner::with_backend(config, backend)?.run()
}
