//! Record store: registry persistence and the sealed tally pipeline.
//!
//! Write path: `TallyMapping -> CBOR -> seal -> FEC encode -> blob`
//! Read path:  `blob -> FEC decode -> open -> CBOR -> TallyMapping`
//!
//! The registry is passed into every call; the store keeps no per-event
//! state between operations. Keys are derived at the start of each call and
//! dropped (zeroized) at its end.

use tracing::{debug, error, warn};
use votevault_crypto::{DerivedKey, Fingerprint, NONCE_SIZE, derive_key, hash_pin, open, seal};

use crate::{
    blob::{BlobStore, FileStore},
    codec::FecCodec,
    config::StoreConfig,
    env::{Entropy, OsEntropy},
    error::StoreError,
    registry::{CandidateRegistry, RegistryContents},
    tally::TallyMapping,
};

/// Secure vote record store.
///
/// Generic over the blob backend and entropy source so tests can run the
/// full pipeline in memory, with injected faults, and with reproducible
/// nonces. [`RecordStore::open`] builds the production configuration.
pub struct RecordStore<S: BlobStore = FileStore, E: Entropy = OsEntropy> {
    /// Unencrypted candidate registries
    candidates: S,
    /// Sealed, error-corrected tallies
    votes: S,
    codec: FecCodec,
    pin_sentinel_key: String,
    entropy: E,
}

impl RecordStore<FileStore, OsEntropy> {
    /// File-backed store using the directories from `config`.
    ///
    /// Directories are not created here.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if `config` fails validation.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::with_backends(
            config,
            FileStore::new(&config.candidates_dir),
            FileStore::new(&config.votes_dir),
            OsEntropy,
        )
    }
}

impl<S: BlobStore, E: Entropy> RecordStore<S, E> {
    /// Store over explicit backends.
    ///
    /// Only `parity_bytes` and `pin_sentinel_key` are taken from `config`;
    /// the directories are whatever `candidates` and `votes` point at.
    pub fn with_backends(
        config: &StoreConfig,
        candidates: S,
        votes: S,
        entropy: E,
    ) -> Result<Self, StoreError> {
        config.validate()?;

        Ok(Self {
            candidates,
            votes,
            codec: FecCodec::new(config.parity_bytes)?,
            pin_sentinel_key: config.pin_sentinel_key.clone(),
            entropy,
        })
    }

    /// Codec used for vote files.
    pub fn codec(&self) -> &FecCodec {
        &self.codec
    }

    /// Register a new event, replacing any registry of the same name.
    ///
    /// The registry is written unencrypted; only the tally is secret. An
    /// existing vote file of the same name is left alone and will only open
    /// under the PIN it was written with.
    ///
    /// # Errors
    ///
    /// - `ReservedCategory`, `DuplicateCategory`, `DuplicateCandidate`,
    ///   `InvalidCategory`: rejected contents, nothing written
    /// - `InvalidName`: `name` is not a safe file name
    /// - `Io`: write failed; any previous registry file is intact
    pub fn register(
        &self,
        name: &str,
        pin: &[u8],
        contents: RegistryContents,
    ) -> Result<CandidateRegistry, StoreError> {
        let registry =
            CandidateRegistry::new(name, contents, hash_pin(pin), &self.pin_sentinel_key)?;

        let bytes = registry.to_cbor(&self.pin_sentinel_key)?;
        self.candidates.write(name, &bytes)?;

        debug!(
            registry = name,
            categories = registry.categories().len(),
            "registered candidates"
        );
        Ok(registry)
    }

    /// Load a previously registered event.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no registry under `name`
    /// - `Deserialization`: file exists but is not a valid registry
    pub fn load_registry(&self, name: &str) -> Result<CandidateRegistry, StoreError> {
        let bytes = self
            .candidates
            .read(name)?
            .ok_or_else(|| StoreError::NotFound { name: name.to_string() })?;

        let registry = CandidateRegistry::from_cbor(name, &bytes, &self.pin_sentinel_key)?;

        debug!(registry = name, categories = registry.categories().len(), "loaded candidates");
        Ok(registry)
    }

    /// Check a PIN against the registry. Pure; never fails.
    pub fn verify_pin(&self, registry: &CandidateRegistry, pin: &[u8]) -> bool {
        registry.verify_pin(pin)
    }

    /// Add a batch of selections to the registry's vote file.
    ///
    /// Loads the existing tally (or starts empty if there is no vote file),
    /// merges, reseals with a fresh nonce and atomically replaces the file.
    ///
    /// # Errors
    ///
    /// - `PinMismatch`: wrong PIN, nothing read or written
    /// - `UnrecoverableCorruption`, `AuthenticationFailure`,
    ///   `UnsupportedEnvelope`, `Deserialization`: the existing vote file
    ///   cannot be read; the operation aborts and the file is left untouched
    ///   rather than being replaced by a tally that would drop its votes
    /// - `Io`, `Entropy`: nothing was written
    pub fn store_votes(
        &self,
        registry: &CandidateRegistry,
        pin: &[u8],
        selections: &[Fingerprint],
    ) -> Result<(), StoreError> {
        let key = derive_key(registry.pin_verifier(), pin)?;

        let existing = self.load_tally(registry, &key).inspect_err(|e| {
            if e.is_data_loss_risk() {
                error!(
                    registry = registry.name(),
                    error = %e,
                    "existing votes unreadable, refusing to overwrite"
                );
            }
        })?;

        let merged = existing.merge(selections.iter().copied());

        let sealed = self.seal_tally(&merged, &key)?;
        self.votes.write(registry.name(), &sealed)?;

        debug!(
            registry = registry.name(),
            selections = selections.len(),
            total = merged.total(),
            "stored votes"
        );
        Ok(())
    }

    /// Read the registry's current tally.
    ///
    /// A missing vote file is not an error: no votes have been cast yet, so
    /// the tally is empty.
    ///
    /// # Errors
    ///
    /// - `PinMismatch`: wrong PIN, no tally data returned
    /// - `UnrecoverableCorruption`, `AuthenticationFailure`,
    ///   `UnsupportedEnvelope`, `Deserialization`: vote file unreadable
    /// - `Io`: backend read failed
    pub fn read_votes(
        &self,
        registry: &CandidateRegistry,
        pin: &[u8],
    ) -> Result<TallyMapping, StoreError> {
        let key = derive_key(registry.pin_verifier(), pin)?;
        self.load_tally(registry, &key)
    }

    /// Read path shared by [`store_votes`](Self::store_votes) and
    /// [`read_votes`](Self::read_votes).
    fn load_tally(
        &self,
        registry: &CandidateRegistry,
        key: &DerivedKey,
    ) -> Result<TallyMapping, StoreError> {
        let Some(encoded) = self.votes.read(registry.name())? else {
            debug!(registry = registry.name(), "no vote file, starting empty");
            return Ok(TallyMapping::new());
        };

        let (sealed, repaired) = self.codec.decode_with_repairs(&encoded)?;
        if repaired > 0 {
            warn!(
                registry = registry.name(),
                codewords = repaired,
                "repaired corrupted vote file codewords"
            );
        }

        let plaintext = open(key, &sealed)?;
        TallyMapping::from_cbor(&plaintext)
    }

    /// Write path: serialize, seal under a fresh nonce, FEC encode.
    fn seal_tally(&self, tally: &TallyMapping, key: &DerivedKey) -> Result<Vec<u8>, StoreError> {
        let plaintext = tally.to_cbor()?;

        let mut nonce = [0u8; NONCE_SIZE];
        self.entropy.fill_bytes(&mut nonce)?;

        let sealed = seal(key, &plaintext, nonce);
        Ok(self.codec.encode(&sealed))
    }
}
