use thiserror::Error;

/// Flat error taxonomy shared by every layer (`spec.md` §7). Each
/// subsystem only ever constructs the variants in its own banner, but the
/// type is shared so callers crossing a component boundary don't have to
/// wrap errors in one another.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MinirohaError {
    // ── ValidationError ──────────────────────────────────────────────────────
    #[error("invalid signature")]
    InvalidSignature,
    #[error("missing chain id")]
    MissingChainId,
    #[error("missing signer id")]
    MissingSignerId,
    #[error("invalid nonce: expected greater than {last_seen}, got {got}")]
    InvalidNonce { last_seen: u64, got: u64 },
    #[error("invalid created_at timestamp")]
    InvalidCreatedAt,
    #[error("invalid instructions: must be non-empty")]
    InvalidInstructions,
    #[error("invalid signer id format: must be name@domain")]
    InvalidSignerFormat,
    #[error("invalid domain id")]
    InvalidDomainId,
    #[error("invalid domain id length")]
    InvalidDomainLength,
    #[error("invalid account id")]
    InvalidAccountId,
    #[error("invalid account id format: must be name@domain")]
    InvalidAccountFormat,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid asset id")]
    InvalidAssetId,
    #[error("invalid asset id format: must be symbol#domain")]
    InvalidAssetFormat,
    #[error("invalid precision: must be in [0, 18]")]
    InvalidPrecision,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("invalid amount format: must match ^\\d+(\\.\\d+)?$")]
    InvalidAmountFormat,
    #[error("invalid source account")]
    InvalidSrcAccount,
    #[error("invalid destination account")]
    InvalidDestAccount,
    #[error("invalid role id")]
    InvalidRoleId,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown instruction")]
    UnknownInstruction,

    // ── StateError (raised by the instruction engine) ───────────────────────
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("domain not found: {0}")]
    DomainNotFound(String),
    #[error("malformed id: {0}")]
    MalformedId(String),
    #[error("precision exceeded")]
    PrecisionExceeded,

    // ── ConsensusError ───────────────────────────────────────────────────────
    #[error("unknown validator: {0}")]
    UnknownValidator(String),
    #[error("invalid proposer")]
    InvalidProposer,
    #[error("invalid consensus signature")]
    ConsensusInvalidSignature,
    #[error("stale message")]
    StaleMessage,
    #[error("block verification failed: {0}")]
    BlockVerificationFailed(String),

    // ── StorageError ─────────────────────────────────────────────────────────
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),

    // ── General ──────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}
