/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

/// Transaction sequence number per signer (monotonically increasing).
pub type Nonce = u64;

/// Block height. Genesis is height 1; `0` is reserved for "no block yet".
pub type Height = u64;
