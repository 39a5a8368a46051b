/// Errors raised when a caller violates the codec's call contract.
///
/// Data-dependent encode/decode failures are not errors; those surface as an
/// absent result instead. See the crate docs for the two failure tiers.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The device id has the wrong length for the frame format.
    #[error("device id must be exactly {expected} bytes ({actual} given)")]
    InvalidIdentity { expected: usize, actual: usize },

    /// A payload or frame length is outside its contract bounds.
    #[error("{field} length {len} out of range [{min}, {max}]")]
    LengthOutOfRange {
        field: &'static str,
        len: usize,
        min: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, CodecError>;
