//! Saving and loading network weights.
//!
//! # `.bpat` Weight Format
//!
//! [`Weights`] are stored as two tensors, `Wh` then `Theta`, in the `bpat`
//! layout:
//!
//! ```text
//! ┌────────────┬────────────┬─────────────────────┐
//! │ Header     │ Tensor Wh  │ Tensor Theta        │
//! ├────────────┼────────────┼─────────────────────┤
//! │ "bpat"[4]  │ u64: ndim  │ u64: ndim           │
//! │ u8: count  │ [u64; ndim] shape                │
//! │            │ [f64; prod(shape)] data          │
//! └────────────┴──────────────────────────────────┘
//! ```
//!
//! All integers and floats are little-endian. On load each tensor's payload
//! must be exactly as long as its header claims, and the two tensors must
//! form a valid `(Wh, Theta)` pair; both checks go through `briny`'s
//! [`TrustedData`] before anything is handed back.
//!
//! # Example
//!
//! ```rust
//! use relu_backprop::modelio::{load_weights, save_weights};
//! use relu_backprop::network::Weights;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let path = std::env::temp_dir().join("relu_backprop_doc.bpat");
//!     let weights = Weights::zeros(1, 3);
//!     save_weights(&path, &weights)?;
//!     assert_eq!(load_weights(&path)?, weights);
//!     Ok(())
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use briny::prelude::{TrustedData, Validate, ValidationError};
use tracing::info;

use crate::error::ModelIoError;
use crate::network::Weights;
use crate::tensors::Ten64;

const BPAT_MAGIC: &[u8; 4] = b"bpat";

/// `Wh` and `Theta`.
const TENSOR_COUNT: u8 = 2;

/// A tensor as read from disk: its header and whatever payload bytes followed.
struct PackedTensor {
    shape: Vec<u64>,
    payload: Vec<u8>,
}

/// Payload size in bytes implied by `shape`, or `None` on overflow.
fn payload_len(shape: &[u64]) -> Option<u64> {
    shape.iter().try_fold(F64_BYTES, |acc, &d| acc.checked_mul(d))
}

impl Validate for PackedTensor {
    fn validate(&self) -> Result<(), ValidationError> {
        match payload_len(&self.shape) {
            Some(n) if n == self.payload.len() as u64 => Ok(()),
            _ => Err(ValidationError),
        }
    }
}

fn write_tensor(out: &mut impl Write, tensor: &Ten64) -> Result<(), ModelIoError> {
    out.write_all(&(tensor.shape.len() as u64).to_le_bytes())?;
    for &dim in &tensor.shape {
        out.write_all(&(dim as u64).to_le_bytes())?;
    }
    for &val in &tensor.data {
        out.write_all(&val.to_le_bytes())?;
    }
    Ok(())
}

fn read_u64(input: &mut impl Read) -> Result<u64, ModelIoError> {
    let mut buf8 = [0u8; 8];
    input.read_exact(&mut buf8)?;
    Ok(u64::from_le_bytes(buf8))
}

const F64_BYTES: u64 = 8;

/// Dimensions above this are rejected before reading a shape.
const MAX_NDIM: u64 = 8;

fn read_tensor(input: &mut impl Read) -> Result<Ten64, ModelIoError> {
    let ndim = read_u64(input)?;
    if ndim > MAX_NDIM {
        return Err(ModelIoError::Corrupt("too many dimensions"));
    }

    let mut shape = Vec::with_capacity(ndim as usize);
    for _ in 0..ndim {
        shape.push(read_u64(input)?);
    }

    let len = payload_len(&shape).ok_or(ModelIoError::Corrupt("shape overflows"))?;
    let mut payload = Vec::new();
    input.by_ref().take(len).read_to_end(&mut payload)?;

    let packed = TrustedData::new(PackedTensor { shape, payload })
        .map_err(|_| ModelIoError::Corrupt("tensor payload is shorter than its header"))?
        .into_inner();

    let shape: Vec<usize> = packed.shape.iter().map(|&d| d as usize).collect();
    let data = packed
        .payload
        .chunks_exact(F64_BYTES as usize)
        .map(|chunk| {
            let mut buf8 = [0u8; 8];
            buf8.copy_from_slice(chunk);
            f64::from_le_bytes(buf8)
        })
        .collect();
    Ok(Ten64::new(shape, data))
}

/// Writes `weights` to `path`, replacing any existing file.
///
/// # Errors
/// [`ModelIoError::Io`] if the file cannot be created or written.
pub fn save_weights(path: impl AsRef<Path>, weights: &Weights) -> Result<(), ModelIoError> {
    let path = path.as_ref();
    let mut file = BufWriter::new(File::create(path)?);

    file.write_all(BPAT_MAGIC)?;
    file.write_all(&[TENSOR_COUNT])?;
    write_tensor(&mut file, weights.wh())?;
    write_tensor(&mut file, weights.theta())?;
    file.flush()?;

    info!(
        path = %path.display(),
        d = weights.input_dim(),
        m = weights.hidden_width(),
        "saved weights"
    );
    Ok(())
}

/// Reads weights previously written by [`save_weights`].
///
/// # Errors
/// - [`ModelIoError::InvalidMagic`] if the file is not a `bpat` file
/// - [`ModelIoError::Corrupt`] if it does not hold exactly two tensors, a
///   payload is cut short, or the tensors do not form a valid `(Wh, Theta)` pair
/// - [`ModelIoError::Io`] on read failures, including a truncated header
pub fn load_weights(path: impl AsRef<Path>) -> Result<Weights, ModelIoError> {
    let path = path.as_ref();
    let mut file = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    if &magic != BPAT_MAGIC {
        return Err(ModelIoError::InvalidMagic);
    }

    let mut count = [0u8; 1];
    file.read_exact(&mut count)?;
    if count[0] != TENSOR_COUNT {
        return Err(ModelIoError::Corrupt("expected exactly two tensors"));
    }

    let wh = read_tensor(&mut file)?;
    let theta = read_tensor(&mut file)?;
    let weights = TrustedData::new(Weights::unchecked(wh, theta))
        .map_err(|_| ModelIoError::Corrupt("tensors do not form a (Wh, Theta) pair"))?
        .into_inner();

    info!(
        path = %path.display(),
        d = weights.input_dim(),
        m = weights.hidden_width(),
        "loaded weights"
    );
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("relu_backprop_{}_{name}.bpat", std::process::id()))
    }

    #[test]
    fn weights_survive_a_save_load_cycle() {
        let path = scratch("cycle");
        let weights = Weights::new(
            tensor!([[0.5, -1.25, 3.0], [0.0, 0.1, -0.2]]),
            tensor!([[1.0], [-2.0], [0.25], [7.5]]),
        )
        .unwrap();

        save_weights(&path, &weights).unwrap();
        let loaded = load_weights(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, weights);
    }

    #[test]
    fn rejects_foreign_files() {
        let path = scratch("magic");
        std::fs::write(&path, b"nope\x02").unwrap();
        let err = load_weights(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ModelIoError::InvalidMagic));
    }

    /// Writes `magic`, `count` and each raw `u64` word, nothing else.
    fn write_raw(path: &Path, count: u8, words: &[u64]) {
        let mut file = BufWriter::new(File::create(path).unwrap());
        file.write_all(BPAT_MAGIC).unwrap();
        file.write_all(&[count]).unwrap();
        for w in words {
            file.write_all(&w.to_le_bytes()).unwrap();
        }
        file.flush().unwrap();
    }

    fn load_raw(name: &str, count: u8, words: &[u64]) -> ModelIoError {
        let path = scratch(name);
        write_raw(&path, count, words);
        let err = load_weights(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        err
    }

    #[test]
    fn short_payload_is_corrupt() {
        let path = scratch("short_payload");
        save_weights(&path, &Weights::zeros(2, 2)).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();
        let err = load_weights(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ModelIoError::Corrupt(_)));
    }

    #[test]
    fn header_claiming_more_data_than_the_file_holds_is_corrupt() {
        // (2, 3) promises six floats; only one follows
        let err = load_raw("oversized", TENSOR_COUNT, &[2, 2, 3, 1.5f64.to_bits()]);
        assert!(matches!(err, ModelIoError::Corrupt(_)));
    }

    #[test]
    fn truncated_header_is_an_io_error() {
        let path = scratch("truncated_header");
        std::fs::write(&path, b"bpat\x02\x02\x00\x00").unwrap();
        let err = load_weights(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ModelIoError::Io(_)));
    }

    #[test]
    fn rejects_wrong_tensor_count() {
        let err = load_raw("count", 3, &[]);
        assert!(matches!(err, ModelIoError::Corrupt("expected exactly two tensors")));
    }

    #[test]
    fn rejects_too_many_dimensions() {
        let err = load_raw("ndim", TENSOR_COUNT, &[MAX_NDIM + 1]);
        assert!(matches!(err, ModelIoError::Corrupt("too many dimensions")));
    }

    #[test]
    fn rejects_overflowing_shape() {
        let err = load_raw("overflow", TENSOR_COUNT, &[2, u64::MAX, 2]);
        assert!(matches!(err, ModelIoError::Corrupt("shape overflows")));
    }

    #[test]
    fn packed_tensor_validation() {
        let ok = PackedTensor { shape: vec![2, 1], payload: vec![0; 16] };
        let short = PackedTensor { shape: vec![2, 1], payload: vec![0; 15] };
        let scalar = PackedTensor { shape: vec![], payload: vec![0; 8] };
        assert!(ok.validate().is_ok());
        assert!(short.validate().is_err());
        assert!(scalar.validate().is_ok());
    }

    #[test]
    fn rejects_inconsistent_pairs() {
        let path = scratch("pair");
        let mut file = BufWriter::new(File::create(&path).unwrap());
        file.write_all(BPAT_MAGIC).unwrap();
        file.write_all(&[TENSOR_COUNT]).unwrap();
        write_tensor(&mut file, &Ten64::zeros(vec![2, 3])).unwrap();
        write_tensor(&mut file, &Ten64::zeros(vec![2, 1])).unwrap();
        drop(file);

        let err = load_weights(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ModelIoError::Corrupt("tensors do not form a (Wh, Theta) pair")));
    }
}
