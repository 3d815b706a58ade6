//! # Domain Services
//!
//! Pure functions behind the request validator and engine deployment.
//!
//! - NO I/O operations
//! - NO async code
//! - Deterministic

use crate::domain::entities::DistributionRequest;
use crate::domain::value_objects::{Address, Hash, U256};
use crate::errors::DistributorError;
use sha3::{Digest, Keccak256};

// =============================================================================
// REQUEST VALIDATION
// =============================================================================

/// Structural validation of a distribution request.
///
/// Returns the checked total on success. Empty requests, zero amounts,
/// duplicate receivers and the zero address as a receiver are all accepted.
///
/// # Errors
///
/// - `LengthMismatch` if the sequences differ in length
/// - `AmountOverflow` if the total does not fit in 256 bits
pub fn validate_request(request: &DistributionRequest) -> Result<U256, DistributorError> {
    if request.receivers.len() != request.amounts.len() {
        return Err(DistributorError::LengthMismatch {
            receivers: request.receivers.len(),
            amounts: request.amounts.len(),
        });
    }

    request.total().ok_or(DistributorError::AmountOverflow)
}

/// Fails when a request would issue more transfers than one call may perform.
///
/// # Errors
///
/// `TooManyTransfers` if `count > max`.
pub fn check_transfer_limit(count: usize, max: usize) -> Result<(), DistributorError> {
    if count > max {
        return Err(DistributorError::TooManyTransfers { count, max });
    }
    Ok(())
}

/// Exact-match rule for native distributions.
///
/// # Errors
///
/// `ValueMismatch` unless `attached == total`.
pub fn ensure_exact_value(attached: U256, total: U256) -> Result<(), DistributorError> {
    if attached != total {
        return Err(DistributorError::ValueMismatch { attached, total });
    }
    Ok(())
}

// =============================================================================
// ENGINE ADDRESS
// =============================================================================

/// Computes the address of an engine deployed by `deployer` at `nonce`.
///
/// Address = keccak256(rlp(\[deployer, nonce\]))\[12:\]
#[must_use]
pub fn compute_deployment_address(deployer: Address, nonce: u64) -> Address {
    let mut content = Vec::with_capacity(30);

    // 20-byte string: 0x80 + 20
    content.push(0x94);
    content.extend_from_slice(deployer.as_bytes());

    if nonce == 0 {
        content.push(0x80);
    } else if nonce < 0x80 {
        content.push(nonce.to_be_bytes()[7]);
    } else {
        let bytes = nonce.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
        let significant = &bytes[start..];
        content.push(0x80 + significant.len() as u8);
        content.extend_from_slice(significant);
    }

    // Content never exceeds 30 bytes, so the short list header applies.
    let mut rlp = Vec::with_capacity(content.len() + 1);
    rlp.push(0xc0 + content.len() as u8);
    rlp.extend_from_slice(&content);

    let hash = Keccak256::digest(&rlp);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Address::new(addr)
}

/// Computes keccak256 hash of data.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let hash = Keccak256::digest(data);
    Hash::new(hash.into())
}

// =============================================================================
// TESTS
// =============================================================================
