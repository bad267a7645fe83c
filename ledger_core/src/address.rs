//! Program-derived addresses.
//!
//! An address is `sha256(seeds.. || program_id || "ProgramDerivedAddress")`,
//! accepted only when the digest is not a valid ed25519 point, so no private
//! key can ever sign for it. `find_program_address` walks the bump seed down
//! from 255 and returns the first (canonical) bump that lands off the curve.

use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::account::{AccountId, ProgramId};

pub const MAX_SEED_LEN: usize = 32;
pub const MAX_SEEDS: usize = 16;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("seed longer than {MAX_SEED_LEN} bytes")]
    MaxSeedLengthExceeded,
    #[error("more than {MAX_SEEDS} seeds")]
    TooManySeeds,
    #[error("derived address is a valid curve point")]
    OnCurve,
    #[error("no bump seed yields an off-curve address")]
    NoViableBump,
}

/// Whether `bytes` decompress to a point on the ed25519 curve.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &ProgramId,
) -> Result<AccountId, AddressError> {
    if seeds.len() > MAX_SEEDS {
        return Err(AddressError::TooManySeeds);
    }
    if seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return Err(AddressError::MaxSeedLengthExceeded);
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    let digest: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&digest) {
        return Err(AddressError::OnCurve);
    }
    Ok(AccountId::new(digest))
}

/// Search for the canonical bump and return `(address, bump)`.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &ProgramId,
) -> Result<(AccountId, u8), AddressError> {
    // The bump occupies one seed slot.
    if seeds.len() >= MAX_SEEDS {
        return Err(AddressError::TooManySeeds);
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = seeds.to_vec();
        with_bump.push(&bump_seed);

        match create_program_address(&with_bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(AddressError::OnCurve) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(AddressError::NoViableBump)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> ProgramId {
        AccountId::new([9u8; 32])
    }

    #[test]
    fn test_find_program_address_is_deterministic() {
        let owner = [3u8; 32];
        let a = find_program_address(&[b"campaign", &owner, b"label"], &program()).unwrap();
        let b = find_program_address(&[b"campaign", &owner, b"label"], &program()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_found_address_is_off_curve_and_canonical() {
        let seeds: &[&[u8]] = &[b"campaign", b"someone"];
        let (address, bump) = find_program_address(seeds, &program()).unwrap();
        assert!(!is_on_curve(address.value()));

        let bump_seed = [bump];
        let recreated =
            create_program_address(&[b"campaign", b"someone", &bump_seed], &program()).unwrap();
        assert_eq!(recreated, address);

        // Every higher bump must have landed on the curve.
        for higher in (u16::from(bump) + 1)..=255 {
            let seed = [higher as u8];
            assert_eq!(
                create_program_address(&[b"campaign", b"someone", &seed], &program()),
                Err(AddressError::OnCurve)
            );
        }
    }

    #[test]
    fn test_different_labels_give_different_addresses() {
        let (a, _) = find_program_address(&[b"campaign", b"one"], &program()).unwrap();
        let (b, _) = find_program_address(&[b"campaign", b"two"], &program()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_program_id_is_part_of_the_address() {
        let other = AccountId::new([10u8; 32]);
        let (a, _) = find_program_address(&[b"campaign"], &program()).unwrap();
        let (b, _) = find_program_address(&[b"campaign"], &other).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_oversized_seed_is_rejected() {
        let long = [0u8; MAX_SEED_LEN + 1];
        assert_eq!(
            find_program_address(&[&long], &program()),
            Err(AddressError::MaxSeedLengthExceeded)
        );
    }

    #[test]
    fn test_too_many_seeds_is_rejected() {
        let seeds: Vec<&[u8]> = vec![&b"x"[..]; MAX_SEEDS];
        assert_eq!(
            find_program_address(&seeds, &program()),
            Err(AddressError::TooManySeeds)
        );
    }

    #[test]
    fn test_identity_point_is_on_curve() {
        // Compressed encoding of the neutral element.
        let mut identity = [0u8; 32];
        identity[0] = 1;
        assert!(is_on_curve(&identity));
    }
}
