//! The read-only transaction validator (`spec.md` §4.4): five checks, run
//! in order, stopping at the first failure. Never mutates state.

use miniroha_core::{Instruction, MinirohaError, Transaction};
use miniroha_crypto::canonical_bytes;
use miniroha_state::StateStore;

fn is_decimal_amount(s: &str) -> bool {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match frac_part {
        Some(f) => !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

/// Per-instruction structural validation (`spec.md` §4.4 step 5): identifier
/// shapes are already enforced by the typed id newtypes at deserialization,
/// so only the fields a newtype cannot cover — precision range, amount
/// shape — are checked here.
fn validate_instruction_shape(instruction: &Instruction) -> Result<(), MinirohaError> {
    match instruction {
        Instruction::RegisterDomain { .. } => Ok(()),
        Instruction::RegisterAccount { public_key, .. } => {
            if public_key.is_empty() {
                return Err(MinirohaError::InvalidPublicKey);
            }
            Ok(())
        }
        Instruction::RegisterAsset { precision, .. } => {
            if *precision > 18 {
                return Err(MinirohaError::InvalidPrecision);
            }
            Ok(())
        }
        Instruction::MintAsset { amount, .. }
        | Instruction::BurnAsset { amount, .. }
        | Instruction::TransferAsset { amount, .. } => {
            if !is_decimal_amount(amount) {
                return Err(MinirohaError::InvalidAmountFormat);
            }
            Ok(())
        }
        Instruction::GrantRole { .. } | Instruction::RevokeRole { .. } => Ok(()),
    }
}

/// Validate `tx` against `store`, in the exact order `spec.md` §4.4
/// specifies: signature, structure, nonce, permissions, per-instruction
/// shape.
pub fn validate(tx: &Transaction, store: &StateStore) -> Result<(), MinirohaError> {
    let signer_id = tx.body.signer_id.as_str();

    // 1. Signature.
    let account = store
        .get_account(signer_id)?
        .ok_or(MinirohaError::InvalidSignature)?;
    if tx.signature.public_key != account.public_key {
        return Err(MinirohaError::InvalidSignature);
    }
    let body_bytes = canonical_bytes(&tx.body).map_err(|e| MinirohaError::Serialization(e.to_string()))?;
    if !miniroha_crypto::verify(&tx.signature.public_key, &tx.signature.signature, &body_bytes) {
        return Err(MinirohaError::InvalidSignature);
    }

    // 2. Structure.
    if tx.body.chain_id.is_empty() {
        return Err(MinirohaError::MissingChainId);
    }
    if tx.body.instructions.is_empty() {
        return Err(MinirohaError::InvalidInstructions);
    }
    if tx.body.created_at <= 0 {
        return Err(MinirohaError::InvalidCreatedAt);
    }

    // 3. Nonce.
    let last_seen = store.get_last_seen_nonce(signer_id)?;
    if tx.body.nonce <= last_seen {
        return Err(MinirohaError::InvalidNonce {
            last_seen,
            got: tx.body.nonce,
        });
    }

    // 4. Permissions.
    let roles = store.get_account_roles(signer_id)?;
    let mut permissions: Vec<String> = Vec::new();
    for role_id in &roles.0 {
        if let Some(role) = store.get_role(role_id.0.as_str())? {
            permissions.extend(role.permissions);
        }
    }
    let has_wildcard = permissions.iter().any(|p| p == miniroha_core::WILDCARD_PERMISSION);
    if !has_wildcard {
        for instruction in &tx.body.instructions {
            let required = instruction.name();
            if !permissions.iter().any(|p| p == required) {
                return Err(MinirohaError::PermissionDenied);
            }
        }
    }

    // 5. Per-instruction structural validation.
    for instruction in &tx.body.instructions {
        validate_instruction_shape(instruction)?;
    }

    Ok(())
}
