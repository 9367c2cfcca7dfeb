//! Structural validation of proofs, verification keys and public signals.
//!
//! These checks are shape-only: they never touch curve arithmetic and never
//! fail on arbitrary JSON input. They exist to reject obviously malformed
//! submissions before the expensive pairing checks run.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ProvingSystem;

/// Outcome of a structural check.
///
/// `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }
}

/// Checks that `proof` has the shape snarkjs produces for `system`.
///
/// - groth16: `pi_a`, `pi_b`, `pi_c` are arrays of exactly 3 elements
/// - plonk/fflonk: commitments `A`, `B`, `C` are arrays
/// - all systems: `protocol` equals the system tag
pub fn validate_proof(proof: &Value, system: ProvingSystem) -> ValidationReport {
    let Some(obj) = proof.as_object() else {
        return ValidationReport::from_errors(vec!["proof must be a JSON object".into()]);
    };

    let mut errors = Vec::new();
    match system {
        ProvingSystem::Groth16 => {
            for field in ["pi_a", "pi_b", "pi_c"] {
                match obj.get(field) {
                    Some(Value::Array(items)) if items.len() == 3 => {}
                    Some(Value::Array(items)) => errors.push(format!(
                        "{field} must have exactly 3 elements, found {}",
                        items.len()
                    )),
                    Some(_) => errors.push(format!("{field} must be an array")),
                    None => errors.push(format!("missing {field}")),
                }
            }
        }
        ProvingSystem::Plonk | ProvingSystem::Fflonk => {
            for field in ["A", "B", "C"] {
                match obj.get(field) {
                    Some(Value::Array(_)) => {}
                    Some(_) => errors.push(format!("{field} must be an array")),
                    None => errors.push(format!("missing {field}")),
                }
            }
        }
    }
    check_protocol(obj, system, &mut errors);

    ValidationReport::from_errors(errors)
}

/// Checks that `key` has the shape of a snarkjs verification key for `system`.
///
/// - groth16: `vk_alpha_1`, `vk_beta_2`, `vk_gamma_2`, `vk_delta_2` present
///   and `IC` an array
/// - plonk/fflonk: circuit size `n` and `Qm` present
/// - all systems: `protocol` equals the system tag
pub fn validate_verification_key(key: &Value, system: ProvingSystem) -> ValidationReport {
    let Some(obj) = key.as_object() else {
        return ValidationReport::from_errors(vec![
            "verification key must be a JSON object".into(),
        ]);
    };

    let mut errors = Vec::new();
    match system {
        ProvingSystem::Groth16 => {
            for field in ["vk_alpha_1", "vk_beta_2", "vk_gamma_2", "vk_delta_2"] {
                if !present(obj, field) {
                    errors.push(format!("missing {field}"));
                }
            }
            match obj.get("IC") {
                Some(Value::Array(_)) => {}
                Some(_) => errors.push("IC must be an array".into()),
                None => errors.push("missing IC".into()),
            }
        }
        ProvingSystem::Plonk | ProvingSystem::Fflonk => {
            if !present(obj, "n") {
                errors.push("missing circuit size n".into());
            }
            if !present(obj, "Qm") {
                errors.push("missing Qm".into());
            }
        }
    }
    check_protocol(obj, system, &mut errors);

    ValidationReport::from_errors(errors)
}

/// Checks public signals against a verification key.
///
/// Every signal must be a non-empty decimal string, and the count must match
/// what the key declares (`IC.len() - 1` for groth16, `nPublic` for plonk).
/// A key that declares no count only gets the per-signal check.
pub fn validate_public_signals(
    key: &Value,
    public_signals: &[String],
    system: ProvingSystem,
) -> ValidationReport {
    let mut errors: Vec<String> = public_signals
        .iter()
        .enumerate()
        .filter(|(_, signal)| signal.is_empty() || !signal.bytes().all(|b| b.is_ascii_digit()))
        .map(|(i, signal)| format!("public signal {i} is not a decimal integer: {signal:?}"))
        .collect();

    if let Some(expected) = expected_public_inputs(key, system)
        && expected != public_signals.len()
    {
        errors.push(format!(
            "expected {expected} public signals, found {}",
            public_signals.len()
        ));
    }

    ValidationReport::from_errors(errors)
}

/// Number of public inputs a verification key is built for, when declared.
pub fn expected_public_inputs(key: &Value, system: ProvingSystem) -> Option<usize> {
    match system {
        ProvingSystem::Groth16 => key
            .get("IC")
            .and_then(Value::as_array)
            .and_then(|ic| ic.len().checked_sub(1)),
        ProvingSystem::Plonk | ProvingSystem::Fflonk => key
            .get("nPublic")
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok()),
    }
}

fn present(obj: &Map<String, Value>, field: &str) -> bool {
    obj.get(field).is_some_and(|v| !v.is_null())
}

fn check_protocol(obj: &Map<String, Value>, system: ProvingSystem, errors: &mut Vec<String>) {
    let expected = system.protocol_tag();
    match obj.get("protocol").and_then(Value::as_str) {
        Some(tag) if tag == expected => {}
        Some(tag) => errors.push(format!("protocol must be \"{expected}\", found \"{tag}\"")),
        None => errors.push(format!("protocol must be \"{expected}\"")),
    }
}
