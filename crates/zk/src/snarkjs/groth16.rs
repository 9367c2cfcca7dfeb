//! Groth16 verification of snarkjs proofs on BN254.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use serde_json::{Value, json};
use tracing::debug;

use super::{
    g1_to_json, g2_to_json, is_well_formed_g1, is_well_formed_g2, parse_g1, parse_g2,
    parse_public_signals, require_g1, require_g2,
};
use crate::{Result, ZkError};

fn field<'a>(json: &'a Value, name: &str) -> Result<&'a Value> {
    json.get(name)
        .ok_or_else(|| ZkError::malformed("groth16 artifact", format!("missing {name}")))
}

/// Parses and checks a snarkjs Groth16 verification key.
///
/// Every point must be on the curve and in the prime-order subgroup.
pub fn parse_verifying_key(json: &Value) -> Result<VerifyingKey<Bn254>> {
    let alpha_g1 = require_g1(parse_g1(field(json, "vk_alpha_1")?, "vk_alpha_1")?, "vk_alpha_1")?;
    let beta_g2 = require_g2(parse_g2(field(json, "vk_beta_2")?, "vk_beta_2")?, "vk_beta_2")?;
    let gamma_g2 = require_g2(parse_g2(field(json, "vk_gamma_2")?, "vk_gamma_2")?, "vk_gamma_2")?;
    let delta_g2 = require_g2(parse_g2(field(json, "vk_delta_2")?, "vk_delta_2")?, "vk_delta_2")?;

    let ic = field(json, "IC")?
        .as_array()
        .ok_or_else(|| ZkError::malformed("IC", "expected array"))?;
    if ic.is_empty() {
        return Err(ZkError::malformed("IC", "must contain at least one point"));
    }
    let gamma_abc_g1 = ic
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let what = format!("IC[{i}]");
            require_g1(parse_g1(p, &what)?, &what)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(VerifyingKey {
        alpha_g1,
        beta_g2,
        gamma_g2,
        delta_g2,
        gamma_abc_g1,
    })
}

/// Parses a snarkjs Groth16 proof without checking curve membership.
pub fn parse_proof(json: &Value) -> Result<Proof<Bn254>> {
    Ok(Proof {
        a: parse_g1(field(json, "pi_a")?, "pi_a")?,
        b: parse_g2(field(json, "pi_b")?, "pi_b")?,
        c: parse_g1(field(json, "pi_c")?, "pi_c")?,
    })
}

fn proof_is_well_formed(proof: &Proof<Bn254>) -> bool {
    is_well_formed_g1(&proof.a) && is_well_formed_g2(&proof.b) && is_well_formed_g1(&proof.c)
}

/// Runs the Groth16 pairing check.
///
/// Returns `Ok(false)` for a proof whose points are not on the curve, and an
/// error when the inputs cannot be interpreted at all.
pub fn verify(vk_json: &Value, public_signals: &[String], proof_json: &Value) -> Result<bool> {
    let vk = parse_verifying_key(vk_json)?;
    let expected = vk.gamma_abc_g1.len() - 1;
    if public_signals.len() != expected {
        return Err(ZkError::PublicInputCount {
            expected,
            actual: public_signals.len(),
        });
    }
    let inputs = parse_public_signals(public_signals)?;

    let proof = parse_proof(proof_json)?;
    if !proof_is_well_formed(&proof) {
        debug!("groth16 proof points are not on the curve");
        return Ok(false);
    }

    let pvk: PreparedVerifyingKey<Bn254> = ark_groth16::prepare_verifying_key(&vk);
    Groth16::<Bn254>::verify_proof(&pvk, &proof, &inputs)
        .map_err(|e| ZkError::Verification(format!("groth16 pairing check: {e:?}")))
}

/// Renders an arkworks verifying key in snarkjs JSON form.
pub fn verifying_key_to_json(vk: &VerifyingKey<Bn254>) -> Value {
    json!({
        "protocol": "groth16",
        "curve": "bn128",
        "nPublic": vk.gamma_abc_g1.len().saturating_sub(1),
        "vk_alpha_1": g1_to_json(&vk.alpha_g1),
        "vk_beta_2": g2_to_json(&vk.beta_g2),
        "vk_gamma_2": g2_to_json(&vk.gamma_g2),
        "vk_delta_2": g2_to_json(&vk.delta_g2),
        "IC": vk.gamma_abc_g1.iter().map(g1_to_json).collect::<Vec<_>>(),
    })
}

/// Renders an arkworks proof in snarkjs JSON form.
pub fn proof_to_json(proof: &Proof<Bn254>) -> Value {
    json!({
        "pi_a": g1_to_json(&proof.a),
        "pi_b": g2_to_json(&proof.b),
        "pi_c": g1_to_json(&proof.c),
        "protocol": "groth16",
        "curve": "bn128",
    })
}

/// Scalar inputs as snarkjs public signals.
pub fn public_signals(inputs: &[Fr]) -> Vec<String> {
    super::public_signals_to_json(inputs)
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::fixtures::groth16_fixture;
    use super::*;

    #[test]
    fn accepts_valid_proof() {
        let f = groth16_fixture();
        assert_eq!(f.public_signals, vec!["15"]);
        assert!(verify(&f.vk, &f.public_signals, &f.proof).unwrap());
    }

    #[test]
    fn rejects_wrong_public_signal() {
        let f = groth16_fixture();
        assert!(!verify(&f.vk, &["16".to_string()], &f.proof).unwrap());
    }

    #[test]
    fn rejects_tampered_proof_point() {
        let f = groth16_fixture();
        let mut proof = f.proof.clone();
        proof["pi_c"] = f.proof["pi_a"].clone();
        assert!(!verify(&f.vk, &f.public_signals, &proof).unwrap());
    }

    #[test]
    fn off_curve_proof_point_is_rejected_not_errored() {
        let f = groth16_fixture();
        let mut proof = f.proof.clone();
        proof["pi_a"] = json!(["1", "3", "1"]);
        assert!(!verify(&f.vk, &f.public_signals, &proof).unwrap());
    }

    #[test]
    fn public_signal_count_mismatch_is_an_error() {
        let f = groth16_fixture();
        let err = verify(&f.vk, &[], &f.proof).unwrap_err();
        assert!(matches!(
            err,
            ZkError::PublicInputCount {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn off_curve_key_point_is_an_error() {
        let f = groth16_fixture();
        let mut vk = f.vk.clone();
        vk["vk_alpha_1"] = json!(["1", "3", "1"]);
        assert!(matches!(
            verify(&vk, &f.public_signals, &f.proof).unwrap_err(),
            ZkError::NotWellFormed(_)
        ));
    }

    #[test]
    fn exported_key_round_trips() {
        let f = groth16_fixture();
        let vk = parse_verifying_key(&f.vk).unwrap();
        assert_eq!(verifying_key_to_json(&vk), f.vk);
    }
}
