//! Verifier-contract call arguments from snarkjs proofs.
//!
//! Verifier contracts generated by snarkjs take
//! `verifyProof(uint256[2] a, uint256[2][2] b, uint256[2] c, uint256[N] input)`.
//! G2 coordinates are passed as `[c1, c0]`, the reverse of the snarkjs JSON
//! order, because the EVM pairing precompile expects the imaginary part first.

use ark_bn254::{Fq, Fr};
use serde::Serialize;
use serde_json::Value;

use crate::snarkjs::{field_to_decimal, parse_field};
use crate::{Result, ZkError};

/// Decimal call arguments in contract parameter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolidityCallArgs {
    pub a: [String; 2],
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
    pub input: Vec<String>,
}

impl SolidityCallArgs {
    /// Converts a snarkjs Groth16 proof and its public signals.
    ///
    /// Coordinates are range-checked and normalized to canonical decimals.
    pub fn from_snarkjs(proof: &Value, public_signals: &[String]) -> Result<Self> {
        let pi_a = coords(proof, "pi_a")?;
        let pi_b = coords(proof, "pi_b")?;
        let pi_c = coords(proof, "pi_c")?;

        let fq = |v: &Value, what: &str| -> Result<String> {
            Ok(field_to_decimal(&parse_field::<Fq>(v, what)?))
        };
        let g2_row = |row: &Value, what: &str| -> Result<[String; 2]> {
            let pair = row
                .as_array()
                .filter(|pair| pair.len() == 2)
                .ok_or_else(|| ZkError::malformed(what, "expected [c0, c1]"))?;
            Ok([fq(&pair[1], what)?, fq(&pair[0], what)?])
        };

        let input = public_signals
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let what = format!("public signal {i}");
                Ok(field_to_decimal(&parse_field::<Fr>(&Value::String(s.clone()), &what)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            a: [fq(&pi_a[0], "pi_a")?, fq(&pi_a[1], "pi_a")?],
            b: [g2_row(&pi_b[0], "pi_b")?, g2_row(&pi_b[1], "pi_b")?],
            c: [fq(&pi_c[0], "pi_c")?, fq(&pi_c[1], "pi_c")?],
            input,
        })
    }
}

fn coords<'a>(proof: &'a Value, field: &str) -> Result<&'a [Value]> {
    proof
        .get(field)
        .and_then(Value::as_array)
        .filter(|items| items.len() >= 2)
        .map(Vec::as_slice)
        .ok_or_else(|| ZkError::malformed(field, "expected coordinate array"))
}
