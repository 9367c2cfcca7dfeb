//! `verifyProof` call data for snarkjs-generated verifier contracts.

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{U256, keccak256};
use zk::SolidityCallArgs;

use crate::error::{AttestationError, Result};

/// Solidity signature for a verifier with `inputs` public signals.
pub fn verify_proof_signature(inputs: usize) -> String {
    format!("verifyProof(uint256[2],uint256[2][2],uint256[2],uint256[{inputs}])")
}

/// First four bytes of the signature hash.
pub fn verify_proof_selector(inputs: usize) -> [u8; 4] {
    let hash = keccak256(verify_proof_signature(inputs).as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Selector-prefixed, ABI-encoded `verifyProof` call data.
///
/// Every parameter is a fixed-size array of `uint256`, so the encoding is
/// fully static: `4 + 32 * (8 + inputs)` bytes.
pub fn encode_verify_proof(args: &SolidityCallArgs) -> Result<Vec<u8>> {
    let words = |values: &[String]| -> Result<DynSolValue> {
        values
            .iter()
            .map(|v| uint(v))
            .collect::<Result<Vec<_>>>()
            .map(DynSolValue::FixedArray)
    };

    let params = DynSolValue::Tuple(vec![
        words(&args.a)?,
        DynSolValue::FixedArray(vec![words(&args.b[0])?, words(&args.b[1])?]),
        words(&args.c)?,
        words(&args.input)?,
    ]);

    let mut call_data = verify_proof_selector(args.input.len()).to_vec();
    call_data.extend(params.abi_encode_params());
    Ok(call_data)
}

/// Decodes a single ABI `bool` return value.
pub fn decode_bool(data: &[u8]) -> Option<bool> {
    DynSolType::Bool.abi_decode(data).ok()?.as_bool()
}

fn uint(decimal: &str) -> Result<DynSolValue> {
    let value = U256::from_str_radix(decimal, 10)
        .map_err(|e| AttestationError::Encoding(format!("'{decimal}' is not a uint256: {e}")))?;
    Ok(DynSolValue::Uint(value, 256))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(inputs: &[&str]) -> SolidityCallArgs {
        SolidityCallArgs {
            a: ["1".into(), "2".into()],
            b: [["3".into(), "4".into()], ["5".into(), "6".into()]],
            c: ["7".into(), "8".into()],
            input: inputs.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn word(data: &[u8], index: usize) -> &[u8] {
        &data[4 + 32 * index..4 + 32 * (index + 1)]
    }

    #[test]
    fn selector_matches_snarkjs_verifier() {
        assert_eq!(hex::encode(verify_proof_selector(1)), "43753b4d");
    }

    #[test]
    fn encodes_parameters_in_order() {
        let data = encode_verify_proof(&args(&["15", "99"])).unwrap();
        assert_eq!(data.len(), 4 + 32 * 10);
        assert_eq!(&data[..4], &verify_proof_selector(2));

        for (index, expected) in [1u8, 2, 3, 4, 5, 6, 7, 8, 15, 99].into_iter().enumerate() {
            let w = word(&data, index);
            assert!(w[..31].iter().all(|b| *b == 0));
            assert_eq!(w[31], expected);
        }
    }

    #[test]
    fn input_count_changes_selector() {
        assert_ne!(verify_proof_selector(1), verify_proof_selector(2));
    }

    #[test]
    fn rejects_non_decimal_words() {
        let mut bad = args(&["15"]);
        bad.c[0] = "0xzz".into();
        assert!(matches!(
            encode_verify_proof(&bad),
            Err(AttestationError::Encoding(_))
        ));
    }

    #[test]
    fn decodes_bool_words() {
        let mut word = [0u8; 32];
        assert_eq!(decode_bool(&word), Some(false));
        word[31] = 1;
        assert_eq!(decode_bool(&word), Some(true));
        assert_eq!(decode_bool(&[]), None);
    }
}
