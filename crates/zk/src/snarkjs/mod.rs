//! snarkjs JSON interop for BN254 (`"curve": "bn128"`).
//!
//! snarkjs writes field elements as decimal strings and curve points in
//! Jacobian coordinates:
//!
//! ```text
//! G1: ["x", "y", "z"]                       z = "1" affine, z = "0" identity
//! G2: [["x.c0", "x.c1"], ["y.c0", "y.c1"], ["z.c0", "z.c1"]]
//! ```
//!
//! Parsing is strict: values at or above the field modulus are rejected
//! rather than reduced. Curve membership is checked separately so callers
//! can tell a malformed payload apart from a forged one.

pub mod groth16;
pub mod plonk;

use std::str::FromStr;

use ark_bn254::{Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{BigInteger, Field, PrimeField};
use num_bigint::BigUint;
use serde_json::{Value, json};

use crate::{Result, ZkError};

/// Parses a decimal field element (string or JSON integer).
pub(crate) fn parse_field<F: PrimeField>(value: &Value, what: &str) -> Result<F> {
    let digits = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) if n.is_u64() => n.to_string(),
        other => {
            return Err(ZkError::malformed(what, format!("expected decimal string, found {other}")));
        }
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ZkError::malformed(what, format!("{digits:?} is not a decimal integer")));
    }

    let n = BigUint::from_str(&digits).map_err(|e| ZkError::malformed(what, e.to_string()))?;
    let repr = <F::BigInt as TryFrom<BigUint>>::try_from(n).map_err(|_| ZkError::FieldOverflow(what.to_string()))?;
    F::from_bigint(repr).ok_or_else(|| ZkError::FieldOverflow(what.to_string()))
}

pub(crate) fn parse_scalar(value: &Value, what: &str) -> Result<Fr> {
    parse_field::<Fr>(value, what)
}

/// Parses public signals into scalar-field elements, in order.
pub(crate) fn parse_public_signals(signals: &[String]) -> Result<Vec<Fr>> {
    signals
        .iter()
        .enumerate()
        .map(|(i, s)| parse_scalar(&Value::String(s.clone()), &format!("public signal {i}")))
        .collect()
}

fn coordinates<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    let items = value
        .as_array()
        .ok_or_else(|| ZkError::malformed(what, "expected coordinate array"))?;
    match items.len() {
        2 | 3 => Ok(items),
        n => Err(ZkError::malformed(what, format!("expected 2 or 3 coordinates, found {n}"))),
    }
}

fn parse_fq2(value: &Value, what: &str) -> Result<Fq2> {
    let items = value
        .as_array()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| ZkError::malformed(what, "expected [c0, c1]"))?;
    Ok(Fq2::new(
        parse_field::<Fq>(&items[0], what)?,
        parse_field::<Fq>(&items[1], what)?,
    ))
}

/// Converts Jacobian (x, y, z) to affine without checking curve membership.
fn jacobian_to_affine<F: Field>(x: F, y: F, z: F) -> Option<(F, F)> {
    if z.is_zero() {
        return None;
    }
    if z.is_one() {
        return Some((x, y));
    }
    let z_inv = z.inverse()?;
    let z_inv2 = z_inv.square();
    Some((x * z_inv2, y * z_inv2 * z_inv))
}

/// Parses a G1 point. The result may lie off the curve; see [`is_well_formed_g1`].
pub(crate) fn parse_g1(value: &Value, what: &str) -> Result<G1Affine> {
    let items = coordinates(value, what)?;
    let x = parse_field::<Fq>(&items[0], what)?;
    let y = parse_field::<Fq>(&items[1], what)?;
    let z = match items.get(2) {
        Some(z) => parse_field::<Fq>(z, what)?,
        None => Fq::from(1u64),
    };
    Ok(match jacobian_to_affine(x, y, z) {
        Some((x, y)) => G1Affine::new_unchecked(x, y),
        None => G1Affine::identity(),
    })
}

/// Parses a G2 point. The result may lie off the curve; see [`is_well_formed_g2`].
pub(crate) fn parse_g2(value: &Value, what: &str) -> Result<G2Affine> {
    let items = coordinates(value, what)?;
    let x = parse_fq2(&items[0], what)?;
    let y = parse_fq2(&items[1], what)?;
    let z = match items.get(2) {
        Some(z) => parse_fq2(z, what)?,
        None => Fq2::new(Fq::from(1u64), Fq::from(0u64)),
    };
    Ok(match jacobian_to_affine(x, y, z) {
        Some((x, y)) => G2Affine::new_unchecked(x, y),
        None => G2Affine::identity(),
    })
}

pub(crate) fn is_well_formed_g1(p: &G1Affine) -> bool {
    p.is_zero() || (p.is_on_curve() && p.is_in_correct_subgroup_assuming_on_curve())
}

pub(crate) fn is_well_formed_g2(p: &G2Affine) -> bool {
    p.is_zero() || (p.is_on_curve() && p.is_in_correct_subgroup_assuming_on_curve())
}

/// Fails with [`ZkError::NotWellFormed`] for points off the curve or subgroup.
pub(crate) fn require_g1(p: G1Affine, what: &str) -> Result<G1Affine> {
    if is_well_formed_g1(&p) {
        Ok(p)
    } else {
        Err(ZkError::NotWellFormed(what.to_string()))
    }
}

pub(crate) fn require_g2(p: G2Affine, what: &str) -> Result<G2Affine> {
    if is_well_formed_g2(&p) {
        Ok(p)
    } else {
        Err(ZkError::NotWellFormed(what.to_string()))
    }
}

/// Decimal representation of a field element.
pub fn field_to_decimal<F: PrimeField>(f: &F) -> String {
    let n: BigUint = f.into_bigint().into();
    n.to_string()
}

/// 32-byte big-endian encoding of a field element.
pub(crate) fn field_to_be_bytes<F: PrimeField>(f: &F) -> Vec<u8> {
    f.into_bigint().to_bytes_be()
}

pub fn g1_to_json(p: &G1Affine) -> Value {
    if p.infinity {
        json!(["0", "1", "0"])
    } else {
        json!([field_to_decimal(&p.x), field_to_decimal(&p.y), "1"])
    }
}

pub fn g2_to_json(p: &G2Affine) -> Value {
    let fq2 = |f: &Fq2| json!([field_to_decimal(&f.c0), field_to_decimal(&f.c1)]);
    if p.infinity {
        json!([["0", "0"], ["1", "0"], ["0", "0"]])
    } else {
        json!([fq2(&p.x), fq2(&p.y), ["1", "0"]])
    }
}

pub fn public_signals_to_json(inputs: &[Fr]) -> Vec<String> {
    inputs.iter().map(field_to_decimal).collect()
}

#[cfg(test)]
mod tests {
    use ark_ec::CurveGroup;

    use super::*;

    const FR_MODULUS: &str =
        "21888242871839275222246405745257275088548364400416034343698204186575808495617";

    #[test]
    fn rejects_scalars_at_or_above_modulus() {
        let err = parse_scalar(&json!(FR_MODULUS), "signal").unwrap_err();
        assert!(matches!(err, ZkError::FieldOverflow(_)));

        let huge = format!("{FR_MODULUS}0");
        assert!(matches!(
            parse_scalar(&json!(huge), "signal").unwrap_err(),
            ZkError::FieldOverflow(_)
        ));
    }

    #[test]
    fn rejects_non_decimal_scalars() {
        for bad in [json!("0x10"), json!(""), json!("-1"), json!(1.5), json!(null)] {
            assert!(matches!(
                parse_scalar(&bad, "signal").unwrap_err(),
                ZkError::Malformed { .. }
            ));
        }
    }

    #[test]
    fn g1_json_round_trips_through_parser() {
        let p = (G1Affine::generator() * Fr::from(7u64)).into_affine();
        let parsed = parse_g1(&g1_to_json(&p), "p").unwrap();
        assert_eq!(parsed, p);
        assert!(is_well_formed_g1(&parsed));
    }

    #[test]
    fn g2_json_round_trips_through_parser() {
        let p = (G2Affine::generator() * Fr::from(11u64)).into_affine();
        let parsed = parse_g2(&g2_to_json(&p), "p").unwrap();
        assert_eq!(parsed, p);
        assert!(is_well_formed_g2(&parsed));
    }

    #[test]
    fn zero_z_coordinate_is_identity() {
        let p = parse_g1(&json!(["0", "1", "0"]), "p").unwrap();
        assert!(p.is_zero());
    }

    #[test]
    fn jacobian_coordinates_are_normalized() {
        let p = (G1Affine::generator() * Fr::from(5u64)).into_affine();
        let (x, y) = (p.x, p.y);
        let z = Fq::from(3u64);
        let json = json!([
            field_to_decimal(&(x * z.square())),
            field_to_decimal(&(y * z.square() * z)),
            field_to_decimal(&z)
        ]);
        assert_eq!(parse_g1(&json, "p").unwrap(), p);
    }

    #[test]
    fn off_curve_point_parses_but_is_not_well_formed() {
        let p = parse_g1(&json!(["1", "3", "1"]), "p").unwrap();
        assert!(!is_well_formed_g1(&p));
        assert!(matches!(require_g1(p, "p").unwrap_err(), ZkError::NotWellFormed(_)));
    }
}
