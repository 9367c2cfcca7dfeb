//! PLONK verification of snarkjs proofs on BN254.
//!
//! Follows the snarkjs verifier: Fiat-Shamir challenges from a Keccak-256
//! transcript, linearisation of the quotient identity, then one batched KZG
//! opening check at `xi` and `xi * w`.
//!
//! fflonk artifacts are routed here as well; see [`crate::ProvingSystem`].

use ark_bn254::{Bn254, Fr, G1Affine, G1Projective, G2Affine};
use ark_ec::pairing::Pairing;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{FftField, Field, PrimeField};
use ark_std::{One, Zero};
use serde_json::Value;
use sha3::{Digest, Keccak256};
use tracing::debug;

use super::{
    field_to_be_bytes, is_well_formed_g1, parse_g1, parse_g2, parse_public_signals, parse_scalar,
    require_g1, require_g2,
};
use crate::{Result, ZkError};

fn field<'a>(json: &'a Value, name: &str) -> Result<&'a Value> {
    json.get(name)
        .ok_or_else(|| ZkError::malformed("plonk artifact", format!("missing {name}")))
}

/// Parsed PLONK verification key.
pub(crate) struct PlonkKey {
    pub(crate) n_public: usize,
    /// log2 of the evaluation domain size.
    pub(crate) power: u32,
    pub(crate) k1: Fr,
    pub(crate) k2: Fr,
    pub(crate) qm: G1Affine,
    pub(crate) ql: G1Affine,
    pub(crate) qr: G1Affine,
    pub(crate) qo: G1Affine,
    pub(crate) qc: G1Affine,
    pub(crate) s1: G1Affine,
    pub(crate) s2: G1Affine,
    pub(crate) s3: G1Affine,
    /// `[x]_2` from the powers-of-tau setup.
    pub(crate) x_2: G2Affine,
    /// Generator of the evaluation domain.
    pub(crate) w: Fr,
}

impl PlonkKey {
    pub(crate) fn from_json(json: &Value) -> Result<Self> {
        let n_public = field(json, "nPublic")?
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| ZkError::malformed("nPublic", "expected unsigned integer"))?;
        let power = circuit_power(json)?;

        let g1 = |name: &str| -> Result<G1Affine> {
            require_g1(parse_g1(field(json, name)?, name)?, name)
        };
        let w = match json.get("w") {
            Some(w) => parse_scalar(w, "w")?,
            None => root_of_unity(power)?,
        };

        Ok(Self {
            n_public,
            power,
            k1: parse_scalar(field(json, "k1")?, "k1")?,
            k2: parse_scalar(field(json, "k2")?, "k2")?,
            qm: g1("Qm")?,
            ql: g1("Ql")?,
            qr: g1("Qr")?,
            qo: g1("Qo")?,
            qc: g1("Qc")?,
            s1: g1("S1")?,
            s2: g1("S2")?,
            s3: g1("S3")?,
            x_2: require_g2(parse_g2(field(json, "X_2")?, "X_2")?, "X_2")?,
            w,
        })
    }

    fn domain_size(&self) -> u64 {
        1u64 << self.power
    }
}

/// Domain size exponent from `power`, or from a power-of-two `n`.
fn circuit_power(json: &Value) -> Result<u32> {
    let power = if let Some(power) = json.get("power").and_then(Value::as_u64) {
        power
    } else {
        let n = field(json, "n")?;
        let n = n
            .as_u64()
            .or_else(|| n.as_str().and_then(|s| s.parse().ok()))
            .ok_or_else(|| ZkError::malformed("n", "expected unsigned integer"))?;
        if !n.is_power_of_two() {
            return Err(ZkError::malformed("n", format!("{n} is not a power of two")));
        }
        u64::from(n.trailing_zeros())
    };

    u32::try_from(power)
        .ok()
        .filter(|p| *p <= Fr::TWO_ADICITY)
        .ok_or_else(|| ZkError::malformed("power", format!("domain 2^{power} is too large")))
}

/// Primitive `2^power`-th root of unity in the scalar field.
pub(crate) fn root_of_unity(power: u32) -> Result<Fr> {
    let size = 1u64
        .checked_shl(power)
        .ok_or_else(|| ZkError::malformed("power", "domain too large"))?;
    Fr::get_root_of_unity(size)
        .ok_or_else(|| ZkError::malformed("power", format!("no root of unity of order {size}")))
}

/// Parsed PLONK proof. Commitments are not checked for curve membership
/// until [`PlonkProof::is_well_formed`].
pub(crate) struct PlonkProof {
    pub(crate) a: G1Affine,
    pub(crate) b: G1Affine,
    pub(crate) c: G1Affine,
    pub(crate) z: G1Affine,
    pub(crate) t1: G1Affine,
    pub(crate) t2: G1Affine,
    pub(crate) t3: G1Affine,
    pub(crate) wxi: G1Affine,
    pub(crate) wxiw: G1Affine,
    pub(crate) eval_a: Fr,
    pub(crate) eval_b: Fr,
    pub(crate) eval_c: Fr,
    pub(crate) eval_s1: Fr,
    pub(crate) eval_s2: Fr,
    pub(crate) eval_zw: Fr,
}

impl PlonkProof {
    pub(crate) fn from_json(json: &Value) -> Result<Self> {
        let g1 = |name: &str| -> Result<G1Affine> { parse_g1(field(json, name)?, name) };
        let fr = |name: &str| -> Result<Fr> { parse_scalar(field(json, name)?, name) };

        Ok(Self {
            a: g1("A")?,
            b: g1("B")?,
            c: g1("C")?,
            z: g1("Z")?,
            t1: g1("T1")?,
            t2: g1("T2")?,
            t3: g1("T3")?,
            wxi: g1("Wxi")?,
            wxiw: g1("Wxiw")?,
            eval_a: fr("eval_a")?,
            eval_b: fr("eval_b")?,
            eval_c: fr("eval_c")?,
            eval_s1: fr("eval_s1")?,
            eval_s2: fr("eval_s2")?,
            eval_zw: fr("eval_zw")?,
        })
    }

    fn is_well_formed(&self) -> bool {
        [
            &self.a, &self.b, &self.c, &self.z, &self.t1, &self.t2, &self.t3, &self.wxi,
            &self.wxiw,
        ]
        .into_iter()
        .all(is_well_formed_g1)
    }
}

/// Keccak-256 Fiat-Shamir transcript in the snarkjs byte layout.
#[derive(Default)]
struct Keccak256Transcript {
    buffer: Vec<u8>,
}

impl Keccak256Transcript {
    fn add_scalar(&mut self, s: &Fr) {
        self.buffer.extend(field_to_be_bytes(s));
    }

    /// Uncompressed `x || y`, 32 bytes each, big-endian.
    fn add_point(&mut self, p: &G1Affine) {
        if p.infinity {
            self.buffer.extend([0u8; 64]);
        } else {
            self.buffer.extend(field_to_be_bytes(&p.x));
            self.buffer.extend(field_to_be_bytes(&p.y));
        }
    }

    /// Hashes and clears the buffer.
    fn challenge(&mut self) -> Fr {
        let digest = Keccak256::digest(&self.buffer);
        self.buffer.clear();
        Fr::from_be_bytes_mod_order(&digest)
    }
}

pub(crate) struct Challenges {
    beta: Fr,
    gamma: Fr,
    alpha: Fr,
    pub(crate) xi: Fr,
    /// `v[i] = v1^i`; index 0 unused.
    v: [Fr; 6],
    u: Fr,
    /// `xi^n`
    xin: Fr,
    /// Vanishing polynomial at `xi`.
    zh: Fr,
}

impl Challenges {
    fn derive(vk: &PlonkKey, proof: &PlonkProof, inputs: &[Fr]) -> Self {
        let mut t = Keccak256Transcript::default();

        for p in [&vk.qm, &vk.ql, &vk.qr, &vk.qo, &vk.qc, &vk.s1, &vk.s2, &vk.s3] {
            t.add_point(p);
        }
        for s in inputs {
            t.add_scalar(s);
        }
        for p in [&proof.a, &proof.b, &proof.c] {
            t.add_point(p);
        }
        let beta = t.challenge();

        t.add_scalar(&beta);
        let gamma = t.challenge();

        t.add_scalar(&beta);
        t.add_scalar(&gamma);
        t.add_point(&proof.z);
        let alpha = t.challenge();

        t.add_scalar(&alpha);
        for p in [&proof.t1, &proof.t2, &proof.t3] {
            t.add_point(p);
        }
        let xi = t.challenge();

        t.add_scalar(&xi);
        for s in [
            &proof.eval_a,
            &proof.eval_b,
            &proof.eval_c,
            &proof.eval_s1,
            &proof.eval_s2,
            &proof.eval_zw,
        ] {
            t.add_scalar(s);
        }
        let v1 = t.challenge();
        let mut v = [Fr::zero(); 6];
        v[1] = v1;
        for i in 2..6 {
            v[i] = v[i - 1] * v1;
        }

        t.add_point(&proof.wxi);
        t.add_point(&proof.wxiw);
        let u = t.challenge();

        let mut xin = xi;
        for _ in 0..vk.power {
            xin.square_in_place();
        }

        Self {
            beta,
            gamma,
            alpha,
            xi,
            v,
            u,
            xin,
            zh: xin - Fr::one(),
        }
    }
}

/// `L_i(xi)` for `i = 1..=max(1, nPublic)`; index 0 unused.
fn lagrange_evaluations(vk: &PlonkKey, ch: &Challenges) -> Result<Vec<Fr>> {
    let n = Fr::from(vk.domain_size());
    let mut w = Fr::one();
    let mut l = vec![Fr::zero()];
    for _ in 0..vk.n_public.max(1) {
        let inv = (n * (ch.xi - w)).inverse().ok_or_else(|| {
            ZkError::Verification("evaluation challenge lies in the domain".into())
        })?;
        l.push(w * ch.zh * inv);
        w *= vk.w;
    }
    Ok(l)
}

fn public_input_evaluation(inputs: &[Fr], l: &[Fr]) -> Fr {
    inputs
        .iter()
        .zip(&l[1..])
        .fold(Fr::zero(), |acc, (s, li)| acc - *s * li)
}

/// Constant term of the linearisation polynomial.
fn r0(proof: &PlonkProof, ch: &Challenges, pi: Fr, l1: Fr) -> Fr {
    let e2 = l1 * ch.alpha.square();
    let e3 = (proof.eval_a + ch.beta * proof.eval_s1 + ch.gamma)
        * (proof.eval_b + ch.beta * proof.eval_s2 + ch.gamma)
        * (proof.eval_c + ch.gamma)
        * proof.eval_zw
        * ch.alpha;
    pi - e2 - e3
}

/// Commitment to the linearisation polynomial.
fn linearisation_commitment(
    vk: &PlonkKey,
    proof: &PlonkProof,
    ch: &Challenges,
    l1: Fr,
) -> G1Projective {
    let (a, b, c) = (proof.eval_a, proof.eval_b, proof.eval_c);

    let d1 = vk.qm * (a * b) + vk.ql * a + vk.qr * b + vk.qo * c + vk.qc.into_group();

    let beta_xi = ch.beta * ch.xi;
    let d2a = (a + beta_xi + ch.gamma)
        * (b + beta_xi * vk.k1 + ch.gamma)
        * (c + beta_xi * vk.k2 + ch.gamma)
        * ch.alpha;
    let d2b = l1 * ch.alpha.square();
    let d2 = proof.z * (d2a + d2b + ch.u);

    let d3 = vk.s3
        * ((a + ch.beta * proof.eval_s1 + ch.gamma)
            * (b + ch.beta * proof.eval_s2 + ch.gamma)
            * ch.alpha
            * ch.beta
            * proof.eval_zw);

    let d4 = (proof.t1.into_group() + proof.t2 * ch.xin + proof.t3 * ch.xin.square()) * ch.zh;

    d1 + d2 - d3 - d4
}

/// Batched commitment `F` and evaluation commitment `E` of the opening check.
pub(crate) fn opening_commitments(
    vk: &PlonkKey,
    proof: &PlonkProof,
    inputs: &[Fr],
) -> Result<(Challenges, G1Projective, G1Projective)> {
    let ch = Challenges::derive(vk, proof, inputs);
    let l = lagrange_evaluations(vk, &ch)?;
    let pi = public_input_evaluation(inputs, &l);
    let r0 = r0(proof, &ch, pi, l[1]);
    let d = linearisation_commitment(vk, proof, &ch, l[1]);
    let v = &ch.v;

    let f = d
        + proof.a * v[1]
        + proof.b * v[2]
        + proof.c * v[3]
        + vk.s1 * v[4]
        + vk.s2 * v[5];

    let e_scalar = -r0
        + v[1] * proof.eval_a
        + v[2] * proof.eval_b
        + v[3] * proof.eval_c
        + v[4] * proof.eval_s1
        + v[5] * proof.eval_s2
        + ch.u * proof.eval_zw;
    let e = G1Affine::generator() * e_scalar;

    Ok((ch, f, e))
}

/// `e(Wxi + u·Wxiw, [x]_2) == e(xi·Wxi + u·xi·w·Wxiw + F - E, [1]_2)`
fn pairing_check(
    vk: &PlonkKey,
    proof: &PlonkProof,
    ch: &Challenges,
    f: G1Projective,
    e: G1Projective,
) -> bool {
    let a1 = proof.wxi.into_group() + proof.wxiw * ch.u;
    let b1 = proof.wxi * ch.xi + proof.wxiw * (ch.u * ch.xi * vk.w) + f - e;

    Bn254::pairing(a1.into_affine(), vk.x_2)
        == Bn254::pairing(b1.into_affine(), G2Affine::generator())
}

/// Runs the PLONK verifier.
///
/// Returns `Ok(false)` for commitments that are not on the curve, and an
/// error when the inputs cannot be interpreted at all.
pub fn verify(vk_json: &Value, public_signals: &[String], proof_json: &Value) -> Result<bool> {
    let vk = PlonkKey::from_json(vk_json)?;
    if public_signals.len() != vk.n_public {
        return Err(ZkError::PublicInputCount {
            expected: vk.n_public,
            actual: public_signals.len(),
        });
    }
    let inputs = parse_public_signals(public_signals)?;

    let proof = PlonkProof::from_json(proof_json)?;
    if !proof.is_well_formed() {
        debug!("plonk commitments are not on the curve");
        return Ok(false);
    }

    let (ch, f, e) = opening_commitments(&vk, &proof, &inputs)?;
    Ok(pairing_check(&vk, &proof, &ch, f, e))
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::fixtures::plonk_fixture;
    use super::*;

    #[test]
    fn root_of_unity_has_exact_order() {
        let w = root_of_unity(3).unwrap();
        assert_eq!(w.pow([8u64]), Fr::one());
        assert_ne!(w.pow([4u64]), Fr::one());
    }

    #[test]
    fn accepts_consistent_instance() {
        let f = plonk_fixture();
        assert!(verify(&f.vk, &f.public_signals, &f.proof).unwrap());
    }

    #[test]
    fn rejects_tampered_evaluation() {
        let f = plonk_fixture();
        let mut proof = f.proof.clone();
        proof["eval_a"] = json!("12345");
        assert!(!verify(&f.vk, &f.public_signals, &proof).unwrap());
    }

    #[test]
    fn rejects_wrong_public_signal() {
        let f = plonk_fixture();
        assert!(!verify(&f.vk, &["8".to_string()], &f.proof).unwrap());
    }

    #[test]
    fn circuit_size_can_be_given_as_n() {
        let f = plonk_fixture();
        let mut vk = f.vk.clone();
        let obj = vk.as_object_mut().unwrap();
        obj.remove("power");
        obj.remove("w");
        obj.insert("n".into(), json!(8));
        assert!(verify(&vk, &f.public_signals, &f.proof).unwrap());
    }

    #[test]
    fn non_power_of_two_size_is_malformed() {
        let f = plonk_fixture();
        let mut vk = f.vk.clone();
        let obj = vk.as_object_mut().unwrap();
        obj.remove("power");
        obj.insert("n".into(), json!(6));
        assert!(matches!(
            verify(&vk, &f.public_signals, &f.proof).unwrap_err(),
            ZkError::Malformed { .. }
        ));
    }

    #[test]
    fn off_curve_commitment_is_rejected() {
        let f = plonk_fixture();
        let mut proof = f.proof.clone();
        proof["T1"] = json!(["1", "3", "1"]);
        assert!(!verify(&f.vk, &f.public_signals, &proof).unwrap());
    }
}
