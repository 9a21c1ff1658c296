// CurveMsg, Curve25519 and Ed25519 operations over structured messages
// Copyright (C) 2025 A. Russon
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Ed25519 signatures keyed by Curve25519 (Montgomery) key pairs.
//!
//! The signing key is an X25519 private scalar and the verifying key is the
//! matching X25519 public key (a u-coordinate). The Edwards public point
//! A = [a]B is only known up to the sign of its x-coordinate from u, so the
//! signer stores that sign in the otherwise unused top bit of S. Apart from
//! this bit and the nonce derivation (SHA-512 of the scalar and the message),
//! signatures follow RFC 8032.

use curve25519_dalek::{
    EdwardsPoint,
    Scalar,
    montgomery::MontgomeryPoint
};
use sha2::{
    Digest,
    Sha512
};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::{
    array::{
        Array,
        ZeroizeArray
    },
    curve25519::clamp_in_place,
    traits::sigt::{
        Error,
        Result,
        SigT
    }
};

pub struct Ed25519;

fn hash_to_scalar(parts: &[&[u8]]) -> Scalar {
    let mut sha = Sha512::new();
    for &part in parts {
        sha.update(part);
    }
    let digest = sha.finalize();
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&digest);
    let scalar = Scalar::from_bytes_mod_order_wide(&wide);
    wide.zeroize();
    scalar
}

impl Ed25519 {
    pub const SIG_LEN: usize = 64;
    pub const SK_LEN: usize = 32;
    pub const VK_LEN: usize = 32;

    pub fn sign_internal(
        signing_key: &[u8; Self::SK_LEN],
        message: &[u8]
    ) -> [u8; Self::SIG_LEN] {
        // 1. Clamp the signing key into the secret scalar a, and compute the
        //    Edwards public point A = [a]B. Keep the sign of its x-coordinate,
        //    it cannot be recovered from the Montgomery verifying key.
        let mut a_bytes = *signing_key;
        clamp_in_place(&mut a_bytes);
        let mut a = Scalar::from_bytes_mod_order(a_bytes);
        let public_point = EdwardsPoint::mul_base(&a).compress();
        let sign_bit = public_point.as_bytes()[31] & 0x80;

        // 2. Compute SHA-512(a || M) and interpret the 64-octet digest as a
        //    little-endian integer r, reduced modulo L.
        let mut nonce = hash_to_scalar(&[&a_bytes, message]);
        a_bytes.zeroize();

        // 3. Compute the point [r]B, R is its encoding.
        let sig_r = EdwardsPoint::mul_base(&nonce).compress();

        // 4. Compute SHA512(R || A || M), interpreted as an integer k mod L.
        let k = hash_to_scalar(&[sig_r.as_bytes(), public_point.as_bytes(), message]);

        // 5. Compute S = (r + k * a) mod L.
        let sig_s = k * a + nonce;
        a.zeroize();
        nonce.zeroize();

        // 6. The signature is R || S, the three most significant bits of S
        //    are zero and the top one carries the sign of A.
        let mut signature = [0u8; Self::SIG_LEN];
        signature[..32].copy_from_slice(sig_r.as_bytes());
        signature[32..].copy_from_slice(sig_s.as_bytes());
        signature[63] |= sign_bit;
        signature
    }

    pub fn verify_internal(
        verifying_key: &[u8; Self::VK_LEN],
        message: &[u8],
        sig: &[u8; Self::SIG_LEN]
    ) -> Result<()> {
        // 1. Split the signature, recover the sign of A and clear it from S.
        let sign = sig[63] >> 7;
        let sig_r = &sig[..32];
        let mut s_bytes = [0u8; 32];
        s_bytes.copy_from_slice(&sig[32..]);
        s_bytes[31] &= 0x7f;

        // 2. Map the Montgomery u-coordinate to the Edwards point A with the
        //    recovered sign. Reject S outside 0 <= S < L.
        let public_point = MontgomeryPoint(*verifying_key)
            .to_edwards(sign)
            .ok_or(Error::InvalidPublicKey)?;
        let sig_s = Option::<Scalar>::from(Scalar::from_canonical_bytes(s_bytes))
            .ok_or(Error::InvalidSignature)?;

        // 3. Compute SHA512(R || A || M) as an integer k mod L.
        let k = hash_to_scalar(&[sig_r, public_point.compress().as_bytes(), message]);

        // 4. Check the group equation R = [S]B - [k]A, comparing encodings.
        let check = EdwardsPoint::vartime_double_scalar_mul_basepoint(
            &k,
            &(-public_point),
            &sig_s
        ).compress();
        match bool::from(check.as_bytes()[..].ct_eq(sig_r)) {
            true => Ok(()),
            false => Err(Error::InvalidSignature)
        }
    }
}

impl SigT for Ed25519 {
    const SIGNATURE_LEN: usize = Self::SIG_LEN;
    const SIGNINGKEY_LEN: usize = Self::SK_LEN;
    const VERIFYINGKEY_LEN: usize = Self::VK_LEN;

    type Signature = Array<{ Ed25519::SIG_LEN }>;
    type SigningKey = ZeroizeArray<{ Ed25519::SK_LEN }>;
    type VerifyingKey = Array<{ Ed25519::VK_LEN }>;

    fn verifying_key(signing_key: &Self::SigningKey) -> Self::VerifyingKey {
        crate::curve25519::public_key(signing_key.as_ref())
    }

    fn sign(signing_key: &Self::SigningKey, msg: &[u8]) -> Self::Signature {
        Array::from(Self::sign_internal(signing_key.as_ref(), msg))
    }

    fn verify(
        verifying_key: &Self::VerifyingKey,
        msg: &[u8],
        sig: &Self::Signature
    ) -> Result<()> {
        Self::verify_internal(verifying_key.as_ref(), msg, sig.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use curve25519_dalek::edwards::CompressedEdwardsY;
    use hex_literal::hex;
    use rand::{
        RngCore,
        SeedableRng,
        rngs::SmallRng
    };
    use super::*;
    use crate::curve25519::public_key;

    // X25519 verifying key and sign-carrying signature for an RFC 8032 vector
    fn from_rfc(vk: &[u8; 32], sig: &[u8; 64]) -> ([u8; 32], [u8; 64]) {
        let point = CompressedEdwardsY(*vk).decompress().unwrap();
        let mut sig = *sig;
        sig[63] |= vk[31] & 0x80;
        (point.to_montgomery().to_bytes(), sig)
    }

    #[test]
    fn test_ed25519_1() {
        let msg = b"bonjour";
        let mut sk = [0u8; 32];
        SmallRng::seed_from_u64(1).fill_bytes(&mut sk);
        let vk = public_key(&sk);
        let sig = Ed25519::sign_internal(&sk, msg);
        assert!(Ed25519::verify_internal(vk.as_ref(), msg, &sig).is_ok());
        assert_eq!(
            Ed25519::verify_internal(vk.as_ref(), b"bonsoir", &sig),
            Err(Error::InvalidSignature)
        );
    }

    #[test]
    fn test_ed25519_deterministic() {
        let mut rng = SmallRng::seed_from_u64(25519);
        let mut sk = [0u8; 32];
        rng.fill_bytes(&mut sk);

        let sig_1 = Ed25519::sign_internal(&sk, b"");
        let sig_2 = Ed25519::sign_internal(&sk, b"");
        assert_eq!(sig_1, sig_2);

        // the signing key is clamped before use
        let mut clamped = sk;
        clamp_in_place(&mut clamped);
        assert_eq!(Ed25519::sign_internal(&clamped, b""), sig_1);
    }

    #[test]
    fn test_ed25519_rfc_verify() {
        // source: https://datatracker.ietf.org/doc/html/rfc8032#section-7.1
        let vectors: [(&[u8; 32], &[u8], &[u8; 64]); 3] = [
            (
                &hex!("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"),
                b"",
                &hex!(
                    "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155
                    5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
                )
            ),
            (
                &hex!("3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c"),
                b"\x72",
                &hex!(
                    "92a009a9f0d4cab8720e820b5f642540a2b27b5416503f8fb3762223ebdb69da
                    085ac1e43e15996e458f3613d0f11d8c387b2eaeb4302aeeb00d291612bb0c00"
                )
            ),
            (
                &hex!("fc51cd8e6218a1a38da47ed00230f0580816ed13ba3303ac5deb911548908025"),
                b"\xaf\x82",
                &hex!(
                    "6291d657deec24024827e69c3abe01a30ce548a284743a445e3680d7db5ac3ac
                    18ff9b538d16f290ae67f760984dc6594a7c15e9716ed28dc027beceea1ec40a"
                )
            )
        ];

        for (vk, msg, sig) in vectors {
            let (mont_vk, sig) = from_rfc(vk, sig);
            assert!(Ed25519::verify_internal(&mont_vk, msg, &sig).is_ok());

            let mut bad = sig;
            bad[0] ^= 1;
            assert!(Ed25519::verify_internal(&mont_vk, msg, &bad).is_err());
        }
    }

    #[test]
    fn test_ed25519_tampering() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut sk = [0u8; 32];
        let mut msg = [0u8; 16];
        rng.fill_bytes(&mut sk);
        rng.fill_bytes(&mut msg);

        let vk = public_key(&sk);
        let sig = Ed25519::sign_internal(&sk, &msg);
        assert!(Ed25519::verify_internal(vk.as_ref(), &msg, &sig).is_ok());

        for bit in 0..Ed25519::SIG_LEN * 8 {
            let mut bad = sig;
            bad[bit / 8] ^= 1 << (bit % 8);
            assert!(Ed25519::verify_internal(vk.as_ref(), &msg, &bad).is_err(), "bit {bit}");
        }
        for bit in 0..msg.len() * 8 {
            let mut bad = msg;
            bad[bit / 8] ^= 1 << (bit % 8);
            assert!(Ed25519::verify_internal(vk.as_ref(), &bad, &sig).is_err(), "bit {bit}");
        }
    }

    #[test]
    fn test_sigt() {
        let sk = <Ed25519 as SigT>::SigningKey::from([0x42; 32]);
        let vk = Ed25519::verifying_key(&sk);
        let sig = <Ed25519 as SigT>::sign(&sk, b"hello");
        assert!(<Ed25519 as SigT>::verify(&vk, b"hello", &sig).is_ok());
        assert!(<Ed25519 as SigT>::verify(&vk, b"bye", &sig).is_err());
    }
}
