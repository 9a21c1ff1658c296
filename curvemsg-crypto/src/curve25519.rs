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

//! X25519 over the Montgomery form of Curve25519.
//!
//! The ladder itself is provided by `x25519-dalek`; this module only fixes the
//! byte-level conventions (clamping, base point) that the protocol relies on.

use zeroize::Zeroize;

use crate::array::{
    Array,
    ZeroizeArray
};

pub const KEY_LEN: usize = 32;

/// Generator of the Curve25519 group, u = 9.
pub const BASEPOINT: [u8; KEY_LEN] = x25519_dalek::X25519_BASEPOINT_BYTES;

pub type PrivateKey = ZeroizeArray<KEY_LEN>;
pub type PublicKey = Array<KEY_LEN>;
pub type SharedSecret = ZeroizeArray<KEY_LEN>;

/// Clamps a scalar in place: clears the 3 low bits, clears bit 255, sets bit 254.
pub fn clamp_in_place(scalar: &mut [u8; KEY_LEN]) {
    scalar[0]  &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;
}

/// Copy of `n` turned into a valid Curve25519 private scalar.
pub fn clamp(n: &[u8; KEY_LEN]) -> PrivateKey {
    let mut scalar = PrivateKey::from(*n);
    clamp_in_place(scalar.as_mut());
    scalar
}

/// u-coordinate of [n]P. The scalar is clamped before use.
pub fn scalarmult_x25519(n: &[u8; KEY_LEN], p: &[u8; KEY_LEN]) -> [u8; KEY_LEN] {
    let mut t = *n;
    let out = x25519_dalek::x25519(t, *p);
    t.zeroize();
    out
}

/// u-coordinate of [n]B.
pub fn scalarmult_x25519_base(n: &[u8; KEY_LEN]) -> [u8; KEY_LEN] {
    scalarmult_x25519(n, &BASEPOINT)
}

pub fn public_key(private_key: &[u8; KEY_LEN]) -> PublicKey {
    PublicKey::from(scalarmult_x25519_base(private_key))
}

pub fn shared_secret(private_key: &[u8; KEY_LEN], public_key: &[u8; KEY_LEN]) -> SharedSecret {
    SharedSecret::from(scalarmult_x25519(private_key, public_key))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use rand::{
        RngCore,
        SeedableRng,
        rngs::SmallRng
    };
    use super::*;
    use crate::traits::arrayt::AsSlice;

    #[test]
    fn test_clamp() {
        let clamped = clamp(&[0u8; 32]);
        let mut expected = [0u8; 32];
        expected[31] = 0x40;
        assert_eq!(clamped.as_ref(), &expected);

        let clamped = clamp(&[0xff; 32]);
        let mut expected = [0xff; 32];
        expected[0] = 0xf8;
        expected[31] = 0x7f;
        assert_eq!(clamped.as_ref(), &expected);
    }

    #[test]
    fn test_scalarmult_x25519() {
        // source: https://datatracker.ietf.org/doc/html/rfc7748#section-5.2
        let k = hex!("a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4");
        let u = hex!("e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c");
        let expected = hex!("c3da55379de9c6908e94ea4df28d084f32eccf03491c71f754b4075577a28552");
        assert_eq!(scalarmult_x25519(&k, &u), expected);
    }

    #[test]
    fn test_diffie_hellman_rfc() {
        // source: https://datatracker.ietf.org/doc/html/rfc7748#section-6.1
        let alice_priv = hex!("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a");
        let alice_pub = hex!("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a");
        let bob_priv = hex!("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb");
        let bob_pub = hex!("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f");
        let shared = hex!("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742");

        assert_eq!(public_key(&alice_priv).as_ref(), &alice_pub);
        assert_eq!(public_key(&bob_priv).as_ref(), &bob_pub);
        assert_eq!(shared_secret(&alice_priv, &bob_pub).as_ref(), &shared);
        assert_eq!(shared_secret(&bob_priv, &alice_pub).as_ref(), &shared);

        // clamping before the ladder does not change the result
        let clamped = clamp(&alice_priv);
        assert_eq!(public_key(clamped.as_ref()).as_slice(), &alice_pub[..]);
    }

    #[test]
    fn test_base_matches_generic() {
        let mut rng = SmallRng::seed_from_u64(0x2551);
        let mut n = [0u8; 32];
        for _ in 0..16 {
            rng.fill_bytes(&mut n);
            assert_eq!(scalarmult_x25519_base(&n), scalarmult_x25519(&n, &BASEPOINT));
        }
    }
}
