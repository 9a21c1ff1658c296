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

// Key encodings used by callers around the protocol: public keys are stored
// with a one-byte type prefix, and non-identity private keys carry a marker
// bit in the low byte.

use curvemsg_crypto::curve25519::KEY_LEN;

use crate::{
    errors::{
        Error,
        Result
    },
    request::{
        PrivKey,
        PubKey
    }
};

pub const DJB_TYPE: u8 = 0x05;
pub const VERSIONED_KEY_LEN: usize = KEY_LEN + 1;

pub fn prepend_version(public_key: &PubKey) -> [u8; VERSIONED_KEY_LEN] {
    let mut out = [0u8; VERSIONED_KEY_LEN];
    out[0] = DJB_TYPE;
    out[1..].copy_from_slice(public_key.as_ref());
    out
}

/// Raw 32-byte public key from either the prefixed or the raw encoding.
pub fn strip_version(public_key: &[u8]) -> Result<PubKey> {
    let raw = match public_key.len() {
        VERSIONED_KEY_LEN if public_key[0] == DJB_TYPE => &public_key[1..],
        KEY_LEN => public_key,
        _ => return Err(Error::InvalidKeyFormat)
    };
    PubKey::try_from(raw).map_err(|_| Error::InvalidKeyFormat)
}

/// Sets the low bit of a clamped private key. Ephemeral and signed keys are
/// marked this way, identity keys are not.
pub fn mark_ephemeral(private_key: &mut PrivKey) {
    private_key.as_mut()[0] |= 0x01;
}
