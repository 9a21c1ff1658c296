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

use curvemsg_crypto::{
    curve25519::{
        self,
        SharedSecret
    },
    ed25519::Ed25519,
    traits::sigt::SigT
};

use crate::request::{
    PrivKey,
    PubKey,
    Request,
    Signature
};

/// Result of a dispatched command, before it is shaped into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    PrivateKey(PrivKey),
    PublicKey(PubKey),
    SharedSecret(SharedSecret),
    Signature(Signature),
    Verified(bool)
}

/// Runs exactly one primitive for a validated request.
pub fn dispatch(request: &Request) -> Outcome {
    match request {
        Request::BytesToPriv { private_key } => {
            Outcome::PrivateKey(curve25519::clamp(private_key.as_ref()))
        },
        Request::PrivToPub { private_key } => {
            Outcome::PublicKey(curve25519::public_key(private_key.as_ref()))
        },
        Request::Ecdhe { private_key, public_key } => {
            Outcome::SharedSecret(
                curve25519::shared_secret(private_key.as_ref(), public_key.as_ref())
            )
        },
        Request::Ed25519Sign { private_key, msg } => {
            Outcome::Signature(<Ed25519 as SigT>::sign(private_key, msg))
        },
        Request::Ed25519Verify { public_key, msg, sig } => {
            // a failed verification is a result, not an error
            Outcome::Verified(<Ed25519 as SigT>::verify(public_key, msg, sig).is_ok())
        }
    }
}
