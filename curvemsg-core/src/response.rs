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

use curvemsg_crypto::traits::arrayt::AsSlice;

use crate::{
    dispatch::Outcome,
    message::{
        CallId,
        Message,
        Value
    },
    request::FIELD_CALL_ID
};

pub const FIELD_RES: &str = "res";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub call_id: CallId,
    pub outcome: Outcome
}

impl Response {
    pub fn new(call_id: CallId, outcome: Outcome) -> Self {
        Self { call_id, outcome }
    }

    /// `{ call_id, res }`, `res` being a byte buffer or, for verification,
    /// a boolean.
    pub fn to_message(&self) -> Message {
        let res = match &self.outcome {
            Outcome::PrivateKey(b) | Outcome::SharedSecret(b) => Value::from(b.as_slice()),
            Outcome::PublicKey(b) => Value::from(b.as_slice()),
            Outcome::Signature(b) => Value::from(b.as_slice()),
            Outcome::Verified(ok) => Value::Bool(*ok)
        };

        let mut message = Message::new();
        message.insert(FIELD_CALL_ID, self.call_id).insert(FIELD_RES, res);
        message
    }
}

impl From<Response> for Message {
    fn from(value: Response) -> Self {
        value.to_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{
        PubKey,
        Signature
    };

    #[test]
    fn test_binary_result() {
        let response = Response::new(
            CallId::Int(-7),
            Outcome::Signature(Signature::from([5u8; 64]))
        );
        let message = response.to_message();
        assert_eq!(message.len(), 2);
        assert_eq!(message.get("call_id"), Some(&Value::Int(-7)));
        assert_eq!(message.get("res"), Some(&Value::Bytes(vec![5u8; 64])));

        let message = Message::from(Response::new(
            CallId::UInt(u64::MAX),
            Outcome::PublicKey(PubKey::from([1u8; 32]))
        ));
        assert_eq!(message.get("call_id"), Some(&Value::UInt(u64::MAX)));
        assert_eq!(message.get("res"), Some(&Value::Bytes(vec![1u8; 32])));
    }

    #[test]
    fn test_boolean_result() {
        for ok in [true, false] {
            let message = Response::new(CallId::Int(0), Outcome::Verified(ok)).to_message();
            assert_eq!(message.get("res"), Some(&Value::Bool(ok)));
        }
    }
}
