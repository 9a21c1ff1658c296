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

//! Caller side of the protocol.
//!
//! The client numbers its requests, remembers which command each pending
//! `call_id` was issued for, and turns the matching responses back into
//! typed replies. Responses may arrive in any order.

use std::collections::HashMap;

use curvemsg_crypto::curve25519::{
    KEY_LEN,
    SharedSecret
};

use crate::{
    errors::{
        Error,
        Result
    },
    keys::{
        VERSIONED_KEY_LEN,
        mark_ephemeral,
        prepend_version
    },
    message::{
        CallId,
        Message,
        Value
    },
    request::{
        Command,
        FIELD_CALL_ID,
        PrivKey,
        PubKey,
        Request,
        Signature
    },
    response::FIELD_RES
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    PrivateKey(PrivKey),
    PublicKey(PubKey),
    SharedSecret(SharedSecret),
    Signature(Signature),
    Verified(bool)
}

/// Private key and its type-prefixed public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key: PrivKey,
    pub public_key: [u8; VERSIONED_KEY_LEN]
}

#[derive(Debug, Default)]
pub struct Client {
    next_id: i64,
    pending: HashMap<CallId, Command>
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message for `request` with a fresh `call_id`, now pending.
    pub fn post(&mut self, request: &Request) -> (CallId, Message) {
        let call_id = CallId::Int(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.insert(call_id, request.command());
        (call_id, request.to_message(call_id))
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, call_id: &CallId) -> bool {
        self.pending.contains_key(call_id)
    }

    /// Gives up on a request that will never be answered.
    pub fn forget(&mut self, call_id: &CallId) -> bool {
        self.pending.remove(call_id).is_some()
    }

    /// Matches `response` with its pending request.
    pub fn complete(&mut self, response: &Message) -> Result<(CallId, Reply)> {
        let call_id = response_call_id(response)?;
        let reply = self.reply_for(call_id, response)?;
        Ok((call_id, reply))
    }

    // the id is removed only once the reply is accepted
    fn reply_for(&mut self, call_id: CallId, response: &Message) -> Result<Reply> {
        let command = self.pending.get(&call_id).ok_or(Error::UnknownCallId(call_id))?;
        let res = response.get(FIELD_RES).ok_or(Error::MissingField(FIELD_RES))?;

        let reply = parse_reply(command, res).ok_or(Error::UnexpectedResult(call_id))?;
        self.pending.remove(&call_id);
        Ok(reply)
    }

    /// Posts `request` through `transport` and waits for its reply.
    ///
    /// The request is never left pending: on any error it is forgotten, and a
    /// response for another id does not complete that other request.
    pub fn call<T>(&mut self, request: &Request, transport: T) -> Result<(CallId, Reply)>
    where
        T: FnOnce(&Message) -> Option<Message>
    {
        let (call_id, message) = self.post(request);
        let reply = match transport(&message) {
            Some(response) => match response_call_id(&response) {
                Ok(id) if id == call_id => self.reply_for(call_id, &response),
                Ok(id) => Err(Error::UnknownCallId(id)),
                Err(err) => Err(err)
            },
            None => Err(Error::NoResponse(call_id))
        };

        match reply {
            Ok(reply) => Ok((call_id, reply)),
            Err(err) => {
                self.forget(&call_id);
                Err(err)
            }
        }
    }

    /// Key pair from 32 caller-provided bytes: clamp, mark non-identity keys,
    /// then derive the public key.
    pub fn key_pair<T>(
        &mut self,
        bytes: &[u8; KEY_LEN],
        is_identity: bool,
        mut transport: T
    ) -> Result<KeyPair>
    where
        T: FnMut(&Message) -> Option<Message>
    {
        let request = Request::BytesToPriv { private_key: PrivKey::from(*bytes) };
        let mut private_key = match self.call(&request, &mut transport)? {
            (_, Reply::PrivateKey(key)) => key,
            (call_id, _) => return Err(Error::UnexpectedResult(call_id))
        };
        if !is_identity {
            mark_ephemeral(&mut private_key);
        }

        let request = Request::PrivToPub { private_key: private_key.clone() };
        let public_key = match self.call(&request, &mut transport)? {
            (_, Reply::PublicKey(key)) => key,
            (call_id, _) => return Err(Error::UnexpectedResult(call_id))
        };

        Ok(KeyPair {
            private_key,
            public_key: prepend_version(&public_key)
        })
    }
}

fn response_call_id(response: &Message) -> Result<CallId> {
    CallId::from_value(response.get(FIELD_CALL_ID).ok_or(Error::MissingField(FIELD_CALL_ID))?)
}

fn parse_reply(command: &Command, res: &Value) -> Option<Reply> {
    match (command, res) {
        (Command::BytesToPriv, Value::Bytes(b)) => PrivKey::try_from(b.as_slice())
            .ok()
            .map(Reply::PrivateKey),
        (Command::PrivToPub, Value::Bytes(b)) => PubKey::try_from(b.as_slice())
            .ok()
            .map(Reply::PublicKey),
        (Command::Ecdhe, Value::Bytes(b)) => SharedSecret::try_from(b.as_slice())
            .ok()
            .map(Reply::SharedSecret),
        (Command::Ed25519Sign, Value::Bytes(b)) => Signature::try_from(b.as_slice())
            .ok()
            .map(Reply::Signature),
        (Command::Ed25519Verify, Value::Bool(ok)) => Some(Reply::Verified(*ok)),
        _ => None
    }
}
