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

use crate::{
    dispatch::dispatch,
    errors::Result,
    message::Message,
    request::Request,
    response::Response
};

/// Validates, dispatches and builds the response for one request.
///
/// The error tells why a request was dropped. It is meant for host-side
/// diagnostics and must never be sent back to the caller.
pub fn try_handle(message: &Message) -> Result<Response> {
    let (call_id, request) = Request::validate(message)?;
    let outcome = dispatch(&request);
    Ok(Response::new(call_id, outcome))
}

/// Response message for `message`, or `None` when the request is dropped
/// (malformed, missing or mis-sized field, unrecognized command).
pub fn handle(message: &Message) -> Option<Message> {
    try_handle(message).ok().map(Message::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Value;

    #[test]
    fn test_handle_drops_silently() {
        assert_eq!(handle(&Message::new()), None);

        let message = Message::from([
            ("command", Value::from("privToPub")),
            ("call_id", Value::Int(3)),
            ("priv", Value::Bytes(vec![0u8; 33]))
        ]);
        assert_eq!(handle(&message), None);
        assert!(try_handle(&message).is_err());
    }

    #[test]
    fn test_handle_bytes_to_priv() {
        let message = Message::from([
            ("command", Value::from("bytesToPriv")),
            ("call_id", Value::Int(12)),
            ("priv", Value::Bytes(vec![0u8; 32])),
            ("pub", Value::from("ignored"))
        ]);
        let mut expected = vec![0u8; 32];
        expected[31] = 0x40;

        let response = handle(&message).unwrap();
        assert_eq!(response.get("call_id"), Some(&Value::Int(12)));
        assert_eq!(response.get("res"), Some(&Value::Bytes(expected)));
    }
}
