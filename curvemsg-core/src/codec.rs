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

//! JSON-lines transport: one JSON object per line.
//!
//! Byte buffers travel as arrays of integers in 0..=255, booleans as JSON
//! booleans.

use crate::{
    errors::{
        Error,
        Result
    },
    handler::try_handle,
    message::Message
};

use std::io::{BufRead, Read};

use zeroize::Zeroize;

pub const DEFAULT_MAX_LINE_LENGTH: usize = 1 << 20;

pub fn decode(line: &str, max_line_length: usize) -> Result<Message> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.len() > max_line_length {
        return Err(Error::LineTooLong(line.len()));
    }

    if !line.trim_start().starts_with('{') {
        return Err(Error::NotAMapping);
    }
    Ok(serde_json::from_str(line)?)
}

/// Single line, without the trailing newline.
pub fn encode(message: &Message) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

/// Decodes, handles and encodes one line. An error means the request is
/// dropped and nothing is written back.
pub fn handle_line(line: &str, max_line_length: usize) -> Result<String> {
    let mut request = decode(line, max_line_length)?;
    let response = try_handle(&request);
    request.zeroize();

    let mut response = response?.to_message();
    let encoded = encode(&response);
    response.zeroize();
    encoded
}

/// Reads the next line into `line`, newline included.
///
/// At most `max_line_length` bytes (plus the line ending) are kept. The rest
/// of a longer line is skipped up to its newline and reported as
/// `LineTooLong` with its full length. Returns `false` at end of input.
pub fn read_line<R: BufRead>(
    reader: &mut R,
    line: &mut Vec<u8>,
    max_line_length: usize
) -> Result<bool> {
    line.clear();

    // room for "\r\n"
    let cap = (max_line_length as u64).saturating_add(2);
    let read = (&mut *reader).take(cap).read_until(b'\n', line)?;
    if read == 0 {
        return Ok(false);
    }
    if line.last() == Some(&b'\n') || (read as u64) < cap {
        return Ok(true);
    }

    // oversize: drop what was kept, skip the remainder without storing it
    line.zeroize();
    let mut length = read;
    loop {
        let (used, done) = {
            let buf = reader.fill_buf()?;
            match buf.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    length += i;
                    (i + 1, true)
                },
                None => {
                    length += buf.len();
                    (buf.len(), buf.is_empty())
                }
            }
        };
        reader.consume(used);
        if done {
            break;
        }
    }
    Err(Error::LineTooLong(length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Value;

    #[test]
    fn test_decode_values() {
        let line = r#"{"command":"ECDHE","call_id":-5,"priv":[1,2,3],"msg":[],"x":1.5,"big":18446744073709551615,"ok":true}"#;
        let message = decode(line, DEFAULT_MAX_LINE_LENGTH).unwrap();
        assert_eq!(message.get("command"), Some(&Value::from("ECDHE")));
        assert_eq!(message.get("call_id"), Some(&Value::Int(-5)));
        assert_eq!(message.get("priv"), Some(&Value::Bytes(vec![1, 2, 3])));
        assert_eq!(message.get("msg"), Some(&Value::Bytes(vec![])));
        assert_eq!(message.get("big"), Some(&Value::UInt(u64::MAX)));
        assert_eq!(message.get("ok"), Some(&Value::Bool(true)));
        assert!(matches!(message.get("x"), Some(Value::Other(_))));
    }

    #[test]
    fn test_decode_rejects() {
        assert!(matches!(decode("[1,2,3]", 100), Err(Error::NotAMapping)));
        assert!(matches!(decode("42", 100), Err(Error::NotAMapping)));
        assert!(matches!(decode("{\"command\":", 100), Err(Error::Json(_))));
        assert!(matches!(decode("{}", 1), Err(Error::LineTooLong(2))));

        // out of range bytes are not a buffer
        let message = decode(r#"{"priv":[1,256]}"#, 100).unwrap();
        assert!(matches!(message.get("priv"), Some(Value::Other(_))));
    }

    #[test]
    fn test_read_line_bounded() {
        let mut input = b"ab\n".to_vec();
        input.extend_from_slice(&[b'x'; 100]);
        input.extend_from_slice(b"\nabcd\r\ncd");
        let mut reader = std::io::Cursor::new(input);
        let mut line = Vec::new();

        assert!(read_line(&mut reader, &mut line, 4).unwrap());
        assert_eq!(line, b"ab\n");

        // only the cap is ever buffered, the rest is skipped
        assert!(matches!(read_line(&mut reader, &mut line, 4), Err(Error::LineTooLong(100))));
        assert!(line.is_empty());

        assert!(read_line(&mut reader, &mut line, 4).unwrap());
        assert_eq!(line, b"abcd\r\n");

        // last line without a newline
        assert!(read_line(&mut reader, &mut line, 4).unwrap());
        assert_eq!(line, b"cd");

        assert!(!read_line(&mut reader, &mut line, 4).unwrap());
    }

    #[test]
    fn test_read_line_oversize_at_end() {
        let mut reader = std::io::Cursor::new(vec![b'{'; 1000]);
        let mut line = Vec::new();
        assert!(matches!(read_line(&mut reader, &mut line, 16), Err(Error::LineTooLong(1000))));
        assert!(!read_line(&mut reader, &mut line, 16).unwrap());
    }

    #[test]
    fn test_handle_line() {
        let mut priv_key = vec![0u8; 32];
        priv_key[0] = 0xff;
        let line = format!(
            r#"{{"command":"bytesToPriv","call_id":2147483648,"priv":{}}}"#,
            serde_json::to_string(&priv_key).unwrap()
        );
        let response = handle_line(&line, DEFAULT_MAX_LINE_LENGTH).unwrap();
        let mut expected = vec![0u8; 32];
        expected[0] = 0xf8;
        expected[31] = 0x40;
        assert_eq!(
            response,
            format!(
                r#"{{"call_id":2147483648,"res":{}}}"#,
                serde_json::to_string(&expected).unwrap()
            )
        );

        let line = r#"{"command":"nope","call_id":1,"priv":[]}"#;
        assert!(handle_line(line, DEFAULT_MAX_LINE_LENGTH).is_err());
    }
}
