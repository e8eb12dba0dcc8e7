//! Framing for the memcached text protocol subset.
//!
//! Requests are newline-terminated command lines; a trailing `\r` is
//! dropped so both `\n` and `\r\n` clients work. Responses always use `\r\n`.
//! Keys are opaque bytes; only the command name has to be ASCII.

use bytes::{BufMut, BytesMut};
use ferroflake::SonyflakeId;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, Encoder};

use super::error::{ConnectionError, ProtocolError};

const CRLF: &[u8] = b"\r\n";
const RESP_ERROR: &[u8] = b"ERROR\r\n";
const RESP_END: &[u8] = b"END\r\n";
const VALUE_HEADER: &[u8] = b"VALUE ";
const VALUE_FLAGS: u32 = 0;

/// A parsed client command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `GET`/`GETS`: one fresh ID per key, in order.
    Get { keys: Vec<Vec<u8>> },
    /// `QUIT`: close the connection without replying.
    Quit,
}

impl Command {
    /// Parses one command line with its line terminator already removed.
    ///
    /// ```text
    /// GET <key> [<key> ...]
    /// GETS <key> [<key> ...]
    /// QUIT
    /// ```
    pub fn parse(line: &[u8]) -> Result<Self, ProtocolError> {
        let mut fields = line
            .split(u8::is_ascii_whitespace)
            .filter(|field| !field.is_empty());
        let name = fields.next().ok_or(ProtocolError::EmptyCommand)?;

        if name.eq_ignore_ascii_case(b"GET") || name.eq_ignore_ascii_case(b"GETS") {
            Ok(Self::Get {
                keys: fields.map(<[u8]>::to_vec).collect(),
            })
        } else if name.eq_ignore_ascii_case(b"QUIT") {
            Ok(Self::Quit)
        } else {
            Err(ProtocolError::UnknownCommand(
                String::from_utf8_lossy(name).into_owned(),
            ))
        }
    }
}

/// A reply to a single command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// One `VALUE` block per key followed by `END`.
    Values(Vec<(Vec<u8>, SonyflakeId)>),
    /// `ERROR`, for malformed commands and failed generation.
    Error,
}

/// Codec turning socket bytes into [`Command`]s and [`Response`]s into
/// socket bytes.
///
/// Lines longer than `max_line_length` are discarded up to the next newline
/// and surface as [`ProtocolError::LineTooLong`].
#[derive(Debug)]
pub struct MemcacheCodec {
    lines: AnyDelimiterCodec,
    max_line_length: usize,
}

impl MemcacheCodec {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            lines: AnyDelimiterCodec::new_with_max_length(
                b"\n".to_vec(),
                CRLF.to_vec(),
                max_line_length,
            ),
            max_line_length,
        }
    }

    fn lift(
        &self,
        frame: Result<Option<bytes::Bytes>, AnyDelimiterCodecError>,
    ) -> Result<Option<Result<Command, ProtocolError>>, ConnectionError> {
        match frame {
            Ok(Some(line)) => Ok(Some(Command::parse(&line))),
            Ok(None) => Ok(None),
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
                Ok(Some(Err(ProtocolError::LineTooLong(self.max_line_length))))
            }
            Err(AnyDelimiterCodecError::Io(e)) => Err(e.into()),
        }
    }
}

impl Decoder for MemcacheCodec {
    type Item = Result<Command, ProtocolError>;
    type Error = ConnectionError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame = self.lines.decode(src);
        self.lift(frame)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame = self.lines.decode_eof(src);
        self.lift(frame)
    }
}

impl Encoder<Response> for MemcacheCodec {
    type Error = ConnectionError;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Response::Values(values) => {
                for (key, id) in values {
                    let value = id.to_string();
                    dst.reserve(VALUE_HEADER.len() + key.len() + value.len() + 16);
                    dst.put_slice(VALUE_HEADER);
                    dst.put_slice(&key);
                    dst.put_slice(format!(" {VALUE_FLAGS} {}", value.len()).as_bytes());
                    dst.put_slice(CRLF);
                    dst.put_slice(value.as_bytes());
                    dst.put_slice(CRLF);
                }
                dst.put_slice(RESP_END);
            }
            Response::Error => dst.put_slice(RESP_ERROR),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(
        codec: &mut MemcacheCodec,
        buf: &mut BytesMut,
    ) -> Vec<Result<Command, ProtocolError>> {
        let mut out = Vec::new();
        while let Some(item) = codec.decode(buf).unwrap() {
            out.push(item);
        }
        out
    }

    fn get(keys: &[&str]) -> Result<Command, ProtocolError> {
        Ok(Command::Get {
            keys: keys.iter().map(|k| k.as_bytes().to_vec()).collect(),
        })
    }

    #[test]
    fn parses_get_and_gets_case_insensitively() {
        assert_eq!(Command::parse(b"GET foo"), get(&["foo"]));
        assert_eq!(Command::parse(b"get foo bar"), get(&["foo", "bar"]));
        assert_eq!(Command::parse(b"Gets  a \t b "), get(&["a", "b"]));
        assert_eq!(Command::parse(b"GET"), get(&[]));
    }

    #[test]
    fn parses_quit() {
        assert_eq!(Command::parse(b"QUIT"), Ok(Command::Quit));
        assert_eq!(Command::parse(b"quit\r"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_empty_and_unknown_commands() {
        assert_eq!(Command::parse(b""), Err(ProtocolError::EmptyCommand));
        assert_eq!(Command::parse(b"   "), Err(ProtocolError::EmptyCommand));
        assert_eq!(
            Command::parse(b"FOO bar"),
            Err(ProtocolError::UnknownCommand("FOO".to_owned()))
        );
        assert_eq!(
            Command::parse(b"\xff\xfe a"),
            Err(ProtocolError::UnknownCommand("\u{fffd}\u{fffd}".to_owned()))
        );
    }

    #[test]
    fn keys_are_opaque_bytes() {
        assert_eq!(
            Command::parse(b"GET \xff caf\xc3\xa9"),
            Ok(Command::Get {
                keys: vec![b"\xff".to_vec(), b"caf\xc3\xa9".to_vec()],
            })
        );

        let mut codec = MemcacheCodec::new(64);
        let mut buf = BytesMut::new();
        let id = SonyflakeId::from_raw(7);
        codec
            .encode(Response::Values(vec![(b"\xff".to_vec(), id)]), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"VALUE \xff 0 1\r\n7\r\nEND\r\n");
    }

    #[test]
    fn frames_crlf_and_bare_newlines() {
        let mut codec = MemcacheCodec::new(64);
        let mut buf = BytesMut::from(&b"GET a\r\nget b\n\r\nQUIT\r\nGET c"[..]);
        let items = decode_all(&mut codec, &mut buf);
        assert_eq!(
            items,
            vec![
                get(&["a"]),
                get(&["b"]),
                Err(ProtocolError::EmptyCommand),
                Ok(Command::Quit),
            ]
        );

        // the unterminated tail is still a command at end of stream
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some(get(&["c"])));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn overlong_line_is_reported_once_and_skipped() {
        let mut codec = MemcacheCodec::new(16);
        let mut input = b"GET ".to_vec();
        input.extend(std::iter::repeat_n(b'k', 64));
        input.extend_from_slice(b"\r\nGET ok\r\n");

        let items = decode_all(&mut codec, &mut BytesMut::from(&input[..]));
        assert_eq!(items, vec![Err(ProtocolError::LineTooLong(16)), get(&["ok"])]);
    }

    #[test]
    fn encodes_value_blocks_then_end() {
        let mut codec = MemcacheCodec::new(64);
        let mut buf = BytesMut::new();
        let id = SonyflakeId::from_raw(123_456);
        codec
            .encode(
                Response::Values(vec![(b"foo".to_vec(), id), (b"bar".to_vec(), id)]),
                &mut buf,
            )
            .unwrap();
        assert_eq!(
            &buf[..],
            b"VALUE foo 0 6\r\n123456\r\nVALUE bar 0 6\r\n123456\r\nEND\r\n"
        );
    }

    #[test]
    fn encodes_empty_values_and_error() {
        let mut codec = MemcacheCodec::new(64);
        let mut buf = BytesMut::new();
        codec.encode(Response::Values(Vec::new()), &mut buf).unwrap();
        codec.encode(Response::Error, &mut buf).unwrap();
        assert_eq!(&buf[..], b"END\r\nERROR\r\n");
    }
}
