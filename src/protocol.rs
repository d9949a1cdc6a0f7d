//! Text wire format.
//!
//! ```text
//! Envelope  := "U" tag(2) Body
//! Body      := "G" gameId(2)
//!            | "J" gameId(2)
//!            | "B" gameId(2) Layout
//!            | "F" gameId(2) x(1) y(1)
//! Layout    := ShipTuple*
//! ShipTuple := ("V" | "H") length(1) col(1) row(1)
//! ```
//!
//! Every numeric field is one ASCII digit. The layout has no separators or
//! count, so the decoder consumes it four bytes at a time.

use alloc::string::String;
use core::fmt;

use crate::identity::Tag;
use crate::layout::{BoardLayout, ShipTuple};
use crate::ship::Orientation;

pub const ENVELOPE_PREFIX: u8 = b'U';
const TUPLE_LEN: usize = 4;
const MIN_SHIP_LEN: u8 = 2;
const MAX_SHIP_LEN: u8 = 5;

/// Application messages, decoded once at the channel boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A hosted game is looking for a peer.
    Announce { game_id: Tag },
    /// A peer joins the announced game.
    Join { game_id: Tag },
    /// The sender's fleet geometry.
    Board { game_id: Tag, layout: BoardLayout },
    /// A shot at column `x`, row `y`.
    Fire { game_id: Tag, x: u8, y: u8 },
}

impl Message {
    pub fn game_id(&self) -> Tag {
        match self {
            Message::Announce { game_id }
            | Message::Join { game_id }
            | Message::Board { game_id, .. }
            | Message::Fire { game_id, .. } => *game_id,
        }
    }

    /// Wire type character.
    pub fn type_char(&self) -> char {
        match self {
            Message::Announce { .. } => 'G',
            Message::Join { .. } => 'J',
            Message::Board { .. } => 'B',
            Message::Fire { .. } => 'F',
        }
    }

    pub fn encode(&self) -> Result<String, EncodeError> {
        let mut out = String::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }

    fn encode_into(&self, out: &mut String) -> Result<(), EncodeError> {
        out.push(self.type_char());
        out.push_str(self.game_id().as_str());
        match self {
            Message::Announce { .. } | Message::Join { .. } => {}
            Message::Board { layout, .. } => encode_layout_into(layout, out)?,
            Message::Fire { x, y, .. } => {
                push_digit(out, "x", *x)?;
                push_digit(out, "y", *y)?;
            }
        }
        Ok(())
    }

    pub fn decode(body: &str) -> Result<Self, DecodeError> {
        if !body.is_ascii() {
            return Err(DecodeError::NonAscii);
        }
        let bytes = body.as_bytes();
        let (&kind, rest) = bytes.split_first().ok_or(DecodeError::Truncated)?;
        let game_id = read_tag(rest)?;
        let rest = &rest[2..];
        match kind {
            b'G' => exact(rest, 0).map(|_| Message::Announce { game_id }),
            b'J' => exact(rest, 0).map(|_| Message::Join { game_id }),
            b'B' => Ok(Message::Board {
                game_id,
                layout: decode_layout_bytes(rest)?,
            }),
            b'F' => {
                exact(rest, 2)?;
                Ok(Message::Fire {
                    game_id,
                    x: digit(rest[0])?,
                    y: digit(rest[1])?,
                })
            }
            other => Err(DecodeError::UnknownType(other as char)),
        }
    }
}

/// A message plus the tag of whoever sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub sender: Tag,
    pub message: Message,
}

impl Envelope {
    pub fn new(sender: Tag, message: Message) -> Self {
        Self { sender, message }
    }

    pub fn encode(&self) -> Result<String, EncodeError> {
        let mut out = String::new();
        out.push(ENVELOPE_PREFIX as char);
        out.push_str(self.sender.as_str());
        self.message.encode_into(&mut out)?;
        Ok(out)
    }

    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let bytes = text.as_bytes();
        match bytes.first() {
            Some(&ENVELOPE_PREFIX) => {}
            _ => return Err(DecodeError::MissingPrefix),
        }
        if !text.is_ascii() {
            return Err(DecodeError::NonAscii);
        }
        let sender = read_tag(&bytes[1..])?;
        let message = Message::decode(&text[3..])?;
        Ok(Self { sender, message })
    }
}

/// Concatenated ship tuples.
pub fn encode_layout(layout: &BoardLayout) -> Result<String, EncodeError> {
    let mut out = String::new();
    encode_layout_into(layout, &mut out)?;
    Ok(out)
}

fn encode_layout_into(layout: &BoardLayout, out: &mut String) -> Result<(), EncodeError> {
    for ship in layout.ships() {
        out.push(ship.orientation.as_char());
        push_digit(out, "length", ship.length)?;
        push_digit(out, "col", ship.col)?;
        push_digit(out, "row", ship.row)?;
    }
    Ok(())
}

pub fn decode_layout(text: &str) -> Result<BoardLayout, DecodeError> {
    if !text.is_ascii() {
        return Err(DecodeError::NonAscii);
    }
    decode_layout_bytes(text.as_bytes())
}

fn decode_layout_bytes(bytes: &[u8]) -> Result<BoardLayout, DecodeError> {
    if bytes.len() % TUPLE_LEN != 0 {
        return Err(DecodeError::Truncated);
    }
    bytes
        .chunks_exact(TUPLE_LEN)
        .map(|t| {
            let orientation =
                Orientation::from_char(t[0] as char).ok_or(DecodeError::BadOrientation(t[0] as char))?;
            let length = digit(t[1])?;
            if !(MIN_SHIP_LEN..=MAX_SHIP_LEN).contains(&length) {
                return Err(DecodeError::BadLength(length));
            }
            Ok(ShipTuple::new(orientation, length, digit(t[2])?, digit(t[3])?))
        })
        .collect()
}

fn read_tag(bytes: &[u8]) -> Result<Tag, DecodeError> {
    match bytes {
        [a, b, ..] => Tag::from_bytes([*a, *b]).ok_or(DecodeError::BadTag),
        _ => Err(DecodeError::Truncated),
    }
}

fn exact(rest: &[u8], len: usize) -> Result<(), DecodeError> {
    use core::cmp::Ordering;
    match rest.len().cmp(&len) {
        Ordering::Less => Err(DecodeError::Truncated),
        Ordering::Greater => Err(DecodeError::TrailingBytes),
        Ordering::Equal => Ok(()),
    }
}

fn digit(b: u8) -> Result<u8, DecodeError> {
    if b.is_ascii_digit() {
        Ok(b - b'0')
    } else {
        Err(DecodeError::BadDigit(b as char))
    }
}

fn push_digit(out: &mut String, field: &'static str, value: u8) -> Result<(), EncodeError> {
    let c = char::from_digit(value as u32, 10).ok_or(EncodeError::FieldOutOfRange { field, value })?;
    out.push(c);
    Ok(())
}

/// Reasons an inbound text is not a well-formed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Text does not start with the `U` envelope marker.
    MissingPrefix,
    NonAscii,
    /// Ran out of bytes before a field was complete.
    Truncated,
    /// Bytes left over after a fixed-width body.
    TrailingBytes,
    UnknownType(char),
    BadTag,
    BadDigit(char),
    BadOrientation(char),
    BadLength(u8),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingPrefix => write!(f, "missing envelope prefix"),
            DecodeError::NonAscii => write!(f, "non-ASCII payload"),
            DecodeError::Truncated => write!(f, "truncated message"),
            DecodeError::TrailingBytes => write!(f, "unexpected trailing bytes"),
            DecodeError::UnknownType(c) => write!(f, "unknown message type {:?}", c),
            DecodeError::BadTag => write!(f, "invalid tag"),
            DecodeError::BadDigit(c) => write!(f, "expected digit, got {:?}", c),
            DecodeError::BadOrientation(c) => write!(f, "expected V or H, got {:?}", c),
            DecodeError::BadLength(n) => write!(f, "ship length {} outside 2..=5", n),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// A field value that cannot be written as a single digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    FieldOutOfRange { field: &'static str, value: u8 },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::FieldOutOfRange { field, value } => {
                write!(f, "{} = {} does not fit one digit", field, value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}
