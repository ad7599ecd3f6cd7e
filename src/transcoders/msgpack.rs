use bytes::{BufMut, Bytes, BytesMut};

use crate::errors::ContentError;
use crate::handlers::BinaryCodec;
use crate::value::Value;

// Format markers, per the MessagePack specification.
const NIL: u8 = 0xC0;
const FALSE: u8 = 0xC2;
const TRUE: u8 = 0xC3;
const BIN8: u8 = 0xC4;
const BIN16: u8 = 0xC5;
const BIN32: u8 = 0xC6;
const FLOAT32: u8 = 0xCA;
const FLOAT64: u8 = 0xCB;
const UINT8: u8 = 0xCC;
const UINT16: u8 = 0xCD;
const UINT32: u8 = 0xCE;
const UINT64: u8 = 0xCF;
const INT8: u8 = 0xD0;
const INT16: u8 = 0xD1;
const INT32: u8 = 0xD2;
const INT64: u8 = 0xD3;
const STR8: u8 = 0xD9;
const STR16: u8 = 0xDA;
const STR32: u8 = 0xDB;
const ARRAY16: u8 = 0xDC;
const ARRAY32: u8 = 0xDD;
const MAP16: u8 = 0xDE;
const MAP32: u8 = 0xDF;

const FIXSTR: u8 = 0xA0;
const FIXARRAY: u8 = 0x90;
const FIXMAP: u8 = 0x80;

// Decode guard against marker-bomb payloads (e.g. megabytes of nested
// fixarray headers) blowing the stack.
const MAX_DEPTH: usize = 128;

/// Canonical MessagePack codec: one deterministic byte encoding per value,
/// with minimal-width integer markers and minimal length prefixes. Length
/// and width thresholds are strict `<` at the 2^5, 2^8, 2^16 and 2^32
/// boundaries; all multi-byte fields are big-endian.
///
/// The extension hooks match the JSON transcoder: UUIDs and timestamps pack
/// as their string forms (str family), byte buffers as the bin family.
/// Decoding performs no reverse extension.
#[derive(Debug, Default)]
pub struct MsgPackTranscoder;

impl MsgPackTranscoder {
    pub fn new() -> Self {
        Self
    }
}

impl BinaryCodec for MsgPackTranscoder {
    fn pack(&self, value: &Value) -> Result<Bytes, ContentError> {
        let mut buf = BytesMut::new();
        write_value(&mut buf, value)?;
        Ok(buf.freeze())
    }

    fn unpack(&self, data: &[u8]) -> Result<Value, ContentError> {
        let mut reader = Reader::new(data);
        let value = read_value(&mut reader, 0)?;
        if !reader.is_empty() {
            return Err(ContentError::Decode(format!(
                "{} trailing bytes after the msgpack value",
                reader.remaining()
            )));
        }
        Ok(value)
    }
}

fn write_value(buf: &mut BytesMut, value: &Value) -> Result<(), ContentError> {
    match value {
        Value::Null => buf.put_u8(NIL),
        Value::Bool(false) => buf.put_u8(FALSE),
        Value::Bool(true) => buf.put_u8(TRUE),
        Value::Integer(i) => write_int(buf, *i)?,
        Value::Float(f) => {
            buf.put_u8(FLOAT64);
            buf.put_f64(*f);
        }
        Value::String(s) => write_str(buf, s)?,
        Value::Binary(data) => write_bin(buf, data)?,
        Value::Array(items) => {
            write_array_header(buf, items.len())?;
            for item in items {
                write_value(buf, item)?;
            }
        }
        Value::Map(entries) => {
            write_map_header(buf, entries.len())?;
            for (key, val) in entries {
                write_value(buf, key)?;
                write_value(buf, val)?;
            }
        }
        Value::Uuid(uuid) => write_str(buf, &uuid.to_string())?,
        Value::Timestamp(ts) => write_str(buf, &ts.iso_string())?,
    }
    Ok(())
}

fn write_int(buf: &mut BytesMut, i: i128) -> Result<(), ContentError> {
    if i >= 0 {
        if i < 1 << 7 {
            buf.put_u8(i as u8);
        } else if i < 1 << 8 {
            buf.put_u8(UINT8);
            buf.put_u8(i as u8);
        } else if i < 1 << 16 {
            buf.put_u8(UINT16);
            buf.put_u16(i as u16);
        } else if i < 1 << 32 {
            buf.put_u8(UINT32);
            buf.put_u32(i as u32);
        } else if i < 1 << 64 {
            buf.put_u8(UINT64);
            buf.put_u64(i as u64);
        } else {
            return Err(ContentError::Type(format!(
                "integer {i} does not fit in uint64"
            )));
        }
    } else if i >= -(1 << 5) {
        buf.put_i8(i as i8);
    } else if i >= -(1 << 7) {
        buf.put_u8(INT8);
        buf.put_i8(i as i8);
    } else if i >= -(1 << 15) {
        buf.put_u8(INT16);
        buf.put_i16(i as i16);
    } else if i >= -(1 << 31) {
        buf.put_u8(INT32);
        buf.put_i32(i as i32);
    } else if i >= -(1_i128 << 63) {
        buf.put_u8(INT64);
        buf.put_i64(i as i64);
    } else {
        return Err(ContentError::Type(format!(
            "integer {i} does not fit in int64"
        )));
    }
    Ok(())
}

fn write_str(buf: &mut BytesMut, s: &str) -> Result<(), ContentError> {
    let payload = s.as_bytes();
    let len = payload.len();
    if len < 1 << 5 {
        buf.put_u8(FIXSTR | len as u8);
    } else if len < 1 << 8 {
        buf.put_u8(STR8);
        buf.put_u8(len as u8);
    } else if len < 1 << 16 {
        buf.put_u8(STR16);
        buf.put_u16(len as u16);
    } else if (len as u64) < 1 << 32 {
        buf.put_u8(STR32);
        buf.put_u32(len as u32);
    } else {
        return Err(ContentError::Type(format!("string of {len} bytes is too long")));
    }
    buf.put_slice(payload);
    Ok(())
}

fn write_bin(buf: &mut BytesMut, data: &[u8]) -> Result<(), ContentError> {
    let len = data.len();
    if len < 1 << 8 {
        buf.put_u8(BIN8);
        buf.put_u8(len as u8);
    } else if len < 1 << 16 {
        buf.put_u8(BIN16);
        buf.put_u16(len as u16);
    } else if (len as u64) < 1 << 32 {
        buf.put_u8(BIN32);
        buf.put_u32(len as u32);
    } else {
        return Err(ContentError::Type(format!(
            "byte sequence of {len} bytes is too long"
        )));
    }
    buf.put_slice(data);
    Ok(())
}

fn write_array_header(buf: &mut BytesMut, count: usize) -> Result<(), ContentError> {
    if count < 16 {
        buf.put_u8(FIXARRAY | count as u8);
    } else if count < 1 << 16 {
        buf.put_u8(ARRAY16);
        buf.put_u16(count as u16);
    } else if (count as u64) < 1 << 32 {
        buf.put_u8(ARRAY32);
        buf.put_u32(count as u32);
    } else {
        return Err(ContentError::Type(format!(
            "sequence of {count} elements is too long"
        )));
    }
    Ok(())
}

fn write_map_header(buf: &mut BytesMut, count: usize) -> Result<(), ContentError> {
    if count < 16 {
        buf.put_u8(FIXMAP | count as u8);
    } else if count < 1 << 16 {
        buf.put_u8(MAP16);
        buf.put_u16(count as u16);
    } else if (count as u64) < 1 << 32 {
        buf.put_u8(MAP32);
        buf.put_u32(count as u32);
    } else {
        return Err(ContentError::Type(format!(
            "mapping of {count} entries is too long"
        )));
    }
    Ok(())
}

/// Bounds-checked front cursor over the input buffer.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ContentError> {
        if self.buf.len() < n {
            return Err(ContentError::Decode(
                "unexpected end of msgpack data".to_owned(),
            ));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn u8(&mut self) -> Result<u8, ContentError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ContentError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ContentError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, ContentError> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}

fn read_value(r: &mut Reader<'_>, depth: usize) -> Result<Value, ContentError> {
    if depth > MAX_DEPTH {
        return Err(ContentError::Decode("msgpack nesting too deep".to_owned()));
    }
    let marker = r.u8()?;
    match marker {
        0x00..=0x7F => Ok(Value::Integer(marker.into())),
        0x80..=0x8F => read_map(r, (marker & 0x0F) as usize, depth),
        0x90..=0x9F => read_array(r, (marker & 0x0F) as usize, depth),
        0xA0..=0xBF => read_str(r, (marker & 0x1F) as usize),
        NIL => Ok(Value::Null),
        0xC1 => Err(ContentError::Decode("reserved marker 0xC1".to_owned())),
        FALSE => Ok(Value::Bool(false)),
        TRUE => Ok(Value::Bool(true)),
        BIN8 => {
            let len = r.u8()? as usize;
            read_bin(r, len)
        }
        BIN16 => {
            let len = r.u16()? as usize;
            read_bin(r, len)
        }
        BIN32 => {
            let len = r.u32()? as usize;
            read_bin(r, len)
        }
        0xC7..=0xC9 | 0xD4..=0xD8 => Err(ContentError::Decode(format!(
            "ext family marker 0x{marker:02X} is not supported"
        ))),
        FLOAT32 => Ok(Value::Float(f32::from_bits(r.u32()?).into())),
        FLOAT64 => Ok(Value::Float(f64::from_bits(r.u64()?))),
        UINT8 => Ok(Value::Integer(r.u8()?.into())),
        UINT16 => Ok(Value::Integer(r.u16()?.into())),
        UINT32 => Ok(Value::Integer(r.u32()?.into())),
        UINT64 => Ok(Value::Integer(r.u64()?.into())),
        INT8 => Ok(Value::Integer((r.u8()? as i8).into())),
        INT16 => Ok(Value::Integer((r.u16()? as i16).into())),
        INT32 => Ok(Value::Integer((r.u32()? as i32).into())),
        INT64 => Ok(Value::Integer((r.u64()? as i64).into())),
        STR8 => {
            let len = r.u8()? as usize;
            read_str(r, len)
        }
        STR16 => {
            let len = r.u16()? as usize;
            read_str(r, len)
        }
        STR32 => {
            let len = r.u32()? as usize;
            read_str(r, len)
        }
        ARRAY16 => {
            let count = r.u16()? as usize;
            read_array(r, count, depth)
        }
        ARRAY32 => {
            let count = r.u32()? as usize;
            read_array(r, count, depth)
        }
        MAP16 => {
            let count = r.u16()? as usize;
            read_map(r, count, depth)
        }
        MAP32 => {
            let count = r.u32()? as usize;
            read_map(r, count, depth)
        }
        0xE0..=0xFF => Ok(Value::Integer((marker as i8).into())),
    }
}

fn read_str(r: &mut Reader<'_>, len: usize) -> Result<Value, ContentError> {
    let raw = r.take(len)?;
    let text = std::str::from_utf8(raw)
        .map_err(|err| ContentError::Decode(format!("invalid UTF-8 in msgpack str: {err}")))?;
    Ok(Value::String(text.to_owned()))
}

fn read_bin(r: &mut Reader<'_>, len: usize) -> Result<Value, ContentError> {
    Ok(Value::Binary(Bytes::copy_from_slice(r.take(len)?)))
}

fn read_array(r: &mut Reader<'_>, count: usize, depth: usize) -> Result<Value, ContentError> {
    let mut items = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        items.push(read_value(r, depth + 1)?);
    }
    Ok(Value::Array(items))
}

fn read_map(r: &mut Reader<'_>, count: usize, depth: usize) -> Result<Value, ContentError> {
    let mut entries = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        let key = read_value(r, depth + 1)?;
        let value = read_value(r, depth + 1)?;
        entries.push((key, value));
    }
    Ok(Value::Map(entries))
}
