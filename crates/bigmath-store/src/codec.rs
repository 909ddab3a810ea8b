//! Byte layout of a persisted constant.
//!
//! ```text
//! u8  tag           0 = binary, 1 = text
//! i64 precision     bits after the point
//! binary: i64 whole bits, u8 sign (1 = negative), magnitude bytes to the end
//! text:   u32 radix, i64 whole digits, u32 length, UTF-8 digits
//! ```
//!
//! All integers are big-endian. The binary magnitude is the minimal
//! big-endian encoding; on read the exponent is recovered as
//! `8·bytes - leading_zeros(first byte) - whole_bits`, which also holds when
//! only a prefix of the magnitude is read.

use std::io::{self, Read, Write};

use bigmath_core::{BigFloat, MathError};
use num_bigint::{BigInt, BigUint, Sign};

use crate::error::StoreError;

const TAG_BINARY: u8 = 0;
const TAG_TEXT: u8 = 1;

/// Extra bits read beyond the requested precision on truncated reads.
const TRUNCATION_GUARD_BITS: i64 = 8;

/// How a constant is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Binary,
    /// Positional digits in the given radix (2..=36).
    Text { radix: u32 },
}

/// Fields preceding the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub encoding_tag: u8,
    /// Bits after the point of the stored value.
    pub precision: i64,
}

impl Header {
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.encoding_tag == TAG_BINARY
    }
}

/// Write `value` with `encoding`; its exponent is the stored precision.
pub fn write_value<W: Write>(
    writer: &mut W,
    value: &BigFloat,
    encoding: Encoding,
) -> Result<(), StoreError> {
    match encoding {
        Encoding::Binary => write_binary(writer, value),
        Encoding::Text { radix } => write_text(writer, value, radix),
    }
}

fn write_binary<W: Write>(writer: &mut W, value: &BigFloat) -> Result<(), StoreError> {
    let (sign, magnitude) = value.mantissa().to_bytes_be();
    let magnitude = if value.is_zero() { Vec::new() } else { magnitude };
    writer.write_all(&[TAG_BINARY])?;
    writer.write_all(&value.exponent().to_be_bytes())?;
    writer.write_all(&value.whole_bits().to_be_bytes())?;
    writer.write_all(&[u8::from(sign == Sign::Minus)])?;
    writer.write_all(&magnitude)?;
    Ok(())
}

fn write_text<W: Write>(writer: &mut W, value: &BigFloat, radix: u32) -> Result<(), StoreError> {
    let text = value.to_string_radix(radix)?;
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let digits = format!("{whole}{fraction}");
    let whole_digits = whole.trim_start_matches('-').len() as i64;
    let length = u32::try_from(digits.len())
        .map_err(|_| MathError::Format(format!("{} digits do not fit the text layout", digits.len())))?;

    writer.write_all(&[TAG_TEXT])?;
    writer.write_all(&value.exponent().to_be_bytes())?;
    writer.write_all(&radix.to_be_bytes())?;
    writer.write_all(&whole_digits.to_be_bytes())?;
    writer.write_all(&length.to_be_bytes())?;
    writer.write_all(digits.as_bytes())?;
    Ok(())
}

/// Read the tag and stored precision.
pub fn read_header<R: Read>(reader: &mut R) -> Result<Header, StoreError> {
    let encoding_tag = read_array::<R, 1>(reader)?[0];
    if encoding_tag != TAG_BINARY && encoding_tag != TAG_TEXT {
        return Err(format_error(format!("unknown encoding tag {encoding_tag}")));
    }
    let precision = i64::from_be_bytes(read_array(reader)?);
    Ok(Header {
        encoding_tag,
        precision,
    })
}

/// Read the value following `header`.
///
/// With `precision = Some(p)` a binary value is read only as far as needed
/// for `p` fractional bits (plus a few guard bits) and may be truncated.
pub fn read_value<R: Read>(
    reader: &mut R,
    header: &Header,
    precision: Option<i64>,
) -> Result<BigFloat, StoreError> {
    if header.is_binary() {
        read_binary(reader, header, precision)
    } else {
        read_text(reader, header)
    }
}

fn read_binary<R: Read>(
    reader: &mut R,
    header: &Header,
    precision: Option<i64>,
) -> Result<BigFloat, StoreError> {
    let whole_bits = i64::from_be_bytes(read_array(reader)?);
    let negative = match read_array::<R, 1>(reader)?[0] {
        0 => false,
        1 => true,
        other => return Err(format_error(format!("invalid sign byte {other}"))),
    };

    let mut magnitude = Vec::new();
    let truncated = match precision {
        Some(p) if p < header.precision => {
            let bits = (whole_bits + p + TRUNCATION_GUARD_BITS).max(0);
            let bytes = (bits as u64).div_ceil(8);
            reader.take(bytes).read_to_end(&mut magnitude)?;
            true
        }
        _ => {
            reader.read_to_end(&mut magnitude)?;
            false
        }
    };

    let Some(&first) = magnitude.first() else {
        if whole_bits != -header.precision {
            return Err(format_error("empty magnitude with a non-zero bit count"));
        }
        return Ok(BigFloat::new(0, header.precision));
    };
    if first == 0 {
        return Err(format_error("magnitude has a leading zero byte"));
    }

    let bit_len = magnitude.len() as i64 * 8 - i64::from(first.leading_zeros());
    let exponent = bit_len - whole_bits;
    if exponent > header.precision || (!truncated && exponent != header.precision) {
        return Err(format_error(format!(
            "magnitude of {bit_len} bits does not match the stored precision {}",
            header.precision
        )));
    }
    let sign = if negative { Sign::Minus } else { Sign::Plus };
    let mantissa = BigInt::from_biguint(sign, BigUint::from_bytes_be(&magnitude));
    Ok(BigFloat::new(mantissa, exponent))
}

fn read_text<R: Read>(reader: &mut R, header: &Header) -> Result<BigFloat, StoreError> {
    let radix = u32::from_be_bytes(read_array(reader)?);
    let whole_digits = i64::from_be_bytes(read_array(reader)?);
    let length = u32::from_be_bytes(read_array(reader)?);

    let mut digits = Vec::new();
    reader.take(u64::from(length)).read_to_end(&mut digits)?;
    if digits.len() != length as usize {
        return Err(format_error("truncated digit string"));
    }
    let digits =
        String::from_utf8(digits).map_err(|e| format_error(format!("digits are not UTF-8: {e}")))?;

    let negative = digits.starts_with('-');
    let unsigned = digits.trim_start_matches('-');
    let split = usize::try_from(whole_digits)
        .ok()
        .filter(|&split| split <= unsigned.len())
        .ok_or_else(|| format_error(format!("whole digit count {whole_digits} out of range")))?;
    let (whole, fraction) = unsigned.split_at(split);
    let text = format!("{}{whole}.{fraction}", if negative { "-" } else { "" });
    Ok(BigFloat::parse_radix(&text, radix, header.precision.max(0))?)
}

/// Encode into a fresh buffer.
pub fn encode(value: &BigFloat, encoding: Encoding) -> Result<Vec<u8>, StoreError> {
    let mut bytes = Vec::new();
    write_value(&mut bytes, value, encoding)?;
    Ok(bytes)
}

/// Decode a whole buffer; trailing bytes of a text value are an error.
pub fn decode(bytes: &[u8], precision: Option<i64>) -> Result<(Header, BigFloat), StoreError> {
    let mut reader = bytes;
    let header = read_header(&mut reader)?;
    let value = read_value(&mut reader, &header, precision)?;
    if !header.is_binary() && !reader.is_empty() {
        return Err(format_error("trailing bytes after the digit string"));
    }
    Ok((header, value))
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N], StoreError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            format_error("unexpected end of stream")
        } else {
            StoreError::Io(e)
        }
    })?;
    Ok(buf)
}

fn format_error(msg: impl Into<String>) -> StoreError {
    StoreError::Format(MathError::Format(msg.into()))
}
