//! Character and entity reference decoding.
//!
//! Recognizes the five predefined entities (`&lt;`, `&gt;`, `&amp;`,
//! `&apos;`, `&quot;`) and numeric character references in decimal
//! (`&#65;`) and hexadecimal (`&#x41;`) form. Every other `&...` sequence,
//! including one missing its trailing `;`, is rejected.

use std::borrow::Cow;

use memchr::memchr;

use super::input::is_name_byte;

/// Returns `true` if `c` is a valid `Char` per XML 1.0 §2.2.
fn is_xml_char(c: char) -> bool {
    matches!(c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x0001_0000..=0x0010_FFFF
    )
}

/// Maps a predefined entity name to its character.
fn predefined_entity(name: &[u8]) -> Option<char> {
    match name {
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"apos" => Some('\''),
        b"quot" => Some('"'),
        _ => None,
    }
}

/// Accumulates digits of `radix` into a code point, rejecting overflow.
fn parse_code_point(digits: &[u8], radix: u32) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u32, |acc, &b| {
        let digit = char::from(b).to_digit(radix)?;
        acc.checked_mul(radix)?.checked_add(digit)
    })
}

/// Decodes the reference at the start of `bytes`, which must begin with
/// `&`. Returns the decoded character and the number of bytes consumed
/// (including `&` and `;`), or `None` if the reference is not recognized.
pub(crate) fn decode_reference(bytes: &[u8]) -> Option<(char, usize)> {
    debug_assert_eq!(bytes.first(), Some(&b'&'));

    let (ch, semicolon) = if bytes.get(1) == Some(&b'#') {
        let (radix, digits_start) = if bytes.get(2) == Some(&b'x') {
            (16, 3)
        } else {
            (10, 2)
        };
        let digits_len = bytes[digits_start.min(bytes.len())..]
            .iter()
            .take_while(|b| match radix {
                16 => b.is_ascii_hexdigit(),
                _ => b.is_ascii_digit(),
            })
            .count();
        let digits = &bytes[digits_start..digits_start + digits_len];
        let ch = char::from_u32(parse_code_point(digits, radix)?).filter(|&c| is_xml_char(c))?;
        (ch, digits_start + digits_len)
    } else {
        let name_len = bytes[1..].iter().take_while(|&&b| is_name_byte(b)).count();
        (predefined_entity(&bytes[1..1 + name_len])?, 1 + name_len)
    };

    if bytes.get(semicolon) == Some(&b';') {
        Some((ch, semicolon + 1))
    } else {
        None
    }
}

/// Decodes every reference in `raw`.
///
/// Returns the input unchanged (borrowed) when it contains no `&`. On
/// failure, returns the byte index within `raw` of the offending `&`.
pub(crate) fn decode_text(raw: &str) -> Result<Cow<'_, str>, usize> {
    let bytes = raw.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Ok(Cow::Borrowed(raw));
    };

    let mut out = String::with_capacity(raw.len());
    let mut copied = 0;
    let mut amp = first;
    loop {
        out.push_str(&raw[copied..amp]);
        let (ch, len) = decode_reference(&bytes[amp..]).ok_or(amp)?;
        out.push(ch);
        copied = amp + len;
        match memchr(b'&', &bytes[copied..]) {
            Some(next) => amp = copied + next,
            None => break,
        }
    }
    out.push_str(&raw[copied..]);
    Ok(Cow::Owned(out))
}
