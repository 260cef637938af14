//! HTML Entity Decoding
//!
//! Handles decoding of character references in text content:
//! - Named references for the common HTML entities (&amp; &nbsp; &copy; ...)
//! - Numeric character references: &#123; &#x7B;
//!
//! Uses Cow for zero-copy when no entities are present.

use memchr::memchr;
use std::borrow::Cow;

/// Longest named reference we look up (the semicolon must fall inside it)
const MAX_ENTITY_LEN: usize = 32;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, [u8]> {
    // Fast path: check if there are any entities using SIMD
    if memchr(b'&', input).is_none() {
        return Cow::Borrowed(input);
    }
    // Slow path: decode entities
    Cow::Owned(decode_entities(input))
}

/// Decode all entity references in the input
///
/// Unknown or unterminated references are kept verbatim.
pub fn decode_entities(input: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        let Some(amp_pos) = memchr(b'&', &input[pos..]) else {
            result.extend_from_slice(&input[pos..]);
            break;
        };

        result.extend_from_slice(&input[pos..pos + amp_pos]);
        pos += amp_pos;

        let window_end = input.len().min(pos + 1 + MAX_ENTITY_LEN);
        let decoded = memchr(b';', &input[pos + 1..window_end]).and_then(|semi_offset| {
            let entity = &input[pos + 1..pos + 1 + semi_offset];
            decode_entity(entity).map(|ch| (ch, semi_offset + 2))
        });

        match decoded {
            Some((ch, consumed)) => {
                let mut buf = [0u8; 4];
                result.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                pos += consumed;
            }
            None => {
                result.push(b'&');
                pos += 1;
            }
        }
    }

    result
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &[u8]) -> Option<char> {
    match entity.first()? {
        b'#' => decode_numeric_entity(&entity[1..]),
        _ => named_entity(entity),
    }
}

/// Decode a numeric character reference following HTML rules:
/// NUL, surrogates and out-of-range values become U+FFFD, and the
/// C1 range is remapped through windows-1252.
fn decode_numeric_entity(entity: &[u8]) -> Option<char> {
    let (digits, radix) = match entity.first()? {
        b'x' | b'X' => (&entity[1..], 16),
        _ => (entity, 10),
    };
    if digits.is_empty() || !digits.iter().all(|b| (*b as char).is_digit(radix)) {
        return None;
    }

    // Saturate instead of overflowing on absurdly long references
    let codepoint = digits.iter().fold(0u32, |acc, b| {
        let digit = (*b as char).to_digit(radix).unwrap_or(0);
        acc.saturating_mul(radix).saturating_add(digit)
    });

    if let Some(ch) = windows_1252(codepoint) {
        return Some(ch);
    }
    match codepoint {
        0 => Some(char::REPLACEMENT_CHARACTER),
        _ => Some(char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER)),
    }
}

/// Code points 0x80..=0x9F that browsers reinterpret as windows-1252
fn windows_1252(codepoint: u32) -> Option<char> {
    let ch = match codepoint {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => return None,
    };
    Some(ch)
}

/// Named references. Not the full HTML table, only what shows up in
/// real-world text.
fn named_entity(name: &[u8]) -> Option<char> {
    let ch = match name {
        b"amp" | b"AMP" => '&',
        b"lt" | b"LT" => '<',
        b"gt" | b"GT" => '>',
        b"quot" | b"QUOT" => '"',
        b"apos" => '\'',
        b"nbsp" => '\u{00A0}',
        b"ensp" => '\u{2002}',
        b"emsp" => '\u{2003}',
        b"thinsp" => '\u{2009}',
        b"zwnj" => '\u{200C}',
        b"zwj" => '\u{200D}',
        b"shy" => '\u{00AD}',
        b"copy" | b"COPY" => '\u{00A9}',
        b"reg" | b"REG" => '\u{00AE}',
        b"trade" => '\u{2122}',
        b"mdash" => '\u{2014}',
        b"ndash" => '\u{2013}',
        b"lsquo" => '\u{2018}',
        b"rsquo" => '\u{2019}',
        b"sbquo" => '\u{201A}',
        b"ldquo" => '\u{201C}',
        b"rdquo" => '\u{201D}',
        b"bdquo" => '\u{201E}',
        b"laquo" => '\u{00AB}',
        b"raquo" => '\u{00BB}',
        b"lsaquo" => '\u{2039}',
        b"rsaquo" => '\u{203A}',
        b"hellip" => '\u{2026}',
        b"bull" => '\u{2022}',
        b"middot" => '\u{00B7}',
        b"dagger" => '\u{2020}',
        b"Dagger" => '\u{2021}',
        b"permil" => '\u{2030}',
        b"prime" => '\u{2032}',
        b"Prime" => '\u{2033}',
        b"sect" => '\u{00A7}',
        b"para" => '\u{00B6}',
        b"deg" => '\u{00B0}',
        b"plusmn" => '\u{00B1}',
        b"times" => '\u{00D7}',
        b"divide" => '\u{00F7}',
        b"minus" => '\u{2212}',
        b"frac12" => '\u{00BD}',
        b"frac14" => '\u{00BC}',
        b"frac34" => '\u{00BE}',
        b"sup1" => '\u{00B9}',
        b"sup2" => '\u{00B2}',
        b"sup3" => '\u{00B3}',
        b"micro" => '\u{00B5}',
        b"iexcl" => '\u{00A1}',
        b"iquest" => '\u{00BF}',
        b"cent" => '\u{00A2}',
        b"pound" => '\u{00A3}',
        b"curren" => '\u{00A4}',
        b"yen" => '\u{00A5}',
        b"euro" => '\u{20AC}',
        b"brvbar" => '\u{00A6}',
        b"uml" => '\u{00A8}',
        b"ordf" => '\u{00AA}',
        b"ordm" => '\u{00BA}',
        b"not" => '\u{00AC}',
        b"macr" => '\u{00AF}',
        b"acute" => '\u{00B4}',
        b"cedil" => '\u{00B8}',
        b"larr" => '\u{2190}',
        b"uarr" => '\u{2191}',
        b"rarr" => '\u{2192}',
        b"darr" => '\u{2193}',
        b"harr" => '\u{2194}',
        b"lArr" => '\u{21D0}',
        b"rArr" => '\u{21D2}',
        b"hArr" => '\u{21D4}',
        b"infin" => '\u{221E}',
        b"ne" => '\u{2260}',
        b"le" => '\u{2264}',
        b"ge" => '\u{2265}',
        b"asymp" => '\u{2248}',
        b"equiv" => '\u{2261}',
        b"sum" => '\u{2211}',
        b"prod" => '\u{220F}',
        b"radic" => '\u{221A}',
        b"part" => '\u{2202}',
        b"nabla" => '\u{2207}',
        b"isin" => '\u{2208}',
        b"cap" => '\u{2229}',
        b"cup" => '\u{222A}',
        b"int" => '\u{222B}',
        b"alpha" => '\u{03B1}',
        b"beta" => '\u{03B2}',
        b"gamma" => '\u{03B3}',
        b"delta" => '\u{03B4}',
        b"epsilon" => '\u{03B5}',
        b"lambda" => '\u{03BB}',
        b"mu" => '\u{03BC}',
        b"pi" => '\u{03C0}',
        b"sigma" => '\u{03C3}',
        b"omega" => '\u{03C9}',
        b"Delta" => '\u{0394}',
        b"Sigma" => '\u{03A3}',
        b"Omega" => '\u{03A9}',
        b"hearts" => '\u{2665}',
        b"spades" => '\u{2660}',
        b"clubs" => '\u{2663}',
        b"diams" => '\u{2666}',
        b"loz" => '\u{25CA}',
        b"Agrave" => '\u{00C0}',
        b"Aacute" => '\u{00C1}',
        b"Acirc" => '\u{00C2}',
        b"Atilde" => '\u{00C3}',
        b"Auml" => '\u{00C4}',
        b"Aring" => '\u{00C5}',
        b"AElig" => '\u{00C6}',
        b"Ccedil" => '\u{00C7}',
        b"Egrave" => '\u{00C8}',
        b"Eacute" => '\u{00C9}',
        b"Ecirc" => '\u{00CA}',
        b"Euml" => '\u{00CB}',
        b"Iacute" => '\u{00CD}',
        b"Ntilde" => '\u{00D1}',
        b"Oacute" => '\u{00D3}',
        b"Ocirc" => '\u{00D4}',
        b"Ouml" => '\u{00D6}',
        b"Oslash" => '\u{00D8}',
        b"Uacute" => '\u{00DA}',
        b"Uuml" => '\u{00DC}',
        b"szlig" => '\u{00DF}',
        b"agrave" => '\u{00E0}',
        b"aacute" => '\u{00E1}',
        b"acirc" => '\u{00E2}',
        b"atilde" => '\u{00E3}',
        b"auml" => '\u{00E4}',
        b"aring" => '\u{00E5}',
        b"aelig" => '\u{00E6}',
        b"ccedil" => '\u{00E7}',
        b"egrave" => '\u{00E8}',
        b"eacute" => '\u{00E9}',
        b"ecirc" => '\u{00EA}',
        b"euml" => '\u{00EB}',
        b"igrave" => '\u{00EC}',
        b"iacute" => '\u{00ED}',
        b"icirc" => '\u{00EE}',
        b"iuml" => '\u{00EF}',
        b"ntilde" => '\u{00F1}',
        b"ograve" => '\u{00F2}',
        b"oacute" => '\u{00F3}',
        b"ocirc" => '\u{00F4}',
        b"otilde" => '\u{00F5}',
        b"ouml" => '\u{00F6}',
        b"oslash" => '\u{00F8}',
        b"ugrave" => '\u{00F9}',
        b"uacute" => '\u{00FA}',
        b"ucirc" => '\u{00FB}',
        b"uuml" => '\u{00FC}',
        b"yacute" => '\u{00FD}',
        b"yuml" => '\u{00FF}',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities() {
        let input = b"Hello, World!";
        let result = decode_text(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result.as_ref(), b"Hello, World!");
    }

    #[test]
    fn test_basic_entities() {
        let input = b"&lt;hello&gt; &amp; &quot;world&quot;";
        let result = decode_text(input);
        assert_eq!(result.as_ref(), b"<hello> & \"world\"");
    }

    #[test]
    fn test_html_named_entities() {
        let result = decode_text(b"a&nbsp;b &copy; 2024 &mdash; caf&eacute;");
        assert_eq!(
            std::str::from_utf8(result.as_ref()).unwrap(),
            "a\u{00A0}b \u{00A9} 2024 \u{2014} caf\u{00E9}"
        );
    }

    #[test]
    fn test_numeric_decimal_and_hex() {
        assert_eq!(decode_text(b"&#65;&#66;&#67;").as_ref(), b"ABC");
        assert_eq!(decode_text(b"&#x41;&#X42;&#x43;").as_ref(), b"ABC");
    }

    #[test]
    fn test_unicode_entity() {
        let result = decode_text(b"&#x1F600;");
        assert_eq!(std::str::from_utf8(result.as_ref()).unwrap(), "😀");
    }

    #[test]
    fn test_invalid_numeric_references() {
        let result = decode_entities(b"&#0;&#xD800;&#99999999999;");
        assert_eq!(
            std::str::from_utf8(&result).unwrap(),
            "\u{FFFD}\u{FFFD}\u{FFFD}"
        );
        assert_eq!(decode_entities(b"&#;&#xZZ;"), b"&#;&#xZZ;");
    }

    #[test]
    fn test_windows_1252_remap() {
        let result = decode_entities(b"&#150;&#x93;");
        assert_eq!(std::str::from_utf8(&result).unwrap(), "\u{2013}\u{201C}");
    }

    #[test]
    fn test_unknown_and_unterminated_entities() {
        assert_eq!(decode_text(b"&unknown;").as_ref(), b"&unknown;");
        assert_eq!(decode_text(b"fish & chips").as_ref(), b"fish & chips");
        assert_eq!(decode_text(b"AT&T&amp;").as_ref(), b"AT&T&");
    }
}
