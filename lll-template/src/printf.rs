// printf-style rendering of typed values
// Follows C conversion semantics: flags, width, precision, length modifiers

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::iter::Peekable;
use std::str::CharIndices;

use crate::params::Value;

const CONVERSIONS: &str = "diuoxXcspneEfFgGaA";

/// Largest width or precision honored; larger counts are clamped to it
pub const MAX_COUNT: usize = 1 << 20;

/// Largest precision `format!` accepts; digits past it are written as zeros
const FORMAT_PRECISION_LIMIT: usize = u16::MAX as usize;

/// Conversion flags (`-`, `+`, space, `#`, `0`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub left: bool,
    pub plus: bool,
    pub space: bool,
    pub alt: bool,
    pub zero: bool,
}

/// Width or precision as written in the specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Fixed(usize),
    /// `*`: taken from the next argument
    Star,
}

/// Length modifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Length {
    #[default]
    Default,
    Char,
    Short,
    Long,
    LongLong,
    LongDouble,
    IntMax,
    Size,
    PtrDiff,
}

/// A parsed `%[flags][width][.precision][length]conversion`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSpec {
    pub flags: Flags,
    pub width: Option<Count>,
    pub precision: Option<Count>,
    pub length: Length,
    pub conversion: char,
}

impl ConversionSpec {
    pub fn is_floating(&self) -> bool {
        matches!(self.conversion, 'e' | 'E' | 'f' | 'F' | 'g' | 'G' | 'a' | 'A')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Conversion(ConversionSpec),
}

/// Split a format string into literal runs and conversions.
///
/// `%%` becomes a literal `%`; an unknown or truncated conversion is kept
/// as literal text.
pub fn parse(fmt: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut chars = fmt.char_indices().peekable();
    let mut literal_start = 0;

    while let Some((start, c)) = chars.next() {
        if c != '%' {
            continue;
        }
        if literal_start < start {
            segments.push(Segment::Literal(&fmt[literal_start..start]));
        }
        let (segment, end) = parse_conversion(fmt, start, &mut chars);
        segments.push(segment);
        literal_start = end;
    }

    if literal_start < fmt.len() {
        segments.push(Segment::Literal(&fmt[literal_start..]));
    }
    segments
}

/// The conversions of `fmt` in argument order
pub fn conversions(fmt: &str) -> Vec<ConversionSpec> {
    parse(fmt)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Conversion(spec) => Some(spec),
            Segment::Literal(_) => None,
        })
        .collect()
}

fn parse_conversion<'a>(
    fmt: &'a str,
    start: usize,
    chars: &mut Peekable<CharIndices<'a>>,
) -> (Segment<'a>, usize) {
    let mut flags = Flags::default();
    while let Some(&(_, c)) = chars.peek() {
        match c {
            '-' => flags.left = true,
            '+' => flags.plus = true,
            ' ' => flags.space = true,
            '#' => flags.alt = true,
            '0' => flags.zero = true,
            _ => break,
        }
        chars.next();
    }

    let width = parse_count(chars);
    let precision = if matches!(chars.peek(), Some(&(_, '.'))) {
        chars.next();
        Some(parse_count(chars).unwrap_or(Count::Fixed(0)))
    } else {
        None
    };
    let length = parse_length(chars);

    match chars.next() {
        Some((i, '%')) => (Segment::Literal("%"), i + 1),
        Some((i, c)) if CONVERSIONS.contains(c) => {
            let spec = ConversionSpec {
                flags,
                width,
                precision,
                length,
                conversion: c,
            };
            (Segment::Conversion(spec), i + c.len_utf8())
        }
        Some((i, c)) => {
            let end = i + c.len_utf8();
            log::debug!("Unknown conversion {:?}", &fmt[start..end]);
            (Segment::Literal(&fmt[start..end]), end)
        }
        None => (Segment::Literal(&fmt[start..]), fmt.len()),
    }
}

fn parse_count(chars: &mut Peekable<CharIndices<'_>>) -> Option<Count> {
    if matches!(chars.peek(), Some(&(_, '*'))) {
        chars.next();
        return Some(Count::Star);
    }

    let mut value: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|&(_, c)| c.to_digit(10)) {
        chars.next();
        let current = value.unwrap_or(0);
        value = Some(current.saturating_mul(10).saturating_add(digit as usize));
    }
    value.map(Count::Fixed)
}

fn parse_length(chars: &mut Peekable<CharIndices<'_>>) -> Length {
    let Some(&(_, c)) = chars.peek() else {
        return Length::Default;
    };
    let length = match c {
        'h' => Length::Short,
        'l' => Length::Long,
        'L' => Length::LongDouble,
        'q' => Length::LongLong,
        'j' => Length::IntMax,
        'z' => Length::Size,
        't' => Length::PtrDiff,
        _ => return Length::Default,
    };
    chars.next();

    match (length, chars.peek()) {
        (Length::Short, Some(&(_, 'h'))) => {
            chars.next();
            Length::Char
        }
        (Length::Long, Some(&(_, 'l'))) => {
            chars.next();
            Length::LongLong
        }
        _ => length,
    }
}

/// Conversion with `*` counts resolved against the argument list
struct Resolved {
    flags: Flags,
    width: usize,
    precision: Option<usize>,
    length: Length,
    conversion: char,
}

/// Render `fmt` with `args`, C `sprintf` style
pub fn sprintf(fmt: &str, args: &[Value<'_>]) -> String {
    let mut out = String::with_capacity(fmt.len());
    if let Err(e) = write_formatted(&mut out, fmt, args) {
        log::warn!("Formatting {:?} stopped early: {}", fmt, e);
    }
    out
}

/// Render a single value through a specifier such as `"%d"` or `"%Le"`
pub fn format_value(spec: &str, value: &Value<'_>) -> String {
    sprintf(spec, std::slice::from_ref(value))
}

/// Render `fmt` with `args` into any `fmt::Write`.
///
/// Conversions left without an argument render nothing; surplus arguments
/// are ignored.
pub fn write_formatted<W: Write + ?Sized>(
    out: &mut W,
    fmt: &str,
    args: &[Value<'_>],
) -> fmt::Result {
    let mut args = args.iter();

    for segment in parse(fmt) {
        let spec = match segment {
            Segment::Literal(text) => {
                out.write_str(text)?;
                continue;
            }
            Segment::Conversion(spec) => spec,
        };

        let mut flags = spec.flags;
        let width = match spec.width {
            Some(Count::Fixed(n)) => n,
            Some(Count::Star) => {
                let n = args.next().map_or(0, Value::as_i64);
                if n < 0 {
                    flags.left = true;
                }
                usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX)
            }
            None => 0,
        };
        let width = width.min(MAX_COUNT);
        let precision = match spec.precision {
            Some(Count::Fixed(n)) => Some(n),
            Some(Count::Star) => {
                let n = args.next().map_or(0, Value::as_i64);
                usize::try_from(n).ok()
            }
            None => None,
        };
        let precision = precision.map(|p| p.min(MAX_COUNT));

        let Some(value) = args.next() else {
            continue;
        };
        let resolved = Resolved {
            flags,
            width,
            precision,
            length: spec.length,
            conversion: spec.conversion,
        };
        write_conversion(out, &resolved, value)?;
    }
    Ok(())
}

fn write_conversion<W: Write + ?Sized>(out: &mut W, r: &Resolved, value: &Value<'_>) -> fmt::Result {
    match r.conversion {
        'd' | 'i' => write_signed(out, r, value.as_i64()),
        'u' | 'o' | 'x' | 'X' => write_unsigned(out, r, value.as_i64()),
        'c' => {
            // An integer is taken as a Latin-1 code point; bytes from 0x80 up
            // come out as two UTF-8 bytes rather than C's single raw byte
            let c = match value {
                Value::Pointer(Some(s)) => s.chars().next().unwrap_or('\0'),
                other => char::from(other.as_i64() as u8),
            };
            pad(out, r, "", "", c.encode_utf8(&mut [0u8; 4]), false)
        }
        's' => write_string(out, r, value),
        'p' => write_pointer(out, r, value),
        'n' => Ok(()),
        _ => write_float(out, r, value.as_f64()),
    }
}

fn pad<W: Write + ?Sized>(
    out: &mut W,
    r: &Resolved,
    sign: &str,
    prefix: &str,
    body: &str,
    zero_fill: bool,
) -> fmt::Result {
    let len = sign.len() + prefix.len() + body.chars().count();
    let fill = r.width.saturating_sub(len);

    if r.flags.left {
        out.write_str(sign)?;
        out.write_str(prefix)?;
        out.write_str(body)?;
        repeat(out, ' ', fill)
    } else if r.flags.zero && zero_fill {
        out.write_str(sign)?;
        out.write_str(prefix)?;
        repeat(out, '0', fill)?;
        out.write_str(body)
    } else {
        repeat(out, ' ', fill)?;
        out.write_str(sign)?;
        out.write_str(prefix)?;
        out.write_str(body)
    }
}

fn repeat<W: Write + ?Sized>(out: &mut W, c: char, n: usize) -> fmt::Result {
    for _ in 0..n {
        out.write_char(c)?;
    }
    Ok(())
}

fn sign_of(negative: bool, flags: &Flags) -> &'static str {
    if negative {
        "-"
    } else if flags.plus {
        "+"
    } else if flags.space {
        " "
    } else {
        ""
    }
}

/// Pad `digits` with leading zeros up to `precision` digits
fn with_precision(digits: String, precision: Option<usize>) -> String {
    match precision {
        Some(0) if digits == "0" => String::new(),
        Some(p) if digits.len() < p => {
            let mut padded = "0".repeat(p - digits.len());
            padded.push_str(&digits);
            padded
        }
        _ => digits,
    }
}

fn write_signed<W: Write + ?Sized>(out: &mut W, r: &Resolved, v: i64) -> fmt::Result {
    let v = match r.length {
        Length::Char => i64::from(v as i8),
        Length::Short => i64::from(v as i16),
        Length::Default => i64::from(v as i32),
        _ => v,
    };
    let digits = with_precision(v.unsigned_abs().to_string(), r.precision);
    pad(out, r, sign_of(v < 0, &r.flags), "", &digits, r.precision.is_none())
}

fn write_unsigned<W: Write + ?Sized>(out: &mut W, r: &Resolved, v: i64) -> fmt::Result {
    let v = v as u64;
    let v = match r.length {
        Length::Char => u64::from(v as u8),
        Length::Short => u64::from(v as u16),
        Length::Default => u64::from(v as u32),
        _ => v,
    };

    let (digits, prefix) = match r.conversion {
        'o' => {
            let mut digits = with_precision(format!("{:o}", v), r.precision);
            if r.flags.alt && !digits.starts_with('0') {
                digits.insert(0, '0');
            }
            (digits, "")
        }
        'x' => {
            let prefix = if r.flags.alt && v != 0 { "0x" } else { "" };
            (with_precision(format!("{:x}", v), r.precision), prefix)
        }
        'X' => {
            let prefix = if r.flags.alt && v != 0 { "0X" } else { "" };
            (with_precision(format!("{:X}", v), r.precision), prefix)
        }
        _ => (with_precision(v.to_string(), r.precision), ""),
    };
    pad(out, r, "", prefix, &digits, r.precision.is_none())
}

fn write_string<W: Write + ?Sized>(out: &mut W, r: &Resolved, value: &Value<'_>) -> fmt::Result {
    let text: Cow<'_, str> = match *value {
        Value::Pointer(Some(s)) => Cow::Borrowed(s),
        Value::Pointer(None) => Cow::Borrowed("(null)"),
        Value::Integer(v) => Cow::Owned(v.to_string()),
        Value::Float64(v) | Value::Float80(v) => Cow::Owned(v.to_string()),
    };
    let text = match r.precision {
        Some(p) => match text.char_indices().nth(p) {
            Some((cut, _)) => Cow::Owned(text[..cut].to_string()),
            None => text,
        },
        None => text,
    };
    pad(out, r, "", "", &text, false)
}

fn write_pointer<W: Write + ?Sized>(out: &mut W, r: &Resolved, value: &Value<'_>) -> fmt::Result {
    match value.as_i64() {
        0 => pad(out, r, "", "", "(nil)", false),
        address => pad(out, r, "", "0x", &format!("{:x}", address as u64), false),
    }
}

fn write_float<W: Write + ?Sized>(out: &mut W, r: &Resolved, v: f64) -> fmt::Result {
    let upper = r.conversion.is_ascii_uppercase();
    let sign = sign_of(v.is_sign_negative(), &r.flags);
    let v = v.abs();

    if !v.is_finite() {
        let body = if v.is_nan() { "nan" } else { "inf" };
        let body = if upper {
            body.to_ascii_uppercase()
        } else {
            body.to_string()
        };
        return pad(out, r, sign, "", &body, false);
    }

    let precision = r.precision.unwrap_or(6);
    match r.conversion.to_ascii_lowercase() {
        'f' => pad(out, r, sign, "", &fixed(v, precision, r.flags.alt), true),
        'e' => pad(out, r, sign, "", &exponent(v, precision, r.flags.alt, upper), true),
        'g' => pad(out, r, sign, "", &general(v, precision, r.flags.alt, upper), true),
        _ => {
            let body = hex_float(v, r.precision, r.flags.alt, upper);
            pad(out, r, sign, if upper { "0X" } else { "0x" }, &body, true)
        }
    }
}

/// Pad the fraction of a formatted number past what `format!` can produce.
///
/// An f64 has at most 1074 fractional decimal digits, so the extra digits
/// are zeros.
fn push_zeros(s: &mut String, precision: usize) {
    let extra = precision.saturating_sub(FORMAT_PRECISION_LIMIT);
    s.extend(std::iter::repeat('0').take(extra));
}

fn fixed(v: f64, precision: usize, alt: bool) -> String {
    let mut s = format!("{:.*}", precision.min(FORMAT_PRECISION_LIMIT), v);
    push_zeros(&mut s, precision);
    if alt && precision == 0 {
        s.push('.');
    }
    s
}

/// Decimal exponent of `v` once rounded to `digits` fractional digits in e-notation
fn decimal_exponent(v: f64, digits: usize) -> i32 {
    let s = format!("{:.*e}", digits.min(FORMAT_PRECISION_LIMIT), v);
    s.split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0)
}

fn exponent(v: f64, precision: usize, alt: bool, upper: bool) -> String {
    let s = format!("{:.*e}", precision.min(FORMAT_PRECISION_LIMIT), v);
    let (mantissa, exp) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    let mut out = mantissa.to_string();
    push_zeros(&mut out, precision);
    if alt && precision == 0 {
        out.push('.');
    }
    out.push(if upper { 'E' } else { 'e' });
    out.push(if exp < 0 { '-' } else { '+' });
    out.push_str(&format!("{:02}", exp.unsigned_abs()));
    out
}

fn strip_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn general(v: f64, precision: usize, alt: bool, upper: bool) -> String {
    let p = precision.max(1);
    let x = if v == 0.0 { 0 } else { decimal_exponent(v, p - 1) };
    // p never exceeds MAX_COUNT, well inside i64
    let p_signed = p as i64;
    let x_signed = i64::from(x);

    if x_signed >= -4 && x_signed < p_signed {
        let s = fixed(v, (p_signed - 1 - x_signed) as usize, alt);
        if alt {
            s
        } else {
            strip_fraction_zeros(&s).to_string()
        }
    } else {
        let s = exponent(v, p - 1, alt, upper);
        if alt {
            return s;
        }
        match s.find(['e', 'E']) {
            Some(at) => format!("{}{}", strip_fraction_zeros(&s[..at]), &s[at..]),
            None => s,
        }
    }
}

/// Hexadecimal mantissa and binary exponent, without the `0x` prefix
fn hex_float(v: f64, precision: Option<usize>, alt: bool, upper: bool) -> String {
    const FRACTION_BITS: u32 = 52;
    const FRACTION_DIGITS: usize = 13;

    let bits = v.to_bits();
    let biased = ((bits >> FRACTION_BITS) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << FRACTION_BITS) - 1);

    let (mut lead, exp) = match (biased, fraction) {
        (0, 0) => (0u64, 0),
        (0, _) => (0u64, -1022),
        _ => (1u64, biased - 1023),
    };

    let digits = match precision {
        None => {
            let digits = format!("{:013x}", fraction);
            digits.trim_end_matches('0').to_string()
        }
        Some(p) if p < FRACTION_DIGITS => {
            let shift = ((FRACTION_DIGITS - p) * 4) as u32;
            let full = (lead << FRACTION_BITS) | fraction;
            let rest = full & ((1u64 << shift) - 1);
            let half = 1u64 << (shift - 1);
            let mut kept = full >> shift;
            if rest > half || (rest == half && kept & 1 == 1) {
                kept += 1;
            }
            let frac_bits = (p * 4) as u32;
            lead = kept >> frac_bits;
            if p == 0 {
                String::new()
            } else {
                format!("{:0width$x}", kept & ((1u64 << frac_bits) - 1), width = p)
            }
        }
        Some(p) => {
            let mut digits = format!("{:013x}", fraction);
            digits.push_str(&"0".repeat(p - FRACTION_DIGITS));
            digits
        }
    };

    let mut out = lead.to_string();
    if !digits.is_empty() || alt {
        out.push('.');
    }
    out.push_str(&digits);
    out.push('p');
    out.push(if exp < 0 { '-' } else { '+' });
    out.push_str(&exp.unsigned_abs().to_string());

    if upper {
        out.to_ascii_uppercase()
    } else {
        out
    }
}
