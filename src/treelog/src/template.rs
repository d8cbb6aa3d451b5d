// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Path+format template mini-language.
//!
//! A single template string carries both the tree path and the message:
//! every `%1` directive descends one node (consuming the next argument as
//! the child name, flushing any accumulated message text at the node left
//! behind), and everything else is ordinary printf-style text formatted
//! against the remaining arguments.
//!
//! The level macros prepend a fixed header literal whose three arguments
//! carry the call site; a template without that prefix simply has no call
//! site attached.

use std::fmt;
use std::slice;

use treelog_core::record::CallSite;
use treelog_core::tree::LOGS_KEY;

/// Header literal prepended by the level macros; binds file, function and
/// line from the first three arguments.
pub const HEADER_PREFIX: &str = "$$%s$$%s$$%d$$";

/// Directive character that descends one tree level.
const NODE_DIRECTIVE: char = '1';

/// Longest accepted template, in bytes. Longer templates are dropped.
pub const MAX_TEMPLATE_LEN: usize = 255;

/// Longest rendered message, in bytes. Longer messages are truncated.
pub const MAX_MESSAGE_LEN: usize = 255;

/// One formatting argument, the typed stand-in for C varargs.
///
/// Node names, header fields and printf conversions all consume from the
/// same ordered queue.
#[derive(Clone, Copy)]
pub enum Arg<'a> {
    Str(&'a str),
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(char),
    Bool(bool),
    Display(&'a dyn fmt::Display),
}

impl Arg<'_> {
    /// Plain textual rendering, used for `%s`, node names and header fields.
    fn render(&self) -> String {
        match self {
            Arg::Str(s) => (*s).to_string(),
            Arg::Int(v) => v.to_string(),
            Arg::Uint(v) => v.to_string(),
            Arg::Float(v) => v.to_string(),
            Arg::Char(c) => c.to_string(),
            Arg::Bool(b) => b.to_string(),
            Arg::Display(d) => d.to_string(),
        }
    }

    fn int_value(&self) -> Option<i128> {
        match self {
            Arg::Int(v) => Some(i128::from(*v)),
            Arg::Uint(v) => Some(i128::from(*v)),
            Arg::Char(c) => Some(i128::from(*c as u32)),
            Arg::Bool(b) => Some(i128::from(*b)),
            Arg::Float(v) => Some(*v as i128),
            _ => None,
        }
    }

    fn float_value(&self) -> Option<f64> {
        match self {
            Arg::Float(v) => Some(*v),
            Arg::Int(v) => Some(*v as f64),
            Arg::Uint(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => write!(f, "Str({:?})", s),
            Arg::Int(v) => write!(f, "Int({})", v),
            Arg::Uint(v) => write!(f, "Uint({})", v),
            Arg::Float(v) => write!(f, "Float({})", v),
            Arg::Char(c) => write!(f, "Char({:?})", c),
            Arg::Bool(b) => write!(f, "Bool({})", b),
            Arg::Display(d) => write!(f, "Display({})", d),
        }
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(v: &'a str) -> Self {
        Arg::Str(v)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(v: &'a String) -> Self {
        Arg::Str(v.as_str())
    }
}

macro_rules! arg_from {
    ($($ty:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(impl From<$ty> for Arg<'_> {
            fn from(v: $ty) -> Self {
                Arg::$variant(v as $conv)
            }
        })*
    };
}

arg_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    isize => Int as i64,
    u8 => Uint as u64,
    u16 => Uint as u64,
    u32 => Uint as u64,
    u64 => Uint as u64,
    usize => Uint as u64,
    f32 => Float as f64,
    f64 => Float as f64,
}

impl From<char> for Arg<'_> {
    fn from(v: char) -> Self {
        Arg::Char(v)
    }
}

impl From<bool> for Arg<'_> {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

/// Why a template was rejected. The caller drops the call; nothing
/// propagates further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Template exceeds [`MAX_TEMPLATE_LEN`]; dropped without a report.
    TooLong,
    /// A directive or conversion needed an argument the caller did not pass.
    MissingArgument,
    /// A node name was empty or used the reserved `"logs"` key.
    BadSegment(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::TooLong => write!(f, "template longer than {} bytes", MAX_TEMPLATE_LEN),
            TemplateError::MissingArgument => write!(f, "template consumed more arguments than supplied"),
            TemplateError::BadSegment(name) => write!(f, "invalid node name '{}'", name),
        }
    }
}

/// One record to be emitted: the tree path at flush time plus the rendered
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub path: Vec<String>,
    pub message: String,
}

/// Fully decoded template call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCall {
    /// Call site bound from the header prefix, when present.
    pub meta: Option<CallSite>,
    /// Records to append, in emission order.
    pub emissions: Vec<Emission>,
    /// Deepest path reached; every node along it is created even when no
    /// record was emitted there.
    pub final_path: Vec<String>,
}

/// Decode `template` against `args`.
///
/// Scanner states are `ReadingLiteral` and `PotentialDirective` (after a
/// `%`): a `%1` flushes the fragment buffer and descends, any other `%`
/// pair is kept verbatim for the formatter, and a trailing lone `%` stays
/// literal.
pub fn parse<'a>(template: &str, args: &[Arg<'a>]) -> Result<ParsedCall, TemplateError> {
    if template.len() > MAX_TEMPLATE_LEN {
        return Err(TemplateError::TooLong);
    }

    let mut queue = args.iter();
    let (meta, rest) = match template.strip_prefix(HEADER_PREFIX) {
        Some(rest) => (Some(parse_header(&mut queue)?), rest),
        None => (None, template),
    };

    let mut fragment = String::new();
    let mut path: Vec<String> = Vec::new();
    let mut emissions: Vec<Emission> = Vec::new();
    let mut pending_percent = false;

    for ch in rest.chars() {
        if pending_percent {
            pending_percent = false;
            if ch == NODE_DIRECTIVE {
                if !fragment.is_empty() {
                    let message = format_fragment(&fragment, &mut queue)?;
                    emissions.push(Emission {
                        path: path.clone(),
                        message,
                    });
                    fragment.clear();
                }
                let name = queue
                    .next()
                    .ok_or(TemplateError::MissingArgument)?
                    .render();
                if name.is_empty() || name == LOGS_KEY {
                    return Err(TemplateError::BadSegment(name));
                }
                path.push(name);
            } else {
                fragment.push('%');
                fragment.push(ch);
            }
        } else if ch == '%' {
            pending_percent = true;
        } else {
            fragment.push(ch);
        }
    }
    if pending_percent {
        fragment.push('%');
    }
    if !fragment.is_empty() {
        let message = format_fragment(&fragment, &mut queue)?;
        emissions.push(Emission {
            path: path.clone(),
            message,
        });
    }

    Ok(ParsedCall {
        meta,
        emissions,
        final_path: path,
    })
}

fn parse_header(queue: &mut slice::Iter<'_, Arg<'_>>) -> Result<CallSite, TemplateError> {
    let file = queue.next().ok_or(TemplateError::MissingArgument)?.render();
    let func = queue.next().ok_or(TemplateError::MissingArgument)?.render();
    let line = queue
        .next()
        .ok_or(TemplateError::MissingArgument)?
        .int_value()
        .unwrap_or(0)
        .clamp(0, i128::from(u32::MAX)) as u32;
    Ok(CallSite {
        file_name: (!file.is_empty()).then_some(file),
        func_name: (!func.is_empty()).then_some(func),
        file_line: line,
    })
}

/// Clamp a rendered message to [`MAX_MESSAGE_LEN`] bytes on a character
/// boundary.
pub(crate) fn clamp_message(mut message: String) -> String {
    if message.len() > MAX_MESSAGE_LEN {
        let mut cut = MAX_MESSAGE_LEN;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    message
}

// ---------------------------------------------------------------------------
// printf-style fragment formatting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldWidth {
    Fixed(usize),
    FromArg,
}

#[derive(Debug, Clone, Default)]
struct ConvSpec {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    space_sign: bool,
    width: Option<FieldWidth>,
    precision: Option<FieldWidth>,
    conv: char,
}

/// Parse one conversion specifier starting at a `%`.
///
/// Returns the spec and its byte length, or `None` when the sequence is
/// incomplete or uses an unknown conversion character; such sequences are
/// emitted verbatim and consume no argument.
fn parse_spec(input: &str) -> Option<(ConvSpec, usize)> {
    const CONVERSIONS: &str = "diuxXofFeEgGcsp%";

    let mut spec = ConvSpec::default();
    let bytes = input.as_bytes();
    let mut i = 1; // skip '%'

    while let Some(&b) = bytes.get(i) {
        match b {
            b'-' => spec.left_align = true,
            b'0' => spec.zero_pad = true,
            b'+' => spec.plus_sign = true,
            b' ' => spec.space_sign = true,
            b'#' => {}
            _ => break,
        }
        i += 1;
    }

    if bytes.get(i) == Some(&b'*') {
        spec.width = Some(FieldWidth::FromArg);
        i += 1;
    } else {
        let start = i;
        while bytes.get(i).is_some_and(|b| b.is_ascii_digit()) {
            i += 1;
        }
        if i > start {
            spec.width = Some(FieldWidth::Fixed(input[start..i].parse().ok()?));
        }
    }

    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if bytes.get(i) == Some(&b'*') {
            spec.precision = Some(FieldWidth::FromArg);
            i += 1;
        } else {
            let start = i;
            while bytes.get(i).is_some_and(|b| b.is_ascii_digit()) {
                i += 1;
            }
            // A bare '.' means precision zero, as in C.
            let digits = &input[start..i];
            spec.precision = Some(FieldWidth::Fixed(if digits.is_empty() {
                0
            } else {
                digits.parse().ok()?
            }));
        }
    }

    // Length modifiers carry no information here; Arg already has a width.
    while bytes
        .get(i)
        .is_some_and(|b| matches!(b, b'h' | b'l' | b'L' | b'z' | b'j' | b't' | b'q'))
    {
        i += 1;
    }

    let conv = *bytes.get(i)? as char;
    if !CONVERSIONS.contains(conv) {
        return None;
    }
    spec.conv = conv;
    Some((spec, i + 1))
}

fn resolve_width(
    width: Option<FieldWidth>,
    queue: &mut slice::Iter<'_, Arg<'_>>,
) -> Result<Option<usize>, TemplateError> {
    match width {
        None => Ok(None),
        Some(FieldWidth::Fixed(n)) => Ok(Some(n)),
        Some(FieldWidth::FromArg) => {
            let n = queue
                .next()
                .ok_or(TemplateError::MissingArgument)?
                .int_value()
                .unwrap_or(0)
                .clamp(0, i128::from(u32::MAX)) as usize;
            Ok(Some(n))
        }
    }
}

fn pad_field(out: &mut String, body: &str, width: Option<usize>, spec: &ConvSpec) {
    let body_len = body.chars().count();
    let width = width.unwrap_or(0);
    if body_len >= width {
        out.push_str(body);
        return;
    }
    let fill = width - body_len;
    if spec.left_align {
        out.push_str(body);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if spec.zero_pad {
        // Keep a leading sign ahead of the zeros.
        if let Some(rest) = body.strip_prefix(['-', '+']) {
            out.push_str(&body[..1]);
            out.extend(std::iter::repeat('0').take(fill));
            out.push_str(rest);
        } else {
            out.extend(std::iter::repeat('0').take(fill));
            out.push_str(body);
        }
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(body);
    }
}

fn sign_prefix(negative: bool, spec: &ConvSpec) -> &'static str {
    if negative {
        "-"
    } else if spec.plus_sign {
        "+"
    } else if spec.space_sign {
        " "
    } else {
        ""
    }
}

fn render_signed(value: i128, precision: Option<usize>, spec: &ConvSpec) -> String {
    let mut digits = value.unsigned_abs().to_string();
    if let Some(min_digits) = precision {
        while digits.len() < min_digits {
            digits.insert(0, '0');
        }
    }
    format!("{}{}", sign_prefix(value < 0, spec), digits)
}

fn render_spec(
    spec: &ConvSpec,
    queue: &mut slice::Iter<'_, Arg<'_>>,
    out: &mut String,
) -> Result<(), TemplateError> {
    if spec.conv == '%' {
        out.push('%');
        return Ok(());
    }

    let width = resolve_width(spec.width, queue)?;
    let precision = resolve_width(spec.precision, queue)?;
    let arg = *queue.next().ok_or(TemplateError::MissingArgument)?;

    let body = match spec.conv {
        'd' | 'i' | 'u' => match arg.int_value() {
            Some(v) => render_signed(v, precision, spec),
            None => arg.render(),
        },
        'x' | 'X' | 'o' => match arg.int_value() {
            Some(v) => {
                // Negative values wrap like a 64-bit cast would.
                let unsigned = v as u64;
                match spec.conv {
                    'x' => format!("{:x}", unsigned),
                    'X' => format!("{:X}", unsigned),
                    _ => format!("{:o}", unsigned),
                }
            }
            None => arg.render(),
        },
        'f' | 'F' => match arg.float_value() {
            Some(v) => {
                let mut body = format!("{:.*}", precision.unwrap_or(6), v);
                if v >= 0.0 && !sign_prefix(false, spec).is_empty() {
                    body.insert_str(0, sign_prefix(false, spec));
                }
                body
            }
            None => arg.render(),
        },
        'e' | 'E' => match arg.float_value() {
            Some(v) => {
                let body = format!("{:.*e}", precision.unwrap_or(6), v);
                if spec.conv == 'E' {
                    body.to_uppercase()
                } else {
                    body
                }
            }
            None => arg.render(),
        },
        'g' | 'G' => match arg.float_value() {
            Some(v) => v.to_string(),
            None => arg.render(),
        },
        'c' => match arg {
            Arg::Char(c) => c.to_string(),
            other => match other.int_value().and_then(|v| u32::try_from(v).ok()) {
                Some(code) => char::from_u32(code).map(String::from).unwrap_or_default(),
                None => other.render().chars().take(1).collect(),
            },
        },
        's' | 'p' => {
            let mut s = arg.render();
            if let Some(max) = precision {
                s = s.chars().take(max).collect();
            }
            s
        }
        _ => arg.render(),
    };

    pad_field(out, &body, width, spec);
    Ok(())
}

/// Interpret the printf-style conversions left in a fragment buffer against
/// the argument queue, clamping the rendered message.
fn format_fragment(
    fragment: &str,
    queue: &mut slice::Iter<'_, Arg<'_>>,
) -> Result<String, TemplateError> {
    let mut out = String::new();
    let mut rest = fragment;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let from_percent = &rest[pos..];
        match parse_spec(from_percent) {
            Some((spec, consumed)) => {
                render_spec(&spec, queue, &mut out)?;
                rest = &from_percent[consumed..];
            }
            None => {
                out.push('%');
                rest = &from_percent[1..];
            }
        }
    }
    out.push_str(rest);
    Ok(clamp_message(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_args<'a>(extra: &[Arg<'a>]) -> Vec<Arg<'a>> {
        let mut args = vec![Arg::from("main.rs"), Arg::from("demo::run"), Arg::from(7u32)];
        args.extend_from_slice(extra);
        args
    }

    #[test]
    fn test_plain_template_emits_one_record_at_root() {
        let parsed = parse("bar", &[]).unwrap();
        assert!(parsed.meta.is_none());
        assert_eq!(parsed.emissions.len(), 1);
        assert_eq!(parsed.emissions[0].path, Vec::<String>::new());
        assert_eq!(parsed.emissions[0].message, "bar");
    }

    #[test]
    fn test_empty_template_emits_nothing() {
        let parsed = parse("", &[]).unwrap();
        assert!(parsed.emissions.is_empty());
        assert!(parsed.final_path.is_empty());
    }

    #[test]
    fn test_header_prefix_binds_call_site() {
        let template = concat!("$$%s$$%s$$%d$$", "hello");
        let parsed = parse(template, &header_args(&[])).unwrap();
        let meta = parsed.meta.unwrap();
        assert_eq!(meta.file_name.as_deref(), Some("main.rs"));
        assert_eq!(meta.func_name.as_deref(), Some("demo::run"));
        assert_eq!(meta.file_line, 7);
        assert_eq!(parsed.emissions[0].message, "hello");
    }

    #[test]
    fn test_header_must_be_exact_prefix() {
        // A template merely containing the header text keeps it literal.
        let parsed = parse("x$$%s$$", &[Arg::from("v")]).unwrap();
        assert!(parsed.meta.is_none());
        assert_eq!(parsed.emissions[0].message, "x$$v$$");
    }

    #[test]
    fn test_header_empty_fields_are_absent() {
        let template = concat!("$$%s$$%s$$%d$$", "m");
        let args = [Arg::from(""), Arg::from(""), Arg::from(0u32)];
        let meta = parse(template, &args).unwrap().meta.unwrap();
        assert!(meta.file_name.is_none());
        assert!(meta.func_name.is_none());
        assert_eq!(meta.file_line, 0);
    }

    #[test]
    fn test_single_descent() {
        let parsed = parse("%1bar", &[Arg::from("foo")]).unwrap();
        assert_eq!(parsed.emissions.len(), 1);
        assert_eq!(parsed.emissions[0].path, ["foo"]);
        assert_eq!(parsed.emissions[0].message, "bar");
        assert_eq!(parsed.final_path, ["foo"]);
    }

    #[test]
    fn test_three_consecutive_descents() {
        let args = [Arg::from("foo"), Arg::from("bar"), Arg::from("baz")];
        let parsed = parse("%1%1%1qux", &args).unwrap();
        assert_eq!(parsed.emissions.len(), 1);
        assert_eq!(parsed.emissions[0].path, ["foo", "bar", "baz"]);
        assert_eq!(parsed.emissions[0].message, "qux");
    }

    #[test]
    fn test_fragment_flushes_at_current_node_before_descent() {
        let parsed = parse("start%1end", &[Arg::from("n")]).unwrap();
        assert_eq!(parsed.emissions.len(), 2);
        assert_eq!(parsed.emissions[0].path, Vec::<String>::new());
        assert_eq!(parsed.emissions[0].message, "start");
        assert_eq!(parsed.emissions[1].path, ["n"]);
        assert_eq!(parsed.emissions[1].message, "end");
    }

    #[test]
    fn test_trailing_descent_emits_no_terminal_record() {
        let parsed = parse("msg%1", &[Arg::from("leaf")]).unwrap();
        assert_eq!(parsed.emissions.len(), 1);
        assert_eq!(parsed.emissions[0].path, Vec::<String>::new());
        assert_eq!(parsed.final_path, ["leaf"]);
    }

    #[test]
    fn test_node_name_formatted_from_non_string_arg() {
        let parsed = parse("%1m", &[Arg::from(12u32)]).unwrap();
        assert_eq!(parsed.emissions[0].path, ["12"]);
    }

    #[test]
    fn test_missing_directive_argument_is_an_error() {
        assert_eq!(parse("%1x", &[]).unwrap_err(), TemplateError::MissingArgument);
    }

    #[test]
    fn test_reserved_segment_rejected() {
        let err = parse("%1x", &[Arg::from("logs")]).unwrap_err();
        assert_eq!(err, TemplateError::BadSegment("logs".to_string()));
    }

    #[test]
    fn test_empty_segment_rejected() {
        let err = parse("%1x", &[Arg::from("")]).unwrap_err();
        assert_eq!(err, TemplateError::BadSegment(String::new()));
    }

    #[test]
    fn test_overlong_template_rejected() {
        let template = "a".repeat(MAX_TEMPLATE_LEN + 1);
        assert_eq!(parse(&template, &[]).unwrap_err(), TemplateError::TooLong);
        let template = "a".repeat(MAX_TEMPLATE_LEN);
        assert!(parse(&template, &[]).is_ok());
    }

    #[test]
    fn test_unknown_directive_digit_stays_literal() {
        let parsed = parse("%2x", &[]).unwrap();
        assert_eq!(parsed.emissions[0].message, "%2x");
    }

    #[test]
    fn test_trailing_percent_stays_literal() {
        let parsed = parse("100%", &[]).unwrap();
        assert_eq!(parsed.emissions[0].message, "100%");
    }

    #[test]
    fn test_percent_escape() {
        let parsed = parse("100%% done", &[]).unwrap();
        assert_eq!(parsed.emissions[0].message, "100% done");
    }

    // -- printf conversions ------------------------------------------------

    fn fmt(template: &str, args: &[Arg<'_>]) -> String {
        let parsed = parse(template, args).unwrap();
        parsed.emissions[0].message.clone()
    }

    #[test]
    fn test_format_signed_and_unsigned() {
        assert_eq!(fmt("n=%d", &[Arg::from(-5)]), "n=-5");
        assert_eq!(fmt("n=%i", &[Arg::from(17)]), "n=17");
        assert_eq!(fmt("n=%u", &[Arg::from(42u64)]), "n=42");
    }

    #[test]
    fn test_format_width_and_alignment() {
        assert_eq!(fmt("[%5d]", &[Arg::from(42)]), "[   42]");
        assert_eq!(fmt("[%-5d]", &[Arg::from(42)]), "[42   ]");
        assert_eq!(fmt("[%05d]", &[Arg::from(42)]), "[00042]");
        assert_eq!(fmt("[%05d]", &[Arg::from(-42)]), "[-0042]");
    }

    #[test]
    fn test_format_width_from_argument() {
        assert_eq!(fmt("[%*d]", &[Arg::from(6), Arg::from(1)]), "[     1]");
    }

    #[test]
    fn test_format_plus_flag() {
        assert_eq!(fmt("%+d", &[Arg::from(3)]), "+3");
        assert_eq!(fmt("%+d", &[Arg::from(-3)]), "-3");
    }

    #[test]
    fn test_format_integer_precision_pads_digits() {
        assert_eq!(fmt("%.4d", &[Arg::from(42)]), "0042");
    }

    #[test]
    fn test_format_hex_and_octal() {
        assert_eq!(fmt("%x", &[Arg::from(255)]), "ff");
        assert_eq!(fmt("%X", &[Arg::from(255)]), "FF");
        assert_eq!(fmt("%o", &[Arg::from(8)]), "10");
    }

    #[test]
    fn test_format_float_default_and_explicit_precision() {
        assert_eq!(fmt("%f", &[Arg::from(1.5f64)]), "1.500000");
        assert_eq!(fmt("%.2f", &[Arg::from(3.14159f64)]), "3.14");
        assert_eq!(fmt("%.0f", &[Arg::from(2.71f64)]), "3");
    }

    #[test]
    fn test_format_char() {
        assert_eq!(fmt("%c", &[Arg::from('x')]), "x");
        assert_eq!(fmt("%c", &[Arg::from(65)]), "A");
    }

    #[test]
    fn test_format_string_precision_truncates() {
        assert_eq!(fmt("%s", &[Arg::from("hello")]), "hello");
        assert_eq!(fmt("%.3s", &[Arg::from("hello")]), "hel");
    }

    #[test]
    fn test_length_modifiers_are_ignored() {
        assert_eq!(fmt("%ld", &[Arg::from(9i64)]), "9");
        assert_eq!(fmt("%zu", &[Arg::from(3usize)]), "3");
        assert_eq!(fmt("%lld", &[Arg::from(-1)]), "-1");
    }

    #[test]
    fn test_incomplete_specifier_kept_verbatim() {
        // "%5" has a width but no conversion; nothing is consumed.
        assert_eq!(fmt("%5", &[]), "%5");
    }

    #[test]
    fn test_missing_format_argument_is_an_error() {
        assert_eq!(parse("%d", &[]).unwrap_err(), TemplateError::MissingArgument);
    }

    #[test]
    fn test_directives_and_conversions_share_the_queue() {
        let args = [Arg::from("node"), Arg::from(5), Arg::from("tail")];
        let parsed = parse("%1count=%d %s", &args).unwrap();
        assert_eq!(parsed.emissions[0].path, ["node"]);
        assert_eq!(parsed.emissions[0].message, "count=5 tail");
    }

    #[test]
    fn test_message_clamped_to_limit() {
        let long = "x".repeat(1000);
        let rendered = fmt("%s", &[Arg::from(long.as_str())]);
        assert_eq!(rendered.len(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn test_clamp_respects_char_boundaries() {
        let long = "é".repeat(200); // 2 bytes each
        let clamped = clamp_message(long);
        assert!(clamped.len() <= MAX_MESSAGE_LEN);
        assert!(clamped.is_char_boundary(clamped.len()));
    }

    #[test]
    fn test_header_plus_directives_full_call() {
        let template = concat!("$$%s$$%s$$%d$$", "%1%1ready in %dms");
        let args = header_args(&[Arg::from("svc"), Arg::from("worker"), Arg::from(250)]);
        let parsed = parse(template, &args).unwrap();
        assert_eq!(parsed.emissions.len(), 1);
        assert_eq!(parsed.emissions[0].path, ["svc", "worker"]);
        assert_eq!(parsed.emissions[0].message, "ready in 250ms");
        assert_eq!(parsed.meta.unwrap().file_line, 7);
    }
}
