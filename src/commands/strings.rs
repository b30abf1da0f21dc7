//! `string` subcommand dispatcher (§4.K "Strings") plus the supplemented
//! `format` builtin (printf-style formatting, SPEC_FULL.md §D).

use crate::error::TclErrorKind;
use crate::host::{CharClass, HostOps, ObjHandle};
use crate::interpreter::{CommandEntry, Interp};
use crate::result::{EvalResult, Exception};
use std::rc::Rc;

pub fn install(interp: &mut Interp, _host: &mut dyn HostOps) {
    let ns = crate::interpreter::GLOBAL_NS;
    interp.define_command(ns, "string", CommandEntry::Builtin(Rc::new(cmd_string)));
    interp.define_command(ns, "format", CommandEntry::Builtin(Rc::new(cmd_format)));
}

fn str_of(host: &dyn HostOps, o: ObjHandle) -> String {
    host.get_str(o).to_string()
}

fn cmd_string(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("string subcommand ?arg ...?")));
    }
    let sub = str_of(host, args[0]);
    let rest = &args[1..];
    match sub.as_str() {
        "length" => string_length(host, rest),
        "index" => string_index(host, rest),
        "range" => string_range(host, rest),
        "match" => string_match(host, rest),
        "compare" => string_compare(host, rest),
        "equal" => string_equal(host, rest),
        "first" => string_first(host, rest),
        "last" => string_last(host, rest),
        "repeat" => string_repeat(host, rest),
        "reverse" => string_reverse(host, rest),
        "insert" => string_insert(host, rest),
        "replace" => string_replace(host, rest),
        "is" => string_is(host, rest),
        "map" => string_map(host, rest),
        "tolower" => string_tolower(host, rest),
        "toupper" => string_toupper(host, rest),
        "totitle" => string_totitle(host, rest),
        "trim" => string_trim(host, rest, TrimMode::Both),
        "trimleft" => string_trim(host, rest, TrimMode::Left),
        "trimright" => string_trim(host, rest, TrimMode::Right),
        "cat" => string_cat(host, rest),
        _ => Err(Exception::error(TclErrorKind::no_such_command(format!("string {}", sub)))),
    }
}

fn resolve_index(host: &dyn HostOps, o: ObjHandle, len: usize) -> Result<i64, crate::error::TclError> {
    let s = host.get_str(o);
    if let Some(rest) = s.strip_prefix("end") {
        if rest.is_empty() {
            return Ok(len as i64 - 1);
        }
        if let Some(off) = rest.strip_prefix('-') {
            let n: i64 = off.parse().map_err(|_| TclErrorKind::syntax(format!("bad index \"{}\"", s)))?;
            return Ok(len as i64 - 1 - n);
        }
        if let Some(off) = rest.strip_prefix('+') {
            let n: i64 = off.parse().map_err(|_| TclErrorKind::syntax(format!("bad index \"{}\"", s)))?;
            return Ok(len as i64 - 1 + n);
        }
    }
    s.parse::<i64>().map_err(|_| TclErrorKind::syntax(format!("bad index \"{}\"", s)))
}

fn string_length(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 1 {
        return Err(Exception::error(TclErrorKind::arity("string length string")));
    }
    Ok(host.int_new(host.rune_len(args[0]) as i64))
}

fn string_index(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 2 {
        return Err(Exception::error(TclErrorKind::arity("string index string charIndex")));
    }
    let len = host.rune_len(args[0]);
    let idx = resolve_index(host, args[1], len).map_err(Exception::Error)?;
    if idx < 0 || idx as usize >= len {
        return Ok(host.intern(""));
    }
    match host.rune_at(args[0], idx as usize) {
        Some(c) => Ok(host.intern(&c.to_string())),
        None => Ok(host.intern("")),
    }
}

fn string_range(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 3 {
        return Err(Exception::error(TclErrorKind::arity("string range string first last")));
    }
    let len = host.rune_len(args[0]);
    let lo = resolve_index(host, args[1], len).map_err(Exception::Error)?.clamp(0, len as i64) as usize;
    let hi_raw = resolve_index(host, args[2], len).map_err(Exception::Error)?;
    if hi_raw < lo as i64 {
        return Ok(host.intern(""));
    }
    let hi = (hi_raw + 1).clamp(0, len as i64) as usize;
    Ok(host.rune_range(args[0], lo, hi))
}

fn string_match(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let (nocase, rest) = strip_nocase(host, args);
    if rest.len() != 2 {
        return Err(Exception::error(TclErrorKind::arity("string match ?-nocase? pattern string")));
    }
    let pattern = str_of(host, rest[0]);
    let s = str_of(host, rest[1]);
    Ok(host.int_new(host.glob_match(&pattern, &s, nocase) as i64))
}

fn strip_nocase<'a>(host: &dyn HostOps, args: &'a [ObjHandle]) -> (bool, &'a [ObjHandle]) {
    if let Some(first) = args.first() {
        if str_of(host, *first) == "-nocase" {
            return (true, &args[1..]);
        }
    }
    (false, args)
}

fn string_compare(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let (nocase, rest) = strip_nocase(host, args);
    if rest.len() != 2 {
        return Err(Exception::error(TclErrorKind::arity("string compare ?-nocase? string1 string2")));
    }
    let ord = if nocase {
        str_of(host, rest[0]).to_lowercase().cmp(&str_of(host, rest[1]).to_lowercase())
    } else {
        host.compare(rest[0], rest[1])
    };
    Ok(host.int_new(match ord {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}

fn string_equal(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let (nocase, rest) = strip_nocase(host, args);
    if rest.len() != 2 {
        return Err(Exception::error(TclErrorKind::arity("string equal ?-nocase? string1 string2")));
    }
    let eq = if nocase {
        str_of(host, rest[0]).to_lowercase() == str_of(host, rest[1]).to_lowercase()
    } else {
        host.str_equal(rest[0], rest[1])
    };
    Ok(host.int_new(eq as i64))
}

fn string_first(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 || args.len() > 3 {
        return Err(Exception::error(TclErrorKind::arity("string first needleString haystackString ?startIndex?")));
    }
    let needle = str_of(host, args[0]);
    let haystack = str_of(host, args[1]);
    let start = match args.get(2) {
        Some(v) => resolve_index(host, *v, haystack.chars().count()).map_err(Exception::Error)?.max(0) as usize,
        None => 0,
    };
    let hay_chars: Vec<char> = haystack.chars().collect();
    let needle_chars: Vec<char> = needle.chars().collect();
    if needle_chars.is_empty() {
        return Ok(host.int_new(-1));
    }
    for i in start..hay_chars.len() {
        if i + needle_chars.len() <= hay_chars.len() && hay_chars[i..i + needle_chars.len()] == needle_chars[..] {
            return Ok(host.int_new(i as i64));
        }
    }
    Ok(host.int_new(-1))
}

fn string_last(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 || args.len() > 3 {
        return Err(Exception::error(TclErrorKind::arity("string last needleString haystackString ?lastIndex?")));
    }
    let needle = str_of(host, args[0]);
    let haystack = str_of(host, args[1]);
    let hay_chars: Vec<char> = haystack.chars().collect();
    let needle_chars: Vec<char> = needle.chars().collect();
    let limit = match args.get(2) {
        Some(v) => resolve_index(host, *v, hay_chars.len()).map_err(Exception::Error)?.clamp(-1, hay_chars.len() as i64 - 1),
        None => hay_chars.len() as i64 - 1,
    };
    if needle_chars.is_empty() {
        return Ok(host.int_new(-1));
    }
    for i in (0..=limit).rev() {
        let i = i as usize;
        if i + needle_chars.len() <= hay_chars.len() && hay_chars[i..i + needle_chars.len()] == needle_chars[..] {
            return Ok(host.int_new(i as i64));
        }
    }
    Ok(host.int_new(-1))
}

fn string_repeat(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 2 {
        return Err(Exception::error(TclErrorKind::arity("string repeat string count")));
    }
    let s = str_of(host, args[0]);
    let n = host.int_get(args[1]).map_err(Exception::Error)?;
    if n < 0 {
        return Err(Exception::error(TclErrorKind::bad_type("expected non-negative integer")));
    }
    Ok(host.intern(&s.repeat(n as usize)))
}

fn string_reverse(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 1 {
        return Err(Exception::error(TclErrorKind::arity("string reverse string")));
    }
    let s: String = str_of(host, args[0]).chars().rev().collect();
    Ok(host.intern(&s))
}

fn string_insert(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 3 {
        return Err(Exception::error(TclErrorKind::arity("string insert string index insertString")));
    }
    let chars: Vec<char> = str_of(host, args[0]).chars().collect();
    let idx = resolve_index(host, args[1], chars.len()).map_err(Exception::Error)?.clamp(0, chars.len() as i64) as usize;
    let insert = str_of(host, args[2]);
    let mut out: String = chars[..idx].iter().collect();
    out.push_str(&insert);
    out.extend(&chars[idx..]);
    Ok(host.intern(&out))
}

fn string_replace(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 3 || args.len() > 4 {
        return Err(Exception::error(TclErrorKind::arity("string replace string first last ?newString?")));
    }
    let chars: Vec<char> = str_of(host, args[0]).chars().collect();
    let len = chars.len();
    let lo = resolve_index(host, args[1], len).map_err(Exception::Error)?.clamp(0, len as i64) as usize;
    let hi = (resolve_index(host, args[2], len).map_err(Exception::Error)? + 1).clamp(lo as i64, len as i64) as usize;
    let replacement = args.get(3).map(|v| str_of(host, *v)).unwrap_or_default();
    let mut out: String = chars[..lo].iter().collect();
    out.push_str(&replacement);
    out.extend(&chars[hi..]);
    Ok(host.intern(&out))
}

fn string_is(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("string is class ?-strict? string")));
    }
    let class_name = str_of(host, args[0]);
    let (strict, rest) = if args.len() >= 2 && str_of(host, args[1]) == "-strict" { (true, &args[2..]) } else { (false, &args[1..]) };
    if rest.len() != 1 {
        return Err(Exception::error(TclErrorKind::arity("string is class ?-strict? string")));
    }
    let s = str_of(host, rest[0]);
    if s.is_empty() && !strict {
        return Ok(host.int_new(1));
    }
    let ok = match class_name.as_str() {
        "integer" => crate::numeric::parse_tcl_int(&s).is_some(),
        "double" => crate::numeric::parse_tcl_double(&s).is_some(),
        "boolean" => crate::numeric::bareword_bool(&s).is_some(),
        "alpha" => s.chars().all(|c| host.is_class(c, CharClass::Alpha)),
        "alnum" => s.chars().all(|c| host.is_class(c, CharClass::Alnum)),
        "digit" => s.chars().all(|c| host.is_class(c, CharClass::Digit)),
        "space" => s.chars().all(|c| host.is_class(c, CharClass::Space)),
        "upper" => s.chars().all(|c| host.is_class(c, CharClass::Upper)),
        "lower" => s.chars().all(|c| host.is_class(c, CharClass::Lower)),
        "punct" => s.chars().all(|c| host.is_class(c, CharClass::Punct)),
        "ascii" => s.chars().all(|c| host.is_class(c, CharClass::Ascii)),
        "wordchar" => s.chars().all(|c| host.is_class(c, CharClass::Wordchar)),
        "xdigit" => s.chars().all(|c| host.is_class(c, CharClass::Xdigit)),
        "list" => host.list_from(rest[0]).is_ok(),
        _ => return Err(Exception::error(TclErrorKind::syntax(format!("unknown class \"{}\"", class_name)))),
    };
    Ok(host.int_new(ok as i64))
}

/// `string map ?-nocase? {from to ...} string`.
fn string_map(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let (nocase, rest) = strip_nocase(host, args);
    if rest.len() != 2 {
        return Err(Exception::error(TclErrorKind::arity("string map ?-nocase? mapping string")));
    }
    let pairs = host.list_items(rest[0]).map_err(Exception::Error)?;
    let s = str_of(host, rest[1]);
    let mut mapping: Vec<(String, String)> = pairs
        .chunks(2)
        .filter(|c| c.len() == 2)
        .map(|c| (str_of(host, c[0]), str_of(host, c[1])))
        .collect();
    mapping.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    let mut out = String::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    'outer: while i < chars.len() {
        for (from, to) in &mapping {
            if from.is_empty() {
                continue;
            }
            let from_chars: Vec<char> = from.chars().collect();
            if i + from_chars.len() <= chars.len() {
                let window = &chars[i..i + from_chars.len()];
                let matched = if nocase {
                    window.iter().collect::<String>().to_lowercase() == from.to_lowercase()
                } else {
                    window == from_chars.as_slice()
                };
                if matched {
                    out.push_str(to);
                    i += from_chars.len();
                    continue 'outer;
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    Ok(host.intern(&out))
}

fn string_tolower(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() || args.len() > 3 {
        return Err(Exception::error(TclErrorKind::arity("string tolower string ?first? ?last?")));
    }
    Ok(host.to_lower(args[0]))
}

fn string_toupper(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() || args.len() > 3 {
        return Err(Exception::error(TclErrorKind::arity("string toupper string ?first? ?last?")));
    }
    Ok(host.to_upper(args[0]))
}

fn string_totitle(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 1 {
        return Err(Exception::error(TclErrorKind::arity("string totitle string")));
    }
    Ok(host.to_title(args[0]))
}

enum TrimMode {
    Left,
    Right,
    Both,
}

fn string_trim(host: &mut dyn HostOps, args: &[ObjHandle], mode: TrimMode) -> EvalResult {
    if args.is_empty() || args.len() > 2 {
        return Err(Exception::error(TclErrorKind::arity("string trim string ?chars?")));
    }
    let s = str_of(host, args[0]);
    let chars = match args.get(1) {
        Some(v) => str_of(host, *v),
        None => " \t\n\r".to_string(),
    };
    let is_trim = |c: char| chars.contains(c);
    let trimmed = match mode {
        TrimMode::Left => s.trim_start_matches(is_trim),
        TrimMode::Right => s.trim_end_matches(is_trim),
        TrimMode::Both => s.trim_start_matches(is_trim).trim_end_matches(is_trim),
    };
    Ok(host.intern(trimmed))
}

fn string_cat(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let mut acc = host.intern("");
    for a in args {
        acc = host.concat(acc, *a);
    }
    Ok(acc)
}

/// `format formatString ?arg ...?`: a minimal printf-style formatter
/// covering `%s %d %i %x %X %o %f %e %g %c %%` with width/precision and the
/// `-`/`0`/`+` flags (SPEC_FULL.md §D "format").
fn cmd_format(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("format formatString ?arg ...?")));
    }
    let fmt = str_of(host, args[0]);
    let mut arg_i = 1;
    let chars: Vec<char> = fmt.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '%' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        i += 1;
        if i < chars.len() && chars[i] == '%' {
            out.push('%');
            i += 1;
            continue;
        }
        let spec_start = i;
        let mut left_align = false;
        let mut zero_pad = false;
        let mut show_sign = false;
        while i < chars.len() && matches!(chars[i], '-' | '0' | '+' | ' ') {
            match chars[i] {
                '-' => left_align = true,
                '0' => zero_pad = true,
                '+' => show_sign = true,
                _ => {}
            }
            i += 1;
        }
        let width_start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let width: Option<usize> = chars[width_start..i].iter().collect::<String>().parse().ok();
        let mut precision: Option<usize> = None;
        if i < chars.len() && chars[i] == '.' {
            i += 1;
            let prec_start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            precision = chars[prec_start..i].iter().collect::<String>().parse().ok().or(Some(0));
        }
        if i >= chars.len() {
            return Err(Exception::error(TclErrorKind::syntax(format!(
                "incomplete format specifier \"%{}\"",
                chars[spec_start..].iter().collect::<String>()
            ))));
        }
        let conv = chars[i];
        i += 1;
        let next_arg = || args.get(arg_i).copied();
        let piece = match conv {
            's' => {
                let a = next_arg().ok_or_else(|| Exception::error(TclErrorKind::arity("not enough arguments for all format specifiers")))?;
                arg_i += 1;
                let mut s = str_of(host, a);
                if let Some(p) = precision {
                    s = s.chars().take(p).collect();
                }
                s
            }
            'd' | 'i' => {
                let a = next_arg().ok_or_else(|| Exception::error(TclErrorKind::arity("not enough arguments for all format specifiers")))?;
                arg_i += 1;
                let v = host.int_get(a).map_err(Exception::Error)?;
                let sign = if v >= 0 && show_sign { "+" } else { "" };
                format!("{}{}", sign, v)
            }
            'x' => {
                let a = next_arg().ok_or_else(|| Exception::error(TclErrorKind::arity("not enough arguments for all format specifiers")))?;
                arg_i += 1;
                format!("{:x}", host.int_get(a).map_err(Exception::Error)?)
            }
            'X' => {
                let a = next_arg().ok_or_else(|| Exception::error(TclErrorKind::arity("not enough arguments for all format specifiers")))?;
                arg_i += 1;
                format!("{:X}", host.int_get(a).map_err(Exception::Error)?)
            }
            'o' => {
                let a = next_arg().ok_or_else(|| Exception::error(TclErrorKind::arity("not enough arguments for all format specifiers")))?;
                arg_i += 1;
                format!("{:o}", host.int_get(a).map_err(Exception::Error)?)
            }
            'c' => {
                let a = next_arg().ok_or_else(|| Exception::error(TclErrorKind::arity("not enough arguments for all format specifiers")))?;
                arg_i += 1;
                let code = host.int_get(a).map_err(Exception::Error)?;
                char::from_u32(code as u32).map(|c| c.to_string()).unwrap_or_default()
            }
            'f' | 'F' => {
                let a = next_arg().ok_or_else(|| Exception::error(TclErrorKind::arity("not enough arguments for all format specifiers")))?;
                arg_i += 1;
                let v = host.double_get(a).map_err(Exception::Error)?;
                format!("{:.*}", precision.unwrap_or(6), v)
            }
            'e' | 'E' => {
                let a = next_arg().ok_or_else(|| Exception::error(TclErrorKind::arity("not enough arguments for all format specifiers")))?;
                arg_i += 1;
                let v = host.double_get(a).map_err(Exception::Error)?;
                format!("{:.*e}", precision.unwrap_or(6), v)
            }
            'g' | 'G' => {
                let a = next_arg().ok_or_else(|| Exception::error(TclErrorKind::arity("not enough arguments for all format specifiers")))?;
                arg_i += 1;
                let v = host.double_get(a).map_err(Exception::Error)?;
                format!("{}", v)
            }
            _ => {
                return Err(Exception::error(TclErrorKind::syntax(format!(
                    "bad field specifier \"{}\"",
                    conv
                ))))
            }
        };
        out.push_str(&pad(&piece, width, left_align, zero_pad));
    }
    Ok(host.intern(&out))
}

fn pad(s: &str, width: Option<usize>, left: bool, zero: bool) -> String {
    let w = match width {
        Some(w) if w > s.chars().count() => w,
        _ => return s.to_string(),
    };
    let fill_len = w - s.chars().count();
    let fill_char = if zero && !left { '0' } else { ' ' };
    let fill: String = std::iter::repeat(fill_char).take(fill_len).collect();
    if left {
        format!("{}{}", s, " ".repeat(fill_len))
    } else {
        format!("{}{}", fill, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DefaultHost;

    fn fresh() -> (Interp, DefaultHost) {
        let mut host = DefaultHost::new();
        let interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        (interp, host)
    }

    #[test]
    fn length_and_range() {
        let (mut interp, mut host) = fresh();
        let s = host.intern("hello world");
        let len_sub = host.intern("length");
        let len = cmd_string(&mut interp, &mut host, &[len_sub, s]).unwrap();
        assert_eq!(host.get_str(len).as_ref(), "11");
        let range_sub = host.intern("range");
        let lo = host.intern("0");
        let hi = host.intern("4");
        let r = cmd_string(&mut interp, &mut host, &[range_sub, s, lo, hi]).unwrap();
        assert_eq!(host.get_str(r).as_ref(), "hello");
    }

    #[test]
    fn match_glob_pattern() {
        let (mut interp, mut host) = fresh();
        let sub = host.intern("match");
        let pat = host.intern("h*o");
        let s = host.intern("hello");
        let r = cmd_string(&mut interp, &mut host, &[sub, pat, s]).unwrap();
        assert_eq!(host.get_str(r).as_ref(), "1");
    }

    #[test]
    fn format_basic_specifiers() {
        let (mut interp, mut host) = fresh();
        let fmt = host.intern("%-5s|%05d");
        let a = host.intern("ab");
        let b = host.int_new(7);
        let r = cmd_format(&mut interp, &mut host, &[fmt, a, b]).unwrap();
        assert_eq!(host.get_str(r).as_ref(), "ab   |00007");
    }
}
