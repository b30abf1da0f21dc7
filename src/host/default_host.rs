//! A concrete, in-process [`HostOps`] implementation: a flat arena of
//! objects, reference-counted strings, ordered dicts via `indexmap`.
//!
//! This plays the same role for the interpreter that `fs::InMemoryFs` plays
//! for the teacher's `FileSystem` trait: a real backing store good enough
//! for embedding without a custom host, and what the crate's own tests run
//! against.

use std::cmp::Ordering;
use std::num::FpCategory;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{TclError, TclErrorKind};
use crate::numeric::{format_tcl_double, parse_tcl_double, parse_tcl_int};

use super::types::{CharClass, DoubleClass, MathOp, ObjHandle, ObjKind};
use super::HostOps;

#[derive(Clone)]
enum Repr {
    Nil,
    Str,
    Int(i64),
    Double(f64),
    List(Rc<Vec<ObjHandle>>),
    Dict(Rc<IndexMap<Rc<str>, ObjHandle>>),
}

struct ObjData {
    string: Rc<str>,
    repr: Repr,
}

pub struct DefaultHost {
    objects: Vec<ObjData>,
    nil: ObjHandle,
}

impl Default for DefaultHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultHost {
    pub fn new() -> Self {
        let mut host = DefaultHost { objects: Vec::new(), nil: ObjHandle(0) };
        let nil = host.alloc(Rc::from(""), Repr::Nil);
        host.nil = nil;
        host
    }

    fn alloc(&mut self, string: Rc<str>, repr: Repr) -> ObjHandle {
        let idx = self.objects.len() as u32;
        self.objects.push(ObjData { string, repr });
        ObjHandle(idx)
    }

    fn data(&self, o: ObjHandle) -> &ObjData {
        &self.objects[o.0 as usize]
    }

    fn new_dict_obj(&mut self, map: IndexMap<Rc<str>, ObjHandle>) -> ObjHandle {
        let mut parts = Vec::with_capacity(map.len() * 2);
        for (k, v) in map.iter() {
            parts.push(quote_list_element(k));
            parts.push(quote_list_element(&self.get_str(*v)));
        }
        let s = parts.join(" ");
        self.alloc(Rc::from(s), Repr::Dict(Rc::new(map)))
    }

    fn serialize_list(&self, items: &[ObjHandle]) -> String {
        items.iter().map(|o| quote_list_element(&self.get_str(*o))).collect::<Vec<_>>().join(" ")
    }
}

impl HostOps for DefaultHost {
    fn intern(&mut self, s: &str) -> ObjHandle {
        self.alloc(Rc::from(s), Repr::Str)
    }

    fn get_str(&self, o: ObjHandle) -> Rc<str> {
        self.data(o).string.clone()
    }

    fn nil(&self) -> ObjHandle {
        self.nil
    }

    fn is_nil(&self, o: ObjHandle) -> bool {
        matches!(self.data(o).repr, Repr::Nil)
    }

    fn byte_len(&self, o: ObjHandle) -> usize {
        self.data(o).string.len()
    }

    fn concat(&mut self, a: ObjHandle, b: ObjHandle) -> ObjHandle {
        let s = format!("{}{}", self.get_str(a), self.get_str(b));
        self.intern(&s)
    }

    fn compare(&self, a: ObjHandle, b: ObjHandle) -> Ordering {
        self.data(a).string.as_ref().cmp(self.data(b).string.as_ref())
    }

    fn glob_match(&self, pattern: &str, s: &str, nocase: bool) -> bool {
        let p: Vec<char> = pattern.chars().collect();
        let t: Vec<char> = s.chars().collect();
        glob_match_impl(&p, &t, nocase)
    }

    fn regex_match(&self, pattern: &str, s: &str, nocase: bool) -> Result<bool, TclError> {
        let effective = if nocase { format!("(?i){}", pattern) } else { pattern.to_string() };
        let re = regex_lite::Regex::new(&effective)
            .map_err(|e| TclErrorKind::syntax(format!("couldn't compile regular expression pattern: {}", e)))?;
        Ok(re.is_match(s))
    }

    fn rune_len(&self, o: ObjHandle) -> usize {
        self.data(o).string.chars().count()
    }

    fn rune_at(&self, o: ObjHandle, i: usize) -> Option<char> {
        self.data(o).string.chars().nth(i)
    }

    fn rune_range(&mut self, o: ObjHandle, lo: usize, hi: usize) -> ObjHandle {
        let s: String = self.get_str(o).chars().skip(lo).take(hi.saturating_sub(lo)).collect();
        self.intern(&s)
    }

    fn to_upper(&mut self, o: ObjHandle) -> ObjHandle {
        let s = self.get_str(o).to_uppercase();
        self.intern(&s)
    }

    fn to_lower(&mut self, o: ObjHandle) -> ObjHandle {
        let s = self.get_str(o).to_lowercase();
        self.intern(&s)
    }

    fn to_title(&mut self, o: ObjHandle) -> ObjHandle {
        let src = self.get_str(o);
        let mut chars = src.chars();
        let s = match chars.next() {
            None => String::new(),
            Some(first) => {
                let mut out: String = first.to_uppercase().collect();
                out.push_str(&chars.as_str().to_lowercase());
                out
            }
        };
        self.intern(&s)
    }

    fn is_class(&self, ch: char, class: CharClass) -> bool {
        match class {
            CharClass::Alnum => ch.is_alphanumeric(),
            CharClass::Alpha => ch.is_alphabetic(),
            CharClass::Ascii => ch.is_ascii(),
            CharClass::Control => ch.is_control(),
            CharClass::Digit => ch.is_ascii_digit(),
            CharClass::Graph => !ch.is_whitespace() && !ch.is_control(),
            CharClass::Lower => ch.is_lowercase(),
            CharClass::Print => !ch.is_control(),
            CharClass::Punct => ch.is_ascii_punctuation(),
            CharClass::Space => ch.is_whitespace(),
            CharClass::Upper => ch.is_uppercase(),
            CharClass::Wordchar => ch.is_alphanumeric() || ch == '_',
            CharClass::Xdigit => ch.is_ascii_hexdigit(),
        }
    }

    fn int_new(&mut self, v: i64) -> ObjHandle {
        self.alloc(Rc::from(v.to_string()), Repr::Int(v))
    }

    fn int_get(&self, o: ObjHandle) -> Result<i64, TclError> {
        match self.data(o).repr {
            Repr::Int(v) => Ok(v),
            _ => parse_tcl_int(&self.data(o).string)
                .ok_or_else(|| TclErrorKind::bad_type(format!("expected integer but got \"{}\"", self.data(o).string))),
        }
    }

    fn double_new(&mut self, v: f64) -> ObjHandle {
        self.alloc(Rc::from(format_tcl_double(v)), Repr::Double(v))
    }

    fn double_get(&self, o: ObjHandle) -> Result<f64, TclError> {
        match self.data(o).repr {
            Repr::Double(v) => Ok(v),
            Repr::Int(v) => Ok(v as f64),
            _ => parse_tcl_double(&self.data(o).string)
                .ok_or_else(|| TclErrorKind::bad_type(format!("expected floating-point number but got \"{}\"", self.data(o).string))),
        }
    }

    fn double_classify(&self, v: f64) -> DoubleClass {
        if v == 0.0 {
            return DoubleClass::Zero;
        }
        match v.classify() {
            FpCategory::Normal => DoubleClass::Normal,
            FpCategory::Subnormal => DoubleClass::Subnormal,
            FpCategory::Zero => DoubleClass::Zero,
            FpCategory::Infinite => if v > 0.0 { DoubleClass::Inf } else { DoubleClass::NegInf },
            FpCategory::Nan => DoubleClass::Nan,
        }
    }

    fn math(&self, op: MathOp, a: f64, b: f64) -> f64 {
        match op {
            MathOp::Sqrt => a.sqrt(),
            MathOp::Pow => a.powf(b),
            MathOp::Exp => a.exp(),
            MathOp::Log => a.ln(),
            MathOp::Log10 => a.log10(),
            MathOp::Sin => a.sin(),
            MathOp::Cos => a.cos(),
            MathOp::Tan => a.tan(),
            MathOp::Asin => a.asin(),
            MathOp::Acos => a.acos(),
            MathOp::Atan => a.atan(),
            MathOp::Atan2 => a.atan2(b),
            MathOp::Sinh => a.sinh(),
            MathOp::Cosh => a.cosh(),
            MathOp::Tanh => a.tanh(),
            MathOp::Floor => a.floor(),
            MathOp::Ceil => a.ceil(),
            MathOp::Round => a.round(),
            MathOp::Abs => a.abs(),
            MathOp::Fmod => a % b,
            MathOp::Hypot => a.hypot(b),
        }
    }

    fn list_new(&mut self, items: &[ObjHandle]) -> ObjHandle {
        let s = self.serialize_list(items);
        self.alloc(Rc::from(s), Repr::List(Rc::new(items.to_vec())))
    }

    fn list_from(&mut self, o: ObjHandle) -> Result<ObjHandle, TclError> {
        if matches!(self.data(o).repr, Repr::List(_)) {
            return Ok(o);
        }
        let s = self.get_str(o);
        let parts = parse_list_string(&s)?;
        let handles: Vec<ObjHandle> = parts.iter().map(|p| self.intern(p)).collect();
        Ok(self.alloc(s, Repr::List(Rc::new(handles))))
    }

    fn list_len(&mut self, o: ObjHandle) -> Result<usize, TclError> {
        let l = self.list_from(o)?;
        match &self.data(l).repr {
            Repr::List(v) => Ok(v.len()),
            _ => unreachable!(),
        }
    }

    fn list_index(&mut self, o: ObjHandle, i: usize) -> Result<Option<ObjHandle>, TclError> {
        let l = self.list_from(o)?;
        match &self.data(l).repr {
            Repr::List(v) => Ok(v.get(i).copied()),
            _ => unreachable!(),
        }
    }

    fn list_slice(&mut self, o: ObjHandle, lo: usize, hi: usize) -> Result<ObjHandle, TclError> {
        let items = self.list_items(o)?;
        let lo = lo.min(items.len());
        let hi = hi.min(items.len());
        let slice = if lo < hi { &items[lo..hi] } else { &[] };
        Ok(self.list_new(slice))
    }

    fn list_push(&mut self, o: ObjHandle, item: ObjHandle) -> Result<ObjHandle, TclError> {
        let mut items = self.list_items(o)?;
        items.push(item);
        Ok(self.list_new(&items))
    }

    fn list_unshift(&mut self, o: ObjHandle, item: ObjHandle) -> Result<ObjHandle, TclError> {
        let mut items = self.list_items(o)?;
        items.insert(0, item);
        Ok(self.list_new(&items))
    }

    fn dict_new(&mut self) -> ObjHandle {
        self.alloc(Rc::from(""), Repr::Dict(Rc::new(IndexMap::new())))
    }

    fn dict_from(&mut self, o: ObjHandle) -> Result<ObjHandle, TclError> {
        if matches!(self.data(o).repr, Repr::Dict(_)) {
            return Ok(o);
        }
        let items = self.list_items(o)?;
        if items.len() % 2 != 0 {
            return Err(TclErrorKind::bad_type("missing value to go with key"));
        }
        let mut map = IndexMap::new();
        for pair in items.chunks(2) {
            let k = self.get_str(pair[0]);
            map.insert(k, pair[1]);
        }
        let s = self.get_str(o);
        Ok(self.alloc(s, Repr::Dict(Rc::new(map))))
    }

    fn dict_get(&mut self, o: ObjHandle, key: ObjHandle) -> Result<Option<ObjHandle>, TclError> {
        let d = self.dict_from(o)?;
        let k = self.get_str(key);
        match &self.data(d).repr {
            Repr::Dict(m) => Ok(m.get(k.as_ref()).copied()),
            _ => unreachable!(),
        }
    }

    fn dict_set(&mut self, o: ObjHandle, key: ObjHandle, val: ObjHandle) -> Result<ObjHandle, TclError> {
        let d = self.dict_from(o)?;
        let mut map = match &self.data(d).repr {
            Repr::Dict(m) => (**m).clone(),
            _ => unreachable!(),
        };
        let k = self.get_str(key);
        map.insert(k, val);
        Ok(self.new_dict_obj(map))
    }

    fn dict_unset(&mut self, o: ObjHandle, key: ObjHandle) -> Result<ObjHandle, TclError> {
        let d = self.dict_from(o)?;
        let mut map = match &self.data(d).repr {
            Repr::Dict(m) => (**m).clone(),
            _ => unreachable!(),
        };
        let k = self.get_str(key);
        map.shift_remove(k.as_ref());
        Ok(self.new_dict_obj(map))
    }

    fn dict_size(&mut self, o: ObjHandle) -> Result<usize, TclError> {
        let d = self.dict_from(o)?;
        match &self.data(d).repr {
            Repr::Dict(m) => Ok(m.len()),
            _ => unreachable!(),
        }
    }

    fn dict_entries(&mut self, o: ObjHandle) -> Result<Vec<(ObjHandle, ObjHandle)>, TclError> {
        let d = self.dict_from(o)?;
        let map = match &self.data(d).repr {
            Repr::Dict(m) => m.clone(),
            _ => unreachable!(),
        };
        let mut out = Vec::with_capacity(map.len());
        for (k, v) in map.iter() {
            out.push((self.intern(k), *v));
        }
        Ok(out)
    }

    fn kind(&self, o: ObjHandle) -> ObjKind {
        match self.data(o).repr {
            Repr::Nil | Repr::Str => ObjKind::Str,
            Repr::Int(_) => ObjKind::Int,
            Repr::Double(_) => ObjKind::Double,
            Repr::List(_) => ObjKind::List,
            Repr::Dict(_) => ObjKind::Dict,
        }
    }
}

/// Brace-or-backslash quote a single list element the way `list`/`lappend`
/// format their output (§3 "List").
fn quote_list_element(s: &str) -> String {
    if s.is_empty() {
        return "{}".to_string();
    }
    let needs_quote = s.chars().any(|c| " \t\n\r{}[]$\";\\".contains(c)) || s.starts_with('#');
    if !needs_quote {
        return s.to_string();
    }
    if braces_balance_cleanly(s) && !s.ends_with('\\') {
        return format!("{{{}}}", s);
    }
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        if " \t\n\r{}[]$\";\\".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn braces_balance_cleanly(s: &str) -> bool {
    let mut depth: i32 = 0;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Parse a Tcl list's string representation into its elements (§3 "List").
fn parse_list_string(s: &str) -> Result<Vec<String>, TclError> {
    let chars: Vec<char> = s.chars().collect();
    let n = chars.len();
    let mut i = 0;
    let mut out = Vec::new();
    loop {
        while i < n && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= n {
            break;
        }
        if chars[i] == '{' {
            i += 1;
            let elem_start = i;
            let mut depth = 1;
            while i < n && depth > 0 {
                match chars[i] {
                    '\\' => {
                        i += 2;
                        continue;
                    }
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                i += 1;
            }
            if depth != 0 {
                return Err(TclErrorKind::syntax("unmatched open brace in list"));
            }
            let end = i - 1;
            out.push(chars[elem_start..end].iter().collect());
        } else if chars[i] == '"' {
            i += 1;
            let mut buf = String::new();
            while i < n && chars[i] != '"' {
                if chars[i] == '\\' && i + 1 < n {
                    buf.push(chars[i + 1]);
                    i += 2;
                } else {
                    buf.push(chars[i]);
                    i += 1;
                }
            }
            if i >= n {
                return Err(TclErrorKind::syntax("unmatched open quote in list"));
            }
            i += 1;
            out.push(buf);
        } else {
            let mut buf = String::new();
            while i < n && !chars[i].is_whitespace() {
                if chars[i] == '\\' && i + 1 < n {
                    buf.push(chars[i + 1]);
                    i += 2;
                } else {
                    buf.push(chars[i]);
                    i += 1;
                }
            }
            out.push(buf);
        }
    }
    Ok(out)
}

fn glob_match_impl(pattern: &[char], text: &[char], nocase: bool) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('*') => {
            let mut p = pattern;
            while p.first() == Some(&'*') {
                p = &p[1..];
            }
            if p.is_empty() {
                return true;
            }
            for i in 0..=text.len() {
                if glob_match_impl(p, &text[i..], nocase) {
                    return true;
                }
            }
            false
        }
        Some('?') => !text.is_empty() && glob_match_impl(&pattern[1..], &text[1..], nocase),
        Some('[') => {
            if let Some(close) = pattern.iter().position(|&c| c == ']').filter(|&p| p > 0) {
                if text.is_empty() {
                    return false;
                }
                let class = &pattern[1..close];
                char_in_class(class, text[0], nocase) && glob_match_impl(&pattern[close + 1..], &text[1..], nocase)
            } else {
                chars_eq('[', text.first().copied(), nocase) && glob_match_impl(&pattern[1..], &text[1..], nocase)
            }
        }
        Some('\\') => {
            if pattern.len() < 2 {
                return chars_eq('\\', text.first().copied(), nocase) && text.len() == 1;
            }
            let lit = pattern[1];
            chars_eq(lit, text.first().copied(), nocase) && glob_match_impl(&pattern[2..], &text[1..], nocase)
        }
        Some(&pc) => chars_eq(pc, text.first().copied(), nocase) && glob_match_impl(&pattern[1..], &text[1..], nocase),
    }
}

fn chars_eq(pat: char, actual: Option<char>, nocase: bool) -> bool {
    match actual {
        None => false,
        Some(c) => {
            if nocase {
                pat.to_ascii_lowercase() == c.to_ascii_lowercase()
            } else {
                pat == c
            }
        }
    }
}

fn char_in_class(class: &[char], c: char, nocase: bool) -> bool {
    let mut negate = false;
    let mut class = class;
    if class.first() == Some(&'^') {
        negate = true;
        class = &class[1..];
    }
    let cc = if nocase { c.to_ascii_lowercase() } else { c };
    let mut i = 0;
    let mut found = false;
    while i < class.len() {
        if i + 2 < class.len() && class[i + 1] == '-' {
            let (mut lo, mut hi) = (class[i], class[i + 2]);
            if nocase {
                lo = lo.to_ascii_lowercase();
                hi = hi.to_ascii_lowercase();
            }
            if cc >= lo && cc <= hi {
                found = true;
            }
            i += 3;
        } else {
            let cl = if nocase { class[i].to_ascii_lowercase() } else { class[i] };
            if cl == cc {
                found = true;
            }
            i += 1;
        }
    }
    found != negate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_round_trip() {
        let mut h = DefaultHost::new();
        let o = h.intern("hello");
        assert_eq!(h.get_str(o).as_ref(), "hello");
        assert!(!h.is_nil(o));
        assert!(h.is_nil(h.nil()));
    }

    #[test]
    fn integers_shimmer_from_strings() {
        let mut h = DefaultHost::new();
        let o = h.intern("42");
        assert_eq!(h.int_get(o).unwrap(), 42);
        let bad = h.intern("abc");
        assert!(h.int_get(bad).is_err());
    }

    #[test]
    fn lists_round_trip_through_string_form() {
        let mut h = DefaultHost::new();
        let a = h.intern("alpha beta");
        let b = h.intern("gamma");
        let l = h.list_new(&[a, b]);
        assert_eq!(h.get_str(l).as_ref(), "{alpha beta} gamma");
        let items = h.list_items(l).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(h.get_str(items[0]).as_ref(), "alpha beta");
    }

    #[test]
    fn dict_preserves_insertion_order() {
        let mut h = DefaultHost::new();
        let d0 = h.dict_new();
        let k1 = h.intern("b");
        let v1 = h.intern("2");
        let k2 = h.intern("a");
        let v2 = h.intern("1");
        let d1 = h.dict_set(d0, k1, v1).unwrap();
        let d2 = h.dict_set(d1, k2, v2).unwrap();
        let entries = h.dict_entries(d2).unwrap();
        assert_eq!(h.get_str(entries[0].0).as_ref(), "b");
        assert_eq!(h.get_str(entries[1].0).as_ref(), "a");
    }

    #[test]
    fn glob_matching_supports_star_question_and_classes() {
        let h = DefaultHost::new();
        assert!(h.glob_match("a*c", "aXXXc", false));
        assert!(h.glob_match("a?c", "abc", false));
        assert!(h.glob_match("[abc]*", "banana", false));
        assert!(!h.glob_match("[^abc]*", "banana", false));
    }
}
