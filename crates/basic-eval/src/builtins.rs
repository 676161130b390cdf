//! The closed built-in function set (spec.md §6). Resolution order against
//! user `FUNCTION`s/arrays is decided by `expr.rs`; this module only
//! implements the call once that decision has been made.

use std::time::{SystemTime, UNIX_EPOCH};

use basic_ast::{InterpreterError, RuntimeErrorKind, Value};
use basic_framebuffer::rgb;

use crate::Interpreter;

fn arg_num(args: &[Value], i: usize) -> f64 {
    args.get(i).and_then(Value::as_number).unwrap_or(0.0)
}

fn arg_text<'a>(args: &'a [Value], i: usize) -> &'a str {
    match args.get(i) {
        Some(Value::Text(s)) => s.as_str(),
        _ => "",
    }
}

/// `VAL`-style leading-numeric-prefix parse: the longest prefix of `s`
/// (after skipping leading whitespace) that parses as a number, `0` if
/// none (spec.md §6 `Val`).
pub fn parse_val(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let mut prefix = String::new();
    let mut chars = trimmed.chars().peekable();
    if let Some(&c) = chars.peek() {
        if c == '+' || c == '-' {
            prefix.push(c);
            chars.next();
        }
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in chars {
        match c {
            '0'..='9' => {
                seen_digit = true;
                prefix.push(c);
            }
            '.' if !seen_dot => {
                seen_dot = true;
                prefix.push(c);
            }
            _ => break,
        }
    }
    if !seen_digit {
        return Some(0.0);
    }
    Some(prefix.parse::<f64>().unwrap_or(0.0))
}

/// `STR$(n)`: a leading space for non-negative numbers, matching the sign
/// column GW-BASIC always reserves (spec.md §8 PRINT-formatting scenarios).
pub fn str_dollar(n: f64) -> String {
    let body = format_number_body(n);
    if n < 0.0 {
        body
    } else {
        format!(" {body}")
    }
}

/// The bare digit/decimal rendering shared by `STR$`/`PRINT` (no sign
/// padding applied here).
pub fn format_number_body(n: f64) -> String {
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let s = format!("{n}");
        s
    }
}

/// `HEX$`/`OCT$` operate on the 16-bit two's-complement view classic BASIC
/// integers use, so a negative argument renders the wrapped bit pattern
/// rather than a leading minus sign.
fn integer_bits(n: f64) -> u32 {
    let i = n.trunc() as i64;
    if i < 0 {
        (i & 0xFFFF) as u32
    } else {
        i as u32
    }
}

/// `MKI$`/`MKS$`/`MKD$` pack raw bytes into a string one byte per char, the
/// same encoding `CVI`/`CVS`/`CVD` read back (spec.md §6).
fn bytes_to_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn text_to_bytes(s: &str) -> Vec<u8> {
    s.chars().map(|c| c as u32 as u8).collect()
}

impl Interpreter {
    /// Returns `None` when `name` is not a recognized builtin at all (so the
    /// caller falls through to array/variable resolution), `Some(Ok(..))`/
    /// `Some(Err(..))` once it commits to having handled the call.
    pub fn call_builtin(
        &mut self,
        name: &str,
        raw_args: &[basic_ast::Expression],
        line: u32,
    ) -> Option<Result<Value, InterpreterError>> {
        let upper = name.trim_end_matches('$').to_ascii_uppercase();
        let is_closed = matches!(
            upper.as_str(),
            "ABS" | "SGN" | "INT" | "FIX" | "SQR" | "SIN" | "COS" | "TAN" | "ATN" | "EXP" | "LOG"
                | "RND" | "CINT" | "CLNG" | "CSNG" | "CDBL" | "STR" | "VAL" | "LEN" | "LEFT"
                | "RIGHT" | "MID" | "CHR" | "ASC" | "SPACE" | "STRING" | "INSTR" | "UCASE"
                | "LCASE" | "LTRIM" | "RTRIM" | "TIMER" | "INKEY" | "CSRLIN" | "POS" | "ERR"
                | "ERL" | "FRE" | "INPUT" | "EOF" | "LOF" | "LOC" | "PEEK" | "POINT" | "RGB"
                | "HEX" | "OCT" | "CVI" | "CVS" | "CVD" | "MKI" | "MKS" | "MKD" | "TAB" | "SPC"
        );
        if !is_closed {
            return None;
        }
        let mut args = Vec::with_capacity(raw_args.len());
        for a in raw_args {
            match self.eval_expression(a, line) {
                Ok(v) => args.push(v),
                Err(e) => return Some(Err(e)),
            }
        }
        Some(self.dispatch_builtin(&upper, &args, line))
    }

    fn dispatch_builtin(&mut self, upper: &str, args: &[Value], line: u32) -> Result<Value, InterpreterError> {
        use RuntimeErrorKind::IllegalFunctionCall as BadCall;
        match upper {
            "ABS" => Ok(Value::Number(arg_num(args, 0).abs())),
            "SGN" => Ok(Value::Number(arg_num(args, 0).signum())),
            "INT" => Ok(Value::Number(arg_num(args, 0).floor())),
            "FIX" => Ok(Value::Number(arg_num(args, 0).trunc())),
            "SQR" => {
                let n = arg_num(args, 0);
                if n < 0.0 {
                    Err(InterpreterError::runtime(BadCall, line))
                } else {
                    Ok(Value::Number(n.sqrt()))
                }
            }
            "SIN" => Ok(Value::Number(arg_num(args, 0).sin())),
            "COS" => Ok(Value::Number(arg_num(args, 0).cos())),
            "TAN" => Ok(Value::Number(arg_num(args, 0).tan())),
            "ATN" => Ok(Value::Number(arg_num(args, 0).atan())),
            "EXP" => Ok(Value::Number(arg_num(args, 0).exp())),
            "LOG" => {
                let n = arg_num(args, 0);
                if n <= 0.0 {
                    Err(InterpreterError::runtime(BadCall, line))
                } else {
                    Ok(Value::Number(n.ln()))
                }
            }
            "RND" => Ok(Value::Number(self.env.next_random())),
            "CINT" | "CLNG" => Ok(Value::Number(arg_num(args, 0).round())),
            "CSNG" | "CDBL" => Ok(Value::Number(arg_num(args, 0))),
            "STR" => Ok(Value::Text(str_dollar(arg_num(args, 0)))),
            "VAL" => Ok(Value::Number(parse_val(arg_text(args, 0)).unwrap_or(0.0))),
            "LEN" => Ok(Value::Number(arg_text(args, 0).len() as f64)),
            "LEFT" => {
                let s = arg_text(args, 0);
                let n = (arg_num(args, 1).max(0.0)) as usize;
                Ok(Value::Text(s.chars().take(n).collect()))
            }
            "RIGHT" => {
                let s = arg_text(args, 0);
                let n = (arg_num(args, 1).max(0.0)) as usize;
                let len = s.chars().count();
                let skip = len.saturating_sub(n);
                Ok(Value::Text(s.chars().skip(skip).collect()))
            }
            "MID" => {
                let s = arg_text(args, 0);
                let start = (arg_num(args, 1).max(1.0)) as usize - 1;
                let chars: Vec<char> = s.chars().collect();
                if start >= chars.len() {
                    return Ok(Value::empty_text());
                }
                let take = args
                    .get(2)
                    .and_then(Value::as_number)
                    .map(|n| n.max(0.0) as usize)
                    .unwrap_or(chars.len() - start);
                Ok(Value::Text(chars[start..].iter().take(take).collect()))
            }
            "CHR" => {
                let code = arg_num(args, 0) as u32;
                let ch = char::from_u32(code).unwrap_or('\u{FFFD}');
                Ok(Value::Text(ch.to_string()))
            }
            "ASC" => {
                let s = arg_text(args, 0);
                match s.chars().next() {
                    Some(c) => Ok(Value::Number(c as u32 as f64)),
                    None => Err(InterpreterError::runtime(BadCall, line)),
                }
            }
            "SPACE" => Ok(Value::Text(" ".repeat(arg_num(args, 0).max(0.0) as usize))),
            "STRING" => {
                let n = arg_num(args, 0).max(0.0) as usize;
                let ch = match args.get(1) {
                    Some(Value::Text(s)) => s.chars().next().unwrap_or(' '),
                    Some(Value::Number(code)) => char::from_u32(*code as u32).unwrap_or(' '),
                    None => ' ',
                };
                Ok(Value::Text(ch.to_string().repeat(n)))
            }
            "INSTR" => {
                let (hay_idx, needle_idx, start) = if args.len() >= 3 && !args[0].is_text() {
                    (1, 2, arg_num(args, 0).max(1.0) as usize - 1)
                } else {
                    (0, 1, 0)
                };
                let hay = arg_text(args, hay_idx);
                let needle = arg_text(args, needle_idx);
                let chars: Vec<char> = hay.chars().collect();
                if start > chars.len() {
                    return Ok(Value::Number(0.0));
                }
                let haystack: String = chars[start..].iter().collect();
                match haystack.find(needle) {
                    Some(byte_pos) => {
                        let char_pos = haystack[..byte_pos].chars().count();
                        Ok(Value::Number((start + char_pos + 1) as f64))
                    }
                    None => Ok(Value::Number(0.0)),
                }
            }
            "UCASE" => Ok(Value::Text(arg_text(args, 0).to_uppercase())),
            "LCASE" => Ok(Value::Text(arg_text(args, 0).to_lowercase())),
            "LTRIM" => Ok(Value::Text(arg_text(args, 0).trim_start().to_string())),
            "RTRIM" => Ok(Value::Text(arg_text(args, 0).trim_end().to_string())),
            "TIMER" => {
                let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
                let midnight = now.as_secs() % 86_400;
                Ok(Value::Number(midnight as f64 + now.subsec_millis() as f64 / 1000.0))
            }
            "INKEY" => Ok(Value::Text(self.console.read_key())),
            "CSRLIN" => Ok(Value::Number(self.env.graphics.cursor().0 as f64 + 1.0)),
            "POS" => Ok(Value::Number(self.env.print_column as f64 + 1.0)),
            "ERR" => Ok(Value::Number(self.env.error.last_error_code as f64)),
            "ERL" => Ok(Value::Number(self.env.error.last_error_line as f64)),
            "FRE" => Ok(Value::Number(1_000_000.0)),
            "INPUT" => {
                let n = arg_num(args, 0).max(0.0) as usize;
                let mut out = String::with_capacity(n);
                for _ in 0..n {
                    loop {
                        let k = self.console.read_key();
                        if !k.is_empty() {
                            out.push_str(&k);
                            break;
                        }
                    }
                }
                Ok(Value::Text(out))
            }
            "EOF" => {
                let n = arg_num(args, 0) as u32;
                self.env
                    .files
                    .eof(n)
                    .map(|b| Value::Number(if b { -1.0 } else { 0.0 }))
                    .map_err(|e| crate::dispatch::io::files_err(e, line))
            }
            "LOF" => {
                let n = arg_num(args, 0) as u32;
                self.env
                    .files
                    .lof(n)
                    .map(|v| Value::Number(v as f64))
                    .map_err(|e| crate::dispatch::io::files_err(e, line))
            }
            "LOC" => {
                let n = arg_num(args, 0) as u32;
                self.env
                    .files
                    .loc(n)
                    .map(|v| Value::Number(v as f64))
                    .map_err(|e| crate::dispatch::io::files_err(e, line))
            }
            "PEEK" => Ok(Value::Number(0.0)),
            "POINT" => {
                let (x, y) = (arg_num(args, 0) as i32, arg_num(args, 1) as i32);
                let bgra = self.env.graphics.active_page().get_pixel(x, y);
                Ok(Value::Number(u32::from_le_bytes(bgra) as f64))
            }
            "RGB" => Ok(Value::Number(rgb(
                arg_num(args, 0) as u8,
                arg_num(args, 1) as u8,
                arg_num(args, 2) as u8,
            ) as f64)),
            "HEX" => {
                let bits = integer_bits(arg_num(args, 0));
                Ok(Value::Text(format!("{bits:X}")))
            }
            "OCT" => {
                let bits = integer_bits(arg_num(args, 0));
                Ok(Value::Text(format!("{bits:o}")))
            }
            "MKI" => {
                let n = arg_num(args, 0).trunc() as i16;
                Ok(Value::Text(bytes_to_text(&n.to_le_bytes())))
            }
            "MKS" => {
                let n = arg_num(args, 0) as f32;
                Ok(Value::Text(bytes_to_text(&n.to_le_bytes())))
            }
            "MKD" => {
                let n = arg_num(args, 0);
                Ok(Value::Text(bytes_to_text(&n.to_le_bytes())))
            }
            "CVI" => {
                let bytes = text_to_bytes(arg_text(args, 0));
                if bytes.len() < 2 {
                    return Err(InterpreterError::runtime(BadCall, line));
                }
                Ok(Value::Number(i16::from_le_bytes([bytes[0], bytes[1]]) as f64))
            }
            "CVS" => {
                let bytes = text_to_bytes(arg_text(args, 0));
                if bytes.len() < 4 {
                    return Err(InterpreterError::runtime(BadCall, line));
                }
                Ok(Value::Number(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64))
            }
            "CVD" => {
                let bytes = text_to_bytes(arg_text(args, 0));
                if bytes.len() < 8 {
                    return Err(InterpreterError::runtime(BadCall, line));
                }
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&bytes[..8]);
                Ok(Value::Number(f64::from_le_bytes(arr)))
            }
            // Called like a function when a builtin closed-set lookup fires
            // outside an actual `PRINT`/`PRINT USING` item list; `dispatch/io.rs`
            // special-cases the real cursor-column behavior inside `PRINT`.
            "SPC" => Ok(Value::Text(" ".repeat(arg_num(args, 0).max(0.0) as usize))),
            "TAB" => {
                let target_col = (arg_num(args, 0).max(1.0) as usize).saturating_sub(1);
                let current = self.env.print_column;
                let pad = target_col.saturating_sub(current);
                Ok(Value::Text(" ".repeat(pad)))
            }
            _ => Err(InterpreterError::runtime(BadCall, line)),
        }
    }
}
