//! `PRINT`/`STR$` numeric rendering and the `PRINT USING` format-specifier
//! mini-language (spec.md §4.F "Print", §8 testable scenarios).

pub use crate::builtins::{format_number_body, str_dollar};

/// One `PRINT`-item rendering: a leading sign column plus a trailing
/// separator space for numbers, nothing extra for text (spec.md §8, e.g.
/// `PRINT S` with `S=55` renders `" 55 "`).
pub fn format_number_for_print(n: f64) -> String {
    format!("{} ", str_dollar(n))
}

pub fn format_text_for_print(s: &str) -> String {
    s.to_string()
}

/// Column width of a print zone for comma-separated `PRINT` items
/// (spec.md §4.F "Print"): classic 80-column BASIC uses 14-column zones.
pub const PRINT_ZONE_WIDTH: usize = 14;

pub fn next_zone_column(current: usize) -> usize {
    (current / PRINT_ZONE_WIDTH + 1) * PRINT_ZONE_WIDTH
}

/// Where a `+`/`-` sign specifier places its character (spec.md §4.F
/// format-specifier list): absent, forced at the front (`+###.##`), or
/// trailing, either minus-only (`###.##-`) or always-signed (`###.##+`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    None,
    Leading,
    TrailingMinus,
    TrailingSigned,
}

enum FieldSpec {
    Literal(String),
    Numeric {
        before: usize,
        after: usize,
        dollar: bool,
        comma: bool,
        fill_asterisk: bool,
        sign: Sign,
    },
    StringField(usize),
    StringFirst,
    /// `&` — the entire string argument, unpadded (spec.md §4.F).
    StringWhole,
}

/// Consumes a `#`/`.`/`,` run starting at `i`, returning (before-digits,
/// after-digits, comma-grouped, index just past the run).
fn scan_digit_run(chars: &[char], mut i: usize) -> (usize, usize, bool, usize) {
    let mut before = 0usize;
    let mut after = 0usize;
    let mut seen_dot = false;
    let mut comma = false;
    while i < chars.len() && (chars[i] == '#' || chars[i] == '.' || chars[i] == ',') {
        match chars[i] {
            '#' if !seen_dot => before += 1,
            '#' => after += 1,
            '.' => seen_dot = true,
            ',' => comma = true,
            _ => {}
        }
        i += 1;
    }
    (before, after, comma, i)
}

/// Trailing `+`/`-` right after a digit run, if present.
fn scan_trailing_sign(chars: &[char], mut i: usize) -> (Sign, usize) {
    match chars.get(i) {
        Some('+') => {
            i += 1;
            (Sign::TrailingSigned, i)
        }
        Some('-') => {
            i += 1;
            (Sign::TrailingMinus, i)
        }
        _ => (Sign::None, i),
    }
}

fn parse_format(fmt: &str) -> Vec<FieldSpec> {
    let chars: Vec<char> = fmt.chars().collect();
    let mut fields = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            // Leading sign: `+` immediately before a (possibly `**`/`$`
            // decorated) numeric field.
            '+' if chars.get(i + 1).is_some_and(|c| matches!(c, '#' | '$' | '*')) => {
                i += 1;
                let fill_asterisk = chars.get(i) == Some(&'*') && chars.get(i + 1) == Some(&'*');
                if fill_asterisk {
                    i += 2;
                }
                let dollar = chars.get(i) == Some(&'$');
                if dollar {
                    i += 1;
                }
                let (before, after, comma, next) = scan_digit_run(&chars, i);
                i = next;
                fields.push(FieldSpec::Numeric { before, after, dollar, comma, fill_asterisk, sign: Sign::Leading });
            }
            // `**` fill: the two stars themselves reserve two leading digit
            // positions, asterisk-filled instead of blank-filled when unused
            // (e.g. check-protect amounts).
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                let dollar = chars.get(i) == Some(&'$');
                if dollar {
                    i += 1;
                }
                let (before, after, comma, next) = scan_digit_run(&chars, i);
                i = next;
                let (sign, next) = scan_trailing_sign(&chars, i);
                i = next;
                fields.push(FieldSpec::Numeric { before: before + 2, after, dollar, comma, fill_asterisk: true, sign });
            }
            '#' => {
                let start = i;
                let (before, after, comma, next) = scan_digit_run(&chars, i);
                i = next;
                let dollar = start > 0 && chars[start - 1] == '$';
                let (sign, next) = scan_trailing_sign(&chars, i);
                i = next;
                fields.push(FieldSpec::Numeric { before, after, dollar, comma, fill_asterisk: false, sign });
            }
            '\\' => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i] != '\\' {
                    i += 1;
                }
                let inner_spaces = i.saturating_sub(start + 1);
                i += 1;
                fields.push(FieldSpec::StringField(inner_spaces + 2));
            }
            '!' => {
                fields.push(FieldSpec::StringFirst);
                i += 1;
            }
            '&' => {
                fields.push(FieldSpec::StringWhole);
                i += 1;
            }
            '$' if chars.get(i + 1) == Some(&'#') => {
                // consumed as part of the numeric field lookahead above.
                i += 1;
            }
            other => {
                fields.push(FieldSpec::Literal(other.to_string()));
                i += 1;
            }
        }
    }
    fields
}

#[allow(clippy::too_many_arguments)]
fn format_numeric(n: f64, before: usize, after: usize, comma: bool, dollar: bool, fill_asterisk: bool, sign: Sign) -> String {
    let negative = n < 0.0;
    let scaled = (n.abs() * 10f64.powi(after as i32)).round() / 10f64.powi(after as i32);
    let int_part = scaled.trunc() as i64;
    let frac_part = ((scaled.fract()) * 10f64.powi(after as i32)).abs().round() as i64;
    let mut int_str = int_part.to_string();
    if comma {
        int_str = group_thousands(&int_str);
    }
    let mut body = if after > 0 {
        format!("{int_str}.{frac_part:0width$}", width = after)
    } else {
        int_str
    };
    let width = before + if after > 0 { after + 1 } else { 0 };
    let fill = if fill_asterisk { '*' } else { ' ' };
    if body.len() < width {
        body = format!("{}{}", fill.to_string().repeat(width - body.len()), body);
    }
    let leading_sign = match sign {
        Sign::Leading => {
            if negative {
                "-"
            } else {
                "+"
            }
        }
        Sign::TrailingMinus | Sign::TrailingSigned => "",
        Sign::None => {
            if negative {
                "-"
            } else {
                ""
            }
        }
    };
    let trailing_sign = match sign {
        Sign::TrailingSigned => {
            if negative {
                "-"
            } else {
                "+"
            }
        }
        Sign::TrailingMinus => {
            if negative {
                "-"
            } else {
                " "
            }
        }
        _ => "",
    };
    let prefix = if dollar { "$" } else { "" };
    format!("{prefix}{leading_sign}{body}{trailing_sign}")
}

fn group_thousands(digits: &str) -> String {
    let bytes: Vec<char> = digits.chars().collect();
    let mut out = String::new();
    for (i, c) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}

/// `PRINT USING fmt; items...` (spec.md §4.F, out-of-scope macro languages
/// excepted). Recycles the format string across extra items, matching
/// classic BASIC's behavior when more items are supplied than fields.
pub fn apply_print_using(fmt: &str, items: &[basic_ast::Value]) -> String {
    let fields = parse_format(fmt);
    if fields.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    let mut item_idx = 0;
    while item_idx < items.len() {
        for field in &fields {
            match field {
                FieldSpec::Literal(s) => out.push_str(s),
                FieldSpec::Numeric { before, after, dollar, comma, fill_asterisk, sign } => {
                    let n = items.get(item_idx).and_then(|v| v.as_number()).unwrap_or(0.0);
                    out.push_str(&format_numeric(n, *before, *after, *comma, *dollar, *fill_asterisk, *sign));
                    item_idx += 1;
                }
                FieldSpec::StringWhole => {
                    let text = match items.get(item_idx) {
                        Some(basic_ast::Value::Text(s)) => s.clone(),
                        _ => String::new(),
                    };
                    out.push_str(&text);
                    item_idx += 1;
                }
                FieldSpec::StringField(width) => {
                    let text = match items.get(item_idx) {
                        Some(basic_ast::Value::Text(s)) => s.clone(),
                        _ => String::new(),
                    };
                    let mut cell: String = text.chars().take(*width).collect();
                    while cell.len() < *width {
                        cell.push(' ');
                    }
                    out.push_str(&cell);
                    item_idx += 1;
                }
                FieldSpec::StringFirst => {
                    let ch = match items.get(item_idx) {
                        Some(basic_ast::Value::Text(s)) => s.chars().next().unwrap_or(' '),
                        _ => ' ',
                    };
                    out.push(ch);
                    item_idx += 1;
                }
            }
            if item_idx >= items.len() {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_number_gets_leading_and_trailing_space() {
        assert_eq!(format_number_for_print(55.0), " 55 ");
    }

    #[test]
    fn negative_number_has_no_leading_space() {
        assert_eq!(format_number_for_print(-5.0), "-5 ");
    }

    #[test]
    fn numeric_using_field_pads_and_rounds() {
        let s = apply_print_using("###.##", &[basic_ast::Value::Number(3.14159)]);
        assert_eq!(s, " 3.14");
    }

    #[test]
    fn string_field_pads_to_width() {
        let s = apply_print_using("\\  \\", &[basic_ast::Value::Text("HI".into())]);
        assert_eq!(s, "HI  ");
    }

    #[test]
    fn ampersand_field_prints_whole_string_unpadded() {
        let s = apply_print_using("&", &[basic_ast::Value::Text("Hello, world!".into())]);
        assert_eq!(s, "Hello, world!");
    }

    #[test]
    fn asterisk_fill_pads_with_stars() {
        let s = apply_print_using("**#.##", &[basic_ast::Value::Number(5.5)]);
        assert_eq!(s, "**5.50");
    }

    #[test]
    fn asterisk_fill_without_fraction_pads_whole_field() {
        let s = apply_print_using("**##", &[basic_ast::Value::Number(3.0)]);
        assert_eq!(s, "***3");
    }

    #[test]
    fn leading_sign_shows_plus_for_positive() {
        let s = apply_print_using("+#.##", &[basic_ast::Value::Number(5.0)]);
        assert_eq!(s, "+5.00");
    }

    #[test]
    fn leading_sign_shows_minus_for_negative() {
        let s = apply_print_using("+#.##", &[basic_ast::Value::Number(-5.0)]);
        assert_eq!(s, "-5.00");
    }

    #[test]
    fn trailing_sign_places_sign_after_number() {
        let s = apply_print_using("#.##-", &[basic_ast::Value::Number(-5.0)]);
        assert_eq!(s, "5.00-");
        let s = apply_print_using("#.##+", &[basic_ast::Value::Number(5.0)]);
        assert_eq!(s, "5.00+");
    }

    #[test]
    fn multi_field_using_keeps_fields_in_sync() {
        let s = apply_print_using(
            "&  ###.##",
            &[basic_ast::Value::Text("X".into()), basic_ast::Value::Number(1.5)],
        );
        assert_eq!(s, "X    1.50");
    }
}
