//! Brace expansion: a purely textual preprocessing pass applied
//! before lexing (spec §4.1).
//!
//! `expand` scans the input maintaining quote and backslash state so
//! that brace groups inside `'...'`/`"..."` or following a backslash
//! are left untouched, exactly as bash treats them.

use thiserror::Error;

/// The default cap on how many strings a single expansion may
/// produce before it is rejected (spec §4.1).
pub const DEFAULT_ITEM_LIMIT: usize = 65_536;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("brace expansion would produce more than {limit} items")]
pub struct BraceExpansionError {
    pub limit: usize,
}

/// Expands `line` into the sequence of strings bash-compatible brace
/// expansion would produce. On success, the result always has at
/// least one element (the identity expansion when there is nothing to
/// expand). On failure (item limit exceeded), the caller is expected
/// to fall back to the unexpanded line (spec §4.1).
pub fn expand(line: &str) -> Result<Vec<String>, BraceExpansionError> {
    expand_with_limit(line, DEFAULT_ITEM_LIMIT)
}

pub fn expand_with_limit(line: &str, limit: usize) -> Result<Vec<String>, BraceExpansionError> {
    let chars: Vec<char> = line.chars().collect();
    expand_chars(&chars, limit)
}

fn expand_chars(chars: &[char], limit: usize) -> Result<Vec<String>, BraceExpansionError> {
    // Find the first unquoted, unescaped top-level `{` that opens a
    // genuine brace group (one with a top-level comma or a valid
    // `a..b` sequence form); everything before it is a literal
    // prefix shared by every expansion.
    let mut i = 0;
    let mut quote: Option<char> = None;
    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) => {
                if c == '\\' && q == '"' && i + 1 < chars.len() {
                    i += 2;
                    continue;
                }
                if c == q {
                    quote = None;
                }
                i += 1;
            }
            None => {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == '\'' || c == '"' {
                    quote = Some(c);
                    i += 1;
                    continue;
                }
                if c == '{' {
                    if let Some((items, after)) = try_parse_group(chars, i, limit)? {
                        let prefix: String = chars[..i].iter().collect();
                        let suffix_exp = expand_chars(&chars[after..], limit)?;
                        let mut total: usize = 0;
                        let mut result = Vec::new();
                        for item in &items {
                            for suffix in &suffix_exp {
                                total += 1;
                                if total > limit {
                                    return Err(BraceExpansionError { limit });
                                }
                                result.push(format!("{prefix}{item}{suffix}"));
                            }
                        }
                        return Ok(result);
                    }
                }
                i += 1;
            }
        }
    }
    Ok(vec![chars.iter().collect()])
}

/// If a balanced, genuinely-expanding brace group starts at `open`
/// (which must point at `{`), returns the list of its expansions and
/// the index just past the matching `}`. Returns `Ok(None)` if the
/// group at `open` is not an expansion (unbalanced, or a literal
/// singleton / non-sequence group, per spec §4.1 tie-breaks).
fn try_parse_group(
    chars: &[char],
    open: usize,
    limit: usize,
) -> Result<Option<(Vec<String>, usize)>, BraceExpansionError> {
    let close = match find_matching_brace(chars, open) {
        Some(c) => c,
        None => return Ok(None),
    };
    let inner = &chars[open + 1..close];
    let after = close + 1;

    if let Some(items) = try_sequence(inner) {
        let total = items.len();
        if total > limit {
            return Err(BraceExpansionError { limit });
        }
        return Ok(Some((items, after)));
    }

    let segments = split_top_level_commas(inner);
    if segments.len() < 2 {
        // `{x}` or a comma-less, non-sequence group: literal, not an
        // expansion.
        return Ok(None);
    }

    let mut items = Vec::new();
    for seg in segments {
        let expansions = expand_chars(seg, limit)?;
        for e in expansions {
            items.push(e);
            if items.len() > limit {
                return Err(BraceExpansionError { limit });
            }
        }
    }
    Ok(Some((items, after)))
}

/// Finds the index of the `}` matching the `{` at `open`, respecting
/// nested braces, quoting and escapes.
fn find_matching_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = open;
    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) => {
                if c == '\\' && q == '"' {
                    i += 2;
                    continue;
                }
                if c == q {
                    quote = None;
                }
                i += 1;
            }
            None => {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == '\'' || c == '"' {
                    quote = Some(c);
                    i += 1;
                    continue;
                }
                if c == '{' {
                    depth += 1;
                    i += 1;
                } else if c == '}' {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                    i += 1;
                } else {
                    i += 1;
                }
            }
        }
    }
    None
}

/// Splits `inner` on top-level (depth-0, unquoted) commas.
fn split_top_level_commas(inner: &[char]) -> Vec<&[char]> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    let mut i = 0usize;
    while i < inner.len() {
        let c = inner[i];
        match quote {
            Some(q) => {
                if c == '\\' && q == '"' {
                    i += 2;
                    continue;
                }
                if c == q {
                    quote = None;
                }
                i += 1;
            }
            None => match c {
                '\\' => i += 2,
                '\'' | '"' => {
                    quote = Some(c);
                    i += 1;
                }
                '{' => {
                    depth += 1;
                    i += 1;
                }
                '}' => {
                    depth -= 1;
                    i += 1;
                }
                ',' if depth == 0 => {
                    segments.push(&inner[start..i]);
                    i += 1;
                    start = i;
                }
                _ => i += 1,
            },
        }
    }
    segments.push(&inner[start..]);
    segments
}

/// Recognizes `start..end[..step]` sequence forms, per the tie-break
/// rules in spec §4.1: both endpoints must parse as integers, or both
/// must be single characters.
fn try_sequence(inner: &[char]) -> Option<Vec<String>> {
    let s: String = inner.iter().collect();
    let parts: Vec<&str> = s.split("..").collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    let step: Option<i64> = if parts.len() == 3 {
        Some(parts[2].parse().ok()?)
    } else {
        None
    };

    if let (Ok(start), Ok(end)) = (parts[0].parse::<i64>(), parts[1].parse::<i64>()) {
        let width = if (parts[0].starts_with('0') || parts[0].starts_with("-0")) && parts[0].len() > 1 {
            Some(parts[0].trim_start_matches('-').len())
        } else {
            None
        };
        return Some(integer_sequence(start, end, step, width));
    }

    let mut cs0 = parts[0].chars();
    let mut cs1 = parts[1].chars();
    if let (Some(c0), None, Some(c1), None) = (cs0.next(), cs0.next(), cs1.next(), cs1.next()) {
        return Some(char_sequence(c0, c1, step));
    }
    None
}

fn integer_sequence(start: i64, end: i64, step: Option<i64>, width: Option<usize>) -> Vec<String> {
    let mut step = step.unwrap_or(1).abs().max(1);
    if start > end {
        step = -step;
    }
    let mut items = Vec::new();
    let mut cur = start;
    loop {
        let formatted = match width {
            Some(w) if cur.unsigned_abs().to_string().len() < w => {
                let sign = if cur < 0 { "-" } else { "" };
                format!("{sign}{:0width$}", cur.unsigned_abs(), width = w)
            }
            _ => cur.to_string(),
        };
        items.push(formatted);
        if cur == end {
            break;
        }
        let next = cur + step;
        if (step > 0 && next > end) || (step < 0 && next < end) {
            break;
        }
        cur = next;
    }
    items
}

fn char_sequence(start: char, end: char, step: Option<i64>) -> Vec<String> {
    let mut step = step.unwrap_or(1).abs().max(1);
    let start_u = start as i64;
    let end_u = end as i64;
    if start_u > end_u {
        step = -step;
    }
    let mut items = Vec::new();
    let mut cur = start_u;
    loop {
        if let Some(c) = char::from_u32(cur as u32) {
            items.push(c.to_string());
        }
        if cur == end_u {
            break;
        }
        let next = cur + step;
        if (step > 0 && next > end_u) || (step < 0 && next < end_u) {
            break;
        }
        cur = next;
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_on_strings_with_no_braces() {
        assert_eq!(expand("echo hello world").unwrap(), vec!["echo hello world"]);
    }

    #[test]
    fn comma_list_expands() {
        assert_eq!(
            expand("file{a,b,c}.txt").unwrap(),
            vec!["filea.txt", "fileb.txt", "filec.txt"]
        );
    }

    #[test]
    fn integer_sequence_expands() {
        assert_eq!(expand("{1..3}").unwrap(), vec!["1", "2", "3"]);
    }

    #[test]
    fn integer_sequence_with_step() {
        assert_eq!(expand("{1..10..3}").unwrap(), vec!["1", "4", "7", "10"]);
    }

    #[test]
    fn char_sequence_expands() {
        assert_eq!(expand("{a..e}").unwrap(), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn single_element_group_is_literal() {
        assert_eq!(expand("{x}").unwrap(), vec!["{x}"]);
    }

    #[test]
    fn quoted_braces_are_untouched() {
        assert_eq!(expand("echo '{a,b}'").unwrap(), vec!["echo '{a,b}'"]);
        assert_eq!(expand(r#"echo \{a,b\}"#).unwrap(), vec![r#"echo \{a,b\}"#]);
    }

    #[test]
    fn nested_groups_expand_cartesian() {
        let mut got = expand("{a,b}{1,2}").unwrap();
        got.sort();
        let mut want = vec!["a1", "a2", "b1", "b2"];
        want.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn item_limit_is_enforced() {
        let err = expand_with_limit("{1..1000}", 10).unwrap_err();
        assert_eq!(err.limit, 10);
    }
}
