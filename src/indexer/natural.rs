//! Ordering of course titles.
//!
//! Titles starting with a number ("1 - Intro", "02 Setup", "10 - Wrap-up") come first,
//! ascending by that number. Everything else follows. Ties are broken by a
//! case- and accent-insensitive comparison that treats embedded digit runs as numbers,
//! so "Lesson 2" sorts before "Lesson 10".

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Total order used for siblings in the course tree and for the courses themselves.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    let by_prefix = match (leading_digits(a), leading_digits(b)) {
        (Some(x), Some(y)) => cmp_digit_runs(x.as_bytes(), y.as_bytes()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_prefix.then_with(|| natural_cmp(a, b)).then_with(|| a.cmp(b))
}

/// Leading run of ASCII digits, if any.
pub fn leading_digits(title: &str) -> Option<&str> {
    let end = title.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        None
    } else {
        Some(&title[..end])
    }
}

/// Case-insensitive, accent-insensitive comparison with numeric digit runs.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = fold(a);
    let b = fold(b);
    let (mut i, mut j) = (0usize, 0usize);

    while i < a.len() && j < b.len() {
        let (ca, cb) = (a[i], b[j]);
        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let si = i;
            while i < a.len() && a[i].is_ascii_digit() {
                i += 1;
            }
            let sj = j;
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }
            let ord = cmp_digit_runs(&ascii_bytes(&a[si..i]), &ascii_bytes(&b[sj..j]));
            if ord != Ordering::Equal {
                return ord;
            }
            continue;
        }

        let ord = char_class(ca).cmp(&char_class(cb)).then(ca.cmp(&cb));
        if ord != Ordering::Equal {
            return ord;
        }
        i += 1;
        j += 1;
    }

    (a.len() - i).cmp(&(b.len() - j))
}

// Zahlen beliebiger Länge: führende Nullen ignorieren, dann Länge, dann Ziffern.
fn cmp_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a = strip_zeros(a);
    let b = strip_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn strip_zeros(run: &[u8]) -> &[u8] {
    let zeros = run.iter().take_while(|&&c| c == b'0').count();
    &run[zeros..]
}

fn ascii_bytes(run: &[char]) -> Vec<u8> {
    run.iter().map(|&c| c as u8).collect()
}

fn fold(s: &str) -> Vec<char> {
    s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

/// Whitespace and punctuation < digits < letters.
fn char_class(c: char) -> u8 {
    if c.is_ascii_digit() {
        1
    } else if c.is_alphanumeric() {
        2
    } else {
        0
    }
}
