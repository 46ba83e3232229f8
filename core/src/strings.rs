//! Small string helpers shared by the loaders and panels

use std::path::Path;

use rand::Rng;

const RANDOM_CHARS: &[u8] = b" :-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Replace every occurrence of `search` in place
pub fn replace_char(s: &mut String, search: char, replace: char) {
    if s.contains(search) {
        *s = s.chars().map(|c| if c == search { replace } else { c }).collect();
    }
}

/// Replace non-overlapping occurrences of `search`, scanning left to right
///
/// An empty `search` leaves `s` unchanged.
pub fn replace_str(s: &mut String, search: &str, replace: &str) {
    if search.is_empty() || !s.contains(search) {
        return;
    }
    *s = s.replace(search, replace);
}

/// Split on `delim` the way repeated `getline` does
///
/// A trailing delimiter does not produce an empty final token, and an
/// empty input yields no tokens.
pub fn explode(s: &str, delim: char) -> Vec<String> {
    let mut tokens: Vec<String> = s.split(delim).map(str::to_owned).collect();
    if tokens.last().is_some_and(String::is_empty) {
        tokens.pop();
    }
    tokens
}

pub fn implode<S: AsRef<str>>(elements: &[S], delim: &str) -> String {
    let mut full = String::new();
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            full.push_str(delim);
        }
        full.push_str(element.as_ref());
    }
    full
}

pub fn ltrim(s: &mut String) {
    let start = s.len() - s.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
    s.replace_range(..start, "");
}

pub fn rtrim(s: &mut String) {
    let end = s.trim_end_matches(|c: char| c.is_ascii_whitespace()).len();
    s.truncate(end);
}

pub fn trim(s: &mut String) {
    rtrim(s);
    ltrim(s);
}

pub fn ltrimmed(mut s: String) -> String {
    ltrim(&mut s);
    s
}

pub fn rtrimmed(mut s: String) -> String {
    rtrim(&mut s);
    s
}

pub fn trimmed(mut s: String) -> String {
    trim(&mut s);
    s
}

/// Random string of `len` characters from a space, `:`, `-` and alphanumerics
pub fn gen_random_str(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(RANDOM_CHARS[rng.gen_range(0..RANDOM_CHARS.len())]))
        .collect()
}

/// Size of the file at `path` in bytes, 0 if it cannot be read
pub fn file_size(path: impl AsRef<Path>) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
