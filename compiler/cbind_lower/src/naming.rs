//! Identifier word-splitting and casing.
//!
//! A word is a maximal run of uppercase letters and digits, a capitalized
//! run, or a run of lowercase letters and digits. A word must end at an
//! uppercase letter, an underscore, or the end of the name; underscores
//! themselves are separators and never part of a word.

/// Split `name` into words.
///
/// `"AV_PIX_FMT_YUV420P"` → `["AV", "PIX", "FMT", "YUV420P"]`,
/// `"AVFrame"` → `["AV", "Frame"]`, `"myValue2"` → `["my", "Value2"]`.
pub fn split_words(name: &str) -> Vec<&str> {
    let bytes = name.as_bytes();
    let mut words = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        match word_at(bytes, pos) {
            Some(end) => {
                words.push(&name[pos..end]);
                pos = end;
            }
            None => pos += 1,
        }
    }
    words
}

fn is_upper_or_digit(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit()
}

fn is_lower_or_digit(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit()
}

/// End of the word starting at `start`, trying the uppercase run, the
/// capitalized run and the lowercase run in that order. Each run is tried
/// longest first and shrunk until it ends on a word boundary.
fn word_at(bytes: &[u8], start: usize) -> Option<usize> {
    let boundary = |end: usize| match bytes.get(end) {
        None => true,
        Some(&b) => b.is_ascii_uppercase() || b == b'_',
    };
    let run = |from: usize, pred: fn(u8) -> bool| {
        from + bytes[from..].iter().take_while(|&&b| pred(b)).count()
    };
    let longest = |end: usize| ((start + 1)..=end).rev().find(|&e| boundary(e));

    let first = bytes[start];
    if is_upper_or_digit(first) {
        if let Some(end) = longest(run(start + 1, is_upper_or_digit)) {
            return Some(end);
        }
    }
    if first.is_ascii_uppercase() {
        if let Some(end) = longest(run(start + 1, is_lower_or_digit)) {
            return Some(end);
        }
    }
    if is_lower_or_digit(first) {
        if let Some(end) = longest(run(start + 1, is_lower_or_digit)) {
            return Some(end);
        }
    }
    None
}

/// First character uppercased, the rest lowercased.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Join `words` in camel form.
pub fn camel_join<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    words.into_iter().map(capitalize).collect()
}

/// `"time_base"` → `"TimeBase"`, `"AVFrame"` → `"AvFrame"`.
pub fn to_camel(name: &str) -> String {
    camel_join(split_words(name))
}

/// Whether an enum name reads as a set of bit flags.
///
/// Ignoring trailing digits, the name ends in `flag`, `flags`, `FLAG` or
/// `FLAGS` after an underscore, or in `Flag` or `Flags` after an
/// underscore, a lowercase letter or a digit.
pub fn is_flags_name(name: &str) -> bool {
    let trimmed = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let preceded_by = |suffix: &str, ok: fn(u8) -> bool| {
        trimmed
            .strip_suffix(suffix)
            .and_then(|head| head.as_bytes().last().copied())
            .is_some_and(ok)
    };
    let underscore = |b: u8| b == b'_';
    let camel_boundary = |b: u8| b == b'_' || b.is_ascii_lowercase() || b.is_ascii_digit();

    ["flags", "flag", "FLAGS", "FLAG"]
        .into_iter()
        .any(|suffix| preceded_by(suffix, underscore))
        || ["Flags", "Flag"]
            .into_iter()
            .any(|suffix| preceded_by(suffix, camel_boundary))
}

/// Number of leading words shared by every entry of `split`, capped so
/// every entry keeps at least one word.
pub fn common_prefix_len(split: &[Vec<&str>]) -> usize {
    let Some((first, rest)) = split.split_first() else {
        return 0;
    };
    let shortest = split.iter().map(Vec::len).min().unwrap_or(0);
    let mut count = 0;
    while count + 1 < shortest && rest.iter().all(|words| words[count] == first[count]) {
        count += 1;
    }
    count
}
