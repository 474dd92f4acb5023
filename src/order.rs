//! Chronological renumbering of a working set.
//!
//! Everything here is pure: the caller supplies paths and optional raw
//! timestamps, and gets back the new file name for every input.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::media::dotted_extension;

/// One file of the working set, with whatever date the extractor found.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub original_path: PathBuf,
    /// `YYYY-MM-DD HH:MM:SS`, or `None` when no date is known.
    pub raw_timestamp: Option<String>,
}

impl MediaFile {
    pub fn new(original_path: impl Into<PathBuf>, raw_timestamp: Option<&str>) -> Self {
        Self {
            original_path: original_path.into(),
            raw_timestamp: raw_timestamp.map(str::to_string),
        }
    }
}

/// A raw timestamp plus the occurrence number that makes it unique.
///
/// The first file with a given timestamp gets disambiguator 0 and renders
/// as the bare timestamp; later ones render with the number appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateKey {
    timestamp: String,
    disambiguator: u32,
}

impl DateKey {
    /// Date part of the timestamp, i.e. everything before the first space.
    pub fn calendar_date(&self) -> &str {
        self.timestamp
            .split_whitespace()
            .next()
            .unwrap_or(&self.timestamp)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disambiguator == 0 {
            write!(f, "{}", self.timestamp)
        } else {
            write!(f, "{}{}", self.timestamp, self.disambiguator)
        }
    }
}

impl Ord for DateKey {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.timestamp, &other.timestamp)
            .then_with(|| self.timestamp.cmp(&other.timestamp))
            .then_with(|| self.disambiguator.cmp(&other.disambiguator))
    }
}

impl PartialOrd for DateKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Hand out a key for `raw` that no earlier call with the same `seen` set
/// has produced.
pub fn resolve(raw: &str, seen: &mut HashSet<String>) -> DateKey {
    let mut key = DateKey {
        timestamp: raw.to_string(),
        disambiguator: 0,
    };
    // The rendered form is what must stay unique: "…:001" could in theory
    // be some other file's raw value, so every candidate is re-checked.
    while seen.contains(&key.to_string()) {
        key.disambiguator += 1;
    }
    seen.insert(key.to_string());
    key
}

/// Compare strings treating runs of ASCII digits as numbers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_number(&mut a);
                let right = take_number(&mut b);
                let ord = left
                    .trim_start_matches('0')
                    .len()
                    .cmp(&right.trim_start_matches('0').len())
                    .then_with(|| {
                        left.trim_start_matches('0')
                            .cmp(right.trim_start_matches('0'))
                    });
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

/// Result of ordering: where a file came from and what it is now called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedFile {
    pub original_path: PathBuf,
    pub new_file_name: String,
    /// `None` for files that ended up in the undated group.
    pub date_key: Option<String>,
}

/// Options that shape the generated names.
#[derive(Debug, Clone, Copy)]
pub struct OrderOptions {
    pub sort_by_date: bool,
    pub show_date_in_name: bool,
}

/// Sort and number `files`.
///
/// Dated files come first in key order, numbered from 1 within each
/// calendar date; undated files follow in encounter order, numbered from
/// 1 on their own. When dates are sorted but hidden from the name, the
/// whole output is renumbered 1..n in that same order.
pub fn order(files: &[MediaFile], options: OrderOptions) -> Vec<SequencedFile> {
    let mut seen = HashSet::new();
    let mut dated: Vec<(DateKey, &MediaFile)> = Vec::new();
    let mut undated: Vec<&MediaFile> = Vec::new();

    for file in files {
        match file.raw_timestamp.as_deref() {
            Some(raw) if options.sort_by_date => dated.push((resolve(raw, &mut seen), file)),
            _ => undated.push(file),
        }
    }

    // Keys are unique, so the unstable sort cannot reorder equal entries.
    dated.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let mut out = Vec::with_capacity(files.len());
    let mut current_date: Option<&str> = None;
    let mut seq = 0u32;
    for (key, file) in &dated {
        if current_date != Some(key.calendar_date()) {
            current_date = Some(key.calendar_date());
            seq = 0;
        }
        seq += 1;
        out.push(SequencedFile {
            original_path: file.original_path.clone(),
            new_file_name: dated_name(key.calendar_date(), seq, file),
            date_key: Some(key.to_string()),
        });
    }

    for (i, file) in undated.iter().enumerate() {
        out.push(SequencedFile {
            original_path: file.original_path.clone(),
            new_file_name: plain_name(i as u32 + 1, file),
            date_key: None,
        });
    }

    if options.sort_by_date && !options.show_date_in_name {
        // Hiding the date also drops the per-day numbering: everything is
        // renumbered in output order, dated and undated alike.
        let in_output_order = dated.iter().map(|(_, file)| *file).chain(undated);
        for (i, (entry, file)) in out.iter_mut().zip(in_output_order).enumerate() {
            entry.new_file_name = plain_name(i as u32 + 1, file);
        }
    }

    out
}

fn dated_name(date: &str, seq: u32, file: &MediaFile) -> String {
    format!("{date} {seq:03}{}", dotted_extension(&file.original_path))
}

fn plain_name(seq: u32, file: &MediaFile) -> String {
    format!("{seq:03}{}", dotted_extension(&file.original_path))
}
