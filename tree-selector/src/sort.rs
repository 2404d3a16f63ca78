use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Ordering applied to siblings when the flattened view is rebuilt.
///
/// Every mode is a stable sort: siblings with equal keys keep the order in
/// which the tree enumerates them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Folders first, then natural title order (`file2` before `file10`).
    #[default]
    Natural,
    /// Folders first, then reversed natural title order.
    NaturalDescending,
    /// Keep the order reported by the tree.
    Insertion,
}

impl SortMode {
    /// Compare two siblings described by `(is_folder, name)`.
    pub fn compare(
        self,
        left: (bool, &str),
        right: (bool, &str),
    ) -> Ordering {
        match self {
            SortMode::Insertion => Ordering::Equal,
            SortMode::Natural => folders_first(left.0, right.0)
                .then_with(|| compare_titles(left.1, right.1)),
            SortMode::NaturalDescending => folders_first(left.0, right.0)
                .then_with(|| compare_titles(right.1, left.1)),
        }
    }
}

fn folders_first(left_is_folder: bool, right_is_folder: bool) -> Ordering {
    (!left_is_folder).cmp(&!right_is_folder)
}

/// Natural title comparison.
///
/// Digit runs compare by numeric value (leading zeros only break ties),
/// text runs compare case-insensitively with a case-sensitive tiebreak, and
/// a digit run sorts before a text run at the same position.
pub fn compare_titles(left: &str, right: &str) -> Ordering {
    let mut left_chunks = Chunks::new(left);
    let mut right_chunks = Chunks::new(right);

    loop {
        let ord = match (left_chunks.next(), right_chunks.next()) {
            (Some(Chunk::Digits(l)), Some(Chunk::Digits(r))) => {
                compare_digits(l, r)
            },
            (Some(Chunk::Text(l)), Some(Chunk::Text(r))) => compare_text(l, r),
            (Some(Chunk::Digits(_)), Some(Chunk::Text(_))) => Ordering::Less,
            (Some(Chunk::Text(_)), Some(Chunk::Digits(_))) => {
                Ordering::Greater
            },
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => return left.cmp(right),
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Text(&'a str),
    Digits(&'a str),
}

/// Splits a title into alternating runs of ASCII digits and other text.
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let split = self
            .rest
            .char_indices()
            .find(|(_, ch)| ch.is_ascii_digit() != digits)
            .map(|(index, _)| index)
            .unwrap_or(self.rest.len());

        let (chunk, rest) = self.rest.split_at(split);
        self.rest = rest;
        Some(if digits {
            Chunk::Digits(chunk)
        } else {
            Chunk::Text(chunk)
        })
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    let left_fold = left.chars().flat_map(char::to_lowercase);
    let right_fold = right.chars().flat_map(char::to_lowercase);
    left_fold.cmp(right_fold).then_with(|| left.cmp(right))
}

fn compare_digits(left: &str, right: &str) -> Ordering {
    let left_value = strip_zeros(left);
    let right_value = strip_zeros(right);

    left_value
        .len()
        .cmp(&right_value.len())
        .then_with(|| left_value.cmp(right_value))
        .then_with(|| left.len().cmp(&right.len()))
}

fn strip_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() { "0" } else { trimmed }
}
