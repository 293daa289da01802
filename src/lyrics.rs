// lyrics verses
use std::ops::Range;

use thiserror::Error;

/// Verses are separated by a blank line.
pub const VERSE_DELIMITER: &str = "\n\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerseError {
    #[error("verse {start} is out of range, song has {total} verses")]
    OutOfRange { start: usize, total: usize },

    #[error("invalid verse range: start {start} is after end {end}")]
    InvalidRange { start: usize, end: usize },

    #[error("page {page} is out of range, song has {total} verses")]
    PageOutOfRange { page: usize, total: usize },

    #[error("page and limit must be at least 1")]
    InvalidPage,
}

/// Split lyrics into verses. Surrounding whitespace is trimmed first, so
/// empty lyrics yield a single empty verse.
pub fn split_verses(lyrics: &str) -> Vec<&str> {
    lyrics.trim().split(VERSE_DELIMITER).collect()
}

pub fn join_verses<S: AsRef<str>>(verses: &[S]) -> String {
    verses
        .iter()
        .map(|verse| verse.as_ref())
        .collect::<Vec<_>>()
        .join(VERSE_DELIMITER)
}

/// Resolve a 1-based inclusive verse range into slice indices.
/// `end == 0` or an end past the last verse means "to the end".
pub fn range_bounds(total: usize, start: usize, end: usize) -> Result<Range<usize>, VerseError> {
    if start < 1 || start > total {
        return Err(VerseError::OutOfRange { start, total });
    }
    let end = if end == 0 || end > total { total } else { end };
    if start > end {
        return Err(VerseError::InvalidRange { start, end });
    }
    Ok(start - 1..end)
}

pub fn select_range<S: AsRef<str>>(
    verses: &[S],
    start: usize,
    end: usize,
) -> Result<String, VerseError> {
    let bounds = range_bounds(verses.len(), start, end)?;
    Ok(join_verses(&verses[bounds]))
}

/// Slice indices of verse page `page` (1-based) holding `limit` verses.
pub fn page_bounds(total: usize, page: usize, limit: usize) -> Result<Range<usize>, VerseError> {
    if page < 1 || limit < 1 {
        return Err(VerseError::InvalidPage);
    }
    let start = (page - 1)
        .checked_mul(limit)
        .ok_or(VerseError::PageOutOfRange { page, total })?;
    if start >= total {
        return Err(VerseError::PageOutOfRange { page, total });
    }
    let end = start.saturating_add(limit).min(total);
    Ok(start..end)
}

pub fn select_page<S>(verses: &[S], page: usize, limit: usize) -> Result<&[S], VerseError> {
    let bounds = page_bounds(verses.len(), page, limit)?;
    Ok(&verses[bounds])
}
