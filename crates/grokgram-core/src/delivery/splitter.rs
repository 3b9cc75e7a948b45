use crate::constants::limits::{MAX_TELEGRAM_MESSAGE_LENGTH, SAFE_SPLIT_LENGTH, SPLIT_MARKER};

/// Result of splitting one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    /// Delivery units, in send order.
    pub units: Vec<String>,
    /// Problems found along the way. Non-fatal; the caller reports them.
    pub warnings: Vec<SplitWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitWarning {
    /// A unit of this chunk was not valid UTF-8 and was dropped. Reported
    /// once per dropped unit.
    InvalidEncoding { chunk: usize },
    /// The chunk had `cuts` windows with no whitespace or `>`, so it was cut
    /// there regardless of markup.
    HardCut { chunk: usize, cuts: usize },
    /// An oversized chunk was divided into `parts` emitted units.
    Oversized { chunk: usize, parts: usize },
}

impl std::fmt::Display for SplitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEncoding { chunk } => {
                write!(f, "Invalid UTF-8 in chunk {chunk}, skipping")
            }
            Self::HardCut { chunk, cuts } => {
                write!(f, "No safe split point in chunk {chunk}, hard cut {cuts} time(s)")
            }
            Self::Oversized { chunk, parts } => {
                write!(f, "Chunk {chunk} split into {parts} sub-chunks due to length")
            }
        }
    }
}

/// Split a response that is already known to be text.
pub fn split_text(text: &str) -> Split {
    split_response(text.as_bytes())
}

/// Split a raw response body into Telegram-sized units.
///
/// The body is first cut on [`SPLIT_MARKER`]; every piece is trimmed and empty
/// pieces disappear. Pieces longer than [`MAX_TELEGRAM_MESSAGE_LENGTH`]
/// codepoints are cut into windows of at most [`SAFE_SPLIT_LENGTH`], preferring
/// a cut before whitespace or right after a `>`. That heuristic does not track
/// tag nesting, so a cut after `>` can still land inside an open element.
///
/// Invalid byte sequences count as one codepoint each. Only the units that
/// contain one are dropped; the rest of the chunk is still delivered.
pub fn split_response(raw: &[u8]) -> Split {
    let mut split = Split::default();

    for (index, piece) in split_bytes(raw, SPLIT_MARKER.as_bytes()).enumerate() {
        let decoded = Decoded::new(piece).trimmed();
        if decoded.chars.is_empty() {
            continue;
        }

        if decoded.chars.len() <= MAX_TELEGRAM_MESSAGE_LENGTH {
            match decoded.unit(0, decoded.chars.len()) {
                Some(unit) => split.units.push(unit),
                None => split.warnings.push(SplitWarning::InvalidEncoding { chunk: index }),
            }
            continue;
        }

        let mut parts = 0;
        let mut hard_cuts = 0;
        for (start, end, hard) in cut_points(&decoded.chars, SAFE_SPLIT_LENGTH) {
            if hard {
                hard_cuts += 1;
            }
            match decoded.unit(start, end) {
                Some(unit) if unit.trim().is_empty() => {}
                Some(unit) => {
                    split.units.push(unit);
                    parts += 1;
                }
                None => split.warnings.push(SplitWarning::InvalidEncoding { chunk: index }),
            }
        }
        if hard_cuts > 0 {
            split.warnings.push(SplitWarning::HardCut {
                chunk: index,
                cuts: hard_cuts,
            });
        }
        split.warnings.push(SplitWarning::Oversized { chunk: index, parts });
    }

    split
}

/// A piece decoded codepoint by codepoint. Each invalid byte sequence becomes
/// one U+FFFD placeholder flagged in `invalid`.
struct Decoded {
    chars: Vec<char>,
    invalid: Vec<bool>,
}

impl Decoded {
    fn new(mut bytes: &[u8]) -> Self {
        let mut decoded = Self {
            chars: Vec::with_capacity(bytes.len()),
            invalid: Vec::with_capacity(bytes.len()),
        };

        loop {
            match std::str::from_utf8(bytes) {
                Ok(valid) => {
                    decoded.push_valid(valid);
                    return decoded;
                }
                Err(e) => {
                    let (valid, rest) = bytes.split_at(e.valid_up_to());
                    decoded.push_valid(std::str::from_utf8(valid).unwrap_or_default());
                    decoded.chars.push(char::REPLACEMENT_CHARACTER);
                    decoded.invalid.push(true);
                    // `None` means the input ended mid-sequence
                    let skip = e.error_len().unwrap_or(rest.len());
                    bytes = &rest[skip..];
                }
            }
        }
    }

    fn push_valid(&mut self, text: &str) {
        for c in text.chars() {
            self.chars.push(c);
            self.invalid.push(false);
        }
    }

    /// Strip surrounding whitespace. Invalid sequences are never whitespace.
    fn trimmed(mut self) -> Self {
        let end = self
            .chars
            .iter()
            .rposition(|c| !c.is_whitespace())
            .map_or(0, |i| i + 1);
        self.chars.truncate(end);
        self.invalid.truncate(end);

        let start = self
            .chars
            .iter()
            .position(|c| !c.is_whitespace())
            .unwrap_or(self.chars.len());
        self.chars.drain(..start);
        self.invalid.drain(..start);
        self
    }

    /// The text of `start..end`, or `None` if it touches an invalid sequence.
    fn unit(&self, start: usize, end: usize) -> Option<String> {
        if self.invalid[start..end].iter().any(|&bad| bad) {
            return None;
        }
        Some(self.chars[start..end].iter().collect())
    }
}

/// Byte-level `str::split`, so invalid UTF-8 in one piece does not spoil the others.
fn split_bytes<'a>(haystack: &'a [u8], marker: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
    let mut rest = Some(haystack);
    std::iter::from_fn(move || {
        let current = rest?;
        match find(current, marker) {
            Some(pos) => {
                rest = Some(&current[pos + marker.len()..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// `(start, end, hard_cut)` codepoint ranges covering `chars` in order.
fn cut_points(chars: &[char], window: usize) -> Vec<(usize, usize, bool)> {
    let mut ranges = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let ideal = start + window;
        if ideal >= chars.len() {
            ranges.push((start, chars.len(), false));
            break;
        }

        let mut end = ideal;
        while end > start && !is_safe_split_point(chars, end) {
            end -= 1;
        }

        if end == start {
            ranges.push((start, ideal, true));
            start = ideal;
        } else {
            ranges.push((start, end, false));
            start = end;
        }
    }

    ranges
}

/// A cut at `index` is safe before whitespace, right after a closing `>`, or at the end.
fn is_safe_split_point(chars: &[char], index: usize) -> bool {
    if index >= chars.len() {
        return true;
    }
    if chars[index].is_whitespace() {
        return true;
    }
    index > 0 && chars[index - 1] == '>'
}
