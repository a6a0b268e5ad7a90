//! Tokenized status lines.

/// One line of status output split into whitespace-delimited fields.
///
/// Field 0 is the status tag (`[GNUPG:]` on a real run), field 1 the
/// keyword and field 2 onwards the keyword-specific arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine<'a> {
    raw: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> StatusLine<'a> {
    /// Minimum number of fields a line needs to carry a verdict.
    pub const MIN_VERDICT_FIELDS: usize = 3;

    /// Tokenize a raw line. Trailing `\r` and surrounding blanks are ignored.
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            fields: raw.split_whitespace().collect(),
        }
    }

    /// The line exactly as it was emitted.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// All fields in order.
    pub fn fields(&self) -> &[&'a str] {
        &self.fields
    }

    /// Field at `index`, if present.
    pub fn field(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied()
    }

    /// The keyword following the status tag.
    pub fn keyword(&self) -> Option<&'a str> {
        self.field(1)
    }

    /// True when the keyword equals `marker`.
    ///
    /// The leading tag is not inspected, so lines with any prefix token
    /// (`[GNUPG:]`, `[x]`, a custom `--status-fd` wrapper) are accepted.
    pub fn has_keyword(&self, marker: &str) -> bool {
        self.keyword() == Some(marker)
    }

    /// True when the line has enough fields to carry a verdict.
    pub fn is_verdict_candidate(&self) -> bool {
        self.fields.len() >= Self::MIN_VERDICT_FIELDS
    }

    /// Field at `index` read as a Unix timestamp. Missing or non-numeric
    /// tokens (GnuPG prints ISO 8601 dates in some modes) read as 0.
    pub fn timestamp_at(&self, index: usize) -> i64 {
        self.field(index)
            .and_then(|token| token.parse::<i64>().ok())
            .unwrap_or(0)
    }
}
