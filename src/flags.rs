use std::str::FromStr;

/// Mode flags threaded through parsing, compilation and execution.
///
/// The engine never reads ambient state; every flag-dependent decision goes
/// through a copy of this struct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// Iterate the input by code points, enable property escapes and
    /// `\u{...}` escapes, restrict identity escapes.
    pub unicode: bool,
    /// Case-insensitive matching (activates canonicalization).
    pub ignore_case: bool,
    /// `^` and `$` also match at internal line boundaries.
    pub multiline: bool,
    /// `.` matches line terminators too.
    pub dot_all: bool,
    /// Named groups (`(?<name>`) and `\k<name>` references are recognized.
    pub named_groups: bool,
}

impl Flags {
    pub fn unicode(mut self, on: bool) -> Self {
        self.unicode = on;
        self
    }

    pub fn ignore_case(mut self, on: bool) -> Self {
        self.ignore_case = on;
        self
    }

    pub fn multiline(mut self, on: bool) -> Self {
        self.multiline = on;
        self
    }

    pub fn dot_all(mut self, on: bool) -> Self {
        self.dot_all = on;
        self
    }

    pub fn named_groups(mut self, on: bool) -> Self {
        self.named_groups = on;
        self
    }
}

impl FromStr for Flags {
    type Err = String;

    /// Parses a flag string of single-letter switches: `u` (unicode),
    /// `i` (ignore case), `m` (multiline), `s` (dot-all), `n` (named groups).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Flags::default();
        for c in s.chars() {
            match c {
                'u' => flags.unicode = true,
                'i' => flags.ignore_case = true,
                'm' => flags.multiline = true,
                's' => flags.dot_all = true,
                'n' => flags.named_groups = true,
                other => return Err(format!("Unknown flag {other:?}")),
            }
        }
        Ok(flags)
    }
}
