//! Splitting a token list at boundary names.
//!
//! A boundary name is the bare CLI name of a nested message field. At one
//! level of the flag tree, the tokens before the first boundary belong to
//! the level itself; every boundary occurrence opens a range that runs to
//! the next boundary of the same level, or to the end of input.

/// Half-open `[lo, hi)` window into the original token list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArgumentRange {
    pub lo: usize,
    pub hi: usize,
}

impl ArgumentRange {
    pub fn new(lo: usize, hi: usize) -> Self {
        debug_assert!(lo <= hi, "range start {lo} past end {hi}");
        Self { lo, hi }
    }

    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    pub fn is_empty(&self) -> bool {
        self.lo == self.hi
    }

    /// Moves the range by `offset` positions, turning a range relative to a
    /// sub-slice into one relative to the full token list.
    pub fn shift(self, offset: usize) -> Self {
        Self {
            lo: self.lo + offset,
            hi: self.hi + offset,
        }
    }

    /// Returns the tokens covered by this range.
    pub fn slice<'t, T>(&self, tokens: &'t [T]) -> &'t [T] {
        &tokens[self.lo..self.hi]
    }
}

/// Result of segmenting one level: the level's own prefix and, per boundary
/// name, every range opened by that name in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments {
    pub prefix: ArgumentRange,
    ranges: Vec<(String, Vec<ArgumentRange>)>,
}

impl Segments {
    /// All ranges opened by `name`, in encounter order.
    pub fn all(&self, name: &str) -> &[ArgumentRange] {
        self.ranges
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ranges)| ranges.as_slice())
            .unwrap_or(&[])
    }

    /// The range a singular field binds: the last occurrence wins.
    pub fn last(&self, name: &str) -> Option<ArgumentRange> {
        self.all(name).last().copied()
    }

    pub fn occurrences(&self, name: &str) -> usize {
        self.all(name).len()
    }

    /// Shifts every range by `offset`.
    pub fn shift(mut self, offset: usize) -> Self {
        self.prefix = self.prefix.shift(offset);
        for (_, ranges) in &mut self.ranges {
            for range in ranges.iter_mut() {
                *range = range.shift(offset);
            }
        }
        self
    }
}

/// Segments `tokens` at the given boundary names.
///
/// # Examples
///
/// ```
/// use protoflag_args::{segment, ArgumentRange};
///
/// let tokens = ["--id", "x", "item", "--name", "a", "item", "--name", "b"];
/// let segs = segment(&tokens, &["item"]);
///
/// assert_eq!(segs.prefix, ArgumentRange::new(0, 2));
/// assert_eq!(segs.all("item"), &[ArgumentRange::new(3, 5), ArgumentRange::new(6, 8)]);
/// assert_eq!(segs.last("item").map(|r| r.slice(&tokens)), Some(&tokens[6..8]));
/// ```
pub fn segment<S: AsRef<str>>(tokens: &[S], boundaries: &[&str]) -> Segments {
    let mut segments = Segments {
        prefix: ArgumentRange::new(0, tokens.len()),
        ranges: boundaries
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect(),
    };

    // (boundary index, start of its range)
    let mut open: Option<(usize, usize)> = None;
    for (i, token) in tokens.iter().enumerate() {
        let Some(idx) = boundaries.iter().position(|b| *b == token.as_ref()) else {
            continue;
        };
        match open.take() {
            None => segments.prefix.hi = i,
            Some((prev, lo)) => segments.ranges[prev].1.push(ArgumentRange::new(lo, i)),
        }
        open = Some((idx, i + 1));
    }
    if let Some((prev, lo)) = open {
        segments.ranges[prev]
            .1
            .push(ArgumentRange::new(lo, tokens.len()));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_boundaries_is_all_prefix() {
        let tokens = ["--a", "1", "--b", "2"];
        let segs = segment(&tokens, &["child"]);
        assert_eq!(segs.prefix, ArgumentRange::new(0, 4));
        assert_eq!(segs.occurrences("child"), 0);
        assert_eq!(segs.last("child"), None);
    }

    #[test]
    fn test_singular_boundary_owns_following_tokens() {
        let tokens = ["--a", "1", "child", "--x", "1", "--y", "2"];
        let segs = segment(&tokens, &["child"]);
        assert_eq!(segs.prefix.len(), 2);
        let range = segs.last("child").unwrap();
        assert_eq!(range.len(), 4);
        assert_eq!(range.slice(&tokens), &["--x", "1", "--y", "2"]);
    }

    #[test]
    fn test_repeated_boundary_keeps_encounter_order() {
        let tokens = ["rep", "--v", "1", "rep", "rep", "--v", "3"];
        let segs = segment(&tokens, &["rep"]);
        assert!(segs.prefix.is_empty());
        assert_eq!(
            segs.all("rep"),
            &[
                ArgumentRange::new(1, 3),
                ArgumentRange::new(4, 4),
                ArgumentRange::new(5, 7),
            ]
        );
    }

    #[test]
    fn test_sibling_boundaries_close_each_other() {
        let tokens = ["src", "--host", "a", "dst", "--host", "b", "src", "--host", "c"];
        let segs = segment(&tokens, &["src", "dst"]);
        assert_eq!(segs.all("src"), &[ArgumentRange::new(1, 3), ArgumentRange::new(7, 9)]);
        assert_eq!(segs.last("src"), Some(ArgumentRange::new(7, 9)));
        assert_eq!(segs.all("dst"), &[ArgumentRange::new(4, 6)]);
    }

    #[test]
    fn test_shift_maps_to_absolute_positions() {
        let tokens = ["outer", "--a", "1", "inner", "--b", "2"];
        let window = ArgumentRange::new(1, 6);
        let segs = segment(window.slice(&tokens), &["inner"]).shift(window.lo);
        assert_eq!(segs.prefix, ArgumentRange::new(1, 3));
        assert_eq!(segs.last("inner").map(|r| r.slice(&tokens)), Some(&tokens[4..6]));
    }
}
