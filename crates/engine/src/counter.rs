use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::ops::{AddAssign, BitOr, BitOrAssign};

/// One statistic the engine can tally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Lines,
    Words,
    Characters,
    Bytes,
}

impl Category {
    /// Display order used by every printer.
    pub const ALL: [Category; 4] = [
        Category::Lines,
        Category::Words,
        Category::Characters,
        Category::Bytes,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Category::Lines => "lines",
            Category::Words => "words",
            Category::Characters => "characters",
            Category::Bytes => "bytes",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Category::Lines => CounterKind::LINES.0,
            Category::Words => CounterKind::WORDS.0,
            Category::Characters => CounterKind::CHARACTERS.0,
            Category::Bytes => CounterKind::BYTES.0,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Category::Lines => 0,
            Category::Words => 1,
            Category::Characters => 2,
            Category::Bytes => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bitmask of requested categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CounterKind(u8);

impl CounterKind {
    pub const NONE: CounterKind = CounterKind(0);
    pub const LINES: CounterKind = CounterKind(1);
    pub const WORDS: CounterKind = CounterKind(2);
    pub const CHARACTERS: CounterKind = CounterKind(4);
    pub const BYTES: CounterKind = CounterKind(8);
    pub const ALL: CounterKind = CounterKind(15);

    pub const fn contains(self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Requested categories in display order.
    pub fn categories(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl Default for CounterKind {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<Category> for CounterKind {
    fn from(category: Category) -> Self {
        CounterKind(category.bit())
    }
}

impl BitOr for CounterKind {
    type Output = CounterKind;

    fn bitor(self, rhs: Self) -> Self::Output {
        CounterKind(self.0 | rhs.0)
    }
}

impl BitOrAssign for CounterKind {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Streaming tally for one input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Counter {
    kind: CounterKind,
    counts: [u64; 4],
}

impl Counter {
    pub fn new(kind: CounterKind) -> Self {
        Self {
            kind,
            counts: [0; 4],
        }
    }

    pub const fn kind(&self) -> CounterKind {
        self.kind
    }

    /// Feeds one chunk. Callers hand over whole lines, so the word state
    /// never spans two chunks.
    pub fn update(&mut self, chunk: &[u8]) {
        if self.kind.contains(Category::Lines) {
            self.counts[Category::Lines.slot()] += bytecount::count(chunk, b'\n') as u64;
        }
        if self.kind.contains(Category::Words) {
            let text = String::from_utf8_lossy(chunk);
            self.counts[Category::Words.slot()] += text.split_whitespace().count() as u64;
        }
        if self.kind.contains(Category::Characters) {
            self.counts[Category::Characters.slot()] += bytecount::num_chars(chunk) as u64;
        }
        if self.kind.contains(Category::Bytes) {
            self.counts[Category::Bytes.slot()] += chunk.len() as u64;
        }
    }

    /// Reads `reader` to the end, one line at a time.
    pub fn drain<R: Read>(&mut self, reader: R) -> std::io::Result<()> {
        let mut reader = BufReader::new(reader);
        let mut line = Vec::with_capacity(8 * 1024);
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            self.update(&line);
        }
    }

    /// `None` when the category was not requested.
    pub fn count(&self, category: Category) -> Option<u64> {
        self.kind
            .contains(category)
            .then(|| self.counts[category.slot()])
    }
}

impl AddAssign<&Counter> for Counter {
    fn add_assign(&mut self, rhs: &Counter) {
        self.kind |= rhs.kind;
        for (total, value) in self.counts.iter_mut().zip(rhs.counts) {
            *total += value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUMPTY_DUMPTY: &str = "Humpty Dumpty sat on a wall,\n\
Humpty Dumpty had a great fall.\n\
All the king's horses and all the king's men\n\
Couldn't put Humpty together again.\n";

    #[test]
    fn test_drain_counts_all_categories() {
        let mut counter = Counter::new(CounterKind::ALL);
        counter.drain(HUMPTY_DUMPTY.as_bytes()).unwrap();

        assert_eq!(counter.count(Category::Lines), Some(4));
        assert_eq!(counter.count(Category::Words), Some(26));
        assert_eq!(counter.count(Category::Characters), Some(142));
        assert_eq!(counter.count(Category::Bytes), Some(142));
    }

    #[test]
    fn test_multibyte_characters() {
        let mut counter = Counter::new(CounterKind::ALL);
        counter.drain("さくら さくら\n".as_bytes()).unwrap();

        assert_eq!(counter.count(Category::Lines), Some(1));
        assert_eq!(counter.count(Category::Words), Some(2));
        assert_eq!(counter.count(Category::Characters), Some(8));
        assert_eq!(counter.count(Category::Bytes), Some(20));
    }

    #[test]
    fn test_unrequested_category_is_none() {
        let mut counter = Counter::new(CounterKind::LINES | CounterKind::BYTES);
        counter.update(b"one two\n");

        assert_eq!(counter.count(Category::Lines), Some(1));
        assert_eq!(counter.count(Category::Words), None);
        assert_eq!(counter.count(Category::Characters), None);
        assert_eq!(counter.count(Category::Bytes), Some(8));
        let requested: Vec<Category> = counter.kind().categories().collect();
        assert_eq!(requested, [Category::Lines, Category::Bytes]);
    }

    #[test]
    fn test_update_is_deterministic() {
        let chunk = b"\tleading tab and trailing space \n";
        let mut first = Counter::new(CounterKind::ALL);
        let mut second = Counter::new(CounterKind::ALL);
        first.update(chunk);
        second.update(chunk);

        assert_eq!(first, second);
        assert_eq!(first.count(Category::Words), Some(5));
        assert_eq!(first.count(Category::Bytes), Some(chunk.len() as u64));
    }

    #[test]
    fn test_empty_line_and_missing_trailing_newline() {
        let mut counter = Counter::new(CounterKind::ALL);
        counter.drain(&b"\n\nlast"[..]).unwrap();

        assert_eq!(counter.count(Category::Lines), Some(2));
        assert_eq!(counter.count(Category::Words), Some(1));
        assert_eq!(counter.count(Category::Bytes), Some(6));
    }

    #[test]
    fn test_add_assign_sums_elementwise() {
        let mut total = Counter::new(CounterKind::ALL);
        let mut a = Counter::new(CounterKind::ALL);
        let mut b = Counter::new(CounterKind::ALL);
        a.update(b"a b\n");
        b.update(b"c\n");
        total += &a;
        total += &b;

        assert_eq!(total.count(Category::Lines), Some(2));
        assert_eq!(total.count(Category::Words), Some(3));
        assert_eq!(total.count(Category::Bytes), Some(6));
    }
}
