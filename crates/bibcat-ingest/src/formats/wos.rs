//! Web of Science plain-text export ("field tagged") records.
//!
//! Each line starts with a two-letter tag, the value begins at the fourth
//! character, and `ER` closes a record:
//!
//! ```text
//! TI Attention is all you need
//! AU Vaswani, A
//! PY 2017
//! ER
//! ```

use std::io::BufRead;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTaggedRecord {
    /// 1-based line of the first recognised tag of this record.
    pub line: usize,
    pub title: Option<String>,
    pub doi: Option<String>,
    pub authors: Vec<String>,
    pub source: Option<String>,
    pub publication_date: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WosParseOptions {
    /// Indented lines continue the previous tag instead of being read as
    /// tag lines of their own.
    pub continuation_lines: bool,
}

/// Result of parsing a whole export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WosParse {
    pub records: Vec<RawTaggedRecord>,
    /// Start line of a trailing record that never saw `ER`. That record is
    /// not part of `records`.
    pub dangling_line: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Title,
    Doi,
    Author,
    Source,
    Year,
    Volume,
    Issue,
    BeginPage,
    EndPage,
    EndRecord,
}

impl Tag {
    fn from_code(code: &str) -> Option<Self> {
        let tag = match code {
            "TI" => Tag::Title,
            "DI" => Tag::Doi,
            "AU" => Tag::Author,
            "SO" => Tag::Source,
            "PY" => Tag::Year,
            "VL" => Tag::Volume,
            "IS" => Tag::Issue,
            "BP" => Tag::BeginPage,
            "EP" => Tag::EndPage,
            "ER" => Tag::EndRecord,
            _ => return None,
        };
        Some(tag)
    }
}

/// Splits a trimmed line into its two-character tag and the trimmed value
/// that follows the separator.
fn split_tag_line(line: &str) -> (&str, &str) {
    let tag_end = line.char_indices().nth(2).map(|(i, _)| i).unwrap_or(line.len());
    let value = line
        .char_indices()
        .nth(3)
        .map(|(i, _)| &line[i..])
        .unwrap_or("")
        .trim();
    (&line[..tag_end], value)
}

/// Line-at-a-time state machine shared by [`WosReader`] and [`parse_wos`].
#[derive(Debug, Default)]
struct Scanner {
    options: WosParseOptions,
    line_no: usize,
    current: RawTaggedRecord,
    started: bool,
    last_tag: Option<Tag>,
}

impl Scanner {
    fn new(options: WosParseOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    fn feed(&mut self, raw: &str) -> Option<RawTaggedRecord> {
        self.line_no += 1;

        let line = raw.trim();
        if line.is_empty() {
            return None;
        }

        if self.options.continuation_lines && raw.starts_with(char::is_whitespace) {
            self.continue_tag(line);
            return None;
        }

        let (code, value) = split_tag_line(line);
        let Some(tag) = Tag::from_code(code) else {
            self.last_tag = None;
            return None;
        };

        if tag == Tag::EndRecord {
            let mut record = std::mem::take(&mut self.current);
            if !self.started {
                record.line = self.line_no;
            }
            self.started = false;
            self.last_tag = None;
            return Some(record);
        }

        if !self.started {
            self.started = true;
            self.current.line = self.line_no;
        }
        self.last_tag = Some(tag);
        self.apply(tag, value);
        None
    }

    fn apply(&mut self, tag: Tag, value: &str) {
        let record = &mut self.current;
        let value = value.to_string();
        match tag {
            Tag::Title => record.title = Some(value),
            Tag::Doi => record.doi = Some(value),
            Tag::Author => record.authors.push(value),
            Tag::Source => record.source = Some(value),
            Tag::Year => record.publication_date = Some(value),
            Tag::Volume => record.volume = Some(value),
            Tag::Issue => record.issue = Some(value),
            Tag::BeginPage => record.pages = Some(value),
            Tag::EndPage => {
                let begin = record.pages.take().unwrap_or_default();
                record.pages = Some(format!("{begin}-{value}"));
            }
            Tag::EndRecord => {}
        }
    }

    fn continue_tag(&mut self, value: &str) {
        let record = &mut self.current;
        match self.last_tag {
            Some(Tag::Author) => record.authors.push(value.to_string()),
            Some(Tag::Title) => append_words(&mut record.title, value),
            Some(Tag::Source) => append_words(&mut record.source, value),
            _ => {}
        }
    }

    /// Start line of an unterminated trailing record, if any.
    fn finish(self) -> Option<usize> {
        self.started.then_some(self.current.line)
    }
}

fn append_words(field: &mut Option<String>, value: &str) {
    match field {
        Some(existing) if !existing.is_empty() => {
            existing.push(' ');
            existing.push_str(value);
        }
        _ => *field = Some(value.to_string()),
    }
}

/// Streams records out of any buffered reader.
///
/// A trailing record without `ER` is dropped; [`WosReader::dangling_line`]
/// reports where it started once the iterator is exhausted.
pub struct WosReader<R> {
    lines: std::io::Lines<R>,
    scanner: Option<Scanner>,
    dangling_line: Option<usize>,
}

impl<R: BufRead> WosReader<R> {
    pub fn new(reader: R, options: WosParseOptions) -> Self {
        Self {
            lines: reader.lines(),
            scanner: Some(Scanner::new(options)),
            dangling_line: None,
        }
    }

    pub fn dangling_line(&self) -> Option<usize> {
        self.dangling_line
    }

    /// Drains the reader into a [`WosParse`].
    pub fn collect_parse(mut self) -> std::io::Result<WosParse> {
        let mut records = Vec::new();
        for record in self.by_ref() {
            records.push(record?);
        }
        Ok(WosParse {
            records,
            dangling_line: self.dangling_line,
        })
    }
}

impl<R: BufRead> Iterator for WosReader<R> {
    type Item = std::io::Result<RawTaggedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let scanner = self.scanner.as_mut()?;
            match self.lines.next() {
                Some(Ok(line)) => {
                    if let Some(record) = scanner.feed(&line) {
                        return Some(Ok(record));
                    }
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.dangling_line = self.scanner.take().and_then(Scanner::finish);
                    return None;
                }
            }
        }
    }
}

pub fn parse_wos(content: &str, options: WosParseOptions) -> WosParse {
    let mut scanner = Scanner::new(options);
    let records: Vec<RawTaggedRecord> = content.lines().filter_map(|line| scanner.feed(line)).collect();
    WosParse {
        records,
        dangling_line: scanner.finish(),
    }
}
