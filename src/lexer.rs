//! Logical-line assembly for directive files.
//!
//! Rules, applied to each physical line in order:
//!
//! 1. `#` and everything after it is removed.
//! 2. Leading and trailing whitespace is removed.
//! 3. A line that is now empty is skipped, even inside a continuation.
//! 4. A line ending in `\` is a continuation: the backslash is dropped and the
//!    rest is concatenated, without a separator, with the following line(s).
//!
//! A completed logical line is split on whitespace; the first token names the
//! directive. A continuation still open at end of input is emitted as is.

use std::io::{self, BufRead};

pub const COMMENT: char = '#';
pub const CONTINUATION: char = '\\';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
	/// Physical line number (1-based) the logical line starts on.
	pub number: usize,
	pub text: String,
}

impl LogicalLine {
	pub fn tokens(&self) -> Vec<&str> {
		self.text.split_whitespace().collect()
	}
}

pub fn strip_comment(line: &str) -> &str {
	match line.find(COMMENT) {
		Some(idx) => &line[..idx],
		None => line,
	}
}

pub struct Lexer<R> {
	lines: io::Lines<R>,
	number: usize,
}

impl<R: BufRead> Lexer<R> {
	pub fn new(reader: R) -> Self {
		Lexer { lines: reader.lines(), number: 0 }
	}
}

impl<R: BufRead> Iterator for Lexer<R> {
	type Item = io::Result<LogicalLine>;

	fn next(&mut self) -> Option<Self::Item> {
		let mut pending: Option<LogicalLine> = None;
		for physical in self.lines.by_ref() {
			let physical = match physical {
				Ok(x) => x,
				Err(e) => return Some(Err(e)),
			};
			self.number += 1;
			let s = strip_comment(&physical).trim();
			if s.is_empty() {
				continue;
			}
			let line = pending.get_or_insert_with(|| LogicalLine { number: self.number, text: String::new() });
			match s.strip_suffix(CONTINUATION) {
				Some(head) => line.text.push_str(head),
				None => {
					line.text.push_str(s);
					return pending.map(Ok);
				}
			}
		}
		pending.map(Ok)
	}
}

/// Lexes an in-memory directive text.
pub fn lex(text: &str) -> io::Result<Vec<LogicalLine>> {
	Lexer::new(io::Cursor::new(text)).collect()
}
