//! Cuts a byte stream into statement texts at `;` outside quotes and comments.

use std::io::{self, BufRead};

use common::SqlDialect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scan {
    Code,
    Quoted(u8),
    /// Just after a backslash inside a quoted run.
    Escaped(u8),
    LineComment,
    BlockComment,
}

/// Reads input a line at a time and hands back one statement's bytes as soon
/// as its terminator has been read.
pub(crate) struct StatementSplitter<R> {
    reader: R,
    buf: Vec<u8>,
    scanned: usize,
    state: Scan,
    backslash_escapes: bool,
    hash_comments: bool,
}

impl<R: BufRead> StatementSplitter<R> {
    pub(crate) fn new(reader: R, dialect: SqlDialect) -> Self {
        let mysql = dialect == SqlDialect::MySql;
        Self {
            reader,
            buf: Vec::new(),
            scanned: 0,
            state: Scan::Code,
            backslash_escapes: mysql,
            hash_comments: mysql,
        }
    }

    /// Next statement text without its `;`, or `None` once the input is drained.
    ///
    /// Text left after the last terminator is returned as a final chunk, even
    /// when it ends inside a quote or comment.
    pub(crate) fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            if let Some(end) = self.scan() {
                let mut chunk: Vec<u8> = self.buf.drain(..=end).collect();
                chunk.pop();
                self.scanned = 0;
                return Ok(Some(chunk));
            }

            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                self.scanned = 0;
                self.state = Scan::Code;
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.buf)));
            }
        }
    }

    /// Advance over unscanned bytes; returns the index of a terminating `;`.
    ///
    /// Reads stop at `\n`, so a two-byte marker never straddles a read.
    fn scan(&mut self) -> Option<usize> {
        while self.scanned < self.buf.len() {
            let idx = self.scanned;
            let byte = self.buf[idx];
            let next = self.buf.get(idx + 1).copied();
            self.scanned += 1;

            self.state = match self.state {
                Scan::Code => match byte {
                    b';' => return Some(idx),
                    b'\'' | b'"' | b'`' => Scan::Quoted(byte),
                    b'-' if next == Some(b'-') => {
                        self.scanned += 1;
                        Scan::LineComment
                    }
                    b'#' if self.hash_comments => Scan::LineComment,
                    b'/' if next == Some(b'*') => {
                        self.scanned += 1;
                        Scan::BlockComment
                    }
                    _ => Scan::Code,
                },
                Scan::Quoted(quote) if byte == quote => Scan::Code,
                Scan::Quoted(quote) if byte == b'\\' && self.backslash_escapes && quote != b'`' => {
                    Scan::Escaped(quote)
                }
                Scan::Quoted(quote) | Scan::Escaped(quote) => Scan::Quoted(quote),
                Scan::LineComment if byte == b'\n' => Scan::Code,
                Scan::LineComment => Scan::LineComment,
                Scan::BlockComment if byte == b'*' && next == Some(b'/') => {
                    self.scanned += 1;
                    Scan::Code
                }
                Scan::BlockComment => Scan::BlockComment,
            };
        }
        None
    }
}
