// Copyright (c) 2015-2021 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see  <http://www.gnu.org/licenses/>
//

//! Reading files in DIMACS format.
//!
//! Network instances use the min-cost-flow dialect (see [`min`]), basis
//! checkpoints use a small dialect of the same line format (see
//! [`basis`]).

pub mod basis;
pub mod min;

use std::fmt;
use std::io::{self, BufRead, BufReader, Read};
use std::str::{FromStr, SplitWhitespace};

use thiserror::Error;

/// Error when reading a file in DIMACS format.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Format error on line {line}: {msg}")]
    Format { line: usize, msg: String },
    #[error("Data error on line {line}: {msg}")]
    Data { line: usize, msg: String },
}

pub type Result<T> = std::result::Result<T, Error>;

pub struct DimacsReader<R: Read> {
    io: BufReader<R>,

    line: String,
    line_number: usize,
}

impl<R: Read> DimacsReader<R> {
    pub fn new(reader: R) -> Self {
        DimacsReader {
            io: BufReader::new(reader),
            line: String::new(),
            line_number: 0,
        }
    }

    fn read_line(&mut self) -> Result<Option<Tokens>> {
        let line = &mut self.line;
        loop {
            line.clear();
            if self.io.read_line(line)? == 0 {
                return Ok(None);
            }

            self.line_number += 1;
            let first = line.char_indices().find(|&(_, c)| !c.is_whitespace());
            match first {
                None | Some((_, 'c')) => continue,
                Some((i, _)) => {
                    return Ok(Some(Tokens {
                        it: line[i..].split_whitespace(),
                        line: self.line_number,
                    }))
                }
            }
        }
    }

    // Expect a line with the given descriptor.
    //
    // If the next line does not have this descriptor, an error is returned.
    // Otherwise the *remaining* tokens are returned.
    fn expect_line(&mut self, descriptor: char) -> Result<Tokens> {
        let line_number = self.line_number;
        let mut toks = self.read_line()?.ok_or_else(|| Error::Format {
            line: line_number,
            msg: format!("unexpected end of file, expected '{}' line", descriptor),
        })?;
        match toks.next() {
            Some(d) if d.len() == 1 && d.starts_with(descriptor) => Ok(toks),
            Some(d) => Err(Error::Format {
                line: toks.line,
                msg: format!("unexpected line, expected '{}', got '{}'", descriptor, d),
            }),
            None => Err(Error::Format {
                line: toks.line,
                msg: "unexpected empty line".to_string(),
            }),
        }
    }

    // Read the next line with one of the given descriptors.
    //
    // At the end of the input `Ok(None)` is returned. Otherwise the
    // descriptor and the *remaining* tokens are returned.
    fn read_one_line_of(&mut self, descriptors: &[&str]) -> Result<Option<(&str, Tokens)>> {
        if let Some(mut toks) = self.read_line()? {
            match toks.next() {
                Some(d) if descriptors.iter().any(|&desc| d == desc) => Ok(Some((d, toks))),
                Some(d) => Err(Error::Format {
                    line: toks.line,
                    msg: format!(
                        "unexpected line, expected one of '{}', got '{}'",
                        descriptors.join("', '"),
                        d
                    ),
                }),
                None => Err(Error::Format {
                    line: toks.line,
                    msg: "unexpected empty line".to_string(),
                }),
            }
        } else {
            Ok(None)
        }
    }
}

/// Iterates over the tokens in a line.
pub struct Tokens<'a> {
    it: SplitWhitespace<'a>,
    pub line: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.it.next()
    }
}

impl<'a> Tokens<'a> {
    /// Return an error if the next token is not the given token.
    pub fn expect(&mut self, tok: &str) -> Result<()> {
        let nxt = self.str()?;
        if nxt == tok {
            Ok(())
        } else {
            Err(Error::Format {
                line: self.line,
                msg: format!("expected '{}', got '{}'", tok, nxt),
            })
        }
    }

    /// Returns the next token as `&str`.
    pub fn str(&mut self) -> Result<&'a str> {
        let line = self.line;
        self.it.next().ok_or_else(|| Error::Format {
            line,
            msg: "expected token".to_string(),
        })
    }

    /// Returns the next token converted to a number.
    pub fn number<T>(&mut self) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let line = self.line;
        self.it
            .next()
            .ok_or_else(|| Error::Format {
                line,
                msg: "expected number".to_string(),
            })?
            .parse()
            .map_err(|e| Error::Format {
                line,
                msg: format!("{}", e),
            })
    }

    /// Returns the next token as a 1-based id converted to a 0-based index.
    ///
    /// The id must be in `1..=n`, `what` names the object in the error.
    pub fn id(&mut self, n: usize, what: &str) -> Result<usize> {
        let u: usize = self.number()?;
        if u < 1 || u > n {
            return Err(Error::Data {
                line: self.line,
                msg: format!("invalid {} id {} (must be in 1..{})", what, u, n),
            });
        }
        Ok(u - 1)
    }

    /// Ensures that there is no next token.
    pub fn end(&mut self) -> Result<()> {
        if let Some(s) = self.it.next() {
            Err(Error::Format {
                line: self.line,
                msg: format!("unexpected token at end of line: {}", s),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DimacsReader, Error};
    use std::io::Cursor;

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "c header\n\n   \nc more\np min 2 1\n";
        let mut reader = DimacsReader::new(Cursor::new(text));
        let mut toks = reader.expect_line('p').unwrap();
        assert_eq!(toks.line, 5);
        toks.expect("min").unwrap();
        assert_eq!(toks.number::<usize>().unwrap(), 2);
        assert_eq!(toks.number::<usize>().unwrap(), 1);
        toks.end().unwrap();
    }

    #[test]
    fn reports_line_of_bad_token() {
        let text = "p min 2 x\n";
        let mut reader = DimacsReader::new(Cursor::new(text));
        let mut toks = reader.expect_line('p').unwrap();
        toks.expect("min").unwrap();
        toks.number::<usize>().unwrap();
        match toks.number::<usize>() {
            Err(Error::Format { line, .. }) => assert_eq!(line, 1),
            _ => panic!("expected format error"),
        }
    }

    #[test]
    fn rejects_unexpected_descriptor() {
        let text = "p min 1 0\nx 1 2\n";
        let mut reader = DimacsReader::new(Cursor::new(text));
        reader.expect_line('p').unwrap();
        assert!(reader.read_one_line_of(&["n", "a"]).is_err());
    }

    #[test]
    fn id_is_range_checked() {
        let text = "a 3 0\n";
        let mut reader = DimacsReader::new(Cursor::new(text));
        let mut toks = reader.expect_line('a').unwrap();
        assert_eq!(toks.id(3, "node").unwrap(), 2);
        assert!(matches!(toks.id(3, "node"), Err(Error::Data { line: 1, .. })));
    }
}
