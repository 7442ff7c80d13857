//! Record input stream.

use std::io;
use std::io::prelude::*;

/// Lazy record cursor over a whitespace-delimited integer text stream.
/// Lines are tokenized on demand; a line containing any token that does not
/// parse as an [`i64`] is skipped in its entirety, so none of its tokens are
/// ever yielded. A numeric token outside the [`i64`] range counts as
/// unparsable and discards its line like any other malformed token.
/// Blank lines are ignored.
pub struct RecordReader<B: BufRead> {
    reader: B,
    line: String,
    buffer: Vec<i64>,
    buffer_pos: usize,
}

impl<B: BufRead> RecordReader<B> {
    /// Creates a record reader over a buffered text stream.
    pub fn new(reader: B) -> Self {
        RecordReader {
            reader,
            line: String::new(),
            buffer: Vec::new(),
            buffer_pos: 0,
        }
    }
}

impl<B: BufRead> Iterator for RecordReader<B> {
    type Item = io::Result<i64>;

    /// Returns the next record from the stream, or [`None`] at end of input.
    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer_pos < self.buffer.len() {
            let value = self.buffer[self.buffer_pos];
            self.buffer_pos += 1;
            return Some(Ok(value));
        }

        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => return Some(Err(err)),
            }

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            // line-granular validation: one bad token discards the whole line
            let parsed: Result<Vec<i64>, _> = line.split_whitespace().map(str::parse).collect();
            match parsed {
                Ok(numbers) => {
                    self.buffer = numbers;
                    self.buffer_pos = 1;
                    return Some(Ok(self.buffer[0]));
                }
                Err(_) => continue,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::io;

    use rstest::*;

    use super::RecordReader;

    fn read_all(input: &str) -> Vec<i64> {
        let reader = RecordReader::new(io::Cursor::new(input));
        let result: io::Result<Vec<i64>> = reader.collect();
        result.unwrap()
    }

    #[rstest]
    #[case("", vec![])]
    #[case("42", vec![42])]
    #[case("5 3 8", vec![5, 3, 8])]
    #[case("5 3\n8\n\n1 9", vec![5, 3, 8, 1, 9])]
    #[case("  7\t-2  \n\n", vec![7, -2])]
    #[case("-1 +2 -3", vec![-1, 2, -3])]
    #[case("9223372036854775807 -9223372036854775808", vec![i64::MAX, i64::MIN])]
    fn test_tokenization(#[case] input: &str, #[case] expected: Vec<i64>) {
        assert_eq!(read_all(input), expected);
    }

    #[rstest]
    #[case("abc def", vec![])]
    #[case("1 2\nabc def\n3 4", vec![1, 2, 3, 4])]
    #[case("1 x 2\n3", vec![3])]
    #[case("1.5 2\n3", vec![3])]
    #[case("9223372036854775808 1\n2", vec![2])]
    fn test_malformed_line_skipped_entirely(#[case] input: &str, #[case] expected: Vec<i64>) {
        assert_eq!(read_all(input), expected);
    }

    #[rstest]
    fn test_io_error_is_yielded() {
        struct FailingReader;

        impl io::Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "test error"))
            }
        }

        let mut reader = RecordReader::new(io::BufReader::new(FailingReader));
        assert!(reader.next().unwrap().is_err());
    }
}
