use super::command::Command;
use crate::error::{HallError, Result};
use std::io::Read;

/// Reads hall commands from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// so trailing columns a command does not use can be left off.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes commands, one `Result` per row.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(HallError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::csv::command::CommandKind;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, student, table\nassign, 1, 5\nfree, , 5";
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<Command>> = reader.commands().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.op, CommandKind::Assign);
        assert_eq!(first.student, Some(1));
        assert_eq!(first.table, Some(5));
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.student, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "op, student, table\nteleport, 1, 1\nassign, abc, 1";
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<Command>> = reader.commands().collect();

        assert!(results[0].is_err());
        assert!(matches!(results[1], Err(HallError::CsvError(_))));
    }
}
