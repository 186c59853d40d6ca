//! CSV reader/writer construction and text decoding.
//!
//! Readers are strict (every row must match the header width) and input bytes
//! are decoded through `encoding_rs`, UTF-8 unless a label is given. Writers
//! quote only when needed.

use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::Path,
};

use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::error::{EtlError, Result};

pub const DEFAULT_DELIMITER: u8 = b',';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| EtlError::Config(format!("Unknown encoding '{value}'"))),
        None => Ok(UTF_8),
    }
}

pub fn open_csv_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<BufReader<File>>> {
    if !path.exists() {
        return Err(EtlError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    Ok(open_csv_reader(BufReader::new(file), delimiter))
}

pub fn open_csv_writer<W: Write>(writer: W, delimiter: u8) -> csv::Writer<W> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    builder.from_writer(writer)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
    path: &Path,
    line: usize,
) -> Result<Vec<String>> {
    record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            decode_bytes(field, encoding).ok_or_else(|| {
                EtlError::parse(
                    path,
                    format!(
                        "Line {line} field {} is not valid {}",
                        idx + 1,
                        encoding.name()
                    ),
                )
            })
        })
        .collect()
}

pub fn csv_error(path: &Path, err: csv::Error) -> EtlError {
    if err.is_io_error() {
        if let csv::ErrorKind::Io(io) = err.into_kind() {
            return EtlError::Io(io);
        }
        return EtlError::parse(path, "I/O failure while reading");
    }
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => {
            let line = pos.as_ref().map(|p| p.line()).unwrap_or_default();
            format!("Line {line} has {len} field(s) but the header declares {expected_len}")
        }
        _ => err.to_string(),
    };
    EtlError::parse(path, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_encoding_defaults_to_utf8() {
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert_eq!(
            resolve_encoding(Some("latin1")).unwrap().name(),
            "windows-1252"
        );
        assert!(resolve_encoding(Some("klingon")).is_err());
    }

    #[test]
    fn decode_bytes_rejects_invalid_utf8() {
        assert_eq!(decode_bytes(b"caf\xc3\xa9", UTF_8).as_deref(), Some("café"));
        assert_eq!(decode_bytes(b"ab\xffcd", UTF_8), None);
    }
}
