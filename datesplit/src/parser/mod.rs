//! CSV reading and writing.
//!
//! [`CsvSource`] reads a CSV file in batches of rows. Encoding and delimiter
//! are detected from the first bytes of the file; fields are decoded to UTF-8.
//! [`CsvSink`] writes comma-separated UTF-8 rows.
//!
//! Every field is kept as the text it was written as. [`cell_kind`] gives the
//! type a dataframe reader would have inferred for it, which is what column
//! classification looks at.

use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Bytes inspected for encoding and delimiter detection.
const SNIFF_BYTES: u64 = 64 * 1024;

/// Candidate input delimiters, in order of preference on ties.
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Values a dataframe reader treats as missing.
const MISSING_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One source row: raw field text, one entry per header column.
pub type Row = Vec<String>;

/// Inferred type of a single raw field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Missing,
    Integer,
    Float,
    Boolean,
    Text,
}

impl CellKind {
    pub fn is_text(self) -> bool {
        self == CellKind::Text
    }
}

/// Infer the type of a raw field.
pub fn cell_kind(raw: &str) -> CellKind {
    if MISSING_VALUES.contains(&raw) {
        return CellKind::Missing;
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellKind::Missing;
    }
    if trimmed.parse::<i64>().is_ok() {
        CellKind::Integer
    } else if trimmed.parse::<f64>().is_ok() {
        CellKind::Float
    } else if matches!(trimmed, "True" | "TRUE" | "true" | "False" | "FALSE" | "false") {
        CellKind::Boolean
    } else {
        CellKind::Text
    }
}

/// What was detected about a source file.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 (including plain ASCII) is taken as UTF-8; otherwise chardet
/// guesses. Only ASCII-compatible encodings are accepted since the CSV
/// structure is parsed before decoding.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    match std::str::from_utf8(bytes) {
        Ok(_) => return UTF_8,
        // Sample cut in the middle of a multi-byte character
        Err(e) if e.error_len().is_none() => return UTF_8,
        Err(_) => {}
    }

    let (charset, _confidence, _language) = chardet::detect(bytes);
    let label = match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    };

    Encoding::for_label(label.as_bytes())
        .filter(|enc| enc.is_ascii_compatible())
        .unwrap_or(UTF_8)
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Decode one field with the detected encoding.
fn decode_field(encoding: &'static Encoding, bytes: &[u8]) -> String {
    if encoding == UTF_8 {
        if let Ok(s) = std::str::from_utf8(bytes) {
            return s.to_string();
        }
    }
    encoding.decode_without_bom_handling(bytes).0.into_owned()
}

type Sniffed<R> = io::Chain<Cursor<Vec<u8>>, R>;

/// Batched CSV reader.
pub struct CsvSource<R: Read> {
    reader: csv::Reader<Sniffed<R>>,
    info: SourceInfo,
    encoding: &'static Encoding,
    record: csv::ByteRecord,
}

impl CsvSource<File> {
    /// Open a CSV file. Fails with [`CsvError::Io`] when the file cannot be
    /// opened or read.
    pub fn open<P: AsRef<Path>>(path: P) -> CsvResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }
}

impl<R: Read> CsvSource<R> {
    /// Read the header row and prepare for batched reading.
    pub fn from_reader(mut reader: R) -> CsvResult<Self> {
        let mut sample = Vec::new();
        (&mut reader).take(SNIFF_BYTES).read_to_end(&mut sample)?;
        if sample.is_empty() {
            return Err(CsvError::EmptyFile);
        }

        let encoding = detect_encoding(&sample);
        let delimiter = detect_delimiter(&encoding.decode_without_bom_handling(&sample).0);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .has_headers(true)
            .flexible(true)
            .from_reader(Cursor::new(sample).chain(reader));

        let mut headers: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|field| decode_field(encoding, field))
            .collect();
        if let Some(first) = headers.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }
        if headers.is_empty() {
            return Err(CsvError::EmptyFile);
        }

        Ok(Self {
            reader,
            info: SourceInfo {
                encoding: encoding.name().to_string(),
                delimiter,
                headers,
            },
            encoding,
            record: csv::ByteRecord::new(),
        })
    }

    pub fn info(&self) -> &SourceInfo {
        &self.info
    }

    pub fn headers(&self) -> &[String] {
        &self.info.headers
    }

    /// Read up to `size` rows. An empty batch means the file is exhausted.
    ///
    /// Rows are padded with empty fields or truncated to the header width.
    pub fn next_batch(&mut self, size: usize) -> CsvResult<Vec<Row>> {
        let width = self.info.headers.len();
        let mut batch = Vec::with_capacity(size.min(1024));

        while batch.len() < size && self.reader.read_byte_record(&mut self.record)? {
            let mut row: Row = self
                .record
                .iter()
                .take(width)
                .map(|field| decode_field(self.encoding, field))
                .collect();
            row.resize(width, String::new());
            batch.push(row);
        }

        Ok(batch)
    }
}

/// Comma-separated UTF-8 writer.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().flexible(true).from_writer(inner),
        }
    }

    pub fn write_row<I, T>(&mut self, row: I) -> CsvResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(row)?;
        Ok(())
    }

    /// Flush buffered rows and hand back the underlying writer.
    pub fn finish(self) -> CsvResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| CsvError::Io(io::Error::new(e.error().kind(), e.error().to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(csv: &str) -> CsvSource<&[u8]> {
        CsvSource::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_headers_and_rows() {
        let mut src = source("Date,Amount\n2023-05-14T09:15:00,42\n2023-12-01,7\n");
        assert_eq!(src.headers(), ["Date", "Amount"]);

        let batch = src.next_batch(10).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], vec!["2023-05-14T09:15:00", "42"]);
        assert_eq!(batch[1], vec!["2023-12-01", "7"]);
        assert!(src.next_batch(10).unwrap().is_empty());
    }

    #[test]
    fn test_batches_preserve_order() {
        let mut csv = String::from("n\n");
        for i in 0..7 {
            csv.push_str(&format!("{}\n", i));
        }
        let mut src = source(&csv);

        let sizes: Vec<usize> = std::iter::from_fn(|| {
            let batch = src.next_batch(3).unwrap();
            (!batch.is_empty()).then_some(batch.len())
        })
        .collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn test_quoted_values() {
        let mut src = source("name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\n");
        let batch = src.next_batch(10).unwrap();
        assert_eq!(batch[0], vec!["Smith, J", "said \"hi\""]);
    }

    #[test]
    fn test_short_and_long_rows_fit_header() {
        let mut src = source("a,b,c\n1\n1,2,3,4\n");
        let batch = src.next_batch(10).unwrap();
        assert_eq!(batch[0], vec!["1", "", ""]);
        assert_eq!(batch[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_semicolon_source() {
        let mut src = source("Date;Amount\n14/05/2023;42,5\n");
        assert_eq!(src.info().delimiter, ';');
        assert_eq!(src.next_batch(10).unwrap()[0], vec!["14/05/2023", "42,5"]);
    }

    #[test]
    fn test_bom_stripped() {
        let src = source("\u{feff}Date,Amount\n2023-01-01,1\n");
        assert_eq!(src.headers()[0], "Date");
    }

    #[test]
    fn test_empty_source() {
        assert!(matches!(CsvSource::from_reader(&b""[..]), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_non_utf8_source_is_readable() {
        // "Société;1" in ISO-8859-1, preceded by a header
        let mut bytes = b"Name;Count\n".to_vec();
        bytes.extend_from_slice(&[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9, b';', b'1', b'\n']);
        let mut src = CsvSource::from_reader(bytes.as_slice()).unwrap();
        let batch = src.next_batch(10).unwrap();
        assert!(batch[0][0].starts_with("Soci"));
        assert_eq!(batch[0][1], "1");
    }

    #[test]
    fn test_decode_field_latin1() {
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        assert_eq!(decode_field(encoding_rs::WINDOWS_1252, bytes), "Société");
        assert_eq!(decode_field(UTF_8, "Société".as_bytes()), "Société");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_detect_encoding_utf8() {
        assert_eq!(detect_encoding("plain ascii".as_bytes()), UTF_8);
        assert_eq!(detect_encoding("Société".as_bytes()), UTF_8);
        // Truncated multi-byte sequence at the end of the sample
        assert_eq!(detect_encoding(&"é".as_bytes()[..1]), UTF_8);
    }

    #[test]
    fn test_cell_kind() {
        assert_eq!(cell_kind("42"), CellKind::Integer);
        assert_eq!(cell_kind("-7"), CellKind::Integer);
        assert_eq!(cell_kind("3.14"), CellKind::Float);
        assert_eq!(cell_kind("1e5"), CellKind::Float);
        assert_eq!(cell_kind("True"), CellKind::Boolean);
        assert_eq!(cell_kind(""), CellKind::Missing);
        assert_eq!(cell_kind("NaN"), CellKind::Missing);
        assert_eq!(cell_kind("N/A"), CellKind::Missing);
        assert_eq!(cell_kind("2023-05-14"), CellKind::Text);
        assert_eq!(cell_kind("Brooklyn"), CellKind::Text);
    }

    #[test]
    fn test_sink_writes_csv() {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_row(["Date Year", "Amount"]).unwrap();
        sink.write_row(["2023", "a,b"]).unwrap();
        let bytes = sink.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Date Year,Amount\n2023,\"a,b\"\n");
    }
}
