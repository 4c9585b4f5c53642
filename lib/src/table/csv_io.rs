//! CSV loading and saving for [`Table`].
//!
//! Loading is header-driven: every cell is read as text and empty cells
//! become null, so typing is left to the cleaning stage. Records are decoded
//! lossily so that a stray Latin-1 byte does not abort the whole load.

use super::{Column, Table};
use crate::error::Result;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

impl Table {
    /// Load a CSV file.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
        let file = File::open(path.as_ref())?;
        let table = Table::from_csv_reader(BufReader::new(file))?;
        tracing::debug!(
            path = %path.as_ref().display(),
            rows = table.n_rows(),
            cols = table.n_cols(),
            "loaded csv"
        );
        Ok(table)
    }

    /// Load CSV data from any reader.
    ///
    /// Blank header cells are named `Unnamed: <index>` and repeated header
    /// names get a `.1`, `.2`, ... suffix, matching what common dataframe
    /// exports produce. Short records are padded with nulls.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Table> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = rdr.byte_headers()?.clone();
        let names = header_names(&headers);
        let n_cols = names.len();

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); n_cols];
        for result in rdr.byte_records() {
            let record = result?;
            for (col, values) in cells.iter_mut().enumerate() {
                let value = record
                    .get(col)
                    .map(|raw| String::from_utf8_lossy(raw).into_owned())
                    .filter(|s| !s.is_empty());
                values.push(value);
            }
        }

        Table::from_columns(
            names
                .into_iter()
                .zip(cells)
                .map(|(name, values)| (name, Column::Text(values)))
                .collect(),
        )
    }

    /// Save as a CSV file with a header row; nulls are written as empty cells.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.to_csv_writer(BufWriter::new(file))
    }

    /// Write CSV data to any writer.
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(self.column_names())?;
        for row in 0..self.n_rows() {
            let record: Vec<String> = self
                .columns()
                .map(|(_, col)| col.cell_to_string(row).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn header_names(headers: &csv::ByteRecord) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(headers.len());
    for (idx, raw) in headers.iter().enumerate() {
        let decoded = String::from_utf8_lossy(raw);
        let mut name = decoded.trim_start_matches('\u{feff}').trim().to_string();
        if name.is_empty() {
            name = format!("Unnamed: {}", idx);
        }

        let base = name.clone();
        let mut dup = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, dup);
            dup += 1;
        }
        names.push(name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_basic_csv() {
        let data = "Land_ID,State,Price_per_Acre\n1,Goa,100\n2,,200\n";
        let table = Table::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column_names(), &["Land_ID", "State", "Price_per_Acre"]);
        assert_eq!(
            table.text("State").unwrap(),
            &[Some("Goa".to_string()), None]
        );
    }

    #[test]
    fn test_read_blank_and_duplicate_headers() {
        let data = ",Land_ID,Land_ID\n0,1,2\n";
        let table = Table::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(table.column_names(), &["Unnamed: 0", "Land_ID", "Land_ID.1"]);
    }

    #[test]
    fn test_read_short_record_padded() {
        let data = "a,b,c\n1,2\n";
        let table = Table::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(table.text("c").unwrap(), &[None]);
    }

    #[test]
    fn test_read_invalid_utf8_is_lossy() {
        let mut data = b"Land_ID,District\n1,".to_vec();
        data.push(0xe9);
        data.extend_from_slice(b"vora\n");
        let table = Table::from_csv_reader(data.as_slice()).unwrap();
        let district = table.text("District").unwrap()[0].clone().unwrap();
        assert!(district.ends_with("vora"));
    }

    #[test]
    fn test_write_then_read() {
        let table = Table::from_columns(vec![
            ("Land_ID".to_string(), Column::Numeric(vec![Some(1.0), Some(2.0)])),
            (
                "Soil_Type".to_string(),
                Column::Text(vec![Some("red".into()), None]),
            ),
        ])
        .unwrap();

        let mut buf = Vec::new();
        table.to_csv_writer(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Land_ID,Soil_Type\n1,red\n2,\n");

        let loaded = Table::from_csv_reader(text.as_bytes()).unwrap();
        assert_eq!(loaded.text("Soil_Type").unwrap()[1], None);
    }
}
