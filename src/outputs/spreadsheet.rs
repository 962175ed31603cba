//! Spreadsheet output.
//!
//! Rows are written as an XML Spreadsheet 2003 (SpreadsheetML) workbook with
//! a single "News Articles" sheet, which Excel and LibreOffice open directly.

use crate::models::ClassifiedRow;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::error::Error;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub const SHEET_NAME: &str = "News Articles";
pub const FILE_NAME: &str = "news_data.xml";
pub const HEADER: [&str; 6] = [
    "Title",
    "Date",
    "Description",
    "Image URI",
    "Count Phrases",
    "Contains Money",
];

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";

enum Cell<'a> {
    Text(&'a str),
    Number(u32),
}

fn write_row<W: std::io::Write>(
    writer: &mut Writer<W>,
    cells: &[Cell<'_>],
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new("Row")))?;
    for cell in cells {
        let (kind, value) = match cell {
            Cell::Text(s) => ("String", s.to_string()),
            Cell::Number(n) => ("Number", n.to_string()),
        };
        writer.write_event(Event::Start(BytesStart::new("Cell")))?;
        writer.write_event(Event::Start(
            BytesStart::new("Data").with_attributes([("ss:Type", kind)]),
        ))?;
        writer.write_event(Event::Text(BytesText::new(&value)))?;
        writer.write_event(Event::End(BytesEnd::new("Data")))?;
        writer.write_event(Event::End(BytesEnd::new("Cell")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Row")))?;
    Ok(())
}

/// Render rows, preceded by the header row, as a SpreadsheetML document.
pub fn rows_to_spreadsheet(rows: &[ClassifiedRow]) -> Result<String, Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("Workbook")
            .with_attributes([("xmlns", SPREADSHEET_NS), ("xmlns:ss", SPREADSHEET_NS)]),
    ))?;
    writer.write_event(Event::Start(
        BytesStart::new("Worksheet").with_attributes([("ss:Name", SHEET_NAME)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("Table")))?;

    write_row(&mut writer, &HEADER.map(Cell::Text))?;

    for row in rows {
        write_row(
            &mut writer,
            &[
                Cell::Text(&row.title),
                Cell::Text(&row.formatted_date),
                Cell::Text(&row.cleaned_description),
                Cell::Text(&row.image_reference),
                Cell::Number(row.phrase_count),
                Cell::Text(if row.contains_money { "True" } else { "False" }),
            ],
        )?;
    }

    writer.write_event(Event::End(BytesEnd::new("Table")))?;
    writer.write_event(Event::End(BytesEnd::new("Worksheet")))?;
    writer.write_event(Event::End(BytesEnd::new("Workbook")))?;

    let buf = writer.into_inner().into_inner();
    Ok(String::from_utf8(buf)?)
}

/// Write the workbook to `{output_dir}/news_data.xml`.
#[instrument(level = "info", skip_all, fields(%output_dir, rows = rows.len()))]
pub async fn write_spreadsheet(
    rows: &[ClassifiedRow],
    output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let xml = rows_to_spreadsheet(rows)?;
    fs::create_dir_all(output_dir).await?;
    let path = Path::new(output_dir).join(FILE_NAME);
    fs::write(&path, xml).await?;
    info!(path = %path.display(), "Wrote spreadsheet");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ClassifiedRow {
        ClassifiedRow {
            title: "Fund <expands> & grows".to_string(),
            formatted_date: "10 Jan 2024".to_string(),
            cleaned_description: "$5 million raised".to_string(),
            image_reference: "output/images/img-0.jpg".to_string(),
            phrase_count: 2,
            contains_money: true,
            source_index: 0,
        }
    }

    #[test]
    fn test_header_only_workbook() {
        let xml = rows_to_spreadsheet(&[]).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<Worksheet ss:Name=\"News Articles\">"));
        assert_eq!(xml.matches("<Row>").count(), 1);
        for title in HEADER {
            assert!(xml.contains(&format!("<Data ss:Type=\"String\">{title}</Data>")));
        }
    }

    #[test]
    fn test_row_cells_and_escaping() {
        let xml = rows_to_spreadsheet(&[sample_row()]).unwrap();

        assert_eq!(xml.matches("<Row>").count(), 2);
        assert!(xml.contains("Fund &lt;expands&gt; &amp; grows"));
        assert!(xml.contains("<Data ss:Type=\"Number\">2</Data>"));
        assert!(xml.contains("<Data ss:Type=\"String\">True</Data>"));
        assert!(xml.contains("output/images/img-0.jpg"));
    }

    #[tokio::test]
    async fn test_write_spreadsheet_creates_file() {
        let dir = std::env::temp_dir().join(format!("news_sweep_sheet_{}", std::process::id()));

        let path = write_spreadsheet(&[sample_row()], dir.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(path, dir.join(FILE_NAME));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("$5 million raised"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
