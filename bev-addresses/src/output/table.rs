//! Sortie table CSV (`;`-séparé, comme les extraits du registre)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ColumnsConfig;
use crate::pipeline::policy::OutputRow;

use super::AddressSink;

/// Champ source d'une colonne
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Gemeinde,
    Ortschaft,
    Plz,
    Strasse,
    Strassenzusatz,
    Hausnrtext,
    Hausnummer,
    Hofname,
    Gkz,
    Code,
    Subadresse,
    Bezeichnung,
    Ambiguous,
    X,
    Y,
}

impl Field {
    fn parse(source: &str) -> Result<Self> {
        Ok(match source {
            "gemeinde" => Field::Gemeinde,
            "ortschaft" => Field::Ortschaft,
            "plz" => Field::Plz,
            "strasse" => Field::Strasse,
            "strassenzusatz" => Field::Strassenzusatz,
            "hausnrtext" => Field::Hausnrtext,
            "hausnummer" => Field::Hausnummer,
            "hofname" => Field::Hofname,
            "gkz" => Field::Gkz,
            "code" => Field::Code,
            "subadresse" => Field::Subadresse,
            "bezeichnung" => Field::Bezeichnung,
            "ambiguous" => Field::Ambiguous,
            "x" => Field::X,
            "y" => Field::Y,
            other => anyhow::bail!("unknown column source: {}", other),
        })
    }

    fn render(self, row: &OutputRow, buf: &mut String) {
        match self {
            Field::Gemeinde => push_csv_text_field(buf, &row.gemeinde),
            Field::Ortschaft => push_csv_text_field(buf, &row.ortschaft),
            Field::Plz => push_csv_text_field(buf, &row.plz),
            Field::Strasse => push_csv_text_field(buf, &row.strasse),
            Field::Strassenzusatz => push_csv_text_field(buf, &row.strassenzusatz),
            Field::Hausnrtext => push_csv_text_field(buf, &row.hausnrtext),
            Field::Hausnummer => push_csv_text_field(buf, &row.hausnummer),
            Field::Hofname => push_csv_text_field(buf, &row.hofname),
            Field::Gkz => push_csv_text_field(buf, &row.gkz),
            Field::Code => push_csv_text_field(buf, &row.code),
            Field::Subadresse => push_csv_text_field(buf, &row.subadresse),
            Field::Bezeichnung => push_csv_text_field(buf, &row.bezeichnung),
            Field::Ambiguous => buf.push_str(if row.ambiguous { "1" } else { "" }),
            Field::X => buf.push_str(&row.x.to_string()),
            Field::Y => buf.push_str(&row.y.to_string()),
        }
    }
}

/// Sortie table: une ligne CSV par `OutputRow`
pub struct TableSink {
    writer: BufWriter<File>,
    fields: Vec<Field>,
}

impl TableSink {
    /// Crée le fichier de sortie et écrit l'en-tête
    pub fn create(path: &Path, columns: &ColumnsConfig) -> Result<Self> {
        let fields = columns
            .columns
            .iter()
            .map(|c| Field::parse(&c.source))
            .collect::<Result<Vec<_>>>()?;

        let file = File::create(path)
            .context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        let header: Vec<&str> = columns.columns.iter().map(|c| c.name.as_str()).collect();
        writeln!(writer, "{}", header.join(";"))?;

        Ok(Self { writer, fields })
    }
}

impl AddressSink for TableSink {
    fn add(&mut self, row: &OutputRow) -> Result<()> {
        let mut line = String::with_capacity(128);
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(';');
            }
            field.render(row, &mut line);
        }
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Ajoute un champ texte, cité seulement si nécessaire
fn push_csv_text_field(buf: &mut String, value: &str) {
    if value.contains(';') || value.contains('"') || value.contains('\n') {
        buf.push('"');
        for c in value.chars() {
            if c == '"' {
                buf.push('"');
            }
            buf.push(c);
        }
        buf.push('"');
    } else {
        buf.push_str(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> OutputRow {
        OutputRow {
            gemeinde: "Eisenstadt".to_string(),
            ortschaft: "Eisenstadt".to_string(),
            plz: "7000".to_string(),
            strasse: "Hauptstraße".to_string(),
            strassenzusatz: String::new(),
            hausnrtext: String::new(),
            hausnummer: "12".to_string(),
            hofname: String::new(),
            gkz: "10101".to_string(),
            code: "1000001".to_string(),
            subadresse: String::new(),
            bezeichnung: String::new(),
            ambiguous: false,
            x: 16.523456,
            y: 47.845612,
        }
    }

    #[test]
    fn test_push_csv_text_field() {
        let mut buf = String::new();
        push_csv_text_field(&mut buf, "simple");
        assert_eq!(buf, "simple");

        let mut buf = String::new();
        push_csv_text_field(&mut buf, "with;semicolon");
        assert_eq!(buf, "\"with;semicolon\"");

        let mut buf = String::new();
        push_csv_text_field(&mut buf, "with \"quotes\"");
        assert_eq!(buf, "\"with \"\"quotes\"\"\"");
    }

    #[test]
    fn test_unknown_column_source() {
        assert!(Field::parse("nope").is_err());
        assert!(Field::parse("hausnummer").is_ok());
    }

    #[test]
    fn test_table_sink_writes_header_and_rows() {
        let dir = std::env::temp_dir().join("bev_table_sink_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.csv");

        let columns = ColumnsConfig::from_preset("compat").unwrap();
        let mut sink = TableSink::create(&path, &columns).unwrap();
        sink.add(&row()).unwrap();
        sink.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Gemeinde;plz;strasse;nummer;x;y"));
        assert_eq!(
            lines.next(),
            Some("Eisenstadt;7000;Hauptstraße;12;16.523456;47.845612")
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}
