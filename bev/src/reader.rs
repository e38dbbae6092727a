//! Lecture bas niveau des CSV du BEV
//!
//! Format: champs séparés par `;`, entourés de guillemets doubles, une
//! ligne d'en-tête avec les noms de colonnes. Les extraits récents sont en
//! UTF-8 avec BOM, les anciens en Windows-1252. Les champs ne contiennent
//! pas de retours à la ligne.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use memchr::memchr;

use crate::BevError;

/// BOM UTF-8
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Un fichier CSV entièrement chargé en mémoire, en-tête résolu
#[derive(Debug)]
pub struct CsvFile {
    /// Nom du fichier (ex: "ADRESSE.csv")
    name: String,
    /// Contenu décodé
    content: String,
    /// Position du début de la première ligne de données
    data_start: usize,
    /// En-tête: nom de colonne -> index
    header: Header,
}

/// En-tête d'un fichier CSV
#[derive(Debug, Default)]
pub struct Header {
    index: HashMap<String, usize>,
}

impl Header {
    /// Résout l'index d'une colonne par son nom
    pub fn column(&self, file: &str, name: &str) -> Result<usize, BevError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| BevError::invalid_header(file, name))
    }

    /// Nombre de colonnes déclarées
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl CsvFile {
    /// Ouvre une table du registre dans le répertoire d'entrée.
    ///
    /// Un fichier absent est une erreur fatale (`MissingFile`), par contrat
    /// avec le pipeline: sans table source complète, la conversion n'a pas
    /// de sens.
    pub fn open(dir: &Path, name: &str) -> Result<Self, BevError> {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(BevError::MissingFile(path.display().to_string()));
        }

        let bytes = std::fs::read(&path)?;
        let content = decode(&bytes);

        let header_end = memchr(b'\n', content.as_bytes()).unwrap_or(content.len());
        let header_line = content[..header_end].trim_end_matches('\r');
        if header_line.is_empty() {
            return Err(BevError::invalid_header(name, "<empty header>"));
        }

        let mut fields = Vec::new();
        split_fields(header_line, &mut fields);
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            index.insert(field.trim().to_string(), i);
        }

        let data_start = (header_end + 1).min(content.len());

        Ok(Self {
            name: name.to_string(),
            content,
            data_start,
            header: Header { index },
        })
    }

    /// Nom du fichier source
    pub fn name(&self) -> &str {
        &self.name
    }

    /// En-tête résolu
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Itère sur les lignes de données (l'en-tête est déjà consommé)
    pub fn rows(&self) -> RowIter<'_> {
        RowIter {
            data: &self.content,
            pos: self.data_start,
            line_no: 1,
        }
    }
}

/// Décode les bytes d'un extrait: UTF-8 (avec ou sans BOM) en priorité,
/// sinon Windows-1252 (anciens extraits)
fn decode(bytes: &[u8]) -> String {
    let data = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if simdutf8::basic::from_utf8(data).is_ok() {
        let (text, _) = encoding_rs::UTF_8.decode_without_bom_handling(data);
        text.into_owned()
    } else {
        let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(data);
        text.into_owned()
    }
}

/// Une ligne de données découpée en champs
#[derive(Debug)]
pub struct Row<'a> {
    fields: Vec<Cow<'a, str>>,
    /// Numéro de ligne de données (1-based, en-tête exclu)
    pub line_no: usize,
}

impl<'a> Row<'a> {
    /// Valeur d'un champ par index de colonne, chaîne vide si absent.
    ///
    /// Les lignes tronquées sont ainsi traitées comme des champs vides, et
    /// c'est la politique de skip du pipeline qui décide de leur sort.
    pub fn get(&self, idx: usize) -> &str {
        self.fields.get(idx).map(Cow::as_ref).unwrap_or("")
    }

    /// Nombre de champs présents
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Itérateur sur les lignes de données
pub struct RowIter<'a> {
    data: &'a str,
    pos: usize,
    line_no: usize,
}

impl<'a> Iterator for RowIter<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Row<'a>> {
        loop {
            if self.pos >= self.data.len() {
                return None;
            }

            let rest = &self.data[self.pos..];
            let (line, consumed) = match memchr(b'\n', rest.as_bytes()) {
                Some(nl) => (&rest[..nl], nl + 1),
                None => (rest, rest.len()),
            };
            self.pos += consumed;

            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            let mut fields = Vec::new();
            split_fields(line, &mut fields);
            let row = Row {
                fields,
                line_no: self.line_no,
            };
            self.line_no += 1;
            return Some(row);
        }
    }
}

/// Découpe une ligne en champs `;`-séparés, avec guillemets optionnels.
///
/// Un `;` à l'intérieur d'un champ entre guillemets ne sépare pas; `""` dans
/// un champ entre guillemets encode un guillemet littéral.
pub(crate) fn split_fields<'a>(line: &'a str, out: &mut Vec<Cow<'a, str>>) {
    out.clear();
    let bytes = line.as_bytes();
    let mut i = 0;

    loop {
        if i < bytes.len() && bytes[i] == b'"' {
            // Champ entre guillemets
            let start = i + 1;
            let mut j = start;
            let mut escaped = false;
            while j < bytes.len() {
                if bytes[j] == b'"' {
                    if j + 1 < bytes.len() && bytes[j + 1] == b'"' {
                        escaped = true;
                        j += 2;
                        continue;
                    }
                    break;
                }
                j += 1;
            }
            let raw = &line[start..j.min(bytes.len())];
            if escaped {
                out.push(Cow::Owned(raw.replace("\"\"", "\"")));
            } else {
                out.push(Cow::Borrowed(raw));
            }
            // Avancer après le guillemet fermant jusqu'au prochain `;`
            i = j + 1;
            match memchr(b';', &bytes[i.min(bytes.len())..]) {
                Some(sep) => i += sep + 1,
                None => return,
            }
        } else {
            // Champ nu
            match memchr(b';', &bytes[i..]) {
                Some(sep) => {
                    out.push(Cow::Borrowed(&line[i..i + sep]));
                    i += sep + 1;
                }
                None => {
                    out.push(Cow::Borrowed(&line[i..]));
                    return;
                }
            }
        }
    }
}

/// Parse un champ coordonnée du registre.
///
/// Champ vide ou non numérique -> `None`; les virgules décimales des vieux
/// extraits sont acceptées.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }
    if let Ok(n) = fast_float::parse::<f64, _>(v) {
        return Some(n);
    }
    if v.contains(',') {
        return fast_float::parse(v.replace(',', ".")).ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn split(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        split_fields(line, &mut fields);
        fields.into_iter().map(|f| f.into_owned()).collect()
    }

    #[test]
    fn test_split_plain() {
        assert_eq!(split("a;b;c"), vec!["a", "b", "c"]);
        assert_eq!(split("a;;c"), vec!["a", "", "c"]);
        assert_eq!(split(""), vec![""]);
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(split("\"a\";\"b\""), vec!["a", "b"]);
        assert_eq!(split("\"a;b\";\"c\""), vec!["a;b", "c"]);
        assert_eq!(split("\"Gasthof \"\"Post\"\"\";\"1\""), vec![
            "Gasthof \"Post\"",
            "1"
        ]);
    }

    #[test]
    fn test_split_mixed() {
        assert_eq!(split("\"a\";b;\"c\""), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("12345.67"), Some(12345.67));
        assert_eq!(parse_coordinate("12345,67"), Some(12345.67));
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("   "), None);
        assert_eq!(parse_coordinate("abc"), None);
        assert_eq!(parse_coordinate("-5000"), Some(-5000.0));
    }

    #[test]
    fn test_decode_utf8_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("GKZ;NAME\n\"10101\";\"Eisenstadt\"\n".as_bytes());
        let text = decode(&bytes);
        assert!(text.starts_with("GKZ"));
    }

    #[test]
    fn test_decode_windows_1252() {
        // "Straße" en Windows-1252: ß = 0xDF
        let bytes = b"NAME\nStra\xdfe\n";
        let text = decode(bytes);
        assert!(text.contains("Straße"));
    }

    #[test]
    fn test_open_and_iterate() {
        let dir = std::env::temp_dir().join("bev_reader_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("GEMEINDE.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all("\u{feff}\"GKZ\";\"GEMEINDENAME\"\r\n\"10101\";\"Eisenstadt\"\r\n\"10201\";\"Rust\"\r\n".as_bytes())
            .unwrap();
        drop(f);

        let file = CsvFile::open(&dir, "GEMEINDE.csv").unwrap();
        let gkz = file.header().column("GEMEINDE.csv", "GKZ").unwrap();
        let name = file.header().column("GEMEINDE.csv", "GEMEINDENAME").unwrap();

        let rows: Vec<_> = file.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(gkz), "10101");
        assert_eq!(rows[0].get(name), "Eisenstadt");
        assert_eq!(rows[1].get(name), "Rust");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_open_missing_file() {
        let dir = std::env::temp_dir();
        let err = CsvFile::open(&dir, "DOES_NOT_EXIST.csv").unwrap_err();
        assert!(matches!(err, BevError::MissingFile(_)));
    }

    #[test]
    fn test_truncated_row_reads_empty() {
        let dir = std::env::temp_dir().join("bev_reader_trunc");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("T.csv");
        std::fs::write(&path, "A;B;C\n1;2\n").unwrap();

        let file = CsvFile::open(&dir, "T.csv").unwrap();
        let c = file.header().column("T.csv", "C").unwrap();
        let row = file.rows().next().unwrap();
        assert_eq!(row.get(c), "");

        std::fs::remove_file(path).ok();
    }
}
