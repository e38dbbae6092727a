//! Sortie hiérarchie de fichiers OSM XML
//!
//! Un petit fichier par clé de regroupement (rue ou code postal), rangé sous
//! le code postal. Les lignes sont accumulées en mémoire et les fichiers
//! écrits à la fermeture, dans l'ordre trié des clés: deux exécutions sur le
//! même extrait produisent des arborescences identiques octet pour octet.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::OsmGrouping;
use crate::pipeline::policy::OutputRow;

use super::AddressSink;

/// GKZ des villes à statut où la localité vaut arrondissement (suburb)
const STATUTORY_CITY_GKZ: &[&str] = &["20101", "40101", "50101", "60101", "70101"];

/// Sortie OSM: arborescence `<plz>/<rue>.osm` ou `<plz>.osm`
pub struct OsmSink {
    output_dir: PathBuf,
    grouping: OsmGrouping,
    extract_date: String,
    /// Lignes accumulées par chemin relatif de fichier
    pending: BTreeMap<String, Vec<OutputRow>>,
}

impl OsmSink {
    /// Prépare la sortie; seules les coordonnées WGS84 sont acceptées
    pub fn create(
        output_dir: &Path,
        grouping: OsmGrouping,
        extract_date: &str,
        target_epsg: u32,
    ) -> Result<Self> {
        if target_epsg != 4326 {
            anyhow::bail!("OSM output requires EPSG:4326, got EPSG:{}", target_epsg);
        }
        std::fs::create_dir_all(output_dir)
            .context(format!("Failed to create directory: {}", output_dir.display()))?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            grouping,
            extract_date: extract_date.to_string(),
            pending: BTreeMap::new(),
        })
    }

    fn group_key(&self, row: &OutputRow) -> String {
        let plz = if row.plz.is_empty() { "0000" } else { &row.plz };
        match self.grouping {
            OsmGrouping::Postcode => format!("{}.osm", sanitize_filename(plz)),
            OsmGrouping::Street => {
                let street = if row.strasse.is_empty() {
                    "unbenannt"
                } else {
                    &row.strasse
                };
                format!(
                    "{}/{}.osm",
                    sanitize_filename(plz),
                    sanitize_filename(street)
                )
            }
        }
    }

    fn write_file(&self, relative: &str, rows: &[OutputRow]) -> Result<()> {
        let path = self.output_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file =
            File::create(&path).context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "<?xml version='1.0' encoding='UTF-8'?>")?;
        writeln!(writer, "<osm version='0.6' generator='bev-addresses'>")?;

        for (i, row) in rows.iter().enumerate() {
            let node_id = -(i as i64 + 1);
            write_node(&mut writer, node_id, row, &self.extract_date)?;
        }

        writeln!(writer, "</osm>")?;
        writer.flush()?;
        Ok(())
    }
}

impl AddressSink for OsmSink {
    fn add(&mut self, row: &OutputRow) -> Result<()> {
        let key = self.group_key(row);
        self.pending.entry(key).or_default().push(row.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        for (relative, rows) in &pending {
            self.write_file(relative, rows)?;
        }
        Ok(())
    }
}

fn write_node<W: Write>(
    writer: &mut W,
    node_id: i64,
    row: &OutputRow,
    extract_date: &str,
) -> Result<()> {
    writeln!(
        writer,
        "  <node id='{}' visible='true' lat='{}' lon='{}'>",
        node_id, row.y, row.x
    )?;

    write_tag(writer, "addr:country", "AT")?;
    write_tag(writer, "at_bev:addr_date", extract_date)?;
    if !row.plz.is_empty() {
        write_tag(writer, "addr:postcode", &row.plz)?;
    }

    // Quand rue et localité coïncident, l'adresse est du type "place"
    if !row.strasse.is_empty() {
        if row.strasse == row.ortschaft {
            write_tag(writer, "addr:place", &row.strasse)?;
        } else {
            write_tag(writer, "addr:street", &row.strasse)?;
        }
    }

    let (city, suburb) = city_and_suburb(&row.gkz, &row.gemeinde, &row.ortschaft);
    if !city.is_empty() {
        write_tag(writer, "addr:city", &city)?;
    }
    if let Some(suburb) = suburb {
        write_tag(writer, "addr:suburb", &suburb)?;
    }

    let housenumber = if row.hausnummer.is_empty() {
        &row.hausnrtext
    } else {
        &row.hausnummer
    };
    if !housenumber.is_empty() {
        write_tag(writer, "addr:housenumber", housenumber)?;
    }
    if !row.subadresse.is_empty() {
        write_tag(writer, "addr:unit", &row.subadresse)?;
    }

    let note = compose_note(&row.bezeichnung, &row.hofname);
    if !note.is_empty() {
        write_tag(writer, "note", &note)?;
    }

    writeln!(writer, "  </node>")?;
    Ok(())
}

fn write_tag<W: Write>(writer: &mut W, key: &str, value: &str) -> Result<()> {
    writeln!(
        writer,
        "    <tag k='{}' v='{}' />",
        escape_xml(key),
        escape_xml(value)
    )?;
    Ok(())
}

/// Détermine addr:city et addr:suburb depuis commune et localité.
///
/// Dans les villes à statut (Vienne et les cinq capitales de Land), la
/// localité désigne l'arrondissement: elle part en suburb et la commune
/// reste la ville. Ailleurs la localité, débarrassée d'un éventuel suffixe
/// entre parenthèses, fait office de ville.
fn city_and_suburb(gkz: &str, gemeinde: &str, ortschaft: &str) -> (String, Option<String>) {
    let locality = strip_parenthetical(ortschaft);

    let is_statutory = gkz.starts_with('9') || STATUTORY_CITY_GKZ.contains(&gkz);
    if is_statutory {
        let suburb = if locality.is_empty() || locality == gemeinde {
            None
        } else {
            Some(locality)
        };
        (gemeinde.to_string(), suburb)
    } else if locality.is_empty() {
        (gemeinde.to_string(), None)
    } else {
        (locality, None)
    }
}

/// Supprime un suffixe entre parenthèses ("Absdorf (Haag)" -> "Absdorf")
fn strip_parenthetical(name: &str) -> String {
    match name.find('(') {
        Some(pos) => name[..pos].trim_end().to_string(),
        None => name.trim_end().to_string(),
    }
}

fn compose_note(bezeichnung: &str, hofname: &str) -> String {
    match (bezeichnung.is_empty(), hofname.is_empty()) {
        (true, true) => String::new(),
        (false, true) => bezeichnung.to_string(),
        (true, false) => hofname.to_string(),
        (false, false) => format!("{};{}", bezeichnung, hofname),
    }
}

/// Remplace les caractères hostiles aux chemins de fichiers
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\'' => result.push_str("&apos;"),
            '"' => result.push_str("&quot;"),
            c => result.push(c),
        }
    }
    result
}
