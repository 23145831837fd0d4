//! Line-oriented parser for GenBank flat-file records.
//!
//! The registry returns record batches as concatenated flat-file entries
//! separated by `//` lines. Parsing extracts the accession, version tag,
//! definition, sequence payload, the first bibliographic reference, and a
//! fixed qualifier set from the entry's `source` feature. Entries without
//! a sequence payload (e.g. CONTIG-only entries) are skipped.

use crate::record::SequenceRecord;
use arca_core::TaxonId;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Parse a batch of flat-file entries into records.
pub fn parse_genbank(text: &str) -> Vec<SequenceRecord> {
    let mut records = Vec::new();
    let mut entry: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.starts_with("//") {
            if let Some(record) = parse_entry(&entry) {
                records.push(record);
            }
            entry.clear();
        } else {
            entry.push(line);
        }
    }
    if let Some(record) = parse_entry(&entry) {
        records.push(record);
    }

    records
}

/// One top-level keyword section of a flat-file entry
struct Section<'a> {
    keyword: &'a str,
    /// Remainder of the keyword line
    value: &'a str,
    /// Indented continuation lines
    lines: Vec<&'a str>,
}

fn split_sections<'a>(lines: &[&'a str]) -> Vec<Section<'a>> {
    let mut sections: Vec<Section<'a>> = Vec::new();
    for &line in lines {
        if line.is_empty() {
            continue;
        }
        if !line.starts_with(' ') {
            let mut parts = line.splitn(2, char::is_whitespace);
            let keyword = parts.next().unwrap_or("");
            let value = parts.next().unwrap_or("").trim();
            sections.push(Section {
                keyword,
                value,
                lines: Vec::new(),
            });
        } else if let Some(section) = sections.last_mut() {
            section.lines.push(line);
        }
    }
    sections
}

fn parse_entry(lines: &[&str]) -> Option<SequenceRecord> {
    if lines.is_empty() {
        return None;
    }

    let mut locus_name = String::new();
    let mut modification_date = None;
    let mut accession = String::new();
    let mut version = String::new();
    let mut definition = String::new();
    let mut keywords = String::new();
    let mut lineage_text = String::new();
    let mut authors = String::new();
    let mut title = String::new();
    let mut journal = String::new();
    let mut qualifiers: HashMap<String, Vec<String>> = HashMap::new();
    let mut sequence = String::new();
    let mut seen_reference = false;

    for section in split_sections(lines) {
        match section.keyword {
            "LOCUS" => {
                let mut tokens = section.value.split_whitespace();
                locus_name = tokens.next().unwrap_or("").to_string();
                if let Some(last) = section.value.split_whitespace().last() {
                    modification_date = parse_flat_date(last);
                }
            }
            "DEFINITION" => definition = join_continuation(section.value, &section.lines),
            "ACCESSION" => {
                accession = section
                    .value
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .to_string();
            }
            "VERSION" => {
                version = section
                    .value
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .to_string();
            }
            "KEYWORDS" => {
                let joined = join_continuation(section.value, &section.lines);
                let trimmed = joined.trim_end_matches('.').trim();
                keywords = trimmed.to_string();
            }
            "SOURCE" => lineage_text = parse_lineage(&section.lines),
            "REFERENCE" if !seen_reference => {
                seen_reference = true;
                let (a, t, j) = parse_reference(&section.lines);
                authors = a;
                title = t;
                journal = j;
            }
            "FEATURES" => qualifiers = parse_source_qualifiers(&section.lines),
            "ORIGIN" => {
                for line in &section.lines {
                    sequence.extend(
                        line.chars()
                            .filter(char::is_ascii_alphabetic)
                            .map(|c| c.to_ascii_uppercase()),
                    );
                }
            }
            _ => {}
        }
    }

    if accession.is_empty() {
        accession = locus_name;
    }
    if accession.is_empty() || sequence.is_empty() {
        // no stable identity or undefined sequence payload
        return None;
    }
    if version.is_empty() {
        version = accession.clone();
    }

    let mut record = SequenceRecord::new(accession, version);
    record.definition = definition;
    record.sequence = sequence;
    record.keywords = keywords;
    record.lineage_text = lineage_text;
    record.authors = authors;
    record.title = title;
    record.journal = journal;
    record.modification_date = modification_date;

    let first = |key: &str| -> String {
        qualifiers
            .get(key)
            .and_then(|v| v.first())
            .cloned()
            .unwrap_or_default()
    };
    record.organism = first("organism");
    record.organelle = first("organelle");
    record.isolate = first("isolate");
    record.country = first("country");
    record.specimen_voucher = first("specimen_voucher");
    record.type_material = first("type_material");
    record.lat_lon = first("lat_lon");
    record.identified_by = first("identified_by");
    record.collected_by = first("collected_by");
    record.collection_date = first("collection_date");

    // Only the taxonomy database cross-reference is of interest
    if let Some(xrefs) = qualifiers.get("db_xref") {
        for xref in xrefs {
            if let Some(id) = xref.strip_prefix("taxon:") {
                record.taxid = id.trim().parse().ok().map(TaxonId::new);
                break;
            }
        }
    }

    // Fall back to the free-text note when it names type material
    if record.type_material.is_empty() {
        if let Some(notes) = qualifiers.get("note") {
            let notes = notes.join("\n");
            let lower = notes.to_lowercase();
            if lower.contains("paratype") || lower.contains("holotype") {
                record.type_material = if lower.starts_with("type: ") && notes.len() > 6 {
                    notes[6..].to_string()
                } else {
                    tracing::warn!(
                        accession = %record.accession,
                        "type material inferred from note without a 'type: ' prefix"
                    );
                    notes
                };
            }
        }
    }

    Some(record)
}

fn join_continuation(value: &str, lines: &[&str]) -> String {
    let mut parts = vec![value.trim()];
    parts.extend(lines.iter().map(|l| l.trim()));
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// Lineage lines follow the ORGANISM sub-keyword inside SOURCE
fn parse_lineage(lines: &[&str]) -> String {
    let mut lineage_parts = Vec::new();
    let mut in_lineage = false;
    for line in lines {
        let trimmed = line.trim();
        if let Some(_name) = trimmed.strip_prefix("ORGANISM") {
            in_lineage = true;
            continue;
        }
        if in_lineage && !trimmed.is_empty() {
            lineage_parts.push(trimmed);
        }
    }
    lineage_parts
        .join(" ")
        .trim_end_matches('.')
        .to_string()
}

const REFERENCE_SUBKEYWORDS: [&str; 7] = [
    "AUTHORS", "CONSRTM", "TITLE", "JOURNAL", "PUBMED", "MEDLINE", "REMARK",
];

fn parse_reference(lines: &[&str]) -> (String, String, String) {
    let mut fields: HashMap<&str, String> = HashMap::new();
    let mut current: Option<&str> = None;

    for line in lines {
        let trimmed = line.trim();
        let keyword = REFERENCE_SUBKEYWORDS
            .iter()
            .copied()
            .find(|k| trimmed.starts_with(k));
        if let Some(keyword) = keyword {
            current = Some(keyword);
            let value = trimmed[keyword.len()..].trim();
            fields.insert(keyword, value.to_string());
        } else if let Some(keyword) = current {
            let entry = fields.entry(keyword).or_default();
            if !entry.is_empty() {
                entry.push(' ');
            }
            entry.push_str(trimmed);
        }
    }

    (
        fields.remove("AUTHORS").unwrap_or_default(),
        fields.remove("TITLE").unwrap_or_default(),
        fields.remove("JOURNAL").unwrap_or_default(),
    )
}

/// Extract the qualifier block of the `source` feature.
///
/// Feature names sit at column 5 of the feature table; qualifier and
/// continuation lines are indented deeper.
fn parse_source_qualifiers(lines: &[&str]) -> HashMap<String, Vec<String>> {
    let mut qualifiers: HashMap<String, Vec<String>> = HashMap::new();
    let mut in_source = false;
    let mut current: Option<String> = None;

    for line in lines {
        let bytes = line.as_bytes();
        let is_feature_start =
            bytes.len() > 5 && line.starts_with("     ") && bytes[5] != b' ';
        if is_feature_start {
            let name = line.trim().split_whitespace().next().unwrap_or("");
            in_source = name == "source";
            current = None;
            continue;
        }
        if !in_source {
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(qualifier) = trimmed.strip_prefix('/') {
            let (key, value) = match qualifier.split_once('=') {
                Some((key, value)) => (key, value),
                None => (qualifier, ""),
            };
            qualifiers
                .entry(key.to_string())
                .or_default()
                .push(value.to_string());
            current = Some(key.to_string());
        } else if let Some(key) = &current {
            if let Some(values) = qualifiers.get_mut(key) {
                if let Some(last) = values.last_mut() {
                    if !last.is_empty() {
                        last.push(' ');
                    }
                    last.push_str(trimmed);
                }
            }
        }
    }

    // Strip surrounding quotes after continuation joining
    for values in qualifiers.values_mut() {
        for value in values.iter_mut() {
            *value = value.trim_matches('"').to_string();
        }
    }
    qualifiers
}

/// Dates in flat files use `dd-MMM-yyyy` with an uppercase month
fn parse_flat_date(token: &str) -> Option<NaiveDate> {
    let mut parts = token.split('-');
    let day: u32 = parts.next()?.parse().ok()?;
    let month = match parts.next()?.to_ascii_uppercase().as_str() {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => return None,
    };
    let year: i32 = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"LOCUS       ON303297                 120 bp    DNA     linear   VRT 23-MAY-2022
DEFINITION  Poecilia reticulata isolate PR-12 cytochrome c oxidase subunit I
            (COI) gene, partial cds; mitochondrial.
ACCESSION   ON303297
VERSION     ON303297.1
KEYWORDS    .
SOURCE      mitochondrion Poecilia reticulata (guppy)
  ORGANISM  Poecilia reticulata
            Eukaryota; Metazoa; Chordata; Actinopterygii; Cyprinodontiformes;
            Poeciliidae; Poecilia.
REFERENCE   1  (bases 1 to 120)
  AUTHORS   Doe,J. and Roe,R.
  TITLE     DNA barcoding of freshwater fishes from Trinidad reveals deep
            intraspecific divergence
  JOURNAL   Unpublished
FEATURES             Location/Qualifiers
     source          1..120
                     /organism="Poecilia reticulata"
                     /organelle="mitochondrion"
                     /mol_type="genomic DNA"
                     /isolate="PR-12"
                     /db_xref="taxon:8081"
                     /country="Trinidad and Tobago: Caroni river drainage,
                     lower reach"
                     /lat_lon="10.59 N 61.40 W"
                     /specimen_voucher="ROM 12345"
                     /collection_date="12-Mar-2021"
                     /collected_by="J. Doe"
     gene            <1..>120
                     /gene="COI"
ORIGIN
        1 cctttatcta gtatttggtg cctgagccgg aatagtagga acagccctta gcctccttat
       61 tcgagcagaa ctaagccaac caggcgccct cctgggcgac gaccaaattt ataatgtaat
//
"#;

    #[test]
    fn test_parse_full_entry() {
        let records = parse_genbank(SAMPLE);
        assert_eq!(records.len(), 1);
        let record = &records[0];

        assert_eq!(record.accession, "ON303297");
        assert_eq!(record.version, "ON303297.1");
        assert_eq!(
            record.definition,
            "Poecilia reticulata isolate PR-12 cytochrome c oxidase subunit I (COI) gene, partial cds; mitochondrial."
        );
        assert_eq!(record.organism, "Poecilia reticulata");
        assert_eq!(record.organelle, "mitochondrion");
        assert_eq!(record.isolate, "PR-12");
        assert_eq!(record.specimen_voucher, "ROM 12345");
        assert_eq!(record.lat_lon, "10.59 N 61.40 W");
        assert_eq!(record.collected_by, "J. Doe");
        assert_eq!(record.collection_date, "12-Mar-2021");
        assert_eq!(record.taxid, Some(TaxonId::new(8081)));
        assert_eq!(record.keywords, "");
        assert_eq!(record.authors, "Doe,J. and Roe,R.");
        assert_eq!(record.journal, "Unpublished");
        assert_eq!(
            record.title,
            "DNA barcoding of freshwater fishes from Trinidad reveals deep intraspecific divergence"
        );
        assert_eq!(
            record.lineage_text,
            "Eukaryota; Metazoa; Chordata; Actinopterygii; Cyprinodontiformes; Poeciliidae; Poecilia"
        );
        assert_eq!(
            record.modification_date,
            NaiveDate::from_ymd_opt(2022, 5, 23)
        );
        assert_eq!(record.len(), 120);
        assert!(record.sequence.starts_with("CCTTTATCTA"));
        assert_eq!(record.ambiguous_bases(), 0);
    }

    #[test]
    fn test_multiline_qualifier_value_is_joined() {
        let records = parse_genbank(SAMPLE);
        assert_eq!(
            records[0].country,
            "Trinidad and Tobago: Caroni river drainage, lower reach"
        );
    }

    #[test]
    fn test_entry_without_sequence_is_skipped() {
        let text = "LOCUS       AB000001                 0 bp    DNA     linear   VRT 01-JAN-2020\n\
                    ACCESSION   AB000001\n\
                    VERSION     AB000001.1\n\
                    //\n";
        assert!(parse_genbank(text).is_empty());
    }

    #[test]
    fn test_multiple_entries() {
        let two = format!("{}{}", SAMPLE, SAMPLE.replace("ON303297", "ON303298"));
        let records = parse_genbank(&two);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].accession, "ON303297");
        assert_eq!(records[1].accession, "ON303298");
    }

    #[test]
    fn test_type_material_from_note_fallback() {
        let text = SAMPLE.replace(
            "/collected_by=\"J. Doe\"",
            "/note=\"type: holotype of Poecilia reticulata\"",
        );
        let records = parse_genbank(&text);
        assert_eq!(
            records[0].type_material,
            "holotype of Poecilia reticulata"
        );
    }

    #[test]
    fn test_explicit_type_material_wins_over_note() {
        let text = SAMPLE.replace(
            "/collected_by=\"J. Doe\"",
            "/type_material=\"paratype of Poecilia reticulata\"\n                     /note=\"type: holotype of something else\"",
        );
        let records = parse_genbank(&text);
        assert_eq!(
            records[0].type_material,
            "paratype of Poecilia reticulata"
        );
    }

    #[test]
    fn test_qualifiers_outside_source_feature_are_ignored() {
        let records = parse_genbank(SAMPLE);
        // /gene lives on the gene feature, not source
        assert!(records[0].organism != "COI");
    }

    #[test]
    fn test_flat_date() {
        assert_eq!(
            parse_flat_date("23-MAY-2022"),
            NaiveDate::from_ymd_opt(2022, 5, 23)
        );
        assert_eq!(parse_flat_date("garbage"), None);
    }
}
