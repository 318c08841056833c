//! Column remapping between pipeline files and database tables
//!
//! Pipeline output files carry their own header names; the dictionaries here
//! translate them to database columns on load and back on export. Value maps
//! (reviewer initials to user ids) live here too so both directions stay in
//! sync.

use std::path::Path;

/// A report sub-entity the loader can move in or out of the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Entity {
    SmallMutations,
    MutationSignatures,
    StructuralVariants,
    TherapeuticTargets,
}

/// How a file value is converted before insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
    /// Reviewer initials mapped to a user id; unmapped initials become NULL
    Reviewer,
}

/// One entry of the rename dictionary
#[derive(Debug, Clone, Copy)]
pub struct ColumnMapping {
    pub file_header: &'static str,
    pub db_column: &'static str,
    pub kind: ColumnKind,
}

const fn map(
    file_header: &'static str,
    db_column: &'static str,
    kind: ColumnKind,
) -> ColumnMapping {
    ColumnMapping {
        file_header,
        db_column,
        kind,
    }
}

const SMALL_MUTATION_MAP: &[ColumnMapping] = &[
    map("gene_name", "gene", ColumnKind::Text),
    map("transcript", "transcript", ColumnKind::Text),
    map("hgvs_protein", "protein_change", ColumnKind::Text),
    map("chromosome_position", "location", ColumnKind::Text),
    map("zygosity", "zygosity", ColumnKind::Text),
    map("tumour_reads", "tumour_reads", ColumnKind::Text),
    map("rna_reads", "rna_reads", ColumnKind::Text),
    map("detected_in", "detected_in", ColumnKind::Text),
    map("last_modified_by", "reviewed_by_id", ColumnKind::Reviewer),
    map("comments", "comments", ColumnKind::Text),
];

const MUTATION_SIGNATURE_MAP: &[ColumnMapping] = &[
    map("signature", "signature", ColumnKind::Text),
    map("pearson", "pearson", ColumnKind::Float),
    map("nnls", "nnls", ColumnKind::Float),
    map("associations", "associations", ColumnKind::Text),
    map("features", "features", ColumnKind::Text),
    map("num_cancer_types", "num_cancer_types", ColumnKind::Integer),
    map("cancer_types", "cancer_types", ColumnKind::Text),
    map("last_modified_by", "reviewed_by_id", ColumnKind::Reviewer),
];

const STRUCTURAL_VARIANT_MAP: &[ColumnMapping] = &[
    map("gene1", "gene1", ColumnKind::Text),
    map("gene2", "gene2", ColumnKind::Text),
    map("exon1", "exon1", ColumnKind::Text),
    map("exon2", "exon2", ColumnKind::Text),
    map("breakpoint", "breakpoint", ColumnKind::Text),
    map("type", "event_type", ColumnKind::Text),
    map("detected_in", "detected_in", ColumnKind::Text),
    map("conventional_name", "conventional_name", ColumnKind::Text),
    map("mavis_product_id", "mavis_product_id", ColumnKind::Text),
    map("last_modified_by", "reviewed_by_id", ColumnKind::Reviewer),
];

const THERAPEUTIC_TARGET_MAP: &[ColumnMapping] = &[
    map("type", "target_type", ColumnKind::Text),
    map("rank", "rank", ColumnKind::Integer),
    map("gene", "gene", ColumnKind::Text),
    map("gene_graphkb_id", "gene_graphkb_id", ColumnKind::Text),
    map("variant", "variant", ColumnKind::Text),
    map("variant_graphkb_id", "variant_graphkb_id", ColumnKind::Text),
    map("therapy", "therapy", ColumnKind::Text),
    map("context", "context", ColumnKind::Text),
    map("evidence_level", "evidence_level", ColumnKind::Text),
    map("notes", "notes", ColumnKind::Text),
];

/// Reviewer initials used by the pipeline mapped to user ids
const REVIEWERS: &[(&str, i32)] = &[
    ("EXP", 1),
    ("MAY", 2),
    ("LHE", 3),
    ("CRR", 4),
    ("KMN", 5),
];

impl Entity {
    /// SQL table name
    pub fn table(&self) -> &'static str {
        match self {
            Self::SmallMutations => "small_mutations",
            Self::MutationSignatures => "mutation_signatures",
            Self::StructuralVariants => "structural_variants",
            Self::TherapeuticTargets => "therapeutic_targets",
        }
    }

    /// The rename dictionary for this entity
    pub fn mappings(&self) -> &'static [ColumnMapping] {
        match self {
            Self::SmallMutations => SMALL_MUTATION_MAP,
            Self::MutationSignatures => MUTATION_SIGNATURE_MAP,
            Self::StructuralVariants => STRUCTURAL_VARIANT_MAP,
            Self::TherapeuticTargets => THERAPEUTIC_TARGET_MAP,
        }
    }

    /// Look up the mapping for a file header
    pub fn mapping_for_header(&self, header: &str) -> Option<&'static ColumnMapping> {
        self.mappings().iter().find(|m| m.file_header == header)
    }

    /// Database columns written on load, in dictionary order
    pub fn db_columns(&self) -> Vec<&'static str> {
        self.mappings().iter().map(|m| m.db_column).collect()
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}

/// Map reviewer initials to a user id; unknown initials map to `None`
pub fn reviewer_id(initials: &str) -> Option<i32> {
    REVIEWERS
        .iter()
        .find(|(name, _)| *name == initials)
        .map(|(_, id)| *id)
}

/// Inverse of [`reviewer_id`], used on export
pub fn reviewer_initials(id: i32) -> Option<&'static str> {
    REVIEWERS
        .iter()
        .find(|(_, reviewer)| *reviewer == id)
        .map(|(name, _)| *name)
}

/// Infer the field delimiter from a file extension; tab unless `.csv`
pub fn delimiter_for_path(path: &Path, overridden: Option<char>) -> u8 {
    if let Some(delimiter) = overridden {
        return delimiter as u8;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => b',',
        _ => b'\t',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    #[test]
    fn test_reviewer_initials_map_to_user_id() {
        assert_eq!(reviewer_id("CRR"), Some(4));
        assert_eq!(reviewer_id("EXP"), Some(1));
    }

    #[test]
    fn test_unmapped_reviewer_is_none() {
        assert_eq!(reviewer_id("ZZZ"), None);
        assert_eq!(reviewer_id(""), None);
    }

    #[test]
    fn test_reviewer_round_trip() {
        for (initials, id) in REVIEWERS {
            assert_eq!(reviewer_id(initials), Some(*id));
            assert_eq!(reviewer_initials(*id), Some(*initials));
        }
    }

    #[test]
    fn test_dictionaries_have_unique_columns() {
        for entity in [
            Entity::SmallMutations,
            Entity::MutationSignatures,
            Entity::StructuralVariants,
            Entity::TherapeuticTargets,
        ] {
            let headers: HashSet<_> = entity.mappings().iter().map(|m| m.file_header).collect();
            let columns: HashSet<_> = entity.mappings().iter().map(|m| m.db_column).collect();
            assert_eq!(headers.len(), entity.mappings().len());
            assert_eq!(columns.len(), entity.mappings().len());
        }
    }

    #[test]
    fn test_renamed_headers_resolve() {
        let mapping = Entity::SmallMutations
            .mapping_for_header("hgvs_protein")
            .unwrap();
        assert_eq!(mapping.db_column, "protein_change");

        let mapping = Entity::StructuralVariants
            .mapping_for_header("type")
            .unwrap();
        assert_eq!(mapping.db_column, "event_type");

        assert!(Entity::SmallMutations
            .mapping_for_header("not_a_column")
            .is_none());
    }

    #[test]
    fn test_delimiter_inference() {
        assert_eq!(delimiter_for_path(&PathBuf::from("muts.tsv"), None), b'\t');
        assert_eq!(delimiter_for_path(&PathBuf::from("muts.txt"), None), b'\t');
        assert_eq!(delimiter_for_path(&PathBuf::from("muts.csv"), None), b',');
        assert_eq!(
            delimiter_for_path(&PathBuf::from("muts.csv"), Some(';')),
            b';'
        );
    }
}
