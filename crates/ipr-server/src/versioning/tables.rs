//! Tables participating in the versioned mutation protocol
//!
//! The revise operation builds SQL with runtime table and column names, so
//! both come from this closed enum and its per-table column allowlists.
//! Nothing caller-supplied ever reaches the SQL text directly.

use serde::{Deserialize, Serialize};

/// A report sub-entity table that supports revisioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionedTable {
    SmallMutations,
    MutationSignatures,
    StructuralVariants,
    TherapeuticTargets,
}

impl VersionedTable {
    /// Every versioned table, for operations that sweep all sub-entities
    pub const ALL: [VersionedTable; 4] = [
        Self::SmallMutations,
        Self::MutationSignatures,
        Self::StructuralVariants,
        Self::TherapeuticTargets,
    ];

    /// SQL table name
    pub fn table(&self) -> &'static str {
        match self {
            Self::SmallMutations => "small_mutations",
            Self::MutationSignatures => "mutation_signatures",
            Self::StructuralVariants => "structural_variants",
            Self::TherapeuticTargets => "therapeutic_targets",
        }
    }

    /// Model name recorded in history entries
    pub fn model(&self) -> &'static str {
        match self {
            Self::SmallMutations => "SmallMutation",
            Self::MutationSignatures => "MutationSignature",
            Self::StructuralVariants => "StructuralVariant",
            Self::TherapeuticTargets => "TherapeuticTarget",
        }
    }

    /// Columns the revise protocol may write. Excludes the surrogate key and
    /// the bookkeeping columns the protocol itself manages.
    pub fn writable_columns(&self) -> &'static [&'static str] {
        match self {
            Self::SmallMutations => &[
                "ident",
                "report_id",
                "gene",
                "transcript",
                "protein_change",
                "location",
                "zygosity",
                "tumour_reads",
                "rna_reads",
                "detected_in",
                "reviewed_by_id",
                "comments",
            ],
            Self::MutationSignatures => &[
                "ident",
                "report_id",
                "signature",
                "pearson",
                "nnls",
                "associations",
                "features",
                "num_cancer_types",
                "cancer_types",
                "reviewed_by_id",
            ],
            Self::StructuralVariants => &[
                "ident",
                "report_id",
                "gene1",
                "gene2",
                "exon1",
                "exon2",
                "breakpoint",
                "event_type",
                "detected_in",
                "conventional_name",
                "mavis_product_id",
                "reviewed_by_id",
            ],
            Self::TherapeuticTargets => &[
                "ident",
                "report_id",
                "target_type",
                "rank",
                "gene",
                "gene_graphkb_id",
                "variant",
                "variant_graphkb_id",
                "therapy",
                "context",
                "evidence_level",
                "notes",
            ],
        }
    }

    /// Whether `column` may appear in a patch or be used as a destroy key
    pub fn is_writable(&self, column: &str) -> bool {
        self.writable_columns().contains(&column)
    }
}

impl std::fmt::Display for VersionedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}
