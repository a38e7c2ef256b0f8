//! Content type lookup
//!
//! Genomics formats are matched by file-name suffix in table order before
//! falling back to a general extension guess.

use std::path::Path;

const OCTET_STREAM: &str = "application/octet-stream";
const TEXT_PLAIN: &str = "text/plain";
const GZIP: &str = "application/gzip";

/// Suffix → content type, checked in order
const GENOMICS_TYPES: &[(&str, &str)] = &[
    (".bam", OCTET_STREAM),
    (".bai", OCTET_STREAM),
    (".cram", OCTET_STREAM),
    (".crai", OCTET_STREAM),
    (".bcf", OCTET_STREAM),
    (".csi", OCTET_STREAM),
    (".tbi", OCTET_STREAM),
    (".bw", OCTET_STREAM),
    (".bigwig", OCTET_STREAM),
    (".bb", OCTET_STREAM),
    (".bigbed", OCTET_STREAM),
    (".2bit", OCTET_STREAM),
    (".vcf", TEXT_PLAIN),
    (".gff", TEXT_PLAIN),
    (".gff3", TEXT_PLAIN),
    (".gtf", TEXT_PLAIN),
    (".bed", TEXT_PLAIN),
    (".bedgraph", TEXT_PLAIN),
    (".wig", TEXT_PLAIN),
    (".sam", TEXT_PLAIN),
    (".fasta", TEXT_PLAIN),
    (".fa", TEXT_PLAIN),
    (".fna", TEXT_PLAIN),
    (".fai", TEXT_PLAIN),
    (".gzi", OCTET_STREAM),
    (".cytoband", TEXT_PLAIN),
    (".gz", GZIP),
    (".bgz", GZIP),
];

/// Content type for the file at `path`
pub fn content_type_for(path: &Path) -> &'static str {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    GENOMICS_TYPES
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|(_, mime)| *mime)
        .or_else(|| mime_guess::from_path(path).first_raw())
        .unwrap_or(OCTET_STREAM)
}
