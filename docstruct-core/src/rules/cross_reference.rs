use super::engine::{ValidationContext, Validator};
use crate::config::NumberingConvention;
use crate::types::*;
use std::collections::HashSet;

/// Resolves section/table/figure references against the symbol tables and
/// enforces the document type's caption numbering convention.
///
/// Captions resolve regardless of position: a reference may precede its table.
pub struct CrossReferenceValidator;

impl Validator for CrossReferenceValidator {
    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Finding> {
        let symbols = context.symbols;
        let profile = context.profile;
        let convention = profile.numbering;
        let document_type = profile.profile.document_type;

        let sections: HashSet<String> = symbols
            .headings
            .iter()
            .filter_map(HeadingSymbol::section_id)
            .collect();
        let captions: HashSet<(CaptionKind, &str)> = symbols
            .captions
            .iter()
            .map(|c| (c.kind, c.id.as_str()))
            .collect();

        let mut findings = Vec::new();

        for caption in &symbols.captions {
            if let Some(finding) = convention_finding(
                convention,
                document_type,
                caption.kind,
                &caption.id,
                caption.source_index,
            ) {
                findings.push(finding);
            }
        }

        let mut appendix_order: Vec<&str> = Vec::new();

        for reference in &context.references.cross_references {
            if profile.matches_skip_pattern(reference.raw_text) {
                continue;
            }

            let target = reference.target.trim_end_matches('.');
            let at = Some(reference.source_index);

            match reference.kind {
                ReferenceKind::Section => {
                    if !sections.contains(target) {
                        findings.push(unresolved(reference.kind, target, at));
                    } else if reference.enclosing_section.as_deref() == Some(target) {
                        findings.push(Finding::warning(
                            FindingCategory::StructuralInconsistency,
                            at,
                            format!("Circular reference detected: section {target} refers to itself"),
                        ));
                    }
                }
                ReferenceKind::Table | ReferenceKind::Figure => {
                    let Some(kind) = reference.kind.caption_kind() else {
                        continue;
                    };
                    if let Some(finding) =
                        convention_finding(convention, document_type, kind, target, reference.source_index)
                    {
                        findings.push(finding);
                    }
                    if !captions.contains(&(kind, target)) {
                        findings.push(unresolved(reference.kind, target, at));
                    }
                }
                ReferenceKind::Appendix => {
                    if appendix_order.contains(&target) {
                        continue;
                    }
                    if let Some(later) = appendix_order.iter().filter(|seen| **seen > target).min() {
                        findings.push(Finding::warning(
                            FindingCategory::StructuralInconsistency,
                            at,
                            format!("Appendix {target} referenced after Appendix {later}"),
                        ));
                    }
                    appendix_order.push(target);
                }
                ReferenceKind::Acronym => {}
            }
        }

        findings
    }

    fn name(&self) -> &str {
        "CrossReference"
    }

    fn priority(&self) -> u8 {
        3
    }
}

fn unresolved(kind: ReferenceKind, target: &str, at: Option<usize>) -> Finding {
    Finding::error(
        FindingCategory::UnresolvedReference,
        at,
        format!("Reference to non-existent {kind} {target}"),
    )
}

fn convention_finding(
    convention: NumberingConvention,
    document_type: DocumentType,
    kind: CaptionKind,
    id: &str,
    source_index: usize,
) -> Option<Finding> {
    if convention.accepts(id) {
        return None;
    }
    let rule = match convention {
        NumberingConvention::Hyphenated => "hyphenated",
        NumberingConvention::Plain => "plain",
    };
    Some(Finding::error(
        FindingCategory::ConventionMismatch,
        Some(source_index),
        format!(
            "{kind} {id} does not follow the {rule} numbering required for {document_type} documents; use {kind} {}",
            convention.suggest(id)
        ),
    ))
}
