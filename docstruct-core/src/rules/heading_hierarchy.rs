use super::engine::{ValidationContext, Validator};
use crate::config::RequiredHeading;
use crate::extract::detectors::heading_key;
use crate::types::*;
use std::collections::{HashMap, HashSet};

/// Heading levels may deepen one step at a time, siblings count up by one,
/// a level-1 heading must exist, and the profile's required headings must
/// all be present.
pub struct HeadingHierarchyValidator;

impl Validator for HeadingHierarchyValidator {
    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Finding> {
        let headings = &context.symbols.headings;
        let mut findings = Vec::new();

        check_level_steps(headings, &mut findings);
        check_sibling_sequence(headings, &mut findings);

        if !headings.iter().any(|h| h.level == 1) {
            findings.push(Finding::error(
                FindingCategory::StructuralInconsistency,
                None,
                "Document has no level-1 heading",
            ));
        }

        check_required_headings(headings, &context.profile.profile.required_headings, &mut findings);

        findings
    }

    fn name(&self) -> &str {
        "HeadingHierarchy"
    }

    fn priority(&self) -> u8 {
        1
    }
}

fn check_level_steps(headings: &[HeadingSymbol], findings: &mut Vec<Finding>) {
    let mut previous_level = 0;
    for heading in headings {
        if heading.level > previous_level + 1 {
            findings.push(Finding::error(
                FindingCategory::StructuralInconsistency,
                Some(heading.source_index),
                format!(
                    "Invalid heading sequence: '{}' skipped level {}, missing heading H{}",
                    heading.normalized_text,
                    previous_level + 1,
                    previous_level + 1
                ),
            ));
        }
        previous_level = heading.level;
    }
}

/// 1.1 then 1.3 under the same parent is a numbering gap
fn check_sibling_sequence(headings: &[HeadingSymbol], findings: &mut Vec<Finding>) {
    let mut last_child: HashMap<&[u32], u32> = HashMap::new();

    for heading in headings {
        let Some((&number, parent)) = heading.number_path.split_last() else {
            continue;
        };

        if let Some(&last) = last_child.get(parent) {
            if number != last + 1 {
                let mut expected_path = parent.to_vec();
                expected_path.push(last + 1);
                findings.push(Finding::warning(
                    FindingCategory::StructuralInconsistency,
                    Some(heading.source_index),
                    format!(
                        "Invalid heading sequence: expected {} but found {}",
                        join_number_path(&expected_path),
                        join_number_path(&heading.number_path)
                    ),
                ));
            }
        }
        last_child.insert(parent, number);
    }
}

fn check_required_headings(
    headings: &[HeadingSymbol],
    required: &[RequiredHeading],
    findings: &mut Vec<Finding>,
) {
    if required.is_empty() {
        return;
    }

    let present: HashSet<String> = headings
        .iter()
        .map(|h| heading_key(&h.normalized_text))
        .collect();

    let mut missing = Vec::new();
    for heading in required {
        if present.contains(&heading_key(&heading.name)) {
            continue;
        }
        if heading.optional {
            let condition = heading
                .condition
                .as_deref()
                .map(|c| format!(" {c}"))
                .unwrap_or_default();
            findings.push(Finding::info(
                FindingCategory::MissingRequiredHeading,
                None,
                format!(
                    "Missing '{}' heading.{} If not applicable, this can be ignored.",
                    heading.name, condition
                ),
            ));
        } else {
            missing.push(heading.name.as_str());
        }
    }

    if !missing.is_empty() {
        findings.push(Finding::error(
            FindingCategory::MissingRequiredHeading,
            None,
            format!("Missing required headings: {}", missing.join(", ")),
        ));
    }
}
