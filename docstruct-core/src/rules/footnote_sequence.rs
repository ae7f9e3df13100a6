use super::engine::{ValidationContext, Validator};
use crate::types::*;
use std::collections::HashSet;

/// Footnotes count up by one inside a scope; every appendix opens a new scope.
pub struct FootnoteSequenceValidator;

impl Validator for FootnoteSequenceValidator {
    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Finding> {
        let mut state = SequenceState::default();
        context
            .symbols
            .footnotes
            .iter()
            .filter_map(|occurrence| state.accept(occurrence))
            .collect()
    }

    fn name(&self) -> &str {
        "FootnoteSequence"
    }

    fn priority(&self) -> u8 {
        2
    }
}

struct SequenceState {
    /// Wider than footnote numbers so the successor of `u32::MAX` is representable
    expected: u64,
    seen: HashSet<u32>,
    scope_id: u32,
}

impl Default for SequenceState {
    fn default() -> Self {
        Self {
            expected: 1,
            seen: HashSet::new(),
            scope_id: 0,
        }
    }
}

impl SequenceState {
    fn accept(&mut self, occurrence: &FootnoteOccurrence) -> Option<Finding> {
        if occurrence.scope_id != self.scope_id {
            self.expected = 1;
            self.seen.clear();
            self.scope_id = occurrence.scope_id;
        }

        let number = u64::from(occurrence.number);
        let at = Some(occurrence.source_index);

        if number == self.expected {
            self.seen.insert(occurrence.number);
            self.expected = number + 1;
            return None;
        }

        // A repeat is a duplicate even when it is 1 again
        if self.seen.contains(&occurrence.number) {
            return Some(Finding::warning(
                FindingCategory::StructuralInconsistency,
                at,
                format!(
                    "Footnote {number} is duplicated; expected footnote {} next.",
                    self.expected
                ),
            ));
        }

        if number > self.expected {
            let missing = if number - 1 == self.expected {
                self.expected.to_string()
            } else {
                format!("{}-{}", self.expected, number - 1)
            };
            let finding = Finding::warning(
                FindingCategory::StructuralInconsistency,
                at,
                format!(
                    "Footnote numbering gap detected: expected {} but found {number}. Confirm footnotes {missing} are present.",
                    self.expected
                ),
            );
            self.seen.insert(occurrence.number);
            self.expected = number + 1;
            return Some(finding);
        }

        self.seen.insert(occurrence.number);
        let message = if number == 1 {
            "Footnote numbering resets to 1 outside of an appendix heading.".to_string()
        } else {
            format!(
                "Footnote {number} appears out of order; expected footnote {}.",
                self.expected
            )
        };
        Some(Finding::warning(FindingCategory::StructuralInconsistency, at, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(sequence: &[(u32, u32)]) -> Vec<Finding> {
        let mut state = SequenceState::default();
        sequence
            .iter()
            .enumerate()
            .filter_map(|(i, &(number, scope_id))| {
                state.accept(&FootnoteOccurrence {
                    number,
                    source_index: i,
                    scope_id,
                })
            })
            .collect()
    }

    #[test]
    fn test_sequential() {
        assert!(run(&[(1, 0), (2, 0), (3, 0)]).is_empty());
    }

    #[test]
    fn test_gap_reported_once() {
        let findings = run(&[(1, 0), (3, 0), (4, 0)]);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Footnote numbering gap detected: expected 2 but found 3. Confirm footnotes 2 are present."
        );
        assert_eq!(findings[0].source_index, Some(1));
    }

    #[test]
    fn test_gap_range() {
        let findings = run(&[(1, 0), (5, 0)]);
        assert!(findings[0].message.contains("Confirm footnotes 2-4 are present."));
    }

    #[test]
    fn test_duplicate() {
        let findings = run(&[(1, 0), (1, 0)]);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Footnote 1 is duplicated; expected footnote 2 next."
        );
    }

    #[test]
    fn test_appendix_scope_restarts() {
        assert!(run(&[(1, 0), (2, 0), (1, 1), (2, 1)]).is_empty());

        let findings = run(&[(1, 0), (2, 0), (2, 1)]);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("expected 1 but found 2"));
    }

    #[test]
    fn test_reset_outside_appendix() {
        // 1 never accepted in this scope, so it is a reset rather than a duplicate
        let findings = run(&[(2, 0), (3, 0), (1, 0)]);
        assert_eq!(findings.len(), 2);
        assert_eq!(
            findings[1].message,
            "Footnote numbering resets to 1 outside of an appendix heading."
        );
    }

    #[test]
    fn test_largest_number_does_not_overflow() {
        let findings = run(&[(1, 0), (u32::MAX, 0), (u32::MAX, 0)]);
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.contains(&format!("found {}", u32::MAX)));
        assert!(findings[1].message.contains("is duplicated"));
    }

    #[test]
    fn test_out_of_order() {
        let findings = run(&[(1, 0), (2, 0), (4, 0), (3, 0)]);
        assert_eq!(findings.len(), 2);
        assert_eq!(
            findings[1].message,
            "Footnote 3 appears out of order; expected footnote 5."
        );
    }
}
