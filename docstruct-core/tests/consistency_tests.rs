//! End-to-end consistency checks.
//!
//! Fixtures in `test_fixtures/` are small but realistic documents whose full
//! Finding lists are asserted exactly. The behavioral properties of each
//! validator are checked on hand-built paragraph streams, with proptest
//! covering the heading and footnote sequence rules.

use docstruct_core::adapters::{JsonParagraphSource, ParagraphSource, WordMlSource};
use docstruct_core::config::ValidatorConfig;
use docstruct_core::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::path::PathBuf;

// ============================================================================
// Fixture helpers
// ============================================================================

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

fn profiles_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../profiles")
}

fn load_json_fixture(name: &str) -> Vec<ParagraphRecord> {
    JsonParagraphSource
        .read_file(&fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Missing or invalid fixture {name}: {e:#}"))
}

fn paragraphs(texts: &[&str]) -> Vec<ParagraphRecord> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| ParagraphRecord::new(i, *t))
        .collect()
}

/// Profile running a single validator, so assertions see only its findings
fn only(validator: &str, doc_type: DocumentType) -> DocumentProfile {
    let mut profile = ProfileManager::builtin(doc_type);
    profile.validators = vec![ValidatorConfig {
        name: validator.to_string(),
        enabled: true,
    }];
    profile
}

fn run_only(validator: &str, doc_type: DocumentType, texts: &[&str]) -> Vec<Finding> {
    check(&paragraphs(texts), &only(validator, doc_type)).expect("check failed")
}

fn summarize(findings: &[Finding]) -> Vec<(Severity, FindingCategory, Option<usize>, String)> {
    findings
        .iter()
        .map(|f| (f.severity, f.category, f.source_index, f.message.clone()))
        .collect()
}

// ============================================================================
// Full documents
// ============================================================================

mod documents {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn advisory_circular_fixture_findings() {
        let doc = load_json_fixture("advisory_circular.json");
        let profile = ProfileManager::builtin(DocumentType::AdvisoryCircular);
        let findings = check(&doc, &profile).unwrap();

        use FindingCategory::*;
        use Severity::*;
        let expected = vec![
            (Warning, StructuralInconsistency, Some(7),
                "Footnote numbering gap detected: expected 3 but found 4. Confirm footnotes 3 are present.".to_string()),
            (Error, UnresolvedReference, Some(7), "Reference to non-existent table 3-2".to_string()),
            (Error, UnresolvedReference, Some(7), "Reference to non-existent section 4.4".to_string()),
            (Warning, UnresolvedReference, Some(7), "Confirm 'QZX' was defined at its first use".to_string()),
            (Warning, StructuralInconsistency, Some(8),
                "Invalid heading sequence: expected 3.2 but found 3.3".to_string()),
            (Error, StructuralInconsistency, Some(9),
                "Invalid heading sequence: 'Hazard' skipped level 3, missing heading H3".to_string()),
            (Info, UnusedDefinition, Some(10), "Acronym 'SSA' is defined but never used".to_string()),
            (Info, MissingRequiredHeading, None,
                "Missing 'Cancellation.' heading. This section is needed only if the document cancels an earlier version. If not applicable, this can be ignored.".to_string()),
        ];

        assert_eq!(summarize(&findings), expected);
    }

    #[test]
    fn order_wordml_fixture_uses_native_footnotes() {
        let doc = WordMlSource
            .read_file(&fixtures_dir().join("order_body.xml"))
            .expect("order_body.xml should parse");
        assert_eq!(doc.len(), 6, "empty paragraph dropped, indices dense");

        let profile = ProfileManager::builtin(DocumentType::Order);
        let findings = check(&doc, &profile).unwrap();

        use FindingCategory::*;
        use Severity::*;
        let expected = vec![
            (Error, ConventionMismatch, Some(3),
                "Table 1 does not follow the hyphenated numbering required for Order documents; use Table 1-1".to_string()),
            (Warning, StructuralInconsistency, Some(4),
                "Footnote numbering gap detected: expected 2 but found 3. Confirm footnotes 2 are present.".to_string()),
            (Error, ConventionMismatch, Some(4),
                "Table 1 does not follow the hyphenated numbering required for Order documents; use Table 1-1".to_string()),
        ];
        assert_eq!(summarize(&findings), expected);
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let doc = load_json_fixture("advisory_circular.json");
        let engine = ConsistencyEngine::new(&ProfileManager::builtin(DocumentType::AdvisoryCircular)).unwrap();
        let first = engine.check(&doc).unwrap();
        let second = engine.check(&doc).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn report_summary_matches_findings() {
        let doc = load_json_fixture("advisory_circular.json");
        let engine = ConsistencyEngine::new(&ProfileManager::builtin(DocumentType::AdvisoryCircular)).unwrap();
        let report = engine.run(&doc).unwrap();
        assert_eq!(report.summary.errors, 3);
        assert_eq!(report.summary.warnings, 3);
        assert_eq!(report.summary.info, 2);
        assert!(report.has_errors());
        assert_eq!(report.validators.len(), 5, "extraction plus four validators");
    }

    #[test]
    fn unordered_stream_is_rejected() {
        let mut doc = load_json_fixture("advisory_circular.json");
        doc.swap(2, 3);
        let err = check(&doc, &ProfileManager::builtin(DocumentType::AdvisoryCircular)).unwrap_err();
        assert!(matches!(err, CheckError::UnorderedInput { position: 3, previous: 3, found: 2 }));
    }
}

// ============================================================================
// Profiles
// ============================================================================

mod profiles {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shipped_profiles_load_and_compile() {
        for name in ["advisory-circular.yaml", "policy-statement.yaml"] {
            let path = profiles_dir().join(name);
            let profile = DocumentProfile::load_from_file(path.to_str().unwrap())
                .unwrap_or_else(|e| panic!("{name}: {e:#}"));
            assert!(profile.compile().is_ok(), "{name} should compile");
            assert!(!profile.required_headings.is_empty());
        }
    }

    #[test]
    fn shipped_ac_profile_matches_builtin_behavior() {
        let path = profiles_dir().join("advisory-circular.yaml");
        let profile = DocumentProfile::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(profile.numbering_convention(), NumberingConvention::Hyphenated);

        let doc = load_json_fixture("advisory_circular.json");
        let errors = |findings: Vec<Finding>| -> Vec<Finding> {
            findings.into_iter().filter(|f| f.severity == Severity::Error).collect()
        };
        // Vocabulary differs, structure checks do not
        let from_file = errors(check(&doc, &profile).unwrap());
        let builtin = errors(check(&doc, &ProfileManager::builtin(DocumentType::AdvisoryCircular)).unwrap());
        assert_eq!(from_file, builtin);
    }

    #[test]
    fn fallback_to_builtin_on_missing_file() {
        let profile = DocumentProfile::load_with_fallback(Some("/nonexistent/profile.yaml"), DocumentType::Order);
        assert_eq!(profile, ProfileManager::builtin(DocumentType::Order));
    }

    #[test]
    fn invalid_pattern_rejected_before_checking() {
        let mut profile = ProfileManager::builtin(DocumentType::Rule);
        profile.ignore_patterns.push("[A-Z".to_string());
        let err = check(&paragraphs(&["1. Purpose."]), &profile).unwrap_err();
        assert!(matches!(err, CheckError::InvalidPattern { list: "ignore", .. }));
    }
}

// ============================================================================
// Heading hierarchy
// ============================================================================

mod heading_hierarchy {
    use super::*;
    use pretty_assertions::assert_eq;

    fn styled(levels: &[usize]) -> Vec<ParagraphRecord> {
        levels
            .iter()
            .enumerate()
            .map(|(i, level)| {
                ParagraphRecord::new(i, format!("Heading number {i}")).with_style(format!("Heading {level}"))
            })
            .collect()
    }

    fn skip_indices(levels: &[usize]) -> Vec<usize> {
        check(&styled(levels), &only("HeadingHierarchy", DocumentType::Other))
            .unwrap()
            .iter()
            .filter(|f| f.message.contains("skipped level"))
            .filter_map(|f| f.source_index)
            .collect()
    }

    /// Clamp arbitrary levels into a sequence that never deepens by more than one
    fn legal(raw: &[usize]) -> Vec<usize> {
        let mut previous = 0;
        raw.iter()
            .map(|&level| {
                let level = level.min(previous + 1);
                previous = level;
                level
            })
            .collect()
    }

    #[test]
    fn restart_to_lower_level_is_legal() {
        assert!(skip_indices(&[1, 2, 3, 1, 2, 2, 1]).is_empty());
    }

    #[test]
    fn first_heading_below_level_one_is_a_skip() {
        assert_eq!(skip_indices(&[2, 3]), vec![0]);
    }

    proptest! {
        #[test]
        fn legal_sequences_never_skip(raw in prop::collection::vec(1usize..=6, 1..40)) {
            let levels = legal(&raw);
            prop_assert!(skip_indices(&levels).is_empty());
        }

        #[test]
        fn one_violation_yields_one_finding(
            raw in prop::collection::vec(1usize..=6, 2..40),
            position in any::<prop::sample::Index>(),
            jump in 2usize..4,
        ) {
            let mut levels = legal(&raw);
            let k = 1 + position.index(levels.len() - 1);
            levels[k] = levels[k - 1] + jump;
            prop_assert_eq!(skip_indices(&levels), vec![k]);
        }
    }
}

// ============================================================================
// Footnote sequence
// ============================================================================

mod footnote_sequence {
    use super::*;
    use pretty_assertions::assert_eq;

    fn footnote_findings(texts: &[&str]) -> Vec<Finding> {
        run_only("FootnoteSequence", DocumentType::Other, texts)
    }

    #[test]
    fn sequential_footnotes() {
        assert!(footnote_findings(&["a[1]", "b[2]", "c[3]"]).is_empty());
    }

    #[test]
    fn gap_names_expected_number() {
        let findings = footnote_findings(&["a[1]", "b[3]"]);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("expected 2"));
    }

    #[test]
    fn duplicate() {
        let findings = footnote_findings(&["a[1]", "b[1]"]);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("duplicated"));
    }

    #[test]
    fn appendix_restarts_numbering() {
        assert!(footnote_findings(&["a[1]", "b[2]", "Appendix A. Forms", "c[1]", "d[2]"]).is_empty());
    }

    #[test]
    fn appendix_scope_must_start_at_one() {
        let findings = footnote_findings(&["a[1]", "b[2]", "Appendix A. Forms", "c[2]"]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].source_index, Some(3));
        assert!(findings[0].message.contains("expected 1 but found 2"));
    }

    #[test]
    fn largest_bracketed_number_is_a_gap() {
        let findings = footnote_findings(&["a.[1]", "b.[4294967295]"]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].source_index, Some(1));
        assert!(findings[0].message.contains("expected 2 but found 4294967295"));
    }

    #[test]
    fn native_ids_preferred_over_text() {
        let doc = vec![
            ParagraphRecord::new(0, "Claim [7]").with_runs(vec![Run::plain("Claim [7]"), Run::footnote(1)]),
            ParagraphRecord::new(1, "Claim").with_runs(vec![Run::plain("Claim"), Run::footnote(2)]),
        ];
        let findings = check(&doc, &only("FootnoteSequence", DocumentType::Other)).unwrap();
        assert!(findings.is_empty(), "{findings:?}");
    }

    proptest! {
        #[test]
        fn counting_up_is_always_clean(n in 1usize..60) {
            let texts: Vec<String> = (1..=n).map(|i| format!("Claim.[{i}]")).collect();
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            prop_assert!(footnote_findings(&refs).is_empty());
        }
    }
}

// ============================================================================
// Cross-references and numbering convention
// ============================================================================

mod cross_reference {
    use super::*;
    use pretty_assertions::assert_eq;

    fn xref(doc_type: DocumentType, texts: &[&str]) -> Vec<Finding> {
        run_only("CrossReference", doc_type, texts)
    }

    #[test]
    fn table_resolves_anywhere_in_document() {
        assert!(xref(DocumentType::AdvisoryCircular, &["See Table 3-2.", "Table 3-2. Loads"]).is_empty());
        assert!(xref(DocumentType::AdvisoryCircular, &["Table 3-2. Loads", "See Table 3-2."]).is_empty());
    }

    #[test]
    fn missing_table_is_one_finding() {
        let findings = xref(DocumentType::AdvisoryCircular, &["See Table 3-2."]);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("non-existent"));
    }

    #[test]
    fn legal_citation_never_resolved() {
        for text in [
            "See section 5 of the Act.",
            "Authority: 49 U.S.C. 106(g), 40113, and section 44701.",
            "Public Law 108-176 amended section 12.",
            "As in Title 14, Section 21 of the regulations.",
        ] {
            let findings = xref(DocumentType::Rule, &[text]);
            assert!(findings.is_empty(), "{text}: {findings:?}");
        }
    }

    #[test]
    fn hyphenated_type_flags_plain_id() {
        let findings = xref(DocumentType::AdvisoryCircular, &["Table 4"]);
        let convention: Vec<_> = findings
            .iter()
            .filter(|f| f.category == FindingCategory::ConventionMismatch)
            .collect();
        assert_eq!(convention.len(), 1);
    }

    #[test]
    fn plain_type_flags_hyphenated_id() {
        let findings = xref(DocumentType::Exemption, &["Table 4-1"]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, FindingCategory::ConventionMismatch);
    }

    #[test]
    fn matching_convention_is_clean() {
        assert!(xref(DocumentType::AdvisoryCircular, &["Table 4-1"]).is_empty());
        assert!(xref(DocumentType::Exemption, &["Table 4"]).is_empty());
    }

    #[test]
    fn malformed_caption_reported_and_excluded() {
        let doc = paragraphs(&["Table 3- Loads", "See Table 3."]);
        let findings = check(&doc, &only("CrossReference", DocumentType::Rule)).unwrap();
        let categories: Vec<_> = findings.iter().map(|f| (f.source_index, f.category)).collect();
        assert_eq!(
            categories,
            vec![
                (Some(0), FindingCategory::InputMalformed),
                (Some(1), FindingCategory::UnresolvedReference),
            ]
        );
    }
}

// ============================================================================
// Acronyms
// ============================================================================

mod acronyms {
    use super::*;
    use pretty_assertions::assert_eq;

    fn acronym_findings(texts: &[&str]) -> Vec<Finding> {
        run_only("AcronymUsage", DocumentType::AdvisoryCircular, texts)
    }

    #[test]
    fn defined_then_used_is_clean() {
        let findings = acronym_findings(&[
            "The Federal Aviation Administration (FAA) regulates aviation.",
            "FAA is responsible for safety.",
        ]);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn undefined_acronym_flagged_once() {
        let findings = acronym_findings(&["The QZX launched"]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Confirm 'QZX' was defined at its first use");
    }

    #[test]
    fn lone_definition_is_unused() {
        let findings = acronym_findings(&["Contact the Federal Aviation Administration (FAA)."]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
        assert_eq!(findings[0].category, FindingCategory::UnusedDefinition);
    }

    #[test]
    fn divergent_redefinition_is_one_conflict() {
        let doc = paragraphs(&[
            "The National Aeronautics and Space Administration (NASA) builds rockets.",
            "NASA launches them.",
            "The Nonsense Acronym Saving Association (NASA) does not.",
        ]);
        // Conflicts are raised during extraction, whatever validators run
        let findings = check(&doc, &only("AcronymUsage", DocumentType::Other)).unwrap();
        let conflicts: Vec<_> = findings
            .iter()
            .filter(|f| f.category == FindingCategory::DefinitionConflict)
            .collect();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].source_index, Some(2));
    }

    #[test]
    fn lowercase_tokens_are_never_candidates() {
        assert!(acronym_findings(&["The qzx launched and the faa watched."]).is_empty());
    }
}
