//! Structural guarantees checked over a small corpus of mixed documents.

use crate::{compile, resolve, scan, ConceptConfig, ConceptSearch, DocumentRef, DocumentResult, Span};

const CORPUS: &[&str] = &[
    "",
    "No concepts mentioned here at all.",
    "Recall and sensitivity are related to bias and justice.",
    "Distributive justice and procedural justice; justice for all.",
    "AI systems, ai-assisted review, and AI.",
    "Equality, equals, equal opportunity, inequality and equal-ish terms.",
    "Fairness in AI: fairness metrics, FAIRNESS audits, unfair outcomes.",
    "Ünïcödé bias — naïve sensitivity in 東京 datasets.",
    "distributive justice distributive justice",
    "do no harm, do no harm, non-maleficence.",
    "machine learning fairness metrics report",
];

fn config() -> ConceptConfig {
    ConceptConfig::load(vec![
        ("Theories of Justice", vec!["distributive justice", "procedural justice"]),
        ("Ethical Principles", vec!["justice", "do no harm", "non-maleficence"]),
        ("Performance Metrics", vec!["recall", "sensitivity", "fairness metrics"]),
        ("Data Ethics", vec!["bias", "fair*", "equal*"]),
        ("Artificial Intelligence", vec!["AI", "machine learning"]),
        ("Distribution", vec!["distributive"]),
        (
            "Reporting",
            vec!["learning fairness", "metrics report", "machine learning fairness metrics report"],
        ),
    ])
    .unwrap()
}

fn results() -> Vec<(&'static str, DocumentResult)> {
    let search = ConceptSearch::new(&config()).unwrap();
    CORPUS
        .iter()
        .map(|text| (*text, search.search_text(DocumentRef::new("corpus"), text)))
        .collect()
}

fn check_tree(spans: &[Span], text_length: usize) {
    for span in spans {
        assert!(span.start < span.end, "empty span {:?}", span);
        assert!(span.end <= text_length);
        for child in span.children() {
            assert!(span.contains(child), "{:?} escapes {:?}", child, span);
        }
        for pair in span.children().windows(2) {
            assert!(pair[0].end <= pair[1].start, "crossing siblings {:?}", pair);
        }
        check_tree(span.children(), text_length);
    }
}

#[test]
fn test_span_bounds_and_nesting() {
    for (text, result) in results() {
        assert_eq!(result.text_length(), text.chars().count());
        check_tree(result.spans(), result.text_length());
    }
}

#[test]
fn test_span_text_matches_offsets() {
    for (text, result) in results() {
        for span in result.iter() {
            let by_chars: String = text.chars().skip(span.start).take(span.len()).collect();
            assert_eq!(by_chars, span.text);
            assert_eq!(&text[span.byte_range.clone()], span.text);
        }
    }
}

fn check_order(spans: &[Span]) {
    for pair in spans.windows(2) {
        assert!(pair[0].start <= pair[1].start, "out of order {:?}", pair);
    }
    for span in spans {
        check_order(span.children());
    }
}

#[test]
fn test_roots_and_children_in_reading_order() {
    for (_, result) in results() {
        check_order(result.spans());
        for root in result.spans() {
            let starts: Vec<_> = root.iter().map(|s| s.start).collect();
            let mut sorted = starts.clone();
            sorted.sort_unstable();
            assert_eq!(starts, sorted);
        }
    }
}

#[test]
fn test_partial_overlap_demotes_only_crossing_matches() {
    let search = ConceptSearch::new(&config()).unwrap();
    let text = "machine learning fairness metrics report";
    let result = search.search_text(DocumentRef::new("doc"), text);

    let roots: Vec<_> = result
        .spans()
        .iter()
        .map(|s| (s.concept(), s.text.as_str()))
        .collect();
    assert_eq!(
        roots,
        [
            ("Reporting", text),
            ("Reporting", "learning fairness"),
            ("Reporting", "metrics report"),
        ]
    );
    // matches crossing nothing stay under the whole phrase
    let nested: Vec<_> = result.spans()[0]
        .iter()
        .with_depth()
        .map(|(depth, s)| (depth, s.text.as_str()))
        .collect();
    assert_eq!(
        nested,
        [
            (0, text),
            (1, "machine learning"),
            (1, "fairness metrics"),
            (2, "fairness"),
        ]
    );
}

#[test]
fn test_every_raw_match_is_counted() {
    let patterns = compile(&config()).unwrap();
    for (text, result) in results() {
        let raw = scan(text, &patterns);
        assert_eq!(result.match_count(), raw.len());
        let total: usize = result.counts().map(|(_, n)| n).sum();
        assert_eq!(total, raw.len());
    }
}

#[test]
fn test_scan_and_resolve_are_deterministic() {
    let patterns = compile(&config()).unwrap();
    for text in CORPUS {
        assert_eq!(resolve(scan(text, &patterns)), resolve(scan(text, &patterns)));
    }
}

#[test]
fn test_annotated_strips_back_to_text() {
    for (text, result) in results() {
        let annotated = result.annotated(text).unwrap();
        let stripped: String = strip_markers(&annotated);
        assert_eq!(stripped, text);
    }
}

fn strip_markers(annotated: &str) -> String {
    let mut out = String::new();
    let mut in_label = false;
    for c in annotated.chars() {
        match c {
            '«' => in_label = true,
            ':' if in_label => in_label = false,
            '»' => {}
            _ if in_label => {}
            _ => out.push(c),
        }
    }
    out
}

#[test]
fn test_case_rule() {
    let search = ConceptSearch::new(&config()).unwrap();
    let result = search.search_text(DocumentRef::new("doc"), "AI systems, ai-assisted review, and AI.");
    let found: Vec<_> = result.matches_for("Artificial Intelligence").map(|s| s.start).collect();
    assert_eq!(found, [0, 36]);

    let result = search.search_text(DocumentRef::new("doc"), "FAIRNESS and fairness");
    assert_eq!(result.count_for("Data Ethics"), 2);
}

#[test]
fn test_wildcard_rule() {
    let search = ConceptSearch::new(&config()).unwrap();
    let text = "Equality, equals, equal opportunity, inequality and equal-ish terms.";
    let result = search.search_text(DocumentRef::new("doc"), text);
    let found: Vec<_> = result.matches_for("Data Ethics").map(|s| s.text.as_str()).collect();
    assert_eq!(found, ["Equality", "equals", "equal", "equal"]);
    assert!(result.iter().all(|s| !s.text.contains(' ')));
}
