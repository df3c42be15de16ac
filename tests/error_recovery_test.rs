use pretty_assertions::assert_eq;
use sfpl_rs::{parse_policy, parse_policy_with_config, ParserConfig, SyntaxErrorKind};

#[test]
fn test_unbalanced_group_does_not_hide_later_declarations() {
    let outcome = parse_policy(
        r#"- macro: broken
  condition: (a and b
- list: ok
  items: [x]
- rule: r
  desc: d
  condition: ok_macro
  output: o
  priority: info
"#,
    );

    assert_eq!(outcome.errors.len(), 1);
    let err = &outcome.errors[0];
    assert_eq!(
        err.kind,
        SyntaxErrorKind::UnbalancedGroup {
            found: "'-'".into()
        }
    );
    assert_eq!((err.span.line, err.span.column), (2, 14));
    assert_eq!(err.to_string(), "2:14: unbalanced parenthesis, found '-'");

    let names: Vec<&str> = outcome.document.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["ok", "r"]);
}

#[test]
fn test_all_errors_collected_in_one_pass() {
    let outcome = parse_policy(
        r#"- rule: bad
  desc: d
  condition: a =
  output: o
  priority: low
- list: l
  items: [a,]
- macro: good
  condition: x
- frobnicate: y
- filter: f
  condition: z
"#,
    );

    let kinds: Vec<SyntaxErrorKind> = outcome.errors.iter().map(|e| e.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxErrorKind::MissingOperand {
                operator: "=".into(),
                found: "'output'".into(),
            },
            SyntaxErrorKind::TrailingSeparator {
                found: "']'".into()
            },
            SyntaxErrorKind::UnknownDeclarationKeyword {
                found: "'frobnicate'".into()
            },
        ]
    );

    let lines: Vec<usize> = outcome.errors.iter().map(|e| e.span.line).collect();
    assert_eq!(lines, vec![4, 7, 10]);

    let names: Vec<&str> = outcome.document.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["good", "f"]);
}

#[test]
fn test_stray_tokens_before_first_declaration() {
    let outcome = parse_policy("garbage here\n- list: l\n  items: []");
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(
        outcome.errors[0].kind,
        SyntaxErrorKind::ExpectedToken {
            expected: "'-'".into(),
            found: "'garbage'".into(),
        }
    );
    assert_eq!(outcome.document.len(), 1);
}

#[test]
fn test_no_declarations_at_all() {
    let outcome = parse_policy("just some words");
    let kinds: Vec<SyntaxErrorKind> = outcome.errors.iter().map(|e| e.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxErrorKind::ExpectedToken {
                expected: "'-'".into(),
                found: "'just'".into(),
            },
            SyntaxErrorKind::EmptyDocument,
        ]
    );
    assert!(outcome.document.is_empty());
}

#[test]
fn test_error_in_last_declaration() {
    let outcome = parse_policy("- list: l\n  items: [a]\n- macro: m\n  condition: not");
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(
        outcome.errors[0].kind,
        SyntaxErrorKind::MissingOperand {
            operator: "not".into(),
            found: "end of input".into(),
        }
    );
    assert_eq!(outcome.document.len(), 1);
}

#[test]
fn test_unknown_keyword_after_error_is_reported() {
    let outcome = parse_policy(
        "- macro: m\n  condition: a and\n- rulez: r\n- list: l\n  items: []",
    );
    let kinds: Vec<SyntaxErrorKind> = outcome.errors.iter().map(|e| e.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxErrorKind::MissingOperand {
                operator: "and".into(),
                found: "'-'".into(),
            },
            SyntaxErrorKind::UnknownDeclarationKeyword {
                found: "'rulez'".into(),
            },
        ]
    );
    let lines: Vec<usize> = outcome.errors.iter().map(|e| e.span.line).collect();
    assert_eq!(lines, vec![3, 3]);

    let names: Vec<&str> = outcome.document.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["l"]);
}

#[test]
fn test_same_errors_whatever_precedes() {
    let tail = "- rulez: r\n- list: l\n  items: []";
    let after_valid = parse_policy(&format!("- macro: m\n  condition: a\n{tail}"));
    let after_broken = parse_policy(&format!("- macro: m\n  condition: a and\n{tail}"));

    let unknown = |errors: &[sfpl_rs::SyntaxError]| {
        errors
            .iter()
            .filter(|e| matches!(e.kind, SyntaxErrorKind::UnknownDeclarationKeyword { .. }))
            .count()
    };
    assert_eq!(unknown(&after_valid.errors), 1);
    assert_eq!(unknown(&after_broken.errors), 1);
}

#[test]
fn test_resync_ignores_dash_inside_a_line() {
    let outcome = parse_policy(
        "- macro: m\n  condition: a and\n  - b - c\n- list: l\n  items: []",
    );
    let kinds: Vec<SyntaxErrorKind> = outcome.errors.iter().map(|e| e.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxErrorKind::MissingOperand {
                operator: "and".into(),
                found: "'-'".into(),
            },
            SyntaxErrorKind::UnknownDeclarationKeyword {
                found: "'b'".into(),
            },
        ]
    );
    let names: Vec<&str> = outcome.document.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["l"]);
}

#[test]
fn test_nesting_limit_recovers() {
    let source = format!(
        "- macro: deep\n  condition: {}a{}\n- list: l\n  items: []",
        "(".repeat(60),
        ")".repeat(60)
    );
    let outcome = parse_policy(&source);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(
        outcome.errors[0].kind,
        SyntaxErrorKind::NestingTooDeep { limit: 50 }
    );
    assert_eq!(outcome.document.len(), 1);

    let relaxed = ParserConfig::new().max_depth(100);
    assert!(parse_policy_with_config(&source, relaxed).is_ok());
}

#[test]
fn test_missing_operand_list_close() {
    let outcome = parse_policy(
        "- macro: m\n  condition: proc.name in (a, b\n- macro: n\n  condition: c",
    );
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(
        outcome.errors[0].kind,
        SyntaxErrorKind::UnterminatedOperandList {
            operator: "in".into(),
            found: "'-'".into(),
        }
    );
    assert_eq!(outcome.document.len(), 1);
}
