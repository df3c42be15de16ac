use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sfpl_rs::{
    parse_expression_str, parse_policy, BinaryOp, Declaration, Expression, Literal, Operand,
    PolicyDocument, SetOp, Span, UnaryOp,
};

fn field() -> impl Strategy<Value = Literal> {
    "[a-z]{1,6}\\.[a-z]{1,6}".prop_map(Literal::Identifier)
}

fn literal() -> impl Strategy<Value = Literal> {
    prop_oneof![
        "v_[a-z]{1,5}".prop_map(Literal::Identifier),
        "[0-9]{1,4}".prop_map(Literal::Number),
        "/[a-z]{1,5}(/[a-z]{1,5})?".prop_map(Literal::Path),
        "'[a-z ]{0,8}'".prop_map(Literal::QuotedString),
    ]
}

fn binary_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Lt),
        Just(BinaryOp::Le),
        Just(BinaryOp::Gt),
        Just(BinaryOp::Ge),
        Just(BinaryOp::Eq),
        Just(BinaryOp::Neq),
        Just(BinaryOp::Contains),
        Just(BinaryOp::IContains),
        Just(BinaryOp::StartsWith),
        Just(BinaryOp::EndsWith),
    ]
}

fn operand() -> impl Strategy<Value = Operand> {
    prop_oneof![
        literal().prop_map(Operand::Literal),
        prop::collection::vec(literal(), 0..3).prop_map(Operand::Items),
    ]
}

fn leaf() -> impl Strategy<Value = Expression> {
    prop_oneof![
        "m_[a-z_]{0,8}".prop_map(Expression::VariableRef),
        field().prop_map(|operand| Expression::UnaryTest {
            operand,
            op: UnaryOp::Exists,
        }),
        (field(), binary_op(), literal())
            .prop_map(|(left, op, right)| Expression::BinaryTest { left, op, right }),
        (
            field(),
            prop_oneof![Just(SetOp::In), Just(SetOp::PatternMatch)],
            prop::collection::vec(operand(), 0..4),
        )
            .prop_map(|(operand, op, candidates)| Expression::SetTest {
                operand,
                op,
                candidates,
            }),
    ]
}

fn expression() -> impl Strategy<Value = Expression> {
    leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Expression::Or),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Expression::And),
            inner.clone().prop_map(|e| Expression::Not(Box::new(e))),
            inner.prop_map(|e| Expression::Grouped(Box::new(e))),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn display_then_parse_is_structurally_equal(expr in expression()) {
        let printed = expr.to_string();
        let parsed = parse_expression_str(&printed)
            .map_err(|e| TestCaseError::fail(format!("{printed}: {e}")))?;
        prop_assert_eq!(parsed.simplify(), expr.simplify());
    }

    #[test]
    fn simplify_is_idempotent(expr in expression()) {
        let once = expr.simplify();
        prop_assert_eq!(once.clone().simplify(), once);
    }
}

fn strip_spans(mut doc: PolicyDocument) -> PolicyDocument {
    for decl in &mut doc.declarations {
        match decl {
            Declaration::Rule(rule) => rule.span = Span::default(),
            Declaration::Filter(filter) => filter.span = Span::default(),
            Declaration::Macro(m) => m.span = Span::default(),
            Declaration::List(list) => list.span = Span::default(),
        }
    }
    doc
}

#[test]
fn test_formatted_policy_reparses_identically() {
    let source = r#"
- list: sensitive_files
  items: [/etc/shadow, /etc/sudoers, "/root/.ssh/authorized_keys"]

- macro: open_read
  condition: (evt.type in (open, openat) and evt.is_open_read = true and fd.typechar = f)

- filter: trusted
  condition: proc.name pmatch ([sshd, sudo]) or user.uid < 1000
  enabled: false

- rule: Read sensitive file
  desc: an attempt to read any
        sensitive file
  condition: open_read and fd.name in (sensitive_files) and not trusted
  output: Sensitive file opened (user=%user.name file=%fd.name)
  priority: WARNING
  tags: [filesystem, mitre_credential_access]
  prefilter: [open, openat]
  enabled: false
"#;
    let first = parse_policy(source);
    assert!(first.is_ok(), "{:?}", first.errors);

    let formatted = first.document.to_string();
    let second = parse_policy(&formatted);
    assert!(second.is_ok(), "{formatted}\n{:?}", second.errors);

    assert_eq!(strip_spans(second.document), strip_spans(first.document));
}

#[test]
fn test_display_canonical_form() {
    let doc = parse_policy(
        "- macro: m\n  condition:   a   and(b or c)and   not d\n- list: l\n  items: [x,y]",
    )
    .document;
    assert_eq!(
        doc.to_string(),
        "- macro: m\n  condition: a and (b or c) and not d\n\n- list: l\n  items: [x, y]\n"
    );
}
