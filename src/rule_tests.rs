// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `rule.rs`

use crate::errors::Error;
use crate::rule::{parse_domains, parse_rule, Rule, MAX_NESTING_DEPTH};

#[test]
fn test_single_host() {
    assert_eq!(
        parse_domains("Host(`example.com`)").unwrap(),
        vec!["example.com"]
    );
}

#[test]
fn test_multiple_host_arguments() {
    assert_eq!(
        parse_domains("Host(`a.example.com`, `b.example.com`)").unwrap(),
        vec!["a.example.com", "b.example.com"]
    );
}

#[test]
fn test_hosts_combined_with_other_matchers() {
    let hosts = parse_domains(
        "Host(`a.example.com`) && PathPrefix(`/api`) || (Host(`b.example.com`) && Method(`GET`))",
    )
    .unwrap();

    assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);
}

#[test]
fn test_no_host_matcher_yields_nothing() {
    assert!(parse_domains("PathPrefix(`/api`)").unwrap().is_empty());
}

#[test]
fn test_hosts_are_lowercased() {
    assert_eq!(
        parse_domains("Host(`WWW.Example.COM`)").unwrap(),
        vec!["www.example.com"]
    );
}

#[test]
fn test_matcher_case_variants() {
    for rule in [
        "Host(`a.com`)",
        "host(`a.com`)",
        "HOST(`a.com`)",
    ] {
        assert_eq!(parse_domains(rule).unwrap(), vec!["a.com"], "rule={rule}");
    }

    assert!(parse_rule("Pathprefix(`/x`)").is_ok());
    assert!(parse_rule("pathprefix(`/x`)").is_ok());
    assert!(parse_rule("PATHPREFIX(`/x`)").is_ok());
    assert!(parse_rule("pathPrefix(`/x`)").is_err());
}

#[test]
fn test_double_quoted_strings() {
    assert_eq!(
        parse_domains(r#"Host("a.com", "b.com")"#).unwrap(),
        vec!["a.com", "b.com"]
    );
    assert_eq!(
        parse_rule(r#"Path("/a\"b")"#).unwrap(),
        Rule::Matcher {
            name: "Path",
            args: vec!["/a\"b".to_string()],
        }
    );
}

#[test]
fn test_negated_host_is_still_collected() {
    assert_eq!(
        parse_domains("!Host(`internal.example.com`) && PathPrefix(`/`)").unwrap(),
        vec!["internal.example.com"]
    );
}

#[test]
fn test_operator_precedence() {
    let rule = parse_rule("Method(`GET`) || Path(`/a`) && Path(`/b`)").unwrap();

    match rule {
        Rule::Or(operands) => {
            assert_eq!(operands.len(), 2);
            assert!(matches!(operands[0], Rule::Matcher { name: "Method", .. }));
            assert!(matches!(&operands[1], Rule::And(inner) if inner.len() == 2));
        }
        other => panic!("expected Or at the root, got {other:?}"),
    }
}

#[test]
fn test_empty_matcher_arguments() {
    assert!(parse_domains("Host()").unwrap().is_empty());
}

#[test]
fn test_malformed_rules_are_rejected() {
    for rule in [
        "",
        "   ",
        "Host(`a.com`",
        "Host(`a.com)",
        "Host(`a.com`) &&",
        "Host(`a.com`) & Path(`/`)",
        "Host(`a.com`) Path(`/`)",
        "(Host(`a.com`)",
        "Host(`a.com`,)",
        "Host(a.com)",
        "Unknown(`a.com`)",
        "Host",
        "Host(`a.com`) $",
    ] {
        let err = parse_domains(rule).unwrap_err();
        assert!(
            matches!(err, Error::Parse { .. }),
            "rule={rule:?} produced {err:?}"
        );
    }
}

#[test]
fn test_parse_error_carries_rule() {
    let Error::Parse { rule, reason } = parse_domains("Bogus(`x`)").unwrap_err() else {
        panic!("expected parse error");
    };

    assert_eq!(rule, "Bogus(`x`)");
    assert!(reason.contains("Bogus"), "reason: {reason}");
}

#[test]
fn test_chained_operators_flatten() {
    let rule = parse_rule("Host(`a.com`) && Path(`/a`) && Method(`GET`)").unwrap();

    assert!(matches!(rule, Rule::And(ref operands) if operands.len() == 3));
}

#[test]
fn test_moderate_nesting_parses() {
    let rule = format!("{}Host(`a.com`){}", "(".repeat(10), ")".repeat(10));
    assert_eq!(parse_domains(&rule).unwrap(), vec!["a.com"]);

    let rule = format!("{}Host(`b.com`)", "!".repeat(10));
    assert_eq!(parse_domains(&rule).unwrap(), vec!["b.com"]);
}

#[test]
fn test_nesting_at_limit_parses() {
    let rule = format!(
        "{}Host(`a.com`){}",
        "(".repeat(MAX_NESTING_DEPTH),
        ")".repeat(MAX_NESTING_DEPTH)
    );

    assert_eq!(parse_domains(&rule).unwrap(), vec!["a.com"]);
}

#[test]
fn test_deeply_nested_parentheses_are_rejected() {
    let rule = format!("{}Host(`a.com`){}", "(".repeat(100_000), ")".repeat(100_000));

    let err = parse_domains(&rule).unwrap_err();
    let Error::Parse { reason, .. } = err else {
        panic!("expected parse error, got {err:?}");
    };
    assert_eq!(reason, "rule nested too deeply");
}

#[test]
fn test_deeply_nested_negations_are_rejected() {
    let rule = format!("{}Host(`a.com`)", "!".repeat(100_000));

    assert!(matches!(parse_domains(&rule), Err(Error::Parse { .. })));
}

#[test]
fn test_long_operator_chain_parses() {
    let rule = vec!["Host(`a.com`)"; 100_000].join(" || ");

    let domains = parse_domains(&rule).unwrap();
    assert_eq!(domains.len(), 100_000);
}
