use super::*;
use tsb_solver::DiagnosticContext;

fn diagnostic(code: u32, severity: Severity, type_name: Option<&str>) -> Diagnostic {
    let mut context = DiagnosticContext::new("Core");
    if let Some(type_name) = type_name {
        context = context.with_type(type_name);
    }
    Diagnostic {
        code,
        severity,
        message: format!("finding {code}"),
        context,
    }
}

fn output(diagnostics: Vec<Diagnostic>) -> ModuleOutput {
    ModuleOutput {
        module: "Core".to_string(),
        namespaces: Vec::new(),
        diagnostics,
        dependencies: Vec::new(),
    }
}

#[test]
fn test_plain_diagnostic_line() {
    let reporter = Reporter::new(false);
    assert_eq!(
        reporter.format_diagnostic("Core", &diagnostic(6002, Severity::Warning, Some("Ns.Bag"))),
        "Core:Ns.Bag - warning TSB6002: finding 6002"
    );
    assert_eq!(
        reporter.format_diagnostic("Core", &diagnostic(1001, Severity::Error, None)),
        "Core - error TSB1001: finding 1001"
    );
}

#[test]
fn test_info_is_hidden_unless_verbose() {
    let outputs = vec![output(vec![
        diagnostic(3004, Severity::Info, None),
        diagnostic(6002, Severity::Warning, None),
    ])];
    assert_eq!(Reporter::new(false).render(&outputs), "Core - warning TSB6002: finding 6002");
    assert_eq!(
        Reporter::new(false).verbose(true).render(&outputs),
        "Core - info TSB3004: finding 3004\nCore - warning TSB6002: finding 6002"
    );
}

#[test]
fn test_summary_and_gate_lines() {
    let reporter = Reporter::new(false);
    let summary = RunSummary::from_outputs(0, [&output(vec![diagnostic(6002, Severity::Warning, None)])]);
    assert_eq!(
        reporter.format_summary(&summary),
        "1 module(s), 0 declaration(s): 0 classes, 0 interfaces, 0 enums, 0 aliases, 0 static namespaces, 0 views; 1 warning(s)"
    );
    assert_eq!(
        reporter.format_gate_failure(&GateFailure::TooManyWarnings { count: 3, max: 1 }),
        "gate failed: 3 warnings reported; at most 1 allowed"
    );
}
