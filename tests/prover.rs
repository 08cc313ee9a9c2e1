use instant::Duration;
use vc_closure::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn vc(name: &str, antecedents: &str, consequent: &str) -> VerificationCondition {
    VerificationCondition::parse(name, antecedents, consequent).unwrap()
}

fn prove(prover: &Prover, antecedents: &str, consequent: &str) -> VcReport {
    prover.prove(&vc("vc", antecedents, consequent)).unwrap()
}

#[test]
fn direct_contradiction_is_proved() {
    init_logger();
    let report = prove(&Prover::default(), "p", "p");
    assert_eq!(report.result, ProofResult::Proved);
    assert_eq!(report.instances, 0);
}

#[test]
fn congruence_chain_is_proved() {
    init_logger();
    let report = prove(&Prover::default(), "(= x y) (= y z)", "(= (f x) (f z))");
    assert_eq!(report.result, ProofResult::Proved);
    assert!(report
        .log
        .iter()
        .any(|line| line.starts_with("contradiction")));
}

#[test]
fn boolean_structure_is_proved() {
    init_logger();
    let prover = Prover::default();
    assert_eq!(
        prove(&prover, "(implies p q) (implies q r) p", "r").result,
        ProofResult::Proved
    );
    assert_eq!(
        prove(&prover, "(or p q) (not p)", "(and q (or r q))").result,
        ProofResult::Proved
    );
    assert_eq!(
        prove(&prover, "(iff p q)", "(implies q p)").result,
        ProofResult::Proved
    );
}

#[test]
fn unprovable_condition_is_exhausted() {
    init_logger();
    let report = prove(&Prover::default(), "(= x y)", "(= (f x) (g y))");
    assert_eq!(report.result, ProofResult::Exhausted);
    assert_eq!(report.rounds, 1);
}

#[test]
fn theorem_instances_discharge_the_goal() {
    init_logger();
    let mut prover = Prover::default();
    prover.add_theorem(&parse_expr("(implies (p ?x) (q ?x))").unwrap()).unwrap();
    assert_eq!(prover.n_theorem_clauses(), 1);

    let report = prove(&prover, "(p a)", "(q a)");
    assert_eq!(report.result, ProofResult::Proved);
    assert_eq!(report.instances, 1);
    assert!(report.log.iter().any(|line| line.starts_with("instance")));
}

#[test]
fn ground_only_mode_ignores_quantified_theorems() {
    init_logger();
    let mut prover = Prover::new(ProverConfig {
        mode: ProofMode::GroundOnly,
        ..Default::default()
    });
    prover.add_theorems("(implies (p ?x) (q ?x))").unwrap();
    let report = prove(&prover, "(p a)", "(q a)");
    assert_eq!(report.result, ProofResult::Exhausted);
    assert_eq!(report.instances, 0);
}

#[test]
fn rewriting_theorem_closes_the_gap() {
    init_logger();
    let mut prover = Prover::default();
    let added = prover
        .add_theorems(
            "; length of a pushed sequence
             (= (len (push ?s ?x)) (succ (len ?s)))",
        )
        .unwrap();
    assert_eq!(added, 1);
    let report = prove(&prover, "(= n (len s))", "(= (len (push s e)) (succ n))");
    assert_eq!(report.result, ProofResult::Proved);
}

#[test]
fn quantified_antecedents_act_as_local_theorems() {
    init_logger();
    let prover = Prover::default();
    let report = prove(&prover, "(= (f ?x) ?x)", "(= (f (f a)) a)");
    assert_eq!(report.result, ProofResult::Proved);

    // the assumption does not leak into the next attempt
    let report = prove(&prover, "", "(= (f (f a)) a)");
    assert_eq!(report.result, ProofResult::Exhausted);
}

#[test]
fn quantified_goal_is_proved_for_an_arbitrary_witness() {
    init_logger();
    let prover = Prover::default();
    assert_eq!(prove(&prover, "(p ?y)", "(p ?x)").result, ProofResult::Proved);
    assert_eq!(prove(&prover, "(p c)", "(p ?x)").result, ProofResult::Exhausted);
}

#[test]
fn past_deadline_times_out() {
    init_logger();
    let prover = Prover::new(ProverConfig {
        timeout: Duration::ZERO,
        ..Default::default()
    });
    let report = prove(&prover, "(= x y) (= y z)", "(= (f x) (f z))");
    assert_eq!(report.result, ProofResult::TimedOut);
    assert_eq!(report.merges, 0);
}

#[test]
fn failure_budget_skips_the_rest() {
    init_logger();
    let prover = Prover::new(ProverConfig {
        failure_budget: Some(1),
        ..Default::default()
    });
    let vcs = [
        vc("easy", "p", "p"),
        vc("hard", "", "q"),
        vc("also_easy", "(= a b)", "(= b a)"),
    ];
    let results: Vec<ProofResult> = prover
        .prove_all(&vcs)
        .into_iter()
        .map(|r| r.unwrap().result)
        .collect();
    assert_eq!(
        results,
        [ProofResult::Proved, ProofResult::Exhausted, ProofResult::Skipped]
    );
}

#[test]
fn malformed_formulas_are_errors() {
    init_logger();
    let bad = VerificationCondition::new(
        "bad",
        vec![Expr::App {
            op: Op::Not,
            args: vec![],
            sort: Sort::boolean(),
        }],
        Expr::prop("p"),
    );
    assert!(matches!(
        Prover::default().prove(&bad),
        Err(Error::Malformed(_))
    ));
    assert!(matches!(
        Prover::default().add_theorems("(p ?x"),
        Err(Error::Parse(ParseError::Eof(_)))
    ));
}

#[test]
fn named_lookup() {
    init_logger();
    let vcs = [vc("first", "p", "p")];
    let prover = Prover::default();
    assert_eq!(
        prover.prove_named(&vcs, "first").unwrap().result,
        ProofResult::Proved
    );
    assert!(matches!(
        prover.prove_named(&vcs, "second"),
        Err(Error::NoSuchVc(name)) if name == "second"
    ));
}

#[test]
fn attempts_can_run_on_other_threads() {
    init_logger();
    let mut prover = Prover::default();
    prover.add_theorems("(implies (p ?x) (q ?x))").unwrap();
    let prover = std::sync::Arc::new(prover);
    let handles: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|c| {
            let prover = prover.clone();
            let vc = vc(c, &format!("(p {c})"), &format!("(q {c})"));
            std::thread::spawn(move || prover.prove(&vc).unwrap().result)
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), ProofResult::Proved);
    }
}
