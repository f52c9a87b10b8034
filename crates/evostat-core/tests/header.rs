use evostat_core::prelude::*;

/// A header in the layout the experiment harness writes: names live inside
/// the per-algorithm config and every entry carries its index.
const HARNESS_HEADER: &str = concat!(
    r#""{"common":{"population size":100,"total repetitions":10,"iterations per run":100000},"#,
    r#""algorithms":["#,
    r#"{"algorithm index":0,"elitism":"Greedy_selection","algorithm config":{"algorithm name":"SimpleReplacement"}},"#,
    r#"{"algorithm index":1,"elitism":"Greedy_selection","algorithm config":{"algorithm name":"Generalized MAP Elite algorithm","use features":true,"use spatial hyperparameters":true,"use spatial grid":true}},"#,
    r#"{"algorithm index":2,"elitism":"Metropolis-Hastings","algorithm config":{"algorithm name":"SimpleReplacement"}},"#,
    r#"{"algorithm index":3,"elitism":"Metropolis-Hastings","algorithm config":{"algorithm name":"Generalized MAP Elite algorithm","use features":true,"use spatial hyperparameters":true,"use spatial grid":true}}"#,
    r#"]}""#,
    "\r\n"
);

#[test]
fn harness_header_resolves_every_index() {
    let context = LogContext::from_header_line("logs/Rastrigin_2024.csv", HARNESS_HEADER).unwrap();
    assert_eq!(context.problem, Problem::Rastrigin);
    assert_eq!(context.stem(), "Rastrigin_2024");

    let common = context.header.common.unwrap();
    assert_eq!(common.population_size, Some(100));
    assert_eq!(common.total_repetitions, Some(10));

    let resolver = &context.resolver;
    assert_eq!(resolver.len(), 4);
    assert_eq!(
        resolver.resolve(1).unwrap().display_name(),
        "Spatial grid GA with features and adaptive hyperparameters (G)"
    );
    assert_eq!(resolver.resolve(2).unwrap().display_name(), "SimpleReplacement (MH)");
    assert!(matches!(
        resolver.resolve(4),
        Err(EvostatError::UnknownAlgorithmIndex { index: 4, roster_len: 4 })
    ));
}

#[test]
fn policies_declare_matching_rosters() {
    let context = LogContext::from_header_line("x.csv", HARNESS_HEADER).unwrap();
    let greedy: Vec<_> = context
        .resolver
        .policy_roster(&ElitismPolicy::GreedySelection)
        .map(|(_, identity)| identity.signature())
        .collect();
    let mh: Vec<_> = context
        .resolver
        .policy_roster(&ElitismPolicy::MetropolisHastings)
        .map(|(_, identity)| identity.signature())
        .collect();
    assert_eq!(greedy, mh);
}

#[test]
fn generalized_display_names_are_distinct() {
    let mut names: Vec<String> = [(false, false), (true, false), (false, true), (true, true)]
        .into_iter()
        .map(|(features, hyper)| {
            AlgorithmIdentity::new(
                ElitismPolicy::GreedySelection,
                "Generalized MAP Elite algorithm",
                features,
                hyper,
            )
            .display_name()
        })
        .collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 4);
}

#[test]
fn styles_follow_family_and_policy() {
    let context = LogContext::from_header_line("x.csv", HARNESS_HEADER).unwrap();
    let simple_mh = DefaultStyles.style(context.resolver.resolve(2).unwrap());
    assert_eq!(simple_mh, PlotStyle { color: "grey", symbol: "o" });
    let grid_g = DefaultStyles.style(context.resolver.resolve(1).unwrap());
    assert_eq!(grid_g, PlotStyle { color: "green", symbol: "+" });
}

#[test]
fn header_without_elitism_is_missing_metadata() {
    let line = r#""{"algorithms":[{"algorithm name":"MAP Elite"}]}""#;
    let err = LogContext::from_header_line("bad.csv", line).unwrap_err();
    assert!(matches!(err.root(), EvostatError::MissingMetadata(_)));
    assert!(err.to_string().contains("bad.csv"));
}
