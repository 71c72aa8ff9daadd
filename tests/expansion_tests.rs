//! End-to-end expansion scenarios
//!
//! Covers the loader-style control flow: parse a document, project it to a
//! flat map, then run each value through the expansion engine with the map
//! (or the process environment) as the variable store.

use envdoc::{
    ChainedStore, Document, EnvironmentStore, ExpandOptions, ExpansionError, MapStore,
    VariableStore, expand,
};

#[test]
fn test_expand_document_values_against_its_own_map() {
    let source = "\
BASE_DIR=/srv/app
LOG_DIR=${BASE_DIR}/logs
CACHE_DIR=${BASE_DIR}/cache
";
    let doc = Document::parse(source).unwrap();
    let mut store = MapStore::from_document(&doc);
    let options = ExpandOptions::default();

    let mut resolved = Vec::new();
    for (key, value) in doc.to_map() {
        resolved.push((key, expand(&value, &mut store, &options).unwrap()));
    }

    assert_eq!(resolved[1], ("LOG_DIR".to_string(), "/srv/app/logs".to_string()));
    assert_eq!(
        resolved[2],
        ("CACHE_DIR".to_string(), "/srv/app/cache".to_string())
    );
}

#[test]
fn test_defaults_and_assignment_in_one_template() {
    let mut store = MapStore::new();
    store.insert("USER", "deploy");

    let options = ExpandOptions::default();
    let result = expand(
        "${USER}@${HOST:-localhost}:${PORT:=22}",
        &mut store,
        &options,
    )
    .unwrap();
    assert_eq!(result, "deploy@localhost:22");

    // :- left HOST unset, := persisted PORT
    assert!(store.get("HOST").is_none());
    assert_eq!(store.get("PORT"), Some("22".to_string()));
}

#[test]
fn test_required_variable_message_surfaces() {
    let mut store = MapStore::new();
    let err = expand(
        "${DATABASE_URL:?DATABASE_URL is required in production}",
        &mut store,
        &ExpandOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "DATABASE_URL is required in production"
    );
}

#[test]
fn test_environment_store_resolves_real_variables() {
    let mut env = EnvironmentStore;
    env.set("ENVDOC_IT_REGION", "eu-west-1");

    let result = expand(
        "deploying to ${ENVDOC_IT_REGION}",
        &mut env,
        &ExpandOptions::default(),
    )
    .unwrap();
    assert_eq!(result, "deploying to eu-west-1");
}

#[test]
fn test_document_map_falls_back_to_environment() {
    let mut env = EnvironmentStore;
    env.set("ENVDOC_IT_FALLBACK", "from-env");

    let doc = Document::parse("IN_FILE=from-file").unwrap();
    let mut chained = ChainedStore::from_stores(vec![
        Box::new(MapStore::from_document(&doc)),
        Box::new(EnvironmentStore),
    ]);

    let options = ExpandOptions::default();
    assert_eq!(
        expand("${IN_FILE}", &mut chained, &options).unwrap(),
        "from-file"
    );
    assert_eq!(
        expand("${ENVDOC_IT_FALLBACK}", &mut chained, &options).unwrap(),
        "from-env"
    );
}

#[test]
fn test_windows_and_bash_forms_together() {
    let mut store = MapStore::new();
    store.insert("APPDATA", "C:\\Users\\svc");
    store.insert("DRIVE", "D:");

    let options = ExpandOptions {
        windows_expansion: true,
        ..Default::default()
    };
    let result = expand("%APPDATA%;${DRIVE}\\data", &mut store, &options).unwrap();
    assert_eq!(result, "C:\\Users\\svc;D:\\data");
}

#[test]
fn test_parsed_command_substitution_flows_through_expander() {
    // The parser preserves $( ... ) inside double quotes; with the option
    // enabled the expander strips the markers and hands back the body for
    // an external executor.
    let doc = Document::parse("GIT_SHA=\"$(git rev-parse HEAD)\"").unwrap();
    let value = doc.to_map().get("GIT_SHA").cloned().unwrap();

    let mut store = MapStore::new();
    let disabled = ExpandOptions::default();
    assert_eq!(
        expand(&value, &mut store, &disabled).unwrap(),
        "$(git rev-parse HEAD)"
    );

    let enabled = ExpandOptions {
        command_substitution: true,
        ..Default::default()
    };
    assert_eq!(
        expand(&value, &mut store, &enabled).unwrap(),
        "git rev-parse HEAD"
    );
}

#[test]
fn test_expansion_failure_names_the_variable() {
    let mut store = MapStore::new();
    store.insert("PRESENT", "yes");

    let err = expand("${PRESENT} and ${ABSENT}", &mut store, &ExpandOptions::default());
    assert_eq!(
        err,
        Err(ExpansionError::NotSet {
            name: "ABSENT".to_string()
        })
    );
}

#[test]
fn test_literal_dollar_amounts_survive() {
    let mut store = MapStore::new();
    let result = expand(
        "total: \\$100 plus \\$5 fee",
        &mut store,
        &ExpandOptions::default(),
    )
    .unwrap();
    assert_eq!(result, "total: $100 plus $5 fee");
}
