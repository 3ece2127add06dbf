use super::*;

fn id(s: &str) -> MigrationId {
    MigrationId::try_new(s).unwrap()
}

fn graph(edges: &[(&str, &[&str])]) -> MigrationGraph {
    let owned: Vec<(MigrationId, Vec<MigrationId>)> = edges
        .iter()
        .map(|(m, deps)| (id(m), deps.iter().map(|d| id(d)).collect()))
        .collect();
    MigrationGraph::build(owned.iter().map(|(m, deps)| (m, deps.as_slice())))
}

#[test]
fn test_dependents_and_dependencies() {
    let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])]);
    assert_eq!(g.len(), 4);
    assert_eq!(g.dependents("a"), vec![id("b"), id("c")]);
    assert_eq!(g.dependencies("d"), vec![id("b"), id("c")]);
    assert!(g.dependencies("a").is_empty());
}

#[test]
fn test_unknown_dependencies_are_not_added() {
    let g = graph(&[("a", &["elsewhere"]), ("b", &["a"])]);
    assert_eq!(g.len(), 2);
    assert!(g.dependencies("a").is_empty());
}

#[test]
fn test_heads() {
    let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["a"])]);
    assert_eq!(g.heads(), vec![id("b"), id("c")]);
    assert!(MigrationGraph::new().is_empty());
}
