use codegraph_ast::manager::ParserManager;
use codegraph_core::ProjectId;
use std::path::Path;

const SRC: &str = r#"
import os
from collections import OrderedDict as OD

class Greeter:
    def __init__(self, name):
        self.name = name

    def greet(self, loud=False):
        if loud:
            return self.shout()
        return f"hello {self.name}"

    def shout(self):
        return self.greet(True).upper()


def standalone(x, y):
    total = 0
    for i in range(x):
        if i % 2 == 0 and i != y:
            total += i
        elif i > 100:
            total -= 1
    return total
"#;

#[test]
fn parses_functions_classes_and_imports() {
    let manager = ParserManager::default();
    let parsed = manager
        .parse_file(SRC.as_bytes(), Path::new("pkg/mod.py"))
        .expect("parse should succeed");

    assert!(!parsed.partial);
    assert_eq!(parsed.classes.len(), 1);
    assert_eq!(parsed.classes[0].name, "Greeter");
    assert_eq!(parsed.classes[0].methods.len(), 3);

    assert_eq!(parsed.functions.len(), 1);
    assert_eq!(parsed.functions[0].name, "standalone");
    // base 1 + for + if + and + elif = 5
    assert_eq!(parsed.functions[0].complexity, 5);

    let modules: Vec<_> = parsed.imports.iter().map(|i| i.module.as_str()).collect();
    assert!(modules.contains(&"os".to_string().as_str()) || parsed.imports.iter().any(|i| i.name == "os"));
    assert!(parsed.imports.iter().any(|i| i.alias.as_deref() == Some("OD")));
}

#[test]
fn parsing_is_deterministic() {
    let manager = ParserManager::default();
    let first = manager
        .parse_file(SRC.as_bytes(), Path::new("pkg/mod.py"))
        .unwrap();
    let second = manager
        .parse_file(SRC.as_bytes(), Path::new("pkg/mod.py"))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn duplicate_function_names_are_disambiguated_by_line() {
    let src = b"def f():\n    return 1\n\ndef f():\n    return 2\n";
    let manager = ParserManager::default();
    let parsed = manager.parse_file(src, Path::new("dup.py")).unwrap();
    assert_eq!(parsed.functions.len(), 2);
    assert_eq!(parsed.functions[0].name, "f");
    assert_eq!(parsed.functions[1].name, "f@4");
}

#[test]
fn project_file_lowers_to_graph_nodes_and_edges() {
    let manager = ParserManager::default();
    let project_id = ProjectId::from("proj1");
    let (parsed, nodes, edges) = codegraph_ast::project_file(
        &manager,
        &project_id,
        Path::new("pkg/mod.py"),
        SRC.as_bytes(),
        1_048_576,
    )
    .expect("projection should succeed");

    assert!(!parsed.classes.is_empty());
    assert!(nodes.iter().any(|n| n.label() == "File"));
    assert!(nodes.iter().any(|n| n.label() == "Class"));
    assert!(nodes.iter().any(|n| n.label() == "Function"));
    assert!(edges.iter().any(|e| e.kind == codegraph_core::schema::EdgeKind::Contains));
    assert!(edges.iter().any(|e| e.kind == codegraph_core::schema::EdgeKind::Calls));
}

#[test]
fn oversized_input_is_rejected() {
    let manager = ParserManager::default();
    let project_id = ProjectId::from("proj1");
    let big = vec![b'a'; 100];
    let result = codegraph_ast::project_file(&manager, &project_id, Path::new("big.py"), &big, 10);
    assert!(result.is_err());
}

#[test]
fn binary_input_is_rejected() {
    let manager = ParserManager::default();
    let project_id = ProjectId::from("proj1");
    let data = vec![0u8, 1, 2, 3];
    let result = codegraph_ast::project_file(&manager, &project_id, Path::new("blob.py"), &data, 1_048_576);
    assert!(result.is_err());
}
