use codegraph_core::schema::{ContainsLevel, EdgeKind, FileNode, FunctionNode, GraphEdge, GraphNode, ModuleNode};
use codegraph_core::{FileId, FunctionId, ModuleId, ProjectId};
use codegraph_store::GraphStoreEngine;

fn sample(file_path: &str, project: &ProjectId) -> (Vec<GraphNode>, Vec<GraphEdge>, String) {
    let file_id = FileId::new(project, file_path);
    let fn_id = FunctionId::for_module_function(project, file_path, "foo");
    let nodes = vec![
        GraphNode::File(FileNode {
            file_id: file_id.clone(),
            project_id: project.clone(),
            path: file_path.to_string(),
            language: "python".to_string(),
            lines_of_code: 10,
            comment_ratio: 0.1,
        }),
        GraphNode::Function(FunctionNode {
            function_id: fn_id.clone(),
            file_id: file_id.clone(),
            class_id: None,
            name: "foo".to_string(),
            start_line: 1,
            complexity: 3,
            is_async: false,
            is_method: false,
            parameters: vec![],
        }),
    ];
    let edges = vec![
        GraphEdge::contains(project.as_str(), file_id.as_str(), ContainsLevel::ProjectFile),
        GraphEdge::contains(file_id.as_str(), fn_id.as_str(), ContainsLevel::FileFunction),
        GraphEdge::calls(fn_id.as_str(), "bar"),
    ];
    (nodes, edges, file_id.as_str().to_string())
}

#[test]
fn upsert_then_read_round_trips() {
    let engine = GraphStoreEngine::open_in_memory().unwrap();
    let project = ProjectId::from("proj1");
    engine.upsert_project(&project, "Proj One").unwrap();

    let (nodes, edges, file_id) = sample("a.py", &project);
    engine.upsert_parsed_file(&project, &file_id, &nodes, &edges).unwrap();

    let snapshot = engine.get_dependency_graph(&project).unwrap();
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.edges.len(), 3);

    let counts = engine.count_nodes_by_label(&project).unwrap();
    assert_eq!(counts.get("File"), Some(&1));
    assert_eq!(counts.get("Function"), Some(&1));
}

#[test]
fn upsert_is_idempotent_except_calls_weight() {
    let engine = GraphStoreEngine::open_in_memory().unwrap();
    let project = ProjectId::from("proj1");
    engine.upsert_project(&project, "Proj One").unwrap();

    let (nodes, edges, file_id) = sample("a.py", &project);
    engine.upsert_parsed_file(&project, &file_id, &nodes, &edges).unwrap();
    engine.upsert_parsed_file(&project, &file_id, &nodes, &edges).unwrap();

    let snapshot = engine.get_dependency_graph(&project).unwrap();
    assert_eq!(snapshot.nodes.len(), 2, "node count must stay idempotent");

    let calls_edge = snapshot
        .edges
        .iter()
        .find(|e| e.kind == EdgeKind::Calls)
        .expect("calls edge present");
    assert_eq!(calls_edge.weight, 2, "re-observed CALLS edge weight accumulates");
}

#[test]
fn stale_children_are_removed_on_reupsert() {
    let engine = GraphStoreEngine::open_in_memory().unwrap();
    let project = ProjectId::from("proj1");
    engine.upsert_project(&project, "Proj One").unwrap();

    let (nodes, edges, file_id) = sample("a.py", &project);
    engine.upsert_parsed_file(&project, &file_id, &nodes, &edges).unwrap();

    // Re-upsert with the function removed: only the File node remains.
    let file_only: Vec<GraphNode> = nodes.into_iter().filter(|n| n.label() == "File").collect();
    let file_only_edges: Vec<GraphEdge> = edges
        .into_iter()
        .filter(|e| matches!(e.kind, EdgeKind::Contains) && e.level == Some(ContainsLevel::ProjectFile))
        .collect();
    engine
        .upsert_parsed_file(&project, &file_id, &file_only, &file_only_edges)
        .unwrap();

    let snapshot = engine.get_dependency_graph(&project).unwrap();
    assert_eq!(snapshot.nodes.len(), 1);
    assert!(snapshot.nodes.iter().all(|n| n.label() == "File"));
}

#[test]
fn dropping_an_import_removes_its_edge_and_orphaned_module() {
    let engine = GraphStoreEngine::open_in_memory().unwrap();
    let project = ProjectId::from("proj1");
    engine.upsert_project(&project, "Proj One").unwrap();

    let file_id = FileId::new(&project, "a.py");
    let module_id = ModuleId::from("numpy");
    let nodes = vec![
        GraphNode::File(FileNode {
            file_id: file_id.clone(),
            project_id: project.clone(),
            path: "a.py".to_string(),
            language: "python".to_string(),
            lines_of_code: 10,
            comment_ratio: 0.1,
        }),
        GraphNode::Module(ModuleNode {
            module_id: module_id.clone(),
            name: "numpy".to_string(),
        }),
    ];
    let edges = vec![GraphEdge::depends_on(file_id.as_str(), module_id.as_str())];
    engine.upsert_parsed_file(&project, file_id.as_str(), &nodes, &edges).unwrap();

    let snapshot = engine.get_dependency_graph(&project).unwrap();
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.edges.len(), 1);

    // Re-upsert the same file with the import dropped: the File node is
    // untouched (never "stale"), but the DEPENDS_ON edge and the now
    // unreferenced Module node must both disappear.
    let file_only: Vec<GraphNode> = nodes.into_iter().filter(|n| n.label() == "File").collect();
    engine.upsert_parsed_file(&project, file_id.as_str(), &file_only, &[]).unwrap();

    let snapshot = engine.get_dependency_graph(&project).unwrap();
    assert_eq!(snapshot.nodes.len(), 1);
    assert!(snapshot.nodes.iter().all(|n| n.label() == "File"));
    assert!(snapshot.edges.is_empty());
}

#[test]
fn module_still_imported_elsewhere_survives_reupsert() {
    let engine = GraphStoreEngine::open_in_memory().unwrap();
    let project = ProjectId::from("proj1");
    engine.upsert_project(&project, "Proj One").unwrap();

    let module_id = ModuleId::from("shared");
    let module_node = GraphNode::Module(ModuleNode {
        module_id: module_id.clone(),
        name: "shared".to_string(),
    });

    let a_id = FileId::new(&project, "a.py");
    let a_nodes = vec![
        GraphNode::File(FileNode {
            file_id: a_id.clone(),
            project_id: project.clone(),
            path: "a.py".to_string(),
            language: "python".to_string(),
            lines_of_code: 10,
            comment_ratio: 0.1,
        }),
        module_node.clone(),
    ];
    let a_edges = vec![GraphEdge::depends_on(a_id.as_str(), module_id.as_str())];
    engine.upsert_parsed_file(&project, a_id.as_str(), &a_nodes, &a_edges).unwrap();

    let b_id = FileId::new(&project, "b.py");
    let b_nodes = vec![
        GraphNode::File(FileNode {
            file_id: b_id.clone(),
            project_id: project.clone(),
            path: "b.py".to_string(),
            language: "python".to_string(),
            lines_of_code: 10,
            comment_ratio: 0.1,
        }),
        module_node.clone(),
    ];
    let b_edges = vec![GraphEdge::depends_on(b_id.as_str(), module_id.as_str())];
    engine.upsert_parsed_file(&project, b_id.as_str(), &b_nodes, &b_edges).unwrap();

    // a.py drops the import; b.py still has it, so "shared" must survive.
    let a_file_only: Vec<GraphNode> = a_nodes.into_iter().filter(|n| n.label() == "File").collect();
    engine.upsert_parsed_file(&project, a_id.as_str(), &a_file_only, &[]).unwrap();

    let snapshot = engine.get_dependency_graph(&project).unwrap();
    assert!(snapshot.nodes.iter().any(|n| n.label() == "Module"));
    assert_eq!(snapshot.edges.len(), 1);
}

#[test]
fn delete_project_graph_removes_everything() {
    let engine = GraphStoreEngine::open_in_memory().unwrap();
    let project = ProjectId::from("proj1");
    engine.upsert_project(&project, "Proj One").unwrap();
    let (nodes, edges, file_id) = sample("a.py", &project);
    engine.upsert_parsed_file(&project, &file_id, &nodes, &edges).unwrap();

    engine.delete_project_graph(&project).unwrap();
    let result = engine.get_dependency_graph(&project);
    assert!(result.is_err());

    // Idempotent: deleting again does not error.
    engine.delete_project_graph(&project).unwrap();
}

#[test]
fn unknown_project_read_is_not_found() {
    let engine = GraphStoreEngine::open_in_memory().unwrap();
    let project = ProjectId::from("ghost");
    let result = engine.get_dependency_graph(&project);
    assert!(result.is_err());
}

#[test]
fn file_backed_engine_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("graph.sqlite3");
    let project = ProjectId::from("proj1");

    {
        let engine = GraphStoreEngine::open(&db_path).unwrap();
        engine.upsert_project(&project, "Proj One").unwrap();
        let (nodes, edges, file_id) = sample("a.py", &project);
        engine.upsert_parsed_file(&project, &file_id, &nodes, &edges).unwrap();
    }

    let engine = GraphStoreEngine::open(&db_path).unwrap();
    let snapshot = engine.get_dependency_graph(&project).unwrap();
    assert_eq!(snapshot.nodes.len(), 2);
}
