#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::catalog::{column, MockCatalog, MockTable};
use common::temp_files::temp_dir;
use pgscaffold::catalog::{introspect_table, ForeignKeyRef, USER_DEFINED};
use pgscaffold::generator::{
    build_context, generate_project, select_tables, ArtifactKind, GenerationOptions,
    GenerationScope, ProjectLayout, RegistryUpdate, TemplateRenderer,
};
use pgscaffold::ScaffoldError;
use serde_json::json;
use std::fs;

const URI: &str = "postgresql://app@localhost:5432/shop";

fn registry_imports(layout: &ProjectLayout, kind: ArtifactKind) -> Vec<String> {
    fs::read_to_string(layout.registry_path(kind))
        .unwrap()
        .lines()
        .filter(|l| l.starts_with("from "))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_users_contexts() {
    let catalog = MockCatalog::users();
    let schema = introspect_table(&catalog, "users").unwrap();

    let model = build_context(&schema, ArtifactKind::Model);
    assert_eq!(model["columns"].as_array().unwrap().len(), 3);
    assert_eq!(model["primary_keys"], json!(["id"]));
    assert_eq!(model["foreign_keys"], json!([]));
    assert_eq!(
        model["enums"],
        json!({
            "status": {
                "catalog_enum_name": "user_status_enum",
                "display_name": "User_status",
                "values": ["active", "inactive"]
            }
        })
    );
    assert_eq!(model["columns"][1]["type_expr"], json!("Enum(User_status)"));
    assert_eq!(model["columns"][2]["type_expr"], json!("String"));

    for kind in [
        ArtifactKind::Controller,
        ArtifactKind::Repository,
        ArtifactKind::Service,
    ] {
        let ctx = build_context(&schema, kind);
        assert_eq!(
            serde_json::to_value(&ctx).unwrap(),
            json!({"table_name": "users", "table_name_lower": "users"})
        );
    }
}

#[test]
fn test_generate_users_end_to_end() {
    let root = temp_dir("e2e_users");
    let layout = ProjectLayout::new(&root, "shop");
    let options = GenerationOptions::new(layout.clone(), URI);
    let catalog = MockCatalog::users();

    let report = generate_project(
        &catalog,
        &TemplateRenderer::new(),
        &["users".to_string()],
        &options,
    )
    .unwrap();

    assert!(report.skipped.is_empty());
    assert_eq!(report.generated.len(), 1);
    let outcome = &report.generated[0];
    assert_eq!(outcome.files.len(), 4);
    for kind in ArtifactKind::ALL {
        let path = layout.artifact_path(kind, "users");
        assert!(path.is_file(), "{path:?} missing");
        assert!(outcome.files.contains(&path));
        assert_eq!(registry_imports(&layout, kind).len(), 1);
    }
    assert!(outcome
        .registries
        .iter()
        .all(|(_, update)| *update == RegistryUpdate::Added));

    let model = fs::read_to_string(layout.artifact_path(ArtifactKind::Model, "users")).unwrap();
    assert!(model.contains("class User_status(enum.Enum):"));
    assert!(model.contains("    ACTIVE = \"active\""));
    assert!(model.contains("    INACTIVE = \"inactive\""));
    assert!(model.contains("class Users(db.Model, ModelToDictMixin):"));

    assert_eq!(
        registry_imports(&layout, ArtifactKind::Repository),
        vec!["from .users_repository import UsersRepository"]
    );

    let run_py = fs::read_to_string(layout.run_py()).unwrap();
    assert!(run_py.contains("from app.controllers.users_controller import users_bp"));
    assert!(run_py.contains("app.register_blueprint(users_bp)"));
    assert_eq!(report.blueprints, vec!["users_controller"]);

    assert!(layout.config_py().is_file());
    assert!(layout.extensions_py().is_file());
    assert!(layout.model_mixins_py().is_file());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_regeneration_is_stable() {
    let root = temp_dir("e2e_rerun");
    let layout = ProjectLayout::new(&root, "shop");
    let options = GenerationOptions::new(layout.clone(), URI);
    let catalog = MockCatalog::shop();
    let tables = vec!["orders".to_string(), "users".to_string()];
    let renderer = TemplateRenderer::new();

    generate_project(&catalog, &renderer, &tables, &options).unwrap();
    let snapshot: Vec<String> = ArtifactKind::ALL
        .iter()
        .map(|k| fs::read_to_string(layout.registry_path(*k)).unwrap())
        .collect();

    let report = generate_project(&catalog, &renderer, &tables, &options).unwrap();
    assert!(report
        .generated
        .iter()
        .flat_map(|t| t.registries.iter())
        .all(|(_, update)| *update == RegistryUpdate::Unchanged));
    for (kind, before) in ArtifactKind::ALL.iter().zip(snapshot) {
        assert_eq!(fs::read_to_string(layout.registry_path(*kind)).unwrap(), before);
    }

    let model = fs::read_to_string(layout.artifact_path(ArtifactKind::Model, "orders")).unwrap();
    assert!(model.contains("ForeignKey(\"users.id\")"));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_failing_tables_are_skipped() {
    let root = temp_dir("e2e_skip");
    let layout = ProjectLayout::new(&root, "shop");
    let options = GenerationOptions::new(layout.clone(), URI);
    let mut catalog = MockCatalog::shop();
    catalog.rejected.push("orders".into());
    // Listed by name but has no columns: nothing to generate
    catalog.tables.insert("ghost".into(), MockTable::default());

    let tables = vec!["ghost".to_string(), "orders".to_string(), "users".to_string()];
    let report = generate_project(&catalog, &TemplateRenderer::new(), &tables, &options).unwrap();

    assert_eq!(report.generated.len(), 1);
    assert_eq!(report.generated[0].table, "users");
    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.table.as_str()).collect();
    assert_eq!(skipped, vec!["ghost", "orders"]);

    for kind in ArtifactKind::ALL {
        assert!(!layout.artifact_path(kind, "orders").exists());
        assert!(!layout.artifact_path(kind, "ghost").exists());
        assert_eq!(registry_imports(&layout, kind).len(), 1);
    }

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_template_failure_writes_nothing_for_table() {
    let root = temp_dir("e2e_template");
    let templates = temp_dir("e2e_template_dir");
    fs::create_dir_all(templates.join("services")).unwrap();
    // Refers to a variable the minimal service context does not carry
    fs::write(
        templates.join("services/default_service.j2"),
        "{{ columns | length }}\n",
    )
    .unwrap();

    let layout = ProjectLayout::new(&root, "shop");
    let options = GenerationOptions::new(layout.clone(), URI);
    let report = generate_project(
        &MockCatalog::users(),
        &TemplateRenderer::with_overrides(&templates),
        &["users".to_string()],
        &options,
    )
    .unwrap();

    assert!(report.generated.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].reason.contains("services/default_service.j2"));
    for kind in ArtifactKind::ALL {
        assert!(!layout.artifact_path(kind, "users").exists());
        assert!(!layout.registry_path(kind).exists());
    }

    fs::remove_dir_all(&root).unwrap();
    fs::remove_dir_all(&templates).unwrap();
}

#[test]
fn test_connection_loss_aborts_run() {
    let root = temp_dir("e2e_conn");
    let options = GenerationOptions::new(ProjectLayout::new(&root, "shop"), URI);
    let mut catalog = MockCatalog::users();
    catalog.disconnected = true;

    let err = generate_project(
        &catalog,
        &TemplateRenderer::new(),
        &["users".to_string()],
        &options,
    )
    .unwrap_err();
    assert!(matches!(err, ScaffoldError::Connection(_)));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_scope_limits_categories() {
    let root = temp_dir("e2e_scope");
    let layout = ProjectLayout::new(&root, "shop");
    let mut options = GenerationOptions::new(layout.clone(), URI);
    let mut scope = GenerationScope::none();
    scope.models = true;
    scope.repositories = true;
    options.scope = scope;

    let report = generate_project(
        &MockCatalog::users(),
        &TemplateRenderer::new(),
        &["users".to_string()],
        &options,
    )
    .unwrap();

    assert_eq!(report.file_count(), 2);
    assert!(layout.artifact_path(ArtifactKind::Model, "users").exists());
    assert!(layout.artifact_path(ArtifactKind::Repository, "users").exists());
    assert!(!layout.artifact_path(ArtifactKind::Controller, "users").exists());
    assert!(!layout.registry_path(ArtifactKind::Service).exists());
    assert!(report.blueprints.is_empty());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_select_tables() {
    let catalog = MockCatalog::shop();

    let (all, unknown) = select_tables(&catalog, &[]).unwrap();
    assert_eq!(all, vec!["orders", "users"]);
    assert!(unknown.is_empty());

    let requested = vec![
        "users".to_string(),
        "missing".to_string(),
        "users".to_string(),
    ];
    let (selected, unknown) = select_tables(&catalog, &requested).unwrap();
    assert_eq!(selected, vec!["users"]);
    assert_eq!(unknown, vec!["missing"]);
}

#[test]
fn test_introspect_user_defined_without_labels() {
    let mut catalog = MockCatalog::users();
    catalog.tables.insert(
        "places".into(),
        MockTable {
            columns: vec![
                column("id", "integer", "int4", false),
                column("geom", USER_DEFINED, "geometry", true),
            ],
            primary_keys: vec!["id".into()],
            foreign_keys: vec![],
        },
    );
    let schema = introspect_table(&catalog, "places").unwrap();
    assert!(schema.enums.is_empty());

    let ctx = build_context(&schema, ArtifactKind::Model);
    assert_eq!(ctx["columns"][1]["type_expr"], json!("String"));
}

#[test]
fn test_mixed_case_table_imports_resolve() {
    let root = temp_dir("e2e_mixed_case");
    let layout = ProjectLayout::new(&root, "shop");
    let options = GenerationOptions::new(layout.clone(), URI);
    let mut catalog = MockCatalog::default();
    catalog.tables.insert(
        "UserAccounts".into(),
        MockTable {
            columns: vec![column("id", "integer", "int4", false)],
            primary_keys: vec!["id".into()],
            foreign_keys: vec![],
        },
    );

    generate_project(
        &catalog,
        &TemplateRenderer::new(),
        &["UserAccounts".to_string()],
        &options,
    )
    .unwrap();

    let models: Vec<String> = fs::read_dir(layout.category_dir(ArtifactKind::Model))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n != "__init__.py" && n != "model_mixins.py")
        .collect();
    assert_eq!(models, vec!["useraccounts_model.py"]);

    assert_eq!(
        registry_imports(&layout, ArtifactKind::Model),
        vec!["from .useraccounts_model import Useraccounts"]
    );
    let model =
        fs::read_to_string(layout.artifact_path(ArtifactKind::Model, "UserAccounts")).unwrap();
    assert!(model.contains("class Useraccounts(db.Model, ModelToDictMixin):"));
    assert!(model.contains("__tablename__ = \"UserAccounts\""));

    let repository =
        fs::read_to_string(layout.artifact_path(ArtifactKind::Repository, "UserAccounts")).unwrap();
    assert!(repository.contains("from app.models.useraccounts_model import Useraccounts\n"));

    let controller =
        fs::read_to_string(layout.artifact_path(ArtifactKind::Controller, "UserAccounts")).unwrap();
    assert!(controller.contains("useraccounts_bp = Blueprint("));

    let run_py = fs::read_to_string(layout.run_py()).unwrap();
    assert!(run_py.contains("from app.controllers.useraccounts_controller import useraccounts_bp\n"));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_composite_foreign_key_columns_keep_their_targets() {
    let root = temp_dir("e2e_composite_fk");
    let layout = ProjectLayout::new(&root, "shop");
    let options = GenerationOptions::new(layout.clone(), URI);
    let mut catalog = MockCatalog::default();
    catalog.tables.insert(
        "shipments".into(),
        MockTable {
            columns: vec![
                column("id", "integer", "int4", false),
                column("order_id", "integer", "int4", false),
                column("line_no", "integer", "int4", false),
            ],
            primary_keys: vec!["id".into()],
            foreign_keys: vec![
                ForeignKeyRef {
                    source_column: "order_id".into(),
                    target_table: "order_lines".into(),
                    target_column: "order_id".into(),
                },
                ForeignKeyRef {
                    source_column: "line_no".into(),
                    target_table: "order_lines".into(),
                    target_column: "line_no".into(),
                },
            ],
        },
    );

    let schema = introspect_table(&catalog, "shipments").unwrap();
    let ctx = build_context(&schema, ArtifactKind::Model);
    assert_eq!(ctx["columns"][1]["foreign_key"], json!("order_lines.order_id"));
    assert_eq!(ctx["columns"][2]["foreign_key"], json!("order_lines.line_no"));

    generate_project(
        &catalog,
        &TemplateRenderer::new(),
        &["shipments".to_string()],
        &options,
    )
    .unwrap();
    let model =
        fs::read_to_string(layout.artifact_path(ArtifactKind::Model, "shipments")).unwrap();
    assert_eq!(model.matches("ForeignKey(\"order_lines.order_id\")").count(), 1);
    assert_eq!(model.matches("ForeignKey(\"order_lines.line_no\")").count(), 1);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_enum_labels_come_from_the_type_schema() {
    let mut catalog = MockCatalog::users();
    catalog
        .enums
        .insert("audit.user_status_enum".into(), vec!["archived".into()]);

    let schema = introspect_table(&catalog, "users").unwrap();
    assert_eq!(schema.enums["status"].values, vec!["active", "inactive"]);
}
