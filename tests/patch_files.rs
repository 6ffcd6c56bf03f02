use doc_transform::{
    load_document, render_document, ChangeSet, DocumentFormat, TransformError, TransformSession,
};
use serde_json::json;

const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: prod
  labels:
    app: web
spec:
  replicas: 2
  template:
    spec:
      containers:
        - name: app
          image: nginx:1.25
          ports:
            - containerPort: 80
        - name: sidecar
          image: envoy:1.29
"#;

#[test]
fn test_yaml_patch_file_round_trip() {
    let patch = r#"
- path: spec.template.spec.containers[name=app].image
  kind: update
  value: nginx:1.27
- path: metadata.labels
  kind: add
  values:
    tier: frontend
- path: spec.template.spec.containers[name=sidecar]
  kind: update
  values:
    securityContext:
      runAsNonRoot: true
- path: spec.replicas
  kind: delete
"#;

    let doc = load_document(DEPLOYMENT, DocumentFormat::Yaml).unwrap();
    let changes = ChangeSet::from_str_with(patch, DocumentFormat::Yaml).unwrap();
    let mut session = TransformSession::new(doc);
    session.apply_all(changes.iter()).unwrap();
    assert_eq!(session.changes_applied(), 4);

    let containers = &session.document()["spec"]["template"]["spec"]["containers"];
    assert_eq!(containers[0]["image"], "nginx:1.27");
    assert_eq!(containers[0]["ports"], json!([{"containerPort": 80}]));
    assert_eq!(
        containers[1]["securityContext"],
        json!({"runAsNonRoot": true})
    );
    assert_eq!(
        session.document()["metadata"]["labels"],
        json!({"app": "web", "tier": "frontend"})
    );
    assert!(session.query("spec.replicas").unwrap().is_none());

    let rendered = render_document(session.document(), DocumentFormat::Yaml).unwrap();
    assert!(rendered.starts_with("apiVersion: apps/v1\nkind: Deployment\nmetadata:\n"));
    assert!(rendered.contains("nginx:1.27"));
    assert!(!rendered.contains("replicas"));
}

#[test]
fn test_numeric_filter_against_yaml_numbers() {
    let doc = load_document(DEPLOYMENT, DocumentFormat::Yaml).unwrap();
    let mut session = TransformSession::new(doc);
    session
        .execute_transform(
            "spec.template.spec.containers[name=app].ports[containerPort=80].protocol",
            doc_transform::ChangeKind::Add,
            Some("TCP"),
            None,
        )
        .unwrap();
    assert_eq!(
        session.document()["spec"]["template"]["spec"]["containers"][0]["ports"][0],
        json!({"containerPort": 80, "protocol": "TCP"})
    );
}

#[test]
fn test_failing_patch_keeps_earlier_changes() {
    let patch = r#"[
        {"path": "metadata.name", "kind": "update", "value": "web-2"},
        {"path": "spec.template.spec.containers[name=missing].image", "kind": "update", "value": "x"},
        {"path": "metadata.namespace", "kind": "update", "value": "dev"}
    ]"#;

    let doc = load_document(DEPLOYMENT, DocumentFormat::Yaml).unwrap();
    let changes = ChangeSet::from_str_with(patch, DocumentFormat::Json).unwrap();
    let mut session = TransformSession::new(doc);

    let err = session.apply_all(changes.iter()).unwrap_err();
    assert!(matches!(err, TransformError::LookupFailed(_)));
    assert_eq!(session.document()["metadata"]["name"], "web-2");
    assert_eq!(session.document()["metadata"]["namespace"], "prod");
}
