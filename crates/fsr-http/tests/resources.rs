//! Resource API tests: alerts, files, configuration export and solution packs.

mod common;

use fsr_core::{ApiErrorKind, AuthError, Error, ListParams, Operation, SimplifiedTemplate};
use fsr_http::ResponseBody;
use serde_json::json;
use wiremock::matchers::{
    any, body_json, body_partial_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

// ============================================================================
// Generic helpers and status mapping
// ============================================================================

#[tokio::test]
async fn test_status_errors_are_classified() {
    let server = MockServer::start().await;

    for (id, status, kind) in [
        ("bad", 400, ApiErrorKind::BadRequest),
        ("forbidden", 403, ApiErrorKind::Forbidden),
        ("missing", 404, ApiErrorKind::NotFound),
        ("broken", 500, ApiErrorKind::Other),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/api/3/alerts/{id}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "type": "Error",
                "message": format!("status {status}")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = key_client(&server);
        match client.alerts().get(id).await.unwrap_err() {
            Error::Api(err) => {
                assert_eq!(err.status, status);
                assert_eq!(err.kind(), kind);
                assert_eq!(err.message.as_deref(), Some(format!("status {status}").as_str()));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_get_returns_bytes_for_zip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/3/files/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"PK\x03\x04zip".to_vec(), "application/zip"))
        .mount(&server)
        .await;

    let client = key_client(&server);
    match client.get("files/archive", &[]).await.unwrap() {
        ResponseBody::Bytes(bytes) => assert_eq!(&bytes[..], b"PK\x03\x04zip"),
        other => panic!("expected bytes, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bare_module_path_gets_api_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/3/incidents"))
        .and(query_param("$limit", "5"))
        .and(header("Authorization", format!("API-KEY {API_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hydra:member": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = key_client(&server);
    let body = client.get("incidents", &[("$limit", "5")]).await.unwrap();
    assert_eq!(body.into_json().unwrap()["hydra:member"], json!([]));
}

#[tokio::test]
async fn test_query_posts_to_query_endpoint() {
    let server = MockServer::start().await;
    let query = json!({"logic": "AND", "filters": [{"field": "severity", "operator": "eq", "value": "High"}]});

    Mock::given(method("POST"))
        .and(path("/api/query/alerts"))
        .and(body_json(query.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{"name": "a"}, {"name": "b"}],
            "hydra:totalItems": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = key_client(&server);
    let page = client.query("alerts", query).await.unwrap();
    assert_eq!(page.members.len(), 2);
    assert_eq!(page.total_items, Some(2));
}

// ============================================================================
// Alerts
// ============================================================================

#[tokio::test]
async fn test_alert_crud() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/3/alerts"))
        .and(body_json(json!({"name": "Suspicious login", "severity": "High"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@id": "/api/3/alerts/a1", "uuid": "a1", "name": "Suspicious login"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/3/alerts"))
        .and(query_param("$limit", "10"))
        .and(query_param("$search", "login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{"uuid": "a1"}],
            "hydra:totalItems": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/3/alerts/a1"))
        .and(body_json(json!({"status": "Closed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uuid": "a1", "status": "Closed"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/3/alerts/a1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = key_client(&server);
    let alerts = client.alerts();

    let created = alerts
        .create(json!({"name": "Suspicious login", "severity": "High"}))
        .await
        .unwrap();
    assert_eq!(created["uuid"], "a1");

    let page = alerts
        .list(&ListParams::new().limit(10).search("login"))
        .await
        .unwrap();
    assert_eq!(page.total_items, Some(1));

    let updated = alerts.update("a1", json!({"status": "Closed"})).await.unwrap();
    assert_eq!(updated["status"], "Closed");

    alerts.delete("a1").await.unwrap();
}

// ============================================================================
// Files
// ============================================================================

#[tokio::test]
async fn test_upload_file_as_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/3/files"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"notes.txt\""))
        .and(body_string_contains("text/plain"))
        .and(body_string_contains("hello soar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@id": "/api/3/files/f1",
            "filename": "notes.txt"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "hello soar").unwrap();

    let client = key_client(&server);
    let uploaded = client.files().upload(&file).await.unwrap();
    assert_eq!(uploaded["@id"], "/api/3/files/f1");
}

#[tokio::test]
async fn test_upload_is_resent_after_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "stale"})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_login(&server, "fresh", 1).await;

    Mock::given(method("POST"))
        .and(path("/api/3/files"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/3/files"))
        .and(header("Authorization", "Bearer fresh"))
        .and(body_string_contains("payload-bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"@id": "/api/3/files/f2"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = user_client(&server);
    let uploaded = client
        .files()
        .upload_bytes("payload.bin", b"payload-bytes".to_vec(), None)
        .await
        .unwrap();
    assert_eq!(uploaded["@id"], "/api/3/files/f2");
}

#[tokio::test]
async fn test_create_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/3/attachments"))
        .and(body_json(json!({
            "name": "evidence",
            "file": "/api/3/files/f1",
            "description": "pcap from sensor"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"@id": "/api/3/attachments/x1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = key_client(&server);
    let file: fsr_core::Iri = "/api/3/files/f1".parse().unwrap();
    let attachment = client
        .files()
        .create_attachment("evidence", &file, Some("pcap from sensor"))
        .await
        .unwrap();
    assert_eq!(attachment["@id"], "/api/3/attachments/x1");
}

// ============================================================================
// Configuration export
// ============================================================================

async fn mount_export_job(server: &MockServer, template_uuid: &str, file_name: &str) {
    Mock::given(method("PUT"))
        .and(path("/api/export"))
        .and(query_param("fileName", file_name))
        .and(query_param("template", template_uuid))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobUuid": "job-1"})))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/3/export_jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Exporting"})))
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/3/export_jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "Export Complete",
            "file": {"@id": "/api/3/files/export-file"}
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/3/files/export-file"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            br#"{"exported": true}"#.to_vec(),
            "application/octet-stream",
        ))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_export_from_simplified_template() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/3/picklist_names"))
        .and(query_param("name", "AlertStatus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{"@id": "/api/3/picklist_names/pl-1", "name": "AlertStatus"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/integration/connectors/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [
                {"label": "VirusTotal", "name": "virustotal", "version": "2.1.0"},
                {"label": "OpenAI", "name": "openai", "version": "1.2.0"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/3/workflow_collections"))
        .and(query_param("name", "Incident Response"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{"@id": "/api/3/workflow_collections/wc-7", "name": "Incident Response"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/3/export_templates"))
        .and(body_partial_json(json!({
            "name": "Alert Export",
            "options": {
                "modules": [{"value": "alerts", "includedAttributes": ["name", "status"]}],
                "picklistNames": ["/api/3/picklist_names/pl-1"],
                "connectors": [{"label": "OpenAI", "value": "cyops-connector-openai-1.2.0"}],
                "playbooks": {"collections": [{"label": "Incident Response", "value": "wc-7"}]}
            },
            "metadata": {"autoSelectPicklists": true}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@id": "/api/3/export_templates/tpl-1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_export_job(&server, "tpl-1", "alert_export.json").await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("alert_export.json");

    let template = SimplifiedTemplate::new("Alert Export")
        .module("alerts", &["name", "status"])
        .picklist("AlertStatus")
        .connector("OpenAI")
        .playbook_collection("Incident Response");

    let client = user_client(&server);
    let written = client
        .export_config()
        .export(&template, Some(&output))
        .await
        .unwrap();

    assert_eq!(written, output);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), r#"{"exported": true}"#);
}

#[tokio::test]
async fn test_export_to_zip_output_uses_template_file_name() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/3/export_templates"))
        .and(body_partial_json(json!({"name": "Alerts Backup"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@id": "/api/3/export_templates/tpl-zip"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_export_job(&server, "tpl-zip", "alerts_backup.json").await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("alerts.zip");

    let template = SimplifiedTemplate::new("Alerts Backup").module("alerts", &[]);
    let client = user_client(&server);
    let written = client
        .export_config()
        .export(&template, Some(&output))
        .await
        .unwrap();

    assert_eq!(written, output);
    assert!(output.exists());
}

#[tokio::test]
async fn test_export_by_template_name_picks_newest() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/3/export_templates"))
        .and(query_param("name", "Nightly Backup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [
                {"@id": "/api/3/export_templates/old", "name": "Nightly Backup", "createDate": 1700000000},
                {"@id": "/api/3/export_templates/new", "name": "Nightly Backup", "createDate": 1720000000},
                {"@id": "/api/3/export_templates/other", "name": "Nightly Backup v2", "createDate": 1730000000}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_export_job(&server, "new", "backup.json").await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("backup.json");

    let client = user_client(&server);
    let export = client.export_config();
    export
        .export_by_template_name("Nightly Backup", Some(&output))
        .await
        .unwrap();
    assert!(output.exists());

    // Second lookup is served from the cache.
    assert_eq!(export.template_uuid("Nightly Backup").await.unwrap(), "new");
}

#[tokio::test]
async fn test_unknown_picklist_is_not_found() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;
    Mock::given(method("GET"))
        .and(path("/api/3/picklist_names"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hydra:member": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/3/export_templates"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = user_client(&server);
    let template = SimplifiedTemplate::new("x").picklist("NoSuchList");
    let err = client
        .export_config()
        .create_simplified_template(&template)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "picklist", .. }));
}

#[tokio::test]
async fn test_trigger_export_requires_json_file_name() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = user_client(&server);
    let err = client
        .export_config()
        .trigger_export("tpl-1", "backup.zip")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_failed_export_job() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;
    Mock::given(method("GET"))
        .and(path("/api/3/export_jobs/job-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Export Failed"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = user_client(&server);
    let err = client
        .export_config()
        .wait_for_export("job-9")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Export(_)));
}

#[tokio::test]
async fn test_export_poll_limit() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;
    Mock::given(method("GET"))
        .and(path("/api/3/export_jobs/job-slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Exporting"})))
        .expect(3)
        .mount(&server)
        .await;

    let client = fsr_http::FortiSoar::builder(
        mock_server_url(&server),
        fsr_core::Credential::user_password(USERNAME, PASSWORD),
    )
    .poll_interval(std::time::Duration::from_millis(5))
    .max_export_polls(3)
    .build()
    .unwrap();

    let err = client
        .export_config()
        .wait_for_export("job-slow")
        .await
        .unwrap_err();
    match err {
        Error::Export(message) => assert!(message.contains("3 status checks")),
        other => panic!("expected Export error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_api_key_cannot_export() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = key_client(&server);
    let err = client
        .export_config()
        .export_by_template_name("Nightly Backup", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Auth(AuthError::UnsupportedOperation {
            operation: Operation::ConfigExport,
            ..
        })
    ));
}

// ============================================================================
// Solution packs
// ============================================================================

#[tokio::test]
async fn test_search_installed_packs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/query/solutionpacks"))
        .and(query_param("$limit", "30"))
        .and(query_param("$page", "1"))
        .and(query_param("$search", "Framework"))
        .and(body_partial_json(json!({
            "search": "Framework",
            "filters": [{"field": "type", "operator": "in", "value": ["solutionpack"]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{"name": "SOARFramework", "label": "SOAR Framework"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = key_client(&server);
    let packs = client
        .solution_packs()
        .search_installed("Framework", fsr_http::api::DEFAULT_SEARCH_LIMIT)
        .await
        .unwrap();
    assert_eq!(packs.len(), 1);
    assert_eq!(packs[0]["label"], "SOAR Framework");
}

#[tokio::test]
async fn test_export_pack_by_exact_name() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;

    Mock::given(method("POST"))
        .and(path("/api/query/solutionpacks"))
        .and(query_param("$limit", "1"))
        .and(body_partial_json(json!({"filters": [{}, {"field": "installed"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{
                "name": "SOARFramework",
                "version": "2.0.0",
                "template": {"uuid": "pack-tpl"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_export_job(&server, "pack-tpl", "framework.json").await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("framework.json");

    let client = user_client(&server);
    let written = client
        .solution_packs()
        .export_pack("SOARFramework", Some(&output))
        .await
        .unwrap();
    assert_eq!(written, output);
    assert!(output.exists());
}

#[tokio::test]
async fn test_export_pack_without_template() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/query/solutionpacks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{"name": "Widgets", "version": "1.0.0"}]
        })))
        .mount(&server)
        .await;

    let client = user_client(&server);
    let err = client
        .solution_packs()
        .export_pack("Widgets", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}
