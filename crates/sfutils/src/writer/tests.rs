use super::*;
use crate::config::ClientConfig;
use crate::result::ApiError;
use crate::test_support::ScriptedTransport;
use serde_json::json;
use std::fmt;

fn sent_objects(client: &RecordClient<ScriptedTransport>) -> Vec<serde_json::Value> {
    client
        .transport()
        .calls()
        .into_iter()
        .filter_map(|(_, args)| args.get("sObjects").cloned())
        .collect()
}

#[tokio::test]
async fn create_from_values() {
    let client = ScriptedTransport::new()
        .respond(json!([{"id": "001A", "success": true}]))
        .into_client();

    let result = client
        .writer()
        .create("Account", [("Name", "Acme"), ("Industry", "Retail")], None)
        .await
        .unwrap();
    assert_eq!(result, SaveResult::succeeded("001A"));
    assert_eq!(
        sent_objects(&client),
        vec![json!([{"attributes": {"type": "Account"}, "Industry": "Retail", "Name": "Acme"}])]
    );
}

#[tokio::test]
async fn create_from_record_with_record_type() {
    let client = ScriptedTransport::new()
        .respond(json!([{"id": "001A", "success": true}]))
        .into_client();

    let record = Record::new().with_field("Name", "Acme");
    client
        .writer()
        .create("Account", &record, Some("012A"))
        .await
        .unwrap();
    assert_eq!(
        sent_objects(&client),
        vec![json!([{"attributes": {"type": "Account"}, "Name": "Acme", "RecordTypeId": "012A"}])]
    );
}

#[tokio::test]
async fn record_type_field_follows_config() {
    let client = RecordClient::with_config(
        ScriptedTransport::new().respond(json!([{"id": "1", "success": true}])),
        ClientConfig::new().record_type_field("Kind__c"),
    );
    client
        .writer()
        .create("Thing", [("Name", "x")], Some("k"))
        .await
        .unwrap();
    assert_eq!(sent_objects(&client)[0][0]["Kind__c"], json!("k"));
}

#[tokio::test]
async fn create_failure_becomes_save_failure() {
    let client = ScriptedTransport::new()
        .respond(json!([{
            "success": false,
            "errors": [{"statusCode": "REQUIRED_FIELD_MISSING", "message": "Name", "fields": ["Name"]}],
        }]))
        .into_client();

    let err = client
        .writer()
        .create("Account", [("Industry", "Retail")], None)
        .await
        .unwrap_err();
    let failure = err.as_save_failure().expect("save failure");
    assert_eq!(failure.id(), None);
    assert_eq!(
        failure.result().errors,
        vec![ApiError {
            status_code: Some("REQUIRED_FIELD_MISSING".into()),
            message: "Name".into(),
            fields: vec!["Name".into()],
        }]
    );
    assert!(std::error::Error::source(failure).is_none());
    assert_eq!(err.to_string(), "Save failure: -");
}

#[tokio::test]
async fn create_with_no_values_is_sent_and_fails_on_outcome() {
    let client = ScriptedTransport::new()
        .respond(json!([{"success": false}]))
        .into_client();
    let values: Vec<(String, Value)> = Vec::new();
    let err = client
        .writer()
        .create("test", values, None)
        .await
        .unwrap_err();
    assert!(err.is_save_failure());
    assert_eq!(client.transport().call_count(), 1);
    assert_eq!(
        sent_objects(&client),
        vec![json!([{"attributes": {"type": "test"}}])]
    );
}

#[tokio::test]
async fn create_from_bare_record_is_rejected_before_sending() {
    let client = ScriptedTransport::new().into_client();
    let err = client
        .writer()
        .create("Account", Record::new(), None)
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(client.transport().call_count(), 0);
}

#[tokio::test]
async fn update_from_id() {
    let client = ScriptedTransport::new()
        .respond(json!([{"id": "003A", "success": true}]))
        .into_client();

    let result = client
        .writer()
        .update("Contact", "003A", [("Title", "CTO")])
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(
        sent_objects(&client),
        vec![json!([{"attributes": {"type": "Contact"}, "Id": "003A", "Title": "CTO"}])]
    );
}

#[tokio::test]
async fn update_from_record_overlays_values() {
    let client = ScriptedTransport::new()
        .respond(json!([{"id": "003A", "success": true}]))
        .into_client();

    let base = Record::new()
        .with_id("003A")
        .with_field("Title", "CEO")
        .with_field("Email", "a@example.com");
    client
        .writer()
        .update("Contact", &base, [("Title", "CTO")])
        .await
        .unwrap();
    assert_eq!(
        sent_objects(&client),
        vec![json!([{
            "attributes": {"type": "Contact"},
            "Id": "003A",
            "Email": "a@example.com",
            "Title": "CTO",
        }])]
    );
    // The caller's record is unchanged.
    assert_eq!(base.get("Title"), Some(&Value::from("CEO")));
}

#[tokio::test]
async fn update_failure_carries_reported_id() {
    let client = ScriptedTransport::new()
        .respond(json!([{
            "id": "003A",
            "success": false,
            "errors": [{"statusCode": "ENTITY_IS_DELETED", "message": "deleted"}],
        }]))
        .into_client();

    let err = client
        .writer()
        .update("Contact", "003A", [("Title", "CTO")])
        .await
        .unwrap_err();
    assert!(err.is_save_failure());
    assert_eq!(err.to_string(), "Save failure: 003A");
}

#[tokio::test]
async fn transport_errors_are_not_wrapped() {
    let client = ScriptedTransport::new().fail("timeout").into_client();
    let err = client
        .writer()
        .update("Contact", "003A", [("Title", "CTO")])
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

#[test]
fn build_record_sets_id_and_fields() {
    let client = ScriptedTransport::new().into_client();
    let record = client
        .writer()
        .build_record(Some("001A"), [("Name", Value::from("Acme")), ("Employees", Value::from(12))]);
    assert_eq!(record.id(), Some("001A"));
    assert_eq!(record.get("Name"), Some(&Value::from("Acme")));
    assert_eq!(record.get("Employees"), Some(&Value::Int(12)));
}

#[test]
fn build_record_without_id() {
    let client = ScriptedTransport::new().into_client();
    let record = client.writer().build_record(None, [("Name", "Acme")]);
    assert_eq!(record.id(), None);
    assert_eq!(record.fields().len(), 1);
}

struct Code(u32);

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{:04}", self.0)
    }
}

#[test]
fn build_record_uses_display_form_for_custom_types() {
    let client = ScriptedTransport::new().into_client();
    let record = client
        .writer()
        .build_record(None, [("Code__c", Value::display(Code(7)))]);
    assert_eq!(record.get("Code__c"), Some(&Value::from("C-0007")));
}

#[test]
fn build_record_joins_lists_as_picklist_text() {
    let client = ScriptedTransport::new().into_client();
    let values = vec![Value::from("Red"), Value::Null, Value::from("Blue"), Value::from("Red")];
    let record = client
        .writer()
        .build_record(None, [("Colors__c", Value::List(values))]);
    assert_eq!(record.get("Colors__c"), Some(&Value::from("Red;Blue")));
}
