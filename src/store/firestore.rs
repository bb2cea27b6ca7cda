//! Cloud Firestore over the v1 REST API.
//!
//! Every record is one document in a single collection; each field is stored
//! as a `stringValue`.

use super::{RecordStore, StoreError};
use crate::auth::Authenticator;
use crate::record::{Field, Record, RecordFields, RecordId};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

/// Documents requested per list page.
const PAGE_SIZE: &str = "300";

/// Where the student collection lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPath {
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    pub collection: String,
}

impl CollectionPath {
    /// `{base}/projects/{p}/databases/{db}/documents/{collection}`
    pub fn collection_url(&self) -> Result<Url, StoreError> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| StoreError::new(format!("invalid Firestore URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::new("Firestore URL cannot be a base"))?
            .pop_if_empty()
            .extend([
                "projects",
                &self.project_id,
                "databases",
                &self.database,
                "documents",
                &self.collection,
            ]);
        Ok(url)
    }

    pub fn document_url(&self, id: &RecordId) -> Result<Url, StoreError> {
        let mut url = self.collection_url()?;
        url.path_segments_mut()
            .map_err(|()| StoreError::new("Firestore URL cannot be a base"))?
            .push(id.as_str());
        Ok(url)
    }
}

/// [`RecordStore`] backed by a Firestore collection.
pub struct FirestoreStore {
    http_client: Client,
    auth: Authenticator,
    path: CollectionPath,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct DocumentBody {
    fields: Map<String, Value>,
}

impl FirestoreStore {
    pub fn new(auth: Authenticator, path: CollectionPath) -> Self {
        Self {
            http_client: Client::new(),
            auth,
            path,
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, StoreError> {
        let token = self.auth.id_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        error!("Firestore {} failed ({}): {}", what, status, text);
        Err(StoreError::new(format!(
            "{what} failed with status {status}: {}",
            error_message(&text).unwrap_or_else(|| status.to_string())
        )))
    }
}

#[async_trait]
impl RecordStore for FirestoreStore {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        let base = self.path.collection_url()?;
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = base.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }
            debug!("Firestore list: {}", url);

            let response = self.send(self.http_client.get(url), "list").await?;
            let page: ListResponse = response.json().await?;
            for document in page.documents {
                records.push(decode_document(&document.name, &document.fields)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!("Loaded {} students from Firestore", records.len());
        Ok(records)
    }

    async fn create(&self, fields: RecordFields) -> Result<Record, StoreError> {
        let url = self.path.collection_url()?;
        let body = DocumentBody {
            fields: encode_fields(&fields),
        };
        let response = self
            .send(self.http_client.post(url).json(&body), "create")
            .await?;
        let document: Document = response.json().await?;
        let id = document_id(&document.name)?;
        info!("Created student {}", id);
        Ok(Record::new(id, fields))
    }

    async fn update(&self, id: &RecordId, fields: RecordFields) -> Result<(), StoreError> {
        let mut url = self.path.document_url(id)?;
        {
            let mut query = url.query_pairs_mut();
            for field in Field::ALL {
                query.append_pair("updateMask.fieldPaths", field_path(field.key()).as_str());
            }
            query.append_pair("currentDocument.exists", "true");
        }
        let body = DocumentBody {
            fields: encode_fields(&fields),
        };
        self.send(self.http_client.patch(url).json(&body), "update")
            .await?;
        info!("Updated student {}", id);
        Ok(())
    }

    async fn remove(&self, id: &RecordId) -> Result<(), StoreError> {
        let url = self.path.document_url(id)?;
        self.send(self.http_client.delete(url), "delete").await?;
        info!("Deleted student {}", id);
        Ok(())
    }
}

/// Encode every field as a Firestore `stringValue`.
pub fn encode_fields(fields: &RecordFields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(field, value)| {
            (
                field.key().to_string(),
                serde_json::json!({ "stringValue": value }),
            )
        })
        .collect()
}

/// Decode a document into a record. Unknown keys are ignored and missing
/// fields stay empty.
pub fn decode_document(name: &str, fields: &Map<String, Value>) -> Result<Record, StoreError> {
    let id = document_id(name)?;
    let mut decoded = RecordFields::empty();
    for field in Field::ALL {
        if let Some(value) = fields.get(field.key()) {
            decoded.set(field, value_text(value));
        }
    }
    Ok(Record::new(id, decoded))
}

/// The document id is the last segment of its resource name.
fn document_id(name: &str) -> Result<RecordId, StoreError> {
    match name.rsplit('/').next() {
        Some(id) if !id.is_empty() => Ok(RecordId::new(id)),
        _ => Err(StoreError::new(format!(
            "unexpected document name from Firestore: {name:?}"
        ))),
    }
}

/// Render a Firestore typed value as text.
fn value_text(value: &Value) -> String {
    let Some(object) = value.as_object() else {
        return String::new();
    };
    let Some((kind, inner)) = object.iter().next() else {
        return String::new();
    };
    match (kind.as_str(), inner) {
        ("nullValue", _) => String::new(),
        (_, Value::String(s)) => s.clone(),
        (_, Value::Number(n)) => n.to_string(),
        (_, Value::Bool(b)) => b.to_string(),
        (_, other) => other.to_string(),
    }
}

/// Field paths that are not plain identifiers must be backquoted.
fn field_path(key: &str) -> String {
    let simple = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        key.to_string()
    } else {
        format!("`{key}`")
    }
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path() -> CollectionPath {
        CollectionPath {
            base_url: "https://firestore.googleapis.com/v1/".to_string(),
            project_id: "school-demo".to_string(),
            database: "(default)".to_string(),
            collection: "students".to_string(),
        }
    }

    #[test]
    fn test_collection_and_document_urls() {
        assert_eq!(
            path().collection_url().unwrap().as_str(),
            "https://firestore.googleapis.com/v1/projects/school-demo/databases/(default)/documents/students"
        );
        assert_eq!(
            path().document_url(&RecordId::new("abc 1")).unwrap().as_str(),
            "https://firestore.googleapis.com/v1/projects/school-demo/databases/(default)/documents/students/abc%201"
        );
    }

    #[test]
    fn test_encode_uses_wire_keys() {
        let fields = RecordFields::empty()
            .with(Field::Name, "Ann")
            .with(Field::Class, "5");
        let encoded = encode_fields(&fields);
        assert_eq!(encoded.len(), Field::ALL.len());
        assert_eq!(encoded["name"], json!({ "stringValue": "Ann" }));
        assert_eq!(encoded["class"], json!({ "stringValue": "5" }));
        assert_eq!(encoded["dateOfBirth"], json!({ "stringValue": "" }));
    }

    #[test]
    fn test_decode_tolerates_missing_and_typed_values() {
        let fields = json!({
            "name": { "stringValue": "Ann" },
            "rollNumber": { "integerValue": "12" },
            "section": { "nullValue": null },
            "nickname": { "stringValue": "ignored" }
        });
        let record = decode_document(
            "projects/p/databases/(default)/documents/students/xyz",
            fields.as_object().unwrap(),
        )
        .unwrap();

        assert_eq!(record.id.as_str(), "xyz");
        assert_eq!(record.get(Field::Name), "Ann");
        assert_eq!(record.get(Field::RollNumber), "12");
        assert_eq!(record.get(Field::Section), "");
        assert_eq!(record.get(Field::Email), "");
    }

    #[test]
    fn test_list_response_without_documents() {
        let page: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_field_path_quoting() {
        assert_eq!(field_path("dateOfBirth"), "dateOfBirth");
        assert_eq!(field_path("class"), "class");
        assert_eq!(field_path("roll-number"), "`roll-number`");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":{"code":403,"message":"Missing or insufficient permissions."}}"#),
            Some("Missing or insufficient permissions.".to_string())
        );
        assert_eq!(error_message("not json"), None);
    }
}
