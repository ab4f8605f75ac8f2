//! HTTP adapter for the remote document store.
//!
//! Speaks a small JSON API:
//!
//! ```text
//! GET {base}/folders/{id}/files?extensions=md&order=name&recursive=true
//!     &content=true[&modified_since=rfc3339]      → [RemoteFile]
//! PUT {base}/files/{id}  {"content": "…"}         → 2xx
//! ```
//!
//! Errors bubble up opaquely; the sync engine owns retry policy (which is:
//! none) and never looks at status codes. Timeouts are this adapter's job.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use chronicle_core::types::{Document, DocumentId};
use chronicle_sync::{DocumentStore, ListQuery, SortOrder, StoreError};

pub struct RemoteStore {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteFile {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    #[serde(default)]
    content: String,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }
}

impl DocumentStore for RemoteStore {
    fn list(&self, query: &ListQuery) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}/folders/{}/files", self.base_url, query.folder_id);
        let mut request = self
            .agent
            .get(&url)
            .query("extensions", &query.extensions.join(","))
            .query(
                "order",
                match query.order {
                    SortOrder::Name => "name",
                },
            )
            .query("recursive", if query.recursive { "true" } else { "false" })
            .query("content", if query.with_content { "true" } else { "false" });
        if let Some(since) = query.modified_since {
            request = request.query("modified_since", &since.to_rfc3339());
        }

        let files: Vec<RemoteFile> = self.authorize(request).call()?.into_json()?;
        let mut documents: Vec<Document> = files
            .into_iter()
            .map(|f| Document {
                id: DocumentId(f.id),
                name: f.name,
                remote_created_at: f.created_at,
                remote_modified_at: f.modified_at,
                content: f.content,
            })
            .collect();
        // The server is asked for name order; sort again so the pipeline's
        // ordering guarantee never depends on remote behavior.
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(documents)
    }

    fn update(&self, id: &DocumentId, content: &str) -> Result<(), StoreError> {
        let url = format!("{}/files/{}", self.base_url, id);
        self.authorize(self.agent.put(&url))
            .send_json(serde_json::json!({ "content": content }))?;
        Ok(())
    }
}
