//! Resource CRUD for the tab/unit/note store.

use crate::backend::client::ApiClient;
use crate::backend::types::{ApiError, NoteRecord, TabRecord, UnitRecord};
use reqwest::Method;
use serde::Serialize;
use serde_json::json;

/// Payload for creating a note, the terminal step of the ingestion pipeline.
#[derive(Debug, Serialize)]
pub struct NewNote<'a> {
    /// Identifier of the owning unit.
    pub unit: &'a str,
    /// Note title, usually the uploaded file name.
    pub title: &'a str,
    /// Full extracted text.
    pub content: &'a str,
    /// Short summary shown in listings.
    pub summary: String,
    /// Original file name of the ingested document.
    pub file: &'a str,
    /// Tag describing how the text was extracted.
    pub extraction_method: &'a str,
}

impl ApiClient {
    /// List every tab in the order the store maintains.
    pub async fn list_tabs(&self) -> Result<Vec<TabRecord>, ApiError> {
        let response = self.request(Method::GET, "tabs").send().await?;
        self.read_json(response).await
    }

    /// Create a tab with the given name and display color.
    pub async fn create_tab(&self, name: &str, color: &str) -> Result<TabRecord, ApiError> {
        let response = self
            .request(Method::POST, "tabs")
            .json(&json!({ "name": name, "color": color }))
            .send()
            .await?;
        self.read_json(response).await
    }

    /// Update a tab's name and/or color in place.
    pub async fn update_tab(
        &self,
        id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<TabRecord, ApiError> {
        let mut body = serde_json::Map::new();
        if let Some(name) = name {
            body.insert("name".into(), name.into());
        }
        if let Some(color) = color {
            body.insert("color".into(), color.into());
        }

        let response = self
            .request(Method::PATCH, &format!("tabs/{id}"))
            .json(&body)
            .send()
            .await?;
        self.read_json(response).await
    }

    /// Delete a tab; the store cascades to its units and notes.
    pub async fn delete_tab(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("tabs/{id}"))
            .send()
            .await?;
        self.ensure_success(response).await?;
        tracing::debug!(tab = id, "Tab deleted");
        Ok(())
    }

    /// List the units belonging to one tab, in the store's stable order.
    pub async fn list_units(&self, tab_id: &str) -> Result<Vec<UnitRecord>, ApiError> {
        let response = self
            .request(Method::GET, "units")
            .query(&[("tab", tab_id)])
            .send()
            .await?;
        self.read_json(response).await
    }

    /// Create a unit under the given tab.
    pub async fn create_unit(
        &self,
        tab_id: &str,
        name: &str,
        description: &str,
    ) -> Result<UnitRecord, ApiError> {
        let response = self
            .request(Method::POST, "units")
            .json(&json!({ "tab": tab_id, "name": name, "description": description }))
            .send()
            .await?;
        self.read_json(response).await
    }

    /// Update a unit's name and/or description in place.
    pub async fn update_unit(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<UnitRecord, ApiError> {
        let mut body = serde_json::Map::new();
        if let Some(name) = name {
            body.insert("name".into(), name.into());
        }
        if let Some(description) = description {
            body.insert("description".into(), description.into());
        }

        let response = self
            .request(Method::PATCH, &format!("units/{id}"))
            .json(&body)
            .send()
            .await?;
        self.read_json(response).await
    }

    /// Delete a unit; the store cascades to its notes.
    pub async fn delete_unit(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("units/{id}"))
            .send()
            .await?;
        self.ensure_success(response).await?;
        tracing::debug!(unit = id, "Unit deleted");
        Ok(())
    }

    /// List the notes attached to one unit.
    pub async fn list_notes(&self, unit_id: &str) -> Result<Vec<NoteRecord>, ApiError> {
        let response = self
            .request(Method::GET, "notes")
            .query(&[("unit", unit_id)])
            .send()
            .await?;
        self.read_json(response).await
    }

    /// Persist a note record.
    pub async fn create_note(&self, note: &NewNote<'_>) -> Result<NoteRecord, ApiError> {
        let response = self
            .request(Method::POST, "notes")
            .json(note)
            .send()
            .await?;
        self.read_json(response).await
    }
}
