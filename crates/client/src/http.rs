//! `reqwest` implementation of [`InvoiceGateway`].

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use billbook_core::pagination::{records, unwrap_data};
use billbook_core::{InvoiceId, Page};
use billbook_invoicing::{
    CreateInvoicePayload, FormData, InvoicePayload, InvoiceRecord, InvoiceType, LedgerAccount,
    Party, PartyKind, Product, Statistics,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, server_message};
use crate::filters::InvoiceFilters;
use crate::gateway::{InvoiceGateway, InvoiceListing};

/// HTTP client for the invoice resource.
#[derive(Debug, Clone)]
pub struct HttpInvoiceGateway {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpInvoiceGateway {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("billbook-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.invoices_url(),
            token: config.auth_token.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Send and decode the body. Non-success statuses become
    /// [`ClientError::Api`] carrying the server's message if it sent one.
    async fn send(&self, req: RequestBuilder) -> ClientResult<Value> {
        let resp = req
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .as_ref()
                .and_then(server_message);
            tracing::warn!(status = status.as_u16(), message = ?message, "invoice request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let body: Value = serde_json::from_str(&text)?;

        // Some endpoints answer 200 with `success: false`.
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }
        Ok(body)
    }

    async fn search<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<Vec<T>> {
        tracing::debug!(path, ?query, "directory search");
        let body = self.send(self.request(Method::GET, path).query(query)).await?;
        records(&body)
            .iter()
            .map(|row| T::deserialize(row).map_err(ClientError::from))
            .collect()
    }

    /// Invoice in a mutation response, if the server sent one.
    fn returned_invoice(body: &Value) -> Option<InvoiceRecord> {
        let inner = unwrap_data(body);
        if inner.is_null() || (inner.get("id").is_none() && inner.get("invoice").is_none()) {
            return None;
        }
        InvoiceRecord::from_value(body).ok()
    }
}

fn type_query(invoice_type: InvoiceType) -> [(&'static str, &'static str); 1] {
    [("type", invoice_type.as_str())]
}

#[async_trait]
impl InvoiceGateway for HttpInvoiceGateway {
    async fn form_data(&self, invoice_type: InvoiceType) -> ClientResult<FormData> {
        let body = self
            .send(self.request(Method::GET, "/create").query(&type_query(invoice_type)))
            .await?;
        Ok(FormData::from_value(&body, invoice_type)?)
    }

    async fn list(&self, filters: &InvoiceFilters) -> ClientResult<InvoiceListing> {
        let query = filters.to_query();
        tracing::debug!(?query, "listing invoices");
        let body = self.send(self.request(Method::GET, "").query(&query)).await?;

        let rows = unwrap_data(&body)
            .get("invoices")
            .filter(|v| !v.is_null())
            .unwrap_or(&body);
        let page = Page::from_envelope_with(rows, InvoiceRecord::from_value)?;
        let statistics = Statistics::from_envelope(&body)?;

        Ok(InvoiceListing { page, statistics })
    }

    async fn show(&self, id: InvoiceId, invoice_type: InvoiceType) -> ClientResult<InvoiceRecord> {
        let body = self
            .send(self.request(Method::GET, &format!("/{id}")).query(&type_query(invoice_type)))
            .await?;
        Ok(InvoiceRecord::from_value(&body)?)
    }

    async fn create(&self, payload: &CreateInvoicePayload) -> ClientResult<InvoiceRecord> {
        let req = self
            .request(Method::POST, "")
            .query(&type_query(payload.invoice_type()))
            .json(payload);
        let body = self.send(req).await?;
        Ok(InvoiceRecord::from_value(&body)?)
    }

    async fn update(&self, id: InvoiceId, payload: &InvoicePayload) -> ClientResult<InvoiceRecord> {
        let req = self
            .request(Method::PUT, &format!("/{id}"))
            .query(&type_query(payload.invoice_type))
            .json(payload);
        let body = self.send(req).await?;
        match Self::returned_invoice(&body) {
            Some(record) => Ok(record),
            None => self.show(id, payload.invoice_type).await,
        }
    }

    async fn delete(&self, id: InvoiceId, invoice_type: InvoiceType) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, &format!("/{id}")).query(&type_query(invoice_type)))
            .await?;
        Ok(())
    }

    async fn post(&self, id: InvoiceId, invoice_type: InvoiceType) -> ClientResult<Option<InvoiceRecord>> {
        let body = self
            .send(self.request(Method::POST, &format!("/{id}/post")).query(&type_query(invoice_type)))
            .await?;
        Ok(Self::returned_invoice(&body))
    }

    async fn unpost(&self, id: InvoiceId, invoice_type: InvoiceType) -> ClientResult<Option<InvoiceRecord>> {
        let body = self
            .send(self.request(Method::POST, &format!("/{id}/unpost")).query(&type_query(invoice_type)))
            .await?;
        Ok(Self::returned_invoice(&body))
    }

    async fn search_parties(&self, query: &str, kind: PartyKind) -> ClientResult<Vec<Party>> {
        self.search("/search-customers", &[("search", query), ("type", kind.as_str())])
            .await
    }

    async fn search_products(&self, query: &str, invoice_type: InvoiceType) -> ClientResult<Vec<Product>> {
        self.search("/search-products", &[("search", query), ("type", invoice_type.as_str())])
            .await
    }

    async fn search_ledger_accounts(&self, query: &str) -> ClientResult<Vec<LedgerAccount>> {
        self.search("/search-ledger-accounts", &[("search", query)]).await
    }
}
