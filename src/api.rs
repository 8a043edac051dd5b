//! HTTP client for the topic-expansion backend.
//!
//! Requests go through the browser's `fetch` via web-sys. Bodies are read as
//! text and decoded with serde_json so decoding does not depend on the DOM.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use crate::error::GraphError;
use crate::graph::{GraphPayload, NodeId};

/// `POST /api/add-node` response.
#[derive(Clone, Debug, Deserialize)]
pub struct AddNodeResponse {
	/// Nodes and links to merge.
	pub graph: GraphPayload,
}

/// Descriptive text returned with an expansion.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NodeInfo {
	/// Summary of the expanded topic.
	#[serde(default)]
	pub summary: Option<String>,
}

/// `POST /api/expand-node` response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandNodeResponse {
	/// Nodes and links to merge.
	pub updated_graph: GraphPayload,
	/// Details about the expanded node, when the backend has them.
	#[serde(default)]
	pub node_info: Option<NodeInfo>,
}

impl ExpandNodeResponse {
	/// The summary, unless it is missing or blank.
	pub fn summary(&self) -> Option<&str> {
		self.node_info
			.as_ref()?
			.summary
			.as_deref()
			.filter(|s| !s.trim().is_empty())
	}
}

#[derive(Serialize)]
struct AddNodeRequest<'a> {
	topic: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpandNodeRequest<'a> {
	topic: &'a str,
	node_id: &'a NodeId,
}

/// Decode a response body.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, GraphError> {
	Ok(serde_json::from_str(text)?)
}

fn js_error(err: JsValue) -> GraphError {
	GraphError::Network(format!("{:?}", err))
}

/// Client for one backend origin.
#[derive(Clone, Debug)]
pub struct ApiClient {
	base_url: String,
}

impl ApiClient {
	/// A client for `base_url`. A trailing slash is dropped.
	pub fn new(base_url: &str) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	/// The origin requests go to.
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Fetch the whole graph.
	pub async fn get_graph(&self) -> Result<GraphPayload, GraphError> {
		let text = self.send("GET", "/api/get-graph", None).await?;
		decode(&text)
	}

	/// Ask the backend to add `topic`. Returns the nodes and links to merge.
	pub async fn add_node(&self, topic: &str) -> Result<GraphPayload, GraphError> {
		let body = serde_json::to_string(&AddNodeRequest { topic })?;
		let text = self.send("POST", "/api/add-node", Some(body)).await?;
		Ok(decode::<AddNodeResponse>(&text)?.graph)
	}

	/// Ask the backend to expand `node_id`, whose name is `topic`.
	pub async fn expand_node(
		&self,
		topic: &str,
		node_id: &NodeId,
	) -> Result<ExpandNodeResponse, GraphError> {
		let body = serde_json::to_string(&ExpandNodeRequest { topic, node_id })?;
		let text = self.send("POST", "/api/expand-node", Some(body)).await?;
		decode(&text)
	}

	async fn send(&self, method: &str, path: &str, body: Option<String>) -> Result<String, GraphError> {
		let url = format!("{}{}", self.base_url, path);

		let opts = RequestInit::new();
		opts.set_method(method);
		opts.set_mode(RequestMode::Cors);
		if let Some(body) = &body {
			let headers = Headers::new().map_err(js_error)?;
			headers
				.set("Content-Type", "application/json")
				.map_err(js_error)?;
			opts.set_headers(&headers);
			opts.set_body(&JsValue::from_str(body));
		}

		let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
		let window = web_sys::window().ok_or_else(|| GraphError::Network("no window".into()))?;
		let response: Response = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(js_error)?
			.dyn_into()
			.map_err(|_| GraphError::Network("fetch did not return a Response".into()))?;

		debug!("{} {} -> {}", method, url, response.status());
		if !response.ok() {
			return Err(GraphError::Status(response.status()));
		}

		let text = JsFuture::from(response.text().map_err(js_error)?)
			.await
			.map_err(js_error)?;
		text.as_string()
			.ok_or_else(|| GraphError::Malformed("response body is not text".into()))
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn expand_request_uses_camel_case_and_numeric_ids() {
		let id = NodeId::parse("7").unwrap();
		let body = serde_json::to_value(ExpandNodeRequest {
			topic: "Physics",
			node_id: &id,
		})
		.unwrap();
		assert_eq!(body, json!({ "topic": "Physics", "nodeId": 7 }));
	}

	#[test]
	fn add_request_carries_the_topic() {
		let body = serde_json::to_value(AddNodeRequest { topic: "B" }).unwrap();
		assert_eq!(body, json!({ "topic": "B" }));
	}

	#[test]
	fn decodes_the_initial_graph() {
		let payload: GraphPayload = decode(
			r#"{"nodes":[{"id":"1","name":"A"}],"links":[{"source":"1","target":"1","label":"x"}]}"#,
		)
		.unwrap();
		assert_eq!(payload.nodes.len(), 1);
		assert_eq!(payload.links[0].label.as_deref(), Some("x"));
	}

	#[test]
	fn decodes_add_node_response() {
		let response: AddNodeResponse = decode(
			r#"{"graph":{"nodes":[{"id":1,"name":"A"},{"id":2,"name":"B"}],"links":[]}}"#,
		)
		.unwrap();
		assert_eq!(response.graph.nodes.len(), 2);
	}

	#[test]
	fn decodes_expand_response_with_and_without_summary() {
		let full: ExpandNodeResponse = decode(
			r#"{"updatedGraph":{"nodes":[],"links":[]},"nodeInfo":{"summary":"About A"}}"#,
		)
		.unwrap();
		assert_eq!(full.summary(), Some("About A"));

		let bare: ExpandNodeResponse = decode(r#"{"updatedGraph":{"nodes":[]}}"#).unwrap();
		assert_eq!(bare.summary(), None);

		let blank: ExpandNodeResponse =
			decode(r#"{"updatedGraph":{},"nodeInfo":{"summary":"  "}}"#).unwrap();
		assert_eq!(blank.summary(), None);
	}

	#[test]
	fn missing_graph_is_malformed() {
		let err = decode::<ExpandNodeResponse>(r#"{"nodeInfo":{}}"#).unwrap_err();
		assert!(matches!(err, GraphError::Malformed(_)));
	}

	#[test]
	fn base_url_drops_trailing_slash() {
		assert_eq!(ApiClient::new("http://localhost:5001/").base_url(), "http://localhost:5001");
	}
}
