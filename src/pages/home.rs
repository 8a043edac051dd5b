use std::cell::RefCell;
use std::rc::Rc;

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::api::ApiClient;
use crate::components::force_graph::{ForceGraphCanvas, GraphHandle, GraphView, SelectedTopic};
use crate::config::ExplorerConfig;
use crate::graph::{MergeReport, NodeId};
use crate::session::{LoadState, Session};

fn log_report(action: &str, report: &MergeReport) {
	info!(
		"{}: {} new nodes, {} updated, {} new links",
		action,
		report.added_nodes.len(),
		report.updated_nodes,
		report.added_edges
	);
	if !report.is_clean() {
		warn!("{}: skipped {} malformed records", action, report.rejected.len());
	}
}

/// Explorer page: add-topic form, selected topic details and the graph.
#[component]
pub fn Home() -> impl IntoView {
	let config = ExplorerConfig::from_env();
	let client = ApiClient::new(&config.api_base);
	let graph: GraphHandle = Rc::new(RefCell::new(None));

	let session = RwSignal::new(Session::new());
	let selection = RwSignal::new(None::<SelectedTopic>);
	let expand_request = RwSignal::new(None::<NodeId>);
	let topic = RwSignal::new(String::new());

	// Initial load
	{
		let (client, graph, config) = (client.clone(), graph.clone(), config.clone());
		spawn_local(async move {
			info!("fetching graph data from {}", client.base_url());
			let result = client.get_graph().await;
			let Some(payload) = session.try_update(|s| s.initial_loaded(result)).flatten() else {
				return;
			};
			let (view, report) = GraphView::new(&payload, config.width, config.height, &config);
			log_report("initial load", &report);
			*graph.borrow_mut() = Some(view);
		});
	}

	// Expand whichever node the canvas reports as clicked
	{
		let (client, graph) = (client.clone(), graph.clone());
		Effect::new(move |_| {
			let Some(id) = expand_request.get() else {
				return;
			};
			let name = graph
				.borrow()
				.as_ref()
				.and_then(|view| view.store().node(&id).map(|node| node.name.clone()));
			let Some(name) = name else {
				return;
			};
			if !session.try_update(|s| s.begin_expand(&id)).unwrap_or(false) {
				return;
			}

			let (client, graph) = (client.clone(), graph.clone());
			spawn_local(async move {
				let result = client.expand_node(&name, &id).await;
				let Some(response) = session.try_update(|s| s.expand_finished(result)).flatten()
				else {
					return;
				};
				let selected = graph.borrow_mut().as_mut().map(|view| {
					let report = view.merge(&response.updated_graph);
					log_report("expand node", &report);
					if let Some(summary) = response.summary() {
						view.attach_summary(&id, summary);
					}
					view.selected_topic()
				});
				if let Some(selected) = selected {
					selection.set(selected);
				}
			});
		});
	}

	let on_submit = {
		let graph = graph.clone();
		move |ev: SubmitEvent| {
			ev.prevent_default();
			let requested = topic.get_untracked();
			let Some(requested) = session.try_update(|s| s.begin_add(&requested)).flatten() else {
				return;
			};
			let (client, graph) = (client.clone(), graph.clone());
			spawn_local(async move {
				let result = client.add_node(&requested).await;
				let Some(payload) = session.try_update(|s| s.add_finished(result)).flatten() else {
					return;
				};
				topic.set(String::new());
				let selected = graph.borrow_mut().as_mut().map(|view| {
					let report = view.merge(&payload);
					log_report("add topic", &report);
					view.selected_topic()
				});
				if let Some(selected) = selected {
					if selection.get_untracked() != selected {
						selection.set(selected);
					}
				}
			});
		}
	};

	let processing = move || session.with(|s| s.is_processing());
	let adding = move || session.with(|s| s.is_adding());

	view! {
		<div class="explorer">
			{move || match session.with(|s| s.load_state().clone()) {
				LoadState::Loading => {
					Some(view! { <div class="status">"Loading graph data..."</div> }.into_any())
				}
				LoadState::Failed(message) => {
					Some(
						view! { <div class="status error">"Error loading graph: " {message}</div> }
							.into_any(),
					)
				}
				LoadState::Ready => None,
			}}

			<div
				class="explorer-main"
				style=move || {
					if session.with(|s| s.is_ready()) { "display: flex;" } else { "display: none;" }
				}
			>
				<h2>"Knowledge Graph Explorer"</h2>

				<form class="add-topic" on:submit=on_submit>
					<input
						type="text"
						placeholder="Enter a topic to explore"
						prop:value=move || topic.get()
						on:input=move |ev| topic.set(event_target_value(&ev))
						disabled=adding
					/>
					<button type="submit" disabled=adding>
						{move || if adding() { "Processing..." } else { "Add Topic" }}
					</button>
				</form>

				{move || {
					session
						.with(|s| s.notice().map(str::to_owned))
						.map(|notice| {
							view! {
								<div class="notice">
									<span>{notice}</span>
									<button on:click=move |_| session.update(|s| s.dismiss_notice())>
										"Dismiss"
									</button>
								</div>
							}
						})
				}}

				{move || {
					selection
						.get()
						.map(|selected| {
							let description = selected
								.description
								.unwrap_or_else(|| "Click to explore this topic".to_string());
							view! {
								<div class="topic-details">
									<h3>{selected.name}</h3>
									<p>{description}</p>
									<Show when=move || session.with(|s| s.expanding().is_some())>
										<p class="loading">"Loading topic data..."</p>
									</Show>
								</div>
							}
						})
				}}

				<div class="graph-frame">
					<ForceGraphCanvas
						graph=graph
						selection=selection
						expand_request=expand_request
						width=Some(config.width)
						height=Some(config.height)
					/>
					<Show when=processing>
						<div class="processing-overlay">"Processing..."</div>
					</Show>
				</div>
			</div>
		</div>
	}
}
