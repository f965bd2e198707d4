use leptos::prelude::*;
use log::error;

use crate::components::course_graph::CourseGraphCanvas;
use crate::graph::CourseDataset;
use crate::layout::{CategoryKey, LayoutKind};

const SAMPLE_COURSES: &str = include_str!("../../assets/courses.json");

const LAYOUTS: &[(&str, LayoutKind)] = &[
	("force", LayoutKind::Force),
	("grid", LayoutKind::Grid),
	("hierarchical", LayoutKind::Hierarchical),
	("faculty", LayoutKind::Concentric(CategoryKey::Faculty)),
	("subject", LayoutKind::Concentric(CategoryKey::Subject)),
	("level", LayoutKind::Concentric(CategoryKey::Level)),
];

fn sample_dataset() -> CourseDataset {
	CourseDataset::from_json(SAMPLE_COURSES).unwrap_or_else(|e| {
		error!("Bundled course data is invalid: {}", e);
		CourseDataset::default()
	})
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let dataset = Signal::derive(sample_dataset);
	let layout = RwSignal::new(LayoutKind::Force);

	let on_layout = move |ev: leptos::ev::Event| {
		let value = event_target_value(&ev);
		if let Some((_, kind)) = LAYOUTS.iter().find(|(name, _)| *name == value) {
			layout.set(*kind);
		}
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<CourseGraphCanvas data=dataset layout=layout fullscreen=true />
				<div class="graph-overlay">
					<h1>"Course Relationships"</h1>
					<p class="subtitle">
						"Click to select, shift-click to add. Drag nodes to pin them. Scroll to zoom. Double-click to reset."
					</p>
					<select on:change=on_layout>
						{LAYOUTS
							.iter()
							.map(|(name, _)| view! { <option value=*name>{*name}</option> })
							.collect_view()}
					</select>
				</div>
			</div>
		</ErrorBoundary>
	}
}
