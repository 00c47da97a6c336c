use client::{Backend, ExtractRequest, ExtractResponse};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::document::{Action, Document, ElementIds, EXTRACT_LABEL, SelectOption};
use crate::metrics::Metrics;
use crate::render;

/// How an extract activation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// A required anchor was missing, nothing happened
    Skipped,
    /// Empty input, warning shown, no request sent
    Invalid,
    Rendered,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Extract(ExtractOutcome),
    Clear,
}

/// Which triggers got a click listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wiring {
    pub extract: bool,
    pub clear: bool,
}

/// Disables the extract trigger for as long as it lives and restores it on drop,
/// whichever way the submission ends.
struct TriggerGuard<D: Document> {
    document: Arc<D>,
    id: String,
    label: String,
}

impl<D: Document> TriggerGuard<D> {
    fn engage(document: Arc<D>, id: &str) -> Self {
        let label = match document.inner_html(id) {
            // Re-enabled mid-flight: the loading label is not the one to restore
            Some(label) if label != render::LOADING_LABEL => label,
            _ => EXTRACT_LABEL.to_string(),
        };
        document.set_disabled(id, true);
        document.set_inner_html(id, render::LOADING_LABEL);

        Self {
            document,
            id: id.to_string(),
            label,
        }
    }
}

impl<D: Document> Drop for TriggerGuard<D> {
    fn drop(&mut self) {
        self.document.set_disabled(&self.id, false);
        self.document.set_inner_html(&self.id, &self.label);
    }
}

/// A validated submission whose trigger is already disabled
struct Submission<D: Document> {
    trigger: TriggerGuard<D>,
    request: ExtractRequest,
}

pub struct Controller<D: Document, B: Backend> {
    document: Arc<D>,
    backend: Arc<B>,
    ids: ElementIds,
    metrics: Arc<Metrics>,
}

impl<D: Document, B: Backend> Controller<D, B> {
    pub fn new(document: Arc<D>, backend: Arc<B>, ids: ElementIds) -> Self {
        Self {
            document,
            backend,
            ids,
            metrics: Metrics::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn document(&self) -> &Arc<D> {
        &self.document
    }

    pub fn ids(&self) -> &ElementIds {
        &self.ids
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Page ready: populate the model selector, then wire the triggers
    pub async fn init(&self) -> Wiring {
        self.load_models().await;
        self.wire_events()
    }

    /// Replace the selector's options with the backend catalog, in response order.
    /// Failures are logged and leave the selector as it was.
    pub async fn load_models(&self) -> bool {
        let catalog = match self.backend.list_models().await {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Error loading models");
                self.metrics.record_catalog(false);
                return false;
            }
        };

        let options: Vec<SelectOption> = catalog
            .models
            .iter()
            .map(|(id, info)| SelectOption {
                value: id.to_string(),
                text: info.name.clone(),
            })
            .collect();
        let count = options.len();

        if !self.document.replace_options(&self.ids.model_selector, options) {
            warn!(id = %self.ids.model_selector, "Model selector not found");
            self.metrics.record_catalog(false);
            return false;
        }

        self.metrics.record_catalog(true);
        info!(models = count, "Model catalog loaded");
        true
    }

    /// Bind the extract and clear handlers. Missing triggers are skipped.
    pub fn wire_events(&self) -> Wiring {
        let wiring = Wiring {
            extract: self.document.add_click_listener(&self.ids.extract_button, Action::Extract),
            clear: self.document.add_click_listener(&self.ids.clear_button, Action::Clear),
        };
        debug!(extract = wiring.extract, clear = wiring.clear, "Event listeners wired");
        wiring
    }

    /// Listener bound to `id`, if the control exists, is wired and is enabled
    fn listener(&self, id: &str) -> Option<Action> {
        let action = self.document.click_action(id)?;
        if self.document.is_disabled(id).unwrap_or(false) {
            debug!(%id, "Ignoring click on disabled control");
            return None;
        }
        Some(action)
    }

    /// Activate the control `id` and run its handler to completion
    pub async fn dispatch(&self, id: &str) -> Option<Handled> {
        match self.listener(id)? {
            Action::Extract => Some(Handled::Extract(self.handle_extract().await)),
            Action::Clear => {
                self.handle_clear();
                Some(Handled::Clear)
            }
        }
    }

    pub async fn handle_extract(&self) -> ExtractOutcome {
        match self.begin_extract() {
            Ok(submission) => self.finish_extract(submission).await,
            Err(outcome) => outcome,
        }
    }

    /// Synchronous half of a submission: resolve anchors, validate, disable the trigger
    fn begin_extract(&self) -> Result<Submission<D>, ExtractOutcome> {
        let ids = &self.ids;
        let required = [
            &ids.input,
            &ids.result,
            &ids.model_selector,
            &ids.extract_button,
            &ids.badges,
        ];
        if let Some(missing) = required.iter().find(|id| !self.document.has_element(id)) {
            error!(id = %missing, "Required DOM elements not found");
            return Err(ExtractOutcome::Skipped);
        }

        let text = self.document.value(&ids.input).unwrap_or_default().trim().to_string();
        if text.is_empty() {
            self.document.set_inner_html(&ids.result, render::WARNING_NOTICE);
            self.metrics.record_rejected();
            return Err(ExtractOutcome::Invalid);
        }

        let model_version = self.document.value(&ids.model_selector).unwrap_or_default();
        let trigger = TriggerGuard::engage(Arc::clone(&self.document), &ids.extract_button);

        Ok(Submission {
            trigger,
            request: ExtractRequest { text, model_version },
        })
    }

    async fn finish_extract(&self, submission: Submission<D>) -> ExtractOutcome {
        let Submission { trigger, request } = submission;
        self.metrics.record_submit();
        let started = Instant::now();

        let outcome = match self.backend.extract(&request).await {
            Ok(response) => {
                self.render_response(&response);
                info!(
                    model = %request.model_version,
                    entity_types = response.entity_counts.as_ref().map_or(0, |c| c.len()),
                    "Extraction rendered"
                );
                ExtractOutcome::Rendered
            }
            Err(e) => {
                error!(model = %request.model_version, error = %format!("{e:#}"), "Extraction failed");
                self.document
                    .set_inner_html(&self.ids.result, &render::danger_notice(&e.to_string()));
                ExtractOutcome::Failed
            }
        };

        self.metrics
            .record_extract(started.elapsed(), outcome == ExtractOutcome::Rendered);
        drop(trigger);
        outcome
    }

    fn render_response(&self, response: &ExtractResponse) {
        let markup = response
            .highlighted_text
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(render::NO_ENTITIES);
        self.document.set_inner_html(&self.ids.result, markup);

        render::render_badges(
            self.document.as_ref(),
            &self.ids.badges,
            response.entity_counts.as_ref(),
        );
    }

    /// Blank the input, result and badge areas. Each target is optional.
    pub fn handle_clear(&self) {
        let ids = &self.ids;
        let input = self.document.set_value(&ids.input, "");
        let result = self.document.set_inner_html(&ids.result, "");
        let badges = self.document.set_inner_html(&ids.badges, "");
        debug!(input, result, badges, "Form cleared");
    }
}

impl<D: Document + 'static, B: Backend + 'static> Controller<D, B> {
    /// Activate the control `id` and run its handler as a task of its own.
    ///
    /// The trigger is disabled before this returns, so a second activation of
    /// the same control is ignored while the first is in flight.
    pub fn spawn_click(self: &Arc<Self>, id: &str) -> Option<JoinHandle<Handled>> {
        let handle = match self.listener(id)? {
            Action::Extract => match self.begin_extract() {
                Ok(submission) => {
                    let this = Arc::clone(self);
                    tokio::spawn(async move {
                        Handled::Extract(this.finish_extract(submission).await)
                    })
                }
                Err(outcome) => tokio::spawn(std::future::ready(Handled::Extract(outcome))),
            },
            Action::Clear => {
                self.handle_clear();
                tokio::spawn(std::future::ready(Handled::Clear))
            }
        };
        Some(handle)
    }
}
