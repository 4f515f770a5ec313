//! The mutable-state container editor operations go through. Each
//! `Fishbone` owns one diagram; instances are independent, so multiple
//! diagrams (and tests) never share state.
//!
//! Every mutation schedules a full re-layout; the host drives
//! [`Fishbone::layout_pass`] on its next tick. A failed pass is logged and
//! skipped, leaving the previous geometry in place — layout errors are
//! never fatal to an editing session.

use crate::config::LayoutConfig;
use crate::error::FishboneError;
use crate::ir::{Diagram, Priority};
use crate::layout::{self, EstimatedMeasurer, FishboneLayout, LabelMeasurer};
use crate::scheduler::LayoutScheduler;
use crate::theme::Theme;

pub struct Fishbone {
    diagram: Diagram,
    config: LayoutConfig,
    palette: Vec<String>,
    measurer: Box<dyn LabelMeasurer>,
    scheduler: LayoutScheduler,
    layout: Option<FishboneLayout>,
}

impl Fishbone {
    pub fn new(config: LayoutConfig, theme: &Theme) -> Self {
        let measurer = Box::new(EstimatedMeasurer::new(&config));
        Self::with_measurer(Diagram::new(), config, theme, measurer)
    }

    /// Starts from the classic seeded 6M diagram.
    pub fn demo(config: LayoutConfig, theme: &Theme) -> Self {
        let measurer = Box::new(EstimatedMeasurer::new(&config));
        let diagram = Diagram::demo(&theme.category_colors);
        Self::with_measurer(diagram, config, theme, measurer)
    }

    pub fn with_measurer(
        diagram: Diagram,
        config: LayoutConfig,
        theme: &Theme,
        measurer: Box<dyn LabelMeasurer>,
    ) -> Self {
        let mut engine = Self {
            diagram,
            config,
            palette: theme.category_colors.clone(),
            measurer,
            scheduler: LayoutScheduler::new(),
            layout: None,
        };
        engine.scheduler.request();
        engine
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The most recently computed layout, if any pass has succeeded.
    pub fn layout(&self) -> Option<&FishboneLayout> {
        self.layout.as_ref()
    }

    pub fn set_problem_statement(&mut self, text: &str) {
        self.diagram.problem_statement = text.to_string();
        self.scheduler.request();
    }

    pub fn add_category(&mut self, title: &str) -> String {
        let id = self.diagram.add_category(title, &self.palette);
        self.scheduler.request();
        id
    }

    pub fn edit_category_title(&mut self, category_id: &str, title: &str) {
        if let Some(category) = self.diagram.category_mut(category_id) {
            category.title = title.trim().to_string();
            self.scheduler.request();
        }
    }

    /// Stale ids are a no-op, not an error.
    pub fn delete_category(&mut self, category_id: &str) {
        if self.diagram.remove_category(category_id) {
            self.scheduler.request();
        }
    }

    pub fn add_cause(&mut self, category_id: &str, text: &str, priority: Priority) -> Option<String> {
        let id = self.diagram.add_cause(category_id, text, priority)?;
        self.scheduler.request();
        Some(id)
    }

    pub fn edit_cause_text(&mut self, cause_id: &str, text: &str) {
        if let Some(cause) = self.diagram.cause_mut(cause_id) {
            cause.text = text.trim().to_string();
            self.scheduler.request();
        }
    }

    pub fn delete_cause(&mut self, category_id: &str, cause_id: &str) {
        if self.diagram.remove_cause(category_id, cause_id) {
            self.scheduler.request();
        }
    }

    pub fn reset(&mut self) {
        self.diagram = Diagram::new();
        self.layout = None;
        self.scheduler.request();
    }

    /// Runs the pending layout pass, if any, and returns the current
    /// layout. Coalesced: any number of mutations since the last call
    /// produce at most one recomputation.
    ///
    /// A deferred pass (labels not yet measurable) stays pending for the
    /// next tick. Any other failure is logged and skipped; the previous
    /// frame's geometry persists.
    pub fn layout_pass(&mut self) -> Option<&FishboneLayout> {
        if self.scheduler.take() {
            match layout::compute_layout(&self.diagram, &self.config, self.measurer.as_mut()) {
                Ok(layout) => {
                    for (cause_id, rect) in &layout.causes {
                        if let Some(cause) = self.diagram.cause_mut(cause_id) {
                            cause.layout = Some(*rect);
                        }
                    }
                    self.layout = Some(layout);
                }
                Err(err) if err.is_deferral() => {
                    self.scheduler.request();
                }
                Err(err) => {
                    eprintln!("warning: layout pass skipped: {err}");
                }
            }
        }
        self.layout.as_ref()
    }

    pub fn connector_path(&self, cause_id: &str) -> Option<&str> {
        self.layout.as_ref().and_then(|layout| {
            layout
                .connectors
                .iter()
                .find(|connector| connector.cause_id == cause_id)
                .map(|connector| connector.path.as_str())
        })
    }

    pub fn to_json(&self) -> Result<String, FishboneError> {
        Ok(self.diagram.to_json()?)
    }

    /// Replaces the diagram with an imported one and schedules a fresh
    /// layout; cached label rects in the payload are recomputed.
    pub fn import_json(&mut self, input: &str) -> Result<(), FishboneError> {
        self.diagram = Diagram::from_json(input)?;
        self.layout = None;
        self.scheduler.request();
        Ok(())
    }
}
