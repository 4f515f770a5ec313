use serde::{Deserialize, Serialize};

/// Wire format version written by [`Diagram::to_json`]. Bumped when the
/// exported shape changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    /// Presentation side is derived from category order, never stored:
    /// even indices hang above the spine.
    pub fn of_index(index: usize) -> Self {
        if index % 2 == 0 { Side::Top } else { Side::Bottom }
    }

    pub fn is_top(self) -> bool {
        matches!(self, Side::Top)
    }

    /// -1 for top (outward is up), +1 for bottom.
    pub fn direction(self) -> f32 {
        if self.is_top() { -1.0 } else { 1.0 }
    }
}

/// Cached placement of a cause label, owned by the layout engine and
/// overwritten on every pass. Absence means "not yet measured".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cause {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    /// Present in the wire format for forward compatibility; nested causes
    /// are not laid out or rendered.
    #[serde(default)]
    pub sub_causes: Vec<Cause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Rect>,
}

fn default_priority() -> Priority {
    Priority::Medium
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub causes: Vec<Cause>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub problem_statement: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(skip)]
    next_id: u64,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            problem_statement: String::new(),
            categories: Vec::new(),
            next_id: 1,
        }
    }

    /// The classic 6M starter diagram the interactive editor seeds on init.
    pub fn demo(palette: &[String]) -> Self {
        let mut diagram = Self::new();
        diagram.problem_statement = "Website Conversion Rate is Low".to_string();
        for title in [
            "Methods",
            "Machines",
            "Materials",
            "Measurements",
            "Mother Nature",
            "Manpower",
        ] {
            diagram.add_category(title, palette);
        }
        diagram
    }

    /// Ids are minted from a per-diagram counter so repeated layout runs
    /// over the same edit sequence stay byte-identical.
    pub fn mint_id(&mut self) -> String {
        let id = format!("c{}", self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add_category(&mut self, title: &str, palette: &[String]) -> String {
        let color = if palette.is_empty() {
            String::new()
        } else {
            palette[self.categories.len() % palette.len()].clone()
        };
        let id = self.mint_id();
        self.categories.push(Category {
            id: id.clone(),
            title: title.trim().to_string(),
            color,
            causes: Vec::new(),
        });
        id
    }

    /// Returns false when the id is stale; deletion of a missing category
    /// is a no-op, not an error.
    pub fn remove_category(&mut self, category_id: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|cat| cat.id != category_id);
        self.categories.len() != before
    }

    pub fn add_cause(&mut self, category_id: &str, text: &str, priority: Priority) -> Option<String> {
        self.category(category_id)?;
        let id = self.mint_id();
        let category = self.category_mut(category_id)?;
        category.causes.push(Cause {
            id: id.clone(),
            text: text.trim().to_string(),
            priority,
            sub_causes: Vec::new(),
            layout: None,
        });
        Some(id)
    }

    pub fn remove_cause(&mut self, category_id: &str, cause_id: &str) -> bool {
        let Some(category) = self.category_mut(category_id) else {
            return false;
        };
        let before = category.causes.len();
        category.causes.retain(|cause| cause.id != cause_id);
        category.causes.len() != before
    }

    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|cat| cat.id == category_id)
    }

    pub fn category_mut(&mut self, category_id: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|cat| cat.id == category_id)
    }

    pub fn cause(&self, cause_id: &str) -> Option<&Cause> {
        self.categories
            .iter()
            .flat_map(|cat| cat.causes.iter())
            .find(|cause| cause.id == cause_id)
    }

    pub fn cause_mut(&mut self, cause_id: &str) -> Option<&mut Cause> {
        self.categories
            .iter_mut()
            .flat_map(|cat| cat.causes.iter_mut())
            .find(|cause| cause.id == cause_id)
    }

    pub fn cause_count(&self) -> usize {
        self.categories.iter().map(|cat| cat.causes.len()).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Import is tolerant: missing fields default, unknown fields are
    /// ignored, and the id counter is fast-forwarded past anything the
    /// payload already uses.
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        let mut diagram: Diagram = serde_json::from_str(input)?;
        diagram.fast_forward_ids();
        Ok(diagram)
    }

    fn fast_forward_ids(&mut self) {
        let mut max_seen = 0u64;
        let mut visit = |id: &str| {
            if let Some(rest) = id.strip_prefix('c')
                && let Ok(n) = rest.parse::<u64>()
            {
                max_seen = max_seen.max(n);
            }
        };
        for category in &self.categories {
            visit(&category.id);
            let mut stack: Vec<&Cause> = category.causes.iter().collect();
            while let Some(cause) = stack.pop() {
                visit(&cause.id);
                stack.extend(cause.sub_causes.iter());
            }
        }
        self.next_id = max_seen + 1;
    }
}
