//! Admin form and list configuration.
//!
//! Each model's admin screen is described by a static [`ModelAdmin`]: which
//! columns its change list shows and which fields its form edits, with their
//! labels and widgets. The tables are fixed at compile time.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    Textarea,
    /// Markdown or HTML body editor.
    RichText,
    Checkbox,
    Select,
    /// Two-pane picker for many-to-many relations.
    FilterHorizontal,
    Url,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fieldset {
    pub title: &'static str,
    pub fields: &'static [&'static str],
}

/// Admin configuration for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelAdmin {
    pub model: &'static str,
    pub list_display: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub fields: &'static [FieldSpec],
    pub fieldsets: &'static [Fieldset],
}

const fn field(name: &'static str, label: &'static str, widget: Widget, required: bool) -> FieldSpec {
    FieldSpec { name, label, widget, required }
}

pub const POST_ADMIN: ModelAdmin = ModelAdmin {
    model: "post",
    list_display: &["title", "category", "status", "created_at", "operator"],
    search_fields: &["title", "category__name"],
    fields: &[
        field("title", "Title", Widget::TextInput, true),
        field("category_id", "Category", Widget::Select, true),
        field("status", "Status", Widget::Select, false),
        field("summary", "Summary", Widget::Textarea, false),
        field("is_md", "Markdown", Widget::Checkbox, false),
        field("content", "Body", Widget::RichText, true),
        field("tag_ids", "Tags", Widget::FilterHorizontal, false),
    ],
    fieldsets: &[
        Fieldset { title: "Basics", fields: &["title", "category_id", "status"] },
        Fieldset { title: "Content", fields: &["summary", "is_md", "content"] },
        Fieldset { title: "Extra", fields: &["tag_ids"] },
    ],
};

pub const CATEGORY_ADMIN: ModelAdmin = ModelAdmin {
    model: "category",
    list_display: &["name", "status", "is_nav", "owner", "created_at"],
    search_fields: &["name"],
    fields: &[
        field("name", "Name", Widget::TextInput, true),
        field("status", "Status", Widget::Select, false),
        field("is_nav", "Show in navigation", Widget::Checkbox, false),
    ],
    fieldsets: &[],
};

pub const TAG_ADMIN: ModelAdmin = ModelAdmin {
    model: "tag",
    list_display: &["name", "status", "owner", "created_at"],
    search_fields: &["name"],
    fields: &[field("name", "Name", Widget::TextInput, true), field("status", "Status", Widget::Select, false)],
    fieldsets: &[],
};

pub const LINK_ADMIN: ModelAdmin = ModelAdmin {
    model: "link",
    list_display: &["title", "href", "status", "weight", "created_at"],
    search_fields: &["title"],
    fields: &[
        field("title", "Title", Widget::TextInput, true),
        field("href", "Link", Widget::Url, true),
        field("status", "Status", Widget::Select, false),
        field("weight", "Weight", Widget::Number, false),
    ],
    fieldsets: &[],
};

pub const SIDEBAR_ADMIN: ModelAdmin = ModelAdmin {
    model: "sidebar",
    list_display: &["title", "kind", "content", "status", "created_at"],
    search_fields: &["title"],
    fields: &[
        field("title", "Title", Widget::TextInput, true),
        field("kind", "Display type", Widget::Select, true),
        field("content", "Content", Widget::Textarea, false),
        field("status", "Status", Widget::Select, false),
    ],
    fieldsets: &[],
};

/// Every registered admin, in menu order.
pub const REGISTRY: &[ModelAdmin] = &[POST_ADMIN, CATEGORY_ADMIN, TAG_ADMIN, LINK_ADMIN, SIDEBAR_ADMIN];

/// Look up a model's admin by name.
pub fn model_admin(model: &str) -> Option<&'static ModelAdmin> {
    REGISTRY.iter().find(|admin| admin.model == model)
}

impl ModelAdmin {
    /// Check that every required field is present and not blank.
    ///
    /// Unknown keys are rejected so that a form cannot write fields the
    /// admin does not expose (such as counters or the owner).
    pub fn validate(&self, form: &Map<String, Value>) -> Result<(), Error> {
        if let Some(unknown) = form.keys().find(|key| !self.fields.iter().any(|f| f.name == key.as_str())) {
            return Err(Error::InvalidInput(format!("{}: field not editable: {unknown}", self.model)));
        }

        for spec in self.fields.iter().filter(|f| f.required) {
            let blank = match form.get(spec.name) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            };
            if blank {
                return Err(Error::InvalidInput(format!("{}: {} is required", self.model, spec.label)));
            }
        }
        Ok(())
    }
}
