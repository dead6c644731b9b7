//! Declarative forms and their transient state.
//!
//! A form is an ordered list of [`FieldDescriptor`]s. [`FormState`] holds the
//! values being edited, the tag-entry buffer and whether errors are shown.
//! Errors stay hidden until a submit attempt or a server rejection.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::cascade::CascadeLevel;
use crate::validation::{
    CustomValidator, FieldErrors, FormValues, RuleSet, ValidationResult, Validator, is_blank,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Looks up the label for `value`, comparing as strings.
pub fn option_label<'a>(options: &'a [SelectOption], value: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label.as_str())
}

/// Renders a value for read-only display.
pub type RenderFn = Arc<dyn Fn(&Value, FormMode) -> String + Send + Sync>;
/// Maps raw input onto the stored value, given the current one.
pub type UpdateFn = Arc<dyn Fn(Value, &Value) -> Value + Send + Sync>;

/// Caller-supplied behaviour for a field no built-in kind covers.
#[derive(Clone)]
pub struct CustomField {
    pub render: RenderFn,
    pub update: UpdateFn,
}

impl CustomField {
    pub fn new<R, U>(render: R, update: U) -> Self
    where
        R: Fn(&Value, FormMode) -> String + Send + Sync + 'static,
        U: Fn(Value, &Value) -> Value + Send + Sync + 'static,
    {
        Self {
            render: Arc::new(render),
            update: Arc::new(update),
        }
    }
}

impl fmt::Debug for CustomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomField")
    }
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Url,
    Textarea,
    Select(Vec<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    /// Free-form tag entry: Enter adds the buffered tag unless already present.
    Tags,
    Checkbox,
    Switch,
    Radio(Vec<SelectOption>),
    Date,
    DateTime,
    File { accept: Option<String> },
    DependentDropdown(Vec<CascadeLevel>),
    Custom(CustomField),
}

impl FieldKind {
    fn initial_value(&self) -> Value {
        match self {
            Self::Checkbox | Self::Switch => Value::Bool(false),
            Self::MultiSelect(_) | Self::Tags => Value::Array(Vec::new()),
            _ => Value::String(String::new()),
        }
    }

    fn options(&self) -> Option<&[SelectOption]> {
        match self {
            Self::Select(options) | Self::MultiSelect(options) | Self::Radio(options) => Some(options),
            _ => None,
        }
    }

    fn accepts_images(&self) -> bool {
        matches!(self, Self::File { accept: Some(accept) } if accept.starts_with("image/"))
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<String>,
    /// Grid columns spanned, 1 to 4
    pub column: u8,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
            column: 1,
            min_length: None,
            max_length: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn column(mut self, column: u8) -> Self {
        self.column = column.clamp(1, 4);
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Value names this field writes. Cascading fields write one per level.
    pub fn value_names(&self) -> Vec<&str> {
        match &self.kind {
            FieldKind::DependentDropdown(levels) => levels.iter().map(|l| l.name.as_str()).collect(),
            _ => vec![self.name.as_str()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    #[default]
    Create,
    Edit,
    View,
}

impl FormMode {
    pub fn is_read_only(self) -> bool {
        self == Self::View
    }

    /// Label of the submit action; view mode has none.
    pub fn submit_label(self) -> Option<&'static str> {
        match self {
            Self::Create => Some("Create"),
            Self::Edit => Some("Update"),
            Self::View => None,
        }
    }

    pub fn dismiss_label(self) -> &'static str {
        match self {
            Self::View => "Close",
            _ => "Cancel",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Create => "Create new record",
            Self::Edit => "Edit existing record",
            Self::View => "View record details",
        }
    }
}

/// How a form checks its values before submitting.
#[derive(Clone, Default)]
pub enum FormValidation {
    Rules { validator: Validator, rules: RuleSet },
    Custom(CustomValidator),
    /// Only `required` fields are checked, with `"{label} is required"`.
    #[default]
    RequiredOnly,
}

impl FormValidation {
    pub fn rules(rules: RuleSet) -> Self {
        Self::Rules {
            validator: Validator::new(),
            rules,
        }
    }
}

impl fmt::Debug for FormValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rules { rules, .. } => f.debug_tuple("Rules").field(&rules.keys()).finish(),
            Self::Custom(_) => f.write_str("Custom"),
            Self::RequiredOnly => f.write_str("RequiredOnly"),
        }
    }
}

/// Degraded check used when a form declares no rules.
pub fn required_only(fields: &[FieldDescriptor], values: &FormValues) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in fields.iter().filter(|f| f.required) {
        let value = values.get(&field.name).unwrap_or(&Value::Null);
        let blank = is_blank(value) || value.as_str().is_some_and(|s| s.trim().is_empty());
        if blank {
            errors.insert(field.name.clone(), format!("{} is required", field.label));
        }
    }
    errors
}

/// A file picked on the client, before upload.
///
/// The form values only hold its metadata; the bytes stay on the
/// [`FormState`] and travel in [`Submission::files`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl PickedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({"name": self.name, "content_type": self.content_type, "size": self.size})
    }
}

/// What a valid form sends: JSON values plus any newly picked files, keyed by
/// field name. File fields never appear in `values`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    pub values: FormValues,
    pub files: BTreeMap<String, PickedFile>,
}

impl Submission {
    pub fn new(values: FormValues) -> Self {
        Self {
            values,
            files: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePreview {
    /// A newly picked image, previewed locally.
    Picked(PickedFile),
    /// The stored image already on the record.
    Current { url: String },
}

/// Absolute URLs pass through; stored keys are served from `/storage/`.
pub fn storage_url(path: &str) -> String {
    if path.starts_with("http") {
        path.to_string()
    } else {
        format!("/storage/{}", path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// View mode never submits.
    Ignored,
    Invalid(FieldErrors),
    Ready(Submission),
}

#[derive(Debug, Clone)]
pub struct FormState {
    fields: Vec<FieldDescriptor>,
    validation: FormValidation,
    mode: FormMode,
    open: bool,
    values: FormValues,
    tags: Vec<String>,
    tag_input: String,
    files: BTreeMap<String, PickedFile>,
    show_errors: bool,
    client_errors: FieldErrors,
    server_errors: FieldErrors,
}

impl FormState {
    pub fn new(fields: Vec<FieldDescriptor>, validation: FormValidation) -> Self {
        Self {
            fields,
            validation,
            mode: FormMode::Create,
            open: false,
            values: FormValues::new(),
            tags: Vec::new(),
            tag_input: String::new(),
            files: BTreeMap::new(),
            show_errors: false,
            client_errors: FieldErrors::new(),
            server_errors: FieldErrors::new(),
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&Value::Null)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn tag_input(&self) -> &str {
        &self.tag_input
    }

    pub fn errors_shown(&self) -> bool {
        self.show_errors
    }

    /// Opens the form. A record replaces the values; otherwise values left
    /// from before are kept, and an empty form gets per-kind defaults.
    pub fn open(&mut self, mode: FormMode, record: Option<&FormValues>) {
        self.open = true;
        self.mode = mode;
        self.show_errors = false;
        self.client_errors.clear();
        self.server_errors.clear();

        match record {
            Some(record) => {
                self.values = record.clone();
                self.files.clear();
                self.tags = record
                    .get("tags")
                    .and_then(Value::as_array)
                    .map(|tags| {
                        tags.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
            }
            None if self.values.is_empty() => {
                self.values = self.initial_values();
                self.tags.clear();
                self.files.clear();
            }
            None => {}
        }
    }

    /// Closes the form and discards every piece of transient state.
    pub fn close(&mut self) {
        self.open = false;
        self.values.clear();
        self.tags.clear();
        self.tag_input.clear();
        self.files.clear();
        self.show_errors = false;
        self.client_errors.clear();
        self.server_errors.clear();
    }

    fn initial_values(&self) -> FormValues {
        let mut values = FormValues::new();
        for field in &self.fields {
            for name in field.value_names() {
                values.insert(name.to_string(), field.kind.initial_value());
            }
        }
        values
    }

    /// Stores a new value. Custom fields map the input through their update
    /// function. Returns false in view mode.
    pub fn set_value(&mut self, name: &str, value: Value) -> bool {
        if self.mode.is_read_only() {
            return false;
        }
        let value = match self.field(name).map(|f| &f.kind) {
            Some(FieldKind::Custom(custom)) => (custom.update)(value, self.value(name)),
            _ => value,
        };
        self.files.remove(name);
        self.values.insert(name.to_string(), value);
        true
    }

    /// Picks a file for a file field. The value becomes the file's metadata so
    /// validation and preview can inspect it. Returns false in view mode.
    pub fn pick_file(&mut self, name: &str, file: PickedFile) -> bool {
        if self.mode.is_read_only() {
            return false;
        }
        self.values.insert(name.to_string(), file.to_value());
        self.files.insert(name.to_string(), file);
        true
    }

    pub fn picked_file(&self, name: &str) -> Option<&PickedFile> {
        self.files.get(name)
    }

    pub fn set_tag_input(&mut self, text: impl Into<String>) {
        self.tag_input = text.into();
    }

    /// Enter in the tag input: adds the trimmed buffer unless blank or
    /// already present, then clears the buffer. Returns whether a tag was added.
    pub fn commit_tag(&mut self) -> bool {
        let tag = self.tag_input.trim().to_string();
        if tag.is_empty() {
            return false;
        }
        self.tag_input.clear();
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    fn has_tags_field(&self) -> bool {
        self.fields.iter().any(|f| matches!(f.kind, FieldKind::Tags))
    }

    /// Values as validated: the stored values plus the tag list, when the
    /// form has a tags field.
    fn payload(&self) -> FormValues {
        let mut payload = self.values.clone();
        if self.has_tags_field() {
            payload.insert(
                "tags".into(),
                Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
            );
        }
        payload
    }

    fn submission(&self) -> Submission {
        let mut values = self.payload();
        for field in &self.fields {
            if matches!(field.kind, FieldKind::File { .. }) {
                values.remove(&field.name);
            }
        }
        Submission {
            values,
            files: self.files.clone(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let payload = self.payload();
        match &self.validation {
            FormValidation::Rules { validator, rules } => validator.validate(&payload, rules),
            FormValidation::Custom(custom) => custom(&payload),
            FormValidation::RequiredOnly => {
                ValidationResult::from_errors(required_only(&self.fields, &payload))
            }
        }
    }

    /// Validates every field and, when clean, yields what to send. A form with
    /// a tags field always sends `tags`, even when empty.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.mode.is_read_only() {
            return SubmitOutcome::Ignored;
        }
        let result = self.validate();
        if !result.is_valid {
            self.client_errors = result.errors.clone();
            self.show_errors = true;
            return SubmitOutcome::Invalid(result.errors);
        }
        self.client_errors.clear();
        SubmitOutcome::Ready(self.submission())
    }

    /// Records a server-side rejection and shows its field errors.
    pub fn reject(&mut self, errors: FieldErrors) {
        self.server_errors = errors;
        self.show_errors = true;
    }

    /// The message shown under `name`, if errors are visible.
    pub fn error_for(&self, name: &str) -> Option<&str> {
        if !self.show_errors {
            return None;
        }
        self.client_errors
            .get(name)
            .or_else(|| self.server_errors.get(name))
            .map(String::as_str)
    }

    pub fn is_disabled(&self) -> bool {
        self.mode.is_read_only()
    }

    /// Read-only rendering of a field value.
    pub fn display(&self, name: &str) -> String {
        let value = self.value(name);
        let Some(field) = self.field(name) else {
            return display_plain(value);
        };
        match &field.kind {
            FieldKind::Custom(custom) => (custom.render)(value, self.mode),
            FieldKind::Checkbox | FieldKind::Switch => {
                let label = if value.as_bool().unwrap_or(false) { "Yes" } else { "No" };
                label.to_string()
            }
            FieldKind::Tags => {
                if self.tags.is_empty() {
                    "-".to_string()
                } else {
                    self.tags.join(", ")
                }
            }
            kind => match (kind.options(), value) {
                (Some(options), Value::Array(items)) => {
                    let labels: Vec<String> = items
                        .iter()
                        .map(value_key)
                        .map(|v| option_label(options, &v).map(str::to_string).unwrap_or(v))
                        .collect();
                    if labels.is_empty() { "-".to_string() } else { labels.join(", ") }
                }
                (Some(options), value) => {
                    let key = value_key(value);
                    option_label(options, &key)
                        .map(str::to_string)
                        .unwrap_or_else(|| display_plain(value))
                }
                (None, value) => display_plain(value),
            },
        }
    }

    /// Preview for an image file field: a freshly picked file or the stored image.
    pub fn file_preview(&self, name: &str) -> Option<FilePreview> {
        let field = self.field(name)?;
        if !field.kind.accepts_images() {
            return None;
        }
        if let Some(file) = self.files.get(name) {
            return Some(FilePreview::Picked(file.clone()));
        }
        match self.value(name) {
            Value::String(path) if !path.is_empty() => Some(FilePreview::Current {
                url: storage_url(path),
            }),
            _ => None,
        }
    }

    /// Writes a cascading selection and clears the levels it invalidated.
    pub fn apply_cascade(&mut self, change: &crate::cascade::CascadeChange) {
        if self.mode.is_read_only() {
            return;
        }
        self.values
            .insert(change.name.clone(), Value::String(change.value.clone()));
        for name in &change.cleared {
            self.values.insert(name.clone(), Value::String(String::new()));
        }
    }
}

/// String form of a scalar, matching option values.
pub fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn display_plain(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) if s.is_empty() => "-".to_string(),
        other => value_key(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::role_rules;

    fn status_options() -> Vec<SelectOption> {
        vec![
            SelectOption::new("draft", "Draft"),
            SelectOption::new("published", "Published"),
        ]
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("title", "Title", FieldKind::Text).required(),
            FieldDescriptor::new("status", "Status", FieldKind::Select(status_options())).required(),
            FieldDescriptor::new("is_featured", "Featured Post", FieldKind::Checkbox),
            FieldDescriptor::new("tags", "Tags", FieldKind::Tags),
            FieldDescriptor::new(
                "image",
                "Featured Image",
                FieldKind::File {
                    accept: Some("image/*".into()),
                },
            ),
        ]
    }

    fn record(v: Value) -> FormValues {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_initialises_defaults() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::Create, None);
        assert_eq!(form.value("title"), &json!(""));
        assert_eq!(form.value("is_featured"), &json!(false));
        assert_eq!(form.value("tags"), &json!([]));
        assert_eq!(form.mode().submit_label(), Some("Create"));
    }

    #[test]
    fn test_required_only_fallback() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::Create, None);
        form.set_value("title", json!("   "));
        let SubmitOutcome::Invalid(errors) = form.submit() else {
            panic!("expected invalid");
        };
        assert_eq!(errors["title"], "Title is required");
        assert_eq!(errors["status"], "Status is required");
        assert!(form.errors_shown());
        assert_eq!(form.error_for("title"), Some("Title is required"));
    }

    #[test]
    fn test_errors_hidden_until_submit() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::Create, None);
        assert!(form.validate().errors.contains_key("title"));
        assert_eq!(form.error_for("title"), None);
    }

    #[test]
    fn test_close_clears_and_reopen_starts_clean() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::Create, None);
        form.set_value("title", json!("Draft post"));
        form.set_tag_input("rust");
        form.commit_tag();
        form.set_tag_input("half typed");
        form.submit();
        form.close();

        assert!(!form.is_open());
        assert!(form.values().is_empty());
        assert!(form.tags().is_empty());
        assert_eq!(form.tag_input(), "");
        assert!(!form.errors_shown());

        form.open(FormMode::Create, None);
        assert_eq!(form.value("title"), &json!(""));
    }

    #[test]
    fn test_reopen_keeps_values_but_hides_errors() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::Create, None);
        form.set_value("title", json!("Keep me"));
        form.submit();
        assert!(form.errors_shown());

        form.open(FormMode::Create, None);
        assert!(!form.errors_shown());
        assert_eq!(form.value("title"), &json!("Keep me"));
    }

    #[test]
    fn test_tag_entry_dedups() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::Create, None);
        form.set_tag_input("  rust ");
        assert!(form.commit_tag());
        form.set_tag_input("rust");
        assert!(!form.commit_tag());
        assert_eq!(form.tag_input(), "");
        form.set_tag_input("   ");
        assert!(!form.commit_tag());
        form.set_tag_input("axum");
        form.commit_tag();
        assert_eq!(form.tags(), ["rust", "axum"]);
        form.remove_tag("rust");
        assert_eq!(form.tags(), ["axum"]);
    }

    #[test]
    fn test_submit_payload_carries_tags() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::Create, None);
        form.set_value("title", json!("Hello there"));
        form.set_value("status", json!("draft"));
        let SubmitOutcome::Ready(submission) = form.submit() else {
            panic!("expected ready");
        };
        assert_eq!(submission.values["tags"], json!([]));
        assert!(!submission.values.contains_key("image"));
    }

    #[test]
    fn test_forms_without_tags_field_send_no_tags() {
        let role_fields = vec![
            FieldDescriptor::new("name", "Name", FieldKind::Text).required(),
            FieldDescriptor::new("slug", "Slug", FieldKind::Text).required(),
        ];
        let mut form = FormState::new(role_fields, FormValidation::RequiredOnly);
        form.open(FormMode::Create, None);
        form.set_value("name", json!("Editor"));
        form.set_value("slug", json!("editor"));
        let SubmitOutcome::Ready(submission) = form.submit() else {
            panic!("expected ready");
        };
        assert!(!submission.values.contains_key("tags"));
        assert!(submission.files.is_empty());
    }

    #[test]
    fn test_picked_file_travels_with_bytes() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::Create, None);
        form.set_value("title", json!("Hello there"));
        form.set_value("status", json!("draft"));
        assert!(form.pick_file("image", PickedFile::new("a.png", "image/png", vec![1, 2, 3])));
        assert_eq!(form.value("image")["size"], json!(3));

        let SubmitOutcome::Ready(submission) = form.submit() else {
            panic!("expected ready");
        };
        assert!(!submission.values.contains_key("image"));
        assert_eq!(submission.files["image"].bytes, vec![1, 2, 3]);
        assert_eq!(submission.files["image"].content_type, "image/png");

        form.set_value("image", json!(""));
        assert!(form.picked_file("image").is_none());
    }

    #[test]
    fn test_edit_hydrates_tags_from_record() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(
            FormMode::Edit,
            Some(&record(json!({"title": "Existing", "status": "published", "tags": ["a", "b"]}))),
        );
        assert_eq!(form.tags(), ["a", "b"]);
        assert_eq!(form.mode().submit_label(), Some("Update"));
        assert_eq!(form.display("status"), "Published");
    }

    #[test]
    fn test_view_mode_is_read_only() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::View, Some(&record(json!({"title": "Fixed", "is_featured": true}))));
        assert!(!form.set_value("title", json!("Changed")));
        assert_eq!(form.value("title"), &json!("Fixed"));
        assert_eq!(form.submit(), SubmitOutcome::Ignored);
        assert_eq!(form.mode().submit_label(), None);
        assert_eq!(form.mode().dismiss_label(), "Close");
        assert_eq!(form.display("is_featured"), "Yes");
        assert_eq!(form.display("missing"), "-");
    }

    #[test]
    fn test_server_rejection_shows_errors() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::Create, None);
        let mut errors = FieldErrors::new();
        errors.insert("title".into(), "Title has already been taken".into());
        form.reject(errors);
        assert_eq!(form.error_for("title"), Some("Title has already been taken"));
    }

    #[test]
    fn test_rule_validation_is_used() {
        let role_fields = vec![
            FieldDescriptor::new("name", "Name", FieldKind::Text),
            FieldDescriptor::new("slug", "Slug", FieldKind::Text),
        ];
        let mut form = FormState::new(role_fields, FormValidation::rules(role_rules()));
        form.open(FormMode::Create, None);
        let SubmitOutcome::Invalid(errors) = form.submit() else {
            panic!("expected invalid");
        };
        assert_eq!(errors["name"], "Role name is required");
        assert_eq!(errors["permissions"], "At least one permission is required");
    }

    #[test]
    fn test_custom_validator_replaces_rules() {
        let validation = FormValidation::Custom(Arc::new(|values: &FormValues| {
            let mut errors = FieldErrors::new();
            if values.get("title") != Some(&json!("magic")) {
                errors.insert("title".into(), "Say the magic word".into());
            }
            ValidationResult::from_errors(errors)
        }));
        let mut form = FormState::new(fields(), validation);
        form.open(FormMode::Create, None);
        assert_eq!(form.validate().errors["title"], "Say the magic word");
        form.set_value("title", json!("magic"));
        assert!(form.validate().is_valid);
    }

    #[test]
    fn test_custom_field_render_and_update() {
        let custom = CustomField::new(
            |value, _| format!("{} stars", value_key(value)),
            |input, _| json!(input.as_i64().unwrap_or(0).clamp(0, 5)),
        );
        let mut form = FormState::new(
            vec![FieldDescriptor::new("rating", "Rating", FieldKind::Custom(custom))],
            FormValidation::RequiredOnly,
        );
        form.open(FormMode::Edit, Some(&record(json!({"rating": 3}))));
        form.set_value("rating", json!(9));
        assert_eq!(form.value("rating"), &json!(5));
        assert_eq!(form.display("rating"), "5 stars");
    }

    #[test]
    fn test_file_preview() {
        let mut form = FormState::new(fields(), FormValidation::RequiredOnly);
        form.open(FormMode::Edit, Some(&record(json!({"image": "blogs/a.png"}))));
        assert_eq!(
            form.file_preview("image"),
            Some(FilePreview::Current {
                url: "/storage/blogs/a.png".into()
            })
        );

        let picked = PickedFile::new("b.jpg", "image/jpeg", vec![0; 1024]);
        form.pick_file("image", picked.clone());
        assert_eq!(form.file_preview("image"), Some(FilePreview::Picked(picked)));
        assert_eq!(form.file_preview("title"), None);
    }

    #[test]
    fn test_storage_url() {
        assert_eq!(storage_url("https://cdn/x.png"), "https://cdn/x.png");
        assert_eq!(storage_url("/blogs/x.png"), "/storage/blogs/x.png");
    }
}
