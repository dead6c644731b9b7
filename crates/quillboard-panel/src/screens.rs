//! Screen definitions for the blog, role and permission resources.

use quillboard_models::{BlogStatus, Permission, Priority, RoleWithPermissions};
use serde_json::{Value, json};

use crate::cascade::{CascadeLevel, OptionSource};
use crate::crud::{Column, CrudTableConfig, FilterConfig, FilterKind};
use crate::form::{CustomField, FieldDescriptor, FieldKind, SelectOption};
use crate::permissions::PermissionSelector;
use crate::validation::FormValues;

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn status_options() -> Vec<SelectOption> {
    BlogStatus::ALL
        .iter()
        .map(|s| SelectOption::new(s.as_str(), title_case(s.as_str())))
        .collect()
}

pub fn priority_options() -> Vec<SelectOption> {
    Priority::ALL
        .iter()
        .map(|p| SelectOption::new(p.as_str(), title_case(p.as_str())))
        .collect()
}

pub fn blog_columns() -> Vec<Column> {
    vec![
        Column::new("image", "Image"),
        Column::new("title", "Title").sortable(),
        Column::new("status", "Status").sortable(),
        Column::new("category", "Category"),
        Column::new("tags", "Tags"),
        Column::new("user", "Author"),
        Column::new("created_at", "Created").sortable(),
    ]
}

pub fn blog_filters(categories: Vec<SelectOption>) -> Vec<FilterConfig> {
    vec![
        FilterConfig::new("status", "Status", FilterKind::Select(status_options())),
        FilterConfig::new("category_id", "Category", FilterKind::Select(categories)),
        FilterConfig::new("created", "Created", FilterKind::DateRange),
    ]
}

pub fn blog_table_config() -> CrudTableConfig {
    CrudTableConfig {
        reorder: true,
        ..CrudTableConfig::default()
    }
}

/// Country, state and city, with the lower two loaded from the API.
pub fn location_levels(countries: Vec<SelectOption>) -> Vec<CascadeLevel> {
    vec![
        CascadeLevel::new("country_id", "Country", OptionSource::Static(countries)),
        CascadeLevel::new(
            "state_id",
            "State",
            OptionSource::Remote("/countries/{country_id}/states".into()),
        ),
        CascadeLevel::new(
            "city_id",
            "City",
            OptionSource::Remote("/states/{state_id}/cities".into()),
        ),
    ]
}

pub fn education_levels(courses: Vec<SelectOption>) -> Vec<CascadeLevel> {
    vec![
        CascadeLevel::new("course_id", "Course", OptionSource::Static(courses)),
        CascadeLevel::new(
            "subject_id",
            "Subject",
            OptionSource::Remote("/courses/{course_id}/subjects".into()),
        ),
    ]
}

pub fn blog_fields(
    categories: Vec<SelectOption>,
    countries: Vec<SelectOption>,
    courses: Vec<SelectOption>,
    skills: Vec<SelectOption>,
) -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("title", "Title", FieldKind::Text)
            .required()
            .placeholder("Enter blog title")
            .column(2),
        FieldDescriptor::new("content", "Content", FieldKind::Textarea)
            .required()
            .placeholder("Enter blog content")
            .column(3),
        FieldDescriptor::new("category_id", "Category", FieldKind::Select(categories))
            .required()
            .placeholder("Select category"),
        FieldDescriptor::new("status", "Status", FieldKind::Select(status_options()))
            .required()
            .placeholder("Select status"),
        FieldDescriptor::new(
            "location",
            "Location",
            FieldKind::DependentDropdown(location_levels(countries)),
        )
        .column(3),
        FieldDescriptor::new(
            "education",
            "Education",
            FieldKind::DependentDropdown(education_levels(courses)),
        )
        .column(2),
        FieldDescriptor::new("priority", "Priority", FieldKind::Radio(priority_options()))
            .required()
            .column(2),
        FieldDescriptor::new("is_featured", "Featured Post", FieldKind::Checkbox),
        FieldDescriptor::new("skills", "Skills", FieldKind::MultiSelect(skills))
            .placeholder("Select skills")
            .column(2),
        FieldDescriptor::new("publish_date", "Publish Date", FieldKind::Date),
        FieldDescriptor::new("is_active", "Active Status", FieldKind::Switch),
        FieldDescriptor::new("tags", "Tags", FieldKind::Tags)
            .placeholder("Type and press Enter to add tags")
            .column(2),
        FieldDescriptor::new(
            "image",
            "Featured Image",
            FieldKind::File {
                accept: Some("image/*".into()),
            },
        ),
    ]
}

pub fn permission_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Permission Name").sortable(),
        Column::new("module", "Module").sortable(),
        Column::new("description", "Description"),
        Column::new("is_active", "Status"),
        Column::new("created_at", "Created").sortable(),
    ]
}

pub fn permission_filters(modules: &[String]) -> Vec<FilterConfig> {
    let mut options = vec![SelectOption::new("all", "All modules")];
    options.extend(modules.iter().map(|m| SelectOption::new(m.as_str(), m.as_str())));
    vec![FilterConfig::new("module", "Module", FilterKind::Select(options))]
}

pub fn permission_fields(modules: &[String]) -> Vec<FieldDescriptor> {
    let options = modules
        .iter()
        .map(|m| SelectOption::new(m.as_str(), m.as_str()))
        .collect();
    vec![
        FieldDescriptor::new("name", "Permission Name", FieldKind::Text).required(),
        FieldDescriptor::new("slug", "Permission Slug", FieldKind::Text).required(),
        FieldDescriptor::new("module", "Module", FieldKind::Select(options)).required(),
        FieldDescriptor::new("description", "Description", FieldKind::Textarea),
        FieldDescriptor::new("is_active", "Active Status", FieldKind::Switch),
    ]
}

pub fn role_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Role Name").sortable(),
        Column::new("description", "Description"),
        Column::new("permissions", "Permissions"),
        Column::new("is_active", "Status").sortable(),
        Column::new("created_at", "Created").sortable(),
    ]
}

pub fn role_filters() -> Vec<FilterConfig> {
    let options = vec![
        SelectOption::new("true", "Active"),
        SelectOption::new("false", "Inactive"),
    ];
    vec![FilterConfig::new("is_active", "Status", FilterKind::Select(options))]
}

/// Role form. The permissions field holds permission ids and renders the
/// selected names.
pub fn role_fields(permissions: Vec<Permission>) -> Vec<FieldDescriptor> {
    let selector = PermissionSelector::new(permissions);
    let render_selector = selector.clone();
    let picker = CustomField::new(
        move |value, _| {
            let mut selector = render_selector.clone();
            selector.load(value);
            let names = selector.selected_names();
            if names.is_empty() {
                "No permissions".to_string()
            } else {
                names.join(", ")
            }
        },
        move |input, _| {
            let mut selector = selector.clone();
            selector.load(&input);
            selector.to_value()
        },
    );

    vec![
        FieldDescriptor::new("name", "Role Name", FieldKind::Text)
            .required()
            .placeholder("Enter role name")
            .column(2),
        FieldDescriptor::new("slug", "Role Slug", FieldKind::Text)
            .required()
            .placeholder("Enter role slug"),
        FieldDescriptor::new("description", "Description", FieldKind::Textarea)
            .placeholder("Enter role description")
            .column(2),
        FieldDescriptor::new("is_active", "Active Status", FieldKind::Switch),
        FieldDescriptor::new("permissions", "Permissions", FieldKind::Custom(picker)).column(2),
    ]
}

/// Form values for editing a role, with permissions reduced to their ids.
pub fn role_record(role: &RoleWithPermissions) -> FormValues {
    let mut values = FormValues::new();
    values.insert("name".into(), json!(role.role.name));
    values.insert("slug".into(), json!(role.role.slug));
    values.insert(
        "description".into(),
        json!(role.role.description.as_deref().unwrap_or_default()),
    );
    values.insert("is_active".into(), json!(role.role.is_active));
    values.insert(
        "permissions".into(),
        Value::Array(role.permissions.iter().map(|p| json!(p.id.get())).collect()),
    );
    values
}
