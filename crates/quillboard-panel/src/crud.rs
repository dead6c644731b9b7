//! The list screen lifecycle shared by every resource.
//!
//! Search, filters, sorting and pagination live in [`ListState`]. Any change
//! sends the list back to page 1 except paging itself. Mutations go through
//! [`CrudController`], which waits for the backend and then refetches the
//! list with the current state. Selection is cleared only after a bulk
//! operation succeeds.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use quillboard_auth::{Actor, has_permission};
use quillboard_core::pagination::{Page, PageMeta};
use quillboard_core::permissions as slugs;
use quillboard_db::{OrderingError, SortDirection};
use quillboard_models::{BlogResponse, Permission, RoleWithPermissions};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::form::{SelectOption, Submission};
use crate::reorder::ReorderReconciler;

pub const TABLE_PER_PAGE: i64 = 10;
pub const GRID_PER_PAGE: i64 = 12;
pub const TABLE_PER_PAGE_OPTIONS: [i64; 5] = [5, 10, 25, 50, 100];
pub const GRID_PER_PAGE_OPTIONS: [i64; 5] = [12, 24, 36, 48, 60];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Table,
    Grid,
}

impl ViewMode {
    pub fn default_per_page(self) -> i64 {
        match self {
            Self::Table => TABLE_PER_PAGE,
            Self::Grid => GRID_PER_PAGE,
        }
    }

    pub fn per_page_options(self) -> &'static [i64] {
        match self {
            Self::Table => &TABLE_PER_PAGE_OPTIONS,
            Self::Grid => &GRID_PER_PAGE_OPTIONS,
        }
    }
}

/// Filter keys that count as "applied" for the reset affordance.
const APPLIED_FILTER_KEYS: [&str; 4] = ["status", "category_id", "date_from", "date_to"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    search: Option<String>,
    filters: BTreeMap<String, String>,
    sort: Option<(String, SortDirection)>,
    page: i64,
    per_page: i64,
    view: ViewMode,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(ViewMode::Table)
    }
}

impl ListState {
    pub fn new(view: ViewMode) -> Self {
        Self {
            search: None,
            filters: BTreeMap::new(),
            sort: None,
            page: 1,
            per_page: view.default_per_page(),
            view,
        }
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        self.sort.as_ref().map(|(column, dir)| (column.as_str(), *dir))
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn set_search(&mut self, search: &str) {
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self.page = 1;
    }

    /// Sets one filter. An empty value clears it.
    pub fn set_filter(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), value.to_string());
        }
        self.page = 1;
    }

    pub fn clear_filter(&mut self, key: &str) {
        self.set_filter(key, "");
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 1;
    }

    pub fn has_applied_filters(&self) -> bool {
        APPLIED_FILTER_KEYS.iter().any(|k| self.filters.contains_key(*k))
    }

    /// Clicking a header: ascending first, then toggles while on that column.
    pub fn toggle_sort(&mut self, column: &str) -> SortDirection {
        let direction = match &self.sort {
            Some((current, SortDirection::Asc)) if current == column => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        self.sort = Some((column.to_string(), direction));
        self.page = 1;
        direction
    }

    pub fn set_page(&mut self, page: i64) {
        self.page = page.max(1);
    }

    pub fn set_per_page(&mut self, per_page: i64) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
        self.per_page = view.default_per_page();
        self.page = 1;
    }

    /// Back to defaults for the current view.
    pub fn reset(&mut self) {
        *self = Self::new(self.view);
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.clone()));
        }
        if let Some((column, direction)) = &self.sort {
            pairs.push(("sort_by".to_string(), column.clone()));
            pairs.push(("sort_order".to_string(), direction.as_sql().to_ascii_lowercase()));
        }
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("per_page".to_string(), self.per_page.to_string()));
        pairs
    }

    /// Current filter state plus `format`, for the export collaborator.
    pub fn export_pairs(&self, format: &str) -> Vec<(String, String)> {
        let mut pairs = self.query_pairs();
        pairs.push(("format".to_string(), format.to_string()));
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrudTableConfig {
    pub search: bool,
    pub filters: bool,
    pub export: bool,
    pub bulk_actions: bool,
    pub view_toggle: bool,
    pub column_settings: bool,
    pub pagination: bool,
    pub sorting: bool,
    pub reorder: bool,
}

impl Default for CrudTableConfig {
    fn default() -> Self {
        Self {
            search: true,
            filters: true,
            export: true,
            bulk_actions: true,
            view_toggle: true,
            column_settings: true,
            pagination: true,
            sorting: true,
            reorder: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Select(Vec<SelectOption>),
    /// Writes `date_from` and `date_to`.
    DateRange,
    MultiSelect(Vec<SelectOption>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub key: String,
    pub label: String,
    pub kind: FilterKind,
}

impl FilterConfig {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
        }
    }

    /// Query keys this filter writes.
    pub fn keys(&self) -> Vec<&str> {
        match self.kind {
            FilterKind::DateRange => vec!["date_from", "date_to"],
            _ => vec![self.key.as_str()],
        }
    }

    pub fn is_applied(&self, state: &ListState) -> bool {
        self.keys().iter().any(|k| state.filter(k).is_some())
    }

    /// Clears this filter only.
    pub fn clear(&self, state: &mut ListState) {
        for key in self.keys() {
            state.clear_filter(key);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub sortable: bool,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// The columns a grid card draws, picked out of the declared columns.
/// Table view renders every declared column instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridCard<'a> {
    pub image: Option<&'a Column>,
    pub title: Option<&'a Column>,
    pub status: Option<&'a Column>,
    pub category: Option<&'a Column>,
    pub date: Option<&'a Column>,
}

pub fn grid_card(columns: &[Column]) -> GridCard<'_> {
    let find = |key: &str| columns.iter().find(|c| c.key == key);
    GridCard {
        image: find("image"),
        title: find("title"),
        status: find("status"),
        category: find("category"),
        date: find("created_at"),
    }
}

/// Permission slugs guarding each action on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePermissions {
    pub view: &'static str,
    pub create: &'static str,
    pub edit: &'static str,
    pub delete: &'static str,
}

impl ResourcePermissions {
    pub const BLOGS: Self = Self {
        view: slugs::BLOGS_VIEW,
        create: slugs::BLOGS_CREATE,
        edit: slugs::BLOGS_EDIT,
        delete: slugs::BLOGS_DELETE,
    };
    pub const ROLES: Self = Self {
        view: slugs::ROLES_VIEW,
        create: slugs::ROLES_CREATE,
        edit: slugs::ROLES_EDIT,
        delete: slugs::ROLES_DELETE,
    };
    pub const PERMISSIONS: Self = Self {
        view: slugs::PERMISSIONS_VIEW,
        create: slugs::PERMISSIONS_CREATE,
        edit: slugs::PERMISSIONS_EDIT,
        delete: slugs::PERMISSIONS_DELETE,
    };
    pub const USERS: Self = Self {
        view: slugs::USERS_VIEW,
        create: slugs::USERS_CREATE,
        edit: slugs::USERS_EDIT,
        delete: slugs::USERS_DELETE,
    };

    pub fn can_view(&self, actor: &Actor) -> bool {
        has_permission(actor, self.view)
    }

    pub fn can_create(&self, actor: &Actor) -> bool {
        has_permission(actor, self.create)
    }

    /// Reordering rewrites records, so it needs edit.
    pub fn can_reorder(&self, actor: &Actor) -> bool {
        has_permission(actor, self.edit)
    }

    pub fn can_bulk_delete(&self, actor: &Actor) -> bool {
        has_permission(actor, self.delete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    View,
    Edit,
    Delete,
    /// A caller-defined action, shown when `permission` is absent or held.
    Custom {
        name: String,
        permission: Option<String>,
    },
}

/// Actions the actor may take on a row, in display order.
pub fn row_actions(actor: &Actor, permissions: &ResourcePermissions, custom: &[RowAction]) -> Vec<RowAction> {
    let mut actions = Vec::new();
    if has_permission(actor, permissions.view) {
        actions.push(RowAction::View);
    }
    if has_permission(actor, permissions.edit) {
        actions.push(RowAction::Edit);
    }
    if has_permission(actor, permissions.delete) {
        actions.push(RowAction::Delete);
    }
    for action in custom {
        let allowed = match action {
            RowAction::Custom {
                permission: Some(slug),
                ..
            } => has_permission(actor, slug),
            _ => true,
        };
        if allowed {
            actions.push(action.clone());
        }
    }
    actions
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

impl Selection {
    pub fn set(&mut self, id: i64, checked: bool) {
        if checked {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    /// Header checkbox: select every row on the page, or nothing.
    pub fn set_all(&mut self, page_ids: &[i64], checked: bool) {
        self.ids.clear();
        if checked {
            self.ids.extend(page_ids);
        }
    }

    pub fn all_selected(&self, page_ids: &[i64]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.ids.contains(id))
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// A listed record with a numeric id.
pub trait Row {
    fn row_id(&self) -> i64;
}

impl Row for Value {
    fn row_id(&self) -> i64 {
        self.get("id").and_then(Value::as_i64).unwrap_or_default()
    }
}

impl Row for BlogResponse {
    fn row_id(&self) -> i64 {
        self.blog.id.get()
    }
}

impl Row for RoleWithPermissions {
    fn row_id(&self) -> i64 {
        self.role.id.get()
    }
}

impl Row for Permission {
    fn row_id(&self) -> i64 {
        self.id.get()
    }
}

/// Remote operations a list screen drives.
pub trait CrudBackend: Send + Sync {
    type Record: Row + Send;
    type Error: std::error::Error + Send + Sync + 'static;

    fn list(&self, query: &[(String, String)]) -> impl Future<Output = Result<Page<Self::Record>, Self::Error>> + Send;
    fn create(&self, submission: &Submission) -> impl Future<Output = Result<Self::Record, Self::Error>> + Send;
    fn update(&self, id: i64, submission: &Submission) -> impl Future<Output = Result<Self::Record, Self::Error>> + Send;
    fn delete(&self, id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send;
    fn bulk_delete(&self, ids: &[i64]) -> impl Future<Output = Result<u64, Self::Error>> + Send;
    fn reorder(&self, ordered_ids: &[i64]) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

#[derive(Debug, Error)]
pub enum CrudError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Backend(E),

    #[error(transparent)]
    Ordering(#[from] OrderingError),
}

pub struct CrudController<B: CrudBackend> {
    backend: B,
    list: ListState,
    selection: Selection,
    rows: Vec<B::Record>,
    meta: Option<PageMeta>,
    reorder: ReorderReconciler,
    config: CrudTableConfig,
}

impl<B: CrudBackend> CrudController<B> {
    pub fn new(backend: B, config: CrudTableConfig) -> Self {
        Self {
            backend,
            list: ListState::default(),
            selection: Selection::default(),
            rows: Vec::new(),
            meta: None,
            reorder: ReorderReconciler::new(Vec::new()),
            config,
        }
    }

    pub fn list_state(&self) -> &ListState {
        &self.list
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn meta(&self) -> Option<&PageMeta> {
        self.meta.as_ref()
    }

    pub fn config(&self) -> &CrudTableConfig {
        &self.config
    }

    pub fn reorder_state(&self) -> &ReorderReconciler {
        &self.reorder
    }

    pub fn page_ids(&self) -> Vec<i64> {
        self.rows.iter().map(Row::row_id).collect()
    }

    /// Rows in the order the client currently displays.
    pub fn rows(&self) -> Vec<&B::Record> {
        self.reorder
            .displayed()
            .iter()
            .filter_map(|id| self.rows.iter().find(|r| r.row_id() == *id))
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), CrudError<B::Error>> {
        let page = self
            .backend
            .list(&self.list.query_pairs())
            .await
            .map_err(CrudError::Backend)?;
        self.rows = page.data;
        self.meta = Some(page.meta);
        let ids = self.page_ids();
        self.reorder.sync(ids);
        debug!(rows = self.rows.len(), "List refreshed");
        Ok(())
    }

    pub async fn search(&mut self, search: &str) -> Result<(), CrudError<B::Error>> {
        self.list.set_search(search);
        self.refresh().await
    }

    pub async fn filter(&mut self, key: &str, value: &str) -> Result<(), CrudError<B::Error>> {
        self.list.set_filter(key, value);
        self.refresh().await
    }

    pub async fn sort(&mut self, column: &str) -> Result<(), CrudError<B::Error>> {
        self.list.toggle_sort(column);
        self.refresh().await
    }

    pub async fn go_to_page(&mut self, page: i64) -> Result<(), CrudError<B::Error>> {
        self.list.set_page(page);
        self.refresh().await
    }

    pub async fn set_per_page(&mut self, per_page: i64) -> Result<(), CrudError<B::Error>> {
        self.list.set_per_page(per_page);
        self.refresh().await
    }

    pub async fn set_view(&mut self, view: ViewMode) -> Result<(), CrudError<B::Error>> {
        self.list.set_view(view);
        self.refresh().await
    }

    /// Clears search, filters, sorting and selection.
    pub async fn reset(&mut self) -> Result<(), CrudError<B::Error>> {
        self.list.reset();
        self.selection.clear();
        self.refresh().await
    }

    pub async fn create(&mut self, submission: &Submission) -> Result<B::Record, CrudError<B::Error>> {
        let row = self.backend.create(submission).await.map_err(CrudError::Backend)?;
        self.refresh().await?;
        Ok(row)
    }

    pub async fn update(&mut self, id: i64, submission: &Submission) -> Result<B::Record, CrudError<B::Error>> {
        let row = self
            .backend
            .update(id, submission)
            .await
            .map_err(CrudError::Backend)?;
        self.refresh().await?;
        Ok(row)
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), CrudError<B::Error>> {
        self.backend.delete(id).await.map_err(CrudError::Backend)?;
        self.refresh().await
    }

    /// Deletes the selected rows. The selection survives a failure.
    pub async fn bulk_delete(&mut self) -> Result<u64, CrudError<B::Error>> {
        if self.selection.is_empty() {
            return Ok(0);
        }
        let deleted = self
            .backend
            .bulk_delete(&self.selection.ids())
            .await
            .map_err(CrudError::Backend)?;
        self.selection.clear();
        self.refresh().await?;
        Ok(deleted)
    }

    /// Moves a row locally, then persists the page order.
    pub async fn move_row(&mut self, from: usize, to: usize) -> Result<(), CrudError<B::Error>> {
        let request = self.reorder.begin_move(from, to)?;
        let outcome = self.backend.reorder(&request.ordered_ids).await;
        self.reorder.settle(request.ticket, &outcome);
        outcome.map_err(CrudError::Backend)?;
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillboard_auth::{ActorRole, PermissionGrant};
    use quillboard_core::pagination::PageParams;
    use serde_json::json;
    use std::fmt;
    use std::sync::Mutex;

    fn actor(slugs: &[&str]) -> Actor {
        Actor {
            id: 1,
            roles: vec![ActorRole {
                slug: "editor".into(),
                permissions: slugs
                    .iter()
                    .map(|s| PermissionGrant {
                        slug: s.to_string(),
                        is_active: true,
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn test_list_state_resets_page_on_change() {
        let mut state = ListState::default();
        state.set_page(3);
        state.set_search("launch");
        assert_eq!(state.page(), 1);

        state.set_page(2);
        state.set_filter("status", "published");
        assert_eq!(state.page(), 1);

        state.set_page(4);
        state.toggle_sort("title");
        assert_eq!(state.page(), 1);

        state.set_page(5);
        assert_eq!(state.page(), 5);
    }

    #[test]
    fn test_toggle_sort_direction() {
        let mut state = ListState::default();
        assert_eq!(state.toggle_sort("title"), SortDirection::Asc);
        assert_eq!(state.toggle_sort("title"), SortDirection::Desc);
        assert_eq!(state.toggle_sort("title"), SortDirection::Asc);
        assert_eq!(state.toggle_sort("status"), SortDirection::Asc);
    }

    #[test]
    fn test_query_pairs() {
        let mut state = ListState::default();
        state.set_search("  launch ");
        state.set_filter("status", "published");
        state.toggle_sort("title");
        let pairs = state.query_pairs();
        let get = |k: &str| pairs.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("search"), Some("launch"));
        assert_eq!(get("status"), Some("published"));
        assert_eq!(get("sort_by"), Some("title"));
        assert_eq!(get("sort_order"), Some("asc"));
        assert_eq!(get("page"), Some("1"));
        assert_eq!(get("per_page"), Some("10"));

        let export = state.export_pairs("csv");
        assert_eq!(export.last(), Some(&("format".to_string(), "csv".to_string())));
    }

    #[test]
    fn test_filters_clear_independently() {
        let mut state = ListState::default();
        state.set_filter("status", "draft");
        state.set_filter("category_id", "2");
        assert!(state.has_applied_filters());
        state.clear_filter("status");
        assert_eq!(state.filter("status"), None);
        assert_eq!(state.filter("category_id"), Some("2"));
        state.clear_filters();
        assert!(!state.has_applied_filters());
    }

    #[test]
    fn test_date_range_filter_clears_both_bounds() {
        let mut state = ListState::default();
        let range = FilterConfig::new("created", "Created", FilterKind::DateRange);
        let status = FilterConfig::new("status", "Status", FilterKind::Select(vec![]));
        state.set_filter("date_from", "2026-01-01");
        state.set_filter("date_to", "2026-01-31");
        state.set_filter("status", "draft");
        assert!(range.is_applied(&state));

        range.clear(&mut state);
        assert!(!range.is_applied(&state));
        assert!(status.is_applied(&state));
    }

    #[test]
    fn test_view_mode_changes_per_page() {
        let mut state = ListState::default();
        state.set_view(ViewMode::Grid);
        assert_eq!(state.per_page(), 12);
        assert_eq!(state.view().per_page_options(), &GRID_PER_PAGE_OPTIONS);
        state.set_search("x");
        state.reset();
        assert_eq!(state.search(), None);
        assert_eq!(state.per_page(), 12);
    }

    #[test]
    fn test_grid_card_picks_presentational_columns() {
        let columns = vec![
            Column::new("id", "ID"),
            Column::new("image", "Image"),
            Column::new("title", "Title").sortable(),
            Column::new("status", "Status"),
            Column::new("category", "Category"),
            Column::new("priority", "Priority"),
            Column::new("created_at", "Created"),
        ];
        let card = grid_card(&columns);
        assert_eq!(card.title.map(|c| c.label.as_str()), Some("Title"));
        assert_eq!(card.date.map(|c| c.key.as_str()), Some("created_at"));
        assert!(card.image.is_some());

        let card = grid_card(&columns[..3]);
        assert!(card.status.is_none());
    }

    #[test]
    fn test_row_actions_gated() {
        let viewer = actor(&[slugs::BLOGS_VIEW]);
        assert_eq!(
            row_actions(&viewer, &ResourcePermissions::BLOGS, &[]),
            vec![RowAction::View]
        );

        let editor = actor(&[slugs::BLOGS_VIEW, slugs::BLOGS_EDIT, slugs::BLOGS_DELETE]);
        let custom = vec![
            RowAction::Custom {
                name: "publish".into(),
                permission: Some(slugs::BLOGS_EDIT.into()),
            },
            RowAction::Custom {
                name: "audit".into(),
                permission: Some(slugs::ROLES_VIEW.into()),
            },
        ];
        let actions = row_actions(&editor, &ResourcePermissions::BLOGS, &custom);
        assert_eq!(actions.len(), 4);
        assert!(!actions.iter().any(|a| matches!(a, RowAction::Custom { name, .. } if name == "audit")));
        assert!(ResourcePermissions::BLOGS.can_reorder(&editor));
        assert!(!ResourcePermissions::BLOGS.can_create(&editor));

        let nobody = Actor { id: 2, roles: vec![] };
        assert!(row_actions(&nobody, &ResourcePermissions::ROLES, &[]).is_empty());
    }

    #[test]
    fn test_selection() {
        let mut selection = Selection::default();
        selection.set(1, true);
        selection.set(2, true);
        selection.set(1, false);
        assert_eq!(selection.ids(), vec![2]);
        selection.set_all(&[3, 4], true);
        assert!(selection.all_selected(&[3, 4]));
        assert!(!selection.contains(2));
        selection.set_all(&[3, 4], false);
        assert!(selection.is_empty());
        assert!(!selection.all_selected(&[]));
    }

    #[derive(Debug)]
    struct FakeError;

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("backend failed")
        }
    }

    impl std::error::Error for FakeError {}

    #[derive(Default)]
    struct FakeBackend {
        rows: Mutex<Vec<i64>>,
        queries: Mutex<Vec<Vec<(String, String)>>>,
        fail_mutations: bool,
    }

    impl FakeBackend {
        fn with_rows(ids: &[i64]) -> Self {
            Self {
                rows: Mutex::new(ids.to_vec()),
                ..Default::default()
            }
        }

        fn list_calls(&self) -> usize {
            self.queries.lock().unwrap().len()
        }

        fn check(&self) -> Result<(), FakeError> {
            if self.fail_mutations { Err(FakeError) } else { Ok(()) }
        }
    }

    impl CrudBackend for FakeBackend {
        type Record = Value;
        type Error = FakeError;

        async fn list(&self, query: &[(String, String)]) -> Result<Page<Value>, FakeError> {
            self.queries.lock().unwrap().push(query.to_vec());
            let rows: Vec<Value> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .map(|id| json!({"id": id}))
                .collect();
            let total = rows.len() as i64;
            Ok(Page::new(rows, PageMeta::new(&PageParams::default(), total)))
        }

        async fn create(&self, _submission: &Submission) -> Result<Value, FakeError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let id = rows.iter().max().copied().unwrap_or(0) + 1;
            rows.push(id);
            Ok(json!({"id": id}))
        }

        async fn update(&self, id: i64, _submission: &Submission) -> Result<Value, FakeError> {
            self.check()?;
            Ok(json!({"id": id}))
        }

        async fn delete(&self, id: i64) -> Result<(), FakeError> {
            self.check()?;
            self.rows.lock().unwrap().retain(|r| *r != id);
            Ok(())
        }

        async fn bulk_delete(&self, ids: &[i64]) -> Result<u64, FakeError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| !ids.contains(r));
            Ok((before - rows.len()) as u64)
        }

        async fn reorder(&self, ordered_ids: &[i64]) -> Result<(), FakeError> {
            self.check()?;
            *self.rows.lock().unwrap() = ordered_ids.to_vec();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mutation_refetches_with_state_preserved() {
        let mut controller =
            CrudController::new(FakeBackend::with_rows(&[1, 2, 3]), CrudTableConfig::default());
        controller.filter("status", "draft").await.unwrap();
        controller.go_to_page(2).await.unwrap();

        controller.delete(2).await.unwrap();

        assert_eq!(controller.page_ids(), vec![1, 3]);
        let queries = controller.backend.queries.lock().unwrap();
        let last = queries.last().unwrap();
        assert!(last.contains(&("status".to_string(), "draft".to_string())));
        assert!(last.contains(&("page".to_string(), "2".to_string())));
    }

    #[tokio::test]
    async fn test_bulk_delete_clears_selection_on_success() {
        let mut controller =
            CrudController::new(FakeBackend::with_rows(&[4, 7, 8]), CrudTableConfig::default());
        controller.refresh().await.unwrap();
        controller.selection_mut().set(4, true);
        controller.selection_mut().set(7, true);
        controller.selection_mut().set(99, true);

        let deleted = controller.bulk_delete().await.unwrap();
        assert_eq!(deleted, 2);
        assert!(controller.selection().is_empty());
        assert_eq!(controller.page_ids(), vec![8]);
    }

    #[tokio::test]
    async fn test_failed_bulk_delete_keeps_selection_and_skips_refetch() {
        let backend = FakeBackend {
            fail_mutations: true,
            ..FakeBackend::with_rows(&[1, 2])
        };
        let mut controller = CrudController::new(backend, CrudTableConfig::default());
        controller.refresh().await.unwrap();
        controller.selection_mut().set(1, true);

        assert!(controller.bulk_delete().await.is_err());
        assert_eq!(controller.selection().ids(), vec![1]);
        assert_eq!(controller.backend.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_bulk_delete_is_noop() {
        let mut controller = CrudController::new(FakeBackend::with_rows(&[1]), CrudTableConfig::default());
        assert_eq!(controller.bulk_delete().await.unwrap(), 0);
        assert_eq!(controller.backend.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_move_row_persists_and_refetches() {
        let mut controller =
            CrudController::new(FakeBackend::with_rows(&[1, 2, 3]), CrudTableConfig::default());
        controller.refresh().await.unwrap();

        controller.move_row(0, 2).await.unwrap();
        assert_eq!(controller.reorder_state().displayed(), [2, 3, 1]);
        let ids: Vec<i64> = controller.rows().iter().map(|r| r.row_id()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_failed_move_reverts() {
        let backend = FakeBackend {
            fail_mutations: true,
            ..FakeBackend::with_rows(&[1, 2, 3])
        };
        let mut controller = CrudController::new(backend, CrudTableConfig::default());
        controller.refresh().await.unwrap();

        assert!(matches!(controller.move_row(0, 2).await, Err(CrudError::Backend(_))));
        assert_eq!(controller.reorder_state().displayed(), [1, 2, 3]);
        assert!(matches!(
            controller.move_row(0, 9).await,
            Err(CrudError::Ordering(OrderingError::InvalidIndex { .. }))
        ));
    }

    #[tokio::test]
    async fn test_create_and_reset() {
        let mut controller = CrudController::new(FakeBackend::with_rows(&[1]), CrudTableConfig::default());
        controller.search("x").await.unwrap();
        let row = controller.create(&Submission::default()).await.unwrap();
        assert_eq!(row.row_id(), 2);
        assert_eq!(controller.page_ids(), vec![1, 2]);

        controller.selection_mut().set(1, true);
        controller.reset().await.unwrap();
        assert!(controller.selection().is_empty());
        assert_eq!(controller.list_state().search(), None);
    }
}
