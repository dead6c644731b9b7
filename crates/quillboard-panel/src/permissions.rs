//! Permission picker state for the role form.
//!
//! The catalog is grouped by module (unlabelled permissions land in
//! `General`). Selection can be toggled per permission, per module or for the
//! whole catalog. A module checkbox is checked when every permission in it is
//! selected and indeterminate when only some are.

use quillboard_models::roles::{PermissionModule, group_by_module};
use quillboard_models::{Permission, PermissionId};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct PermissionSelector {
    groups: Vec<PermissionModule>,
    selected: Vec<PermissionId>,
}

impl PermissionSelector {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self {
            groups: group_by_module(permissions),
            selected: Vec::new(),
        }
    }

    /// Replaces the selection with the ids in a form value: an array of ids,
    /// or of permission objects carrying an `id`.
    pub fn load(&mut self, value: &Value) {
        self.selected.clear();
        for id in ids_in(value) {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
    }

    pub fn groups(&self) -> &[PermissionModule] {
        &self.groups
    }

    pub fn modules(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.module.as_str()).collect()
    }

    pub fn selected(&self) -> &[PermissionId] {
        &self.selected
    }

    pub fn is_selected(&self, id: PermissionId) -> bool {
        self.selected.contains(&id)
    }

    pub fn toggle(&mut self, id: PermissionId, checked: bool) {
        if checked {
            if !self.is_selected(id) {
                self.selected.push(id);
            }
        } else {
            self.selected.retain(|s| *s != id);
        }
    }

    /// Adds or removes every permission in `module`. Returns false for an
    /// unknown module.
    pub fn select_module(&mut self, module: &str, checked: bool) -> bool {
        let Some(ids) = self.module_ids(module) else {
            return false;
        };
        if checked {
            for id in ids {
                if !self.selected.contains(&id) {
                    self.selected.push(id);
                }
            }
        } else {
            self.selected.retain(|s| !ids.contains(s));
        }
        true
    }

    pub fn select_all(&mut self, checked: bool) {
        self.selected = if checked { self.catalog_ids() } else { Vec::new() };
    }

    pub fn is_module_selected(&self, module: &str) -> bool {
        self.module_ids(module)
            .is_some_and(|ids| ids.iter().all(|id| self.is_selected(*id)))
    }

    pub fn is_module_partially_selected(&self, module: &str) -> bool {
        self.module_ids(module).is_some_and(|ids| {
            ids.iter().any(|id| self.is_selected(*id))
                && !ids.iter().all(|id| self.is_selected(*id))
        })
    }

    /// Every catalog permission is selected. An empty catalog never is.
    pub fn is_all_selected(&self) -> bool {
        let ids = self.catalog_ids();
        !ids.is_empty() && ids.iter().all(|id| self.is_selected(*id))
    }

    /// The selection as the form's `permissions` value.
    pub fn to_value(&self) -> Value {
        Value::Array(self.selected.iter().map(|id| Value::from(id.get())).collect())
    }

    /// Names of the selected permissions in catalog order.
    pub fn selected_names(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| &g.permissions)
            .filter(|p| self.is_selected(p.id))
            .map(|p| p.name.as_str())
            .collect()
    }

    fn module_ids(&self, module: &str) -> Option<Vec<PermissionId>> {
        self.groups
            .iter()
            .find(|g| g.module == module)
            .map(|g| g.permissions.iter().map(|p| p.id).collect())
    }

    fn catalog_ids(&self) -> Vec<PermissionId> {
        self.groups
            .iter()
            .flat_map(|g| g.permissions.iter().map(|p| p.id))
            .collect()
    }
}

fn ids_in(value: &Value) -> Vec<PermissionId> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(object) => object.get("id").and_then(Value::as_i64),
                    Value::String(s) => s.parse().ok(),
                    other => other.as_i64(),
                })
                .map(PermissionId)
                .collect()
        })
        .unwrap_or_default()
}
