//! # Quillboard Panel
//!
//! Screen logic for the admin panel, independent of any rendering layer.
//!
//! - [`validation`]: rule sets, first-failure-wins field validation
//! - [`rules`]: content predicates and the blog, role and permission rule sets
//! - [`form`]: field descriptors, form modes and transient form state
//! - [`cascade`]: dependent selection chains with static, mapped or remote options
//! - [`crud`]: list state, gated row actions, selection and the list controller
//! - [`permissions`]: module-grouped permission picker for the role form
//! - [`screens`]: blog, role and permission screen definitions
//! - [`reorder`]: reconciliation of drag-to-reorder requests
//! - [`api`]: HTTP client for the Quillboard API
//!
//! # Example
//!
//! ```ignore
//! use quillboard_panel::{ApiClient, CrudController, CrudTableConfig};
//!
//! let client = ApiClient::new("http://localhost:3000/api").with_token(token);
//! let mut blogs = CrudController::new(client.resource::<BlogResponse>("blogs"), CrudTableConfig::default());
//! blogs.search("launch").await?;
//! blogs.move_row(0, 3).await?;
//! ```

pub mod api;
pub mod cascade;
pub mod crud;
pub mod form;
pub mod permissions;
pub mod reorder;
pub mod rules;
pub mod screens;
pub mod validation;

pub use api::{ApiClient, ApiError, ResourceApi};
pub use cascade::{CascadeChange, CascadeLevel, CascadeResolver, OptionFetcher, OptionSource};
pub use crud::{
    Column, CrudBackend, CrudController, CrudError, CrudTableConfig, FilterConfig, FilterKind,
    ListState, ResourcePermissions, RowAction, Selection, ViewMode,
};
pub use form::{
    FieldDescriptor, FieldKind, FormMode, FormState, FormValidation, PickedFile, SelectOption,
    Submission, SubmitOutcome,
};
pub use permissions::PermissionSelector;
pub use reorder::{ReorderReconciler, ReorderStatus};
pub use validation::{Rule, ValidationResult, ValidationRule, Validator};
