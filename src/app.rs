//! Application state management for Scentdesk.
//!
//! This module contains the core `App` struct that manages all application
//! state: the session, the per-screen resource views, the login and edit
//! forms, and the status line.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::api::{
    ApiClient, ApiError, CollectionQuery, CreateRequest, DeleteRequest, QueryOptions,
    UpdateRequest,
};
use crate::auth::{gate, Session, TokenStore};
use crate::config::Config;
use crate::models::{
    Brand, BrandPatch, InventoryItem, InventoryPatch, NewBrand, NewPerfume, Perfume,
    PerfumePatch, Record, Size,
};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for email input.
/// Backend accounts are email addresses; 50 chars covers them.
const MAX_EMAIL_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a form field value.
/// Descriptions are the longest field the backend accepts.
const MAX_FIELD_LENGTH: usize = 200;

/// Number of items to scroll on page up/down.
/// 10 rows provides a good balance of speed without losing context.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Collection endpoints, relative to the configured base URL.
const BRANDS_ENDPOINT: &str = "/brands";
const PERFUMES_ENDPOINT: &str = "/perfumes";
const INVENTORY_ENDPOINT: &str = "/inventory";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Brands,
    Perfumes,
    Inventory,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Brands => "Brands",
            Tab::Perfumes => "Perfumes",
            Tab::Inventory => "Inventory",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Brands => Tab::Perfumes,
            Tab::Perfumes => Tab::Inventory,
            Tab::Inventory => Tab::Brands,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Brands => Tab::Inventory,
            Tab::Perfumes => Tab::Brands,
            Tab::Inventory => Tab::Perfumes,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    ShowingHelp,
    Editing,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Which record a submitted form writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    NewBrand,
    EditBrand(i64),
    NewPerfume,
    EditPerfume(i64),
    EditInventory(i64),
}

/// One editable line in the form overlay. A field either takes free text
/// or cycles through fixed `(label, id)` choices with Left/Right; the id
/// is the record id submitted for relational fields, zero when unused.
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub choices: Vec<(String, i64)>,
    pub choice: usize,
}

impl FormField {
    fn text(label: &'static str, value: &str, required: bool) -> Self {
        Self {
            label,
            value: value.to_string(),
            required,
            choices: Vec::new(),
            choice: 0,
        }
    }

    fn choice(label: &'static str, choices: Vec<(String, i64)>, choice: usize) -> Self {
        Self {
            label,
            value: String::new(),
            required: true,
            choices,
            choice,
        }
    }

    pub fn is_choice(&self) -> bool {
        !self.choices.is_empty()
    }

    /// The text shown and validated for this field.
    pub fn display(&self) -> &str {
        if self.is_choice() {
            self.choices
                .get(self.choice)
                .map(|(label, _)| label.as_str())
                .unwrap_or("")
        } else {
            &self.value
        }
    }

    fn chosen_id(&self) -> Option<i64> {
        self.choices.get(self.choice).map(|(_, id)| *id)
    }

    fn cycle_next(&mut self) {
        if !self.choices.is_empty() {
            self.choice = (self.choice + 1) % self.choices.len();
        }
    }

    fn cycle_prev(&mut self) {
        if !self.choices.is_empty() {
            self.choice = if self.choice == 0 {
                self.choices.len() - 1
            } else {
                self.choice - 1
            };
        }
    }
}

/// Create/edit overlay state. The target is fixed when the form opens;
/// submission reads the fields back into a typed payload. Field order is
/// fixed by the `open_*_form` constructors.
pub struct FormState {
    pub title: String,
    pub target: FormTarget,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl FormState {
    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = if self.focus == 0 {
                self.fields.len() - 1
            } else {
                self.focus - 1
            };
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if !field.is_choice() && can_add_field_char(field.value.len(), c) {
                field.value.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if !field.is_choice() {
                field.value.pop();
            }
        }
    }

    pub fn cycle_next(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.cycle_next();
        }
    }

    pub fn cycle_prev(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.cycle_prev();
        }
    }
}

/// A submitted form, resolved into the payload the server expects.
enum Submission {
    NewBrand(NewBrand),
    EditBrand(i64, BrandPatch),
    NewPerfume(NewPerfume),
    EditPerfume(i64, PerfumePatch),
    EditInventory(i64, InventoryPatch),
}

/// A delete the user has been asked to confirm. The tab is captured when
/// the dialog opens so the confirmation always hits the right screen.
pub struct PendingDelete {
    pub tab: Tab,
    pub id: i64,
    pub label: String,
}

// ============================================================================
// View-State Reconciler
// ============================================================================

/// One screen's server-backed row state.
///
/// `rows` mirrors the query's last successful read and is patched in place
/// on confirmed mutations: create appends, update replaces by id, delete
/// removes by id. Failures leave rows untouched.
pub struct ResourceView<T: Record> {
    endpoint: &'static str,
    pub query: CollectionQuery<T>,
    pub create: CreateRequest<T>,
    pub update: UpdateRequest<T>,
    pub delete: DeleteRequest,
    pub rows: Vec<T>,
    pub selected: usize,
}

impl<T> ResourceView<T>
where
    T: Record + Clone + DeserializeOwned + Send + 'static,
{
    pub fn new(api: &ApiClient, endpoint: &'static str) -> Self {
        Self {
            endpoint,
            query: CollectionQuery::new(api.clone(), endpoint, QueryOptions::default()),
            create: CreateRequest::new(api.clone(), endpoint),
            update: UpdateRequest::new(api.clone(), endpoint),
            delete: DeleteRequest::new(api.clone(), endpoint),
            rows: Vec::new(),
            selected: 0,
        }
    }

    pub fn refetch(&mut self, session: &Session) {
        self.query.refetch(session);
    }

    /// Drain query completions and mirror the newest read into `rows`.
    /// Returns true when anything was applied.
    pub fn poll(&mut self) -> bool {
        if !self.query.poll() {
            return false;
        }
        if let Some(ref data) = self.query.data {
            self.rows = data.clone();
            self.clamp_selection();
        }
        true
    }

    /// Append a server-confirmed record unless its id is already displayed.
    pub fn apply_created(&mut self, record: T) {
        if self.rows.iter().any(|r| r.id() == record.id()) {
            debug!(
                endpoint = self.endpoint,
                id = record.id(),
                "Created record already displayed"
            );
            return;
        }
        self.rows.push(record);
    }

    /// Replace the row carrying the confirmed record's id. A record the
    /// view has never seen is ignored.
    pub fn apply_updated(&mut self, record: T) {
        if let Some(existing) = self.rows.iter_mut().find(|r| r.id() == record.id()) {
            *existing = record;
        }
    }

    /// Remove the row with the given id.
    pub fn apply_deleted(&mut self, id: i64) {
        self.rows.retain(|r| r.id() != id);
        self.clamp_selection();
    }

    pub fn selected_row(&self) -> Option<&T> {
        self.rows.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn page_down(&mut self) {
        if !self.rows.is_empty() {
            self.selected = (self.selected + PAGE_SCROLL_SIZE).min(self.rows.len() - 1);
        }
    }

    pub fn page_up(&mut self) {
        self.selected = self.selected.saturating_sub(PAGE_SCROLL_SIZE);
    }

    fn clamp_selection(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,

    // Screens
    pub brands: ResourceView<Brand>,
    pub perfumes: ResourceView<Perfume>,
    pub inventory: ResourceView<InventoryItem>,

    /// Brand choices for the perfume form, fetched independently of the
    /// brands screen so the selector works even when that screen was never
    /// visited.
    pub brand_choices: CollectionQuery<Brand>,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Overlays
    pub form: Option<FormState>,
    pub pending_delete: Option<PendingDelete>,

    // Status line
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance. Fails when the token storage key
    /// is unconfigured or the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let state_dir = config
            .state_dir()
            .context("Failed to resolve the state directory")?;
        let store = Arc::new(
            TokenStore::new(state_dir, &config.token_key())
                .context("Token store is unusable")?,
        );
        let session =
            Session::new(Arc::clone(&store)).context("Failed to restore the session")?;
        let api = ApiClient::new(config.api_url(), store)?;

        Ok(Self::with_services(config, session, api))
    }

    /// Wire the app from already-built services.
    fn with_services(config: Config, session: Session, api: ApiClient) -> Self {
        // Prefill the login form from env vars or the config file
        let login_email = std::env::var("SCENTDESK_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let login_password = std::env::var("SCENTDESK_PASSWORD").unwrap_or_default();

        let brands = ResourceView::new(&api, BRANDS_ENDPOINT);
        let perfumes = ResourceView::new(&api, PERFUMES_ENDPOINT);
        let inventory = ResourceView::new(&api, INVENTORY_ENDPOINT);
        let brand_choices =
            CollectionQuery::new(api.clone(), BRANDS_ENDPOINT, QueryOptions::default());

        Self {
            config,
            session,
            api,

            state: AppState::Normal,
            current_tab: Tab::Brands,

            brands,
            perfumes,
            inventory,
            brand_choices,

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            form: None,
            pending_delete: None,

            status_message: None,
        }
    }

    // =========================================================================
    // Authentication & Navigation
    // =========================================================================

    /// Run the startup navigation: lands on the first tab when the stored
    /// session is live, otherwise on the login form.
    pub fn enter(&mut self) {
        self.navigate(self.current_tab);
    }

    /// Switch to a tab. Every navigation re-runs the session gate; a stale
    /// or missing token drops straight to the login form.
    pub fn navigate(&mut self, tab: Tab) {
        self.current_tab = tab;
        if !gate::admit(&self.session) {
            debug!(tab = tab.title(), "Navigation blocked, session not live");
            self.start_login();
            return;
        }
        self.enter_tab();
    }

    pub fn next_tab(&mut self) {
        self.navigate(self.current_tab.next());
    }

    pub fn prev_tab(&mut self) {
        self.navigate(self.current_tab.prev());
    }

    /// First entry into a tab kicks off its initial read; later entries
    /// keep whatever the screen already shows.
    fn enter_tab(&mut self) {
        match self.current_tab {
            Tab::Brands => {
                if !self.brands.query.started() {
                    self.brands.refetch(&self.session);
                }
            }
            Tab::Perfumes => {
                if !self.perfumes.query.started() {
                    self.perfumes.refetch(&self.session);
                }
                if !self.brand_choices.started() {
                    self.brand_choices.refetch(&self.session);
                }
            }
            Tab::Inventory => {
                if !self.inventory.query.started() {
                    self.inventory.refetch(&self.session);
                }
            }
        }
    }

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        let login_result = self.api.login(&email, &password).await;
        match login_result {
            Ok(grant) => {
                let expires_at = grant.expires_at();
                self.session
                    .login(&grant.access_token, expires_at)
                    .context("Failed to persist the session token")?;

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                self.refetch_current();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let user_message = match &e {
                    ApiError::Http { status: 401, .. } => {
                        "Invalid email or password".to_string()
                    }
                    ApiError::Network(_) => {
                        "Unable to connect to server. Check your connection.".to_string()
                    }
                    _ => format!("Login failed: {}", e),
                };
                self.login_error = Some(user_message);
                Err(e.into())
            }
        }
    }

    /// Interactive login (used for the --login console flow)
    pub async fn login_interactive(&mut self) -> Result<()> {
        println!("\n=== Scentdesk Login ===\n");

        let email = match self.config.last_email.clone() {
            Some(last) => {
                print!("Email [{}]: ", last);
                io::stdout().flush()?;

                let mut input = String::new();
                io::stdin().read_line(&mut input)?;
                let input = input.trim();

                if input.is_empty() {
                    last
                } else {
                    input.to_string()
                }
            }
            None => Self::prompt_email()?,
        };

        let password = rpassword::prompt_password("Password: ")?;

        println!("\nAuthenticating...");

        let grant = self.api.login(&email, &password).await?;
        let expires_at = grant.expires_at();
        self.session.login(&grant.access_token, expires_at)?;

        self.config.last_email = Some(email);
        self.config.save()?;

        println!("Login successful!\n");
        Ok(())
    }

    fn prompt_email() -> Result<String> {
        print!("Email: ");
        io::stdout().flush()?;

        let mut email = String::new();
        io::stdin().read_line(&mut email)?;
        Ok(email.trim().to_string())
    }

    /// Clear the session and drop back to the login form. Local only; the
    /// server keeps the token until it expires on its own.
    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "Failed to clear stored token");
        }
        // Tear the screens down like a route change: dropped queries
        // discard their in-flight completions.
        self.brands = ResourceView::new(&self.api, BRANDS_ENDPOINT);
        self.perfumes = ResourceView::new(&self.api, PERFUMES_ENDPOINT);
        self.inventory = ResourceView::new(&self.api, INVENTORY_ENDPOINT);
        self.brand_choices =
            CollectionQuery::new(self.api.clone(), BRANDS_ENDPOINT, QueryOptions::default());
        self.status_message = Some("Logged out".to_string());
        info!("Logged out");
        self.start_login();
    }

    // =========================================================================
    // Data Refresh
    // =========================================================================

    /// Force a fresh read of the current tab. On the perfumes screen the
    /// brand selector source refreshes too.
    pub fn refetch_current(&mut self) {
        match self.current_tab {
            Tab::Brands => self.brands.refetch(&self.session),
            Tab::Perfumes => {
                self.perfumes.refetch(&self.session);
                self.brand_choices.refetch(&self.session);
            }
            Tab::Inventory => self.inventory.refetch(&self.session),
        }
        self.status_message = Some(format!("Refreshing {}...", self.current_tab.title()));
    }

    /// Drain completed request tasks into view state. Returns true when
    /// anything changed and the screen should repaint.
    pub fn poll_tasks(&mut self) -> bool {
        let mut changed = false;
        changed |= self.brands.poll();
        changed |= self.perfumes.poll();
        changed |= self.inventory.poll();
        changed |= self.brand_choices.poll();

        if changed {
            // Progress messages are done once a read settles; everything
            // else stays until the next action replaces it
            if let Some(ref msg) = self.status_message {
                if msg.starts_with("Refreshing") {
                    self.status_message = None;
                }
            }
        }
        changed
    }

    // =========================================================================
    // Delete Flow
    // =========================================================================

    /// Ask for confirmation before deleting the selected row.
    pub fn request_delete(&mut self) {
        let pending = match self.current_tab {
            Tab::Brands => self.brands.selected_row().map(|b| PendingDelete {
                tab: Tab::Brands,
                id: b.id,
                label: b.name.clone(),
            }),
            Tab::Perfumes => self.perfumes.selected_row().map(|p| PendingDelete {
                tab: Tab::Perfumes,
                id: p.id,
                label: p.name.clone(),
            }),
            Tab::Inventory => self.inventory.selected_row().map(|item| PendingDelete {
                tab: Tab::Inventory,
                id: item.id,
                label: format!("{} {}", item.perfume_name(), item.size),
            }),
        };

        if let Some(pending) = pending {
            self.pending_delete = Some(pending);
            self.state = AppState::ConfirmingDelete;
        }
    }

    /// Run the confirmed delete. A 400 means the server refused because
    /// other records still reference this one.
    pub async fn confirm_delete(&mut self) {
        let pending = match self.pending_delete.take() {
            Some(p) => p,
            None => {
                self.state = AppState::Normal;
                return;
            }
        };
        self.state = AppState::Normal;

        let result = match pending.tab {
            Tab::Brands => self.brands.delete.delete(pending.id).await,
            Tab::Perfumes => self.perfumes.delete.delete(pending.id).await,
            Tab::Inventory => self.inventory.delete.delete(pending.id).await,
        };

        match result {
            Ok(_) => {
                match pending.tab {
                    Tab::Brands => self.brands.apply_deleted(pending.id),
                    Tab::Perfumes => self.perfumes.apply_deleted(pending.id),
                    Tab::Inventory => self.inventory.apply_deleted(pending.id),
                }
                info!(id = pending.id, "Record deleted");
                self.status_message = Some(format!("Deleted {}", pending.label));
            }
            Err(e) => {
                let reason = if e.status() == Some(400) {
                    format!("Cannot delete {}: other records depend on it", pending.label)
                } else {
                    format!("Delete failed: {}", e)
                };
                self.status_message = Some(reason);
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Create / Edit Forms
    // =========================================================================

    /// Open the create form for the current tab. Inventory rows come from
    /// the stock pipeline, so only brands and perfumes are created here.
    pub fn open_create_form(&mut self) {
        let form = match self.current_tab {
            Tab::Brands => FormState {
                title: "New Brand".to_string(),
                target: FormTarget::NewBrand,
                fields: vec![
                    FormField::text("Name", "", true),
                    FormField::text("Logo URL", "", false),
                ],
                focus: 0,
                error: None,
            },
            Tab::Perfumes => {
                let choices = self.brand_choice_list();
                if choices.is_empty() {
                    self.status_message = Some("Brand list not loaded yet".to_string());
                    return;
                }
                FormState {
                    title: "New Perfume".to_string(),
                    target: FormTarget::NewPerfume,
                    fields: vec![
                        FormField::text("Name", "", true),
                        FormField::choice("Brand", choices, 0),
                        FormField::text("Description", "", true),
                        FormField::text("Image URL", "", false),
                    ],
                    focus: 0,
                    error: None,
                }
            }
            Tab::Inventory => {
                self.status_message = Some("Inventory cannot be created here".to_string());
                return;
            }
        };
        self.form = Some(form);
        self.state = AppState::Editing;
    }

    /// Open the edit form prefilled from the selected row.
    pub fn open_edit_form(&mut self) {
        let form = match self.current_tab {
            Tab::Brands => self.brands.selected_row().map(|b| FormState {
                title: format!("Edit {}", b.name),
                target: FormTarget::EditBrand(b.id),
                fields: vec![
                    FormField::text("Name", &b.name, true),
                    FormField::text("Logo URL", b.logo.as_deref().unwrap_or(""), false),
                ],
                focus: 0,
                error: None,
            }),
            Tab::Perfumes => {
                let mut choices = self.brand_choice_list();
                self.perfumes.selected_row().map(|p| {
                    let selected = match choices.iter().position(|(_, id)| *id == p.brand.id) {
                        Some(pos) => pos,
                        None => {
                            choices.insert(0, (p.brand.name.clone(), p.brand.id));
                            0
                        }
                    };
                    FormState {
                        title: format!("Edit {}", p.name),
                        target: FormTarget::EditPerfume(p.id),
                        fields: vec![
                            FormField::text("Name", &p.name, true),
                            FormField::choice("Brand", choices, selected),
                            FormField::text("Description", &p.description, true),
                            FormField::text("Image URL", p.logo.as_deref().unwrap_or(""), false),
                        ],
                        focus: 0,
                        error: None,
                    }
                })
            }
            Tab::Inventory => self.inventory.selected_row().map(|item| {
                let selected = Size::ALL
                    .iter()
                    .position(|s| *s == item.size)
                    .unwrap_or(0);
                FormState {
                    title: format!("Edit {} {}", item.perfume_name(), item.size),
                    target: FormTarget::EditInventory(item.id),
                    fields: vec![
                        FormField::text("Price", &format!("{}", item.price), true),
                        FormField::text("Stock", &format!("{}", item.stock), true),
                        FormField::choice("Size (ml)", size_choice_list(), selected),
                    ],
                    focus: 0,
                    error: None,
                }
            }),
        };

        if let Some(form) = form {
            self.form = Some(form);
            self.state = AppState::Editing;
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Validate and submit the open form, reconciling rows on success.
    /// Validation and server failures keep the form open with an inline
    /// error.
    pub async fn submit_form(&mut self) {
        let built = match self.form.as_ref() {
            Some(form) => Self::build_submission(form),
            None => return,
        };
        let submission = match built {
            Ok(s) => s,
            Err(message) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(message);
                }
                return;
            }
        };

        let outcome = match submission {
            Submission::NewBrand(payload) => {
                let result = self.brands.create.create(&payload).await;
                match result {
                    Ok(record) => {
                        self.brands.apply_created(record);
                        Ok("Brand created")
                    }
                    Err(e) => Err(e),
                }
            }
            Submission::EditBrand(id, patch) => {
                let result = self.brands.update.update(id, &patch).await;
                match result {
                    Ok(record) => {
                        self.brands.apply_updated(record);
                        Ok("Brand updated")
                    }
                    Err(e) => Err(e),
                }
            }
            Submission::NewPerfume(payload) => {
                let result = self.perfumes.create.create(&payload).await;
                match result {
                    Ok(record) => {
                        self.perfumes.apply_created(record);
                        Ok("Perfume created")
                    }
                    Err(e) => Err(e),
                }
            }
            Submission::EditPerfume(id, patch) => {
                let result = self.perfumes.update.update(id, &patch).await;
                match result {
                    Ok(record) => {
                        self.perfumes.apply_updated(record);
                        Ok("Perfume updated")
                    }
                    Err(e) => Err(e),
                }
            }
            Submission::EditInventory(id, patch) => {
                let result = self.inventory.update.update(id, &patch).await;
                match result {
                    Ok(record) => {
                        self.inventory.apply_updated(record);
                        Ok("Inventory updated")
                    }
                    Err(e) => Err(e),
                }
            }
        };

        match outcome {
            Ok(message) => {
                self.form = None;
                self.state = AppState::Normal;
                self.status_message = Some(message.to_string());
            }
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(e.to_string());
                }
            }
        }
    }

    /// Read the form fields back into a typed payload. The error is the
    /// message shown inline on validation failure.
    fn build_submission(form: &FormState) -> Result<Submission, String> {
        let missing = form
            .fields
            .iter()
            .find(|f| f.required && f.display().trim().is_empty())
            .map(|f| f.label);
        if let Some(label) = missing {
            return Err(format!("{} is required", label));
        }

        match form.target {
            FormTarget::NewBrand => Ok(Submission::NewBrand(NewBrand {
                name: form.fields[0].value.trim().to_string(),
                logo: optional_value(&form.fields[1].value),
            })),
            FormTarget::EditBrand(id) => Ok(Submission::EditBrand(
                id,
                BrandPatch {
                    name: Some(form.fields[0].value.trim().to_string()),
                    logo: optional_value(&form.fields[1].value),
                },
            )),
            FormTarget::NewPerfume => {
                let brand_id = match form.fields[1].chosen_id() {
                    Some(id) => id,
                    None => return Err("Pick a brand".to_string()),
                };
                Ok(Submission::NewPerfume(NewPerfume {
                    name: form.fields[0].value.trim().to_string(),
                    description: form.fields[2].value.trim().to_string(),
                    brand_id,
                    image_url: optional_value(&form.fields[3].value),
                }))
            }
            FormTarget::EditPerfume(id) => {
                let brand_id = match form.fields[1].chosen_id() {
                    Some(id) => id,
                    None => return Err("Pick a brand".to_string()),
                };
                Ok(Submission::EditPerfume(
                    id,
                    PerfumePatch {
                        name: Some(form.fields[0].value.trim().to_string()),
                        description: Some(form.fields[2].value.trim().to_string()),
                        brand_id: Some(brand_id),
                        image_url: optional_value(&form.fields[3].value),
                    },
                ))
            }
            FormTarget::EditInventory(id) => {
                let price: f64 = form.fields[0]
                    .value
                    .trim()
                    .parse()
                    .map_err(|_| "Price must be a number".to_string())?;
                if price < 0.0 {
                    return Err("Price cannot be negative".to_string());
                }
                let stock: i64 = form.fields[1]
                    .value
                    .trim()
                    .parse()
                    .map_err(|_| "Stock must be a whole number".to_string())?;
                if stock < 0 {
                    return Err("Stock cannot be negative".to_string());
                }
                let size = match Size::parse(form.fields[2].display()) {
                    Some(s) => s,
                    None => return Err("Pick a size".to_string()),
                };
                Ok(Submission::EditInventory(
                    id,
                    InventoryPatch {
                        price: Some(price),
                        stock: Some(stock),
                        size: Some(size),
                    },
                ))
            }
        }
    }

    fn brand_choice_list(&self) -> Vec<(String, i64)> {
        self.brand_choices
            .data
            .as_ref()
            .map(|brands| brands.iter().map(|b| (b.name.clone(), b.id)).collect())
            .unwrap_or_default()
    }
}

fn size_choice_list() -> Vec<(String, i64)> {
    Size::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect()
}

/// Empty or whitespace-only optional fields submit as absent.
fn optional_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a form field character should be accepted
pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
