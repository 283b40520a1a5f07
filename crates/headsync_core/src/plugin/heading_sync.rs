//! Keeps a note's filename in sync with its first level-1 heading.

use crate::host::Host;
use crate::ignore;
use crate::input::{AutocmdEvent, AutocmdEventType, PluginAction};
use crate::plugin::{Action, ActionType, Plugin, PluginError, PluginId, Toggle};
use headsync_config::HeadingSyncConfig;
use notename::{find_heading, find_note_start, sanitize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

const MARKDOWN_EXTENSION: &str = "md";

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension == MARKDOWN_EXTENSION)
        .unwrap_or(false)
}

#[derive(Debug)]
pub struct HeadingSync {
    host: Arc<dyn Host>,
    /// Advisory flag set while a rename request is in flight. Observers may
    /// read it; it does not reject concurrent triggers.
    renaming: Arc<AtomicBool>,
    /// Per-document locks serializing the read-sanitize-rename sequence, so
    /// two rapid triggers cannot race on the same note.
    doc_locks: HashMap<PathBuf, Arc<Mutex<()>>>,
    toggle: Toggle,
}

impl HeadingSync {
    pub const ID: PluginId = "headsync";

    pub const SYNC: &'static str = "headsync.sync";
    pub const IGNORE_FILE: &'static str = "headsync.ignoreFile";
    pub const TOGGLE: &'static str = "headsync.toggle";

    const ACTIONS: &'static [Action] = &[
        Action::callable(Self::SYNC),
        Action::callable(Self::IGNORE_FILE),
        Action::callable(Self::TOGGLE),
    ];

    const SUBSCRIPTIONS: &'static [AutocmdEventType] =
        &[AutocmdEventType::BufEnter, AutocmdEventType::BufWritePost];

    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            renaming: Arc::new(AtomicBool::new(false)),
            doc_locks: HashMap::new(),
            toggle: Toggle::On,
        }
    }

    /// Handle to the advisory rename-in-flight flag.
    pub fn renaming_flag(&self) -> Arc<AtomicBool> {
        self.renaming.clone()
    }

    fn doc_lock(&mut self, path: &Path) -> Arc<Mutex<()>> {
        self.doc_locks
            .entry(path.to_path_buf())
            .or_default()
            .clone()
    }

    /// The manual sync command: always targets the active document,
    /// regardless of the hook flags.
    async fn sync_active_document(&mut self) -> Result<(), PluginError> {
        let Some(path) = self.host.active_document().await? else {
            return Ok(());
        };

        if !is_markdown(&path) {
            return Ok(());
        }

        let config = headsync_config::config();
        self.sync_document(&path, &config.heading_sync).await
    }

    async fn sync_document(
        &mut self,
        path: &Path,
        settings: &HeadingSyncConfig,
    ) -> Result<(), PluginError> {
        if ignore::is_ignored(path, settings, |p| self.host.is_excluded(p)) {
            tracing::debug!(path = %path.display(), "Note is ignored, skipping sync");
            return Ok(());
        }

        let lock = self.doc_lock(path);
        let _guard = lock.lock().await;

        let text = self.host.document_text(path).await?;
        let lines: Vec<&str> = text.lines().collect();

        let Some(heading) = find_heading(&lines, find_note_start(&lines)) else {
            return Ok(());
        };

        let new_name = sanitize(heading.text, &settings.sanitize_options());
        if new_name.is_empty() {
            return Ok(());
        }

        let current_name = path.file_stem().and_then(|stem| stem.to_str());
        if current_name == Some(new_name.as_str()) {
            return Ok(());
        }

        let new_path = path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(format!("{new_name}.{MARKDOWN_EXTENSION}"));

        self.renaming.store(true, Ordering::SeqCst);
        let rename_result = self.host.rename_document(path, &new_path).await;
        self.renaming.store(false, Ordering::SeqCst);

        match rename_result {
            Ok(()) => {
                tracing::debug!(
                    old = %path.display(),
                    new = %new_path.display(),
                    "Renamed note to match its heading"
                );
                self.doc_locks.remove(path);
            }
            Err(err) => {
                tracing::error!(?err, path = %path.display(), "Failed to rename note");
                self.host
                    .notify(&format!("Failed to rename {}: {err}", path.display()));
            }
        }

        Ok(())
    }

    async fn ignore_active_document(&mut self) -> Result<(), PluginError> {
        let Some(path) = self.host.active_document().await? else {
            return Ok(());
        };

        let entry = path.to_string_lossy().into_owned();
        headsync_config::update_config(|config| {
            config.heading_sync.add_ignored_file(&entry);
        })?;

        self.host
            .notify(&format!("{} is now ignored", path.display()));

        Ok(())
    }
}

#[async_trait::async_trait]
impl Plugin for HeadingSync {
    fn id(&self) -> PluginId {
        Self::ID
    }

    fn actions(&self, _action_type: ActionType) -> &[Action] {
        Self::ACTIONS
    }

    fn subscriptions(&self) -> &[AutocmdEventType] {
        Self::SUBSCRIPTIONS
    }

    async fn handle_autocmd(&mut self, autocmd: AutocmdEvent) -> Result<(), PluginError> {
        use AutocmdEventType::{BufEnter, BufWritePost};

        if self.toggle.is_off() {
            return Ok(());
        }

        let (event_type, params) = autocmd;
        let path = params.parse_document_path()?;

        // One settings snapshot per trigger.
        let config = headsync_config::config();
        let settings = &config.heading_sync;

        let hook_enabled = match event_type {
            BufWritePost => settings.sync_on_save,
            BufEnter => settings.sync_on_open,
        };
        if !hook_enabled {
            return Ok(());
        }

        if !is_markdown(&path) {
            return Ok(());
        }

        // Events for any document other than the active one are dropped.
        if self.host.active_document().await?.as_deref() != Some(path.as_path()) {
            return Ok(());
        }

        self.sync_document(&path, settings).await
    }

    async fn handle_action(&mut self, action: PluginAction) -> Result<(), PluginError> {
        match action.method.as_str() {
            Self::SYNC => self.sync_active_document().await,
            Self::IGNORE_FILE => self.ignore_active_document().await,
            Self::TOGGLE => {
                self.toggle.switch();
                Ok(())
            }
            unknown => Err(PluginError::UnknownAction(unknown.to_string())),
        }
    }
}
