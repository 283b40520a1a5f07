mod heading_sync;

pub use self::heading_sync::HeadingSync;

use crate::host::HostError;
use crate::input::{AutocmdEvent, AutocmdEventType, InputError, PluginAction};
use std::fmt::Debug;

pub type PluginId = &'static str;

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Config(#[from] headsync_config::ConfigError),
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

#[derive(Debug, Clone, Copy)]
pub enum ActionType {
    /// Actions that users can interact with.
    Callable,
    /// Internal actions.
    Internal,
    /// All actions.
    All,
}

#[derive(Debug, Clone)]
pub struct Action {
    /// Type of this action.
    pub ty: ActionType,
    /// Method used in the host request for this action.
    pub method: &'static str,
}

impl Action {
    /// Constructs a callable action with specified method.
    pub const fn callable(method: &'static str) -> Self {
        Self {
            ty: ActionType::Callable,
            method,
        }
    }

    /// Constructs an internal action with specified method.
    pub const fn internal(method: &'static str) -> Self {
        Self {
            ty: ActionType::Internal,
            method,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Toggle {
    /// Plugin is enabled.
    On,
    /// Plugin is disabled.
    Off,
}

impl Toggle {
    pub fn switch(&mut self) {
        match self {
            Self::On => {
                *self = Self::Off;
            }
            Self::Off => {
                *self = Self::On;
            }
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

/// A trait each plugin must implement.
#[async_trait::async_trait]
pub trait Plugin: Debug + Send + Sync + 'static {
    fn id(&self) -> PluginId;

    fn actions(&self, _action_type: ActionType) -> &[Action] {
        &[]
    }

    /// Autocmd events this plugin wants delivered.
    fn subscriptions(&self) -> &[AutocmdEventType] {
        &[]
    }

    async fn handle_action(&mut self, action: PluginAction) -> Result<(), PluginError>;
    async fn handle_autocmd(&mut self, autocmd: AutocmdEvent) -> Result<(), PluginError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_switches_both_ways() {
        let mut toggle = Toggle::On;
        assert!(!toggle.is_off());
        toggle.switch();
        assert!(toggle.is_off());
        toggle.switch();
        assert!(!toggle.is_off());
    }
}
