//! Plugin sessions and their event dispatch.

use crate::input::{AutocmdEvent, AutocmdEventType, PluginAction, PluginEvent};
use crate::plugin::{ActionType, Plugin, PluginId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

#[derive(Debug)]
pub struct PluginSession {
    plugin: Box<dyn Plugin>,
    plugin_events: UnboundedReceiver<PluginEvent>,
}

impl PluginSession {
    /// Creates a new [`PluginSession`] and starts its event processing.
    pub fn create(
        plugin: Box<dyn Plugin>,
        maybe_event_delay: Option<Duration>,
    ) -> UnboundedSender<PluginEvent> {
        let (plugin_event_sender, plugin_event_receiver) = unbounded_channel();

        let plugin_id = plugin.id();

        let plugin_session = PluginSession {
            plugin,
            plugin_events: plugin_event_receiver,
        };

        tokio::spawn(async move {
            if let Some(delay) = maybe_event_delay {
                tracing::debug!(debounce = ?delay, plugin_id, "Starting plugin with debounce");
                plugin_session.run_with_debounce(delay).await;
            } else {
                tracing::debug!(plugin_id, "Starting plugin without debounce");
                plugin_session.run_without_debounce().await;
            }
        });

        plugin_event_sender
    }

    async fn run_without_debounce(mut self) {
        while let Some(plugin_event) = self.plugin_events.recv().await {
            self.process_event(plugin_event).await;
        }
    }

    async fn run_with_debounce(mut self, event_delay: Duration) {
        // If the debounce timer isn't active, it will be set to expire "never",
        // which is actually just 1 year in the future.
        const NEVER: Duration = Duration::from_secs(365 * 24 * 60 * 60);

        let mut pending_plugin_event = None;
        let notification_timer = tokio::time::sleep(NEVER);
        tokio::pin!(notification_timer);

        loop {
            tokio::select! {
                maybe_plugin_event = self.plugin_events.recv() => {
                    match maybe_plugin_event {
                        Some(plugin_event) => {
                            if plugin_event.should_debounce() {
                                pending_plugin_event.replace(plugin_event);
                                notification_timer.as_mut().reset(Instant::now() + event_delay);
                            } else {
                                self.process_event(plugin_event).await;
                            }
                        }
                        None => break, // channel has closed.
                    }
                }
                _ = notification_timer.as_mut(), if pending_plugin_event.is_some() => {
                    notification_timer.as_mut().reset(Instant::now() + NEVER);

                    if let Some(autocmd) = pending_plugin_event.take() {
                        self.process_event(autocmd).await;
                    }
                }
            }
        }
    }

    async fn process_event(&mut self, plugin_event: PluginEvent) {
        let res = match plugin_event.clone() {
            PluginEvent::Action(action) => self.plugin.handle_action(action).await,
            PluginEvent::Autocmd(autocmd) => self.plugin.handle_autocmd(autocmd).await,
        };
        if let Err(err) = res {
            let id = self.plugin.id();
            tracing::error!(?err, "[{id}] Failed to process {plugin_event:?}");
        }
    }
}

/// Manages all the registered plugin sessions.
#[derive(Debug, Default)]
pub struct ServiceManager {
    pub plugins: HashMap<PluginId, (Vec<AutocmdEventType>, UnboundedSender<PluginEvent>)>,
}

impl ServiceManager {
    /// Creates a new plugin session with the default debounce setting (50ms).
    ///
    /// Returns the plugin id along with the methods of its actions.
    pub fn register_plugin(
        &mut self,
        plugin: Box<dyn Plugin>,
        maybe_debounce: Option<Duration>,
    ) -> (PluginId, Vec<String>) {
        let plugin_id = plugin.id();

        let all_actions = plugin
            .actions(ActionType::All)
            .iter()
            .map(|s| s.method.to_string())
            .collect();

        let debounce = Some(maybe_debounce.unwrap_or(Duration::from_millis(50)));

        let subscriptions = plugin.subscriptions().to_vec();
        let plugin_event_sender = PluginSession::create(plugin, debounce);

        self.plugins
            .insert(plugin_id, (subscriptions, plugin_event_sender));

        (plugin_id, all_actions)
    }

    #[allow(unused)]
    pub fn register_plugin_without_debounce(&mut self, plugin: Box<dyn Plugin>) {
        let plugin_id = plugin.id();
        let subscriptions = plugin.subscriptions().to_vec();
        let plugin_event_sender = PluginSession::create(plugin, None);
        self.plugins
            .insert(plugin_id, (subscriptions, plugin_event_sender));
    }

    /// Sends the autocmd event to every plugin subscribed to it, dropping
    /// the plugins whose session has exited.
    pub fn notify_plugins(&mut self, autocmd: AutocmdEvent) {
        self.plugins
            .retain(|_plugin_id, (subscriptions, plugin_sender)| {
                if subscriptions.contains(&autocmd.0) {
                    return plugin_sender
                        .send(PluginEvent::Autocmd(autocmd.clone()))
                        .is_ok();
                }
                true
            });
    }

    pub fn notify_plugin_action(&mut self, plugin_id: PluginId, plugin_action: PluginAction) {
        if let Entry::Occupied(v) = self.plugins.entry(plugin_id) {
            if v.get().1.send(PluginEvent::Action(plugin_action)).is_err() {
                tracing::error!("plugin {plugin_id} exited");
                v.remove_entry();
            }
        }
    }
}
