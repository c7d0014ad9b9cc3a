use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action_executor::{CommandRunner, LaunchError, ShellCommandRunner};
use crate::catalog::{SessionPatch, SessionState};
use crate::model::{Command, Feature, LaunchRequest, PluginItem};

/// Where the UI was when the user picked an option; forwarded to the plugin runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingContext {
    pub route: Option<String>,
}

impl RoutingContext {
    pub fn at(route: &str) -> Self {
        Self {
            route: Some(route.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PluginInvocation {
    pub cmd: Option<Command>,
    pub item: PluginItem,
    pub feature: Option<Feature>,
    pub routing: RoutingContext,
}

/// Host that opens plugin windows. Lives outside this crate.
pub trait PluginRuntime: Send + Sync {
    fn open_plugin(&self, invocation: PluginInvocation) -> Result<(), LaunchError>;
}

/// Runtime used when no plugin host is attached; logs and accepts the invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedPluginRuntime;

impl PluginRuntime for DetachedPluginRuntime {
    fn open_plugin(&self, invocation: PluginInvocation) -> Result<(), LaunchError> {
        tracing::info!(
            event = "plugin_open_without_runtime",
            plugin = invocation.item.name.as_str(),
            cmd = invocation.cmd.as_ref().map(Command::label).unwrap_or_default()
        );
        Ok(())
    }
}

/// Which launches clear the session afterwards. App launches always do; plugins
/// usually open their own window and keep the launcher state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostLaunchReset {
    #[default]
    AppOnly,
    Always,
}

#[derive(Clone)]
pub struct LaunchDispatcher {
    runner: Arc<dyn CommandRunner>,
    plugins: Arc<dyn PluginRuntime>,
    reset: PostLaunchReset,
}

impl Default for LaunchDispatcher {
    fn default() -> Self {
        Self::new(
            Arc::new(ShellCommandRunner),
            Arc::new(DetachedPluginRuntime),
            PostLaunchReset::default(),
        )
    }
}

impl LaunchDispatcher {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        plugins: Arc<dyn PluginRuntime>,
        reset: PostLaunchReset,
    ) -> Self {
        Self {
            runner,
            plugins,
            reset,
        }
    }

    pub fn with_reset(mut self, reset: PostLaunchReset) -> Self {
        self.reset = reset;
        self
    }

    pub fn reset_policy(&self) -> PostLaunchReset {
        self.reset
    }

    pub fn dispatch(
        &self,
        request: &LaunchRequest,
        routing: RoutingContext,
        session: &mut SessionState,
    ) -> Result<(), LaunchError> {
        match request {
            LaunchRequest::App { item } => {
                let result = self.runner.run(&item.action);
                if let Err(error) = &result {
                    tracing::warn!(
                        event = "app_launch_failed",
                        app = item.name.as_str(),
                        error = %error
                    );
                }
                // a failed launch must not leave the launcher window stuck open
                session.apply(SessionPatch::reset());
                result
            }
            LaunchRequest::Plugin { cmd, item, feature } => {
                let result = self.plugins.open_plugin(PluginInvocation {
                    cmd: cmd.clone(),
                    item: item.clone(),
                    feature: feature.clone(),
                    routing,
                });
                if self.reset == PostLaunchReset::Always {
                    session.apply(SessionPatch::reset());
                }
                result
            }
        }
    }
}
