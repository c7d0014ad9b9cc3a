use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("empty launch action")]
    EmptyAction,
    #[error("failed to start '{command}': {message}")]
    Spawn { command: String, message: String },
    #[error("'{command}' exited unsuccessfully (code {code:?})")]
    Failed { command: String, code: Option<i32> },
    #[error("plugin launch failed: {0}")]
    Plugin(String),
}

/// Runs an app's opaque launch action to completion.
pub trait CommandRunner: Send + Sync {
    fn run(&self, action: &str) -> Result<(), LaunchError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ShellCommandRunner;

impl CommandRunner for ShellCommandRunner {
    fn run(&self, action: &str) -> Result<(), LaunchError> {
        run_action(action)
    }
}

pub fn run_action(action: &str) -> Result<(), LaunchError> {
    let trimmed = action.trim();
    if trimmed.is_empty() {
        return Err(LaunchError::EmptyAction);
    }

    let status = shell_command(trimmed)
        .status()
        .map_err(|error| LaunchError::Spawn {
            command: trimmed.to_string(),
            message: error.to_string(),
        })?;

    if !status.success() {
        return Err(LaunchError::Failed {
            command: trimmed.to_string(),
            code: status.code(),
        });
    }
    Ok(())
}

#[cfg(target_os = "windows")]
fn shell_command(action: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(action);
    command
}

#[cfg(not(target_os = "windows"))]
fn shell_command(action: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(action);
    command
}
