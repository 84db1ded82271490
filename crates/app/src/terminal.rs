//! Terminal prompts and the terminal implementation of [`Platform`].

use std::{future::Future, io::Write, path::PathBuf};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::Platform;

use crate::error::{AppError, Result};

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads one line in raw mode. `Esc` cancels with `None`; masked input
/// echoes `*`.
fn read_line(prompt: &str, masked: bool) -> Result<Option<String>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Ok(Some(buf));
            }
            KeyCode::Esc => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Ok(None);
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err(AppError::Terminal("interrupted".to_string()));
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                if masked {
                    execute!(out, Print("*"))?;
                } else {
                    execute!(out, Print(ch))?;
                }
                out.flush()?;
            }
            _ => {}
        }
    }
}

fn print_notice(message: &str) -> Result<()> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

fn read_password(prompt: &str) -> Result<Option<String>> {
    Ok(read_line(prompt, true)?.filter(|p| !p.is_empty()))
}

fn read_new_password() -> Result<Option<String>> {
    for _ in 0..3 {
        let Some(first) = read_password("Password (empty for none): ")? else {
            return Ok(None);
        };
        let second = read_password("Confirm password: ")?.unwrap_or_default();
        if first == second {
            return Ok(Some(first));
        }
        print_notice("Passwords do not match. Try again.")?;
    }

    Err(AppError::Terminal("too many attempts".to_string()))
}

/// Runs a blocking terminal read on the blocking pool.
async fn off_runtime<T, F>(read: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .map_err(|err| AppError::Terminal(format!("prompt task failed: {err}")))?
}

/// Password of an existing database; `None` when left empty.
pub async fn prompt_password(prompt: &str) -> Result<Option<String>> {
    let prompt = prompt.to_string();
    off_runtime(move || read_password(&prompt)).await
}

/// Password for a new database, typed twice. Empty means no password.
pub async fn prompt_new_password() -> Result<Option<String>> {
    off_runtime(read_new_password).await
}

async fn ask_path(prompt: String, default: Option<PathBuf>) -> Option<PathBuf> {
    match off_runtime(move || read_line(&prompt, false)).await {
        Ok(Some(line)) => {
            let line = line.trim();
            if line.is_empty() {
                default
            } else {
                Some(PathBuf::from(line))
            }
        }
        Ok(None) => None,
        Err(err) => {
            tracing::warn!("path prompt failed: {err}");
            None
        }
    }
}

/// File pickers backed by line prompts on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPlatform;

impl Platform for TerminalPlatform {
    fn pick_file(
        &self,
        title: &str,
        extensions: &[&str],
    ) -> impl Future<Output = Option<PathBuf>> + Send {
        let prompt = format!("{title} (*.{}): ", extensions.join(", *."));
        ask_path(prompt, None)
    }

    fn save_file(
        &self,
        title: &str,
        default_name: &str,
        _extensions: &[&str],
    ) -> impl Future<Output = Option<PathBuf>> + Send {
        let default = self.local_data_path().join(default_name);
        let prompt = format!("{title} [{}]: ", default.display());
        ask_path(prompt, Some(default))
    }

    fn local_data_path(&self) -> PathBuf {
        engine::default_data_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_path_is_engine_default() {
        assert_eq!(
            TerminalPlatform.local_data_path(),
            engine::default_data_dir()
        );
        assert!(!TerminalPlatform.is_mobile());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blocking_reads_do_not_hold_the_runtime() {
        let value = off_runtime(|| {
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(7)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);

        let err = off_runtime::<(), _>(|| Err(AppError::Input("cancelled".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "cancelled");
    }
}
