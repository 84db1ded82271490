//! Host capabilities the database service needs but does not implement.

use std::{future::Future, path::PathBuf};

const APP_DIR: &str = "KakeboApp";

/// File pickers and the per-user data directory of the host.
///
/// Pickers resolve to `None` when the user cancels.
pub trait Platform: Send + Sync {
    fn pick_file(
        &self,
        title: &str,
        extensions: &[&str],
    ) -> impl Future<Output = Option<PathBuf>> + Send;

    fn save_file(
        &self,
        title: &str,
        default_name: &str,
        extensions: &[&str],
    ) -> impl Future<Output = Option<PathBuf>> + Send;

    fn local_data_path(&self) -> PathBuf;

    fn is_mobile(&self) -> bool {
        false
    }
}

/// `<user data dir>/KakeboApp`, falling back to the working directory when
/// the host has no data directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_ends_with_app_name() {
        assert!(default_data_dir().ends_with(APP_DIR));
    }
}
