use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::process::Command;

use crate::config::{FetchBackend, Settings};
use crate::process::run;
use crate::report::terminal::Reporter;

/// Make sure the scanner jar exists locally, downloading it when missing.
///
/// Returns `true` when a download happened. Any download failure is an error;
/// there is no retry.
pub async fn ensure_tool(settings: &Settings, reporter: &Reporter) -> Result<bool> {
    let dest = &settings.tool_path;
    if dest.exists() {
        return Ok(false);
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    reporter.info(format!("Fetching {} ...", dest.display()));

    match settings.fetch_backend {
        FetchBackend::Curl => download_with_curl(&settings.curl, &settings.tool_url, dest).await,
        FetchBackend::Builtin => download_builtin(&settings.tool_url, dest).await,
    }?;

    Ok(true)
}

async fn download_with_curl(curl: &str, url: &str, dest: &Path) -> Result<()> {
    let out = run(Command::new(curl)
        .arg("-L")
        .arg("--fail")
        .arg("--silent")
        .arg("--show-error")
        .arg("-o")
        .arg(dest)
        .arg(url))
    .await;

    if !out.status.success() {
        // curl may leave a partial file, which would be mistaken for the tool next run
        let _ = tokio::fs::remove_file(dest).await;
        let detail = out.stderr.trim();
        if detail.is_empty() {
            bail!("Failed to download {} ({})", url, out.status);
        }
        bail!("Failed to download {} ({}): {}", url, out.status, detail);
    }

    Ok(())
}

async fn download_builtin(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("license-gate/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        bail!("Failed to download {} (HTTP {})", url, response.status());
    }

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    commit_download(&bytes, dest).await
}

/// Write to `<dest>.part` and rename into place; the partial file never outlives a failure.
async fn commit_download(bytes: &[u8], dest: &Path) -> Result<()> {
    let partial = partial_path(dest);
    let written = tokio::fs::write(&partial, bytes)
        .await
        .with_context(|| format!("Failed to write {}", partial.display()));
    let moved = match written {
        Ok(()) => tokio::fs::rename(&partial, dest)
            .await
            .with_context(|| format!("Failed to move download into {}", dest.display())),
        Err(err) => Err(err),
    };

    if moved.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    moved
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::config::Config;
    use clap::Parser;

    fn settings(tool_path: PathBuf, curl: &str) -> Settings {
        let cli = Cli::parse_from(["license-gate"]);
        let mut settings = Settings::resolve(Config::default(), &cli, None);
        settings.tool_path = tool_path;
        settings.curl = curl.to_string();
        settings.tool_url = "http://127.0.0.1:9/dash-licenses.jar".to_string();
        settings
    }

    #[tokio::test]
    async fn test_existing_tool_is_not_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("dash-licenses.jar");
        std::fs::write(&jar, b"jar").unwrap();

        let fetched = ensure_tool(&settings(jar.clone(), "no-such-curl"), &Reporter::new(true))
            .await
            .unwrap();
        assert!(!fetched);
        assert_eq!(std::fs::read(&jar).unwrap(), b"jar");
    }

    #[tokio::test]
    async fn test_missing_http_client_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("download").join("dash-licenses.jar");

        let err = ensure_tool(&settings(jar.clone(), "no-such-curl-7c1e"), &Reporter::new(true))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to download"));
        assert!(dir.path().join("download").is_dir());
        assert!(!jar.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_download_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("dash-licenses.jar");

        // `false` accepts any arguments and exits 1
        let err = ensure_tool(&settings(jar.clone(), "false"), &Reporter::new(true))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exit code 1"));
        assert!(!jar.exists());
    }

    #[tokio::test]
    async fn test_commit_download() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("dash-licenses.jar");

        commit_download(b"jar", &jar).await.unwrap();
        assert_eq!(std::fs::read(&jar).unwrap(), b"jar");
        assert!(!partial_path(&jar).exists());
    }

    #[tokio::test]
    async fn test_commit_download_failure_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // a non-empty directory in the way makes the rename fail
        let jar = dir.path().join("dash-licenses.jar");
        std::fs::create_dir(&jar).unwrap();
        std::fs::write(jar.join("keep"), b"x").unwrap();

        let err = commit_download(b"jar", &jar).await.unwrap_err();
        assert!(err.to_string().contains("Failed to move download"));
        assert!(!partial_path(&jar).exists());
        assert!(jar.join("keep").exists());
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("download/dash-licenses.jar")),
            PathBuf::from("download/dash-licenses.jar.part")
        );
    }
}
