use std::path::{Path, PathBuf};

use crate::foundation::error::{ReelError, ReelResult};

/// Maps the URLs carried by an editor state (sticker, background, music, voiceover) to bytes.
pub trait AssetResolver: Send + Sync {
    /// Local filesystem path for `url`, for consumers that hand paths to external decoders.
    fn local_path(&self, url: &str) -> ReelResult<PathBuf>;

    /// Read the full asset.
    fn read(&self, url: &str) -> ReelResult<Vec<u8>> {
        let path = self.local_path(url)?;
        std::fs::read(&path).map_err(|e| {
            ReelError::media_decode(format!("failed to read asset '{}': {e}", path.display()))
        })
    }
}

/// Resolves URLs against a directory, the way a static web root serves `/assets/...`.
///
/// - `file:///abs/path` maps to the absolute path;
/// - `/a/b.png` and `a/b.png` map to `root/a/b.png`;
/// - `..` segments and network or in-memory schemes (`http:`, `blob:`, `data:`) are rejected.
#[derive(Clone, Debug)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    /// Resolver for assets stored under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory relative URLs resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetResolver for FsResolver {
    fn local_path(&self, url: &str) -> ReelResult<PathBuf> {
        let url = url.trim();
        if let Some(abs) = url.strip_prefix("file://") {
            let p = Path::new(abs);
            if !p.is_absolute() {
                return Err(ReelError::validation(format!(
                    "file url must carry an absolute path: \"{url}\""
                )));
            }
            if p.components().any(|c| c == std::path::Component::ParentDir) {
                return Err(ReelError::validation("asset paths must not contain '..'"));
            }
            return Ok(p.to_path_buf());
        }
        if let Some((scheme, _)) = url.split_once(':')
            && is_scheme(scheme)
        {
            return Err(ReelError::validation(format!(
                "unsupported asset url scheme \"{scheme}:\""
            )));
        }
        let rel = normalize_rel_path(url.trim_start_matches('/'))?;
        Ok(self.root.join(rel))
    }
}

fn is_scheme(s: &str) -> bool {
    // A single letter is a Windows drive, not a scheme.
    s.len() > 1
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Normalize a root-relative asset path.
///
/// Uses `/` separators, drops `.` segments and rejects empty paths or parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> ReelResult<String> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(ReelError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ReelError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ReelError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
