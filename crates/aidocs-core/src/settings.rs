//! Settings record
//!
//! [`RawSettings`] is the on-disk shape (camelCase keys, every field
//! defaulted). [`Settings`] is the resolved, validated record a workflow
//! runs against; it is immutable for the duration of one invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aidocs_fs::config::ConfigFormat;
use aidocs_fs::{ConfigStore, NormalizedPath, io};
use aidocs_git::naming::{render_branch_name, validate_branch_name};
use aidocs_git::{GitRepo, GitRunner};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".ai-docs.config.yml";

/// User name used when neither git nor the environment provides one.
pub const FALLBACK_USER_NAME: &str = "user";

const SCAFFOLD_YAML: &str = r#"userName: ""  # empty: git config user.name, then the login name
mainBranchName: "main"

docBranchNameTemplate: "@ai-docs/{userName}"  # {userName} is replaced at runtime
docWorktreeDir: ".ai-docs"

aIAgentMemoryContextPath:
  Cline: "memory-bank"
  Claude: "CLAUDE.md"
  Gemini: "GEMINI.md"
  Cursor: ".cursor/rules"

ignorePatterns:
  - "memory-bank/"
  - "CLAUDE.md"
  - "GEMINI.md"
  - ".cursor/rules/"

docDir: "docs/ai"
"#;

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_doc_branch_template() -> String {
    "@doc/{userName}".to_string()
}

fn default_worktree_dir() -> String {
    ".mem".to_string()
}

fn default_agent_paths() -> BTreeMap<String, String> {
    [
        ("Claude", ".ai-memory"),
        ("Cline", "memory-bank"),
        ("Cursor", ".cursor/rules"),
        ("Gemini", ".gemini/context"),
    ]
    .into_iter()
    .map(|(agent, path)| (agent.to_string(), path.to_string()))
    .collect()
}

fn default_ignore_patterns() -> Vec<String> {
    [
        "/memory-bank/",
        "/.ai-memory/",
        "/.gemini/context/",
        "/.cursor/rules/",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_doc_dir() -> Option<String> {
    Some("docs/ai".to_string())
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_push_attempts() -> u32 {
    3
}

/// Settings as written in the config file.
///
/// Unknown keys are ignored. A provided `aIAgentMemoryContextPath` map
/// replaces the default map rather than extending it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettings {
    #[serde(default)]
    pub user_name: String,

    #[serde(default = "default_main_branch")]
    pub main_branch_name: String,

    #[serde(default = "default_doc_branch_template", alias = "docBranchTemplate")]
    pub doc_branch_name_template: String,

    #[serde(default = "default_worktree_dir")]
    pub doc_worktree_dir: String,

    #[serde(
        default = "default_agent_paths",
        rename = "aIAgentMemoryContextPath",
        alias = "agentContextPaths"
    )]
    pub agent_context_paths: BTreeMap<String, String>,

    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Empty string disables the directory.
    #[serde(default = "default_doc_dir")]
    pub doc_dir: Option<String>,

    #[serde(default = "default_remote")]
    pub remote_name: String,

    #[serde(default = "default_push_attempts")]
    pub push_max_attempts: u32,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            main_branch_name: default_main_branch(),
            doc_branch_name_template: default_doc_branch_template(),
            doc_worktree_dir: default_worktree_dir(),
            agent_context_paths: default_agent_paths(),
            ignore_patterns: default_ignore_patterns(),
            doc_dir: default_doc_dir(),
            remote_name: default_remote(),
            push_max_attempts: default_push_attempts(),
        }
    }
}

impl RawSettings {
    /// The starter configuration written by `init` when no file exists.
    pub fn scaffold() -> Self {
        Self {
            doc_branch_name_template: "@ai-docs/{userName}".into(),
            doc_worktree_dir: ".ai-docs".into(),
            agent_context_paths: [
                ("Claude", "CLAUDE.md"),
                ("Cline", "memory-bank"),
                ("Cursor", ".cursor/rules"),
                ("Gemini", "GEMINI.md"),
            ]
            .into_iter()
            .map(|(agent, path)| (agent.to_string(), path.to_string()))
            .collect(),
            ignore_patterns: ["memory-bank/", "CLAUDE.md", "GEMINI.md", ".cursor/rules/"]
                .into_iter()
                .map(String::from)
                .collect(),
            ..Self::default()
        }
    }
}

/// Write the starter configuration at `path` in the format its extension
/// names. YAML gets an annotated template.
pub fn write_scaffold(path: &NormalizedPath) -> Result<()> {
    match ConfigFormat::from_path(path)? {
        ConfigFormat::Yaml => io::write_text(path, SCAFFOLD_YAML)?,
        _ => ConfigStore::new().save(path, &RawSettings::scaffold())?,
    }
    tracing::info!(path = %path, "Wrote scaffold config");
    Ok(())
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub user_name: String,
    pub main_branch: String,
    pub doc_branch_template: String,
    pub worktree_dir: NormalizedPath,
    /// Agent identifier to context path, ordered by agent.
    pub agent_paths: BTreeMap<String, NormalizedPath>,
    pub ignore_patterns: Vec<String>,
    pub doc_dir: Option<NormalizedPath>,
    pub remote: String,
    pub push_max_attempts: u32,
    doc_branch: String,
}

impl Settings {
    /// Read and resolve the config file at `path`.
    ///
    /// A missing file is [`Error::ConfigMissing`].
    pub fn load<R: GitRunner>(path: &NormalizedPath, repo: &GitRepo<R>) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigMissing {
                path: path.to_native(),
            });
        }
        let raw: RawSettings = ConfigStore::new().load(path)?;
        tracing::debug!(path = %path, "Loaded config");

        let user_name = if raw.user_name.trim().is_empty() {
            resolve_user_name(repo.configured_user_name())
        } else {
            raw.user_name.trim().to_string()
        };
        Self::resolve(raw, user_name)
    }

    /// Validate `raw` and render the doc branch for `user_name`.
    pub fn resolve(raw: RawSettings, user_name: impl Into<String>) -> Result<Self> {
        let user_name = user_name.into();
        let invalid = |key: &str, reason: String| Error::InvalidSettings {
            key: key.to_string(),
            reason,
        };

        let main_branch = raw.main_branch_name.trim().to_string();
        if main_branch.is_empty() {
            return Err(invalid("mainBranchName", "must not be empty".into()));
        }
        validate_branch_name(&main_branch)?;

        let doc_branch = render_branch_name(raw.doc_branch_name_template.trim(), &user_name);
        validate_branch_name(&doc_branch)?;
        if doc_branch == main_branch {
            return Err(invalid(
                "docBranchNameTemplate",
                format!("renders to the main branch '{main_branch}'"),
            ));
        }

        let worktree_dir = contained_path("docWorktreeDir", &raw.doc_worktree_dir)?;

        let mut agent_paths = BTreeMap::new();
        for (agent, path) in &raw.agent_context_paths {
            let key = format!("aIAgentMemoryContextPath.{agent}");
            agent_paths.insert(agent.clone(), contained_path(&key, path)?);
        }

        let doc_dir = match raw.doc_dir.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(dir) => Some(contained_path("docDir", dir)?),
        };

        let remote = raw.remote_name.trim().to_string();
        if remote.is_empty() {
            return Err(invalid("remoteName", "must not be empty".into()));
        }
        if raw.push_max_attempts == 0 {
            return Err(invalid("pushMaxAttempts", "must be at least 1".into()));
        }

        Ok(Self {
            user_name,
            main_branch,
            doc_branch_template: raw.doc_branch_name_template,
            worktree_dir,
            agent_paths,
            ignore_patterns: raw.ignore_patterns,
            doc_dir,
            remote,
            push_max_attempts: raw.push_max_attempts,
            doc_branch,
        })
    }

    /// The rendered, validated doc branch name.
    pub fn doc_branch(&self) -> &str {
        &self.doc_branch
    }

    /// Absolute location of the worktree below `root`.
    pub fn worktree_path(&self, root: &Path) -> PathBuf {
        root.join(self.worktree_dir.to_native())
    }

    /// Distinct context paths in agent order.
    pub fn context_paths(&self) -> Vec<&NormalizedPath> {
        let mut paths: Vec<&NormalizedPath> = Vec::new();
        for path in self.agent_paths.values() {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// Lines `.gitignore` must contain: the ignore patterns, a root-anchored
    /// entry per context path, then the worktree directory. De-duplicated by
    /// trimmed text.
    ///
    /// Git sees a link as a file, so a directory-only pattern such as
    /// `/memory-bank/` does not ignore the link `init` puts there. The
    /// anchored entry (`/memory-bank`) is added unless the path is already
    /// listed without a trailing slash.
    pub fn required_ignore_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let mut push = |line: &str| {
            let line = line.trim();
            if !line.is_empty() && !lines.iter().any(|l| l == line) {
                lines.push(line.to_string());
            }
        };

        for pattern in &self.ignore_patterns {
            push(pattern.as_str());
        }
        for rel in self.context_paths() {
            let anchored = format!("/{}", rel.as_str());
            let listed = self
                .ignore_patterns
                .iter()
                .any(|p| p.trim() == rel.as_str() || p.trim() == anchored);
            if !listed {
                push(&anchored);
            }
        }
        push(self.worktree_dir.as_str());
        lines
    }
}

/// `git config user.name`, then the `USER`/`USERNAME` environment
/// variables, then [`FALLBACK_USER_NAME`].
pub fn resolve_user_name(configured: Option<String>) -> String {
    configured
        .filter(|name| !name.trim().is_empty())
        .or_else(|| login_name_from(|key| std::env::var(key).ok()))
        .unwrap_or_else(|| FALLBACK_USER_NAME.to_string())
}

fn login_name_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["USER", "USERNAME"]
        .into_iter()
        .filter_map(lookup)
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}

fn contained_path(key: &str, value: &str) -> Result<NormalizedPath> {
    let path = NormalizedPath::new(value.trim().trim_end_matches('/'));
    if !path.is_contained_relative() {
        return Err(Error::InvalidSettings {
            key: key.to_string(),
            reason: format!("'{value}' must be a relative path without '..'"),
        });
    }
    Ok(path)
}
