//! File presence rules
//!
//! Both rules take a `files` list. Relative entries are resolved against the
//! module directory of the pass. A file list made of absolute paths is the
//! same check in every module, so only then do the rules report a cache id.

use enforcer_core::{
    BindError, ConfigTree, RULES, Rule, RuleContext, RuleEntry, RuleError, RuleLog, decode_params,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileListParams {
    /// `null` or blank entries are "no file given"
    files: Vec<Option<String>>,
    /// Skip null entries instead of failing on them
    allow_nulls: bool,
    /// Replaces the default header of the failure message
    message: Option<String>,
}

/// Which side of the existence check a rule wants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expectation {
    Present,
    Absent,
}

impl Expectation {
    fn is_satisfied(self, path: &Path) -> bool {
        match self {
            Self::Present => path.exists(),
            Self::Absent => !path.exists(),
        }
    }

    fn header(self) -> &'static str {
        match self {
            Self::Present => "Some required files are missing:",
            Self::Absent => "Some files should not exist:",
        }
    }
}

/// Shared state of both file rules
#[derive(Debug, Default)]
struct FileList {
    params: FileListParams,
    log: Option<RuleLog>,
}

impl FileList {
    fn with_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            params: FileListParams {
                files: files
                    .into_iter()
                    .map(|p| Some(p.as_ref().to_string_lossy().into_owned()))
                    .collect(),
                ..FileListParams::default()
            },
            log: None,
        }
    }

    fn entries(&self) -> impl Iterator<Item = Option<&str>> {
        self.params
            .files
            .iter()
            .map(|f| f.as_deref().map(str::trim).filter(|f| !f.is_empty()))
    }

    fn check(&self, ctx: &RuleContext, expectation: Expectation) -> Result<(), RuleError> {
        if !self.params.allow_nulls && self.params.files.is_empty() {
            return Err(RuleError::fatal(
                "The file list is empty and Null files are disabled.",
            ));
        }

        let mut offending = Vec::new();
        for entry in self.entries() {
            let Some(file) = entry else {
                if self.params.allow_nulls {
                    if let Some(log) = &self.log {
                        log.debug("Skipping an empty file name, allow_nulls is set");
                    }
                    continue;
                }
                return Err(RuleError::fatal(
                    "A null filename was given and allow_nulls is false.",
                ));
            };

            let path = ctx.resolve(Path::new(file));
            if !expectation.is_satisfied(&path) {
                offending.push(path);
            }
        }

        if offending.is_empty() {
            return Ok(());
        }

        let mut message = self
            .params
            .message
            .clone()
            .unwrap_or_else(|| expectation.header().to_string());
        for path in &offending {
            let _ = write!(message, "\n{}", path.display());
        }
        Err(RuleError::violation(message))
    }

    /// SHA-256 over the file list, only when every entry is absolute
    fn cache_id(&self) -> Option<String> {
        let mut paths = Vec::with_capacity(self.params.files.len());
        for entry in self.entries() {
            let path = PathBuf::from(entry?);
            if !path.is_absolute() {
                return None;
            }
            paths.push(path);
        }
        if paths.is_empty() {
            return None;
        }

        let mut hasher = Sha256::new();
        for path in &paths {
            hasher.update(path.to_string_lossy().as_bytes());
            hasher.update([0u8]);
        }
        Some(format!("{:x}", hasher.finalize()))
    }

    fn describe(&self, rule: &str) -> String {
        let files: Vec<_> = self.entries().map(|f| f.unwrap_or("<null>")).collect();
        format!("{rule} [{}]", files.join(", "))
    }
}

/// Fails when any of the listed files is missing
#[derive(Debug, Default)]
pub struct RequireFilesExist(FileList);

impl RequireFilesExist {
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self(FileList::with_files(files))
    }
}

impl Rule for RequireFilesExist {
    fn execute(&mut self, ctx: &RuleContext) -> Result<(), RuleError> {
        self.0.check(ctx, Expectation::Present)
    }

    fn configure(&mut self, params: &ConfigTree) -> Result<(), BindError> {
        self.0.params = decode_params(params)?;
        Ok(())
    }

    fn attach_log(&mut self, log: RuleLog) {
        self.0.log = Some(log);
    }

    fn cache_id(&self) -> Option<String> {
        self.0.cache_id()
    }

    fn describe(&self) -> Option<String> {
        Some(self.0.describe("requireFilesExist"))
    }
}

/// Fails when any of the listed files exists
#[derive(Debug, Default)]
pub struct RequireFilesDontExist(FileList);

impl RequireFilesDontExist {
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self(FileList::with_files(files))
    }
}

impl Rule for RequireFilesDontExist {
    fn execute(&mut self, ctx: &RuleContext) -> Result<(), RuleError> {
        self.0.check(ctx, Expectation::Absent)
    }

    fn configure(&mut self, params: &ConfigTree) -> Result<(), BindError> {
        self.0.params = decode_params(params)?;
        Ok(())
    }

    fn attach_log(&mut self, log: RuleLog) {
        self.0.log = Some(log);
    }

    fn cache_id(&self) -> Option<String> {
        self.0.cache_id()
    }

    fn describe(&self) -> Option<String> {
        Some(self.0.describe("requireFilesDontExist"))
    }
}

#[linkme::distributed_slice(RULES)]
static REQUIRE_FILES_EXIST: RuleEntry = RuleEntry {
    name: "requireFilesExist",
    implementation: "enforcer_rules::RequireFilesExist",
    description: "Requires every listed file to exist",
    factory: || Box::new(RequireFilesExist::default()),
};

#[linkme::distributed_slice(RULES)]
static REQUIRE_FILES_DONT_EXIST: RuleEntry = RuleEntry {
    name: "requireFilesDontExist",
    implementation: "enforcer_rules::RequireFilesDontExist",
    description: "Requires none of the listed files to exist",
    factory: || Box::new(RequireFilesDontExist::default()),
};
