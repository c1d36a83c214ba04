//! Language dispatch.
//!
//! Each supported language is one [`LanguageSpec`] table entry: the source
//! file it writes, how the snippet is wrapped, and the commands that compile
//! and run it. Adding a language means adding an entry, nothing else.

use crate::error::SandboxError;
use crate::Result;
use codejail_core::PathResolver;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// A supported source language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    Python,
    JavaScript,
    TypeScript,
    Bash,
    Go,
    Java,
}

/// Builds an argv from the written source file and the session directory.
pub type CommandBuilder = fn(source: &Path, session_dir: &Path) -> Vec<String>;

/// Dispatch table entry for one language.
pub struct LanguageSpec {
    /// Canonical identifier.
    pub name: &'static str,

    /// Extra identifiers accepted on input.
    pub aliases: &'static [&'static str],

    /// File written into the session directory.
    pub file_name: &'static str,

    /// Turns the submitted snippet into the file contents.
    pub wrap: fn(&str) -> String,

    /// Compile step, for compiled languages.
    pub compile: Option<CommandBuilder>,

    /// Run step.
    pub run: CommandBuilder,

    /// Binaries that must be on `PATH`.
    pub toolchain: &'static [&'static str],
}

static PYTHON: LanguageSpec = LanguageSpec {
    name: "python",
    aliases: &["py"],
    file_name: "main.py",
    wrap: verbatim,
    compile: None,
    run: run_python,
    toolchain: &["python3"],
};

static JAVASCRIPT: LanguageSpec = LanguageSpec {
    name: "javascript",
    aliases: &["js"],
    file_name: "main.js",
    wrap: verbatim,
    compile: None,
    run: run_node,
    toolchain: &["node"],
};

static TYPESCRIPT: LanguageSpec = LanguageSpec {
    name: "typescript",
    aliases: &["ts"],
    file_name: "main.ts",
    wrap: verbatim,
    compile: None,
    run: run_ts_node,
    toolchain: &["ts-node"],
};

static BASH: LanguageSpec = LanguageSpec {
    name: "bash",
    aliases: &[],
    file_name: "main.sh",
    wrap: verbatim,
    compile: None,
    run: run_bash,
    toolchain: &["bash"],
};

static GO: LanguageSpec = LanguageSpec {
    name: "go",
    aliases: &[],
    file_name: "main.go",
    wrap: wrap_go,
    compile: None,
    run: run_go,
    toolchain: &["go"],
};

static JAVA: LanguageSpec = LanguageSpec {
    name: "java",
    aliases: &[],
    file_name: "Main.java",
    wrap: wrap_java,
    compile: Some(compile_java),
    run: run_java,
    toolchain: &["javac", "java"],
};

impl Language {
    /// Every supported language, in table order.
    pub const ALL: [Language; 6] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Bash,
        Language::Go,
        Language::Java,
    ];

    /// Look up a language by name or alias, ignoring case.
    pub fn parse(raw: &str) -> Result<Self> {
        let wanted = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| {
                let spec = lang.spec();
                spec.name == wanted || spec.aliases.iter().any(|alias| *alias == wanted)
            })
            .ok_or_else(|| SandboxError::UnsupportedLanguage(raw.to_string()))
    }

    /// This language's dispatch entry.
    pub fn spec(self) -> &'static LanguageSpec {
        match self {
            Self::Python => &PYTHON,
            Self::JavaScript => &JAVASCRIPT,
            Self::TypeScript => &TYPESCRIPT,
            Self::Bash => &BASH,
            Self::Go => &GO,
            Self::Java => &JAVA,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Whether a compile step precedes the run step.
    pub fn is_compiled(self) -> bool {
        self.spec().compile.is_some()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Commands prepared for one snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// Source file that was written.
    pub source: PathBuf,

    /// Compile argv, if the language needs one.
    pub compile: Option<Vec<String>>,

    /// Run argv.
    pub run: Vec<String>,
}

/// Write the snippet into the session directory and build its commands.
///
/// `jail` is rooted at the session directory, so the source file cannot
/// land outside it.
pub async fn prepare(language: Language, code: &str, jail: &PathResolver) -> Result<LaunchPlan> {
    let spec = language.spec();
    let source = jail.resolve(spec.file_name)?;

    tokio::fs::write(&source, (spec.wrap)(code)).await?;
    debug!("Wrote {} source to {}", spec.name, source.display());

    Ok(LaunchPlan {
        compile: spec.compile.map(|build| build(&source, jail.root())),
        run: (spec.run)(&source, jail.root()),
        source,
    })
}

/// Wrap a Go snippet in a `main` package with a `main` function.
///
/// `fmt` is always imported and referenced once, so snippets that do not
/// print still compile.
pub fn wrap_go(code: &str) -> String {
    [
        "package main",
        "import (",
        "  \"fmt\"",
        ")",
        "var _ = fmt.Println",
        "func main() {",
        code,
        "}",
    ]
    .join("\n")
}

/// Wrap a Java snippet in `Main.main`.
pub fn wrap_java(code: &str) -> String {
    [
        "public class Main {",
        "  public static void main(String[] args) throws Exception {",
        code,
        "  }",
        "}",
    ]
    .join("\n")
}

fn verbatim(code: &str) -> String {
    code.to_string()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn run_python(source: &Path, _: &Path) -> Vec<String> {
    vec!["python3".into(), path_arg(source)]
}

fn run_node(source: &Path, _: &Path) -> Vec<String> {
    vec!["node".into(), path_arg(source)]
}

fn run_ts_node(source: &Path, _: &Path) -> Vec<String> {
    vec!["ts-node".into(), path_arg(source)]
}

fn run_bash(source: &Path, _: &Path) -> Vec<String> {
    vec!["bash".into(), path_arg(source)]
}

fn run_go(source: &Path, _: &Path) -> Vec<String> {
    vec!["go".into(), "run".into(), path_arg(source)]
}

fn compile_java(source: &Path, _: &Path) -> Vec<String> {
    vec!["javac".into(), path_arg(source)]
}

fn run_java(_: &Path, session_dir: &Path) -> Vec<String> {
    vec!["java".into(), "-cp".into(), path_arg(session_dir), "Main".into()]
}
