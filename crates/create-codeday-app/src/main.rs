//! create-codeday-app - Project scaffolding for CodeDay applications

use anyhow::Result;
use clap::{Parser, Subcommand};
use codeday_scaffolder::templates::BundledFile;
use codeday_scaffolder::tui::CreateArgs;
use codeday_scaffolder::{PlaceholderMap, ProductConfig};
use std::path::{Path, PathBuf};

/// Embed files of `templates/topo` so installed binaries need no checkout
macro_rules! bundle {
    ($($path:literal),* $(,)?) => {
        &[$((
            $path,
            include_bytes!(concat!("../../../templates/topo/", $path)) as &[u8],
        )),*]
    };
}

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Packages every Topo app depends on
const TOPO_DEPENDENCIES: &[&str] = &[
    "@codeday/topo",
    "@codeday/topocons",
    "next",
    "next-seo",
    "prop-types",
    "react",
    "react-dom",
];

/// The Topo template; keep in sync with templates/topo
const TOPO_TEMPLATE: &[BundledFile] = bundle![
    "template.yaml",
    ".gitignore",
    "README.md",
    "public/favicon.ico",
    "src/components/page.js",
    "src/pages/_app.js",
    "src/pages/index.js",
];

/// Topo application configuration
#[derive(Clone)]
pub struct TopoConfig;

impl ProductConfig for TopoConfig {
    fn name(&self) -> &'static str {
        "create-codeday-app"
    }

    fn display_name(&self) -> &'static str {
        "CodeDay Topo app"
    }

    fn template_name(&self) -> &'static str {
        "topo"
    }

    fn bundled_template(&self) -> &'static [BundledFile] {
        TOPO_TEMPLATE
    }

    fn template_url_env(&self) -> &'static str {
        "CODEDAY_TEMPLATE_URL"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        TOPO_DEPENDENCIES
    }

    fn next_steps(&self, dir: &Path) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // Step 1: cd to directory if not current
        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", dir.display()));
        }

        // Step 2: Start dev server
        steps.push("npm run dev".to_string());

        // Step 3: Point the SEO defaults at the real domain
        steps.push("Set the production DOMAIN in src/components/page.js".to_string());

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "create-codeday-app")]
#[command(about = "CLI for scaffolding CodeDay applications")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a Topo application
    Topo(TopoArgs),
}

#[derive(Parser, Debug)]
pub struct TopoArgs {
    /// Directory to create the application in
    pub dir: PathBuf,

    /// App name (defaults to directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Show registry lookups and placeholder substitutions
    #[arg(short, long)]
    pub verbose: bool,

    /// Google Analytics ID passed to the Topo theme
    #[arg(long = "analytics-id", value_parser = parse_analytics_id)]
    pub analytics_id: Option<String>,

    /// Local directory containing a `topo/` template to use instead of the bundled one (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Overwrite a non-empty directory without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Skip running `npm install` after generation
    #[arg(long = "skip-install")]
    pub skip_install: bool,
}

/// Analytics IDs end up inside a JSX attribute, so only plain ID characters pass
fn parse_analytics_id(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("analytics ID cannot be empty".to_string());
    }
    match value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        Some(c) => Err(format!(
            "invalid character {c:?}; use letters, digits, '-', '_' or '.'"
        )),
        None => Ok(value.to_string()),
    }
}

impl TopoArgs {
    /// Feature flags rendered as source fragments
    fn placeholders(&self) -> PlaceholderMap {
        let theme_props = match &self.analytics_id {
            Some(id) => format!("analyticsId=\"{}\" ", id),
            None => String::new(),
        };

        let mut map = PlaceholderMap::new();
        map.insert("THEME_PROPS", theme_props);
        map
    }
}

impl From<TopoArgs> for CreateArgs {
    fn from(args: TopoArgs) -> Self {
        let placeholders = args.placeholders();
        CreateArgs {
            directory: args.dir,
            name: args.name,
            template_dir: args.template_dir,
            placeholders,
            verbose: args.verbose,
            yes: args.yes,
            skip_install: args.skip_install,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = TopoConfig;

    let result = match args.command {
        Command::Topo(topo_args) => {
            codeday_scaffolder::run(&config, topo_args.into(), CLI_VERSION).await
        }
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
