use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use std::path::PathBuf;
use std::sync::Arc;

use crate::resolver::Resolver;
use crate::router::Router;
use crate::spec::{load_api_description, ApiDescription};

/// Command-line interface for brrtguard
#[derive(Parser, Debug)]
#[command(name = "brrtguard")]
#[command(about = "Check router routes against an OpenAPI description", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve router routes against the description, failing on the first gap
    Check {
        /// Path to the OpenAPI specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Route as "METHOD /template/:param" (repeatable)
        #[arg(short, long = "route", required = true)]
        routes: Vec<String>,
    },
    /// Print each API path with its declared methods and operation ids
    Inspect {
        /// Path to the OpenAPI specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,
    },
}

/// Execute a parsed command.
///
/// # Errors
///
/// Load failures, malformed `--route` values and unresolvable routes.
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check { spec, routes } => {
            let description = Arc::new(load_api_description(&spec)?);
            let resolved = check_routes(description, &routes)?;
            println!("OK: {resolved} route template(s) resolved against {}", spec.display());
        }
        Commands::Inspect { spec } => {
            let description = load_api_description(&spec)?;
            print!("{}", inspect(&description));
        }
    }
    Ok(())
}

/// Parse `"GET /hello/:name"` into a method and route template.
///
/// # Errors
///
/// When the value is not `METHOD TEMPLATE` or the method is not a valid token.
pub fn parse_route_arg(arg: &str) -> Result<(Method, String)> {
    let Some((method, template)) = arg.trim().split_once(char::is_whitespace) else {
        bail!("route '{arg}' must look like 'GET /path/:param'");
    };
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid method in route '{arg}'"))?;
    Ok((method, template.trim().to_string()))
}

/// Register `routes` on a fresh router and eagerly resolve them all.
///
/// # Errors
///
/// Bad route arguments, router rejections, or the first route with no
/// matching API path.
pub fn check_routes(description: Arc<ApiDescription>, routes: &[String]) -> Result<usize> {
    let mut router = Router::new();
    for arg in routes {
        let (method, template) = parse_route_arg(arg)?;
        router
            .register(method, &template)
            .with_context(|| format!("cannot register route '{arg}'"))?;
    }
    let resolver = Resolver::new(description);
    let resolved = resolver
        .initialize(router.routes())
        .context("route check failed")?;
    Ok(resolved)
}

/// One line per API path: `<path>  <METHOD>=<operation_id> ...`.
#[must_use]
pub fn inspect(description: &ApiDescription) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} ({} paths)\n",
        description.title(),
        description.paths().len()
    ));
    for path in description.paths() {
        let Some(group) = description.path(path) else {
            continue;
        };
        let ops: Vec<String> = group
            .methods()
            .into_iter()
            .filter_map(|m| group.operation(m).map(|op| format!("{m}={}", op.operation_id)))
            .collect();
        out.push_str(&format!("{path}  {}\n", ops.join(" ")));
    }
    out
}
