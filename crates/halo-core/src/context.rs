//! Context descriptor: the sole channel by which a freshly loaded child
//! learns what to render (spec §3 "Context descriptor", §6 "Context URL
//! parameters", and Design Note (a) on carrying this at spawn time
//! instead of through `location.search`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parsed role/identity for a child process or window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum ContextDescriptor {
    Coordinator,
    InlineWindow { id: String },
    Popover { id: String, max_height: Option<f64> },
}

impl ContextDescriptor {
    /// Parse from spawn-time command-line arguments, in the shape
    /// `--role=inline-window --id=<id>` / `--role=popover --id=<id>
    /// --max-height=<n>` / no `--role` flag at all for the coordinator.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut role: Option<String> = None;
        let mut id: Option<String> = None;
        let mut max_height: Option<f64> = None;

        for arg in args {
            let arg = arg.as_ref();
            if let Some(value) = arg.strip_prefix("--role=") {
                role = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("--id=") {
                id = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("--max-height=") {
                max_height = value.parse().ok();
            }
        }

        Self::from_parts(role.as_deref(), id, max_height)
    }

    /// Parse from environment variables (`HALO_ROLE`, `HALO_ID`,
    /// `HALO_MAX_HEIGHT`), the other spawn-time carrier spec Design Note
    /// (a) calls out alongside argv.
    pub fn from_env() -> Self {
        let role = std::env::var("HALO_ROLE").ok();
        let id = std::env::var("HALO_ID").ok();
        let max_height = std::env::var("HALO_MAX_HEIGHT")
            .ok()
            .and_then(|v| v.parse().ok());
        Self::from_parts(role.as_deref(), id, max_height)
    }

    /// Parse the literal URL query shape spec §6 defines
    /// (`window=<id>` / `popover=<id>` / `max_height=<integer>`), for
    /// hosts that render every role through one shared webview bundle and
    /// read `location.search`.
    pub fn from_query(query: &str) -> Self {
        let params = parse_query(query);

        if let Some(id) = params.get("window") {
            return ContextDescriptor::InlineWindow { id: id.clone() };
        }
        if let Some(id) = params.get("popover") {
            let max_height = params.get("max_height").and_then(|v| v.parse().ok());
            return ContextDescriptor::Popover {
                id: id.clone(),
                max_height,
            };
        }
        ContextDescriptor::Coordinator
    }

    fn from_parts(role: Option<&str>, id: Option<String>, max_height: Option<f64>) -> Self {
        match role {
            Some("inline-window") => match id {
                Some(id) => ContextDescriptor::InlineWindow { id },
                None => ContextDescriptor::Coordinator,
            },
            Some("popover") => match id {
                Some(id) => ContextDescriptor::Popover { id, max_height },
                None => ContextDescriptor::Coordinator,
            },
            _ => ContextDescriptor::Coordinator,
        }
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?.to_string();
            let value = parts.next().unwrap_or("").to_string();
            Some((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_with_no_role_is_coordinator() {
        let ctx = ContextDescriptor::from_args(Vec::<&str>::new());
        assert_eq!(ctx, ContextDescriptor::Coordinator);
    }

    #[test]
    fn args_inline_window() {
        let ctx = ContextDescriptor::from_args(["--role=inline-window", "--id=bar"]);
        assert_eq!(
            ctx,
            ContextDescriptor::InlineWindow {
                id: "bar".to_string()
            }
        );
    }

    #[test]
    fn args_popover_with_max_height() {
        let ctx = ContextDescriptor::from_args([
            "--role=popover",
            "--id=github-issues",
            "--max-height=420",
        ]);
        assert_eq!(
            ctx,
            ContextDescriptor::Popover {
                id: "github-issues".to_string(),
                max_height: Some(420.0),
            }
        );
    }

    #[test]
    fn query_window_param() {
        let ctx = ContextDescriptor::from_query("window=bar");
        assert_eq!(
            ctx,
            ContextDescriptor::InlineWindow {
                id: "bar".to_string()
            }
        );
    }

    #[test]
    fn query_popover_param_with_max_height() {
        let ctx = ContextDescriptor::from_query("popover=p1&max_height=300");
        assert_eq!(
            ctx,
            ContextDescriptor::Popover {
                id: "p1".to_string(),
                max_height: Some(300.0),
            }
        );
    }

    #[test]
    fn query_absent_params_is_coordinator() {
        assert_eq!(ContextDescriptor::from_query(""), ContextDescriptor::Coordinator);
    }
}
