//! Case-insensitive prefix resolution of command names.
//!
//! Every category holds an ordered vocabulary. A partial token resolves when
//! it is a prefix of exactly one command in its category, so `pb con sel dev`
//! means `pb context select dev`.

use std::collections::HashMap;
use tracing::trace;

pub const CATEGORY_ROOT: &str = "root";
pub const CATEGORY_CONTEXT: &str = "context";
pub const CATEGORY_COLLECTIONS: &str = "collections";
pub const CATEGORY_AUTH: &str = "auth";
pub const CATEGORY_CONTEXT_COLLECTIONS: &str = "context_collections";
pub const CATEGORY_BACKUP: &str = "backup";

const DEFAULT_VOCABULARY: &[(&str, &[&str])] = &[
    (
        CATEGORY_ROOT,
        &["context", "collections", "auth", "backup", "version", "help"],
    ),
    (
        CATEGORY_CONTEXT,
        &["create", "list", "select", "show", "delete", "collections"],
    ),
    (
        CATEGORY_COLLECTIONS,
        &["list", "get", "create", "update", "delete"],
    ),
    (CATEGORY_AUTH, &["pb"]),
    (CATEGORY_CONTEXT_COLLECTIONS, &["add", "remove", "list", "clear"]),
    (
        CATEGORY_BACKUP,
        &["list", "create", "download", "upload", "delete", "restore"],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown command category '{0}'")]
    UnknownCategory(String),
    #[error("command cannot be empty")]
    EmptyCommand,
    #[error("unknown command '{input}'. Available commands: {}", .available.join(", "))]
    UnknownCommand {
        input: String,
        available: Vec<String>,
    },
    #[error("ambiguous command '{input}'. Possible matches: {}", .matches.join(", "))]
    AmbiguousCommand { input: String, matches: Vec<String> },
    #[error("command '{command}' not found in category '{category}'")]
    NotFound { category: String, command: String },
    #[error("collection name is required")]
    Required,
    #[error("{}", not_configured_message(.name, .available))]
    NotConfigured { name: String, available: Vec<String> },
}

fn not_configured_message(name: &str, available: &[String]) -> String {
    if available.is_empty() {
        format!(
            "collection '{name}' not found. No collections configured in context. \
             Add with 'pb context collections add {name}'"
        )
    } else {
        format!(
            "collection '{name}' not configured in context. Available collections: {}. \
             Add with 'pb context collections add {name}'",
            available.join(", ")
        )
    }
}

#[derive(Debug, Clone)]
pub struct CommandResolver {
    categories: HashMap<String, Vec<String>>,
}

impl Default for CommandResolver {
    fn default() -> Self {
        let mut resolver = Self::empty();
        for (category, commands) in DEFAULT_VOCABULARY {
            for command in *commands {
                resolver.add_command(category, command);
            }
        }
        resolver
    }
}

impl CommandResolver {
    /// Resolver with the built-in vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver without any categories.
    pub fn empty() -> Self {
        Self {
            categories: HashMap::new(),
        }
    }

    /// Registers a command, creating the category if needed. Duplicates are ignored.
    pub fn add_command(&mut self, category: &str, command: &str) {
        let commands = self.categories.entry(category.to_string()).or_default();
        if !commands.iter().any(|c| c == command) {
            commands.push(command.to_string());
        }
    }

    /// Commands of a category in declared order.
    pub fn commands(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn is_command(&self, category: &str, command: &str) -> bool {
        self.commands(category)
            .is_some_and(|commands| commands.iter().any(|c| c.eq_ignore_ascii_case(command)))
    }

    fn matches<'a>(commands: &'a [String], partial: &str) -> Vec<&'a String> {
        let partial = partial.to_lowercase();
        commands
            .iter()
            .filter(|c| c.to_lowercase().starts_with(&partial))
            .collect()
    }

    pub fn resolve(&self, category: &str, partial: &str) -> Result<String, ResolveError> {
        let commands = self
            .commands(category)
            .ok_or_else(|| ResolveError::UnknownCategory(category.to_string()))?;
        if partial.is_empty() {
            return Err(ResolveError::EmptyCommand);
        }

        let mut matches = Self::matches(commands, partial);
        match matches.len() {
            0 => Err(ResolveError::UnknownCommand {
                input: partial.to_string(),
                available: commands.to_vec(),
            }),
            1 => Ok(matches[0].clone()),
            _ => {
                matches.sort();
                Err(ResolveError::AmbiguousCommand {
                    input: partial.to_string(),
                    matches: matches.into_iter().cloned().collect(),
                })
            }
        }
    }

    /// Shortest prefix of `command` that no other command in the category shares.
    pub fn minimum_prefix(&self, category: &str, command: &str) -> Result<String, ResolveError> {
        let commands = self
            .commands(category)
            .ok_or_else(|| ResolveError::UnknownCategory(category.to_string()))?;
        let stored = commands
            .iter()
            .find(|c| c.eq_ignore_ascii_case(command))
            .ok_or_else(|| ResolveError::NotFound {
                category: category.to_string(),
                command: command.to_string(),
            })?;

        for (end, _) in stored
            .char_indices()
            .skip(1)
            .chain(std::iter::once((stored.len(), ' ')))
        {
            let prefix = &stored[..end];
            if Self::matches(commands, prefix).len() == 1 {
                return Ok(prefix.to_string());
            }
        }
        Ok(stored.clone())
    }

    /// Best-effort completion list. `None` for an unknown category.
    pub fn suggest(&self, category: &str, partial: &str) -> Option<Vec<String>> {
        let commands = self.commands(category)?;
        if partial.is_empty() {
            return Some(commands.to_vec());
        }
        let mut matches: Vec<String> = Self::matches(commands, partial)
            .into_iter()
            .cloned()
            .collect();
        matches.sort();
        Some(matches)
    }

    /// Checks `name` against the collections a context allows.
    pub fn validate_collection(name: &str, available: &[String]) -> Result<(), ResolveError> {
        if name.is_empty() {
            return Err(ResolveError::Required);
        }
        if available.iter().any(|c| c == name) {
            return Ok(());
        }
        Err(ResolveError::NotConfigured {
            name: name.to_string(),
            available: available.to_vec(),
        })
    }

    /// Rewrites abbreviated command tokens of a raw argument vector.
    ///
    /// Options are copied unchanged. The token following an option listed in
    /// `value_options` is treated as that option's value. Positional tokens
    /// that are not command names (context names, record ids, collection
    /// names) are never rewritten.
    pub fn expand_args<I, T>(&self, args: I, value_options: &[&str]) -> Result<Vec<String>, ResolveError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        #[derive(Clone, Copy)]
        enum Expect<'a> {
            Action(&'a str),
            CollectionName,
            Done,
        }

        let mut args = args.into_iter().map(Into::into);
        let mut expanded: Vec<String> = args.next().into_iter().collect();
        let mut expect = Expect::Action(CATEGORY_ROOT);
        let mut pending_value = false;
        let mut passthrough = false;

        for arg in args {
            if passthrough || pending_value {
                pending_value = false;
                expanded.push(arg);
                continue;
            }
            if arg == "--" {
                passthrough = true;
                expanded.push(arg);
                continue;
            }
            if arg.starts_with('-') && arg.len() > 1 {
                pending_value = !arg.contains('=') && value_options.contains(&arg.as_str());
                expanded.push(arg);
                continue;
            }

            expect = match expect {
                Expect::Action(category) => {
                    let command = self.resolve(category, &arg)?;
                    trace!("Resolved '{}' in '{}' to '{}'", arg, category, command);
                    let next = match (category, command.as_str()) {
                        (CATEGORY_ROOT, "context") => Expect::Action(CATEGORY_CONTEXT),
                        (CATEGORY_ROOT, "collections") => Expect::CollectionName,
                        (CATEGORY_ROOT, "auth") => Expect::Action(CATEGORY_AUTH),
                        (CATEGORY_ROOT, "backup") => Expect::Action(CATEGORY_BACKUP),
                        (CATEGORY_CONTEXT, "collections") => {
                            Expect::Action(CATEGORY_CONTEXT_COLLECTIONS)
                        }
                        _ => Expect::Done,
                    };
                    expanded.push(command);
                    next
                }
                Expect::CollectionName => {
                    expanded.push(arg);
                    Expect::Action(CATEGORY_COLLECTIONS)
                }
                Expect::Done => {
                    expanded.push(arg);
                    Expect::Done
                }
            };
        }

        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUE_OPTIONS: &[&str] = &["-o", "--output", "--url"];

    fn expand(args: &[&str]) -> Result<Vec<String>, ResolveError> {
        CommandResolver::new().expand_args(args.iter().copied(), VALUE_OPTIONS)
    }

    #[test]
    fn test_resolve_unique_prefix() {
        let resolver = CommandResolver::new();
        assert_eq!(resolver.resolve("context", "cr").unwrap(), "create");
        assert_eq!(resolver.resolve("context", "sel").unwrap(), "select");
        assert_eq!(resolver.resolve("context", "list").unwrap(), "list");
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let resolver = CommandResolver::new();
        assert_eq!(resolver.resolve("context", "SELECT").unwrap(), "select");
        assert_eq!(resolver.resolve("root", "Con").unwrap(), "context");
    }

    #[test]
    fn test_ambiguous_matches_are_sorted() {
        let mut resolver = CommandResolver::empty();
        resolver.add_command("context", "create");
        resolver.add_command("context", "collections");

        let err = resolver.resolve("context", "c").unwrap_err();
        assert_eq!(
            err,
            ResolveError::AmbiguousCommand {
                input: "c".into(),
                matches: vec!["collections".into(), "create".into()],
            }
        );
        assert_eq!(
            err.to_string(),
            "ambiguous command 'c'. Possible matches: collections, create"
        );
        assert_eq!(resolver.resolve("context", "cr").unwrap(), "create");
    }

    #[test]
    fn test_unknown_command_lists_vocabulary_in_declared_order() {
        let resolver = CommandResolver::new();
        let err = resolver.resolve("context", "zzz").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown command 'zzz'. Available commands: create, list, select, show, delete, collections"
        );
    }

    #[test]
    fn test_resolve_errors() {
        let resolver = CommandResolver::new();
        assert_eq!(
            resolver.resolve("nope", "x"),
            Err(ResolveError::UnknownCategory("nope".into()))
        );
        assert_eq!(
            resolver.resolve("context", ""),
            Err(ResolveError::EmptyCommand)
        );
    }

    #[test]
    fn test_minimum_prefix() {
        let resolver = CommandResolver::new();
        assert_eq!(resolver.minimum_prefix("context", "select").unwrap(), "se");
        assert_eq!(resolver.minimum_prefix("context", "show").unwrap(), "sh");
        assert_eq!(resolver.minimum_prefix("context", "list").unwrap(), "l");
        assert_eq!(resolver.minimum_prefix("context", "create").unwrap(), "cr");
        assert_eq!(resolver.minimum_prefix("context", "Delete").unwrap(), "d");
        assert!(matches!(
            resolver.minimum_prefix("context", "frobnicate"),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn test_minimum_prefix_of_command_shadowed_by_longer_one() {
        let mut resolver = CommandResolver::empty();
        resolver.add_command("x", "get");
        resolver.add_command("x", "getall");
        assert_eq!(resolver.minimum_prefix("x", "getall").unwrap(), "geta");
        assert_eq!(resolver.minimum_prefix("x", "get").unwrap(), "get");
    }

    #[test]
    fn test_validate_collection() {
        let available = vec!["posts".to_string(), "users".to_string()];
        assert!(CommandResolver::validate_collection("posts", &available).is_ok());

        let err = CommandResolver::validate_collection("comments", &available).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ResolveError::NotConfigured { .. }));
        assert!(message.contains("comments"));
        assert!(message.contains("posts, users"));
        assert!(message.contains("pb context collections add comments"));

        let message = CommandResolver::validate_collection("posts", &[])
            .unwrap_err()
            .to_string();
        assert!(message.contains("No collections configured"));
        assert!(message.contains("pb context collections add posts"));

        assert_eq!(
            CommandResolver::validate_collection("", &available),
            Err(ResolveError::Required)
        );
    }

    #[test]
    fn test_suggest() {
        let resolver = CommandResolver::new();
        assert_eq!(
            resolver.suggest("context", "s").unwrap(),
            vec!["select", "show"]
        );
        assert_eq!(
            resolver.suggest("context", "").unwrap(),
            vec!["create", "list", "select", "show", "delete", "collections"]
        );
        assert!(resolver.suggest("context", "zz").unwrap().is_empty());
        assert!(resolver.suggest("nope", "a").is_none());
    }

    #[test]
    fn test_add_command_ignores_duplicates() {
        let mut resolver = CommandResolver::new();
        resolver.add_command("auth", "pb");
        resolver.add_command("auth", "oauth");
        assert_eq!(resolver.commands("auth").unwrap(), ["pb", "oauth"]);
        assert!(resolver.is_command("auth", "OAuth"));
    }

    #[test]
    fn test_expand_context_commands() {
        assert_eq!(
            expand(&["pb", "con", "sel", "dev"]).unwrap(),
            vec!["pb", "context", "select", "dev"]
        );
        assert_eq!(
            expand(&["pb", "con", "col", "a", "posts", "users"]).unwrap(),
            vec!["pb", "context", "collections", "add", "posts", "users"]
        );
        assert_eq!(
            expand(&["pb", "context", "cr", "li", "--url", "http://x"]).unwrap(),
            vec!["pb", "context", "create", "li", "--url", "http://x"]
        );
    }

    #[test]
    fn test_expand_keeps_collection_name() {
        assert_eq!(
            expand(&["pb", "coll", "posts", "l", "--limit", "5"]).unwrap(),
            vec!["pb", "collections", "posts", "list", "--limit", "5"]
        );
        assert_eq!(
            expand(&["pb", "coll", "create", "cr"]).unwrap(),
            vec!["pb", "collections", "create", "create"]
        );
    }

    #[test]
    fn test_expand_skips_option_values() {
        assert_eq!(
            expand(&["pb", "-o", "table", "con", "l"]).unwrap(),
            vec!["pb", "-o", "table", "context", "list"]
        );
        assert_eq!(
            expand(&["pb", "--output=yaml", "ba", "li"]).unwrap(),
            vec!["pb", "--output=yaml", "backup", "list"]
        );
        assert_eq!(
            expand(&["pb", "--help"]).unwrap(),
            vec!["pb", "--help"]
        );
    }

    #[test]
    fn test_expand_reports_resolver_errors() {
        assert!(matches!(
            expand(&["pb", "c"]),
            Err(ResolveError::AmbiguousCommand { .. })
        ));
        assert!(matches!(
            expand(&["pb", "context", "zzz"]),
            Err(ResolveError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn test_expand_stops_after_terminal_commands() {
        assert_eq!(
            expand(&["pb", "h", "con"]).unwrap(),
            vec!["pb", "help", "con"]
        );
        assert_eq!(expand(&["pb", "v"]).unwrap(), vec!["pb", "version"]);
        assert_eq!(
            expand(&["pb", "a", "p", "-e", "x@y"]).unwrap(),
            vec!["pb", "auth", "pb", "-e", "x@y"]
        );
    }
}
