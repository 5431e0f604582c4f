//! Command registry.
//!
//! Commands are a first-match specialization of the message registry. They
//! are checked before the message-content entries of the same category: when
//! a command matches, the content entries are not evaluated.
//!
//! # Registration
//!
//! [`CommandRegistry::command`] returns a [`CommandBuilder`]. Its options are
//! only reachable before the entry is registered: [`CommandBuilder::register`]
//! consumes the builder, and dropping an unregistered builder registers it.
//!
//! ```rust,ignore
//! builder.command("ban", on_ban).aliases(["b"]).triggers(['!']).register();
//! builder.command("help", on_help); // registered when the builder drops
//! ```
//!
//! `triggers` adds to the trigger set, which starts as `{'/'}`. Use
//! `clear_triggers()` first to replace it.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::context::Context;
use crate::error::{ExtractError, ExtractResult};
use crate::extractor::FromContext;
use crate::handler::{BoxedHandler, Handler, into_handler};
use courier_core::predicate::CommandText;
use courier_core::{Category, CommandPattern, DispatchError, HandlerFailure, Message};

// ============================================================================
// Command Extractor
// ============================================================================

/// The command that matched the current update.
///
/// Stored in the context by the command registry right before the matched
/// handler runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn echo(cmd: CommandArgs) {
///     println!("/{} called with {:?}", cmd.name, cmd.args);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArgs {
    /// Primary name of the registered command.
    pub name: String,
    /// The name as typed, which may be an alias.
    pub invoked_as: String,
    /// The trigger character used.
    pub trigger: char,
    /// The `@username` suffix, if the user typed one.
    pub mention: Option<String>,
    /// Text after the command token, trimmed.
    pub args: String,
}

impl CommandArgs {
    fn from_parsed(name: &str, parsed: &CommandText<'_>) -> Self {
        Self {
            name: name.to_string(),
            invoked_as: parsed.name.to_string(),
            trigger: parsed.trigger,
            mention: parsed.mention.map(str::to_string),
            args: parsed.args.to_string(),
        }
    }

    /// Arguments split on whitespace.
    pub fn split_args(&self) -> impl Iterator<Item = &str> {
        self.args.split_whitespace()
    }
}

impl FromContext for CommandArgs {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        ctx.get_state::<CommandArgs>()
            .ok_or(ExtractError::MissingCommand)
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Clone)]
struct CommandEntry {
    pattern: CommandPattern,
    handler: BoxedHandler,
}

/// Registered commands, in registration order.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts registering a command.
    pub fn command<F, T>(&mut self, name: &str, handler: F) -> CommandBuilder<'_>
    where
        F: Handler<T>,
        T: 'static,
    {
        CommandBuilder {
            registry: self,
            entry: Some(CommandEntry {
                pattern: CommandPattern::new(name),
                handler: into_handler(handler),
            }),
        }
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no command is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Patterns of the registered commands, in order.
    pub fn patterns(&self) -> impl Iterator<Item = &CommandPattern> {
        self.entries.iter().map(|e| &e.pattern)
    }

    /// Runs the first command matching `message`.
    ///
    /// Returns `Ok(false)` when no command matched.
    pub(crate) async fn dispatch(
        &self,
        category: Category,
        message: &Message,
        ctx: &Arc<Context>,
    ) -> Result<bool, DispatchError> {
        let Some(text) = message.text.as_deref() else {
            return Ok(false);
        };

        let matched = self.entries.iter().find_map(|entry| {
            if !entry.pattern.accepts_category(category) {
                return None;
            }
            entry
                .pattern
                .match_text(text, ctx.identity())
                .map(|parsed| (entry, parsed))
        });

        let Some((entry, parsed)) = matched else {
            trace!(%category, "No command matched");
            return Ok(false);
        };

        let name = entry.pattern.name();
        debug!(command = name, trigger = %parsed.trigger, "Command matched");
        ctx.set_state(CommandArgs::from_parsed(name, &parsed));

        (entry.handler)(Arc::clone(ctx))
            .await
            .map_err(|source| {
                DispatchError::Handler(HandlerFailure {
                    category,
                    handler: format!("command:{name}"),
                    source,
                })
            })?;
        Ok(true)
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.patterns().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Configures one command before it is registered.
pub struct CommandBuilder<'a> {
    registry: &'a mut CommandRegistry,
    entry: Option<CommandEntry>,
}

impl CommandBuilder<'_> {
    fn pattern_mut(&mut self) -> Option<&mut CommandPattern> {
        self.entry.as_mut().map(|e| &mut e.pattern)
    }

    /// Adds trigger characters to the accepted set.
    pub fn triggers(mut self, triggers: impl IntoIterator<Item = char>) -> Self {
        if let Some(p) = self.pattern_mut() {
            p.add_triggers(triggers);
        }
        self
    }

    /// Empties the trigger set, including the default `/`.
    pub fn clear_triggers(mut self) -> Self {
        if let Some(p) = self.pattern_mut() {
            p.clear_triggers();
        }
        self
    }

    /// Adds alternative names. Normalized like the primary name.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(p) = self.pattern_mut() {
            p.add_aliases(aliases);
        }
        self
    }

    /// Also match edited messages.
    pub fn allow_edited(mut self) -> Self {
        if let Some(p) = self.pattern_mut() {
            p.set_allow_edited(true);
        }
        self
    }

    /// Also match channel posts.
    pub fn allow_channel(mut self) -> Self {
        if let Some(p) = self.pattern_mut() {
            p.set_allow_channel(true);
        }
        self
    }

    /// Registers the command.
    pub fn register(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        let Some(entry) = self.entry.take() else {
            return;
        };

        if entry.pattern.triggers().is_empty() {
            warn!(
                command = entry.pattern.name(),
                "Command registered with an empty trigger set; it can never match"
            );
        }
        if entry.pattern.name().is_empty() {
            warn!("Command registered with an empty name; it can never match");
        }

        debug!(
            command = entry.pattern.name(),
            aliases = entry.pattern.names().len() - 1,
            triggers = ?entry.pattern.triggers(),
            "Command registered"
        );
        self.registry.entries.push(entry);
    }
}

impl Drop for CommandBuilder<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
