//! Undoable commands.
//!
//! A [`CommandStack`] maps command names to [`CommandHandler`]s and records
//! every executed command so it can be undone and redone. Commands executed
//! while another command runs (typically from a [`CommandInterceptor`]) are
//! recorded in the same undo entry: undo reverts the whole entry in reverse
//! order, redo re-executes it in order without running interceptors again.
//!
//! The stack is synchronous. A command's `execute` or `revert` runs to
//! completion before the next one starts.

use std::{collections::HashMap, fmt, rc::Rc};

use log::{debug, info, warn};

use crate::{
    cmd::SubProcessContext, error::SubplaneError, modeler::Modeler, toggle::ToggleCollapseContext,
};

/// Per-invocation state of a command.
#[derive(Debug, Clone)]
pub enum CommandContext {
    ToggleCollapse(ToggleCollapseContext),
    SubProcess(SubProcessContext),
}

impl CommandContext {
    /// Returns the sub-process context, or a mismatch error naming `command`.
    pub(crate) fn sub_process_mut(
        &mut self,
        command: &str,
    ) -> Result<&mut SubProcessContext, SubplaneError> {
        match self {
            Self::SubProcess(context) => Ok(context),
            Self::ToggleCollapse(_) => Err(SubplaneError::ContextMismatch {
                command: command.to_string(),
            }),
        }
    }

    /// Returns the toggle context, or a mismatch error naming `command`.
    pub(crate) fn toggle_mut(
        &mut self,
        command: &str,
    ) -> Result<&mut ToggleCollapseContext, SubplaneError> {
        match self {
            Self::ToggleCollapse(context) => Ok(context),
            Self::SubProcess(_) => Err(SubplaneError::ContextMismatch {
                command: command.to_string(),
            }),
        }
    }
}

impl From<ToggleCollapseContext> for CommandContext {
    fn from(context: ToggleCollapseContext) -> Self {
        Self::ToggleCollapse(context)
    }
}

impl From<SubProcessContext> for CommandContext {
    fn from(context: SubProcessContext) -> Self {
        Self::SubProcess(context)
    }
}

/// Executes and reverts one kind of command.
pub trait CommandHandler {
    /// Applies the command. Called again with the same context on redo.
    ///
    /// # Errors
    ///
    /// Returns an error for integration mistakes such as a context of the
    /// wrong kind.
    fn execute(
        &self,
        context: &mut CommandContext,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError>;

    /// Undoes a previous [`CommandHandler::execute`] with the same context.
    ///
    /// # Errors
    ///
    /// See [`CommandHandler::execute`].
    fn revert(&self, context: &mut CommandContext, modeler: &mut Modeler)
    -> Result<(), SubplaneError>;
}

/// Hooks into commands after they executed.
pub trait CommandInterceptor {
    /// Called after `command` executed with `context`. May execute further
    /// commands on `stack`; they join the current undo entry.
    ///
    /// # Errors
    ///
    /// Errors abort the surrounding command.
    fn post_executed(
        &self,
        command: &str,
        context: &CommandContext,
        stack: &mut CommandStack,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError>;
}

struct Action {
    command: String,
    context: CommandContext,
}

struct RegisteredInterceptor {
    commands: Vec<String>,
    priority: i32,
    interceptor: Rc<dyn CommandInterceptor>,
}

/// Registry of command handlers plus the undo and redo history.
#[derive(Default)]
pub struct CommandStack {
    handlers: HashMap<String, Rc<dyn CommandHandler>>,
    interceptors: Vec<RegisteredInterceptor>,
    undo_stack: Vec<Vec<Action>>,
    redo_stack: Vec<Vec<Action>>,
    current: Option<Vec<Action>>,
}

impl CommandStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `command`, replacing any previous handler.
    pub fn register(&mut self, command: &str, handler: Rc<dyn CommandHandler>) {
        debug!(command; "Registered command handler");
        self.handlers.insert(command.to_string(), handler);
    }

    /// Registers `interceptor` for `commands`. Higher priorities run first.
    pub fn register_interceptor(
        &mut self,
        commands: &[&str],
        priority: i32,
        interceptor: Rc<dyn CommandInterceptor>,
    ) {
        let position = self
            .interceptors
            .iter()
            .position(|registered| registered.priority < priority)
            .unwrap_or(self.interceptors.len());
        self.interceptors.insert(
            position,
            RegisteredInterceptor {
                commands: commands.iter().map(ToString::to_string).collect(),
                priority,
                interceptor,
            },
        );
    }

    /// Executes `command` and records it for undo.
    ///
    /// # Errors
    ///
    /// Returns [`SubplaneError::UnknownCommand`] for unregistered commands
    /// and propagates handler and interceptor errors. When the outermost
    /// command fails, everything it executed so far is reverted.
    pub fn execute(
        &mut self,
        command: &str,
        context: impl Into<CommandContext>,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError> {
        let handler = self.handler(command)?;
        let outermost = self.current.is_none();
        if outermost {
            self.current = Some(Vec::new());
        }

        let result = self.execute_nested(command, context.into(), handler, modeler);

        if !outermost {
            return result;
        }

        let actions = self.current.take().unwrap_or_default();
        match result {
            Ok(()) => {
                info!(command, actions = actions.len(); "Executed command");
                self.undo_stack.push(actions);
                self.redo_stack.clear();
                Ok(())
            }
            Err(err) => {
                warn!(command, err:%; "Command failed, rolling back");
                self.revert_actions(actions, modeler);
                Err(err)
            }
        }
    }

    /// Reverts the most recent undo entry. Returns `false` if there is none.
    ///
    /// The entry always moves to the redo stack. An action that fails to
    /// revert is logged and skipped so the remaining actions still run.
    ///
    /// # Errors
    ///
    /// Returns the first handler error.
    pub fn undo(&mut self, modeler: &mut Modeler) -> Result<bool, SubplaneError> {
        let Some(mut actions) = self.undo_stack.pop() else {
            return Ok(false);
        };

        let mut result = Ok(true);
        for action in actions.iter_mut().rev() {
            let reverted = self
                .handler(&action.command)
                .and_then(|handler| handler.revert(&mut action.context, modeler));
            match reverted {
                Ok(()) => debug!(command = action.command; "Reverted command"),
                Err(err) => {
                    warn!(command = action.command, err:%; "Undo failed");
                    if result.is_ok() {
                        result = Err(err);
                    }
                }
            }
        }
        self.redo_stack.push(actions);
        result
    }

    /// Re-executes the most recently undone entry. Returns `false` if there
    /// is none.
    ///
    /// The entry always moves back to the undo stack. An action that fails
    /// to execute is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns the first handler error.
    pub fn redo(&mut self, modeler: &mut Modeler) -> Result<bool, SubplaneError> {
        let Some(mut actions) = self.redo_stack.pop() else {
            return Ok(false);
        };

        let mut result = Ok(true);
        for action in &mut actions {
            let executed = self
                .handler(&action.command)
                .and_then(|handler| handler.execute(&mut action.context, modeler));
            match executed {
                Ok(()) => debug!(command = action.command; "Re-executed command"),
                Err(err) => {
                    warn!(command = action.command, err:%; "Redo failed");
                    if result.is_ok() {
                        result = Err(err);
                    }
                }
            }
        }
        self.undo_stack.push(actions);
        result
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drops the undo and redo history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn handler(&self, command: &str) -> Result<Rc<dyn CommandHandler>, SubplaneError> {
        self.handlers
            .get(command)
            .cloned()
            .ok_or_else(|| SubplaneError::UnknownCommand(command.to_string()))
    }

    fn execute_nested(
        &mut self,
        command: &str,
        mut context: CommandContext,
        handler: Rc<dyn CommandHandler>,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError> {
        handler.execute(&mut context, modeler)?;

        // Nested commands land after this slot; the action itself goes first.
        let slot = self.current.as_ref().map_or(0, Vec::len);

        let interceptors: Vec<Rc<dyn CommandInterceptor>> = self
            .interceptors
            .iter()
            .filter(|registered| registered.commands.iter().any(|c| c == command))
            .map(|registered| Rc::clone(&registered.interceptor))
            .collect();

        let mut result = Ok(());
        for interceptor in interceptors {
            result = interceptor.post_executed(command, &context, self, modeler);
            if result.is_err() {
                break;
            }
        }

        if let Some(current) = self.current.as_mut() {
            current.insert(
                slot,
                Action {
                    command: command.to_string(),
                    context,
                },
            );
        }
        result
    }

    fn revert_actions(&self, mut actions: Vec<Action>, modeler: &mut Modeler) {
        for action in actions.iter_mut().rev() {
            let reverted = self
                .handler(&action.command)
                .and_then(|handler| handler.revert(&mut action.context, modeler));
            if let Err(err) = reverted {
                warn!(command = action.command, err:%; "Rollback failed");
            }
        }
    }
}

impl fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("handlers", &self.handlers.len())
            .field("interceptors", &self.interceptors.len())
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .finish()
    }
}
