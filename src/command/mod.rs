//! Command layer: input-bound units of work for one controller context.
//!
//! A [`Command`] has a stable name, the axis and button parameter names the
//! input layer binds it by, an ordered list of selectable options and an
//! `execute` entry point that takes an option index. The raw-input layer
//! resolves an axis position or a button press to an index and calls
//! [`Command::execute`]; presentation layers list [`Command::options`].
//!
//! ```text
//! input event ──► Command::execute(index)
//!                    ├── ControlCommand ──► CameraTransport
//!                    └── CameraSelectCommand ──► ControllerContext::select
//!                                                   └──► BroadcastRegistry
//! ```

pub mod assembler;
pub mod control;
pub mod select_camera;

use std::fmt;

use serde::Serialize;

use crate::domain::Listeners;
use crate::error::DispatchError;

pub use assembler::CommandAssembler;
pub use control::ControlCommand;
pub use select_camera::CameraSelectCommand;

/// One selectable value of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOption {
    /// Display label.
    pub label: String,
    /// Value to pass to [`Command::execute`].
    pub index: i32,
}

impl CommandOption {
    /// Creates an option.
    #[must_use]
    pub fn new(label: impl Into<String>, index: i32) -> Self {
        Self {
            label: label.into(),
            index,
        }
    }
}

/// Why a command's option list changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsChangeReason {
    /// The context was bound to a different roster.
    RosterReplaced,
    /// Cameras were added, removed or reordered.
    RosterChanged,
    /// A camera label changed.
    CameraRenamed,
}

/// Local notice that [`Command::options`] must be re-read.
///
/// This never leaves the process; it exists so presentation layers can
/// refresh labels and indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionsChanged {
    /// Name of the command whose options changed.
    pub command: &'static str,
    /// What triggered the change.
    pub reason: OptionsChangeReason,
}

/// Input-bound unit of work.
pub trait Command: Send + Sync + fmt::Debug {
    /// Human-readable command name.
    fn command_name(&self) -> &'static str;

    /// Name of the parameter an axis binding drives.
    fn axis_parameter_name(&self) -> &'static str;

    /// Name of the parameter a button binding drives.
    fn button_parameter_name(&self) -> &'static str;

    /// Current options, in index order. Never fails; may be empty.
    fn options(&self) -> Vec<CommandOption>;

    /// Applies the option at `value`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidCommandValue`] if `value` is not in
    /// `0..options().len()`; nothing is changed in that case. Other
    /// variants come from the collaborator the command drives.
    fn execute(&self, value: i32) -> Result<(), DispatchError>;

    /// Listener registry for option list changes, for commands whose
    /// options are not fixed.
    fn options_changed(&self) -> Option<&Listeners<OptionsChanged>> {
        None
    }
}

/// Resolves `value` to an element of `items`, or reports it as out of range
/// for `command`.
pub(crate) fn option_at<'a, T>(
    command: &'static str,
    items: &'a [T],
    value: i32,
) -> Result<&'a T, DispatchError> {
    usize::try_from(value)
        .ok()
        .and_then(|index| items.get(index))
        .ok_or(DispatchError::InvalidCommandValue {
            command,
            value,
            count: items.len(),
        })
}

/// Projects labels to options, index = position.
pub(crate) fn project_options<I, S>(labels: I) -> Vec<CommandOption>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels
        .into_iter()
        .zip(0_i32..)
        .map(|(label, index)| CommandOption::new(label, index))
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn option_at_accepts_bounds() {
        let items = ["a", "b", "c"];
        assert!(matches!(option_at("T", &items, 0), Ok(&"a")));
        assert!(matches!(option_at("T", &items, 2), Ok(&"c")));
    }

    #[test]
    fn option_at_rejects_negative_and_past_end() {
        let items = ["a", "b"];
        for value in [-1, 2, i32::MIN, i32::MAX] {
            let Err(DispatchError::InvalidCommandValue {
                command,
                value: got,
                count,
            }) = option_at("T", &items, value)
            else {
                panic!("expected out-of-range for {value}");
            };
            assert_eq!(command, "T");
            assert_eq!(got, value);
            assert_eq!(count, 2);
        }
    }

    #[test]
    fn option_at_on_empty_always_fails() {
        let items: [u8; 0] = [];
        assert!(option_at("T", &items, 0).is_err());
    }

    #[test]
    fn project_options_numbers_in_order() {
        let options = project_options(["x", "y"]);
        assert_eq!(
            options,
            vec![CommandOption::new("x", 0), CommandOption::new("y", 1)]
        );
    }
}
