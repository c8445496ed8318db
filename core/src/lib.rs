//! Command tree definitions and value types for the argtree parser.
//!
//! This crate defines everything the parser consumes:
//!
//! - [`CommandTree`] — a flat arena of [`Command`]s, [`Argument`]s and
//!   [`Group`]s linked by [`CommandId`], [`ArgumentId`] and [`GroupId`].
//! - [`ArgType`] — the capability set of an argument's value type (value
//!   count, usage count, conversion), with built-ins such as [`IntType`],
//!   [`CounterType`] and [`TupleOf`].
//! - [`Range`], [`Value`], [`ErrorLevel`] and [`PrefixChar`] — small shared
//!   vocabulary types.
//!
//! Validation ([`validate_tree`]) catches duplicate names, reserved
//! characters and unbindable positional arguments. [`CommandDefinition`]
//! describes a tree as serializable data.
//!
//! # Example
//!
//! ```
//! use argtree_core::*;
//!
//! let mut tree = CommandTree::new(Command::new("mycli"));
//! let root = tree.root();
//! tree.add_argument(
//!     root,
//!     Argument::new("what", TupleOf::new(StringType, Range::between(1, 3)))
//!         .with_description("Things to print"),
//! );
//! let run = tree.add_sub_command(root, Command::new("run"));
//! tree.add_argument(run, Argument::new("port", IntType::new()).required());
//!
//! assert_eq!(tree.find_sub_command(root, "run"), Some(run));
//! assert!(tree.find_argument(root, "--what").is_some());
//! assert!(validate_tree(&tree).is_empty());
//! ```

mod arg_type;
mod definition;
mod level;
mod range;
mod tree;
mod validate;
mod value;

pub use arg_type::{
    ArgType, BoolType, CounterType, EnumType, FloatType, IntType, KeyValueType, StringType,
    TupleOf, TypeError, TypeErrors,
};
pub use definition::{
    ArgumentDefinition, CommandDefinition, DefinitionError, GroupDefinition, TypeDefinition,
};
pub use level::ErrorLevel;
pub use range::Range;
pub use tree::{Argument, ArgumentId, Command, CommandId, CommandTree, Group, GroupId, PrefixChar};
pub use validate::{TreeError, validate_tree};
pub use value::{Value, ValueConversionError};
