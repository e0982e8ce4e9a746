//! Key templates for Keepsake.
//!
//! A key template such as `flows/{flow}/{task}-{run}.bin` is rendered against
//! a set of named [`Params`] to produce a [`StorageKey`]. Rendering depends on
//! nothing but the template and the parameters, so a caller can compute the
//! address of a result before the result exists (for example to check a
//! cache hit) and get the same key on every re-run.
//!
//! # Syntax
//!
//! - `{name}` is replaced by the parameter `name`
//! - `{{` and `}}` produce literal braces
//! - names are ASCII alphanumerics plus `_`, `-` and `.`
//!
//! A placeholder with no matching parameter is an error, never passed
//! through. Parameters the template does not mention are ignored.
//!
//! [`StorageKey`]: keepsake_types::StorageKey

pub mod error;
pub mod params;
pub mod template;

pub use error::{TemplateError, TemplateResult};
pub use params::Params;
pub use template::{KeyTemplate, Segment};
