//! Built-in global initializers.

pub mod qt;

use crate::error::Result;
use crate::initializer::GlobalInitializer;

/// The built-in initializers, in registration order.
pub fn builtin() -> Result<Vec<GlobalInitializer>> {
    Ok(vec![qt::qt4()?, qt::qt5()?])
}
