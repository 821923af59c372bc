//! Built-in marshaller plugins.
//!
//! Registration order is fixed: `ros`, `corba`, `mqueue`, `type_info`,
//! `typelib`.

pub mod corba;
pub mod mqueue;
pub mod ros;
pub mod type_info;
pub mod typelib;

pub use corba::CorbaPlugin;
pub use mqueue::MQueuePlugin;
pub use ros::RosPlugin;
pub use type_info::TypeInfoPlugin;
pub use typelib::TypelibPlugin;

use crate::error::{ComposeError, Result};
use crate::plugin::{Contribution, MarshallerPlugin, TypeInfo, TypekitInput};

/// The built-in plugins, in registration order.
pub fn builtin() -> Vec<Box<dyn MarshallerPlugin>> {
    vec![
        Box::new(RosPlugin),
        Box::new(CorbaPlugin),
        Box::new(MQueuePlugin),
        Box::new(TypeInfoPlugin),
        Box::new(TypelibPlugin),
    ]
}

/// Header line of every generated file.
pub(crate) fn banner(plugin: &str, typekit: &TypekitInput) -> String {
    format!(
        "/* Generated by the {plugin} plugin for the {} typekit. Do not edit. */\n",
        typekit.name
    )
}

/// Identifier for `ty`, or a plugin error if it has none.
pub(crate) fn identifier(plugin: &str, ty: &TypeInfo) -> Result<String> {
    let name = ty.method_name();
    if name.is_empty() {
        return Err(ComposeError::plugin(
            plugin,
            format!("cannot derive a C++ identifier for type {}", ty.name),
        ));
    }
    Ok(name)
}

/// Append `line` and a newline to `out`.
pub(crate) fn push_line(out: &mut String, line: impl AsRef<str>) {
    out.push_str(line.as_ref());
    out.push('\n');
}

/// Build fragment declaring a transport library over `sources`.
pub(crate) fn transport_library(
    typekit: &TypekitInput,
    transport: &str,
    sources: &[&str],
) -> Contribution {
    let target = format!("{}-transport-{transport}-${{OROCOS_TARGET}}", typekit.name);
    let mut text = format!("# {transport} transport of the {} typekit\n", typekit.name);
    push_line(&mut text, format!("add_library({target} SHARED"));
    for source in sources {
        push_line(&mut text, format!("    {source}"));
    }
    text.push_str(")\n");
    push_line(
        &mut text,
        format!(
            "target_link_libraries({target} {}-typekit-${{OROCOS_TARGET}})",
            typekit.name
        ),
    );
    push_line(
        &mut text,
        format!("install(TARGETS {target} LIBRARY DESTINATION lib/orocos${{OROCOS_PKG_DIR}}/types)"),
    );
    Contribution::build(text)
}
