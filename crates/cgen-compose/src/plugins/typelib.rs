use crate::error::Result;
use crate::plugin::{Contribution, MarshallerPlugin, TypekitInput};
use crate::plugins::{banner, identifier, push_line, transport_library};

/// Typelib marshalling: maps every exported type to its typelib
/// description, loaded from the typekit's registry at runtime.
pub struct TypelibPlugin;

impl MarshallerPlugin for TypelibPlugin {
    fn name(&self) -> &str {
        "typelib"
    }

    fn contribute(&self, typekit: &TypekitInput) -> Result<Vec<Contribution>> {
        let mut text = banner(self.name(), typekit);
        text.push_str("#include <rtt/typelib/TypelibMarshaller.hpp>\n\n");
        push_line(
            &mut text,
            format!(
                "bool orogen_typekits::{}TypelibTransportPlugin::registerTransport(std::string type_name, RTT::types::TypeInfo* ti)\n{{",
                typekit.name
            ),
        );
        push_line(&mut text, "    if (!m_registry) return false;");
        for ty in typekit.exported() {
            let ident = identifier(self.name(), ty)?;
            push_line(
                &mut text,
                format!(
                    "    if (\"{}\" == type_name)\n        return ti->addProtocol(orogen_transports::TYPELIB_MARSHALLER_ID, {ident}_TypelibMarshaller(*m_registry));",
                    ty.name
                ),
            );
        }
        text.push_str("    return false;\n}\n");

        Ok(vec![
            Contribution::source("transports/typelib/TransportPlugin.cpp", text),
            transport_library(typekit, self.name(), &["transports/typelib/TransportPlugin.cpp"]),
        ])
    }
}
