use crate::error::Result;
use crate::plugin::{Contribution, MarshallerPlugin, TypekitInput};
use crate::plugins::{banner, identifier, push_line, transport_library};

/// POSIX message-queue transport. Marshalling goes through typelib, so the
/// plugin only registers the exported types.
pub struct MQueuePlugin;

impl MarshallerPlugin for MQueuePlugin {
    fn name(&self) -> &str {
        "mqueue"
    }

    fn contribute(&self, typekit: &TypekitInput) -> Result<Vec<Contribution>> {
        let mut text = banner(self.name(), typekit);
        text.push_str("#include <rtt/transports/mqueue/MQTemplateProtocol.hpp>\n\n");
        push_line(
            &mut text,
            format!(
                "bool orogen_typekits::{}MQueueTransportPlugin::registerTransport(std::string type_name, RTT::types::TypeInfo* ti)\n{{",
                typekit.name
            ),
        );
        for ty in typekit.exported() {
            let ident = identifier(self.name(), ty)?;
            push_line(
                &mut text,
                format!(
                    "    if (\"{}\" == type_name)\n        return ti->addProtocol(ORO_MQUEUE_PROTOCOL_ID, {ident}_MQueueTransport());",
                    ty.name
                ),
            );
        }
        text.push_str("    return false;\n}\n");

        Ok(vec![
            Contribution::source("transports/mqueue/TransportPlugin.cpp", text),
            transport_library(typekit, self.name(), &["transports/mqueue/TransportPlugin.cpp"]),
        ])
    }
}
