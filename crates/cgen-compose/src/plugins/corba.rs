use crate::error::Result;
use crate::plugin::{Contribution, MarshallerPlugin, TypekitInput};
use crate::plugins::{banner, identifier, push_line, transport_library};

/// CORBA transport: declares `toCORBA`/`fromCORBA` for every exported type
/// and registers them with the transport plugin.
pub struct CorbaPlugin;

impl MarshallerPlugin for CorbaPlugin {
    fn name(&self) -> &str {
        "corba"
    }

    fn contribute(&self, typekit: &TypekitInput) -> Result<Vec<Contribution>> {
        let name = &typekit.name;
        let mut convertions = banner(self.name(), typekit);
        push_line(
            &mut convertions,
            format!("#include \"{name}/transports/corba/{name}TypesC.h\"\n#include <rtt/Logger.hpp>\n"),
        );
        convertions.push_str("namespace orogen_typekits {\n");

        let mut registration = banner(self.name(), typekit);
        registration.push_str("#include <rtt/transports/corba/CorbaTemplateProtocol.hpp>\n\n");
        push_line(
            &mut registration,
            format!(
                "bool orogen_typekits::{name}CorbaTransportPlugin::registerTransport(std::string type_name, RTT::types::TypeInfo* ti)\n{{"
            ),
        );

        for ty in typekit.exported() {
            let ident = identifier(self.name(), ty)?;
            let cxx = ty.cxx_name();
            push_line(
                &mut convertions,
                format!("    bool toCORBA(orogen::Corba::{ident}& corba, ::{cxx} const& value);"),
            );
            push_line(
                &mut convertions,
                format!("    bool fromCORBA(::{cxx}& value, orogen::Corba::{ident} const& corba);"),
            );
            push_line(
                &mut registration,
                format!(
                    "    if (\"{}\" == type_name)\n        return ti->addProtocol(ORO_CORBA_PROTOCOL_ID, new {ident}_CorbaTransport());",
                    ty.name
                ),
            );
        }
        convertions.push_str("}\n");
        registration.push_str("    return false;\n}\n");

        Ok(vec![
            Contribution::source("transports/corba/Convertions.cpp", convertions),
            Contribution::source("transports/corba/TransportPlugin.cpp", registration),
            transport_library(
                typekit,
                self.name(),
                &[
                    "transports/corba/Convertions.cpp",
                    "transports/corba/TransportPlugin.cpp",
                ],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgen_types::TypeList;

    #[test]
    fn declares_both_directions() {
        let input = TypekitInput::from_type_list("base", "base", &TypeList::parse("/base/Time\n"));
        let out = CorbaPlugin.contribute(&input).unwrap();
        let conv = &out[0].text;
        assert!(conv.contains("bool toCORBA(orogen::Corba::base_Time& corba, ::base::Time const& value);"));
        assert!(conv.contains("bool fromCORBA(::base::Time& value, orogen::Corba::base_Time const& corba);"));
        assert!(out[1].text.contains("if (\"/base/Time\" == type_name)"));
    }
}
