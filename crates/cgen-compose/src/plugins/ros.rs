use crate::error::Result;
use crate::plugin::{Contribution, MarshallerPlugin, TypekitInput};
use crate::plugins::{banner, identifier, push_line, transport_library};

/// ROS message transport: one message definition and one conversion pair
/// per exported type.
pub struct RosPlugin;

impl MarshallerPlugin for RosPlugin {
    fn name(&self) -> &str {
        "ros"
    }

    fn contribute(&self, typekit: &TypekitInput) -> Result<Vec<Contribution>> {
        let name = &typekit.name;
        let msgs = format!("{name}_msgs");
        let mut out = Vec::new();

        let mut header = banner(self.name(), typekit);
        push_line(&mut header, format!("#include \"{name}/transports/ros/Types.hpp\"\n"));
        header.push_str("namespace ros_convertions {\n");

        let mut definitions = banner(self.name(), typekit);
        push_line(&mut definitions, format!("#include \"{name}/transports/ros/Convertions.hpp\"\n"));
        definitions.push_str("namespace ros_convertions {\n");

        let mut registration = banner(self.name(), typekit);
        registration.push_str("#include <rtt/transports/ros/ROSMsgTransporter.hpp>\n\n");
        push_line(
            &mut registration,
            format!(
                "bool orogen_typekits::{name}RosTransportPlugin::registerTransport(std::string type_name, RTT::types::TypeInfo* ti)\n{{"
            ),
        );

        for ty in typekit.exported() {
            let ident = identifier(self.name(), ty)?;
            let cxx = ty.cxx_name();
            push_line(
                &mut header,
                format!("    void toROS({msgs}::{ident}& ros, ::{cxx} const& value);"),
            );
            push_line(
                &mut header,
                format!("    void fromROS(::{cxx}& value, {msgs}::{ident} const& ros);"),
            );
            push_line(
                &mut definitions,
                format!(
                    "    void toROS({msgs}::{ident}& ros, ::{cxx} const& value)\n    {{ orogen_transports::toByteArray(ros.data, value); }}"
                ),
            );
            push_line(
                &mut definitions,
                format!(
                    "    void fromROS(::{cxx}& value, {msgs}::{ident} const& ros)\n    {{ orogen_transports::fromByteArray(value, ros.data); }}"
                ),
            );
            push_line(
                &mut registration,
                format!(
                    "    if (\"{}\" == type_name)\n        return ti->addProtocol(ORO_ROS_PROTOCOL_ID, new ros_integration::RosMsgTransporter< ::{cxx}, {msgs}::{ident} >());",
                    ty.name
                ),
            );
            out.push(Contribution::source(
                format!("transports/ros/msg/{ident}.msg"),
                format!("# ROS mapping of {}\nuint8[] data\n", ty.name),
            ));
        }
        header.push_str("}\n");
        definitions.push_str("}\n");
        registration.push_str("    return false;\n}\n");

        out.push(Contribution::source("transports/ros/Convertions.hpp", header));
        out.push(Contribution::source("transports/ros/Convertions.cpp", definitions));
        out.push(Contribution::source("transports/ros/TransportPlugin.cpp", registration));
        out.push(transport_library(
            typekit,
            self.name(),
            &["transports/ros/Convertions.cpp", "transports/ros/TransportPlugin.cpp"],
        ));
        Ok(out)
    }
}
