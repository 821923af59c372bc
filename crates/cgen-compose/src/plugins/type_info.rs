use crate::error::Result;
use crate::plugin::{Contribution, MarshallerPlugin, TypekitInput};
use crate::plugins::{banner, identifier, push_line, transport_library};

/// RTT type-info objects: one factory per exported type plus a registration
/// unit calling them all.
pub struct TypeInfoPlugin;

impl MarshallerPlugin for TypeInfoPlugin {
    fn name(&self) -> &str {
        "type_info"
    }

    fn contribute(&self, typekit: &TypekitInput) -> Result<Vec<Contribution>> {
        let mut out = Vec::new();
        let mut sources = Vec::new();
        let mut registration = banner(self.name(), typekit);
        push_line(&mut registration, format!("#include <{}/TypekitTypes.hpp>\n", typekit.name));
        registration.push_str("namespace orogen_typekits {\n");

        let mut factories = Vec::new();
        for ty in typekit.exported() {
            let ident = identifier(self.name(), ty)?;
            let cxx = ty.cxx_name();
            let path = format!("type_info/{ident}.cpp");

            let mut text = banner(self.name(), typekit);
            push_line(&mut text, "#include <rtt/types/StructTypeInfo.hpp>\n");
            push_line(
                &mut text,
                format!(
                    "namespace orogen_typekits {{\n    RTT::types::TypeInfo* {ident}_TypeInfo()\n    {{ return new RTT::types::StructTypeInfo< ::{cxx} >(\"{}\"); }}\n}}",
                    ty.name
                ),
            );
            out.push(Contribution::source(path.clone(), text));
            sources.push(path);
            factories.push(ident);
        }

        for ident in &factories {
            push_line(&mut registration, format!("    RTT::types::TypeInfo* {ident}_TypeInfo();"));
        }
        registration.push_str("}\n\nvoid register_type_infos(RTT::types::TypeInfoRepository& repo)\n{\n");
        for ident in &factories {
            push_line(&mut registration, format!("    repo.addType(orogen_typekits::{ident}_TypeInfo());"));
        }
        registration.push_str("}\n");

        out.push(Contribution::source("type_info/Registration.cpp", registration));
        sources.push("type_info/Registration.cpp".to_string());

        let refs: Vec<&str> = sources.iter().map(String::as_str).collect();
        out.push(transport_library(typekit, self.name(), &refs));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgen_types::TypeList;

    #[test]
    fn one_factory_per_exported_type() {
        let input = TypekitInput::from_type_list(
            "base",
            "base",
            &TypeList::parse("/base/Time 1\n/base/Angle 1\n"),
        );
        let out = TypeInfoPlugin.contribute(&input).unwrap();
        let paths: Vec<String> = out
            .iter()
            .map(|c| c.path.display().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        assert_eq!(
            paths,
            vec![
                "type_info/base_Time.cpp",
                "type_info/base_Angle.cpp",
                "type_info/Registration.cpp"
            ]
        );
        assert!(out[2].text.contains("repo.addType(orogen_typekits::base_Angle_TypeInfo());"));
    }
}
