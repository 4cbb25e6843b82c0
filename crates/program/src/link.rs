use std::collections::BTreeMap;

use crate::error::ProgramError;
use crate::stage::{CompiledStage, ShaderSource, ShaderStage};

/// A vertex stage and a fragment stage whose interfaces agree.
#[derive(Debug)]
pub struct Program {
    pub vertex: CompiledStage,
    pub fragment: CompiledStage,
}

impl Program {
    /// Compile both sources and link them.
    pub fn build(vertex: &ShaderSource, fragment: &ShaderSource) -> Result<Self, ProgramError> {
        let vertex = vertex.compile(ShaderStage::Vertex)?;
        let fragment = fragment.compile(ShaderStage::Fragment)?;
        Self::link(vertex, fragment)
    }

    /// Check the stage interface and the shared resource bindings.
    ///
    /// Every fragment `@location` input must be written by the vertex stage with
    /// the same type, and a `(group, binding)` pair declared by both stages must
    /// have the same layout in both.
    pub fn link(vertex: CompiledStage, fragment: CompiledStage) -> Result<Self, ProgramError> {
        let mut problems = Vec::new();

        let outputs = vertex_outputs(&vertex);
        for (location, (name, ty)) in fragment_inputs(&fragment) {
            match outputs.get(&location) {
                None => problems.push(format!(
                    "fragment input `{name}` at location {location} is not written by the vertex stage"
                )),
                Some((_, out_ty)) if *out_ty != ty => problems.push(format!(
                    "location {location}: vertex writes {out_ty}, fragment `{name}` reads {ty}"
                )),
                Some(_) => {}
            }
        }

        let vertex_resources = resource_signatures(&vertex.module);
        for ((group, binding), (name, signature)) in resource_signatures(&fragment.module) {
            if let Some((vertex_name, vertex_signature)) = vertex_resources.get(&(group, binding)) {
                if *vertex_signature != signature {
                    problems.push(format!(
                        "@group({group}) @binding({binding}): vertex `{vertex_name}` is {vertex_signature}, fragment `{name}` is {signature}"
                    ));
                }
            }
        }

        if !problems.is_empty() {
            let log = problems
                .iter()
                .map(|p| format!("error: {p}"))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(ProgramError::ProgramLink { log });
        }

        tracing::debug!(
            vertex = %vertex.label,
            fragment = %fragment.label,
            "linked program"
        );

        Ok(Self { vertex, fragment })
    }

    /// Both stages, vertex first.
    pub fn stages(&self) -> [&CompiledStage; 2] {
        [&self.vertex, &self.fragment]
    }
}

/// `location -> (name, type signature)` of user-defined vertex outputs.
fn vertex_outputs(stage: &CompiledStage) -> BTreeMap<u32, (String, String)> {
    let module = &stage.module;
    let mut outputs = BTreeMap::new();
    if let Some(result) = &stage.entry().function.result {
        collect_locations(module, "result", result.ty, result.binding.as_ref(), &mut outputs);
    }
    outputs
}

/// `location -> (name, type signature)` of user-defined fragment inputs.
fn fragment_inputs(stage: &CompiledStage) -> BTreeMap<u32, (String, String)> {
    let module = &stage.module;
    let mut inputs = BTreeMap::new();
    for (index, arg) in stage.entry().function.arguments.iter().enumerate() {
        let name = arg.name.clone().unwrap_or_else(|| format!("arg{index}"));
        collect_locations(module, &name, arg.ty, arg.binding.as_ref(), &mut inputs);
    }
    inputs
}

/// Every `@location` binding reachable from an entry point argument or result.
pub(crate) fn collect_locations(
    module: &naga::Module,
    name: &str,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeMap<u32, (String, String)>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location, (name.to_string(), type_signature(module, ty)));
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    let member_name = member.name.as_deref().unwrap_or(name);
                    collect_locations(module, member_name, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// `(group, binding) -> (name, layout signature)` of every bound global.
fn resource_signatures(module: &naga::Module) -> BTreeMap<(u32, u32), (String, String)> {
    module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            let name = var.name.clone().unwrap_or_default();
            Some((
                (binding.group, binding.binding),
                (name, type_signature(module, var.ty)),
            ))
        })
        .collect()
}

/// Handle-free description of a type, comparable across modules.
pub(crate) fn type_signature(module: &naga::Module, ty: naga::Handle<naga::Type>) -> String {
    match &module.types[ty].inner {
        naga::TypeInner::Struct { members, span } => {
            let fields = members
                .iter()
                .map(|m| {
                    format!(
                        "{}@{}: {}",
                        m.name.as_deref().unwrap_or("_"),
                        m.offset,
                        type_signature(module, m.ty)
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("struct({span}) {{ {fields} }}")
        }
        naga::TypeInner::Array { base, size, stride } => {
            format!("array<{}, {size:?}, stride {stride}>", type_signature(module, *base))
        }
        other => format!("{other:?}"),
    }
}
