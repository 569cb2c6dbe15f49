//! Compilation of the GLSL ES subset understood by the software device.
//!
//! Supported programs transform one position attribute by a product of
//! `mat4` uniforms and pass one color attribute through a varying:
//!
//! ```glsl
//! attribute vec4 Position;
//! attribute vec4 SourceColor;
//! varying vec4 DestinationColor;
//! uniform mat4 Projection;
//! uniform mat4 Modelview;
//! void main(void) {
//!     DestinationColor = SourceColor;
//!     gl_Position = Projection * Modelview * Position;
//! }
//! ```
//!
//! Anything else is rejected with a diagnostic in the style of a GLSL
//! compiler log.

use crate::error::DeviceError;
use cone_hal::ShaderStage;
use glam::Mat4;

const PRECISION_QUALIFIERS: [&str; 3] = ["lowp", "mediump", "highp"];

/// A declared global.
#[derive(Clone, Debug, PartialEq)]
struct Declaration {
    qualifier: Qualifier,
    ty: String,
    name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Qualifier {
    Attribute,
    Uniform,
    Varying,
}

/// One compiled shader stage.
#[derive(Clone, Debug, Default)]
struct Stage {
    declarations: Vec<Declaration>,
    /// `(lhs, rhs)` assignments inside `main`, in source order.
    assignments: Vec<(String, String)>,
}

impl Stage {
    fn find(&self, qualifier: Qualifier, name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.qualifier == qualifier && d.name == name)
    }

    fn assignment(&self, lhs: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(l, _)| l == lhs)
            .map(|(_, r)| r.as_str())
    }
}

/// A linked program and its uniform storage.
#[derive(Clone, Debug)]
pub struct Program {
    attributes: Vec<String>,
    uniforms: Vec<String>,
    uniform_values: Vec<Option<Mat4>>,
    /// Uniform indices multiplied together, left to right.
    transform: Vec<usize>,
    position: usize,
    color: usize,
}

impl Program {
    /// Compile and link a vertex + fragment pair.
    pub fn build(vertex_source: &str, fragment_source: &str) -> Result<Self, DeviceError> {
        let vertex = compile(ShaderStage::Vertex, vertex_source)?;
        let fragment = compile(ShaderStage::Fragment, fragment_source)?;
        link(&vertex, &fragment)
    }

    pub fn attrib_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == name)
    }

    pub fn uniform_index(&self, name: &str) -> Option<usize> {
        self.uniforms.iter().position(|u| u == name)
    }

    pub fn attribute_name(&self, index: usize) -> &str {
        &self.attributes[index]
    }

    pub fn set_uniform(&mut self, index: usize, value: Mat4) -> bool {
        match self.uniform_values.get_mut(index) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Combined vertex transform from the current uniform values.
    pub fn transform(&self) -> Result<Mat4, DeviceError> {
        self.transform
            .iter()
            .try_fold(Mat4::IDENTITY, |acc, &i| match self.uniform_values[i] {
                Some(m) => Ok(acc * m),
                None => Err(DeviceError::UnsetUniform(self.uniforms[i].clone())),
            })
    }

    /// Attribute index feeding `gl_Position`.
    pub fn position_attrib(&self) -> usize {
        self.position
    }

    /// Attribute index feeding `gl_FragColor`.
    pub fn color_attrib(&self) -> usize {
        self.color
    }
}

fn compile_error(stage: ShaderStage, statement: &str, message: &str) -> DeviceError {
    DeviceError::Compile {
        stage,
        log: format!("ERROR: '{statement}' : {message}"),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn compile(stage: ShaderStage, source: &str) -> Result<Stage, DeviceError> {
    let code: String = source
        .lines()
        .map(|line| line.split("//").next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");

    let opens = code.matches('{').count();
    let closes = code.matches('}').count();
    if opens != closes {
        return Err(compile_error(stage, "}", "unbalanced braces"));
    }
    if !code.contains("void main") {
        return Err(compile_error(stage, "main", "missing entry point 'void main'"));
    }

    let mut compiled = Stage::default();
    let normalized = code.replace(['{', '}'], ";");
    for raw in normalized.split(';') {
        let statement = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if statement.is_empty()
            || statement.starts_with("precision ")
            || statement.starts_with("void main")
        {
            continue;
        }

        let mut words = statement.split(' ').peekable();
        let qualifier = match words.peek().copied() {
            Some("attribute") => Some(Qualifier::Attribute),
            Some("uniform") => Some(Qualifier::Uniform),
            Some("varying") => Some(Qualifier::Varying),
            _ => None,
        };

        if let Some(qualifier) = qualifier {
            words.next();
            let rest: Vec<&str> = words
                .filter(|w| !PRECISION_QUALIFIERS.contains(w))
                .collect();
            let [ty, name] = rest.as_slice() else {
                return Err(compile_error(stage, &statement, "malformed declaration"));
            };
            if !is_identifier(name) {
                return Err(compile_error(stage, &statement, "invalid identifier"));
            }
            if qualifier == Qualifier::Attribute && stage == ShaderStage::Fragment {
                return Err(compile_error(
                    stage,
                    &statement,
                    "attributes are not allowed in fragment shaders",
                ));
            }
            compiled.declarations.push(Declaration {
                qualifier,
                ty: ty.to_string(),
                name: name.to_string(),
            });
        } else if let Some((lhs, rhs)) = statement.split_once('=') {
            compiled
                .assignments
                .push((lhs.trim().to_string(), rhs.trim().to_string()));
        } else {
            return Err(compile_error(stage, &statement, "syntax error"));
        }
    }

    match stage {
        ShaderStage::Vertex => check_vertex(&compiled)?,
        ShaderStage::Fragment => check_fragment(&compiled)?,
    }
    Ok(compiled)
}

fn check_vertex(stage: &Stage) -> Result<(), DeviceError> {
    let vertex = ShaderStage::Vertex;
    let rhs = stage
        .assignment("gl_Position")
        .ok_or_else(|| compile_error(vertex, "gl_Position", "gl_Position is never written"))?;

    let factors: Vec<&str> = rhs.split('*').map(str::trim).collect();
    let (position, matrices) = factors
        .split_last()
        .ok_or_else(|| compile_error(vertex, rhs, "empty expression"))?;
    if stage.find(Qualifier::Attribute, position).is_none() {
        return Err(compile_error(vertex, position, "undeclared attribute"));
    }
    for factor in matrices {
        match stage.find(Qualifier::Uniform, factor) {
            Some(d) if d.ty == "mat4" => {}
            Some(_) => return Err(compile_error(vertex, factor, "expected mat4 uniform")),
            None => return Err(compile_error(vertex, factor, "undeclared identifier")),
        }
    }

    for (lhs, rhs) in &stage.assignments {
        if lhs == "gl_Position" {
            continue;
        }
        if stage.find(Qualifier::Varying, lhs).is_none() {
            return Err(compile_error(vertex, lhs, "l-value is not a varying"));
        }
        if stage.find(Qualifier::Attribute, rhs).is_none() {
            return Err(compile_error(vertex, rhs, "undeclared attribute"));
        }
    }
    Ok(())
}

fn check_fragment(stage: &Stage) -> Result<(), DeviceError> {
    let fragment = ShaderStage::Fragment;
    let rhs = stage
        .assignment("gl_FragColor")
        .ok_or_else(|| compile_error(fragment, "gl_FragColor", "gl_FragColor is never written"))?;
    if stage.find(Qualifier::Varying, rhs).is_none() {
        return Err(compile_error(fragment, rhs, "undeclared varying"));
    }
    Ok(())
}

fn link(vertex: &Stage, fragment: &Stage) -> Result<Program, DeviceError> {
    let link_error = |log: String| DeviceError::Link { log };

    // Both lookups were checked by compile().
    let frag_color = fragment.assignment("gl_FragColor").unwrap_or_default();
    let color_source = vertex
        .assignment(frag_color)
        .ok_or_else(|| link_error(format!("varying `{frag_color}` is not written by the vertex shader")))?;
    let position_expr = vertex.assignment("gl_Position").unwrap_or_default();

    let declared = |q: Qualifier| -> Vec<String> {
        vertex
            .declarations
            .iter()
            .filter(|d| d.qualifier == q)
            .map(|d| d.name.clone())
            .collect()
    };
    let attributes = declared(Qualifier::Attribute);
    let uniforms = declared(Qualifier::Uniform);

    let index_of = |names: &[String], name: &str| names.iter().position(|n| n == name);
    let mut factors: Vec<&str> = position_expr.split('*').map(str::trim).collect();
    let position_name = factors
        .pop()
        .ok_or_else(|| link_error("gl_Position has no position input".to_string()))?;
    let position = index_of(&attributes, position_name)
        .ok_or_else(|| link_error(format!("attribute `{position_name}` is not declared")))?;
    let color = index_of(&attributes, color_source)
        .ok_or_else(|| link_error(format!("attribute `{color_source}` is not declared")))?;
    let transform = factors
        .iter()
        .map(|f| {
            index_of(&uniforms, *f).ok_or_else(|| link_error(format!("uniform `{f}` is not declared")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let uniform_values = vec![None; uniforms.len()];
    Ok(Program {
        attributes,
        uniforms,
        uniform_values,
        transform,
        position,
        color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = r#"
        attribute vec4 Position;
        attribute vec4 SourceColor;
        varying vec4 DestinationColor;
        uniform mat4 Projection;
        uniform mat4 Modelview;
        void main(void)
        {
            DestinationColor = SourceColor;
            gl_Position = Projection * Modelview * Position;
        }
    "#;

    const FRAGMENT: &str = r#"
        varying lowp vec4 DestinationColor;
        void main(void)
        {
            gl_FragColor = DestinationColor; // pass-through
        }
    "#;

    #[test]
    fn builds_transform_program() {
        let program = Program::build(VERTEX, FRAGMENT).expect("program should link");
        assert_eq!(program.attrib_index("Position"), Some(0));
        assert_eq!(program.attrib_index("SourceColor"), Some(1));
        assert_eq!(program.uniform_index("Projection"), Some(0));
        assert_eq!(program.uniform_index("Modelview"), Some(1));
        assert_eq!(program.position_attrib(), 0);
        assert_eq!(program.color_attrib(), 1);
    }

    #[test]
    fn transform_multiplies_in_source_order() {
        let mut program = Program::build(VERTEX, FRAGMENT).unwrap();
        let a = Mat4::from_translation(glam::Vec3::X);
        let b = Mat4::from_scale(glam::Vec3::splat(2.0));
        program.set_uniform(0, a);
        program.set_uniform(1, b);
        assert_eq!(program.transform().unwrap(), a * b);
    }

    #[test]
    fn unset_uniform_is_an_error() {
        let program = Program::build(VERTEX, FRAGMENT).unwrap();
        assert!(matches!(
            program.transform(),
            Err(DeviceError::UnsetUniform(name)) if name == "Projection"
        ));
    }

    #[test]
    fn undeclared_uniform_fails_compile() {
        let source = VERTEX.replace("uniform mat4 Modelview;", "");
        let err = Program::build(&source, FRAGMENT).unwrap_err();
        match err {
            DeviceError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(log.contains("Modelview"), "log: {log}");
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn missing_frag_color_fails_compile() {
        let source = FRAGMENT.replace("gl_FragColor", "gl_FragData");
        assert!(matches!(
            Program::build(VERTEX, &source),
            Err(DeviceError::Compile {
                stage: ShaderStage::Fragment,
                ..
            })
        ));
    }

    #[test]
    fn unbalanced_braces_fail_compile() {
        let source = VERTEX.replacen('}', "", 1);
        assert!(matches!(
            Program::build(&source, FRAGMENT),
            Err(DeviceError::Compile { .. })
        ));
    }

    #[test]
    fn unmatched_varying_fails_link() {
        let fragment = FRAGMENT.replace("DestinationColor", "OtherColor");
        let err = Program::build(VERTEX, &fragment).unwrap_err();
        match err {
            DeviceError::Link { log } => assert!(log.contains("OtherColor"), "log: {log}"),
            other => panic!("expected link error, got {other:?}"),
        }
    }
}
