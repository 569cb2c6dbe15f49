//! Built-in GLSL ES 1.00 shader pair for the programmable pipeline.

/// Attribute carrying the object-space position.
pub const POSITION_ATTRIB: &str = "Position";
/// Attribute carrying the per-vertex color.
pub const COLOR_ATTRIB: &str = "SourceColor";
/// Uniform holding the projection matrix.
pub const PROJECTION_UNIFORM: &str = "Projection";
/// Uniform holding the model-view matrix.
pub const MODELVIEW_UNIFORM: &str = "Modelview";

pub const SIMPLE_VERTEX_SHADER: &str = r#"
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

pub const SIMPLE_FRAGMENT_SHADER: &str = r#"
varying lowp vec4 DestinationColor;

void main(void)
{
    gl_FragColor = DestinationColor;
}
"#;
