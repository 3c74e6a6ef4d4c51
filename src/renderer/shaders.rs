//! GLSL sources of the three materials.

/// Shared by every material: positions in pixels, projected orthographically.
pub const VERTEX: &str = r#"#version 330
uniform mat4 ProjMtx;
layout(location = 0) in vec2 Position;
layout(location = 1) in vec2 UV;
layout(location = 2) in vec4 Color;
out vec2 Frag_UV;
out vec4 Frag_Color;
void main()
{
    Frag_UV = UV;
    Frag_Color = Color;
    gl_Position = ProjMtx * vec4(Position.xy, 0, 1);
}
"#;

pub const PLAIN_FRAGMENT: &str = r#"#version 330
in vec2 Frag_UV;
in vec4 Frag_Color;
out vec4 Out_Color;
void main()
{
    Out_Color = Frag_Color;
}
"#;

/// Loop-Blinn style quadratic test: the curve is `u^2 - v = 0` in UV space.
/// Winding picks which side is kept.
pub const CURVED_FRAGMENT: &str = r#"#version 330
in vec2 Frag_UV;
in vec4 Frag_Color;
out vec4 Out_Color;

float inCurve(vec2 uv)
{
    return uv.x * uv.x - uv.y;
}

void main()
{
    float x = inCurve(Frag_UV);

    if (!gl_FrontFacing)
    {
        if (x > 0.) discard;
    }
    else
    {
        if (x < 0.) discard;
    }

    Out_Color = Frag_Color;
}
"#;

pub const IMAGE_FRAGMENT: &str = r#"#version 330
uniform sampler2D Texture;
in vec2 Frag_UV;
in vec4 Frag_Color;
out vec4 Out_Color;
void main()
{
    Out_Color = Frag_Color * texture(Texture, Frag_UV.st);
}
"#;
