use super::Color;

/// Alpha-composites `src` over `dest`.
///
/// Inputs and output are sRGB with straight alpha; the blend itself happens in linear color
/// space.
pub(super) fn alpha_over(dest: Color, src: Color) -> Color {
    let [dr, dg, db, da] = to_linear(dest);
    let [sr, sg, sb, sa] = to_linear(src);

    let a = sa + da * (1.0 - sa);
    if a == 0.0 {
        return Color::NULL;
    }

    let blend = |d: f32, s: f32| (s * sa + d * da * (1.0 - sa)) / a;
    from_linear([blend(dr, sr), blend(dg, sg), blend(db, sb), a])
}

fn to_linear(color: Color) -> [f32; 4] {
    fn channel(srgb: f32) -> f32 {
        if srgb <= 0.04045 {
            srgb / 12.92
        } else {
            ((srgb + 0.055) / 1.055).powf(2.4)
        }
    }

    let [r, g, b, a] = color.0;
    [
        channel(f32::from(r) / 255.0),
        channel(f32::from(g) / 255.0),
        channel(f32::from(b) / 255.0),
        f32::from(a) / 255.0,
    ]
}

fn from_linear([r, g, b, a]: [f32; 4]) -> Color {
    fn channel(rgb: f32) -> f32 {
        if rgb <= 0.0031308 {
            rgb * 12.92
        } else {
            1.055 * rgb.powf(1.0 / 2.4) - 0.055
        }
    }

    Color([
        (channel(r) * 255.0) as u8,
        (channel(g) * 255.0) as u8,
        (channel(b) * 255.0) as u8,
        (a * 255.0) as u8,
    ])
}
