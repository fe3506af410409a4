use super::ChannelLayout;

/// Render `count` mono samples at `output_rate`, starting at output index `first`.
///
/// Source frames are read through the downmix, so channel averaging and
/// zero-fill past the stream edges apply to every tap. Equal rates copy
/// frames directly; otherwise neighbouring frames are linearly interpolated.
pub(crate) fn resample_window(
    layout: &ChannelLayout<'_>,
    input_rate: u32,
    output_rate: u32,
    first: usize,
    count: usize,
) -> Vec<f32> {
    let input_rate = input_rate.max(1);
    let output_rate = output_rate.max(1);
    if input_rate == output_rate {
        return (first..first.saturating_add(count))
            .map(|frame| layout.sample_at(frame))
            .collect();
    }
    let step = input_rate as f64 / output_rate as f64;
    let mut out = Vec::with_capacity(count);
    for idx in first..first.saturating_add(count) {
        out.push(lerp_frame(layout, idx as f64 * step));
    }
    out
}

fn lerp_frame(layout: &ChannelLayout<'_>, pos: f64) -> f32 {
    let idx0 = pos.floor().max(0.0) as usize;
    let frac = (pos - idx0 as f64).clamp(0.0, 1.0) as f32;
    let a = layout.sample_at(idx0);
    if frac == 0.0 {
        return a;
    }
    let idx1 = idx0.saturating_add(1);
    let b = if idx1 < layout.frames() {
        layout.sample_at(idx1)
    } else {
        a
    };
    a + (b - a) * frac
}
