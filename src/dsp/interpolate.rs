/// Linearly interpolate a channel at a fractional frame position.
///
/// Returns `None` once the two frames bracketing `position` are not both
/// inside the buffer, or when `position` is not a usable index. The caller
/// treats that as end of sample data.
#[inline]
pub fn linear(channel: &[f32], position: f64) -> Option<f32> {
    if !(position.is_finite() && position >= 0.0) {
        return None;
    }
    let idx = position as usize;
    let frac = (position - idx as f64) as f32;

    let s0 = *channel.get(idx)?;
    let s1 = *channel.get(idx.checked_add(1)?)?;
    Some(s0 + (s1 - s0) * frac)
}

/// Interpolate a stereo frame. Both channels must cover `position`.
#[inline]
pub fn linear_stereo(left: &[f32], right: &[f32], position: f64) -> Option<(f32, f32)> {
    Some((linear(left, position)?, linear(right, position)?))
}
