use crate::stereo_pipeline::common::error::Result;
use crate::stereo_pipeline::frame::DepthMap;
use crate::stereo_pipeline::temporal::types::{TemporalMethod, TemporalSettings, TemporalState};

/// Filters one raw depth map and returns the advanced state with the filtered map.
///
/// The raw map always enters the history window (evicting the oldest beyond
/// `settings.window`). EMA feeds back the previous filtered output; the windowed methods
/// only look at the history.
pub fn filter_depth(
    mut state: TemporalState,
    raw: DepthMap,
    settings: &TemporalSettings,
) -> Result<(TemporalState, DepthMap)> {
    state.check_dimensions(&raw)?;

    let (width, height) = raw.dimensions();
    let ema = match (settings.method, state.previous.as_ref()) {
        (TemporalMethod::Ema, Some(previous)) => {
            let alpha = settings.alpha;
            let data = raw
                .data()
                .iter()
                .zip(previous.data())
                .map(|(&r, &p)| alpha * r + (1.0 - alpha) * p)
                .collect();
            Some(DepthMap::new(width, height, data)?)
        }
        (TemporalMethod::Ema, None) => Some(raw.clone()),
        _ => None,
    };

    let window = settings.window.max(1);
    while state.history.len() >= window {
        state.history.pop_front();
    }
    state.history.push_back(raw);

    let filtered = match (settings.method, ema) {
        (_, Some(filtered)) => filtered,
        (TemporalMethod::Gaussian, None) => {
            DepthMap::new(width, height, window_gaussian(&state, settings.sigma))?
        }
        (_, None) => DepthMap::new(width, height, window_median(&state))?,
    };

    state.previous = Some(filtered.clone());
    Ok((state, filtered))
}

fn window_median(state: &TemporalState) -> Vec<f32> {
    let len = state.history.front().map_or(0, |d| d.data().len());
    let mut samples = Vec::with_capacity(state.history.len());
    (0..len)
        .map(|i| {
            samples.clear();
            samples.extend(state.history.iter().map(|d| d.data()[i]));
            samples.sort_unstable_by(f32::total_cmp);
            let mid = samples.len() / 2;
            if samples.len() % 2 == 0 {
                (samples[mid - 1] + samples[mid]) * 0.5
            } else {
                samples[mid]
            }
        })
        .collect()
}

fn window_gaussian(state: &TemporalState, sigma: f32) -> Vec<f32> {
    let newest = state.history.len().saturating_sub(1);
    let weights: Vec<f32> = (0..state.history.len())
        .map(|i| {
            let age = (newest - i) as f32;
            (-(age * age) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();

    let len = state.history.front().map_or(0, |d| d.data().len());
    let mut out = vec![0.0f32; len];
    for (depth, &w) in state.history.iter().zip(&weights) {
        for (o, &v) in out.iter_mut().zip(depth.data()) {
            *o += w * v;
        }
    }
    out.iter_mut().for_each(|v| *v /= total);
    out
}
