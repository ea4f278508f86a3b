#[cfg(test)]
mod tests {
    use crate::stereo_pipeline::common::error::StereoError;
    use crate::stereo_pipeline::frame::DepthMap;
    use crate::stereo_pipeline::temporal::{
        TemporalMethod, TemporalSettings, TemporalStabilizer, TemporalState, filter_depth,
        is_scene_change, mean_abs_difference,
    };

    fn depth(value: f32) -> DepthMap {
        DepthMap::constant(4, 3, value).unwrap()
    }

    fn settings(method: TemporalMethod) -> TemporalSettings {
        TemporalSettings {
            method,
            ..TemporalSettings::default()
        }
    }

    #[test]
    fn test_default_settings() {
        let defaults = TemporalSettings::default();
        assert_eq!(defaults.method, TemporalMethod::Ema);
        assert_eq!(defaults.alpha, 0.7);
        assert_eq!(defaults.window, 3);
        assert!(defaults.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let bad_alpha = TemporalSettings {
            alpha: 0.0,
            ..TemporalSettings::default()
        };
        assert!(matches!(
            bad_alpha.validate(),
            Err(StereoError::InvalidParameter(_))
        ));
        let bad_window = TemporalSettings {
            window: 0,
            ..TemporalSettings::default()
        };
        assert!(bad_window.validate().is_err());
    }

    #[test]
    fn test_first_frame_passes_through() {
        let (state, out) =
            filter_depth(TemporalState::new(), depth(0.4), &TemporalSettings::default()).unwrap();
        assert_eq!(out, depth(0.4));
        assert_eq!(state.previous(), Some(&depth(0.4)));
        assert_eq!(state.history().count(), 1);
    }

    #[test]
    fn test_ema_feeds_back_previous_output() {
        let config = TemporalSettings {
            alpha: 0.5,
            ..TemporalSettings::default()
        };
        let (state, _) = filter_depth(TemporalState::new(), depth(0.0), &config).unwrap();
        let (state, second) = filter_depth(state, depth(1.0), &config).unwrap();
        assert!((second.get(0, 0) - 0.5).abs() < 1e-6);
        // Blends with the previous output (0.5), not the previous raw value (1.0).
        let (_, third) = filter_depth(state, depth(1.0), &config).unwrap();
        assert!((third.get(0, 0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_constant_sequence_stays_constant() {
        for method in [
            TemporalMethod::Ema,
            TemporalMethod::Median,
            TemporalMethod::Gaussian,
        ] {
            let mut stabilizer = TemporalStabilizer::new(settings(method));
            for _ in 0..6 {
                let out = stabilizer.filter(depth(0.625)).unwrap();
                assert!(out.data().iter().all(|&v| (v - 0.625).abs() < 1e-5));
            }
        }
    }

    #[test]
    fn test_history_is_bounded_by_window() {
        let mut stabilizer = TemporalStabilizer::new(TemporalSettings {
            window: 3,
            ..TemporalSettings::default()
        });
        for i in 0..5 {
            stabilizer.filter(depth(i as f32 / 10.0)).unwrap();
        }
        let history: Vec<f32> = stabilizer.state().history().map(|d| d.get(0, 0)).collect();
        assert_eq!(history, vec![0.2, 0.3, 0.4]);
        assert_eq!(stabilizer.state().last_raw(), Some(&depth(0.4)));
    }

    #[test]
    fn test_median_rejects_outlier() {
        let mut stabilizer = TemporalStabilizer::new(settings(TemporalMethod::Median));
        stabilizer.filter(depth(0.2)).unwrap();
        stabilizer.filter(depth(0.2)).unwrap();
        let out = stabilizer.filter(depth(0.9)).unwrap();
        assert_eq!(out.get(2, 1), 0.2);
    }

    #[test]
    fn test_median_of_even_window_averages_middle() {
        let mut stabilizer = TemporalStabilizer::new(settings(TemporalMethod::Median));
        stabilizer.filter(depth(0.2)).unwrap();
        let out = stabilizer.filter(depth(0.6)).unwrap();
        assert!((out.get(0, 0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_gaussian_weights_newest_highest() {
        let mut stabilizer = TemporalStabilizer::new(settings(TemporalMethod::Gaussian));
        stabilizer.filter(depth(0.0)).unwrap();
        let out = stabilizer.filter(depth(1.0)).unwrap();
        let v = out.get(0, 0);
        assert!(v > 0.5 && v < 1.0);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut stabilizer = TemporalStabilizer::default();
        stabilizer.filter(depth(0.1)).unwrap();
        stabilizer.reset();
        assert!(stabilizer.state().is_empty());
        let out = stabilizer.filter(depth(0.9)).unwrap();
        assert_eq!(out, depth(0.9));
    }

    #[test]
    fn test_mismatched_depth_keeps_state() {
        let mut stabilizer = TemporalStabilizer::default();
        stabilizer.filter(depth(0.1)).unwrap();
        let result = stabilizer.filter(DepthMap::constant(2, 2, 0.5).unwrap());
        assert!(matches!(
            result,
            Err(StereoError::DimensionMismatch { .. })
        ));
        assert_eq!(stabilizer.state().previous(), Some(&depth(0.1)));
    }

    #[test]
    fn test_scene_change_detection() {
        assert!((mean_abs_difference(&depth(0.2), &depth(0.7)).unwrap() - 0.5).abs() < 1e-6);
        assert!(is_scene_change(&depth(0.2), &depth(0.7), 0.3).unwrap());
        assert!(!is_scene_change(&depth(0.2), &depth(0.3), 0.3).unwrap());
        assert!(mean_abs_difference(&depth(0.2), &DepthMap::constant(1, 1, 0.2).unwrap()).is_err());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("Median".parse::<TemporalMethod>().unwrap(), TemporalMethod::Median);
        assert!("kalman".parse::<TemporalMethod>().is_err());
    }
}
