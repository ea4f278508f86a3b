#[cfg(test)]
mod tests {
    use crate::stereo_pipeline::common::error::StereoError;
    use crate::stereo_pipeline::frame::{DepthMap, Frame};
    use crate::stereo_pipeline::render::{
        AnaglyphMode, ComfortZone, ContentPreset, DisparityMapper, Eye, FormatComposer,
        HoleFillMethod, HoleFillSettings, HoleFiller, OutputFormat, RenderParams, ViewWarper,
        compute_disparity, detect_holes, fill_inpaint, fill_nearest, max_disparity,
        resize_linear, view_shift,
    };

    fn gray(width: usize, height: usize) -> Frame {
        Frame::filled(width, height, 1, [128, 128, 128]).unwrap()
    }

    fn ramp(width: usize, height: usize) -> Frame {
        let data = (0..height)
            .flat_map(|_| (0..width).flat_map(|x| {
                let v = (x * 255 / (width - 1)) as u8;
                [v, v / 2, 255 - v]
            }))
            .collect();
        Frame::new(width, height, 1, data).unwrap()
    }

    /// Mid-gray frame with a black square cut out of it.
    fn frame_with_hole(size: usize, hole: std::ops::Range<usize>) -> Frame {
        let mut data = Vec::with_capacity(size * size * 3);
        for y in 0..size {
            for x in 0..size {
                if hole.contains(&x) && hole.contains(&y) {
                    data.extend_from_slice(&[0, 0, 0]);
                } else {
                    data.extend_from_slice(&[128, 128, 128]);
                }
            }
        }
        Frame::new(size, size, 1, data).unwrap()
    }

    #[test]
    fn test_max_disparity_formula() {
        assert!((max_disparity(65.0, 75.0) - 24.375).abs() < 1e-9);
        assert_eq!(max_disparity(65.0, 0.0), 0.0);
    }

    #[test]
    fn test_disparity_far_is_zero_and_near_is_max() {
        let depth = DepthMap::new(2, 1, vec![0.0, 1.0]).unwrap();
        let disparity = compute_disparity(&depth, 65.0, 75.0);
        assert!((disparity.get(0, 0) - 24.375).abs() < 1e-4);
        assert!(disparity.get(1, 0).abs() < 1e-6);
    }

    #[test]
    fn test_disparity_half_depth_example() {
        let depth = DepthMap::constant(4, 4, 0.5).unwrap();
        let disparity = compute_disparity(&depth, 65.0, 75.0);
        assert!(disparity.data().iter().all(|&d| (d - 12.1875).abs() < 1e-4));
    }

    #[test]
    fn test_disparity_is_monotonic_in_depth() {
        let values: Vec<f32> = (0..=10).map(|i| i as f32 / 10.0).collect();
        let depth = DepthMap::new(values.len(), 1, values).unwrap();
        let disparity = compute_disparity(&depth, 70.0, 60.0);
        assert!(disparity.data().windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_disparity_does_not_clamp_depth() {
        let depth = DepthMap::new(2, 1, vec![-0.5, 1.5]).unwrap();
        let disparity = compute_disparity(&depth, 60.0, 100.0);
        assert!((disparity.get(0, 0) - 45.0).abs() < 1e-4);
        assert!((disparity.get(1, 0) + 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_mapper_uses_params() {
        let mapper = DisparityMapper::new(RenderParams::new(60.0, 50.0, 1.0).unwrap());
        assert!((mapper.max_disparity() - 15.0).abs() < 1e-9);
        let disparity = mapper.compute(&DepthMap::constant(3, 3, 0.0).unwrap());
        assert!((disparity.max_value() - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_comfort_zone() {
        let zone = ComfortZone::evaluate(24.375, 1920);
        assert!(zone.is_comfortable);
        assert!((zone.recommended_max_px - 38.4).abs() < 1e-9);

        let zone = ComfortZone::evaluate(24.375, 320);
        assert!(!zone.is_comfortable);
    }

    #[test]
    fn test_render_params_validation() {
        assert!(RenderParams::new(65.0, 75.0, 1.0).is_ok());
        assert!(matches!(
            RenderParams::new(45.0, 75.0, 1.0),
            Err(StereoError::InvalidParameter(_))
        ));
        assert!(RenderParams::new(65.0, 101.0, 1.0).is_err());
        assert!(RenderParams::new(65.0, 75.0, 2.5).is_err());

        let defaults = RenderParams::default();
        assert_eq!(defaults.ipd_mm(), 65.0);
        assert_eq!(defaults.depth_intensity(), 75.0);
        assert_eq!(defaults.convergence(), 1.0);
    }

    #[test]
    fn test_presets() {
        let params = RenderParams::from_preset(ContentPreset::Action, 65.0).unwrap();
        assert_eq!(params.depth_intensity(), 85.0);
        assert_eq!(params.convergence(), 1.2);
        assert_eq!(
            "talking_head".parse::<ContentPreset>().unwrap(),
            ContentPreset::TalkingHead
        );
        assert!("cinema".parse::<ContentPreset>().is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(
            "half_sbs".parse::<OutputFormat>().unwrap(),
            OutputFormat::HalfSideBySide
        );
        assert_eq!(
            "Anaglyph".parse::<OutputFormat>().unwrap(),
            OutputFormat::Anaglyph(AnaglyphMode::RedCyan)
        );
        assert_eq!(
            "top-bottom-full".parse::<OutputFormat>().unwrap(),
            OutputFormat::TopBottom {
                half_resolution: false
            }
        );
        assert!("vr180".parse::<OutputFormat>().is_err());
        for format in [
            OutputFormat::HalfSideBySide,
            OutputFormat::FullSideBySide,
            OutputFormat::Anaglyph(AnaglyphMode::AmberBlue),
            OutputFormat::TopBottom {
                half_resolution: true,
            },
        ] {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_view_shifts_are_opposite() {
        assert_eq!(view_shift(10.0, Eye::Left), -5.0);
        assert_eq!(view_shift(10.0, Eye::Right), 5.0);
    }

    #[test]
    fn test_uniform_frame_survives_warp() {
        let frame = gray(64, 64);
        let depth = DepthMap::new(
            64,
            64,
            (0..64 * 64).map(|i| (i % 64) as f32 / 63.0).collect(),
        )
        .unwrap();
        let disparity = compute_disparity(&depth, 65.0, 100.0);
        let pair = ViewWarper::new().render_pair(&frame, &disparity).unwrap();
        assert_eq!(pair.left(), &frame);
        assert_eq!(pair.right(), &frame);
    }

    #[test]
    fn test_zero_disparity_is_identity() {
        let frame = ramp(16, 4);
        let disparity = compute_disparity(&DepthMap::constant(16, 4, 1.0).unwrap(), 65.0, 75.0);
        let warped = ViewWarper::new().warp(&frame, &disparity, Eye::Left).unwrap();
        assert_eq!(warped, frame);
    }

    #[test]
    fn test_warp_shifts_sampling_position() {
        // Constant disparity of 4px: right view samples x + 2, left view x - 2.
        let frame = ramp(32, 1);
        let depth = DepthMap::constant(32, 1, 0.0).unwrap();
        let disparity = compute_disparity(&depth, 80.0, 10.0);
        assert!((disparity.get(0, 0) - 4.0).abs() < 1e-6);

        let warper = ViewWarper::new();
        let right = warper.warp(&frame, &disparity, Eye::Right).unwrap();
        let left = warper.warp(&frame, &disparity, Eye::Left).unwrap();
        assert_eq!(right.pixel(10, 0), frame.pixel(12, 0));
        assert_eq!(left.pixel(10, 0), frame.pixel(8, 0));
        // Edge replicate.
        assert_eq!(left.pixel(0, 0), frame.pixel(0, 0));
        assert_eq!(right.pixel(31, 0), frame.pixel(31, 0));
    }

    #[test]
    fn test_warp_rejects_mismatched_disparity() {
        let frame = gray(8, 8);
        let disparity = compute_disparity(&DepthMap::constant(8, 4, 0.5).unwrap(), 65.0, 75.0);
        let result = ViewWarper::new().warp(&frame, &disparity, Eye::Left);
        assert!(matches!(
            result,
            Err(StereoError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_resize_keeps_uniform_color() {
        let frame = Frame::filled(10, 6, 4, [10, 200, 30]).unwrap();
        let resized = resize_linear(&frame, 5, 3).unwrap();
        assert_eq!(resized.dimensions(), (5, 3));
        assert_eq!(resized.index(), 4);
        assert!(resized.data().chunks_exact(3).all(|p| p == [10, 200, 30]));
        assert!(resize_linear(&frame, 0, 3).is_err());
    }

    #[test]
    fn test_resize_keeps_both_edges() {
        let data = (0..16)
            .flat_map(|i| if i % 8 < 4 { [0, 0, 0] } else { [255, 255, 255] })
            .collect();
        let frame = Frame::new(8, 2, 1, data).unwrap();
        let resized = resize_linear(&frame, 4, 2).unwrap();
        assert_eq!(resized.pixel(0, 0), [0, 0, 0]);
        assert_eq!(resized.pixel(3, 1), [255, 255, 255]);
    }

    #[test]
    fn test_half_sbs_keeps_source_size() {
        let composer = FormatComposer::new(OutputFormat::HalfSideBySide);
        let out = composer.compose(&gray(64, 48), &gray(64, 48)).unwrap();
        assert_eq!(out.dimensions(), (64, 48));

        let out = composer.compose(&gray(65, 48), &gray(65, 48)).unwrap();
        assert_eq!(out.dimensions(), (65, 48));
    }

    #[test]
    fn test_half_sbs_places_left_then_right() {
        let left = Frame::filled(8, 2, 1, [255, 0, 0]).unwrap();
        let right = Frame::filled(8, 2, 1, [0, 0, 255]).unwrap();
        let out = FormatComposer::new(OutputFormat::HalfSideBySide)
            .compose(&left, &right)
            .unwrap();
        assert_eq!(out.pixel(0, 0), [255, 0, 0]);
        assert_eq!(out.pixel(3, 1), [255, 0, 0]);
        assert_eq!(out.pixel(4, 0), [0, 0, 255]);
        assert_eq!(out.pixel(7, 1), [0, 0, 255]);
    }

    #[test]
    fn test_full_sbs_doubles_width() {
        let left = ramp(16, 4);
        let right = gray(16, 4);
        let out = FormatComposer::new(OutputFormat::FullSideBySide)
            .compose(&left, &right)
            .unwrap();
        assert_eq!(out.dimensions(), (32, 4));
        assert_eq!(out.pixel(5, 2), left.pixel(5, 2));
        assert_eq!(out.pixel(21, 2), right.pixel(5, 2));
    }

    #[test]
    fn test_top_bottom_dimensions() {
        let half = FormatComposer::new(OutputFormat::TopBottom {
            half_resolution: true,
        });
        let full = FormatComposer::new(OutputFormat::TopBottom {
            half_resolution: false,
        });
        assert_eq!(half.compose(&gray(20, 11), &gray(20, 11)).unwrap().dimensions(), (20, 11));
        assert_eq!(full.compose(&gray(20, 11), &gray(20, 11)).unwrap().dimensions(), (20, 22));
    }

    #[test]
    fn test_top_bottom_places_left_above_right() {
        let left = Frame::filled(4, 8, 1, [255, 0, 0]).unwrap();
        let right = Frame::filled(4, 8, 1, [0, 0, 255]).unwrap();
        for (half_resolution, height) in [(true, 8), (false, 16)] {
            let out = FormatComposer::new(OutputFormat::TopBottom { half_resolution })
                .compose(&left, &right)
                .unwrap();
            let split = height / 2;
            assert_eq!(out.pixel(0, 0), [255, 0, 0]);
            assert_eq!(out.pixel(3, split - 1), [255, 0, 0]);
            assert_eq!(out.pixel(0, split), [0, 0, 255]);
            assert_eq!(out.pixel(3, height - 1), [0, 0, 255]);
        }
    }

    #[test]
    fn test_output_dimensions_match_composition() {
        for format in [
            OutputFormat::HalfSideBySide,
            OutputFormat::FullSideBySide,
            OutputFormat::Anaglyph(AnaglyphMode::RedCyan),
            OutputFormat::TopBottom {
                half_resolution: true,
            },
            OutputFormat::TopBottom {
                half_resolution: false,
            },
        ] {
            let out = FormatComposer::new(format)
                .compose(&gray(13, 9), &gray(13, 9))
                .unwrap();
            assert_eq!(out.dimensions(), format.output_dimensions(13, 9));
        }
    }

    #[test]
    fn test_anaglyph_channels() {
        let left = ramp(8, 2);
        let right = Frame::filled(8, 2, 1, [7, 77, 177]).unwrap();

        let red_cyan = FormatComposer::new(OutputFormat::Anaglyph(AnaglyphMode::RedCyan))
            .compose(&left, &right)
            .unwrap();
        let amber = FormatComposer::new(OutputFormat::Anaglyph(AnaglyphMode::AmberBlue))
            .compose(&left, &right)
            .unwrap();

        for x in 0..8 {
            let l = left.pixel(x, 1);
            assert_eq!(red_cyan.pixel(x, 1), [l[0], 77, 177]);
            assert_eq!(amber.pixel(x, 1), [l[0], l[1], 177]);
        }
    }

    #[test]
    fn test_composer_rejects_mismatched_views() {
        let result = FormatComposer::new(OutputFormat::FullSideBySide)
            .compose(&gray(8, 8), &gray(8, 6));
        assert!(matches!(
            result,
            Err(StereoError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_detect_holes_threshold() {
        let data = vec![0, 0, 0, 9, 9, 9, 10, 10, 10, 200, 200, 200];
        let frame = Frame::new(4, 1, 0, data).unwrap();
        let mask = detect_holes(&frame, 10);
        assert!(mask.is_hole(0, 0));
        assert!(mask.is_hole(1, 0));
        assert!(!mask.is_hole(2, 0));
        assert!(!mask.is_hole(3, 0));
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn test_fill_is_identity_without_holes() {
        let frame = ramp(16, 8);
        let filler = HoleFiller::default();
        assert_eq!(filler.fill_view(frame.clone()).unwrap(), frame);
    }

    #[test]
    fn test_nearest_fill_copies_neighbor() {
        let data = vec![50, 60, 70, 0, 0, 0, 0, 0, 0, 200, 210, 220];
        let frame = Frame::new(4, 1, 0, data).unwrap();
        let mask = detect_holes(&frame, 10);
        let filled = fill_nearest(&frame, &mask).unwrap();
        assert_eq!(filled.pixel(1, 0), [50, 60, 70]);
        assert_eq!(filled.pixel(2, 0), [200, 210, 220]);
    }

    #[test]
    fn test_inpaint_fills_square_with_surrounding_color() {
        let frame = frame_with_hole(32, 12..20);
        let mask = detect_holes(&frame, 10);
        assert_eq!(mask.count(), 64);

        let filled = fill_inpaint(&frame, &mask, 3).unwrap();
        assert!(detect_holes(&filled, 10).is_empty());
        for y in 12..20 {
            for x in 12..20 {
                let [r, g, b] = filled.pixel(x, y);
                assert!(r.abs_diff(128) <= 2 && g.abs_diff(128) <= 2 && b.abs_diff(128) <= 2);
            }
        }
        assert_eq!(filled.pixel(0, 0), frame.pixel(0, 0));
    }

    #[test]
    fn test_inpaint_leaves_all_hole_frame_alone() {
        let frame = Frame::filled(4, 4, 0, [0, 0, 0]).unwrap();
        let mask = detect_holes(&frame, 10);
        assert_eq!(fill_inpaint(&frame, &mask, 3).unwrap(), frame);
    }

    #[test]
    fn test_filler_fills_both_views() {
        let frame = frame_with_hole(16, 6..9);
        let pair = crate::stereo_pipeline::frame::StereoPair::new(frame.clone(), frame).unwrap();
        for method in [HoleFillMethod::Inpaint, HoleFillMethod::Nearest] {
            let filler = HoleFiller::new(HoleFillSettings {
                method,
                ..HoleFillSettings::default()
            });
            let filled = filler.fill(pair.clone()).unwrap();
            assert!(detect_holes(filled.left(), 10).is_empty());
            assert!(detect_holes(filled.right(), 10).is_empty());
        }
    }
}
