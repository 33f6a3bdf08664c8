mod tests {
    use sequential_light::{ConfigError, CoordinateTables, Environment, Interpolation};

    #[test]
    fn test_weights_sum_to_one() {
        for (pixels, scale) in [(300, 7), (10, 2), (17, 3), (5, 1), (64, 16)] {
            let tables = CoordinateTables::new(pixels, scale).unwrap();
            assert_eq!(tables.len(), pixels * scale);
            for position in 0..tables.len() as i32 {
                let split = tables.fine(position).unwrap();
                let sum = split.weight_left + split.weight_right;
                assert!((sum - 1.0).abs() < 1e-6, "position {position}: {sum}");
            }
        }
    }

    #[test]
    fn test_fine_entry_scenario() {
        let tables = CoordinateTables::new(10, 2).unwrap();
        assert_eq!(
            tables.fine(5),
            Some(&Interpolation {
                left: 2,
                right: 3,
                weight_left: 0.5,
                weight_right: 0.5,
            })
        );
        assert_eq!(tables.fine(4).unwrap().weight_left, 1.0);
        assert_eq!(tables.fine(4).unwrap().weight_right, 0.0);
    }

    #[test]
    fn test_fine_indices_fit_buffer() {
        let environment = Environment::new(300, 7).unwrap();
        let tables = CoordinateTables::build(environment);
        let last = tables.fine(environment.last_position()).unwrap();
        assert_eq!(last.left, 299);
        assert_eq!(last.right, 300);
        assert!(last.right < environment.buffer_len());
    }

    #[test]
    fn test_coarse_snaps_to_pixel() {
        let tables = CoordinateTables::new(10, 2).unwrap();
        assert_eq!(tables.coarse(0), Some(0));
        assert_eq!(tables.coarse(1), Some(0));
        assert_eq!(tables.coarse(5), Some(2));
        assert_eq!(tables.coarse(19), Some(9));
        // One past the end still resolves
        assert_eq!(tables.coarse(20), Some(10));
        assert_eq!(tables.coarse(21), None);
    }

    #[test]
    fn test_out_of_range_lookups() {
        let tables = CoordinateTables::new(10, 2).unwrap();
        assert_eq!(tables.fine(-1), None);
        assert_eq!(tables.fine(20), None);
        assert_eq!(tables.coarse(-3), None);
    }

    #[test]
    fn test_invalid_geometry() {
        assert_eq!(
            CoordinateTables::new(0, 2).unwrap_err(),
            ConfigError::ZeroPixelLength
        );
        assert_eq!(
            CoordinateTables::new(10, 0).unwrap_err(),
            ConfigError::ZeroScaleFactor
        );
        assert!(matches!(
            Environment::new(usize::MAX, 2),
            Err(ConfigError::EnvironmentTooLarge { .. })
        ));
    }
}
