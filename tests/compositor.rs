mod tests {
    use sequential_light::{
        Accumulator, Compositor, CoordinateTables, Environment, Particle, RenderRule, Rgb,
        UpdateRule,
    };

    const AMBIENT: Rgb = Rgb { r: 20, g: 20, b: 40 };
    const RED: Rgb = Rgb { r: 100, g: 0, b: 0 };

    fn particle(position: i32, color: Rgb, render: RenderRule) -> Particle {
        Particle {
            velocity: 0,
            position,
            intensity: 1.0,
            life: 1,
            color,
            update: UpdateRule::Drift,
            render,
        }
    }

    fn setup(pixels: usize, scale: usize) -> (Compositor, CoordinateTables) {
        let environment = Environment::new(pixels, scale).unwrap();
        (
            Compositor::new(environment, AMBIENT),
            CoordinateTables::build(environment),
        )
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_smooth_particle_splits_between_pixels() {
        let (mut compositor, tables) = setup(10, 2);
        let frame = compositor.render(&[particle(5, RED, RenderRule::BrightenSmooth)], &tables);

        assert_eq!(frame.len(), 13);
        assert_eq!(frame[2], Accumulator::new(70.0, 20.0, 40.0));
        assert_eq!(frame[3], Accumulator::new(70.0, 20.0, 40.0));
        assert_eq!(frame[1], Accumulator::from_rgb(AMBIENT));
        assert_eq!(frame[4], Accumulator::from_rgb(AMBIENT));
    }

    #[test]
    fn test_smooth_contribution_is_conserved() {
        let (mut compositor, tables) = setup(300, 7);
        for position in [0, 1, 3, 6, 700, 1_234, 2_099] {
            let frame = compositor.render(&[particle(position, RED, RenderRule::BrightenSmooth)], &tables);
            let split = tables.fine(position).unwrap();
            let left = frame[split.left].r - 20.0;
            let right = frame[split.right].r - 20.0;
            assert_close(left + right, 100.0);
            assert_close(left, 100.0 * split.weight_left);
        }
    }

    #[test]
    fn test_render_is_repeatable() {
        let (mut compositor, tables) = setup(30, 4);
        let particles = [
            particle(3, RED, RenderRule::BrightenSmooth),
            particle(50, Rgb::new(10, 80, 30), RenderRule::Sweep),
            particle(51, Rgb::new(5, 5, 5), RenderRule::DarkenSmooth),
            particle(90, Rgb::new(40, 0, 40), RenderRule::Brighten),
        ];
        let first = compositor.render(&particles, &tables).to_vec();
        let second = compositor.render(&particles, &tables).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_buffer_resets_to_ambient() {
        let (mut compositor, tables) = setup(10, 2);
        compositor.render(&[particle(5, RED, RenderRule::BrightenSmooth)], &tables);
        let none: [Particle; 0] = [];
        let frame = compositor.render(&none, &tables);
        assert!(frame.iter().all(|slot| *slot == Accumulator::from_rgb(AMBIENT)));
    }

    #[test]
    fn test_discrete_rules_use_nearest_pixel() {
        let (mut compositor, tables) = setup(10, 2);
        let frame = compositor.render(
            &[
                particle(7, Rgb::new(10, 10, 10), RenderRule::Brighten),
                particle(12, Rgb::new(10, 10, 10), RenderRule::Darken),
            ],
            &tables,
        );
        assert_eq!(frame[3], Accumulator::new(30.0, 30.0, 50.0));
        assert_eq!(frame[6], Accumulator::new(10.0, 10.0, 30.0));
    }

    #[test]
    fn test_darken_smooth_subtracts_weighted_color() {
        let (mut compositor, tables) = setup(10, 2);
        let frame = compositor.render(&[particle(5, Rgb::new(20, 20, 20), RenderRule::DarkenSmooth)], &tables);
        assert_eq!(frame[2], Accumulator::new(10.0, 10.0, 30.0));
        assert_eq!(frame[3], Accumulator::new(10.0, 10.0, 30.0));

        // The lookup table is not modified by darkening
        let split = tables.fine(5).unwrap();
        assert_eq!(split.weight_left, 0.5);
        assert_eq!(split.weight_right, 0.5);
    }

    #[test]
    fn test_intensity_scales_contribution() {
        let (mut compositor, tables) = setup(10, 2);
        let mut dim = particle(4, RED, RenderRule::BrightenSmooth);
        dim.intensity = 0.25;
        let frame = compositor.render(&[dim], &tables);
        assert_eq!(frame[2].r, 45.0);
    }

    #[test]
    fn test_sweep_trail_and_cleared_front() {
        let (mut compositor, tables) = setup(20, 2);
        let color = Rgb::new(60, 0, 0);
        let frame = compositor.render(&[particle(20, color, RenderRule::Sweep)], &tables);

        // Head at fine(20).right == 11, trail runs down to pixel 6
        for (offset, pixel) in (6..=11).rev().enumerate() {
            let factor = (6 - offset) as f32 / 6.0;
            assert_close(frame[pixel].r, 20.0 + 60.0 * factor);
        }
        assert_eq!(frame[5], Accumulator::from_rgb(AMBIENT));
        assert_eq!(frame[12], Accumulator::BLACK);
        assert_eq!(frame[13], Accumulator::from_rgb(AMBIENT));
    }

    #[test]
    fn test_sweep_skips_first_pixel() {
        let (mut compositor, tables) = setup(20, 2);
        let frame = compositor.render(&[particle(0, Rgb::new(60, 0, 0), RenderRule::Sweep)], &tables);
        assert_eq!(frame[0], Accumulator::from_rgb(AMBIENT));
        assert_close(frame[1].r, 80.0);
        assert_eq!(frame[2], Accumulator::BLACK);
    }

    #[test]
    fn test_sweep_keeps_front_near_strip_end() {
        let (mut compositor, tables) = setup(20, 2);
        let frame = compositor.render(&[particle(36, Rgb::new(60, 0, 0), RenderRule::Sweep)], &tables);
        // Head at 19; front pixel 20 is past the cleared region
        assert_close(frame[19].r, 80.0);
        assert_eq!(frame[20], Accumulator::from_rgb(AMBIENT));
    }

    #[test]
    fn test_pixels_are_clamped() {
        let (mut compositor, tables) = setup(10, 2);
        let bright = Rgb::new(200, 200, 200);
        compositor.render(
            &[
                particle(4, bright, RenderRule::Brighten),
                particle(4, bright, RenderRule::Brighten),
                particle(8, bright, RenderRule::Darken),
            ],
            &tables,
        );
        let pixels: Vec<Rgb> = compositor.pixels().collect();
        assert_eq!(pixels.len(), 10);
        assert_eq!(pixels[2], Rgb::new(255, 255, 255));
        assert_eq!(pixels[4], Rgb::new(0, 0, 0));
        assert_eq!(pixels[0], AMBIENT);
    }

    #[test]
    fn test_particles_outside_tables_are_skipped() {
        let (mut compositor, tables) = setup(10, 2);
        let frame = compositor.render(
            &[
                particle(-4, RED, RenderRule::BrightenSmooth),
                particle(400, RED, RenderRule::Sweep),
                particle(400, RED, RenderRule::Brighten),
            ],
            &tables,
        );
        assert!(frame.iter().all(|slot| *slot == Accumulator::from_rgb(AMBIENT)));
    }
}
